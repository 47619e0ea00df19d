use crate::models::TreatEntry;
use rand::Rng;
use tracing::{debug, warn};

/// Used when THREAT_PROBABILITY is absent from the environment.
pub const DEFAULT_THREAT_PROBABILITY: f64 = 0.01;

fn resolve_probability(probability: Option<f64>) -> f64 {
    match probability {
        Some(p) => p,
        None => {
            warn!("THREAT_PROBABILITY is not present in config, using old default");
            println!("Warning: THREAT_PROBABILITY is not present in config, using old default");
            DEFAULT_THREAT_PROBABILITY
        }
    }
}

/// Decide whether this treat should be a threat.
///
/// Draws a uniform integer in [1, round(1/p)]; the post is a threat iff the
/// draw hits the maximum, so the effective rate is 1/round(1/p).
pub fn should_be_threat<R: Rng + ?Sized>(probability: Option<f64>, rng: &mut R) -> bool {
    let probability = resolve_probability(probability);
    let range_max = ((1.0 / probability).round() as u64).max(1);
    let chosen_value = rng.gen_range(1..=range_max);
    debug!("Treat/Threat value {chosen_value} (threat requires {range_max})");

    let is_threat = chosen_value == range_max;
    if is_threat {
        debug!("Post will be a threat");
    } else {
        debug!("Post will be a treat");
    }
    is_threat
}

/// Render the status text from the chosen folx and treat.
pub fn compose(folx: &str, treat: &TreatEntry, is_threat: bool) -> String {
    let noun = if is_threat { "threat" } else { "treat" };
    match treat {
        TreatEntry::AltWording(text) => format!("{folx} {text}, as a {noun}"),
        TreatEntry::Plain(text) => format!("{folx} can have {text}, as a {noun}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn plain_treat_wording() {
        let treat = TreatEntry::Plain("a nap".to_string());
        assert_eq!(
            compose("Cats", &treat, false),
            "Cats can have a nap, as a treat"
        );
    }

    #[test]
    fn alt_wording_treat() {
        let treat = TreatEntry::AltWording("nap now".to_string());
        assert_eq!(compose("Cats", &treat, false), "Cats nap now, as a treat");
    }

    #[test]
    fn threat_wording() {
        let treat = TreatEntry::Plain("a nap".to_string());
        assert_eq!(
            compose("Cats", &treat, true),
            "Cats can have a nap, as a threat"
        );
    }

    #[test]
    fn probability_one_is_always_a_threat() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..100 {
            assert!(should_be_threat(Some(1.0), &mut rng));
        }
    }

    #[test]
    fn threat_rate_converges() {
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 100_000;
        let threats = (0..draws)
            .filter(|_| should_be_threat(Some(0.01), &mut rng))
            .count();
        // Expected 1000 at 1/100; leave generous statistical headroom.
        assert!(
            (500..=1500).contains(&threats),
            "threat rate off: {threats}/{draws}"
        );
    }

    #[test]
    fn missing_probability_falls_back_to_default() {
        assert_eq!(resolve_probability(None), DEFAULT_THREAT_PROBABILITY);
        assert_eq!(resolve_probability(Some(0.5)), 0.5);
    }
}
