//! The word pools. Format: {folx} can have {treats}, as a treat

use crate::models::TreatEntry;
use anyhow::{Context, Result};

// The case of these will not be changed
pub const FOLX: &[&str] = &[
    "Transfems",
    "Foxgirls",
    "Foxes",
    "Transmascs",
    "Catgirls",
    "Catboys",
    "I",
    "The Maus",
    "A bee",
    "Wikipedians",
    "Mathematicians",
    "CS undergrads",
    "Rust developers",
    "Javascript developers",
    "Python developers",
    "PHP developers",
    "C developers",
    "C++ developers",
    "C# developers",
    "Arch Linux users",
    "Gentoo users",
    "Nix users",
    "Debian users",
    "You",
    "Fedibots",
    "Robotgirls",
    "Dolls",
    "woem.men users",
    "meow.woem.cat users",
    "woem-ers",
    "labyrinth.zone users",
    "Yassie",
    "Yasseenists",
    "Folx that use they/them",
    "Open source maintainers",
    "Package maintainers",
    "Mastodon users",
    "Akkoma users",
    "Sharkey users",
    "Glitch-soc users",
    "GoToSocial users",
    "Firefish users",
    "Iceshrimp users",
    "Dagns",
    "Good pets",
    "Gamers",
    "Doms",
    "The Kat",
    "Polycules",
    "A Mae",
    "FFXIV players",
    "Cuties",
    "Boykissers",
    "Girlkissers",
    "Enbykissers",
    "Femboys",
    "Useless lesbians",
    "Orange cats",
    "Void kitties",
    "Everyone",
    "Nyanbinary folx",
    "Friend-shaped creatures",
    "Neurospicy people",
];

// The case of these will not be changed. An entry may be a JSON object
// ({"alt_wording": "True", "text": ...}) to use the alternate sentence form.
pub const TREATS: &[&str] = &[
    "a headpat",
    "an anti-trust lawsuit",
    "some gunpowder",
    "a misskey fork",
    "a normal fork",
    "some poorly maintained code",
    "some MediaWiki",
    "some chicken nuggets",
    "a ride on a Sprinter 158/9",
    "a ride on a Class 218",
    "a ride on an ICE 4",
    "a ride on a Stadler KISS",
    "an undefined variable",
    "a new spinny skirt",
    "a new set of thigh highs",
    "a new checked shirt",
    "new pronouns",
    "a cheemsborgar",
    "a copy of Celeste",
    "play of the game",
    "a cheeky Nandos",
    "a cuddle of the Yassie plushie",
    "a fediblock",
    "a broken migration",
    "some new cat ears",
    "a LEGO UCS Millennium Falcon 75192",
    "a random.choice(TREATS)",
    "a new OLED steamdeck",
    "a barely used Nvidia RTX 4090 Ti",
    "a LEGO UCS Death Star 75159",
    "a shiny Gardevoir",
    "an iced latte",
    "a docker container",
    "an invalid IPv4 address",
    "an IPv6 in the RFC 4193 block",
    "a **BLÅHAJ**",
    "a malformed BIRD config",
    "a *click*",
    "belly rubs",
    "working code",
    ":3",
    "a biiiiig stretch",
    "a cute frog",
    "a neofox",
    "a neocat",
    "a trip to IKEA",
    "some extra spoons",
    "a little kiss on the forehead",
    "a flatpak",
    "a cool rock",
    "some cool moss",
    "a redundant backup",
    "a fluffy tail",
    "a snoot boop",
    "a creative mode Minecraft server",
    "a hit of dopamine",
    "root access",
    "a boiled pizza",
    "a Eurasian collared dove",
    "a Monster Ultra White",
    "a Monster Ultra Rosa",
    "some bepis",
    "an unmaintained npm package",
    "a hacky python script",
    "a shitpost",
    "a Thinkpad T440p",
    "a Nix flake",
    "a Warhammer Age of Sigmar Warrior Starter Set",
    "temporary use of the single brain cell",
    "a Twitch Prime subscription",
    "a comfy blanket",
    "a hassle-free git merge",
    "a stack overflow",
    "federated biting",
    "nibbles from a maus",
    "small bits of cheese",
    "a furnished kennel",
    "a new 3D printer",
    "an extra hydrated spool of PLA",
    "a new 60% mechanical keyboard",
    "a failing wireguard tunnel",
    "broken Path MTU Discovery",
    "a 100 MB Iomega Zip Disk",
    "a nat 20",
    "an ear wiggle",
    "another fedi drama",
    "a Windows 98 VM",
    "a Torment Nexus",
    "little a Salami",
    "a little break",
    "a way to exit vim",
    "a giant pride flag",
    "spam from mastodon dot social",
    "a dependabot PR",
    "a 1996 Subaru Outback",
    "a request to agree to the GPL",
    "some extra RAM",
    "a 7200 RPM hard drive",
    "a zero-day exploit",
    "a cute little collar",
    "a subpost",
    "a little nap",
    "trailing commas",
    "paw beans",
    "brushy brushy",
    "walkies",
    "ear scritches",
    "a bowl of kibble",
    "a game of fetch",
    "an hour-long video about a fridge",
    "an infodump",
    "a parallel play session",
    "a new stim toy",
    "some peace and quiet",
];

/// A treat with its raw pool string (the identity recorded in the rotation
/// file) and its decoded form.
#[derive(Clone, Debug)]
pub struct Treat {
    pub raw: &'static str,
    pub entry: TreatEntry,
}

/// Decode every treat entry up front, so a malformed structured entry fails
/// the run before anything is selected or posted.
pub fn load_treats() -> Result<Vec<Treat>> {
    TREATS
        .iter()
        .copied()
        .map(|raw| {
            let entry = TreatEntry::parse(raw).context("treat pool entry failed to decode")?;
            Ok(Treat { raw, entry })
        })
        .collect()
}

pub fn combination_count() -> u64 {
    (FOLX.len() * TREATS.len()) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn folx_entries_are_unique() {
        let mut seen = HashSet::new();
        for item in FOLX {
            assert!(seen.insert(item), "duplicate folx entry: {item}");
        }
    }

    #[test]
    fn treat_entries_are_unique() {
        let mut seen = HashSet::new();
        for item in TREATS {
            assert!(seen.insert(item), "duplicate treat entry: {item}");
        }
    }

    #[test]
    fn every_treat_entry_decodes() {
        let treats = load_treats().unwrap();
        assert_eq!(treats.len(), TREATS.len());
    }

    #[test]
    fn combination_count_is_product_of_pools() {
        assert_eq!(combination_count(), (FOLX.len() * TREATS.len()) as u64);
    }
}
