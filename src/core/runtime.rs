use crate::archive::{self, ArchiveStore};
use crate::arrays;
use crate::compose;
use crate::config::BotConfig;
use crate::models::Visibility;
use crate::providers::ftp::FtpUploader;
use crate::providers::mastodon::Mastodon;
use crate::report;
use crate::rotation::{self, FileUsedStore};
use crate::util;
use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, error, info, warn};

pub const LOG_FILE: &str = "as-a-treat.log";

/// Owns the config and the API client, and sequences the bot's paths:
/// posting, archiving, and the informational commands.
pub struct Runtime {
    config: BotConfig,
    mastodon: Mastodon,
}

impl Runtime {
    pub fn new(config: BotConfig) -> Self {
        let mastodon = Mastodon::new(&config.api_base_url, &config.access_token);
        Runtime { config, mastodon }
    }

    /// The main posting path: pick a folx and a treat, maybe turn the treat
    /// into a threat, render and post. Both picks are recorded in their
    /// rotation files before posting.
    pub async fn post_treat(&self, dry_run: bool, visibility: Visibility) -> Result<()> {
        let treats = arrays::load_treats()?;
        let treat_raws: Vec<&str> = treats.iter().map(|t| t.raw).collect();

        let mut rng = rand::thread_rng();
        let mut folx_store = FileUsedStore::for_pool("folx");
        let mut treats_store = FileUsedStore::for_pool("treats");

        let folx = rotation::select(arrays::FOLX, &mut folx_store, &mut rng)?;
        let raw_treat = rotation::select(&treat_raws, &mut treats_store, &mut rng)?;
        let treat = treats
            .iter()
            .find(|t| t.raw == raw_treat)
            .map(|t| &t.entry)
            .context("chosen treat disappeared from the pool")?;
        debug!("Picked folx {folx:?} and treat {:?}", treat.text());

        let is_threat = compose::should_be_threat(self.config.threat_probability, &mut rng);
        let status = compose::compose(folx, treat, is_threat);

        if dry_run {
            println!("Dry run: would have posted \"{status}\"");
            info!("Dry run: would have posted \"{status}\"");
        } else {
            self.mastodon.post_status(&status, visibility).await?;
            println!("Posted: {status}");
            info!("Posted: \"{status}\"");
        }
        Ok(())
    }

    /// Fold freshly fetched statuses into the archive when the configured
    /// interval has elapsed.
    pub async fn run_periodic_archive(&self, dry_run: bool) {
        let store = ArchiveStore::new(&self.config.archive_path);
        archive::run_periodic_archive(
            &self.mastodon,
            &store,
            self.config.archive_interval_secs,
            dry_run,
        )
        .await;
    }

    /// Update the bot's bio with the number of possible combinations.
    pub async fn update_bio(&self, dry_run: bool) -> Result<()> {
        let num_folx = arrays::FOLX.len();
        let num_treats = arrays::TREATS.len();
        let combinations = util::group_thousands(arrays::combination_count());
        let last_update = Utc::now().format("%Y-%m-%d %H:%M:%S");
        let bio = format!(
            "You can have another bot, as a treat.\n\nI can choose from {num_folx} folx and {num_treats} treats, so there are {combinations} possible combinations.\n\nI last updated this bio on {last_update} (UTC)."
        );

        if dry_run {
            println!("Dry run, would have updated bio to: {bio}");
            info!("Dry run, would have updated bio to: {bio}");
        } else {
            self.mastodon.update_bio(&bio).await?;
            println!("Updated bio to: {bio}");
            info!("Updated bio to: {bio}");
        }
        Ok(())
    }

    /// The total number of statuses the account has posted.
    pub async fn status_count(&self) -> Result<u64> {
        Ok(self.mastodon.verify_credentials().await?.statuses_count)
    }

    pub async fn most_interacted(&self, over_count: usize) -> Result<()> {
        report::most_interacted(&self.mastodon, over_count, true).await
    }

    /// Ship the rotation files and log to the FTP host, unless suppressed.
    pub fn upload_logs(&self) {
        if self.config.dont_upload_logs {
            println!("Not uploading logs as DONT_UPLOAD_LOGS is True");
            return;
        }
        let Some(ftp_config) = self.config.ftp.clone() else {
            warn!("FTP credentials not configured, skipping log upload");
            return;
        };

        info!("Uploading logs...");
        let uploader = FtpUploader::new(ftp_config);
        for filename in ["used_folx", "used_treats", LOG_FILE] {
            if let Err(e) = uploader.upload(filename) {
                error!("Failed to upload {filename}: {e:#}");
            }
        }
        info!("Finished uploading logs");
    }
}
