use crate::models::{Account, Status};
use crate::providers::mastodon::Mastodon;
use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

const PAGE_SIZE: u32 = 40;
const CACHE_FILE: &str = "statuses_cache.json";
const CACHE_BACKUP_FILE: &str = "statuses_cache.backup.json";
const REPORT_FILE: &str = "most_interacted.json";

#[derive(Serialize)]
struct CachedStatus {
    id: String,
    timestamp: Option<String>,
    url: Option<String>,
    content: String,
    reblogs_count: u64,
    favourites_count: u64,
}

impl CachedStatus {
    fn from_status(status: &Status) -> Self {
        Self {
            id: status.id.clone(),
            timestamp: status.created_at.map(|t| t.to_rfc3339()),
            url: status.url.clone(),
            content: status.content.clone(),
            reblogs_count: status.reblogs_count,
            favourites_count: status.favourites_count,
        }
    }
}

#[derive(Serialize)]
struct StatusesCache {
    timestamp: String,
    account_id: String,
    account_username: String,
    statuses_searched: usize,
    account_total_statuses: u64,
    most_interacted_status_in_batch: CachedStatus,
    newest_status_id: String,
    oldest_status_id: String,
    time_taken_seconds: String,
    statuses_count: usize,
    statuses_hash: String,
    statuses: Vec<CachedStatus>,
}

#[derive(Serialize)]
struct MostInteractedReport {
    timestamp: String,
    id: String,
    post_timestamp: Option<String>,
    url: Option<String>,
    content: String,
    reblogs_count: u64,
    favourites_count: u64,
    statuses_searched: usize,
    account_total_statuses: u64,
}

/// The status with the highest boosts + favourites.
pub fn most_interacted_of(statuses: &[Status]) -> Option<&Status> {
    statuses
        .iter()
        .max_by_key(|s| s.reblogs_count + s.favourites_count)
}

/// Find the most interacted with post in roughly the last `over_count`
/// statuses and save a link to a file.
pub async fn most_interacted(mastodon: &Mastodon, over_count: usize, cache: bool) -> Result<()> {
    let start_time = Instant::now();
    let me = mastodon.verify_credentials().await?;
    let total_statuses = me.statuses_count;
    println!("Total statuses: {total_statuses}");
    println!("Fetching about the last {over_count} statuses...");

    let mut all_statuses: Vec<Status> = Vec::new();
    let mut max_id: Option<String> = None;
    loop {
        let page = mastodon
            .account_statuses(&me.id, max_id.as_deref(), PAGE_SIZE, true, true)
            .await?;
        if page.is_empty() {
            break;
        }
        max_id = page.last().map(|s| s.id.clone());
        all_statuses.extend(page);
        if all_statuses.len() >= over_count {
            break;
        }
        println!("Fetched {} statuses so far...", all_statuses.len());
        // Be nice to the server
        if all_statuses.len() % 400 == 0 {
            println!("Sleeping for 1 second to be nice to the server...");
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    if all_statuses.is_empty() {
        println!("No statuses found");
        return Ok(());
    }
    println!("Fetched {} statuses and stopping", all_statuses.len());

    let Some(top) = most_interacted_of(&all_statuses) else {
        return Ok(());
    };
    let link = top.url.clone().unwrap_or_default();
    let elapsed = start_time.elapsed().as_secs_f64();

    if cache {
        write_statuses_cache(&me, &all_statuses, top, total_statuses, elapsed)?;
    }

    println!(
        "Checked {} statuses in {elapsed:.2} seconds",
        all_statuses.len()
    );
    println!("Most interacted post: {link}");
    println!(
        "Boosts: {}, Favourites: {}",
        top.reblogs_count, top.favourites_count
    );

    let report = MostInteractedReport {
        timestamp: Utc::now().to_rfc3339(),
        id: top.id.clone(),
        post_timestamp: top.created_at.map(|t| t.to_rfc3339()),
        url: top.url.clone(),
        content: top.content.clone(),
        reblogs_count: top.reblogs_count,
        favourites_count: top.favourites_count,
        statuses_searched: all_statuses.len(),
        account_total_statuses: total_statuses,
    };
    fs::write(REPORT_FILE, serde_json::to_string_pretty(&report)?)?;
    info!("Most interacted post: {link}");
    Ok(())
}

fn write_statuses_cache(
    me: &Account,
    statuses: &[Status],
    top: &Status,
    total_statuses: u64,
    elapsed: f64,
) -> Result<()> {
    let cached: Vec<CachedStatus> = statuses.iter().map(CachedStatus::from_status).collect();
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_string(&cached)?.as_bytes());
    let statuses_hash = format!("{:x}", hasher.finalize());

    let content = StatusesCache {
        timestamp: Utc::now().to_rfc3339(),
        account_id: me.id.clone(),
        account_username: me.username.clone(),
        statuses_searched: statuses.len(),
        account_total_statuses: total_statuses,
        most_interacted_status_in_batch: CachedStatus::from_status(top),
        newest_status_id: statuses.first().map(|s| s.id.clone()).unwrap_or_default(),
        oldest_status_id: statuses.last().map(|s| s.id.clone()).unwrap_or_default(),
        time_taken_seconds: format!("{elapsed:.2}"),
        statuses_count: statuses.len(),
        statuses_hash,
        statuses: cached,
    };

    // Keep one generation of history around
    if Path::new(CACHE_FILE).is_file() {
        fs::rename(CACHE_FILE, CACHE_BACKUP_FILE)?;
    }
    fs::write(CACHE_FILE, serde_json::to_string_pretty(&content)?)?;
    println!("Wrote cache to {CACHE_FILE}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(id: &str, boosts: u64, favourites: u64) -> Status {
        Status {
            id: id.to_string(),
            reblogs_count: boosts,
            favourites_count: favourites,
            ..Default::default()
        }
    }

    #[test]
    fn picks_the_status_with_most_interactions() {
        let statuses = vec![
            status("1", 1, 2),
            status("2", 10, 5),
            status("3", 4, 4),
        ];
        assert_eq!(most_interacted_of(&statuses).unwrap().id, "2");
    }

    #[test]
    fn empty_input_has_no_winner() {
        assert!(most_interacted_of(&[]).is_none());
    }
}
