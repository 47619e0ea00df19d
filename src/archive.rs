use crate::models::{Account, ArchiveDocument, ArchivedStatus, Status};
use anyhow::Result;
use chrono::Utc;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

const PAGE_SIZE: u32 = 40;
const FETCH_CAP: usize = 10_000;

/// Durable JSON archive of the bot's own posts.
pub struct ArchiveStore {
    path: PathBuf,
}

impl ArchiveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loading never fails the caller: a missing, unreadable, or corrupt
    /// file yields a fresh empty document.
    pub fn load(&self) -> ArchiveDocument {
        if !self.path.exists() {
            return ArchiveDocument::default();
        }
        let parsed = fs::read_to_string(&self.path)
            .map_err(anyhow::Error::from)
            .and_then(|data| serde_json::from_str(&data).map_err(anyhow::Error::from));
        match parsed {
            Ok(doc) => doc,
            Err(e) => {
                error!("Failed to load archive: {e}");
                ArchiveDocument::default()
            }
        }
    }

    /// Write-temp-then-rename, so a crash mid-write never clobbers the
    /// previous good archive. Failures are logged, not raised.
    pub fn save(&self, doc: &ArchiveDocument) {
        let tmp_path = self.tmp_path();
        let written = serde_json::to_string_pretty(doc)
            .map_err(anyhow::Error::from)
            .and_then(|json| fs::write(&tmp_path, json).map_err(anyhow::Error::from))
            .and_then(|()| fs::rename(&tmp_path, &self.path).map_err(anyhow::Error::from));
        match written {
            Ok(()) => info!("Archive saved to {}", self.path.display()),
            Err(e) => {
                error!("Failed to save archive: {e}");
                if tmp_path.exists() {
                    let _ = fs::remove_file(&tmp_path);
                }
            }
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

/// Update or append one fetched status. Engagement counts on a known id are
/// refreshed in place, keeping its position; statuses with no id are
/// skipped.
pub fn merge_status(status: &Status, doc: &mut ArchiveDocument) {
    if status.id.is_empty() {
        return;
    }
    let archived = ArchivedStatus {
        id: status.id.clone(),
        timestamp: status.created_at.unwrap_or_else(Utc::now).timestamp(),
        content: status.content.clone(),
        likes: status.favourites_count,
        boosts: status.reblogs_count,
        replies: status.replies_count,
    };
    match doc.statuses.iter_mut().find(|s| s.id == archived.id) {
        Some(existing) => *existing = archived,
        None => doc.statuses.push(archived),
    }
}

/// What the archiver needs from the API side, kept as a trait so the
/// periodic run can be driven by a fake source in tests.
#[allow(async_fn_in_trait)]
pub trait StatusSource {
    async fn verify_credentials(&self) -> Result<Account>;
    async fn account_statuses(
        &self,
        account_id: &str,
        max_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Status>>;
}

/// Re-fetch the account's statuses and fold them into the archive once the
/// configured interval has elapsed. The whole history is fetched each time
/// so engagement counts on old posts stay fresh. Errors during the
/// fetch/merge steps are logged and leave `last_archived` untouched, so the
/// next invocation retries from the original timestamp.
pub async fn run_periodic_archive<S: StatusSource>(
    source: &S,
    store: &ArchiveStore,
    interval_secs: i64,
    dry_run: bool,
) {
    let mut doc = store.load();
    let now = Utc::now().timestamp();
    if now - doc.meta.last_archived < interval_secs {
        debug!("Not time to archive yet");
        return;
    }

    info!("Starting periodic archive...");

    if dry_run {
        info!("Dry run: skipping API calls and save");
        return;
    }

    match fetch_own_statuses(source).await {
        Ok(statuses) => {
            info!("Fetched {} statuses", statuses.len());
            for status in &statuses {
                merge_status(status, &mut doc);
            }
            doc.meta.last_archived = now;
            store.save(&doc);
        }
        Err(e) => error!("Error during periodic archive: {e:#}"),
    }
}

async fn fetch_own_statuses<S: StatusSource>(source: &S) -> Result<Vec<Status>> {
    let me = source.verify_credentials().await?;
    let mut fetched: Vec<Status> = Vec::new();
    let mut max_id: Option<String> = None;
    loop {
        let page = source
            .account_statuses(&me.id, max_id.as_deref(), PAGE_SIZE)
            .await?;
        if page.is_empty() {
            break;
        }
        max_id = page.last().map(|s| s.id.clone());
        fetched.extend(page);
        if fetched.len() > FETCH_CAP {
            warn!("Fetched over {FETCH_CAP} statuses, stopping early");
            break;
        }
    }
    Ok(fetched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArchiveMeta;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn status(id: &str) -> Status {
        Status {
            id: id.to_string(),
            content: "test".to_string(),
            favourites_count: 5,
            reblogs_count: 2,
            replies_count: 1,
            ..Default::default()
        }
    }

    struct FakeSource {
        pages: Mutex<VecDeque<Vec<Status>>>,
        fetch_calls: AtomicUsize,
    }

    impl FakeSource {
        fn with_pages(pages: Vec<Vec<Status>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                fetch_calls: AtomicUsize::new(0),
            }
        }
    }

    impl StatusSource for FakeSource {
        async fn verify_credentials(&self) -> Result<Account> {
            Ok(Account {
                id: "123".to_string(),
                username: "treatbot".to_string(),
                statuses_count: 0,
            })
        }

        async fn account_statuses(
            &self,
            _account_id: &str,
            _max_id: Option<&str>,
            _limit: u32,
        ) -> Result<Vec<Status>> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
        }
    }

    struct FailingSource;

    impl StatusSource for FailingSource {
        async fn verify_credentials(&self) -> Result<Account> {
            anyhow::bail!("auth error")
        }

        async fn account_statuses(
            &self,
            _account_id: &str,
            _max_id: Option<&str>,
            _limit: u32,
        ) -> Result<Vec<Status>> {
            anyhow::bail!("auth error")
        }
    }

    /// Serves an endless stream of full pages with unique ids.
    struct EndlessSource {
        served: AtomicUsize,
    }

    impl StatusSource for EndlessSource {
        async fn verify_credentials(&self) -> Result<Account> {
            Ok(Account {
                id: "123".to_string(),
                username: "treatbot".to_string(),
                statuses_count: 0,
            })
        }

        async fn account_statuses(
            &self,
            _account_id: &str,
            _max_id: Option<&str>,
            limit: u32,
        ) -> Result<Vec<Status>> {
            let base = self.served.fetch_add(limit as usize, Ordering::SeqCst);
            Ok((0..limit as usize).map(|i| status(&format!("{}", base + i))).collect())
        }
    }

    #[test]
    fn load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::new(dir.path().join("test_archive.json"));
        assert_eq!(store.load(), ArchiveDocument::default());
    }

    #[test]
    fn load_corrupt_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_archive.json");
        fs::write(&path, "definitely not json").unwrap();
        let store = ArchiveStore::new(path);
        assert_eq!(store.load(), ArchiveDocument::default());
    }

    #[test]
    fn save_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::new(dir.path().join("test_archive.json"));
        let doc = ArchiveDocument {
            statuses: vec![ArchivedStatus {
                id: "1".to_string(),
                timestamp: 1000,
                content: "test".to_string(),
                likes: 5,
                boosts: 2,
                replies: 1,
            }],
            meta: ArchiveMeta { last_archived: 123 },
        };
        store.save(&doc);
        assert_eq!(store.load(), doc);
    }

    #[test]
    fn merge_appends_then_updates_in_place() {
        let mut doc = ArchiveDocument::default();
        let mut first = status("101");
        merge_status(&first, &mut doc);
        assert_eq!(doc.statuses.len(), 1);
        assert_eq!(doc.statuses[0].id, "101");
        assert_eq!(doc.statuses[0].likes, 5);

        merge_status(&status("102"), &mut doc);
        assert_eq!(doc.statuses.len(), 2);

        // Merging a known id again refreshes its counts without moving it.
        first.favourites_count = 10;
        merge_status(&first, &mut doc);
        assert_eq!(doc.statuses.len(), 2);
        assert_eq!(doc.statuses[0].id, "101");
        assert_eq!(doc.statuses[0].likes, 10);
    }

    #[test]
    fn merge_skips_statuses_without_an_id() {
        let mut doc = ArchiveDocument::default();
        merge_status(&Status::default(), &mut doc);
        assert!(doc.statuses.is_empty());
    }

    #[test]
    fn merge_defaults_missing_created_at_to_now() {
        let mut doc = ArchiveDocument::default();
        merge_status(&status("1"), &mut doc);
        assert!(doc.statuses[0].timestamp > 0);
    }

    #[tokio::test]
    async fn due_run_fetches_and_advances_last_archived() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::new(dir.path().join("test_archive.json"));
        let before = Utc::now().timestamp() - 100;
        let mut doc = ArchiveDocument::default();
        doc.meta.last_archived = before;
        store.save(&doc);

        let source = FakeSource::with_pages(vec![vec![status("1")]]);
        run_periodic_archive(&source, &store, 10, false).await;

        assert!(source.fetch_calls.load(Ordering::SeqCst) >= 1);
        let loaded = store.load();
        assert!(loaded.meta.last_archived > before);
        assert_eq!(loaded.statuses.len(), 1);
    }

    #[tokio::test]
    async fn run_before_interval_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::new(dir.path().join("test_archive.json"));
        let mut doc = ArchiveDocument::default();
        doc.meta.last_archived = Utc::now().timestamp();
        store.save(&doc);

        let source = FakeSource::with_pages(vec![vec![status("1")]]);
        run_periodic_archive(&source, &store, 86_400, false).await;

        assert_eq!(source.fetch_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.load(), doc);
    }

    #[tokio::test]
    async fn dry_run_skips_fetch_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::new(dir.path().join("test_archive.json"));
        let before = Utc::now().timestamp() - 100;
        let mut doc = ArchiveDocument::default();
        doc.meta.last_archived = before;
        store.save(&doc);

        let source = FakeSource::with_pages(vec![vec![status("1")]]);
        run_periodic_archive(&source, &store, 10, true).await;

        assert_eq!(source.fetch_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.load().meta.last_archived, before);
    }

    #[tokio::test]
    async fn failed_run_leaves_last_archived_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::new(dir.path().join("test_archive.json"));
        let before = Utc::now().timestamp() - 100;
        let mut doc = ArchiveDocument::default();
        doc.meta.last_archived = before;
        store.save(&doc);

        run_periodic_archive(&FailingSource, &store, 10, false).await;

        assert_eq!(store.load().meta.last_archived, before);
    }

    #[tokio::test]
    async fn runaway_pagination_stops_at_the_cap() {
        let source = EndlessSource {
            served: AtomicUsize::new(0),
        };
        let fetched = fetch_own_statuses(&source).await.unwrap();
        assert!(fetched.len() > FETCH_CAP);
        assert!(fetched.len() <= FETCH_CAP + PAGE_SIZE as usize);
    }
}
