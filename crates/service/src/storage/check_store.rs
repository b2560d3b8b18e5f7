use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use models::Check;
use tokio::{fs, sync::Mutex};
use tracing::{debug, info};

use crate::errors::StoreError;
use crate::pagination::PageSize;
use crate::storage::codec;

/// File-backed, insertion-ordered collection of checks.
///
/// The in-memory `Vec` is the source of truth at runtime; the file is a
/// write-through mirror. Every operation holds the single lock for its whole
/// duration, disk writes included, so mutations are serialized and readers
/// never observe a collection mid-swap.
///
/// Each mutation re-encodes the entire collection and overwrites the file with
/// one write call. That is O(n) per mutation and fine for the small collections
/// this registry holds. The file must not be shared by two processes.
pub struct FileCheckStore {
    checks: Mutex<Vec<Check>>,
    file_path: PathBuf,
}

impl FileCheckStore {
    /// Open the store at `path`, loading any persisted checks.
    ///
    /// A missing file is created empty; a zero-length file is an empty collection.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let checks = match fs::read(&file_path).await {
            Ok(bytes) => codec::decode(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::write(&file_path, b"").await?;
                info!(path = %file_path.display(), "created empty check store");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        debug!(path = %file_path.display(), count = checks.len(), "check store loaded");

        Ok(Arc::new(Self { checks: Mutex::new(checks), file_path }))
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Append a check. Fails with `DuplicateId` when the id is already stored.
    ///
    /// The candidate collection is written to disk before it replaces the
    /// in-memory one, so a failed write leaves both at the previous state.
    pub async fn create(&self, check: Check) -> Result<(), StoreError> {
        let mut checks = self.checks.lock().await;
        if find(&checks, &check.id).is_some() {
            return Err(StoreError::DuplicateId(check.id));
        }

        let mut candidate = Vec::with_capacity(checks.len() + 1);
        candidate.extend(checks.iter().cloned());
        candidate.push(check);

        self.persist(&candidate).await?;
        *checks = candidate;
        debug!(count = checks.len(), "check created");
        Ok(())
    }

    pub async fn read(&self, id: &str) -> Result<Check, StoreError> {
        let checks = self.checks.lock().await;
        find(&checks, id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Returns `(total, items)` for 1-based `page`.
    pub async fn list(&self, page: usize, size: PageSize) -> (usize, Vec<Check>) {
        let checks = self.checks.lock().await;
        let total = checks.len();
        let range = size.bounds(page, total);
        (total, checks[range].to_vec())
    }

    /// Remove the check with `id`; returns whether one was removed.
    ///
    /// An absent id is a no-op and does not touch the file.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut checks = self.checks.lock().await;
        if find(&checks, id).is_none() {
            return Ok(false);
        }

        let remaining: Vec<Check> = checks.iter().filter(|c| c.id != id).cloned().collect();
        self.persist(&remaining).await?;
        *checks = remaining;
        debug!(count = checks.len(), "check deleted");
        Ok(true)
    }

    pub async fn len(&self) -> usize {
        self.checks.lock().await.len()
    }

    async fn persist(&self, checks: &[Check]) -> Result<(), StoreError> {
        let data = codec::encode(checks)?;
        fs::write(&self.file_path, data).await?;
        Ok(())
    }
}

fn find<'a>(checks: &'a [Check], id: &str) -> Option<&'a Check> {
    checks.iter().find(|c| c.id == id)
}

/// Delete the persisted collection at `path`. A missing file is fine.
pub async fn remove_store_file(path: impl AsRef<Path>) -> Result<(), StoreError> {
    match fs::remove_file(path.as_ref()).await {
        Ok(()) => {
            info!(path = %path.as_ref().display(), "removed persisted checks");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(id: &str, endpoint: &str) -> Check {
        Check { id: id.into(), endpoint: endpoint.into(), ..Check::default() }
    }

    fn stub_checks(n: usize) -> Vec<Check> {
        (0..n).map(|i| check(&i.to_string(), &format!("http://host-{i}/"))).collect()
    }

    async fn seeded(path: &Path, checks: &[Check]) -> Arc<FileCheckStore> {
        std::fs::write(path, codec::encode(checks).unwrap()).unwrap();
        FileCheckStore::open(path).await.unwrap()
    }

    #[tokio::test]
    async fn open_creates_missing_file() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("file_repo");
        let store = FileCheckStore::open(&path).await?;

        let meta = std::fs::metadata(&path)?;
        assert!(meta.is_file());
        assert_eq!(meta.len(), 0);
        assert_eq!(store.len().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn open_treats_zero_length_file_as_empty() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("checks.bin");
        std::fs::write(&path, b"")?;

        let store = FileCheckStore::open(&path).await?;
        assert_eq!(store.list(1, PageSize::All).await, (0, vec![]));
        Ok(())
    }

    #[tokio::test]
    async fn open_rejects_corrupt_file() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("checks.bin");
        std::fs::write(&path, [0xffu8; 5])?;

        let res = FileCheckStore::open(&path).await;
        assert!(matches!(res, Err(StoreError::Corrupt(_))));
        Ok(())
    }

    #[tokio::test]
    async fn open_fails_when_path_is_a_directory() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let res = FileCheckStore::open(dir.path()).await;
        assert!(matches!(res, Err(StoreError::Io(_))));
        Ok(())
    }

    #[tokio::test]
    async fn open_loads_persisted_checks() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("checks.bin");
        let existing = check("id", "endpoint");
        let store = seeded(&path, std::slice::from_ref(&existing)).await;

        let (total, items) = store.list(1, PageSize::All).await;
        assert_eq!(total, 1);
        assert_eq!(items, vec![existing]);
        Ok(())
    }

    #[tokio::test]
    async fn create_writes_through_to_disk() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("checks.bin");
        let store = FileCheckStore::open(&path).await?;

        let new_check = Check::created("id-1", "http://example.com/");
        store.create(new_check.clone()).await?;

        let on_disk = codec::decode(&std::fs::read(&path)?)?;
        assert_eq!(on_disk, vec![new_check]);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_duplicate_id() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("checks.bin");
        let existing = check("id", "endpoint");
        let store = seeded(&path, std::slice::from_ref(&existing)).await;

        let err = store.create(existing.clone()).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(ref id) if id == "id"));
        assert_eq!(store.len().await, 1);

        // same id, different endpoint text still collides
        let err = store.create(check("id", "other")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(_)));

        store.create(check("new-id", "new endpoint")).await?;
        assert_eq!(store.len().await, 2);
        Ok(())
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_untouched() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("checks.bin");
        let store = FileCheckStore::open(&path).await?;
        store.create(check("a", "http://a/")).await?;

        // a directory in place of the file makes every write fail
        std::fs::remove_file(&path)?;
        std::fs::create_dir(&path)?;

        let err = store.create(check("b", "http://b/")).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(matches!(store.delete("a").await, Err(StoreError::Io(_))));

        let (total, items) = store.list(1, PageSize::All).await;
        assert_eq!(total, 1);
        assert_eq!(items[0].id, "a");
        Ok(())
    }

    #[tokio::test]
    async fn reopen_round_trips_every_field() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("checks.bin");
        let full = Check {
            id: "full".into(),
            status: "Healthy".into(),
            code: 200,
            endpoint: "https://example.com/status".into(),
            checked: 1_700_000_000,
            duration: "12ms".into(),
        };
        {
            let store = FileCheckStore::open(&path).await?;
            store.create(full.clone()).await?;
            store.create(Check::default()).await?;
        }

        let reopened = FileCheckStore::open(&path).await?;
        assert_eq!(reopened.read("full").await?, full);
        assert_eq!(reopened.read("").await?, Check::default());
        Ok(())
    }

    #[tokio::test]
    async fn list_pages_in_insertion_order() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("checks.bin");
        let stubs = stub_checks(20);
        let store = seeded(&path, &stubs).await;

        let size = 5;
        for page in 1..=4 {
            let (total, items) = store.list(page, PageSize::Limit(size)).await;
            assert_eq!(total, stubs.len());
            assert_eq!(items, stubs[(page - 1) * size..page * size].to_vec());
        }
        Ok(())
    }

    #[tokio::test]
    async fn concatenated_pages_reproduce_collection() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("checks.bin");
        let stubs = stub_checks(23);
        let store = seeded(&path, &stubs).await;

        for size in [1usize, 3, 7, 10, 23, 50] {
            let pages = stubs.len().div_ceil(size);
            let mut all = Vec::new();
            for page in 1..=pages {
                let (_, items) = store.list(page, PageSize::Limit(size)).await;
                all.extend(items);
            }
            assert_eq!(all, stubs, "size {size}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn list_boundaries() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("checks.bin");
        let stubs = stub_checks(20);
        let store = seeded(&path, &stubs).await;

        let (total, items) = store.list(1, PageSize::All).await;
        assert_eq!(total, 20);
        assert_eq!(items, stubs);

        let (total, items) = store.list(100, PageSize::Limit(10)).await;
        assert_eq!(total, 20);
        assert!(items.is_empty());

        let (total, items) = store.list(2, PageSize::Limit(19)).await;
        assert_eq!(total, 20);
        assert_eq!(items, vec![stubs[19].clone()]);
        Ok(())
    }

    #[tokio::test]
    async fn create_list_delete_scenario() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let store = FileCheckStore::open(dir.path().join("checks.bin")).await?;

        let a = check("a", "http://x");
        store.create(a.clone()).await?;
        assert_eq!(store.list(1, PageSize::Limit(10)).await, (1, vec![a.clone()]));
        assert!(matches!(store.create(a).await, Err(StoreError::DuplicateId(_))));

        assert!(store.delete("a").await?);
        assert!(matches!(store.read("a").await, Err(StoreError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_persists_and_missing_id_is_noop() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("checks.bin");
        let store = seeded(&path, &stub_checks(3)).await;

        assert!(!store.delete("nope").await?);
        assert!(store.delete("1").await?);

        let reopened = FileCheckStore::open(&path).await?;
        let (_, items) = reopened.list(1, PageSize::All).await;
        let ids: Vec<_> = items.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["0", "2"]);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_lose_nothing() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("checks.bin");
        let store = FileCheckStore::open(&path).await?;

        let n = 64;
        let handles: Vec<_> = (0..n)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.create(check(&format!("id-{i}"), "http://x/")).await })
            })
            .collect();
        for h in handles {
            h.await??;
        }

        assert_eq!(store.len().await, n);
        let reopened = FileCheckStore::open(&path).await?;
        assert_eq!(reopened.len().await, n);
        Ok(())
    }

    #[tokio::test]
    async fn remove_store_file_tolerates_missing_file() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("checks.bin");
        remove_store_file(&path).await?;

        std::fs::write(&path, b"")?;
        remove_store_file(&path).await?;
        assert!(!path.exists());
        Ok(())
    }
}
