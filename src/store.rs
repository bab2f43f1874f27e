use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("already indexed: {0}")]
    DuplicateKey(PathBuf),

    #[error("storage error: {0}")]
    Backend(#[from] sled::Error),

    #[error("record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// One indexed file. Records are insert-only: once written they are never
/// mutated, only removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Absolute file path, the unique store key.
    pub identity: PathBuf,
    pub fingerprint: String,
    pub file_size: u64,
    pub image_size: String,
    pub capture_time: String,
    /// Monotonic insertion sequence assigned by the store. The member with
    /// the lowest `seq` in a cluster is the keeper during disposal.
    pub seq: u64,
}

/// A record as produced by the hashing pipeline, before the store assigns
/// its insertion sequence.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub identity: PathBuf,
    pub fingerprint: String,
    pub file_size: u64,
    pub image_size: String,
    pub capture_time: String,
}

impl NewRecord {
    fn into_record(self, seq: u64) -> ImageRecord {
        ImageRecord {
            identity: self.identity,
            fingerprint: self.fingerprint,
            file_size: self.file_size,
            image_size: self.image_size,
            capture_time: self.capture_time,
            seq,
        }
    }
}

/// A group of records sharing one fingerprint. Derived on every query,
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateCluster {
    pub fingerprint: String,
    /// Ordered by ascending insertion sequence; the first member is the
    /// keeper.
    pub members: Vec<ImageRecord>,
}

impl DuplicateCluster {
    pub fn count(&self) -> usize {
        self.members.len()
    }

    pub fn keeper(&self) -> &ImageRecord {
        &self.members[0]
    }

    /// Every member except the keeper.
    pub fn redundant(&self) -> &[ImageRecord] {
        &self.members[1..]
    }
}

/// Capability interface over the fingerprint store. Any key-value backend
/// with per-key atomic insert/delete can implement it.
pub trait FingerprintStore {
    fn exists(&self, identity: &Path) -> Result<bool, StoreError>;

    /// Insert-only upsert: fails with [`StoreError::DuplicateKey`] when the
    /// identity is already present.
    fn upsert_new(&self, record: NewRecord) -> Result<(), StoreError>;

    /// Idempotent; removing an absent identity is a no-op.
    fn remove(&self, identity: &Path) -> Result<(), StoreError>;

    fn all(&self) -> Result<Vec<ImageRecord>, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;

    /// Destroys all records unconditionally.
    fn clear(&self) -> Result<(), StoreError>;

    /// Group records by fingerprint, keeping only groups with more than one
    /// member. Members are ordered by ascending insertion sequence and
    /// clusters by their keeper's sequence.
    fn group_by_fingerprint(&self) -> Result<Vec<DuplicateCluster>, StoreError> {
        let mut by_fingerprint: HashMap<String, Vec<ImageRecord>> = HashMap::new();
        for record in self.all()? {
            by_fingerprint
                .entry(record.fingerprint.clone())
                .or_default()
                .push(record);
        }

        let mut clusters: Vec<DuplicateCluster> = by_fingerprint
            .into_iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|(fingerprint, mut members)| {
                members.sort_by_key(|r| r.seq);
                DuplicateCluster {
                    fingerprint,
                    members,
                }
            })
            .collect();
        clusters.sort_by_key(|c| c.members[0].seq);
        Ok(clusters)
    }
}

/// Persistent store backed by an embedded sled database. One json-encoded
/// record per key; the insertion sequence comes from sled's monotonic ID
/// generator.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    fn key(identity: &Path) -> Vec<u8> {
        identity.to_string_lossy().into_owned().into_bytes()
    }
}

impl FingerprintStore for SledStore {
    fn exists(&self, identity: &Path) -> Result<bool, StoreError> {
        Ok(self.db.contains_key(Self::key(identity))?)
    }

    fn upsert_new(&self, record: NewRecord) -> Result<(), StoreError> {
        let key = Self::key(&record.identity);
        let identity = record.identity.clone();
        let seq = self.db.generate_id()?;
        let encoded = serde_json::to_vec(&record.into_record(seq))?;

        // compare_and_swap against None makes the insert-only contract
        // atomic at the storage layer.
        self.db
            .compare_and_swap(key, None as Option<&[u8]>, Some(encoded))?
            .map_err(|_| StoreError::DuplicateKey(identity))
    }

    fn remove(&self, identity: &Path) -> Result<(), StoreError> {
        self.db.remove(Self::key(identity))?;
        Ok(())
    }

    fn all(&self) -> Result<Vec<ImageRecord>, StoreError> {
        let mut records = Vec::new();
        for entry in self.db.iter() {
            let (_, value) = entry?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.db.len())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.db.clear()?;
        self.db.flush()?;
        Ok(())
    }
}

/// In-memory store with the same semantics, used in tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    records: HashMap<PathBuf, ImageRecord>,
    next_seq: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FingerprintStore for MemoryStore {
    fn exists(&self, identity: &Path) -> Result<bool, StoreError> {
        Ok(self.inner.lock().unwrap().records.contains_key(identity))
    }

    fn upsert_new(&self, record: NewRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.records.contains_key(&record.identity) {
            return Err(StoreError::DuplicateKey(record.identity));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let record = record.into_record(seq);
        inner.records.insert(record.identity.clone(), record);
        Ok(())
    }

    fn remove(&self, identity: &Path) -> Result<(), StoreError> {
        self.inner.lock().unwrap().records.remove(identity);
        Ok(())
    }

    fn all(&self) -> Result<Vec<ImageRecord>, StoreError> {
        let mut records: Vec<ImageRecord> =
            self.inner.lock().unwrap().records.values().cloned().collect();
        records.sort_by_key(|r| r.seq);
        Ok(records)
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.lock().unwrap().records.len())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.inner.lock().unwrap().records.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(identity: &str, fingerprint: &str) -> NewRecord {
        NewRecord {
            identity: PathBuf::from(identity),
            fingerprint: fingerprint.to_string(),
            file_size: 100,
            image_size: "64 x 64".to_string(),
            capture_time: "Time unknown".to_string(),
        }
    }

    fn exercise_store(store: &dyn FingerprintStore) {
        let a = Path::new("/pics/a.png");

        assert!(!store.exists(a).unwrap());
        store.upsert_new(record("/pics/a.png", "ABCD")).unwrap();
        assert!(store.exists(a).unwrap());
        assert_eq!(store.count().unwrap(), 1);

        // Re-inserting the same identity must signal a duplicate key.
        let err = store.upsert_new(record("/pics/a.png", "ABCD")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(p) if p == a));
        assert_eq!(store.count().unwrap(), 1);

        store.upsert_new(record("/pics/b.png", "ABCD")).unwrap();
        store.upsert_new(record("/pics/c.png", "WXYZ")).unwrap();

        let clusters = store.group_by_fingerprint().unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].fingerprint, "ABCD");
        assert_eq!(clusters[0].count(), 2);
        assert_eq!(clusters[0].keeper().identity, a);
        assert_eq!(
            clusters[0].redundant()[0].identity,
            Path::new("/pics/b.png")
        );

        // Removal is idempotent.
        store.remove(Path::new("/pics/b.png")).unwrap();
        store.remove(Path::new("/pics/b.png")).unwrap();
        assert_eq!(store.count().unwrap(), 2);
        assert!(store.group_by_fingerprint().unwrap().is_empty());

        store.clear().unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn memory_store_semantics() {
        exercise_store(&MemoryStore::new());
    }

    #[test]
    fn sled_store_semantics() {
        let dir = TempDir::new().unwrap();
        let store = SledStore::open(&dir.path().join("db")).unwrap();
        exercise_store(&store);
    }

    #[test]
    fn sled_store_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db");
        {
            let store = SledStore::open(&path).unwrap();
            store.upsert_new(record("/pics/a.png", "ABCD")).unwrap();
        }
        let store = SledStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert!(store.exists(Path::new("/pics/a.png")).unwrap());
    }

    #[test]
    fn insertion_order_survives_grouping() {
        let store = MemoryStore::new();
        for name in ["/pics/1.png", "/pics/2.png", "/pics/3.png"] {
            store.upsert_new(record(name, "SAME")).unwrap();
        }
        let clusters = store.group_by_fingerprint().unwrap();
        let order: Vec<_> = clusters[0]
            .members
            .iter()
            .map(|r| r.identity.clone())
            .collect();
        assert_eq!(
            order,
            [
                PathBuf::from("/pics/1.png"),
                PathBuf::from("/pics/2.png"),
                PathBuf::from("/pics/3.png")
            ]
        );
    }
}
