use crate::metadata::TIME_UNKNOWN;
use crate::store::{DuplicateCluster, FingerprintStore, StoreError};

/// Resolve duplicate clusters from the store.
///
/// With `match_time`, clusters whose members disagree on capture time are
/// dropped — unless any member's capture time is unknown. An unreadable
/// timestamp must not break up a cluster that already fingerprint-matched,
/// so ambiguity resolves toward keeping the cluster.
pub fn find(
    store: &dyn FingerprintStore,
    match_time: bool,
) -> Result<Vec<DuplicateCluster>, StoreError> {
    let clusters = store.group_by_fingerprint()?;
    if !match_time {
        return Ok(clusters);
    }
    Ok(clusters.into_iter().filter(same_capture_time).collect())
}

fn same_capture_time(cluster: &DuplicateCluster) -> bool {
    if cluster
        .members
        .iter()
        .any(|m| m.capture_time == TIME_UNKNOWN)
    {
        return true;
    }
    let first = &cluster.members[0].capture_time;
    cluster.members.iter().all(|m| &m.capture_time == first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FingerprintStore, MemoryStore, NewRecord};
    use std::path::{Path, PathBuf};

    fn insert(store: &MemoryStore, identity: &str, fingerprint: &str, capture_time: &str) {
        store
            .upsert_new(NewRecord {
                identity: PathBuf::from(identity),
                fingerprint: fingerprint.to_string(),
                file_size: 1,
                image_size: "8 x 8".to_string(),
                capture_time: capture_time.to_string(),
            })
            .unwrap();
    }

    #[test]
    fn clusters_only_real_collisions() {
        let store = MemoryStore::new();
        insert(&store, "/pics/a.png", "ABCD", TIME_UNKNOWN);
        insert(&store, "/pics/b.png", "ABCD", TIME_UNKNOWN);
        insert(&store, "/pics/c.png", "WXYZ", TIME_UNKNOWN);

        let clusters = find(&store, false).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].count(), 2);
        let ids: Vec<_> = clusters[0].members.iter().map(|m| &m.identity).collect();
        assert_eq!(ids, [Path::new("/pics/a.png"), Path::new("/pics/b.png")]);
    }

    #[test]
    fn unknown_time_keeps_the_cluster() {
        let store = MemoryStore::new();
        insert(&store, "/pics/a.png", "ABCD", "2020:01:01 00:00:00");
        insert(&store, "/pics/b.png", "ABCD", TIME_UNKNOWN);

        assert_eq!(find(&store, true).unwrap().len(), 1);
    }

    #[test]
    fn conflicting_times_drop_the_cluster() {
        let store = MemoryStore::new();
        insert(&store, "/pics/a.png", "ABCD", "2020:01:01 00:00:00");
        insert(&store, "/pics/b.png", "ABCD", "2021:01:01 00:00:00");

        assert!(find(&store, true).unwrap().is_empty());
        // Without the time constraint the cluster is still there.
        assert_eq!(find(&store, false).unwrap().len(), 1);
    }

    #[test]
    fn agreeing_times_keep_the_cluster() {
        let store = MemoryStore::new();
        insert(&store, "/pics/a.png", "ABCD", "2020:01:01 00:00:00");
        insert(&store, "/pics/b.png", "ABCD", "2020:01:01 00:00:00");

        assert_eq!(find(&store, true).unwrap().len(), 1);
    }

    #[test]
    fn empty_store_finds_nothing() {
        let store = MemoryStore::new();
        assert!(find(&store, false).unwrap().is_empty());
        assert!(find(&store, true).unwrap().is_empty());
    }
}
