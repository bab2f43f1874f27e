use crate::store::{DuplicateCluster, FingerprintStore};
use log::{info, warn};
use std::fs;
use std::io;
use std::path::Path;

/// Aggregate outcome of a disposal run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DisposalReport {
    pub deleted: usize,
    pub attempted: usize,
}

/// Move every redundant cluster member to `trash` and drop its store entry.
///
/// The first member of each cluster is the keeper and is never touched.
/// Member failures are counted, never propagated.
pub fn delete_duplicates(
    clusters: &[DuplicateCluster],
    store: &dyn FingerprintStore,
    trash: &Path,
) -> DisposalReport {
    let mut report = DisposalReport::default();
    for cluster in clusters {
        for member in cluster.redundant() {
            report.attempted += 1;
            if delete_picture(&member.identity, store, trash) {
                report.deleted += 1;
            }
        }
    }
    info!("Deleted {}/{} files", report.deleted, report.attempted);
    report
}

/// Move one file into `trash` and remove its store entry.
///
/// Fail-soft: a missing source file or any filesystem error leaves the
/// store entry in place for manual reconciliation and returns `false`.
pub fn delete_picture(identity: &Path, store: &dyn FingerprintStore, trash: &Path) -> bool {
    info!("Moving {} to {}", identity.display(), trash.display());

    if let Err(err) = fs::create_dir_all(trash) {
        warn!("Cannot create trash {}: {}", trash.display(), err);
        return false;
    }

    if !identity.exists() {
        warn!("File not found {}", identity.display());
        return false;
    }

    let file_name = match identity.file_name() {
        Some(name) => name,
        None => {
            warn!("Not a file path: {}", identity.display());
            return false;
        }
    };

    match move_file(identity, &trash.join(file_name)) {
        Ok(()) => match store.remove(identity) {
            Ok(()) => true,
            Err(err) => {
                warn!("Moved {} but failed to drop its entry: {}", identity.display(), err);
                false
            }
        },
        Err(err) => {
            warn!("Error moving {}: {}", identity.display(), err);
            false
        }
    }
}

/// Rename, falling back to copy + delete when the trash lives on another
/// filesystem.
fn move_file(src: &Path, dest: &Path) -> io::Result<()> {
    if fs::rename(src, dest).is_ok() {
        return Ok(());
    }
    fs::copy(src, dest)?;
    fs::remove_file(src)
}
