use crate::config::Settings;
use crate::discovery;
use crate::pipeline;
use crate::store::{FingerprintStore, StoreError};
use anyhow::Result;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Discover, hash, and index every new image under `paths`.
///
/// Files already present in the store are skipped, which makes re-running
/// `add` over the same roots idempotent and safe to resume after a crash:
/// there is no cross-file atomicity, so an interrupted run leaves exactly
/// the successfully hashed files behind. Returns the number of records
/// added.
pub fn add(paths: &[PathBuf], store: &dyn FingerprintStore, settings: &Settings) -> Result<usize> {
    let mut added = 0;
    for path in paths {
        info!("Hashing {}", path.display());

        let new_files = new_image_files(path, store)?;
        let records = pipeline::hash_files(new_files, settings.hash_size, settings.parallelism)?;

        for record in records {
            match store.upsert_new(record) {
                Ok(()) => added += 1,
                // Lost the race against a concurrent add; the record that
                // got there first stands.
                Err(StoreError::DuplicateKey(identity)) => {
                    warn!("Duplicate key: {}", identity.display());
                }
                Err(err) => return Err(err.into()),
            }
        }

        info!("...done");
    }
    Ok(added)
}

/// Drop store entries for every image under `paths`. Only metadata is
/// touched; the files themselves stay on disk. Returns the number of
/// entries removed.
pub fn remove(paths: &[PathBuf], store: &dyn FingerprintStore) -> Result<usize> {
    let mut removed = 0;
    for path in paths {
        for file in discovery::discover(path) {
            if store.exists(&file)? {
                store.remove(&file)?;
                removed += 1;
            }
        }
    }
    Ok(removed)
}

fn new_image_files(root: &Path, store: &dyn FingerprintStore) -> Result<Vec<PathBuf>> {
    let mut fresh = Vec::new();
    for file in discovery::discover(root) {
        if store.exists(&file)? {
            info!("Already hashed {}", file.display());
        } else {
            fresh.push(file);
        }
    }
    Ok(fresh)
}
