use crate::fingerprint;
use crate::metadata;
use crate::store::NewRecord;
use anyhow::{Context, Result};
use image::ImageReader;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Hash `files` on a fixed pool of `parallelism` workers.
///
/// Each worker independently decodes one file, computes the four-rotation
/// fingerprint and the plain metadata, and returns a [`NewRecord`]. Files
/// that fail to decode are logged and dropped; a bad file never aborts the
/// batch. Completion order is unspecified.
pub fn hash_files(
    files: Vec<PathBuf>,
    hash_size: u32,
    parallelism: usize,
) -> Result<Vec<NewRecord>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallelism)
        .build()
        .context("Failed to build hashing worker pool")?;

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(ProgressStyle::with_template(
        "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    )?);
    progress.set_message("hashing");

    let records = pool.install(|| {
        files
            .par_iter()
            .filter_map(|path| {
                let result = match hash_file(path, hash_size) {
                    Ok(record) => {
                        debug!("Hashed {}", path.display());
                        Some(record)
                    }
                    Err(err) => {
                        warn!("Unable to open {}: {:#}", path.display(), err);
                        None
                    }
                };
                progress.inc(1);
                result
            })
            .collect()
    });
    progress.finish_and_clear();

    Ok(records)
}

/// Decode and fingerprint a single file.
pub fn hash_file(path: &Path, hash_size: u32) -> Result<NewRecord> {
    let img = ImageReader::open(path)
        .with_context(|| format!("Failed to open {:?}", path))?
        .decode()
        .with_context(|| format!("Failed to decode {:?}", path))?;

    Ok(NewRecord {
        identity: path.to_path_buf(),
        fingerprint: fingerprint::fingerprint(&img, hash_size),
        file_size: metadata::file_size(path),
        image_size: metadata::image_size(&img),
        capture_time: metadata::capture_time(path),
    })
}
