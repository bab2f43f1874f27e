use std::path::PathBuf;

pub const DEFAULT_HASH_SIZE: u32 = 8;
pub const DEFAULT_TRASH: &str = "./Trash";

/// Run configuration, threaded explicitly into the indexer and disposal
/// engine rather than living in process-global state.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Perceptual hash size, always a power of two.
    pub hash_size: u32,
    /// Number of hashing workers.
    pub parallelism: usize,
    /// Where disposed files are moved.
    pub trash_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hash_size: DEFAULT_HASH_SIZE,
            parallelism: num_cpus::get(),
            trash_path: PathBuf::from(DEFAULT_TRASH),
        }
    }
}
