use mime_guess::mime;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Raster formats the imaging backend decodes reliably; anything else is
/// skipped during discovery.
const SUPPORTED_SUBTYPES: &[&str] = &[
    "gif",
    "jpeg",
    "png",
    "tiff",
    "bmp",
    "x-ms-bmp",
    "x-portable-pixmap",
    "x-portable-bitmap",
];

/// Recursively walk `root`, yielding the absolute path of every image file.
///
/// The walk is recomputed from the filesystem on every call, so the iterator
/// is restartable by calling `discover` again.
pub fn discover(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_image(path))
        .map(|path| path.canonicalize().unwrap_or(path))
}

fn is_image(path: &Path) -> bool {
    match mime_guess::from_path(path).first() {
        Some(m) => m.type_() == mime::IMAGE && SUPPORTED_SUBTYPES.contains(&m.subtype().as_str()),
        None => false,
    }
}
