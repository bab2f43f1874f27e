use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use image::DynamicImage;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Placeholder capture time for files without usable EXIF data.
pub const TIME_UNKNOWN: &str = "Time unknown";

const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

pub fn image_size(img: &DynamicImage) -> String {
    format!("{} x {}", img.width(), img.height())
}

/// Read the capture time from a file's EXIF data, falling back to the
/// [`TIME_UNKNOWN`] sentinel. Never fails.
pub fn capture_time(path: &Path) -> String {
    read_capture_time(path).unwrap_or_else(|| TIME_UNKNOWN.to_string())
}

fn read_capture_time(path: &Path) -> Option<String> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = Reader::new().read_from_container(&mut reader).ok()?;

    let field = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .or_else(|| exif.get_field(Tag::DateTime, In::PRIMARY))?;
    normalize_datetime(&ascii_value(&field.value)?)
}

fn ascii_value(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(chunks) => chunks
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string()),
        _ => None,
    }
}

/// Validate an EXIF `YYYY:MM:DD HH:MM:SS` timestamp and re-emit it in
/// canonical form; `None` when it does not parse.
fn normalize_datetime(raw: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(raw, EXIF_DATETIME_FORMAT)
        .ok()
        .map(|dt| dt.format(EXIF_DATETIME_FORMAT).to_string())
}
