use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig};

/// Round a requested hash size up to the next power of two (0 maps to 1).
pub fn normalize_hash_size(requested: u32) -> u32 {
    requested.next_power_of_two()
}

/// Compute the rotation-invariant perceptual fingerprint of a decoded image.
///
/// A DCT-preprocessed mean hash (pHash) is taken at each of the four
/// right-angle rotations; the four base64 hash strings are sorted and
/// concatenated. Rotating the input by 0/90/180/270 degrees permutes the
/// four-member set but never changes it, so all orientations of the same
/// pixel content yield the same fingerprint.
pub fn fingerprint(img: &DynamicImage, hash_size: u32) -> String {
    let hash_size = normalize_hash_size(hash_size);
    let hasher = HasherConfig::new()
        .hash_alg(HashAlg::Mean)
        .preproc_dct()
        .hash_size(hash_size, hash_size)
        .to_hasher();

    let mut hashes = vec![hasher.hash_image(img).to_base64()];
    for rotated in [img.rotate90(), img.rotate180(), img.rotate270()] {
        hashes.push(hasher.hash_image(&rotated).to_base64());
    }
    hashes.sort();
    hashes.concat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    /// An asymmetric test image so the four rotations hash differently.
    fn sample_image() -> DynamicImage {
        let buf = RgbImage::from_fn(64, 48, |x, y| {
            image::Rgb([(x * 4) as u8, (y * 5) as u8, ((x * y) % 251) as u8])
        });
        DynamicImage::ImageRgb8(buf)
    }

    #[test]
    fn normalizes_to_next_power_of_two() {
        assert_eq!(normalize_hash_size(0), 1);
        assert_eq!(normalize_hash_size(5), 8);
        assert_eq!(normalize_hash_size(8), 8);
        assert_eq!(normalize_hash_size(9), 16);
    }

    #[test]
    fn fingerprint_is_rotation_invariant() {
        let img = sample_image();
        let base = fingerprint(&img, 8);
        assert_eq!(base, fingerprint(&img.rotate90(), 8));
        assert_eq!(base, fingerprint(&img.rotate180(), 8));
        assert_eq!(base, fingerprint(&img.rotate270(), 8));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let img = sample_image();
        assert_eq!(fingerprint(&img, 8), fingerprint(&img, 8));
    }

    #[test]
    fn requested_size_is_normalized_before_hashing() {
        let img = sample_image();
        assert_eq!(fingerprint(&img, 5), fingerprint(&img, 8));
    }
}
