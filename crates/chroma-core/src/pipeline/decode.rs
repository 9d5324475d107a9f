//! Image decoding with content-based format detection.

use std::error::Error;
use std::io::{self, Cursor, ErrorKind};

use image::{ImageError, ImageReader};

use crate::types::PixelGrid;

/// Result of decoding one response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A usable pixel grid
    Image(PixelGrid),
    /// Nothing came out of the body: it was empty or cut short. Fetching
    /// the same URL again may succeed.
    Empty,
    /// The body is not an image this decoder understands
    Invalid(String),
}

/// Turns a response body into pixels.
///
/// Called from the blocking thread pool, so implementations may do
/// CPU-heavy work.
pub trait Decode: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> DecodeOutcome;
}

/// Decoder backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl ImageDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decode for ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> DecodeOutcome {
        if bytes.is_empty() {
            return DecodeOutcome::Empty;
        }

        let reader = match ImageReader::new(Cursor::new(bytes)).with_guessed_format() {
            Ok(reader) => reader,
            Err(e) => return DecodeOutcome::Invalid(format!("Cannot detect image format: {e}")),
        };
        if reader.format().is_none() {
            return DecodeOutcome::Invalid("Unrecognized image format".to_string());
        }

        match reader.decode() {
            Ok(image) => DecodeOutcome::Image(PixelGrid::from_image(&image)),
            Err(e) if is_truncated(&e) => DecodeOutcome::Empty,
            Err(e) => DecodeOutcome::Invalid(e.to_string()),
        }
    }
}

/// Whether decoding failed because the body ended early.
///
/// Codecs disagree on how they report this: some surface an `UnexpectedEof`
/// I/O error, others (gif) a format error naming the end of file.
fn is_truncated(error: &ImageError) -> bool {
    let mut current: Option<&(dyn Error + 'static)> = Some(error);
    while let Some(e) = current {
        if e
            .downcast_ref::<io::Error>()
            .is_some_and(|io| io.kind() == ErrorKind::UnexpectedEof)
        {
            return true;
        }
        let message = e.to_string().to_ascii_lowercase();
        if message.contains("end of file") || message.contains("unexpected eof") {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn encode(image: &RgbImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, format).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let mut img = RgbImage::from_pixel(3, 2, Rgb([1, 2, 3]));
        img.put_pixel(2, 1, Rgb([0xFF, 0x00, 0x80]));

        match ImageDecoder::new().decode(&encode(&img, ImageFormat::Png)) {
            DecodeOutcome::Image(grid) => {
                assert_eq!((grid.width(), grid.height()), (3, 2));
                assert_eq!(grid.pixels()[0], 0x010203);
                assert_eq!(grid.pixels()[5], 0xFF0080);
            }
            other => panic!("expected an image, got {other:?}"),
        }
    }

    #[test]
    fn test_format_detected_by_content() {
        let img = RgbImage::from_pixel(4, 4, Rgb([9, 9, 9]));
        let outcome = ImageDecoder::new().decode(&encode(&img, ImageFormat::Bmp));
        assert!(matches!(outcome, DecodeOutcome::Image(_)));
    }

    #[test]
    fn test_empty_body_is_retryable() {
        assert_eq!(ImageDecoder::new().decode(&[]), DecodeOutcome::Empty);
    }

    fn truncated(format: ImageFormat) -> DecodeOutcome {
        let img = RgbImage::from_fn(64, 64, |x, y| {
            Rgb([(x * 4) as u8, (y * 4) as u8, (x ^ y) as u8])
        });
        let bytes = encode(&img, format);
        ImageDecoder::new().decode(&bytes[..bytes.len() / 2])
    }

    #[test]
    fn test_truncated_png_is_retryable() {
        assert_eq!(truncated(ImageFormat::Png), DecodeOutcome::Empty);
    }

    #[test]
    fn test_truncated_gif_is_retryable() {
        assert_eq!(truncated(ImageFormat::Gif), DecodeOutcome::Empty);
    }

    #[test]
    fn test_truncation_found_in_error_chain() {
        let eof = ImageError::IoError(io::Error::new(ErrorKind::UnexpectedEof, "short read"));
        assert!(is_truncated(&eof));

        let other = ImageError::IoError(io::Error::new(ErrorKind::PermissionDenied, "denied"));
        assert!(!is_truncated(&other));
    }

    #[test]
    fn test_non_image_is_invalid() {
        let outcome = ImageDecoder::new().decode(b"<html>not found</html>");
        assert!(matches!(outcome, DecodeOutcome::Invalid(_)));
    }
}
