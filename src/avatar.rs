//! Avatar upload checks and image normalization.

use std::io::Cursor;

use image::imageops::FilterType;
use image::ImageFormat;

use crate::error::AppError;

/// Largest accepted upload, in bytes.
pub const MAX_AVATAR_BYTES: usize = 1_000_000;

const ALLOWED_EXTENSIONS: [&str; 3] = ["jpeg", "jpg", "png"];

/// Turns an uploaded image into the bytes that get stored.
pub trait AvatarProcessor: Send + Sync {
    fn process(&self, bytes: &[u8]) -> Result<Vec<u8>, AppError>;
}

/// Crops and resizes to a square and re-encodes as PNG.
#[derive(Debug, Clone, Copy)]
pub struct ImageAvatarProcessor {
    size: u32,
}

impl Default for ImageAvatarProcessor {
    fn default() -> Self {
        Self { size: 250 }
    }
}

impl ImageAvatarProcessor {
    pub fn new(size: u32) -> Self {
        Self { size }
    }
}

impl AvatarProcessor for ImageAvatarProcessor {
    fn process(&self, bytes: &[u8]) -> Result<Vec<u8>, AppError> {
        let image = image::load_from_memory(bytes)?;
        let resized = image.resize_to_fill(self.size, self.size, FilterType::Lanczos3);

        let mut png = Vec::new();
        resized.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    }
}

/// Accepts only `.jpeg`, `.jpg` and `.png` file names.
pub fn check_file_name(file_name: &str) -> Result<(), AppError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(AppError::BadRequest("Please upload a valid image".into())),
    }
}

pub fn check_size(len: usize) -> Result<(), AppError> {
    if len > MAX_AVATAR_BYTES {
        return Err(AppError::BadRequest("File too large".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Rgb};

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_pixel(width, height, Rgb([200u8, 40, 90]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(buffer)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .unwrap();
        bytes
    }

    #[test]
    fn test_process_resizes_to_png_square() {
        let png = ImageAvatarProcessor::default().process(&jpeg(640, 480)).unwrap();

        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (250, 250));
    }

    #[test]
    fn test_process_rejects_garbage() {
        let result = ImageAvatarProcessor::new(64).process(b"definitely not an image");
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_check_file_name() {
        for ok in ["me.jpg", "me.jpeg", "me.png", "ME.PNG", "holiday.photo.jpg"] {
            assert!(check_file_name(ok).is_ok(), "{} should be accepted", ok);
        }
        for bad in ["me.gif", "me.pdf", "jpg", "me.jpg.exe", ""] {
            assert!(check_file_name(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_check_size() {
        assert!(check_size(MAX_AVATAR_BYTES).is_ok());
        assert!(check_size(MAX_AVATAR_BYTES + 1).is_err());
    }
}
