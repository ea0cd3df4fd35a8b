//! JPEG decoding with dimension limits.

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, Limits};
use std::io::Cursor;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Image decoder with configurable limits.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded bitmap
    pub image: DynamicImage,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode JPEG bytes into a bitmap.
    ///
    /// The frame header is read first so an oversized image is rejected
    /// before any pixel buffer is allocated. CPU-bound; callers on an async
    /// runtime should run this inside `spawn_blocking`.
    pub fn decode(&self, bytes: &[u8], name: &str) -> Result<DecodedImage, PipelineError> {
        let (width, height) = ImageReader::with_format(Cursor::new(bytes), ImageFormat::Jpeg)
            .into_dimensions()
            .map_err(|e| decode_error(name, e))?;
        self.check_dimensions(width, height, name)?;

        let mut reader = ImageReader::with_format(Cursor::new(bytes), ImageFormat::Jpeg);
        reader.limits(self.reader_limits());
        let image = reader.decode().map_err(|e| decode_error(name, e))?;

        let (width, height) = image.dimensions();
        self.check_dimensions(width, height, name)?;

        Ok(DecodedImage {
            image,
            width,
            height,
        })
    }

    fn check_dimensions(&self, width: u32, height: u32, name: &str) -> Result<(), PipelineError> {
        let max_dim = self.limits.max_image_dimension;
        if width > max_dim || height > max_dim {
            return Err(PipelineError::ImageTooLarge {
                name: name.to_string(),
                width,
                height,
                max_dim,
            });
        }
        Ok(())
    }

    fn reader_limits(&self) -> Limits {
        let mut limits = Limits::default();
        limits.max_image_width = Some(self.limits.max_image_dimension);
        limits.max_image_height = Some(self.limits.max_image_dimension);
        limits
    }
}

fn decode_error(name: &str, e: image::ImageError) -> PipelineError {
    PipelineError::Decode {
        name: name.to_string(),
        message: e.to_string(),
    }
}
