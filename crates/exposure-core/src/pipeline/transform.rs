//! Aspect-aware downscaling and JPEG re-encoding.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::time::Instant;

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::types::{ImageAsset, TransformedImage};

use super::decode::ImageDecoder;

/// Longest edge, in pixels, an optimized image may have.
pub const TARGET_SIZE: u32 = 2500;

/// JPEG quality of every optimized image.
pub const JPEG_QUALITY: u8 = 85;

/// Bilinear resampling.
const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Decodes, downscales and re-encodes one photograph.
pub struct ImageTransformer {
    decoder: ImageDecoder,
}

impl ImageTransformer {
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            decoder: ImageDecoder::new(limits),
        }
    }

    /// Run the full transform on an asset's raw bytes.
    ///
    /// The image is always re-encoded at [`JPEG_QUALITY`], whether or not the
    /// resize policy changed its dimensions. A decode failure is fatal for
    /// the asset.
    pub fn transform(&self, asset: &ImageAsset) -> Result<TransformedImage, PipelineError> {
        let start = Instant::now();

        let decoded = self.decoder.decode(&asset.bytes, &asset.name)?;
        tracing::trace!("  Decode: {:?}", start.elapsed());

        let (width, height) = target_dimensions(decoded.width, decoded.height);
        let image = if (width, height) == (decoded.width, decoded.height) {
            decoded.image
        } else {
            let resize_start = Instant::now();
            let resized = decoded.image.resize_exact(width, height, RESIZE_FILTER);
            tracing::trace!(
                "  Resize {}x{} -> {}x{}: {:?}",
                decoded.width,
                decoded.height,
                width,
                height,
                resize_start.elapsed()
            );
            resized
        };

        let encode_start = Instant::now();
        let bytes = encode_jpeg(&image, &asset.name)?;
        tracing::trace!("  Encode: {:?}", encode_start.elapsed());

        Ok(TransformedImage {
            bytes,
            original_width: decoded.width,
            original_height: decoded.height,
            width,
            height,
            elapsed: start.elapsed(),
        })
    }
}

/// Output dimensions under the resize policy.
///
/// Landscape images wider than the target are scaled to the target width.
/// Otherwise images taller than the target are scaled to the target height;
/// this includes squares, because `width > height` is false for them.
/// Everything else keeps its size. Never upscales.
pub fn target_dimensions(width: u32, height: u32) -> (u32, u32) {
    if width > height && width > TARGET_SIZE {
        (TARGET_SIZE, scale_side(height, width))
    } else if height > TARGET_SIZE {
        (scale_side(width, height), TARGET_SIZE)
    } else {
        (width, height)
    }
}

/// Scale `side` by `TARGET_SIZE / long`, rounded to nearest, at least 1px.
fn scale_side(side: u32, long: u32) -> u32 {
    let long = u64::from(long);
    let scaled = (u64::from(side) * u64::from(TARGET_SIZE) + long / 2) / long;
    scaled.max(1) as u32
}

/// Encode a bitmap as a baseline JPEG at [`JPEG_QUALITY`].
///
/// Alpha is dropped; JPEG has no alpha channel.
pub fn encode_jpeg(image: &DynamicImage, name: &str) -> Result<Vec<u8>, PipelineError> {
    let rgb = image.to_rgb8();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| PipelineError::Encode {
            name: name.to_string(),
            message: e.to_string(),
        })?;
    Ok(buffer)
}
