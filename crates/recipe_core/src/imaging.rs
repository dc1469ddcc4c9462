//! Image normalization for uploads.

use crate::config::ImageConfig;
use crate::error::{RecipeError, Result};
use chrono::{DateTime, Local, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, GenericImageView, ImageEncoder};

/// Decodes any supported raster format and re-encodes it as JPEG.
///
/// Images whose longest edge exceeds `max_edge` are downscaled
/// proportionally; smaller images keep their size. Alpha and palette
/// images are flattened to RGB.
pub fn transform_image(bytes: &[u8], config: &ImageConfig) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| RecipeError::Image(format!("cannot decode image: {}", e)))?;

    let (width, height) = img.dimensions();
    let img = if width.max(height) > config.max_edge {
        img.resize(config.max_edge, config.max_edge, FilterType::Lanczos3)
    } else {
        img
    };

    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, config.quality)
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| RecipeError::Image(format!("cannot encode JPEG: {}", e)))?;

    tracing::debug!(
        width,
        height,
        out_width = rgb.width(),
        out_height = rgb.height(),
        bytes = out.len(),
        "image transformed"
    );
    Ok(out)
}

const IMAGE_NAME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Formats unix seconds as the `YYYYMMDDHHMMSS` image name, in UTC or in
/// the machine's local time zone.
pub fn image_timestamp(unix_secs: i64, local_time: bool) -> Result<String> {
    let time: DateTime<Utc> = DateTime::from_timestamp(unix_secs, 0).ok_or_else(|| {
        RecipeError::Validation(format!("timestamp {} is out of range", unix_secs))
    })?;
    let name = if local_time {
        time.with_timezone(&Local).format(IMAGE_NAME_FORMAT).to_string()
    } else {
        time.format(IMAGE_NAME_FORMAT).to_string()
    };
    Ok(name)
}
