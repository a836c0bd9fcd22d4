//! Reading source images from and writing sketches to the filesystem.

use std::path::Path;

use crate::error::{Result, SketchError};
use crate::raster::Raster;

/// Decodes the image at `path` into an RGB source raster.
pub fn load_source(path: &Path) -> Result<image::RgbImage> {
    let reader = image::ImageReader::open(path).map_err(|source| SketchError::Io {
        path: path.to_owned(),
        source,
    })?;
    let reader = reader.with_guessed_format().map_err(|source| SketchError::Io {
        path: path.to_owned(),
        source,
    })?;
    let img = reader.decode().map_err(|source| SketchError::Image {
        path: path.to_owned(),
        source,
    })?;
    Ok(img.into_rgb8())
}

/// Encodes `raster` as a PNG at `path`, replacing any existing file.
pub fn persist_raster(raster: &Raster, path: &Path) -> Result<()> {
    image::save_buffer_with_format(
        path,
        raster.as_bytes(),
        raster.width(),
        raster.height(),
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|source| SketchError::Image {
        path: path.to_owned(),
        source,
    })
}
