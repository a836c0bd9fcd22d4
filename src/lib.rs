//! Painterly rendering of a source image out of randomized polygon strokes.
//!
//! A [`Sketch`] repeatedly samples a color from its source, maps the sample into destination
//! space with a little jitter, and paints a polygon of that color. Strokes start large and
//! transparent and shrink and harden over the run, so the picture sharpens from coarse to fine.
//! Once strokes fall below a size threshold they switch to black and white accents.

pub mod canvas;
mod clip;
pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod mapper;
pub mod math;
pub mod rand;
pub mod raster;
pub mod source;
pub mod stroke;

pub use config::SketchConfig;
pub use engine::Sketch;
pub use error::{Result, SketchError};
pub use raster::Raster;
pub use source::{RasterSource, Rgb};
