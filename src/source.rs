//! Read-only color lookup over the image a sketch is painted from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An opaque 8-bit color.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Average of the three channels, rounded down.
    pub fn brightness(self) -> u8 {
        ((u16::from(self.r) + u16::from(self.g) + u16::from(self.b)) / 3) as u8
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseRgbError(String);

impl fmt::Display for ParseRgbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected a color like `#1a2b3c`, got `{}`", self.0)
    }
}

impl std::error::Error for ParseRgbError {}

impl FromStr for Rgb {
    type Err = ParseRgbError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        let mut bytes = [0u8; 3];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| ParseRgbError(s.into()))?;
        let [r, g, b] = bytes;
        Ok(Rgb { r, g, b })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", hex::encode([self.r, self.g, self.b]))
    }
}

/// A fixed-size grid of colors that a sketch samples from.
///
/// `color_at` must answer for every `x < width()` and `y < height()`; anything outside those
/// bounds yields `None`.
pub trait RasterSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn color_at(&self, x: u32, y: u32) -> Option<Rgb>;
}

impl RasterSource for image::RgbImage {
    fn width(&self) -> u32 {
        image::ImageBuffer::width(self)
    }
    fn height(&self) -> u32 {
        image::ImageBuffer::height(self)
    }
    fn color_at(&self, x: u32, y: u32) -> Option<Rgb> {
        let image::Rgb([r, g, b]) = *self.get_pixel_checked(x, y)?;
        Some(Rgb { r, g, b })
    }
}

impl RasterSource for image::RgbaImage {
    fn width(&self) -> u32 {
        image::ImageBuffer::width(self)
    }
    fn height(&self) -> u32 {
        image::ImageBuffer::height(self)
    }
    fn color_at(&self, x: u32, y: u32) -> Option<Rgb> {
        // Alpha is ignored: only the color of the sampled pixel matters for a stroke.
        let image::Rgba([r, g, b, _]) = *self.get_pixel_checked(x, y)?;
        Some(Rgb { r, g, b })
    }
}

impl<S: RasterSource + ?Sized> RasterSource for &S {
    fn width(&self) -> u32 {
        (**self).width()
    }
    fn height(&self) -> u32 {
        (**self).height()
    }
    fn color_at(&self, x: u32, y: u32) -> Option<Rgb> {
        (**self).color_at(x, y)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_rgb() {
        assert_eq!("#102030".parse(), Ok(Rgb::new(0x10, 0x20, 0x30)));
        assert_eq!("ffFF00".parse(), Ok(Rgb::new(255, 255, 0)));
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#gg0000".parse::<Rgb>().is_err());
        assert!("#00000000".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let c = Rgb::new(1, 171, 255);
        assert_eq!(c.to_string(), "#01abff");
        assert_eq!(c.to_string().parse(), Ok(c));
    }

    #[test]
    fn test_brightness() {
        assert_eq!(Rgb::BLACK.brightness(), 0);
        assert_eq!(Rgb::WHITE.brightness(), 255);
        assert_eq!(Rgb::new(255, 128, 0).brightness(), 127);
        assert_eq!(Rgb::new(128, 128, 128).brightness(), 128);
    }

    #[test]
    fn test_image_source_lookup() {
        let img = image::RgbImage::from_fn(3, 2, |x, y| image::Rgb([x as u8, y as u8, 9]));
        assert_eq!(RasterSource::width(&img), 3);
        assert_eq!(RasterSource::height(&img), 2);
        assert_eq!(img.color_at(2, 1), Some(Rgb::new(2, 1, 9)));
        assert_eq!(img.color_at(3, 0), None);
        assert_eq!(img.color_at(0, 2), None);
    }
}
