use crate::source::{RasterSource, Rgb};

/// An immutable RGBA8 snapshot of a canvas, row-major with straight (non-premultiplied) alpha.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Raster {
    /// Converts premultiplied `0xAARRGGBB` words, as stored by a `raqote::DrawTarget`.
    pub(crate) fn from_premultiplied_argb(width: u32, height: u32, words: &[u32]) -> Self {
        let mut data = Vec::with_capacity(words.len() * 4);
        for &word in words {
            let [b, g, r, a] = word.to_le_bytes();
            data.extend_from_slice(&unpremultiply([r, g, b], a));
        }
        Raster {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, four per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.data
            .chunks_exact(4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }
}

/// A materialized sketch can itself be painted from.
impl RasterSource for Raster {
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
    fn color_at(&self, x: u32, y: u32) -> Option<Rgb> {
        let [r, g, b, _] = self.pixel(x, y)?;
        Some(Rgb { r, g, b })
    }
}

fn unpremultiply(rgb: [u8; 3], a: u8) -> [u8; 4] {
    match a {
        0 => [0, 0, 0, 0],
        255 => [rgb[0], rgb[1], rgb[2], 255],
        _ => {
            let un = |c: u8| ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8;
            [un(rgb[0]), un(rgb[1]), un(rgb[2]), a]
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_premultiplied_argb() {
        let words = [0xff102030, 0x00000000, 0x80402000];
        let raster = Raster::from_premultiplied_argb(3, 1, &words);
        assert_eq!(raster.pixel(0, 0), Some([0x10, 0x20, 0x30, 0xff]));
        assert_eq!(raster.pixel(1, 0), Some([0, 0, 0, 0]));
        assert_eq!(raster.pixel(2, 0), Some([0x80, 0x40, 0x00, 0x80]));
        assert_eq!(raster.pixel(3, 0), None);
        assert_eq!(raster.pixel(0, 1), None);
    }

    #[test]
    fn test_raster_is_a_source() {
        let raster = Raster::from_premultiplied_argb(1, 2, &[0xff000000, 0xffabcdef]);
        assert_eq!(raster.color_at(0, 1), Some(Rgb::new(0xab, 0xcd, 0xef)));
        assert_eq!(raster.color_at(1, 1), None);
        assert_eq!(raster.pixels().count(), 2);
    }
}
