//! Palette reduction for GIF output
//!
//! Flattening and quantizing are pure functions of the frame, the background
//! color and the quantizer speed. Every frame gets its own adaptive palette.

use crate::{Error, Result};
use image::{DynamicImage, Rgb, RgbImage, RgbaImage};

/// A palette-indexed frame without transparency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteFrame {
    width: u16,
    height: u16,
    /// RGB triplets, at most 256 entries
    palette: Vec<u8>,
    /// One palette index per pixel, row-major
    indices: Vec<u8>,
}

impl PaletteFrame {
    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn palette(&self) -> &[u8] {
        &self.palette
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Number of colors in the palette
    pub fn color_count(&self) -> usize {
        self.palette.len() / 3
    }

    /// Expands the indices back into an RGB image
    pub fn to_rgb(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let index = self.indices[(y as usize) * (self.width as usize) + x as usize] as usize;
            let entry = self.palette.get(index * 3..index * 3 + 3).unwrap_or(&[0, 0, 0]);
            Rgb([entry[0], entry[1], entry[2]])
        })
    }
}

/// Pastes `image` onto an opaque `background`, using its alpha as the mask
///
/// Alpha 0 yields the background, alpha 255 keeps the pixel exactly.
pub fn flatten(image: &RgbaImage, background: [u8; 3]) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let px = image.get_pixel(x, y);
        let alpha = px[3] as u32;
        let mut out = [0u8; 3];
        for c in 0..3 {
            out[c] = ((px[c] as u32 * alpha + background[c] as u32 * (255 - alpha) + 127) / 255) as u8;
        }
        Rgb(out)
    })
}

/// Reduces a frame to an adaptive palette
///
/// Frames with alpha are flattened against `background` first; frames without
/// alpha are quantized as they are.
pub fn reduce(image: &DynamicImage, background: [u8; 3], speed: i32) -> Result<PaletteFrame> {
    if !(1..=30).contains(&speed) {
        return Err(Error::InvalidSpeed(speed));
    }

    let rgb = if image.color().has_alpha() {
        flatten(&image.to_rgba8(), background)
    } else {
        image.to_rgb8()
    };

    let (width, height) = rgb.dimensions();
    let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(Error::FrameTooLarge { width, height });
    };

    let frame = gif::Frame::from_rgb_speed(w, h, rgb.as_raw(), speed);
    Ok(PaletteFrame {
        width: w,
        height: h,
        palette: frame.palette.unwrap_or_default(),
        indices: frame.buffer.into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const WHITE: [u8; 3] = [255, 255, 255];

    #[test]
    fn test_flatten_pixel_table() {
        let cases = [
            ([0, 0, 0, 0], [255, 255, 255]),
            ([0, 0, 0, 255], [0, 0, 0]),
            ([0, 0, 0, 128], [127, 127, 127]),
            ([10, 200, 30, 255], [10, 200, 30]),
            ([255, 0, 0, 0], [255, 255, 255]),
        ];
        for (input, expected) in cases {
            let image = RgbaImage::from_pixel(1, 1, Rgba(input));
            assert_eq!(flatten(&image, WHITE).get_pixel(0, 0), &Rgb(expected), "{input:?}");
        }
    }

    #[test]
    fn test_reduce_keeps_few_colors_exactly() {
        let mut image = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 255]));
        image.put_pixel(1, 1, Rgba([0, 0, 0, 255]));
        image.put_pixel(2, 2, Rgba([0, 0, 0, 0]));

        let reduced = reduce(&DynamicImage::ImageRgba8(image), WHITE, 10).unwrap();
        assert_eq!((reduced.width(), reduced.height()), (8, 8));
        assert_eq!(reduced.indices().len(), 64);

        let rgb = reduced.to_rgb();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([0, 0, 255]));
        assert_eq!(rgb.get_pixel(1, 1), &Rgb([0, 0, 0]));
        assert_eq!(rgb.get_pixel(2, 2), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_reduce_is_stable_on_reduced_frames() {
        let image = RgbImage::from_fn(16, 16, |x, y| Rgb([(x * 16) as u8, (y * 16) as u8, 0]));
        let first = reduce(&DynamicImage::ImageRgb8(image), WHITE, 10).unwrap();

        let again = reduce(&DynamicImage::ImageRgb8(first.to_rgb()), WHITE, 10).unwrap();
        assert_eq!((again.width(), again.height()), (first.width(), first.height()));
        assert_eq!(again.to_rgb(), first.to_rgb());
    }

    #[test]
    fn test_palettes_are_per_frame() {
        let red = reduce(
            &DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 0, 0]))),
            WHITE,
            10,
        )
        .unwrap();
        let green = reduce(
            &DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 255, 0]))),
            WHITE,
            10,
        )
        .unwrap();
        assert_ne!(red.palette(), green.palette());
        assert!(red.color_count() <= 256);
    }

    #[test]
    fn test_reduce_rejects_bad_input() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        assert!(matches!(reduce(&image, WHITE, 0), Err(Error::InvalidSpeed(0))));

        let wide = DynamicImage::ImageRgb8(RgbImage::new(70_000, 1));
        assert!(matches!(
            reduce(&wide, WHITE, 10),
            Err(Error::FrameTooLarge { width: 70_000, .. })
        ));
    }
}
