//! Frame compositor for drawing labels onto frames

use crate::font::LabelFont;
use crate::Result;
use framemark_core::{BoxRect, LabelStyle, Placement, TextExtent};
use image::{Rgba, RgbaImage};

/// Draws a boxed label in the top-right corner of frames
///
/// Borrows the resolved font and style so one instance serves a whole run.
pub struct FrameCompositor<'a> {
    font: &'a LabelFont,
    style: &'a LabelStyle,
}

impl<'a> FrameCompositor<'a> {
    /// Creates a new frame compositor with the given font and style
    pub fn new(font: &'a LabelFont, style: &'a LabelStyle) -> Self {
        Self { font, style }
    }

    /// Placement of a label with the given extent in a frame `frame_width` wide
    pub fn placement(&self, frame_width: u32, text: TextExtent) -> Placement {
        Placement::top_right(frame_width, text, self.style.margin, self.style.overflow)
    }

    /// Renders `label` onto `frame` and returns the composited frame
    pub fn render_label(&self, mut frame: RgbaImage, label: &str) -> Result<RgbaImage> {
        let shaped = self.font.shape(label)?;
        let placement = self.placement(frame.width(), shaped.extent());
        if placement.clamped {
            tracing::warn!(
                label,
                text_width = placement.text.width,
                frame_width = frame.width(),
                "label wider than frame, pinned to left edge"
            );
        }

        // Backing box goes on its own layer so its translucency blends with the frame
        let mut overlay = RgbaImage::new(frame.width(), frame.height());
        draw_box(
            &mut overlay,
            placement.backing_box(self.style.padding),
            self.style.box_fill,
            self.style.box_outline,
            self.style.outline_width,
        );
        overlay_image(&mut frame, &overlay, 0, 0);

        shaped.draw(&mut frame, placement.x, placement.y, self.style.text_color)?;
        Ok(frame)
    }
}

/// Fills `rect` with `fill` and strokes its inner edge with `outline`
fn draw_box(layer: &mut RgbaImage, rect: BoxRect, fill: [u8; 4], outline: [u8; 4], outline_width: u32) {
    let x_start = rect.left.max(0);
    let y_start = rect.top.max(0);
    let x_end = rect.right.min(layer.width() as i32 - 1);
    let y_end = rect.bottom.min(layer.height() as i32 - 1);

    for y in y_start..=y_end {
        for x in x_start..=x_end {
            let color = if rect.on_border(x, y, outline_width) {
                outline
            } else {
                fill
            };
            layer.put_pixel(x as u32, y as u32, Rgba(color));
        }
    }
}

/// Composites `src` over `dst` in place (Porter-Duff "over", straight alpha)
pub(crate) fn blend_over(dst: &mut Rgba<u8>, src: [u8; 4]) {
    match src[3] {
        0 => return,
        255 => {
            *dst = Rgba(src);
            return;
        }
        _ => {}
    }

    let src_a = src[3] as f32 / 255.0;
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    let mut out = [0u8; 4];
    for c in 0..3 {
        let value = (src[c] as f32 * src_a + dst[c] as f32 * dst_a * (1.0 - src_a)) / out_a;
        out[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    *dst = Rgba(out);
}

/// Overlays one image onto another at the specified position
fn overlay_image(base: &mut RgbaImage, overlay: &RgbaImage, x: i32, y: i32) {
    let base_width = base.width() as i32;
    let base_height = base.height() as i32;
    let overlay_width = overlay.width() as i32;
    let overlay_height = overlay.height() as i32;

    // Calculate the region to copy
    let src_x_start = 0.max(-x);
    let src_y_start = 0.max(-y);
    let src_x_end = overlay_width.min(base_width - x);
    let src_y_end = overlay_height.min(base_height - y);

    if src_x_start >= src_x_end || src_y_start >= src_y_end {
        return;
    }

    for src_y in src_y_start..src_y_end {
        for src_x in src_x_start..src_x_end {
            let overlay_pixel = overlay.get_pixel(src_x as u32, src_y as u32);
            let base_pixel = base.get_pixel_mut((x + src_x) as u32, (y + src_y) as u32);
            blend_over(base_pixel, overlay_pixel.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap_font;
    use framemark_core::Overflow;

    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn test_blend_over() {
        let mut px = BLUE;
        blend_over(&mut px, [255, 255, 255, 200]);
        assert_eq!(px, Rgba([200, 200, 255, 255]));

        let mut px = Rgba([0, 0, 0, 0]);
        blend_over(&mut px, [255, 255, 255, 200]);
        assert_eq!(px, Rgba([255, 255, 255, 200]));

        let mut px = BLUE;
        blend_over(&mut px, [255, 0, 0, 0]);
        assert_eq!(px, BLUE);
    }

    #[test]
    fn test_render_label_layout() {
        let font = LabelFont::builtin();
        let style = LabelStyle::default();
        let compositor = FrameCompositor::new(&font, &style);

        let frame = RgbaImage::from_pixel(200, 100, BLUE);
        let out = compositor.render_label(frame, "I").unwrap();

        // 'I' ink is 6x14: x = 200 - 6 - 10 = 184, box spans 179..=195 x 5..=29
        assert_eq!(out.get_pixel(179, 20), &BLACK);
        assert_eq!(out.get_pixel(195, 20), &BLACK);
        assert_eq!(out.get_pixel(185, 5), &BLACK);
        assert_eq!(out.get_pixel(185, 29), &BLACK);
        assert_eq!(out.get_pixel(181, 7), &Rgba([200, 200, 255, 255]));
        // Ink starts exactly at the anchor; the solid middle column follows
        assert_eq!(out.get_pixel(184, 10), &BLACK);
        assert_eq!(out.get_pixel(186, 23), &BLACK);
        // Padding is the same on both sides of the ink
        assert_eq!(out.get_pixel(183, 15), &Rgba([200, 200, 255, 255]));
        assert_eq!(out.get_pixel(190, 15), &Rgba([200, 200, 255, 255]));
        // Outside the box the frame is untouched
        assert_eq!(out.get_pixel(178, 20), &BLUE);
        assert_eq!(out.get_pixel(196, 20), &BLUE);
        assert_eq!(out.get_pixel(10, 50), &BLUE);
    }

    #[test]
    fn test_placement_matches_measured_width() {
        let font = LabelFont::builtin();
        let style = LabelStyle::default();
        let compositor = FrameCompositor::new(&font, &style);

        let extent = bitmap_font::measure("Layer_1").extent;
        let placement = compositor.placement(100, extent);
        assert_eq!(placement.x, 100 - extent.width as i32 - 10);
        assert_eq!(placement.y, 10);
    }

    #[test]
    fn test_oversized_label() {
        let font = LabelFont::builtin();
        let frame = RgbaImage::from_pixel(40, 40, BLUE);

        let clamp = LabelStyle::default();
        let out = FrameCompositor::new(&font, &clamp)
            .render_label(frame.clone(), "Layer_1")
            .unwrap();
        assert_eq!(out.dimensions(), (40, 40));
        // Clamped to x = 0, so the box's left outline sits at -5 and is cut off
        assert_eq!(out.get_pixel(0, 5), &BLACK);

        let allow = LabelStyle {
            overflow: Overflow::Allow,
            ..LabelStyle::default()
        };
        let out = FrameCompositor::new(&font, &allow)
            .render_label(frame, "Layer_1")
            .unwrap();
        assert_eq!(out.dimensions(), (40, 40));
        // Right outline still lands at 40 - 10 + 5 = 35
        assert_eq!(out.get_pixel(35, 20), &BLACK);
    }

    #[test]
    fn test_overlay_offset_clipping() {
        let mut base = RgbaImage::from_pixel(4, 4, BLUE);
        let overlay = RgbaImage::from_pixel(4, 4, BLACK);
        overlay_image(&mut base, &overlay, 2, -2);
        assert_eq!(base.get_pixel(3, 0), &BLACK);
        assert_eq!(base.get_pixel(2, 1), &BLACK);
        assert_eq!(base.get_pixel(1, 0), &BLUE);
        assert_eq!(base.get_pixel(3, 2), &BLUE);
    }
}
