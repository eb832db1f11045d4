//! Label placement geometry

/// Measured ink extent of a rendered label, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

impl TextExtent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// What to do when a label is wider than the frame minus its margin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Overflow {
    /// Pin the label to the left edge; the right part is cut off
    #[default]
    Clamp,
    /// Keep the top-right anchor even if `x` becomes negative
    Allow,
}

/// Top-right anchored position of a label within a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Left edge of the label ink (can be negative with [`Overflow::Allow`])
    pub x: i32,
    /// Top edge of the label ink
    pub y: i32,
    /// Measured label extent
    pub text: TextExtent,
    /// Set when [`Overflow::Clamp`] moved the label
    pub clamped: bool,
}

impl Placement {
    /// Anchors `text` at the top-right corner of a frame `frame_width` wide
    ///
    /// `x = frame_width - text.width - margin`, `y = margin`. Coordinates
    /// outside the `i32` range saturate.
    pub fn top_right(frame_width: u32, text: TextExtent, margin: u32, overflow: Overflow) -> Self {
        let x = frame_width as i64 - text.width as i64 - margin as i64;
        let (x, clamped) = match overflow {
            Overflow::Clamp if x < 0 => (0, true),
            _ => (x, false),
        };
        Self {
            x: saturate(x),
            y: saturate(margin as i64),
            text,
            clamped,
        }
    }

    /// Backing rectangle around the label, grown by `padding` on every side
    pub fn backing_box(&self, padding: u32) -> BoxRect {
        let padding = padding as i64;
        let (x, y) = (self.x as i64, self.y as i64);
        BoxRect {
            left: saturate(x - padding),
            top: saturate(y - padding),
            right: saturate(x + self.text.width as i64 + padding),
            bottom: saturate(y + self.text.height as i64 + padding),
        }
    }
}

fn saturate(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// Rectangle with inclusive corners, in frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoxRect {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// Whether `(x, y)` lies within `width` pixels of the rectangle's edge
    pub fn on_border(&self, x: i32, y: i32, width: u32) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        let w = i32::try_from(width).unwrap_or(i32::MAX);
        x < self.left.saturating_add(w)
            || x > self.right.saturating_sub(w)
            || y < self.top.saturating_add(w)
            || y > self.bottom.saturating_sub(w)
    }
}
