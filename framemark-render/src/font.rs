//! Label font resolution and text shaping
//!
//! A font is resolved once per run from an ordered list of [`FontSource`]s and
//! then shared by reference with every compositor call. Outline fonts are laid
//! out and rasterized through `usvg`/`resvg`; the builtin bitmap font needs
//! no font database at all.

use crate::frame_compositor::blend_over;
use crate::{bitmap_font, Error, Result};
use framemark_core::TextExtent;
use image::RgbaImage;
use resvg::tiny_skia;
use std::path::PathBuf;
use std::sync::Arc;
use usvg::fontdb;

/// Bold system font tried first
pub const DEJAVU_SANS_BOLD: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";

/// Family looked up in the system font database when the fixed path is missing
pub const FALLBACK_FAMILY: &str = "Arial";

/// One candidate in the font resolution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// A font file at a fixed path
    File(PathBuf),
    /// A family name resolved against the installed system fonts
    Family(String),
    /// The embedded bitmap font; always resolves
    Builtin,
}

impl FontSource {
    /// DejaVu Sans Bold, then Arial, then the builtin font
    pub fn default_candidates() -> Vec<FontSource> {
        vec![
            FontSource::File(PathBuf::from(DEJAVU_SANS_BOLD)),
            FontSource::Family(FALLBACK_FAMILY.to_string()),
            FontSource::Builtin,
        ]
    }
}

impl std::fmt::Display for FontSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontSource::File(path) => write!(f, "file {}", path.display()),
            FontSource::Family(name) => write!(f, "family '{name}'"),
            FontSource::Builtin => f.write_str("builtin bitmap font"),
        }
    }
}

#[derive(Clone)]
enum FontKind {
    Outline {
        fontdb: Arc<fontdb::Database>,
        face: fontdb::ID,
        family: String,
    },
    Builtin,
}

/// A resolved label font at a fixed size
#[derive(Clone)]
pub struct LabelFont {
    kind: FontKind,
    size: f32,
    source: FontSource,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelFont")
            .field("source", &self.source)
            .field("size", &self.size)
            .finish()
    }
}

impl LabelFont {
    /// Tries each candidate in order and keeps the first one that loads
    pub fn resolve(candidates: &[FontSource], size: f32) -> Result<Self> {
        for source in candidates {
            match Self::load(source, size) {
                Ok(font) => {
                    tracing::info!(source = %source, size, "resolved label font");
                    return Ok(font);
                }
                Err(err) => {
                    tracing::debug!(source = %source, error = %err, "font candidate unavailable");
                }
            }
        }
        Err(Error::NoFont)
    }

    /// The builtin bitmap font
    pub fn builtin() -> Self {
        Self {
            kind: FontKind::Builtin,
            size: (8 * bitmap_font::SCALE) as f32,
            source: FontSource::Builtin,
        }
    }

    fn load(source: &FontSource, size: f32) -> Result<Self> {
        let mut db = fontdb::Database::new();
        let face = match source {
            FontSource::Builtin => return Ok(Self::builtin()),
            FontSource::File(path) => {
                db.load_font_file(path)?;
                db.faces()
                    .next()
                    .map(|face| face.id)
                    .ok_or_else(|| Error::FontUnavailable(source.to_string()))?
            }
            FontSource::Family(name) => {
                db.load_system_fonts();
                let families = [fontdb::Family::Name(name.as_str())];
                let query = fontdb::Query {
                    families: &families,
                    ..fontdb::Query::default()
                };
                db.query(&query)
                    .ok_or_else(|| Error::FontUnavailable(source.to_string()))?
            }
        };

        let family = db
            .face(face)
            .and_then(|info| info.families.first())
            .map(|(name, _)| name.clone())
            .ok_or_else(|| Error::FontUnavailable(source.to_string()))?;

        Ok(Self {
            kind: FontKind::Outline {
                fontdb: Arc::new(db),
                face,
                family,
            },
            size,
            source: source.clone(),
        })
    }

    /// Where this font came from
    pub fn source(&self) -> &FontSource {
        &self.source
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.kind, FontKind::Builtin)
    }

    /// Lays out `text`, ready to be measured and drawn
    pub fn shape(&self, text: &str) -> Result<ShapedLabel> {
        let FontKind::Outline {
            fontdb,
            face,
            family,
        } = &self.kind
        else {
            let ink = bitmap_font::measure(text);
            return Ok(ShapedLabel::Bitmap {
                text: text.to_string(),
                left: ink.left as i32,
                top: ink.top as i32,
                extent: ink.extent,
            });
        };

        if text.trim().is_empty() {
            return Ok(ShapedLabel::Empty);
        }

        let face = *face;
        let options = usvg::Options {
            fontdb: Arc::clone(fontdb),
            font_resolver: usvg::FontResolver {
                select_font: Box::new(move |_, _| Some(face)),
                select_fallback: usvg::FontResolver::default_fallback_selector(),
            },
            ..Default::default()
        };

        let svg = label_svg(text, family, self.size);
        let tree = usvg::Tree::from_str(&svg, &options)?;
        if !tree.root().has_children() {
            return Ok(ShapedLabel::Empty);
        }

        let bbox = tree.root().abs_bounding_box();
        let left = bbox.left().floor();
        let top = bbox.top().floor();
        let extent = TextExtent::new(
            (bbox.right().ceil() - left).max(0.0) as u32,
            (bbox.bottom().ceil() - top).max(0.0) as u32,
        );

        Ok(ShapedLabel::Outline {
            tree,
            left,
            top,
            extent,
        })
    }
}

/// Single-line SVG document with the baseline one em below the top
fn label_svg(text: &str, family: &str, size: f32) -> String {
    let width = (text.chars().count() as f32 * size * 2.0).ceil().max(1.0);
    let height = (size * 3.0).ceil().max(1.0);
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}"><text x="0" y="{size}" font-family="{}" font-size="{size}" fill="black" xml:space="preserve">{}</text></svg>"#,
        escape_xml(family),
        escape_xml(text),
    )
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// A label laid out with a specific font
pub enum ShapedLabel {
    /// Nothing visible to draw
    Empty,
    Outline {
        tree: usvg::Tree,
        /// Ink origin relative to the layout origin
        left: f32,
        top: f32,
        extent: TextExtent,
    },
    Bitmap {
        text: String,
        /// Ink origin relative to the first glyph cell
        left: i32,
        top: i32,
        extent: TextExtent,
    },
}

impl ShapedLabel {
    /// Measured ink extent
    pub fn extent(&self) -> TextExtent {
        match self {
            ShapedLabel::Empty => TextExtent::default(),
            ShapedLabel::Outline { extent, .. } | ShapedLabel::Bitmap { extent, .. } => *extent,
        }
    }

    /// Draws the label with its ink box top-left at `(x, y)`
    pub fn draw(&self, canvas: &mut RgbaImage, x: i32, y: i32, color: [u8; 4]) -> Result<()> {
        match self {
            ShapedLabel::Empty => Ok(()),
            ShapedLabel::Bitmap { text, left, top, .. } => {
                bitmap_font::draw(canvas, text, x - left, y - top, color);
                Ok(())
            }
            ShapedLabel::Outline { tree, left, top, .. } => {
                let (width, height) = canvas.dimensions();
                let mut pixmap =
                    tiny_skia::Pixmap::new(width, height).ok_or(Error::Canvas { width, height })?;
                let transform = tiny_skia::Transform::from_translate(x as f32 - left, y as f32 - top);
                resvg::render(tree, transform, &mut pixmap.as_mut());

                // The glyph mask comes out black; its coverage drives the label color
                for (i, pixel) in pixmap.pixels().iter().enumerate() {
                    let coverage = pixel.alpha();
                    if coverage == 0 {
                        continue;
                    }
                    let alpha = (color[3] as u32 * coverage as u32 + 127) / 255;
                    let px = i as u32 % width;
                    let py = i as u32 / width;
                    blend_over(
                        canvas.get_pixel_mut(px, py),
                        [color[0], color[1], color[2], alpha as u8],
                    );
                }
                Ok(())
            }
        }
    }
}
