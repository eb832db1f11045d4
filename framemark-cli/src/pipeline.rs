//! Extract → label → reduce → encode

use anyhow::{Context, Result};
use framemark_codec::{save_animation, FrameReader};
use framemark_core::{LabelSet, LabelStyle};
use framemark_render::{palette, FontSource, FrameCompositor, LabelFont};
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Everything a labeling run needs besides the two paths
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub labels: LabelSet,
    pub style: LabelStyle,
    /// Font candidates in resolution order
    pub fonts: Vec<FontSource>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            labels: LabelSet::default(),
            style: LabelStyle::default(),
            fonts: FontSource::default_candidates(),
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Written { frames: usize, output: PathBuf },
    /// The source had no frames; nothing was written
    NoFrames,
}

/// Labels every frame of `input` and writes the result to `output`
pub fn annotate(input: &Path, output: &Path, config: &PipelineConfig) -> Result<PipelineOutcome> {
    config.style.validate()?;

    let font = LabelFont::resolve(&config.fonts, config.style.font_size)
        .context("Failed to resolve a label font")?;
    let compositor = FrameCompositor::new(&font, &config.style);

    let reader = FrameReader::open(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;

    let mut frames = Vec::new();
    let mut durations = Vec::new();
    for source in reader {
        let source = source.context("Failed to decode frame")?;
        let label = config.labels.label_for(source.index);
        tracing::debug!(index = source.index, label, "labeling frame");

        let composited = compositor
            .render_label(source.image, label)
            .with_context(|| format!("Failed to draw label on frame {}", source.index))?;
        let reduced = palette::reduce(
            &DynamicImage::ImageRgba8(composited),
            config.style.background,
            config.style.quantizer_speed,
        )?;

        frames.push(reduced);
        durations.push(source.duration_ms);
    }

    if frames.is_empty() {
        return Ok(PipelineOutcome::NoFrames);
    }

    save_animation(output, &frames, &durations)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(PipelineOutcome::Written {
        frames: frames.len(),
        output: output.to_path_buf(),
    })
}
