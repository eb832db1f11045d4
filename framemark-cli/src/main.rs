//! framemark CLI Tool
//!
//! Stamps a cycling list of labels onto the top-right corner of every frame
//! of an animated image and writes the result as a looping GIF.

mod pipeline;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use framemark_core::{LabelSet, LabelStyle, Overflow};
use framemark_render::FontSource;
use pipeline::{annotate, PipelineConfig, PipelineOutcome};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "framemark")]
#[command(about = "Label every frame of an animated image in its top-right corner")]
#[command(version)]
struct Cli {
    /// Input animated image (GIF, APNG or WebP)
    #[arg(default_value = "per-layer-1.gif")]
    input: PathBuf,

    /// Output GIF path [default: <input stem>-labeled.gif next to the input]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Label text; repeat the flag for several labels, cycled over the frames
    /// [default: Layer_1 .. Layer_6]
    #[arg(short, long = "label")]
    labels: Vec<String>,

    /// Font file tried before the default font candidates
    #[arg(long)]
    font: Option<PathBuf>,

    /// Label font size in pixels
    #[arg(long)]
    font_size: Option<f32>,

    /// Keep the top-right anchor for labels wider than the frame
    #[arg(long)]
    allow_overflow: bool,

    /// JSON file with label style overrides
    #[arg(long)]
    style: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.input));
    let config = build_config(&cli)?;

    match annotate(&cli.input, &output, &config)? {
        PipelineOutcome::Written { frames, output } => {
            println!("processed {} frames, saved to {}", frames, output.display());
        }
        PipelineOutcome::NoFrames => {
            eprintln!("error: no frames extracted from {}", cli.input.display());
            std::process::exit(1);
        }
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
}

fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut style = match &cli.style {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read style file {}", path.display()))?;
            LabelStyle::from_json(&json).context("Invalid style file")?
        }
        None => LabelStyle::default(),
    };
    if let Some(size) = cli.font_size {
        style.font_size = size;
    }
    if cli.allow_overflow {
        style.overflow = Overflow::Allow;
    }

    let labels = if cli.labels.is_empty() {
        LabelSet::default()
    } else {
        LabelSet::new(cli.labels.iter().cloned())?
    };

    let mut fonts = FontSource::default_candidates();
    if let Some(path) = &cli.font {
        fonts.insert(0, FontSource::File(path.clone()));
    }

    Ok(PipelineConfig {
        labels,
        style,
        fonts,
    })
}

/// `dir/name.gif` → `dir/name-labeled.gif`
fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}-labeled.gif"))
}
