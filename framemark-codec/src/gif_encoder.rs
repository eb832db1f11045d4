//! Animated GIF encoding

use crate::{Error, Result};
use framemark_render::PaletteFrame;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Converts a duration to GIF centiseconds, rounding half up (35 ms → 4)
pub fn centiseconds(duration_ms: u32) -> u16 {
    ((duration_ms as u64 + 5) / 10).min(u16::MAX as u64) as u16
}

/// Writes palette frames into a looping GIF
///
/// Every frame is stored in full with its own local palette; nothing is
/// diffed against the previous frame.
pub struct GifSequenceEncoder<W: Write> {
    encoder: gif::Encoder<W>,
    width: u16,
    height: u16,
    frames_written: usize,
}

impl<W: Write> GifSequenceEncoder<W> {
    /// Starts an infinitely looping GIF with the given logical screen size
    pub fn new(writer: W, width: u16, height: u16) -> Result<Self> {
        let mut encoder = gif::Encoder::new(writer, width, height, &[])?;
        encoder.set_repeat(gif::Repeat::Infinite)?;
        Ok(Self {
            encoder,
            width,
            height,
            frames_written: 0,
        })
    }

    /// Appends one frame displayed for `duration_ms`
    pub fn write_frame(&mut self, frame: &PaletteFrame, duration_ms: u32) -> Result<()> {
        let found = (frame.width(), frame.height());
        if found != (self.width, self.height) {
            return Err(Error::FrameSizeMismatch {
                index: self.frames_written,
                expected: (self.width, self.height),
                found,
            });
        }

        let gif_frame = gif::Frame {
            width: frame.width(),
            height: frame.height(),
            delay: centiseconds(duration_ms),
            dispose: gif::DisposalMethod::Keep,
            palette: Some(frame.palette().to_vec()),
            buffer: Cow::Borrowed(frame.indices()),
            ..gif::Frame::default()
        };
        self.encoder.write_frame(&gif_frame)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Writes the trailer and returns the underlying writer
    pub fn finish(self) -> Result<W> {
        Ok(self.encoder.into_inner()?)
    }
}

/// Encodes `frames` with their parallel `durations` into `writer`
pub fn write_animation<W: Write>(writer: W, frames: &[PaletteFrame], durations: &[u32]) -> Result<W> {
    let first = check_sequence(frames, durations)?;
    let mut encoder = GifSequenceEncoder::new(writer, first.width(), first.height())?;
    for (frame, &duration_ms) in frames.iter().zip(durations) {
        encoder.write_frame(frame, duration_ms)?;
    }
    encoder.finish()
}

/// Encodes the sequence into a GIF file at `path`
///
/// The sequence is validated before the file is created, so an empty or
/// inconsistent sequence leaves nothing behind on disk.
pub fn save_animation<P: AsRef<Path>>(path: P, frames: &[PaletteFrame], durations: &[u32]) -> Result<()> {
    check_sequence(frames, durations)?;
    let file = File::create(path.as_ref())?;
    let mut writer = write_animation(BufWriter::new(file), frames, durations)?;
    writer.flush()?;
    tracing::info!(path = %path.as_ref().display(), frames = frames.len(), "wrote animation");
    Ok(())
}

fn check_sequence<'a>(frames: &'a [PaletteFrame], durations: &[u32]) -> Result<&'a PaletteFrame> {
    if frames.len() != durations.len() {
        return Err(Error::LengthMismatch {
            frames: frames.len(),
            durations: durations.len(),
        });
    }
    frames.first().ok_or(Error::NoFrames)
}
