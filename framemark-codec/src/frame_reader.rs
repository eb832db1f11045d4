//! Frame extraction from animated images

use crate::Result;
use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::error::ImageFormatHint;
use image::{
    AnimationDecoder, Delay, DynamicImage, Frame, Frames, ImageError, ImageFormat, ImageReader,
    RgbaImage,
};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Duration given to a still image
pub const DEFAULT_FRAME_DURATION_MS: u32 = 100;

/// One decoded frame, normalized to RGBA
#[derive(Debug, Clone)]
pub struct SourceFrame {
    /// Position in storage order, starting at 0
    pub index: usize,
    pub image: RgbaImage,
    /// Display duration in milliseconds
    pub duration_ms: u32,
}

/// Lazy reader over the frames of an animated image
///
/// The source file stays open until the last frame has been read.
pub struct FrameReader {
    format: ImageFormat,
    frames: Option<Frames<'static>>,
    next_index: usize,
}

impl FrameReader {
    /// Opens an image file, detecting its format from the content
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| ImageError::Unsupported(ImageFormatHint::Unknown.into()))?;

        let frames = match format {
            ImageFormat::Gif if gif_has_no_frames(path)? => {
                Frames::new(Box::new(std::iter::empty()))
            }
            ImageFormat::Gif => GifDecoder::new(reader.into_inner())?.into_frames(),
            ImageFormat::Png => {
                let decoder = PngDecoder::new(reader.into_inner())?;
                if decoder.is_apng()? {
                    decoder.apng()?.into_frames()
                } else {
                    single_frame(DynamicImage::from_decoder(decoder)?)
                }
            }
            ImageFormat::WebP => {
                let decoder = WebPDecoder::new(reader.into_inner())?;
                if decoder.has_animation() {
                    decoder.into_frames()
                } else {
                    single_frame(DynamicImage::from_decoder(decoder)?)
                }
            }
            _ => single_frame(reader.decode()?),
        };

        tracing::debug!(path = %path.display(), ?format, "opened source animation");
        Ok(Self {
            format,
            frames: Some(frames),
            next_index: 0,
        })
    }

    /// Container format of the source
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Number of frames yielded so far
    pub fn frames_read(&self) -> usize {
        self.next_index
    }
}

impl Iterator for FrameReader {
    type Item = Result<SourceFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        let frames = self.frames.as_mut()?;
        let frame = match frames.next() {
            Some(Ok(frame)) => frame,
            Some(Err(err)) => {
                self.frames = None;
                return Some(Err(err.into()));
            }
            None => {
                // Drop the decoder so the file closes as soon as we are exhausted
                self.frames = None;
                return None;
            }
        };

        let duration_ms = frame_duration_ms(&frame);
        let index = self.next_index;
        self.next_index += 1;
        tracing::debug!(index, duration_ms, "decoded frame");

        Some(Ok(SourceFrame {
            index,
            image: frame.into_buffer(),
            duration_ms,
        }))
    }
}

/// Wraps a still image as a one-frame sequence
fn single_frame(image: DynamicImage) -> Frames<'static> {
    let delay = Delay::from_numer_denom_ms(DEFAULT_FRAME_DURATION_MS, 1);
    let frame = Frame::from_parts(image.to_rgba8(), 0, 0, delay);
    Frames::new(Box::new(std::iter::once(Ok(frame))))
}

/// Whether a GIF reaches its trailer without a single image
///
/// Header or block errors answer `false` so the real decoder reports them.
fn gif_has_no_frames(path: &Path) -> Result<bool> {
    let file = BufReader::new(File::open(path)?);
    let Ok(mut decoder) = gif::DecodeOptions::new().read_info(file) else {
        return Ok(false);
    };
    Ok(matches!(decoder.next_frame_info(), Ok(None)))
}

/// Frame delay in milliseconds, rounded; a declared zero stays zero
fn frame_duration_ms(frame: &Frame) -> u32 {
    let (numer, denom) = frame.delay().numer_denom_ms();
    if denom == 0 {
        return 0;
    }
    ((numer as u64 + denom as u64 / 2) / denom as u64).min(u32::MAX as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::borrow::Cow;

    /// Writes a GIF of solid frames, one per delay (in centiseconds)
    fn write_gif(path: &Path, width: u16, height: u16, delays: &[u16]) {
        let file = File::create(path).unwrap();
        let palette = [255, 0, 0, 0, 255, 0];
        let mut encoder = gif::Encoder::new(file, width, height, &palette).unwrap();
        encoder.set_repeat(gif::Repeat::Infinite).unwrap();
        for (i, delay) in delays.iter().enumerate() {
            let buffer = vec![(i % 2) as u8; width as usize * height as usize];
            let frame = gif::Frame {
                width,
                height,
                delay: *delay,
                buffer: Cow::Owned(buffer),
                ..gif::Frame::default()
            };
            encoder.write_frame(&frame).unwrap();
        }
    }

    #[test]
    fn test_reads_gif_frames_and_durations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.gif");
        write_gif(&path, 6, 4, &[10, 20, 5]);

        let mut reader = FrameReader::open(&path).unwrap();
        assert_eq!(reader.format(), ImageFormat::Gif);

        let frames: Vec<SourceFrame> = reader.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(reader.frames_read(), 3);
        assert!(reader.next().is_none());

        let durations: Vec<u32> = frames.iter().map(|f| f.duration_ms).collect();
        assert_eq!(durations, vec![100, 200, 50]);

        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index, i);
            assert_eq!(frame.image.dimensions(), (6, 4));
        }
        assert_eq!(frames[0].image.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(frames[1].image.get_pixel(0, 0).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_zero_delay_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.gif");
        write_gif(&path, 2, 2, &[0, 0, 7]);

        let durations: Vec<u32> = FrameReader::open(&path)
            .unwrap()
            .map(|f| f.unwrap().duration_ms)
            .collect();
        assert_eq!(durations, vec![0, 0, 70]);
    }

    #[test]
    fn test_gif_without_frames_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.gif");
        write_gif(&path, 4, 4, &[]);

        let mut reader = FrameReader::open(&path).unwrap();
        assert_eq!(reader.format(), ImageFormat::Gif);
        assert!(reader.next().is_none());
        assert_eq!(reader.frames_read(), 0);
    }

    #[test]
    fn test_truncated_gif_is_still_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.gif");
        write_gif(&path, 4, 4, &[10, 10]);

        let bytes = std::fs::read(&path).unwrap();
        let truncated = dir.path().join("truncated.gif");
        std::fs::write(&truncated, &bytes[..bytes.len() - 8]).unwrap();

        let result =
            FrameReader::open(&truncated).and_then(|reader| reader.collect::<Result<Vec<_>>>());
        assert!(result.is_err());
    }

    #[test]
    fn test_still_image_is_one_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        RgbImage::from_pixel(5, 3, Rgb([1, 2, 3])).save(&path).unwrap();

        let frames: Vec<SourceFrame> = FrameReader::open(&path)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].duration_ms, DEFAULT_FRAME_DURATION_MS);
        assert_eq!(frames[0].image.get_pixel(4, 2).0, [1, 2, 3, 255]);
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.gif");
        std::fs::write(&path, b"GIF89a\x01").unwrap();

        let result = FrameReader::open(&path).and_then(|reader| reader.collect::<Result<Vec<_>>>());
        assert!(result.is_err());

        assert!(FrameReader::open(dir.path().join("missing.gif")).is_err());
    }
}
