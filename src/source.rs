use std::{fs::File, io::BufReader, path::Path};

use anyhow::{bail, Context, Result};
use log::info;

use crate::common::Sample;

/// A decoded image. Coordinates run over `0..width` and `0..height`.
pub trait ImageSource {
    /// Top-left corner of the image bounds. Conversion requires `(0, 0)`.
    fn origin(&self) -> (i64, i64) {
        (0, 0)
    }
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn sample(&self, x: usize, y: usize) -> Sample;
}

/// Row-major grid of samples held in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleGrid {
    width: usize,
    height: usize,
    samples: Vec<Sample>,
}

impl SampleGrid {
    pub fn new(width: usize, height: usize, samples: Vec<Sample>) -> Result<Self> {
        if samples.len() != width * height {
            bail!(
                "{} samples do not fill a {}x{} image",
                samples.len(),
                width,
                height
            );
        }
        Ok(SampleGrid {
            width,
            height,
            samples,
        })
    }

    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> Sample) -> Self {
        let mut samples = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                samples.push(f(x, y));
            }
        }
        SampleGrid {
            width,
            height,
            samples,
        }
    }
}

impl ImageSource for SampleGrid {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn sample(&self, x: usize, y: usize) -> Sample {
        self.samples[y * self.width + x]
    }
}

/// Decodes a PNG file of any color type and bit depth into 8-bit RGBA samples.
pub fn load_png(path: &Path) -> Result<SampleGrid> {
    info!("Loading {}", path.display());
    let file = File::open(path).with_context(|| format!("Unable to open {}", path.display()))?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(
        png::Transformations::EXPAND | png::Transformations::STRIP_16 | png::Transformations::ALPHA,
    );
    let mut reader = decoder
        .read_info()
        .with_context(|| format!("Unable to read PNG header of {}", path.display()))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader
        .next_frame(&mut buf)
        .with_context(|| format!("Unable to decode {}", path.display()))?;
    buf.truncate(frame.buffer_size());

    let samples: Vec<Sample> = match frame.color_type {
        png::ColorType::Rgba => buf
            .chunks_exact(4)
            .map(|c| Sample::rgba(c[0], c[1], c[2], c[3]))
            .collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .map(|c| Sample::rgba(c[0], c[0], c[0], c[1]))
            .collect(),
        other => bail!("Unexpected decoded color type {:?} in {}", other, path.display()),
    };
    SampleGrid::new(frame.width as usize, frame.height as usize, samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_row_major() {
        let grid = SampleGrid::from_fn(3, 2, |x, y| Sample::rgb(x as u8, y as u8, 0));
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.sample(2, 1), Sample::rgb(2, 1, 0));
        assert_eq!(grid.origin(), (0, 0));
    }

    #[test]
    fn sample_count_must_match() {
        assert!(SampleGrid::new(2, 2, vec![Sample::default(); 3]).is_err());
        assert!(SampleGrid::new(2, 2, vec![Sample::default(); 4]).is_ok());
    }
}
