// Color codec: decoded samples to console-native colors and back.
use crate::{
    common::{ColorValue, NativeColor, Sample},
    error::{ConvertError, Result},
};

/// How a buffer of pixels or colors is to be interpreted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorFormat {
    Bgr15,    // 0b-bbbbbgggggrrrrr
    Indexed8, // 256 colors
    Indexed4, // 16 colors
    Indexed2, // 4 colors
    Indexed1, // 2 colors
}

impl ColorFormat {
    pub fn indexed(bpp: u8) -> Option<Self> {
        match bpp {
            1 => Some(ColorFormat::Indexed1),
            2 => Some(ColorFormat::Indexed2),
            4 => Some(ColorFormat::Indexed4),
            8 => Some(ColorFormat::Indexed8),
            _ => None,
        }
    }
}

/// Drops the 3 low bits of each channel and the alpha channel.
pub fn to_native(sample: Sample) -> NativeColor {
    let r = (sample.red >> 3) as u16;
    let g = (sample.green >> 3) as u16;
    let b = (sample.blue >> 3) as u16;
    NativeColor(b << 10 | g << 5 | r)
}

fn expand_channel(c: u8) -> u8 {
    ((c as u16) * 255 / 31) as u8
}

/// Expands a native color to an opaque sample, stretching each channel to the full 0-255 range.
pub fn from_native(color: NativeColor) -> Sample {
    let c = color.0;
    let r = (c & 31) as ColorValue;
    let g = ((c >> 5) & 31) as ColorValue;
    let b = ((c >> 10) & 31) as ColorValue;
    Sample::rgb(expand_channel(r), expand_channel(g), expand_channel(b))
}

pub fn convert_samples(samples: &[Sample], to: ColorFormat) -> Result<Vec<NativeColor>> {
    match to {
        ColorFormat::Bgr15 => Ok(samples.iter().map(|&s| to_native(s)).collect()),
        _ => Err(ConvertError::UnsupportedConversion(to)),
    }
}
