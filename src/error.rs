use thiserror::Error;

use crate::{color::ColorFormat, common::NativeColor};

/// Failure of a single conversion. Every variant aborts the whole conversion.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("image size {width}x{height} is not a multiple of the {tile_width}x{tile_height} tile size")]
    InvalidImageSize {
        width: usize,
        height: usize,
        tile_width: usize,
        tile_height: usize,
    },

    #[error("too many colors used: palette holds at most {capacity}")]
    PaletteOverflow { capacity: usize },

    #[error("pixel color {0} not in palette")]
    ColorNotInPalette(NativeColor),

    #[error("unsupported color conversion to {0:?}")]
    UnsupportedConversion(ColorFormat),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("{count} pixels cannot be packed evenly at {bpp} bpp")]
    InvalidPixelCount { count: usize, bpp: u8 },

    #[error("{len} bytes exceed the 24-bit length limit of the compressed stream")]
    DataTooLarge { len: usize },
}

pub type Result<T> = std::result::Result<T, ConvertError>;
