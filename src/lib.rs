//! Converts images into packed graphics data for retro consoles: native
//! colors, tile order, a synthesized palette, sub-byte pixel indices and
//! optional LZ77 compression.

pub mod color;
pub mod common;
pub mod compression;
pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod palette;
pub mod pixels;
pub mod product;
pub mod profile;
pub mod source;
pub mod tiles;

pub use common::{ColorIdx, NativeColor, Sample};
pub use error::ConvertError;
