use std::str::FromStr;

use crate::error::{ConvertError, Result};

pub mod lz77;

/// Compression applied to pixel data before export.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Compression {
    #[default]
    None,
    Lz77,
}

impl Compression {
    pub fn apply(self, data: Vec<u8>) -> Result<Vec<u8>> {
        match self {
            Compression::None => Ok(data),
            Compression::Lz77 => {
                if data.len() > lz77::MAX_UNCOMPRESSED_LEN {
                    return Err(ConvertError::DataTooLarge { len: data.len() });
                }
                Ok(lz77::compress(&data))
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Lz77 => "lz77",
        }
    }
}

impl FromStr for Compression {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Compression::None),
            "lz77" => Ok(Compression::Lz77),
            other => Err(ConvertError::InvalidConfiguration(format!(
                "unknown compression \"{other}\", expected none or lz77"
            ))),
        }
    }
}
