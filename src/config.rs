//! Per-image conversion options, read from a file sitting next to the image
//! (`title.png` is configured by `title.yaml`, `title.yml` or `title.json`).
//!
//! ```yaml
//! tiles: 8x8
//! bpp: 4
//! create: pixels palette
//! palette: "#ff00ff 000000"
//! compression: lz77
//! ```
//! Every field is optional.

use std::{fs, io::ErrorKind, ops::BitOr, path::Path};

use anyhow::Context;
use log::info;
use serde::{Deserialize, Deserializer};

use crate::{
    common::Sample,
    compression::Compression,
    error::{ConvertError, Result},
    profile::Profile,
};

/// Which outputs a conversion produces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ExportMask(u32);

impl ExportMask {
    pub const NONE: ExportMask = ExportMask(0);
    pub const PIXELS: ExportMask = ExportMask(1);
    pub const MAP: ExportMask = ExportMask(2);
    pub const PALETTE: ExportMask = ExportMask(4);
    pub const ALL: ExportMask = ExportMask(0xFFFF_FFFF);

    pub fn contains(self, other: ExportMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parses space-separated words. `none` discards whatever came before it.
    pub fn parse(s: &str) -> Result<ExportMask> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(ExportMask::ALL);
        }
        let mut mask = ExportMask::NONE;
        for word in s.split_whitespace() {
            match word.to_lowercase().as_str() {
                "all" => mask = mask | ExportMask::ALL,
                "none" => mask = ExportMask::NONE,
                "pixels" => mask = mask | ExportMask::PIXELS,
                "map" => mask = mask | ExportMask::MAP,
                "palette" => mask = mask | ExportMask::PALETTE,
                other => {
                    return Err(ConvertError::InvalidConfiguration(format!(
                        "invalid create option \"{other}\""
                    )))
                }
            }
        }
        Ok(mask)
    }
}

impl Default for ExportMask {
    fn default() -> Self {
        ExportMask::ALL
    }
}

impl BitOr for ExportMask {
    type Output = ExportMask;

    fn bitor(self, other: ExportMask) -> ExportMask {
        ExportMask(self.0 | other.0)
    }
}

/// Sidecar extensions, in lookup order.
pub const SIDECAR_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

// YAML reads `tiles: 16` or `palette: 112233` as numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(u64),
}

fn scalar_text<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(d)?.map(|s| match s {
        Scalar::Text(t) => t,
        Scalar::Number(n) => n.to_string(),
    }))
}

// A digits-only hex color loses its leading zeros as a number; put them back.
fn hex_text<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(d)?.map(|s| match s {
        Scalar::Text(t) => t,
        Scalar::Number(n) => format!("{n:06}"),
    }))
}

/// Raw file contents, before validation.
#[derive(Deserialize, Default, Debug)]
#[serde(default, deny_unknown_fields)]
pub struct AssetConfigFile {
    #[serde(deserialize_with = "scalar_text")]
    pub tiles: Option<String>,
    pub bpp: Option<u8>,
    /// Palette size; an alternative way of giving `bpp`.
    pub colors: Option<u32>,
    #[serde(deserialize_with = "scalar_text")]
    pub create: Option<String>,
    #[serde(deserialize_with = "hex_text")]
    pub palette: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub compression: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetConfig {
    pub tile_width: u16,
    pub tile_height: u16,
    pub bpp: u8,
    pub create: ExportMask,
    pub compression: Compression,
    /// Colors that take the first palette slots, in this order.
    pub palette: Vec<Sample>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        AssetConfig {
            tile_width: 8,
            tile_height: 8,
            bpp: Profile::default().default_bpp(),
            create: ExportMask::ALL,
            compression: Compression::None,
            palette: vec![],
        }
    }
}

impl AssetConfig {
    pub fn from_file_fields(profile: Profile, input: AssetConfigFile) -> Result<AssetConfig> {
        let bpp = match (input.bpp.filter(|&b| b != 0), input.colors) {
            (Some(b), None) => b,
            (None, None) => profile.default_bpp(),
            (bpp, Some(colors)) => {
                if !colors.is_power_of_two() {
                    return Err(ConvertError::InvalidConfiguration(format!(
                        "colors {colors} is not a power of two"
                    )));
                }
                let from_colors = colors.trailing_zeros() as u8;
                if bpp.is_some_and(|b| b != from_colors) {
                    return Err(ConvertError::InvalidConfiguration(format!(
                        "colors {colors} does not match bpp {}",
                        bpp.unwrap_or_default()
                    )));
                }
                from_colors
            }
        };
        if !profile.is_valid_bpp(bpp) {
            return Err(ConvertError::InvalidConfiguration(format!(
                "bpp {bpp} is not supported by the {profile:?} profile"
            )));
        }
        let (tile_width, tile_height) = parse_tile_size(input.tiles.as_deref().unwrap_or(""))?;
        Ok(AssetConfig {
            tile_width,
            tile_height,
            bpp,
            create: ExportMask::parse(input.create.as_deref().unwrap_or(""))?,
            compression: input.compression.as_deref().unwrap_or("").parse()?,
            palette: parse_palette(input.palette.as_deref().unwrap_or(""))?,
        })
    }

    pub fn from_json_str(profile: Profile, json: &str) -> Result<AssetConfig> {
        let input: AssetConfigFile = serde_json::from_str(json)
            .map_err(|e| ConvertError::InvalidConfiguration(e.to_string()))?;
        Self::from_file_fields(profile, input)
    }

    pub fn from_yaml_str(profile: Profile, yaml: &str) -> Result<AssetConfig> {
        let input: AssetConfigFile = if yaml.trim().is_empty() {
            AssetConfigFile::default()
        } else {
            serde_yaml::from_str(yaml)
                .map_err(|e| ConvertError::InvalidConfiguration(e.to_string()))?
        };
        Self::from_file_fields(profile, input)
    }

    /// Loads the file at `path`; `None` when it does not exist. JSON files
    /// are recognized by extension, anything else is read as YAML.
    pub fn load(profile: Profile, path: &Path) -> anyhow::Result<Option<AssetConfig>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Unable to read {}", path.display()))
            }
        };
        info!("Loading {}", path.display());
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(profile, &text),
            _ => Self::from_yaml_str(profile, &text),
        }
        .with_context(|| format!("Error in {}", path.display()))?;
        Ok(Some(config))
    }

    /// Loads the first sidecar of `image_path` that exists, or the defaults.
    pub fn load_for_image(profile: Profile, image_path: &Path) -> anyhow::Result<AssetConfig> {
        for ext in SIDECAR_EXTENSIONS {
            if let Some(config) = Self::load(profile, &image_path.with_extension(ext))? {
                return Ok(config);
            }
        }
        info!(
            "No options file for {}, using default options.",
            image_path.display()
        );
        Ok(AssetConfig {
            bpp: profile.default_bpp(),
            ..AssetConfig::default()
        })
    }
}

fn parse_dimension(s: &str) -> Option<u16> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u16>().ok().map(|v| v.max(1))
}

/// Accepts `"N"` (square tiles) or `"WxH"`. Empty means 8x8.
pub fn parse_tile_size(tiles: &str) -> Result<(u16, u16)> {
    let tiles = tiles.trim();
    if tiles.is_empty() {
        return Ok((8, 8));
    }
    let size = match tiles.split_once('x') {
        Some((w, h)) => parse_dimension(w).zip(parse_dimension(h)),
        None => parse_dimension(tiles).map(|w| (w, w)),
    };
    size.ok_or_else(|| ConvertError::InvalidConfiguration(format!("invalid tile size \"{tiles}\"")))
}

/// Parses `#RRGGBB` or `RRGGBB`.
pub fn parse_color(color: &str) -> Result<Sample> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ConvertError::InvalidConfiguration(format!(
            "invalid color \"{color}\""
        )));
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
    match (channel(0), channel(2), channel(4)) {
        (Ok(r), Ok(g), Ok(b)) => Ok(Sample::rgb(r, g, b)),
        _ => Err(ConvertError::InvalidConfiguration(format!(
            "invalid color \"{color}\""
        ))),
    }
}

pub fn parse_palette(palette: &str) -> Result<Vec<Sample>> {
    palette.split_whitespace().map(parse_color).collect()
}
