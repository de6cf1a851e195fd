// The conversion pipeline. A product owns every buffer of one conversion.
use log::{debug, warn};

use crate::{
    color::{self, ColorFormat},
    common::{ColorIdx, NativeColor, Sample},
    compression::Compression,
    config::{AssetConfig, ExportMask},
    error::{ConvertError, Result},
    palette::Palette,
    pixels,
    profile::Profile,
    source::ImageSource,
    tiles,
};

#[derive(Clone, Debug, PartialEq, Eq)]
enum PixelData {
    Direct(Vec<NativeColor>),
    Indexed(Vec<ColorIdx>),
}

#[derive(Clone, Debug)]
pub struct Product {
    pub profile: Profile,
    pub config: AssetConfig,
    // After tiling the image is a strip one tile wide.
    pub width: usize,
    pub height: usize,
    pub palette: Option<Palette>,
    pixels: PixelData,
}

/// One output buffer with the format needed to interpret it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetBuffer {
    pub format: ColorFormat,
    pub compression: Compression,
    pub data: Vec<u8>,
}

/// What a conversion hands to an exporter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertedAsset {
    pub pixels: Option<AssetBuffer>,
    pub palette: Option<AssetBuffer>,
}

fn read_samples(image: &dyn ImageSource) -> Result<Vec<Sample>> {
    if image.origin() != (0, 0) {
        let (x, y) = image.origin();
        return Err(ConvertError::InvalidImage(format!(
            "lower boundary must be zero, got ({x}, {y})"
        )));
    }
    let (width, height) = (image.width(), image.height());
    let mut samples = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            samples.push(image.sample(x, y));
        }
    }
    Ok(samples)
}

impl Product {
    /// Runs the whole pipeline: color conversion, tiling, and for indexed
    /// depths palette synthesis plus indexing.
    pub fn load_image(
        profile: Profile,
        config: &AssetConfig,
        image: &dyn ImageSource,
    ) -> Result<Product> {
        let samples = read_samples(image)?;
        let format = profile.color_format();
        let native = color::convert_samples(&samples, format)?;
        debug!(
            "Converted {}x{} image to {:?}",
            image.width(),
            image.height(),
            format
        );

        let (tw, th) = (config.tile_width as usize, config.tile_height as usize);
        let native = tiles::retile(&native, image.width(), image.height(), tw, th)?;
        let (width, height) = if tw <= 1 || th <= 1 {
            (image.width(), image.height())
        } else {
            (tw, native.len() / tw)
        };

        let mut product = Product {
            profile,
            config: config.clone(),
            width,
            height,
            palette: None,
            pixels: PixelData::Direct(vec![]),
        };
        if config.bpp <= 8 {
            let fixed = color::convert_samples(&config.palette, format)?;
            let palette = Palette::synthesize(&native, &fixed, 1usize << config.bpp)?;
            debug!(
                "Palette: {} fixed + {} discovered colors, capacity {}",
                palette.fixed_len,
                palette.len() - palette.fixed_len,
                palette.capacity
            );
            product.pixels = PixelData::Indexed(pixels::index(&native, &palette)?);
            product.palette = Some(palette);
        } else {
            product.pixels = PixelData::Direct(native);
        }
        Ok(product)
    }

    pub fn pixel_format(&self) -> ColorFormat {
        match &self.pixels {
            PixelData::Direct(_) => self.profile.color_format(),
            PixelData::Indexed(_) => {
                ColorFormat::indexed(self.config.bpp).unwrap_or(self.profile.color_format())
            }
        }
    }

    pub fn palette_format(&self) -> ColorFormat {
        self.profile.color_format()
    }

    pub fn pixel_count(&self) -> usize {
        match &self.pixels {
            PixelData::Direct(p) => p.len(),
            PixelData::Indexed(p) => p.len(),
        }
    }

    pub fn indices(&self) -> Option<&[ColorIdx]> {
        match &self.pixels {
            PixelData::Indexed(p) => Some(p),
            PixelData::Direct(_) => None,
        }
    }

    pub fn num_tiles(&self) -> usize {
        let tile_size = self.config.tile_width as usize * self.config.tile_height as usize;
        self.pixel_count() / tile_size.max(1)
    }

    /// Packed pixel data, compressed as configured.
    pub fn pixel_bytes(&self) -> Result<Vec<u8>> {
        let data = match &self.pixels {
            PixelData::Direct(p) => pixels::direct_color_bytes(p),
            PixelData::Indexed(p) => pixels::pack(p, self.config.bpp)?,
        };
        self.config.compression.apply(data)
    }

    /// Palette padded to `2^bpp` entries; `None` for direct color.
    pub fn palette_bytes(&self) -> Option<Vec<u8>> {
        self.palette.as_ref().map(Palette::to_bytes)
    }

    /// Collects the outputs selected by the config's export mask.
    pub fn into_asset(self) -> Result<ConvertedAsset> {
        let create = self.config.create;
        if create != ExportMask::ALL && create.contains(ExportMask::MAP) {
            warn!("Tile maps are not generated; ignoring \"map\" in create options.");
        }
        let pixels = if create.contains(ExportMask::PIXELS) {
            Some(AssetBuffer {
                format: self.pixel_format(),
                compression: self.config.compression,
                data: self.pixel_bytes()?,
            })
        } else {
            None
        };
        let palette = match self.palette_bytes() {
            Some(data) if create.contains(ExportMask::PALETTE) => Some(AssetBuffer {
                format: self.palette_format(),
                compression: Compression::None,
                data,
            }),
            _ => None,
        };
        Ok(ConvertedAsset { pixels, palette })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SampleGrid;

    struct Offset(SampleGrid);

    impl ImageSource for Offset {
        fn origin(&self) -> (i64, i64) {
            (1, 0)
        }
        fn width(&self) -> usize {
            self.0.width()
        }
        fn height(&self) -> usize {
            self.0.height()
        }
        fn sample(&self, x: usize, y: usize) -> Sample {
            self.0.sample(x, y)
        }
    }

    fn checker(width: usize, height: usize) -> SampleGrid {
        SampleGrid::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Sample::rgb(255, 255, 255)
            } else {
                Sample::rgb(0, 0, 0)
            }
        })
    }

    #[test]
    fn rejects_nonzero_origin() {
        let image = Offset(checker(8, 8));
        let err = Product::load_image(Profile::Snes, &AssetConfig::default(), &image).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidImage(_)));
    }

    #[test]
    fn strip_dimensions_after_tiling() {
        let product =
            Product::load_image(Profile::Snes, &AssetConfig::default(), &checker(16, 8)).unwrap();
        assert_eq!((product.width, product.height), (8, 16));
        assert_eq!(product.num_tiles(), 2);
        assert_eq!(product.pixel_format(), ColorFormat::Indexed4);
    }

    #[test]
    fn untiled_keeps_dimensions() {
        let config = AssetConfig {
            tile_width: 1,
            tile_height: 1,
            ..AssetConfig::default()
        };
        let product = Product::load_image(Profile::Snes, &config, &checker(6, 4)).unwrap();
        assert_eq!((product.width, product.height), (6, 4));
        assert_eq!(product.pixel_bytes().unwrap().len(), 12);
    }

    #[test]
    fn direct_color_has_no_palette() {
        let config = AssetConfig {
            bpp: 16,
            ..AssetConfig::default()
        };
        let product = Product::load_image(Profile::Snes, &config, &checker(8, 8)).unwrap();
        assert!(product.palette.is_none());
        assert_eq!(product.pixel_format(), ColorFormat::Bgr15);
        let bytes = product.pixel_bytes().unwrap();
        assert_eq!(bytes.len(), 128);
        assert_eq!(bytes[..4], [0xFF, 0x7F, 0x00, 0x00]);
        let asset = product.into_asset().unwrap();
        assert!(asset.palette.is_none());
    }

    #[test]
    fn export_mask_selects_buffers() {
        let config = AssetConfig {
            create: ExportMask::PALETTE,
            ..AssetConfig::default()
        };
        let asset = Product::load_image(Profile::Snes, &config, &checker(8, 8))
            .unwrap()
            .into_asset()
            .unwrap();
        assert!(asset.pixels.is_none());
        assert_eq!(asset.palette.unwrap().data.len(), 32);
    }
}
