use std::path::Path;

use anyhow::Result;
use log::info;

use crate::{
    config::AssetConfig,
    export::{symbol_name, ExportType},
    product::Product,
    profile::Profile,
    source::load_png,
};

pub struct Converter {
    pub profile: Profile,
    pub export_type: ExportType,
    pub segment: String,
}

impl Converter {
    pub fn new(profile: Profile, export_type: ExportType) -> Self {
        Converter {
            profile,
            export_type,
            segment: profile.default_segment().to_string(),
        }
    }

    /// Converts the PNG at `input_path`, configured by the YAML or JSON file
    /// of the same name, and writes the result to `output_path`.
    pub fn convert(&self, input_path: &Path, output_path: &Path) -> Result<()> {
        info!("Converting {}", input_path.display());
        let config = AssetConfig::load_for_image(self.profile, input_path)?;
        let image = load_png(input_path)?;
        let product = Product::load_image(self.profile, &config, &image)?;
        info!(
            "{} tiles, {} palette colors",
            product.num_tiles(),
            product.palette.as_ref().map_or(0, |p| p.len())
        );
        let asset = product.into_asset()?;

        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let exporter = self.export_type.exporter(&self.segment);
        exporter.export(&symbol_name(&stem), &asset, output_path)?;
        Ok(())
    }
}
