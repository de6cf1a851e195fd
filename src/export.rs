use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use itertools::Itertools;
use log::info;

use crate::product::{AssetBuffer, ConvertedAsset};

/// Writes a converted asset to `path` in some file format.
pub trait Exporter {
    fn export(&self, name: &str, asset: &ConvertedAsset, path: &Path) -> Result<()>;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportType {
    /// ca65 assembly source
    #[default]
    Ca65,
    /// Raw binary files, one per buffer
    Bin,
}

impl ExportType {
    pub fn exporter(self, segment: &str) -> Box<dyn Exporter> {
        match self {
            ExportType::Ca65 => Box::new(Ca65Exporter {
                segment: segment.to_string(),
            }),
            ExportType::Bin => Box::new(BinExporter),
        }
    }
}

/// Turns a file stem into a valid assembler symbol.
pub fn symbol_name(stem: &str) -> String {
    let mut name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

fn buffers(asset: &ConvertedAsset) -> impl Iterator<Item = (&'static str, &AssetBuffer)> {
    [("pixels", &asset.pixels), ("palette", &asset.palette)]
        .into_iter()
        .filter_map(|(kind, buf)| buf.as_ref().map(|b| (kind, b)))
}

pub struct Ca65Exporter {
    pub segment: String,
}

impl Ca65Exporter {
    pub fn render(&self, name: &str, asset: &ConvertedAsset) -> Result<String> {
        let mut out = String::new();
        out.push_str("; EXPORTED WITH TILEPACK\n");
        writeln!(out, "\t.segment \"{}\"", self.segment)?;
        for (kind, buf) in buffers(asset) {
            let label = format!("{name}_{kind}");
            writeln!(out)?;
            writeln!(
                out,
                "; {:?}, compression {}, {} bytes",
                buf.format,
                buf.compression.name(),
                buf.data.len()
            )?;
            writeln!(out, "\t.global {label}")?;
            writeln!(out, "{label}:")?;
            for line in &buf.data.iter().chunks(16) {
                writeln!(out, "\t.byte {}", line.map(|b| format!("${b:02x}")).join(","))?;
            }
        }
        Ok(out)
    }
}

impl Exporter for Ca65Exporter {
    fn export(&self, name: &str, asset: &ConvertedAsset, path: &Path) -> Result<()> {
        info!("Writing {}", path.display());
        fs::write(path, self.render(name, asset)?)
            .with_context(|| format!("Unable to write {}", path.display()))?;
        Ok(())
    }
}

/// Writes `<stem>_pixels.bin` and `<stem>_palette.bin` next to `path`.
pub struct BinExporter;

impl BinExporter {
    pub fn output_path(path: &Path, kind: &str) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!("{stem}_{kind}.bin"))
    }
}

impl Exporter for BinExporter {
    fn export(&self, _name: &str, asset: &ConvertedAsset, path: &Path) -> Result<()> {
        for (kind, buf) in buffers(asset) {
            let out_path = Self::output_path(path, kind);
            info!("Writing {}", out_path.display());
            fs::write(&out_path, &buf.data)
                .with_context(|| format!("Unable to write {}", out_path.display()))?;
        }
        Ok(())
    }
}
