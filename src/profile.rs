use clap::ValueEnum;

use crate::color::ColorFormat;

/// Target hardware. Everything that differs between consoles hangs off this.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    #[default]
    Snes,
}

impl Profile {
    pub fn color_format(self) -> ColorFormat {
        match self {
            Profile::Snes => ColorFormat::Bgr15,
        }
    }

    pub fn is_valid_bpp(self, bpp: u8) -> bool {
        match self {
            // BG modes use 4, 16 or 256 colors. 16 bpp produces unindexed
            // direct color, for data that isn't fed to the PPU as-is.
            Profile::Snes => matches!(bpp, 2 | 4 | 8 | 16),
        }
    }

    pub fn default_bpp(self) -> u8 {
        match self {
            Profile::Snes => 4,
        }
    }

    pub fn default_segment(self) -> &'static str {
        match self {
            Profile::Snes => "GRAPHICS",
        }
    }
}
