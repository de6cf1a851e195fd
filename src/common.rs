pub type ColorValue = u8; // 8-bit channel value of a decoded sample (0-255)
pub type ColorIdx = u8; // Index into a palette (0-255)

// Decoded image colors and console colors are both plain integers underneath,
// and mixing them up silently produces garbage graphics. So the console format
// gets its own type:
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NativeColor(pub u16);

impl NativeColor {
    pub fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }
}

impl std::fmt::Display for NativeColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:04X}", self.0)
    }
}

/// A 32-bit RGBA color as produced by image decoding.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub struct Sample {
    pub red: ColorValue,
    pub green: ColorValue,
    pub blue: ColorValue,
    pub alpha: ColorValue,
}

impl Sample {
    pub const fn rgba(
        red: ColorValue,
        green: ColorValue,
        blue: ColorValue,
        alpha: ColorValue,
    ) -> Self {
        Sample {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub const fn rgb(red: ColorValue, green: ColorValue, blue: ColorValue) -> Self {
        Self::rgba(red, green, blue, 0xFF)
    }

    /// Packs the sample as 0xAABBGGRR.
    pub fn to_u32(self) -> u32 {
        (self.alpha as u32) << 24
            | (self.blue as u32) << 16
            | (self.green as u32) << 8
            | self.red as u32
    }

    pub fn from_u32(c: u32) -> Self {
        Sample {
            red: c as u8,
            green: (c >> 8) as u8,
            blue: (c >> 16) as u8,
            alpha: (c >> 24) as u8,
        }
    }
}
