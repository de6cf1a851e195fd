// Palette synthesis: fixed colors first, then every distinct image color.
use hashbrown::{HashMap, HashSet};

use crate::{
    common::{ColorIdx, NativeColor},
    error::{ConvertError, Result},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Populated entries: the fixed colors followed by the discovered ones.
    pub colors: Vec<NativeColor>,
    pub fixed_len: usize,
    pub capacity: usize,
}

impl Palette {
    /// Builds the palette for `pixels`. Fixed entries keep their order and
    /// occupy indices `0..fixed.len()`. Discovered colors follow, sorted by
    /// value so that identical input always gives an identical table.
    pub fn synthesize(
        pixels: &[NativeColor],
        fixed: &[NativeColor],
        capacity: usize,
    ) -> Result<Palette> {
        if fixed.len() > capacity {
            return Err(ConvertError::PaletteOverflow { capacity });
        }
        let mut colors: Vec<NativeColor> = fixed.to_vec();
        let mut seen: HashSet<NativeColor> = fixed.iter().copied().collect();

        for &pixel in pixels {
            if seen.insert(pixel) {
                if colors.len() == capacity {
                    return Err(ConvertError::PaletteOverflow { capacity });
                }
                colors.push(pixel);
            }
        }
        colors[fixed.len()..].sort();

        Ok(Palette {
            colors,
            fixed_len: fixed.len(),
            capacity,
        })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color-to-index map. A color listed twice resolves to its first slot.
    pub fn lookup(&self) -> HashMap<NativeColor, ColorIdx> {
        let mut map = HashMap::with_capacity(self.colors.len());
        for (i, &c) in self.colors.iter().enumerate() {
            map.entry(c).or_insert(i as ColorIdx);
        }
        map
    }

    /// Full table of `capacity` entries, unused slots zero-filled.
    pub fn entries(&self) -> Vec<NativeColor> {
        let mut entries = self.colors.clone();
        entries.resize(self.capacity.max(self.colors.len()), NativeColor(0));
        entries
    }

    /// Little-endian, two bytes per entry, padded to capacity.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.entries()
            .into_iter()
            .flat_map(NativeColor::to_le_bytes)
            .collect()
    }
}
