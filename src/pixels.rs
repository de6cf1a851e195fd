use itertools::Itertools;

use crate::{
    common::{ColorIdx, NativeColor},
    error::{ConvertError, Result},
    palette::Palette,
};

/// Replaces every pixel with its palette index.
pub fn index(pixels: &[NativeColor], palette: &Palette) -> Result<Vec<ColorIdx>> {
    let lookup = palette.lookup();
    pixels
        .iter()
        .map(|c| lookup.get(c).copied().ok_or(ConvertError::ColorNotInPalette(*c)))
        .collect()
}

fn check_bpp(bpp: u8) -> Result<()> {
    match bpp {
        1 | 2 | 4 | 8 => Ok(()),
        _ => Err(ConvertError::InvalidConfiguration(format!(
            "cannot pack indices at {bpp} bpp"
        ))),
    }
}

/// Packs `8 / bpp` indices per byte, first index in the lowest bits.
pub fn pack(indices: &[ColorIdx], bpp: u8) -> Result<Vec<u8>> {
    check_bpp(bpp)?;
    let per_byte = (8 / bpp) as usize;
    if indices.len() % per_byte != 0 {
        return Err(ConvertError::InvalidPixelCount {
            count: indices.len(),
            bpp,
        });
    }
    let mask = ((1u16 << bpp) - 1) as u8;
    Ok(indices
        .chunks_exact(per_byte)
        .map(|group| {
            group
                .iter()
                .enumerate()
                .fold(0u8, |b, (i, &idx)| b | (idx & mask) << (i * bpp as usize))
        })
        .collect())
}

pub fn unpack(data: &[u8], bpp: u8) -> Result<Vec<ColorIdx>> {
    check_bpp(bpp)?;
    let per_byte = (8 / bpp) as usize;
    let mask = ((1u16 << bpp) - 1) as u8;
    Ok(data
        .iter()
        .flat_map(|&b| (0..per_byte).map(move |i| (b >> (i * bpp as usize)) & mask))
        .collect_vec())
}

/// Unindexed output: each native color as two little-endian bytes.
pub fn direct_color_bytes(pixels: &[NativeColor]) -> Vec<u8> {
    pixels.iter().flat_map(|c| c.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_bit_pairs() {
        assert_eq!(pack(&[0x3, 0xA], 4).unwrap(), vec![0xA3]);
        assert_eq!(unpack(&[0xA3], 4).unwrap(), vec![0x3, 0xA]);
    }

    #[test]
    fn two_and_one_bit() {
        assert_eq!(pack(&[1, 2, 3, 0], 2).unwrap(), vec![0b00_11_10_01]);
        assert_eq!(
            pack(&[1, 0, 0, 0, 0, 0, 0, 1], 1).unwrap(),
            vec![0b1000_0001]
        );
        assert_eq!(unpack(&[0b00_11_10_01], 2).unwrap(), vec![1, 2, 3, 0]);
    }

    #[test]
    fn eight_bit_is_one_index_per_byte() {
        let indices: Vec<ColorIdx> = (0..=255).collect();
        assert_eq!(pack(&indices, 8).unwrap(), indices);
    }

    #[test]
    fn round_trip_all_depths() {
        for bpp in [1u8, 2, 4, 8] {
            let max = ((1u16 << bpp) - 1) as u8;
            let indices: Vec<ColorIdx> = (0..64u32).map(|i| (i * 37 % 256) as u8 & max).collect();
            let packed = pack(&indices, bpp).unwrap();
            assert_eq!(packed.len(), 64 * bpp as usize / 8);
            assert_eq!(unpack(&packed, bpp).unwrap(), indices);
        }
    }

    #[test]
    fn partial_group_is_an_error() {
        assert_eq!(
            pack(&[1, 2, 3], 4),
            Err(ConvertError::InvalidPixelCount { count: 3, bpp: 4 })
        );
        assert!(pack(&[1, 2, 3, 0, 1], 2).is_err());
        assert!(pack(&[1, 2, 3], 8).is_ok());
    }

    #[test]
    fn unsupported_depth() {
        assert!(matches!(
            pack(&[0; 8], 3),
            Err(ConvertError::InvalidConfiguration(_))
        ));
        assert!(pack(&[0; 8], 16).is_err());
    }

    #[test]
    fn indexing() {
        let pixels = vec![NativeColor(5), NativeColor(9), NativeColor(5)];
        let palette = Palette::synthesize(&pixels, &[], 4).unwrap();
        assert_eq!(index(&pixels, &palette).unwrap(), vec![0, 1, 0]);

        let other = Palette::synthesize(&[NativeColor(5)], &[], 4).unwrap();
        assert_eq!(
            index(&pixels, &other),
            Err(ConvertError::ColorNotInPalette(NativeColor(9)))
        );
    }

    #[test]
    fn direct_color() {
        assert_eq!(
            direct_color_bytes(&[NativeColor(0x01D7), NativeColor(0x7FFF)]),
            vec![0xD7, 0x01, 0xFF, 0x7F]
        );
    }
}
