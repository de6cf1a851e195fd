//! LZ77 stream as consumed by the GBA/DS BIOS `LZ77UnComp` routines.
//!
//! Layout: a 4-byte header (tag `0x10`, then the uncompressed length as 24-bit
//! little-endian), followed by blocks of one flag byte and up to 8 sub-blocks.
//! Flag bits are read MSB first; a set bit marks a 2-byte back-reference, a
//! clear bit a single literal byte.

use anyhow::{bail, ensure, Result};

pub const TAG: u8 = 0x10;
pub const MIN_MATCH: usize = 3;
pub const MAX_MATCH: usize = 15 + MIN_MATCH;
pub const WINDOW: usize = 4096;
pub const MAX_UNCOMPRESSED_LEN: usize = (1 << 24) - 1;

/// Compresses `data` with a greedy longest-match search.
///
/// Output is byte-identical to the reference encoder: displacements are tried
/// from 1 upwards and only a strictly longer match replaces the current best,
/// so ties go to the nearest copy. Only the low 24 bits of the length fit in
/// the header; callers must keep `data` within `MAX_UNCOMPRESSED_LEN`.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::with_capacity(4 + data.len() + data.len() / 8 + 1);
    let len = (data.len() as u32).to_le_bytes();
    out.extend([TAG, len[0], len[1], len[2]]);

    let mut cursor = 0;
    while cursor < data.len() {
        let flags_pos = out.len();
        out.push(0);
        let mut flags: u8 = 0;
        for block in 0..8 {
            match find_match(data, cursor) {
                Some((disp, length)) => {
                    flags |= 0x80 >> block;
                    let d = disp - 1;
                    out.push(((length - MIN_MATCH) << 4 | (d >> 8) & 0x0F) as u8);
                    out.push((d & 0xFF) as u8);
                    cursor += length;
                }
                None => {
                    out.push(data[cursor]);
                    cursor += 1;
                }
            }
            if cursor >= data.len() {
                break;
            }
        }
        out[flags_pos] = flags;
    }
    out
}

// Returns (displacement, length) of the longest match at `cursor`, if one is
// long enough to encode. The source may run into the bytes being matched.
fn find_match(data: &[u8], cursor: usize) -> Option<(usize, usize)> {
    let max_len = MAX_MATCH.min(data.len() - cursor);
    if max_len < MIN_MATCH {
        return None;
    }
    let mut best: Option<(usize, usize)> = None;
    let mut best_len = 0;
    for disp in 1..=WINDOW.min(cursor) {
        let start = cursor - disp;
        let length = (0..max_len)
            .take_while(|&i| data[start + i] == data[cursor + i])
            .count();
        if length > best_len && length >= MIN_MATCH {
            best_len = length;
            best = Some((disp, length));
            if length == max_len {
                // Nothing later in the scan can be strictly longer.
                break;
            }
        }
    }
    best
}

/// Decodes a stream produced by `compress` (or by any conforming encoder).
pub fn decompress(stream: &[u8]) -> Result<Vec<u8>> {
    ensure!(stream.len() >= 4, "LZ77 stream shorter than its header");
    ensure!(stream[0] == TAG, "invalid LZ77 header tag: {:#04X}", stream[0]);
    let size = stream[1] as usize | (stream[2] as usize) << 8 | (stream[3] as usize) << 16;

    let mut pos = 4;
    let mut next = || -> Result<u8> {
        let Some(&b) = stream.get(pos) else {
            bail!("LZ77 stream truncated at offset {pos}");
        };
        pos += 1;
        Ok(b)
    };

    let mut out: Vec<u8> = Vec::with_capacity(size);
    while out.len() < size {
        let flags = next()?;
        for block in 0..8 {
            if out.len() >= size {
                // Trailing flag bits of the last block are unused.
                break;
            }
            if flags & (0x80 >> block) != 0 {
                let b0 = next()?;
                let b1 = next()?;
                let length = (b0 >> 4) as usize + MIN_MATCH;
                let disp = ((b0 & 0x0F) as usize) << 8 | b1 as usize;
                let disp = disp + 1;
                ensure!(
                    disp <= out.len(),
                    "back-reference displacement {} before start of output ({})",
                    disp,
                    out.len()
                );
                let start = out.len() - disp;
                for i in start..(start + length) {
                    out.push(out[i]);
                }
            } else {
                out.push(next()?);
            }
        }
    }
    // A back-reference may overshoot the declared length; the hardware stops writing there.
    out.truncate(size);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn empty_input_is_just_a_header() {
        let packed = compress(&[]);
        assert_eq!(packed, vec![0x10, 0, 0, 0]);
        assert_eq!(decompress(&packed).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn repeating_pattern_uses_back_reference() {
        let data = [1, 2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3];
        let packed = compress(&data);
        // header + flags + 3 literals + 1 back-reference
        assert_eq!(packed.len(), 4 + 1 + 3 + 2);
        assert_eq!(packed[..4], [0x10, 12, 0, 0]);
        assert_eq!(packed[4], 0b0001_0000);
        assert_eq!(packed[5..8], [1, 2, 3]);
        // length 9 -> 6 in the high nibble, displacement 3 -> stored as 2
        assert_eq!(packed[8..10], [0x60, 0x02]);
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    #[test]
    fn run_of_one_byte_overlaps_itself() {
        let data = [7u8; 19];
        let packed = compress(&data);
        // literal, then a displacement-1 copy of 18 bytes
        assert_eq!(packed, vec![0x10, 19, 0, 0, 0b0100_0000, 7, 0xF0, 0x00]);
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    #[test]
    fn ties_prefer_nearest_copy() {
        // The final "abc" can be copied from distance 4 or 8.
        let data = b"abcXabcYabc";
        let packed = compress(data);
        assert_eq!(
            packed,
            vec![0x10, 11, 0, 0, 0b0000_1010, b'a', b'b', b'c', b'X', 0x00, 0x03, b'Y', 0x00, 0x03]
        );
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    #[test]
    fn multiple_blocks() {
        let data: Vec<u8> = (0..=255).collect();
        let packed = compress(&data);
        // no repeats at all: 32 blocks of flags + 8 literals
        assert_eq!(packed.len(), 4 + 32 * 9);
        assert!(packed[4..].chunks(9).all(|c| c[0] == 0));
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    // Marker, filler without marker bytes, marker again `distance` bytes later.
    fn marker_at_distance(distance: usize) -> Vec<u8> {
        let marker = [0xAA, 0xBB, 0xCC];
        let mut data = marker.to_vec();
        data.extend((0..distance - marker.len()).map(|i| (i % 0xA0) as u8));
        data.extend(marker);
        data
    }

    // Walks a stream: `Err(byte)` for literals, `Ok((displacement, length))` for copies.
    fn tokens(stream: &[u8]) -> Vec<std::result::Result<(usize, usize), u8>> {
        let size = stream[1] as usize | (stream[2] as usize) << 8 | (stream[3] as usize) << 16;
        let (mut pos, mut produced, mut out) = (4, 0, vec![]);
        while produced < size {
            let flags = stream[pos];
            pos += 1;
            for block in 0..8 {
                if produced >= size {
                    break;
                }
                if flags & (0x80 >> block) != 0 {
                    let (b0, b1) = (stream[pos], stream[pos + 1]);
                    pos += 2;
                    let length = (b0 >> 4) as usize + MIN_MATCH;
                    out.push(Ok(((((b0 & 0x0F) as usize) << 8 | b1 as usize) + 1, length)));
                    produced += length;
                } else {
                    out.push(Err(stream[pos]));
                    pos += 1;
                    produced += 1;
                }
            }
        }
        out
    }

    #[test]
    fn match_at_far_edge_of_window() {
        let data = marker_at_distance(WINDOW);
        let packed = compress(&data);
        // length 3, displacement 4096 stored as 0xFFF
        assert_eq!(packed[packed.len() - 2..], [0x0F, 0xFF]);
        assert_eq!(tokens(&packed).last(), Some(&Ok((WINDOW, 3))));
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    #[test]
    fn match_beyond_window_is_literal() {
        let data = marker_at_distance(WINDOW + 1);
        let packed = compress(&data);
        let toks = tokens(&packed);
        assert_eq!(toks[toks.len() - 3..], [Err(0xAA), Err(0xBB), Err(0xCC)]);
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    #[test]
    fn random_round_trip() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        for test in 0..10 {
            let len = 6000 + test;
            let data: Vec<u8> = (0..len)
                .map(|_| (rng.gen_range(0..=(test % 10) as u8)) << (test % 4))
                .collect();
            assert_eq!(decompress(&compress(&data)).unwrap(), data);
        }
    }

    #[test]
    fn long_range_matches_stay_in_window() {
        let mut rng = StdRng::seed_from_u64(42);
        let chunk: Vec<u8> = (0..5000).map(|_| rng.gen()).collect();
        let mut data = chunk.clone();
        data.extend(&chunk);
        let packed = compress(&data);
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    #[test]
    fn rejects_bad_streams() {
        assert!(decompress(&[0x10, 1]).is_err());
        assert!(decompress(&[0x11, 0, 0, 0]).is_err());
        // declares 4 bytes but holds one literal
        assert!(decompress(&[0x10, 4, 0, 0, 0x00, 9]).is_err());
        // back-reference before any output
        assert!(decompress(&[0x10, 3, 0, 0, 0x80, 0x00, 0x00]).is_err());
    }
}
