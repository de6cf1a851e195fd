use crate::error::{ConvertError, Result};

/// Cuts a row-major image into tiles and lays them out one after the other:
/// tiles go left to right, top to bottom, and each tile's pixels keep their
/// own row order. Tiling is disabled when either tile dimension is 1 or less.
pub fn retile<T: Copy>(
    pixels: &[T],
    width: usize,
    height: usize,
    tile_width: usize,
    tile_height: usize,
) -> Result<Vec<T>> {
    if tile_width <= 1 || tile_height <= 1 {
        return Ok(pixels.to_vec());
    }
    if width % tile_width != 0 || height % tile_height != 0 {
        return Err(ConvertError::InvalidImageSize {
            width,
            height,
            tile_width,
            tile_height,
        });
    }
    if pixels.len() != width * height {
        return Err(ConvertError::InvalidImage(format!(
            "{} pixels do not fill a {}x{} image",
            pixels.len(),
            width,
            height
        )));
    }

    let h_tiles = width / tile_width;
    let v_tiles = height / tile_height;
    let mut out = Vec::with_capacity(pixels.len());
    for ty in 0..v_tiles {
        for tx in 0..h_tiles {
            for py in 0..tile_height {
                let row_start = (ty * tile_height + py) * width + tx * tile_width;
                out.extend_from_slice(&pixels[row_start..row_start + tile_width]);
            }
        }
    }
    Ok(out)
}
