// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
byte shuffling for pixel rows.
*/

/// Swaps the red and blue bytes of every 4-byte pixel, row by row.
///
/// Walks `height` rows of `pitch` bytes each. Bytes in a row past the last whole pixel
/// (padding) are left alone, as are rows past `height`. If `pixels` is shorter than
/// `height * pitch`, only the whole rows present are touched.
///
/// ```
/// use gl_textures::bittricks::swap_blue_red;
///
/// let mut row = [1, 2, 3, 4, 5, 6, 7, 8];
/// swap_blue_red(&mut row, 1, 8);
/// assert_eq!(row, [3, 2, 1, 4, 7, 6, 5, 8]);
/// ```
pub fn swap_blue_red(pixels: &mut [u8], height: u32, pitch: u32) {
    if pitch == 0 {
        return;
    }
    for row in pixels.chunks_exact_mut(pitch as usize).take(height as usize) {
        for pixel in row.chunks_exact_mut(4) {
            pixel.swap(0, 2);
        }
    }
}
