// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! Software texture storage for the CPU graphics context.

This module holds texel data the way a driver would after `glTexImage2D` has unpacked it:
tightly packed, row-major, canonical RGBA regardless of the byte order the caller uploaded.

# Coordinate Systems

- Origin (0, 0) is at the top-left
- X increases to the right
- Y increases downward

# Example

```
use gl_textures::bindings::software::texture::{Texture, Texel};
use gl_textures::pixel_formats::Unorm4;

let mut texture = Texture::new(4, 4, Unorm4::default());
texture[Texel { x: 1, y: 2 }] = Unorm4::opaque(255, 0, 0);
assert_eq!(texture[Texel { x: 1, y: 2 }].r, 255);
```
*/

use std::ops::{Index, IndexMut};

use crate::imp::GlPixelFormat;
use crate::pixel_formats::{CPixelTrait, Unorm4};

/// Integer texture coordinates.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Texel {
    pub x: u32,
    pub y: u32,
}

impl Texel {
    /// The origin texel at coordinates (0, 0).
    pub const ZERO: Texel = Texel { x: 0, y: 0 };

    const fn vec_offset(&self, width: u32) -> usize {
        width as usize * self.y as usize + self.x as usize
    }
}

/// A 2D array of RGBA texels.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    data: Vec<Unorm4>,
    width: u32,
    height: u32,
}

impl Texture {
    /// Creates a texture with all texels set to `initialize_element`.
    pub fn new(width: u32, height: u32, initialize_element: Unorm4) -> Self {
        Self {
            width,
            height,
            data: vec![initialize_element; width as usize * height as usize],
        }
    }

    /// Creates a texture with texels computed by `initialize_with`.
    pub fn new_with<F: Fn(Texel) -> Unorm4>(width: u32, height: u32, initialize_with: F) -> Self {
        let mut vec = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                vec.push(initialize_with(Texel { x, y }))
            }
        }
        Self {
            width,
            height,
            data: vec,
        }
    }

    /// Unpacks `width` x `height` texels of `external` layout from `bytes`.
    ///
    /// Row `y` starts at `y * stride`.  Returns `None` if `bytes` does not reach the end of
    /// the last row.
    pub fn unpack(
        bytes: &[u8],
        width: u32,
        height: u32,
        stride: usize,
        external: GlPixelFormat,
    ) -> Option<Self> {
        let bpp = external.components() as usize;
        let row_bytes = width as usize * bpp;
        if height > 0 {
            let needed = stride * (height as usize - 1) + row_bytes;
            if bytes.len() < needed {
                return None;
            }
        }
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height as usize {
            let row = &bytes[y * stride..y * stride + row_bytes];
            for px in row.chunks_exact(bpp) {
                data.push(match external {
                    GlPixelFormat::Rgb => Unorm4::opaque(px[0], px[1], px[2]),
                    GlPixelFormat::Rgba => Unorm4 {
                        r: px[0],
                        g: px[1],
                        b: px[2],
                        a: px[3],
                    },
                    GlPixelFormat::Bgra => Unorm4 {
                        r: px[2],
                        g: px[1],
                        b: px[0],
                        a: px[3],
                    },
                });
            }
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major texel data.
    #[inline]
    pub fn texture_data(&self) -> &[Unorm4] {
        &self.data
    }

    /// The next mip level: half size in each dimension (minimum 1), 2x2 box filtered.
    ///
    /// Odd edges reuse the last row or column.
    pub fn downsample(&self) -> Texture {
        let mip_width = (self.width / 2).max(1);
        let mip_height = (self.height / 2).max(1);
        let last_x = self.width.saturating_sub(1);
        let last_y = self.height.saturating_sub(1);
        Texture::new_with(mip_width, mip_height, |texel| {
            let base_x = (texel.x * 2).min(last_x);
            let base_y = (texel.y * 2).min(last_y);
            let right = (base_x + 1).min(last_x);
            let down = (base_y + 1).min(last_y);
            Unorm4::avg(&[
                self[Texel { x: base_x, y: base_y }],
                self[Texel { x: right, y: base_y }],
                self[Texel { x: base_x, y: down }],
                self[Texel { x: right, y: down }],
            ])
        })
    }
}

impl Index<Texel> for Texture {
    type Output = Unorm4;

    fn index(&self, index: Texel) -> &Self::Output {
        assert!(index.x < self.width && index.y < self.height);
        &self.data[index.vec_offset(self.width)]
    }
}

impl IndexMut<Texel> for Texture {
    fn index_mut(&mut self, index: Texel) -> &mut Self::Output {
        assert!(index.x < self.width && index.y < self.height);
        &mut self.data[index.vec_offset(self.width)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpack_bgra_is_canonical() {
        let bytes = [10, 20, 30, 40];
        let t = Texture::unpack(&bytes, 1, 1, 4, GlPixelFormat::Bgra).unwrap();
        assert_eq!(t[Texel::ZERO], Unorm4 { r: 30, g: 20, b: 10, a: 40 });
    }

    #[test]
    fn unpack_respects_stride() {
        // 1x2 RGB with a 4-byte stride
        let bytes = [1, 2, 3, 0, 4, 5, 6];
        let t = Texture::unpack(&bytes, 1, 2, 4, GlPixelFormat::Rgb).unwrap();
        assert_eq!(t[Texel { x: 0, y: 1 }], Unorm4::opaque(4, 5, 6));
    }

    #[test]
    fn unpack_short_buffer() {
        let bytes = [0u8; 7];
        assert!(Texture::unpack(&bytes, 1, 2, 4, GlPixelFormat::Rgba).is_none());
    }

    #[test]
    fn downsample_box_filter() {
        let t = Texture::new_with(2, 2, |texel| {
            Unorm4::opaque((texel.x * 100) as u8, (texel.y * 100) as u8, 0)
        });
        let mip = t.downsample();
        assert_eq!((mip.width(), mip.height()), (1, 1));
        assert_eq!(mip[Texel::ZERO], Unorm4::opaque(50, 50, 0));
    }

    #[test]
    fn downsample_odd_and_thin() {
        let t = Texture::new(3, 1, Unorm4::opaque(9, 9, 9));
        let mip = t.downsample();
        assert_eq!((mip.width(), mip.height()), (1, 1));
        assert_eq!(mip[Texel::ZERO], Unorm4::opaque(9, 9, 9));
    }
}
