// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Pixel format tags for decoded bitmaps headed to the GPU.
//!
//! A decoder hands us bytes plus a [`TextureFormat`] describing how those bytes are laid out.
//! The format determines three things the upload pipeline cares about:
//!
//! - whether the bitmap is block-compressed (and therefore uploaded through the compressed path)
//! - the pitch, i.e. the byte stride of one row
//! - the row count, which for block-compressed data counts rows of 4x4 blocks rather than texels
//!
//! # Examples
//!
//! ```
//! use gl_textures::pixel_formats::TextureFormat;
//!
//! assert_eq!(TextureFormat::Bgra8.pitch(100), Some(400));
//! assert_eq!(TextureFormat::Rgb8.pitch(100), Some(300));
//!
//! // 4x4 blocks, 8 bytes each
//! assert_eq!(TextureFormat::Dxt1.pitch(100), Some(200));
//! assert_eq!(TextureFormat::Dxt1.rows(100), 25);
//! ```

/*
Quick note on type design.  Unlike a middleware that knows its formats at compile time,
the format here is whatever the decoder happened to produce, so it is a runtime tag.
The set of outcomes is small and closed, which is what an enum is for.
 */

/// Mask over [`TextureFormat::code`] selecting the block-compressed formats.
pub const DXT_MASK: u32 = 0x0F;

/// Layout of a decoded bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// S3TC DXT1, 8 bytes per 4x4 block.
    Dxt1,
    /// S3TC DXT3, 16 bytes per 4x4 block.
    Dxt3,
    /// S3TC DXT5, 16 bytes per 4x4 block.
    Dxt5,
    /// DXT5 with YCoCg-encoded color. Uploads as plain DXT5; the shader decodes the color.
    Dxt5YCoCg,
    /// 32-bit color, bytes in memory are B, G, R, A.
    ///
    /// This is what most decoders emit, and it is the format whose upload path depends
    /// on driver byte-order support.
    Bgra8,
    /// 32-bit color, bytes in memory are R, G, B, A.
    Rgba8,
    /// 24-bit color, bytes in memory are R, G, B.
    Rgb8,
}

impl TextureFormat {
    /// Parses a legacy numeric format code.
    ///
    /// ```
    /// use gl_textures::pixel_formats::TextureFormat;
    /// assert_eq!(TextureFormat::from_code(16), Some(TextureFormat::Bgra8));
    /// assert_eq!(TextureFormat::from_code(3), None);
    /// ```
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(TextureFormat::Dxt1),
            2 => Some(TextureFormat::Dxt3),
            4 => Some(TextureFormat::Dxt5),
            8 => Some(TextureFormat::Dxt5YCoCg),
            16 => Some(TextureFormat::Bgra8),
            64 => Some(TextureFormat::Rgba8),
            128 => Some(TextureFormat::Rgb8),
            _ => None,
        }
    }

    /// The legacy numeric code for this format.
    pub const fn code(self) -> u32 {
        match self {
            TextureFormat::Dxt1 => 1,
            TextureFormat::Dxt3 => 2,
            TextureFormat::Dxt5 => 4,
            TextureFormat::Dxt5YCoCg => 8,
            TextureFormat::Bgra8 => 16,
            TextureFormat::Rgba8 => 64,
            TextureFormat::Rgb8 => 128,
        }
    }

    /// Whether the bitmap is stored as compressed 4x4 blocks.
    #[inline]
    pub const fn is_compressed(self) -> bool {
        self.code() & DXT_MASK != 0
    }

    /// Bytes per 4x4 block for compressed formats, bytes per texel otherwise.
    pub const fn bytes_per_unit(self) -> u32 {
        match self {
            TextureFormat::Dxt1 => 8,
            TextureFormat::Dxt3 | TextureFormat::Dxt5 | TextureFormat::Dxt5YCoCg => 16,
            TextureFormat::Bgra8 | TextureFormat::Rgba8 => 4,
            TextureFormat::Rgb8 => 3,
        }
    }

    /// Byte stride of one row for a bitmap `width` texels wide.
    ///
    /// For compressed formats one "row" is a row of blocks.
    /// `None` if the row does not fit in a `u32`.
    pub const fn pitch(self, width: u32) -> Option<u32> {
        if self.is_compressed() {
            width.div_ceil(4).checked_mul(self.bytes_per_unit())
        } else {
            width.checked_mul(self.bytes_per_unit())
        }
    }

    /// Number of rows of [`pitch`](Self::pitch) bytes for a bitmap `height` texels tall.
    pub const fn rows(self, height: u32) -> u32 {
        if self.is_compressed() {
            height.div_ceil(4)
        } else {
            height
        }
    }
}

/// Operations supported by pixel types.
pub(crate) trait CPixelTrait {
    /// Compute the average of an array of pixels.
    ///
    /// Used for mipmap generation.
    fn avg<const C: usize>(arr: &[Self; C]) -> Self
    where
        Self: Sized;
}

/// RGBA pixel with 8-bit normalized unsigned values.
///
/// This is the canonical texel the software context stores, regardless of the external
/// byte order the bitmap was uploaded with.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unorm4 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Unorm4 {
    /// Opaque pixel from red, green and blue.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Unorm4 { r, g, b, a: 255 }
    }
}

impl CPixelTrait for Unorm4 {
    fn avg<const C: usize>(arr: &[Self; C]) -> Self {
        let mut sum = (0, 0, 0, 0);
        for i in arr {
            sum.0 += i.r as u32;
            sum.1 += i.g as u32;
            sum.2 += i.b as u32;
            sum.3 += i.a as u32;
        }
        let c = C as u32;
        Unorm4 {
            r: (sum.0 / c) as u8,
            g: (sum.1 / c) as u8,
            b: (sum.2 / c) as u8,
            a: (sum.3 / c) as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for format in [
            TextureFormat::Dxt1,
            TextureFormat::Dxt3,
            TextureFormat::Dxt5,
            TextureFormat::Dxt5YCoCg,
            TextureFormat::Bgra8,
            TextureFormat::Rgba8,
            TextureFormat::Rgb8,
        ] {
            assert_eq!(TextureFormat::from_code(format.code()), Some(format));
        }
        assert_eq!(TextureFormat::from_code(0), None);
        assert_eq!(TextureFormat::from_code(32), None);
    }

    #[test]
    fn compressed_mask() {
        assert!(TextureFormat::Dxt1.is_compressed());
        assert!(TextureFormat::Dxt5YCoCg.is_compressed());
        assert!(!TextureFormat::Bgra8.is_compressed());
        assert!(!TextureFormat::Rgb8.is_compressed());
    }

    #[test]
    fn block_rows_round_up() {
        assert_eq!(TextureFormat::Dxt5.pitch(5), Some(32));
        assert_eq!(TextureFormat::Dxt5.rows(5), 2);
        assert_eq!(TextureFormat::Dxt3.pitch(256), Some(1024));
        assert_eq!(TextureFormat::Dxt3.rows(256), 64);
        assert_eq!(TextureFormat::Rgba8.rows(7), 7);
    }

    #[test]
    fn pitch_overflow() {
        assert_eq!(TextureFormat::Bgra8.pitch(1 << 30), None);
        assert_eq!(TextureFormat::Rgb8.pitch(u32::MAX), None);
        assert_eq!(TextureFormat::Dxt5.pitch(u32::MAX), None);
        // 2^28 blocks of 8 bytes still fits
        assert_eq!(TextureFormat::Dxt1.pitch(1 << 30), Some(1 << 31));
    }

    #[test]
    fn avg_of_four() {
        let px = [
            Unorm4::opaque(0, 0, 0),
            Unorm4::opaque(100, 0, 0),
            Unorm4::opaque(0, 200, 0),
            Unorm4::opaque(0, 0, 40),
        ];
        assert_eq!(Unorm4::avg(&px), Unorm4::opaque(25, 50, 10));
    }
}
