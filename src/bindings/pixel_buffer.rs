// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Decoded bitmaps waiting to be uploaded.

use crate::bindings::texture::Error;
use crate::pixel_formats::TextureFormat;

/// A decoded bitmap: bytes plus the layout needed to upload them.
///
/// The byte length is checked against `pitch * rows` at construction, so an upload never
/// reads past the end.
///
/// ```
/// use gl_textures::bindings::pixel_buffer::PixelBuffer;
/// use gl_textures::pixel_formats::TextureFormat;
///
/// let buffer = PixelBuffer::from_bytes(vec![0; 16 * 8 * 4], 16, 8, TextureFormat::Bgra8).unwrap();
/// assert_eq!(buffer.pitch(), 64);
/// assert_eq!(buffer.rows(), 8);
///
/// assert!(PixelBuffer::from_bytes(vec![0; 10], 16, 8, TextureFormat::Bgra8).is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: TextureFormat,
    pitch: u32,
    rows: u32,
}

/// `(pitch, rows, byte length)`, or `None` when the size is not addressable.
fn layout(width: u32, height: u32, format: TextureFormat) -> Option<(u32, u32, usize)> {
    let pitch = format.pitch(width)?;
    let rows = format.rows(height);
    let len = (pitch as usize).checked_mul(rows as usize)?;
    Some((pitch, rows, len))
}

impl PixelBuffer {
    /// A zero-filled bitmap.
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Result<Self, Error> {
        let (pitch, rows, len) =
            layout(width, height, format).ok_or(Error::PixelBufferTooLarge { width, height })?;
        Ok(PixelBuffer {
            data: vec![0; len],
            width,
            height,
            format,
            pitch,
            rows,
        })
    }

    /// Wraps decoder output.  Extra trailing bytes are allowed.
    pub fn from_bytes(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Result<Self, Error> {
        let (pitch, rows, expected) =
            layout(width, height, format).ok_or(Error::PixelBufferTooLarge { width, height })?;
        if data.len() < expected {
            return Err(Error::PixelBufferTooSmall {
                expected,
                actual: data.len(),
            });
        }
        Ok(PixelBuffer {
            data,
            width,
            height,
            format,
            pitch,
            rows,
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

    #[inline]
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Bytes per row; a row of blocks for compressed formats.
    #[inline]
    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    /// Rows of [`pitch`](Self::pitch) bytes.
    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Relabels the bytes without touching them.  Only for layouts with the same pitch.
    pub(crate) fn retag(&mut self, format: TextureFormat) {
        debug_assert_eq!(format.pitch(self.width), Some(self.pitch));
        self.format = format;
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("pitch", &self.pitch)
            .field("rows", &self.rows)
            .field("len", &self.data.len())
            .finish()
    }
}
