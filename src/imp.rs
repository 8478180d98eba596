// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The graphics-context seam.
//!
//! Everything the upload pipeline asks of the driver goes through [`GlContext`], a typed
//! subset of the GL texture API.  Two implementations ship with the crate:
//!
//! - `glow::Context` (feature `backend_glow`), the real driver
//! - [`SoftwareContext`], a CPU emulation of the GL texture state machine, used headless
//!   and in tests
//!
//! # Threading
//!
//! A GL context is a single mutable slot of global state (the active unit, the bound
//! texture, the unpack row length) belonging to whichever call last ran on the context's
//! thread.  Nothing here locks; calls take `&mut self` so one context is driven by one
//! caller at a time, and callers must not drive the same context from two threads.

use std::num::NonZeroU32;

mod error;
mod software;

#[cfg(all(feature = "backend_glow", not(target_arch = "wasm32")))]
mod glow;

pub use error::{Error, GlError};
pub use software::{Call, Level, SoftwareContext, TextureState};

/// A texture name allocated by the driver.
///
/// GL reserves name 0 for "no texture", so an unallocated texture is `Option::None`
/// rather than a zero handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureHandle(NonZeroU32);

impl TextureHandle {
    /// Wraps a raw GL name; `None` for 0.
    pub const fn from_raw(name: u32) -> Option<Self> {
        match NonZeroU32::new(name) {
            Some(n) => Some(TextureHandle(n)),
            None => None,
        }
    }
    /// The raw GL name.
    pub const fn get(self) -> u32 {
        self.0.get()
    }
    #[allow(dead_code)] //only the glow backend converts
    pub(crate) const fn from_non_zero(name: NonZeroU32) -> Self {
        TextureHandle(name)
    }
    #[allow(dead_code)] //only the glow backend converts
    pub(crate) const fn non_zero(self) -> NonZeroU32 {
        self.0
    }
}

/// Texture filter modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Nearest,
    Linear,
    LinearMipmapNearest,
    LinearMipmapLinear,
}

impl Filter {
    /// Whether sampling with this filter reads more than the base level.
    pub const fn uses_mipmaps(self) -> bool {
        matches!(self, Filter::LinearMipmapNearest | Filter::LinearMipmapLinear)
    }
}

/// Texture wrap modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wrap {
    ClampToEdge,
}

/// A single `glTexParameter` write on the bound 2D texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TexParameter {
    MinFilter(Filter),
    MagFilter(Filter),
    WrapS(Wrap),
    WrapT(Wrap),
    /// Desktop only.
    LodBias(f32),
    /// Legacy desktop only (`GL_GENERATE_MIPMAP`).
    GenerateMipmap(bool),
}

/// Uncompressed pixel formats, used both as internal and as external format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlPixelFormat {
    Rgb,
    Rgba,
    /// `GL_BGRA` on desktop, `GL_BGRA_EXT` on embedded; same value.
    Bgra,
}

impl GlPixelFormat {
    /// Components per texel, which is also bytes per texel for `GL_UNSIGNED_BYTE` data.
    pub const fn components(self) -> u32 {
        match self {
            GlPixelFormat::Rgb => 3,
            GlPixelFormat::Rgba | GlPixelFormat::Bgra => 4,
        }
    }
}

/// Block-compressed driver formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressedFormat {
    RgbaS3tcDxt1,
    RgbaS3tcDxt3,
    RgbaS3tcDxt5,
}

/// Typed subset of the GL texture API used by the upload pipeline.
///
/// All texture calls operate on the `GL_TEXTURE_2D` target of the active unit.
pub trait GlContext {
    /// `glGenTextures(1, ..)`.
    fn gen_texture(&mut self) -> Result<TextureHandle, Error>;
    /// `glDeleteTextures(1, ..)`.  Also unbinds the texture wherever it is bound.
    fn delete_texture(&mut self, handle: TextureHandle);
    /// `glActiveTexture(GL_TEXTURE0 + unit)`.
    fn active_texture(&mut self, unit: u32);
    /// `glBindTexture(GL_TEXTURE_2D, ..)`; `None` binds texture 0.
    fn bind_texture_2d(&mut self, handle: Option<TextureHandle>);
    fn tex_parameter(&mut self, parameter: TexParameter);
    /// `glPixelStorei(GL_UNPACK_ROW_LENGTH, ..)`; 0 means "rows are `width` texels".
    fn unpack_row_length(&mut self, row_length: u32);
    /// `glPixelStorei(GL_UNPACK_ALIGNMENT, ..)`; one of 1, 2, 4 or 8.  The driver default is 4.
    fn unpack_alignment(&mut self, alignment: u32);
    /// `glTexImage2D` at level 0 with `GL_UNSIGNED_BYTE` data.
    fn tex_image_2d(
        &mut self,
        internal: GlPixelFormat,
        width: u32,
        height: u32,
        external: GlPixelFormat,
        pixels: &[u8],
    );
    /// `glCompressedTexImage2D` at level 0; `data.len()` is the image size.
    fn compressed_tex_image_2d(
        &mut self,
        format: CompressedFormat,
        width: u32,
        height: u32,
        data: &[u8],
    );
    /// `glGenerateMipmap(GL_TEXTURE_2D)`.
    fn generate_mipmap(&mut self);
    /// `glGetError`; `None` once the error queue is empty.
    fn get_error(&mut self) -> Option<GlError>;
}

impl<C: GlContext + ?Sized> GlContext for &mut C {
    fn gen_texture(&mut self) -> Result<TextureHandle, Error> {
        (**self).gen_texture()
    }
    fn delete_texture(&mut self, handle: TextureHandle) {
        (**self).delete_texture(handle)
    }
    fn active_texture(&mut self, unit: u32) {
        (**self).active_texture(unit)
    }
    fn bind_texture_2d(&mut self, handle: Option<TextureHandle>) {
        (**self).bind_texture_2d(handle)
    }
    fn tex_parameter(&mut self, parameter: TexParameter) {
        (**self).tex_parameter(parameter)
    }
    fn unpack_row_length(&mut self, row_length: u32) {
        (**self).unpack_row_length(row_length)
    }
    fn unpack_alignment(&mut self, alignment: u32) {
        (**self).unpack_alignment(alignment)
    }
    fn tex_image_2d(
        &mut self,
        internal: GlPixelFormat,
        width: u32,
        height: u32,
        external: GlPixelFormat,
        pixels: &[u8],
    ) {
        (**self).tex_image_2d(internal, width, height, external, pixels)
    }
    fn compressed_tex_image_2d(
        &mut self,
        format: CompressedFormat,
        width: u32,
        height: u32,
        data: &[u8],
    ) {
        (**self).compressed_tex_image_2d(format, width, height, data)
    }
    fn generate_mipmap(&mut self) {
        (**self).generate_mipmap()
    }
    fn get_error(&mut self) -> Option<GlError> {
        (**self).get_error()
    }
}

/// `GL_UNPACK_ALIGNMENT` of a fresh context.
pub const DEFAULT_UNPACK_ALIGNMENT: u32 = 4;

/// Bytes `glTexImage2D` reads for a `width` x `height` upload of `external` texels.
///
/// Rows start every `row_length` texels (`width` when 0), rounded up to `alignment` bytes.
/// The last row is not padded.
pub const fn unpacked_len(
    width: u32,
    height: u32,
    external: GlPixelFormat,
    row_length: u32,
    alignment: u32,
) -> usize {
    if width == 0 || height == 0 {
        return 0;
    }
    let bpp = external.components() as usize;
    let row_texels = if row_length > 0 { row_length } else { width };
    let stride = unpack_stride(row_texels, external, alignment);
    stride * (height as usize - 1) + width as usize * bpp
}

/// Distance in bytes between the starts of consecutive unpacked rows.
pub const fn unpack_stride(row_texels: u32, external: GlPixelFormat, alignment: u32) -> usize {
    let alignment = if alignment == 0 { 1 } else { alignment as usize };
    (row_texels as usize * external.components() as usize).next_multiple_of(alignment)
}

/// Drains the context's error queue, logging each error.  Returns how many were drained.
///
/// Driver errors are not recovered from; this only makes them visible.
pub fn verify_state<C: GlContext + ?Sized>(ctx: &mut C, label: &str) -> usize {
    let mut drained = 0;
    while let Some(err) = ctx.get_error() {
        logwise::error_sync!(
            "GL error after {label}: {err}",
            label = logwise::privacy::LogIt(label),
            err = logwise::privacy::LogIt(&err)
        );
        drained += 1;
    }
    drained
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_system::RenderVersion;

    #[test]
    fn zero_is_not_a_handle() {
        assert_eq!(TextureHandle::from_raw(0), None);
        assert_eq!(TextureHandle::from_raw(7).map(TextureHandle::get), Some(7));
    }

    #[test]
    fn mipmap_filters() {
        assert!(!Filter::Nearest.uses_mipmaps());
        assert!(!Filter::Linear.uses_mipmaps());
        assert!(Filter::LinearMipmapNearest.uses_mipmaps());
        assert!(Filter::LinearMipmapLinear.uses_mipmaps());
    }

    #[test]
    fn unpacked_len_pads_all_but_last_row() {
        // 5 RGB texels are 15 bytes, padded to 16 at the default alignment
        assert_eq!(unpacked_len(5, 3, GlPixelFormat::Rgb, 0, 4), 16 * 2 + 15);
        assert_eq!(unpacked_len(5, 3, GlPixelFormat::Rgb, 0, 1), 45);
        assert_eq!(unpacked_len(4, 3, GlPixelFormat::Rgb, 0, 4), 36);
        assert_eq!(unpacked_len(2, 2, GlPixelFormat::Rgba, 3, 4), 12 + 8);
        assert_eq!(unpacked_len(0, 3, GlPixelFormat::Rgba, 0, 4), 0);
        assert_eq!(unpack_stride(5, GlPixelFormat::Rgb, 8), 16);
    }

    #[test]
    fn verify_state_drains_queue() {
        let mut ctx = SoftwareContext::desktop(RenderVersion::new(4, 6), 1024);
        // binding a name that was never generated is an error
        ctx.bind_texture_2d(TextureHandle::from_raw(42));
        ctx.generate_mipmap();
        assert_eq!(verify_state(&mut ctx, "test"), 2);
        assert_eq!(verify_state(&mut ctx, "test"), 0);
    }
}
