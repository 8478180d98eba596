// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! `glow` backend.
//!
//! The glow context is both the graphics context and the capability provider; capabilities
//! come from the version string and extension list glow parses at load time.

use glow::HasContext;

use crate::imp::{
    unpacked_len, CompressedFormat, Error, Filter, GlContext, GlError, GlPixelFormat,
    TexParameter, TextureHandle, Wrap,
};
use crate::render_system::{RenderApi, RenderSystem, RenderVersion};

// Extension and compatibility-profile enums, spelled out so we don't depend on which
// registry glow was generated from.
const COMPRESSED_RGBA_S3TC_DXT1_EXT: u32 = 0x83F1;
const COMPRESSED_RGBA_S3TC_DXT3_EXT: u32 = 0x83F2;
const COMPRESSED_RGBA_S3TC_DXT5_EXT: u32 = 0x83F3;
const GENERATE_MIPMAP: u32 = 0x8191;
const TEXTURE_LOD_BIAS: u32 = 0x8501;
const BGRA_EXT: u32 = 0x80E1;

const fn filter(f: Filter) -> i32 {
    (match f {
        Filter::Nearest => glow::NEAREST,
        Filter::Linear => glow::LINEAR,
        Filter::LinearMipmapNearest => glow::LINEAR_MIPMAP_NEAREST,
        Filter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
    }) as i32
}

const fn wrap(w: Wrap) -> i32 {
    (match w {
        Wrap::ClampToEdge => glow::CLAMP_TO_EDGE,
    }) as i32
}

const fn pixel_format(f: GlPixelFormat) -> u32 {
    match f {
        GlPixelFormat::Rgb => glow::RGB,
        GlPixelFormat::Rgba => glow::RGBA,
        GlPixelFormat::Bgra => BGRA_EXT,
    }
}

const fn compressed_format(f: CompressedFormat) -> u32 {
    match f {
        CompressedFormat::RgbaS3tcDxt1 => COMPRESSED_RGBA_S3TC_DXT1_EXT,
        CompressedFormat::RgbaS3tcDxt3 => COMPRESSED_RGBA_S3TC_DXT3_EXT,
        CompressedFormat::RgbaS3tcDxt5 => COMPRESSED_RGBA_S3TC_DXT5_EXT,
    }
}

fn native(handle: TextureHandle) -> glow::NativeTexture {
    glow::NativeTexture(handle.non_zero())
}

/// Bytes the driver will read for this upload under the current unpack state.
fn upload_len(ctx: &glow::Context, width: u32, height: u32, external: GlPixelFormat) -> usize {
    // SAFETY: state queries on the current context.
    let version = ctx.version();
    let row_length = if !version.is_embedded || version.major >= 3 {
        unsafe { ctx.get_parameter_i32(glow::UNPACK_ROW_LENGTH) }
    } else {
        0
    };
    let alignment = unsafe { ctx.get_parameter_i32(glow::UNPACK_ALIGNMENT) };
    unpacked_len(
        width,
        height,
        external,
        row_length.max(0) as u32,
        alignment.max(1) as u32,
    )
}

// SAFETY (all blocks below): glow marks every GL entry point unsafe.  Callers uphold the
// context contract: the context is current on this thread and handles came from it.
// Uploads never hand the driver a slice shorter than it reads.
impl GlContext for glow::Context {
    fn gen_texture(&mut self) -> Result<TextureHandle, Error> {
        let texture = unsafe { self.create_texture() }.map_err(Error::CreateTexture)?;
        Ok(TextureHandle::from_non_zero(texture.0))
    }

    fn delete_texture(&mut self, handle: TextureHandle) {
        unsafe { HasContext::delete_texture(self, native(handle)) }
    }

    fn active_texture(&mut self, unit: u32) {
        unsafe { HasContext::active_texture(self, glow::TEXTURE0 + unit) }
    }

    fn bind_texture_2d(&mut self, handle: Option<TextureHandle>) {
        unsafe { self.bind_texture(glow::TEXTURE_2D, handle.map(native)) }
    }

    fn tex_parameter(&mut self, parameter: TexParameter) {
        unsafe {
            match parameter {
                TexParameter::MinFilter(f) => {
                    self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, filter(f))
                }
                TexParameter::MagFilter(f) => {
                    self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, filter(f))
                }
                TexParameter::WrapS(w) => {
                    self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrap(w))
                }
                TexParameter::WrapT(w) => {
                    self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrap(w))
                }
                TexParameter::LodBias(bias) => {
                    self.tex_parameter_f32(glow::TEXTURE_2D, TEXTURE_LOD_BIAS, bias)
                }
                TexParameter::GenerateMipmap(on) => {
                    self.tex_parameter_i32(glow::TEXTURE_2D, GENERATE_MIPMAP, on as i32)
                }
            }
        }
    }

    fn unpack_row_length(&mut self, row_length: u32) {
        unsafe { self.pixel_store_i32(glow::UNPACK_ROW_LENGTH, row_length as i32) }
    }

    fn unpack_alignment(&mut self, alignment: u32) {
        unsafe { self.pixel_store_i32(glow::UNPACK_ALIGNMENT, alignment as i32) }
    }

    fn tex_image_2d(
        &mut self,
        internal: GlPixelFormat,
        width: u32,
        height: u32,
        external: GlPixelFormat,
        pixels: &[u8],
    ) {
        let needed = upload_len(self, width, height, external);
        if pixels.len() < needed {
            logwise::error_sync!(
                "refusing {width}x{height} upload: {len} bytes given, driver reads {needed}",
                width = width,
                height = height,
                len = pixels.len(),
                needed = needed
            );
            return;
        }
        unsafe {
            HasContext::tex_image_2d(
                self,
                glow::TEXTURE_2D,
                0,
                pixel_format(internal) as i32,
                width as i32,
                height as i32,
                0,
                pixel_format(external),
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(pixels)),
            )
        }
    }

    fn compressed_tex_image_2d(
        &mut self,
        format: CompressedFormat,
        width: u32,
        height: u32,
        data: &[u8],
    ) {
        unsafe {
            HasContext::compressed_tex_image_2d(
                self,
                glow::TEXTURE_2D,
                0,
                compressed_format(format) as i32,
                width as i32,
                height as i32,
                0,
                data.len() as i32,
                data,
            )
        }
    }

    fn generate_mipmap(&mut self) {
        unsafe { HasContext::generate_mipmap(self, glow::TEXTURE_2D) }
    }

    fn get_error(&mut self) -> Option<GlError> {
        GlError::from_code(unsafe { HasContext::get_error(self) })
    }
}

impl RenderSystem for glow::Context {
    fn render_api(&self) -> RenderApi {
        if self.version().is_embedded {
            RenderApi::Embedded
        } else {
            RenderApi::Desktop
        }
    }

    fn render_version(&self) -> RenderVersion {
        let version = self.version();
        RenderVersion::new(version.major, version.minor)
    }

    fn max_texture_size(&self) -> u32 {
        let size = unsafe { self.get_parameter_i32(glow::MAX_TEXTURE_SIZE) };
        size.max(0) as u32
    }

    fn supports_bgra(&self) -> bool {
        let extensions = self.supported_extensions();
        extensions.contains("GL_EXT_texture_format_BGRA8888")
            || extensions.contains("GL_IMG_texture_format_BGRA8888")
    }

    fn supports_bgra_apple(&self) -> bool {
        self.supported_extensions()
            .contains("GL_APPLE_texture_format_BGRA8888")
    }
}
