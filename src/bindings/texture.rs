// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! GL texture objects.

A [`GlTexture`] owns at most one hardware texture name.  The name is created lazily by the
first [`load_to_gpu`](GlTexture::load_to_gpu) and survives later uploads; only
[`destroy_texture_object`](GlTexture::destroy_texture_object) (or drop) gives it back,
through the [`TextureRegistry`].

```
use std::sync::Arc;
use gl_textures::bindings::pixel_buffer::PixelBuffer;
use gl_textures::bindings::texture::GlTexture;
use gl_textures::bindings::texture_config::TextureConfig;
use gl_textures::imp::SoftwareContext;
use gl_textures::pixel_formats::TextureFormat;
use gl_textures::registry::HwTextureRegistry;
use gl_textures::render_system::RenderVersion;

let mut ctx = SoftwareContext::desktop(RenderVersion::new(3, 3), 2048);
let registry = Arc::new(HwTextureRegistry::new());
let config = TextureConfig::builder(16, 16, TextureFormat::Bgra8).with_mipmaps(true).build();

let mut texture = GlTexture::new(config, &ctx, registry.clone());
texture.update(PixelBuffer::new(16, 16, TextureFormat::Bgra8).unwrap());
texture.load_to_gpu(&mut ctx).unwrap();
assert!(texture.is_loaded());
assert!(texture.pixels().is_none());

texture.bind_to_unit(&mut ctx, 2);
assert_eq!(ctx.bound_texture(2), texture.handle());

drop(texture);
assert_eq!(registry.free_unused(&mut ctx), 1);
```
*/

use std::fmt::Display;
use std::sync::Arc;

use crate::bindings::pixel_buffer::PixelBuffer;
use crate::bindings::sampler::ScalingMethod;
use crate::bindings::texture_config::TextureConfig;
use crate::bindings::upload::{ClampedExtent, UploadDispatch, UploadPlan};
use crate::bittricks::swap_blue_red;
use crate::imp::{self, DEFAULT_UNPACK_ALIGNMENT, GlContext, TextureHandle, verify_state};
use crate::pixel_formats::TextureFormat;
use crate::registry::TextureRegistry;
use crate::render_system::{Capabilities, RenderSystem};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The graphics context refused a request.
    Backend(#[from] imp::Error),
    /// A pixel buffer holds fewer bytes than its pitch and row count require.
    PixelBufferTooSmall { expected: usize, actual: usize },
    /// The bitmap's byte size does not fit in memory addressing.
    PixelBufferTooLarge { width: u32, height: u32 },
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Backend(e) => write!(f, "{}", e),
            Error::PixelBufferTooSmall { expected, actual } => write!(
                f,
                "pixel buffer too small: expected at least {} bytes, got {}",
                expected, actual
            ),
            Error::PixelBufferTooLarge { width, height } => {
                write!(f, "pixel buffer too large: {}x{}", width, height)
            }
        }
    }
}

/// A 2D texture backed by a GL texture object.
///
/// All methods that take a context must run on the thread that owns it.  The texture itself
/// is `Send`; dropping it on another thread only queues its name with the registry.
pub struct GlTexture {
    handle: Option<TextureHandle>,
    config: TextureConfig,
    caps: Capabilities,
    pixels: Option<PixelBuffer>,
    loaded_to_gpu: bool,
    last_extent: Option<ClampedExtent>,
    registry: Arc<dyn TextureRegistry>,
}

impl GlTexture {
    /// Creates a texture with no pixels and no hardware name.
    ///
    /// Capabilities are read from `render_system` once, here.
    pub fn new<R: RenderSystem + ?Sized>(
        config: TextureConfig,
        render_system: &R,
        registry: Arc<dyn TextureRegistry>,
    ) -> Self {
        let caps = Capabilities::resolve(render_system);
        logwise::trace_sync!(
            "GlTexture::new {name} caps {caps}",
            name = logwise::privacy::LogIt(config.debug_name()),
            caps = logwise::privacy::LogIt(&caps)
        );
        GlTexture {
            handle: None,
            config,
            caps,
            pixels: None,
            loaded_to_gpu: false,
            last_extent: None,
            registry,
        }
    }

    /// Allocates the hardware name.
    ///
    /// A texture holds one name at a time: calling this again before
    /// [`destroy_texture_object`](Self::destroy_texture_object) is a bug, caught in debug
    /// builds, and otherwise returns the existing name.
    pub fn create_texture_object<C: GlContext + ?Sized>(
        &mut self,
        ctx: &mut C,
    ) -> Result<TextureHandle, Error> {
        debug_assert!(self.handle.is_none(), "texture object already created");
        if let Some(handle) = self.handle {
            return Ok(handle);
        }
        let handle = ctx.gen_texture()?;
        logwise::trace_sync!(
            "created texture object {handle} for {name}",
            handle = handle.get(),
            name = logwise::privacy::LogIt(self.config.debug_name())
        );
        self.handle = Some(handle);
        Ok(handle)
    }

    /// Gives the hardware name back to the registry.  No-op without one.
    ///
    /// The next [`load_to_gpu`](Self::load_to_gpu) with pixels creates a fresh name.
    pub fn destroy_texture_object(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.registry.release_hw_texture(handle);
        }
        self.loaded_to_gpu = false;
    }

    /// Binds this texture to `GL_TEXTURE_2D` on texture unit `unit`.
    pub fn bind_to_unit<C: GlContext + ?Sized>(&self, ctx: &mut C, unit: u32) {
        if self.handle.is_none() {
            logwise::warn_sync!(
                "binding {name} to unit {unit} before it was uploaded",
                name = logwise::privacy::LogIt(self.config.debug_name()),
                unit = unit
            );
        }
        ctx.active_texture(unit);
        ctx.bind_texture_2d(self.handle);
    }

    /// Replaces the bitmap.  The hardware name is kept; the next
    /// [`load_to_gpu`](Self::load_to_gpu) uploads into it.
    pub fn update(&mut self, pixels: PixelBuffer) {
        self.config
            .set_extent(pixels.width(), pixels.height(), pixels.format());
        self.pixels = Some(pixels);
        self.loaded_to_gpu = false;
    }

    /// Uploads the pending bitmap, if any.
    ///
    /// Without a bitmap, or when the current one is already resident, this does nothing and
    /// returns `Ok(None)`.  A retained bitmap (see
    /// [`TextureConfig::cache_memory`]) is uploaded again after
    /// [`destroy_texture_object`](Self::destroy_texture_object).  Otherwise it
    /// returns the extent that was uploaded, which is smaller than requested when the
    /// bitmap exceeds the driver's maximum texture size.
    ///
    /// Driver errors raised during the upload are logged, not returned.
    pub fn load_to_gpu<C: GlContext + RenderSystem + ?Sized>(
        &mut self,
        ctx: &mut C,
    ) -> Result<Option<ClampedExtent>, Error> {
        if self.pixels.is_none() || self.loaded_to_gpu {
            // nothing to load, the bitmap has not changed
            return Ok(None);
        }
        let handle = match self.handle {
            Some(handle) => handle,
            None => self.create_texture_object(ctx)?,
        };
        ctx.bind_texture_2d(Some(handle));

        let max_texture_size = ctx.max_texture_size();
        let Some(pixels) = self.pixels.as_mut() else {
            return Ok(None);
        };
        let plan = UploadPlan::new(
            pixels,
            self.config.mipmaps(),
            self.config.scaling(),
            &self.caps,
            max_texture_size,
        );
        logwise::trace_sync!(
            "load_to_gpu {name} plan {plan}",
            name = logwise::privacy::LogIt(self.config.debug_name()),
            plan = logwise::privacy::LogIt(&plan)
        );
        plan.sampler.apply(ctx);

        let extent = plan.extent;
        if let Some(row_length) = extent.unpack_row_length {
            ctx.unpack_row_length(row_length);
        }
        if let Some(alignment) = plan.unpack_alignment {
            ctx.unpack_alignment(alignment);
        }

        match plan.dispatch {
            UploadDispatch::Compressed { format, image_size } => {
                ctx.compressed_tex_image_2d(
                    format,
                    extent.width,
                    extent.height,
                    &pixels.as_bytes()[..image_size],
                );
            }
            UploadDispatch::Uncompressed {
                internal,
                external,
                swap_red_blue,
            } => {
                if swap_red_blue {
                    let swap = logwise::perfwarn_begin!("swap_blue_red");
                    let pitch = pixels.pitch();
                    swap_blue_red(pixels.as_bytes_mut(), extent.height, pitch);
                    drop(swap);
                    // the bytes are RGBA now; a retained buffer must not be swapped again
                    pixels.retag(TextureFormat::Rgba8);
                    self.config.set_format(TextureFormat::Rgba8);
                }
                ctx.tex_image_2d(internal, extent.width, extent.height, external, pixels.as_bytes());
            }
        }

        if plan.generate_mipmap {
            ctx.generate_mipmap();
        }
        if plan.reset_unpack_row_length {
            ctx.unpack_row_length(0);
        }
        if plan.unpack_alignment.is_some() {
            ctx.unpack_alignment(DEFAULT_UNPACK_ALIGNMENT);
        }
        verify_state(ctx, self.config.debug_name());

        if !self.config.cache_memory() {
            self.pixels = None;
        }
        self.last_extent = Some(extent);
        self.loaded_to_gpu = true;
        Ok(Some(extent))
    }

    /// The hardware name, if one is allocated.
    pub fn handle(&self) -> Option<TextureHandle> {
        self.handle
    }

    /// Whether the current bitmap has been uploaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded_to_gpu
    }

    /// The pending or retained bitmap.
    pub fn pixels(&self) -> Option<&PixelBuffer> {
        self.pixels.as_ref()
    }

    pub fn config(&self) -> &TextureConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// Extent of the most recent upload.
    pub fn last_extent(&self) -> Option<ClampedExtent> {
        self.last_extent
    }

    /// Takes effect on the next upload.
    pub fn set_mipmapping(&mut self, mipmaps: bool) {
        self.config.set_mipmaps(mipmaps);
    }

    /// Takes effect on the next upload.
    pub fn set_scaling_method(&mut self, scaling: ScalingMethod) {
        self.config.set_scaling(scaling);
    }

    /// Takes effect on the next upload.
    pub fn set_cache_memory(&mut self, cache_memory: bool) {
        self.config.set_cache_memory(cache_memory);
    }
}

impl Drop for GlTexture {
    fn drop(&mut self) {
        self.destroy_texture_object();
    }
}

impl std::fmt::Debug for GlTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlTexture")
            .field("handle", &self.handle)
            .field("config", &self.config)
            .field("caps", &self.caps)
            .field("pixels", &self.pixels)
            .field("loaded_to_gpu", &self.loaded_to_gpu)
            .finish_non_exhaustive()
    }
}
