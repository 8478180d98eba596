// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! A CPU emulation of the GL texture state machine.
//!
//! [`SoftwareContext`] keeps the state a driver keeps for 2D textures: allocated names,
//! per-unit bindings, sampler parameters, unpack row length and alignment, level images and an error
//! queue.  It also reports its own capabilities as a [`RenderSystem`], so one value can be
//! configured as a desktop GL 2.1 driver, an embedded driver without BGRA, and so on.
//!
//! Every call is appended to a log ([`SoftwareContext::calls`]) so callers can check what
//! was dispatched, in order.
//!
//! Where the real API would read out of bounds or accept a format pairing it does not
//! support, the emulation records a [`GlError`] instead and leaves the texture unchanged.
//! Names are never reused after deletion.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};

use crate::bindings::software::texture::Texture;
use crate::imp::{
    unpack_stride, unpacked_len, CompressedFormat, DEFAULT_UNPACK_ALIGNMENT, Error, Filter,
    GlContext, GlError, GlPixelFormat, TexParameter, TextureHandle, Wrap,
};
use crate::render_system::{RenderApi, RenderSystem, RenderVersion};

/// One recorded call on a [`SoftwareContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GenTexture(TextureHandle),
    DeleteTexture(TextureHandle),
    ActiveTexture(u32),
    BindTexture2d(Option<TextureHandle>),
    TexParameter(TexParameter),
    UnpackRowLength(u32),
    UnpackAlignment(u32),
    TexImage2d {
        internal: GlPixelFormat,
        external: GlPixelFormat,
        width: u32,
        height: u32,
        /// The bytes as handed to the driver.
        pixels: Vec<u8>,
    },
    CompressedTexImage2d {
        format: CompressedFormat,
        width: u32,
        height: u32,
        image_size: usize,
    },
    GenerateMipmap,
}

/// One image level of a texture.
#[derive(Debug, Clone, PartialEq)]
pub enum Level {
    Texels {
        internal: GlPixelFormat,
        texture: Texture,
    },
    Compressed {
        format: CompressedFormat,
        width: u32,
        height: u32,
        data: Vec<u8>,
    },
    /// A level the driver derived from a compressed base; contents are not emulated.
    Derived { width: u32, height: u32 },
}

impl Level {
    pub fn width(&self) -> u32 {
        match self {
            Level::Texels { texture, .. } => texture.width(),
            Level::Compressed { width, .. } | Level::Derived { width, .. } => *width,
        }
    }
    pub fn height(&self) -> u32 {
        match self {
            Level::Texels { texture, .. } => texture.height(),
            Level::Compressed { height, .. } | Level::Derived { height, .. } => *height,
        }
    }
}

/// Driver-side state of one texture name.
///
/// Sampler fields are `None` until first set, meaning the driver default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureState {
    pub min_filter: Option<Filter>,
    pub mag_filter: Option<Filter>,
    pub wrap_s: Option<Wrap>,
    pub wrap_t: Option<Wrap>,
    pub lod_bias: f32,
    pub generate_mipmap: bool,
    pub levels: Vec<Level>,
}

impl TextureState {
    fn rebuild_mip_chain(&mut self) {
        self.levels.truncate(1);
        let Some(base) = self.levels.first().cloned() else {
            return;
        };
        let mut previous = base;
        while previous.width() > 1 || previous.height() > 1 {
            let next = match &previous {
                Level::Texels { internal, texture } => Level::Texels {
                    internal: *internal,
                    texture: texture.downsample(),
                },
                Level::Compressed { width, height, .. } | Level::Derived { width, height } => {
                    Level::Derived {
                        width: (width / 2).max(1),
                        height: (height / 2).max(1),
                    }
                }
            };
            self.levels.push(next.clone());
            previous = next;
        }
    }
}

/// CPU graphics context.  See the [module documentation](self).
#[derive(Debug)]
pub struct SoftwareContext {
    api: RenderApi,
    version: RenderVersion,
    max_texture_size: u32,
    supports_bgra: bool,
    supports_bgra_apple: bool,
    max_texture_size_queries: Cell<u32>,
    next_name: u32,
    active_unit: u32,
    bound: HashMap<u32, TextureHandle>,
    textures: HashMap<TextureHandle, TextureState>,
    unpack_row_length: u32,
    unpack_alignment: u32,
    errors: VecDeque<GlError>,
    calls: Vec<Call>,
}

impl SoftwareContext {
    fn new(api: RenderApi, version: RenderVersion, max_texture_size: u32) -> Self {
        Self {
            api,
            version,
            max_texture_size,
            supports_bgra: false,
            supports_bgra_apple: false,
            max_texture_size_queries: Cell::new(0),
            next_name: 1,
            active_unit: 0,
            bound: HashMap::new(),
            textures: HashMap::new(),
            unpack_row_length: 0,
            unpack_alignment: DEFAULT_UNPACK_ALIGNMENT,
            errors: VecDeque::new(),
            calls: Vec::new(),
        }
    }

    /// A desktop GL context.
    pub fn desktop(version: RenderVersion, max_texture_size: u32) -> Self {
        Self::new(RenderApi::Desktop, version, max_texture_size)
    }

    /// A GL ES context with neither BGRA extension.
    pub fn embedded(version: RenderVersion, max_texture_size: u32) -> Self {
        Self::new(RenderApi::Embedded, version, max_texture_size)
    }

    /// Advertise the standard BGRA extension.
    pub fn with_bgra(mut self, supported: bool) -> Self {
        self.supports_bgra = supported;
        self
    }

    /// Advertise the vendor BGRA extension.
    pub fn with_bgra_apple(mut self, supported: bool) -> Self {
        self.supports_bgra_apple = supported;
        self
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Returns the call log and starts a new one.
    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    /// Driver state for `handle`, if it is a live name.
    pub fn texture(&self, handle: TextureHandle) -> Option<&TextureState> {
        self.textures.get(&handle)
    }

    /// Number of live texture names.
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// The texture bound to `GL_TEXTURE_2D` on `unit`.
    pub fn bound_texture(&self, unit: u32) -> Option<TextureHandle> {
        self.bound.get(&unit).copied()
    }

    pub fn active_unit(&self) -> u32 {
        self.active_unit
    }

    /// Current `GL_UNPACK_ROW_LENGTH`.
    pub fn current_unpack_row_length(&self) -> u32 {
        self.unpack_row_length
    }

    /// Current `GL_UNPACK_ALIGNMENT`.
    pub fn current_unpack_alignment(&self) -> u32 {
        self.unpack_alignment
    }

    /// How many times [`RenderSystem::max_texture_size`] was asked.
    pub fn max_texture_size_queries(&self) -> u32 {
        self.max_texture_size_queries.get()
    }

    fn raise(&mut self, error: GlError) {
        self.errors.push_back(error);
    }

    fn bound_state(&mut self) -> Option<&mut TextureState> {
        let handle = self.bound.get(&self.active_unit).copied()?;
        self.textures.get_mut(&handle)
    }

    /// Checks an internal/external pairing against what this driver accepts.
    fn check_formats(&self, internal: GlPixelFormat, external: GlPixelFormat) -> Option<GlError> {
        match self.api {
            RenderApi::Desktop => match internal {
                GlPixelFormat::Bgra => Some(GlError::InvalidValue),
                _ => None,
            },
            RenderApi::Embedded => {
                let bgra_ok = self.supports_bgra || self.supports_bgra_apple;
                if (internal == GlPixelFormat::Bgra || external == GlPixelFormat::Bgra) && !bgra_ok {
                    return Some(GlError::InvalidEnum);
                }
                match (internal, external) {
                    (a, b) if a == b => None,
                    (GlPixelFormat::Rgba, GlPixelFormat::Bgra) if self.supports_bgra_apple => None,
                    _ => Some(GlError::InvalidOperation),
                }
            }
        }
    }
}

impl GlContext for SoftwareContext {
    fn gen_texture(&mut self) -> Result<TextureHandle, Error> {
        let handle = TextureHandle::from_raw(self.next_name)
            .ok_or_else(|| Error::CreateTexture("texture names exhausted".to_string()))?;
        self.next_name = self.next_name.wrapping_add(1);
        self.textures.insert(handle, TextureState::default());
        self.calls.push(Call::GenTexture(handle));
        Ok(handle)
    }

    fn delete_texture(&mut self, handle: TextureHandle) {
        self.calls.push(Call::DeleteTexture(handle));
        if self.textures.remove(&handle).is_some() {
            self.bound.retain(|_, bound| *bound != handle);
        }
    }

    fn active_texture(&mut self, unit: u32) {
        self.calls.push(Call::ActiveTexture(unit));
        self.active_unit = unit;
    }

    fn bind_texture_2d(&mut self, handle: Option<TextureHandle>) {
        self.calls.push(Call::BindTexture2d(handle));
        match handle {
            None => {
                self.bound.remove(&self.active_unit);
            }
            Some(h) if self.textures.contains_key(&h) => {
                self.bound.insert(self.active_unit, h);
            }
            Some(_) => self.raise(GlError::InvalidOperation),
        }
    }

    fn tex_parameter(&mut self, parameter: TexParameter) {
        self.calls.push(Call::TexParameter(parameter));
        let embedded = self.api == RenderApi::Embedded;
        if embedded && matches!(parameter, TexParameter::LodBias(_) | TexParameter::GenerateMipmap(_)) {
            self.raise(GlError::InvalidEnum);
            return;
        }
        if matches!(parameter, TexParameter::MagFilter(f) if f.uses_mipmaps()) {
            self.raise(GlError::InvalidEnum);
            return;
        }
        let Some(state) = self.bound_state() else {
            self.raise(GlError::InvalidOperation);
            return;
        };
        match parameter {
            TexParameter::MinFilter(f) => state.min_filter = Some(f),
            TexParameter::MagFilter(f) => state.mag_filter = Some(f),
            TexParameter::WrapS(w) => state.wrap_s = Some(w),
            TexParameter::WrapT(w) => state.wrap_t = Some(w),
            TexParameter::LodBias(bias) => state.lod_bias = bias,
            TexParameter::GenerateMipmap(on) => state.generate_mipmap = on,
        }
    }

    fn unpack_row_length(&mut self, row_length: u32) {
        self.calls.push(Call::UnpackRowLength(row_length));
        if self.api == RenderApi::Embedded && self.version.major < 3 {
            self.raise(GlError::InvalidEnum);
            return;
        }
        self.unpack_row_length = row_length;
    }

    fn unpack_alignment(&mut self, alignment: u32) {
        self.calls.push(Call::UnpackAlignment(alignment));
        if !matches!(alignment, 1 | 2 | 4 | 8) {
            self.raise(GlError::InvalidValue);
            return;
        }
        self.unpack_alignment = alignment;
    }

    fn tex_image_2d(
        &mut self,
        internal: GlPixelFormat,
        width: u32,
        height: u32,
        external: GlPixelFormat,
        pixels: &[u8],
    ) {
        self.calls.push(Call::TexImage2d {
            internal,
            external,
            width,
            height,
            pixels: pixels.to_vec(),
        });
        if width > self.max_texture_size || height > self.max_texture_size {
            self.raise(GlError::InvalidValue);
            return;
        }
        if let Some(err) = self.check_formats(internal, external) {
            self.raise(err);
            return;
        }
        let needed = unpacked_len(
            width,
            height,
            external,
            self.unpack_row_length,
            self.unpack_alignment,
        );
        if pixels.len() < needed {
            self.raise(GlError::InvalidOperation);
            return;
        }
        let row_texels = if self.unpack_row_length > 0 {
            self.unpack_row_length
        } else {
            width
        };
        let stride = unpack_stride(row_texels, external, self.unpack_alignment);
        let Some(texture) = Texture::unpack(pixels, width, height, stride, external) else {
            self.raise(GlError::InvalidOperation);
            return;
        };
        let legacy_flag = self.api == RenderApi::Desktop;
        let Some(state) = self.bound_state() else {
            self.raise(GlError::InvalidOperation);
            return;
        };
        state.levels = vec![Level::Texels { internal, texture }];
        if legacy_flag && state.generate_mipmap {
            state.rebuild_mip_chain();
        }
    }

    fn compressed_tex_image_2d(
        &mut self,
        format: CompressedFormat,
        width: u32,
        height: u32,
        data: &[u8],
    ) {
        self.calls.push(Call::CompressedTexImage2d {
            format,
            width,
            height,
            image_size: data.len(),
        });
        let block_bytes = match format {
            CompressedFormat::RgbaS3tcDxt1 => 8,
            CompressedFormat::RgbaS3tcDxt3 | CompressedFormat::RgbaS3tcDxt5 => 16,
        };
        let expected = width.div_ceil(4) as usize * height.div_ceil(4) as usize * block_bytes;
        if width > self.max_texture_size || height > self.max_texture_size || data.len() != expected {
            self.raise(GlError::InvalidValue);
            return;
        }
        let legacy_flag = self.api == RenderApi::Desktop;
        let Some(state) = self.bound_state() else {
            self.raise(GlError::InvalidOperation);
            return;
        };
        state.levels = vec![Level::Compressed {
            format,
            width,
            height,
            data: data.to_vec(),
        }];
        if legacy_flag && state.generate_mipmap {
            state.rebuild_mip_chain();
        }
    }

    fn generate_mipmap(&mut self) {
        self.calls.push(Call::GenerateMipmap);
        match self.bound_state() {
            Some(state) if !state.levels.is_empty() => state.rebuild_mip_chain(),
            _ => self.raise(GlError::InvalidOperation),
        }
    }

    fn get_error(&mut self) -> Option<GlError> {
        self.errors.pop_front()
    }
}

impl RenderSystem for SoftwareContext {
    fn render_api(&self) -> RenderApi {
        self.api
    }
    fn render_version(&self) -> RenderVersion {
        self.version
    }
    fn max_texture_size(&self) -> u32 {
        self.max_texture_size_queries
            .set(self.max_texture_size_queries.get() + 1);
        self.max_texture_size
    }
    fn supports_bgra(&self) -> bool {
        self.supports_bgra
    }
    fn supports_bgra_apple(&self) -> bool {
        self.supports_bgra_apple
    }
}
