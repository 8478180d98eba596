// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Builder pattern for texture configuration.

use crate::bindings::sampler::ScalingMethod;
use crate::pixel_formats::TextureFormat;

/// Per-texture settings: what the bitmap is and how the texture samples it.
///
/// Width, height and format describe the bitmap for reporting.  They start as the values
/// given to [`builder`](Self::builder) and follow each buffer passed to
/// [`GlTexture::update`](crate::GlTexture::update).  Uploads read their layout from the
/// [`PixelBuffer`](crate::bindings::pixel_buffer::PixelBuffer) alone.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureConfig {
    width: u32,
    height: u32,
    format: TextureFormat,
    mipmaps: bool,
    scaling: ScalingMethod,
    cache_memory: bool,
    debug_name: String,
}

impl TextureConfig {
    /// Starts a builder with the required parameters.
    ///
    /// `width`, `height` and `format` are the expected bitmap layout, replaced by the actual
    /// one on every update.
    ///
    /// ```
    /// use gl_textures::bindings::sampler::ScalingMethod;
    /// use gl_textures::bindings::texture_config::TextureConfig;
    /// use gl_textures::pixel_formats::TextureFormat;
    ///
    /// let config = TextureConfig::builder(64, 64, TextureFormat::Rgb8)
    ///     .with_mipmaps(true)
    ///     .with_scaling(ScalingMethod::Nearest)
    ///     .with_debug_name("thumb")
    ///     .build();
    /// assert!(config.mipmaps());
    /// assert!(!config.cache_memory());
    /// ```
    pub fn builder(width: u32, height: u32, format: TextureFormat) -> TextureConfigBuilder {
        TextureConfigBuilder::new(width, height, format)
    }

    /// Width of the current bitmap (initially the builder's), before any clamping.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the current bitmap (initially the builder's), before any clamping.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Format of the current bitmap, `Rgba8` once a software swap has rewritten it.
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn mipmaps(&self) -> bool {
        self.mipmaps
    }

    pub fn scaling(&self) -> ScalingMethod {
        self.scaling
    }

    /// Keep the pixel buffer after upload.
    pub fn cache_memory(&self) -> bool {
        self.cache_memory
    }

    pub fn debug_name(&self) -> &str {
        &self.debug_name
    }

    pub(crate) fn set_extent(&mut self, width: u32, height: u32, format: TextureFormat) {
        self.width = width;
        self.height = height;
        self.format = format;
    }

    pub(crate) fn set_format(&mut self, format: TextureFormat) {
        self.format = format;
    }

    pub(crate) fn set_mipmaps(&mut self, mipmaps: bool) {
        self.mipmaps = mipmaps;
    }

    pub(crate) fn set_scaling(&mut self, scaling: ScalingMethod) {
        self.scaling = scaling;
    }

    pub(crate) fn set_cache_memory(&mut self, cache_memory: bool) {
        self.cache_memory = cache_memory;
    }
}

/// Builder for [`TextureConfig`].
///
/// Defaults: no mipmaps, linear scaling, buffer freed after upload, empty debug name.
#[derive(Debug, Clone)]
pub struct TextureConfigBuilder {
    width: u32,
    height: u32,
    format: TextureFormat,
    mipmaps: Option<bool>,
    scaling: Option<ScalingMethod>,
    cache_memory: Option<bool>,
    debug_name: Option<String>,
}

impl TextureConfigBuilder {
    /// Create a new builder with required parameters.
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
            mipmaps: None,
            scaling: None,
            cache_memory: None,
            debug_name: None,
        }
    }

    /// Set whether to generate mipmaps.
    pub fn with_mipmaps(mut self, mipmaps: bool) -> Self {
        self.mipmaps = Some(mipmaps);
        self
    }

    /// Set the scaling filter.
    pub fn with_scaling(mut self, scaling: ScalingMethod) -> Self {
        self.scaling = Some(scaling);
        self
    }

    /// Set whether the pixel buffer is retained after upload.
    pub fn with_cache_memory(mut self, cache_memory: bool) -> Self {
        self.cache_memory = Some(cache_memory);
        self
    }

    /// Set the name used in log messages.
    pub fn with_debug_name(mut self, debug_name: impl Into<String>) -> Self {
        self.debug_name = Some(debug_name.into());
        self
    }

    pub fn build(self) -> TextureConfig {
        TextureConfig {
            width: self.width,
            height: self.height,
            format: self.format,
            mipmaps: self.mipmaps.unwrap_or(false),
            scaling: self.scaling.unwrap_or_default(),
            cache_memory: self.cache_memory.unwrap_or(false),
            debug_name: self.debug_name.unwrap_or_default(),
        }
    }
}
