// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! Render-system capability queries.

The render system is whatever owns the graphics context and knows what the driver can do.
Textures ask it two kinds of questions:

- Once, at construction: API flavor, version and byte-order extension support.  The
answers are frozen into a [`Capabilities`] snapshot; driver capabilities do not change
for the life of the process.
- Per upload: the maximum texture dimension, see [`RenderSystem::max_texture_size`].
*/

/// Which flavor of the graphics API the context speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderApi {
    /// Desktop OpenGL.  BGRA uploads and unpack row length are always available.
    Desktop,
    /// OpenGL ES.  BGRA depends on extensions; no LOD bias, no legacy mipmap flag.
    Embedded,
}

/// API version reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderVersion {
    pub major: u32,
    pub minor: u32,
}

impl RenderVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

/// Capability provider for the current graphics context.
pub trait RenderSystem {
    fn render_api(&self) -> RenderApi;
    fn render_version(&self) -> RenderVersion;
    /// Largest width or height the driver accepts for a 2D texture.
    fn max_texture_size(&self) -> u32;
    /// Standard BGRA extension, where internal and external format are both BGRA.
    fn supports_bgra(&self) -> bool;
    /// Vendor BGRA extension, which wants an RGBA internal format with BGRA data.
    fn supports_bgra_apple(&self) -> bool;
}

impl<R: RenderSystem + ?Sized> RenderSystem for &R {
    fn render_api(&self) -> RenderApi {
        (**self).render_api()
    }
    fn render_version(&self) -> RenderVersion {
        (**self).render_version()
    }
    fn max_texture_size(&self) -> u32 {
        (**self).max_texture_size()
    }
    fn supports_bgra(&self) -> bool {
        (**self).supports_bgra()
    }
    fn supports_bgra_apple(&self) -> bool {
        (**self).supports_bgra_apple()
    }
}

/// Snapshot of the driver capabilities that select upload code paths.
///
/// Resolved once per texture; the flags are plain values, not a type per driver generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub api: RenderApi,
    pub version: RenderVersion,
    /// `glGenerateMipmap` is used instead of the legacy `GL_GENERATE_MIPMAP` flag.
    pub modern_mipmap_path: bool,
    /// Only queried on [`RenderApi::Embedded`]; `false` on desktop.
    pub supports_bgra: bool,
    /// Only queried on [`RenderApi::Embedded`]; `false` on desktop.
    pub supports_bgra_apple: bool,
}

impl Capabilities {
    /// Queries `render_system` and freezes the answers.
    pub fn resolve<R: RenderSystem + ?Sized>(render_system: &R) -> Self {
        let api = render_system.render_api();
        let version = render_system.render_version();
        let (supports_bgra, supports_bgra_apple) = match api {
            RenderApi::Desktop => (false, false),
            RenderApi::Embedded => (
                render_system.supports_bgra(),
                render_system.supports_bgra_apple(),
            ),
        };
        Capabilities {
            api,
            version,
            modern_mipmap_path: version.major >= 3,
            supports_bgra,
            supports_bgra_apple,
        }
    }

    /// Desktop path: LOD bias, legacy mipmap flag when not modern, row-length reset.
    #[inline]
    pub const fn is_desktop(&self) -> bool {
        matches!(self.api, RenderApi::Desktop)
    }

    /// Whether `GL_UNPACK_ROW_LENGTH` is used when truncating width.
    #[inline]
    pub const fn supports_unpack_row_length(&self) -> bool {
        matches!(self.api, RenderApi::Desktop)
    }

    /// Whether mipmaps are produced by an explicit generate call after upload.
    ///
    /// True on the modern path, and always on the embedded API where the call is core.
    #[inline]
    pub const fn generates_mipmaps_explicitly(&self) -> bool {
        self.modern_mipmap_path || matches!(self.api, RenderApi::Embedded)
    }
}
