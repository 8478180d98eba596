// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Sampler state applied to a texture before its pixels are uploaded.

use crate::imp::{Filter, GlContext, TexParameter, Wrap};
use crate::render_system::Capabilities;

/// LOD bias applied on desktop when mipmapping; favors sharpness.
pub const DESKTOP_MIPMAP_LOD_BIAS: f32 = -0.5;

/// How a texture is filtered when drawn at a size other than its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalingMethod {
    Nearest,
    #[default]
    Linear,
}

/// The full set of sampler parameters for one upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerState {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    /// Desktop only.
    pub lod_bias: Option<f32>,
    /// Set the driver's `GL_GENERATE_MIPMAP` flag (legacy desktop).
    pub legacy_generate_mipmap: bool,
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
}

impl SamplerState {
    /// Picks filters for `scaling`, substituting a mipmap-aware minification filter when
    /// `mipmapped`.
    ///
    /// ```
    /// use gl_textures::bindings::sampler::{SamplerState, ScalingMethod};
    /// use gl_textures::imp::{Filter, SoftwareContext};
    /// use gl_textures::render_system::{Capabilities, RenderVersion};
    ///
    /// let caps = Capabilities::resolve(&SoftwareContext::desktop(RenderVersion::new(2, 1), 2048));
    /// let state = SamplerState::select(ScalingMethod::Nearest, true, &caps);
    /// assert_eq!(state.min_filter, Filter::LinearMipmapNearest);
    /// assert_eq!(state.mag_filter, Filter::Nearest);
    /// assert!(state.legacy_generate_mipmap);
    /// ```
    pub fn select(scaling: ScalingMethod, mipmapped: bool, caps: &Capabilities) -> Self {
        let base = match scaling {
            ScalingMethod::Nearest => Filter::Nearest,
            ScalingMethod::Linear => Filter::Linear,
        };
        let min_filter = match (mipmapped, scaling) {
            (false, _) => base,
            (true, ScalingMethod::Nearest) => Filter::LinearMipmapNearest,
            (true, ScalingMethod::Linear) => Filter::LinearMipmapLinear,
        };
        let desktop_mipmaps = mipmapped && caps.is_desktop();
        SamplerState {
            min_filter,
            mag_filter: base,
            lod_bias: desktop_mipmaps.then_some(DESKTOP_MIPMAP_LOD_BIAS),
            legacy_generate_mipmap: desktop_mipmaps && !caps.modern_mipmap_path,
            wrap_s: Wrap::ClampToEdge,
            wrap_t: Wrap::ClampToEdge,
        }
    }

    /// Writes the state to the texture bound on the active unit.
    pub(crate) fn apply<C: GlContext + ?Sized>(&self, ctx: &mut C) {
        ctx.tex_parameter(TexParameter::MagFilter(self.mag_filter));
        ctx.tex_parameter(TexParameter::MinFilter(self.min_filter));
        if let Some(bias) = self.lod_bias {
            ctx.tex_parameter(TexParameter::LodBias(bias));
        }
        if self.legacy_generate_mipmap {
            ctx.tex_parameter(TexParameter::GenerateMipmap(true));
        }
        ctx.tex_parameter(TexParameter::WrapS(self.wrap_s));
        ctx.tex_parameter(TexParameter::WrapT(self.wrap_t));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_system::{RenderApi, RenderVersion};

    fn caps(api: RenderApi, major: u32) -> Capabilities {
        Capabilities {
            api,
            version: RenderVersion::new(major, 0),
            modern_mipmap_path: major >= 3,
            supports_bgra: false,
            supports_bgra_apple: false,
        }
    }

    #[test]
    fn no_mipmaps_uses_scaling_filter() {
        let s = SamplerState::select(ScalingMethod::Linear, false, &caps(RenderApi::Desktop, 2));
        assert_eq!(s.min_filter, Filter::Linear);
        assert_eq!(s.mag_filter, Filter::Linear);
        assert_eq!(s.lod_bias, None);
        assert!(!s.legacy_generate_mipmap);
        assert_eq!((s.wrap_s, s.wrap_t), (Wrap::ClampToEdge, Wrap::ClampToEdge));
    }

    #[test]
    fn modern_desktop_keeps_bias_drops_flag() {
        let s = SamplerState::select(ScalingMethod::Linear, true, &caps(RenderApi::Desktop, 4));
        assert_eq!(s.min_filter, Filter::LinearMipmapLinear);
        assert_eq!(s.lod_bias, Some(DESKTOP_MIPMAP_LOD_BIAS));
        assert!(!s.legacy_generate_mipmap);
    }

    #[test]
    fn embedded_has_no_bias_or_flag() {
        let s = SamplerState::select(ScalingMethod::Nearest, true, &caps(RenderApi::Embedded, 2));
        assert_eq!(s.min_filter, Filter::LinearMipmapNearest);
        assert_eq!(s.mag_filter, Filter::Nearest);
        assert_eq!(s.lod_bias, None);
        assert!(!s.legacy_generate_mipmap);
    }
}
