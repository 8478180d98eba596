// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! Defines texture types */

pub mod pixel_buffer;
pub mod sampler;
pub mod texture;
pub mod texture_config;
pub mod upload;

pub mod software {
    //! CPU-side texture storage.
    pub mod texture;
}

pub use texture::GlTexture;
pub use texture_config::TextureConfig;
