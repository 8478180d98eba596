// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! gl_textures turns decoded bitmaps into bound, sampler-configured GL textures.

A decoder hands over bytes and a pixel format.  Getting those bytes onto the GPU looks
simple, but the details depend on who you are talking to:

| Concern            | Desktop GL                         | GL ES                                                  |
|--------------------|------------------------------------|--------------------------------------------------------|
| BGRA bitmaps       | Always; RGBA internal, BGRA data   | Extension (two flavors), or swap red and blue on CPU   |
| Oversized bitmaps  | Truncate, stride with row length   | Truncate                                               |
| Mipmaps, GL < 3    | `GL_GENERATE_MIPMAP` flag          | `glGenerateMipmap`                                     |
| Mipmaps, GL >= 3   | `glGenerateMipmap`                 | `glGenerateMipmap`                                     |
| LOD bias           | -0.5 when mipmapped                | Not available                                          |
| DXT1/3/5           | `glCompressedTexImage2D`           | `glCompressedTexImage2D`                               |

# Architecture

- [`bindings::GlTexture`] owns a texture object: it creates the hardware name lazily, uploads
  into it, binds it to texture units and hands the name back to a
  [`registry::TextureRegistry`] when it goes away.
- [`bindings::upload`] makes every per-upload decision up front, as plain data.
- [`render_system`] answers capability questions; the answers are frozen into a
  [`render_system::Capabilities`] snapshot per texture.
- [`imp`] is the seam to the driver.  With the `backend_glow` feature, `glow::Context`
  implements it; [`imp::SoftwareContext`] is a CPU emulation for headless use and tests.

# Threading

GL contexts are single-threaded.  Everything that takes a context expects to run on the
context's thread.  Textures may be dropped anywhere; their names are queued with the
registry and deleted on the context thread by [`registry::HwTextureRegistry::free_unused`].
*/

pub mod bindings;
pub mod bittricks;
pub mod imp;
pub mod pixel_formats;
pub mod registry;
pub mod render_system;

pub use bindings::{GlTexture, TextureConfig};
pub use pixel_formats::TextureFormat;
