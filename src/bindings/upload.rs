// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! Upload planning.

Everything here is decided before a single byte reaches the driver: the sampler state,
the clamped extent, the byte order for 32-bit color, and which upload call to make.
[`GlTexture::load_to_gpu`](crate::bindings::texture::GlTexture::load_to_gpu) executes the
plan; keeping the decisions pure means each one can be checked without a context.
*/

use crate::bindings::pixel_buffer::PixelBuffer;
use crate::bindings::sampler::{SamplerState, ScalingMethod};
use crate::imp::{CompressedFormat, GlPixelFormat};
use crate::pixel_formats::TextureFormat;
use crate::render_system::{Capabilities, RenderApi};

/// How the bytes of a 32-bit color bitmap are presented to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// The bytes are already in the order the declared format says.
    Native,
    /// BGRA internal and external format.
    Bgra,
    /// RGBA internal format, BGRA external format.
    SplitBgra,
    /// The driver can't take BGRA; swap red and blue in memory and upload as RGBA.
    SoftwareSwap,
}

impl ByteOrder {
    /// Decision table for `format` under `caps`.
    ///
    /// | format  | API      | `supports_bgra` | `supports_bgra_apple` | outcome        |
    /// |---------|----------|-----------------|-----------------------|----------------|
    /// | `Bgra8` | desktop  | -               | -                     | `SplitBgra`    |
    /// | `Bgra8` | embedded | yes             | -                     | `Bgra`         |
    /// | `Bgra8` | embedded | no              | yes                   | `SplitBgra`    |
    /// | `Bgra8` | embedded | no              | no                    | `SoftwareSwap` |
    /// | other   | any      | -               | -                     | `Native`       |
    pub const fn select(caps: &Capabilities, format: TextureFormat) -> Self {
        match format {
            TextureFormat::Bgra8 => match caps.api {
                RenderApi::Desktop => ByteOrder::SplitBgra,
                RenderApi::Embedded => {
                    if caps.supports_bgra {
                        ByteOrder::Bgra
                    } else if caps.supports_bgra_apple {
                        ByteOrder::SplitBgra
                    } else {
                        ByteOrder::SoftwareSwap
                    }
                }
            },
            _ => ByteOrder::Native,
        }
    }
}

/// The dimensions actually uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClampedExtent {
    pub width: u32,
    pub height: u32,
    /// Source row length in texels, set when width was truncated on a context that can
    /// stride through the full source rows.
    pub unpack_row_length: Option<u32>,
    /// The requested width, if it was truncated.
    pub width_truncated_from: Option<u32>,
    /// The requested height, if it was truncated.
    pub height_truncated_from: Option<u32>,
}

impl ClampedExtent {
    /// Clamps `width` x `height` to `max_texture_size`, logging each truncation.
    ///
    /// ```
    /// use gl_textures::bindings::upload::ClampedExtent;
    /// use gl_textures::imp::SoftwareContext;
    /// use gl_textures::render_system::{Capabilities, RenderVersion};
    ///
    /// let caps = Capabilities::resolve(&SoftwareContext::desktop(RenderVersion::new(3, 3), 1024));
    /// let extent = ClampedExtent::clamp(4000, 600, 1024, &caps);
    /// assert_eq!((extent.width, extent.height), (1024, 600));
    /// assert_eq!(extent.unpack_row_length, Some(4000));
    /// ```
    pub fn clamp(width: u32, height: u32, max_texture_size: u32, caps: &Capabilities) -> Self {
        let mut extent = ClampedExtent {
            width,
            height,
            unpack_row_length: None,
            width_truncated_from: None,
            height_truncated_from: None,
        };
        if height > max_texture_size {
            logwise::error_sync!(
                "Image height {height} too big to fit into single texture unit, truncating to {max}",
                height = height,
                max = max_texture_size
            );
            extent.height = max_texture_size;
            extent.height_truncated_from = Some(height);
        }
        if width > max_texture_size {
            logwise::error_sync!(
                "Image width {width} too big to fit into single texture unit, truncating to {max}",
                width = width,
                max = max_texture_size
            );
            if caps.supports_unpack_row_length() {
                extent.unpack_row_length = Some(width);
            }
            extent.width = max_texture_size;
            extent.width_truncated_from = Some(width);
        }
        extent
    }

    pub const fn is_truncated(&self) -> bool {
        self.width_truncated_from.is_some() || self.height_truncated_from.is_some()
    }
}

/// Which upload call to make, with its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadDispatch {
    Uncompressed {
        internal: GlPixelFormat,
        external: GlPixelFormat,
        /// Swap red and blue in memory before the call.
        swap_red_blue: bool,
    },
    Compressed {
        format: CompressedFormat,
        /// Bytes handed to the driver: pitch times rows.
        image_size: usize,
    },
}

impl UploadDispatch {
    /// `pitch` and `rows` describe the source bitmap; only compressed uploads use them.
    pub const fn select(format: TextureFormat, byte_order: ByteOrder, pitch: u32, rows: u32) -> Self {
        let image_size = pitch as usize * rows as usize;
        match format {
            TextureFormat::Dxt1 => UploadDispatch::Compressed {
                format: CompressedFormat::RgbaS3tcDxt1,
                image_size,
            },
            TextureFormat::Dxt3 => UploadDispatch::Compressed {
                format: CompressedFormat::RgbaS3tcDxt3,
                image_size,
            },
            // YCoCg rides on plain DXT5; the color transform is the shader's business.
            TextureFormat::Dxt5 | TextureFormat::Dxt5YCoCg => UploadDispatch::Compressed {
                format: CompressedFormat::RgbaS3tcDxt5,
                image_size,
            },
            TextureFormat::Rgb8 => UploadDispatch::uncompressed(GlPixelFormat::Rgb, GlPixelFormat::Rgb),
            TextureFormat::Rgba8 => {
                UploadDispatch::uncompressed(GlPixelFormat::Rgba, GlPixelFormat::Rgba)
            }
            TextureFormat::Bgra8 => match byte_order {
                ByteOrder::Bgra => UploadDispatch::uncompressed(GlPixelFormat::Bgra, GlPixelFormat::Bgra),
                ByteOrder::SplitBgra => {
                    UploadDispatch::uncompressed(GlPixelFormat::Rgba, GlPixelFormat::Bgra)
                }
                ByteOrder::SoftwareSwap => UploadDispatch::Uncompressed {
                    internal: GlPixelFormat::Rgba,
                    external: GlPixelFormat::Rgba,
                    swap_red_blue: true,
                },
                // not produced by ByteOrder::select for Bgra8; the bytes go up as they are
                ByteOrder::Native => {
                    UploadDispatch::uncompressed(GlPixelFormat::Rgba, GlPixelFormat::Bgra)
                }
            },
        }
    }

    const fn uncompressed(internal: GlPixelFormat, external: GlPixelFormat) -> Self {
        UploadDispatch::Uncompressed {
            internal,
            external,
            swap_red_blue: false,
        }
    }
}

/// Every decision for one upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadPlan {
    pub sampler: SamplerState,
    pub extent: ClampedExtent,
    pub byte_order: ByteOrder,
    pub dispatch: UploadDispatch,
    /// Call `glGenerateMipmap` after the upload.
    pub generate_mipmap: bool,
    /// Reset the unpack row length to 0 after the upload.
    pub reset_unpack_row_length: bool,
    /// Unpack alignment for the upload, restored to the default 4 afterwards.  `None` when
    /// the default already matches the source rows.
    pub unpack_alignment: Option<u32>,
}

impl UploadPlan {
    pub fn new(
        pixels: &PixelBuffer,
        mipmaps: bool,
        scaling: ScalingMethod,
        caps: &Capabilities,
        max_texture_size: u32,
    ) -> Self {
        let byte_order = ByteOrder::select(caps, pixels.format());
        let dispatch = UploadDispatch::select(pixels.format(), byte_order, pixels.pitch(), pixels.rows());
        // bitmap rows are packed; the driver pads each row to 4 bytes unless told otherwise
        let unpack_alignment = match dispatch {
            UploadDispatch::Uncompressed { .. } if pixels.pitch() % 4 != 0 => Some(1),
            _ => None,
        };
        UploadPlan {
            sampler: SamplerState::select(scaling, mipmaps, caps),
            extent: ClampedExtent::clamp(pixels.width(), pixels.height(), max_texture_size, caps),
            byte_order,
            dispatch,
            generate_mipmap: mipmaps && caps.generates_mipmaps_explicitly(),
            reset_unpack_row_length: caps.is_desktop(),
            unpack_alignment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_system::RenderVersion;

    fn caps(api: RenderApi, major: u32, bgra: bool, apple: bool) -> Capabilities {
        Capabilities {
            api,
            version: RenderVersion::new(major, 0),
            modern_mipmap_path: major >= 3,
            supports_bgra: bgra,
            supports_bgra_apple: apple,
        }
    }

    #[test]
    fn byte_order_table() {
        let desktop = caps(RenderApi::Desktop, 2, false, false);
        assert_eq!(ByteOrder::select(&desktop, TextureFormat::Bgra8), ByteOrder::SplitBgra);
        assert_eq!(
            ByteOrder::select(&caps(RenderApi::Embedded, 2, true, true), TextureFormat::Bgra8),
            ByteOrder::Bgra
        );
        assert_eq!(
            ByteOrder::select(&caps(RenderApi::Embedded, 2, false, true), TextureFormat::Bgra8),
            ByteOrder::SplitBgra
        );
        assert_eq!(
            ByteOrder::select(&caps(RenderApi::Embedded, 2, false, false), TextureFormat::Bgra8),
            ByteOrder::SoftwareSwap
        );
        for format in [TextureFormat::Rgba8, TextureFormat::Rgb8, TextureFormat::Dxt5] {
            assert_eq!(ByteOrder::select(&desktop, format), ByteOrder::Native);
        }
    }

    #[test]
    fn clamp_within_limits_is_identity() {
        let c = caps(RenderApi::Desktop, 3, false, false);
        let extent = ClampedExtent::clamp(512, 512, 512, &c);
        assert_eq!((extent.width, extent.height), (512, 512));
        assert!(!extent.is_truncated());
        assert_eq!(extent.unpack_row_length, None);
    }

    #[test]
    fn clamp_embedded_has_no_row_length() {
        let c = caps(RenderApi::Embedded, 3, false, false);
        let extent = ClampedExtent::clamp(600, 700, 512, &c);
        assert_eq!((extent.width, extent.height), (512, 512));
        assert_eq!(extent.width_truncated_from, Some(600));
        assert_eq!(extent.height_truncated_from, Some(700));
        assert_eq!(extent.unpack_row_length, None);
    }

    #[test]
    fn compressed_variants_share_dxt5() {
        let a = UploadDispatch::select(TextureFormat::Dxt5, ByteOrder::Native, 64, 4);
        let b = UploadDispatch::select(TextureFormat::Dxt5YCoCg, ByteOrder::Native, 64, 4);
        assert_eq!(a, b);
        assert_eq!(
            a,
            UploadDispatch::Compressed {
                format: CompressedFormat::RgbaS3tcDxt5,
                image_size: 256
            }
        );
    }

    #[test]
    fn software_swap_declares_direct_format() {
        let d = UploadDispatch::select(TextureFormat::Bgra8, ByteOrder::SoftwareSwap, 16, 4);
        assert_eq!(
            d,
            UploadDispatch::Uncompressed {
                internal: GlPixelFormat::Rgba,
                external: GlPixelFormat::Rgba,
                swap_red_blue: true
            }
        );
    }

    #[test]
    fn plan_mipmap_generation() {
        let pixels = PixelBuffer::new(8, 8, TextureFormat::Rgba8).unwrap();
        let legacy = caps(RenderApi::Desktop, 2, false, false);
        let modern = caps(RenderApi::Desktop, 3, false, false);
        let embedded = caps(RenderApi::Embedded, 2, false, false);
        assert!(!UploadPlan::new(&pixels, true, ScalingMethod::Linear, &legacy, 64).generate_mipmap);
        assert!(UploadPlan::new(&pixels, true, ScalingMethod::Linear, &modern, 64).generate_mipmap);
        let plan = UploadPlan::new(&pixels, true, ScalingMethod::Linear, &embedded, 64);
        assert!(plan.generate_mipmap);
        assert!(!plan.reset_unpack_row_length);
        assert!(!UploadPlan::new(&pixels, false, ScalingMethod::Linear, &modern, 64).generate_mipmap);
    }

    #[test]
    fn packed_rgb_rows_lower_alignment() {
        let c = caps(RenderApi::Desktop, 3, false, false);
        let odd = PixelBuffer::new(5, 3, TextureFormat::Rgb8).unwrap();
        let even = PixelBuffer::new(4, 3, TextureFormat::Rgb8).unwrap();
        let rgba = PixelBuffer::new(5, 3, TextureFormat::Rgba8).unwrap();
        let dxt = PixelBuffer::new(5, 3, TextureFormat::Dxt1).unwrap();
        let plan = |p: &PixelBuffer| UploadPlan::new(p, false, ScalingMethod::Linear, &c, 64).unpack_alignment;
        assert_eq!(plan(&odd), Some(1));
        assert_eq!(plan(&even), None);
        assert_eq!(plan(&rgba), None);
        assert_eq!(plan(&dxt), None);
    }
}
