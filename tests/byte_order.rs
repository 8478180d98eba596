// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! 32-bit color byte order across driver capabilities.

use std::sync::Arc;

use gl_textures::bindings::pixel_buffer::PixelBuffer;
use gl_textures::bindings::software::texture::Texel;
use gl_textures::bindings::upload::ByteOrder;
use gl_textures::imp::{Call, GlContext, GlPixelFormat, Level, SoftwareContext};
use gl_textures::pixel_formats::{TextureFormat, Unorm4};
use gl_textures::registry::HwTextureRegistry;
use gl_textures::render_system::{Capabilities, RenderVersion};
use gl_textures::{GlTexture, TextureConfig};

/// 2 texels wide, `height` rows; texel (x, y) has B = 10y + x, G = 100, R = 200 + x, A = 255.
fn bgra(height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    for y in 0..height {
        for x in 0..2 {
            bytes.extend_from_slice(&[(10 * y + x) as u8, 100, 200 + x as u8, 255]);
        }
    }
    bytes
}

fn load(ctx: &mut SoftwareContext, bytes: Vec<u8>, height: u32, cache_memory: bool) -> GlTexture {
    let config = TextureConfig::builder(2, height, TextureFormat::Bgra8)
        .with_cache_memory(cache_memory)
        .build();
    let mut texture = GlTexture::new(config, &*ctx, Arc::new(HwTextureRegistry::new()));
    texture.update(PixelBuffer::from_bytes(bytes, 2, height, TextureFormat::Bgra8).unwrap());
    texture.load_to_gpu(ctx).unwrap();
    texture
}

/// (internal, external, pixels) of the single uncompressed upload.
fn upload(ctx: &SoftwareContext) -> (GlPixelFormat, GlPixelFormat, Vec<u8>) {
    let mut uploads = ctx.calls().iter().filter_map(|c| match c {
        Call::TexImage2d {
            internal,
            external,
            pixels,
            ..
        } => Some((*internal, *external, pixels.clone())),
        _ => None,
    });
    let first = uploads.next().unwrap();
    assert!(uploads.next().is_none());
    first
}

/// The texel the driver ended up with, in canonical RGBA.
fn resident(ctx: &SoftwareContext, texture: &GlTexture, texel: Texel) -> Unorm4 {
    match &ctx.texture(texture.handle().unwrap()).unwrap().levels[0] {
        Level::Texels { texture, .. } => texture[texel],
        other => panic!("expected texels, got {other:?}"),
    }
}

#[test]
fn desktop_uploads_split_pair_untouched() {
    let mut ctx = SoftwareContext::desktop(RenderVersion::new(2, 1), 64);
    let texture = load(&mut ctx, bgra(2), 2, false);
    let (internal, external, pixels) = upload(&ctx);
    assert_eq!((internal, external), (GlPixelFormat::Rgba, GlPixelFormat::Bgra));
    assert_eq!(pixels, bgra(2));
    assert_eq!(resident(&ctx, &texture, Texel { x: 1, y: 1 }), Unorm4 { r: 201, g: 100, b: 11, a: 255 });
    assert_eq!(
        ByteOrder::select(texture.capabilities(), TextureFormat::Bgra8),
        ByteOrder::SplitBgra
    );
}

#[test]
fn embedded_bgra_extension_uploads_bgra() {
    let mut ctx = SoftwareContext::embedded(RenderVersion::new(2, 0), 64).with_bgra(true);
    let texture = load(&mut ctx, bgra(2), 2, false);
    let (internal, external, pixels) = upload(&ctx);
    assert_eq!((internal, external), (GlPixelFormat::Bgra, GlPixelFormat::Bgra));
    assert_eq!(pixels, bgra(2));
    assert_eq!(resident(&ctx, &texture, Texel::ZERO), Unorm4 { r: 200, g: 100, b: 0, a: 255 });
    assert_eq!(ctx.get_error(), None);
}

#[test]
fn embedded_standard_extension_wins_over_vendor() {
    let mut ctx = SoftwareContext::embedded(RenderVersion::new(2, 0), 64)
        .with_bgra(true)
        .with_bgra_apple(true);
    load(&mut ctx, bgra(1), 1, false);
    let (internal, external, _) = upload(&ctx);
    assert_eq!((internal, external), (GlPixelFormat::Bgra, GlPixelFormat::Bgra));
}

#[test]
fn embedded_vendor_extension_uploads_split_pair() {
    let mut ctx = SoftwareContext::embedded(RenderVersion::new(2, 0), 64).with_bgra_apple(true);
    let texture = load(&mut ctx, bgra(2), 2, false);
    let (internal, external, pixels) = upload(&ctx);
    assert_eq!((internal, external), (GlPixelFormat::Rgba, GlPixelFormat::Bgra));
    assert_eq!(pixels, bgra(2));
    assert_eq!(resident(&ctx, &texture, Texel::ZERO), Unorm4 { r: 200, g: 100, b: 0, a: 255 });
    assert_eq!(ctx.get_error(), None);
}

#[test]
fn no_extension_swaps_in_software() {
    let mut ctx = SoftwareContext::embedded(RenderVersion::new(2, 0), 64);
    let texture = load(&mut ctx, bgra(2), 2, false);
    let (internal, external, pixels) = upload(&ctx);
    assert_eq!((internal, external), (GlPixelFormat::Rgba, GlPixelFormat::Rgba));
    assert_eq!(
        pixels,
        vec![200, 100, 0, 255, 201, 100, 1, 255, 200, 100, 10, 255, 201, 100, 11, 255]
    );
    // same colors as the hardware paths
    assert_eq!(resident(&ctx, &texture, Texel { x: 1, y: 1 }), Unorm4 { r: 201, g: 100, b: 11, a: 255 });
    assert_eq!(ctx.get_error(), None);
}

#[test]
fn swap_covers_only_uploaded_rows() {
    // four rows, but the driver only takes two
    let mut ctx = SoftwareContext::embedded(RenderVersion::new(2, 0), 2);
    let texture = load(&mut ctx, bgra(4), 4, true);
    let extent = texture.last_extent().unwrap();
    assert_eq!((extent.width, extent.height), (2, 2));

    let retained = texture.pixels().unwrap().as_bytes();
    let original = bgra(4);
    let pitch = 8;
    for row in 0..2 {
        let r = &retained[row * pitch..(row + 1) * pitch];
        let o = &original[row * pitch..(row + 1) * pitch];
        assert_eq!([r[0], r[2], r[4], r[6]], [o[2], o[0], o[6], o[4]]);
    }
    assert_eq!(&retained[2 * pitch..], &original[2 * pitch..]);
}

#[test]
fn retained_swapped_buffer_never_swaps_twice() {
    let mut ctx = SoftwareContext::embedded(RenderVersion::new(2, 0), 64);
    let mut texture = load(&mut ctx, bgra(2), 2, true);
    let (_, _, first) = upload(&ctx);
    assert_eq!(texture.pixels().unwrap().format(), TextureFormat::Rgba8);
    assert_eq!(texture.config().format(), TextureFormat::Rgba8);

    texture.destroy_texture_object();
    ctx.take_calls();
    texture.load_to_gpu(&mut ctx).unwrap();
    let (internal, external, second) = upload(&ctx);
    assert_eq!((internal, external), (GlPixelFormat::Rgba, GlPixelFormat::Rgba));
    assert_eq!(first, second);
    assert_eq!(resident(&ctx, &texture, Texel::ZERO), Unorm4 { r: 200, g: 100, b: 0, a: 255 });
}

#[test]
fn rgba8_is_never_swapped() {
    let mut ctx = SoftwareContext::embedded(RenderVersion::new(2, 0), 64);
    let config = TextureConfig::builder(2, 1, TextureFormat::Rgba8).build();
    let mut texture = GlTexture::new(config, &ctx, Arc::new(HwTextureRegistry::new()));
    let bytes = vec![1, 2, 3, 4, 5, 6, 7, 8];
    texture.update(PixelBuffer::from_bytes(bytes.clone(), 2, 1, TextureFormat::Rgba8).unwrap());
    texture.load_to_gpu(&mut ctx).unwrap();
    let (internal, external, pixels) = upload(&ctx);
    assert_eq!((internal, external), (GlPixelFormat::Rgba, GlPixelFormat::Rgba));
    assert_eq!(pixels, bytes);
}

#[test]
fn desktop_capabilities_skip_extension_flags() {
    let ctx = SoftwareContext::desktop(RenderVersion::new(4, 6), 64)
        .with_bgra(true)
        .with_bgra_apple(true);
    let caps = Capabilities::resolve(&ctx);
    assert!(!caps.supports_bgra);
    assert!(!caps.supports_bgra_apple);
    assert_eq!(ByteOrder::select(&caps, TextureFormat::Bgra8), ByteOrder::SplitBgra);
}
