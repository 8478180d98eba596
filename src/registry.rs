// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! Hardware texture registry.

Texture objects don't delete their GL names themselves.  Teardown can happen on any thread,
but `glDeleteTextures` must run on the thread that owns the context.  So a texture hands its
name to a [`TextureRegistry`], and the registry frees it on the context thread.
*/

use std::sync::Arc;

use wasm_safe_mutex::Mutex;

use crate::imp::{GlContext, TextureHandle};

/// Accepts hardware texture names that are no longer referenced.
///
/// Each created handle is released exactly once.
pub trait TextureRegistry: Send + Sync {
    fn release_hw_texture(&self, handle: TextureHandle);
}

impl<T: TextureRegistry + ?Sized> TextureRegistry for Arc<T> {
    fn release_hw_texture(&self, handle: TextureHandle) {
        (**self).release_hw_texture(handle)
    }
}

/// Registry that queues released names and deletes them on [`free_unused`](Self::free_unused).
///
/// ```
/// use gl_textures::imp::{GlContext, SoftwareContext};
/// use gl_textures::registry::{HwTextureRegistry, TextureRegistry};
/// use gl_textures::render_system::RenderVersion;
///
/// let mut ctx = SoftwareContext::desktop(RenderVersion::new(3, 3), 2048);
/// let registry = HwTextureRegistry::new();
///
/// let handle = ctx.gen_texture().unwrap();
/// registry.release_hw_texture(handle);
/// assert_eq!(ctx.live_textures(), 1);
///
/// assert_eq!(registry.free_unused(&mut ctx), 1);
/// assert_eq!(ctx.live_textures(), 0);
/// ```
pub struct HwTextureRegistry {
    unused: Mutex<Vec<TextureHandle>>,
}

impl HwTextureRegistry {
    pub fn new() -> Self {
        Self {
            unused: Mutex::new(Vec::new()),
        }
    }

    /// Names waiting for deletion.
    pub fn pending(&self) -> usize {
        self.unused.lock_sync().len()
    }

    /// Deletes every queued name.  Call on the context thread.  Returns how many were deleted.
    pub fn free_unused<C: GlContext + ?Sized>(&self, ctx: &mut C) -> usize {
        let unused = std::mem::take(&mut *self.unused.lock_sync());
        for handle in &unused {
            ctx.delete_texture(*handle);
        }
        if !unused.is_empty() {
            logwise::trace_sync!("freed {count} hw textures", count = unused.len());
        }
        unused.len()
    }
}

impl Default for HwTextureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HwTextureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HwTextureRegistry")
            .field("pending", &self.pending())
            .finish()
    }
}

impl TextureRegistry for HwTextureRegistry {
    fn release_hw_texture(&self, handle: TextureHandle) {
        self.unused.lock_sync().push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imp::SoftwareContext;
    use crate::render_system::RenderVersion;

    #[test]
    fn release_from_another_thread() {
        let registry = Arc::new(HwTextureRegistry::new());
        let mut ctx = SoftwareContext::desktop(RenderVersion::new(3, 3), 256);
        let a = ctx.gen_texture().unwrap();
        let b = ctx.gen_texture().unwrap();

        let moved = registry.clone();
        std::thread::spawn(move || {
            moved.release_hw_texture(a);
            moved.release_hw_texture(b);
        })
        .join()
        .unwrap();

        assert_eq!(registry.pending(), 2);
        assert_eq!(registry.free_unused(&mut ctx), 2);
        assert_eq!(registry.pending(), 0);
        assert!(ctx.texture(a).is_none());
        assert!(ctx.texture(b).is_none());
    }

    #[test]
    fn free_with_nothing_queued() {
        let registry = HwTextureRegistry::new();
        let mut ctx = SoftwareContext::desktop(RenderVersion::new(3, 3), 256);
        assert_eq!(registry.free_unused(&mut ctx), 0);
        assert!(ctx.calls().is_empty());
    }
}
