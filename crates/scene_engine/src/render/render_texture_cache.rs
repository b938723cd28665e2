//! Pooled scratch render textures
//!
//! Post-effects need a copy of the live render target to sample from. Scratch
//! textures are created through the graphics layer on first demand, handed
//! out by (size, format), and returned to the pool at the end of every frame.
//! The pool only grows; textures go back to the graphics layer in
//! [`RenderTextureCache::release_all`].

use std::collections::HashMap;

use super::{GraphicsLayer, RenderTexture, TextureFormat, TextureSize};

#[derive(Debug)]
struct CachedTexture {
    texture: RenderTexture,
    in_use: bool,
}

/// Pool of scratch render textures keyed by size and format
#[derive(Debug, Default)]
pub struct RenderTextureCache {
    pools: HashMap<(TextureSize, TextureFormat), Vec<CachedTexture>>,
}

impl RenderTextureCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a free texture of the requested shape, creating one if none is free
    pub fn acquire(
        &mut self,
        graphics: &mut dyn GraphicsLayer,
        size: TextureSize,
        format: TextureFormat,
    ) -> RenderTexture {
        let pool = self.pools.entry((size, format)).or_default();

        if let Some(cached) = pool.iter_mut().find(|cached| !cached.in_use) {
            cached.in_use = true;
            return cached.texture;
        }

        let texture = graphics.acquire_scratch_texture(size, format);
        log::debug!(
            "render texture cache grew: {}x{} {:?} ({} in pool)",
            size.width,
            size.height,
            format,
            pool.len() + 1
        );
        pool.push(CachedTexture { texture, in_use: true });
        texture
    }

    /// Return every texture to the pool. Called once per frame.
    pub fn recycle(&mut self) {
        for cached in self.pools.values_mut().flatten() {
            cached.in_use = false;
        }
    }

    /// Destroy every pooled texture through the graphics layer
    pub fn release_all(&mut self, graphics: &mut dyn GraphicsLayer) {
        for cached in self.pools.drain().flat_map(|(_, pool)| pool) {
            graphics.release_scratch_texture(&cached.texture);
        }
    }

    /// Total textures owned by the pool
    pub fn len(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }

    /// True when the pool owns no textures
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Textures currently handed out
    pub fn in_use(&self) -> usize {
        self.pools.values().flatten().filter(|cached| cached.in_use).count()
    }
}
