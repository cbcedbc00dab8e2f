//! Bounded texture cache keyed by artwork and variant.
//!
//! Entries are evicted in insertion order once the capacity is exceeded.
//! The cache holds one `Arc` per texture; planes showing an evicted texture
//! keep it alive until they drop it, so eviction never pulls a texture out
//! from under a visible plane.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use vernissage_model::{ArtworkId, ArtworkRef};

use super::fallback::{FallbackPainter, desaturate, fit_for_upload};
use super::preloader::ImagePreloader;
use super::texture::{Texture, TextureSource, TextureStats, TextureVariant};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureKey {
    pub artwork_id: ArtworkId,
    pub variant: TextureVariant,
}

impl TextureKey {
    pub fn new(artwork_id: ArtworkId, variant: TextureVariant) -> Self {
        Self {
            artwork_id,
            variant,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Textures alive anywhere, cached or held by planes.
    pub live_textures: usize,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<TextureKey, Arc<Texture>>,
    order: VecDeque<TextureKey>,
    hits: u64,
    misses: u64,
    evictions: u64,
    closed: bool,
}

#[derive(Debug)]
struct CacheInner {
    capacity: usize,
    state: Mutex<CacheState>,
    preloader: ImagePreloader,
    painter: FallbackPainter,
    stats: Arc<TextureStats>,
}

/// Resolves artworks to textures, sharing one texture per key.
#[derive(Debug, Clone)]
pub struct TextureCache {
    inner: Arc<CacheInner>,
}

impl TextureCache {
    pub fn new(
        capacity: usize,
        preloader: ImagePreloader,
        painter: FallbackPainter,
    ) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                capacity: capacity.max(1),
                state: Mutex::new(CacheState::default()),
                preloader,
                painter,
                stats: TextureStats::new(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn texture_stats(&self) -> &Arc<TextureStats> {
        &self.inner.stats
    }

    pub fn preloader(&self) -> &ImagePreloader {
        &self.inner.preloader
    }

    pub fn get(&self, key: &TextureKey) -> Option<Arc<Texture>> {
        let mut state = self.inner.state.lock();
        match state.entries.get(key).cloned() {
            Some(texture) => {
                state.hits += 1;
                Some(texture)
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    /// Insert a texture unless the key is already cached, returning the
    /// texture now associated with the key. Oldest entries are evicted while
    /// the cache is over capacity.
    pub fn admit(&self, key: TextureKey, texture: Arc<Texture>) -> Arc<Texture> {
        let mut state = self.inner.state.lock();
        if state.closed {
            return texture;
        }
        if let Some(existing) = state.entries.get(&key) {
            return Arc::clone(existing);
        }

        state.entries.insert(key.clone(), Arc::clone(&texture));
        state.order.push_back(key);
        while state.entries.len() > self.inner.capacity {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            if state.entries.remove(&oldest).is_some() {
                state.evictions += 1;
                log::trace!(
                    "Evicted texture for {} ({:?})",
                    oldest.artwork_id,
                    oldest.variant
                );
            }
        }
        texture
    }

    /// Resolve the texture for an artwork.
    ///
    /// Never fails: an unloadable photo resolves to a synthesized texture
    /// carrying the artwork's caption, cached under the same key.
    pub fn resolve_texture(
        &self,
        art: &ArtworkRef,
        variant: TextureVariant,
        priority: u32,
    ) -> BoxFuture<'static, Arc<Texture>> {
        let key = TextureKey::new(art.id.clone(), variant);
        if let Some(texture) = self.get(&key) {
            return futures::future::ready(texture).boxed();
        }

        let cache = self.clone();
        let art = art.clone();
        async move {
            let texture = match variant {
                TextureVariant::Photo => cache.build_photo(&art, priority).await,
                TextureVariant::Placeholder => {
                    cache.build_placeholder(&art, priority).await
                }
            };
            cache.admit(key, texture)
        }
        .boxed()
    }

    async fn build_photo(&self, art: &ArtworkRef, priority: u32) -> Arc<Texture> {
        if let Some(url) = &art.main_image_url
            && let Some(image) =
                self.inner.preloader.preload(url.as_str(), priority).await
        {
            let pixels = match fit_for_upload(image.pixels()) {
                Some(scaled) => Arc::new(scaled),
                None => Arc::clone(image.pixels()),
            };
            return Texture::new(
                &self.inner.stats,
                TextureVariant::Photo,
                TextureSource::Image,
                pixels,
                None,
            );
        }
        self.synthesize(art, TextureVariant::Photo)
    }

    async fn build_placeholder(
        &self,
        art: &ArtworkRef,
        priority: u32,
    ) -> Arc<Texture> {
        if let Some(url) = &art.main_image_url {
            let preloader = &self.inner.preloader;
            let image = match preloader.cached(url.as_str()) {
                Some(image) => Some(image),
                None => preloader.preload(url.as_str(), priority).await,
            };
            if let Some(image) = image {
                let gray = match fit_for_upload(image.pixels()) {
                    Some(scaled) => desaturate(&scaled),
                    None => desaturate(image.pixels()),
                };
                return Texture::new(
                    &self.inner.stats,
                    TextureVariant::Placeholder,
                    TextureSource::Desaturated,
                    Arc::new(gray),
                    None,
                );
            }
        }
        self.synthesize(art, TextureVariant::Placeholder)
    }

    fn synthesize(&self, art: &ArtworkRef, variant: TextureVariant) -> Arc<Texture> {
        log::debug!("Synthesizing texture for artwork {}", art.id);
        Texture::new(
            &self.inner.stats,
            variant,
            TextureSource::Synthesized,
            Arc::new(self.inner.painter.paint(art)),
            Some(art.caption()),
        )
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &TextureKey) -> bool {
        self.inner.state.lock().entries.contains_key(key)
    }

    /// Drop every cached entry. Textures still held elsewhere survive until
    /// their last owner releases them.
    pub fn clear(&self) {
        let mut state = self.inner.state.lock();
        state.entries.clear();
        state.order.clear();
    }

    /// Clear the cache and stop admitting new entries.
    pub fn close(&self) {
        let mut state = self.inner.state.lock();
        state.closed = true;
        state.entries.clear();
        state.order.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.inner.state.lock();
        CacheStats {
            entries: state.entries.len(),
            capacity: self.inner.capacity,
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            live_textures: self.inner.stats.live(),
        }
    }
}
