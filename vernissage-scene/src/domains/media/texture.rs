//! Texture objects and their resource accounting.
//!
//! A [`Texture`] stands in for an uploaded GPU texture. Ownership is
//! reference counted: the cache and any number of planes may hold the same
//! `Arc<Texture>`, and the underlying resource is released exactly once,
//! when the last owner lets go.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use image::RgbaImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureVariant {
    /// The artwork's photograph.
    Photo,
    /// Desaturated or synthesized stand-in, for visual variety.
    Placeholder,
}

/// How the pixels were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSource {
    Image,
    Desaturated,
    Synthesized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

impl TextureId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Shared counters for texture allocation.
#[derive(Debug, Default)]
pub struct TextureStats {
    next_id: AtomicU64,
    live: AtomicUsize,
    created: AtomicU64,
    released: AtomicU64,
}

impl TextureStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Textures currently holding resources.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct Texture {
    id: TextureId,
    variant: TextureVariant,
    source: TextureSource,
    pixels: Arc<RgbaImage>,
    caption: Option<String>,
    stats: Arc<TextureStats>,
}

impl Texture {
    pub fn new(
        stats: &Arc<TextureStats>,
        variant: TextureVariant,
        source: TextureSource,
        pixels: Arc<RgbaImage>,
        caption: Option<String>,
    ) -> Arc<Self> {
        let id = TextureId(stats.next_id.fetch_add(1, Ordering::Relaxed));
        stats.live.fetch_add(1, Ordering::Relaxed);
        stats.created.fetch_add(1, Ordering::Relaxed);
        Arc::new(Self {
            id,
            variant,
            source,
            pixels,
            caption,
            stats: Arc::clone(stats),
        })
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn variant(&self) -> TextureVariant {
        self.variant
    }

    pub fn source(&self) -> TextureSource {
        self.source
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Text rendered into a synthesized texture.
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn is_synthesized(&self) -> bool {
        self.source == TextureSource::Synthesized
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.stats.live.fetch_sub(1, Ordering::Relaxed);
        self.stats.released.fetch_add(1, Ordering::Relaxed);
        log::trace!("Released texture {:?}", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_released_once_when_last_owner_drops() {
        let stats = TextureStats::new();
        let texture = Texture::new(
            &stats,
            TextureVariant::Photo,
            TextureSource::Image,
            Arc::new(RgbaImage::new(1, 1)),
            None,
        );
        let shared = Arc::clone(&texture);
        assert_eq!(stats.live(), 1);
        drop(texture);
        assert_eq!(stats.live(), 1);
        drop(shared);
        assert_eq!(stats.live(), 0);
        assert_eq!(stats.released(), 1);
    }
}
