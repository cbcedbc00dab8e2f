//! Image preloading and texture resolution
//!
//! Three tiers, leaves first: [`loader`] fetches bytes, [`preloader`]
//! schedules and deduplicates fetches and keeps decoded images, and
//! [`texture_cache`] turns images (or their absence) into cached textures.

use std::sync::Arc;

use image::RgbaImage;
use thiserror::Error;

pub mod fallback;
pub mod loader;
pub mod preloader;
pub mod texture;
pub mod texture_cache;

pub use fallback::FallbackPainter;
pub use loader::{HttpImageLoader, ImageLoader};
pub use preloader::{ImagePreloader, PreloadFuture, PreloaderStats};
pub use texture::{Texture, TextureId, TextureSource, TextureStats, TextureVariant};
pub use texture_cache::{CacheStats, TextureCache, TextureKey};

/// Errors that can occur while fetching or decoding an image
#[derive(Debug, Clone, Error)]
pub enum ImagePipelineError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {url}")]
    Status { status: u16, url: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unsupported url: {0}")]
    UnsupportedUrl(String),
}

impl ImagePipelineError {
    /// 4xx responses; retrying will not help.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ImagePipelineError::Status { status, .. } if (400..500).contains(status))
    }
}

/// Result type for image pipeline operations
pub type Result<T> = std::result::Result<T, ImagePipelineError>;

/// A decoded image, shared cheaply between the preloader cache and
/// textures built from it.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    url: Arc<str>,
    pixels: Arc<RgbaImage>,
}

impl ImageHandle {
    pub fn new(url: impl Into<Arc<str>>, pixels: RgbaImage) -> Self {
        Self {
            url: url.into(),
            pixels: Arc::new(pixels),
        }
    }

    /// Decode encoded image bytes (PNG, JPEG, ...) into RGBA.
    pub fn decode(url: &str, bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|err| ImagePipelineError::Decode(err.to_string()))?;
        Ok(Self::new(url, decoded.to_rgba8()))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn pixels(&self) -> &Arc<RgbaImage> {
        &self.pixels
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// True when both handles point at the same decoded buffer.
    pub fn same_image(&self, other: &ImageHandle) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}
