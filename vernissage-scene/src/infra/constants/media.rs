//! Image preloading and texture cache defaults.

use std::time::Duration;

/// Maximum simultaneous underlying image loads.
pub const MAX_CONCURRENT_LOADS: usize = 3;

/// Maximum textures retained by the texture cache.
pub const TEXTURE_CACHE_CAPACITY: usize = 50;

/// Fraction of planes that show the photograph rather than a placeholder.
pub const PHOTO_DISPLAY_RATIO: f32 = 0.4;

/// Maximum resolved textures applied to planes per frame.
pub const MAX_TEXTURE_APPLIES_PER_FRAME: usize = 4;

/// Side length of synthesized fallback textures (pixels).
pub const FALLBACK_TEXTURE_SIZE: u32 = 256;

/// Smallest fallback texture that still fits the border and caption margins.
pub const MIN_FALLBACK_TEXTURE_SIZE: u32 = 48;

/// HTTP loader behaviour.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(20);
pub const HTTP_MAX_RETRIES: u32 = 2;
pub const HTTP_RETRY_BASE_DELAY: Duration = Duration::from_millis(150);

/// Priorities used when the composer requests textures.
pub const PRIORITY_WALL: u32 = 3;
pub const PRIORITY_WING: u32 = 2;
pub const PRIORITY_FOUNDATION: u32 = 1;

/// Delay before building the scene so surrounding UI can paint first.
pub const CONSTRUCTION_DELAY: Duration = Duration::from_millis(100);
