//! Performance monitoring defaults.
//!
//! Tuned for a 60 Hz display. Lower-end hardware mostly lives in `medium`,
//! the `low` tier exists for sustained stalls (tab throttling, GC pauses).

/// Frame rate the monitor measures against.
pub const TARGET_FPS: f32 = 60.0;

/// Number of inter-frame deltas kept in the ring buffer.
pub const SAMPLE_WINDOW: usize = 30;

/// Number of most recent samples used for the "recent" FPS estimate.
pub const RECENT_WINDOW: usize = 5;

/// Wall-clock interval between level classifications (milliseconds).
pub const CHECK_INTERVAL_MS: f64 = 500.0;

/// A single frame longer than this counts as a stall (milliseconds).
pub const STALL_THRESHOLD_MS: f64 = 50.0;

/// More consecutive stalls than this force the `low` level.
pub const MAX_CONSECUTIVE_STALLS: u32 = 3;

/// Below this fraction of the target FPS the level drops to `low`.
pub const LOW_FPS_RATIO: f32 = 0.6;

/// Below this fraction of the target FPS the level drops to `medium`.
pub const MEDIUM_FPS_RATIO: f32 = 0.8;

/// Extra headroom (fraction of target) required before climbing a tier.
pub const RECOVERY_MARGIN: f32 = 0.05;

/// Heap usage ratio above which the level is clamped to `medium`.
pub const MEMORY_PRESSURE_RATIO: f64 = 0.8;

/// Per-level tuning knobs
pub mod high {
    pub const UPDATE_MULTIPLIER: f32 = 1.0;
    pub const BATCH_SIZE: usize = 20;
    pub const SKIP_PROBABILITY: f32 = 0.0;
}

pub mod medium {
    pub const UPDATE_MULTIPLIER: f32 = 0.75;
    pub const BATCH_SIZE: usize = 12;
    pub const SKIP_PROBABILITY: f32 = 0.0;
}

pub mod low {
    pub const UPDATE_MULTIPLIER: f32 = 0.5;
    pub const BATCH_SIZE: usize = 6;
    pub const SKIP_PROBABILITY: f32 = 0.3;
}
