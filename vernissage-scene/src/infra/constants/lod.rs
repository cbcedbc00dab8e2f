//! Level-of-detail distance bands (world units from the camera).

/// Closer than this renders at `high` detail.
pub const HIGH_DISTANCE: f32 = 50.0;

/// Closer than this renders at `medium` detail, beyond it `low`.
pub const MEDIUM_DISTANCE: f32 = 75.0;

/// Planes farther than this are culled.
pub const CULL_DISTANCE: f32 = 120.0;

/// Local time between distance re-evaluations (seconds).
pub const CHECK_INTERVAL_S: f32 = 0.25;

/// Drift amplitude multiplier per level.
pub const MEDIUM_DRIFT_SCALE: f32 = 0.6;
pub const LOW_DRIFT_SCALE: f32 = 0.3;
