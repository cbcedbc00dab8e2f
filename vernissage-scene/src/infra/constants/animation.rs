//! Animation timing and hover/glitch constants.

use std::time::Duration;

/// Duration of a plane's scale/opacity entrance.
pub const ENTRANCE_DURATION: Duration = Duration::from_millis(1200);

/// Delay between the backdrop entrance and the first plane entrance.
pub const ENTRANCE_START_DELAY: Duration = Duration::from_millis(600);

/// Extra delay added per plane index.
pub const ENTRANCE_STAGGER: Duration = Duration::from_millis(30);

/// Backdrop fade-in duration.
pub const BACKDROP_FADE: Duration = Duration::from_millis(1500);

/// Camera dolly-in, starts after the first plane entrances.
pub const CAMERA_DOLLY_DELAY: Duration = Duration::from_millis(1000);
pub const CAMERA_DOLLY_DURATION: Duration = Duration::from_millis(3000);
pub const CAMERA_START_Z: f32 = 90.0;
pub const CAMERA_TARGET_Z: f32 = 48.0;

/// Hover scale target and interpolation rate (per second).
pub const HOVER_SCALE: f32 = 1.12;
pub const SCALE_LERP_RATE: f32 = 8.0;
pub const OPACITY_LERP_RATE: f32 = 5.0;
pub const GLOW_LERP_RATE: f32 = 6.0;

/// Opacity a plane settles at when idle, and when hovered.
pub const BASE_OPACITY: f32 = 0.85;
pub const HOVER_OPACITY: f32 = 1.0;
pub const HOVER_GLOW_OPACITY: f32 = 0.45;

/// Per-update chance of a glitch at the highest LOD.
pub const GLITCH_PROBABILITY: f32 = 0.002;
pub const GLITCH_DURATION_S: f32 = 0.18;
pub const GLITCH_JITTER: f32 = 0.25;

/// Rotational wobble applied at the highest LOD (radians, rad/s).
pub const WOBBLE_AMPLITUDE: f32 = 0.03;
pub const WOBBLE_FREQUENCY: f32 = 0.35;

/// Full-screen transition phases.
pub const FLIP_DURATION: Duration = Duration::from_millis(450);
pub const FILL_DURATION: Duration = Duration::from_millis(700);
