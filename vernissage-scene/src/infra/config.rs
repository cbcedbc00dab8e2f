//! Scene configuration
//!
//! Every tunable of the engine lives here. Defaults come from
//! [`crate::infra::constants`]; a TOML file can override any subset of them
//! (all sections are `#[serde(default)]`), and a handful of `VERNISSAGE_*`
//! environment variables override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infra::constants::{animation, layout, lod, media, performance};

/// Environment variable naming a TOML config file.
pub const CONFIG_PATH_ENV: &str = "VERNISSAGE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for {var}")]
    Env { var: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tuning knobs applied while the monitor reports a given level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierKnobs {
    pub update_multiplier: f32,
    pub batch_size: usize,
    pub skip_probability: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub target_fps: f32,
    pub sample_window: usize,
    pub recent_window: usize,
    pub check_interval_ms: f64,
    pub stall_threshold_ms: f64,
    pub max_consecutive_stalls: u32,
    pub low_fps_ratio: f32,
    pub medium_fps_ratio: f32,
    pub recovery_margin: f32,
    pub memory_pressure_ratio: f64,
    pub high: TierKnobs,
    pub medium: TierKnobs,
    pub low: TierKnobs,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        use performance::{high, low, medium};
        Self {
            target_fps: performance::TARGET_FPS,
            sample_window: performance::SAMPLE_WINDOW,
            recent_window: performance::RECENT_WINDOW,
            check_interval_ms: performance::CHECK_INTERVAL_MS,
            stall_threshold_ms: performance::STALL_THRESHOLD_MS,
            max_consecutive_stalls: performance::MAX_CONSECUTIVE_STALLS,
            low_fps_ratio: performance::LOW_FPS_RATIO,
            medium_fps_ratio: performance::MEDIUM_FPS_RATIO,
            recovery_margin: performance::RECOVERY_MARGIN,
            memory_pressure_ratio: performance::MEMORY_PRESSURE_RATIO,
            high: TierKnobs {
                update_multiplier: high::UPDATE_MULTIPLIER,
                batch_size: high::BATCH_SIZE,
                skip_probability: high::SKIP_PROBABILITY,
            },
            medium: TierKnobs {
                update_multiplier: medium::UPDATE_MULTIPLIER,
                batch_size: medium::BATCH_SIZE,
                skip_probability: medium::SKIP_PROBABILITY,
            },
            low: TierKnobs {
                update_multiplier: low::UPDATE_MULTIPLIER,
                batch_size: low::BATCH_SIZE,
                skip_probability: low::SKIP_PROBABILITY,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodConfig {
    pub enabled: bool,
    pub high_distance: f32,
    pub medium_distance: f32,
    pub cull_distance: f32,
    pub check_interval_s: f32,
    pub medium_drift_scale: f32,
    pub low_drift_scale: f32,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            high_distance: lod::HIGH_DISTANCE,
            medium_distance: lod::MEDIUM_DISTANCE,
            cull_distance: lod::CULL_DISTANCE,
            check_interval_s: lod::CHECK_INTERVAL_S,
            medium_drift_scale: lod::MEDIUM_DRIFT_SCALE,
            low_drift_scale: lod::LOW_DRIFT_SCALE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub entrance_ms: u64,
    pub entrance_start_delay_ms: u64,
    pub entrance_stagger_ms: u64,
    pub backdrop_fade_ms: u64,
    pub camera_dolly_delay_ms: u64,
    pub camera_dolly_ms: u64,
    pub camera_start_z: f32,
    pub camera_target_z: f32,
    pub hover_scale: f32,
    pub scale_lerp_rate: f32,
    pub opacity_lerp_rate: f32,
    pub glow_lerp_rate: f32,
    pub base_opacity: f32,
    pub hover_opacity: f32,
    pub hover_glow_opacity: f32,
    /// Set to 0 to disable glitches (deterministic tests).
    pub glitch_probability: f32,
    pub glitch_duration_s: f32,
    pub glitch_jitter: f32,
    pub wobble_amplitude: f32,
    pub wobble_frequency: f32,
    pub flip_ms: u64,
    pub fill_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            entrance_ms: animation::ENTRANCE_DURATION.as_millis() as u64,
            entrance_start_delay_ms: animation::ENTRANCE_START_DELAY.as_millis()
                as u64,
            entrance_stagger_ms: animation::ENTRANCE_STAGGER.as_millis() as u64,
            backdrop_fade_ms: animation::BACKDROP_FADE.as_millis() as u64,
            camera_dolly_delay_ms: animation::CAMERA_DOLLY_DELAY.as_millis()
                as u64,
            camera_dolly_ms: animation::CAMERA_DOLLY_DURATION.as_millis() as u64,
            camera_start_z: animation::CAMERA_START_Z,
            camera_target_z: animation::CAMERA_TARGET_Z,
            hover_scale: animation::HOVER_SCALE,
            scale_lerp_rate: animation::SCALE_LERP_RATE,
            opacity_lerp_rate: animation::OPACITY_LERP_RATE,
            glow_lerp_rate: animation::GLOW_LERP_RATE,
            base_opacity: animation::BASE_OPACITY,
            hover_opacity: animation::HOVER_OPACITY,
            hover_glow_opacity: animation::HOVER_GLOW_OPACITY,
            glitch_probability: animation::GLITCH_PROBABILITY,
            glitch_duration_s: animation::GLITCH_DURATION_S,
            glitch_jitter: animation::GLITCH_JITTER,
            wobble_amplitude: animation::WOBBLE_AMPLITUDE,
            wobble_frequency: animation::WOBBLE_FREQUENCY,
            flip_ms: animation::FLIP_DURATION.as_millis() as u64,
            fill_ms: animation::FILL_DURATION.as_millis() as u64,
        }
    }
}

impl AnimationConfig {
    pub fn entrance_duration(&self) -> Duration {
        Duration::from_millis(self.entrance_ms)
    }

    pub fn flip_duration(&self) -> Duration {
        Duration::from_millis(self.flip_ms)
    }

    pub fn fill_duration(&self) -> Duration {
        Duration::from_millis(self.fill_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub max_concurrent_loads: usize,
    pub texture_cache_capacity: usize,
    pub photo_display_ratio: f32,
    pub max_texture_applies_per_frame: usize,
    pub fallback_texture_size: u32,
    /// TrueType/OpenType font used to caption synthesized textures.
    pub font_path: Option<PathBuf>,
    pub http_timeout_ms: u64,
    pub http_max_retries: u32,
    pub construction_delay_ms: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_concurrent_loads: media::MAX_CONCURRENT_LOADS,
            texture_cache_capacity: media::TEXTURE_CACHE_CAPACITY,
            photo_display_ratio: media::PHOTO_DISPLAY_RATIO,
            max_texture_applies_per_frame: media::MAX_TEXTURE_APPLIES_PER_FRAME,
            fallback_texture_size: media::FALLBACK_TEXTURE_SIZE,
            font_path: None,
            http_timeout_ms: media::HTTP_TIMEOUT.as_millis() as u64,
            http_max_retries: media::HTTP_MAX_RETRIES,
            construction_delay_ms: media::CONSTRUCTION_DELAY.as_millis() as u64,
        }
    }
}

impl MediaConfig {
    pub fn construction_delay(&self) -> Duration {
        Duration::from_millis(self.construction_delay_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub raycast_interval_ms: f64,
    /// Coarser raycast interval used while performance is `low`.
    pub raycast_interval_low_ms: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            raycast_interval_ms: 50.0,
            raycast_interval_low_ms: 120.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub mobile_max_width: u32,
    pub mobile_user_agent_markers: Vec<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            mobile_max_width: layout::MOBILE_MAX_WIDTH,
            mobile_user_agent_markers: layout::MOBILE_USER_AGENT_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for every random choice the scene makes. `None` seeds from the OS.
    pub rng_seed: Option<u64>,
    pub performance: PerformanceConfig,
    pub lod: LodConfig,
    pub animation: AnimationConfig,
    pub media: MediaConfig,
    pub interaction: InteractionConfig,
    pub device: DeviceConfig,
}

impl SceneConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&source)
    }

    /// Defaults, then the file named by `VERNISSAGE_CONFIG` (if any), then
    /// individual `VERNISSAGE_*` overrides.
    pub fn from_environment() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                log::info!("Loading scene config from {path}");
                Self::from_path(path.trim())?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `VERNISSAGE_*` overrides using the given lookup.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        fn parse<T: std::str::FromStr>(
            var: &'static str,
            value: String,
        ) -> Result<T, ConfigError> {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Env { var, value })
        }

        if let Some(value) = lookup("VERNISSAGE_RNG_SEED") {
            self.rng_seed = Some(parse("VERNISSAGE_RNG_SEED", value)?);
        }
        if let Some(value) = lookup("VERNISSAGE_MAX_CONCURRENT_LOADS") {
            self.media.max_concurrent_loads =
                parse("VERNISSAGE_MAX_CONCURRENT_LOADS", value)?;
        }
        if let Some(value) = lookup("VERNISSAGE_TEXTURE_CACHE_CAPACITY") {
            self.media.texture_cache_capacity =
                parse("VERNISSAGE_TEXTURE_CACHE_CAPACITY", value)?;
        }
        if let Some(value) = lookup("VERNISSAGE_TARGET_FPS") {
            self.performance.target_fps = parse("VERNISSAGE_TARGET_FPS", value)?;
        }
        if let Some(value) = lookup("VERNISSAGE_FONT_PATH") {
            self.media.font_path = Some(PathBuf::from(value.trim()));
        }
        if let Some(value) = lookup("VERNISSAGE_LOD") {
            self.lod.enabled = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::Env {
                        var: "VERNISSAGE_LOD",
                        value,
                    });
                }
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let perf = &self.performance;
        if !(perf.target_fps > 0.0) {
            return Err(ConfigError::Invalid(
                "performance.target_fps must be positive".into(),
            ));
        }
        if perf.sample_window == 0
            || perf.recent_window == 0
            || perf.recent_window > perf.sample_window
        {
            return Err(ConfigError::Invalid(
                "performance windows must satisfy 0 < recent_window <= sample_window"
                    .into(),
            ));
        }
        if !(perf.check_interval_ms > 0.0) {
            return Err(ConfigError::Invalid(
                "performance.check_interval_ms must be positive".into(),
            ));
        }
        if !(perf.low_fps_ratio < perf.medium_fps_ratio) {
            return Err(ConfigError::Invalid(
                "performance.low_fps_ratio must be below medium_fps_ratio".into(),
            ));
        }
        for (name, knobs) in
            [("high", perf.high), ("medium", perf.medium), ("low", perf.low)]
        {
            if knobs.batch_size == 0 {
                return Err(ConfigError::Invalid(format!(
                    "performance.{name}.batch_size must be at least 1"
                )));
            }
            if !(0.0..=1.0).contains(&knobs.skip_probability) {
                return Err(ConfigError::Invalid(format!(
                    "performance.{name}.skip_probability must be within [0, 1]"
                )));
            }
        }

        let lod = &self.lod;
        if !(lod.high_distance < lod.medium_distance
            && lod.medium_distance < lod.cull_distance)
        {
            return Err(ConfigError::Invalid(
                "lod distances must satisfy high < medium < cull".into(),
            ));
        }

        if self.media.max_concurrent_loads == 0 {
            return Err(ConfigError::Invalid(
                "media.max_concurrent_loads must be at least 1".into(),
            ));
        }
        if self.media.texture_cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "media.texture_cache_capacity must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.media.photo_display_ratio) {
            return Err(ConfigError::Invalid(
                "media.photo_display_ratio must be within [0, 1]".into(),
            ));
        }
        if self.media.fallback_texture_size < media::MIN_FALLBACK_TEXTURE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "media.fallback_texture_size must be at least {}",
                media::MIN_FALLBACK_TEXTURE_SIZE
            )));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }
}
