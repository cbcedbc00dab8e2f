//! Device adaptation
//!
//! A coarse mobile/desktop split chooses entity counts, geometry resolution
//! and renderer toggles. Nothing here is a protocol; it only trades visual
//! richness for frame budget.

use crate::infra::config::DeviceConfig;
use crate::infra::constants::layout::{desktop, mobile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

/// Surface the scene is presented on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            pixel_ratio: if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 },
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl DeviceClass {
    /// User-agent substring match first, then the viewport width threshold.
    pub fn detect(
        viewport: &Viewport,
        user_agent: Option<&str>,
        config: &DeviceConfig,
    ) -> Self {
        let ua_mobile = user_agent.is_some_and(|ua| {
            config
                .mobile_user_agent_markers
                .iter()
                .any(|marker| ua.contains(marker.as_str()))
        });
        if ua_mobile || viewport.width < config.mobile_max_width {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }

    pub fn preset(self) -> DevicePreset {
        match self {
            DeviceClass::Desktop => DevicePreset {
                class: self,
                wall_rows: desktop::WALL_ROWS,
                wall_cols: desktop::WALL_COLS,
                wing_count: desktop::WING_COUNT,
                foundation_count: desktop::FOUNDATION_COUNT,
                plane_segments: desktop::PLANE_SEGMENTS,
                max_pixel_ratio: desktop::MAX_PIXEL_RATIO,
                antialias: desktop::ANTIALIAS,
                shadows: desktop::SHADOWS,
                backdrop_particles: desktop::BACKDROP_PARTICLES,
            },
            DeviceClass::Mobile => DevicePreset {
                class: self,
                wall_rows: mobile::WALL_ROWS,
                wall_cols: mobile::WALL_COLS,
                wing_count: mobile::WING_COUNT,
                foundation_count: mobile::FOUNDATION_COUNT,
                plane_segments: mobile::PLANE_SEGMENTS,
                max_pixel_ratio: mobile::MAX_PIXEL_RATIO,
                antialias: mobile::ANTIALIAS,
                shadows: mobile::SHADOWS,
                backdrop_particles: mobile::BACKDROP_PARTICLES,
            },
        }
    }
}

/// Quality parameters chosen for a device class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevicePreset {
    pub class: DeviceClass,
    pub wall_rows: usize,
    pub wall_cols: usize,
    /// Planes per side wing.
    pub wing_count: usize,
    pub foundation_count: usize,
    pub plane_segments: u32,
    pub max_pixel_ratio: f32,
    pub antialias: bool,
    pub shadows: bool,
    pub backdrop_particles: usize,
}

impl DevicePreset {
    /// Slots of the three-tier building layout.
    pub fn building_capacity(&self) -> usize {
        self.wall_rows * self.wall_cols + 2 * self.wing_count + self.foundation_count
    }

    /// Render pixel ratio, clamped for fill-rate.
    pub fn render_pixel_ratio(&self, viewport: &Viewport) -> f32 {
        viewport.pixel_ratio.min(self.max_pixel_ratio)
    }
}
