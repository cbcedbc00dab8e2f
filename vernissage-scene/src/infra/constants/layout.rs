//! Layout presets per device class.

/// Desktop building preset
pub mod desktop {
    pub const WALL_ROWS: usize = 4;
    pub const WALL_COLS: usize = 8;
    pub const WING_COUNT: usize = 8;
    pub const FOUNDATION_COUNT: usize = 12;
    pub const PLANE_SEGMENTS: u32 = 4;
    pub const MAX_PIXEL_RATIO: f32 = 2.0;
    pub const ANTIALIAS: bool = true;
    pub const SHADOWS: bool = true;
    pub const BACKDROP_PARTICLES: usize = 600;
}

/// Mobile building preset
pub mod mobile {
    pub const WALL_ROWS: usize = 3;
    pub const WALL_COLS: usize = 5;
    pub const WING_COUNT: usize = 4;
    pub const FOUNDATION_COUNT: usize = 6;
    pub const PLANE_SEGMENTS: u32 = 1;
    pub const MAX_PIXEL_RATIO: f32 = 1.5;
    pub const ANTIALIAS: bool = false;
    pub const SHADOWS: bool = false;
    pub const BACKDROP_PARTICLES: usize = 200;
}

/// Viewports narrower than this are treated as mobile.
pub const MOBILE_MAX_WIDTH: u32 = 768;

/// User-agent fragments that identify a mobile device.
pub const MOBILE_USER_AGENT_MARKERS: &[&str] =
    &["Mobi", "Android", "iPhone", "iPad", "iPod", "Opera Mini"];

/// Building geometry (world units)
pub const PLANE_BASE_HEIGHT: f32 = 4.0;
pub const WALL_SPACING_X: f32 = 6.5;
pub const WALL_SPACING_Y: f32 = 5.5;
pub const ROOFLINE_RISE: f32 = 9.0;
pub const WALL_JITTER: f32 = 0.6;
pub const WING_BASE_RADIUS: f32 = 8.0;
pub const WING_RADIUS_STEP: f32 = 2.2;
pub const WING_ANGLE_STEP: f32 = 0.22;
pub const WING_DROP: f32 = 6.0;
pub const WING_HEIGHT_SPREAD: f32 = 3.0;
pub const FOUNDATION_RADIUS: f32 = 22.0;
pub const FOUNDATION_DEPTH: f32 = 10.0;
pub const MAX_TILT: f32 = 0.08;

/// Drift intensity per tier
pub const WALL_DRIFT: f32 = 0.35;
pub const WING_DRIFT: f32 = 0.6;
pub const FOUNDATION_DRIFT: f32 = 0.2;

/// Gallery wall (flat grid) and preview strip
pub const GALLERY_WALL_COLS: usize = 6;
pub const GALLERY_WALL_COLS_MOBILE: usize = 3;
pub const GALLERY_WALL_MAX: usize = 120;
pub const GALLERY_DRIFT: f32 = 0.15;
pub const GALLERY_WALL_SPACING: f32 = 5.0;
pub const PREVIEW_COUNT: usize = 9;
pub const PREVIEW_ARC_RADIUS: f32 = 40.0;
pub const PREVIEW_ARC_SPAN: f32 = 0.9;

/// Plane aspect ratios picked at random on construction (width / height).
pub const ASPECT_RATIOS: &[f32] = &[0.75, 0.8, 1.0, 1.25, 1.5];
