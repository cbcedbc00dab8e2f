//! Procedural slot layouts
//!
//! A layout turns a device preset and an entity count into world-space
//! slots. `Building` is the landing-page silhouette: an inverted-V main
//! wall, two wings curving back on growing arcs and a foundation ring.
//! `Wall` and `Preview` are the flat grid and shallow arc used by the
//! gallery pages.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::domains::scene::entity::Tier;
use crate::infra::constants::layout as consts;
use crate::infra::constants::media::{PRIORITY_FOUNDATION, PRIORITY_WALL, PRIORITY_WING};
use crate::infra::device::{DeviceClass, DevicePreset};
use crate::infra::rng::SceneRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    Building,
    Wall,
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSlot {
    pub position: Vec3,
    /// Euler angles (XYZ, radians).
    pub rotation: Vec3,
    pub tier: Tier,
    pub drift_intensity: f32,
    pub texture_priority: u32,
}

impl LayoutKind {
    /// Number of planes generated for a dataset of `available` artworks.
    pub fn capacity(self, preset: &DevicePreset, available: usize) -> usize {
        if available == 0 {
            return 0;
        }
        match self {
            LayoutKind::Building => preset.building_capacity(),
            LayoutKind::Wall => available.min(consts::GALLERY_WALL_MAX),
            LayoutKind::Preview => available.min(consts::PREVIEW_COUNT),
        }
    }

    /// Generate `count` slots; `count` is normally [`Self::capacity`].
    pub fn slots(
        self,
        preset: &DevicePreset,
        count: usize,
        rng: &mut SceneRng,
    ) -> Vec<LayoutSlot> {
        let mut slots = match self {
            LayoutKind::Building => building(preset, rng),
            LayoutKind::Wall => wall(preset, count, rng),
            LayoutKind::Preview => preview(count),
        };
        slots.truncate(count);
        slots
    }

    /// Point the camera looks at.
    pub fn focus_point(self, preset: &DevicePreset) -> Vec3 {
        match self {
            LayoutKind::Building => {
                let wall_height =
                    preset.wall_rows.saturating_sub(1) as f32 * consts::WALL_SPACING_Y;
                Vec3::new(0.0, (wall_height + consts::ROOFLINE_RISE) * 0.5, 0.0)
            }
            LayoutKind::Wall | LayoutKind::Preview => Vec3::ZERO,
        }
    }
}

fn tilt(rng: &mut SceneRng) -> Vec3 {
    Vec3::new(rng.signed(consts::MAX_TILT), rng.signed(consts::MAX_TILT), 0.0)
}

fn building(preset: &DevicePreset, rng: &mut SceneRng) -> Vec<LayoutSlot> {
    let mut slots = Vec::with_capacity(preset.building_capacity());
    let half_cols = preset.wall_cols.saturating_sub(1) as f32 * 0.5;

    // Main wall: taller at the edges than at the centre
    for row in 0..preset.wall_rows {
        for col in 0..preset.wall_cols {
            let offset = col as f32 - half_cols;
            let edge = if half_cols > 0.0 {
                offset.abs() / half_cols
            } else {
                0.0
            };
            slots.push(LayoutSlot {
                position: Vec3::new(
                    offset * consts::WALL_SPACING_X + rng.signed(consts::WALL_JITTER),
                    row as f32 * consts::WALL_SPACING_Y
                        + edge * consts::ROOFLINE_RISE
                        + rng.signed(consts::WALL_JITTER),
                    rng.signed(consts::WALL_JITTER * 0.5),
                ),
                rotation: tilt(rng),
                tier: Tier::Wall,
                drift_intensity: consts::WALL_DRIFT,
                texture_priority: PRIORITY_WALL,
            });
        }
    }

    // Wings: left then right, each on an arc whose radius grows with index
    let wall_half_width = half_cols * consts::WALL_SPACING_X;
    for side in [-1.0_f32, 1.0] {
        for i in 0..preset.wing_count {
            let radius = consts::WING_BASE_RADIUS + i as f32 * consts::WING_RADIUS_STEP;
            let angle = (i + 1) as f32 * consts::WING_ANGLE_STEP;
            let mut rotation = tilt(rng);
            rotation.y -= side * (angle + 0.3);
            slots.push(LayoutSlot {
                position: Vec3::new(
                    side * (wall_half_width + radius * angle.cos()),
                    -consts::WING_DROP + rng.signed(consts::WING_HEIGHT_SPREAD),
                    -radius * angle.sin(),
                ),
                rotation,
                tier: Tier::Wing,
                drift_intensity: consts::WING_DRIFT,
                texture_priority: PRIORITY_WING,
            });
        }
    }

    // Foundation ring below the structure, tilted towards the camera
    let count = preset.foundation_count;
    for i in 0..count {
        let angle = TAU * i as f32 / count.max(1) as f32;
        let mut rotation = tilt(rng);
        rotation.x -= 0.35;
        slots.push(LayoutSlot {
            position: Vec3::new(
                consts::FOUNDATION_RADIUS * angle.cos(),
                -consts::FOUNDATION_DEPTH,
                consts::FOUNDATION_RADIUS * 0.5 * angle.sin(),
            ),
            rotation,
            tier: Tier::Foundation,
            drift_intensity: consts::FOUNDATION_DRIFT,
            texture_priority: PRIORITY_FOUNDATION,
        });
    }

    slots
}

fn wall(preset: &DevicePreset, count: usize, rng: &mut SceneRng) -> Vec<LayoutSlot> {
    let cols = match preset.class {
        DeviceClass::Mobile => consts::GALLERY_WALL_COLS_MOBILE,
        DeviceClass::Desktop => consts::GALLERY_WALL_COLS,
    };
    let rows = count.div_ceil(cols);
    let half_cols = cols.saturating_sub(1) as f32 * 0.5;
    let half_rows = rows.saturating_sub(1) as f32 * 0.5;
    (0..count)
        .map(|i| {
            let (row, col) = (i / cols, i % cols);
            LayoutSlot {
                position: Vec3::new(
                    (col as f32 - half_cols) * consts::GALLERY_WALL_SPACING,
                    (half_rows - row as f32) * consts::GALLERY_WALL_SPACING,
                    0.0,
                ),
                rotation: tilt(rng) * 0.5,
                tier: Tier::Gallery,
                drift_intensity: consts::GALLERY_DRIFT,
                texture_priority: PRIORITY_WALL,
            }
        })
        .collect()
}

fn preview(count: usize) -> Vec<LayoutSlot> {
    let radius = consts::PREVIEW_ARC_RADIUS;
    (0..count)
        .map(|i| {
            let t = if count > 1 {
                i as f32 / (count - 1) as f32 - 0.5
            } else {
                0.0
            };
            let angle = t * consts::PREVIEW_ARC_SPAN;
            LayoutSlot {
                position: Vec3::new(radius * angle.sin(), 0.0, -radius * (1.0 - angle.cos())),
                rotation: Vec3::new(0.0, -angle, 0.0),
                tier: Tier::Gallery,
                drift_intensity: consts::GALLERY_DRIFT,
                texture_priority: PRIORITY_WALL,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn building_tiers_follow_the_preset() {
        let preset = DeviceClass::Desktop.preset();
        let mut rng = SceneRng::seeded(3);
        let count = LayoutKind::Building.capacity(&preset, 10);
        let slots = LayoutKind::Building.slots(&preset, count, &mut rng);
        assert_eq!(slots.len(), 60);
        let walls = slots.iter().filter(|s| s.tier == Tier::Wall).count();
        let wings = slots.iter().filter(|s| s.tier == Tier::Wing).count();
        let foundation = slots.iter().filter(|s| s.tier == Tier::Foundation).count();
        assert_eq!((walls, wings, foundation), (32, 16, 12));
    }

    #[test]
    fn main_wall_is_taller_at_the_edges() {
        let preset = DeviceClass::Desktop.preset();
        let mut rng = SceneRng::seeded(5);
        let slots = LayoutKind::Building.slots(&preset, preset.building_capacity(), &mut rng);
        let bottom_row = &slots[..preset.wall_cols];
        let edge = bottom_row[0].position.y;
        let centre = bottom_row[preset.wall_cols / 2].position.y;
        assert!(edge > centre + consts::ROOFLINE_RISE * 0.5);
    }

    #[test]
    fn empty_dataset_has_no_slots() {
        let preset = DeviceClass::Mobile.preset();
        for kind in [LayoutKind::Building, LayoutKind::Wall, LayoutKind::Preview] {
            assert_eq!(kind.capacity(&preset, 0), 0);
        }
    }

    #[test]
    fn gallery_layouts_are_capped() {
        let preset = DeviceClass::Desktop.preset();
        assert_eq!(LayoutKind::Wall.capacity(&preset, 7), 7);
        assert_eq!(LayoutKind::Wall.capacity(&preset, 500), consts::GALLERY_WALL_MAX);
        assert_eq!(LayoutKind::Preview.capacity(&preset, 40), consts::PREVIEW_COUNT);
        let slots = LayoutKind::Preview.slots(&preset, 9, &mut SceneRng::seeded(1));
        assert_eq!(slots.len(), 9);
        assert!(slots[4].position.x.abs() < 1e-4);
    }
}
