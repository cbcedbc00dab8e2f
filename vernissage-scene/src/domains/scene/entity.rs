//! A single artwork plane
//!
//! A [`WorkPlane`] owns its geometry, material, edge outline and glow, and
//! runs two orthogonal state machines:
//!
//! - texture: constructed (untextured) until the composer applies the
//!   resolved texture;
//! - animation: inert until its entrance completes, then steady state, then
//!   disposed.
//!
//! Updates before the entrance completes are no-ops. Disposal is
//! idempotent; the texture is an `Arc`, so releasing the plane's reference
//! never frees a texture the cache still holds.

use std::sync::Arc;

use glam::{EulerRot, Mat4, Quat, Vec3};
use vernissage_model::{ArtworkId, ArtworkRef, ArtworkSet};

use crate::domains::media::{Texture, TextureVariant};
use crate::domains::scene::camera::Ray;
use crate::domains::scene::layout::LayoutSlot;
use crate::domains::scene::render::DrawItem;
use crate::domains::scene::transitions::{EasingFunction, Tween, approach_factor};
use crate::infra::config::{AnimationConfig, LodConfig};
use crate::infra::constants::layout::{ASPECT_RATIOS, PLANE_BASE_HEIGHT};
use crate::infra::rng::SceneRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub usize);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "plane#{}", self.0)
    }
}

/// Structural group a plane belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Wall,
    Wing,
    Foundation,
    /// Gallery wall and preview layouts.
    Gallery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LodLevel {
    High,
    Medium,
    Low,
}

/// Settings shared by every plane of a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneTuning {
    pub animation: AnimationConfig,
    pub lod: LodConfig,
    pub photo_display_ratio: f32,
    pub plane_segments: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneGeometry {
    pub width: f32,
    pub height: f32,
    pub segments: u32,
}

#[derive(Debug, Clone)]
pub struct PlaneMaterial {
    pub color: Vec3,
    pub opacity: f32,
    pub texture: Option<Arc<Texture>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeOutline {
    pub color: Vec3,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub opacity: f32,
    /// Size relative to the plane.
    pub scale: f32,
}

/// Transform that overrides the animated one while the plane is the
/// subject of a full-screen transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Presentation {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy)]
struct Glitch {
    until_s: f32,
}

const GLITCH_TINT: Vec3 = Vec3::new(0.55, 1.0, 0.95);
const BASE_COLOR: Vec3 = Vec3::ONE;
const EDGE_COLOR: Vec3 = Vec3::new(0.8, 0.85, 1.0);

#[derive(Debug)]
pub struct WorkPlane {
    id: EntityId,
    artwork_id: ArtworkId,
    tier: Tier,
    variant: TextureVariant,
    texture_priority: u32,
    tuning: Arc<PlaneTuning>,

    base_position: Vec3,
    position: Vec3,
    base_rotation: Vec3,
    rotation: Vec3,
    drift_intensity: f32,
    drift_phase: Vec3,

    current_scale: f32,
    target_scale: f32,
    hovered: bool,
    opacity: f32,

    lod: LodLevel,
    visible: bool,
    lod_timer_s: f32,
    lod_evaluated: bool,

    geometry: Option<PlaneGeometry>,
    material: Option<PlaneMaterial>,
    edge: Option<EdgeOutline>,
    glow: Option<Glow>,

    entrance: Option<Tween<f32>>,
    entrance_complete: bool,
    glitch: Option<Glitch>,
    presentation: Option<Presentation>,

    local_time_s: f32,
    update_calls: u64,
    disposed: bool,
    rng: SceneRng,
}

impl WorkPlane {
    /// Build an invisible plane (zero scale and opacity) for a layout slot.
    pub fn new(
        id: EntityId,
        artwork: &ArtworkRef,
        slot: &LayoutSlot,
        tuning: Arc<PlaneTuning>,
        mut rng: SceneRng,
    ) -> Self {
        let aspect = rng.pick(ASPECT_RATIOS).copied().unwrap_or(1.0);
        let variant = if rng.chance(tuning.photo_display_ratio) {
            TextureVariant::Photo
        } else {
            TextureVariant::Placeholder
        };
        let drift_phase = Vec3::new(
            rng.unit() * std::f32::consts::TAU,
            rng.unit() * std::f32::consts::TAU,
            rng.unit() * std::f32::consts::TAU,
        );

        Self {
            id,
            artwork_id: artwork.id.clone(),
            tier: slot.tier,
            variant,
            texture_priority: slot.texture_priority,
            base_position: slot.position,
            position: slot.position,
            base_rotation: slot.rotation,
            rotation: slot.rotation,
            drift_intensity: slot.drift_intensity,
            drift_phase,
            current_scale: 0.0,
            target_scale: 1.0,
            hovered: false,
            opacity: 0.0,
            lod: LodLevel::High,
            visible: true,
            lod_timer_s: 0.0,
            lod_evaluated: false,
            geometry: Some(PlaneGeometry {
                width: PLANE_BASE_HEIGHT * aspect,
                height: PLANE_BASE_HEIGHT,
                segments: tuning.plane_segments,
            }),
            material: Some(PlaneMaterial {
                color: BASE_COLOR,
                opacity: 0.0,
                texture: None,
            }),
            edge: Some(EdgeOutline {
                color: EDGE_COLOR,
                opacity: 0.0,
            }),
            glow: Some(Glow {
                opacity: 0.0,
                scale: 1.15,
            }),
            entrance: None,
            entrance_complete: false,
            glitch: None,
            presentation: None,
            local_time_s: 0.0,
            update_calls: 0,
            disposed: false,
            rng,
            tuning,
        }
    }

    /// Schedule the entrance `delay_s` after `now_s` (scene seconds).
    pub fn animate_entrance(&mut self, now_s: f64, delay_s: f64) {
        if self.disposed || self.entrance_complete {
            return;
        }
        self.entrance = Some(Tween::new(
            0.0,
            1.0,
            now_s + delay_s,
            self.tuning.animation.entrance_duration(),
            EasingFunction::EaseOutCubic,
        ));
    }

    /// Drive the entrance tween. Runs every frame for every entering plane,
    /// independently of the batched scheduler.
    pub fn advance_entrance(&mut self, now_s: f64) {
        let Some(tween) = self.entrance else {
            return;
        };
        if !tween.has_started(now_s) {
            return;
        }
        let base_opacity = self.tuning.animation.base_opacity;
        if tween.is_complete(now_s) {
            self.entrance = None;
            self.entrance_complete = true;
            self.current_scale = 1.0;
            self.target_scale = if self.hovered {
                self.tuning.animation.hover_scale
            } else {
                1.0
            };
            self.set_opacity(base_opacity);
            log::trace!("{} entrance complete", self.id);
            return;
        }
        let t = tween.sample(now_s);
        self.current_scale = t;
        self.set_opacity(base_opacity * t);
    }

    /// Per-frame update, called by the scheduler when this plane is in the
    /// current batch.
    pub fn update(&mut self, delta_s: f32, time_s: f32, camera_position: Vec3) {
        self.update_calls += 1;
        if self.disposed || !self.entrance_complete || self.presentation.is_some() {
            return;
        }
        self.local_time_s += delta_s;
        let tuning = Arc::clone(&self.tuning);

        // (a) throttled distance LOD
        let lod = &tuning.lod;
        if lod.enabled {
            self.lod_timer_s += delta_s;
            if !self.lod_evaluated || self.lod_timer_s >= lod.check_interval_s {
                self.lod_timer_s = 0.0;
                self.lod_evaluated = true;
                let distance = self.position.distance(camera_position);
                self.visible = distance < lod.cull_distance;
                self.lod = if distance < lod.high_distance {
                    LodLevel::High
                } else if distance < lod.medium_distance {
                    LodLevel::Medium
                } else {
                    LodLevel::Low
                };
            }
        } else {
            self.visible = true;
            self.lod = LodLevel::High;
        }

        // (b)
        if !self.visible {
            return;
        }

        let anim = &tuning.animation;

        // (c) drift, damped at lower detail levels
        let drift_scale = match self.lod {
            LodLevel::High => 1.0,
            LodLevel::Medium => lod.medium_drift_scale,
            LodLevel::Low => lod.low_drift_scale,
        };
        let amplitude = self.drift_intensity * drift_scale;
        let phase = self.drift_phase;
        let offset = Vec3::new(
            (time_s * 0.5 + phase.x).sin(),
            (time_s * 0.7 + phase.y).sin() * 0.6,
            (time_s * 0.3 + phase.z).sin() * 0.4,
        ) * amplitude;
        self.position = self.base_position + offset;

        // (d) occasional glitch at the highest detail only
        if self.glitch.is_none()
            && self.lod == LodLevel::High
            && self.rng.chance(anim.glitch_probability)
        {
            self.glitch = Some(Glitch {
                until_s: self.local_time_s + anim.glitch_duration_s,
            });
        }

        let opacity_step = approach_factor(anim.opacity_lerp_rate, delta_s);
        match self.glitch {
            Some(glitch) if self.local_time_s < glitch.until_s => {
                let jitter = anim.glitch_jitter;
                self.position += Vec3::new(self.rng.signed(jitter), self.rng.signed(jitter), 0.0);
                let flicker = anim.base_opacity * (0.4 + 0.6 * self.rng.unit());
                self.set_opacity(flicker);
                if let Some(material) = self.material.as_mut() {
                    material.color = GLITCH_TINT;
                }
            }
            _ => {
                // (e)
                self.glitch = None;
                let target = if self.hovered {
                    anim.hover_opacity
                } else {
                    anim.base_opacity
                };
                let opacity = self.opacity + (target - self.opacity) * opacity_step;
                self.set_opacity(opacity);
                if let Some(material) = self.material.as_mut() {
                    material.color = BASE_COLOR;
                }
            }
        }

        // (f)
        let scale_step = approach_factor(anim.scale_lerp_rate, delta_s);
        self.current_scale += (self.target_scale - self.current_scale) * scale_step;

        // (g) wobble and glow at the highest detail only
        if self.lod == LodLevel::High {
            let cycle = self.local_time_s * anim.wobble_frequency * std::f32::consts::TAU;
            let swing = (cycle + phase.x).sin() * anim.wobble_amplitude;
            self.rotation = self.base_rotation + Vec3::new(0.0, swing, swing * 0.5);
            let glow_target = if self.hovered {
                anim.hover_glow_opacity
            } else {
                0.0
            };
            let glow_step = approach_factor(anim.glow_lerp_rate, delta_s);
            if let Some(glow) = self.glow.as_mut() {
                glow.opacity += (glow_target - glow.opacity) * glow_step;
            }
        }
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
        if let Some(material) = self.material.as_mut() {
            material.opacity = self.opacity;
        }
        if let Some(edge) = self.edge.as_mut() {
            edge.opacity = self.opacity * 0.6;
        }
    }

    pub fn set_hover(&mut self, hovered: bool) {
        self.hovered = hovered;
        self.target_scale = if hovered {
            self.tuning.animation.hover_scale
        } else {
            1.0
        };
    }

    /// The artwork to navigate to, if it is still part of the dataset.
    pub fn click_target<'a>(&self, dataset: &'a ArtworkSet) -> Option<&'a ArtworkRef> {
        if self.disposed {
            return None;
        }
        dataset.get(&self.artwork_id)
    }

    /// Attach a resolved texture. Returns false when the plane was already
    /// disposed and the texture was dropped.
    pub fn apply_texture(&mut self, texture: Arc<Texture>) -> bool {
        match self.material.as_mut() {
            Some(material) if !self.disposed => {
                material.texture = Some(texture);
                true
            }
            _ => false,
        }
    }

    /// Release geometry, material, outline, glow and the plane's texture
    /// reference. Returns false when already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;
        self.geometry = None;
        self.material = None;
        self.edge = None;
        self.glow = None;
        self.entrance = None;
        self.presentation = None;
        self.visible = false;
        true
    }

    pub fn set_presentation(&mut self, presentation: Option<Presentation>) {
        if !self.disposed {
            self.presentation = presentation;
        }
    }

    pub fn presentation(&self) -> Option<&Presentation> {
        self.presentation.as_ref()
    }

    pub fn world_matrix(&self) -> Mat4 {
        let (width, height) = self
            .geometry
            .map(|g| (g.width, g.height))
            .unwrap_or((0.0, 0.0));
        match self.presentation {
            Some(p) => Mat4::from_scale_rotation_translation(
                Vec3::new(width * p.scale, height * p.scale, 1.0),
                p.rotation,
                p.position,
            ),
            None => Mat4::from_scale_rotation_translation(
                Vec3::new(width * self.current_scale, height * self.current_scale, 1.0),
                self.orientation(),
                self.position,
            ),
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Distance along the ray to the plane, if the ray hits it.
    pub fn raycast(&self, ray: &Ray) -> Option<f32> {
        if self.disposed || !self.visible || self.current_scale <= 1e-4 {
            return None;
        }
        let world = self.world_matrix();
        let inverse = world.inverse();
        let origin = inverse.transform_point3(ray.origin);
        let direction = inverse.transform_vector3(ray.direction);
        if direction.z.abs() < 1e-6 {
            return None;
        }
        let t = -origin.z / direction.z;
        if t <= 0.0 {
            return None;
        }
        let hit = origin + direction * t;
        if hit.x.abs() > 0.5 || hit.y.abs() > 0.5 {
            return None;
        }
        Some(world.transform_point3(hit).distance(ray.origin))
    }

    /// Draw item for this frame, `None` when nothing should be drawn.
    pub fn draw_item(&self, scene_opacity: f32) -> Option<DrawItem> {
        if self.disposed || !self.visible {
            return None;
        }
        let material = self.material.as_ref()?;
        let opacity = match self.presentation {
            Some(p) => p.opacity,
            None => material.opacity * scene_opacity,
        };
        if opacity <= 0.0 {
            return None;
        }
        Some(DrawItem {
            entity: self.id,
            transform: self.world_matrix(),
            opacity,
            texture: material.texture.clone(),
            lod: self.lod,
            edge_opacity: self.edge.map(|e| e.opacity * scene_opacity).unwrap_or(0.0),
            glow_opacity: self.glow.map(|g| g.opacity * scene_opacity).unwrap_or(0.0),
        })
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn artwork_id(&self) -> &ArtworkId {
        &self.artwork_id
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn variant(&self) -> TextureVariant {
        self.variant
    }

    pub fn texture_priority(&self) -> u32 {
        self.texture_priority
    }

    pub fn texture(&self) -> Option<&Arc<Texture>> {
        self.material.as_ref()?.texture.as_ref()
    }

    pub fn geometry(&self) -> Option<&PlaneGeometry> {
        self.geometry.as_ref()
    }

    pub fn base_position(&self) -> Vec3 {
        self.base_position
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn scale(&self) -> f32 {
        self.current_scale
    }

    pub fn target_scale(&self) -> f32 {
        self.target_scale
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn glow_opacity(&self) -> f32 {
        self.glow.map(|g| g.opacity).unwrap_or(0.0)
    }

    pub fn lod(&self) -> LodLevel {
        self.lod
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_entering(&self) -> bool {
        self.entrance.is_some()
    }

    pub fn entrance_complete(&self) -> bool {
        self.entrance_complete
    }

    pub fn is_glitching(&self) -> bool {
        self.glitch.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Times the scheduler called [`Self::update`].
    pub fn update_count(&self) -> u64 {
        self.update_calls
    }

    pub fn local_time(&self) -> f32 {
        self.local_time_s
    }
}
