//! Scene composition and the batched update scheduler
//!
//! The composer lays planes out, requests their textures, runs the entrance
//! timeline and, every frame, updates a rotating slice of the planes sized
//! by the performance monitor. Planes outside the current slice keep their
//! previous transform until their turn comes round.
//!
//! Resolved textures arrive on a channel from spawned tasks and are applied
//! at most `max_texture_applies_per_frame` per tick. Once the composer is
//! disposed the channel is closed and late textures are dropped.

use std::sync::Arc;

use glam::Vec3;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use vernissage_model::ArtworkSet;

use crate::domains::media::{Texture, TextureCache};
use crate::domains::performance::{PerformanceLevel, PerformanceMonitor};
use crate::domains::scene::backdrop::Backdrop;
use crate::domains::scene::camera::Camera;
use crate::domains::scene::entity::{EntityId, PlaneTuning, WorkPlane};
use crate::domains::scene::layout::LayoutKind;
use crate::domains::scene::render::DrawItem;
use crate::domains::scene::transitions::{EasingFunction, Tween};
use crate::infra::config::SceneConfig;
use crate::infra::device::{DevicePreset, Viewport};
use crate::infra::rng::SceneRng;

type TextureArrival = (EntityId, Arc<Texture>);

/// What one [`SceneComposer::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub textures_applied: usize,
    pub entities_updated: usize,
    pub entering: usize,
}

#[derive(Debug)]
pub struct SceneComposer {
    layout: LayoutKind,
    preset: DevicePreset,
    tuning: Arc<PlaneTuning>,
    textures: TextureCache,
    max_texture_applies: usize,

    entities: Vec<WorkPlane>,
    last_updated_s: Vec<Option<f64>>,
    backdrop: Backdrop,
    camera_dolly: Option<Tween<f32>>,
    focus: Vec3,

    texture_tx: Option<mpsc::UnboundedSender<TextureArrival>>,
    texture_rx: mpsc::UnboundedReceiver<TextureArrival>,
    texture_tasks: Vec<JoinHandle<()>>,
    textures_applied: u64,
    textures_dropped: u64,

    cursor: usize,
    skip_toggle: bool,
    sequence_started: bool,
    disposed: bool,
    rng: SceneRng,
}

impl SceneComposer {
    pub fn new(
        layout: LayoutKind,
        preset: DevicePreset,
        config: &SceneConfig,
        textures: TextureCache,
        mut rng: SceneRng,
    ) -> Self {
        let (texture_tx, texture_rx) = mpsc::unbounded_channel();
        let tuning = Arc::new(PlaneTuning {
            animation: config.animation.clone(),
            lod: config.lod.clone(),
            photo_display_ratio: config.media.photo_display_ratio,
            plane_segments: preset.plane_segments,
        });
        let backdrop = Backdrop::new(preset.backdrop_particles, &mut rng);
        Self {
            layout,
            focus: layout.focus_point(&preset),
            preset,
            tuning,
            textures,
            max_texture_applies: config.media.max_texture_applies_per_frame.max(1),
            entities: Vec::new(),
            last_updated_s: Vec::new(),
            backdrop,
            camera_dolly: None,
            texture_tx: Some(texture_tx),
            texture_rx,
            texture_tasks: Vec::new(),
            textures_applied: 0,
            textures_dropped: 0,
            cursor: 0,
            skip_toggle: false,
            sequence_started: false,
            disposed: false,
            rng,
        }
    }

    /// Instantiate planes for the dataset and start resolving their
    /// textures. Slots are filled in dataset order, cycling through the
    /// artworks when the layout holds more planes than there are artworks.
    pub fn generate(&mut self, dataset: &ArtworkSet) -> usize {
        if self.disposed {
            return 0;
        }
        self.discard_pending_textures();
        for entity in &mut self.entities {
            entity.dispose();
        }
        self.entities.clear();
        self.cursor = 0;

        let artworks = dataset.as_slice();
        let count = self.layout.capacity(&self.preset, artworks.len());
        if count == 0 {
            log::info!("No artworks to compose; rendering backdrop only");
            self.last_updated_s.clear();
            return 0;
        }

        let slots = self.layout.slots(&self.preset, count, &mut self.rng);
        let runtime = tokio::runtime::Handle::try_current().ok();
        if runtime.is_none() {
            log::warn!("No async runtime available; planes will stay untextured");
        }

        for (index, slot) in slots.iter().enumerate() {
            let artwork = &artworks[index % artworks.len()];
            let id = EntityId(index);
            let plane =
                WorkPlane::new(id, artwork, slot, Arc::clone(&self.tuning), self.rng.fork());

            if let (Some(runtime), Some(tx)) = (&runtime, &self.texture_tx) {
                let pending = self
                    .textures
                    .resolve_texture(artwork, plane.variant(), plane.texture_priority());
                let tx = tx.clone();
                self.texture_tasks.push(runtime.spawn(async move {
                    let texture = pending.await;
                    // Receiver gone means the scene was torn down
                    let _ = tx.send((id, texture));
                }));
            }
            self.entities.push(plane);
        }
        self.last_updated_s = vec![None; self.entities.len()];

        log::info!(
            "Composed {:?} layout: {} planes from {} artworks",
            self.layout,
            self.entities.len(),
            artworks.len()
        );
        self.entities.len()
    }

    /// Camera positioned at the start of the dolly, looking at the layout.
    pub fn initial_camera(&self, viewport: &Viewport) -> Camera {
        let start = self.focus + Vec3::new(0.0, 0.0, self.tuning.animation.camera_start_z);
        Camera::new(start, self.focus, viewport)
    }

    /// Start the entrance timeline: backdrop now, planes staggered after the
    /// start delay, then the camera dolly.
    pub fn start_sequence(&mut self, now_s: f64) {
        if self.disposed || self.sequence_started {
            return;
        }
        self.sequence_started = true;
        let anim = &self.tuning.animation;
        self.backdrop
            .animate_entrance(now_s, std::time::Duration::from_millis(anim.backdrop_fade_ms));

        let start_delay = anim.entrance_start_delay_ms as f64 / 1000.0;
        let stagger = anim.entrance_stagger_ms as f64 / 1000.0;
        for (index, entity) in self.entities.iter_mut().enumerate() {
            entity.animate_entrance(now_s, start_delay + stagger * index as f64);
        }

        self.camera_dolly = Some(Tween::new(
            anim.camera_start_z,
            anim.camera_target_z,
            now_s + anim.camera_dolly_delay_ms as f64 / 1000.0,
            std::time::Duration::from_millis(anim.camera_dolly_ms),
            EasingFunction::EaseOutCubic,
        ));
    }

    /// One frame of scene work.
    pub fn tick(
        &mut self,
        now_s: f64,
        delta_s: f32,
        camera: &mut Camera,
        monitor: &PerformanceMonitor,
    ) -> TickReport {
        if self.disposed {
            return TickReport::default();
        }
        let textures_applied = self.apply_resolved_textures();

        let mut entering = 0;
        for entity in &mut self.entities {
            if entity.is_entering() {
                entity.advance_entrance(now_s);
                entering += 1;
            }
        }

        if let Some(dolly) = self.camera_dolly {
            if dolly.has_started(now_s) {
                camera.position.z = self.focus.z + dolly.sample(now_s);
            }
            if dolly.is_complete(now_s) {
                self.camera_dolly = None;
            }
        }

        self.backdrop.update(delta_s);

        let entities_updated = self.run_scheduled_batch(
            now_s,
            monitor.get_update_multiplier(),
            camera.position,
            monitor.get_batch_size(),
            monitor.level(),
        );

        TickReport {
            textures_applied,
            entities_updated,
            entering,
        }
    }

    /// Abandon texture work for the current planes. Tasks are aborted and
    /// the channel is replaced, so nothing resolved for an earlier layout
    /// can reach a plane that now sits at the same index.
    fn discard_pending_textures(&mut self) {
        for task in self.texture_tasks.drain(..) {
            task.abort();
        }
        let (texture_tx, texture_rx) = mpsc::unbounded_channel();
        let mut stale = std::mem::replace(&mut self.texture_rx, texture_rx);
        self.texture_tx = Some(texture_tx);
        stale.close();
        while stale.try_recv().is_ok() {
            self.textures_dropped += 1;
        }
    }

    fn apply_resolved_textures(&mut self) -> usize {
        let mut applied = 0;
        while applied < self.max_texture_applies {
            let Ok((id, texture)) = self.texture_rx.try_recv() else {
                break;
            };
            let accepted = match self.entities.get_mut(id.0) {
                Some(entity) => entity.apply_texture(texture),
                None => false,
            };
            if accepted {
                applied += 1;
                self.textures_applied += 1;
            } else {
                self.textures_dropped += 1;
            }
        }
        applied
    }

    /// Update the next slice of planes. Returns how many were updated.
    ///
    /// The slice is `[cursor, min(cursor + batch_size, len))`; the cursor
    /// wraps to zero after the last plane. At `low` performance every other
    /// invocation is skipped entirely.
    pub fn run_scheduled_batch(
        &mut self,
        time_s: f64,
        multiplier: f32,
        camera_position: Vec3,
        batch_size: usize,
        level: PerformanceLevel,
    ) -> usize {
        if self.disposed || self.entities.is_empty() {
            return 0;
        }
        if level == PerformanceLevel::Low {
            self.skip_toggle = !self.skip_toggle;
            if self.skip_toggle {
                return 0;
            }
        } else {
            self.skip_toggle = false;
        }

        let len = self.entities.len();
        let start = self.cursor.min(len);
        let end = (start + batch_size.max(1)).min(len);
        for index in start..end {
            let elapsed = match self.last_updated_s[index] {
                Some(last) => (time_s - last).max(0.0) as f32,
                None => 0.0,
            };
            self.last_updated_s[index] = Some(time_s);
            self.entities[index].update(elapsed * multiplier, time_s as f32, camera_position);
        }
        self.cursor = if end >= len { 0 } else { end };
        end - start
    }

    pub fn draw_list(&self, scene_opacity: f32) -> Vec<DrawItem> {
        self.entities
            .iter()
            .filter_map(|entity| entity.draw_item(scene_opacity))
            .collect()
    }

    pub fn entities(&self) -> &[WorkPlane] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&WorkPlane> {
        self.entities.get(id.0)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut WorkPlane> {
        self.entities.get_mut(id.0)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }

    pub fn focus_point(&self) -> Vec3 {
        self.focus
    }

    pub fn layout(&self) -> LayoutKind {
        self.layout
    }

    pub fn preset(&self) -> &DevicePreset {
        &self.preset
    }

    pub fn is_dolly_running(&self) -> bool {
        self.camera_dolly.is_some()
    }

    pub fn textures_applied(&self) -> u64 {
        self.textures_applied
    }

    pub fn textures_dropped(&self) -> u64 {
        self.textures_dropped
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Tear the scene down. Texture tasks are abandoned, pending arrivals
    /// are dropped and every plane releases its resources. Safe to call more
    /// than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for task in self.texture_tasks.drain(..) {
            task.abort();
        }
        self.texture_tx = None;
        self.texture_rx.close();
        while self.texture_rx.try_recv().is_ok() {
            self.textures_dropped += 1;
        }
        let released = self
            .entities
            .iter_mut()
            .map(|entity| entity.dispose())
            .filter(|released| *released)
            .count();
        self.entities.clear();
        self.last_updated_s.clear();
        self.backdrop.dispose();
        self.camera_dolly = None;
        log::debug!("Scene composer disposed ({released} planes released)");
    }
}

impl Drop for SceneComposer {
    fn drop(&mut self) {
        self.dispose();
    }
}
