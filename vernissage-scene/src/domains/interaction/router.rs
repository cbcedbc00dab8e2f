//! Pointer and touch routing: throttled picking, hover hand-off and clicks.

use std::sync::Arc;

use glam::Vec2;
use vernissage_model::ArtworkSet;

use crate::domains::interaction::fullscreen::{FullscreenTransition, TransitionHandle};
use crate::domains::interaction::navigation::{NavigationRequest, Navigator};
use crate::domains::performance::PerformanceLevel;
use crate::domains::scene::{Camera, EntityId, SceneComposer, screen_to_ndc};
use crate::infra::config::{AnimationConfig, InteractionConfig};
use crate::infra::device::Viewport;

#[derive(Debug)]
pub struct InteractionRouter {
    config: InteractionConfig,
    animation: AnimationConfig,
    navigator: Arc<dyn Navigator>,
    pointer_ndc: Option<Vec2>,
    last_raycast_ms: Option<f64>,
    hovered: Option<EntityId>,
    transition: Option<FullscreenTransition>,
    // Plane left covering the view after a completed transition
    settled: Option<EntityId>,
    navigations: u64,
}

impl InteractionRouter {
    pub fn new(
        config: InteractionConfig,
        animation: AnimationConfig,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            config,
            animation,
            navigator,
            pointer_ndc: None,
            last_raycast_ms: None,
            hovered: None,
            transition: None,
            settled: None,
            navigations: 0,
        }
    }

    /// Record the pointer position in pixels (origin top-left).
    pub fn pointer_move(&mut self, x: f32, y: f32, viewport: &Viewport) {
        self.pointer_ndc = Some(screen_to_ndc(x, y, viewport));
    }

    pub fn pointer_leave(&mut self, composer: &mut SceneComposer) {
        self.pointer_ndc = None;
        self.set_hovered(None, composer);
    }

    /// Per-frame hover tracking. Picking runs at most once per raycast
    /// interval, and less often at `low` performance.
    pub fn update(
        &mut self,
        now_ms: f64,
        level: PerformanceLevel,
        camera: &Camera,
        composer: &mut SceneComposer,
    ) -> Option<EntityId> {
        if self.transition.is_some() || self.settled.is_some() {
            return self.hovered;
        }
        let interval = match level {
            PerformanceLevel::Low => self.config.raycast_interval_low_ms,
            PerformanceLevel::Medium | PerformanceLevel::High => self.config.raycast_interval_ms,
        };
        if let Some(last) = self.last_raycast_ms
            && now_ms - last < interval
        {
            return self.hovered;
        }
        self.last_raycast_ms = Some(now_ms);

        let hit = self.pick(camera, composer);
        self.set_hovered(hit, composer);
        self.hovered
    }

    fn pick(&self, camera: &Camera, composer: &SceneComposer) -> Option<EntityId> {
        let ndc = self.pointer_ndc?;
        let ray = camera.ray_from_ndc(ndc);
        composer
            .entities()
            .iter()
            .filter_map(|plane| plane.raycast(&ray).map(|distance| (plane.id(), distance)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    fn set_hovered(&mut self, target: Option<EntityId>, composer: &mut SceneComposer) {
        if target == self.hovered {
            return;
        }
        if let Some(previous) = self.hovered
            && let Some(plane) = composer.entity_mut(previous)
        {
            plane.set_hover(false);
        }
        if let Some(next) = target
            && let Some(plane) = composer.entity_mut(next)
        {
            plane.set_hover(true);
        }
        self.hovered = target;
    }

    pub fn hovered(&self) -> Option<EntityId> {
        self.hovered
    }

    /// Click on the hovered plane. Starts the full-screen transition when
    /// no transition is running and the plane's artwork is still in the
    /// dataset; otherwise nothing happens.
    pub fn click(
        &mut self,
        now_s: f64,
        composer: &SceneComposer,
        dataset: &ArtworkSet,
    ) -> Option<TransitionHandle> {
        if self.transition.is_some() || self.settled.is_some() {
            log::debug!("Ignoring click during full-screen transition");
            return None;
        }
        let target = self.hovered?;
        let plane = composer.entity(target)?;
        let Some(artwork) = plane.click_target(dataset) else {
            log::debug!("Artwork {} no longer available; click ignored", plane.artwork_id());
            return None;
        };
        let request = NavigationRequest::for_artwork(artwork);
        let (transition, handle) =
            FullscreenTransition::start(now_s, target, request, composer, &self.animation)?;
        log::debug!("Opening {} from {target}", transition.request().route);
        self.transition = Some(transition);
        Some(handle)
    }

    /// Touch input: pick immediately at the tap position, then click.
    pub fn tap(
        &mut self,
        position: Vec2,
        now_s: f64,
        viewport: &Viewport,
        camera: &Camera,
        composer: &mut SceneComposer,
        dataset: &ArtworkSet,
    ) -> Option<TransitionHandle> {
        if self.transition.is_some() || self.settled.is_some() {
            return None;
        }
        self.pointer_move(position.x, position.y, viewport);
        let hit = self.pick(camera, composer);
        self.set_hovered(hit, composer);
        self.click(now_s, composer, dataset)
    }

    /// Advance a running transition. Returns the opacity for the rest of
    /// the scene (1 when no transition runs). When the transition finishes
    /// the navigation request goes to the navigator.
    pub fn advance_transition(
        &mut self,
        now_s: f64,
        camera: &Camera,
        composer: &mut SceneComposer,
    ) -> f32 {
        let Some(transition) = self.transition.as_mut() else {
            return if self.settled.is_some() { 0.0 } else { 1.0 };
        };
        let opacity = transition.scene_opacity(now_s);
        if let Some(request) = transition.advance(now_s, camera, composer) {
            self.navigations += 1;
            self.settled = Some(transition.entity());
            self.transition = None;
            self.navigator.navigate(request);
            return 0.0;
        }
        opacity
    }

    /// Abandon a running transition, or undo a completed one (for example
    /// when the user navigates back), restoring the plane.
    pub fn reset_transition(&mut self, composer: &mut SceneComposer) {
        if let Some(transition) = self.transition.take() {
            transition.cancel(composer);
        }
        if let Some(entity) = self.settled.take()
            && let Some(plane) = composer.entity_mut(entity)
        {
            plane.set_presentation(None);
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// True after a transition completed and before it was reset.
    pub fn is_settled(&self) -> bool {
        self.settled.is_some()
    }

    pub fn navigations(&self) -> u64 {
        self.navigations
    }
}
