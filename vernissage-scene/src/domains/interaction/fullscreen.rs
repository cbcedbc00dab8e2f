//! Full-screen transition played before navigating to an artwork
//!
//! Two phases: the plane flips a full turn about its vertical axis, then
//! moves in front of the camera and scales until it covers the viewport
//! while the rest of the scene fades out. Completion is signalled through
//! a oneshot channel carrying the navigation request.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use tokio::sync::oneshot;

use crate::domains::interaction::navigation::NavigationRequest;
use crate::domains::scene::{Camera, EasingFunction, EntityId, Presentation, SceneComposer, Tween};
use crate::infra::config::AnimationConfig;

/// Distance in front of the camera at which the plane fills the view.
const FILL_DISTANCE: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Flip,
    Fill,
    Complete,
}

/// Awaitable completion of a [`FullscreenTransition`].
#[derive(Debug)]
pub struct TransitionHandle {
    entity: EntityId,
    receiver: oneshot::Receiver<NavigationRequest>,
}

impl TransitionHandle {
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Resolves when the animation finishes; `None` if it was cancelled.
    pub async fn finished(self) -> Option<NavigationRequest> {
        self.receiver.await.ok()
    }

    /// Non-blocking check for completion.
    pub fn try_finished(&mut self) -> Option<NavigationRequest> {
        self.receiver.try_recv().ok()
    }
}

#[derive(Debug)]
pub struct FullscreenTransition {
    entity: EntityId,
    request: NavigationRequest,
    flip: Tween<f32>,
    fill: Tween<f32>,
    from_position: Vec3,
    from_rotation: Quat,
    from_scale: f32,
    completion: Option<oneshot::Sender<NavigationRequest>>,
}

impl FullscreenTransition {
    /// Begin a transition for a plane. Returns `None` if the plane is gone.
    pub fn start(
        now_s: f64,
        entity: EntityId,
        request: NavigationRequest,
        composer: &SceneComposer,
        animation: &AnimationConfig,
    ) -> Option<(Self, TransitionHandle)> {
        let plane = composer.entity(entity)?;
        if plane.is_disposed() {
            return None;
        }
        let flip = Tween::new(
            0.0,
            TAU,
            now_s,
            animation.flip_duration(),
            EasingFunction::EaseInOutCubic,
        );
        let fill = Tween::new(
            0.0,
            1.0,
            flip.end_s(),
            animation.fill_duration(),
            EasingFunction::EaseOutQuart,
        );
        let (sender, receiver) = oneshot::channel();
        let transition = Self {
            entity,
            request,
            flip,
            fill,
            from_position: plane.position(),
            from_rotation: plane.orientation(),
            from_scale: plane.scale(),
            completion: Some(sender),
        };
        Some((transition, TransitionHandle { entity, receiver }))
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn request(&self) -> &NavigationRequest {
        &self.request
    }

    pub fn phase(&self, now_s: f64) -> TransitionPhase {
        if !self.flip.is_complete(now_s) {
            TransitionPhase::Flip
        } else if !self.fill.is_complete(now_s) {
            TransitionPhase::Fill
        } else {
            TransitionPhase::Complete
        }
    }

    /// Opacity of everything except the transitioning plane.
    pub fn scene_opacity(&self, now_s: f64) -> f32 {
        1.0 - self.fill.sample(now_s)
    }

    /// Pose the plane for `now_s`. On completion the oneshot fires and the
    /// navigation request is returned, exactly once.
    pub fn advance(
        &mut self,
        now_s: f64,
        camera: &Camera,
        composer: &mut SceneComposer,
    ) -> Option<NavigationRequest> {
        let Some(plane) = composer.entity_mut(self.entity) else {
            return self.finish();
        };

        let spin = Quat::from_rotation_y(self.flip.sample(now_s));
        let fill = self.fill.sample(now_s);

        let forward = camera.forward();
        let target_position = camera.position + forward * FILL_DISTANCE;
        let facing = Quat::from_rotation_arc(Vec3::Z, -forward);

        let (width, height) = plane
            .geometry()
            .map(|g| (g.width, g.height))
            .unwrap_or((1.0, 1.0));
        let view_height = camera.frustum_height_at(FILL_DISTANCE);
        let view_width = view_height * camera.aspect;
        let cover_scale = (view_height / height).max(view_width / width);

        let position = self.from_position.lerp(target_position, fill);
        let rotation = (self.from_rotation * spin).slerp(facing, fill);
        let scale = self.from_scale + (cover_scale - self.from_scale) * fill;
        plane.set_presentation(Some(Presentation {
            position,
            rotation,
            scale,
            opacity: 1.0,
        }));

        if self.phase(now_s) == TransitionPhase::Complete {
            return self.finish();
        }
        None
    }

    fn finish(&mut self) -> Option<NavigationRequest> {
        let sender = self.completion.take()?;
        let _ = sender.send(self.request.clone());
        Some(self.request.clone())
    }

    /// Abandon the transition and return the plane to its animated pose.
    pub fn cancel(mut self, composer: &mut SceneComposer) {
        self.completion = None;
        if let Some(plane) = composer.entity_mut(self.entity) {
            plane.set_presentation(None);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.completion.is_none()
    }
}
