//! Decorative particle field behind the planes.

use glam::Vec3;

use crate::domains::scene::transitions::{EasingFunction, Tween};
use crate::infra::rng::SceneRng;

const INNER_RADIUS: f32 = 60.0;
const OUTER_RADIUS: f32 = 160.0;
const SPIN_RATE: f32 = 0.01;

#[derive(Debug)]
pub struct Backdrop {
    particles: Vec<Vec3>,
    fade: Option<Tween<f32>>,
    rotation: f32,
}

impl Backdrop {
    pub fn new(count: usize, rng: &mut SceneRng) -> Self {
        let particles = (0..count)
            .map(|_| {
                let direction = Vec3::new(rng.signed(1.0), rng.signed(1.0), rng.signed(1.0))
                    .normalize_or(Vec3::Y);
                let radius = INNER_RADIUS + rng.unit() * (OUTER_RADIUS - INNER_RADIUS);
                direction * radius
            })
            .collect();
        Self {
            particles,
            fade: None,
            rotation: 0.0,
        }
    }

    pub fn animate_entrance(&mut self, now_s: f64, duration: std::time::Duration) {
        self.fade = Some(Tween::new(0.0, 1.0, now_s, duration, EasingFunction::EaseOutQuart));
    }

    pub fn opacity(&self, now_s: f64) -> f32 {
        self.fade.map(|fade| fade.sample(now_s)).unwrap_or(0.0)
    }

    pub fn update(&mut self, delta_s: f32) {
        self.rotation = (self.rotation + SPIN_RATE * delta_s) % std::f32::consts::TAU;
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn particles(&self) -> &[Vec3] {
        &self.particles
    }

    pub fn dispose(&mut self) {
        self.particles = Vec::new();
        self.fade = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fades_in_after_entrance_starts() {
        let mut backdrop = Backdrop::new(50, &mut SceneRng::seeded(2));
        assert_eq!(backdrop.particles().len(), 50);
        assert_eq!(backdrop.opacity(1.0), 0.0);
        backdrop.animate_entrance(1.0, Duration::from_millis(1500));
        assert!(backdrop.opacity(1.5) > 0.0);
        assert_eq!(backdrop.opacity(3.0), 1.0);
        assert!(backdrop.particles().iter().all(|p| p.length() >= INNER_RADIUS - 1e-3));
    }
}
