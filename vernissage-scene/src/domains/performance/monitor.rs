//! Rolling frame-time sampler.
//!
//! The monitor is fed one timestamp per animation frame and reclassifies
//! the runtime into a [`PerformanceLevel`] every check interval. Drops are
//! applied immediately, possibly skipping a tier; recovery climbs one tier
//! per check and only once the short-window frame rate clears the next
//! threshold by a margin, so a brief burst of fast frames cannot undo a
//! sustained slowdown.

use std::collections::VecDeque;

use crate::domains::performance::memory::{HeapProbe, NoHeapProbe};
use crate::infra::config::{PerformanceConfig, TierKnobs};
use crate::infra::rng::SceneRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PerformanceLevel {
    Low,
    Medium,
    High,
}

impl PerformanceLevel {
    fn up(self) -> Self {
        match self {
            PerformanceLevel::Low => PerformanceLevel::Medium,
            PerformanceLevel::Medium | PerformanceLevel::High => PerformanceLevel::High,
        }
    }
}

impl std::fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PerformanceLevel::Low => "low",
            PerformanceLevel::Medium => "medium",
            PerformanceLevel::High => "high",
        };
        f.write_str(name)
    }
}

/// Diagnostic view of the monitor state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceSnapshot {
    pub level: PerformanceLevel,
    pub avg_fps: f32,
    pub recent_fps: f32,
    pub consecutive_stalls: u32,
    pub memory_ratio: Option<f64>,
    pub checks: u64,
}

#[derive(Debug)]
pub struct PerformanceMonitor {
    config: PerformanceConfig,
    samples: VecDeque<f64>,
    last_frame_ms: Option<f64>,
    last_check_ms: Option<f64>,
    consecutive_stalls: u32,
    level: PerformanceLevel,
    avg_fps: f32,
    recent_fps: f32,
    memory_ratio: Option<f64>,
    checks: u64,
    rng: SceneRng,
    probe: Box<dyn HeapProbe>,
}

impl PerformanceMonitor {
    pub fn new(config: PerformanceConfig, rng: SceneRng) -> Self {
        Self::with_probe(config, rng, Box::new(NoHeapProbe))
    }

    pub fn with_probe(
        config: PerformanceConfig,
        rng: SceneRng,
        probe: Box<dyn HeapProbe>,
    ) -> Self {
        let target = config.target_fps;
        Self {
            samples: VecDeque::with_capacity(config.sample_window),
            config,
            last_frame_ms: None,
            last_check_ms: None,
            consecutive_stalls: 0,
            level: PerformanceLevel::High,
            avg_fps: target,
            recent_fps: target,
            memory_ratio: None,
            checks: 0,
            rng,
            probe,
        }
    }

    /// Record a frame at `now_ms` (monotonic milliseconds).
    pub fn update(&mut self, now_ms: f64) {
        if let Some(previous) = self.last_frame_ms {
            let delta = now_ms - previous;
            if delta > 0.0 {
                if self.samples.len() == self.config.sample_window {
                    self.samples.pop_front();
                }
                self.samples.push_back(delta);

                if delta > self.config.stall_threshold_ms {
                    self.consecutive_stalls += 1;
                } else {
                    self.consecutive_stalls = self.consecutive_stalls.saturating_sub(1);
                }
            }
        }
        self.last_frame_ms = Some(now_ms);

        let last_check = *self.last_check_ms.get_or_insert(now_ms);
        if now_ms - last_check >= self.config.check_interval_ms {
            self.last_check_ms = Some(now_ms);
            self.check();
        }
    }

    fn check(&mut self) {
        if self.samples.is_empty() {
            return;
        }
        self.checks += 1;
        self.avg_fps = fps_of(self.samples.iter());
        let recent = self.config.recent_window.min(self.samples.len());
        self.recent_fps = fps_of(self.samples.iter().skip(self.samples.len() - recent));

        let target = self.config.target_fps;
        let observed = self.classify();
        let previous = self.level;

        if observed < self.level {
            self.level = observed;
        } else if observed > self.level {
            let next = self.level.up();
            let threshold = match next {
                PerformanceLevel::Medium => target * self.config.low_fps_ratio,
                _ => target * self.config.medium_fps_ratio,
            };
            if self.recent_fps >= threshold + self.config.recovery_margin * target {
                self.level = next;
            }
        }

        self.memory_ratio = self.probe.usage_ratio();
        if let Some(ratio) = self.memory_ratio
            && ratio > self.config.memory_pressure_ratio
            && self.level > PerformanceLevel::Medium
        {
            log::debug!("Memory usage at {:.0}%, capping quality", ratio * 100.0);
            self.level = PerformanceLevel::Medium;
        }

        if self.level != previous {
            log::info!(
                "Performance level {previous} -> {} (recent {:.1} fps, avg {:.1} fps, stalls {})",
                self.level,
                self.recent_fps,
                self.avg_fps,
                self.consecutive_stalls
            );
        }
    }

    fn classify(&self) -> PerformanceLevel {
        let target = self.config.target_fps;
        if self.recent_fps < target * self.config.low_fps_ratio
            || self.consecutive_stalls > self.config.max_consecutive_stalls
        {
            PerformanceLevel::Low
        } else if self.recent_fps < target * self.config.medium_fps_ratio {
            PerformanceLevel::Medium
        } else {
            PerformanceLevel::High
        }
    }

    fn knobs(&self) -> &TierKnobs {
        match self.level {
            PerformanceLevel::High => &self.config.high,
            PerformanceLevel::Medium => &self.config.medium,
            PerformanceLevel::Low => &self.config.low,
        }
    }

    /// Whether the caller should drop this frame's work entirely.
    pub fn should_skip_frame(&mut self) -> bool {
        let probability = self.knobs().skip_probability;
        self.rng.chance(probability)
    }

    pub fn get_update_multiplier(&self) -> f32 {
        self.knobs().update_multiplier
    }

    pub fn get_batch_size(&self) -> usize {
        self.knobs().batch_size
    }

    pub fn level(&self) -> PerformanceLevel {
        self.level
    }

    pub fn config(&self) -> &PerformanceConfig {
        &self.config
    }

    pub fn snapshot(&self) -> PerformanceSnapshot {
        PerformanceSnapshot {
            level: self.level,
            avg_fps: self.avg_fps,
            recent_fps: self.recent_fps,
            consecutive_stalls: self.consecutive_stalls,
            memory_ratio: self.memory_ratio,
            checks: self.checks,
        }
    }
}

fn fps_of<'a>(deltas: impl Iterator<Item = &'a f64>) -> f32 {
    let (sum, count) = deltas.fold((0.0, 0usize), |(sum, count), d| (sum + d, count + 1));
    if count == 0 || sum <= 0.0 {
        return 0.0;
    }
    (1000.0 * count as f64 / sum) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::performance::memory::FixedHeapProbe;

    fn monitor() -> PerformanceMonitor {
        PerformanceMonitor::new(PerformanceConfig::default(), SceneRng::seeded(1))
    }

    /// Feed frames `delta_ms` apart for `duration_ms`, starting after `start`.
    fn feed(monitor: &mut PerformanceMonitor, start: f64, delta_ms: f64, duration_ms: f64) -> f64 {
        let mut now = start;
        while now < start + duration_ms {
            now += delta_ms;
            monitor.update(now);
        }
        now
    }

    #[test]
    fn fast_frames_stay_high() {
        let mut monitor = monitor();
        monitor.update(0.0);
        feed(&mut monitor, 0.0, 1000.0 / 60.0, 2000.0);
        assert_eq!(monitor.level(), PerformanceLevel::High);
        assert_eq!(monitor.get_batch_size(), 20);
        assert!(!monitor.should_skip_frame());
    }

    #[test]
    fn slow_frames_drop_straight_to_low() {
        let mut monitor = monitor();
        monitor.update(0.0);
        feed(&mut monitor, 0.0, 100.0, 600.0);
        assert_eq!(monitor.level(), PerformanceLevel::Low);
        assert!(monitor.get_batch_size() < 20);
        assert!(monitor.get_update_multiplier() < 1.0);
    }

    #[test]
    fn moderate_slowdown_is_medium() {
        let mut monitor = monitor();
        monitor.update(0.0);
        // 42 fps: below 80% of target, above 60%
        feed(&mut monitor, 0.0, 1000.0 / 42.0, 1500.0);
        assert_eq!(monitor.level(), PerformanceLevel::Medium);
        assert_eq!(monitor.get_batch_size(), 12);
    }

    #[test]
    fn recovery_climbs_one_tier_per_check() {
        let mut monitor = monitor();
        monitor.update(0.0);
        let now = feed(&mut monitor, 0.0, 100.0, 1000.0);
        assert_eq!(monitor.level(), PerformanceLevel::Low);

        let checks = monitor.snapshot().checks;
        let mut now = now;
        while monitor.snapshot().checks == checks {
            now += 1000.0 / 60.0;
            monitor.update(now);
        }
        assert_eq!(monitor.level(), PerformanceLevel::Medium);

        feed(&mut monitor, now, 1000.0 / 60.0, 600.0);
        assert_eq!(monitor.level(), PerformanceLevel::High);
    }

    #[test]
    fn borderline_recovery_is_not_enough() {
        let mut monitor = monitor();
        monitor.update(0.0);
        let now = feed(&mut monitor, 0.0, 1000.0 / 42.0, 1500.0);
        assert_eq!(monitor.level(), PerformanceLevel::Medium);
        // 49 fps clears the 48 fps threshold but not the recovery margin
        feed(&mut monitor, now, 1000.0 / 49.0, 3000.0);
        assert_eq!(monitor.level(), PerformanceLevel::Medium);
    }

    #[test]
    fn memory_pressure_caps_at_medium() {
        let mut monitor = PerformanceMonitor::with_probe(
            PerformanceConfig::default(),
            SceneRng::seeded(1),
            Box::new(FixedHeapProbe(0.95)),
        );
        monitor.update(0.0);
        feed(&mut monitor, 0.0, 1000.0 / 60.0, 1000.0);
        assert_eq!(monitor.level(), PerformanceLevel::Medium);
        assert_eq!(monitor.snapshot().memory_ratio, Some(0.95));
    }

    #[test]
    fn low_level_skips_some_frames() {
        let mut monitor = monitor();
        monitor.update(0.0);
        feed(&mut monitor, 0.0, 100.0, 1000.0);
        let skipped = (0..200).filter(|_| monitor.should_skip_frame()).count();
        assert!(skipped > 20 && skipped < 120, "skipped {skipped}");
    }
}
