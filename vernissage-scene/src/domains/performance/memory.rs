//! Memory pressure probes.

use sysinfo::System;

/// Source of a heap/memory usage ratio in `[0, 1]`.
pub trait HeapProbe: Send + std::fmt::Debug {
    /// Current usage ratio, or `None` when the runtime does not expose one.
    fn usage_ratio(&mut self) -> Option<f64>;
}

/// Probe for runtimes without a memory signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHeapProbe;

impl HeapProbe for NoHeapProbe {
    fn usage_ratio(&mut self) -> Option<f64> {
        None
    }
}

/// Reads system memory usage through `sysinfo`.
pub struct SystemHeapProbe {
    system: System,
}

impl std::fmt::Debug for SystemHeapProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemHeapProbe").finish_non_exhaustive()
    }
}

impl SystemHeapProbe {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SystemHeapProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HeapProbe for SystemHeapProbe {
    fn usage_ratio(&mut self) -> Option<f64> {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        if total == 0 {
            return None;
        }
        Some(self.system.used_memory() as f64 / total as f64)
    }
}

/// Fixed ratio, for tests and embedders that measure memory themselves.
#[derive(Debug, Clone, Copy)]
pub struct FixedHeapProbe(pub f64);

impl HeapProbe for FixedHeapProbe {
    fn usage_ratio(&mut self) -> Option<f64> {
        Some(self.0)
    }
}
