//! Runtime performance classification and throttling knobs.

pub mod memory;
pub mod monitor;

pub use memory::{FixedHeapProbe, HeapProbe, NoHeapProbe, SystemHeapProbe};
pub use monitor::{PerformanceLevel, PerformanceMonitor, PerformanceSnapshot};
