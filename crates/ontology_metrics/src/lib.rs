//! Ontology Metrics - timing utilities for the system scheduler
//!
//! Provides tick and per-system timing that completely vanishes in
//! production builds via feature flags.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use ontology_metrics::{SystemProfiler, TickTimer};
//!
//! let mut ticks = TickTimer::new(60); // Track last 60 ticks
//! let mut profiler = SystemProfiler::new();
//! ticks.begin();
//! profiler.record("Movement", 128, || run_movement());
//! ticks.end();
//! println!("avg tick: {:.3} ms", ticks.tick_time_ms());
//! ```
//!
//! Without the `metrics` feature every type below is a zero-sized stub with
//! the same API, so callers never need their own `cfg` guards.

#[cfg(feature = "metrics")]
mod ring_buffer;
#[cfg(feature = "metrics")]
mod system_profiler;
#[cfg(feature = "metrics")]
mod tick_timer;

#[cfg(feature = "metrics")]
pub use ring_buffer::RingBuffer;
#[cfg(feature = "metrics")]
pub use system_profiler::{SystemProfiler, SystemTiming};
#[cfg(feature = "metrics")]
pub use tick_timer::TickTimer;

/// Whether this build collects metrics.
pub const ENABLED: bool = cfg!(feature = "metrics");

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct TickTimer;

#[cfg(not(feature = "metrics"))]
impl TickTimer {
    pub fn new(_capacity: usize) -> Self { Self }
    pub fn begin(&mut self) {}
    pub fn end(&mut self) {}
    pub fn ticks(&self) -> u64 { 0 }
    pub fn tick_time_ms(&self) -> f64 { 0.0 }
    pub fn tick_time_range_ms(&self) -> (f64, f64) { (0.0, 0.0) }
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct RingBuffer<T>(std::marker::PhantomData<T>);

#[cfg(not(feature = "metrics"))]
impl<T> RingBuffer<T> {
    pub fn new(_capacity: usize) -> Self { Self(std::marker::PhantomData) }
    pub fn push(&mut self, _value: T) {}
    pub fn len(&self) -> usize { 0 }
    pub fn is_empty(&self) -> bool { true }
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SystemTiming {
    pub last: std::time::Duration,
    pub total: std::time::Duration,
    pub runs: u64,
    pub entities: u64,
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct SystemProfiler;

#[cfg(not(feature = "metrics"))]
impl SystemProfiler {
    pub fn new() -> Self { Self }
    pub fn record<F, R>(&mut self, _name: &'static str, _entities: usize, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        f()
    }
    pub fn timing(&self, _name: &str) -> Option<SystemTiming> { None }
    pub fn forget(&mut self, _name: &str) {}
    pub fn reset(&mut self) {}
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &SystemTiming)> {
        std::iter::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiler_returns_closure_result() {
        let mut profiler = SystemProfiler::new();
        let value = profiler.record("Sum", 3, || 1 + 2);
        assert_eq!(value, 3);
    }

    #[test]
    fn enabled_flag_matches_feature() {
        assert_eq!(ENABLED, cfg!(feature = "metrics"));
    }
}
