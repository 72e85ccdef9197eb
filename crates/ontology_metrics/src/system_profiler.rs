//! Per-system timing for scheduler runs

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Accumulated timing of one system.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SystemTiming {
    /// Duration of the most recent run.
    pub last: Duration,
    /// Sum of all recorded runs.
    pub total: Duration,
    pub runs: u64,
    /// Entities processed across all runs.
    pub entities: u64,
}

#[derive(Debug, Default)]
pub struct SystemProfiler {
    timings: HashMap<&'static str, SystemTiming>,
}

impl SystemProfiler {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
        }
    }

    /// Time `f` as one run of `name` over `entities` entities.
    pub fn record<F, R>(&mut self, name: &'static str, entities: usize, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        let timing = self.timings.entry(name).or_default();
        timing.last = elapsed;
        timing.total += elapsed;
        timing.runs += 1;
        timing.entities += entities as u64;
        result
    }

    pub fn timing(&self, name: &str) -> Option<SystemTiming> {
        self.timings.get(name).copied()
    }

    /// Drop the record of a system that has been unregistered.
    pub fn forget(&mut self, name: &str) {
        self.timings.remove(name);
    }

    pub fn reset(&mut self) {
        self.timings.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &SystemTiming)> {
        self.timings.iter().map(|(name, timing)| (*name, timing))
    }
}
