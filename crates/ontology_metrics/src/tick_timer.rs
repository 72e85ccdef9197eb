//! Whole-tick timing

use super::ring_buffer::RingBuffer;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct TickTimer {
    tick_start: Option<Instant>,
    tick_times: RingBuffer<Duration>,
    ticks: u64,
}

impl TickTimer {
    pub fn new(capacity: usize) -> Self {
        Self {
            tick_start: None,
            tick_times: RingBuffer::new(capacity),
            ticks: 0,
        }
    }

    pub fn begin(&mut self) {
        self.tick_start = Some(Instant::now());
    }

    /// Closes the tick opened by `begin`. Unpaired calls are ignored.
    pub fn end(&mut self) {
        if let Some(start) = self.tick_start.take() {
            self.tick_times.push(start.elapsed());
            self.ticks += 1;
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick_time_ms(&self) -> f64 {
        self.tick_times.average().as_secs_f64() * 1000.0
    }

    pub fn tick_time_range_ms(&self) -> (f64, f64) {
        let (min, max) = self.tick_times.min_max();
        (min.as_secs_f64() * 1000.0, max.as_secs_f64() * 1000.0)
    }
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_only_closed_ticks() {
        let mut timer = TickTimer::new(4);
        timer.end();
        assert_eq!(timer.ticks(), 0);

        timer.begin();
        timer.end();
        timer.begin();
        timer.end();
        assert_eq!(timer.ticks(), 2);
        assert!(timer.tick_time_ms() >= 0.0);
    }
}
