use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

static METRICS_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_metrics_lock_poison_once(operation: &'static str) {
    if METRICS_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "metrics lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub avg_frame_ms: f32,
    pub max_frame_ms: f32,
}

/// Cheap-to-clone handle a host UI (or another thread) can poll for the
/// latest loop metrics without touching the loop itself.
#[derive(Clone, Debug, Default)]
pub struct MetricsHandle {
    snapshot: Arc<RwLock<LoopMetricsSnapshot>>,
}

impl MetricsHandle {
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        match self.snapshot.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_metrics_lock_poison_once("read");
                *poisoned.into_inner()
            }
        }
    }

    pub fn publish(&self, snapshot: LoopMetricsSnapshot) {
        match self.snapshot.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => {
                warn_metrics_lock_poison_once("write");
                *poisoned.into_inner() = snapshot;
            }
        }
    }
}

/// Per-interval frame/tick counters. The loop records every frame and
/// tick; once the interval elapses, [`MetricsAccumulator::maybe_snapshot`]
/// yields averaged numbers and restarts the window.
#[derive(Debug)]
pub struct MetricsAccumulator {
    interval: Duration,
    interval_start: Instant,
    frames: u32,
    ticks: u32,
    frame_time_sum: Duration,
    frame_time_max: Duration,
}

impl MetricsAccumulator {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            interval_start: Instant::now(),
            frames: 0,
            ticks: 0,
            frame_time_sum: Duration::ZERO,
            frame_time_max: Duration::ZERO,
        }
    }

    pub fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
        self.frame_time_max = self.frame_time_max.max(frame_dt);
    }

    pub fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let avg_frame_ms = if self.frames == 0 {
            0.0
        } else {
            self.frame_time_sum.as_secs_f32() * 1000.0 / self.frames as f32
        };
        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            avg_frame_ms,
            max_frame_ms: self.frame_time_max.as_secs_f32() * 1000.0,
        };

        self.interval_start = now;
        self.frames = 0;
        self.ticks = 0;
        self.frame_time_sum = Duration::ZERO;
        self.frame_time_max = Duration::ZERO;

        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::RwLock;
    use std::thread;

    use super::*;

    fn poison_lock(lock: &RwLock<LoopMetricsSnapshot>) {
        thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = lock.write().expect("write guard");
                    panic!("poison metrics lock");
                })
                .join();
        });
    }

    #[test]
    fn snapshot_averages_frames_and_tracks_the_worst_frame() {
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1));
        let base = Instant::now();

        accumulator.record_frame(Duration::from_millis(10));
        accumulator.record_frame(Duration::from_millis(30));
        for _ in 0..4 {
            accumulator.record_tick();
        }

        let snapshot = accumulator
            .maybe_snapshot(base + Duration::from_secs(1))
            .expect("snapshot after interval");
        assert!((snapshot.fps - 2.0).abs() < 0.05);
        assert!((snapshot.tps - 4.0).abs() < 0.05);
        assert!((snapshot.avg_frame_ms - 20.0).abs() < 0.001);
        assert!((snapshot.max_frame_ms - 30.0).abs() < 0.001);
    }

    #[test]
    fn no_snapshot_before_the_interval_elapses() {
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1));
        let base = Instant::now();
        accumulator.record_frame(Duration::from_millis(16));
        assert!(accumulator
            .maybe_snapshot(base + Duration::from_millis(400))
            .is_none());
    }

    #[test]
    fn counters_reset_after_each_snapshot() {
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1));
        let base = Instant::now();
        accumulator.record_frame(Duration::from_millis(16));
        accumulator.record_tick();
        let _ = accumulator.maybe_snapshot(base + Duration::from_secs(1));

        let second = accumulator
            .maybe_snapshot(base + Duration::from_secs(2))
            .expect("second snapshot");
        assert_eq!(second.fps, 0.0);
        assert_eq!(second.tps, 0.0);
        assert_eq!(second.max_frame_ms, 0.0);
    }

    #[test]
    fn handle_recovers_from_a_poisoned_lock() {
        let handle = MetricsHandle::default();
        poison_lock(handle.snapshot.as_ref());

        handle.publish(LoopMetricsSnapshot {
            fps: 30.0,
            tps: 60.0,
            avg_frame_ms: 12.0,
            max_frame_ms: 40.0,
        });
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.fps, 30.0);
        assert_eq!(snapshot.max_frame_ms, 40.0);
    }
}
