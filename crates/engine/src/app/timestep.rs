//! Fixed-timestep planning for a host-driven frame loop.
//!
//! The host accumulates wall-clock time, asks [`plan_sim_steps`] how many
//! fixed ticks to run this frame, and keeps the remainder for the next
//! frame. A per-frame tick cap bounds the death-spiral case where the
//! simulation cannot keep up: the surplus backlog is dropped and reported
//! so the host can log it.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    pub ticks_to_run: u32,
    pub remaining_accumulator: Duration,
    pub dropped_backlog: Duration,
}

pub fn plan_sim_steps(
    accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    if fixed_dt.is_zero() {
        return StepPlan {
            ticks_to_run: 0,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        };
    }

    let ticks_possible =
        (accumulator.as_nanos() / fixed_dt.as_nanos()).min(u32::MAX as u128) as u32;
    let ticks_to_run = ticks_possible.min(max_ticks_per_frame.max(1));
    let consumed = fixed_dt.saturating_mul(ticks_to_run);
    let remainder = accumulator.saturating_sub(consumed);

    if ticks_possible > ticks_to_run {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: remainder,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: remainder,
            dropped_backlog: Duration::ZERO,
        }
    }
}

/// Caps a raw frame delta so a stall (breakpoint, laptop sleep) does not
/// turn into a burst of catch-up ticks.
pub fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

pub fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXED_DT: Duration = Duration::from_millis(16);

    #[test]
    fn exact_multiple_runs_all_ticks_with_no_remainder() {
        let plan = plan_sim_steps(Duration::from_millis(48), FIXED_DT, 5);
        assert_eq!(plan.ticks_to_run, 3);
        assert_eq!(plan.remaining_accumulator, Duration::ZERO);
        assert_eq!(plan.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn partial_tick_stays_in_the_accumulator() {
        let plan = plan_sim_steps(Duration::from_millis(40), FIXED_DT, 5);
        assert_eq!(plan.ticks_to_run, 2);
        assert_eq!(plan.remaining_accumulator, Duration::from_millis(8));
        assert_eq!(plan.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn backlog_past_the_tick_cap_is_dropped() {
        let plan = plan_sim_steps(Duration::from_millis(120), FIXED_DT, 3);
        assert_eq!(plan.ticks_to_run, 3);
        assert_eq!(plan.remaining_accumulator, Duration::ZERO);
        assert_eq!(plan.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn zero_tick_cap_still_runs_one_tick() {
        let plan = plan_sim_steps(Duration::from_millis(20), FIXED_DT, 0);
        assert_eq!(plan.ticks_to_run, 1);
    }

    #[test]
    fn zero_fixed_dt_plans_nothing() {
        let plan = plan_sim_steps(Duration::from_millis(20), Duration::ZERO, 5);
        assert_eq!(plan.ticks_to_run, 0);
        assert_eq!(plan.remaining_accumulator, Duration::from_millis(20));
    }

    #[test]
    fn clamp_frame_delta_caps_large_stalls() {
        let max = Duration::from_millis(250);
        assert_eq!(clamp_frame_delta(Duration::from_secs(3), max), max);
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(16), max),
            Duration::from_millis(16)
        );
    }

    #[test]
    fn normalize_non_zero_duration_substitutes_fallback() {
        let fallback = Duration::from_secs(1);
        assert_eq!(normalize_non_zero_duration(Duration::ZERO, fallback), fallback);
        assert_eq!(
            normalize_non_zero_duration(Duration::from_millis(5), fallback),
            Duration::from_millis(5)
        );
    }
}
