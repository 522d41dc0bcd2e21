use std::thread;
use std::time::{Duration, Instant};

use engine::{
    clamp_frame_delta, normalize_non_zero_duration, plan_sim_steps, MetricsAccumulator,
    MetricsHandle, PointerCollector, Scene, Stage,
};
use tracing::{info, warn};

use super::office::{OfficeEvent, OfficeScene, SessionRecord};

#[derive(Debug, Clone)]
pub struct DemoLoopConfig {
    pub target_tps: u32,
    pub max_sim_ticks: u64,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for DemoLoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_sim_ticks: 1800,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DemoAction {
    Sync(Vec<SessionRecord>),
    RequestStart(&'static str),
    RequestEnd {
        session_id: &'static str,
        success: bool,
    },
}

#[derive(Debug, Clone)]
pub struct DemoStep {
    pub at_tick: u64,
    pub action: DemoAction,
}

/// A scripted session feed standing in for the live dashboard: joins,
/// departures, and request activity keyed to simulation ticks.
#[derive(Debug, Clone, Default)]
pub struct DemoScript {
    steps: Vec<DemoStep>,
    cursor: usize,
}

impl DemoScript {
    pub fn new(mut steps: Vec<DemoStep>) -> Self {
        steps.sort_by_key(|step| step.at_tick);
        Self { steps, cursor: 0 }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            DemoStep {
                at_tick: 0,
                action: DemoAction::Sync(vec![
                    SessionRecord::new("sess-01", "Ada", "idle"),
                    SessionRecord::new("sess-02", "Grace", "idle"),
                    SessionRecord::new("sess-03", "Edsger", "idle"),
                ]),
            },
            DemoStep {
                at_tick: 240,
                action: DemoAction::RequestStart("sess-02"),
            },
            DemoStep {
                at_tick: 420,
                action: DemoAction::RequestEnd {
                    session_id: "sess-02",
                    success: true,
                },
            },
            DemoStep {
                at_tick: 600,
                action: DemoAction::Sync(vec![
                    SessionRecord::new("sess-01", "Ada", "working"),
                    SessionRecord::new("sess-02", "Grace", "idle"),
                    SessionRecord::new("sess-03", "Edsger", "idle"),
                    SessionRecord::new("sess-04", "Barbara", "idle"),
                ]),
            },
            DemoStep {
                at_tick: 900,
                action: DemoAction::RequestStart("sess-03"),
            },
            DemoStep {
                at_tick: 980,
                action: DemoAction::RequestEnd {
                    session_id: "sess-03",
                    success: false,
                },
            },
            DemoStep {
                at_tick: 1200,
                action: DemoAction::Sync(vec![
                    SessionRecord::new("sess-01", "Ada", "idle"),
                    SessionRecord::new("sess-04", "Barbara", "idle"),
                ]),
            },
        ])
    }

    fn apply_due(&mut self, tick: u64, scene: &mut OfficeScene, stage: &mut Stage) {
        while let Some(step) = self.steps.get(self.cursor) {
            if step.at_tick > tick {
                break;
            }
            match &step.action {
                DemoAction::Sync(sessions) => scene.sync_sessions(sessions, stage),
                DemoAction::RequestStart(session_id) => scene.notify_request_start(session_id),
                DemoAction::RequestEnd {
                    session_id,
                    success,
                } => scene.notify_request_end(session_id, *success),
            }
            self.cursor += 1;
        }
    }
}

/// Drives the office headless at a fixed timestep until `max_sim_ticks`
/// have run. The session feed comes from the script; pointer input stays
/// quiet. Rendering is whatever the host does with the stage afterwards —
/// here, nothing.
pub fn run_demo(
    config: &DemoLoopConfig,
    scene: &mut OfficeScene,
    stage: &mut Stage,
    script: &mut DemoScript,
    metrics_handle: &MetricsHandle,
) {
    let target_tps = config.target_tps.max(1);
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));

    let mut collector = PointerCollector::new(config.viewport_width, config.viewport_height);
    let mut metrics = MetricsAccumulator::new(metrics_log_interval);
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut tick: u64 = 0;

    scene.load(stage);
    info!(
        target_tps,
        max_sim_ticks = config.max_sim_ticks,
        "demo_loop_started"
    );

    while tick < config.max_sim_ticks {
        let now = Instant::now();
        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
        last_frame_instant = now;
        accumulator = accumulator.saturating_add(clamp_frame_delta(raw_frame_dt, max_frame_delta));

        let plan = plan_sim_steps(accumulator, fixed_dt, config.max_ticks_per_frame.max(1));
        accumulator = plan.remaining_accumulator;
        if plan.dropped_backlog > Duration::ZERO {
            warn!(
                dropped_backlog_ms = plan.dropped_backlog.as_millis() as u64,
                "sim_clamp_triggered"
            );
        }

        for _ in 0..plan.ticks_to_run {
            if tick >= config.max_sim_ticks {
                break;
            }
            script.apply_due(tick, scene, stage);
            let input = collector.snapshot_for_tick();
            scene.update(fixed_dt_seconds, &input, stage);
            for event in scene.drain_events() {
                let OfficeEvent::AvatarClicked { session_id } = event;
                info!(session_id = %session_id, "avatar_clicked");
            }
            metrics.record_tick();
            tick = tick.saturating_add(1);
        }

        metrics.record_frame(raw_frame_dt);
        if let Some(snapshot) = metrics.maybe_snapshot(now) {
            metrics_handle.publish(snapshot);
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                avg_frame_ms = snapshot.avg_frame_ms,
                max_frame_ms = snapshot.max_frame_ms,
                avatar_count = scene.avatar_count(),
                "loop_metrics"
            );
        }

        if plan.ticks_to_run == 0 {
            // Stay well under one tick so the accumulator keeps pace.
            thread::sleep(fixed_dt.min(Duration::from_millis(2)));
        }
    }

    info!(
        ticks = tick,
        avatar_count = scene.avatar_count(),
        "demo_loop_finished"
    );
    scene.unload(stage);
}

#[cfg(test)]
mod tests {
    use engine::PointerSnapshot;

    use super::super::office::OfficeTuning;
    use super::*;

    fn quiet_scene() -> (OfficeScene, Stage) {
        let tuning = OfficeTuning {
            idle_event_min_seconds: 1000.0,
            idle_event_max_seconds: 1000.0,
            ..OfficeTuning::default()
        };
        let mut scene = OfficeScene::new(tuning, 5).expect("scene");
        let mut stage = Stage::default();
        scene.load(&mut stage);
        (scene, stage)
    }

    #[test]
    fn script_steps_apply_in_tick_order_and_only_once() {
        let (mut scene, mut stage) = quiet_scene();
        let mut script = DemoScript::new(vec![
            DemoStep {
                at_tick: 10,
                action: DemoAction::Sync(vec![SessionRecord::new("sess-01", "Ada", "idle")]),
            },
            DemoStep {
                at_tick: 0,
                action: DemoAction::Sync(vec![]),
            },
        ]);

        script.apply_due(0, &mut scene, &mut stage);
        assert_eq!(scene.avatar_count(), 0);

        script.apply_due(10, &mut scene, &mut stage);
        assert_eq!(scene.avatar_count(), 1);

        // Re-applying the same tick must not replay consumed steps.
        script.apply_due(10, &mut scene, &mut stage);
        assert_eq!(scene.avatar_count(), 1);
    }

    #[test]
    fn script_catches_up_past_skipped_ticks() {
        let (mut scene, mut stage) = quiet_scene();
        let mut script = DemoScript::new(vec![
            DemoStep {
                at_tick: 3,
                action: DemoAction::Sync(vec![SessionRecord::new("sess-01", "Ada", "idle")]),
            },
            DemoStep {
                at_tick: 5,
                action: DemoAction::RequestStart("sess-01"),
            },
        ]);

        script.apply_due(50, &mut scene, &mut stage);
        scene.update(1.0 / 60.0, &PointerSnapshot::empty(), &mut stage);
        assert_eq!(scene.avatar_count(), 1);
    }

    #[test]
    fn standard_script_is_sorted_by_tick() {
        let script = DemoScript::standard();
        let ticks: Vec<u64> = script.steps.iter().map(|step| step.at_tick).collect();
        let mut sorted = ticks.clone();
        sorted.sort_unstable();
        assert_eq!(ticks, sorted);
    }
}
