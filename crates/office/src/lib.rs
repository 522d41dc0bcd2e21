//! Isometric virtual-office simulation for an agent-control dashboard.
//!
//! Each live worker session is embodied as an avatar that walks the
//! office, takes a seat, fidgets while idle, and lights up while its
//! session is serving a request. The dashboard host owns the frame loop
//! and the renderer: it feeds session lists and pointer input in, and
//! reads the engine stage plus the drained event queue out. The `office`
//! binary wraps all of that in a headless scripted demo.

mod app;

pub use app::bootstrap::{resolve_tuning, CONFIG_ENV_VAR};
pub use app::loop_runner::{run_demo, DemoAction, DemoLoopConfig, DemoScript, DemoStep};
pub use app::office::{
    BehaviorState, OfficeEvent, OfficeScene, OfficeTuning, Seat, SeatId, SeatMap, SessionRecord,
};
