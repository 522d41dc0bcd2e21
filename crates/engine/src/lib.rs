//! Headless isometric scene-simulation engine.
//!
//! The engine owns the pieces that are independent of any particular
//! application: the 2:1 isometric projection, a walkability grid with A*
//! search, a keyed tween scheduler, a smoothed camera, a depth-sorted prop
//! stage, per-tick pointer snapshots, and fixed-timestep planning helpers.
//! It renders nothing itself; a host reads the stage's draw order and prop
//! state each frame and draws with whatever it likes.

pub mod app;

pub use app::{
    clamp_frame_delta, depth_key, grid_to_screen, grid_to_viewport, normalize_non_zero_duration,
    octile_distance, plan_sim_steps, screen_to_grid, viewport_to_grid, DepthOrder, Easing,
    GridError, GridPoint, GridPos, IsoCamera, LoopMetricsSnapshot, MetricsAccumulator,
    MetricsHandle, PointerCollector, PointerSnapshot, Prop, PropId, PropLayer, PropVisual, Scene,
    Stage, StepPlan, TweenCompleted, TweenSet, Vec2, Viewport, WalkGrid, CAMERA_SMOOTHING_DEFAULT,
    CAMERA_ZOOM_DEFAULT, CAMERA_ZOOM_MAX, CAMERA_ZOOM_MIN, CAMERA_ZOOM_STEP, DEPTH_LAYER_STRIDE,
    HALF_TILE_HEIGHT_PX, HALF_TILE_WIDTH_PX, PROP_HIT_HALF_EXTENT_PX,
};
