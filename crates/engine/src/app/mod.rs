mod camera;
mod grid;
mod input;
mod metrics;
mod rendering;
mod stage;
mod timestep;
mod tween;

pub use camera::{
    IsoCamera, CAMERA_SMOOTHING_DEFAULT, CAMERA_ZOOM_DEFAULT, CAMERA_ZOOM_MAX, CAMERA_ZOOM_MIN,
    CAMERA_ZOOM_STEP,
};
pub use grid::{octile_distance, GridError, GridPos, WalkGrid};
pub use input::{PointerCollector, PointerSnapshot};
pub use metrics::{LoopMetricsSnapshot, MetricsAccumulator, MetricsHandle};
pub use rendering::{
    depth_key, grid_to_screen, grid_to_viewport, screen_to_grid, viewport_to_grid, DepthOrder,
    Viewport, DEPTH_LAYER_STRIDE, HALF_TILE_HEIGHT_PX, HALF_TILE_WIDTH_PX,
    PROP_HIT_HALF_EXTENT_PX,
};
pub use stage::{GridPoint, Prop, PropId, PropLayer, PropVisual, Scene, Stage, Vec2};
pub use timestep::{clamp_frame_delta, normalize_non_zero_duration, plan_sim_steps, StepPlan};
pub use tween::{Easing, TweenCompleted, TweenSet};
