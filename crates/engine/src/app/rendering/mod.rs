mod depth;
mod projection;

pub use depth::DepthOrder;
pub use projection::{
    depth_key, grid_to_screen, grid_to_viewport, screen_to_grid, viewport_to_grid, Viewport,
    DEPTH_LAYER_STRIDE, HALF_TILE_HEIGHT_PX, HALF_TILE_WIDTH_PX,
};

/// Half extent of a prop's cursor hit box in screen pixels at zoom 1.0.
pub const PROP_HIT_HALF_EXTENT_PX: f32 = 18.0;
