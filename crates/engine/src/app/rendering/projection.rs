use crate::app::camera::IsoCamera;
use crate::app::stage::Vec2;

/// Tile footprint in screen pixels at zoom 1.0. Classic 2:1 isometric
/// diamond: a tile projects twice as wide as it is tall.
pub const HALF_TILE_WIDTH_PX: f32 = 32.0;
pub const HALF_TILE_HEIGHT_PX: f32 = 16.0;

/// Depth keys quantize `gx + gy` into this many sub-steps per tile so props
/// moving between tiles still order correctly against static neighbors.
const DEPTH_SUBTILE_STEPS: f32 = 16.0;

/// Stride separating draw layers within one depth row. Must stay larger
/// than the highest layer value passed to [`depth_key`].
pub const DEPTH_LAYER_STRIDE: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.width as f32 * 0.5,
            y: self.height as f32 * 0.5,
        }
    }
}

/// Project a (possibly fractional) grid coordinate onto the isometric
/// screen plane at zoom 1.0 with the grid origin at screen (0, 0).
pub fn grid_to_screen(gx: f32, gy: f32) -> Vec2 {
    Vec2 {
        x: (gx - gy) * HALF_TILE_WIDTH_PX,
        y: (gx + gy) * HALF_TILE_HEIGHT_PX,
    }
}

/// Exact algebraic inverse of [`grid_to_screen`].
pub fn screen_to_grid(screen: Vec2) -> (f32, f32) {
    let half = screen.x / HALF_TILE_WIDTH_PX;
    let sum = screen.y / HALF_TILE_HEIGHT_PX;
    ((sum + half) * 0.5, (sum - half) * 0.5)
}

/// Back-to-front draw key: rows further from the camera (smaller
/// `gx + gy`) sort strictly before nearer ones; `layer` breaks ties for
/// stacked props on the same tile (floor < furniture < avatar).
pub fn depth_key(gx: f32, gy: f32, layer: i64) -> i64 {
    let row = ((gx + gy) * DEPTH_SUBTILE_STEPS).round() as i64;
    row * DEPTH_LAYER_STRIDE + layer
}

/// Grid coordinate to viewport pixels through the camera transform.
pub fn grid_to_viewport(camera: &IsoCamera, viewport: Viewport, gx: f32, gy: f32) -> Vec2 {
    let world = grid_to_screen(gx, gy);
    let center = viewport.center();
    Vec2 {
        x: (world.x - camera.position().x) * camera.zoom() + center.x,
        y: (world.y - camera.position().y) * camera.zoom() + center.y,
    }
}

/// Viewport pixels back to a fractional grid coordinate.
pub fn viewport_to_grid(camera: &IsoCamera, viewport: Viewport, cursor_px: Vec2) -> (f32, f32) {
    let center = viewport.center();
    let world = Vec2 {
        x: (cursor_px.x - center.x) / camera.zoom() + camera.position().x,
        y: (cursor_px.y - center.y) / camera.zoom() + camera.position().y,
    };
    screen_to_grid(world)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_round_trips_within_tolerance() {
        for gx in -20..=20 {
            for gy in -20..=20 {
                let screen = grid_to_screen(gx as f32, gy as f32);
                let (back_x, back_y) = screen_to_grid(screen);
                assert!((back_x - gx as f32).abs() < 0.0001);
                assert!((back_y - gy as f32).abs() < 0.0001);
            }
        }
    }

    #[test]
    fn projection_round_trips_fractional_positions() {
        let screen = grid_to_screen(3.25, 7.75);
        let (gx, gy) = screen_to_grid(screen);
        assert!((gx - 3.25).abs() < 0.0001);
        assert!((gy - 7.75).abs() < 0.0001);
    }

    #[test]
    fn one_tile_down_the_gx_axis_moves_right_and_down() {
        let origin = grid_to_screen(0.0, 0.0);
        let next = grid_to_screen(1.0, 0.0);
        assert!((origin.x - 0.0).abs() < 0.0001);
        assert!((next.x - HALF_TILE_WIDTH_PX).abs() < 0.0001);
        assert!((next.y - HALF_TILE_HEIGHT_PX).abs() < 0.0001);
    }

    #[test]
    fn depth_is_monotonic_in_row_regardless_of_layer() {
        for sum_a in 0..30 {
            let far = depth_key(sum_a as f32, 0.0, DEPTH_LAYER_STRIDE - 1);
            let near = depth_key((sum_a + 1) as f32, 0.0, 0);
            assert!(far < near, "row {sum_a} sorted after row {}", sum_a + 1);
        }
    }

    #[test]
    fn layer_breaks_ties_on_the_same_tile() {
        let floor = depth_key(4.0, 3.0, 0);
        let furniture = depth_key(4.0, 3.0, 1);
        let avatar = depth_key(4.0, 3.0, 2);
        assert!(floor < furniture);
        assert!(furniture < avatar);
    }

    #[test]
    fn fractional_movement_changes_depth_between_tiles() {
        let at_tile = depth_key(2.0, 2.0, 2);
        let partway = depth_key(2.5, 2.0, 2);
        let next_tile = depth_key(3.0, 2.0, 2);
        assert!(at_tile < partway);
        assert!(partway < next_tile);
    }

    #[test]
    fn camera_position_maps_to_viewport_center() {
        let viewport = Viewport {
            width: 1280,
            height: 720,
        };
        let mut camera = IsoCamera::default();
        camera.jump_to(grid_to_screen(5.0, 5.0), 1.0);
        let px = grid_to_viewport(&camera, viewport, 5.0, 5.0);
        assert!((px.x - 640.0).abs() < 0.0001);
        assert!((px.y - 360.0).abs() < 0.0001);
    }

    #[test]
    fn viewport_to_grid_inverts_grid_to_viewport() {
        let viewport = Viewport {
            width: 800,
            height: 600,
        };
        let mut camera = IsoCamera::default();
        camera.jump_to(Vec2 { x: 37.0, y: -12.0 }, 1.5);
        let px = grid_to_viewport(&camera, viewport, 6.5, 2.25);
        let (gx, gy) = viewport_to_grid(&camera, viewport, px);
        assert!((gx - 6.5).abs() < 0.001);
        assert!((gy - 2.25).abs() < 0.001);
    }
}
