use crate::app::rendering::Viewport;
use crate::app::stage::Vec2;

/// Pointer state for exactly one simulation tick. Press/release fields are
/// edges: true on the tick the transition happened, false afterwards even
/// while the button stays held.
#[derive(Debug, Clone, Copy)]
pub struct PointerSnapshot {
    cursor_px: Option<Vec2>,
    left_pressed: bool,
    left_released: bool,
    left_is_down: bool,
    zoom_delta_steps: i32,
    viewport_width: u32,
    viewport_height: u32,
}

impl Default for PointerSnapshot {
    fn default() -> Self {
        Self {
            cursor_px: None,
            left_pressed: false,
            left_released: false,
            left_is_down: false,
            zoom_delta_steps: 0,
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

impl PointerSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_cursor_px(mut self, cursor_px: Option<Vec2>) -> Self {
        self.cursor_px = cursor_px;
        self
    }

    pub fn with_left_pressed(mut self, left_pressed: bool) -> Self {
        self.left_pressed = left_pressed;
        if left_pressed {
            self.left_is_down = true;
        }
        self
    }

    pub fn with_left_released(mut self, left_released: bool) -> Self {
        self.left_released = left_released;
        if left_released {
            self.left_is_down = false;
        }
        self
    }

    pub fn with_left_down(mut self, left_is_down: bool) -> Self {
        self.left_is_down = left_is_down;
        self
    }

    pub fn with_zoom_delta_steps(mut self, zoom_delta_steps: i32) -> Self {
        self.zoom_delta_steps = zoom_delta_steps;
        self
    }

    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    pub fn cursor_px(&self) -> Option<Vec2> {
        self.cursor_px
    }

    pub fn left_pressed(&self) -> bool {
        self.left_pressed
    }

    pub fn left_released(&self) -> bool {
        self.left_released
    }

    pub fn left_is_down(&self) -> bool {
        self.left_is_down
    }

    pub fn zoom_delta_steps(&self) -> i32 {
        self.zoom_delta_steps
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.viewport_width,
            height: self.viewport_height,
        }
    }
}

/// Accumulates host pointer events between ticks and hands out one
/// [`PointerSnapshot`] per tick. Edges fire for a single snapshot; held
/// state persists until the host reports a release.
#[derive(Debug)]
pub struct PointerCollector {
    cursor_px: Option<Vec2>,
    left_is_down: bool,
    left_pressed_edge: bool,
    left_released_edge: bool,
    pending_zoom_steps: i32,
    viewport_width: u32,
    viewport_height: u32,
}

impl PointerCollector {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            cursor_px: None,
            left_is_down: false,
            left_pressed_edge: false,
            left_released_edge: false,
            pending_zoom_steps: 0,
            viewport_width,
            viewport_height,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    pub fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_px = Some(Vec2 { x, y });
    }

    pub fn clear_cursor_position(&mut self) {
        self.cursor_px = None;
    }

    pub fn handle_left_button(&mut self, pressed: bool) {
        if pressed {
            if !self.left_is_down {
                self.left_pressed_edge = true;
            }
            self.left_is_down = true;
        } else {
            if self.left_is_down {
                self.left_released_edge = true;
            }
            self.left_is_down = false;
        }
    }

    /// Vertical wheel motion, positive away from the user. Collapses to
    /// one discrete zoom step per event, accumulated until the next tick.
    pub fn handle_wheel(&mut self, delta_y: f32) {
        let step = if delta_y > 0.0 {
            1
        } else if delta_y < 0.0 {
            -1
        } else {
            0
        };
        self.pending_zoom_steps = self.pending_zoom_steps.saturating_add(step);
    }

    pub fn snapshot_for_tick(&mut self) -> PointerSnapshot {
        let snapshot = PointerSnapshot {
            cursor_px: self.cursor_px,
            left_pressed: self.left_pressed_edge,
            left_released: self.left_released_edge,
            left_is_down: self.left_is_down,
            zoom_delta_steps: self.pending_zoom_steps,
            viewport_width: self.viewport_width,
            viewport_height: self.viewport_height,
        };
        self.left_pressed_edge = false;
        self.left_released_edge = false;
        self.pending_zoom_steps = 0;
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_edge_lasts_a_single_tick() {
        let mut collector = PointerCollector::new(1280, 720);
        collector.handle_left_button(true);

        let first = collector.snapshot_for_tick();
        let second = collector.snapshot_for_tick();
        assert!(first.left_pressed());
        assert!(first.left_is_down());
        assert!(!second.left_pressed());
        assert!(second.left_is_down());
    }

    #[test]
    fn held_button_does_not_retrigger_the_press_edge() {
        let mut collector = PointerCollector::new(1280, 720);
        collector.handle_left_button(true);
        let _ = collector.snapshot_for_tick();

        collector.handle_left_button(true);
        assert!(!collector.snapshot_for_tick().left_pressed());

        collector.handle_left_button(false);
        collector.handle_left_button(true);
        assert!(collector.snapshot_for_tick().left_pressed());
    }

    #[test]
    fn release_edge_lasts_a_single_tick() {
        let mut collector = PointerCollector::new(1280, 720);
        collector.handle_left_button(true);
        let _ = collector.snapshot_for_tick();
        collector.handle_left_button(false);

        let first = collector.snapshot_for_tick();
        let second = collector.snapshot_for_tick();
        assert!(first.left_released());
        assert!(!first.left_is_down());
        assert!(!second.left_released());
    }

    #[test]
    fn release_without_prior_press_is_not_an_edge() {
        let mut collector = PointerCollector::new(1280, 720);
        collector.handle_left_button(false);
        assert!(!collector.snapshot_for_tick().left_released());
    }

    #[test]
    fn wheel_steps_accumulate_and_reset_per_tick() {
        let mut collector = PointerCollector::new(1280, 720);
        collector.handle_wheel(3.0);
        collector.handle_wheel(1.5);
        collector.handle_wheel(-0.5);

        let first = collector.snapshot_for_tick();
        let second = collector.snapshot_for_tick();
        assert_eq!(first.zoom_delta_steps(), 1);
        assert_eq!(second.zoom_delta_steps(), 0);
    }

    #[test]
    fn zero_wheel_delta_adds_no_step() {
        let mut collector = PointerCollector::new(1280, 720);
        collector.handle_wheel(0.0);
        assert_eq!(collector.snapshot_for_tick().zoom_delta_steps(), 0);
    }

    #[test]
    fn snapshot_carries_cursor_and_viewport() {
        let mut collector = PointerCollector::new(1280, 720);
        collector.set_cursor_position_px(321.0, 123.0);
        collector.set_viewport(1920, 1080);

        let snapshot = collector.snapshot_for_tick();
        let cursor = snapshot.cursor_px().expect("cursor");
        assert!((cursor.x - 321.0).abs() < 0.0001);
        assert!((cursor.y - 123.0).abs() < 0.0001);
        assert_eq!(snapshot.viewport().width, 1920);
        assert_eq!(snapshot.viewport().height, 1080);
    }

    #[test]
    fn cursor_leaving_the_surface_clears_the_position() {
        let mut collector = PointerCollector::new(1280, 720);
        collector.set_cursor_position_px(10.0, 10.0);
        collector.clear_cursor_position();
        assert!(collector.snapshot_for_tick().cursor_px().is_none());
    }

    #[test]
    fn builder_snapshot_supports_scene_tests() {
        let snapshot = PointerSnapshot::empty()
            .with_cursor_px(Some(Vec2 { x: 5.0, y: 6.0 }))
            .with_left_pressed(true)
            .with_zoom_delta_steps(-2)
            .with_viewport(640, 480);
        assert!(snapshot.left_pressed());
        assert!(snapshot.left_is_down());
        assert_eq!(snapshot.zoom_delta_steps(), -2);
        assert_eq!(snapshot.viewport().width, 640);
    }
}
