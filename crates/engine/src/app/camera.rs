use crate::app::rendering::Viewport;
use crate::app::stage::Vec2;

pub const CAMERA_ZOOM_DEFAULT: f32 = 1.0;
pub const CAMERA_ZOOM_MIN: f32 = 0.5;
pub const CAMERA_ZOOM_MAX: f32 = 2.5;
pub const CAMERA_ZOOM_STEP: f32 = 0.25;

/// Fraction of the remaining distance to the target covered per 60 Hz
/// tick. The update pass rescales this for the actual delta, so motion
/// speed is framerate independent.
pub const CAMERA_SMOOTHING_DEFAULT: f32 = 0.18;

const REFERENCE_TICK_SECONDS: f32 = 1.0 / 60.0;
const SNAP_EPSILON_PX: f32 = 0.01;
const SNAP_EPSILON_ZOOM: f32 = 0.0001;

#[derive(Debug, Clone, Copy)]
struct DragState {
    cursor_start_px: Vec2,
    target_start: Vec2,
}

/// Smoothed isometric camera. `position` is the world-space pixel (the
/// projected isometric plane at zoom 1.0) shown at the viewport center;
/// all mutations move the *target* transform, and [`IsoCamera::update`]
/// eases the current transform toward it each frame.
#[derive(Debug, Clone)]
pub struct IsoCamera {
    position: Vec2,
    zoom: f32,
    target_position: Vec2,
    target_zoom: f32,
    smoothing: f32,
    drag: Option<DragState>,
}

impl Default for IsoCamera {
    fn default() -> Self {
        Self::new(CAMERA_SMOOTHING_DEFAULT)
    }
}

impl IsoCamera {
    pub fn new(smoothing: f32) -> Self {
        let smoothing = if smoothing.is_finite() {
            smoothing.clamp(0.01, 1.0)
        } else {
            CAMERA_SMOOTHING_DEFAULT
        };
        Self {
            position: Vec2::default(),
            zoom: CAMERA_ZOOM_DEFAULT,
            target_position: Vec2::default(),
            target_zoom: CAMERA_ZOOM_DEFAULT,
            smoothing,
            drag: None,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn target_position(&self) -> Vec2 {
        self.target_position
    }

    pub fn target_zoom(&self) -> f32 {
        self.target_zoom
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Snaps both the current and target transform, skipping smoothing.
    pub fn jump_to(&mut self, position: Vec2, zoom: f32) {
        let zoom = clamp_zoom(zoom);
        self.position = position;
        self.target_position = position;
        self.zoom = zoom;
        self.target_zoom = zoom;
        self.drag = None;
    }

    /// Pans the target by a screen-pixel delta. Dividing by the target
    /// zoom keeps pan distance constant on screen at any zoom level.
    pub fn pan(&mut self, dx_px: f32, dy_px: f32) {
        self.target_position.x += dx_px / self.target_zoom;
        self.target_position.y += dy_px / self.target_zoom;
    }

    /// Moves the target so `world` lands at the viewport center.
    pub fn center_on(&mut self, world: Vec2) {
        self.target_position = world;
    }

    /// Applies discrete zoom steps. With a cursor pivot, the world point
    /// under the cursor stays visually fixed while the zoom changes.
    pub fn apply_zoom_steps(&mut self, steps: i32, pivot_px: Option<Vec2>, viewport: Viewport) {
        if steps == 0 {
            return;
        }
        let previous = self.target_zoom;
        let next = clamp_zoom(previous + steps as f32 * CAMERA_ZOOM_STEP);
        if (next - previous).abs() < SNAP_EPSILON_ZOOM {
            return;
        }
        if let Some(cursor) = pivot_px {
            let center = viewport.center();
            let world_under_cursor = Vec2 {
                x: (cursor.x - center.x) / previous + self.target_position.x,
                y: (cursor.y - center.y) / previous + self.target_position.y,
            };
            self.target_position = Vec2 {
                x: world_under_cursor.x - (cursor.x - center.x) / next,
                y: world_under_cursor.y - (cursor.y - center.y) / next,
            };
        }
        self.target_zoom = next;
    }

    pub fn begin_drag(&mut self, cursor_px: Vec2) {
        self.drag = Some(DragState {
            cursor_start_px: cursor_px,
            target_start: self.target_position,
        });
    }

    /// Recomputes the target as an offset from the drag origin, so a drag
    /// is an absolute gesture rather than an accumulation of deltas.
    pub fn update_drag(&mut self, cursor_px: Vec2) {
        let Some(drag) = self.drag else {
            return;
        };
        self.target_position = Vec2 {
            x: drag.target_start.x - (cursor_px.x - drag.cursor_start_px.x) / self.target_zoom,
            y: drag.target_start.y - (cursor_px.y - drag.cursor_start_px.y) / self.target_zoom,
        };
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Eases the current transform toward the target (critically damped
    /// exponential approach) and snaps once the remainder is negligible.
    pub fn update(&mut self, dt_seconds: f32) {
        if dt_seconds <= 0.0 {
            return;
        }
        let blend = 1.0 - (1.0 - self.smoothing).powf(dt_seconds / REFERENCE_TICK_SECONDS);
        self.position.x += (self.target_position.x - self.position.x) * blend;
        self.position.y += (self.target_position.y - self.position.y) * blend;
        self.zoom += (self.target_zoom - self.zoom) * blend;

        if (self.target_position.x - self.position.x).abs() < SNAP_EPSILON_PX
            && (self.target_position.y - self.position.y).abs() < SNAP_EPSILON_PX
        {
            self.position = self.target_position;
        }
        if (self.target_zoom - self.zoom).abs() < SNAP_EPSILON_ZOOM {
            self.zoom = self.target_zoom;
        }
    }
}

fn clamp_zoom(zoom: f32) -> f32 {
    if !zoom.is_finite() {
        return CAMERA_ZOOM_DEFAULT;
    }
    zoom.clamp(CAMERA_ZOOM_MIN, CAMERA_ZOOM_MAX)
}
