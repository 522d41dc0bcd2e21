use serde::{Deserialize, Serialize};

use crate::app::camera::IsoCamera;
use crate::app::grid::GridPos;
use crate::app::input::PointerSnapshot;
use crate::app::rendering::{
    depth_key, grid_to_viewport, DepthOrder, Viewport, PROP_HIT_HALF_EXTENT_PX,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// Continuous grid coordinate. Integer values denote tile centers;
/// fractional values occur while a prop moves between tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub gx: f32,
    pub gy: f32,
}

impl GridPoint {
    pub fn from_tile(tile: GridPos) -> Self {
        Self {
            gx: tile.x as f32,
            gy: tile.y as f32,
        }
    }

    pub fn nearest_tile(&self) -> GridPos {
        GridPos {
            x: self.gx.round() as i32,
            y: self.gy.round() as i32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropLayer {
    Floor,
    Furniture,
    Avatar,
    Overlay,
}

impl PropLayer {
    pub const fn depth_index(self) -> i64 {
        match self {
            PropLayer::Floor => 0,
            PropLayer::Furniture => 1,
            PropLayer::Avatar => 2,
            PropLayer::Overlay => 3,
        }
    }
}

/// What the renderer should draw for a prop. A missing sprite falls back
/// to `Placeholder`; the simulation never depends on the visual resolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropVisual {
    Placeholder,
    Sprite(String),
}

#[derive(Debug, Clone)]
pub struct Prop {
    pub id: PropId,
    pub layer: PropLayer,
    pub visual: PropVisual,
    pub debug_name: &'static str,
    position: GridPoint,
    /// Vertical animation offset in screen pixels (walk bob, hops).
    pub offset_y_px: f32,
    pub scale: f32,
    pub alpha: f32,
    /// Sprite key of a small status badge drawn above the prop, if any.
    pub badge: Option<String>,
    /// Display label (e.g. a worker's name) drawn under the prop, if any.
    pub label: Option<String>,
    pub selectable: bool,
    applied_spawn_order: u64,
}

impl Prop {
    pub fn position(&self) -> GridPoint {
        self.position
    }
}

#[derive(Debug, Default)]
struct PropIdAllocator {
    next: u64,
}

impl PropIdAllocator {
    fn allocate(&mut self) -> PropId {
        let id = PropId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// The visual scene state a renderer reads: props with draw attributes, a
/// camera, and a back-to-front draw order. Spawns and despawns queue until
/// [`Stage::apply_pending`] so a mid-frame mutation never invalidates an
/// iteration already in flight.
#[derive(Debug, Default)]
pub struct Stage {
    allocator: PropIdAllocator,
    props: Vec<Prop>,
    pending_spawns: Vec<Prop>,
    pending_despawns: Vec<PropId>,
    next_applied_spawn_order: u64,
    camera: IsoCamera,
    draw_order: DepthOrder,
}

impl Stage {
    pub fn spawn(
        &mut self,
        layer: PropLayer,
        visual: PropVisual,
        position: GridPoint,
        debug_name: &'static str,
    ) -> PropId {
        self.spawn_internal(layer, visual, position, debug_name, false)
    }

    pub fn spawn_selectable(
        &mut self,
        layer: PropLayer,
        visual: PropVisual,
        position: GridPoint,
        debug_name: &'static str,
    ) -> PropId {
        self.spawn_internal(layer, visual, position, debug_name, true)
    }

    fn spawn_internal(
        &mut self,
        layer: PropLayer,
        visual: PropVisual,
        position: GridPoint,
        debug_name: &'static str,
        selectable: bool,
    ) -> PropId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(Prop {
            id,
            layer,
            visual,
            debug_name,
            position,
            offset_y_px: 0.0,
            scale: 1.0,
            alpha: 1.0,
            badge: None,
            label: None,
            selectable,
            applied_spawn_order: 0,
        });
        id
    }

    pub fn despawn(&mut self, id: PropId) -> bool {
        let exists_now = self.props.iter().any(|prop| prop.id == id);
        let pending_spawn = self.pending_spawns.iter().any(|prop| prop.id == id);
        if !exists_now && !pending_spawn {
            return false;
        }
        self.pending_despawns.push(id);
        true
    }

    pub fn apply_pending(&mut self) {
        if !self.pending_despawns.is_empty() {
            self.pending_despawns.sort_by_key(|id| id.0);
            self.pending_despawns.dedup();
            let doomed = std::mem::take(&mut self.pending_despawns);
            self.props
                .retain(|prop| doomed.binary_search_by_key(&prop.id.0, |id| id.0).is_err());
            self.pending_spawns
                .retain(|prop| doomed.binary_search_by_key(&prop.id.0, |id| id.0).is_err());
            for id in doomed {
                self.draw_order.remove(id);
            }
        }

        for mut prop in self.pending_spawns.drain(..) {
            prop.applied_spawn_order = self.next_applied_spawn_order;
            self.next_applied_spawn_order = self.next_applied_spawn_order.saturating_add(1);
            self.draw_order.insert(
                prop.id,
                depth_key(
                    prop.position.gx,
                    prop.position.gy,
                    prop.layer.depth_index(),
                ),
            );
            self.props.push(prop);
        }
    }

    pub fn clear(&mut self) {
        self.props.clear();
        self.pending_spawns.clear();
        self.pending_despawns.clear();
        self.next_applied_spawn_order = 0;
        self.camera = IsoCamera::default();
        self.draw_order.clear();
    }

    pub fn prop_count(&self) -> usize {
        self.props.len()
    }

    pub fn props(&self) -> &[Prop] {
        &self.props
    }

    pub fn prop(&self, id: PropId) -> Option<&Prop> {
        self.props.iter().find(|prop| prop.id == id)
    }

    /// Mutable access to non-positional draw attributes. Position changes
    /// must go through [`Stage::set_position`] so the draw order stays in
    /// sync with the prop.
    pub fn prop_mut(&mut self, id: PropId) -> Option<&mut Prop> {
        self.props.iter_mut().find(|prop| prop.id == id)
    }

    pub fn set_position(&mut self, id: PropId, position: GridPoint) {
        let Some(prop) = self.props.iter_mut().find(|prop| prop.id == id) else {
            return;
        };
        prop.position = position;
        self.draw_order.set_key(
            id,
            depth_key(position.gx, position.gy, prop.layer.depth_index()),
        );
    }

    pub fn camera(&self) -> &IsoCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut IsoCamera {
        &mut self.camera
    }

    /// Re-sorts the draw order if anything changed this frame.
    pub fn depth_sort(&mut self) -> bool {
        self.draw_order.sort_if_dirty()
    }

    /// Applied props in back-to-front draw order.
    pub fn draw_order(&self) -> impl Iterator<Item = PropId> + '_ {
        self.draw_order.ids()
    }

    /// Resolves a cursor position to the topmost selectable prop under it,
    /// where "topmost" means latest applied spawn among overlapping hits.
    pub fn pick_topmost_selectable_at(
        &self,
        cursor_px: Vec2,
        viewport: Viewport,
    ) -> Option<PropId> {
        let half_extent = PROP_HIT_HALF_EXTENT_PX * self.camera.zoom();
        let mut best: Option<(u64, PropId)> = None;

        for prop in &self.props {
            if !prop.selectable || prop.alpha <= 0.0 {
                continue;
            }
            let center = grid_to_viewport(
                &self.camera,
                viewport,
                prop.position.gx,
                prop.position.gy,
            );
            let center_y = center.y - prop.offset_y_px * self.camera.zoom();
            let in_bounds = (cursor_px.x - center.x).abs() <= half_extent
                && (cursor_px.y - center_y).abs() <= half_extent;
            if !in_bounds {
                continue;
            }
            match best {
                Some((order, _)) if order >= prop.applied_spawn_order => {}
                _ => best = Some((prop.applied_spawn_order, prop.id)),
            }
        }

        best.map(|(_, id)| id)
    }
}

/// A simulation the loop drives: loaded once, updated once per tick with
/// the pointer snapshot for that tick, unloaded at shutdown. No update may
/// block; anything spanning frames carries its own state forward.
pub trait Scene {
    fn load(&mut self, stage: &mut Stage);
    fn update(&mut self, fixed_dt_seconds: f32, input: &PointerSnapshot, stage: &mut Stage);
    fn unload(&mut self, stage: &mut Stage);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(x: i32, y: i32) -> GridPoint {
        GridPoint::from_tile(GridPos::new(x, y))
    }

    fn viewport() -> Viewport {
        Viewport {
            width: 1280,
            height: 720,
        }
    }

    #[test]
    fn spawned_props_appear_only_after_apply_pending() {
        let mut stage = Stage::default();
        let id = stage.spawn(PropLayer::Floor, PropVisual::Placeholder, tile(0, 0), "prop");
        assert_eq!(stage.prop_count(), 0);
        stage.apply_pending();
        assert_eq!(stage.prop_count(), 1);
        assert!(stage.prop(id).is_some());
    }

    #[test]
    fn despawn_is_idempotent_and_deferred() {
        let mut stage = Stage::default();
        let doomed = stage.spawn(PropLayer::Avatar, PropVisual::Placeholder, tile(1, 1), "prop");
        let survivor = stage.spawn(PropLayer::Avatar, PropVisual::Placeholder, tile(2, 2), "prop");
        stage.apply_pending();

        assert!(stage.despawn(doomed));
        assert!(stage.despawn(doomed));
        assert_eq!(stage.prop_count(), 2);
        stage.apply_pending();
        assert_eq!(stage.prop_count(), 1);
        assert!(stage.prop(doomed).is_none());
        assert!(stage.prop(survivor).is_some());
        assert!(!stage.despawn(doomed));
    }

    #[test]
    fn despawn_before_apply_cancels_a_pending_spawn() {
        let mut stage = Stage::default();
        let id = stage.spawn(PropLayer::Avatar, PropVisual::Placeholder, tile(0, 0), "prop");
        assert!(stage.despawn(id));
        stage.apply_pending();
        assert_eq!(stage.prop_count(), 0);
        assert_eq!(stage.draw_order().count(), 0);
    }

    #[test]
    fn prop_ids_are_never_reused() {
        let mut stage = Stage::default();
        let first = stage.spawn(PropLayer::Floor, PropVisual::Placeholder, tile(0, 0), "prop");
        stage.apply_pending();
        stage.despawn(first);
        stage.apply_pending();
        let second = stage.spawn(PropLayer::Floor, PropVisual::Placeholder, tile(0, 0), "prop");
        assert_ne!(first, second);
    }

    #[test]
    fn draw_order_sorts_back_to_front_across_layers() {
        let mut stage = Stage::default();
        let near_avatar = stage.spawn(PropLayer::Avatar, PropVisual::Placeholder, tile(5, 5), "prop");
        let far_floor = stage.spawn(PropLayer::Floor, PropVisual::Placeholder, tile(1, 1), "prop");
        let far_avatar = stage.spawn(PropLayer::Avatar, PropVisual::Placeholder, tile(1, 1), "prop");
        stage.apply_pending();
        stage.depth_sort();

        let order: Vec<PropId> = stage.draw_order().collect();
        assert_eq!(order, vec![far_floor, far_avatar, near_avatar]);
    }

    #[test]
    fn set_position_updates_draw_order() {
        let mut stage = Stage::default();
        let mover = stage.spawn(PropLayer::Avatar, PropVisual::Placeholder, tile(0, 0), "prop");
        let anchor = stage.spawn(PropLayer::Avatar, PropVisual::Placeholder, tile(3, 3), "prop");
        stage.apply_pending();
        stage.depth_sort();
        assert_eq!(stage.draw_order().next(), Some(mover));

        stage.set_position(mover, tile(8, 8));
        assert!(stage.depth_sort());
        assert_eq!(stage.draw_order().next(), Some(anchor));
    }

    #[test]
    fn depth_sort_runs_at_most_once_per_change() {
        let mut stage = Stage::default();
        let id = stage.spawn(PropLayer::Avatar, PropVisual::Placeholder, tile(0, 0), "prop");
        stage.apply_pending();
        assert!(stage.depth_sort());
        assert!(!stage.depth_sort());
        stage.set_position(id, tile(1, 0));
        assert!(stage.depth_sort());
    }

    #[test]
    fn picking_hits_a_selectable_prop_at_the_viewport_center() {
        let mut stage = Stage::default();
        let id = stage.spawn_selectable(PropLayer::Avatar, PropVisual::Placeholder, tile(4, 4), "prop");
        stage.apply_pending();
        stage
            .camera_mut()
            .jump_to(crate::app::grid_to_screen(4.0, 4.0), 1.0);

        let picked = stage.pick_topmost_selectable_at(viewport().center(), viewport());
        assert_eq!(picked, Some(id));
    }

    #[test]
    fn picking_ignores_non_selectable_and_empty_space() {
        let mut stage = Stage::default();
        stage.spawn(PropLayer::Furniture, PropVisual::Placeholder, tile(4, 4), "prop");
        stage.apply_pending();
        stage
            .camera_mut()
            .jump_to(crate::app::grid_to_screen(4.0, 4.0), 1.0);

        assert_eq!(
            stage.pick_topmost_selectable_at(viewport().center(), viewport()),
            None
        );
        assert_eq!(
            stage.pick_topmost_selectable_at(Vec2 { x: 5.0, y: 5.0 }, viewport()),
            None
        );
    }

    #[test]
    fn picking_prefers_the_latest_applied_spawn_on_overlap() {
        let mut stage = Stage::default();
        let first = stage.spawn_selectable(PropLayer::Avatar, PropVisual::Placeholder, tile(4, 4), "prop");
        let second = stage.spawn_selectable(PropLayer::Avatar, PropVisual::Placeholder, tile(4, 4), "prop");
        stage.apply_pending();
        stage
            .camera_mut()
            .jump_to(crate::app::grid_to_screen(4.0, 4.0), 1.0);

        let picked = stage.pick_topmost_selectable_at(viewport().center(), viewport());
        assert_eq!(picked, Some(second));
        assert_ne!(picked, Some(first));
    }

    #[test]
    fn picking_ignores_fully_faded_props() {
        let mut stage = Stage::default();
        let id = stage.spawn_selectable(PropLayer::Avatar, PropVisual::Placeholder, tile(4, 4), "prop");
        stage.apply_pending();
        stage
            .camera_mut()
            .jump_to(crate::app::grid_to_screen(4.0, 4.0), 1.0);
        stage.prop_mut(id).expect("prop").alpha = 0.0;

        assert_eq!(
            stage.pick_topmost_selectable_at(viewport().center(), viewport()),
            None
        );
    }

    #[test]
    fn nearest_tile_rounds_to_the_closest_center() {
        let point = GridPoint { gx: 3.4, gy: 6.6 };
        assert_eq!(point.nearest_tile(), GridPos::new(3, 7));
    }

    #[test]
    fn clear_resets_props_camera_and_order() {
        let mut stage = Stage::default();
        stage.spawn(PropLayer::Floor, PropVisual::Placeholder, tile(0, 0), "prop");
        stage.apply_pending();
        stage.camera_mut().center_on(Vec2 { x: 50.0, y: 50.0 });

        stage.clear();
        assert_eq!(stage.prop_count(), 0);
        assert_eq!(stage.draw_order().count(), 0);
        assert_eq!(stage.camera().target_position(), Vec2::default());
    }
}
