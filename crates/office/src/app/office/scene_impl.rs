impl Scene for OfficeScene {
    fn load(&mut self, stage: &mut Stage) {
        stage.clear();
        *stage.camera_mut() = IsoCamera::new(self.tuning.camera_smoothing);
        let center_gx = (self.grid.width() as f32 - 1.0) * 0.5;
        let center_gy = (self.grid.height() as f32 - 1.0) * 0.5;
        stage
            .camera_mut()
            .jump_to(grid_to_screen(center_gx, center_gy), 1.0);

        for &tile in &self.floor_tiles {
            stage.spawn(
                PropLayer::Floor,
                PropVisual::Sprite("tiles/floor".to_string()),
                GridPoint::from_tile(tile),
                "floor",
            );
        }
        for &tile in &self.wall_tiles {
            stage.spawn(
                PropLayer::Furniture,
                PropVisual::Sprite("tiles/wall".to_string()),
                GridPoint::from_tile(tile),
                "wall",
            );
        }
        for &tile in &self.desk_tiles {
            stage.spawn(
                PropLayer::Furniture,
                PropVisual::Sprite("furniture/desk".to_string()),
                GridPoint::from_tile(tile),
                "desk",
            );
        }
        for seat in self.seats.iter() {
            stage.spawn(
                PropLayer::Furniture,
                PropVisual::Sprite("furniture/chair".to_string()),
                GridPoint::from_tile(seat.tile),
                "chair",
            );
        }
        stage.apply_pending();
        stage.depth_sort();

        info!(
            prop_count = stage.prop_count(),
            seat_count = self.seats.len(),
            sys = BEHAVIOR_SYSTEM_ORDER_TEXT,
            "office_loaded"
        );
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &PointerSnapshot, stage: &mut Stage) {
        self.handle_pointer(input, stage);
        stage.camera_mut().update(fixed_dt_seconds);

        self.tweens.update(fixed_dt_seconds);
        self.apply_active_tweens(stage);
        self.apply_tween_completions(stage);

        self.behavior.run_once_per_tick(&mut BehaviorContext {
            dt_seconds: fixed_dt_seconds,
            tuning: &self.tuning,
            grid: &self.grid,
            avatars: &mut self.avatars,
            records: &mut self.records,
            seats: &mut self.seats,
            stage: &mut *stage,
            rng: &mut self.rng,
        });

        stage.apply_pending();
        stage.depth_sort();
    }

    fn unload(&mut self, stage: &mut Stage) {
        info!(avatar_count = self.avatars.len(), "office_unload");
        self.avatars.clear();
        self.records.clear();
        self.seats.clear_occupants();
        self.tweens = TweenSet::default();
        let _ = self.events.drain();
        self.press_cursor_px = None;
        self.press_candidate = None;
        stage.clear();
    }
}
