/// The scene orchestrator. Owns the avatar population, seat map, grid,
/// tween scheduler, and behavior records; reconciles them with the
/// external session directory between frames; and routes pointer input to
/// the camera and avatars during frames.
pub struct OfficeScene {
    tuning: OfficeTuning,
    grid: WalkGrid,
    entrance: GridPos,
    floor_tiles: Vec<GridPos>,
    wall_tiles: Vec<GridPos>,
    desk_tiles: Vec<GridPos>,
    seats: SeatMap,
    avatars: BTreeMap<String, Avatar>,
    records: BTreeMap<String, BehaviorRecord>,
    behavior: BehaviorHost,
    tweens: TweenSet<PropId>,
    events: OfficeEventBus,
    rng: ChaCha8Rng,
    press_cursor_px: Option<Vec2>,
    press_candidate: Option<PropId>,
}

impl OfficeScene {
    pub fn new(tuning: OfficeTuning, seed: u64) -> Result<Self, String> {
        let layout = build_office_layout()?;
        Ok(Self {
            tuning,
            grid: layout.grid,
            entrance: layout.entrance,
            floor_tiles: layout.floor_tiles,
            wall_tiles: layout.wall_tiles,
            desk_tiles: layout.desk_tiles,
            seats: SeatMap::from_tiles(layout.seat_tiles),
            avatars: BTreeMap::new(),
            records: BTreeMap::new(),
            behavior: BehaviorHost::default(),
            tweens: TweenSet::default(),
            events: OfficeEventBus::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            press_cursor_px: None,
            press_candidate: None,
        })
    }

    pub fn drain_events(&mut self) -> Vec<OfficeEvent> {
        self.events.drain()
    }

    pub fn avatar_count(&self) -> usize {
        self.avatars.len()
    }

    pub fn entrance(&self) -> GridPos {
        self.entrance
    }

    pub fn behavior_state_of(&self, session_id: &str) -> Option<BehaviorState> {
        self.records.get(session_id).map(|record| record.state)
    }

    pub fn seat_of(&self, session_id: &str) -> Option<SeatId> {
        self.avatars.get(session_id).and_then(|avatar| avatar.seat)
    }

    pub fn seat_occupant(&self, seat: SeatId) -> Option<&str> {
        self.seats.occupant(seat)
    }

    pub fn free_seats(&self) -> Vec<SeatId> {
        self.seats.free_seats()
    }

    pub fn seats(&self) -> &SeatMap {
        &self.seats
    }

    pub fn avatar_position(&self, session_id: &str) -> Option<GridPoint> {
        self.avatars
            .get(session_id)
            .map(|avatar| avatar.position)
    }

    pub fn avatar_prop(&self, session_id: &str) -> Option<PropId> {
        self.avatars.get(session_id).map(|avatar| avatar.prop)
    }

    pub fn is_departing(&self, session_id: &str) -> bool {
        self.avatars
            .get(session_id)
            .is_some_and(|avatar| avatar.departing)
    }

    /// Reconciles the avatar population with the directory's session list:
    /// new ids spawn at the entrance, known ids refresh name and status,
    /// absent ids begin their exit animation. Invoked between frames,
    /// never concurrently with an update pass.
    pub fn sync_sessions(&mut self, sessions: &[SessionRecord], stage: &mut Stage) {
        for session in sessions {
            if self.avatars.contains_key(&session.id) {
                self.refresh_avatar(session, stage);
            } else {
                self.spawn_avatar(session, stage);
            }
        }

        let wanted: HashSet<&str> = sessions.iter().map(|session| session.id.as_str()).collect();
        let absent: Vec<String> = self
            .avatars
            .iter()
            .filter(|(id, avatar)| !wanted.contains(id.as_str()) && !avatar.departing)
            .map(|(id, _)| id.clone())
            .collect();
        for session_id in absent {
            self.begin_departure(&session_id, stage);
        }

        debug!(
            session_count = sessions.len(),
            avatar_count = self.avatars.len(),
            "sessions_synced"
        );
    }

    /// Marks this session's avatar as working. Idempotent: repeated start
    /// signals, unknown ids, and avatars mid-special are ignored.
    pub fn notify_request_start(&mut self, session_id: &str) {
        let Some(record) = self.records.get_mut(session_id) else {
            warn!(session_id, "request_start_for_unknown_session");
            return;
        };
        if record.working {
            debug!(session_id, "request_start_ignored_already_working");
            return;
        }
        if record.state == BehaviorState::Special {
            debug!(session_id, "request_start_deferred_to_special");
            return;
        }
        let Some(avatar) = self.avatars.get_mut(session_id) else {
            return;
        };
        record.working = true;
        record.state = BehaviorState::Working;
        record.idle_elapsed_seconds = 0.0;
        // a walk in progress is abandoned where the avatar stands
        avatar.path.clear();
        avatar.path_index = 0;
        avatar.walk_goal = None;
        if let Some(seat) = avatar.seat {
            if self.seats.tile_of(seat) != Some(avatar.position.nearest_tile()) {
                self.seats.release(seat, &avatar.session_id);
                avatar.seat = None;
            }
        }
        debug!(session_id, "request_started");
    }

    /// Ends the working state and shows a success/failure badge. The
    /// landing state depends on current seat occupancy, not on whatever
    /// state the avatar was in when the request started.
    pub fn notify_request_end(&mut self, session_id: &str, success: bool) {
        let Some(record) = self.records.get_mut(session_id) else {
            warn!(session_id, "request_end_for_unknown_session");
            return;
        };
        if !record.working {
            debug!(session_id, "request_end_ignored_not_working");
            return;
        }
        let Some(avatar) = self.avatars.get_mut(session_id) else {
            return;
        };
        record.working = false;
        record.state = if avatar_is_at_held_seat(avatar, &self.seats) {
            BehaviorState::Sitting
        } else {
            BehaviorState::Idle
        };
        record.idle_elapsed_seconds = 0.0;
        record.idle_threshold_seconds = sample_idle_threshold(&mut self.rng, &self.tuning);
        avatar.result_badge = Some(ResultBadge {
            outcome: if success {
                RequestOutcome::Success
            } else {
                RequestOutcome::Failure
            },
            remaining_seconds: self.tuning.result_badge_seconds,
        });
        debug!(session_id, success, "request_ended");
    }

    pub fn walk_to_tile(&mut self, session_id: &str, tile: GridPos) -> bool {
        let Some(record) = self.records.get_mut(session_id) else {
            return false;
        };
        let Some(avatar) = self.avatars.get_mut(session_id) else {
            return false;
        };
        request_walk(&self.grid, &mut self.seats, avatar, record, WalkGoal::Tile(tile))
    }

    pub fn walk_to_seat(&mut self, session_id: &str, seat: SeatId) -> bool {
        let Some(record) = self.records.get_mut(session_id) else {
            return false;
        };
        let Some(avatar) = self.avatars.get_mut(session_id) else {
            return false;
        };
        request_walk(&self.grid, &mut self.seats, avatar, record, WalkGoal::Seat(seat))
    }

    fn refresh_avatar(&mut self, session: &SessionRecord, stage: &mut Stage) {
        if self
            .avatars
            .get(&session.id)
            .is_some_and(|avatar| avatar.departing)
        {
            self.cancel_departure(&session.id, stage);
        }
        let Some(avatar) = self.avatars.get_mut(&session.id) else {
            return;
        };
        avatar.indicator = StatusIndicator::from_session_status(&session.status);
        if avatar.display_name != session.name {
            avatar.display_name = session.name.clone();
            if let Some(prop) = stage.prop_mut(avatar.prop) {
                prop.label = Some(session.name.clone());
            }
        }
    }

    fn spawn_avatar(&mut self, session: &SessionRecord, stage: &mut Stage) {
        let variant = appearance_variant(&session.id);
        let position = GridPoint::from_tile(self.entrance);
        let prop = stage.spawn_selectable(
            PropLayer::Avatar,
            PropVisual::Sprite(avatar_sprite_key(variant)),
            position,
            "avatar",
        );
        stage.apply_pending();
        if let Some(prop_ref) = stage.prop_mut(prop) {
            prop_ref.label = Some(session.name.clone());
            prop_ref.scale = 0.0;
        }
        self.tweens.start(
            prop,
            TWEEN_CHANNEL_SCALE,
            0.0,
            1.0,
            self.tuning.spawn_pop_seconds,
            Easing::BounceOut,
        );

        let threshold = sample_idle_threshold(&mut self.rng, &self.tuning);
        self.records
            .insert(session.id.clone(), BehaviorRecord::new_idle(threshold));
        self.avatars.insert(
            session.id.clone(),
            Avatar {
                session_id: session.id.clone(),
                display_name: session.name.clone(),
                variant,
                prop,
                position,
                path: Vec::new(),
                path_index: 0,
                walk_goal: None,
                seat: None,
                indicator: StatusIndicator::from_session_status(&session.status),
                result_badge: None,
                departing: false,
            },
        );
        info!(session_id = %session.id, variant, "avatar_spawned");
        self.assign_spawn_destination(&session.id);
    }

    /// A fresh avatar heads for a free seat when one exists, otherwise for
    /// some walkable tile so the entrance never clogs up.
    fn assign_spawn_destination(&mut self, session_id: &str) {
        let seat_choice = pick_random_free_seat(&mut self.rng, &self.seats);
        let Some(record) = self.records.get_mut(session_id) else {
            return;
        };
        let Some(avatar) = self.avatars.get_mut(session_id) else {
            return;
        };
        let seated = match seat_choice {
            Some(seat) => request_walk(
                &self.grid,
                &mut self.seats,
                avatar,
                record,
                WalkGoal::Seat(seat),
            ),
            None => false,
        };
        if !seated {
            if let Some(tile) = pick_random_walkable_tile(&mut self.rng, &self.grid) {
                let _ = request_walk(
                    &self.grid,
                    &mut self.seats,
                    avatar,
                    record,
                    WalkGoal::Tile(tile),
                );
            }
        }
    }

    fn begin_departure(&mut self, session_id: &str, stage: &mut Stage) {
        self.records.remove(session_id);
        self.seats.release_all_for(session_id);
        let Some(avatar) = self.avatars.get_mut(session_id) else {
            return;
        };
        avatar.departing = true;
        avatar.seat = None;
        avatar.path.clear();
        avatar.path_index = 0;
        avatar.walk_goal = None;
        avatar.result_badge = None;

        let prop = avatar.prop;
        let current_alpha = stage.prop(prop).map(|p| p.alpha).unwrap_or(1.0);
        self.tweens.cancel_group(prop);
        self.tweens.start(
            prop,
            TWEEN_CHANNEL_ALPHA,
            current_alpha,
            0.0,
            self.tuning.exit_fade_seconds,
            Easing::EaseIn,
        );
        if let Some(prop_ref) = stage.prop_mut(prop) {
            prop_ref.selectable = false;
            prop_ref.badge = None;
        }
        info!(session_id, "avatar_departing");
    }

    fn cancel_departure(&mut self, session_id: &str, stage: &mut Stage) {
        let Some(avatar) = self.avatars.get_mut(session_id) else {
            return;
        };
        if !avatar.departing {
            return;
        }
        avatar.departing = false;
        let prop = avatar.prop;
        self.tweens.cancel_group(prop);
        if let Some(prop_ref) = stage.prop_mut(prop) {
            prop_ref.alpha = 1.0;
            prop_ref.selectable = true;
        }
        let threshold = sample_idle_threshold(&mut self.rng, &self.tuning);
        self.records
            .insert(session_id.to_string(), BehaviorRecord::new_idle(threshold));
        info!(session_id, "avatar_departure_cancelled");
    }

    fn handle_pointer(&mut self, input: &PointerSnapshot, stage: &mut Stage) {
        let viewport = input.viewport();
        if input.zoom_delta_steps() != 0 {
            stage
                .camera_mut()
                .apply_zoom_steps(input.zoom_delta_steps(), input.cursor_px(), viewport);
        }

        if input.left_pressed() {
            if let Some(cursor) = input.cursor_px() {
                self.press_cursor_px = Some(cursor);
                self.press_candidate = stage.pick_topmost_selectable_at(cursor, viewport);
                stage.camera_mut().begin_drag(cursor);
            }
        } else if input.left_is_down() {
            if let Some(cursor) = input.cursor_px() {
                stage.camera_mut().update_drag(cursor);
            }
        }

        if input.left_released() {
            stage.camera_mut().end_drag();
            let was_click = match (self.press_cursor_px, input.cursor_px()) {
                (Some(press), Some(cursor)) => cursor_distance_px(press, cursor) <= CLICK_SLOP_PX,
                _ => false,
            };
            if was_click {
                if let Some(prop_id) = self.press_candidate {
                    if let Some(session_id) = self.session_for_prop(prop_id) {
                        self.events.emit(OfficeEvent::AvatarClicked { session_id });
                    }
                }
            }
            self.press_cursor_px = None;
            self.press_candidate = None;
        }
    }

    fn session_for_prop(&self, prop: PropId) -> Option<String> {
        self.avatars
            .values()
            .find(|avatar| avatar.prop == prop && !avatar.departing)
            .map(|avatar| avatar.session_id.clone())
    }

    fn apply_active_tweens(&self, stage: &mut Stage) {
        for (prop, channel, value) in self.tweens.active_values() {
            let Some(prop_ref) = stage.prop_mut(prop) else {
                continue;
            };
            match channel {
                TWEEN_CHANNEL_SCALE => prop_ref.scale = value,
                TWEEN_CHANNEL_ALPHA => prop_ref.alpha = value,
                _ => {}
            }
        }
    }

    fn apply_tween_completions(&mut self, stage: &mut Stage) {
        for completed in self.tweens.drain_completed() {
            if let Some(prop_ref) = stage.prop_mut(completed.group) {
                match completed.channel {
                    TWEEN_CHANNEL_SCALE => prop_ref.scale = completed.value,
                    TWEEN_CHANNEL_ALPHA => prop_ref.alpha = completed.value,
                    _ => {}
                }
            }
            if completed.channel == TWEEN_CHANNEL_ALPHA {
                self.finish_departure_for_prop(completed.group, stage);
            }
        }
    }

    /// A departing avatar leaves the population only once its exit fade
    /// has finished, so removal is never visually abrupt.
    fn finish_departure_for_prop(&mut self, prop: PropId, stage: &mut Stage) {
        let Some(session_id) = self
            .avatars
            .iter()
            .find(|(_, avatar)| avatar.prop == prop && avatar.departing)
            .map(|(id, _)| id.clone())
        else {
            return;
        };
        stage.despawn(prop);
        self.avatars.remove(&session_id);
        info!(session_id = %session_id, "avatar_removed");
    }
}
