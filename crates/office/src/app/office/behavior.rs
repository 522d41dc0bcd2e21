#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BehaviorSystemId {
    Indicators,
    IdleEvents,
    SpecialActions,
    PathFollow,
}

impl BehaviorSystemId {
    #[cfg(test)]
    fn name(self) -> &'static str {
        match self {
            Self::Indicators => "Indicators",
            Self::IdleEvents => "IdleEvents",
            Self::SpecialActions => "SpecialActions",
            Self::PathFollow => "PathFollow",
        }
    }
}

const BEHAVIOR_SYSTEM_ORDER: [BehaviorSystemId; 4] = [
    BehaviorSystemId::Indicators,
    BehaviorSystemId::IdleEvents,
    BehaviorSystemId::SpecialActions,
    BehaviorSystemId::PathFollow,
];

struct BehaviorContext<'a> {
    dt_seconds: f32,
    tuning: &'a OfficeTuning,
    grid: &'a WalkGrid,
    avatars: &'a mut BTreeMap<String, Avatar>,
    records: &'a mut BTreeMap<String, BehaviorRecord>,
    seats: &'a mut SeatMap,
    stage: &'a mut Stage,
    rng: &'a mut dyn RngCore,
}

#[derive(Default)]
struct BehaviorHost {
    last_tick_order: Vec<BehaviorSystemId>,
}

impl BehaviorHost {
    fn run_once_per_tick(&mut self, context: &mut BehaviorContext<'_>) {
        self.last_tick_order.clear();
        for system_id in BEHAVIOR_SYSTEM_ORDER {
            self.last_tick_order.push(system_id);
            match system_id {
                BehaviorSystemId::Indicators => Self::run_indicators_system(context),
                BehaviorSystemId::IdleEvents => Self::run_idle_events_system(context),
                BehaviorSystemId::SpecialActions => Self::run_special_actions_system(context),
                BehaviorSystemId::PathFollow => Self::run_path_follow_system(context),
            }
        }
    }

    /// Ticks result badges down and rewrites each avatar's badge sprite
    /// from the current priority: request result > working > special
    /// bubble > session status.
    fn run_indicators_system(context: &mut BehaviorContext<'_>) {
        let session_ids: Vec<String> = context.avatars.keys().cloned().collect();
        for session_id in session_ids {
            let Some(avatar) = context.avatars.get_mut(&session_id) else {
                continue;
            };
            if let Some(badge) = avatar.result_badge.as_mut() {
                badge.remaining_seconds -= context.dt_seconds;
                if badge.remaining_seconds <= 0.0 {
                    avatar.result_badge = None;
                }
            }
            let badge_sprite = current_badge_sprite(avatar, context.records.get(&session_id));
            if let Some(prop) = context.stage.prop_mut(avatar.prop) {
                prop.badge = badge_sprite.map(str::to_string);
            }
        }
    }

    fn run_idle_events_system(context: &mut BehaviorContext<'_>) {
        let session_ids: Vec<String> = context.records.keys().cloned().collect();
        for session_id in session_ids {
            let Some(record) = context.records.get_mut(&session_id) else {
                continue;
            };
            if record.working
                || !matches!(record.state, BehaviorState::Idle | BehaviorState::Sitting)
            {
                continue;
            }
            record.idle_elapsed_seconds += context.dt_seconds;
            if record.idle_elapsed_seconds < record.idle_threshold_seconds {
                continue;
            }
            record.idle_elapsed_seconds = 0.0;
            record.idle_threshold_seconds = sample_idle_threshold(context.rng, context.tuning);

            let Some(avatar) = context.avatars.get_mut(&session_id) else {
                continue;
            };
            match roll_idle_outcome(context.rng, context.tuning) {
                IdleOutcome::Wander => {
                    if let Some(tile) = pick_random_walkable_tile(context.rng, context.grid) {
                        let _ = request_walk(
                            context.grid,
                            context.seats,
                            avatar,
                            record,
                            WalkGoal::Tile(tile),
                        );
                    }
                }
                IdleOutcome::SitAtSeat => {
                    if let Some(seat) = pick_random_free_seat(context.rng, context.seats) {
                        let _ = request_walk(
                            context.grid,
                            context.seats,
                            avatar,
                            record,
                            WalkGoal::Seat(seat),
                        );
                    }
                }
                IdleOutcome::Special => {
                    let action = pick_special_action(context.rng);
                    record.state = BehaviorState::Special;
                    record.special = Some(SpecialTimer {
                        action,
                        remaining_seconds: context.tuning.special_duration_seconds,
                    });
                }
            }
        }
    }

    fn run_special_actions_system(context: &mut BehaviorContext<'_>) {
        let session_ids: Vec<String> = context.records.keys().cloned().collect();
        for session_id in session_ids {
            let Some(record) = context.records.get_mut(&session_id) else {
                continue;
            };
            let Some(special) = record.special.as_mut() else {
                continue;
            };
            special.remaining_seconds -= context.dt_seconds;
            if special.remaining_seconds > 0.0 {
                continue;
            }
            record.special = None;
            let seated = context
                .avatars
                .get(&session_id)
                .is_some_and(|avatar| avatar_is_at_held_seat(avatar, context.seats));
            record.state = if seated {
                BehaviorState::Sitting
            } else {
                BehaviorState::Idle
            };
        }
    }

    fn run_path_follow_system(context: &mut BehaviorContext<'_>) {
        let session_ids: Vec<String> = context.records.keys().cloned().collect();
        for session_id in session_ids {
            let Some(record) = context.records.get_mut(&session_id) else {
                continue;
            };
            if record.state != BehaviorState::Walking {
                continue;
            }
            let Some(avatar) = context.avatars.get_mut(&session_id) else {
                continue;
            };
            let Some(&waypoint) = avatar.path.get(avatar.path_index) else {
                finish_walk(avatar, record, context.seats, context.stage);
                continue;
            };

            record.anim_phase_seconds += context.dt_seconds;
            let target = GridPoint::from_tile(waypoint);
            let (next, reached) = step_toward_grid(
                avatar.position,
                target,
                context.tuning.walk_speed_tiles_per_second,
                context.dt_seconds,
                WAYPOINT_ARRIVAL_THRESHOLD_TILES,
            );
            avatar.position = next;
            context.stage.set_position(avatar.prop, avatar.position);
            if let Some(prop) = context.stage.prop_mut(avatar.prop) {
                prop.offset_y_px = walk_bob_offset_px(record.anim_phase_seconds);
            }

            if reached {
                avatar.path_index += 1;
                if avatar.path_index >= avatar.path.len() {
                    finish_walk(avatar, record, context.seats, context.stage);
                }
            }
        }
    }
}

fn current_badge_sprite(avatar: &Avatar, record: Option<&BehaviorRecord>) -> Option<&'static str> {
    if avatar.departing {
        return None;
    }
    if let Some(badge) = avatar.result_badge {
        return Some(badge.outcome.badge_sprite());
    }
    match record {
        Some(record) if record.working => Some(WORKING_BADGE_SPRITE),
        Some(record) => match record.special {
            Some(special) => Some(special.action.bubble_sprite()),
            None => avatar.indicator.badge_sprite(),
        },
        None => avatar.indicator.badge_sprite(),
    }
}

fn avatar_is_at_held_seat(avatar: &Avatar, seats: &SeatMap) -> bool {
    match avatar.seat {
        Some(seat) => seats.tile_of(seat) == Some(avatar.position.nearest_tile()),
        None => false,
    }
}

/// Issues a movement request, overwriting any walk already in progress.
/// Returns false without changing state when the avatar is working or
/// departing, the goal is invalid or unreachable, or the seat is taken.
fn request_walk(
    grid: &WalkGrid,
    seats: &mut SeatMap,
    avatar: &mut Avatar,
    record: &mut BehaviorRecord,
    goal: WalkGoal,
) -> bool {
    if record.working || avatar.departing {
        return false;
    }
    let goal_tile = match goal {
        WalkGoal::Tile(tile) => tile,
        WalkGoal::Seat(seat) => match seats.tile_of(seat) {
            Some(tile) => tile,
            None => return false,
        },
    };
    let start = avatar.position.nearest_tile();
    let path = grid.find_path(start, goal_tile);
    if path.is_empty() {
        return false;
    }

    match goal {
        WalkGoal::Seat(seat) => {
            if !seats.acquire(seat, &avatar.session_id) {
                return false;
            }
            if let Some(previous) = avatar.seat {
                if previous != seat {
                    seats.release(previous, &avatar.session_id);
                }
            }
            avatar.seat = Some(seat);
        }
        WalkGoal::Tile(_) => {
            // walking away frees the held seat
            if let Some(previous) = avatar.seat.take() {
                seats.release(previous, &avatar.session_id);
            }
        }
    }

    record.special = None;
    record.anim_phase_seconds = 0.0;

    if path.len() == 1 {
        avatar.path.clear();
        avatar.path_index = 0;
        avatar.walk_goal = None;
        record.state = if matches!(goal, WalkGoal::Seat(_)) && avatar_is_at_held_seat(avatar, seats)
        {
            BehaviorState::Sitting
        } else {
            BehaviorState::Idle
        };
        return true;
    }

    avatar.path = path;
    avatar.path_index = 1;
    avatar.walk_goal = Some(goal);
    record.state = BehaviorState::Walking;
    true
}

fn finish_walk(avatar: &mut Avatar, record: &mut BehaviorRecord, seats: &SeatMap, stage: &mut Stage) {
    avatar.path.clear();
    avatar.path_index = 0;
    let was_seat_goal = matches!(avatar.walk_goal, Some(WalkGoal::Seat(_)));
    avatar.walk_goal = None;
    record.anim_phase_seconds = 0.0;
    record.state = if was_seat_goal && avatar_is_at_held_seat(avatar, seats) {
        BehaviorState::Sitting
    } else {
        BehaviorState::Idle
    };
    stage.set_position(avatar.prop, avatar.position);
    if let Some(prop) = stage.prop_mut(avatar.prop) {
        prop.offset_y_px = 0.0;
    }
}

fn sample_idle_threshold(rng: &mut dyn RngCore, tuning: &OfficeTuning) -> f32 {
    let lo = tuning.idle_event_min_seconds.max(0.0);
    let hi = tuning.idle_event_max_seconds.max(lo);
    if hi - lo <= f32::EPSILON {
        lo
    } else {
        rng.gen_range(lo..hi)
    }
}

fn roll_idle_outcome(rng: &mut dyn RngCore, tuning: &OfficeTuning) -> IdleOutcome {
    let total = tuning.wander_weight + tuning.sit_weight + tuning.special_weight;
    if total == 0 {
        return IdleOutcome::Special;
    }
    let roll = rng.gen_range(0..total);
    if roll < tuning.wander_weight {
        IdleOutcome::Wander
    } else if roll < tuning.wander_weight + tuning.sit_weight {
        IdleOutcome::SitAtSeat
    } else {
        IdleOutcome::Special
    }
}

fn pick_special_action(rng: &mut dyn RngCore) -> SpecialAction {
    SpecialAction::ALL[rng.gen_range(0..SpecialAction::ALL.len())]
}

fn pick_random_walkable_tile(rng: &mut dyn RngCore, grid: &WalkGrid) -> Option<GridPos> {
    let mut candidates = Vec::new();
    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            let tile = GridPos::new(x, y);
            if grid.is_walkable(tile) {
                candidates.push(tile);
            }
        }
    }
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[rng.gen_range(0..candidates.len())])
    }
}

fn pick_random_free_seat(rng: &mut dyn RngCore, seats: &SeatMap) -> Option<SeatId> {
    let free = seats.free_seats();
    if free.is_empty() {
        None
    } else {
        Some(free[rng.gen_range(0..free.len())])
    }
}
