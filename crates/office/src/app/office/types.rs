/// One worker session as reported by the external session directory. The
/// office only consumes these records; it never fetches or stores them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: String,
    pub name: String,
    pub status: String,
}

impl SessionRecord {
    pub fn new(id: &str, name: &str, status: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            status: status.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIndicator {
    Idle,
    Working,
    Error,
    Offline,
}

impl StatusIndicator {
    /// Unknown status strings degrade to `Idle` rather than erroring; the
    /// directory's vocabulary is not under this crate's control.
    fn from_session_status(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "working" | "busy" | "running" => Self::Working,
            "error" | "failed" => Self::Error,
            "offline" | "disconnected" | "stale" => Self::Offline,
            _ => Self::Idle,
        }
    }

    fn badge_sprite(self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::Working => Some(WORKING_BADGE_SPRITE),
            Self::Error => Some("badges/error"),
            Self::Offline => Some("badges/offline"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Success,
    Failure,
}

impl RequestOutcome {
    fn badge_sprite(self) -> &'static str {
        match self {
            Self::Success => "badges/request_ok",
            Self::Failure => "badges/request_failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ResultBadge {
    outcome: RequestOutcome,
    remaining_seconds: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeatId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seat {
    pub id: SeatId,
    pub tile: GridPos,
}

/// Seat occupancy. The occupant entries and each avatar's `seat` field are
/// kept in agreement by routing every acquisition and release through this
/// map inside a single frame's update pass.
#[derive(Debug, Default)]
pub struct SeatMap {
    tiles: Vec<GridPos>,
    occupants: Vec<Option<String>>,
}

impl SeatMap {
    fn from_tiles(tiles: Vec<GridPos>) -> Self {
        let occupants = vec![None; tiles.len()];
        Self { tiles, occupants }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Seat> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(|(index, tile)| Seat {
                id: SeatId(index),
                tile: *tile,
            })
    }

    pub fn tile_of(&self, seat: SeatId) -> Option<GridPos> {
        self.tiles.get(seat.0).copied()
    }

    pub fn occupant(&self, seat: SeatId) -> Option<&str> {
        self.occupants.get(seat.0).and_then(|slot| slot.as_deref())
    }

    pub fn is_free(&self, seat: SeatId) -> bool {
        matches!(self.occupants.get(seat.0), Some(None))
    }

    pub fn free_seats(&self) -> Vec<SeatId> {
        self.occupants
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(index, _)| SeatId(index))
            .collect()
    }

    /// Claims the seat for a session. Succeeds if the seat is free or
    /// already held by the same session; never displaces another holder.
    fn acquire(&mut self, seat: SeatId, session_id: &str) -> bool {
        let Some(slot) = self.occupants.get_mut(seat.0) else {
            return false;
        };
        match slot {
            None => {
                *slot = Some(session_id.to_string());
                true
            }
            Some(holder) => holder == session_id,
        }
    }

    /// Frees the seat only if this session actually holds it.
    fn release(&mut self, seat: SeatId, session_id: &str) -> bool {
        let Some(slot) = self.occupants.get_mut(seat.0) else {
            return false;
        };
        if slot.as_deref() == Some(session_id) {
            *slot = None;
            true
        } else {
            false
        }
    }

    fn release_all_for(&mut self, session_id: &str) {
        for slot in &mut self.occupants {
            if slot.as_deref() == Some(session_id) {
                *slot = None;
            }
        }
    }

    fn clear_occupants(&mut self) {
        for slot in &mut self.occupants {
            *slot = None;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorState {
    Idle,
    Walking,
    Sitting,
    Working,
    Special,
}

impl BehaviorState {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Walking => "walking",
            Self::Sitting => "sitting",
            Self::Working => "working",
            Self::Special => "special",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialAction {
    Stretch,
    SipCoffee,
    CheckPhone,
    Wave,
}

impl SpecialAction {
    const ALL: [SpecialAction; 4] = [
        SpecialAction::Stretch,
        SpecialAction::SipCoffee,
        SpecialAction::CheckPhone,
        SpecialAction::Wave,
    ];

    fn bubble_sprite(self) -> &'static str {
        match self {
            Self::Stretch => "actions/stretch",
            Self::SipCoffee => "actions/coffee",
            Self::CheckPhone => "actions/phone",
            Self::Wave => "actions/wave",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SpecialTimer {
    action: SpecialAction,
    remaining_seconds: f32,
}

/// Per-avatar simulation state, owned by the behavior systems. The visual
/// side of an avatar lives on its stage prop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorRecord {
    state: BehaviorState,
    idle_elapsed_seconds: f32,
    idle_threshold_seconds: f32,
    working: bool,
    special: Option<SpecialTimer>,
    anim_phase_seconds: f32,
}

impl BehaviorRecord {
    fn new_idle(idle_threshold_seconds: f32) -> Self {
        Self {
            state: BehaviorState::Idle,
            idle_elapsed_seconds: 0.0,
            idle_threshold_seconds,
            working: false,
            special: None,
            anim_phase_seconds: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkGoal {
    Tile(GridPos),
    Seat(SeatId),
}

#[derive(Debug)]
struct Avatar {
    session_id: String,
    display_name: String,
    variant: u8,
    prop: PropId,
    position: GridPoint,
    path: Vec<GridPos>,
    path_index: usize,
    walk_goal: Option<WalkGoal>,
    seat: Option<SeatId>,
    indicator: StatusIndicator,
    result_badge: Option<ResultBadge>,
    departing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfficeEvent {
    AvatarClicked { session_id: String },
}

/// Outbound notifications for the host, drained once per frame after the
/// update pass. This replaces any page-global event side channel with a
/// queue the host owns the read side of.
#[derive(Debug, Default)]
pub struct OfficeEventBus {
    events: Vec<OfficeEvent>,
}

impl OfficeEventBus {
    fn emit(&mut self, event: OfficeEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<OfficeEvent> {
        std::mem::take(&mut self.events)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdleOutcome {
    Wander,
    SitAtSeat,
    Special,
}

/// Behavior tuning. Every duration, weight, and speed an idle avatar uses
/// comes from here so the state machine shape never changes when the feel
/// of the office is re-tuned.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OfficeTuning {
    pub walk_speed_tiles_per_second: f32,
    pub idle_event_min_seconds: f32,
    pub idle_event_max_seconds: f32,
    pub wander_weight: u32,
    pub sit_weight: u32,
    pub special_weight: u32,
    pub special_duration_seconds: f32,
    pub result_badge_seconds: f32,
    pub spawn_pop_seconds: f32,
    pub exit_fade_seconds: f32,
    pub camera_smoothing: f32,
}

impl Default for OfficeTuning {
    fn default() -> Self {
        Self {
            walk_speed_tiles_per_second: 2.6,
            idle_event_min_seconds: 4.0,
            idle_event_max_seconds: 11.0,
            wander_weight: 30,
            sit_weight: 30,
            special_weight: 40,
            special_duration_seconds: 2.2,
            result_badge_seconds: 1.5,
            spawn_pop_seconds: 0.35,
            exit_fade_seconds: 0.45,
            camera_smoothing: 0.18,
        }
    }
}
