use std::collections::{BTreeMap, HashSet};

use engine::{
    grid_to_screen, Easing, GridPoint, GridPos, IsoCamera, PointerSnapshot, PropId, PropLayer,
    PropVisual, Scene, Stage, TweenSet, Vec2, WalkGrid,
};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use tracing::{debug, info, warn};

const AVATAR_VARIANT_COUNT: u64 = 8;
const WAYPOINT_ARRIVAL_THRESHOLD_TILES: f32 = 0.05;
const CLICK_SLOP_PX: f32 = 4.0;
const WALK_BOB_AMPLITUDE_PX: f32 = 2.5;
const WALK_BOB_FREQUENCY_HZ: f32 = 3.2;
const TWEEN_CHANNEL_SCALE: u16 = 0;
const TWEEN_CHANNEL_ALPHA: u16 = 1;
const WORKING_BADGE_SPRITE: &str = "badges/working";
const BEHAVIOR_SYSTEM_ORDER_TEXT: &str = "Indicators>IdleEvents>SpecialActions>PathFollow";

include!("types.rs");
include!("behavior.rs");
include!("scene_state.rs");
include!("scene_impl.rs");
include!("util.rs");
