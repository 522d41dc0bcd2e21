const FNV1A_OFFSET_BASIS_64: u64 = 0xcbf2_9ce4_8422_2325;
const FNV1A_PRIME_64: u64 = 0x0000_0100_0000_01b3;

fn fnv1a_hash(value: &str) -> u64 {
    let mut hash = FNV1A_OFFSET_BASIS_64;
    for byte in value.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV1A_PRIME_64);
    }
    hash
}

/// Stable look per session: the same id always hashes to the same sprite
/// variant, across restarts and machines.
fn appearance_variant(session_id: &str) -> u8 {
    (fnv1a_hash(session_id) % AVATAR_VARIANT_COUNT) as u8
}

fn avatar_sprite_key(variant: u8) -> String {
    format!("avatars/worker_{variant}")
}

/// Floor plan legend: `#` wall, `.` floor, `D` desk (blocks walking),
/// `c` chair/seat, `E` entrance. Row 0 is grid y = 0.
const FLOOR_PLAN: [&str; 12] = [
    "####################",
    "#..................#",
    "#.Dc.Dc..#..Dc.Dc..#",
    "#........#.........#",
    "#.Dc.Dc..#..Dc.Dc..#",
    "#........#.........#",
    "#...####.#.####....#",
    "#..................#",
    "#.Dc.Dc....Dc.Dc...#",
    "#..................#",
    "E..................#",
    "####################",
];

#[derive(Debug)]
struct OfficeLayout {
    grid: WalkGrid,
    entrance: GridPos,
    seat_tiles: Vec<GridPos>,
    desk_tiles: Vec<GridPos>,
    wall_tiles: Vec<GridPos>,
    floor_tiles: Vec<GridPos>,
}

fn build_office_layout() -> Result<OfficeLayout, String> {
    parse_floor_plan(&FLOOR_PLAN)
}

fn parse_floor_plan(plan: &[&str]) -> Result<OfficeLayout, String> {
    let mut rows: Vec<Vec<bool>> = Vec::with_capacity(plan.len());
    let mut entrance = None;
    let mut seat_tiles = Vec::new();
    let mut desk_tiles = Vec::new();
    let mut wall_tiles = Vec::new();
    let mut floor_tiles = Vec::new();

    for (y, line) in plan.iter().enumerate() {
        let mut row = Vec::with_capacity(line.len());
        for (x, cell) in line.chars().enumerate() {
            let tile = GridPos::new(x as i32, y as i32);
            let walkable = match cell {
                '#' => {
                    wall_tiles.push(tile);
                    false
                }
                'D' => {
                    desk_tiles.push(tile);
                    false
                }
                'c' => {
                    seat_tiles.push(tile);
                    true
                }
                'E' => {
                    if entrance.replace(tile).is_some() {
                        return Err(format!(
                            "floor plan has more than one entrance (second at {x},{y})"
                        ));
                    }
                    true
                }
                '.' => true,
                other => {
                    return Err(format!("unknown floor plan cell '{other}' at {x},{y}"));
                }
            };
            if walkable {
                floor_tiles.push(tile);
            }
            row.push(walkable);
        }
        rows.push(row);
    }

    let grid = WalkGrid::from_rows(&rows).map_err(|error| format!("bad floor plan: {error}"))?;
    let entrance = entrance.ok_or_else(|| "floor plan has no entrance".to_string())?;
    Ok(OfficeLayout {
        grid,
        entrance,
        seat_tiles,
        desk_tiles,
        wall_tiles,
        floor_tiles,
    })
}

/// Constant-speed step toward a target grid point, snapping to the target
/// once within the arrival threshold. Returns the new position and whether
/// the target was reached this step.
fn step_toward_grid(
    current: GridPoint,
    target: GridPoint,
    speed_tiles_per_second: f32,
    dt_seconds: f32,
    arrival_threshold: f32,
) -> (GridPoint, bool) {
    let dx = target.gx - current.gx;
    let dy = target.gy - current.gy;
    let distance_sq = dx * dx + dy * dy;
    if distance_sq <= arrival_threshold * arrival_threshold {
        return (target, true);
    }

    let distance = distance_sq.sqrt();
    let max_step = speed_tiles_per_second * dt_seconds;
    if max_step >= distance {
        return (target, true);
    }

    let inv_distance = distance.recip();
    (
        GridPoint {
            gx: current.gx + dx * inv_distance * max_step,
            gy: current.gy + dy * inv_distance * max_step,
        },
        false,
    )
}

fn walk_bob_offset_px(phase_seconds: f32) -> f32 {
    (phase_seconds * WALK_BOB_FREQUENCY_HZ * std::f32::consts::TAU)
        .sin()
        .abs()
        * WALK_BOB_AMPLITUDE_PX
}

fn cursor_distance_px(a: Vec2, b: Vec2) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}
