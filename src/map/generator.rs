use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use tracing::{debug, info};

use super::{Grid, IMMUTABLE_HARDNESS, Room, Terrain};
use crate::{config::DungeonConfig, data::dice::roll_between, error::GenerationError};

/// Builds a fresh level: random rock, `min_rooms..=max_rooms` rooms joined in a ring of
/// corridors, a sealed border and one stair per room.
pub fn generate(
    config: &DungeonConfig,
    rng: &mut RandomNumberGenerator,
) -> Result<Grid, GenerationError> {
    config.validate()?;
    let mut grid = Grid::new(config.width, config.height);
    randomize_rock(&mut grid, rng);

    let requested = roll_between(rng, config.min_rooms as i32, config.max_rooms as i32) as usize;
    place_rooms(&mut grid, config, requested, rng)?;
    connect_rooms(&mut grid, rng);
    grid.seal_border();
    place_stairs(&mut grid, rng);

    info!(
        width = grid.width(),
        height = grid.height(),
        rooms = grid.rooms.len(),
        "generated dungeon"
    );
    Ok(grid)
}

/// Interior rock hardness is uniform in `1..=254`.
fn randomize_rock(grid: &mut Grid, rng: &mut RandomNumberGenerator) {
    for y in 1..grid.height() - 1 {
        for x in 1..grid.width() - 1 {
            let hardness = rng.range(1, i32::from(IMMUTABLE_HARDNESS)) as u8;
            grid.set_hardness(Point::new(x, y), hardness);
        }
    }
}

fn place_rooms(
    grid: &mut Grid,
    config: &DungeonConfig,
    requested: usize,
    rng: &mut RandomNumberGenerator,
) -> Result<(), GenerationError> {
    let max_width = config.clamped_room_width();
    let max_height = config.clamped_room_height();

    for _ in 0..requested {
        let mut placed = None;
        for _ in 0..config.max_placement_attempts {
            let width = roll_between(rng, config.min_room_width, max_width);
            let height = roll_between(rng, config.min_room_height, max_height);
            let x = roll_between(rng, 1, grid.width() - 1 - width);
            let y = roll_between(rng, 1, grid.height() - 1 - height);
            let candidate = Room::with_size(x, y, width, height);
            if fits(grid, &candidate) {
                placed = Some(candidate);
                break;
            }
        }
        match placed {
            Some(room) => grid.add_room(room),
            None => {
                return Err(GenerationError::RoomPlacement {
                    placed: grid.rooms.len(),
                    requested,
                    attempts: config.max_placement_attempts,
                });
            }
        }
    }
    debug!(rooms = grid.rooms.len(), "rooms placed");
    Ok(())
}

fn fits(grid: &Grid, candidate: &Room) -> bool {
    let inside = candidate.start.x >= 1
        && candidate.start.y >= 1
        && candidate.end.x <= grid.width() - 2
        && candidate.end.y <= grid.height() - 2;
    inside && grid.rooms.iter().all(|room| !room.crowds(candidate))
}

/// Room `i` is joined to room `i + 1`, wrapping, by a staircase walk between centres.
fn connect_rooms(grid: &mut Grid, rng: &mut RandomNumberGenerator) {
    let count = grid.rooms.len();
    if count < 2 {
        return;
    }
    for i in 0..count {
        let from = grid.rooms[i].center();
        let to = grid.rooms[(i + 1) % count].center();
        carve_corridor(grid, from, to, rng);
    }
}

fn carve_corridor(grid: &mut Grid, from: Point, to: Point, rng: &mut RandomNumberGenerator) {
    let mut cursor = from;
    while cursor != to {
        let dx = (to.x - cursor.x).signum();
        let dy = (to.y - cursor.y).signum();
        let close_x = match (dx, dy) {
            (0, _) => false,
            (_, 0) => true,
            _ => rng.range(0, 2) == 0,
        };
        if close_x {
            cursor.x += dx;
        } else {
            cursor.y += dy;
        }
        if grid.terrain(cursor) == Some(Terrain::Rock) {
            grid.carve(cursor, Terrain::Corridor);
        }
    }
}

/// One stair per room: up stairs in the first half of the room list, down stairs in
/// the second.
pub fn place_stairs(grid: &mut Grid, rng: &mut RandomNumberGenerator) {
    let half = grid.rooms.len() / 2;
    for index in 0..grid.rooms.len() {
        let room = grid.rooms[index];
        let floor: Vec<Point> = room
            .points()
            .filter(|point| {
                grid.terrain(*point) == Some(Terrain::Room) && grid.monster_at(*point).is_none()
            })
            .collect();
        if floor.is_empty() {
            continue;
        }
        let point = floor[rng.range(0, floor.len() as i32) as usize];
        let stair = if index < half {
            Terrain::UpStair
        } else {
            Terrain::DownStair
        };
        grid.carve(point, stair);
    }
}
