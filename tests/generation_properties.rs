use std::collections::VecDeque;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use proptest::prelude::*;

use tunnelrogue::{
    DungeonConfig,
    map::{
        FieldKind, Grid, IMMUTABLE_HARDNESS, UNREACHABLE,
        distance::{self, tunneling_cost},
        generator,
    },
};

fn roomy_config() -> DungeonConfig {
    DungeonConfig {
        width: 100,
        height: 50,
        min_rooms: 6,
        max_rooms: 8,
        max_room_width: 14,
        max_room_height: 9,
        ..DungeonConfig::default()
    }
}

fn build(seed: u64) -> Grid {
    let mut rng = RandomNumberGenerator::seeded(seed);
    generator::generate(&roomy_config(), &mut rng).expect("layout fits")
}

/// Open cells reachable from `start` through 8-way steps.
fn flood(grid: &Grid, start: Point) -> Vec<bool> {
    let mut seen = vec![false; grid.cells().len()];
    let mut queue = VecDeque::from([start]);
    if let Some(idx) = grid.idx(start) {
        seen[idx] = true;
    }
    while let Some(point) = queue.pop_front() {
        for next in grid.neighbors(point) {
            let idx = grid.idx(next).unwrap();
            if !seen[idx] && grid.is_open(next) {
                seen[idx] = true;
                queue.push_back(next);
            }
        }
    }
    seen
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn rooms_fit_and_keep_their_distance(seed in any::<u64>()) {
        let config = roomy_config();
        let grid = build(seed);
        prop_assert!(grid.rooms.len() >= config.min_rooms);
        prop_assert!(grid.rooms.len() <= config.max_rooms);
        for (i, room) in grid.rooms.iter().enumerate() {
            prop_assert!(room.width() >= config.min_room_width);
            prop_assert!(room.height() >= config.min_room_height);
            prop_assert!(room.start.x >= 1 && room.start.y >= 1);
            prop_assert!(room.end.x <= grid.width() - 2 && room.end.y <= grid.height() - 2);
            for other in &grid.rooms[i + 1..] {
                prop_assert!(!room.crowds(other));
            }
            for point in room.points() {
                prop_assert!(grid.is_open(point));
            }
        }
    }

    #[test]
    fn border_is_immutable_and_interior_is_not(seed in any::<u64>()) {
        let grid = build(seed);
        for cell in grid.cells() {
            if grid.is_border(cell.point) {
                prop_assert_eq!(cell.hardness, IMMUTABLE_HARDNESS);
            } else {
                prop_assert!(cell.hardness < IMMUTABLE_HARDNESS);
            }
        }
    }

    #[test]
    fn every_room_is_reachable(seed in any::<u64>()) {
        let grid = build(seed);
        let seen = flood(&grid, grid.rooms[0].center());
        for room in &grid.rooms {
            let idx = grid.idx(room.center()).unwrap();
            prop_assert!(seen[idx]);
        }
    }

    #[test]
    fn distance_fields_are_consistent(seed in any::<u64>()) {
        let mut grid = build(seed);
        let source = grid.rooms[0].center();
        distance::refresh(&mut grid, source);
        let walking = distance::compute(&grid, source, FieldKind::NonTunneling);
        let digging = distance::compute(&grid, source, FieldKind::Tunneling);

        for cell in grid.cells() {
            let idx = grid.idx(cell.point).unwrap();
            // stored values match a fresh computation
            prop_assert_eq!(cell.non_tunneling_distance, walking[idx]);
            prop_assert_eq!(cell.tunneling_distance, digging[idx]);

            if grid.is_border(cell.point) {
                prop_assert_eq!(digging[idx], UNREACHABLE);
                continue;
            }
            prop_assert!(digging[idx] != UNREACHABLE);
            prop_assert!(digging[idx] <= walking[idx]);
            if !cell.is_open() {
                prop_assert_eq!(walking[idx], UNREACHABLE);
            }

            if walking[idx] != UNREACHABLE && walking[idx] > 0 {
                let predecessor = grid
                    .neighbors(cell.point)
                    .map(|n| walking[grid.idx(n).unwrap()])
                    .any(|before| before != UNREACHABLE && before + 1 == walking[idx]);
                prop_assert!(predecessor);
            }
            if digging[idx] > 0 {
                let entry = tunneling_cost(cell.hardness).unwrap();
                let predecessor = grid.neighbors(cell.point).any(|n| {
                    let before = digging[grid.idx(n).unwrap()];
                    before != UNREACHABLE && before + entry == digging[idx]
                });
                prop_assert!(predecessor);
            }
        }
    }
}

#[test]
fn same_seed_same_level() {
    let first = build(99);
    let second = build(99);
    assert_eq!(first.rooms, second.rooms);
    let hardness = |grid: &Grid| grid.cells().iter().map(|c| c.hardness).collect::<Vec<_>>();
    assert_eq!(hardness(&first), hardness(&second));
}
