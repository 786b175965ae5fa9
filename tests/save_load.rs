use bracket_geometry::prelude::Point;

use tunnelrogue::{
    DungeonConfig, GameError, World,
    data::{items::ItemTemplate, monsters::MonsterTemplate},
    error::PersistenceError,
    map::{Grid, Terrain, persistence},
};

fn config() -> DungeonConfig {
    DungeonConfig {
        width: 80,
        height: 24,
        min_rooms: 4,
        max_rooms: 6,
        max_room_width: 12,
        max_room_height: 6,
        min_monsters: 2,
        max_monsters: 4,
        ..DungeonConfig::default()
    }
}

fn world(seed: u64) -> World {
    World::new(config(), MonsterTemplate::builtin(), ItemTemplate::builtin(), seed).unwrap()
}

fn hardness(grid: &Grid) -> Vec<u8> {
    grid.cells().iter().map(|cell| cell.hardness).collect()
}

#[test]
fn saved_level_reloads_into_another_game() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dungeon");
    let original = world(21);
    original.save(&path).unwrap();

    let mut other = world(22);
    other.load_level(&path).unwrap();

    assert_eq!(hardness(other.grid()), hardness(original.grid()));
    let bounds = |grid: &Grid| {
        grid.rooms
            .iter()
            .map(|room| (room.start, room.end))
            .collect::<Vec<_>>()
    };
    assert_eq!(bounds(other.grid()), bounds(original.grid()));
    assert!(other.grid().rooms[0].contains(other.player_point()));
    assert!(other.monster_count() >= 2);

    // stairs are not stored, so the loader lays out fresh ones
    let stairs = other
        .grid()
        .cells()
        .iter()
        .filter(|cell| cell.terrain.is_stair())
        .count();
    assert_eq!(stairs, other.grid().rooms.len());
}

#[test]
fn file_starts_with_marker_and_version() {
    let original = world(3);
    let bytes = persistence::encode(original.grid()).unwrap();
    assert_eq!(&bytes[..12], persistence::FILE_MARKER);
    assert_eq!(&bytes[12..16], &0u32.to_be_bytes());
    let total = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    assert_eq!(total as usize, bytes.len());
    assert_eq!(bytes.len(), 20 + 80 * 24 + 4 * original.grid().rooms.len());
}

#[test]
fn loading_a_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut game = world(4);
    let result = game.load_level(dir.path().join("absent"));
    assert!(matches!(
        result,
        Err(GameError::Persistence(PersistenceError::Io(_)))
    ));
}

#[test]
fn level_without_rooms_cannot_be_played() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("solid");
    let mut solid = Grid::new(80, 24);
    solid.carve(Point::new(5, 5), Terrain::Corridor);
    persistence::save_to_path(&solid, &path).unwrap();

    let mut game = world(5);
    let result = game.load_level(&path);
    assert!(matches!(result, Err(GameError::Generation(_))));
}
