use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("board {width}x{height} is outside the supported 3..=255 range")]
    BoardSize { width: i32, height: i32 },
    #[error("minimum room {room_width}x{room_height} does not fit on a {width}x{height} board")]
    RoomTooLarge {
        room_width: i32,
        room_height: i32,
        width: i32,
        height: i32,
    },
    #[error("{field}: minimum {min} exceeds maximum {max}")]
    InvertedRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("regeneration rate {field} = {value} is not a finite non-negative number")]
    RegenRate { field: &'static str, value: f64 },
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("placed {placed} of {requested} rooms before giving up after {attempts} attempts")]
    RoomPlacement {
        placed: usize,
        requested: usize,
        attempts: u32,
    },
    #[error("dungeon has no rooms to place the player in")]
    NoRooms,
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("dungeon file i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("unrecognised file marker {0:?}")]
    BadMarker(String),
    #[error("unsupported dungeon version {0}")]
    UnsupportedVersion(u32),
    #[error("header declares {declared} bytes but file holds {actual}")]
    SizeMismatch { declared: u32, actual: usize },
    #[error("file too short: expected at least {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("room section of {0} bytes is not a whole number of 4-byte records")]
    RoomSection(usize),
    #[error("room {index} does not fit inside the board")]
    RoomOutOfBounds { index: usize },
    #[error("board {width}x{height} cannot be stored in the dungeon format")]
    Unrepresentable { width: i32, height: i32 },
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("malformed dice string {0:?}, expected base+NdS")]
    Dice(String),
    #[error("unknown monster ability {0:?}")]
    Ability(String),
    #[error("failed to parse templates: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ActorError {
    #[error("{name} rolled speed {speed}; speed must be positive")]
    NonPositiveSpeed { name: String, speed: i32 },
    #[error("{name} rolled {hitpoints} hitpoints; hitpoints must be positive")]
    NonPositiveHitpoints { name: String, hitpoints: i32 },
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("extract_min called on an empty scheduler")]
    Empty,
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Actor(#[from] ActorError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error("no monster templates available to populate the level")]
    NoTemplates,
    #[error("scheduled actor {0} no longer exists")]
    StaleActor(String),
}
