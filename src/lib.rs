//! Simulation core of a tunnelling dungeon crawler: level generation, distance
//! fields, the turn queue, monster behaviour and melee combat.

pub mod ai;
pub mod combat;
pub mod config;
pub mod data;
pub mod ecs;
pub mod error;
pub mod input;
pub mod logging;
pub mod map;
pub mod scheduler;
pub mod scripted_input;
pub mod world;

pub use config::DungeonConfig;
pub use error::GameError;
pub use world::{StepOutcome, World};
