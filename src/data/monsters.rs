use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::RGB;
use serde::{Deserialize, Serialize};

use super::{dice::Dice, named_color};
use crate::{
    ai::Abilities,
    error::{ActorError, TemplateError},
};

/// Immutable monster description; `instantiate` rolls a live monster from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub symbol: char,
    pub color: String,
    pub speed: Dice,
    pub hitpoints: Dice,
    pub damage: Dice,
    pub abilities: Abilities,
    pub experience: Dice,
}

/// Rolled stats for one monster, ready to be placed on the board.
#[derive(Clone, Debug)]
pub struct MonsterSpawn {
    pub name: String,
    pub description: String,
    pub glyph: char,
    pub color: RGB,
    pub speed: i32,
    pub hitpoints: i32,
    pub damage: Dice,
    pub abilities: Abilities,
    pub experience: i32,
}

impl MonsterTemplate {
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::new(
                "Cave Rat",
                'r',
                "YELLOW",
                Dice::new(8, 1, 4),
                Dice::new(4, 1, 6),
                Dice::new(0, 1, 4),
                Abilities::empty(),
                Dice::new(2, 1, 4),
            ),
            Self::new(
                "Kobold Scout",
                'k',
                "GREEN",
                Dice::new(10, 1, 6),
                Dice::new(8, 2, 4),
                Dice::new(1, 1, 6),
                Abilities::INTELLIGENT,
                Dice::new(4, 2, 4),
            ),
            Self::new(
                "Whisper Shade",
                'S',
                "MAGENTA",
                Dice::new(6, 1, 4),
                Dice::new(10, 2, 6),
                Dice::new(0, 2, 4),
                Abilities::TELEPATHIC,
                Dice::new(6, 2, 6),
            ),
            Self::new(
                "Rock Borer",
                'w',
                "WHITE",
                Dice::new(5, 1, 3),
                Dice::new(20, 2, 8),
                Dice::new(2, 1, 8),
                Abilities::TUNNELING,
                Dice::new(8, 2, 6),
            ),
            Self::new(
                "Giddy Bat",
                'b',
                "CYAN",
                Dice::new(15, 1, 10),
                Dice::new(3, 1, 4),
                Dice::new(0, 1, 3),
                Abilities::ERRATIC,
                Dice::new(1, 1, 4),
            ),
            Self::new(
                "Mind Flayer",
                'f',
                "BLUE",
                Dice::new(8, 2, 4),
                Dice::new(30, 3, 10),
                Dice::new(4, 2, 6),
                Abilities::INTELLIGENT | Abilities::TELEPATHIC,
                Dice::new(20, 4, 6),
            ),
            Self::new(
                "Umber Hulk",
                'U',
                "RED",
                Dice::new(6, 1, 6),
                Dice::new(40, 4, 10),
                Dice::new(6, 3, 6),
                Abilities::TELEPATHIC | Abilities::TUNNELING,
                Dice::new(30, 5, 6),
            ),
            Self::new(
                "Mad Delver",
                'd',
                "YELLOW",
                Dice::new(9, 1, 6),
                Dice::new(15, 2, 6),
                Dice::new(2, 2, 4),
                Abilities::INTELLIGENT | Abilities::TUNNELING | Abilities::ERRATIC,
                Dice::new(10, 2, 8),
            ),
            Self::new(
                "Spawn of the Deep",
                'D',
                "MAGENTA",
                Dice::new(10, 2, 5),
                Dice::new(60, 5, 10),
                Dice::new(8, 3, 8),
                Abilities::all(),
                Dice::new(50, 5, 10),
            ),
        ]
    }

    /// Parses a JSON array of templates.
    pub fn from_json(text: &str) -> Result<Vec<Self>, TemplateError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn instantiate(&self, rng: &mut RandomNumberGenerator) -> Result<MonsterSpawn, ActorError> {
        let speed = self.speed.roll(rng);
        if speed <= 0 {
            return Err(ActorError::NonPositiveSpeed {
                name: self.name.clone(),
                speed,
            });
        }
        let hitpoints = self.hitpoints.roll(rng);
        if hitpoints <= 0 {
            return Err(ActorError::NonPositiveHitpoints {
                name: self.name.clone(),
                hitpoints,
            });
        }
        Ok(MonsterSpawn {
            name: self.name.clone(),
            description: self.description.clone(),
            glyph: self.symbol,
            color: named_color(&self.color),
            speed,
            hitpoints,
            damage: self.damage,
            abilities: self.abilities,
            experience: self.experience.roll(rng).max(0),
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn new(
        name: &str,
        symbol: char,
        color: &str,
        speed: Dice,
        hitpoints: Dice,
        damage: Dice,
        abilities: Abilities,
        experience: Dice,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            symbol,
            color: color.to_string(),
            speed,
            hitpoints,
            damage,
            abilities,
            experience,
        }
    }
}
