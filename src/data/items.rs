use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::RGB;
use serde::{Deserialize, Serialize};

use super::{dice::Dice, named_color};
use crate::error::TemplateError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub symbol: char,
    pub color: String,
    pub weight: Dice,
    pub value: Dice,
}

#[derive(Clone, Debug)]
pub struct ItemSpawn {
    pub name: String,
    pub description: String,
    pub glyph: char,
    pub color: RGB,
    pub weight: i32,
    pub value: i32,
}

impl ItemTemplate {
    pub fn builtin() -> Vec<Self> {
        vec![
            ItemTemplate::new(
                "Short Sword",
                "A notched blade, still sharp enough.",
                '|',
                "WHITE",
                Dice::new(8, 1, 4),
                Dice::new(20, 2, 10),
            ),
            ItemTemplate::new(
                "Leather Cap",
                "Keeps falling pebbles off your head.",
                '(',
                "YELLOW",
                Dice::new(2, 1, 2),
                Dice::new(5, 1, 10),
            ),
            ItemTemplate::new(
                "Lantern",
                "Pushes the dark back a few paces.",
                '_',
                "YELLOW",
                Dice::new(4, 0, 0),
                Dice::new(15, 1, 6),
            ),
            ItemTemplate::new(
                "Healing Draught",
                "Tastes of moss and copper.",
                '!',
                "RED",
                Dice::new(1, 0, 0),
                Dice::new(25, 2, 6),
            ),
            ItemTemplate::new(
                "Gold Coins",
                "A handful of tarnished coins.",
                '$',
                "YELLOW",
                Dice::new(0, 1, 2),
                Dice::new(10, 4, 10),
            ),
        ]
    }

    pub fn from_json(text: &str) -> Result<Vec<Self>, TemplateError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn instantiate(&self, rng: &mut RandomNumberGenerator) -> ItemSpawn {
        ItemSpawn {
            name: self.name.clone(),
            description: self.description.clone(),
            glyph: self.symbol,
            color: named_color(&self.color),
            weight: self.weight.roll(rng).max(0),
            value: self.value.roll(rng).max(0),
        }
    }

    fn new(
        name: &str,
        description: &str,
        symbol: char,
        color: &str,
        weight: Dice,
        value: Dice,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            symbol,
            color: color.to_string(),
            weight,
            value,
        }
    }
}
