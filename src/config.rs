use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_MAP_WIDTH: i32 = 160;
pub const DEFAULT_MAP_HEIGHT: i32 = 105;

/// Tunables for level generation, population and regeneration.
///
/// Every field has a default so a JSON file only needs to name what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    pub width: i32,
    pub height: i32,
    pub min_rooms: usize,
    pub max_rooms: usize,
    pub min_room_width: i32,
    pub max_room_width: i32,
    pub min_room_height: i32,
    pub max_room_height: i32,
    /// Rejection-sampling budget for a single room.
    pub max_placement_attempts: u32,
    pub min_monsters: usize,
    pub max_monsters: usize,
    pub min_items: usize,
    pub max_items: usize,
    pub health_regen_rate: f64,
    pub stamina_regen_rate: f64,
    pub magic_regen_rate: f64,
    pub light_radius: i32,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_MAP_WIDTH,
            height: DEFAULT_MAP_HEIGHT,
            min_rooms: 25,
            max_rooms: 40,
            min_room_width: 7,
            max_room_width: 20,
            min_room_height: 5,
            max_room_height: 15,
            max_placement_attempts: 10_000,
            min_monsters: 5,
            max_monsters: 25,
            min_items: 20,
            max_items: 40,
            health_regen_rate: 0.0001,
            stamina_regen_rate: 0.0005,
            magic_regen_rate: 0.0002,
            light_radius: 5,
        }
    }
}

impl DungeonConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(3..=255).contains(&self.width) || !(3..=255).contains(&self.height) {
            return Err(ConfigError::BoardSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.min_room_width < 1 || self.min_room_height < 1 {
            return Err(ConfigError::Zero("minimum room size"));
        }
        // rooms sit strictly inside the immutable border ring
        if self.min_room_width + 2 > self.width || self.min_room_height + 2 > self.height {
            return Err(ConfigError::RoomTooLarge {
                room_width: self.min_room_width,
                room_height: self.min_room_height,
                width: self.width,
                height: self.height,
            });
        }
        check_range(
            "room width",
            self.min_room_width as i64,
            self.max_room_width as i64,
        )?;
        check_range(
            "room height",
            self.min_room_height as i64,
            self.max_room_height as i64,
        )?;
        check_range("rooms", self.min_rooms as i64, self.max_rooms as i64)?;
        check_range(
            "monsters",
            self.min_monsters as i64,
            self.max_monsters as i64,
        )?;
        check_range("items", self.min_items as i64, self.max_items as i64)?;
        if self.min_rooms == 0 {
            return Err(ConfigError::Zero("min_rooms"));
        }
        if self.max_placement_attempts == 0 {
            return Err(ConfigError::Zero("max_placement_attempts"));
        }
        for (field, value) in [
            ("health_regen_rate", self.health_regen_rate),
            ("stamina_regen_rate", self.stamina_regen_rate),
            ("magic_regen_rate", self.magic_regen_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::RegenRate { field, value });
            }
        }
        Ok(())
    }

    /// Largest room that can still fit inside the border.
    pub fn clamped_room_width(&self) -> i32 {
        self.max_room_width.min(self.width - 2)
    }

    pub fn clamped_room_height(&self) -> i32 {
        self.max_room_height.min(self.height - 2)
    }
}

fn check_range(field: &'static str, min: i64, max: i64) -> Result<(), ConfigError> {
    if min > max {
        Err(ConfigError::InvertedRange { field, min, max })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        DungeonConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = DungeonConfig::from_json(r#"{ "min_rooms": 3, "max_rooms": 4 }"#).unwrap();
        assert_eq!(config.min_rooms, 3);
        assert_eq!(config.width, DEFAULT_MAP_WIDTH);
    }

    #[test]
    fn oversized_room_minimum_is_fatal() {
        let config = DungeonConfig {
            width: 8,
            height: 8,
            ..DungeonConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RoomTooLarge { .. })
        ));
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let config = DungeonConfig {
            min_monsters: 9,
            max_monsters: 2,
            ..DungeonConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange {
                field: "monsters",
                ..
            })
        ));
    }

    #[test]
    fn negative_regen_rate_is_rejected() {
        let config = DungeonConfig {
            magic_regen_rate: -1.0,
            ..DungeonConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
