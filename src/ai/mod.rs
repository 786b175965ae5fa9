pub mod movement;

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{error::TemplateError, map::FieldKind};

pub use movement::{MonsterAction, MonsterTurn, MonsterView, displacement_target, take_turn};

bitflags! {
    /// Monster capability mask. The raw bits are the monster's decimal type, 0 to 15.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Abilities: u8 {
        /// Remembers where it last saw the player.
        const INTELLIGENT = 0b0001;
        /// Always knows where the player is.
        const TELEPATHIC = 0b0010;
        /// Digs through rock.
        const TUNNELING = 0b0100;
        /// Half of its turns are spent stumbling about.
        const ERRATIC = 0b1000;
    }
}

const ABILITY_NAMES: [(&str, Abilities); 4] = [
    ("SMART", Abilities::INTELLIGENT),
    ("TELE", Abilities::TELEPATHIC),
    ("TUNNEL", Abilities::TUNNELING),
    ("ERRATIC", Abilities::ERRATIC),
];

/// Template abilities with no effect on movement.
const PASSIVE_ABILITIES: [&str; 5] = ["PASS", "PICKUP", "DESTROY", "UNIQ", "BOSS"];

impl Abilities {
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, TemplateError> {
        let mut abilities = Abilities::empty();
        for name in names {
            let name = name.as_ref().trim();
            if let Some((_, flag)) = ABILITY_NAMES.iter().find(|(known, _)| *known == name) {
                abilities |= *flag;
            } else if !PASSIVE_ABILITIES.contains(&name) {
                return Err(TemplateError::Ability(name.to_string()));
            }
        }
        Ok(abilities)
    }

    pub fn names(&self) -> Vec<&'static str> {
        ABILITY_NAMES
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn decimal_type(&self) -> u8 {
        self.bits()
    }
}

impl Serialize for Abilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.names().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Abilities {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Abilities::from_names(&names).map_err(de::Error::custom)
    }
}

/// What the monster knows about the player this turn, before telepathy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Awareness {
    Visible,
    Remembered,
    Unaware,
}

impl Awareness {
    pub const ALL: [Awareness; 3] = [Awareness::Visible, Awareness::Remembered, Awareness::Unaware];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Goal {
    /// One step to a random neighbour; rock counts when `tunneling`.
    Wander { tunneling: bool },
    /// Straight step toward the player's current cell.
    Player,
    /// Straight step toward the remembered sighting.
    LastKnown,
    /// Downhill on the player distance field.
    Field(FieldKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub goal: Goal,
    /// Store the player's cell as the last known sighting.
    pub remember_player: bool,
}

impl Decision {
    fn new(goal: Goal) -> Self {
        Self {
            goal,
            remember_player: false,
        }
    }
}

/// The behaviour table. `erratic_roll` is the coin flip an erratic monster makes each
/// turn; it is ignored for monsters without the flag.
pub fn decide(abilities: Abilities, awareness: Awareness, erratic_roll: bool) -> Decision {
    let intelligent = abilities.contains(Abilities::INTELLIGENT);
    let tunneling = abilities.contains(Abilities::TUNNELING);

    if abilities.contains(Abilities::ERRATIC) && erratic_roll {
        return Decision::new(Goal::Wander { tunneling: false });
    }

    if abilities.contains(Abilities::TELEPATHIC) {
        if intelligent {
            let field = if tunneling {
                FieldKind::Tunneling
            } else {
                FieldKind::NonTunneling
            };
            return Decision::new(Goal::Field(field));
        }
        return Decision::new(Goal::Player);
    }

    match awareness {
        Awareness::Visible => Decision {
            goal: Goal::Player,
            remember_player: intelligent,
        },
        Awareness::Remembered if intelligent => Decision::new(Goal::LastKnown),
        _ => Decision::new(Goal::Wander { tunneling }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_type_matches_flag_sum() {
        assert_eq!(Abilities::empty().decimal_type(), 0);
        assert_eq!(Abilities::INTELLIGENT.decimal_type(), 1);
        assert_eq!(
            (Abilities::TELEPATHIC | Abilities::TUNNELING).decimal_type(),
            6
        );
        assert_eq!(Abilities::all().decimal_type(), 15);
        for bits in 0..16u8 {
            assert!(Abilities::from_bits(bits).is_some());
        }
    }

    #[test]
    fn names_round_trip_through_json() {
        let abilities = Abilities::INTELLIGENT | Abilities::ERRATIC;
        let json = serde_json::to_string(&abilities).unwrap();
        assert_eq!(json, r#"["SMART","ERRATIC"]"#);
        let back: Abilities = serde_json::from_str(&json).unwrap();
        assert_eq!(back, abilities);
    }

    #[test]
    fn passive_names_are_ignored_and_unknown_rejected() {
        assert_eq!(
            Abilities::from_names(&["BOSS", "TELE", "UNIQ"]).unwrap(),
            Abilities::TELEPATHIC
        );
        assert!(matches!(
            Abilities::from_names(&["GHOST"]),
            Err(TemplateError::Ability(name)) if name == "GHOST"
        ));
    }

    /// Walks all 16 masks against every awareness state and both coin outcomes.
    #[test]
    fn behaviour_table_is_total() {
        for bits in 0..16u8 {
            let abilities = Abilities::from_bits_truncate(bits);
            let intelligent = abilities.contains(Abilities::INTELLIGENT);
            let telepathic = abilities.contains(Abilities::TELEPATHIC);
            let tunneling = abilities.contains(Abilities::TUNNELING);
            let erratic = abilities.contains(Abilities::ERRATIC);

            for awareness in Awareness::ALL {
                for roll in [false, true] {
                    let decision = decide(abilities, awareness, roll);
                    if erratic && roll {
                        assert_eq!(decision.goal, Goal::Wander { tunneling: false });
                        assert!(!decision.remember_player);
                        continue;
                    }
                    let expected = match (telepathic, intelligent, awareness) {
                        (true, true, _) if tunneling => Goal::Field(FieldKind::Tunneling),
                        (true, true, _) => Goal::Field(FieldKind::NonTunneling),
                        (true, false, _) => Goal::Player,
                        (false, _, Awareness::Visible) => Goal::Player,
                        (false, true, Awareness::Remembered) => Goal::LastKnown,
                        _ => Goal::Wander { tunneling },
                    };
                    assert_eq!(decision.goal, expected, "mask {bits} {awareness:?}");
                    assert_eq!(
                        decision.remember_player,
                        !telepathic && intelligent && awareness == Awareness::Visible
                    );
                }
            }
        }
    }

    #[test]
    fn non_erratic_monsters_ignore_the_coin() {
        for awareness in Awareness::ALL {
            assert_eq!(
                decide(Abilities::INTELLIGENT, awareness, true),
                decide(Abilities::INTELLIGENT, awareness, false)
            );
        }
    }
}
