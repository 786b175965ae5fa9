use bracket_random::prelude::RandomNumberGenerator;

use crate::data::dice::{Dice, percent_check, roll_between};

pub const BASE_HIT_CHANCE: i32 = 70;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackProfile {
    /// Percent chance to connect.
    pub hit_chance: i32,
    pub damage: Dice,
    /// Flat damage added to every connecting roll.
    pub bonus: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DefenseProfile {
    /// Percent chance to evade outright.
    pub dodge_chance: i32,
    pub defense: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackOutcome {
    Dodged,
    Missed,
    Hit { rolled: i32, damage: i32 },
}

impl AttackOutcome {
    pub fn damage_dealt(&self) -> i32 {
        match self {
            AttackOutcome::Hit { damage, .. } => *damage,
            _ => 0,
        }
    }
}

pub fn resolve_attack(
    attacker: &AttackProfile,
    defender: &DefenseProfile,
    rng: &mut RandomNumberGenerator,
) -> AttackOutcome {
    let rolled = roll_damage(attacker, rng);
    strike(attacker, rolled, defender, rng)
}

pub fn roll_damage(attacker: &AttackProfile, rng: &mut RandomNumberGenerator) -> i32 {
    attacker.damage.roll(rng) + attacker.bonus
}

/// Lands an already rolled blow: dodge, then hit roll, then `rolled` less a
/// mitigation drawn from `[defense / 2, defense]`. Never negative.
pub fn strike(
    attacker: &AttackProfile,
    rolled: i32,
    defender: &DefenseProfile,
    rng: &mut RandomNumberGenerator,
) -> AttackOutcome {
    if defender.dodge_chance > 0 && percent_check(rng, defender.dodge_chance) {
        return AttackOutcome::Dodged;
    }
    if !percent_check(rng, attacker.hit_chance) {
        return AttackOutcome::Missed;
    }
    let damage = mitigate(rolled, defender.defense, rng);
    AttackOutcome::Hit { rolled, damage }
}

/// Stamina a player spends to swing for `rolled` damage.
pub fn stamina_cost(rolled: i32) -> i32 {
    (rolled.max(0) + 1) / 2
}

pub fn mitigate(raw: i32, defense: i32, rng: &mut RandomNumberGenerator) -> i32 {
    let defense = defense.max(0);
    let absorbed = roll_between(rng, defense / 2, defense);
    (raw - absorbed).max(0)
}

/// Experience needed to leave `level`.
pub fn experience_for_next_level(level: i32) -> i32 {
    (20.0 * f64::from(level + 1).powf(0.6)).ceil() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sure_hit(damage: Dice) -> AttackProfile {
        AttackProfile {
            hit_chance: 100,
            damage,
            bonus: 0,
        }
    }

    #[test]
    fn undefended_hit_never_exceeds_roll() {
        let mut rng = RandomNumberGenerator::seeded(17);
        let attacker = sure_hit(Dice::fixed(9));
        for _ in 0..200 {
            let outcome = resolve_attack(&attacker, &DefenseProfile::default(), &mut rng);
            assert_eq!(outcome, AttackOutcome::Hit { rolled: 9, damage: 9 });
        }
    }

    #[test]
    fn guaranteed_miss_deals_nothing() {
        let mut rng = RandomNumberGenerator::seeded(17);
        let attacker = AttackProfile {
            hit_chance: 0,
            ..sure_hit(Dice::fixed(50))
        };
        for _ in 0..100 {
            let outcome = resolve_attack(&attacker, &DefenseProfile::default(), &mut rng);
            assert_eq!(outcome, AttackOutcome::Missed);
            assert_eq!(outcome.damage_dealt(), 0);
        }
    }

    #[test]
    fn perfect_dodge_evades() {
        let mut rng = RandomNumberGenerator::seeded(2);
        let defender = DefenseProfile {
            dodge_chance: 100,
            defense: 0,
        };
        let outcome = resolve_attack(&sure_hit(Dice::fixed(5)), &defender, &mut rng);
        assert_eq!(outcome, AttackOutcome::Dodged);
    }

    #[test]
    fn defense_absorbs_half_to_full() {
        let mut rng = RandomNumberGenerator::seeded(30);
        for _ in 0..200 {
            let damage = mitigate(20, 10, &mut rng);
            assert!((10..=15).contains(&damage));
        }
        assert_eq!(mitigate(3, 10, &mut rng), 0);
    }

    #[test]
    fn stamina_cost_rounds_up() {
        assert_eq!(stamina_cost(7), 4);
        assert_eq!(stamina_cost(8), 4);
        assert_eq!(stamina_cost(0), 0);
    }

    #[test]
    fn level_curve() {
        assert_eq!(experience_for_next_level(1), 31);
        assert_eq!(experience_for_next_level(2), 39);
        assert!(experience_for_next_level(10) > experience_for_next_level(9));
    }
}
