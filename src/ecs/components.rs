use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::RGB;
use specs::prelude::{Component, Entity, NullStorage, VecStorage};

use crate::{
    ai::Abilities,
    combat::{AttackProfile, BASE_HIT_CHANCE, DefenseProfile, experience_for_next_level},
    data::dice::Dice,
    input::Skill,
};

pub const PLAYER_BASE_SPEED: i32 = 30;
pub const PLAYER_HITPOINTS: i32 = 150;
pub const PLAYER_STAMINA: i32 = 50;
pub const PLAYER_MAGIC: i32 = 50;
pub const PLAYER_DAMAGE: Dice = Dice::new(0, 1, 10);
pub const PLAYER_BASE_DODGE: i32 = 5;
pub const INVENTORY_CAPACITY: usize = 10;
pub const FIREBALL_DAMAGE: Dice = Dice::new(10, 2, 6);
pub const HEALING_AMOUNT: i32 = 30;
pub const TELEPORT_COST: i32 = 50;

#[derive(Clone, Debug)]
pub struct Position {
    pub point: Point,
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Renderable {
    pub glyph: u16,
    pub color: RGB,
    pub order: i32,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Actor {
    /// Base speed; the player's effective speed also folds in skills and gear.
    pub speed: i32,
}

impl Component for Actor {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct CombatStats {
    pub max_hp: i32,
    pub hp: i32,
    pub damage: Dice,
    pub hit_chance: i32,
    pub dodge_chance: i32,
    pub defense: i32,
}

impl CombatStats {
    pub fn monster(hitpoints: i32, damage: Dice) -> Self {
        Self {
            max_hp: hitpoints,
            hp: hitpoints,
            damage,
            hit_chance: BASE_HIT_CHANCE,
            dodge_chance: 0,
            defense: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

impl Component for CombatStats {
    type Storage = VecStorage<Self>;
}

/// Tick of the last regeneration pass plus the fractional points owed since.
#[derive(Clone, Debug, Default)]
pub struct Regeneration {
    pub last_tick: u64,
    pub health_carry: f64,
    pub stamina_carry: f64,
    pub magic_carry: f64,
}

impl Component for Regeneration {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourcePool {
    pub current: i32,
    pub max: i32,
}

impl ResourcePool {
    pub fn full(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn spend(&mut self, amount: i32) -> bool {
        if amount > self.current {
            return false;
        }
        self.current -= amount;
        true
    }

    pub fn restore(&mut self, amount: i32) {
        self.current = (self.current + amount).min(self.max);
    }
}

/// Bonuses from whatever the player has equipped. Equipment itself is managed
/// outside the simulation core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Gear {
    pub weapon: Option<Dice>,
    /// Bow, sling or the like; without one the player cannot shoot.
    pub ranged: Option<Dice>,
    pub damage_bonus: i32,
    pub hit_bonus: i32,
    pub dodge_bonus: i32,
    pub defense_bonus: i32,
    pub speed_bonus: i32,
    pub light_bonus: i32,
}

#[derive(Clone, Debug)]
pub struct PlayerStats {
    pub level: i32,
    pub experience: i32,
    pub skill_points: i32,
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub stamina: ResourcePool,
    pub magic: ResourcePool,
    pub gear: Gear,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0,
            skill_points: 0,
            strength: 0,
            dexterity: 0,
            intelligence: 0,
            stamina: ResourcePool::full(PLAYER_STAMINA),
            magic: ResourcePool::full(PLAYER_MAGIC),
            gear: Gear::default(),
        }
    }
}

impl PlayerStats {
    pub fn speed(&self, base: i32) -> i32 {
        (base + 5 * self.dexterity + self.gear.speed_bonus).max(1)
    }

    pub fn attack(&self, base: &CombatStats) -> AttackProfile {
        AttackProfile {
            hit_chance: base.hit_chance + self.gear.hit_bonus,
            damage: self.gear.weapon.unwrap_or(base.damage),
            bonus: 5 * self.strength + self.gear.damage_bonus,
        }
    }

    /// Shooting uses the ranged weapon's dice plus 5 per point of dexterity.
    pub fn ranged_attack(&self, base: &CombatStats) -> Option<AttackProfile> {
        Some(AttackProfile {
            hit_chance: base.hit_chance + self.gear.hit_bonus,
            damage: self.gear.ranged?,
            bonus: 5 * self.dexterity,
        })
    }

    pub fn fireball(&self, base: &CombatStats) -> AttackProfile {
        AttackProfile {
            hit_chance: base.hit_chance + self.gear.hit_bonus,
            damage: FIREBALL_DAMAGE,
            bonus: 5 * self.intelligence,
        }
    }

    pub fn defense(&self) -> DefenseProfile {
        DefenseProfile {
            dodge_chance: PLAYER_BASE_DODGE + 2 * self.dexterity + self.gear.dodge_bonus,
            defense: self.gear.defense_bonus,
        }
    }

    pub fn light_radius(&self, base: i32) -> i32 {
        base + (f64::from(self.intelligence) * 1.5).ceil() as i32 + self.gear.light_bonus
    }

    /// Largest bonus an intelligent player can skim off each experience award.
    pub fn experience_bonus_cap(&self) -> i32 {
        self.intelligence.max(0) * 5
    }

    /// Adds experience, levelling up as often as the total allows. Returns the
    /// number of levels gained.
    pub fn add_experience(&mut self, amount: i32) -> i32 {
        self.experience += amount.max(0);
        let mut gained = 0;
        loop {
            let needed = experience_for_next_level(self.level);
            if self.experience < needed {
                break;
            }
            self.experience -= needed;
            self.level += 1;
            self.skill_points += 1;
            gained += 1;
        }
        gained
    }

    pub fn train(&mut self, skill: Skill) -> bool {
        if self.skill_points <= 0 {
            return false;
        }
        match skill {
            Skill::Strength => self.strength += 1,
            Skill::Dexterity => self.dexterity += 1,
            Skill::Intelligence => self.intelligence += 1,
        }
        self.skill_points -= 1;
        true
    }
}

impl Component for PlayerStats {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Monster {
    pub name: String,
    pub description: String,
    pub abilities: Abilities,
    pub last_known_player: Option<Point>,
    /// Awarded to the player on the kill.
    pub experience: i32,
}

impl Component for Monster {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Item {
    pub name: String,
    pub description: String,
    pub weight: i32,
    pub value: i32,
}

impl Component for Item {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, Default)]
pub struct Inventory {
    pub items: Vec<Entity>,
}

impl Inventory {
    pub fn is_full(&self) -> bool {
        self.items.len() >= INVENTORY_CAPACITY
    }
}

impl Component for Inventory {
    type Storage = VecStorage<Self>;
}

#[derive(Default)]
pub struct PlayerTag;

impl Component for PlayerTag {
    type Storage = NullStorage<Self>;
}

#[derive(Default)]
pub struct MonsterTag;

impl Component for MonsterTag {
    type Storage = NullStorage<Self>;
}
