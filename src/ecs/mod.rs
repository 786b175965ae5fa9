pub mod components;
pub mod resources;
pub mod systems;

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::{RGB, WHITE};
use specs::prelude::{
    Builder, Dispatcher, DispatcherBuilder, Entity, Join, World as SpecsWorld, WorldExt,
};
use tracing::debug;

use crate::{
    ai::MonsterView,
    combat::{AttackProfile, BASE_HIT_CHANCE, DefenseProfile},
    data::{items::ItemSpawn, monsters::MonsterSpawn},
};

use self::{
    components::{
        Actor, CombatStats, Inventory, Item, Monster, MonsterTag, PLAYER_BASE_SPEED,
        PLAYER_DAMAGE, PLAYER_HITPOINTS, PlayerStats, PlayerTag, Position, Regeneration,
        Renderable,
    },
    resources::{Clock, EventLog, RegenRates},
    systems::RegenerationSystem,
};

/// Every actor and item, stored as `specs` components. Entities double as the
/// identity tokens held by the scheduler and the grid.
pub struct ActorTable {
    specs_world: SpecsWorld,
    dispatcher: Dispatcher<'static, 'static>,
    player: Entity,
}

impl ActorTable {
    pub fn new(spawn: Point, rates: RegenRates) -> Self {
        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        specs_world.insert(Clock::default());
        specs_world.insert(rates);
        specs_world.insert(EventLog::default());
        let player = Self::spawn_player(&mut specs_world, spawn);
        let dispatcher = DispatcherBuilder::new()
            .with(RegenerationSystem, "regeneration", &[])
            .build();

        Self {
            specs_world,
            dispatcher,
            player,
        }
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Position>();
        world.register::<Renderable>();
        world.register::<Actor>();
        world.register::<CombatStats>();
        world.register::<Regeneration>();
        world.register::<PlayerStats>();
        world.register::<PlayerTag>();
        world.register::<Monster>();
        world.register::<MonsterTag>();
        world.register::<Item>();
        world.register::<Inventory>();
    }

    fn spawn_player(world: &mut SpecsWorld, spawn: Point) -> Entity {
        world
            .create_entity()
            .with(Position { point: spawn })
            .with(Renderable {
                glyph: b'@' as u16,
                color: RGB::named(WHITE),
                order: 2,
            })
            .with(Actor {
                speed: PLAYER_BASE_SPEED,
            })
            .with(CombatStats {
                max_hp: PLAYER_HITPOINTS,
                hp: PLAYER_HITPOINTS,
                damage: PLAYER_DAMAGE,
                hit_chance: BASE_HIT_CHANCE,
                dodge_chance: 0,
                defense: 0,
            })
            .with(Regeneration::default())
            .with(PlayerStats::default())
            .with(Inventory::default())
            .with(PlayerTag)
            .build()
    }

    /// Runs the regeneration pass at `tick`.
    pub fn advance(&mut self, tick: u64) {
        self.specs_world.write_resource::<Clock>().tick = tick;
        self.dispatcher.dispatch(&self.specs_world);
        self.specs_world.maintain();
    }

    pub fn player_entity(&self) -> Entity {
        self.player
    }

    pub fn is_player(&self, entity: Entity) -> bool {
        entity == self.player
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.specs_world.is_alive(entity)
            && self
                .specs_world
                .read_component::<CombatStats>()
                .get(entity)
                .is_some_and(CombatStats::is_alive)
    }

    pub fn position(&self, entity: Entity) -> Option<Point> {
        self.specs_world
            .read_component::<Position>()
            .get(entity)
            .map(|pos| pos.point)
    }

    pub fn set_position(&mut self, entity: Entity, point: Point) {
        let mut positions = self.specs_world.write_component::<Position>();
        if let Some(pos) = positions.get_mut(entity) {
            pos.point = point;
        } else if let Err(err) = positions.insert(entity, Position { point }) {
            debug!(?err, "position for a deleted entity dropped");
        }
    }

    pub fn player_point(&self) -> Point {
        self.position(self.player).unwrap_or(Point::new(0, 0))
    }

    pub fn spawn_monster(&mut self, spawn: &MonsterSpawn, point: Point, tick: u64) -> Entity {
        let entity = self
            .specs_world
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: spawn.glyph as u16,
                color: spawn.color,
                order: 1,
            })
            .with(Actor { speed: spawn.speed })
            .with(CombatStats::monster(spawn.hitpoints, spawn.damage))
            .with(Regeneration {
                last_tick: tick,
                ..Regeneration::default()
            })
            .with(Monster {
                name: spawn.name.clone(),
                description: spawn.description.clone(),
                abilities: spawn.abilities,
                last_known_player: None,
                experience: spawn.experience,
            })
            .with(MonsterTag)
            .build();
        debug!(name = %spawn.name, x = point.x, y = point.y, "spawned monster");
        entity
    }

    pub fn spawn_item(&mut self, spawn: &ItemSpawn, point: Point) -> Entity {
        self.specs_world
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: spawn.glyph as u16,
                color: spawn.color,
                order: 0,
            })
            .with(Item {
                name: spawn.name.clone(),
                description: spawn.description.clone(),
                weight: spawn.weight,
                value: spawn.value,
            })
            .build()
    }

    pub fn delete(&mut self, entity: Entity) {
        if entity == self.player {
            return;
        }
        if let Err(err) = self.specs_world.delete_entity(entity) {
            debug!(?err, "entity was already deleted");
        }
    }

    /// Removes monsters and floor items. Carried items and the player survive.
    pub fn clear_level(&mut self) {
        let doomed: Vec<Entity> = {
            let entities = self.specs_world.entities();
            let monsters = self.specs_world.read_component::<MonsterTag>();
            let items = self.specs_world.read_component::<Item>();
            let positions = self.specs_world.read_component::<Position>();
            (&entities)
                .join()
                .filter(|entity| {
                    monsters.contains(*entity)
                        || (items.contains(*entity) && positions.contains(*entity))
                })
                .collect()
        };
        // every entity came from the live join above
        for entity in doomed {
            if let Err(err) = self.specs_world.delete_entity(entity) {
                debug!(?err, "entity was already deleted");
            }
        }
        self.specs_world.maintain();
    }

    pub fn monsters(&self) -> Vec<Entity> {
        let entities = self.specs_world.entities();
        let tags = self.specs_world.read_component::<MonsterTag>();
        (&entities, &tags).join().map(|(entity, _)| entity).collect()
    }

    pub fn monster_count(&self) -> usize {
        self.monsters().len()
    }

    pub fn monster(&self, entity: Entity) -> Option<Monster> {
        self.specs_world
            .read_component::<Monster>()
            .get(entity)
            .cloned()
    }

    pub fn monster_view(&self, entity: Entity) -> Option<MonsterView> {
        let monster = self.monster(entity)?;
        Some(MonsterView {
            position: self.position(entity)?,
            abilities: monster.abilities,
            last_known_player: monster.last_known_player,
        })
    }

    pub fn remember_player(&mut self, entity: Entity, last_known: Option<Point>) {
        if let Some(monster) = self
            .specs_world
            .write_component::<Monster>()
            .get_mut(entity)
        {
            monster.last_known_player = last_known;
        }
    }

    pub fn name(&self, entity: Entity) -> String {
        if entity == self.player {
            return "you".to_string();
        }
        self.monster(entity)
            .map(|monster| monster.name)
            .unwrap_or_else(|| "something".to_string())
    }

    /// Effective speed; the player's includes dexterity and gear.
    pub fn speed(&self, entity: Entity) -> Option<i32> {
        let base = self
            .specs_world
            .read_component::<Actor>()
            .get(entity)?
            .speed;
        let players = self.specs_world.read_component::<PlayerStats>();
        Some(match players.get(entity) {
            Some(stats) => stats.speed(base),
            None => base,
        })
    }

    pub fn combat_stats(&self, entity: Entity) -> Option<CombatStats> {
        self.specs_world
            .read_component::<CombatStats>()
            .get(entity)
            .cloned()
    }

    pub fn attack_profile(&self, entity: Entity) -> Option<AttackProfile> {
        let stats = self.combat_stats(entity)?;
        let players = self.specs_world.read_component::<PlayerStats>();
        Some(match players.get(entity) {
            Some(player) => player.attack(&stats),
            None => AttackProfile {
                hit_chance: stats.hit_chance,
                damage: stats.damage,
                bonus: 0,
            },
        })
    }

    pub fn defense_profile(&self, entity: Entity) -> Option<DefenseProfile> {
        let stats = self.combat_stats(entity)?;
        let players = self.specs_world.read_component::<PlayerStats>();
        Some(match players.get(entity) {
            Some(player) => player.defense(),
            None => DefenseProfile {
                dodge_chance: stats.dodge_chance,
                defense: stats.defense,
            },
        })
    }

    pub fn player_ranged_profile(&self) -> Option<AttackProfile> {
        let stats = self.combat_stats(self.player)?;
        self.player_stats().ranged_attack(&stats)
    }

    pub fn player_fireball_profile(&self) -> Option<AttackProfile> {
        let stats = self.combat_stats(self.player)?;
        Some(self.player_stats().fireball(&stats))
    }

    /// Restores hitpoints up to the maximum and returns the new total.
    pub fn heal(&mut self, entity: Entity, amount: i32) -> Option<i32> {
        let mut stats = self.specs_world.write_component::<CombatStats>();
        let stat = stats.get_mut(entity)?;
        stat.hp = (stat.hp + amount.max(0)).min(stat.max_hp);
        Some(stat.hp)
    }

    /// Subtracts hitpoints and returns what is left.
    pub fn apply_damage(&mut self, entity: Entity, amount: i32) -> Option<i32> {
        let mut stats = self.specs_world.write_component::<CombatStats>();
        let stat = stats.get_mut(entity)?;
        stat.hp -= amount.max(0);
        Some(stat.hp)
    }

    pub fn player_stats(&self) -> PlayerStats {
        self.specs_world
            .read_component::<PlayerStats>()
            .get(self.player)
            .cloned()
            .unwrap_or_default()
    }

    /// Mutates the player's progression record in place.
    pub fn with_player_stats<R>(&mut self, f: impl FnOnce(&mut PlayerStats) -> R) -> Option<R> {
        let mut players = self.specs_world.write_component::<PlayerStats>();
        players.get_mut(self.player).map(f)
    }

    pub fn player_hitpoints(&self) -> i32 {
        self.combat_stats(self.player).map_or(0, |stats| stats.hp)
    }

    /// Moves a floor item into the player's pack. False when the pack is full.
    pub fn pick_up(&mut self, item: Entity) -> bool {
        {
            let mut inventories = self.specs_world.write_component::<Inventory>();
            let Some(inventory) = inventories.get_mut(self.player) else {
                return false;
            };
            if inventory.is_full() {
                return false;
            }
            inventory.items.push(item);
        }
        self.specs_world.write_component::<Position>().remove(item);
        true
    }

    pub fn inventory(&self) -> Vec<Entity> {
        self.specs_world
            .read_component::<Inventory>()
            .get(self.player)
            .map(|inventory| inventory.items.clone())
            .unwrap_or_default()
    }

    pub fn item_name(&self, entity: Entity) -> Option<String> {
        self.specs_world
            .read_component::<Item>()
            .get(entity)
            .map(|item| item.name.clone())
    }

    pub fn each_renderable<F>(&self, include_player: bool, mut f: F)
    where
        F: FnMut(Point, &Renderable),
    {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        let renderables = self.specs_world.read_component::<Renderable>();
        let players = self.specs_world.read_component::<PlayerTag>();
        let mut visible: Vec<(Point, &Renderable)> = (&entities, &positions, &renderables)
            .join()
            .filter(|(entity, _, _)| include_player || !players.contains(*entity))
            .map(|(_, pos, renderable)| (pos.point, renderable))
            .collect();
        visible.sort_by_key(|(_, renderable)| renderable.order);
        for (point, renderable) in visible {
            f(point, renderable);
        }
    }

    pub fn log<S: Into<String>>(&mut self, entry: S) {
        self.specs_world.write_resource::<EventLog>().push(entry);
    }

    pub fn drain_events(&mut self) -> Vec<String> {
        self.specs_world.write_resource::<EventLog>().drain()
    }
}

#[cfg(test)]
mod tests {
    use bracket_random::prelude::RandomNumberGenerator;

    use super::*;
    use crate::data::{items::ItemTemplate, monsters::MonsterTemplate};

    fn table() -> ActorTable {
        ActorTable::new(Point::new(3, 3), RegenRates::default())
    }

    #[test]
    fn player_starts_with_defaults() {
        let actors = table();
        let player = actors.player_entity();
        assert_eq!(actors.player_point(), Point::new(3, 3));
        assert_eq!(actors.speed(player), Some(PLAYER_BASE_SPEED));
        assert_eq!(actors.player_hitpoints(), PLAYER_HITPOINTS);
        assert_eq!(actors.player_stats().stamina.current, 50);
        assert!(actors.is_alive(player));
    }

    #[test]
    fn monsters_are_tracked_and_cleared() {
        let mut actors = table();
        let mut rng = RandomNumberGenerator::seeded(1);
        let spawn = MonsterTemplate::builtin()[0].instantiate(&mut rng).unwrap();
        let monster = actors.spawn_monster(&spawn, Point::new(5, 5), 0);
        let item = ItemTemplate::builtin()[0].instantiate(&mut rng);
        let on_floor = actors.spawn_item(&item, Point::new(6, 6));
        let carried = actors.spawn_item(&item, Point::new(4, 4));
        assert!(actors.pick_up(carried));

        assert_eq!(actors.monsters(), vec![monster]);
        assert_eq!(actors.name(monster), spawn.name);
        assert_eq!(actors.speed(monster), Some(spawn.speed));

        actors.clear_level();
        assert_eq!(actors.monster_count(), 0);
        assert!(!actors.is_alive(monster));
        assert!(actors.item_name(on_floor).is_none());
        assert_eq!(actors.inventory(), vec![carried]);
    }

    #[test]
    fn damage_kills() {
        let mut actors = table();
        let mut rng = RandomNumberGenerator::seeded(1);
        let spawn = MonsterTemplate::builtin()[0].instantiate(&mut rng).unwrap();
        let monster = actors.spawn_monster(&spawn, Point::new(5, 5), 0);
        let left = actors.apply_damage(monster, spawn.hitpoints).unwrap();
        assert_eq!(left, 0);
        assert!(!actors.is_alive(monster));
    }

    #[test]
    fn regeneration_runs_through_dispatcher() {
        let mut actors = table();
        let player = actors.player_entity();
        actors.apply_damage(player, 100);
        actors.with_player_stats(|stats| stats.stamina.current = 0);
        actors.advance(1_100);
        // 16.5 hp and 27.5 stamina owed; the halves stay in the carry
        assert_eq!(actors.player_hitpoints(), 66);
        assert_eq!(actors.player_stats().stamina.current, 27);
    }

    #[test]
    fn healing_stops_at_maximum() {
        let mut actors = table();
        let player = actors.player_entity();
        actors.apply_damage(player, 20);
        assert_eq!(actors.heal(player, 5), Some(PLAYER_HITPOINTS - 15));
        assert_eq!(actors.heal(player, 500), Some(PLAYER_HITPOINTS));
    }

    #[test]
    fn events_drain_once() {
        let mut actors = table();
        actors.log("hello");
        assert_eq!(actors.drain_events(), vec!["hello".to_string()]);
        assert!(actors.drain_events().is_empty());
    }
}
