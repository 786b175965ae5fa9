use std::path::Path;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use specs::Entity;
use tracing::{debug, info, trace};

use crate::{
    ai::{self, MonsterAction},
    combat::{self, AttackOutcome, AttackProfile},
    config::DungeonConfig,
    data::{
        dice::{Dice, roll_between},
        items::ItemTemplate,
        monsters::MonsterTemplate,
    },
    ecs::{
        ActorTable,
        components::{HEALING_AMOUNT, PlayerStats, Renderable, TELEPORT_COST},
        resources::RegenRates,
    },
    error::{GameError, GenerationError},
    input::{Command, CommandSource, Direction, Skill, Spell},
    map::{
        Grid, Terrain,
        distance,
        generator::{self, place_stairs},
        persistence, sight,
    },
    scheduler::{TurnScheduler, turn_delay},
};

const STAIR_EXPERIENCE: Dice = Dice::new(0, 5, 3);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    PlayerDied,
    /// Every monster on the level is dead.
    Victory,
    Quit,
    LevelChanged,
}

impl StepOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepOutcome::PlayerDied | StepOutcome::Victory | StepOutcome::Quit
        )
    }
}

/// The whole simulation: board, actors, turn queue and the shared random stream.
pub struct World {
    config: DungeonConfig,
    grid: Grid,
    actors: ActorTable,
    scheduler: TurnScheduler,
    rng: RandomNumberGenerator,
    monster_templates: Vec<MonsterTemplate>,
    item_templates: Vec<ItemTemplate>,
    tick: u64,
    depth: i32,
    distances_dirty: bool,
}

impl World {
    pub fn new(
        config: DungeonConfig,
        monster_templates: Vec<MonsterTemplate>,
        item_templates: Vec<ItemTemplate>,
        seed: u64,
    ) -> Result<Self, GameError> {
        config.validate()?;
        let mut rng = RandomNumberGenerator::seeded(seed);
        let grid = generator::generate(&config, &mut rng)?;
        Self::from_grid(config, monster_templates, item_templates, grid, rng)
    }

    /// Starts a game on a prepared board, placing the player, monsters and items.
    pub fn from_grid(
        config: DungeonConfig,
        monster_templates: Vec<MonsterTemplate>,
        item_templates: Vec<ItemTemplate>,
        grid: Grid,
        rng: RandomNumberGenerator,
    ) -> Result<Self, GameError> {
        if monster_templates.is_empty() {
            return Err(GameError::NoTemplates);
        }
        let actors = ActorTable::new(Point::new(0, 0), RegenRates::from_config(&config));
        let mut world = Self {
            config,
            grid,
            actors,
            scheduler: TurnScheduler::new(),
            rng,
            monster_templates,
            item_templates,
            tick: 0,
            depth: 1,
            distances_dirty: false,
        };
        world.populate()?;
        Ok(world)
    }

    pub fn generate_level(&mut self) -> Result<(), GameError> {
        self.grid = generator::generate(&self.config, &mut self.rng)?;
        self.populate()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GameError> {
        persistence::save_to_path(&self.grid, path)?;
        Ok(())
    }

    /// Replaces the level with one read from disk and repopulates it.
    pub fn load_level<P: AsRef<Path>>(&mut self, path: P) -> Result<(), GameError> {
        let mut grid = persistence::load_from_path(path, self.config.width, self.config.height)?;
        if grid.rooms.is_empty() {
            return Err(GenerationError::NoRooms.into());
        }
        place_stairs(&mut grid, &mut self.rng);
        self.grid = grid;
        self.populate()
    }

    fn populate(&mut self) -> Result<(), GameError> {
        let Some(start_room) = self.grid.rooms.first().copied() else {
            return Err(GenerationError::NoRooms.into());
        };
        self.scheduler.clear();
        self.actors.clear_level();

        let player = self.actors.player_entity();
        let spawn = start_room.random_point(&mut self.rng);
        self.actors.set_position(player, spawn);
        self.scheduler.insert(player, self.tick);
        self.grid.rooms[0].explored = true;
        self.refresh_distances();

        let monsters = self.spawn_monsters(spawn)?;
        let items = self.spawn_items(spawn);
        info!(depth = self.depth, monsters, items, "level populated");
        Ok(())
    }

    fn spawn_monsters(&mut self, player: Point) -> Result<usize, GameError> {
        let player_room = self.grid.room_index_containing(player);
        let mut open: Vec<Point> = self
            .grid
            .open_points()
            .into_iter()
            .filter(|point| *point != player)
            .collect();
        let outside: Vec<Point> = open
            .iter()
            .copied()
            .filter(|point| {
                player_room.is_none() || self.grid.room_index_containing(*point) != player_room
            })
            .collect();
        if !outside.is_empty() {
            open = outside;
        }

        let wanted = roll_between(
            &mut self.rng,
            self.config.min_monsters as i32,
            self.config.max_monsters as i32,
        ) as usize;
        let mut placed = 0;
        for _ in 0..wanted {
            if open.is_empty() {
                break;
            }
            let point = open.swap_remove(self.rng.range(0, open.len() as i32) as usize);
            let template_index = self.rng.range(0, self.monster_templates.len() as i32) as usize;
            let spawn = self.monster_templates[template_index].instantiate(&mut self.rng)?;
            let entity = self.actors.spawn_monster(&spawn, point, self.tick);
            self.grid.set_monster(point, Some(entity));
            placed += 1;
            self.scheduler.insert(entity, self.tick + placed as u64);
        }
        Ok(placed)
    }

    fn spawn_items(&mut self, player: Point) -> usize {
        if self.item_templates.is_empty() {
            return 0;
        }
        let mut open: Vec<Point> = self
            .grid
            .open_points()
            .into_iter()
            .filter(|point| *point != player)
            .collect();
        let wanted = roll_between(
            &mut self.rng,
            self.config.min_items as i32,
            self.config.max_items as i32,
        ) as usize;
        let mut placed = 0;
        while placed < wanted && !open.is_empty() {
            let point = open.swap_remove(self.rng.range(0, open.len() as i32) as usize);
            let template_index = self.rng.range(0, self.item_templates.len() as i32) as usize;
            let spawn = self.item_templates[template_index].instantiate(&mut self.rng);
            let entity = self.actors.spawn_item(&spawn, point);
            self.grid.set_object(point, Some(entity));
            placed += 1;
        }
        placed
    }

    fn refresh_distances(&mut self) {
        distance::refresh(&mut self.grid, self.actors.player_point());
        self.distances_dirty = false;
    }

    /// Runs the next scheduled turn.
    pub fn step(&mut self, input: &mut dyn CommandSource) -> Result<StepOutcome, GameError> {
        let player = self.actors.player_entity();
        if !self.actors.is_alive(player) {
            return Ok(StepOutcome::PlayerDied);
        }
        let turn = self.scheduler.extract_min()?;
        self.tick = self.tick.max(turn.priority);
        let actor = turn.actor;
        if !self.actors.is_alive(actor) {
            return Err(GameError::StaleActor(format!("{actor:?}")));
        }

        let outcome = if actor == player {
            self.player_turn(input)?
        } else {
            self.monster_turn(actor)
        };
        self.actors.advance(self.tick);

        match outcome {
            StepOutcome::Quit => self.scheduler.insert(actor, turn.priority),
            StepOutcome::LevelChanged => {}
            _ => {
                if self.actors.is_alive(actor) {
                    let speed = self.actors.speed(actor).unwrap_or(1);
                    self.scheduler.insert(actor, self.tick + turn_delay(speed));
                }
            }
        }
        if outcome == StepOutcome::Continue && self.actors.monster_count() == 0 {
            info!(tick = self.tick, "no monsters remain");
            return Ok(StepOutcome::Victory);
        }
        Ok(outcome)
    }

    /// Steps until the player dies, wins, or runs out of commands.
    pub fn run(&mut self, input: &mut dyn CommandSource) -> Result<StepOutcome, GameError> {
        loop {
            let outcome = self.step(input)?;
            if outcome.is_terminal() {
                return Ok(outcome);
            }
        }
    }

    fn player_turn(&mut self, input: &mut dyn CommandSource) -> Result<StepOutcome, GameError> {
        loop {
            let Some(command) = input.next_command() else {
                debug!("command source exhausted");
                return Ok(StepOutcome::Quit);
            };
            let outcome = match command {
                Command::Quit => Some(StepOutcome::Quit),
                Command::Rest => Some(StepOutcome::Continue),
                Command::Train(skill) => {
                    self.train(skill);
                    None
                }
                Command::Move(direction) => self.player_move(direction),
                Command::Ascend => self.take_stairs(Terrain::UpStair)?,
                Command::Descend => self.take_stairs(Terrain::DownStair)?,
                Command::Ranged(target) => self.player_shoot(target),
                Command::Cast(Spell::Fireball(target)) => self.cast_fireball(target),
                Command::Cast(Spell::Healing) => self.cast_healing(),
                Command::Cast(Spell::Teleport) => self.cast_teleport(),
            };
            if let Some(outcome) = outcome {
                return Ok(outcome);
            }
        }
    }

    fn train(&mut self, skill: Skill) {
        let trained = self.actors.with_player_stats(|stats| stats.train(skill));
        if trained == Some(true) {
            self.actors.log(format!("You train your {skill:?}."));
        } else {
            self.actors.log("You have no skill points to spend.");
        }
    }

    /// `None` means the move was refused and the player chooses again.
    fn player_move(&mut self, direction: Direction) -> Option<StepOutcome> {
        let from = self.actors.player_point();
        let target = direction.step(from);
        if let Some(monster) = self.grid.monster_at(target) {
            return self.player_attack(monster, target);
        }
        if !self.grid.is_open(target) {
            self.actors.log("There's rock in the way.");
            return None;
        }

        let player = self.actors.player_entity();
        self.actors.set_position(player, target);
        self.refresh_distances();
        self.pick_up_at(target);
        self.explore_room_at(target);
        Some(StepOutcome::Continue)
    }

    fn pick_up_at(&mut self, point: Point) {
        let Some(item) = self.grid.object_at(point) else {
            return;
        };
        let name = self.actors.item_name(item).unwrap_or_default();
        if self.actors.pick_up(item) {
            self.grid.set_object(point, None);
            self.actors.log(format!("You pick up the {name}."));
        } else {
            self.actors.log(format!("Your pack is too full for the {name}."));
        }
    }

    fn explore_room_at(&mut self, point: Point) {
        let Some(index) = self.grid.room_index_containing(point) else {
            return;
        };
        if self.grid.rooms[index].explored {
            return;
        }
        self.grid.rooms[index].explored = true;
        let level = self.actors.player_stats().level;
        self.actors.log("You explore a new room.");
        self.grant_experience(level * 2);
    }

    fn player_attack(&mut self, monster: Entity, at: Point) -> Option<StepOutcome> {
        let player = self.actors.player_entity();
        let attack = self.actors.attack_profile(player)?;
        let rolled = combat::roll_damage(&attack, &mut self.rng);
        if !self.spend_stamina(rolled) {
            return None;
        }
        self.land_blow(monster, at, &attack, rolled);
        Some(StepOutcome::Continue)
    }

    fn player_shoot(&mut self, target: Point) -> Option<StepOutcome> {
        let Some(attack) = self.actors.player_ranged_profile() else {
            self.actors.log("You have no ranged weapon.");
            return None;
        };
        let monster = self.target_in_sight(target)?;
        let rolled = combat::roll_damage(&attack, &mut self.rng);
        if !self.spend_stamina(rolled) {
            return None;
        }
        self.land_blow(monster, target, &attack, rolled);
        Some(StepOutcome::Continue)
    }

    /// The fireball's damage is rolled up front and costs that much magic.
    fn cast_fireball(&mut self, target: Point) -> Option<StepOutcome> {
        let monster = self.target_in_sight(target)?;
        let attack = self.actors.player_fireball_profile()?;
        let rolled = combat::roll_damage(&attack, &mut self.rng);
        if !self.spend_magic(rolled) {
            return None;
        }
        self.land_blow(monster, target, &attack, rolled);
        Some(StepOutcome::Continue)
    }

    fn cast_healing(&mut self) -> Option<StepOutcome> {
        if !self.spend_magic(HEALING_AMOUNT) {
            return None;
        }
        let player = self.actors.player_entity();
        self.actors.heal(player, HEALING_AMOUNT);
        self.actors.log("You restore some of your health.");
        self.grant_experience(HEALING_AMOUNT / 10);
        Some(StepOutcome::Continue)
    }

    /// Lands on a free cell of the first explored room the player is not in.
    fn cast_teleport(&mut self) -> Option<StepOutcome> {
        let magic = self.actors.player_stats().magic.current;
        if magic < TELEPORT_COST {
            self.actors.log("You do not have enough magic for that spell!");
            return None;
        }
        let here = self.actors.player_point();
        let current = self.grid.room_index_containing(here);
        let destination = self
            .grid
            .rooms
            .iter()
            .enumerate()
            .find(|(index, room)| room.explored && Some(*index) != current)
            .map(|(_, room)| *room);
        let landing = destination.and_then(|room| {
            let free: Vec<Point> = room
                .points()
                .filter(|point| {
                    self.grid.monster_at(*point).is_none() && self.grid.object_at(*point).is_none()
                })
                .collect();
            if free.is_empty() {
                None
            } else {
                Some(free[self.rng.range(0, free.len() as i32) as usize])
            }
        });
        let Some(landing) = landing else {
            self.actors.log("There is no available room to teleport to.");
            return None;
        };

        self.spend_magic(TELEPORT_COST);
        let player = self.actors.player_entity();
        self.actors.set_position(player, landing);
        self.refresh_distances();
        self.actors.log("You teleport to a room.");
        debug!(x = landing.x, y = landing.y, "player teleported");
        self.grant_experience(TELEPORT_COST / 10);
        Some(StepOutcome::Continue)
    }

    /// A monster on `target` that the player can see, if any.
    fn target_in_sight(&mut self, target: Point) -> Option<Entity> {
        let monster = self
            .grid
            .monster_at(target)
            .filter(|_| sight::line_of_sight(&self.grid, self.actors.player_point(), target));
        if monster.is_none() {
            self.actors.log("There is nothing there to hit.");
        }
        monster
    }

    fn spend_stamina(&mut self, rolled: i32) -> bool {
        let cost = combat::stamina_cost(rolled);
        let paid = self
            .actors
            .with_player_stats(|stats| stats.stamina.spend(cost))
            .unwrap_or(false);
        if !paid {
            self.actors.log("You do not have enough stamina for this attack!");
        }
        paid
    }

    fn spend_magic(&mut self, cost: i32) -> bool {
        let paid = self
            .actors
            .with_player_stats(|stats| stats.magic.spend(cost.max(0)))
            .unwrap_or(false);
        if !paid {
            self.actors.log("You do not have enough magic for that spell!");
        }
        paid
    }

    /// Resolves an already rolled player blow against `monster`: hit roll,
    /// mitigation, experience, and death.
    fn land_blow(&mut self, monster: Entity, at: Point, attack: &AttackProfile, rolled: i32) {
        let defense = self.actors.defense_profile(monster).unwrap_or_default();
        let name = self.actors.name(monster);
        match combat::strike(attack, rolled, &defense, &mut self.rng) {
            AttackOutcome::Dodged => self.actors.log(format!("The {name} dodges your attack.")),
            AttackOutcome::Missed => self.actors.log(format!("You fail to hit the {name}.")),
            AttackOutcome::Hit { damage, .. } => {
                let remaining = self.actors.apply_damage(monster, damage).unwrap_or(0);
                self.actors.log(format!(
                    "You deal {damage} damage to the {name} ({} remain).",
                    remaining.max(0)
                ));
                self.grant_experience((damage + 9) / 10);
                if remaining <= 0 {
                    self.kill_monster(monster, at);
                }
            }
        }
    }

    fn kill_monster(&mut self, monster: Entity, at: Point) {
        let record = self.actors.monster(monster);
        self.scheduler.remove(monster);
        if self.grid.monster_at(at) == Some(monster) {
            self.grid.set_monster(at, None);
        }
        self.actors.delete(monster);
        if let Some(record) = record {
            info!(name = %record.name, "monster killed");
            self.actors.log(format!("You killed the {}!", record.name));
            self.grant_experience(record.experience);
        }
    }

    fn grant_experience(&mut self, amount: i32) {
        let cap = self.actors.player_stats().experience_bonus_cap();
        let bonus = roll_between(&mut self.rng, 0, cap);
        let gained = self
            .actors
            .with_player_stats(|stats| stats.add_experience(amount + bonus))
            .unwrap_or(0);
        if gained > 0 {
            let level = self.actors.player_stats().level;
            info!(level, "player levelled up");
            self.actors
                .log(format!("You reached level {level}! A skill point awaits."));
        }
    }

    fn take_stairs(&mut self, stair: Terrain) -> Result<Option<StepOutcome>, GameError> {
        let here = self.actors.player_point();
        if self.grid.terrain(here) != Some(stair) {
            self.actors.log("There are no stairs here.");
            return Ok(None);
        }
        self.depth = match stair {
            Terrain::UpStair => (self.depth - 1).max(1),
            _ => self.depth + 1,
        };
        let reward = STAIR_EXPERIENCE.roll(&mut self.rng);
        self.generate_level()?;
        self.actors.log(format!("You arrive on dungeon level {}.", self.depth));
        self.grant_experience(reward);
        info!(depth = self.depth, "changed level");
        Ok(Some(StepOutcome::LevelChanged))
    }

    fn monster_turn(&mut self, monster: Entity) -> StepOutcome {
        if self.distances_dirty {
            self.refresh_distances();
        }
        let Some(view) = self.actors.monster_view(monster) else {
            return StepOutcome::Continue;
        };
        let player = self.actors.player_point();
        let turn = ai::take_turn(&mut self.grid, &view, player, &mut self.rng);
        self.actors.remember_player(monster, turn.last_known_player);

        match turn.action {
            MonsterAction::Stay => StepOutcome::Continue,
            MonsterAction::Dig { target, outcome } => {
                trace!(x = target.x, y = target.y, ?outcome, "monster dug");
                self.distances_dirty = true;
                StepOutcome::Continue
            }
            MonsterAction::Move(to) => {
                self.move_monster(monster, view.position, to, player);
                StepOutcome::Continue
            }
            MonsterAction::Attack => self.monster_attack(monster),
        }
    }

    /// Moves `monster`, pushing aside whoever already stands on `to`.
    fn move_monster(&mut self, monster: Entity, from: Point, to: Point, player: Point) {
        self.grid.set_monster(from, None);
        if let Some(blocker) = self.grid.monster_at(to) {
            let refuge = ai::displacement_target(&self.grid, to, player, &mut self.rng)
                .unwrap_or(from);
            self.grid.set_monster(refuge, Some(blocker));
            self.actors.set_position(blocker, refuge);
            trace!(x = refuge.x, y = refuge.y, "monster displaced");
        }
        self.grid.set_monster(to, Some(monster));
        self.actors.set_position(monster, to);
    }

    fn monster_attack(&mut self, monster: Entity) -> StepOutcome {
        let player = self.actors.player_entity();
        let (Some(attack), Some(defense)) = (
            self.actors.attack_profile(monster),
            self.actors.defense_profile(player),
        ) else {
            return StepOutcome::Continue;
        };
        let name = self.actors.name(monster);
        match combat::resolve_attack(&attack, &defense, &mut self.rng) {
            AttackOutcome::Dodged => self.actors.log(format!("You dodge the {name}'s attack!")),
            AttackOutcome::Missed => self.actors.log(format!("The {name} fails to hit you!")),
            AttackOutcome::Hit { damage, .. } => {
                let remaining = self.actors.apply_damage(player, damage).unwrap_or(0);
                self.actors
                    .log(format!("The {name} inflicts {damage} damage on you!"));
                if remaining <= 0 {
                    info!(killer = %name, tick = self.tick, "player died");
                    self.actors.log(format!("You were slain by the {name}."));
                    return StepOutcome::PlayerDied;
                }
            }
        }
        StepOutcome::Continue
    }

    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable board access for editors and scenario setup. Call
    /// [`World::mark_grid_changed`] after editing hardness.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn mark_grid_changed(&mut self) {
        self.distances_dirty = true;
    }

    pub fn actors(&self) -> &ActorTable {
        &self.actors
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn player_point(&self) -> Point {
        self.actors.player_point()
    }

    pub fn player_stats(&self) -> PlayerStats {
        self.actors.player_stats()
    }

    pub fn monster_count(&self) -> usize {
        self.actors.monster_count()
    }

    pub fn player_hitpoints(&self) -> i32 {
        self.actors.player_hitpoints()
    }

    pub fn player_visible_cells(&self) -> Vec<Point> {
        let radius = self
            .actors
            .player_stats()
            .light_radius(self.config.light_radius);
        sight::visible_cells(&self.grid, self.player_point(), radius)
    }

    pub fn each_renderable<F>(&self, f: F)
    where
        F: FnMut(Point, &Renderable),
    {
        self.actors.each_renderable(true, f);
    }

    pub fn drain_events(&mut self) -> Vec<String> {
        self.actors.drain_events()
    }
}
