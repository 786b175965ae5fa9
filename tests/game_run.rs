use bracket_random::prelude::RandomNumberGenerator;

use tunnelrogue::{
    DungeonConfig, GameError, StepOutcome, World,
    ai::Abilities,
    data::{dice::Dice, items::ItemTemplate, monsters::MonsterTemplate},
    input::{Command, QueuedCommands},
    map::{FieldKind, generator},
    scripted_input::ScriptedInput,
};

fn small_config() -> DungeonConfig {
    DungeonConfig {
        width: 60,
        height: 30,
        min_rooms: 4,
        max_rooms: 5,
        max_room_width: 10,
        max_room_height: 7,
        min_monsters: 4,
        max_monsters: 6,
        min_items: 3,
        max_items: 5,
        ..DungeonConfig::default()
    }
}

fn assassin() -> MonsterTemplate {
    MonsterTemplate {
        name: "Burrowing Assassin".to_string(),
        description: "It always finds you.".to_string(),
        symbol: 'A',
        color: "RED".to_string(),
        speed: Dice::fixed(20),
        hitpoints: Dice::fixed(10_000),
        damage: Dice::fixed(500),
        abilities: Abilities::INTELLIGENT | Abilities::TELEPATHIC | Abilities::TUNNELING,
        experience: Dice::fixed(1),
    }
}

/// Every live monster is queued exactly where the grid says it stands.
fn assert_consistent(world: &World) {
    for monster in world.actors().monsters() {
        assert!(world.scheduler().contains(monster));
        let at = world.actors().position(monster).unwrap();
        assert_eq!(world.grid().monster_at(at), Some(monster));
        assert!(world.grid().is_open(at));
    }
    let occupied = world
        .grid()
        .cells()
        .iter()
        .filter(|cell| cell.monster.is_some())
        .count();
    assert_eq!(occupied, world.monster_count());
}

#[test]
fn resting_player_is_eventually_slain() {
    let mut world = World::new(small_config(), vec![assassin()], ItemTemplate::builtin(), 11)
        .unwrap();
    let mut input = QueuedCommands::from(vec![Command::Rest; 20_000]);
    let mut outcome = StepOutcome::Continue;
    for _ in 0..100_000 {
        outcome = world.step(&mut input).unwrap();
        if outcome.is_terminal() {
            break;
        }
        assert_consistent(&world);
    }
    assert_eq!(outcome, StepOutcome::PlayerDied);
    assert!(world.player_hitpoints() <= 0);
    let events = world.drain_events();
    assert!(events.iter().any(|event| event.contains("slain by the Burrowing Assassin")));
    // a dead player stays dead
    assert_eq!(world.step(&mut input).unwrap(), StepOutcome::PlayerDied);
}

#[test]
fn builtin_bestiary_keeps_the_board_consistent() {
    for seed in 0..6 {
        let mut world = World::new(
            small_config(),
            MonsterTemplate::builtin(),
            ItemTemplate::builtin(),
            seed,
        )
        .unwrap();
        let mut input = QueuedCommands::from(vec![Command::Rest; 300]);
        let outcome = world.run(&mut input).unwrap();
        assert!(outcome.is_terminal());
        assert_consistent(&world);
        assert!(world.tick() > 0);
    }
}

#[test]
fn tunnellers_leave_corridors_behind() {
    let mut world = World::new(small_config(), vec![assassin()], Vec::new(), 5).unwrap();
    let corridors_before = world
        .grid()
        .cells()
        .iter()
        .filter(|cell| cell.is_open())
        .count();
    let mut input = QueuedCommands::from(vec![Command::Rest; 400]);
    let _ = world.run(&mut input).unwrap();
    let corridors_after = world
        .grid()
        .cells()
        .iter()
        .filter(|cell| cell.is_open())
        .count();
    assert!(corridors_after >= corridors_before);
    let player = world.player_point();
    assert_eq!(world.grid().distance(player, FieldKind::Tunneling), 0);
}

#[test]
fn scripted_quit_stops_immediately() {
    let mut world = World::new(
        small_config(),
        MonsterTemplate::builtin(),
        ItemTemplate::builtin(),
        8,
    )
    .unwrap();
    let mut input = ScriptedInput::from_script("q");
    assert_eq!(world.run(&mut input).unwrap(), StepOutcome::Quit);
    assert_eq!(world.tick(), 0);
    // the player keeps their place in line
    assert!(world.scheduler().contains(world.actors().player_entity()));
}

#[test]
fn player_sees_their_own_room() {
    let world = World::new(
        small_config(),
        MonsterTemplate::builtin(),
        ItemTemplate::builtin(),
        13,
    )
    .unwrap();
    let visible = world.player_visible_cells();
    assert!(visible.contains(&world.player_point()));
    let mut glyphs = Vec::new();
    world.each_renderable(|point, renderable| glyphs.push((point, renderable.glyph)));
    assert!(glyphs.contains(&(world.player_point(), b'@' as u16)));
}

#[test]
fn crowded_board_reports_placement_failure() {
    let config = DungeonConfig {
        width: 24,
        height: 14,
        min_rooms: 8,
        max_rooms: 8,
        max_placement_attempts: 300,
        ..small_config()
    };
    let result = World::new(config.clone(), MonsterTemplate::builtin(), Vec::new(), 1);
    assert!(matches!(result, Err(GameError::Generation(_))));

    let mut rng = RandomNumberGenerator::seeded(1);
    assert!(generator::generate(&config, &mut rng).is_err());
}
