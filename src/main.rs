use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use tunnelrogue::{
    DungeonConfig, StepOutcome, World,
    data::{items::ItemTemplate, monsters::MonsterTemplate},
    input::{CommandSource, QueuedCommands},
    logging,
    scripted_input::ScriptedInput,
};

/// Headless driver: builds a level, feeds it commands, reports the outcome.
#[derive(Parser, Debug)]
#[command(name = "tunnelrogue", version, about)]
struct Cli {
    /// Seed for the shared random stream.
    #[arg(long, default_value_t = 327)]
    seed: u64,

    /// Keystroke script (vi keys, `<`/`>` for stairs, `z`/`t` to heal or teleport, `q` to quit).
    #[arg(long)]
    script: Option<PathBuf>,

    /// JSON dungeon configuration; defaults apply to missing fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON monster templates replacing the built-in bestiary.
    #[arg(long)]
    monsters: Option<PathBuf>,

    /// JSON item templates replacing the built-in list.
    #[arg(long)]
    items: Option<PathBuf>,

    /// Start on a level read from this dungeon file instead of a fresh one.
    #[arg(long, alias = "dungeon-file")]
    load: Option<PathBuf>,

    /// Write the final level to this dungeon file.
    #[arg(long)]
    save: Option<PathBuf>,

    /// Print the level as text before and after the run.
    #[arg(long)]
    show_map: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => DungeonConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DungeonConfig::default(),
    };
    let monsters = match &cli.monsters {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            MonsterTemplate::from_json(&text)
                .with_context(|| format!("parsing monsters in {}", path.display()))?
        }
        None => MonsterTemplate::builtin(),
    };
    let items = match &cli.items {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            ItemTemplate::from_json(&text)
                .with_context(|| format!("parsing items in {}", path.display()))?
        }
        None => ItemTemplate::builtin(),
    };

    let mut world =
        World::new(config, monsters, items, cli.seed).context("building the first level")?;
    if let Some(path) = &cli.load {
        world
            .load_level(path)
            .with_context(|| format!("loading dungeon {}", path.display()))?;
    }
    if cli.show_map {
        println!("{}", render_text(&world));
    }

    let mut input: Box<dyn CommandSource> = match &cli.script {
        Some(path) => Box::new(
            ScriptedInput::from_file(path)
                .with_context(|| format!("reading script {}", path.display()))?,
        ),
        None => Box::new(QueuedCommands::default()),
    };

    let outcome = loop {
        let outcome = world.step(input.as_mut()).context("running a turn")?;
        for event in world.drain_events() {
            println!("{event}");
        }
        if outcome.is_terminal() {
            break outcome;
        }
    };

    if cli.show_map {
        println!("{}", render_text(&world));
    }
    let stats = world.player_stats();
    let verdict = match outcome {
        StepOutcome::PlayerDied => "You died.",
        StepOutcome::Victory => "You cleared the level.",
        _ => "You left the dungeon.",
    };
    println!(
        "{verdict} Depth {}, level {}, {} monsters remain, tick {}.",
        world.depth(),
        stats.level,
        world.monster_count(),
        world.tick()
    );
    info!(?outcome, tick = world.tick(), "run finished");

    if let Some(path) = &cli.save {
        world
            .save(path)
            .with_context(|| format!("saving dungeon {}", path.display()))?;
    }
    Ok(())
}

fn render_text(world: &World) -> String {
    let grid = world.grid();
    let player = world.player_point();
    let mut out = String::with_capacity(((grid.width() + 1) * grid.height()) as usize);
    for (idx, cell) in grid.cells().iter().enumerate() {
        if idx > 0 && idx as i32 % grid.width() == 0 {
            out.push('\n');
        }
        out.push(if cell.point == player {
            '@'
        } else if cell.monster.is_some() {
            'M'
        } else {
            cell.terrain.glyph()
        });
    }
    out
}
