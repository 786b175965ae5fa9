use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;

use super::{Abilities, Awareness, Goal, decide};
use crate::map::{
    DIG_DECREMENT, DigOutcome, Grid, distance::downhill_step, sight::line_of_sight,
};

/// The monster state the resolver reads.
#[derive(Clone, Copy, Debug)]
pub struct MonsterView {
    pub position: Point,
    pub abilities: Abilities,
    pub last_known_player: Option<Point>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonsterAction {
    Stay,
    Move(Point),
    /// Chipped at rock instead of moving; the grid has already been changed.
    Dig { target: Point, outcome: DigOutcome },
    Attack,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonsterTurn {
    pub action: MonsterAction,
    /// Memory to store back on the monster.
    pub last_known_player: Option<Point>,
}

/// One monster turn against the current grid. Digging is applied here; moving,
/// displacement and combat are left to the caller.
pub fn take_turn(
    grid: &mut Grid,
    monster: &MonsterView,
    player: Point,
    rng: &mut RandomNumberGenerator,
) -> MonsterTurn {
    let abilities = monster.abilities;
    let erratic_roll = abilities.contains(Abilities::ERRATIC) && rng.range(0, 2) == 0;
    let awareness = if line_of_sight(grid, monster.position, player) {
        Awareness::Visible
    } else if monster.last_known_player.is_some() {
        Awareness::Remembered
    } else {
        Awareness::Unaware
    };
    let decision = decide(abilities, awareness, erratic_roll);

    let mut memory = monster.last_known_player;
    if decision.remember_player {
        memory = Some(player);
    }

    let from = monster.position;
    let destination = match decision.goal {
        Goal::Wander { tunneling } => random_neighbor(grid, from, tunneling, rng),
        Goal::Player => Some(straight_step(from, player)),
        Goal::LastKnown => memory.map(|target| {
            let step = straight_step(from, target);
            if step == target {
                memory = None;
            }
            step
        }),
        Goal::Field(kind) => downhill_step(grid, from, kind),
    };

    let action = match destination {
        None => MonsterAction::Stay,
        Some(target) if target == from => MonsterAction::Stay,
        Some(target) if target == player => MonsterAction::Attack,
        Some(target) if grid.is_open(target) => MonsterAction::Move(target),
        Some(target) if abilities.contains(Abilities::TUNNELING) => {
            match grid.dig(target, DIG_DECREMENT) {
                DigOutcome::Immutable => MonsterAction::Stay,
                outcome => MonsterAction::Dig { target, outcome },
            }
        }
        Some(_) => MonsterAction::Stay,
    };

    MonsterTurn {
        action,
        last_known_player: memory,
    }
}

/// One step along each axis that is not yet aligned with `target`.
pub fn straight_step(from: Point, target: Point) -> Point {
    Point::new(
        from.x + (target.x - from.x).signum(),
        from.y + (target.y - from.y).signum(),
    )
}

fn random_neighbor(
    grid: &Grid,
    from: Point,
    tunneling: bool,
    rng: &mut RandomNumberGenerator,
) -> Option<Point> {
    let options: Vec<Point> = grid
        .neighbors(from)
        .filter(|point| {
            if tunneling {
                grid.cell(*point).is_some_and(|cell| !cell.is_immutable())
            } else {
                grid.is_open(*point)
            }
        })
        .collect();
    pick(&options, rng)
}

/// Where a monster standing on `occupied` can be pushed: a random open neighbour
/// holding neither a monster nor the player.
pub fn displacement_target(
    grid: &Grid,
    occupied: Point,
    player: Point,
    rng: &mut RandomNumberGenerator,
) -> Option<Point> {
    let options: Vec<Point> = grid
        .neighbors(occupied)
        .filter(|point| {
            *point != player && grid.is_open(*point) && grid.monster_at(*point).is_none()
        })
        .collect();
    pick(&options, rng)
}

fn pick(options: &[Point], rng: &mut RandomNumberGenerator) -> Option<Point> {
    if options.is_empty() {
        None
    } else {
        Some(options[rng.range(0, options.len() as i32) as usize])
    }
}
