use std::collections::VecDeque;

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::VirtualKeyCode;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub fn delta(self) -> Point {
        match self {
            Direction::North => Point::new(0, -1),
            Direction::NorthEast => Point::new(1, -1),
            Direction::East => Point::new(1, 0),
            Direction::SouthEast => Point::new(1, 1),
            Direction::South => Point::new(0, 1),
            Direction::SouthWest => Point::new(-1, 1),
            Direction::West => Point::new(-1, 0),
            Direction::NorthWest => Point::new(-1, -1),
        }
    }

    pub fn step(self, from: Point) -> Point {
        let delta = self.delta();
        Point::new(from.x + delta.x, from.y + delta.y)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Skill {
    Strength,
    Dexterity,
    Intelligence,
}

/// Spells are paid for in magic.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Spell {
    /// Burns the monster on the targeted cell; costs as much magic as it deals.
    Fireball(Point),
    Healing,
    /// Jumps to a random cell of another explored room.
    Teleport,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Walk one cell; walking into a monster attacks it.
    Move(Direction),
    Rest,
    Ascend,
    Descend,
    /// Spend a skill point. Does not use up the turn.
    Train(Skill),
    Cast(Spell),
    /// Shoot the monster on the targeted cell with the equipped ranged weapon.
    Ranged(Point),
    Quit,
}

/// Vi keys, the number pad and the arrow keys all steer.
pub fn command_for_key(key: VirtualKeyCode) -> Option<Command> {
    let command = match key {
        VirtualKeyCode::K | VirtualKeyCode::Numpad8 | VirtualKeyCode::Up => {
            Command::Move(Direction::North)
        }
        VirtualKeyCode::U | VirtualKeyCode::Numpad9 => Command::Move(Direction::NorthEast),
        VirtualKeyCode::L | VirtualKeyCode::Numpad6 | VirtualKeyCode::Right => {
            Command::Move(Direction::East)
        }
        VirtualKeyCode::N | VirtualKeyCode::Numpad3 => Command::Move(Direction::SouthEast),
        VirtualKeyCode::J | VirtualKeyCode::Numpad2 | VirtualKeyCode::Down => {
            Command::Move(Direction::South)
        }
        VirtualKeyCode::B | VirtualKeyCode::Numpad1 => Command::Move(Direction::SouthWest),
        VirtualKeyCode::H | VirtualKeyCode::Numpad4 | VirtualKeyCode::Left => {
            Command::Move(Direction::West)
        }
        VirtualKeyCode::Y | VirtualKeyCode::Numpad7 => Command::Move(Direction::NorthWest),
        VirtualKeyCode::Period | VirtualKeyCode::Numpad5 | VirtualKeyCode::Space => Command::Rest,
        VirtualKeyCode::PageUp => Command::Ascend,
        VirtualKeyCode::PageDown => Command::Descend,
        VirtualKeyCode::Key1 => Command::Train(Skill::Strength),
        VirtualKeyCode::Key2 => Command::Train(Skill::Dexterity),
        VirtualKeyCode::Key3 => Command::Train(Skill::Intelligence),
        VirtualKeyCode::Z => Command::Cast(Spell::Healing),
        VirtualKeyCode::T => Command::Cast(Spell::Teleport),
        VirtualKeyCode::Escape | VirtualKeyCode::Q => Command::Quit,
        _ => return None,
    };
    Some(command)
}

/// Anything that can hand the player loop its next command. `None` means the
/// source is exhausted and the game should stop.
pub trait CommandSource {
    fn next_command(&mut self) -> Option<Command>;
}

/// A fixed list of commands, played back in order.
#[derive(Clone, Debug, Default)]
pub struct QueuedCommands {
    commands: VecDeque<Command>,
}

impl QueuedCommands {
    pub fn push(&mut self, command: Command) {
        self.commands.push_back(command);
    }

    pub fn remaining(&self) -> usize {
        self.commands.len()
    }
}

impl From<Vec<Command>> for QueuedCommands {
    fn from(commands: Vec<Command>) -> Self {
        Self {
            commands: commands.into(),
        }
    }
}

impl CommandSource for QueuedCommands {
    fn next_command(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }
}
