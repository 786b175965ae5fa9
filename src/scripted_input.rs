use bracket_terminal::prelude::VirtualKeyCode;
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};
use tracing::warn;

use crate::input::{Command, CommandSource, command_for_key};

/// Key presses read from a script, one character per key. Blank lines and lines
/// starting with `#` are skipped.
pub struct ScriptedInput {
    script_commands: Vec<VirtualKeyCode>,
    current_command_index: usize,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_script(script: &str) -> Self {
        Self::from_lines(script.lines())
    }

    fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let lines = reader.lines().collect::<io::Result<Vec<String>>>()?;
        Ok(Self::from_lines(lines.iter().map(String::as_str)))
    }

    fn from_lines<'a, I: Iterator<Item = &'a str>>(lines: I) -> Self {
        let mut script_commands = Vec::new();
        for line in lines {
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() || trimmed_line.starts_with('#') {
                continue;
            }
            for char_code in trimmed_line.chars() {
                if let Some(key) = char_to_virtualkeycode(char_code) {
                    script_commands.push(key);
                } else {
                    warn!(key = %char_code, "unknown key in script");
                }
            }
        }

        Self {
            script_commands,
            current_command_index: 0,
        }
    }

    pub fn next_key(&mut self) -> Option<VirtualKeyCode> {
        let key = self.script_commands.get(self.current_command_index).copied()?;
        self.current_command_index += 1;
        Some(key)
    }
}

impl CommandSource for ScriptedInput {
    fn next_command(&mut self) -> Option<Command> {
        while let Some(key) = self.next_key() {
            if let Some(command) = command_for_key(key) {
                return Some(command);
            }
        }
        None
    }
}

fn char_to_virtualkeycode(c: char) -> Option<VirtualKeyCode> {
    match c {
        'h' | 'H' | '4' => Some(VirtualKeyCode::H),
        'j' | 'J' | '2' => Some(VirtualKeyCode::J),
        'k' | 'K' | '8' => Some(VirtualKeyCode::K),
        'l' | 'L' | '6' => Some(VirtualKeyCode::L),
        'y' | 'Y' | '7' => Some(VirtualKeyCode::Y),
        'u' | 'U' | '9' => Some(VirtualKeyCode::U),
        'b' | 'B' => Some(VirtualKeyCode::B),
        'n' | 'N' => Some(VirtualKeyCode::N),
        '<' => Some(VirtualKeyCode::PageUp),
        '>' => Some(VirtualKeyCode::PageDown),
        '.' | '5' | ' ' => Some(VirtualKeyCode::Period),
        's' | 'S' => Some(VirtualKeyCode::Key1),
        'd' | 'D' => Some(VirtualKeyCode::Key2),
        'i' | 'I' => Some(VirtualKeyCode::Key3),
        'z' | 'Z' => Some(VirtualKeyCode::Z),
        't' | 'T' => Some(VirtualKeyCode::T),
        'q' | 'Q' | '\x1B' => Some(VirtualKeyCode::Escape),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Direction, Skill, Spell};

    #[test]
    fn parses_keys_and_skips_comments() {
        let mut input = ScriptedInput::from_script("# warm up\nhl\n\n>.s q");
        let commands: Vec<Command> = std::iter::from_fn(|| input.next_command()).collect();
        assert_eq!(
            commands,
            vec![
                Command::Move(Direction::West),
                Command::Move(Direction::East),
                Command::Descend,
                Command::Rest,
                Command::Train(Skill::Strength),
                Command::Rest,
                Command::Quit,
            ]
        );
    }

    #[test]
    fn unknown_keys_are_dropped() {
        let mut input = ScriptedInput::from_script("x%j");
        assert_eq!(input.next_command(), Some(Command::Move(Direction::South)));
        assert_eq!(input.next_command(), None);
    }

    #[test]
    fn spell_keys() {
        let mut input = ScriptedInput::from_script("zt");
        assert_eq!(input.next_command(), Some(Command::Cast(Spell::Healing)));
        assert_eq!(input.next_command(), Some(Command::Cast(Spell::Teleport)));
    }

    #[test]
    fn reads_script_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moves.txt");
        std::fs::write(&path, "kk\n<\n").unwrap();
        let mut input = ScriptedInput::from_file(&path).unwrap();
        assert_eq!(input.next_command(), Some(Command::Move(Direction::North)));
        assert_eq!(input.next_command(), Some(Command::Move(Direction::North)));
        assert_eq!(input.next_command(), Some(Command::Ascend));
        assert_eq!(input.next_command(), None);
    }
}
