use std::collections::VecDeque;

use crate::config::DungeonConfig;

/// Undrained messages beyond this are dropped, oldest first.
pub const EVENT_LOG_CAPACITY: usize = 256;

/// Game time, in scheduler ticks.
#[derive(Clone, Copy, Debug, Default)]
pub struct Clock {
    pub tick: u64,
}

/// Fraction of each pool's maximum restored per elapsed tick.
#[derive(Clone, Copy, Debug)]
pub struct RegenRates {
    pub health: f64,
    pub stamina: f64,
    pub magic: f64,
}

impl RegenRates {
    pub fn from_config(config: &DungeonConfig) -> Self {
        Self {
            health: config.health_regen_rate,
            stamina: config.stamina_regen_rate,
            magic: config.magic_regen_rate,
        }
    }
}

impl Default for RegenRates {
    fn default() -> Self {
        Self::from_config(&DungeonConfig::default())
    }
}

/// Human-readable messages waiting to be shown. Holds at most
/// [`EVENT_LOG_CAPACITY`] entries between drains.
#[derive(Default)]
pub struct EventLog {
    entries: VecDeque<String>,
}

impl EventLog {
    pub fn push<S: Into<String>>(&mut self, entry: S) {
        if self.entries.len() == EVENT_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn drain(&mut self) -> Vec<String> {
        self.entries.drain(..).collect()
    }
}
