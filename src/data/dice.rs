use std::{fmt, str::FromStr};

use bracket_random::prelude::RandomNumberGenerator;
use serde::{Deserialize, Serialize};

use crate::error::TemplateError;

/// A randomized stat written `base+NdS`: a flat base plus N rolls of an S-sided die.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dice {
    pub base: i32,
    pub dice: i32,
    pub sides: i32,
}

impl Dice {
    pub const fn new(base: i32, dice: i32, sides: i32) -> Self {
        Self { base, dice, sides }
    }

    /// A roll that always yields `value`.
    pub const fn fixed(value: i32) -> Self {
        Self::new(value, 0, 0)
    }

    fn is_flat(&self) -> bool {
        self.dice <= 0 || self.sides <= 0
    }

    pub fn min(&self) -> i32 {
        if self.is_flat() {
            self.base
        } else {
            self.base + self.dice
        }
    }

    pub fn max(&self) -> i32 {
        if self.is_flat() {
            self.base
        } else {
            self.base + self.dice * self.sides
        }
    }

    pub fn roll(&self, rng: &mut RandomNumberGenerator) -> i32 {
        if self.is_flat() {
            return self.base;
        }
        self.base + rng.roll_dice(self.dice, self.sides)
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}d{}", self.base, self.dice, self.sides)
    }
}

impl FromStr for Dice {
    type Err = TemplateError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let malformed = || TemplateError::Dice(text.to_string());
        let (base, roll) = text.trim().split_once('+').ok_or_else(malformed)?;
        let (dice, sides) = roll.split_once('d').ok_or_else(malformed)?;
        let parse = |part: &str| part.trim().parse::<i32>().map_err(|_| malformed());
        let parsed = Self::new(parse(base)?, parse(dice)?, parse(sides)?);
        if parsed.base < 0 || parsed.dice < 0 || parsed.sides < 0 {
            return Err(malformed());
        }
        Ok(parsed)
    }
}

impl TryFrom<String> for Dice {
    type Error = TemplateError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<Dice> for String {
    fn from(dice: Dice) -> Self {
        dice.to_string()
    }
}

/// Uniform integer in `[low, high]`; a degenerate range yields `low`.
pub fn roll_between(rng: &mut RandomNumberGenerator, low: i32, high: i32) -> i32 {
    if high <= low {
        low
    } else {
        rng.range(low, high + 1)
    }
}

/// Percentile check: true with `chance` percent probability.
pub fn percent_check(rng: &mut RandomNumberGenerator, chance: i32) -> bool {
    roll_between(rng, 1, 100) <= chance
}
