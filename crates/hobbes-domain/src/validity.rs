//! Validity module - quality tiers for evidence and derived conclusions

use std::fmt;
use std::ops::{Add, Sub};

/// Quality judgement of a piece of knowledge
///
/// For a rule this is the quality of the rule itself. For a derived
/// conclusion it is bounded by the weakest knowledge used to reach it.
/// Levels are ordered:
/// - Plausible: weakest, speculative
/// - Probable: supported but not established
/// - Sound: well supported
/// - Accepted: established knowledge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Validity {
    /// Level 0
    Plausible,

    /// Level 1
    Probable,

    /// Level 2
    Sound,

    /// Level 3
    Accepted,
}

impl Validity {
    /// Number of validity levels
    pub const RANKS: usize = 4;

    /// All levels, weakest first
    pub const ALL: [Validity; 4] = [
        Validity::Plausible,
        Validity::Probable,
        Validity::Sound,
        Validity::Accepted,
    ];

    /// Numeric rank in 0..=3
    pub fn level(&self) -> u8 {
        match self {
            Validity::Plausible => 0,
            Validity::Probable => 1,
            Validity::Sound => 2,
            Validity::Accepted => 3,
        }
    }

    /// Build a validity from a rank, clamping into 0..=3
    pub fn from_level(level: i32) -> Self {
        match level {
            i32::MIN..=0 => Validity::Plausible,
            1 => Validity::Probable,
            2 => Validity::Sound,
            _ => Validity::Accepted,
        }
    }

    /// Get the validity name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Validity::Plausible => "plausible",
            Validity::Probable => "probable",
            Validity::Sound => "sound",
            Validity::Accepted => "accepted",
        }
    }

    /// Parse a validity from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "plausible" | "plaus" => Some(Validity::Plausible),
            "probable" | "prob" => Some(Validity::Probable),
            "sound" => Some(Validity::Sound),
            "accepted" | "accept" => Some(Validity::Accepted),
            _ => None,
        }
    }

    /// True when the two levels are more than one step apart
    pub fn outscale(&self, other: Validity) -> bool {
        (self.level() as i32 - other.level() as i32).abs() > 1
    }
}

impl Add<i32> for Validity {
    type Output = Validity;

    fn add(self, rhs: i32) -> Validity {
        Validity::from_level(self.level() as i32 + rhs)
    }
}

impl Sub<i32> for Validity {
    type Output = Validity;

    fn sub(self, rhs: i32) -> Validity {
        Validity::from_level(self.level() as i32 - rhs)
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Validity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid validity: {}", s))
    }
}
