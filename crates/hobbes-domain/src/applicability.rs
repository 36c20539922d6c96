//! Applicability module - directional strength of evidence

use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Which way a piece of evidence points
///
/// `Against` orders below `For` so that more-true values compare larger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    /// Evidence against the conclusion
    Against,
    /// Evidence for the conclusion
    For,
}

impl Direction {
    /// The opposite direction
    pub fn flip(self) -> Direction {
        match self {
            Direction::Against => Direction::For,
            Direction::For => Direction::Against,
        }
    }
}

/// How applicable a piece of evidence is to a conclusion, and in which direction
///
/// Levels run 1 (partly) to 3 (highly); level 0 only occurs for [`Applicability::NIL`],
/// which has no direction and marks an absence of evidence.
///
/// Ordering compares direction first (nil < against < for) and level second, so
/// `HIGHLY_AGAINST > PARTLY_AGAINST` even though it is "more false".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Applicability {
    // Field order drives the derived ordering.
    direction: Option<Direction>,
    level: u8,
}

impl Applicability {
    /// Weak evidence for
    pub const PARTLY_FOR: Applicability = Applicability::new(1, Direction::For);
    /// Moderate evidence for
    pub const MOSTLY_FOR: Applicability = Applicability::new(2, Direction::For);
    /// Strong evidence for
    pub const HIGHLY_FOR: Applicability = Applicability::new(3, Direction::For);
    /// Weak evidence against
    pub const PARTLY_AGAINST: Applicability = Applicability::new(1, Direction::Against);
    /// Moderate evidence against
    pub const MOSTLY_AGAINST: Applicability = Applicability::new(2, Direction::Against);
    /// Strong evidence against
    pub const HIGHLY_AGAINST: Applicability = Applicability::new(3, Direction::Against);
    /// No evidence either way
    pub const NIL: Applicability = Applicability {
        direction: None,
        level: 0,
    };

    /// Number of displayable ranks (nil is never shown)
    pub const RANKS: usize = 6;

    const fn new(level: u8, direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            level,
        }
    }

    /// Build a directional applicability, clamping the level into 1..=3
    pub fn with_level(level: i32, direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            level: snap(level),
        }
    }

    /// Level in 0..=3
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Direction, `None` for nil
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// True when this is the nil applicability
    pub fn is_nil(&self) -> bool {
        self.direction.is_none()
    }

    /// True when the evidence points toward the conclusion
    pub fn is_true(&self) -> bool {
        self.direction == Some(Direction::For)
    }

    /// Signed difference of levels, ignoring direction
    pub fn cmp_level(&self, other: &Applicability) -> i32 {
        self.level as i32 - other.level as i32
    }

    /// Average a group of same-direction applicabilities
    ///
    /// The result is one level weaker than the floored mean level, clamped to
    /// 1..=3. Returns `None` for an empty group or one whose directions differ.
    pub fn avg(items: &[Applicability]) -> Option<Applicability> {
        let first = items.first()?;
        let direction = first.direction?;
        if items.iter().any(|a| a.direction != Some(direction)) {
            return None;
        }
        let total: i32 = items.iter().map(|a| a.level as i32).sum();
        let mean = total / items.len() as i32;
        Some(Applicability::with_level(mean, direction) - 1)
    }

    /// Direction word used in explanations
    pub fn direction_str(&self) -> &'static str {
        match self.direction {
            Some(Direction::For) => "for",
            Some(Direction::Against) => "against",
            None => "",
        }
    }

    /// Level word used in explanations
    pub fn level_str(&self) -> &'static str {
        match self.level {
            1 => "partly",
            2 => "mostly",
            3 => "highly",
            _ => "",
        }
    }
}

fn snap(level: i32) -> u8 {
    level.clamp(1, 3) as u8
}

impl Add<i32> for Applicability {
    type Output = Applicability;

    fn add(self, rhs: i32) -> Applicability {
        match self.direction {
            Some(direction) => Applicability::with_level(self.level as i32 + rhs, direction),
            None => self,
        }
    }
}

impl Sub<i32> for Applicability {
    type Output = Applicability;

    fn sub(self, rhs: i32) -> Applicability {
        self + (-rhs)
    }
}

impl Neg for Applicability {
    type Output = Applicability;

    fn neg(self) -> Applicability {
        Applicability {
            direction: self.direction.map(Direction::flip),
            level: self.level,
        }
    }
}

impl fmt::Display for Applicability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            return f.write_str("nil");
        }
        write!(f, "{} {}", self.level_str(), self.direction_str())
    }
}
