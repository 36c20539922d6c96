//! Template module - per-rule confidence unification options

use crate::{Confidence, Quality};

/// How a rule turns the confidences of its clauses into one confidence
///
/// Applied in order:
/// 1. Reduce the clause confidences (AND keeps the minimum, OR the maximum)
/// 2. Cap validity by the rule's quality
/// 3. Flip direction if requested
/// 4. Shift applicability by `increment`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Template {
    /// Levels to add to the unified applicability
    pub increment: i32,

    /// Conclude the opposite of what the evidence says
    pub flip: bool,

    /// `true` for an AND rule, `false` for an OR rule
    pub priority: bool,
}

impl Default for Template {
    fn default() -> Self {
        Self::and()
    }
}

impl Template {
    /// Create a template
    pub fn new(flip: bool, priority: bool, increment: i32) -> Self {
        Self {
            increment,
            flip,
            priority,
        }
    }

    /// All clauses must hold
    pub fn and() -> Self {
        Self::new(false, true, 0)
    }

    /// Any clause suffices
    pub fn or() -> Self {
        Self::new(false, false, 0)
    }

    /// All clauses must hold; the rule argues against its conclusion
    pub fn not() -> Self {
        Self::new(true, true, 0)
    }

    /// Builder-style increment
    pub fn with_increment(mut self, increment: i32) -> Self {
        self.increment = increment;
        self
    }

    /// Unify clause confidences into the rule's confidence
    ///
    /// Missing confidences (`None`) are dropped. With nothing left the result
    /// is the nil confidence at plausible validity.
    pub fn unify<Q, I>(&self, quality: Q, confs: I) -> Confidence
    where
        Q: Into<Quality>,
        I: IntoIterator<Item = Option<Confidence>>,
    {
        let reduced = confs
            .into_iter()
            .flatten()
            .reduce(Confidence::unifier(self.priority));

        let Some(conf) = reduced else {
            return Confidence::nil();
        };

        let mut conf = conf.cap(quality.into());
        if self.flip {
            conf = -conf;
        }
        conf + self.increment
    }
}
