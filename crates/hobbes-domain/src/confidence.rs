//! Confidence module - (applicability, validity) pairs and their combination
//!
//! A confidence records how strongly and in which direction evidence bears on
//! a conclusion ([`Applicability`]) together with how trustworthy that evidence
//! is ([`Validity`]). [`Confidence::combine`] folds the confidences of every
//! rule that fired for a conclusion into one value.

use crate::{Applicability, Validity};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Validity ceilings for the true and false sides of a rule
///
/// A rule may be more trustworthy when it concludes one way than the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quality {
    /// Ceiling applied when the unified confidence is true
    pub when_true: Validity,
    /// Ceiling applied when the unified confidence is not true
    pub when_false: Validity,
}

impl Quality {
    /// Build an asymmetric quality
    pub fn new(when_true: Validity, when_false: Validity) -> Self {
        Self {
            when_true,
            when_false,
        }
    }
}

impl From<Validity> for Quality {
    fn from(validity: Validity) -> Self {
        Self::new(validity, validity)
    }
}

impl From<(Validity, Validity)> for Quality {
    fn from((when_true, when_false): (Validity, Validity)) -> Self {
        Self::new(when_true, when_false)
    }
}

/// Belief in a conclusion: direction and strength plus trustworthiness
///
/// Ordering: true confidences outrank all others; within the same truth
/// value, validity then applicability decide, reversed on the false side so
/// that more-true confidences are always larger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Confidence {
    /// Direction and strength
    pub applic: Applicability,
    /// Trustworthiness
    pub valid: Validity,
}

impl Confidence {
    /// Create a new confidence
    pub fn new(applic: Applicability, valid: Validity) -> Self {
        Self { applic, valid }
    }

    /// The "no evidence" confidence
    pub fn nil() -> Self {
        Self::new(Applicability::NIL, Validity::Plausible)
    }

    /// True when the confidence points toward the conclusion
    pub fn is_true(&self) -> bool {
        self.applic.is_true()
    }

    /// True when this carries no evidence
    pub fn is_nil(&self) -> bool {
        self.applic.is_nil()
    }

    /// At least sound and pointing in `dir`
    pub fn is_strongly(&self, dir: bool) -> bool {
        self.valid >= Validity::Sound && self.is_true() == dir
    }

    /// At least probable and pointing in `dir`
    pub fn is_probably(&self, dir: bool) -> bool {
        self.valid >= Validity::Probable && self.is_true() == dir
    }

    /// Compare by magnitude only: validity then applicability, ignoring truth
    pub fn cmp_magnitude(&self, other: &Confidence) -> Ordering {
        self.valid
            .cmp(&other.valid)
            .then_with(|| self.applic.cmp(&other.applic))
    }

    /// Clamp validity to the ceiling matching this confidence's truth
    pub fn cap(self, quality: Quality) -> Self {
        let ceiling = if self.is_true() {
            quality.when_true
        } else {
            quality.when_false
        };
        Self::new(self.applic, self.valid.min(ceiling))
    }

    /// Human-readable strength, e.g. "mostly applicable, sound"
    pub fn level_str(&self) -> String {
        format!("{} applicable, {}", self.applic.level_str(), self.valid)
    }

    /// Direction word
    pub fn direction_str(&self) -> &'static str {
        self.applic.direction_str()
    }

    /// Pairwise minimum of both fields (AND)
    pub fn and_reduce(a: Confidence, b: Confidence) -> Confidence {
        Confidence::new(a.applic.min(b.applic), a.valid.min(b.valid))
    }

    /// The more applicable confidence; ties keep the higher validity (OR)
    pub fn or_reduce(a: Confidence, b: Confidence) -> Confidence {
        match a.applic.cmp(&b.applic) {
            Ordering::Greater => a,
            Ordering::Less => b,
            Ordering::Equal => Confidence::new(a.applic, a.valid.max(b.valid)),
        }
    }

    /// The reducer selected by a template's priority flag
    pub fn unifier(priority: bool) -> fn(Confidence, Confidence) -> Confidence {
        if priority {
            Confidence::and_reduce
        } else {
            Confidence::or_reduce
        }
    }

    /// Combine the confidences of every rule bearing on one conclusion
    ///
    /// 1. Split into true and not-true sides.
    /// 2. On each side, collapse every run of three same-validity confidences
    ///    into one a validity level higher, then keep the top two.
    /// 3. Play the sides off against each other with [`Confidence::single_combine`].
    ///
    /// Nil confidences carry no evidence and are ignored. Returns `None` when
    /// nothing remains to combine, including for empty input; that is not an
    /// error, callers read it as "no evidence".
    pub fn combine(confidences: &[Confidence]) -> Option<Confidence> {
        let (pos, neg): (Vec<Confidence>, Vec<Confidence>) = confidences
            .iter()
            .copied()
            .filter(|c| !c.is_nil())
            .partition(|c| c.is_true());

        let top_pos = Self::aggregate(pos, true);
        let top_neg = Self::aggregate(neg, false);

        if top_pos.is_empty() {
            return top_neg.first().copied();
        }
        if top_neg.is_empty() {
            return Some(top_pos[0]);
        }

        let first = Self::single_combine(top_pos[0], top_neg[0]);

        if top_pos.len() == top_neg.len() {
            if top_pos.len() > 1 {
                let second = Self::single_combine(top_pos[1], top_neg[1]);
                if first.is_true() && !second.is_true() {
                    return Some(Self::single_combine(first, second));
                } else if second.is_true() && !first.is_true() {
                    return Some(Self::single_combine(second, first));
                }
            }
            return Some(first);
        }

        if top_neg.len() == 2 {
            // One pro against two cons.
            if first.is_true() {
                return Some(Self::single_combine(first, top_neg[1]));
            }
        } else if !first.is_true() {
            // Two pros against one con.
            return Some(Self::single_combine(top_pos[1], first));
        }
        Some(first)
    }

    /// Collapse triples of equal validity and return the strongest two
    ///
    /// `descending` sorts most-true first (the pro side); otherwise most-false
    /// first (the con side).
    pub fn aggregate(mut confs: Vec<Confidence>, descending: bool) -> Vec<Confidence> {
        if confs.is_empty() {
            return confs;
        }
        sort_side(&mut confs, descending);

        for validity in Validity::ALL {
            let count = confs.iter().filter(|c| c.valid == validity).count();
            if count < 3 {
                continue;
            }

            let (group, mut rest): (Vec<Confidence>, Vec<Confidence>) =
                confs.into_iter().partition(|c| c.valid == validity);

            let triples = group.chunks_exact(3);
            let leftover = triples.remainder().to_vec();
            for triple in triples {
                let applics: Vec<Applicability> = triple.iter().map(|c| c.applic).collect();
                match Applicability::avg(&applics) {
                    Some(avg) => rest.push(Confidence::new(avg, validity + 1)),
                    None => rest.extend_from_slice(triple),
                }
            }
            rest.extend(leftover);

            sort_side(&mut rest, descending);
            confs = rest;
        }

        confs.truncate(2);
        confs
    }

    /// Resolve one pro confidence against one con confidence
    ///
    /// A side with clearly better validity wins outright; close contests
    /// weaken the winner, and evenly matched evidence largely cancels.
    pub fn single_combine(pos: Confidence, neg: Confidence) -> Confidence {
        let mut lvl = pos.applic.cmp_level(&neg.applic);

        let base = match pos.valid.cmp(&neg.valid) {
            Ordering::Greater => Some(pos),
            Ordering::Less => {
                lvl = -lvl;
                Some(neg)
            }
            Ordering::Equal => None,
        };

        if let Some(base) = base {
            if pos.valid.outscale(neg.valid) || lvl == 2 {
                return base;
            }
            return if lvl < 0 {
                Confidence::new(base.applic, base.valid - 1)
            } else {
                Confidence::new(base.applic - 1, base.valid)
            };
        }

        match lvl {
            1 => Confidence::new(pos.applic - 1, pos.valid - 1),
            2 => Confidence::new(pos.applic - 1, pos.valid),
            l if l < 0 => Confidence::new(neg.applic - pos.applic.level() as i32, neg.valid),
            _ => {
                let mut applic = neg.applic - 1;
                if neg.valid < Validity::Sound {
                    applic = applic - 1;
                }
                Confidence::new(applic, neg.valid - 2)
            }
        }
    }
}

fn sort_side(confs: &mut [Confidence], descending: bool) {
    if descending {
        confs.sort_by(|a, b| b.cmp(a));
    } else {
        confs.sort();
    }
}

impl Ord for Confidence {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.is_true().cmp(&other.is_true()) {
            Ordering::Equal => {
                let magnitude = self.cmp_magnitude(other);
                if self.is_true() {
                    magnitude
                } else {
                    magnitude.reverse()
                }
            }
            truth => truth,
        }
    }
}

impl PartialOrd for Confidence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add<i32> for Confidence {
    type Output = Confidence;

    fn add(self, rhs: i32) -> Confidence {
        Confidence::new(self.applic + rhs, self.valid)
    }
}

impl Sub<i32> for Confidence {
    type Output = Confidence;

    fn sub(self, rhs: i32) -> Confidence {
        Confidence::new(self.applic - rhs, self.valid)
    }
}

impl Neg for Confidence {
    type Output = Confidence;

    fn neg(self) -> Confidence {
        Confidence::new(-self.applic, self.valid)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.applic, self.valid)
    }
}

impl From<(Applicability, Validity)> for Confidence {
    fn from((applic, valid): (Applicability, Validity)) -> Self {
        Self::new(applic, valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Applicability as A, Validity as V};

    fn c(applic: Applicability, valid: Validity) -> Confidence {
        Confidence::new(applic, valid)
    }

    #[test]
    fn test_true_outranks_false() {
        assert!(c(A::MOSTLY_FOR, V::Sound) > c(A::MOSTLY_AGAINST, V::Sound));
        assert!(c(A::PARTLY_FOR, V::Plausible) > c(A::HIGHLY_AGAINST, V::Accepted));
    }

    #[test]
    fn test_false_side_is_reversed() {
        // More strongly against is "less true"
        assert!(c(A::HIGHLY_AGAINST, V::Sound) < c(A::PARTLY_AGAINST, V::Sound));
        assert!(c(A::MOSTLY_AGAINST, V::Accepted) < c(A::MOSTLY_AGAINST, V::Probable));
        assert!(c(A::MOSTLY_FOR, V::Accepted) > c(A::MOSTLY_FOR, V::Probable));
    }

    #[test]
    fn test_cap_uses_matching_side() {
        let quality = Quality::new(V::Sound, V::Probable);
        assert_eq!(c(A::HIGHLY_FOR, V::Accepted).cap(quality).valid, V::Sound);
        assert_eq!(c(A::HIGHLY_AGAINST, V::Accepted).cap(quality).valid, V::Probable);
        assert_eq!(c(A::HIGHLY_AGAINST, V::Plausible).cap(quality).valid, V::Plausible);
    }

    #[test]
    fn test_combine_single_is_identity() {
        let only = c(A::MOSTLY_AGAINST, V::Sound);
        assert_eq!(Confidence::combine(&[only]), Some(only));
    }

    #[test]
    fn test_combine_empty() {
        assert_eq!(Confidence::combine(&[]), None);
        assert_eq!(Confidence::combine(&[Confidence::nil()]), None);
    }

    #[test]
    fn test_combine_one_sided_takes_top() {
        let weak = c(A::PARTLY_FOR, V::Plausible);
        let strong = c(A::HIGHLY_FOR, V::Plausible);
        assert_eq!(Confidence::combine(&[weak, strong]), Some(strong));
    }

    #[test]
    fn test_triple_aggregation_promotes_validity() {
        let confs = vec![c(A::MOSTLY_FOR, V::Plausible); 3];
        let top = Confidence::aggregate(confs.clone(), true);
        assert_eq!(top, vec![c(A::PARTLY_FOR, V::Probable)]);
        assert_eq!(Confidence::combine(&confs), Some(c(A::PARTLY_FOR, V::Probable)));
    }

    #[test]
    fn test_aggregation_cascades() {
        // Nine plausibles become three probables, then one sound
        let confs = vec![c(A::HIGHLY_FOR, V::Plausible); 9];
        let top = Confidence::aggregate(confs, true);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].valid, V::Sound);
    }

    #[test]
    fn test_aggregation_leftovers_pass_through() {
        let mut confs = vec![c(A::HIGHLY_AGAINST, V::Probable); 4];
        confs.push(c(A::PARTLY_AGAINST, V::Accepted));
        let top = Confidence::aggregate(confs, false);
        // most-false first: accepted partly-against, then the sound triple
        assert_eq!(top[0], c(A::PARTLY_AGAINST, V::Accepted));
        assert_eq!(top[1], c(A::MOSTLY_AGAINST, V::Sound));
    }

    #[test]
    fn test_single_combine_outscaled_wins() {
        let pos = c(A::PARTLY_FOR, V::Accepted);
        let neg = c(A::HIGHLY_AGAINST, V::Probable);
        assert_eq!(Confidence::single_combine(pos, neg), pos);
    }

    #[test]
    fn test_single_combine_adjacent_validity() {
        // pos one step better, levels equal: pos keeps validity, loses a level
        let pos = c(A::MOSTLY_FOR, V::Sound);
        let neg = c(A::MOSTLY_AGAINST, V::Probable);
        assert_eq!(Confidence::single_combine(pos, neg), c(A::PARTLY_FOR, V::Sound));

        // neg one step better but weaker applicability: neg drops validity
        let pos = c(A::HIGHLY_FOR, V::Probable);
        let neg = c(A::PARTLY_AGAINST, V::Sound);
        assert_eq!(
            Confidence::single_combine(pos, neg),
            c(A::PARTLY_AGAINST, V::Probable)
        );

        // higher side maximally more extreme: wins untouched
        let pos = c(A::HIGHLY_FOR, V::Sound);
        let neg = c(A::PARTLY_AGAINST, V::Probable);
        assert_eq!(Confidence::single_combine(pos, neg), pos);
    }

    #[test]
    fn test_single_combine_equal_validity() {
        let v = V::Sound;
        assert_eq!(
            Confidence::single_combine(c(A::HIGHLY_FOR, v), c(A::MOSTLY_AGAINST, v)),
            c(A::MOSTLY_FOR, V::Probable)
        );
        assert_eq!(
            Confidence::single_combine(c(A::HIGHLY_FOR, v), c(A::PARTLY_AGAINST, v)),
            c(A::MOSTLY_FOR, v)
        );
        assert_eq!(
            Confidence::single_combine(c(A::PARTLY_FOR, v), c(A::HIGHLY_AGAINST, v)),
            c(A::MOSTLY_AGAINST, v)
        );
        assert_eq!(
            Confidence::single_combine(c(A::MOSTLY_FOR, v), c(A::MOSTLY_AGAINST, v)),
            c(A::PARTLY_AGAINST, V::Plausible)
        );
    }

    #[test]
    fn test_single_combine_equal_levels_low_validity() {
        let v = V::Probable;
        assert_eq!(
            Confidence::single_combine(c(A::HIGHLY_FOR, v), c(A::HIGHLY_AGAINST, v)),
            c(A::PARTLY_AGAINST, V::Plausible)
        );
    }

    #[test]
    fn test_combine_two_against_one() {
        let pos = c(A::HIGHLY_FOR, V::Accepted);
        let neg1 = c(A::MOSTLY_AGAINST, V::Sound);
        let neg2 = c(A::PARTLY_AGAINST, V::Plausible);
        // first: accepted vs sound, lvl 1 -> highly for loses a level
        // then mostly for accepted vs plausible: outscaled, pro wins
        assert_eq!(
            Confidence::combine(&[pos, neg1, neg2]),
            Some(c(A::MOSTLY_FOR, V::Accepted))
        );
    }

    #[test]
    fn test_and_or_reduce() {
        let a = c(A::HIGHLY_FOR, V::Probable);
        let b = c(A::PARTLY_AGAINST, V::Accepted);
        assert_eq!(Confidence::and_reduce(a, b), c(A::PARTLY_AGAINST, V::Probable));
        assert_eq!(Confidence::or_reduce(a, b), a);

        let tie = c(A::HIGHLY_FOR, V::Sound);
        assert_eq!(Confidence::or_reduce(a, tie), tie);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::Direction;
    use proptest::prelude::*;

    fn applicability() -> impl Strategy<Value = Applicability> {
        (1i32..=3, any::<bool>()).prop_map(|(level, dir)| {
            let direction = if dir { Direction::For } else { Direction::Against };
            Applicability::with_level(level, direction)
        })
    }

    fn validity() -> impl Strategy<Value = Validity> {
        (0i32..=3).prop_map(Validity::from_level)
    }

    fn confidence_strategy() -> impl Strategy<Value = Confidence> {
        (applicability(), validity()).prop_map(|(a, v)| Confidence::new(a, v))
    }

    proptest! {
        /// Property: shifting never leaves the 1..=3 band
        #[test]
        fn test_applicability_clamp(a in applicability(), n in -1000i32..1000) {
            prop_assert!((1..=3).contains(&(a + n).level()));
            prop_assert!((1..=3).contains(&(a - n).level()));
            prop_assert_eq!((a + n).direction(), a.direction());
        }

        /// Property: exactly one of <, ==, > holds
        #[test]
        fn test_ordering_total(x in confidence_strategy(), y in confidence_strategy()) {
            let relations = [x < y, x == y, x > y];
            prop_assert_eq!(relations.iter().filter(|r| **r).count(), 1);
        }

        /// Property: combining a single confidence returns it unchanged
        #[test]
        fn test_combine_identity(x in confidence_strategy()) {
            prop_assert_eq!(Confidence::combine(&[x]), Some(x));
        }

        /// Property: combine never produces nil from directional input
        #[test]
        fn test_combine_directional(xs in prop::collection::vec(confidence_strategy(), 1..12)) {
            let combined = Confidence::combine(&xs);
            prop_assert!(combined.is_some());
            prop_assert!(!combined.map(|c| c.is_nil()).unwrap_or(true));
        }

        /// Property: one-sided input never flips direction
        #[test]
        fn test_one_sided_keeps_direction(xs in prop::collection::vec(validity(), 1..10)) {
            let confs: Vec<Confidence> = xs
                .into_iter()
                .map(|v| Confidence::new(Applicability::MOSTLY_FOR, v))
                .collect();
            prop_assert!(Confidence::combine(&confs).map(|c| c.is_true()).unwrap_or(false));
        }

        /// Property: combine does not depend on input order
        #[test]
        fn test_combine_order_independent(xs in prop::collection::vec(confidence_strategy(), 1..8)) {
            let mut reversed = xs.clone();
            reversed.reverse();
            prop_assert_eq!(Confidence::combine(&xs), Confidence::combine(&reversed));
        }
    }
}
