//! Arguments: the combined case for or against one conclusion

use crate::conclusion::Conclusion;
use crate::rules::RuleInstance;
use hobbes_domain::Confidence;

/// Everything the rule base had to say about one conclusion
#[derive(Debug, Clone)]
pub struct Argument {
    /// What is being argued
    pub conclusion: Conclusion,
    /// Combined confidence of the fired rules; `None` without evidence
    pub confidence: Option<Confidence>,
    /// Fired rule instances, in rule-base order
    pub evidence: Vec<RuleInstance>,
    /// Some fired rule is more valid than the combined result
    pub conflict: bool,
}

impl Argument {
    /// Combine the fired rules among `runs`
    ///
    /// Rules that did not fire are dropped. Fired rules with a nil
    /// confidence stay in the evidence but take no part in combination.
    pub fn new(conclusion: Conclusion, runs: Vec<RuleInstance>) -> Self {
        let evidence: Vec<RuleInstance> = runs.into_iter().filter(RuleInstance::was_run).collect();
        let confidences: Vec<Confidence> = evidence
            .iter()
            .filter_map(|r| r.confidence)
            .filter(|c| !c.is_nil())
            .collect();

        let confidence = Confidence::combine(&confidences);
        let conflict = match confidence {
            Some(combined) => confidences.iter().any(|c| c.valid > combined.valid),
            None => false,
        };

        Self {
            conclusion,
            confidence,
            evidence,
            conflict,
        }
    }

    /// Whether any rule fired with a usable confidence
    pub fn has_evidence(&self) -> bool {
        self.confidence.is_some()
    }

    /// Whether the argument comes out in favour of its conclusion
    pub fn is_true(&self) -> bool {
        self.confidence.is_some_and(|c| c.is_true())
    }

    /// Fired rules supporting the conclusion
    pub fn pro_evidence(&self) -> impl Iterator<Item = &RuleInstance> {
        self.evidence
            .iter()
            .filter(|r| r.confidence.is_some_and(|c| c.is_true()))
    }

    /// Fired rules opposing the conclusion; nil confidences count for neither side
    pub fn con_evidence(&self) -> impl Iterator<Item = &RuleInstance> {
        self.evidence
            .iter()
            .filter(|r| r.confidence.is_some_and(|c| !c.is_true() && !c.is_nil()))
    }

    /// All fired rules, strongest support first
    pub fn sorted_evidence(&self) -> Vec<&RuleInstance> {
        let mut all: Vec<&RuleInstance> = self.evidence.iter().collect();
        all.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        all
    }
}
