use crate::core::rules::{
    AgeRule, CasteRule, EligibilityRule, FilterError, GenderRule, IncomeRule, ProfileFacts,
    RuleContext, Verdict,
};
use crate::models::{Candidate, FilterThresholds, FilteredCandidate, UserProfile};

/// A candidate dropped by the filter and the rule that dropped it
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub scheme: String,
    pub rule: &'static str,
    pub reason: String,
}

/// Survivors in ranked order plus everything that was dropped
#[derive(Debug, Default)]
pub struct FilterReport {
    pub candidates: Vec<FilteredCandidate>,
    pub rejections: Vec<Rejection>,
}

enum Decision {
    Keep(FilteredCandidate),
    Drop(Rejection),
}

/// Eligibility post-filter over scorer output
///
/// # Pipeline
/// 1. Skip candidates whose eligibility text is too short to carry a signal
/// 2. Run every rule over the lower-cased text; the first rejection wins
/// 3. Subtract accumulated penalties from the hybrid score (floored at 0)
/// 4. Stable sort by effective score, descending
///
/// The filter holds no per-request state and can be shared across threads.
pub struct EligibilityFilter {
    thresholds: FilterThresholds,
    rules: Vec<Box<dyn EligibilityRule>>,
}

impl EligibilityFilter {
    /// Build the standard rule set: caste, income, gender, age
    pub fn new(thresholds: FilterThresholds) -> Result<Self, FilterError> {
        let rules: Vec<Box<dyn EligibilityRule>> = vec![
            Box::new(CasteRule::new(thresholds.caste_penalty)?),
            Box::new(IncomeRule::new(thresholds.income_window)?),
            Box::new(GenderRule::new()?),
            Box::new(AgeRule::new()?),
        ];

        Ok(Self::with_rules(thresholds, rules))
    }

    pub fn with_default_thresholds() -> Result<Self, FilterError> {
        Self::new(FilterThresholds::default())
    }

    /// Build a filter from an explicit, ordered rule list
    pub fn with_rules(thresholds: FilterThresholds, rules: Vec<Box<dyn EligibilityRule>>) -> Self {
        Self { thresholds, rules }
    }

    pub fn thresholds(&self) -> &FilterThresholds {
        &self.thresholds
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Filter and re-rank `candidates` for `profile`
    pub fn apply(&self, candidates: Vec<Candidate>, profile: &UserProfile) -> Vec<FilteredCandidate> {
        self.apply_with_report(candidates, profile).candidates
    }

    /// Same as [`apply`](Self::apply) but also returns the rejections
    pub fn apply_with_report(&self, candidates: Vec<Candidate>, profile: &UserProfile) -> FilterReport {
        let facts = ProfileFacts::from(profile);
        let mut report = FilterReport {
            candidates: Vec::with_capacity(candidates.len()),
            rejections: Vec::new(),
        };

        for candidate in candidates {
            match self.decide(candidate, &facts) {
                Decision::Keep(kept) => report.candidates.push(kept),
                Decision::Drop(rejection) => {
                    tracing::debug!(
                        "Rejected scheme '{}' by {} rule: {}",
                        rejection.scheme,
                        rejection.rule,
                        rejection.reason
                    );
                    report.rejections.push(rejection);
                }
            }
        }

        // sort_by is stable, so equal scores keep scorer order
        report
            .candidates
            .sort_by(|a, b| b.effective_score().total_cmp(&a.effective_score()));

        report
    }

    fn decide(&self, candidate: Candidate, facts: &ProfileFacts) -> Decision {
        let text = candidate.eligibility().trim();
        if text.chars().count() < self.thresholds.min_text_len {
            return Decision::Keep(FilteredCandidate::unchanged(candidate));
        }

        let normalized = text.to_lowercase();
        let ctx = RuleContext {
            text: &normalized,
            profile: facts,
        };

        let mut penalty = 0.0;
        let mut penalties = Vec::new();
        let mut penalized_by = None;

        for rule in &self.rules {
            match rule.evaluate(&ctx) {
                Verdict::Pass => {}
                Verdict::Penalize { amount, reason } => {
                    penalty += amount;
                    penalties.push(format!("{}: {}", rule.name(), reason));
                    penalized_by.get_or_insert(rule.name());
                }
                Verdict::Reject { reason } => {
                    return Decision::Drop(Rejection {
                        scheme: candidate.name,
                        rule: rule.name(),
                        reason,
                    });
                }
            }
        }

        let Some(rule) = penalized_by else {
            return Decision::Keep(FilteredCandidate::unchanged(candidate));
        };

        // An unscored candidate has nowhere to carry the penalty
        match candidate.score() {
            Some(score) => Decision::Keep(FilteredCandidate {
                adjusted_score: Some((score - penalty).max(0.0)),
                penalties,
                candidate,
            }),
            None => Decision::Drop(Rejection {
                scheme: candidate.name,
                rule,
                reason: format!("unscored candidate cannot be down-ranked ({})", penalties.join("; ")),
            }),
        }
    }
}

impl std::fmt::Debug for EligibilityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EligibilityFilter")
            .field("thresholds", &self.thresholds)
            .field("rules", &self.rule_names())
            .finish()
    }
}
