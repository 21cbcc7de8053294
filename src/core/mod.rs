// Core algorithm exports
pub mod filter;
pub mod rules;

pub use filter::{EligibilityFilter, FilterReport, Rejection};
pub use rules::{AgeRule, CasteRule, EligibilityRule, FilterError, GenderRule, IncomeRule, ProfileFacts, RuleContext, Verdict};
