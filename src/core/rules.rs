use regex::Regex;
use thiserror::Error;

use crate::models::UserProfile;

/// Errors raised while building the rule set
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("rule `{rule}` pattern error: {source}")]
    Pattern {
        rule: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("invalid threshold: {0}")]
    InvalidThreshold(String),
}

fn compile(rule: &'static str, pattern: &str) -> Result<Regex, FilterError> {
    Regex::new(pattern).map_err(|source| FilterError::Pattern { rule, source })
}

/// Outcome of a single rule for a single candidate
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Pass,
    Penalize { amount: f64, reason: String },
    Reject { reason: String },
}

/// Profile values normalized once per filter run
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileFacts {
    pub caste: String,
    pub gender: String,
    pub income: f64,
    pub age: Option<u32>,
}

impl From<&UserProfile> for ProfileFacts {
    fn from(profile: &UserProfile) -> Self {
        Self {
            caste: profile.caste(),
            gender: profile.gender_label(),
            income: profile.annual_income(),
            age: profile.known_age(),
        }
    }
}

/// Input seen by every rule: lower-cased eligibility text plus profile facts
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub text: &'a str,
    pub profile: &'a ProfileFacts,
}

/// A single eligibility check over normalized eligibility text
pub trait EligibilityRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict;
}

/// Caste/category keywords and the patterns that detect them
const CASTE_KEYWORDS: &[(&str, &str)] = &[
    ("sc", r"\bsc\b|\bscheduled\s+castes?\b"),
    ("st", r"\bst\b|\bscheduled\s+tribes?\b"),
    ("obc", r"\bobc\b"),
    ("ebc", r"\bebc\b"),
    ("ews", r"\bews\b"),
];

const EXCLUSIVE_PATTERN: &str = r"\b(?:only|exclusively|reserved)\s+(?:for|to)\b";

/// Category reservation rule
///
/// Exclusive phrasing ("reserved for SC/ST") is a hard constraint. A bare
/// category mention that does not cover the user only down-ranks.
pub struct CasteRule {
    keywords: Vec<(&'static str, Regex)>,
    exclusive: Regex,
    penalty: f64,
}

impl CasteRule {
    pub const NAME: &'static str = "caste";

    pub fn new(penalty: f64) -> Result<Self, FilterError> {
        if !penalty.is_finite() || penalty < 0.0 {
            return Err(FilterError::InvalidThreshold(format!(
                "caste penalty must be a non-negative number, got {}",
                penalty
            )));
        }

        let keywords = CASTE_KEYWORDS
            .iter()
            .map(|(keyword, pattern)| Ok((*keyword, compile(Self::NAME, pattern)?)))
            .collect::<Result<Vec<_>, FilterError>>()?;

        Ok(Self {
            keywords,
            exclusive: compile(Self::NAME, EXCLUSIVE_PATTERN)?,
            penalty,
        })
    }

    fn mentioned(&self, text: &str) -> Vec<&'static str> {
        self.keywords
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(keyword, _)| *keyword)
            .collect()
    }
}

impl EligibilityRule for CasteRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        let mentioned = self.mentioned(ctx.text);
        if mentioned.is_empty() {
            return Verdict::Pass;
        }

        let caste = ctx.profile.caste.as_str();
        let covered = !caste.is_empty() && mentioned.iter().any(|k| caste.contains(k));

        if self.exclusive.is_match(ctx.text) {
            if covered {
                Verdict::Pass
            } else {
                Verdict::Reject {
                    reason: format!("reserved for {}", mentioned.join("/")),
                }
            }
        } else if !caste.is_empty() && !covered {
            Verdict::Penalize {
                amount: self.penalty,
                reason: format!("category '{}' not among {}", caste, mentioned.join("/")),
            }
        } else {
            Verdict::Pass
        }
    }
}

/// Negated qualifiers, checked before the plain ones so that "not more than"
/// never reads as "more than". Group 1 is a lower bound, group 2 an upper bound.
const NEGATED_QUALIFIER: &str = r"\bnot\s+(?:(less\s+than|below)|(more\s+than|above|exceed\w*))";
const UPPER_QUALIFIER: &str = r"\bbelow\b|\bless\s+than\b|\bup\s*to\b|<=|≤";
const LOWER_QUALIFIER: &str = r"\babove\b|\bat\s+least\b|\bminimum\b|>=|≥|\bmore\s+than\b";

/// Income ceiling/floor rule
///
/// Looks at the first "income ... <amount>" phrase only. Qualifiers are read
/// from that phrase and up to `window` bytes either side of it, without
/// crossing a clause break. Without a direction qualifier the amount is ignored.
pub struct IncomeRule {
    window: usize,
    phrase: Regex,
    negated: Regex,
    upper: Regex,
    lower: Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    upper: bool,
    lower: bool,
}

impl IncomeRule {
    pub const NAME: &'static str = "income";

    pub fn new(window: usize) -> Result<Self, FilterError> {
        let phrase = format!(
            r"\b(?:annual\s+|family\s+)?income\b.{{0,{}}}?(?:₹|rs\.?|inr)?\s*(\d[\d,.]*)",
            window
        );

        Ok(Self {
            window,
            phrase: compile(Self::NAME, &phrase)?,
            negated: compile(Self::NAME, NEGATED_QUALIFIER)?,
            upper: compile(Self::NAME, UPPER_QUALIFIER)?,
            lower: compile(Self::NAME, LOWER_QUALIFIER)?,
        })
    }

    /// Clause around the first income phrase and its threshold, if the
    /// amount parses
    fn threshold<'t>(&self, text: &'t str) -> Option<(&'t str, u64)> {
        let caps = self.phrase.captures(text)?;
        let span = caps.get(0)?;
        let amount = parse_amount(caps.get(1)?.as_str())?;
        Some((clause_around(text, span.start(), span.end(), self.window), amount))
    }

    fn bounds(&self, span: &str) -> Bounds {
        let mut bounds = Bounds { upper: false, lower: false };

        for caps in self.negated.captures_iter(span) {
            bounds.lower |= caps.get(1).is_some();
            bounds.upper |= caps.get(2).is_some();
        }

        let rest = self.negated.replace_all(span, " ");
        bounds.upper |= self.upper.is_match(&rest);
        bounds.lower |= self.lower.is_match(&rest);
        bounds
    }
}

/// `text[start..end]` widened by up to `window` bytes on each side, stopping
/// at the nearest clause break
fn clause_around(text: &str, start: usize, end: usize, window: usize) -> &str {
    const BREAKS: &[char] = &['.', ',', ';', '\n'];

    let mut lo = start.saturating_sub(window);
    while !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = end.saturating_add(window).min(text.len());
    while !text.is_char_boundary(hi) {
        hi += 1;
    }

    let lo = match text[lo..start].rfind(BREAKS) {
        Some(i) => lo + i + 1,
        None => lo,
    };
    // The amount literal may have swallowed the break itself ("200000.")
    let hi = if text[start..end].ends_with(BREAKS) {
        end
    } else {
        match text[end..hi].find(BREAKS) {
            Some(i) => end + i,
            None => hi,
        }
    };
    &text[lo..hi]
}

/// Digits of a currency literal as an integer amount
///
/// A trailing paise fraction ("2,50,000.00") is dropped; every other
/// separator is ignored. Zero and overflow yield `None`.
fn parse_amount(literal: &str) -> Option<u64> {
    let literal = literal.trim_end_matches(&['.', ','][..]);
    let whole = match literal.rsplit_once('.') {
        Some((head, frac)) if !head.is_empty() && (1..=2).contains(&frac.len()) => head,
        _ => literal,
    };

    let digits: String = whole.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<u64>().ok().filter(|amount| *amount > 0)
}

impl EligibilityRule for IncomeRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        let Some((span, threshold)) = self.threshold(ctx.text) else {
            return Verdict::Pass;
        };

        let bounds = self.bounds(span);
        let income = ctx.profile.income;
        let limit = threshold as f64;

        if bounds.upper && income > limit {
            return Verdict::Reject {
                reason: format!("income {} exceeds limit {}", income, threshold),
            };
        }
        if bounds.lower && income < limit {
            return Verdict::Reject {
                reason: format!("income {} below required {}", income, threshold),
            };
        }
        Verdict::Pass
    }
}

const WOMEN_ONLY: &str = r"\b(?:(?:only|exclusively)\s+(?:for\s+)?(?:women|woman|girls?|females?|ladies)|(?:women|girls|females?|ladies)\s+only)\b";
const MEN_ONLY: &str = r"\b(?:(?:only|exclusively)\s+(?:for\s+)?(?:men|man|boys?|males?)|(?:men|boys|males?)\s+only)\b";

/// Single-gender scheme rule
pub struct GenderRule {
    women_only: Regex,
    men_only: Regex,
}

impl GenderRule {
    pub const NAME: &'static str = "gender";

    pub fn new() -> Result<Self, FilterError> {
        Ok(Self {
            women_only: compile(Self::NAME, WOMEN_ONLY)?,
            men_only: compile(Self::NAME, MEN_ONLY)?,
        })
    }
}

/// "f" and "m" are accepted as abbreviations; "female" never reads as male.
fn is_female(gender: &str) -> bool {
    gender.contains("female") || gender == "f"
}

fn is_male(gender: &str) -> bool {
    (gender.contains("male") && !is_female(gender)) || gender == "m"
}

impl EligibilityRule for GenderRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        let gender = ctx.profile.gender.as_str();
        if gender.is_empty() {
            return Verdict::Pass;
        }

        if self.women_only.is_match(ctx.text) && !is_female(gender) {
            return Verdict::Reject {
                reason: "scheme is for women only".to_string(),
            };
        }
        if self.men_only.is_match(ctx.text) && !is_male(gender) {
            return Verdict::Reject {
                reason: "scheme is for men only".to_string(),
            };
        }
        Verdict::Pass
    }
}

const AGE_RANGE: &str = r"\bbetween\s+(\d{1,3})\s*(?:years?\s+)?(?:and|to|-)\s*(\d{1,3})\b";
const AGE_MIN: &str = r"(?:\bminimum\b|\bat\s+least\b|>=|≥)\s*(?:age\s*)?(?:of\s+|is\s+|:\s*)?(\d{1,3})\b(\s*(?:%|percent|per\s+cent|marks))?";
const AGE_MAX: &str = r"(?:\bmaximum\b|\bnot\s+above\b|<=|≤)\s*(?:age\s*)?(?:of\s+|is\s+|:\s*)?(\d{1,3})\b(\s*(?:%|percent|per\s+cent|marks))?";

/// Age range, minimum and maximum rule
///
/// Each form is checked independently against its first match. The range form
/// is skipped for users with an unknown age; the minimum and maximum forms
/// treat an unknown age as 0.
pub struct AgeRule {
    range: Regex,
    min: Regex,
    max: Regex,
}

impl AgeRule {
    pub const NAME: &'static str = "age";

    pub fn new() -> Result<Self, FilterError> {
        Ok(Self {
            range: compile(Self::NAME, AGE_RANGE)?,
            min: compile(Self::NAME, AGE_MIN)?,
            max: compile(Self::NAME, AGE_MAX)?,
        })
    }

    fn range(&self, text: &str) -> Option<(u32, u32)> {
        let caps = self.range.captures(text)?;
        let a: u32 = caps.get(1)?.as_str().parse().ok()?;
        let b: u32 = caps.get(2)?.as_str().parse().ok()?;
        Some((a.min(b), a.max(b)))
    }

    /// First bound matched by `re`, skipping it when it is a percentage
    fn bound(re: &Regex, text: &str) -> Option<u32> {
        let caps = re.captures(text)?;
        if caps.get(2).is_some() {
            return None;
        }
        caps.get(1)?.as_str().parse().ok()
    }
}

impl EligibilityRule for AgeRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        let known = ctx.profile.age;
        let age = known.unwrap_or(0);

        if let (Some(age), Some((lo, hi))) = (known, self.range(ctx.text)) {
            if age < lo || age > hi {
                return Verdict::Reject {
                    reason: format!("age {} outside {}-{}", age, lo, hi),
                };
            }
        }
        if let Some(min) = Self::bound(&self.min, ctx.text) {
            if age < min {
                return Verdict::Reject {
                    reason: format!("age {} below minimum {}", age, min),
                };
            }
        }
        if let Some(max) = Self::bound(&self.max, ctx.text) {
            if age > max {
                return Verdict::Reject {
                    reason: format!("age {} above maximum {}", age, max),
                };
            }
        }
        Verdict::Pass
    }
}
