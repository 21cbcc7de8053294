// Unit tests for Scheme Rank

use scheme_rank::core::{EligibilityFilter, FilterReport};
use scheme_rank::models::{Candidate, FilteredCandidate, FilterThresholds, UserProfile};

fn filter() -> EligibilityFilter {
    EligibilityFilter::with_default_thresholds().expect("default filter")
}

fn profile(caste: &str, income: f64, gender: &str, age: u32) -> UserProfile {
    UserProfile {
        age,
        income: Some(income),
        caste_group: Some(caste.to_string()),
        occupation: Some("Student".to_string()),
        gender: Some(gender.to_string()),
        state: Some("Odisha".to_string()),
        ..Default::default()
    }
}

fn scheme(text: &str) -> Candidate {
    Candidate::new("Scheme", text, Some(0.7))
}

fn kept(text: &str, profile: &UserProfile) -> bool {
    !filter().apply(vec![scheme(text)], profile).is_empty()
}

fn names(out: &[FilteredCandidate]) -> Vec<&str> {
    out.iter().map(|c| c.candidate.name.as_str()).collect()
}

#[test]
fn test_short_eligibility_text_is_untouched() {
    let base = profile("General", 900000.0, "male", 70);

    for text in ["", "    ", "SC", " ST  ", "OBC "] {
        let candidate = Candidate::new("A", text, Some(0.42));
        let out = filter().apply(vec![candidate.clone()], &base);

        assert_eq!(out.len(), 1, "text {:?}", text);
        assert_eq!(out[0].candidate, candidate);
        assert_eq!(out[0].adjusted_score, None);
    }
}

#[test]
fn test_missing_eligibility_field_is_empty_text() {
    let candidate: Candidate =
        serde_json::from_str(r#"{"scheme_name": "No text", "score_hybrid": 0.3}"#).unwrap();
    let out = filter().apply(vec![candidate], &profile("General", 0.0, "male", 30));

    assert_eq!(out.len(), 1);
}

#[test]
fn test_exclusive_caste() {
    let text = "Only for SC/ST candidates";

    assert!(!kept(text, &profile("General", 0.0, "male", 30)));
    assert!(kept(text, &profile("ST", 0.0, "male", 30)));
}

#[test]
fn test_income_ceiling() {
    let text = "Family income below ₹500000";

    assert!(!kept(text, &profile("General", 600000.0, "male", 30)));
    assert!(kept(text, &profile("General", 400000.0, "male", 30)));
}

#[test]
fn test_women_only() {
    let text = "Open to women only";

    assert!(!kept(text, &profile("General", 0.0, "male", 30)));
    assert!(kept(text, &profile("General", 0.0, "female", 30)));
}

#[test]
fn test_age_range() {
    let text = "Age should be between 18 and 35";

    assert!(!kept(text, &profile("General", 0.0, "male", 40)));
    assert!(kept(text, &profile("General", 0.0, "male", 25)));
}

#[test]
fn test_output_sorted_descending() {
    let candidates = vec![
        Candidate::new("a", "Residents of Odisha", Some(0.9)),
        Candidate::new("b", "Residents of Odisha", Some(0.3)),
        Candidate::new("c", "Residents of Odisha", Some(0.6)),
    ];
    let out = filter().apply(candidates, &profile("General", 0.0, "male", 30));

    let scores: Vec<f64> = out.iter().map(|c| c.effective_score()).collect();
    assert_eq!(scores, vec![0.9, 0.6, 0.3]);
}

#[test]
fn test_soft_caste_mismatch_penalty() {
    let candidates = vec![
        Candidate::new("scored", "Priority to SC households", Some(0.75)),
        Candidate::new("low", "Priority to SC households", Some(0.25)),
    ];
    let out = filter().apply(candidates, &profile("General", 0.0, "male", 30));

    assert_eq!(names(&out), vec!["scored", "low"]);
    assert!((out[0].effective_score() - 0.25).abs() < 1e-9);
    assert_eq!(out[1].effective_score(), 0.0);
}

#[test]
fn test_unknown_profile_values_do_not_reject() {
    let unknown = UserProfile::default();
    let texts = [
        "Age should be between 18 and 35",
        "Maximum age 40 years",
        "Open to women only",
        "Preference to OBC applicants",
    ];

    for text in texts {
        assert!(kept(text, &unknown), "rejected {:?}", text);
    }
}

#[test]
fn test_unknown_age_fails_minimum_age() {
    let unknown = UserProfile::default();

    assert!(!kept("Minimum age of 21 years", &unknown));
    assert!(!kept("Applicants must be at least 18 years old", &unknown));
}

#[test]
fn test_income_qualifier_outside_phrase() {
    let rich = profile("General", 900000.0, "male", 30);

    assert!(!kept("Family income 200000 and below", &rich));
    assert!(!kept("Annual family income of Rs. 2,50,000 or below", &rich));
    assert!(!kept("Should not exceed annual income of 200000", &rich));
}

#[test]
fn test_profile_is_not_mutated() {
    let base = profile("General", 600000.0, "male", 40);
    let before = base.clone();
    let candidates = vec![
        scheme("Only for SC/ST candidates"),
        scheme("Priority to SC households"),
        scheme("Family income below ₹500000"),
    ];

    let _ = filter().apply(candidates, &base);
    assert_eq!(base, before);
}

#[test]
fn test_reapplication_is_idempotent_without_penalties() {
    let base = profile("OBC", 200000.0, "female", 30);
    let candidates = vec![
        Candidate::new("a", "Open to women only", Some(0.4)),
        Candidate::new("b", "Family income below ₹500000", Some(0.8)),
        Candidate::new("c", "Only for SC/ST candidates", Some(0.9)),
    ];

    let once = filter().apply(candidates, &base);
    let again = filter().apply(
        once.clone().into_iter().map(FilteredCandidate::into_candidate).collect(),
        &base,
    );

    assert_eq!(names(&once), vec!["b", "a"]);
    assert_eq!(once, again);
}

#[test]
fn test_reapplication_penalizes_again() {
    // The penalty is reported, not written back, so feeding committed
    // output through the filter again applies it a second time.
    let base = profile("General", 0.0, "male", 30);
    let candidates = vec![Candidate::new("a", "Priority to SC households", Some(0.9))];

    let once = filter().apply(candidates, &base);
    let twice = filter().apply(
        once.into_iter().map(FilteredCandidate::into_candidate).collect(),
        &base,
    );

    assert!((twice[0].effective_score() - 0.0).abs() < 1e-9);
    let committed = twice[0].candidate.hybrid_score.unwrap();
    assert!((committed - 0.4).abs() < 1e-9);
}

#[test]
fn test_report_counts_rejections() {
    let candidates = vec![
        Candidate::new("reserved", "Only for SC/ST candidates", Some(0.9)),
        Candidate::new("women", "Open to women only", Some(0.8)),
        Candidate::new("open", "Residents of Odisha", Some(0.7)),
    ];
    let FilterReport { candidates, rejections } =
        filter().apply_with_report(candidates, &profile("General", 0.0, "male", 30));

    assert_eq!(names(&candidates), vec!["open"]);
    let rules: Vec<&str> = rejections.iter().map(|r| r.rule).collect();
    assert_eq!(rules, vec!["caste", "gender"]);
}

#[test]
fn test_custom_thresholds() {
    let thresholds = FilterThresholds {
        min_text_len: 5,
        caste_penalty: 0.1,
        income_window: 30,
    };
    let lenient = EligibilityFilter::new(thresholds).unwrap();
    let out = lenient.apply(
        vec![Candidate::new("a", "Priority to SC households", Some(0.9))],
        &profile("General", 0.0, "male", 30),
    );

    assert!((out[0].effective_score() - 0.8).abs() < 1e-9);
}

#[test]
fn test_invalid_penalty_is_rejected() {
    let thresholds = FilterThresholds {
        caste_penalty: f64::NAN,
        ..Default::default()
    };

    assert!(EligibilityFilter::new(thresholds).is_err());
}
