use labsend::grade::{
    Classification, GradingRecord, Outcome, PassStatus, RubricScores, SkipReason, classify,
};

fn record(score: Option<f64>) -> GradingRecord {
    GradingRecord::builder()
        .name("John Doe")
        .module("Module-1")
        .maybe_total_score(score)
        .rubric(
            [("Code Quality", 4.0), ("Documentation", 3.5)]
                .into_iter()
                .collect::<RubricScores>(),
        )
        .strengths("Clear structure")
        .gaps("Add tests")
        .build()
}

#[test]
fn missing_or_zero_score_is_reported_first() {
    for score in [None, Some(0.0)] {
        let mut r = record(score);
        r.rubric = RubricScores::new();
        r.strengths.clear();
        r.gaps.clear();
        assert_eq!(
            classify(&r, 0.8),
            Classification::Incomplete(SkipReason::NoScore)
        );
    }
}

#[test]
fn all_zero_or_missing_rubric_is_incomplete() {
    let mut r = record(Some(0.9));
    r.rubric = [("Code Quality", Some(0.0)), ("Documentation", None)]
        .into_iter()
        .collect();
    let c = classify(&r, 0.8);
    assert_eq!(c.skip_reason(), Some(SkipReason::NoRubricScores));
    assert_eq!(c.outcome(), Outcome::Incomplete);
    assert_eq!(c.status(), None);
}

#[test]
fn remarks_alone_are_not_feedback() {
    let mut r = record(Some(0.9));
    r.strengths = "   ".to_string();
    r.gaps = "\n".to_string();
    r.remarks = "See me after class".to_string();
    assert_eq!(classify(&r, 0.8).skip_reason(), Some(SkipReason::NoFeedbackText));
    assert_eq!(SkipReason::NoFeedbackText.to_string(), "no feedback text");
}

#[test]
fn either_feedback_field_is_enough() {
    let mut r = record(Some(0.9));
    r.strengths.clear();
    assert!(classify(&r, 0.8).is_complete());

    let mut r = record(Some(0.9));
    r.gaps.clear();
    assert!(classify(&r, 0.8).is_complete());
}

#[test]
fn threshold_is_inclusive() {
    let r = record(Some(0.8));
    assert_eq!(classify(&r, 0.8).status(), Some(PassStatus::Passed));
    assert_eq!(classify(&r, 0.81).status(), Some(PassStatus::NeedsRedo));
}

#[test]
fn raising_threshold_never_turns_redo_into_pass() {
    let thresholds = [0.0, 0.25, 0.5, 0.7, 0.8, 0.86, 0.9, 1.0];
    for score in [0.1, 0.5, 0.79, 0.8, 0.86, 1.0] {
        let r = record(Some(score));
        let mut seen_redo = false;
        for t in thresholds {
            let status = classify(&r, t).status();
            if seen_redo {
                assert_eq!(status, Some(PassStatus::NeedsRedo), "score {score} at {t}");
            }
            seen_redo |= status == Some(PassStatus::NeedsRedo);
        }
    }
}

#[test]
fn complete_records_carry_their_threshold() {
    let c = classify(&record(Some(0.6)), 0.5);
    assert_eq!(
        c,
        Classification::Complete {
            status:    PassStatus::Passed,
            threshold: 0.5,
        }
    );
    assert_eq!(PassStatus::NeedsRedo.label(), "NEEDS RE-DO");
}
