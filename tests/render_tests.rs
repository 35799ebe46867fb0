use labsend::{
    constants::{NEEDS_REDO_COLOR, PASSED_COLOR},
    grade::{
        GradingRecord, PlagiarismResult, RenderError, RubricScores, SkipReason, classify, render,
    },
};

fn record() -> GradingRecord {
    GradingRecord::builder()
        .name("John Doe")
        .module("Module-1")
        .lab_title("Intro to Git".to_string())
        .total_score(0.86)
        .rubric(
            [("Code Quality", Some(4.0)), ("Documentation", Some(3.5)), ("Testing", None)]
                .into_iter()
                .collect::<RubricScores>(),
        )
        .attempt(2)
        .redo_required(true)
        .plagiarism(PlagiarismResult::Passed)
        .strengths("Clean commit history")
        .gaps("Write <longer> messages\nand squash fixups")
        .build()
}

#[test]
fn subject_names_assignment_and_status() {
    let r = record();
    let email = render(&r, &classify(&r, 0.8), Some("john@example.com")).unwrap();
    assert_eq!(email.subject, "Lab Grade: Intro to Git - PASSED");
    assert_eq!(email.recipient, "john@example.com");
    assert_eq!(email.recipient_name, "John Doe");
    assert_eq!(email.status_color, PASSED_COLOR);

    let email = render(&r, &classify(&r, 0.9), Some("john@example.com")).unwrap();
    assert_eq!(email.subject, "Lab Grade: Intro to Git - NEEDS RE-DO");
    assert_eq!(email.status_color, NEEDS_REDO_COLOR);
}

#[test]
fn subject_falls_back_to_module() {
    let mut r = record();
    r.lab_title = None;
    let email = render(&r, &classify(&r, 0.8), Some("john@example.com")).unwrap();
    assert_eq!(email.subject, "Lab Grade: Module-1 - PASSED");
}

#[test]
fn plain_body_has_every_section_in_order() {
    let r = record();
    let email = render(&r, &classify(&r, 0.8), Some("john@example.com")).unwrap();
    let text = &email.text;

    assert!(text.starts_with("Dear John Doe,"));
    assert!(text.contains("Status: PASSED"));
    assert!(text.contains("Total Score: 0.86 (86%)"));
    assert!(text.contains("Passing Score: 0.80 (80%)"));
    assert!(text.contains("Attempt: 2nd"));
    assert!(text.contains("Re-do Required: Yes"));
    assert!(text.contains("Plagiarism Check: Passed"));
    assert!(text.contains("Code Quality: 4\nDocumentation: 3.5\nTesting: -\n"));

    let sections = [
        "== Grade Summary ==",
        "== Rubric Scores ==",
        "== Strengths ==",
        "== Areas for Improvement ==",
        "== Additional Remarks ==",
    ];
    let positions: Vec<usize> = sections
        .iter()
        .map(|s| text.find(s).unwrap_or_else(|| panic!("missing {s}")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn empty_sections_are_still_rendered() {
    let mut r = record();
    r.gaps.clear();
    r.remarks.clear();
    let email = render(&r, &classify(&r, 0.8), Some("john@example.com")).unwrap();
    assert!(email.text.contains("== Areas for Improvement ==\n\n\n== Additional Remarks =="));
}

#[test]
fn html_escapes_feedback_and_keeps_line_breaks() {
    let r = record();
    let email = render(&r, &classify(&r, 0.8), Some("john@example.com")).unwrap();
    assert!(email.html.contains("Write &lt;longer&gt; messages<br>and squash fixups"));
    assert!(email.html.contains(PASSED_COLOR));
    assert!(email.html.contains("Code Quality"));
}

#[test]
fn rendering_is_deterministic() {
    let r = record();
    let c = classify(&r, 0.8);
    let first = render(&r, &c, Some("john@example.com")).unwrap();
    let second = render(&r, &c, Some("john@example.com")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn incomplete_records_are_rejected() {
    let mut r = record();
    r.total_score = Some(0.0);
    let err = render(&r, &classify(&r, 0.8), Some("john@example.com")).unwrap_err();
    assert_eq!(err, RenderError::Incomplete(SkipReason::NoScore));
}

#[test]
fn missing_recipient_is_rejected() {
    let r = record();
    let c = classify(&r, 0.8);
    assert_eq!(
        render(&r, &c, None).unwrap_err(),
        RenderError::MissingRecipient("John Doe".to_string())
    );
    assert!(render(&r, &c, Some("  ")).is_err());
}

#[test]
fn excerpt_and_test_copies() {
    let r = record();
    let email = render(&r, &classify(&r, 0.8), Some("john@example.com")).unwrap();

    assert_eq!(email.excerpt(4), "Dear...");
    assert_eq!(email.excerpt(usize::MAX), email.text);

    let test = email.as_test("me@example.com");
    assert_eq!(test.recipient, "me@example.com");
    assert_eq!(test.subject, "Lab Grade: Intro to Git - PASSED [TEST]");
    assert_eq!(test.text, email.text);
}
