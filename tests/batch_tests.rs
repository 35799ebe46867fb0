use labsend::{
    constants::PASSED_COLOR,
    grade::{GradingRecord, MatchTier, PassStatus, RosterEntry, RubricScores, SkipReason, run_module},
};

fn record(name: &str, score: f64) -> GradingRecord {
    GradingRecord::builder()
        .name(name)
        .module("Module-1")
        .total_score(score)
        .rubric([("Code Quality", 4.0)].into_iter().collect::<RubricScores>())
        .strengths("Good work")
        .build()
}

fn roster() -> Vec<RosterEntry> {
    vec![
        RosterEntry::new("John Doe", "john@example.com"),
        RosterEntry::new("Jane Roe", "jane@example.com"),
        RosterEntry::new("Bernice Adime Mawuena", "bernice@example.com"),
        RosterEntry::new("Ama Mensah", "ama@example.com"),
    ]
}

#[test]
fn three_record_scenario() {
    let records = vec![
        record("John Doe", 0.86),
        record("Ama Mensah", 0.0),
        record("Zyx Qwerty", 0.9),
    ];
    let result = run_module(&records, &roster(), 0.8).unwrap();

    assert_eq!(result.sendable.len(), 1);
    assert_eq!(result.sendable[0].status, PassStatus::Passed);
    assert!(result.sendable[0].email.subject.ends_with("PASSED"));
    assert_eq!(result.sendable[0].email.status_color, PASSED_COLOR);
    assert_eq!(result.sendable[0].tier, MatchTier::Exact);

    assert_eq!(result.skipped_incomplete.len(), 1);
    assert_eq!(result.skipped_incomplete[0].reason, SkipReason::NoScore);
    assert_eq!(result.skipped_incomplete[0].reason.to_string(), "no score");

    assert_eq!(result.skipped_unmatched.len(), 1);
    assert_eq!(result.skipped_unmatched[0].name, "Zyx Qwerty");

    assert_eq!(result.counts.total, 3);
    assert_eq!(result.counts.sendable, 1);
    assert_eq!(result.counts.incomplete, 1);
    assert_eq!(result.counts.unmatched, 1);
}

#[test]
fn every_record_lands_in_one_list_in_input_order() {
    let records = vec![
        record("Zyx Qwerty", 0.9),
        record("Jane Roe", 0.5),
        record("Ama Mensah", 0.0),
        record("Nobody Known", 0.7),
        record("John Doe", 0.95),
        record("Kofi Zero", 0.0),
        record("Bernice Mawuena", 0.8),
    ];
    let result = run_module(&records, &roster(), 0.8).unwrap();

    let sendable: Vec<&str> = result.sendable.iter().map(|e| e.record.name.as_str()).collect();
    let incomplete: Vec<&str> = result
        .skipped_incomplete
        .iter()
        .map(|s| s.record.name.as_str())
        .collect();
    let unmatched: Vec<&str> = result.skipped_unmatched.iter().map(|r| r.name.as_str()).collect();

    assert_eq!(sendable, ["Jane Roe", "John Doe", "Bernice Mawuena"]);
    assert_eq!(incomplete, ["Ama Mensah", "Kofi Zero"]);
    assert_eq!(unmatched, ["Zyx Qwerty", "Nobody Known"]);
    assert_eq!(
        sendable.len() + incomplete.len() + unmatched.len(),
        records.len()
    );

    assert_eq!(result.sendable[0].status, PassStatus::NeedsRedo);
    assert_eq!(result.sendable[2].tier, MatchTier::ReversePartial);
    assert_eq!(result.sendable[2].email.recipient, "bernice@example.com");
}

#[test]
fn running_twice_gives_the_same_result() {
    let records = vec![record("John Doe", 0.86), record("Jane Roe", 0.0)];
    let first = run_module(&records, &roster(), 0.8).unwrap();
    let second = run_module(&records, &roster(), 0.8).unwrap();
    assert_eq!(first, second);
}

#[test]
fn empty_input_gives_empty_result() {
    let result = run_module(&[], &roster(), 0.8).unwrap();
    assert!(result.sendable.is_empty());
    assert_eq!(result.counts.total, 0);
}

#[test]
fn previews_follow_send_order() {
    let records = vec![record("Jane Roe", 0.5), record("John Doe", 0.86)];
    let result = run_module(&records, &roster(), 0.8).unwrap();
    let previews = result.previews(10);

    assert_eq!(previews.len(), 2);
    assert_eq!(previews[0].position, 1);
    assert_eq!(previews[0].recipient, "jane@example.com");
    assert_eq!(previews[1].recipient_name, "John Doe");
    assert_eq!(previews[1].excerpt, "Dear John ...");
    assert_eq!(result.emails().count(), 2);
}

#[test]
fn blank_roster_address_is_a_skip_not_an_error() {
    let roster = vec![
        RosterEntry::new("John Doe", " "),
        RosterEntry::new("Jane Roe", "jane@example.com"),
    ];
    let records = vec![record("Jane Roe", 0.9), record("John Doe", 0.9)];
    let result = run_module(&records, &roster, 0.8).unwrap();

    assert_eq!(result.counts.sendable, 1);
    assert_eq!(result.sendable[0].email.recipient, "jane@example.com");
    assert_eq!(result.counts.unmatched, 1);
    assert_eq!(result.skipped_unmatched[0].name, "John Doe");
}
