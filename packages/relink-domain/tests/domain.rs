use time::macros::{date, datetime};

use relink_config::Scoring;
use relink_domain::{dates, factors, lexical, names, proximity, status, topics};

#[test]
fn factor_kinds_serialize_snake_case() {
	let factor = factors::Factor::new(
		factors::FactorKind::DateProximity,
		1.0,
		0.35,
		"same day",
	);
	let json = serde_json::to_value(&factor).expect("Failed to serialize factor.");

	assert_eq!(json["kind"], "date_proximity");
}

#[test]
fn titled_same_day_note_clears_commit_threshold() {
	let cfg = Scoring::default();
	let title = "Comprehensive Clinical Progress Note for John Best's Therapy Session";
	let created = datetime!(2025-07-28 10:00 UTC);
	let starts = datetime!(2025-07-28 10:00 UTC);
	let mut collected = Vec::new();

	collected.push(factors::Factor::new(
		factors::FactorKind::DateProximity,
		proximity::date_proximity(created, starts, &cfg),
		cfg.weights.date_proximity,
		"same day",
	));

	if let Some(template) = names::matches_template(title, "John Best") {
		collected.push(factors::Factor::new(
			factors::FactorKind::PatternMatch,
			1.0,
			cfg.weights.pattern_match,
			template,
		));
	}

	assert!(factors::combine(&collected) >= cfg.commit_threshold);
}

#[test]
fn proximity_never_increases_with_distance() {
	let cfg = Scoring::default();
	let starts = datetime!(2025-07-28 10:00 UTC);
	let mut previous = proximity::date_proximity(starts, starts, &cfg);

	for day in 1..30 {
		let created = starts + time::Duration::days(day);
		let score = proximity::date_proximity(created, starts, &cfg);

		assert!(score <= previous, "proximity rose at day {day}");

		previous = score;
	}
}

#[test]
fn document_heuristics_recover_subject_and_date() {
	let text = "Clinical Progress Note for Karen Foster\nService date: July 20, 2025\n\
		Client discussed coping strategies for workplace anxiety.";

	assert_eq!(names::extract_name(text), Some("Karen Foster".to_string()));
	assert_eq!(dates::extract_service_date(text), Some(date!(2025-07-20)));
	assert!(topics::extract_topics(text).contains(&"Anxiety".to_string()));
}

#[test]
fn appointment_context_overlap_feeds_content_match() {
	let context = lexical::tokenize("Individual Therapy Downtown Office John Best", 16);
	let ratio = lexical::overlap_ratio(
		&context,
		"Individual therapy with John Best at the downtown office went well.",
		512,
	);

	assert!(ratio > 0.9);
}

#[test]
fn statuses_expose_wire_labels() {
	assert_eq!(status::ReconciliationStatus::NeedsReconciliation.as_str(), "needs_reconciliation");
	assert_eq!(status::DocumentStatus::Unmatched.as_str(), "unmatched");
}
