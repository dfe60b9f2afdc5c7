use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use relink_config::Scoring;
use relink_domain::{
	factors::{self, Factor, FactorKind},
	lexical, names, proximity,
};
use relink_storage::models::{Appointment, Note, Subject};

pub(crate) const MAX_CONTEXT_TERMS: usize = 16;
pub(crate) const MAX_TEXT_TERMS: usize = 512;

/// A non-committed proposal produced by one scoring pass. Ephemeral:
/// consumed by auto-commit or display, never persisted.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LinkSuggestion {
	pub note_id: Uuid,
	pub appointment_id: Uuid,
	pub confidence: f32,
	pub reason: String,
	pub factors: Vec<Factor>,
}

struct Candidate {
	suggestion: LinkSuggestion,
	proximity: f32,
	starts_at: OffsetDateTime,
	appointment_id: Uuid,
}

pub(crate) fn appointment_context(appointment: &Appointment, subject: &Subject) -> String {
	let mut context = format!("{} with {}", appointment.appointment_type, subject.full_name());

	if let Some(location) = appointment.location.as_deref() {
		context.push_str(" at ");
		context.push_str(location);
	}

	context
}

pub(crate) fn note_text(note: &Note) -> String {
	match note.title.as_deref() {
		Some(title) => format!("{title}\n{}", note.content),
		None => note.content.clone(),
	}
}

/// Scores one unlinked note against the subject's appointment pool.
/// Pure given its inputs; repeated calls yield identical ordering.
pub(crate) fn score_note(
	cfg: &Scoring,
	note: &Note,
	subject: &Subject,
	pool: &[Appointment],
	taken: &HashMap<Uuid, Uuid>,
	ai_scores: &HashMap<Uuid, f32>,
) -> Vec<LinkSuggestion> {
	let text = note_text(note);
	let pattern_template = names::matches_template(&text, &subject.full_name());
	let mut candidates = Vec::new();

	for appointment in pool {
		if appointment.subject_id != note.subject_id {
			continue;
		}
		// One linked note per appointment; a taken slot is a conflict the
		// caller must resolve explicitly.
		if taken
			.get(&appointment.appointment_id)
			.is_some_and(|linked_note| *linked_note != note.note_id)
		{
			continue;
		}

		let mut collected = Vec::new();
		let proximity_value =
			proximity::date_proximity(note.created_at, appointment.starts_at, cfg);
		let gap = proximity::gap_days(note.created_at, appointment.starts_at);

		collected.push(Factor::new(
			FactorKind::DateProximity,
			proximity_value,
			cfg.weights.date_proximity,
			format!("{gap:.1} days from appointment start"),
		));

		let context = appointment_context(appointment, subject);
		let context_tokens = lexical::tokenize(&context, MAX_CONTEXT_TERMS);
		let overlap = lexical::overlap_ratio(&context_tokens, &text, MAX_TEXT_TERMS);

		if overlap > 0.0 {
			collected.push(Factor::new(
				FactorKind::ContentMatch,
				overlap,
				cfg.weights.content_match,
				format!("{:.0}% context overlap", overlap * 100.0),
			));
		}
		if let Some(template) = pattern_template {
			collected.push(Factor::new(
				FactorKind::PatternMatch,
				1.0,
				cfg.weights.pattern_match,
				format!("titled \"{template}\""),
			));
		}
		if let Some(score) = ai_scores.get(&appointment.appointment_id) {
			collected.push(Factor::new(
				FactorKind::AiAnalysis,
				*score,
				cfg.weights.ai_analysis,
				"semantic similarity",
			));
		}

		let confidence = factors::combine(&collected);

		if confidence < cfg.min_confidence {
			continue;
		}

		candidates.push(Candidate {
			suggestion: LinkSuggestion {
				note_id: note.note_id,
				appointment_id: appointment.appointment_id,
				confidence,
				reason: factors::describe(&collected),
				factors: collected,
			},
			proximity: proximity_value,
			starts_at: appointment.starts_at,
			appointment_id: appointment.appointment_id,
		});
	}

	candidates.sort_by(|a, b| {
		b.suggestion
			.confidence
			.total_cmp(&a.suggestion.confidence)
			.then_with(|| b.proximity.total_cmp(&a.proximity))
			.then_with(|| a.starts_at.cmp(&b.starts_at))
			.then_with(|| a.appointment_id.cmp(&b.appointment_id))
	});
	candidates.truncate(cfg.top_k as usize);

	candidates.into_iter().map(|candidate| candidate.suggestion).collect()
}
