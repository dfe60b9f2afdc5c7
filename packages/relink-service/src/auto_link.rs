use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	LinkService, Result,
	score::{self, LinkSuggestion},
	undo::{HistoryAction, HistoryEntry},
};
use relink_storage::models::{APPOINTMENT_CANCELLED, Appointment, Note, Subject};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AutoLinkRequest {
	pub subject_id: Uuid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AutoLinkError {
	pub note_id: Uuid,
	pub reason: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AutoLinkResponse {
	pub subject_id: Uuid,
	pub linked_count: u32,
	pub total_unlinked: u32,
	pub linked_note_ids: Vec<Uuid>,
	pub suggestions: Vec<LinkSuggestion>,
	pub errors: Vec<AutoLinkError>,
}

impl LinkService {
	/// One pass over a subject's unlinked notes. Confident matches are
	/// committed; the rest come back as suggestions for human review.
	/// Notes are processed independently, so one bad note never aborts
	/// the pass.
	pub async fn auto_link(&self, req: AutoLinkRequest) -> Result<AutoLinkResponse> {
		let now = OffsetDateTime::now_utc();
		let subject = self.store.subject(req.subject_id).await?;
		let notes = self.store.notes_for_subject(req.subject_id).await?;
		let pool = self.store.appointments_for_subject(req.subject_id).await?;
		let mut taken: HashMap<Uuid, Uuid> = notes
			.iter()
			.filter_map(|note| note.appointment_id.map(|appointment| (appointment, note.note_id)))
			.collect();
		let unlinked: Vec<&Note> =
			notes.iter().filter(|note| note.appointment_id.is_none()).collect();
		let total_unlinked = unlinked.len() as u32;
		let ai_scores = self.gather_ai_scores(&unlinked, &pool, &subject, &taken).await;
		let mut linked_note_ids = Vec::new();
		let mut suggestions = Vec::new();
		let mut errors = Vec::new();

		for note in unlinked {
			let per_note_ai: HashMap<Uuid, f32> = pool
				.iter()
				.filter_map(|appointment| {
					ai_scores
						.get(&(note.note_id, appointment.appointment_id))
						.map(|similarity| (appointment.appointment_id, *similarity))
				})
				.collect();
			let scored = score::score_note(
				&self.cfg.scoring,
				note,
				&subject,
				&pool,
				&taken,
				&per_note_ai,
			);
			let Some(top) = scored.first() else { continue };

			if self.commits(top, &pool, &taken) {
				match self.apply_link(note.note_id, top.appointment_id, false).await {
					Ok(()) => {
						taken.insert(top.appointment_id, note.note_id);
						linked_note_ids.push(note.note_id);

						tracing::info!(
							note_id = %note.note_id,
							appointment_id = %top.appointment_id,
							confidence = top.confidence,
							"Auto-linked note."
						);
					},
					Err(err) => errors.push(AutoLinkError {
						note_id: note.note_id,
						reason: err.to_string(),
					}),
				}
			} else {
				suggestions.push(top.clone());
			}
		}

		if !linked_note_ids.is_empty() {
			self.journal.record(HistoryEntry {
				action: HistoryAction::AutoLink,
				note_ids: linked_note_ids.clone(),
				appointment_id: None,
				prior_links: Vec::new(),
				recorded_at: now,
			});
		}

		Ok(AutoLinkResponse {
			subject_id: req.subject_id,
			linked_count: linked_note_ids.len() as u32,
			total_unlinked,
			linked_note_ids,
			suggestions,
			errors,
		})
	}

	fn commits(
		&self,
		top: &LinkSuggestion,
		pool: &[Appointment],
		taken: &HashMap<Uuid, Uuid>,
	) -> bool {
		if top.confidence < self.cfg.scoring.commit_threshold {
			return false;
		}
		if taken.contains_key(&top.appointment_id) {
			return false;
		}

		// Cancelled slots stay in the pool for display but are never
		// committed without a human in the loop.
		pool.iter()
			.find(|appointment| appointment.appointment_id == top.appointment_id)
			.is_some_and(|appointment| appointment.status != APPOINTMENT_CANCELLED)
	}

	/// Gathers similarity scores for every eligible (note, appointment)
	/// pair, in fixed-size chunks of notes with a pause between chunks.
	/// Provider failures degrade to scoring without the factor.
	pub(crate) async fn gather_ai_scores(
		&self,
		notes: &[&Note],
		pool: &[Appointment],
		subject: &Subject,
		taken: &HashMap<Uuid, Uuid>,
	) -> HashMap<(Uuid, Uuid), f32> {
		let mut scores = HashMap::new();

		if !self.cfg.providers.similarity.enabled || notes.is_empty() || pool.is_empty() {
			return scores;
		}

		let chunk_size = self.cfg.reconcile.ai_chunk_size.max(1) as usize;
		let pause = std::time::Duration::from_millis(self.cfg.reconcile.ai_chunk_pause_ms);
		let chunk_count = notes.len().div_ceil(chunk_size);

		for (index, chunk) in notes.chunks(chunk_size).enumerate() {
			for note in chunk {
				let text = score::note_text(note);

				for appointment in pool {
					if appointment.subject_id != note.subject_id {
						continue;
					}
					if taken
						.get(&appointment.appointment_id)
						.is_some_and(|linked_note| *linked_note != note.note_id)
					{
						continue;
					}

					let context = score::appointment_context(appointment, subject);

					match self
						.similarity
						.similarity(&self.cfg.providers.similarity, &text, &context)
						.await
					{
						Ok(Some(similarity)) => {
							scores.insert(
								(note.note_id, appointment.appointment_id),
								similarity,
							);
						},
						Ok(None) => {},
						Err(err) => {
							tracing::warn!(
								note_id = %note.note_id,
								appointment_id = %appointment.appointment_id,
								error = %err,
								"Similarity provider failed; scoring without the factor."
							);
						},
					}
				}
			}

			if index + 1 < chunk_count && !pause.is_zero() {
				tokio::time::sleep(pause).await;
			}
		}

		scores
	}
}
