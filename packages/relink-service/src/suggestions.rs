use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LinkService, Result, score};
use relink_domain::status::{self, ReconciliationStatus};
use relink_storage::models::Note;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SuggestionsRequest {
	pub subject_id: Uuid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NoteSuggestions {
	pub note_id: Uuid,
	pub status: ReconciliationStatus,
	pub suggestions: Vec<score::LinkSuggestion>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SuggestionsResponse {
	pub subject_id: Uuid,
	pub total_unlinked: u32,
	pub notes: Vec<NoteSuggestions>,
}

impl LinkService {
	/// The display path: the same scoring pass as the auto-linker, but
	/// nothing is committed and nothing lands in the journal.
	pub async fn suggestions(&self, req: SuggestionsRequest) -> Result<SuggestionsResponse> {
		let subject = self.store.subject(req.subject_id).await?;
		let notes = self.store.notes_for_subject(req.subject_id).await?;
		let pool = self.store.appointments_for_subject(req.subject_id).await?;
		let taken: HashMap<Uuid, Uuid> = notes
			.iter()
			.filter_map(|note| note.appointment_id.map(|appointment| (appointment, note.note_id)))
			.collect();
		let unlinked: Vec<&Note> =
			notes.iter().filter(|note| note.appointment_id.is_none()).collect();
		let total_unlinked = unlinked.len() as u32;
		let ai_scores = self.gather_ai_scores(&unlinked, &pool, &subject, &taken).await;
		let mut out = Vec::with_capacity(unlinked.len());

		for note in unlinked {
			let per_note_ai: HashMap<Uuid, f32> = pool
				.iter()
				.filter_map(|appointment| {
					ai_scores
						.get(&(note.note_id, appointment.appointment_id))
						.map(|similarity| (appointment.appointment_id, *similarity))
				})
				.collect();
			let suggestions = score::score_note(
				&self.cfg.scoring,
				note,
				&subject,
				&pool,
				&taken,
				&per_note_ai,
			);

			out.push(NoteSuggestions {
				note_id: note.note_id,
				status: status::note_status(false, !suggestions.is_empty()),
				suggestions,
			});
		}

		Ok(SuggestionsResponse { subject_id: req.subject_id, total_unlinked, notes: out })
	}
}
