use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime, Time, macros::time};
use uuid::Uuid;

use crate::{AutoLinkRequest, LinkService, Result, score};
use relink_domain::{dates, lexical, names, status::DocumentStatus, topics};
use relink_storage::models::{
	APPOINTMENT_CANCELLED, Document, NewAppointment, NewNote, Note, SOURCE_UPLOAD, Subject,
};

/// Auto-created appointments assume the practice's standard session:
/// 50 minutes starting at 10:00 when the document carries no time.
const DEFAULT_SESSION_START: Time = time!(10:00);
const DEFAULT_SESSION_LENGTH: Duration = Duration::minutes(50);
const AUTO_CREATED_TYPE: &str = "therapy_session";
const AUTO_CREATED_STATUS: &str = "completed";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ReconcileRequest {
	pub practice_id: Uuid,
	#[serde(default)]
	pub auto_create: bool,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedKind {
	Subject,
	Note,
	Document,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UnresolvedItem {
	pub kind: UnresolvedKind,
	pub id: Uuid,
	pub reason: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ReconcileResponse {
	pub practice_id: Uuid,
	pub processed_notes: u32,
	pub processed_documents: u32,
	pub linked_count: u32,
	pub documents_promoted: u32,
	pub appointments_created: u32,
	pub topics_backfilled: u32,
	pub still_unresolved: Vec<UnresolvedItem>,
	pub recommendations: Vec<String>,
}

enum DocumentOutcome {
	Promoted { appointment_created: bool },
	Unresolved { status: DocumentStatus, reason: String },
}

impl LinkService {
	/// Practice-wide reconciliation: auto-link every subject, promote
	/// pending documents, backfill note metadata, and report what still
	/// needs a human. Per-item failures never abort the batch, so the
	/// whole pass is safe to re-run.
	pub async fn reconcile(&self, req: ReconcileRequest) -> Result<ReconcileResponse> {
		let now = OffsetDateTime::now_utc();
		let subjects = self.store.subjects_for_practice(req.practice_id).await?;
		let mut response = ReconcileResponse {
			practice_id: req.practice_id,
			processed_notes: 0,
			processed_documents: 0,
			linked_count: 0,
			documents_promoted: 0,
			appointments_created: 0,
			topics_backfilled: 0,
			still_unresolved: Vec::new(),
			recommendations: Vec::new(),
		};
		let mut stale_unlinked = 0_u32;

		for subject in &subjects {
			match self.auto_link(AutoLinkRequest { subject_id: subject.subject_id }).await {
				Ok(result) => {
					response.processed_notes += result.total_unlinked;
					response.linked_count += result.linked_count;

					for suggestion in &result.suggestions {
						response.still_unresolved.push(UnresolvedItem {
							kind: UnresolvedKind::Note,
							id: suggestion.note_id,
							reason: format!(
								"Best candidate confidence {:.2} is below the commit threshold.",
								suggestion.confidence
							),
						});
					}
					for error in &result.errors {
						response.still_unresolved.push(UnresolvedItem {
							kind: UnresolvedKind::Note,
							id: error.note_id,
							reason: error.reason.clone(),
						});
					}
				},
				Err(err) => {
					tracing::error!(
						subject_id = %subject.subject_id,
						error = %err,
						"Auto-link failed for subject."
					);
					response.still_unresolved.push(UnresolvedItem {
						kind: UnresolvedKind::Subject,
						id: subject.subject_id,
						reason: err.to_string(),
					});

					continue;
				},
			}

			match self.backfill_subject_metadata(subject.subject_id, now).await {
				Ok((backfilled, stale)) => {
					response.topics_backfilled += backfilled;
					stale_unlinked += stale;
				},
				Err(err) => {
					tracing::warn!(
						subject_id = %subject.subject_id,
						error = %err,
						"Metadata backfill failed for subject."
					);
				},
			}
		}

		let documents = self.store.documents_needing_processing(req.practice_id).await?;

		for document in &documents {
			response.processed_documents += 1;

			match self.reconcile_document(document, &subjects, req.auto_create).await {
				Ok(DocumentOutcome::Promoted { appointment_created }) => {
					response.documents_promoted += 1;

					if appointment_created {
						response.appointments_created += 1;
					}
				},
				Ok(DocumentOutcome::Unresolved { status, reason }) => {
					response.recommendations.push(format!(
						"Document \"{}\" is {}: {reason}",
						document.file_name,
						status.as_str()
					));
					response.still_unresolved.push(UnresolvedItem {
						kind: UnresolvedKind::Document,
						id: document.document_id,
						reason,
					});
				},
				Err(err) => {
					tracing::error!(
						document_id = %document.document_id,
						error = %err,
						"Document reconciliation failed."
					);
					response.still_unresolved.push(UnresolvedItem {
						kind: UnresolvedKind::Document,
						id: document.document_id,
						reason: err.to_string(),
					});
				},
			}
		}

		if stale_unlinked > 0 {
			response.recommendations.push(format!(
				"{stale_unlinked} notes still unlinked after {} days; consider manual review.",
				self.cfg.reconcile.stale_after_days
			));
		}

		Ok(response)
	}

	/// Extracts topics and word counts for notes the tagging service
	/// never reached, and counts unlinked notes past the staleness
	/// window for the recommendations.
	async fn backfill_subject_metadata(
		&self,
		subject_id: Uuid,
		now: OffsetDateTime,
	) -> Result<(u32, u32)> {
		let notes = self.store.notes_for_subject(subject_id).await?;
		let mut backfilled = 0_u32;
		let mut stale = 0_u32;
		let stale_cutoff = Duration::days(self.cfg.reconcile.stale_after_days);

		for note in &notes {
			if note.appointment_id.is_none() && now - note.created_at > stale_cutoff {
				stale += 1;
			}
			if !needs_metadata(note) {
				continue;
			}

			let extracted = topics::extract_topics(&note.content);

			if extracted.is_empty() {
				continue;
			}

			let word_count = lexical::word_count(&note.content) as i32;

			match self.store.set_note_metadata(note.note_id, extracted, word_count).await {
				Ok(()) => backfilled += 1,
				Err(err) => {
					tracing::warn!(
						note_id = %note.note_id,
						error = %err,
						"Could not persist extracted topics."
					);
				},
			}
		}

		Ok((backfilled, stale))
	}

	async fn reconcile_document(
		&self,
		document: &Document,
		subjects: &[Subject],
		auto_create: bool,
	) -> Result<DocumentOutcome> {
		let Some(subject) = resolve_document_subject(document, subjects) else {
			return Ok(DocumentOutcome::Unresolved {
				status: DocumentStatus::Unmatched,
				reason: "no identifiable client; manual review required".to_string(),
			});
		};
		let service_date = document
			.inferred_date
			.or_else(|| dates::extract_service_date(&document.extracted_text));
		let created_at = service_date
			.map(|date| date.with_time(DEFAULT_SESSION_START).assume_utc())
			.unwrap_or(document.created_at);
		// Score the document as if it were the note it will become.
		let draft = draft_note(document, subject, created_at);
		let notes = self.store.notes_for_subject(subject.subject_id).await?;
		let pool = self.store.appointments_for_subject(subject.subject_id).await?;
		let taken: HashMap<Uuid, Uuid> = notes
			.iter()
			.filter_map(|note| note.appointment_id.map(|appointment| (appointment, note.note_id)))
			.collect();
		let draft_ref = [&draft];
		let ai_scores = self.gather_ai_scores(&draft_ref, &pool, subject, &taken).await;
		let per_note_ai: HashMap<Uuid, f32> = ai_scores
			.into_iter()
			.map(|((_, appointment_id), similarity)| (appointment_id, similarity))
			.collect();
		let scored =
			score::score_note(&self.cfg.scoring, &draft, subject, &pool, &taken, &per_note_ai);

		match scored.first() {
			Some(top)
				if top.confidence >= self.cfg.scoring.commit_threshold
					&& pool
						.iter()
						.find(|appointment| appointment.appointment_id == top.appointment_id)
						.is_some_and(|appointment| {
							appointment.status != APPOINTMENT_CANCELLED
						}) =>
			{
				self.promote(document, subject, &draft, Some(top.appointment_id)).await?;

				Ok(DocumentOutcome::Promoted { appointment_created: false })
			},
			Some(top) => Ok(DocumentOutcome::Unresolved {
				status: DocumentStatus::Pending,
				reason: format!(
					"best candidate confidence {:.2} needs reconciliation",
					top.confidence
				),
			}),
			None if auto_create => {
				let Some(date) = service_date else {
					return Ok(DocumentOutcome::Unresolved {
						status: DocumentStatus::Unmatched,
						reason: "no service date could be inferred".to_string(),
					});
				};
				let starts_at = date.with_time(DEFAULT_SESSION_START).assume_utc();
				let appointment_id = self
					.store
					.create_appointment(NewAppointment {
						subject_id: subject.subject_id,
						starts_at,
						ends_at: starts_at + DEFAULT_SESSION_LENGTH,
						appointment_type: AUTO_CREATED_TYPE.to_string(),
						status: AUTO_CREATED_STATUS.to_string(),
						calendar_event_id: None,
						location: None,
					})
					.await
					.map_err(|err| crate::Error::External {
						message: format!("appointment creation failed: {err}"),
					})?;

				tracing::info!(
					document_id = %document.document_id,
					%appointment_id,
					"Created appointment for orphaned document."
				);

				self.promote(document, subject, &draft, Some(appointment_id)).await?;

				Ok(DocumentOutcome::Promoted { appointment_created: true })
			},
			None => Ok(DocumentOutcome::Unresolved {
				status: DocumentStatus::Unmatched,
				reason: "no matching appointment on file".to_string(),
			}),
		}
	}

	async fn promote(
		&self,
		document: &Document,
		subject: &Subject,
		draft: &Note,
		appointment_id: Option<Uuid>,
	) -> Result<()> {
		let extracted = topics::extract_topics(&document.extracted_text);
		let topics =
			if extracted.is_empty() { None } else { Some(serde_json::json!(extracted)) };

		self.store
			.promote_document(document.document_id, NewNote {
				subject_id: subject.subject_id,
				author_id: document.uploaded_by,
				title: Some(document.file_name.clone()),
				content: document.extracted_text.clone(),
				source: SOURCE_UPLOAD.to_string(),
				appointment_id,
				calendar_event_id: None,
				word_count: Some(lexical::word_count(&document.extracted_text) as i32),
				topics,
				created_at: draft.created_at,
			})
			.await?;

		Ok(())
	}
}

fn draft_note(document: &Document, subject: &Subject, created_at: OffsetDateTime) -> Note {
	Note {
		note_id: document.document_id,
		subject_id: subject.subject_id,
		author_id: document.uploaded_by,
		title: Some(document.file_name.clone()),
		content: document.extracted_text.clone(),
		source: SOURCE_UPLOAD.to_string(),
		appointment_id: None,
		calendar_event_id: None,
		word_count: None,
		topics: None,
		created_at,
		updated_at: created_at,
	}
}

fn needs_metadata(note: &Note) -> bool {
	match &note.topics {
		None => true,
		Some(value) => value.as_array().is_none_or(|topics| topics.is_empty()),
	}
}

fn resolve_document_subject<'a>(
	document: &Document,
	subjects: &'a [Subject],
) -> Option<&'a Subject> {
	if let Some(subject_id) = document.subject_id {
		return subjects.iter().find(|subject| subject.subject_id == subject_id);
	}

	let name = names::extract_name(&document.extracted_text)?.to_lowercase();

	subjects.iter().find(|subject| subject.full_name().to_lowercase() == name)
}
