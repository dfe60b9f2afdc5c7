use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, LinkService, Result,
	undo::{HistoryAction, HistoryEntry},
};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LinkRequest {
	pub note_id: Uuid,
	pub appointment_id: Uuid,
	#[serde(default, rename = "override")]
	pub override_existing: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LinkResponse {
	pub success: bool,
	pub note_id: Uuid,
	pub appointment_id: Uuid,
	pub message: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UnlinkRequest {
	pub note_id: Uuid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UnlinkResponse {
	pub success: bool,
	pub note_id: Uuid,
	pub prior_appointment_id: Option<Uuid>,
	pub message: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BulkLinkRequest {
	pub note_ids: Vec<Uuid>,
	pub appointment_id: Uuid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BulkLinkOutcome {
	pub note_id: Uuid,
	pub success: bool,
	pub reason: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BulkLinkResponse {
	pub success: bool,
	pub appointment_id: Uuid,
	pub linked_count: u32,
	pub failed_count: u32,
	pub outcomes: Vec<BulkLinkOutcome>,
}

impl LinkService {
	pub async fn link_note(&self, req: LinkRequest) -> Result<LinkResponse> {
		let now = OffsetDateTime::now_utc();

		self.apply_link(req.note_id, req.appointment_id, req.override_existing).await?;

		self.journal.record(HistoryEntry {
			action: HistoryAction::Link,
			note_ids: vec![req.note_id],
			appointment_id: Some(req.appointment_id),
			prior_links: Vec::new(),
			recorded_at: now,
		});

		Ok(LinkResponse {
			success: true,
			note_id: req.note_id,
			appointment_id: req.appointment_id,
			message: "Note linked.".to_string(),
		})
	}

	pub async fn unlink_note(&self, req: UnlinkRequest) -> Result<UnlinkResponse> {
		let now = OffsetDateTime::now_utc();
		let prior = self.store.clear_note_appointment(req.note_id).await?;

		self.journal.record(HistoryEntry {
			action: HistoryAction::Unlink,
			note_ids: vec![req.note_id],
			appointment_id: None,
			prior_links: prior
				.map(|appointment_id| vec![(req.note_id, appointment_id)])
				.unwrap_or_default(),
			recorded_at: now,
		});

		let message = if prior.is_some() {
			"Note unlinked.".to_string()
		} else {
			"Note was already unlinked.".to_string()
		};

		Ok(UnlinkResponse {
			success: true,
			note_id: req.note_id,
			prior_appointment_id: prior,
			message,
		})
	}

	pub async fn bulk_link_notes(&self, req: BulkLinkRequest) -> Result<BulkLinkResponse> {
		if req.note_ids.is_empty() {
			return Err(Error::InvalidRequest {
				message: "note_ids must be non-empty.".to_string(),
			});
		}

		let now = OffsetDateTime::now_utc();
		let mut outcomes = Vec::with_capacity(req.note_ids.len());
		let mut linked_ids = Vec::new();

		for note_id in &req.note_ids {
			match self.apply_link(*note_id, req.appointment_id, false).await {
				Ok(()) => {
					linked_ids.push(*note_id);
					outcomes.push(BulkLinkOutcome { note_id: *note_id, success: true, reason: None });
				},
				Err(err) => outcomes.push(BulkLinkOutcome {
					note_id: *note_id,
					success: false,
					reason: Some(err.to_string()),
				}),
			}
		}

		let linked_count = linked_ids.len() as u32;
		let failed_count = (outcomes.len() - linked_ids.len()) as u32;

		self.journal.record(HistoryEntry {
			action: HistoryAction::BulkLink,
			note_ids: linked_ids,
			appointment_id: Some(req.appointment_id),
			prior_links: Vec::new(),
			recorded_at: now,
		});

		Ok(BulkLinkResponse {
			success: failed_count == 0,
			appointment_id: req.appointment_id,
			linked_count,
			failed_count,
			outcomes,
		})
	}

	/// The one state transition: `Unlinked -> Linked(appointment_id)`.
	/// Re-linking an already linked note requires the explicit override.
	pub(crate) async fn apply_link(
		&self,
		note_id: Uuid,
		appointment_id: Uuid,
		override_existing: bool,
	) -> Result<()> {
		let note = self.store.note(note_id).await?;
		let appointment = self.store.appointment(appointment_id).await?;

		if appointment.subject_id != note.subject_id {
			return Err(Error::SubjectMismatch { note_id, appointment_id });
		}
		if let Some(current) = note.appointment_id {
			if current == appointment_id {
				return Ok(());
			}
			if !override_existing {
				return Err(Error::Conflict {
					message: format!(
						"Note {note_id} is already linked to appointment {current}."
					),
				});
			}
		}

		self.store.set_note_appointment(note_id, appointment_id).await?;

		Ok(())
	}
}
