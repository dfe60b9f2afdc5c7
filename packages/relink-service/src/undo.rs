use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{Error, LinkService, Result};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
	Link,
	Unlink,
	BulkLink,
	AutoLink,
}
impl HistoryAction {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Link => "link",
			Self::Unlink => "unlink",
			Self::BulkLink => "bulk_link",
			Self::AutoLink => "auto_link",
		}
	}
}

/// The last reversible action. `note_ids` are the notes the action
/// actually touched; `prior_links` carries what an unlink destroyed so
/// it can be restored.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
	pub action: HistoryAction,
	pub note_ids: Vec<Uuid>,
	pub appointment_id: Option<Uuid>,
	pub prior_links: Vec<(Uuid, Uuid)>,
	pub recorded_at: OffsetDateTime,
}

/// Single-slot, time-limited buffer. Deliberately not a command stack:
/// one interactive session gets one take-back, and it goes stale fast.
pub struct Journal {
	window: Duration,
	slot: Mutex<Option<HistoryEntry>>,
}
impl Journal {
	pub fn new(window: Duration) -> Self {
		Self { window, slot: Mutex::new(None) }
	}

	/// Last writer wins; any pending entry is discarded.
	pub fn record(&self, entry: HistoryEntry) {
		let mut slot = self.slot.lock().unwrap_or_else(|err| err.into_inner());

		*slot = Some(entry);
	}

	/// Removes and returns the pending entry if it is still inside the
	/// window. An empty or stale slot is the same failure: nothing left
	/// to reverse.
	pub fn take_reversible(&self, now: OffsetDateTime) -> Result<HistoryEntry> {
		let mut slot = self.slot.lock().unwrap_or_else(|err| err.into_inner());
		let entry = slot.take().ok_or(Error::Expired)?;

		if now - entry.recorded_at > self.window {
			return Err(Error::Expired);
		}

		Ok(entry)
	}

	pub fn is_empty(&self) -> bool {
		self.slot.lock().unwrap_or_else(|err| err.into_inner()).is_none()
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UndoResponse {
	pub success: bool,
	pub action: HistoryAction,
	pub reverted_note_ids: Vec<Uuid>,
	pub skipped_note_ids: Vec<Uuid>,
	pub message: String,
}

impl LinkService {
	pub async fn undo_last_action(&self) -> Result<UndoResponse> {
		let now = OffsetDateTime::now_utc();
		let entry = self.journal.take_reversible(now)?;
		let mut reverted = Vec::new();
		let mut skipped = Vec::new();

		match entry.action {
			HistoryAction::Link | HistoryAction::BulkLink | HistoryAction::AutoLink => {
				for note_id in &entry.note_ids {
					match self.store.clear_note_appointment(*note_id).await {
						Ok(_) => reverted.push(*note_id),
						Err(err) => {
							tracing::warn!(%note_id, error = %err, "Undo could not unlink note.");
							skipped.push(*note_id);
						},
					}
				}
			},
			HistoryAction::Unlink => {
				for (note_id, appointment_id) in &entry.prior_links {
					// The prior appointment may be gone; the note then
					// stays unlinked rather than failing the whole undo.
					match self.store.appointment(*appointment_id).await {
						Ok(_) => match self.store.set_note_appointment(*note_id, *appointment_id).await
						{
							Ok(()) => reverted.push(*note_id),
							Err(err) => {
								tracing::warn!(%note_id, error = %err, "Undo could not re-link note.");
								skipped.push(*note_id);
							},
						},
						Err(relink_storage::Error::NotFound(_)) => skipped.push(*note_id),
						Err(err) => {
							tracing::warn!(%note_id, error = %err, "Undo could not load prior appointment.");
							skipped.push(*note_id);
						},
					}
				}
			},
		}

		let success = skipped.is_empty();
		let message = if success {
			format!("Reverted {} ({} notes).", entry.action.as_str(), reverted.len())
		} else {
			format!(
				"Reverted {} ({} notes, {} skipped).",
				entry.action.as_str(),
				reverted.len(),
				skipped.len()
			)
		};

		Ok(UndoResponse {
			success,
			action: entry.action,
			reverted_note_ids: reverted,
			skipped_note_ids: skipped,
			message,
		})
	}
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	fn entry(recorded_at: OffsetDateTime) -> HistoryEntry {
		HistoryEntry {
			action: HistoryAction::Link,
			note_ids: vec![Uuid::new_v4()],
			appointment_id: Some(Uuid::new_v4()),
			prior_links: Vec::new(),
			recorded_at,
		}
	}

	#[test]
	fn empty_journal_is_expired() {
		let journal = Journal::new(Duration::seconds(30));

		assert!(matches!(
			journal.take_reversible(datetime!(2025-07-28 10:00 UTC)),
			Err(Error::Expired),
		));
	}

	#[test]
	fn entry_inside_window_is_returned_once() {
		let journal = Journal::new(Duration::seconds(30));
		let recorded = datetime!(2025-07-28 10:00 UTC);

		journal.record(entry(recorded));

		let now = recorded + Duration::seconds(10);

		assert!(journal.take_reversible(now).is_ok());
		assert!(matches!(journal.take_reversible(now), Err(Error::Expired)));
	}

	#[test]
	fn stale_entry_expires() {
		let journal = Journal::new(Duration::seconds(30));
		let recorded = datetime!(2025-07-28 10:00 UTC);

		journal.record(entry(recorded));

		let now = recorded + Duration::seconds(31);

		assert!(matches!(journal.take_reversible(now), Err(Error::Expired)));
		assert!(journal.is_empty());
	}

	#[test]
	fn record_is_last_writer_wins() {
		let journal = Journal::new(Duration::seconds(30));
		let recorded = datetime!(2025-07-28 10:00 UTC);
		let first = entry(recorded);
		let second = entry(recorded + Duration::seconds(5));
		let second_ids = second.note_ids.clone();

		journal.record(first);
		journal.record(second);

		let taken = journal
			.take_reversible(recorded + Duration::seconds(6))
			.expect("Entry must be reversible.");

		assert_eq!(taken.note_ids, second_ids);
	}
}
