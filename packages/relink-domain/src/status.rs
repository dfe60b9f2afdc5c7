use serde::{Deserialize, Serialize};

/// Derived linking state of a note. Never stored; recomputed from the
/// note's link and the latest scoring pass.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
	Linked,
	Unlinked,
	NeedsReconciliation,
}
impl ReconciliationStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Linked => "linked",
			Self::Unlinked => "unlinked",
			Self::NeedsReconciliation => "needs_reconciliation",
		}
	}
}

/// Derived state of a document awaiting promotion to a note.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
	Matched,
	Pending,
	Unmatched,
}
impl DocumentStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Matched => "matched",
			Self::Pending => "pending",
			Self::Unmatched => "unmatched",
		}
	}
}

pub fn note_status(linked: bool, has_candidates: bool) -> ReconciliationStatus {
	if linked {
		ReconciliationStatus::Linked
	} else if has_candidates {
		ReconciliationStatus::NeedsReconciliation
	} else {
		ReconciliationStatus::Unlinked
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn linked_wins_over_candidates() {
		assert_eq!(note_status(true, true), ReconciliationStatus::Linked);
	}

	#[test]
	fn low_confidence_candidates_need_reconciliation() {
		assert_eq!(note_status(false, true), ReconciliationStatus::NeedsReconciliation);
	}

	#[test]
	fn no_candidates_means_plain_unlinked() {
		assert_eq!(note_status(false, false), ReconciliationStatus::Unlinked);
	}
}
