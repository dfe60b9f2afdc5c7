use std::time::Duration;

use tokio::time as tokio_time;
use uuid::Uuid;

use crate::{Error, Result};
use relink_service::{LinkService, ReconcileRequest};

const BASE_BACKOFF_SECONDS: u64 = 5;
const MAX_BACKOFF_SECONDS: u64 = 300;

pub struct WorkerState {
	pub service: LinkService,
	pub practices: Vec<Uuid>,
	pub interval: Duration,
	pub auto_create: bool,
}

pub fn parse_practices(raw: &[String]) -> Result<Vec<Uuid>> {
	let mut practices = Vec::with_capacity(raw.len());

	for value in raw {
		let practice = Uuid::parse_str(value).map_err(|err| {
			Error::Validation(format!("reconcile.practices entry {value:?} is not a UUID: {err}."))
		})?;

		practices.push(practice);
	}

	if practices.is_empty() {
		return Err(Error::Validation(
			"reconcile.practices must name at least one practice.".to_string(),
		));
	}

	Ok(practices)
}

/// Reconciles every configured practice on a fixed interval. A failing
/// tick backs off and retries; it never stops the loop, and per-item
/// isolation inside `reconcile` keeps re-runs safe.
pub async fn run_worker(state: WorkerState) -> Result<()> {
	let mut backoff = Duration::from_secs(BASE_BACKOFF_SECONDS);

	loop {
		let mut tick_failed = false;

		for practice_id in &state.practices {
			match state
				.service
				.reconcile(ReconcileRequest {
					practice_id: *practice_id,
					auto_create: state.auto_create,
				})
				.await
			{
				Ok(report) => {
					tracing::info!(
						%practice_id,
						processed_notes = report.processed_notes,
						processed_documents = report.processed_documents,
						linked_count = report.linked_count,
						documents_promoted = report.documents_promoted,
						appointments_created = report.appointments_created,
						unresolved = report.still_unresolved.len(),
						"Practice reconciled."
					);

					for recommendation in &report.recommendations {
						tracing::info!(%practice_id, recommendation, "Reconciliation recommendation.");
					}
				},
				Err(err) => {
					tick_failed = true;

					tracing::error!(%practice_id, error = %err, "Practice reconciliation failed.");
				},
			}
		}

		if tick_failed {
			tokio_time::sleep(backoff).await;

			backoff = (backoff * 2).min(Duration::from_secs(MAX_BACKOFF_SECONDS));
		} else {
			backoff = Duration::from_secs(BASE_BACKOFF_SECONDS);

			tokio_time::sleep(state.interval).await;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_practices_accepts_uuids() {
		let raw = vec!["b9f1d6de-3d82-4f23-9a4f-6f3d3a1c0001".to_string()];

		assert_eq!(parse_practices(&raw).expect("Failed to parse practices.").len(), 1);
	}

	#[test]
	fn parse_practices_rejects_garbage() {
		let raw = vec!["not-a-uuid".to_string()];

		assert!(matches!(parse_practices(&raw), Err(Error::Validation(_))));
	}

	#[test]
	fn parse_practices_rejects_empty_list() {
		assert!(matches!(parse_practices(&[]), Err(Error::Validation(_))));
	}
}
