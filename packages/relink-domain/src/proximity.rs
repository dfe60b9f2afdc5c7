use time::OffsetDateTime;

use relink_config::Scoring;

/// How close a note's creation time sits to an appointment's start.
///
/// Same calendar day scores 1.0; otherwise the score decays
/// exponentially with the gap and bottoms out at the configured floor
/// once the gap exceeds the date window.
pub fn date_proximity(
	note_created: OffsetDateTime,
	appointment_start: OffsetDateTime,
	cfg: &Scoring,
) -> f32 {
	if note_created.date() == appointment_start.date() {
		return 1.0;
	}

	let age_days = (note_created - appointment_start).whole_seconds().abs() as f32 / 86_400.0;

	if age_days > cfg.date_window_days {
		return cfg.proximity_floor;
	}

	(-age_days / cfg.proximity_tau_days).exp().max(cfg.proximity_floor)
}

pub fn gap_days(note_created: OffsetDateTime, appointment_start: OffsetDateTime) -> f32 {
	(note_created - appointment_start).whole_seconds().abs() as f32 / 86_400.0
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	fn scoring() -> Scoring {
		Scoring::default()
	}

	#[test]
	fn same_day_scores_highest() {
		let created = datetime!(2025-07-28 10:00 UTC);
		let start = datetime!(2025-07-28 16:00 UTC);

		assert_eq!(date_proximity(created, start, &scoring()), 1.0);
	}

	#[test]
	fn decays_monotonically_with_distance() {
		let cfg = scoring();
		let start = datetime!(2025-07-28 10:00 UTC);
		let one_day = date_proximity(datetime!(2025-07-29 10:00 UTC), start, &cfg);
		let three_days = date_proximity(datetime!(2025-07-31 10:00 UTC), start, &cfg);
		let ten_days = date_proximity(datetime!(2025-08-07 10:00 UTC), start, &cfg);

		assert!(one_day < 1.0);
		assert!(three_days < one_day);
		assert!(ten_days < three_days);
	}

	#[test]
	fn floors_beyond_the_window() {
		let cfg = scoring();
		let start = datetime!(2025-07-01 10:00 UTC);
		let far = date_proximity(datetime!(2025-08-30 10:00 UTC), start, &cfg);

		assert_eq!(far, cfg.proximity_floor);
	}
}
