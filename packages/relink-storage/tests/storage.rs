//! Round-trip tests against a real Postgres. Skipped unless
//! `RELINK_PG_DSN` points at a reachable server.

use time::macros::{date, datetime};
use uuid::Uuid;

use relink_storage::{Error, db::Db, models, queries};
use relink_testkit::TestDatabase;

async fn test_db() -> Option<(TestDatabase, Db)> {
	let base_dsn = relink_testkit::env_dsn()?;
	let tdb = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = Db::connect(&relink_config::Postgres {
		dsn: tdb.dsn().to_string(),
		pool_max_conns: 2,
	})
	.await
	.expect("Failed to connect to test database.");

	db.ensure_schema().await.expect("Failed to apply schema.");

	Some((tdb, db))
}

fn subject(practice_id: Uuid) -> models::Subject {
	models::Subject {
		subject_id: Uuid::new_v4(),
		practice_id,
		first_name: "John".to_string(),
		last_name: "Best".to_string(),
		created_at: datetime!(2025-07-01 09:00 UTC),
	}
}

fn appointment(subject_id: Uuid) -> models::Appointment {
	models::Appointment {
		appointment_id: Uuid::new_v4(),
		subject_id,
		starts_at: datetime!(2025-07-28 10:00 UTC),
		ends_at: datetime!(2025-07-28 10:50 UTC),
		appointment_type: "Individual Therapy".to_string(),
		status: "scheduled".to_string(),
		calendar_event_id: None,
		location: Some("Room 2".to_string()),
		created_at: datetime!(2025-07-21 09:00 UTC),
	}
}

fn note(subject_id: Uuid) -> models::Note {
	models::Note {
		note_id: Uuid::new_v4(),
		subject_id,
		author_id: Uuid::new_v4(),
		title: Some("Progress Note for John Best".to_string()),
		content: "Reviewed coping strategies.".to_string(),
		source: "manual".to_string(),
		appointment_id: None,
		calendar_event_id: None,
		word_count: None,
		topics: None,
		created_at: datetime!(2025-07-28 11:00 UTC),
		updated_at: datetime!(2025-07-28 11:00 UTC),
	}
}

#[tokio::test]
async fn link_round_trip_persists() {
	let Some((tdb, db)) = test_db().await else {
		eprintln!("Skipping; set RELINK_PG_DSN to run storage tests.");

		return;
	};
	let practice_id = Uuid::new_v4();
	let subject = subject(practice_id);
	let appointment = appointment(subject.subject_id);
	let note = note(subject.subject_id);

	queries::insert_subject(&db, &subject).await.expect("Failed to insert subject.");
	queries::insert_appointment(&db, &appointment).await.expect("Failed to insert appointment.");
	queries::insert_note(&db, &note).await.expect("Failed to insert note.");

	let fetched = queries::note(&db, note.note_id).await.expect("Failed to fetch note.");

	assert_eq!(fetched.appointment_id, None);
	assert_eq!(fetched.content, note.content);

	queries::set_note_appointment(&db, note.note_id, appointment.appointment_id)
		.await
		.expect("Failed to link note.");

	let linked = queries::note(&db, note.note_id).await.expect("Failed to fetch note.");

	assert_eq!(linked.appointment_id, Some(appointment.appointment_id));

	let prior = queries::clear_note_appointment(&db, note.note_id)
		.await
		.expect("Failed to unlink note.");

	assert_eq!(prior, Some(appointment.appointment_id));

	let cleared = queries::note(&db, note.note_id).await.expect("Failed to fetch note.");

	assert_eq!(cleared.appointment_id, None);

	drop(db);

	tdb.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
async fn missing_note_is_not_found() {
	let Some((tdb, db)) = test_db().await else {
		eprintln!("Skipping; set RELINK_PG_DSN to run storage tests.");

		return;
	};
	let result = queries::note(&db, Uuid::new_v4()).await;

	assert!(matches!(result, Err(Error::NotFound(_))));

	drop(db);

	tdb.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
async fn promote_document_retires_the_pending_flag() {
	let Some((tdb, db)) = test_db().await else {
		eprintln!("Skipping; set RELINK_PG_DSN to run storage tests.");

		return;
	};
	let practice_id = Uuid::new_v4();
	let subject = subject(practice_id);
	let document = models::Document {
		document_id: Uuid::new_v4(),
		practice_id,
		subject_id: Some(subject.subject_id),
		uploaded_by: Uuid::new_v4(),
		file_name: "scan-0728.pdf".to_string(),
		extracted_text: "Clinical Progress Note for John Best".to_string(),
		inferred_date: Some(date!(2025-07-28)),
		needs_processing: true,
		note_id: None,
		created_at: datetime!(2025-07-29 08:00 UTC),
	};

	queries::insert_subject(&db, &subject).await.expect("Failed to insert subject.");
	queries::insert_document(&db, &document).await.expect("Failed to insert document.");

	let pending = queries::documents_needing_processing(&db, practice_id)
		.await
		.expect("Failed to list documents.");

	assert_eq!(pending.len(), 1);

	let note_id = queries::promote_document(&db, document.document_id, &models::NewNote {
		subject_id: subject.subject_id,
		author_id: document.uploaded_by,
		title: Some(document.file_name.clone()),
		content: document.extracted_text.clone(),
		source: "upload".to_string(),
		appointment_id: None,
		calendar_event_id: None,
		word_count: Some(6),
		topics: None,
		created_at: datetime!(2025-07-28 10:00 UTC),
	})
	.await
	.expect("Failed to promote document.");

	let promoted = queries::note(&db, note_id).await.expect("Failed to fetch promoted note.");

	assert_eq!(promoted.source, "upload");

	let pending = queries::documents_needing_processing(&db, practice_id)
		.await
		.expect("Failed to list documents.");

	assert!(pending.is_empty());

	// Promoting twice is a conflict, not a duplicate note.
	let second = queries::promote_document(&db, document.document_id, &models::NewNote {
		subject_id: subject.subject_id,
		author_id: document.uploaded_by,
		title: None,
		content: String::new(),
		source: "upload".to_string(),
		appointment_id: None,
		calendar_event_id: None,
		word_count: None,
		topics: None,
		created_at: datetime!(2025-07-28 10:00 UTC),
	})
	.await;

	assert!(matches!(second, Err(Error::Conflict(_))));

	drop(db);

	tdb.cleanup().await.expect("Failed to clean up test database.");
}
