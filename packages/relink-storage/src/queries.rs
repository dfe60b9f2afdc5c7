use serde_json::Value;
use uuid::Uuid;

use crate::{
	Error, Result,
	db::Db,
	models::{Appointment, Document, NewAppointment, NewNote, Note, Subject},
};

pub async fn subject(db: &Db, subject_id: Uuid) -> Result<Subject> {
	sqlx::query_as::<_, Subject>(
		"\
SELECT subject_id, practice_id, first_name, last_name, created_at
FROM subjects
WHERE subject_id = $1",
	)
	.bind(subject_id)
	.fetch_optional(&db.pool)
	.await?
	.ok_or_else(|| Error::NotFound(format!("subject {subject_id}")))
}

pub async fn subjects_for_practice(db: &Db, practice_id: Uuid) -> Result<Vec<Subject>> {
	let subjects = sqlx::query_as::<_, Subject>(
		"\
SELECT subject_id, practice_id, first_name, last_name, created_at
FROM subjects
WHERE practice_id = $1
ORDER BY last_name, first_name, subject_id",
	)
	.bind(practice_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(subjects)
}

pub async fn note(db: &Db, note_id: Uuid) -> Result<Note> {
	sqlx::query_as::<_, Note>(
		"\
SELECT note_id, subject_id, author_id, title, content, source, appointment_id,
	calendar_event_id, word_count, topics, created_at, updated_at
FROM notes
WHERE note_id = $1",
	)
	.bind(note_id)
	.fetch_optional(&db.pool)
	.await?
	.ok_or_else(|| Error::NotFound(format!("note {note_id}")))
}

pub async fn notes_for_subject(db: &Db, subject_id: Uuid) -> Result<Vec<Note>> {
	let notes = sqlx::query_as::<_, Note>(
		"\
SELECT note_id, subject_id, author_id, title, content, source, appointment_id,
	calendar_event_id, word_count, topics, created_at, updated_at
FROM notes
WHERE subject_id = $1
ORDER BY created_at, note_id",
	)
	.bind(subject_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(notes)
}

pub async fn appointment(db: &Db, appointment_id: Uuid) -> Result<Appointment> {
	sqlx::query_as::<_, Appointment>(
		"\
SELECT appointment_id, subject_id, starts_at, ends_at, appointment_type, status,
	calendar_event_id, location, created_at
FROM appointments
WHERE appointment_id = $1",
	)
	.bind(appointment_id)
	.fetch_optional(&db.pool)
	.await?
	.ok_or_else(|| Error::NotFound(format!("appointment {appointment_id}")))
}

pub async fn appointments_for_subject(db: &Db, subject_id: Uuid) -> Result<Vec<Appointment>> {
	let appointments = sqlx::query_as::<_, Appointment>(
		"\
SELECT appointment_id, subject_id, starts_at, ends_at, appointment_type, status,
	calendar_event_id, location, created_at
FROM appointments
WHERE subject_id = $1
ORDER BY starts_at, appointment_id",
	)
	.bind(subject_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(appointments)
}

/// One atomic UPDATE; readers never observe a half-written link.
pub async fn set_note_appointment(db: &Db, note_id: Uuid, appointment_id: Uuid) -> Result<()> {
	let result = sqlx::query(
		"UPDATE notes SET appointment_id = $2, updated_at = now() WHERE note_id = $1",
	)
	.bind(note_id)
	.bind(appointment_id)
	.execute(&db.pool)
	.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("note {note_id}")));
	}

	Ok(())
}

/// Clears the link and returns the prior appointment id, if any.
pub async fn clear_note_appointment(db: &Db, note_id: Uuid) -> Result<Option<Uuid>> {
	let mut tx = db.pool.begin().await?;
	let prior = sqlx::query_scalar::<_, Option<Uuid>>(
		"SELECT appointment_id FROM notes WHERE note_id = $1 FOR UPDATE",
	)
	.bind(note_id)
	.fetch_optional(&mut *tx)
	.await?
	.ok_or_else(|| Error::NotFound(format!("note {note_id}")))?;

	sqlx::query("UPDATE notes SET appointment_id = NULL, updated_at = now() WHERE note_id = $1")
		.bind(note_id)
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;

	Ok(prior)
}

pub async fn set_note_metadata(
	db: &Db,
	note_id: Uuid,
	topics: &Value,
	word_count: i32,
) -> Result<()> {
	let result = sqlx::query(
		"UPDATE notes SET topics = $2, word_count = $3, updated_at = now() WHERE note_id = $1",
	)
	.bind(note_id)
	.bind(topics)
	.bind(word_count)
	.execute(&db.pool)
	.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("note {note_id}")));
	}

	Ok(())
}

pub async fn documents_needing_processing(db: &Db, practice_id: Uuid) -> Result<Vec<Document>> {
	let documents = sqlx::query_as::<_, Document>(
		"\
SELECT document_id, practice_id, subject_id, uploaded_by, file_name, extracted_text,
	inferred_date, needs_processing, note_id, created_at
FROM documents
WHERE practice_id = $1 AND needs_processing
ORDER BY created_at, document_id",
	)
	.bind(practice_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(documents)
}

pub async fn create_appointment(db: &Db, appointment: &NewAppointment) -> Result<Uuid> {
	if appointment.starts_at >= appointment.ends_at {
		return Err(Error::InvalidArgument(
			"Appointment start must precede its end.".to_string(),
		));
	}

	let appointment_id = Uuid::new_v4();

	sqlx::query(
		"\
INSERT INTO appointments (
	appointment_id,
	subject_id,
	starts_at,
	ends_at,
	appointment_type,
	status,
	calendar_event_id,
	location
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
	)
	.bind(appointment_id)
	.bind(appointment.subject_id)
	.bind(appointment.starts_at)
	.bind(appointment.ends_at)
	.bind(appointment.appointment_type.as_str())
	.bind(appointment.status.as_str())
	.bind(appointment.calendar_event_id.as_deref())
	.bind(appointment.location.as_deref())
	.execute(&db.pool)
	.await?;

	Ok(appointment_id)
}

/// Promotes a processed document into a note and retires the pending
/// flag in one transaction.
pub async fn promote_document(db: &Db, document_id: Uuid, note: &NewNote) -> Result<Uuid> {
	let mut tx = db.pool.begin().await?;
	let pending = sqlx::query_scalar::<_, bool>(
		"SELECT needs_processing FROM documents WHERE document_id = $1 FOR UPDATE",
	)
	.bind(document_id)
	.fetch_optional(&mut *tx)
	.await?
	.ok_or_else(|| Error::NotFound(format!("document {document_id}")))?;

	if !pending {
		return Err(Error::Conflict(format!("document {document_id} is already processed")));
	}

	let note_id = Uuid::new_v4();

	sqlx::query(
		"\
INSERT INTO notes (
	note_id,
	subject_id,
	author_id,
	title,
	content,
	source,
	appointment_id,
	calendar_event_id,
	word_count,
	topics,
	created_at,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)",
	)
	.bind(note_id)
	.bind(note.subject_id)
	.bind(note.author_id)
	.bind(note.title.as_deref())
	.bind(note.content.as_str())
	.bind(note.source.as_str())
	.bind(note.appointment_id)
	.bind(note.calendar_event_id.as_deref())
	.bind(note.word_count)
	.bind(note.topics.as_ref())
	.bind(note.created_at)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"UPDATE documents SET note_id = $2, needs_processing = FALSE WHERE document_id = $1",
	)
	.bind(document_id)
	.bind(note_id)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(note_id)
}

pub async fn insert_subject(db: &Db, subject: &Subject) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO subjects (subject_id, practice_id, first_name, last_name, created_at)
VALUES ($1, $2, $3, $4, $5)",
	)
	.bind(subject.subject_id)
	.bind(subject.practice_id)
	.bind(subject.first_name.as_str())
	.bind(subject.last_name.as_str())
	.bind(subject.created_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn insert_note(db: &Db, note: &Note) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO notes (
	note_id,
	subject_id,
	author_id,
	title,
	content,
	source,
	appointment_id,
	calendar_event_id,
	word_count,
	topics,
	created_at,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
	)
	.bind(note.note_id)
	.bind(note.subject_id)
	.bind(note.author_id)
	.bind(note.title.as_deref())
	.bind(note.content.as_str())
	.bind(note.source.as_str())
	.bind(note.appointment_id)
	.bind(note.calendar_event_id.as_deref())
	.bind(note.word_count)
	.bind(note.topics.as_ref())
	.bind(note.created_at)
	.bind(note.updated_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn insert_appointment(db: &Db, appointment: &Appointment) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO appointments (
	appointment_id,
	subject_id,
	starts_at,
	ends_at,
	appointment_type,
	status,
	calendar_event_id,
	location,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
	)
	.bind(appointment.appointment_id)
	.bind(appointment.subject_id)
	.bind(appointment.starts_at)
	.bind(appointment.ends_at)
	.bind(appointment.appointment_type.as_str())
	.bind(appointment.status.as_str())
	.bind(appointment.calendar_event_id.as_deref())
	.bind(appointment.location.as_deref())
	.bind(appointment.created_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn insert_document(db: &Db, document: &Document) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO documents (
	document_id,
	practice_id,
	subject_id,
	uploaded_by,
	file_name,
	extracted_text,
	inferred_date,
	needs_processing,
	note_id,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
	)
	.bind(document.document_id)
	.bind(document.practice_id)
	.bind(document.subject_id)
	.bind(document.uploaded_by)
	.bind(document.file_name.as_str())
	.bind(document.extracted_text.as_str())
	.bind(document.inferred_date)
	.bind(document.needs_processing)
	.bind(document.note_id)
	.bind(document.created_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}
