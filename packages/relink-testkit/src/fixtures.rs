use time::OffsetDateTime;
use uuid::Uuid;

use relink_storage::models::{Appointment, Document, Note, SOURCE_MANUAL, Subject};

pub fn subject(practice_id: Uuid, first_name: &str, last_name: &str) -> Subject {
	Subject {
		subject_id: Uuid::new_v4(),
		practice_id,
		first_name: first_name.to_string(),
		last_name: last_name.to_string(),
		created_at: OffsetDateTime::now_utc(),
	}
}

pub fn note(subject_id: Uuid, content: &str, created_at: OffsetDateTime) -> Note {
	Note {
		note_id: Uuid::new_v4(),
		subject_id,
		author_id: Uuid::new_v4(),
		title: None,
		content: content.to_string(),
		source: SOURCE_MANUAL.to_string(),
		appointment_id: None,
		calendar_event_id: None,
		word_count: None,
		topics: None,
		created_at,
		updated_at: created_at,
	}
}

pub fn titled_note(
	subject_id: Uuid,
	title: &str,
	content: &str,
	created_at: OffsetDateTime,
) -> Note {
	Note { title: Some(title.to_string()), ..note(subject_id, content, created_at) }
}

pub fn appointment(subject_id: Uuid, starts_at: OffsetDateTime) -> Appointment {
	Appointment {
		appointment_id: Uuid::new_v4(),
		subject_id,
		starts_at,
		ends_at: starts_at + time::Duration::minutes(50),
		appointment_type: "Individual Therapy".to_string(),
		status: "scheduled".to_string(),
		calendar_event_id: None,
		location: None,
		created_at: starts_at - time::Duration::days(7),
	}
}

pub fn document(
	practice_id: Uuid,
	subject_id: Option<Uuid>,
	file_name: &str,
	extracted_text: &str,
) -> Document {
	Document {
		document_id: Uuid::new_v4(),
		practice_id,
		subject_id,
		uploaded_by: Uuid::new_v4(),
		file_name: file_name.to_string(),
		extracted_text: extracted_text.to_string(),
		inferred_date: None,
		needs_processing: true,
		note_id: None,
		created_at: OffsetDateTime::now_utc(),
	}
}
