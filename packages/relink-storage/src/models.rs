use serde_json::Value;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Subject {
	pub subject_id: Uuid,
	pub practice_id: Uuid,
	pub first_name: String,
	pub last_name: String,
	pub created_at: OffsetDateTime,
}
impl Subject {
	pub fn full_name(&self) -> String {
		format!("{} {}", self.first_name, self.last_name)
	}
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Note {
	pub note_id: Uuid,
	pub subject_id: Uuid,
	pub author_id: Uuid,
	pub title: Option<String>,
	pub content: String,
	pub source: String,
	pub appointment_id: Option<Uuid>,
	pub calendar_event_id: Option<String>,
	pub word_count: Option<i32>,
	pub topics: Option<Value>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Appointment {
	pub appointment_id: Uuid,
	pub subject_id: Uuid,
	pub starts_at: OffsetDateTime,
	pub ends_at: OffsetDateTime,
	pub appointment_type: String,
	pub status: String,
	pub calendar_event_id: Option<String>,
	pub location: Option<String>,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Document {
	pub document_id: Uuid,
	pub practice_id: Uuid,
	pub subject_id: Option<Uuid>,
	pub uploaded_by: Uuid,
	pub file_name: String,
	pub extracted_text: String,
	pub inferred_date: Option<Date>,
	pub needs_processing: bool,
	pub note_id: Option<Uuid>,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug)]
pub struct NewNote {
	pub subject_id: Uuid,
	pub author_id: Uuid,
	pub title: Option<String>,
	pub content: String,
	pub source: String,
	pub appointment_id: Option<Uuid>,
	pub calendar_event_id: Option<String>,
	pub word_count: Option<i32>,
	pub topics: Option<Value>,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug)]
pub struct NewAppointment {
	pub subject_id: Uuid,
	pub starts_at: OffsetDateTime,
	pub ends_at: OffsetDateTime,
	pub appointment_type: String,
	pub status: String,
	pub calendar_event_id: Option<String>,
	pub location: Option<String>,
}

pub const SOURCE_MANUAL: &str = "manual";
pub const SOURCE_UPLOAD: &str = "upload";
pub const SOURCE_IMPORT: &str = "import";
pub const SOURCE_TRANSCRIPTION: &str = "transcription";

pub const APPOINTMENT_CANCELLED: &str = "cancelled";
