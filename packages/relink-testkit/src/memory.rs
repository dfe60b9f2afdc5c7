use std::{
	collections::HashSet,
	sync::{Arc, Mutex},
};

use uuid::Uuid;

use relink_service::{BoxFuture, RecordStore, StoreResult};
use relink_storage::{
	Error as StorageError,
	models::{Appointment, Document, NewAppointment, NewNote, Note, Subject},
};

#[derive(Default)]
struct Inner {
	subjects: Vec<Subject>,
	notes: Vec<Note>,
	appointments: Vec<Appointment>,
	documents: Vec<Document>,
	failing_notes: HashSet<Uuid>,
}

/// In-memory `RecordStore` for engine and HTTP tests: no Postgres, same
/// contract, plus per-note failure injection.
#[derive(Default)]
pub struct MemoryStore {
	inner: Mutex<Inner>,
}
impl MemoryStore {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn insert_subject(&self, subject: Subject) {
		self.lock().subjects.push(subject);
	}

	pub fn insert_note(&self, note: Note) {
		self.lock().notes.push(note);
	}

	pub fn insert_appointment(&self, appointment: Appointment) {
		self.lock().appointments.push(appointment);
	}

	pub fn insert_document(&self, document: Document) {
		self.lock().documents.push(document);
	}

	/// Any later patch against this note fails, as a store outage would.
	pub fn fail_note_patches(&self, note_id: Uuid) {
		self.lock().failing_notes.insert(note_id);
	}

	pub fn remove_appointment(&self, appointment_id: Uuid) {
		self.lock().appointments.retain(|a| a.appointment_id != appointment_id);
	}

	pub fn note_snapshot(&self, note_id: Uuid) -> Option<Note> {
		self.lock().notes.iter().find(|note| note.note_id == note_id).cloned()
	}

	pub fn document_snapshot(&self, document_id: Uuid) -> Option<Document> {
		self.lock().documents.iter().find(|doc| doc.document_id == document_id).cloned()
	}

	pub fn notes_snapshot(&self) -> Vec<Note> {
		self.lock().notes.clone()
	}

	pub fn appointments_snapshot(&self) -> Vec<Appointment> {
		self.lock().appointments.clone()
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
		self.inner.lock().unwrap_or_else(|err| err.into_inner())
	}
}
impl RecordStore for MemoryStore {
	fn subject(&self, subject_id: Uuid) -> BoxFuture<'_, StoreResult<Subject>> {
		let result = self
			.lock()
			.subjects
			.iter()
			.find(|subject| subject.subject_id == subject_id)
			.cloned()
			.ok_or_else(|| StorageError::NotFound(format!("subject {subject_id}")));

		Box::pin(async move { result })
	}

	fn subjects_for_practice(
		&self,
		practice_id: Uuid,
	) -> BoxFuture<'_, StoreResult<Vec<Subject>>> {
		let mut subjects: Vec<Subject> = self
			.lock()
			.subjects
			.iter()
			.filter(|subject| subject.practice_id == practice_id)
			.cloned()
			.collect();

		subjects.sort_by(|a, b| {
			(&a.last_name, &a.first_name, a.subject_id)
				.cmp(&(&b.last_name, &b.first_name, b.subject_id))
		});

		Box::pin(async move { Ok(subjects) })
	}

	fn note(&self, note_id: Uuid) -> BoxFuture<'_, StoreResult<Note>> {
		let result = self
			.lock()
			.notes
			.iter()
			.find(|note| note.note_id == note_id)
			.cloned()
			.ok_or_else(|| StorageError::NotFound(format!("note {note_id}")));

		Box::pin(async move { result })
	}

	fn notes_for_subject(&self, subject_id: Uuid) -> BoxFuture<'_, StoreResult<Vec<Note>>> {
		let mut notes: Vec<Note> = self
			.lock()
			.notes
			.iter()
			.filter(|note| note.subject_id == subject_id)
			.cloned()
			.collect();

		notes.sort_by(|a, b| (a.created_at, a.note_id).cmp(&(b.created_at, b.note_id)));

		Box::pin(async move { Ok(notes) })
	}

	fn appointment(&self, appointment_id: Uuid) -> BoxFuture<'_, StoreResult<Appointment>> {
		let result = self
			.lock()
			.appointments
			.iter()
			.find(|appointment| appointment.appointment_id == appointment_id)
			.cloned()
			.ok_or_else(|| StorageError::NotFound(format!("appointment {appointment_id}")));

		Box::pin(async move { result })
	}

	fn appointments_for_subject(
		&self,
		subject_id: Uuid,
	) -> BoxFuture<'_, StoreResult<Vec<Appointment>>> {
		let mut appointments: Vec<Appointment> = self
			.lock()
			.appointments
			.iter()
			.filter(|appointment| appointment.subject_id == subject_id)
			.cloned()
			.collect();

		appointments
			.sort_by(|a, b| (a.starts_at, a.appointment_id).cmp(&(b.starts_at, b.appointment_id)));

		Box::pin(async move { Ok(appointments) })
	}

	fn set_note_appointment(
		&self,
		note_id: Uuid,
		appointment_id: Uuid,
	) -> BoxFuture<'_, StoreResult<()>> {
		let result = {
			let mut inner = self.lock();

			if inner.failing_notes.contains(&note_id) {
				Err(StorageError::InvalidArgument(format!("injected failure for note {note_id}")))
			} else {
				match inner.notes.iter_mut().find(|note| note.note_id == note_id) {
					Some(note) => {
						note.appointment_id = Some(appointment_id);

						Ok(())
					},
					None => Err(StorageError::NotFound(format!("note {note_id}"))),
				}
			}
		};

		Box::pin(async move { result })
	}

	fn clear_note_appointment(&self, note_id: Uuid) -> BoxFuture<'_, StoreResult<Option<Uuid>>> {
		let result = {
			let mut inner = self.lock();

			if inner.failing_notes.contains(&note_id) {
				Err(StorageError::InvalidArgument(format!("injected failure for note {note_id}")))
			} else {
				match inner.notes.iter_mut().find(|note| note.note_id == note_id) {
					Some(note) => Ok(note.appointment_id.take()),
					None => Err(StorageError::NotFound(format!("note {note_id}"))),
				}
			}
		};

		Box::pin(async move { result })
	}

	fn set_note_metadata(
		&self,
		note_id: Uuid,
		topics: Vec<String>,
		word_count: i32,
	) -> BoxFuture<'_, StoreResult<()>> {
		let result = {
			let mut inner = self.lock();

			match inner.notes.iter_mut().find(|note| note.note_id == note_id) {
				Some(note) => {
					note.topics = Some(serde_json::json!(topics));
					note.word_count = Some(word_count);

					Ok(())
				},
				None => Err(StorageError::NotFound(format!("note {note_id}"))),
			}
		};

		Box::pin(async move { result })
	}

	fn documents_needing_processing(
		&self,
		practice_id: Uuid,
	) -> BoxFuture<'_, StoreResult<Vec<Document>>> {
		let mut documents: Vec<Document> = self
			.lock()
			.documents
			.iter()
			.filter(|document| document.practice_id == practice_id && document.needs_processing)
			.cloned()
			.collect();

		documents
			.sort_by(|a, b| (a.created_at, a.document_id).cmp(&(b.created_at, b.document_id)));

		Box::pin(async move { Ok(documents) })
	}

	fn create_appointment(
		&self,
		appointment: NewAppointment,
	) -> BoxFuture<'_, StoreResult<Uuid>> {
		let result = {
			if appointment.starts_at >= appointment.ends_at {
				Err(StorageError::InvalidArgument(
					"Appointment start must precede its end.".to_string(),
				))
			} else {
				let appointment_id = Uuid::new_v4();
				let mut inner = self.lock();

				inner.appointments.push(Appointment {
					appointment_id,
					subject_id: appointment.subject_id,
					starts_at: appointment.starts_at,
					ends_at: appointment.ends_at,
					appointment_type: appointment.appointment_type,
					status: appointment.status,
					calendar_event_id: appointment.calendar_event_id,
					location: appointment.location,
					created_at: appointment.starts_at,
				});

				Ok(appointment_id)
			}
		};

		Box::pin(async move { result })
	}

	fn promote_document(
		&self,
		document_id: Uuid,
		note: NewNote,
	) -> BoxFuture<'_, StoreResult<Uuid>> {
		let result = {
			let mut inner = self.lock();

			match inner.documents.iter().position(|doc| doc.document_id == document_id) {
				None => Err(StorageError::NotFound(format!("document {document_id}"))),
				Some(index) if !inner.documents[index].needs_processing =>
					Err(StorageError::Conflict(format!(
						"document {document_id} is already processed"
					))),
				Some(index) => {
					let note_id = Uuid::new_v4();

					inner.notes.push(Note {
						note_id,
						subject_id: note.subject_id,
						author_id: note.author_id,
						title: note.title,
						content: note.content,
						source: note.source,
						appointment_id: note.appointment_id,
						calendar_event_id: note.calendar_event_id,
						word_count: note.word_count,
						topics: note.topics,
						created_at: note.created_at,
						updated_at: note.created_at,
					});
					inner.documents[index].note_id = Some(note_id);
					inner.documents[index].needs_processing = false;

					Ok(note_id)
				},
			}
		};

		Box::pin(async move { result })
	}
}
