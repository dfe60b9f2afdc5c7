pub mod auto_link;
pub mod link;
pub mod reconcile;
pub mod score;
pub mod suggestions;
pub mod undo;

use std::{future::Future, pin::Pin, sync::Arc};

use time::Duration;
use uuid::Uuid;

pub use auto_link::{AutoLinkError, AutoLinkRequest, AutoLinkResponse};
pub use link::{
	BulkLinkOutcome, BulkLinkRequest, BulkLinkResponse, LinkRequest, LinkResponse, UnlinkRequest,
	UnlinkResponse,
};
pub use reconcile::{ReconcileRequest, ReconcileResponse, UnresolvedItem, UnresolvedKind};
pub use score::LinkSuggestion;
pub use suggestions::{NoteSuggestions, SuggestionsRequest, SuggestionsResponse};
pub use undo::{HistoryAction, HistoryEntry, Journal, UndoResponse};

use relink_config::{Config, SimilarityProviderConfig};
use relink_providers::similarity;
use relink_storage::{
	db::Db,
	models::{Appointment, Document, NewAppointment, NewNote, Note, Subject},
	queries,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type StoreResult<T> = std::result::Result<T, relink_storage::Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Note {note_id} and appointment {appointment_id} belong to different subjects.")]
	SubjectMismatch { note_id: Uuid, appointment_id: Uuid },
	#[error("{message}")]
	Conflict { message: String },
	#[error("The undo window has elapsed.")]
	Expired,
	#[error("External service failure: {message}")]
	External { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error(transparent)]
	Storage(#[from] relink_storage::Error),
}

/// Read/write access to the two record collections. Owned elsewhere;
/// the engine only sees these operations.
pub trait RecordStore: Send + Sync {
	fn subject(&self, subject_id: Uuid) -> BoxFuture<'_, StoreResult<Subject>>;
	fn subjects_for_practice(&self, practice_id: Uuid)
	-> BoxFuture<'_, StoreResult<Vec<Subject>>>;
	fn note(&self, note_id: Uuid) -> BoxFuture<'_, StoreResult<Note>>;
	fn notes_for_subject(&self, subject_id: Uuid) -> BoxFuture<'_, StoreResult<Vec<Note>>>;
	fn appointment(&self, appointment_id: Uuid) -> BoxFuture<'_, StoreResult<Appointment>>;
	fn appointments_for_subject(
		&self,
		subject_id: Uuid,
	) -> BoxFuture<'_, StoreResult<Vec<Appointment>>>;
	fn set_note_appointment(
		&self,
		note_id: Uuid,
		appointment_id: Uuid,
	) -> BoxFuture<'_, StoreResult<()>>;
	fn clear_note_appointment(&self, note_id: Uuid) -> BoxFuture<'_, StoreResult<Option<Uuid>>>;
	fn set_note_metadata(
		&self,
		note_id: Uuid,
		topics: Vec<String>,
		word_count: i32,
	) -> BoxFuture<'_, StoreResult<()>>;
	fn documents_needing_processing(
		&self,
		practice_id: Uuid,
	) -> BoxFuture<'_, StoreResult<Vec<Document>>>;
	fn create_appointment(&self, appointment: NewAppointment)
	-> BoxFuture<'_, StoreResult<Uuid>>;
	fn promote_document(
		&self,
		document_id: Uuid,
		note: NewNote,
	) -> BoxFuture<'_, StoreResult<Uuid>>;
}

/// The opaque AI-analysis contributor.
pub trait SimilarityProvider: Send + Sync {
	fn similarity<'a>(
		&'a self,
		cfg: &'a SimilarityProviderConfig,
		note_content: &'a str,
		appointment_context: &'a str,
	) -> BoxFuture<'a, relink_providers::Result<Option<f32>>>;
}

pub struct PgStore {
	db: Db,
}
impl PgStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}
impl RecordStore for PgStore {
	fn subject(&self, subject_id: Uuid) -> BoxFuture<'_, StoreResult<Subject>> {
		Box::pin(queries::subject(&self.db, subject_id))
	}

	fn subjects_for_practice(
		&self,
		practice_id: Uuid,
	) -> BoxFuture<'_, StoreResult<Vec<Subject>>> {
		Box::pin(queries::subjects_for_practice(&self.db, practice_id))
	}

	fn note(&self, note_id: Uuid) -> BoxFuture<'_, StoreResult<Note>> {
		Box::pin(queries::note(&self.db, note_id))
	}

	fn notes_for_subject(&self, subject_id: Uuid) -> BoxFuture<'_, StoreResult<Vec<Note>>> {
		Box::pin(queries::notes_for_subject(&self.db, subject_id))
	}

	fn appointment(&self, appointment_id: Uuid) -> BoxFuture<'_, StoreResult<Appointment>> {
		Box::pin(queries::appointment(&self.db, appointment_id))
	}

	fn appointments_for_subject(
		&self,
		subject_id: Uuid,
	) -> BoxFuture<'_, StoreResult<Vec<Appointment>>> {
		Box::pin(queries::appointments_for_subject(&self.db, subject_id))
	}

	fn set_note_appointment(
		&self,
		note_id: Uuid,
		appointment_id: Uuid,
	) -> BoxFuture<'_, StoreResult<()>> {
		Box::pin(queries::set_note_appointment(&self.db, note_id, appointment_id))
	}

	fn clear_note_appointment(&self, note_id: Uuid) -> BoxFuture<'_, StoreResult<Option<Uuid>>> {
		Box::pin(queries::clear_note_appointment(&self.db, note_id))
	}

	fn set_note_metadata(
		&self,
		note_id: Uuid,
		topics: Vec<String>,
		word_count: i32,
	) -> BoxFuture<'_, StoreResult<()>> {
		Box::pin(async move {
			let topics = serde_json::json!(topics);

			queries::set_note_metadata(&self.db, note_id, &topics, word_count).await
		})
	}

	fn documents_needing_processing(
		&self,
		practice_id: Uuid,
	) -> BoxFuture<'_, StoreResult<Vec<Document>>> {
		Box::pin(queries::documents_needing_processing(&self.db, practice_id))
	}

	fn create_appointment(
		&self,
		appointment: NewAppointment,
	) -> BoxFuture<'_, StoreResult<Uuid>> {
		Box::pin(async move { queries::create_appointment(&self.db, &appointment).await })
	}

	fn promote_document(
		&self,
		document_id: Uuid,
		note: NewNote,
	) -> BoxFuture<'_, StoreResult<Uuid>> {
		Box::pin(async move { queries::promote_document(&self.db, document_id, &note).await })
	}
}

struct DefaultSimilarity;
impl SimilarityProvider for DefaultSimilarity {
	fn similarity<'a>(
		&'a self,
		cfg: &'a SimilarityProviderConfig,
		note_content: &'a str,
		appointment_context: &'a str,
	) -> BoxFuture<'a, relink_providers::Result<Option<f32>>> {
		Box::pin(similarity::score(cfg, note_content, appointment_context))
	}
}

pub struct LinkService {
	pub cfg: Config,
	pub(crate) store: Arc<dyn RecordStore>,
	pub(crate) similarity: Arc<dyn SimilarityProvider>,
	pub(crate) journal: Journal,
}
impl LinkService {
	pub fn new(cfg: Config, db: Db) -> Self {
		let similarity: Arc<dyn SimilarityProvider> = Arc::new(DefaultSimilarity);

		Self::with_store(cfg, Arc::new(PgStore::new(db)), similarity)
	}

	pub fn with_store(
		cfg: Config,
		store: Arc<dyn RecordStore>,
		similarity: Arc<dyn SimilarityProvider>,
	) -> Self {
		let journal = Journal::new(Duration::seconds(cfg.undo.window_seconds as i64));

		Self { cfg, store, similarity, journal }
	}

	pub fn journal(&self) -> &Journal {
		&self.journal
	}
}
