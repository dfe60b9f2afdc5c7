use axum::{
	Json, Router,
	extract::{Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;
use relink_service::{
	AutoLinkRequest, AutoLinkResponse, BulkLinkRequest, BulkLinkResponse, Error as ServiceError,
	LinkRequest, LinkResponse, ReconcileRequest, ReconcileResponse, SuggestionsRequest,
	SuggestionsResponse, UndoResponse, UnlinkRequest, UnlinkResponse,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/records/link", post(link))
		.route("/v1/records/unlink", post(unlink))
		.route("/v1/records/bulk_link", post(bulk_link))
		.route("/v1/records/auto_link", post(auto_link))
		.route("/v1/records/reconcile", post(reconcile))
		.route("/v1/records/undo", post(undo))
		.route("/v1/records/suggestions", get(suggestions))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn link(
	State(state): State<AppState>,
	Json(payload): Json<LinkRequest>,
) -> Result<Json<LinkResponse>, ApiError> {
	let response = state.service.link_note(payload).await?;

	Ok(Json(response))
}

async fn unlink(
	State(state): State<AppState>,
	Json(payload): Json<UnlinkRequest>,
) -> Result<Json<UnlinkResponse>, ApiError> {
	let response = state.service.unlink_note(payload).await?;

	Ok(Json(response))
}

async fn bulk_link(
	State(state): State<AppState>,
	Json(payload): Json<BulkLinkRequest>,
) -> Result<Json<BulkLinkResponse>, ApiError> {
	let response = state.service.bulk_link_notes(payload).await?;

	Ok(Json(response))
}

async fn auto_link(
	State(state): State<AppState>,
	Json(payload): Json<AutoLinkRequest>,
) -> Result<Json<AutoLinkResponse>, ApiError> {
	let response = state.service.auto_link(payload).await?;

	Ok(Json(response))
}

async fn reconcile(
	State(state): State<AppState>,
	Json(payload): Json<ReconcileRequest>,
) -> Result<Json<ReconcileResponse>, ApiError> {
	let response = state.service.reconcile(payload).await?;

	Ok(Json(response))
}

async fn undo(State(state): State<AppState>) -> Result<Json<UndoResponse>, ApiError> {
	let response = state.service.undo_last_action().await?;

	Ok(Json(response))
}

async fn suggestions(
	State(state): State<AppState>,
	Query(payload): Query<SuggestionsRequest>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
	let response = state.service.suggestions(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let (status, error_code) = match &err {
			ServiceError::SubjectMismatch { .. } =>
				(StatusCode::UNPROCESSABLE_ENTITY, "subject_mismatch"),
			ServiceError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
			ServiceError::Expired => (StatusCode::GONE, "undo_expired"),
			ServiceError::External { .. } => (StatusCode::BAD_GATEWAY, "external_service"),
			ServiceError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
			ServiceError::Storage(relink_storage::Error::NotFound(_)) =>
				(StatusCode::NOT_FOUND, "not_found"),
			ServiceError::Storage(relink_storage::Error::Conflict(_)) =>
				(StatusCode::CONFLICT, "conflict"),
			ServiceError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage"),
		};

		Self { status, error_code, message: err.to_string() }
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code.to_string(), message: self.message };

		(self.status, Json(body)).into_response()
	}
}
