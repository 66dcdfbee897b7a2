use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use jobsift_service::{
	AggregateRequest, AggregationStats, DetailView, Error as ServiceError, ListRequest,
	ListResponse, Statistics,
};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DetailQuery {
	pub use_cache: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SourcesResponse {
	pub sources: Vec<String>,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/jobs", get(list_jobs))
		.route("/v1/jobs/{job_id}", get(job_details))
		.route("/v1/aggregate", post(aggregate))
		.route("/v1/stats", get(stats))
		.route("/v1/sources", get(sources))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_jobs(
	State(state): State<AppState>,
	Query(query): Query<ListRequest>,
) -> Result<Json<ListResponse>, ApiError> {
	let response = state.service.list_jobs(query).await?;

	Ok(Json(response))
}

async fn job_details(
	State(state): State<AppState>,
	Path(job_id): Path<Uuid>,
	Query(query): Query<DetailQuery>,
) -> Result<Json<DetailView>, ApiError> {
	let response = state.service.get_details(job_id, query.use_cache.unwrap_or(true)).await?;

	Ok(Json(response))
}

async fn aggregate(
	State(state): State<AppState>,
	Json(payload): Json<AggregateRequest>,
) -> Json<AggregationStats> {
	Json(state.service.aggregate(payload).await)
}

async fn stats(State(state): State<AppState>) -> Result<Json<Statistics>, ApiError> {
	let response = state.service.statistics().await?;

	Ok(Json(response))
}

async fn sources(State(state): State<AppState>) -> Json<SourcesResponse> {
	Json(SourcesResponse { sources: state.service.sources() })
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: &'static str,
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
			ServiceError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
			ServiceError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
			ServiceError::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
			ServiceError::Source { .. } => (StatusCode::BAD_GATEWAY, "SOURCE_ERROR"),
		};

		if status.is_server_error() {
			tracing::error!(error = %err, "Request failed.");
		}

		Self { status, error_code, message: err.to_string() }
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
