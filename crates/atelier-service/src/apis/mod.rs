//! Dispatcher API modules.
//!
//! Handlers translate HTTP requests into engine operations. The acting
//! party's identity arrives in `x-actor-*` headers, placed there by the
//! upstream authentication layer, which is outside this service.

use atelier_core::WorkflowError;
use atelier_types::{Actor, ErrorResponse, Role};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};

pub mod orders;

/// Error wrapper mapping workflow errors onto HTTP responses.
pub struct ApiError(pub WorkflowError);

impl From<WorkflowError> for ApiError {
	fn from(err: WorkflowError) -> Self {
		Self(err)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let (status, code) = match &self.0 {
			WorkflowError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
			WorkflowError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
			WorkflowError::InvalidTransition { .. } => {
				(StatusCode::CONFLICT, "INVALID_TRANSITION")
			}
			WorkflowError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
			WorkflowError::Store(_) | WorkflowError::Directory(_) => {
				(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
			}
		};

		if status.is_server_error() {
			tracing::error!("Request failed: {}", self.0);
		} else {
			tracing::warn!("Request rejected: {}", self.0);
		}

		(
			status,
			Json(ErrorResponse {
				error: code.to_string(),
				message: self.0.to_string(),
			}),
		)
			.into_response()
	}
}

/// Extractor for the acting party, read from `x-actor-*` headers.
pub struct Caller(pub Actor);

fn required_header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApiError> {
	headers
		.get(name)
		.and_then(|value| value.to_str().ok())
		.ok_or_else(|| {
			ApiError(WorkflowError::Validation(format!(
				"missing or invalid {} header",
				name
			)))
		})
}

impl<S> FromRequestParts<S> for Caller
where
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let headers = &parts.headers;

		let id: u64 = required_header(headers, "x-actor-id")?
			.parse()
			.map_err(|_| {
				ApiError(WorkflowError::Validation(
					"x-actor-id must be a numeric identifier".to_string(),
				))
			})?;

		let role: Role = required_header(headers, "x-actor-role")?
			.parse()
			.map_err(|_| {
				ApiError(WorkflowError::Forbidden("unknown actor role".to_string()))
			})?;

		let name = headers
			.get("x-actor-name")
			.and_then(|value| value.to_str().ok())
			.unwrap_or_default()
			.to_string();

		Ok(Caller(Actor { id, name, role }))
	}
}
