//! Order workflow endpoints.
//!
//! One handler per transition plus the read surface (detail, listings, the
//! rejected-orders report, and the available-craftsmen roster). Handlers stay
//! thin: extract the caller, hand the payload to the engine, frame the
//! outcome.

use crate::apis::{ApiError, Caller};
use crate::server::AppState;
use atelier_types::{
	AssignRequest, CraftsmanAction, CraftsmanSummary, CreateOrderRequest, Order, OrderRef,
	OrderStatus, RejectedOrderEntry, RespondRequest, ReviewRequest, TransitionOutcome,
};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

/// Query parameters for order listings.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
	pub status: Option<OrderStatus>,
	pub bp_code: Option<String>,
}

/// Handles POST /orders.
pub async fn create_order(
	State(state): State<AppState>,
	Caller(actor): Caller,
	Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<TransitionOutcome>), ApiError> {
	let outcome = state.engine.submit_order(&actor, request).await?;
	Ok((StatusCode::CREATED, Json(outcome)))
}

/// Handles GET /orders.
pub async fn list_orders(
	State(state): State<AppState>,
	Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
	let orders = state
		.engine
		.list_orders(query.status, query.bp_code.as_deref())
		.await?;
	Ok(Json(orders))
}

/// Handles GET /orders/{order_no}.
pub async fn get_order(
	State(state): State<AppState>,
	Path(order_no): Path<String>,
) -> Result<Json<Order>, ApiError> {
	let order = state.engine.get_order(&OrderRef::No(order_no)).await?;
	Ok(Json(order))
}

/// Handles POST /orders/{order_no}/approve.
pub async fn key_user_approve(
	State(state): State<AppState>,
	Caller(actor): Caller,
	Path(order_no): Path<String>,
	request: Option<Json<ReviewRequest>>,
) -> Result<Json<TransitionOutcome>, ApiError> {
	let request = request.map(|Json(r)| r).unwrap_or_default();
	let outcome = state
		.engine
		.key_user_approve(&actor, &OrderRef::No(order_no), request)
		.await?;
	Ok(Json(outcome))
}

/// Handles DELETE /orders/{order_no}.
///
/// The rejection body is optional; a bare delete carries no notes.
pub async fn key_user_reject(
	State(state): State<AppState>,
	Caller(actor): Caller,
	Path(order_no): Path<String>,
	request: Option<Json<ReviewRequest>>,
) -> Result<Json<TransitionOutcome>, ApiError> {
	let request = request.map(|Json(r)| r).unwrap_or_default();
	let outcome = state
		.engine
		.key_user_reject_delete(&actor, &OrderRef::No(order_no), request)
		.await?;
	Ok(Json(outcome))
}

/// Handles POST /orders/{order_no}/verify.
pub async fn admin_verify(
	State(state): State<AppState>,
	Caller(actor): Caller,
	Path(order_no): Path<String>,
	request: Option<Json<ReviewRequest>>,
) -> Result<Json<TransitionOutcome>, ApiError> {
	let request = request.map(|Json(r)| r).unwrap_or_default();
	let outcome = state
		.engine
		.admin_verify(&actor, &OrderRef::No(order_no), request)
		.await?;
	Ok(Json(outcome))
}

/// Handles POST /orders/{order_no}/reject.
pub async fn admin_reject(
	State(state): State<AppState>,
	Caller(actor): Caller,
	Path(order_no): Path<String>,
	request: Option<Json<ReviewRequest>>,
) -> Result<Json<TransitionOutcome>, ApiError> {
	let request = request.map(|Json(r)| r).unwrap_or_default();
	let outcome = state
		.engine
		.admin_reject(&actor, &OrderRef::No(order_no), request)
		.await?;
	Ok(Json(outcome))
}

/// Handles POST /orders/assign.
pub async fn assign_craftsman(
	State(state): State<AppState>,
	Caller(actor): Caller,
	Json(request): Json<AssignRequest>,
) -> Result<Json<TransitionOutcome>, ApiError> {
	let outcome = state.engine.assign_craftsman(&actor, request).await?;
	Ok(Json(outcome))
}

/// Handles POST /orders/respond.
pub async fn craftsman_respond(
	State(state): State<AppState>,
	Caller(actor): Caller,
	Json(request): Json<RespondRequest>,
) -> Result<Json<TransitionOutcome>, ApiError> {
	let outcome = match request.action {
		CraftsmanAction::Accept => {
			state.engine.craftsman_accept(&actor, &request.order_no).await?
		}
		CraftsmanAction::Reject => {
			state.engine.craftsman_reject(&actor, &request.order_no).await?
		}
	};
	Ok(Json(outcome))
}

/// Handles POST /orders/{order_no}/complete.
pub async fn craftsman_complete(
	State(state): State<AppState>,
	Caller(actor): Caller,
	Path(order_no): Path<String>,
) -> Result<Json<TransitionOutcome>, ApiError> {
	let outcome = state.engine.craftsman_complete(&actor, &order_no).await?;
	Ok(Json(outcome))
}

/// Handles POST /orders/{order_no}/approve-completion.
pub async fn approve_completion(
	State(state): State<AppState>,
	Caller(actor): Caller,
	Path(order_no): Path<String>,
) -> Result<Json<TransitionOutcome>, ApiError> {
	let outcome = state
		.engine
		.admin_approve_completion(&actor, &OrderRef::No(order_no))
		.await?;
	Ok(Json(outcome))
}

/// Handles GET /orders/rejected.
pub async fn rejected_orders(
	State(state): State<AppState>,
) -> Result<Json<Vec<RejectedOrderEntry>>, ApiError> {
	let entries = state.engine.rejected_orders().await?;
	Ok(Json(entries))
}

/// Handles GET /craftsmen.
pub async fn craftsmen(
	State(state): State<AppState>,
) -> Result<Json<Vec<CraftsmanSummary>>, ApiError> {
	let craftsmen = state.engine.available_craftsmen().await?;
	Ok(Json(craftsmen))
}
