//! HTTP server for the atelier dispatcher.
//!
//! This module builds the router mapping each workflow transition and read
//! endpoint onto the engine, and serves it with trace and CORS layers.

use atelier_config::ApiConfig;
use atelier_core::WorkflowEngine;
use axum::{
	routing::{get, post},
	Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::apis::orders;

/// Shared application state for the dispatcher.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the workflow engine for processing requests.
	pub engine: Arc<WorkflowEngine>,
}

/// Builds the dispatcher router.
pub fn router(engine: Arc<WorkflowEngine>) -> Router {
	let state = AppState { engine };

	Router::new()
		.route("/orders", post(orders::create_order).get(orders::list_orders))
		.route("/orders/assign", post(orders::assign_craftsman))
		.route("/orders/respond", post(orders::craftsman_respond))
		.route("/orders/rejected", get(orders::rejected_orders))
		.route(
			"/orders/{order_no}",
			get(orders::get_order).delete(orders::key_user_reject),
		)
		.route("/orders/{order_no}/approve", post(orders::key_user_approve))
		.route("/orders/{order_no}/verify", post(orders::admin_verify))
		.route("/orders/{order_no}/reject", post(orders::admin_reject))
		.route("/orders/{order_no}/complete", post(orders::craftsman_complete))
		.route(
			"/orders/{order_no}/approve-completion",
			post(orders::approve_completion),
		)
		.route("/craftsmen", get(orders::craftsmen))
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive()),
		)
		.with_state(state)
}

/// Starts the HTTP server for the dispatcher.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<WorkflowEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(engine);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Atelier API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}
