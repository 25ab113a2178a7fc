//! API types for the dispatcher surface.
//!
//! These are the request payloads the role-gated dispatcher accepts and the
//! response envelopes it returns. The HTTP layer only frames them; the engine
//! produces and consumes them directly.

use crate::order::{OrderDetails, OrderRef, OrderStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Payload for creating a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
	/// Code of the business partner the order is collected for.
	pub bp_code: String,
	/// Product metadata.
	#[serde(default)]
	pub details: OrderDetails,
	/// Requested delivery date; must be strictly in the future.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub due_date: Option<NaiveDate>,
}

/// Payload for review transitions (approve, verify, reject) carrying notes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewRequest {
	/// Free-text notes recorded on the endorsement.
	#[serde(default)]
	pub notes: String,
}

/// Payload for assigning an order to a craftsman.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignRequest {
	/// The order to assign, by id or order number.
	pub order: OrderRef,
	/// Combined `CODE-Business Name` code of the craftsman.
	pub bp_code: String,
	/// Replacement due date, applied without re-validation.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub due_date: Option<NaiveDate>,
}

/// A craftsman's response to an assignment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CraftsmanAction {
	Accept,
	Reject,
}

/// Payload for a craftsman responding to an assigned order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondRequest {
	pub order_no: String,
	pub action: CraftsmanAction,
}

/// Result of a successfully applied transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionOutcome {
	/// Always true; error paths return an [`ErrorResponse`] instead.
	pub ok: bool,
	/// Number of the order acted on.
	pub order_no: String,
	/// Status after the transition; absent when the record was deleted.
	#[serde(rename = "new_status", skip_serializing_if = "Option::is_none")]
	pub status: Option<OrderStatus>,
	/// Human-readable summary of what happened.
	pub message: String,
	/// Combined code of the craftsman now holding the order, when one does.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub craftsman: Option<String>,
}

impl TransitionOutcome {
	pub fn new(order_no: impl Into<String>, status: OrderStatus, message: impl Into<String>) -> Self {
		Self {
			ok: true,
			order_no: order_no.into(),
			status: Some(status),
			message: message.into(),
			craftsman: None,
		}
	}

	pub fn deleted(order_no: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			ok: true,
			order_no: order_no.into(),
			status: None,
			message: message.into(),
			craftsman: None,
		}
	}

	pub fn with_craftsman(mut self, combined_code: impl Into<String>) -> Self {
		self.craftsman = Some(combined_code.into());
		self
	}
}

/// Error envelope returned for any failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Stable machine-readable error code.
	pub error: String,
	/// Human-readable description.
	pub message: String,
}

/// A craftsman entry as listed to assignment screens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CraftsmanSummary {
	pub id: u64,
	pub full_name: String,
	/// Combined `CODE-Business Name` form.
	pub bp_code: String,
}

/// One line of the rejected-orders report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedOrderEntry {
	pub order_no: String,
	/// The craftsman whose rejection left the order in this state.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rejected_by: Option<CraftsmanSummary>,
}
