//! Order types for the atelier workflow system.
//!
//! This module defines the central order entity, its lifecycle statuses, and
//! the audit endorsements recorded as the order moves between parties.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A jewelry manufacturing order moving through the approval workflow.
///
/// The order owns its workflow fields; craftsman identities are weak
/// references into the externally owned partner directory, never embedded
/// copies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
	/// Internal identifier, assigned by the store at insert.
	pub id: u64,
	/// Human-facing sequential number, zero-padded, assigned once at creation.
	pub order_no: String,
	/// Code of the business partner the order was collected for.
	pub bp_code: String,
	/// Free-form product metadata; not consulted by the state machine.
	#[serde(default)]
	pub details: OrderDetails,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// Assigned craftsman, present only while assigned or in production.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub craftsman: Option<u64>,
	/// Last craftsman to reject this order, overwritten on each rejection.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rejected_by: Option<u64>,
	/// Date the order was placed; stamped at creation, immutable after.
	pub order_date: NaiveDate,
	/// Requested delivery date; strictly future at creation time.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub due_date: Option<NaiveDate>,
	/// Key-user approval stamp.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub key_user_approval: Option<Endorsement>,
	/// Admin verification stamp.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub admin_verification: Option<Endorsement>,
	/// Admin rejection stamp.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub admin_rejection: Option<Endorsement>,
	/// Timestamp when this order was created.
	pub created_at: DateTime<Utc>,
	/// Timestamp when this order was last persisted.
	pub updated_at: DateTime<Utc>,
}

/// Descriptive product attributes carried on an order.
///
/// The workflow never branches on these.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderDetails {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reference_no: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub quantity: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub narration: Option<String>,
}

/// Audit stamp left by an approving or rejecting party.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Endorsement {
	/// Identifier of the acting party.
	pub actor_id: u64,
	/// Display name of the acting party at the time of the action.
	pub actor_name: String,
	/// Free-text notes supplied with the action.
	#[serde(default)]
	pub notes: String,
	/// When the action happened.
	pub at: DateTime<Utc>,
}

/// Status of an order in the workflow.
///
/// The awaiting-admin and craftsman-working stages are distinct states with
/// distinct labels; they never share a code path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
	/// Created, awaiting key-user review.
	Pending,
	/// Key-user approved, awaiting admin verification.
	InProcess,
	/// Admin verified, ready for craftsman assignment.
	Verified,
	/// Craftsman assigned, awaiting their response.
	Assigned,
	/// Craftsman accepted; work in progress.
	InProduction,
	/// Craftsman reported completion, awaiting admin approval.
	AwaitingApproval,
	/// Approved complete. Terminal.
	Complete,
	/// Rejected by a craftsman with no replacement found; terminal until
	/// manually reassigned.
	Rejected,
	/// Rejected by an admin during verification. Terminal.
	AdminRejected,
}

impl OrderStatus {
	/// Returns the persisted wire label for this status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::InProcess => "in-process",
			OrderStatus::Verified => "verified",
			OrderStatus::Assigned => "assigned",
			OrderStatus::InProduction => "in-production",
			OrderStatus::AwaitingApproval => "awaiting-approval",
			OrderStatus::Complete => "complete",
			OrderStatus::Rejected => "rejected",
			OrderStatus::AdminRejected => "admin-rejected",
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Reference to an order, either by internal id or by order number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OrderRef {
	/// Internal store id.
	Id(u64),
	/// Human-facing order number.
	No(String),
}

impl fmt::Display for OrderRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderRef::Id(id) => write!(f, "#{}", id),
			OrderRef::No(no) => f.write_str(no),
		}
	}
}

impl From<u64> for OrderRef {
	fn from(id: u64) -> Self {
		OrderRef::Id(id)
	}
}

impl From<&str> for OrderRef {
	fn from(no: &str) -> Self {
		OrderRef::No(no.to_string())
	}
}
