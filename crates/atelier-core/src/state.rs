//! Transition definitions and status preconditions.
//!
//! Each workflow operation corresponds to one [`Transition`]. A static table
//! maps every transition to the statuses it may be applied from; checking it
//! is the engine's first act after fetching the order, so a stale or
//! out-of-order request always fails with the order's actual current status
//! attached, never silently no-ops.

use crate::WorkflowError;
use atelier_types::{Order, OrderStatus};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// The workflow transitions an actor can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
	Create,
	KeyUserApprove,
	KeyUserRejectDelete,
	AdminVerify,
	AdminReject,
	AssignCraftsman,
	CraftsmanAccept,
	CraftsmanReject,
	CraftsmanComplete,
	AdminApproveCompletion,
}

impl Transition {
	/// Returns the wire label for this transition.
	pub fn as_str(&self) -> &'static str {
		match self {
			Transition::Create => "create",
			Transition::KeyUserApprove => "key-user-approve",
			Transition::KeyUserRejectDelete => "key-user-reject-delete",
			Transition::AdminVerify => "admin-verify",
			Transition::AdminReject => "admin-reject",
			Transition::AssignCraftsman => "assign-craftsman",
			Transition::CraftsmanAccept => "craftsman-accept",
			Transition::CraftsmanReject => "craftsman-reject",
			Transition::CraftsmanComplete => "craftsman-complete",
			Transition::AdminApproveCompletion => "admin-approve-completion",
		}
	}
}

impl fmt::Display for Transition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Status preconditions per transition.
///
/// `None` means the transition carries no status guard: creation has no
/// predecessor record, and assignment applies to any existing order (which is
/// also what lets an operator rescue a terminal rejected order by hand).
static PRECONDITIONS: Lazy<HashMap<Transition, Option<&'static [OrderStatus]>>> =
	Lazy::new(|| {
		let mut m = HashMap::new();
		m.insert(Transition::Create, None);
		m.insert(
			Transition::KeyUserApprove,
			Some(&[OrderStatus::Pending] as &'static [OrderStatus]),
		);
		m.insert(
			Transition::KeyUserRejectDelete,
			Some(&[OrderStatus::Pending] as &'static [OrderStatus]),
		);
		m.insert(
			Transition::AdminVerify,
			Some(&[OrderStatus::InProcess] as &'static [OrderStatus]),
		);
		m.insert(
			Transition::AdminReject,
			Some(&[OrderStatus::InProcess] as &'static [OrderStatus]),
		);
		m.insert(Transition::AssignCraftsman, None);
		m.insert(
			Transition::CraftsmanAccept,
			Some(&[OrderStatus::Assigned] as &'static [OrderStatus]),
		);
		m.insert(
			Transition::CraftsmanReject,
			Some(&[OrderStatus::Assigned] as &'static [OrderStatus]),
		);
		m.insert(
			Transition::CraftsmanComplete,
			Some(&[OrderStatus::Assigned, OrderStatus::InProduction] as &'static [OrderStatus]),
		);
		m.insert(
			Transition::AdminApproveCompletion,
			Some(&[OrderStatus::AwaitingApproval] as &'static [OrderStatus]),
		);
		m
	});

/// Checks that the order's current status permits the transition.
pub fn ensure_precondition(order: &Order, transition: Transition) -> Result<(), WorkflowError> {
	match PRECONDITIONS.get(&transition) {
		Some(Some(allowed)) if !allowed.contains(&order.status) => {
			Err(WorkflowError::InvalidTransition {
				current: order.status,
				attempted: transition,
			})
		}
		_ => Ok(()),
	}
}
