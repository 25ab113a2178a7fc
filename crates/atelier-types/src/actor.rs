//! Actor types for role-gated workflow transitions.
//!
//! Every transition is invoked on behalf of an actor whose role decides
//! whether the transition is permitted at all. Authentication itself is
//! external; the dispatcher hands the engine an already-resolved actor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Workflow roles recognized by the policy table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
	/// Second-line approver with every admin capability.
	SuperAdmin,
	/// Second-line approver: verifies, rejects, assigns, approves completion.
	Admin,
	/// First-line approver that moves pending orders forward.
	KeyUser,
	/// Seller-class requester.
	Seller,
	/// Customer-class requester.
	Customer,
	/// Fulfillment role assigned to produce an order.
	Craftsman,
}

impl Role {
	/// Returns the wire label for this role.
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::SuperAdmin => "super-admin",
			Role::Admin => "admin",
			Role::KeyUser => "key-user",
			Role::Seller => "seller",
			Role::Customer => "customer",
			Role::Craftsman => "craftsman",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Role {
	type Err = UnknownRole;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"super-admin" => Ok(Role::SuperAdmin),
			"admin" => Ok(Role::Admin),
			"key-user" => Ok(Role::KeyUser),
			"seller" => Ok(Role::Seller),
			"customer" => Ok(Role::Customer),
			"craftsman" => Ok(Role::Craftsman),
			_ => Err(UnknownRole(s.to_string())),
		}
	}
}

/// Error returned when a role label does not match any known role.
#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// The party invoking a transition.
///
/// For craftsman transitions, `id` must match the craftsman reference on the
/// order being acted on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Actor {
	/// Identifier within the party's own directory (user id or partner id).
	pub id: u64,
	/// Display name, recorded on endorsements.
	pub name: String,
	/// Role consulted by the policy table.
	pub role: Role,
}

impl Actor {
	pub fn new(id: u64, name: impl Into<String>, role: Role) -> Self {
		Self {
			id,
			name: name.into(),
			role,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn role_labels_round_trip() {
		for role in [
			Role::SuperAdmin,
			Role::Admin,
			Role::KeyUser,
			Role::Seller,
			Role::Customer,
			Role::Craftsman,
		] {
			assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
		}
	}

	#[test]
	fn unknown_role_is_rejected() {
		assert!("warehouse".parse::<Role>().is_err());
	}
}
