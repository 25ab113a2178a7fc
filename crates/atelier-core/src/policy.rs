//! Role policy for workflow transitions.
//!
//! One static table keyed by transition lists the roles allowed to request
//! it; every engine operation consults [`authorize`] before touching any
//! state. Ownership checks (a craftsman acting on someone else's order) are
//! separate and live in the engine, since they need the fetched record.

use crate::state::Transition;
use crate::WorkflowError;
use atelier_types::Role;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Roles permitted per transition.
static POLICY: Lazy<HashMap<Transition, &'static [Role]>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(
		Transition::Create,
		&[Role::Seller, Role::Customer] as &'static [Role],
	);
	m.insert(Transition::KeyUserApprove, &[Role::KeyUser] as &'static [Role]);
	m.insert(
		Transition::KeyUserRejectDelete,
		&[Role::KeyUser] as &'static [Role],
	);
	m.insert(
		Transition::AdminVerify,
		&[Role::Admin, Role::SuperAdmin] as &'static [Role],
	);
	m.insert(
		Transition::AdminReject,
		&[Role::Admin, Role::SuperAdmin] as &'static [Role],
	);
	m.insert(
		Transition::AssignCraftsman,
		&[Role::Admin, Role::SuperAdmin] as &'static [Role],
	);
	m.insert(
		Transition::CraftsmanAccept,
		&[Role::Craftsman] as &'static [Role],
	);
	m.insert(
		Transition::CraftsmanReject,
		&[Role::Craftsman] as &'static [Role],
	);
	m.insert(
		Transition::CraftsmanComplete,
		&[Role::Craftsman] as &'static [Role],
	);
	m.insert(
		Transition::AdminApproveCompletion,
		&[Role::Admin, Role::SuperAdmin] as &'static [Role],
	);
	m
});

/// Checks that the role may request the transition.
pub fn authorize(role: Role, transition: Transition) -> Result<(), WorkflowError> {
	let allowed = POLICY
		.get(&transition)
		.is_some_and(|roles| roles.contains(&role));
	if allowed {
		Ok(())
	} else {
		Err(WorkflowError::Forbidden(format!(
			"role {} may not {}",
			role, transition
		)))
	}
}
