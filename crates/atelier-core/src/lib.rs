//! Core workflow engine for the atelier order system.
//!
//! This module provides the order lifecycle state machine: one operation per
//! transition, each gated by a role policy table, guarded by a status
//! precondition, and applied as a single-record read-modify-write against the
//! order store. Craftsman reassignment after a rejection lives here too, as a
//! deterministic exclusion-based first-match search over the directory.

use atelier_directory::DirectoryError;
use atelier_store::StoreError;
use atelier_types::OrderStatus;
use thiserror::Error;

pub mod engine;
pub mod numbering;
pub mod policy;
pub mod reassign;
pub mod state;

pub use engine::WorkflowEngine;
pub use state::Transition;

/// Errors that can occur while applying workflow transitions.
///
/// All of these are recoverable from the caller's perspective; none abort the
/// process, and none leave a partially mutated order behind.
#[derive(Debug, Error)]
pub enum WorkflowError {
	/// Malformed or missing input; nothing was mutated.
	#[error("Validation failed: {0}")]
	Validation(String),
	/// An order or craftsman identifier did not resolve.
	#[error("Not found: {0}")]
	NotFound(String),
	/// The order's current status does not permit the attempted transition.
	#[error("Invalid transition: cannot {attempted} while order is {current}")]
	InvalidTransition {
		current: OrderStatus,
		attempted: Transition,
	},
	/// The actor's role or ownership does not permit the transition.
	#[error("Forbidden: {0}")]
	Forbidden(String),
	/// Error from the order store backend.
	#[error("Store error: {0}")]
	Store(#[from] StoreError),
	/// Error from the directory backend.
	#[error("Directory error: {0}")]
	Directory(#[from] DirectoryError),
}
