//! Craftsman directory module for the atelier workflow system.
//!
//! The directory is an externally owned roster of business partners; the
//! workflow engine only consumes lookups from it. This module defines the
//! lookup contract and a service wrapper over pluggable backends. Partner
//! lifecycle (onboarding, role changes) is entirely outside the workflow.

use async_trait::async_trait;
use atelier_types::{Craftsman, ExclusionSet, PartnerRole};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during directory lookups.
#[derive(Debug, Error)]
pub enum DirectoryError {
	/// Error that occurs in the directory backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the lookup interface for directory backends.
///
/// Lookups are read-only. Ordering matters: `find_first_by_role_excluding`
/// must honor directory insertion order, because reassignment takes the first
/// match in that order.
#[async_trait]
pub trait DirectoryInterface: Send + Sync {
	/// Resolves a partner by directory id.
	async fn find_by_id(&self, id: u64) -> Result<Option<Craftsman>, DirectoryError>;

	/// Resolves a partner by code and business name.
	///
	/// The business name comparison is case-insensitive; the code is exact.
	async fn find_by_code_and_name(
		&self,
		code: &str,
		business_name: &str,
	) -> Result<Option<Craftsman>, DirectoryError>;

	/// Returns the first partner with the given role whose identity is not
	/// excluded, in directory insertion order.
	async fn find_first_by_role_excluding(
		&self,
		role: PartnerRole,
		excluded: &ExclusionSet,
	) -> Result<Option<Craftsman>, DirectoryError>;

	/// Returns all partners carrying the given role, in insertion order.
	async fn list_by_role(&self, role: PartnerRole) -> Result<Vec<Craftsman>, DirectoryError>;
}

/// Type alias for directory factory functions.
pub type DirectoryFactory = fn(&toml::Value) -> Result<Box<dyn DirectoryInterface>, DirectoryError>;

/// Get all registered directory implementations.
pub fn get_all_implementations() -> Vec<(&'static str, DirectoryFactory)> {
	use implementations::memory;

	vec![("memory", memory::create_directory as DirectoryFactory)]
}

/// High-level directory service wrapping a backend implementation.
pub struct DirectoryService {
	/// The underlying directory backend implementation.
	backend: Box<dyn DirectoryInterface>,
}

impl DirectoryService {
	/// Creates a new DirectoryService with the specified backend.
	pub fn new(backend: Box<dyn DirectoryInterface>) -> Self {
		Self { backend }
	}

	pub async fn find_by_id(&self, id: u64) -> Result<Option<Craftsman>, DirectoryError> {
		self.backend.find_by_id(id).await
	}

	pub async fn find_by_code_and_name(
		&self,
		code: &str,
		business_name: &str,
	) -> Result<Option<Craftsman>, DirectoryError> {
		self.backend.find_by_code_and_name(code, business_name).await
	}

	pub async fn find_first_by_role_excluding(
		&self,
		role: PartnerRole,
		excluded: &ExclusionSet,
	) -> Result<Option<Craftsman>, DirectoryError> {
		self.backend.find_first_by_role_excluding(role, excluded).await
	}

	pub async fn list_by_role(&self, role: PartnerRole) -> Result<Vec<Craftsman>, DirectoryError> {
		self.backend.list_by_role(role).await
	}
}
