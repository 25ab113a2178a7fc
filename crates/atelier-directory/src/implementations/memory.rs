//! In-memory craftsman directory backend.
//!
//! Holds the partner roster in a plain vector so lookups see exactly the
//! insertion order the roster was seeded in. Seeding comes from the
//! directory's configuration table; tests seed it directly.

use crate::{DirectoryError, DirectoryInterface};
use async_trait::async_trait;
use atelier_types::{Craftsman, ExclusionSet, PartnerRole};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory directory implementation.
pub struct MemoryDirectory {
	/// Roster in insertion order.
	partners: Arc<RwLock<Vec<Craftsman>>>,
}

impl MemoryDirectory {
	/// Creates an empty directory.
	pub fn new() -> Self {
		Self {
			partners: Arc::new(RwLock::new(Vec::new())),
		}
	}

	/// Creates a directory seeded with the given roster.
	pub fn with_partners(partners: Vec<Craftsman>) -> Self {
		Self {
			partners: Arc::new(RwLock::new(partners)),
		}
	}

	/// Appends a partner to the roster.
	pub async fn add(&self, partner: Craftsman) {
		self.partners.write().await.push(partner);
	}
}

impl Default for MemoryDirectory {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl DirectoryInterface for MemoryDirectory {
	async fn find_by_id(&self, id: u64) -> Result<Option<Craftsman>, DirectoryError> {
		let partners = self.partners.read().await;
		Ok(partners.iter().find(|p| p.id == id).cloned())
	}

	async fn find_by_code_and_name(
		&self,
		code: &str,
		business_name: &str,
	) -> Result<Option<Craftsman>, DirectoryError> {
		let partners = self.partners.read().await;
		Ok(partners
			.iter()
			.find(|p| {
				p.bp_code == code && p.business_name.eq_ignore_ascii_case(business_name)
			})
			.cloned())
	}

	async fn find_first_by_role_excluding(
		&self,
		role: PartnerRole,
		excluded: &ExclusionSet,
	) -> Result<Option<Craftsman>, DirectoryError> {
		let partners = self.partners.read().await;
		Ok(partners
			.iter()
			.find(|p| p.role == role && !excluded.excludes(p))
			.cloned())
	}

	async fn list_by_role(&self, role: PartnerRole) -> Result<Vec<Craftsman>, DirectoryError> {
		let partners = self.partners.read().await;
		Ok(partners.iter().filter(|p| p.role == role).cloned().collect())
	}
}

/// Factory function to create a memory directory from configuration.
///
/// Configuration parameters:
/// - `partners`: array of partner tables (`id`, `bp_code`, `business_name`,
///   `full_name`, `role`)
pub fn create_directory(
	config: &toml::Value,
) -> Result<Box<dyn DirectoryInterface>, DirectoryError> {
	let mut partners = Vec::new();

	if let Some(entries) = config.get("partners").and_then(|v| v.as_array()) {
		for entry in entries {
			let partner: Craftsman = entry
				.clone()
				.try_into()
				.map_err(|e| DirectoryError::Configuration(format!("invalid partner: {}", e)))?;
			partners.push(partner);
		}
	}

	tracing::debug!(partners = partners.len(), "Seeded directory roster");
	Ok(Box::new(MemoryDirectory::with_partners(partners)))
}
