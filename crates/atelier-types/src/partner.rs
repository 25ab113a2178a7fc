//! Business partner types for the atelier workflow system.
//!
//! Partners live in an externally owned directory; orders hold weak
//! references (ids) into it. The workflow only ever looks partners up by
//! code, role, or id, and excludes them during reassignment.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Directory roles a business partner can carry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartnerRole {
	/// Produces assigned orders.
	Craftsman,
	/// Supplies raw material; not part of the order workflow.
	Vendor,
	/// Places orders.
	Customer,
}

impl fmt::Display for PartnerRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PartnerRole::Craftsman => f.write_str("CRAFTSMAN"),
			PartnerRole::Vendor => f.write_str("VENDOR"),
			PartnerRole::Customer => f.write_str("CUSTOMER"),
		}
	}
}

/// A business partner entry as seen through the directory.
///
/// The directory owns the full record; this is the projection the workflow
/// consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Craftsman {
	/// Directory identifier.
	pub id: u64,
	/// Partner code, unique per directory entry but duplicable across entries
	/// when the directory itself carries duplicates.
	pub bp_code: String,
	/// Registered business name.
	pub business_name: String,
	/// Contact person's full name.
	pub full_name: String,
	/// Directory role flag.
	pub role: PartnerRole,
}

impl Craftsman {
	/// Returns the combined `CODE-Business Name` form used on the wire.
	pub fn combined_code(&self) -> String {
		format!("{}-{}", self.bp_code, self.business_name)
	}
}

/// A partner code in the combined `CODE-Business Name` wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedCode {
	pub code: String,
	pub business_name: String,
}

/// Error returned when a combined partner code cannot be parsed.
#[derive(Debug, Error)]
#[error("bp code must be in format 'CODE-Business Name', got '{0}'")]
pub struct CombinedCodeError(pub String);

impl FromStr for CombinedCode {
	type Err = CombinedCodeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (code, name) = s
			.split_once('-')
			.ok_or_else(|| CombinedCodeError(s.to_string()))?;
		let code = code.trim();
		let name = name.trim();
		if code.is_empty() || name.is_empty() {
			return Err(CombinedCodeError(s.to_string()));
		}
		Ok(Self {
			code: code.to_string(),
			business_name: name.to_string(),
		})
	}
}

impl fmt::Display for CombinedCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{}", self.code, self.business_name)
	}
}

/// One entry in an order number's rejection history.
///
/// Both identity facets are recorded so that exclusion survives directory
/// entries duplicated by code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RejectionRecord {
	pub craftsman_id: u64,
	pub bp_code: String,
}

/// Cumulative set of craftsman identities excluded from reassignment.
///
/// A candidate is excluded when either its id or its bp code has ever
/// rejected the order number in question.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
	ids: HashSet<u64>,
	codes: HashSet<String>,
}

impl ExclusionSet {
	pub fn from_records(records: &[RejectionRecord]) -> Self {
		let mut set = Self::default();
		for record in records {
			set.insert(record);
		}
		set
	}

	pub fn insert(&mut self, record: &RejectionRecord) {
		self.ids.insert(record.craftsman_id);
		self.codes.insert(record.bp_code.clone());
	}

	pub fn excludes(&self, candidate: &Craftsman) -> bool {
		self.ids.contains(&candidate.id) || self.codes.contains(&candidate.bp_code)
	}

	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}
}
