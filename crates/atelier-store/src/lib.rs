//! Order store module for the atelier workflow system.
//!
//! This module provides the persistence abstraction the workflow engine
//! operates against, supporting different backend implementations such as
//! in-memory or file-based stores. The interface is domain-typed: besides
//! plain lookups it answers the secondary queries the workflow needs
//! (order-number lookup, status listing, per-order-number rejection history).

use async_trait::async_trait;
use atelier_types::{Order, OrderRef, OrderStatus, RejectionRecord};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
	/// Error that occurs when a requested order is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs when inserting an order number that already exists.
	#[error("Order number already exists: {0}")]
	DuplicateOrderNo(String),
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for order store backends.
///
/// This trait must be implemented by any backend that wants to persist
/// orders for the workflow engine. Implementations assign internal ids at
/// insert and enforce order-number uniqueness; everything else is plain
/// single-record read/write.
#[async_trait]
pub trait OrderStoreInterface: Send + Sync {
	/// Persists a new order, assigning its internal id.
	///
	/// Fails with [`StoreError::DuplicateOrderNo`] when the order number is
	/// already taken; the insert must never silently overwrite.
	async fn insert(&self, order: Order) -> Result<Order, StoreError>;

	/// Retrieves an order by internal id.
	async fn get(&self, id: u64) -> Result<Order, StoreError>;

	/// Retrieves an order by order number.
	async fn get_by_order_no(&self, order_no: &str) -> Result<Order, StoreError>;

	/// Overwrites an existing order record.
	///
	/// Fails with [`StoreError::NotFound`] when the id does not resolve,
	/// making it semantically different from insert.
	async fn update(&self, order: &Order) -> Result<(), StoreError>;

	/// Permanently removes an order record.
	async fn delete(&self, id: u64) -> Result<(), StoreError>;

	/// Returns the order number of the most recently inserted order.
	async fn last_order_no(&self) -> Result<Option<String>, StoreError>;

	/// Returns the number of stored orders.
	async fn count(&self) -> Result<u64, StoreError>;

	/// Returns all stored orders in insertion order.
	async fn list(&self) -> Result<Vec<Order>, StoreError>;

	/// Returns all stored orders currently in the given status.
	async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StoreError>;

	/// Appends to the rejection history of an order number.
	///
	/// The history is cumulative across the order's whole lifetime and
	/// survives the order record itself being rewritten.
	async fn record_rejection(
		&self,
		order_no: &str,
		record: RejectionRecord,
	) -> Result<(), StoreError>;

	/// Returns the full rejection history of an order number.
	async fn rejections(&self, order_no: &str) -> Result<Vec<RejectionRecord>, StoreError>;
}

/// Type alias for store factory functions.
///
/// This is the function signature that all store implementations must provide
/// to create instances of their backend from configuration.
pub type StoreFactory = fn(&toml::Value) -> Result<Box<dyn OrderStoreInterface>, StoreError>;

/// Get all registered store implementations.
///
/// Returns a vector of (name, factory) tuples for all available backends,
/// used by the service to wire the configured primary.
pub fn get_all_implementations() -> Vec<(&'static str, StoreFactory)> {
	use implementations::{file, memory};

	vec![
		("file", file::create_store as StoreFactory),
		("memory", memory::create_store as StoreFactory),
	]
}

/// High-level store service wrapping a backend implementation.
///
/// Adds reference-based lookup on top of the raw backend interface so the
/// engine can treat "by id" and "by order number" uniformly.
pub struct StoreService {
	/// The underlying store backend implementation.
	backend: Box<dyn OrderStoreInterface>,
}

impl StoreService {
	/// Creates a new StoreService with the specified backend.
	pub fn new(backend: Box<dyn OrderStoreInterface>) -> Self {
		Self { backend }
	}

	/// Retrieves an order by either kind of reference.
	pub async fn get_by_ref(&self, order_ref: &OrderRef) -> Result<Order, StoreError> {
		match order_ref {
			OrderRef::Id(id) => self.backend.get(*id).await,
			OrderRef::No(no) => self.backend.get_by_order_no(no).await,
		}
	}

	pub async fn insert(&self, order: Order) -> Result<Order, StoreError> {
		self.backend.insert(order).await
	}

	pub async fn get(&self, id: u64) -> Result<Order, StoreError> {
		self.backend.get(id).await
	}

	pub async fn get_by_order_no(&self, order_no: &str) -> Result<Order, StoreError> {
		self.backend.get_by_order_no(order_no).await
	}

	pub async fn update(&self, order: &Order) -> Result<(), StoreError> {
		self.backend.update(order).await
	}

	pub async fn delete(&self, id: u64) -> Result<(), StoreError> {
		self.backend.delete(id).await
	}

	pub async fn last_order_no(&self) -> Result<Option<String>, StoreError> {
		self.backend.last_order_no().await
	}

	pub async fn count(&self) -> Result<u64, StoreError> {
		self.backend.count().await
	}

	pub async fn list(&self) -> Result<Vec<Order>, StoreError> {
		self.backend.list().await
	}

	pub async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StoreError> {
		self.backend.list_by_status(status).await
	}

	pub async fn record_rejection(
		&self,
		order_no: &str,
		record: RejectionRecord,
	) -> Result<(), StoreError> {
		self.backend.record_rejection(order_no, record).await
	}

	pub async fn rejections(&self, order_no: &str) -> Result<Vec<RejectionRecord>, StoreError> {
		self.backend.rejections(order_no).await
	}
}
