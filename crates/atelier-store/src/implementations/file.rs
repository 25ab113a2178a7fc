//! File-based order store backend.
//!
//! This module stores each order as one JSON document on the filesystem,
//! providing simple persistence without requiring external dependencies.
//! Rejection histories live in a sibling directory keyed by order number.
//! Writes go through a temp-file-then-rename step so a crashed write never
//! leaves a half-written record behind.

use crate::{OrderStoreInterface, StoreError};
use async_trait::async_trait;
use atelier_types::{Order, OrderStatus, RejectionRecord};
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-backed store implementation.
///
/// Orders are scanned from disk on demand; there is no in-process index, so
/// the backend stays correct across multiple processes sharing the directory.
pub struct FileStore {
	/// Base directory path for storing documents.
	base_path: PathBuf,
}

impl FileStore {
	/// Creates a new FileStore instance rooted at the given base path.
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	fn orders_dir(&self) -> PathBuf {
		self.base_path.join("orders")
	}

	fn rejections_dir(&self) -> PathBuf {
		self.base_path.join("rejections")
	}

	fn order_path(&self, id: u64) -> PathBuf {
		self.orders_dir().join(format!("{}.json", id))
	}

	/// Converts an order number to a filesystem-safe rejection history path.
	fn rejection_path(&self, order_no: &str) -> PathBuf {
		let safe = order_no.replace(['/', ':', '\\'], "_");
		self.rejections_dir().join(format!("{}.json", safe))
	}

	/// Reads every stored order, sorted by id.
	async fn load_all(&self) -> Result<Vec<Order>, StoreError> {
		let dir = self.orders_dir();
		if !dir.exists() {
			return Ok(Vec::new());
		}

		let mut orders = Vec::new();
		let mut entries = fs::read_dir(&dir)
			.await
			.map_err(|e| StoreError::Backend(e.to_string()))?;

		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StoreError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() == Some(std::ffi::OsStr::new("json")) {
				match fs::read(&path).await {
					Ok(data) => match serde_json::from_slice::<Order>(&data) {
						Ok(order) => orders.push(order),
						Err(e) => {
							tracing::warn!("Skipping unreadable order file {:?}: {}", path, e);
						}
					},
					Err(e) => {
						tracing::warn!("Skipping order file {:?}: {}", path, e);
					}
				}
			}
		}

		orders.sort_by_key(|order| order.id);
		Ok(orders)
	}

	/// Writes a JSON document atomically via temp file and rename.
	async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StoreError::Backend(e.to_string()))?;
		}

		let data =
			serde_json::to_vec_pretty(value).map_err(|e| StoreError::Serialization(e.to_string()))?;

		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, data)
			.await
			.map_err(|e| StoreError::Backend(e.to_string()))?;
		fs::rename(&temp_path, path)
			.await
			.map_err(|e| StoreError::Backend(e.to_string()))?;

		Ok(())
	}
}

#[async_trait]
impl OrderStoreInterface for FileStore {
	async fn insert(&self, mut order: Order) -> Result<Order, StoreError> {
		let existing = self.load_all().await?;
		if existing.iter().any(|o| o.order_no == order.order_no) {
			return Err(StoreError::DuplicateOrderNo(order.order_no));
		}

		order.id = existing.last().map(|o| o.id + 1).unwrap_or(1);
		Self::write_json(&self.order_path(order.id), &order).await?;
		Ok(order)
	}

	async fn get(&self, id: u64) -> Result<Order, StoreError> {
		let data = match fs::read(self.order_path(id)).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(StoreError::NotFound)
			}
			Err(e) => return Err(StoreError::Backend(e.to_string())),
		};
		serde_json::from_slice(&data).map_err(|e| StoreError::Serialization(e.to_string()))
	}

	async fn get_by_order_no(&self, order_no: &str) -> Result<Order, StoreError> {
		self.load_all()
			.await?
			.into_iter()
			.find(|order| order.order_no == order_no)
			.ok_or(StoreError::NotFound)
	}

	async fn update(&self, order: &Order) -> Result<(), StoreError> {
		let path = self.order_path(order.id);
		if !path.exists() {
			return Err(StoreError::NotFound);
		}
		Self::write_json(&path, order).await
	}

	async fn delete(&self, id: u64) -> Result<(), StoreError> {
		match fs::remove_file(self.order_path(id)).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StoreError::Backend(e.to_string())),
		}
	}

	async fn last_order_no(&self) -> Result<Option<String>, StoreError> {
		Ok(self
			.load_all()
			.await?
			.last()
			.map(|order| order.order_no.clone()))
	}

	async fn count(&self) -> Result<u64, StoreError> {
		Ok(self.load_all().await?.len() as u64)
	}

	async fn list(&self) -> Result<Vec<Order>, StoreError> {
		self.load_all().await
	}

	async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StoreError> {
		Ok(self
			.load_all()
			.await?
			.into_iter()
			.filter(|order| order.status == status)
			.collect())
	}

	async fn record_rejection(
		&self,
		order_no: &str,
		record: RejectionRecord,
	) -> Result<(), StoreError> {
		let mut history = self.rejections(order_no).await?;
		history.push(record);
		Self::write_json(&self.rejection_path(order_no), &history).await
	}

	async fn rejections(&self, order_no: &str) -> Result<Vec<RejectionRecord>, StoreError> {
		let data = match fs::read(self.rejection_path(order_no)).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(StoreError::Backend(e.to_string())),
		};
		serde_json::from_slice(&data).map_err(|e| StoreError::Serialization(e.to_string()))
	}
}

/// Factory function to create a file store backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for documents (default: "./data/atelier")
pub fn create_store(config: &toml::Value) -> Result<Box<dyn OrderStoreInterface>, StoreError> {
	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/atelier")
		.to_string();

	Ok(Box::new(FileStore::new(PathBuf::from(storage_path))))
}

#[cfg(test)]
mod tests {
	use super::*;
	use atelier_types::OrderDetails;
	use chrono::{NaiveDate, Utc};

	fn sample_order(order_no: &str) -> Order {
		Order {
			id: 0,
			order_no: order_no.to_string(),
			bp_code: "BP77".to_string(),
			details: OrderDetails::default(),
			status: OrderStatus::Pending,
			craftsman: None,
			rejected_by: None,
			order_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
			due_date: None,
			key_user_approval: None,
			admin_verification: None,
			admin_rejection: None,
			created_at: Utc::now(),
			updated_at: Utc::now(),
		}
	}

	#[tokio::test]
	async fn orders_survive_reopening_the_store() {
		let dir = tempfile::tempdir().unwrap();

		let store = FileStore::new(dir.path().to_path_buf());
		let inserted = store.insert(sample_order("001")).await.unwrap();
		assert_eq!(inserted.id, 1);

		// A fresh instance over the same directory sees the same data.
		let reopened = FileStore::new(dir.path().to_path_buf());
		let fetched = reopened.get_by_order_no("001").await.unwrap();
		assert_eq!(fetched.id, inserted.id);
		assert_eq!(reopened.count().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn duplicate_order_no_is_rejected() {
		let dir = tempfile::tempdir().unwrap();
		let store = FileStore::new(dir.path().to_path_buf());

		store.insert(sample_order("001")).await.unwrap();
		let result = store.insert(sample_order("001")).await;
		assert!(matches!(result, Err(StoreError::DuplicateOrderNo(_))));
	}

	#[tokio::test]
	async fn update_then_get_round_trips() {
		let dir = tempfile::tempdir().unwrap();
		let store = FileStore::new(dir.path().to_path_buf());

		let mut order = store.insert(sample_order("001")).await.unwrap();
		order.status = OrderStatus::Verified;
		store.update(&order).await.unwrap();

		assert_eq!(
			store.get(order.id).await.unwrap().status,
			OrderStatus::Verified
		);
	}

	#[tokio::test]
	async fn rejection_history_persists() {
		let dir = tempfile::tempdir().unwrap();
		let store = FileStore::new(dir.path().to_path_buf());

		store
			.record_rejection(
				"001",
				RejectionRecord {
					craftsman_id: 4,
					bp_code: "BP04".to_string(),
				},
			)
			.await
			.unwrap();

		let reopened = FileStore::new(dir.path().to_path_buf());
		let history = reopened.rejections("001").await.unwrap();
		assert_eq!(history.len(), 1);
		assert_eq!(history[0].craftsman_id, 4);
	}

	#[tokio::test]
	async fn missing_order_is_not_found() {
		let dir = tempfile::tempdir().unwrap();
		let store = FileStore::new(dir.path().to_path_buf());
		assert!(matches!(store.get(42).await, Err(StoreError::NotFound)));
	}
}
