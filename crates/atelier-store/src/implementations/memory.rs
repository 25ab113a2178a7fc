//! In-memory order store backend.
//!
//! This module provides a memory-based implementation of the
//! OrderStoreInterface trait, useful for testing and development scenarios
//! where persistence is not required.

use crate::{OrderStoreInterface, StoreError};
use async_trait::async_trait;
use atelier_types::{Order, OrderStatus, RejectionRecord};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
	/// Orders keyed by id; BTreeMap keeps insertion (id) order for listing.
	orders: BTreeMap<u64, Order>,
	/// Order-number index enforcing the uniqueness constraint.
	by_no: HashMap<String, u64>,
	/// Cumulative rejection history per order number.
	rejections: HashMap<String, Vec<RejectionRecord>>,
	next_id: u64,
}

/// In-memory store implementation.
///
/// All state lives in maps behind a read-write lock; nothing survives a
/// restart.
pub struct MemoryStore {
	inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
	/// Creates a new empty MemoryStore instance.
	pub fn new() -> Self {
		Self {
			inner: Arc::new(RwLock::new(Inner {
				next_id: 1,
				..Inner::default()
			})),
		}
	}
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl OrderStoreInterface for MemoryStore {
	async fn insert(&self, mut order: Order) -> Result<Order, StoreError> {
		let mut inner = self.inner.write().await;
		if inner.by_no.contains_key(&order.order_no) {
			return Err(StoreError::DuplicateOrderNo(order.order_no));
		}
		order.id = inner.next_id;
		inner.next_id += 1;
		inner.by_no.insert(order.order_no.clone(), order.id);
		inner.orders.insert(order.id, order.clone());
		Ok(order)
	}

	async fn get(&self, id: u64) -> Result<Order, StoreError> {
		let inner = self.inner.read().await;
		inner.orders.get(&id).cloned().ok_or(StoreError::NotFound)
	}

	async fn get_by_order_no(&self, order_no: &str) -> Result<Order, StoreError> {
		let inner = self.inner.read().await;
		inner
			.by_no
			.get(order_no)
			.and_then(|id| inner.orders.get(id))
			.cloned()
			.ok_or(StoreError::NotFound)
	}

	async fn update(&self, order: &Order) -> Result<(), StoreError> {
		let mut inner = self.inner.write().await;
		if !inner.orders.contains_key(&order.id) {
			return Err(StoreError::NotFound);
		}
		inner.orders.insert(order.id, order.clone());
		Ok(())
	}

	async fn delete(&self, id: u64) -> Result<(), StoreError> {
		let mut inner = self.inner.write().await;
		if let Some(order) = inner.orders.remove(&id) {
			inner.by_no.remove(&order.order_no);
		}
		Ok(())
	}

	async fn last_order_no(&self) -> Result<Option<String>, StoreError> {
		let inner = self.inner.read().await;
		Ok(inner
			.orders
			.values()
			.next_back()
			.map(|order| order.order_no.clone()))
	}

	async fn count(&self) -> Result<u64, StoreError> {
		let inner = self.inner.read().await;
		Ok(inner.orders.len() as u64)
	}

	async fn list(&self) -> Result<Vec<Order>, StoreError> {
		let inner = self.inner.read().await;
		Ok(inner.orders.values().cloned().collect())
	}

	async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StoreError> {
		let inner = self.inner.read().await;
		Ok(inner
			.orders
			.values()
			.filter(|order| order.status == status)
			.cloned()
			.collect())
	}

	async fn record_rejection(
		&self,
		order_no: &str,
		record: RejectionRecord,
	) -> Result<(), StoreError> {
		let mut inner = self.inner.write().await;
		inner
			.rejections
			.entry(order_no.to_string())
			.or_default()
			.push(record);
		Ok(())
	}

	async fn rejections(&self, order_no: &str) -> Result<Vec<RejectionRecord>, StoreError> {
		let inner = self.inner.read().await;
		Ok(inner.rejections.get(order_no).cloned().unwrap_or_default())
	}
}

/// Factory function to create a memory store backend from configuration.
///
/// Configuration parameters:
/// - None required for memory storage
pub fn create_store(_config: &toml::Value) -> Result<Box<dyn OrderStoreInterface>, StoreError> {
	Ok(Box::new(MemoryStore::new()))
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
	async fn insert_assigns_sequential_ids() {
		let store = MemoryStore::new();

		let first = store.insert(sample_order("001")).await.unwrap();
		let second = store.insert(sample_order("02")).await.unwrap();

		assert_eq!(first.id, 1);
		assert_eq!(second.id, 2);
		assert_eq!(store.count().await.unwrap(), 2);
		assert_eq!(store.last_order_no().await.unwrap().as_deref(), Some("02"));
	}

	#[tokio::test]
	async fn duplicate_order_no_is_rejected() {
		let store = MemoryStore::new();
		store.insert(sample_order("001")).await.unwrap();

		let result = store.insert(sample_order("001")).await;
		assert!(matches!(result, Err(StoreError::DuplicateOrderNo(no)) if no == "001"));
		assert_eq!(store.count().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn lookup_by_order_no_and_update() {
		let store = MemoryStore::new();
		let mut order = store.insert(sample_order("001")).await.unwrap();

		order.status = OrderStatus::InProcess;
		store.update(&order).await.unwrap();

		let fetched = store.get_by_order_no("001").await.unwrap();
		assert_eq!(fetched.status, OrderStatus::InProcess);
		assert_eq!(
			store
				.list_by_status(OrderStatus::InProcess)
				.await
				.unwrap()
				.len(),
			1
		);
	}

	#[tokio::test]
	async fn update_of_missing_order_fails() {
		let store = MemoryStore::new();
		let order = sample_order("001");
		assert!(matches!(
			store.update(&order).await,
			Err(StoreError::NotFound)
		));
	}

	#[tokio::test]
	async fn delete_frees_the_order_no() {
		let store = MemoryStore::new();
		let order = store.insert(sample_order("001")).await.unwrap();

		store.delete(order.id).await.unwrap();
		assert!(matches!(
			store.get(order.id).await,
			Err(StoreError::NotFound)
		));
		// Number can be reused once the record is gone.
		store.insert(sample_order("001")).await.unwrap();
	}

	#[tokio::test]
	async fn rejection_history_accumulates() {
		let store = MemoryStore::new();

		for (id, code) in [(1, "BP01"), (2, "BP02")] {
			store
				.record_rejection(
					"001",
					RejectionRecord {
						craftsman_id: id,
						bp_code: code.to_string(),
					},
				)
				.await
				.unwrap();
		}

		let history = store.rejections("001").await.unwrap();
		assert_eq!(history.len(), 2);
		assert_eq!(history[0].bp_code, "BP01");
		assert!(store.rejections("002").await.unwrap().is_empty());
	}
}
