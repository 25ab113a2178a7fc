//! The workflow engine: one operation per lifecycle transition.
//!
//! Every mutating operation follows the same shape: authorize the actor's
//! role against the policy table, re-fetch the order by its reference,
//! re-check the status precondition, apply the field writes, persist once.
//! All mutations serialize on a single lock, which makes order-number
//! allocation race-free and keeps a rejection and its reassignment search
//! from interleaving with another mutation of the same order.

use crate::reassign;
use crate::state::{self, Transition};
use crate::{numbering, policy, WorkflowError};
use atelier_directory::DirectoryService;
use atelier_store::{StoreError, StoreService};
use atelier_types::{
	Actor, AssignRequest, CombinedCode, Craftsman, CraftsmanSummary, CreateOrderRequest,
	Endorsement, Order, OrderRef, OrderStatus, PartnerRole, RejectedOrderEntry, RejectionRecord,
	ReviewRequest, TransitionOutcome,
};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Orchestrates the order lifecycle over the store and directory services.
pub struct WorkflowEngine {
	store: Arc<StoreService>,
	directory: Arc<DirectoryService>,
	/// Serializes all mutating transitions.
	mutation_lock: Mutex<()>,
}

impl WorkflowEngine {
	pub fn new(store: Arc<StoreService>, directory: Arc<DirectoryService>) -> Self {
		Self {
			store,
			directory,
			mutation_lock: Mutex::new(()),
		}
	}

	/// Returns a reference to the order store service.
	pub fn store(&self) -> &Arc<StoreService> {
		&self.store
	}

	/// Returns a reference to the directory service.
	pub fn directory(&self) -> &Arc<DirectoryService> {
		&self.directory
	}

	/// Submits a new order on behalf of a seller or customer.
	///
	/// The order number is derived from the last assigned one and the order
	/// date is stamped here, synchronously, as part of the creation itself.
	#[tracing::instrument(skip_all, fields(bp_code = %request.bp_code))]
	pub async fn submit_order(
		&self,
		actor: &Actor,
		request: CreateOrderRequest,
	) -> Result<TransitionOutcome, WorkflowError> {
		policy::authorize(actor.role, Transition::Create)?;

		if request.bp_code.trim().is_empty() {
			return Err(WorkflowError::Validation("bp_code is required".into()));
		}

		let today = Utc::now().date_naive();
		if let Some(due) = request.due_date {
			ensure_future_due_date(due, today)?;
		}

		// Allocation of the order number must not interleave with another
		// creation reading the same last order.
		let _guard = self.mutation_lock.lock().await;

		let last = self.store.last_order_no().await?;
		let count = self.store.count().await?;
		let order_no = numbering::next_order_no(last.as_deref(), count);

		let now = Utc::now();
		let order = Order {
			id: 0,
			order_no,
			bp_code: request.bp_code,
			details: request.details,
			status: OrderStatus::Pending,
			craftsman: None,
			rejected_by: None,
			order_date: today,
			due_date: request.due_date,
			key_user_approval: None,
			admin_verification: None,
			admin_rejection: None,
			created_at: now,
			updated_at: now,
		};

		let order = self.store.insert(order).await?;
		tracing::info!(order_no = %order.order_no, "Order created");

		Ok(TransitionOutcome::new(
			order.order_no,
			OrderStatus::Pending,
			"Order submitted and awaiting key user review",
		))
	}

	/// Key user approves a pending order, moving it to in-process.
	pub async fn key_user_approve(
		&self,
		actor: &Actor,
		order_ref: &OrderRef,
		request: ReviewRequest,
	) -> Result<TransitionOutcome, WorkflowError> {
		policy::authorize(actor.role, Transition::KeyUserApprove)?;
		let _guard = self.mutation_lock.lock().await;

		let mut order = self.fetch(order_ref).await?;
		state::ensure_precondition(&order, Transition::KeyUserApprove)?;

		order.status = OrderStatus::InProcess;
		order.key_user_approval = Some(self.endorsement(actor, request.notes));
		self.persist(&mut order).await?;

		tracing::info!(order_no = %order.order_no, approved_by = %actor.name, "Key user approval");
		Ok(TransitionOutcome::new(
			order.order_no,
			OrderStatus::InProcess,
			"Order approved by key user. Awaiting admin verification",
		))
	}

	/// Key user rejects a still-pending order, permanently removing it.
	pub async fn key_user_reject_delete(
		&self,
		actor: &Actor,
		order_ref: &OrderRef,
		request: ReviewRequest,
	) -> Result<TransitionOutcome, WorkflowError> {
		policy::authorize(actor.role, Transition::KeyUserRejectDelete)?;
		let _guard = self.mutation_lock.lock().await;

		let order = self.fetch(order_ref).await?;
		state::ensure_precondition(&order, Transition::KeyUserRejectDelete)?;

		self.store.delete(order.id).await?;

		tracing::info!(
			order_no = %order.order_no,
			rejected_by = %actor.name,
			notes = %request.notes,
			"Order rejected by key user and deleted"
		);
		Ok(TransitionOutcome::deleted(
			order.order_no,
			"Order rejected by key user and deleted",
		))
	}

	/// Admin verifies an in-process order, readying it for assignment.
	pub async fn admin_verify(
		&self,
		actor: &Actor,
		order_ref: &OrderRef,
		request: ReviewRequest,
	) -> Result<TransitionOutcome, WorkflowError> {
		policy::authorize(actor.role, Transition::AdminVerify)?;
		let _guard = self.mutation_lock.lock().await;

		let mut order = self.fetch(order_ref).await?;
		state::ensure_precondition(&order, Transition::AdminVerify)?;

		order.status = OrderStatus::Verified;
		order.admin_verification = Some(self.endorsement(actor, request.notes));
		self.persist(&mut order).await?;

		tracing::info!(order_no = %order.order_no, verified_by = %actor.name, "Admin verification");
		Ok(TransitionOutcome::new(
			order.order_no,
			OrderStatus::Verified,
			"Order verified by admin. Ready for craftsman assignment",
		))
	}

	/// Admin rejects an in-process order. Terminal.
	pub async fn admin_reject(
		&self,
		actor: &Actor,
		order_ref: &OrderRef,
		request: ReviewRequest,
	) -> Result<TransitionOutcome, WorkflowError> {
		policy::authorize(actor.role, Transition::AdminReject)?;
		let _guard = self.mutation_lock.lock().await;

		let mut order = self.fetch(order_ref).await?;
		state::ensure_precondition(&order, Transition::AdminReject)?;

		order.status = OrderStatus::AdminRejected;
		order.admin_rejection = Some(self.endorsement(actor, request.notes));
		self.persist(&mut order).await?;

		tracing::info!(order_no = %order.order_no, rejected_by = %actor.name, "Admin rejection");
		Ok(TransitionOutcome::new(
			order.order_no,
			OrderStatus::AdminRejected,
			"Order rejected by admin",
		))
	}

	/// Assigns (or manually reassigns) an order to a craftsman.
	///
	/// The due date, when supplied here, replaces the stored one without
	/// re-validation; only creation validates it.
	pub async fn assign_craftsman(
		&self,
		actor: &Actor,
		request: AssignRequest,
	) -> Result<TransitionOutcome, WorkflowError> {
		policy::authorize(actor.role, Transition::AssignCraftsman)?;

		let combined: CombinedCode = request
			.bp_code
			.parse()
			.map_err(|e: atelier_types::CombinedCodeError| WorkflowError::Validation(e.to_string()))?;

		let _guard = self.mutation_lock.lock().await;

		let craftsman = self
			.directory
			.find_by_code_and_name(&combined.code, &combined.business_name)
			.await?
			.filter(|p| p.role == PartnerRole::Craftsman)
			.ok_or_else(|| {
				WorkflowError::NotFound(format!("no CRAFTSMAN with bp code {}", combined))
			})?;

		let mut order = self.fetch(&request.order).await?;
		state::ensure_precondition(&order, Transition::AssignCraftsman)?;

		order.craftsman = Some(craftsman.id);
		order.status = OrderStatus::Assigned;
		if let Some(due) = request.due_date {
			order.due_date = Some(due);
		}
		self.persist(&mut order).await?;

		tracing::info!(
			order_no = %order.order_no,
			craftsman = %craftsman.combined_code(),
			"Order assigned"
		);
		let message = format!("Order {} assigned to {}", order.order_no, craftsman.full_name);
		Ok(TransitionOutcome::new(order.order_no, OrderStatus::Assigned, message)
			.with_craftsman(craftsman.combined_code()))
	}

	/// The assigned craftsman accepts the order and starts production.
	pub async fn craftsman_accept(
		&self,
		actor: &Actor,
		order_no: &str,
	) -> Result<TransitionOutcome, WorkflowError> {
		policy::authorize(actor.role, Transition::CraftsmanAccept)?;
		let _guard = self.mutation_lock.lock().await;

		let mut order = self.fetch(&OrderRef::No(order_no.to_string())).await?;
		state::ensure_precondition(&order, Transition::CraftsmanAccept)?;
		ensure_owner(&order, actor)?;

		order.status = OrderStatus::InProduction;
		self.persist(&mut order).await?;

		tracing::info!(order_no = %order.order_no, craftsman_id = actor.id, "Order accepted");
		Ok(TransitionOutcome::new(
			order.order_no,
			OrderStatus::InProduction,
			format!("Order {} accepted and now in production", order_no),
		))
	}

	/// The assigned craftsman rejects the order.
	///
	/// Records the rejection in the order number's history, clears the
	/// assignment, then immediately searches for a replacement among
	/// craftsmen that have never rejected this order number. Both steps run
	/// under the same mutation guard as one logical transaction.
	#[tracing::instrument(skip_all, fields(order_no = %order_no, craftsman_id = actor.id))]
	pub async fn craftsman_reject(
		&self,
		actor: &Actor,
		order_no: &str,
	) -> Result<TransitionOutcome, WorkflowError> {
		policy::authorize(actor.role, Transition::CraftsmanReject)?;
		let _guard = self.mutation_lock.lock().await;

		let mut order = self.fetch(&OrderRef::No(order_no.to_string())).await?;
		state::ensure_precondition(&order, Transition::CraftsmanReject)?;
		ensure_owner(&order, actor)?;

		let rejecter = self
			.directory
			.find_by_id(actor.id)
			.await?
			.ok_or_else(|| WorkflowError::NotFound(format!("craftsman {}", actor.id)))?;

		order.status = OrderStatus::Rejected;
		order.rejected_by = Some(rejecter.id);
		order.craftsman = None;
		self.persist(&mut order).await?;

		self.store
			.record_rejection(
				&order.order_no,
				RejectionRecord {
					craftsman_id: rejecter.id,
					bp_code: rejecter.bp_code.clone(),
				},
			)
			.await?;

		match reassign::next_available_craftsman(&self.store, &self.directory, &order.order_no)
			.await?
		{
			Some(next) => {
				order.craftsman = Some(next.id);
				order.status = OrderStatus::Assigned;
				self.persist(&mut order).await?;

				tracing::info!(next = %next.combined_code(), "Order reassigned after rejection");
				let message = format!("Order {} reassigned to {}", order.order_no, next.full_name);
				Ok(
					TransitionOutcome::new(order.order_no, OrderStatus::Assigned, message)
						.with_craftsman(next.combined_code()),
				)
			}
			None => {
				tracing::info!("Order rejected; no replacement craftsman available");
				let message =
					format!("Order {} rejected by {}", order.order_no, rejecter.full_name);
				Ok(TransitionOutcome::new(
					order.order_no,
					OrderStatus::Rejected,
					message,
				))
			}
		}
	}

	/// The assigned craftsman reports the order complete.
	pub async fn craftsman_complete(
		&self,
		actor: &Actor,
		order_no: &str,
	) -> Result<TransitionOutcome, WorkflowError> {
		policy::authorize(actor.role, Transition::CraftsmanComplete)?;
		let _guard = self.mutation_lock.lock().await;

		let mut order = self.fetch(&OrderRef::No(order_no.to_string())).await?;
		state::ensure_precondition(&order, Transition::CraftsmanComplete)?;
		ensure_owner(&order, actor)?;

		order.status = OrderStatus::AwaitingApproval;
		self.persist(&mut order).await?;

		tracing::info!(order_no = %order.order_no, "Completion reported");
		Ok(TransitionOutcome::new(
			order.order_no,
			OrderStatus::AwaitingApproval,
			format!(
				"Order {} marked complete by craftsman, awaiting approval",
				order_no
			),
		))
	}

	/// Admin approves a reported completion. Terminal.
	pub async fn admin_approve_completion(
		&self,
		actor: &Actor,
		order_ref: &OrderRef,
	) -> Result<TransitionOutcome, WorkflowError> {
		policy::authorize(actor.role, Transition::AdminApproveCompletion)?;
		let _guard = self.mutation_lock.lock().await;

		let mut order = self.fetch(order_ref).await?;
		state::ensure_precondition(&order, Transition::AdminApproveCompletion)?;

		order.status = OrderStatus::Complete;
		self.persist(&mut order).await?;

		tracing::info!(order_no = %order.order_no, approved_by = %actor.name, "Order complete");
		let message = format!("Order {} approved and marked as complete", order.order_no);
		Ok(TransitionOutcome::new(
			order.order_no,
			OrderStatus::Complete,
			message,
		))
	}

	/// Retrieves one order by either reference.
	pub async fn get_order(&self, order_ref: &OrderRef) -> Result<Order, WorkflowError> {
		self.fetch(order_ref).await
	}

	/// Lists orders, optionally narrowed by status and/or partner code.
	pub async fn list_orders(
		&self,
		status: Option<OrderStatus>,
		bp_code: Option<&str>,
	) -> Result<Vec<Order>, WorkflowError> {
		let orders = match status {
			Some(status) => self.store.list_by_status(status).await?,
			None => self.store.list().await?,
		};
		Ok(match bp_code {
			Some(code) => orders.into_iter().filter(|o| o.bp_code == code).collect(),
			None => orders,
		})
	}

	/// The rejected-orders report: each order still in rejected state with
	/// the craftsman whose rejection put it there.
	pub async fn rejected_orders(&self) -> Result<Vec<RejectedOrderEntry>, WorkflowError> {
		let orders = self.store.list_by_status(OrderStatus::Rejected).await?;
		let mut entries = Vec::with_capacity(orders.len());
		for order in orders {
			let rejected_by = match order.rejected_by {
				Some(id) => self.directory.find_by_id(id).await?.map(summary),
				None => None,
			};
			entries.push(RejectedOrderEntry {
				order_no: order.order_no,
				rejected_by,
			});
		}
		Ok(entries)
	}

	/// Lists craftsmen available for assignment.
	pub async fn available_craftsmen(&self) -> Result<Vec<CraftsmanSummary>, WorkflowError> {
		Ok(self
			.directory
			.list_by_role(PartnerRole::Craftsman)
			.await?
			.into_iter()
			.map(summary)
			.collect())
	}

	async fn fetch(&self, order_ref: &OrderRef) -> Result<Order, WorkflowError> {
		match self.store.get_by_ref(order_ref).await {
			Ok(order) => Ok(order),
			Err(StoreError::NotFound) => {
				Err(WorkflowError::NotFound(format!("order {}", order_ref)))
			}
			Err(e) => Err(e.into()),
		}
	}

	async fn persist(&self, order: &mut Order) -> Result<(), WorkflowError> {
		order.updated_at = Utc::now();
		self.store.update(order).await?;
		Ok(())
	}

	fn endorsement(&self, actor: &Actor, notes: String) -> Endorsement {
		Endorsement {
			actor_id: actor.id,
			actor_name: actor.name.clone(),
			notes,
			at: Utc::now(),
		}
	}
}

/// Checks that the acting craftsman is the one the order is assigned to.
fn ensure_owner(order: &Order, actor: &Actor) -> Result<(), WorkflowError> {
	if order.craftsman != Some(actor.id) {
		return Err(WorkflowError::Forbidden(format!(
			"order {} is not assigned to this craftsman",
			order.order_no
		)));
	}
	Ok(())
}

/// Due dates are only ever validated here, at creation.
fn ensure_future_due_date(due: NaiveDate, today: NaiveDate) -> Result<(), WorkflowError> {
	if due <= today {
		return Err(WorkflowError::Validation(
			"Due date must be tomorrow or later".into(),
		));
	}
	Ok(())
}

fn summary(craftsman: Craftsman) -> CraftsmanSummary {
	CraftsmanSummary {
		id: craftsman.id,
		full_name: craftsman.full_name.clone(),
		bp_code: craftsman.combined_code(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use atelier_directory::implementations::memory::MemoryDirectory;
	use atelier_store::implementations::memory::MemoryStore;
	use atelier_types::{OrderDetails, Role};
	use chrono::Days;

	fn craftsman(id: u64, code: &str, name: &str) -> Craftsman {
		Craftsman {
			id,
			bp_code: code.to_string(),
			business_name: name.to_string(),
			full_name: format!("Craftsman {}", id),
			role: PartnerRole::Craftsman,
		}
	}

	fn engine_with(roster: Vec<Craftsman>) -> WorkflowEngine {
		let store = Arc::new(StoreService::new(Box::new(MemoryStore::new())));
		let directory = Arc::new(DirectoryService::new(Box::new(
			MemoryDirectory::with_partners(roster),
		)));
		WorkflowEngine::new(store, directory)
	}

	fn seller() -> Actor {
		Actor::new(100, "Asha", Role::Seller)
	}

	fn key_user() -> Actor {
		Actor::new(200, "Kiran", Role::KeyUser)
	}

	fn admin() -> Actor {
		Actor::new(300, "Meera", Role::Admin)
	}

	fn craftsman_actor(id: u64) -> Actor {
		Actor::new(id, format!("Craftsman {}", id), Role::Craftsman)
	}

	fn create_request() -> CreateOrderRequest {
		CreateOrderRequest {
			bp_code: "BP77".to_string(),
			details: OrderDetails {
				name: Some("Filigree pendant".to_string()),
				..OrderDetails::default()
			},
			due_date: None,
		}
	}

	async fn create_pending(engine: &WorkflowEngine) -> String {
		engine
			.submit_order(&seller(), create_request())
			.await
			.unwrap()
			.order_no
	}

	#[tokio::test]
	async fn full_lifecycle_reaches_complete() {
		let engine = engine_with(vec![
			craftsman(1, "BP01", "Silverline"),
			craftsman(2, "BP02", "Filigree House"),
		]);

		let outcome = engine.submit_order(&seller(), create_request()).await.unwrap();
		assert_eq!(outcome.order_no, "001");
		assert_eq!(outcome.status, Some(OrderStatus::Pending));
		let order_ref = OrderRef::No("001".to_string());

		let outcome = engine
			.key_user_approve(&key_user(), &order_ref, ReviewRequest::default())
			.await
			.unwrap();
		assert_eq!(outcome.status, Some(OrderStatus::InProcess));

		let outcome = engine
			.admin_verify(&admin(), &order_ref, ReviewRequest::default())
			.await
			.unwrap();
		assert_eq!(outcome.status, Some(OrderStatus::Verified));

		let outcome = engine
			.assign_craftsman(
				&admin(),
				AssignRequest {
					order: order_ref.clone(),
					bp_code: "BP01-Silverline".to_string(),
					due_date: None,
				},
			)
			.await
			.unwrap();
		assert_eq!(outcome.status, Some(OrderStatus::Assigned));
		assert_eq!(outcome.craftsman.as_deref(), Some("BP01-Silverline"));

		// First craftsman rejects; the first non-rejecter takes over.
		let outcome = engine.craftsman_reject(&craftsman_actor(1), "001").await.unwrap();
		assert_eq!(outcome.status, Some(OrderStatus::Assigned));
		assert_eq!(outcome.craftsman.as_deref(), Some("BP02-Filigree House"));

		let order = engine.get_order(&order_ref).await.unwrap();
		assert_eq!(order.craftsman, Some(2));
		assert_eq!(order.rejected_by, Some(1));

		let outcome = engine.craftsman_accept(&craftsman_actor(2), "001").await.unwrap();
		assert_eq!(outcome.status, Some(OrderStatus::InProduction));

		let outcome = engine.craftsman_complete(&craftsman_actor(2), "001").await.unwrap();
		assert_eq!(outcome.status, Some(OrderStatus::AwaitingApproval));

		let outcome = engine
			.admin_approve_completion(&admin(), &order_ref)
			.await
			.unwrap();
		assert_eq!(outcome.status, Some(OrderStatus::Complete));
	}

	#[tokio::test]
	async fn failed_precondition_leaves_order_unchanged() {
		let engine = engine_with(vec![]);
		let order_no = create_pending(&engine).await;
		let order_ref = OrderRef::No(order_no);

		let before = engine.get_order(&order_ref).await.unwrap();

		// Verification requires in-process, not pending.
		let err = engine
			.admin_verify(&admin(), &order_ref, ReviewRequest::default())
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			WorkflowError::InvalidTransition {
				current: OrderStatus::Pending,
				attempted: Transition::AdminVerify,
			}
		));

		let after = engine.get_order(&order_ref).await.unwrap();
		assert_eq!(before, after);
	}

	#[tokio::test]
	async fn reject_delete_requires_pending() {
		let engine = engine_with(vec![]);
		let order_no = create_pending(&engine).await;
		let order_ref = OrderRef::No(order_no);

		engine
			.key_user_approve(&key_user(), &order_ref, ReviewRequest::default())
			.await
			.unwrap();

		let err = engine
			.key_user_reject_delete(&key_user(), &order_ref, ReviewRequest::default())
			.await
			.unwrap_err();
		assert!(matches!(err, WorkflowError::InvalidTransition { .. }));

		// The order survives the failed delete.
		let order = engine.get_order(&order_ref).await.unwrap();
		assert_eq!(order.status, OrderStatus::InProcess);
	}

	#[tokio::test]
	async fn reject_delete_removes_pending_order() {
		let engine = engine_with(vec![]);
		let order_no = create_pending(&engine).await;
		let order_ref = OrderRef::No(order_no.clone());

		let outcome = engine
			.key_user_reject_delete(&key_user(), &order_ref, ReviewRequest::default())
			.await
			.unwrap();
		assert_eq!(outcome.status, None);

		let err = engine.get_order(&order_ref).await.unwrap_err();
		assert!(matches!(err, WorkflowError::NotFound(_)));
	}

	#[tokio::test]
	async fn due_date_must_be_strictly_future() {
		let engine = engine_with(vec![]);
		let today = Utc::now().date_naive();

		for bad in [today, today.checked_sub_days(Days::new(1)).unwrap()] {
			let err = engine
				.submit_order(
					&seller(),
					CreateOrderRequest {
						due_date: Some(bad),
						..create_request()
					},
				)
				.await
				.unwrap_err();
			assert!(matches!(err, WorkflowError::Validation(_)));
		}

		let tomorrow = today.checked_add_days(Days::new(1)).unwrap();
		let outcome = engine
			.submit_order(
				&seller(),
				CreateOrderRequest {
					due_date: Some(tomorrow),
					..create_request()
				},
			)
			.await
			.unwrap();
		assert_eq!(outcome.status, Some(OrderStatus::Pending));
	}

	#[tokio::test]
	async fn concurrent_creations_yield_unique_order_numbers() {
		let engine = Arc::new(engine_with(vec![]));

		let mut handles = Vec::new();
		for _ in 0..10 {
			let engine = Arc::clone(&engine);
			handles.push(tokio::spawn(async move {
				engine
					.submit_order(&seller(), create_request())
					.await
					.unwrap()
					.order_no
			}));
		}

		let mut numbers = Vec::new();
		for handle in handles {
			numbers.push(handle.await.unwrap());
		}

		let unique: std::collections::HashSet<_> = numbers.iter().cloned().collect();
		assert_eq!(unique.len(), numbers.len());

		// Numerically the sequence is gapless from 1.
		let mut parsed: Vec<u64> = numbers.iter().map(|n| n.parse().unwrap()).collect();
		parsed.sort_unstable();
		assert_eq!(parsed, (1..=10).collect::<Vec<_>>());
	}

	#[tokio::test]
	async fn reassignment_never_returns_a_prior_rejecter() {
		let engine = engine_with(vec![
			craftsman(1, "BP01", "Silverline"),
			craftsman(2, "BP02", "Filigree House"),
			craftsman(3, "BP03", "Goldsmiths & Co"),
		]);
		let order_no = create_pending(&engine).await;
		let order_ref = OrderRef::No(order_no.clone());

		engine
			.assign_craftsman(
				&admin(),
				AssignRequest {
					order: order_ref.clone(),
					bp_code: "BP01-Silverline".to_string(),
					due_date: None,
				},
			)
			.await
			.unwrap();

		// Each rejection hands the order to the next non-rejecter.
		engine.craftsman_reject(&craftsman_actor(1), &order_no).await.unwrap();
		assert_eq!(engine.get_order(&order_ref).await.unwrap().craftsman, Some(2));

		engine.craftsman_reject(&craftsman_actor(2), &order_no).await.unwrap();
		assert_eq!(engine.get_order(&order_ref).await.unwrap().craftsman, Some(3));

		let history = engine.store().rejections(&order_no).await.unwrap();
		let rejecter_ids: Vec<u64> = history.iter().map(|r| r.craftsman_id).collect();
		assert_eq!(rejecter_ids, vec![1, 2]);
		assert!(!rejecter_ids.contains(&3));
	}

	#[tokio::test]
	async fn exhausted_roster_leaves_order_rejected_until_manual_rescue() {
		let engine = engine_with(vec![
			craftsman(1, "BP01", "Silverline"),
			craftsman(2, "BP02", "Filigree House"),
		]);
		let order_no = create_pending(&engine).await;
		let order_ref = OrderRef::No(order_no.clone());

		engine
			.assign_craftsman(
				&admin(),
				AssignRequest {
					order: order_ref.clone(),
					bp_code: "BP01-Silverline".to_string(),
					due_date: None,
				},
			)
			.await
			.unwrap();

		engine.craftsman_reject(&craftsman_actor(1), &order_no).await.unwrap();
		let outcome = engine.craftsman_reject(&craftsman_actor(2), &order_no).await.unwrap();
		assert_eq!(outcome.status, Some(OrderStatus::Rejected));

		let order = engine.get_order(&order_ref).await.unwrap();
		assert_eq!(order.craftsman, None);
		assert_eq!(order.rejected_by, Some(2));

		let report = engine.rejected_orders().await.unwrap();
		assert_eq!(report.len(), 1);
		assert_eq!(
			report[0].rejected_by.as_ref().unwrap().bp_code,
			"BP02-Filigree House"
		);

		// An operator may still hand the order back out by explicit assignment.
		let outcome = engine
			.assign_craftsman(
				&admin(),
				AssignRequest {
					order: order_ref.clone(),
					bp_code: "BP01-Silverline".to_string(),
					due_date: None,
				},
			)
			.await
			.unwrap();
		assert_eq!(outcome.status, Some(OrderStatus::Assigned));
	}

	#[tokio::test]
	async fn duplicated_directory_code_is_still_excluded() {
		// The roster carries BP01 twice under different ids.
		let engine = engine_with(vec![
			craftsman(1, "BP01", "Silverline"),
			craftsman(9, "BP01", "Silverline"),
			craftsman(2, "BP02", "Filigree House"),
		]);
		let order_no = create_pending(&engine).await;
		let order_ref = OrderRef::No(order_no.clone());

		engine
			.assign_craftsman(
				&admin(),
				AssignRequest {
					order: order_ref.clone(),
					bp_code: "BP01-Silverline".to_string(),
					due_date: None,
				},
			)
			.await
			.unwrap();

		engine.craftsman_reject(&craftsman_actor(1), &order_no).await.unwrap();

		// The duplicate under id 9 shares the rejecting code and must be
		// skipped; the order lands on BP02.
		let order = engine.get_order(&order_ref).await.unwrap();
		assert_eq!(order.craftsman, Some(2));
	}

	#[tokio::test]
	async fn roles_are_checked_before_state() {
		let engine = engine_with(vec![]);
		let order_no = create_pending(&engine).await;
		let order_ref = OrderRef::No(order_no);

		let err = engine
			.key_user_approve(&seller(), &order_ref, ReviewRequest::default())
			.await
			.unwrap_err();
		assert!(matches!(err, WorkflowError::Forbidden(_)));

		let err = engine.submit_order(&key_user(), create_request()).await.unwrap_err();
		assert!(matches!(err, WorkflowError::Forbidden(_)));
	}

	#[tokio::test]
	async fn craftsman_ownership_is_enforced() {
		let engine = engine_with(vec![
			craftsman(1, "BP01", "Silverline"),
			craftsman(2, "BP02", "Filigree House"),
		]);
		let order_no = create_pending(&engine).await;

		engine
			.assign_craftsman(
				&admin(),
				AssignRequest {
					order: OrderRef::No(order_no.clone()),
					bp_code: "BP01-Silverline".to_string(),
					due_date: None,
				},
			)
			.await
			.unwrap();

		let err = engine
			.craftsman_accept(&craftsman_actor(2), &order_no)
			.await
			.unwrap_err();
		assert!(matches!(err, WorkflowError::Forbidden(_)));
	}

	#[tokio::test]
	async fn assignment_requires_a_known_craftsman() {
		let engine = engine_with(vec![craftsman(1, "BP01", "Silverline")]);
		let order_no = create_pending(&engine).await;

		let err = engine
			.assign_craftsman(
				&admin(),
				AssignRequest {
					order: OrderRef::No(order_no.clone()),
					bp_code: "BP99-Nobody".to_string(),
					due_date: None,
				},
			)
			.await
			.unwrap_err();
		assert!(matches!(err, WorkflowError::NotFound(_)));

		let err = engine
			.assign_craftsman(
				&admin(),
				AssignRequest {
					order: OrderRef::No(order_no),
					bp_code: "not a combined code".to_string(),
					due_date: None,
				},
			)
			.await
			.unwrap_err();
		assert!(matches!(err, WorkflowError::Validation(_)));
	}

	#[tokio::test]
	async fn assignment_may_update_due_date_without_revalidation() {
		let engine = engine_with(vec![craftsman(1, "BP01", "Silverline")]);
		let order_no = create_pending(&engine).await;
		let order_ref = OrderRef::No(order_no);

		// A past date is accepted at assignment time; only creation validates.
		let past = Utc::now().date_naive().checked_sub_days(Days::new(7)).unwrap();
		engine
			.assign_craftsman(
				&admin(),
				AssignRequest {
					order: order_ref.clone(),
					bp_code: "BP01-Silverline".to_string(),
					due_date: Some(past),
				},
			)
			.await
			.unwrap();

		assert_eq!(engine.get_order(&order_ref).await.unwrap().due_date, Some(past));
	}

	#[tokio::test]
	async fn completion_approval_requires_awaiting_approval() {
		let engine = engine_with(vec![craftsman(1, "BP01", "Silverline")]);
		let order_no = create_pending(&engine).await;
		let order_ref = OrderRef::No(order_no);

		engine
			.assign_craftsman(
				&admin(),
				AssignRequest {
					order: order_ref.clone(),
					bp_code: "BP01-Silverline".to_string(),
					due_date: None,
				},
			)
			.await
			.unwrap();

		let err = engine
			.admin_approve_completion(&admin(), &order_ref)
			.await
			.unwrap_err();
		assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
	}

	#[tokio::test]
	async fn missing_order_is_not_found() {
		let engine = engine_with(vec![]);
		let err = engine
			.get_order(&OrderRef::No("999".to_string()))
			.await
			.unwrap_err();
		assert!(matches!(err, WorkflowError::NotFound(_)));
	}
}
