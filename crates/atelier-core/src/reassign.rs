//! Craftsman reassignment policy.
//!
//! After a craftsman rejects an order, the workflow immediately searches for
//! a replacement: the first directory entry with role CRAFTSMAN whose
//! identity has never rejected this order number. The exclusion set is
//! cumulative over the order's whole rejection history and matches on both
//! directory id and bp code, so a roster entry duplicated by code cannot be
//! handed the order back. First match in directory insertion order wins; no
//! load balancing, priority, or skill matching.

use crate::WorkflowError;
use atelier_directory::DirectoryService;
use atelier_store::StoreService;
use atelier_types::{Craftsman, ExclusionSet, PartnerRole};

/// Finds the next craftsman eligible to take the order, if any.
///
/// Reads the rejection history for the order number and asks the directory
/// for the first non-excluded CRAFTSMAN. Callers must hold the engine's
/// mutation lock so the history read and the subsequent assignment cannot
/// interleave with another rejection of the same order.
pub async fn next_available_craftsman(
	store: &StoreService,
	directory: &DirectoryService,
	order_no: &str,
) -> Result<Option<Craftsman>, WorkflowError> {
	let history = store.rejections(order_no).await?;
	let excluded = ExclusionSet::from_records(&history);

	let candidate = directory
		.find_first_by_role_excluding(PartnerRole::Craftsman, &excluded)
		.await?;

	if let Some(ref craftsman) = candidate {
		tracing::debug!(
			order_no = %order_no,
			craftsman = %craftsman.combined_code(),
			rejections = history.len(),
			"Reassignment candidate found"
		);
	}

	Ok(candidate)
}

#[cfg(test)]
mod tests {
	use super::*;
	use atelier_directory::implementations::memory::MemoryDirectory;
	use atelier_store::implementations::memory::MemoryStore;
	use atelier_types::RejectionRecord;

	fn craftsman(id: u64, code: &str) -> Craftsman {
		Craftsman {
			id,
			bp_code: code.to_string(),
			business_name: format!("Shop {}", code),
			full_name: format!("Craftsman {}", id),
			role: PartnerRole::Craftsman,
		}
	}

	fn services(roster: Vec<Craftsman>) -> (StoreService, DirectoryService) {
		(
			StoreService::new(Box::new(MemoryStore::new())),
			DirectoryService::new(Box::new(MemoryDirectory::with_partners(roster))),
		)
	}

	#[tokio::test]
	async fn skips_every_historical_rejecter() {
		let (store, directory) =
			services(vec![craftsman(1, "BP01"), craftsman(2, "BP02"), craftsman(3, "BP03")]);

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

		let next = next_available_craftsman(&store, &directory, "001")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(next.id, 3);
	}

	#[tokio::test]
	async fn exhausted_roster_yields_none() {
		let (store, directory) = services(vec![craftsman(1, "BP01")]);

		store
			.record_rejection(
				"001",
				RejectionRecord {
					craftsman_id: 1,
					bp_code: "BP01".to_string(),
				},
			)
			.await
			.unwrap();

		let next = next_available_craftsman(&store, &directory, "001")
			.await
			.unwrap();
		assert!(next.is_none());
	}

	#[tokio::test]
	async fn history_is_scoped_per_order_no() {
		let (store, directory) = services(vec![craftsman(1, "BP01")]);

		store
			.record_rejection(
				"001",
				RejectionRecord {
					craftsman_id: 1,
					bp_code: "BP01".to_string(),
				},
			)
			.await
			.unwrap();

		// A different order number sees a clean slate.
		let next = next_available_craftsman(&store, &directory, "02")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(next.id, 1);
	}
}
