// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod memory;

use thiserror::Error;

use mandi_sdk::types::{
	AlertStatus, Listing, PriceAlert, Proposal, ProposalStatus, Requirement, RequirementStatus,
};
pub use memory::MemoryStore;

/// Error types for store operations
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("Record not found")]
	NotFound,
	#[error("Record status did not match expected status")]
	VersionConflict,
}

/// Record storage for the marketplace core
///
/// The store holds four independent keyed collections (listings,
/// requirements, proposals, price alerts) and supports point reads, point
/// writes, and an atomic compare-and-set update per record. The status
/// field of each mutable record doubles as its optimistic-concurrency
/// version marker.
///
/// Key semantic constraints:
/// - `cas_*` observes the record's current status under the record's lock;
///   if it differs from `expect`, the call fails with `VersionConflict`
///   and has no effect
/// - `apply` runs while the record lock is held and must not touch the
///   store (re-entrancy deadlocks)
/// - collection listings return records newest-first
///
/// This abstraction is implementation-agnostic: it can be backed by
/// in-memory structures or any durable key-value or relational store that
/// offers a conditional update primitive.
pub trait Store: Send + Sync {
	/// Insert a listing
	fn put_listing(&self, listing: Listing);

	/// All listings, newest first
	fn listings(&self) -> Vec<Listing>;

	/// Insert a requirement
	fn put_requirement(&self, requirement: Requirement);

	/// Point read of a requirement
	fn get_requirement(&self, id: &str) -> Option<Requirement>;

	/// All requirements, newest first
	fn requirements(&self) -> Vec<Requirement>;

	/// Atomically update a requirement whose status equals `expect`
	///
	/// Returns the updated record on success.
	fn cas_requirement(
		&self,
		id: &str,
		expect: RequirementStatus,
		apply: &dyn Fn(&mut Requirement),
	) -> Result<Requirement, StoreError>;

	/// Insert a proposal
	fn put_proposal(&self, proposal: Proposal);

	/// Point read of a proposal
	fn get_proposal(&self, id: &str) -> Option<Proposal>;

	/// All proposals referencing a requirement, newest first
	fn proposals_for_requirement(&self, requirement_id: &str) -> Vec<Proposal>;

	/// All proposals submitted by a farmer, newest first
	fn proposals_for_farmer(&self, farmer_id: &str) -> Vec<Proposal>;

	/// Atomically update a proposal whose status equals `expect`
	fn cas_proposal(
		&self,
		id: &str,
		expect: ProposalStatus,
		apply: &dyn Fn(&mut Proposal),
	) -> Result<Proposal, StoreError>;

	/// Insert a price alert
	fn put_alert(&self, alert: PriceAlert);

	/// Point read of an alert
	fn get_alert(&self, id: &str) -> Option<PriceAlert>;

	/// All Active alerts, newest first
	fn active_alerts(&self) -> Vec<PriceAlert>;

	/// Active alerts watching a commodity, newest first
	fn active_alerts_for_commodity(&self, commodity: &str) -> Vec<PriceAlert>;

	/// Atomically update an alert whose status equals `expect`
	fn cas_alert(
		&self,
		id: &str,
		expect: AlertStatus,
		apply: &dyn Fn(&mut PriceAlert),
	) -> Result<PriceAlert, StoreError>;
}
