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

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::{Store, StoreError};
use mandi_sdk::types::{
	AlertStatus, Listing, PriceAlert, Proposal, ProposalStatus, Requirement, RequirementStatus,
};

/// In-memory implementation of the record store
///
/// Each collection is a `DashMap` keyed by record id. Compare-and-set runs
/// under the entry's shard write lock: the status check and the update are
/// observed as a single step by all other callers of the same record.
///
/// Characteristics:
/// - No durability guarantees
/// - Secondary lookups (by requirement, farmer, commodity) are full scans
/// - Listing order is reconstructed from `created_at`, newest first
///
/// Future evolution paths:
/// - Replace with a durable key-value or relational backend whose
///   conditional-update primitive carries the same per-record semantics
/// - Add secondary indexes if collection scans become a bottleneck
pub struct MemoryStore {
	listings: DashMap<String, Listing>,
	requirements: DashMap<String, Requirement>,
	proposals: DashMap<String, Proposal>,
	alerts: DashMap<String, PriceAlert>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self {
			listings: DashMap::new(),
			requirements: DashMap::new(),
			proposals: DashMap::new(),
			alerts: DashMap::new(),
		}
	}
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

/// Compare-and-set on one entry of a collection
///
/// The closure chain runs while the shard write lock for `id` is held, so
/// the status comparison and the mutation are atomic with respect to every
/// other store call touching the same record.
fn cas_entry<T, S>(
	map: &DashMap<String, T>,
	id: &str,
	expect: S,
	status_of: impl Fn(&T) -> S,
	apply: &dyn Fn(&mut T),
) -> Result<T, StoreError>
where
	T: Clone,
	S: PartialEq,
{
	let mut entry = map.get_mut(id).ok_or(StoreError::NotFound)?;
	if status_of(entry.value()) != expect {
		return Err(StoreError::VersionConflict);
	}
	apply(entry.value_mut());
	Ok(entry.value().clone())
}

fn newest_first<T>(mut records: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
	records.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
	records
}

impl Store for MemoryStore {
	fn put_listing(&self, listing: Listing) {
		self.listings.insert(listing.id.clone(), listing);
	}

	fn listings(&self) -> Vec<Listing> {
		let records = self.listings.iter().map(|e| e.value().clone()).collect();
		newest_first(records, |l: &Listing| l.created_at)
	}

	fn put_requirement(&self, requirement: Requirement) {
		self.requirements
			.insert(requirement.id.clone(), requirement);
	}

	fn get_requirement(&self, id: &str) -> Option<Requirement> {
		self.requirements.get(id).map(|e| e.value().clone())
	}

	fn requirements(&self) -> Vec<Requirement> {
		let records = self
			.requirements
			.iter()
			.map(|e| e.value().clone())
			.collect();
		newest_first(records, |r: &Requirement| r.created_at)
	}

	fn cas_requirement(
		&self,
		id: &str,
		expect: RequirementStatus,
		apply: &dyn Fn(&mut Requirement),
	) -> Result<Requirement, StoreError> {
		cas_entry(&self.requirements, id, expect, |r| r.status, apply)
	}

	fn put_proposal(&self, proposal: Proposal) {
		self.proposals.insert(proposal.id.clone(), proposal);
	}

	fn get_proposal(&self, id: &str) -> Option<Proposal> {
		self.proposals.get(id).map(|e| e.value().clone())
	}

	fn proposals_for_requirement(&self, requirement_id: &str) -> Vec<Proposal> {
		let records = self
			.proposals
			.iter()
			.filter(|e| e.value().requirement_id == requirement_id)
			.map(|e| e.value().clone())
			.collect();
		newest_first(records, |p: &Proposal| p.created_at)
	}

	fn proposals_for_farmer(&self, farmer_id: &str) -> Vec<Proposal> {
		let records = self
			.proposals
			.iter()
			.filter(|e| e.value().farmer_id == farmer_id)
			.map(|e| e.value().clone())
			.collect();
		newest_first(records, |p: &Proposal| p.created_at)
	}

	fn cas_proposal(
		&self,
		id: &str,
		expect: ProposalStatus,
		apply: &dyn Fn(&mut Proposal),
	) -> Result<Proposal, StoreError> {
		cas_entry(&self.proposals, id, expect, |p| p.status, apply)
	}

	fn put_alert(&self, alert: PriceAlert) {
		self.alerts.insert(alert.id.clone(), alert);
	}

	fn get_alert(&self, id: &str) -> Option<PriceAlert> {
		self.alerts.get(id).map(|e| e.value().clone())
	}

	fn active_alerts(&self) -> Vec<PriceAlert> {
		let records = self
			.alerts
			.iter()
			.filter(|e| e.value().status == AlertStatus::Active)
			.map(|e| e.value().clone())
			.collect();
		newest_first(records, |a: &PriceAlert| a.created_at)
	}

	fn active_alerts_for_commodity(&self, commodity: &str) -> Vec<PriceAlert> {
		let records = self
			.alerts
			.iter()
			.filter(|e| {
				e.value().status == AlertStatus::Active && e.value().commodity == commodity
			})
			.map(|e| e.value().clone())
			.collect();
		newest_first(records, |a: &PriceAlert| a.created_at)
	}

	fn cas_alert(
		&self,
		id: &str,
		expect: AlertStatus,
		apply: &dyn Fn(&mut PriceAlert),
	) -> Result<PriceAlert, StoreError> {
		cas_entry(&self.alerts, id, expect, |a| a.status, apply)
	}
}
