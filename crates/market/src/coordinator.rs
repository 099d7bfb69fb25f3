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

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::MarketError;
use crate::store::{Store, StoreError};
use mandi_sdk::types::{
	CreateListingRequest, CreateRequirementRequest, Listing, Proposal, ProposalCheck,
	ProposalStatus, ProposalView, Requirement, RequirementStatus, SubmitProposalRequest,
};

/// Matching coordinator for the requirement/proposal lifecycle
///
/// The coordinator owns all transitions of requirements and proposals and
/// enforces the exclusivity invariant: for every requirement, at most one
/// proposal ever reaches Accepted. Each public operation is invoked by an
/// independent concurrent caller; serialization between racing callers
/// happens entirely through the store's per-record compare-and-set, with
/// first-committer-wins semantics and no external locking.
pub struct MatchingCoordinator {
	store: Arc<dyn Store>,
}

impl MatchingCoordinator {
	pub fn new(store: Arc<dyn Store>) -> Self {
		Self { store }
	}

	/// Create a listing
	///
	/// Pure creation: listings are immutable and carry no lifecycle.
	pub fn create_listing(&self, request: CreateListingRequest) -> Result<Listing, MarketError> {
		if request.quantity <= 0.0 {
			return Err(MarketError::Validation(
				"Listing quantity must be positive".to_string(),
			));
		}
		if request.price_per_unit <= 0.0 {
			return Err(MarketError::Validation(
				"Listing price must be positive".to_string(),
			));
		}
		if request.crop_name.trim().is_empty() {
			return Err(MarketError::Validation(
				"Crop name must not be empty".to_string(),
			));
		}

		let listing = Listing {
			id: Uuid::new_v4().to_string(),
			farmer_id: request.farmer_id,
			crop_name: request.crop_name,
			quantity: request.quantity,
			unit: request.unit.unwrap_or_else(|| "kg".to_string()),
			price_per_unit: request.price_per_unit,
			description: request.description,
			created_at: Utc::now(),
		};
		self.store.put_listing(listing.clone());

		info!(
			target: "coordinator",
			"Listing {} created by farmer {} for {}",
			listing.id, listing.farmer_id, listing.crop_name
		);
		Ok(listing)
	}

	/// All listings, newest first
	pub fn list_listings(&self) -> Vec<Listing> {
		self.store.listings()
	}

	/// Post a buyer requirement, created Open
	pub fn create_requirement(
		&self,
		request: CreateRequirementRequest,
	) -> Result<Requirement, MarketError> {
		if request.requirement.trim().is_empty() {
			return Err(MarketError::Validation(
				"Requirement text must not be empty".to_string(),
			));
		}

		let requirement = Requirement {
			id: Uuid::new_v4().to_string(),
			buyer_id: request.buyer_id,
			contact_name: request.contact_name,
			contact_phone: request.contact_phone,
			contact_email: request.contact_email,
			requirement: request.requirement,
			status: RequirementStatus::Open,
			satisfied_by_farmer_id: None,
			created_at: Utc::now(),
		};
		self.store.put_requirement(requirement.clone());

		info!(target: "coordinator", "Requirement {} posted", requirement.id);
		Ok(requirement)
	}

	/// All requirements, newest first
	pub fn list_requirements(&self) -> Vec<Requirement> {
		self.store.requirements()
	}

	/// Submit a proposal against an open requirement
	///
	/// Multiple Pending proposals per requirement are allowed; they compete
	/// until one of them is accepted. Fails with `NotFound` for an unknown
	/// requirement and `Conflict` for one that is already Satisfied.
	pub fn submit_proposal(
		&self,
		request: SubmitProposalRequest,
	) -> Result<Proposal, MarketError> {
		if request.quantity <= 0.0 {
			return Err(MarketError::Validation(
				"Proposal quantity must be positive".to_string(),
			));
		}
		if request.price_per_unit <= 0.0 {
			return Err(MarketError::Validation(
				"Proposal price must be positive".to_string(),
			));
		}

		let requirement = self
			.store
			.get_requirement(&request.requirement_id)
			.ok_or_else(|| {
				MarketError::NotFound(format!(
					"Requirement {} does not exist",
					request.requirement_id
				))
			})?;
		if requirement.status == RequirementStatus::Satisfied {
			return Err(MarketError::Conflict(format!(
				"Requirement {} is already satisfied",
				requirement.id
			)));
		}

		let now = Utc::now();
		let proposal = Proposal {
			id: Uuid::new_v4().to_string(),
			farmer_id: request.farmer_id,
			requirement_id: request.requirement_id,
			quantity: request.quantity,
			price_per_unit: request.price_per_unit,
			unit: request.unit.unwrap_or_else(|| "kg".to_string()),
			status: ProposalStatus::Pending,
			created_at: now,
			updated_at: now,
		};
		self.store.put_proposal(proposal.clone());

		info!(
			target: "coordinator",
			"Proposal {} submitted by farmer {} on requirement {}",
			proposal.id, proposal.farmer_id, proposal.requirement_id
		);
		Ok(proposal)
	}

	/// All proposals submitted against a requirement, newest first
	pub fn proposals_for_requirement(&self, requirement_id: &str) -> Vec<Proposal> {
		self.store.proposals_for_requirement(requirement_id)
	}

	/// A farmer's proposals joined with the requirement text for display
	pub fn proposals_for_farmer(&self, farmer_id: &str) -> Vec<ProposalView> {
		self.store
			.proposals_for_farmer(farmer_id)
			.into_iter()
			.map(|proposal| {
				let requirement = self
					.store
					.get_requirement(&proposal.requirement_id)
					.map(|r| r.requirement)
					.unwrap_or_default();
				ProposalView {
					proposal,
					requirement,
				}
			})
			.collect()
	}

	/// Whether a farmer has already proposed on a requirement
	pub fn check_proposal(&self, farmer_id: &str, requirement_id: &str) -> ProposalCheck {
		let existing = self
			.store
			.proposals_for_requirement(requirement_id)
			.into_iter()
			.find(|p| p.farmer_id == farmer_id);

		match existing {
			Some(proposal) => ProposalCheck {
				has_proposed: true,
				proposal_id: Some(proposal.id),
				status: Some(proposal.status),
			},
			None => ProposalCheck {
				has_proposed: false,
				proposal_id: None,
				status: None,
			},
		}
	}

	/// Accept a proposal, satisfying its requirement
	///
	/// The exclusivity guard is a two-phase compare-and-set:
	/// 1. requirement `Open -> Satisfied` (the anchor: of two racing
	///    accepts, exactly one commits this transition; the loser observes
	///    Satisfied and fails with `Conflict`)
	/// 2. proposal `Pending -> Accepted`; if a concurrent reject already
	///    took the proposal terminal, the requirement transition from step 1
	///    is rolled back and the accept fails with `Conflict`
	///
	/// Sibling Pending proposals on the same requirement are deliberately
	/// left untouched; they remain visible as history.
	pub fn accept_proposal(
		&self,
		proposal_id: &str,
	) -> Result<(Requirement, Proposal), MarketError> {
		let proposal = self.store.get_proposal(proposal_id).ok_or_else(|| {
			MarketError::NotFound(format!("Proposal {} does not exist", proposal_id))
		})?;
		if proposal.status != ProposalStatus::Pending {
			return Err(MarketError::Conflict(format!(
				"Proposal {} is no longer pending",
				proposal_id
			)));
		}

		let farmer_id = proposal.farmer_id.clone();
		let requirement = self
			.store
			.cas_requirement(&proposal.requirement_id, RequirementStatus::Open, &|r| {
				r.status = RequirementStatus::Satisfied;
				r.satisfied_by_farmer_id = Some(farmer_id.clone());
			})
			.map_err(|err| match err {
				StoreError::NotFound => MarketError::NotFound(format!(
					"Requirement {} does not exist",
					proposal.requirement_id
				)),
				StoreError::VersionConflict => MarketError::Conflict(format!(
					"Requirement {} is already satisfied",
					proposal.requirement_id
				)),
			})?;

		match self
			.store
			.cas_proposal(proposal_id, ProposalStatus::Pending, &|p| {
				p.status = ProposalStatus::Accepted;
				p.updated_at = Utc::now();
			}) {
			Ok(accepted) => {
				info!(
					target: "coordinator",
					"Proposal {} accepted; requirement {} satisfied by farmer {}",
					accepted.id, requirement.id, accepted.farmer_id
				);
				Ok((requirement, accepted))
			}
			Err(_) => {
				// A concurrent reject took the proposal terminal between the
				// two phases. Release the requirement claim; the Satisfied
				// state was set by this call and no other caller can
				// transition a Satisfied requirement.
				let _ = self.store.cas_requirement(
					&proposal.requirement_id,
					RequirementStatus::Satisfied,
					&|r| {
						r.status = RequirementStatus::Open;
						r.satisfied_by_farmer_id = None;
					},
				);
				Err(MarketError::Conflict(format!(
					"Proposal {} is no longer pending",
					proposal_id
				)))
			}
		}
	}

	/// Reject a pending proposal
	///
	/// Never touches the requirement. Rejecting a proposal that is already
	/// Accepted or Rejected is a `Conflict`: terminal states admit no
	/// further transitions, including no-op re-application.
	pub fn reject_proposal(&self, proposal_id: &str) -> Result<Proposal, MarketError> {
		if self.store.get_proposal(proposal_id).is_none() {
			return Err(MarketError::NotFound(format!(
				"Proposal {} does not exist",
				proposal_id
			)));
		}

		match self
			.store
			.cas_proposal(proposal_id, ProposalStatus::Pending, &|p| {
				p.status = ProposalStatus::Rejected;
				p.updated_at = Utc::now();
			}) {
			Ok(rejected) => {
				info!(target: "coordinator", "Proposal {} rejected", rejected.id);
				Ok(rejected)
			}
			Err(StoreError::NotFound) => Err(MarketError::NotFound(format!(
				"Proposal {} does not exist",
				proposal_id
			))),
			Err(StoreError::VersionConflict) => Err(MarketError::Conflict(format!(
				"Proposal {} is no longer pending",
				proposal_id
			))),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::store::MemoryStore;

	fn coordinator() -> MatchingCoordinator {
		MatchingCoordinator::new(Arc::new(MemoryStore::new()))
	}

	fn requirement_request(text: &str) -> CreateRequirementRequest {
		CreateRequirementRequest {
			requirement: text.to_string(),
			buyer_id: Some("buyer_1".to_string()),
			contact_name: None,
			contact_phone: None,
			contact_email: None,
		}
	}

	fn proposal_request(farmer_id: &str, requirement_id: &str) -> SubmitProposalRequest {
		SubmitProposalRequest {
			farmer_id: farmer_id.to_string(),
			requirement_id: requirement_id.to_string(),
			quantity: 500.0,
			price_per_unit: 10.0,
			unit: None,
		}
	}

	#[test]
	fn test_create_listing_validates_input() {
		let coordinator = coordinator();

		let mut request = CreateListingRequest {
			farmer_id: "farmer_1".to_string(),
			crop_name: "Tomato".to_string(),
			quantity: 100.0,
			unit: None,
			price_per_unit: 12.5,
			description: None,
		};
		let listing = coordinator.create_listing(request.clone()).unwrap();
		assert_eq!(listing.unit, "kg");

		request.quantity = 0.0;
		assert!(matches!(
			coordinator.create_listing(request),
			Err(MarketError::Validation(_))
		));
	}

	#[test]
	fn test_submit_proposal_requires_open_requirement() {
		let coordinator = coordinator();

		let missing = coordinator.submit_proposal(proposal_request("farmer_1", "missing"));
		assert!(matches!(missing, Err(MarketError::NotFound(_))));

		let requirement = coordinator
			.create_requirement(requirement_request("need 500kg tomato"))
			.unwrap();
		let proposal = coordinator
			.submit_proposal(proposal_request("farmer_1", &requirement.id))
			.unwrap();
		assert_eq!(proposal.status, ProposalStatus::Pending);

		coordinator.accept_proposal(&proposal.id).unwrap();
		let late = coordinator.submit_proposal(proposal_request("farmer_2", &requirement.id));
		assert!(matches!(late, Err(MarketError::Conflict(_))));
	}

	#[test]
	fn test_accept_marks_requirement_satisfied() {
		let coordinator = coordinator();
		let requirement = coordinator
			.create_requirement(requirement_request("need 500kg tomato"))
			.unwrap();
		let proposal = coordinator
			.submit_proposal(proposal_request("farmer_1", &requirement.id))
			.unwrap();

		let (updated_requirement, accepted) = coordinator.accept_proposal(&proposal.id).unwrap();
		assert_eq!(updated_requirement.status, RequirementStatus::Satisfied);
		assert_eq!(
			updated_requirement.satisfied_by_farmer_id.as_deref(),
			Some("farmer_1")
		);
		assert_eq!(accepted.status, ProposalStatus::Accepted);
	}

	#[test]
	fn test_second_accept_conflicts() {
		let coordinator = coordinator();
		let requirement = coordinator
			.create_requirement(requirement_request("need 500kg tomato"))
			.unwrap();
		let first = coordinator
			.submit_proposal(proposal_request("farmer_1", &requirement.id))
			.unwrap();
		let second = coordinator
			.submit_proposal(proposal_request("farmer_2", &requirement.id))
			.unwrap();

		coordinator.accept_proposal(&first.id).unwrap();
		assert!(matches!(
			coordinator.accept_proposal(&second.id),
			Err(MarketError::Conflict(_))
		));

		// The losing sibling stays Pending as history
		let sibling = coordinator
			.proposals_for_requirement(&requirement.id)
			.into_iter()
			.find(|p| p.id == second.id)
			.unwrap();
		assert_eq!(sibling.status, ProposalStatus::Pending);
	}

	#[test]
	fn test_reject_is_terminal_and_not_repeatable() {
		let coordinator = coordinator();
		let requirement = coordinator
			.create_requirement(requirement_request("need onions"))
			.unwrap();
		let proposal = coordinator
			.submit_proposal(proposal_request("farmer_1", &requirement.id))
			.unwrap();

		let rejected = coordinator.reject_proposal(&proposal.id).unwrap();
		assert_eq!(rejected.status, ProposalStatus::Rejected);

		assert!(matches!(
			coordinator.reject_proposal(&proposal.id),
			Err(MarketError::Conflict(_))
		));
		assert!(matches!(
			coordinator.accept_proposal(&proposal.id),
			Err(MarketError::Conflict(_))
		));

		// The requirement is untouched by rejection
		let requirement = coordinator
			.list_requirements()
			.into_iter()
			.find(|r| r.id == requirement.id)
			.unwrap();
		assert_eq!(requirement.status, RequirementStatus::Open);
	}

	#[test]
	fn test_check_proposal_reports_existing_submission() {
		let coordinator = coordinator();
		let requirement = coordinator
			.create_requirement(requirement_request("need 500kg tomato"))
			.unwrap();

		let before = coordinator.check_proposal("farmer_1", &requirement.id);
		assert!(!before.has_proposed);
		assert!(before.proposal_id.is_none());

		let proposal = coordinator
			.submit_proposal(proposal_request("farmer_1", &requirement.id))
			.unwrap();

		let after = coordinator.check_proposal("farmer_1", &requirement.id);
		assert!(after.has_proposed);
		assert_eq!(after.proposal_id.as_deref(), Some(proposal.id.as_str()));
		assert_eq!(after.status, Some(ProposalStatus::Pending));
	}

	#[test]
	fn test_proposals_for_farmer_carry_requirement_text() {
		let coordinator = coordinator();
		let requirement = coordinator
			.create_requirement(requirement_request("need 500kg tomato"))
			.unwrap();
		coordinator
			.submit_proposal(proposal_request("farmer_1", &requirement.id))
			.unwrap();

		let views = coordinator.proposals_for_farmer("farmer_1");
		assert_eq!(views.len(), 1);
		assert_eq!(views[0].requirement, "need 500kg tomato");
	}
}
