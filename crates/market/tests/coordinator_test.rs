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

//! Integration tests for the matching coordinator
//!
//! These tests exercise the requirement/proposal lifecycle end to end,
//! including the exclusivity invariant under concurrent accepts.

use std::sync::{Arc, Barrier};
use std::thread;

use mandi_market::{MarketError, MatchingCoordinator, MemoryStore, Store};
use mandi_sdk::types::{
	CreateRequirementRequest, ProposalStatus, RequirementStatus, SubmitProposalRequest,
};

fn setup() -> (Arc<MemoryStore>, MatchingCoordinator) {
	let store = Arc::new(MemoryStore::new());
	let coordinator = MatchingCoordinator::new(store.clone());
	(store, coordinator)
}

fn requirement_request(text: &str) -> CreateRequirementRequest {
	CreateRequirementRequest {
		requirement: text.to_string(),
		buyer_id: None,
		contact_name: Some("Asha".to_string()),
		contact_phone: Some("9800000000".to_string()),
		contact_email: None,
	}
}

fn proposal_request(farmer_id: &str, requirement_id: &str, price: f64) -> SubmitProposalRequest {
	SubmitProposalRequest {
		farmer_id: farmer_id.to_string(),
		requirement_id: requirement_id.to_string(),
		quantity: 500.0,
		price_per_unit: price,
		unit: None,
	}
}

/// Count accepted proposals on a requirement; the exclusivity invariant
/// requires this never exceeds one.
fn accepted_count(store: &MemoryStore, requirement_id: &str) -> usize {
	store
		.proposals_for_requirement(requirement_id)
		.iter()
		.filter(|p| p.status == ProposalStatus::Accepted)
		.count()
}

#[test]
fn test_end_to_end_negotiation() {
	let (store, coordinator) = setup();

	let requirement = coordinator
		.create_requirement(requirement_request("need 500kg tomato"))
		.unwrap();

	let p1 = coordinator
		.submit_proposal(proposal_request("farmer_1", &requirement.id, 10.0))
		.unwrap();
	let p2 = coordinator
		.submit_proposal(proposal_request("farmer_2", &requirement.id, 9.0))
		.unwrap();

	// Buyer accepts the cheaper offer
	let (updated, accepted) = coordinator.accept_proposal(&p2.id).unwrap();
	assert_eq!(updated.status, RequirementStatus::Satisfied);
	assert_eq!(updated.satisfied_by_farmer_id.as_deref(), Some("farmer_2"));
	assert_eq!(accepted.status, ProposalStatus::Accepted);

	// The earlier proposal can no longer win
	assert!(matches!(
		coordinator.accept_proposal(&p1.id),
		Err(MarketError::Conflict(_))
	));

	// A third farmer cannot submit once the requirement is satisfied
	assert!(matches!(
		coordinator.submit_proposal(proposal_request("farmer_3", &requirement.id, 8.0)),
		Err(MarketError::Conflict(_))
	));

	assert_eq!(accepted_count(&store, &requirement.id), 1);
}

#[test]
fn test_concurrent_accepts_have_exactly_one_winner() {
	let (store, coordinator) = setup();
	let coordinator = Arc::new(coordinator);

	let requirement = coordinator
		.create_requirement(requirement_request("need 500kg tomato"))
		.unwrap();
	let p1 = coordinator
		.submit_proposal(proposal_request("farmer_1", &requirement.id, 10.0))
		.unwrap();
	let p2 = coordinator
		.submit_proposal(proposal_request("farmer_2", &requirement.id, 9.0))
		.unwrap();

	let barrier = Arc::new(Barrier::new(2));
	let handles: Vec<_> = [p1.id.clone(), p2.id.clone()]
		.into_iter()
		.map(|proposal_id| {
			let coordinator = coordinator.clone();
			let barrier = barrier.clone();
			thread::spawn(move || {
				barrier.wait();
				coordinator.accept_proposal(&proposal_id)
			})
		})
		.collect();

	let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
	let winners = results.iter().filter(|r| r.is_ok()).count();
	let conflicts = results
		.iter()
		.filter(|r| matches!(r, Err(MarketError::Conflict(_))))
		.count();

	assert_eq!(winners, 1);
	assert_eq!(conflicts, 1);
	assert_eq!(accepted_count(&store, &requirement.id), 1);

	let requirement = store.get_requirement(&requirement.id).unwrap();
	assert_eq!(requirement.status, RequirementStatus::Satisfied);

	// The winner recorded its own farmer on the requirement
	let accepted = store
		.proposals_for_requirement(&requirement.id)
		.into_iter()
		.find(|p| p.status == ProposalStatus::Accepted)
		.unwrap();
	assert_eq!(
		requirement.satisfied_by_farmer_id.as_deref(),
		Some(accepted.farmer_id.as_str())
	);
}

#[test]
fn test_repeated_accept_race_over_many_rounds() {
	// Hammer the accept race to catch interleavings a single round misses
	for _ in 0..100 {
		let (store, coordinator) = setup();
		let coordinator = Arc::new(coordinator);

		let requirement = coordinator
			.create_requirement(requirement_request("need wheat"))
			.unwrap();
		let proposal_ids: Vec<String> = (0..4)
			.map(|i| {
				coordinator
					.submit_proposal(proposal_request(
						&format!("farmer_{}", i),
						&requirement.id,
						10.0 + i as f64,
					))
					.unwrap()
					.id
			})
			.collect();

		let barrier = Arc::new(Barrier::new(proposal_ids.len()));
		let handles: Vec<_> = proposal_ids
			.into_iter()
			.map(|proposal_id| {
				let coordinator = coordinator.clone();
				let barrier = barrier.clone();
				thread::spawn(move || {
					barrier.wait();
					coordinator.accept_proposal(&proposal_id).is_ok()
				})
			})
			.collect();

		let winners = handles
			.into_iter()
			.map(|h| h.join().unwrap())
			.filter(|won| *won)
			.count();

		assert_eq!(winners, 1);
		assert_eq!(accepted_count(&store, &requirement.id), 1);
	}
}

#[test]
fn test_accept_and_reject_race_leaves_consistent_state() {
	for _ in 0..100 {
		let (store, coordinator) = setup();
		let coordinator = Arc::new(coordinator);

		let requirement = coordinator
			.create_requirement(requirement_request("need onions"))
			.unwrap();
		let proposal = coordinator
			.submit_proposal(proposal_request("farmer_1", &requirement.id, 10.0))
			.unwrap();

		let barrier = Arc::new(Barrier::new(2));
		let accept = {
			let coordinator = coordinator.clone();
			let barrier = barrier.clone();
			let id = proposal.id.clone();
			thread::spawn(move || {
				barrier.wait();
				coordinator.accept_proposal(&id).is_ok()
			})
		};
		let reject = {
			let coordinator = coordinator.clone();
			let barrier = barrier.clone();
			let id = proposal.id.clone();
			thread::spawn(move || {
				barrier.wait();
				coordinator.reject_proposal(&id).is_ok()
			})
		};

		let accept_won = accept.join().unwrap();
		let reject_won = reject.join().unwrap();

		// Exactly one transition out of Pending commits
		assert!(accept_won ^ reject_won);

		let proposal = store.get_proposal(&proposal.id).unwrap();
		let requirement = store.get_requirement(&requirement.id).unwrap();
		if accept_won {
			assert_eq!(proposal.status, ProposalStatus::Accepted);
			assert_eq!(requirement.status, RequirementStatus::Satisfied);
			assert_eq!(
				requirement.satisfied_by_farmer_id.as_deref(),
				Some("farmer_1")
			);
		} else {
			// The accept rolled its requirement claim back
			assert_eq!(proposal.status, ProposalStatus::Rejected);
			assert_eq!(requirement.status, RequirementStatus::Open);
			assert!(requirement.satisfied_by_farmer_id.is_none());
		}
	}
}

#[test]
fn test_reject_unknown_proposal_is_not_found() {
	let (_, coordinator) = setup();
	assert!(matches!(
		coordinator.reject_proposal("missing"),
		Err(MarketError::NotFound(_))
	));
	assert!(matches!(
		coordinator.accept_proposal("missing"),
		Err(MarketError::NotFound(_))
	));
}
