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
use serde::{Deserialize, Serialize};

/// Lifecycle state of a buyer requirement
///
/// A requirement is created Open and transitions to Satisfied exactly once,
/// when a proposal against it is accepted. Satisfied is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementStatus {
	Open,
	Satisfied,
}

/// Lifecycle state of a farmer proposal
///
/// Pending proposals compete for the same requirement; at most one of them
/// ever reaches Accepted. Accepted and Rejected are both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
	Pending,
	Accepted,
	Rejected,
}

/// Lifecycle state of a price alert
///
/// An alert is created Active. Triggered (threshold crossed) and Deleted
/// (cancelled by the farmer) are both terminal with respect to evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
	Active,
	Triggered,
	Deleted,
}

/// Threshold crossing direction for a price alert
///
/// Wire spelling is `below`/`above`, matching the original alert records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
	Below,
	Above,
}

/// Farmer-posted standing offer to sell
///
/// Listings are immutable after creation; there is no lifecycle beyond
/// creation and listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
	pub id: String,
	pub farmer_id: String,
	pub crop_name: String,
	pub quantity: f64,
	pub unit: String,
	pub price_per_unit: f64,
	pub description: Option<String>,
	pub created_at: DateTime<Utc>,
}

/// Buyer-posted need, open until one proposal is accepted against it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requirement {
	pub id: String,
	pub buyer_id: Option<String>,
	pub contact_name: Option<String>,
	pub contact_phone: Option<String>,
	pub contact_email: Option<String>,
	/// Free-text description of what the buyer needs
	pub requirement: String,
	pub status: RequirementStatus,
	/// Farmer whose proposal satisfied this requirement, once Satisfied
	pub satisfied_by_farmer_id: Option<String>,
	pub created_at: DateTime<Utc>,
}

/// Farmer's offer against a specific requirement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
	pub id: String,
	pub farmer_id: String,
	pub requirement_id: String,
	pub quantity: f64,
	pub price_per_unit: f64,
	pub unit: String,
	pub status: ProposalStatus,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Farmer's standing watch for a commodity price crossing a threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceAlert {
	pub id: String,
	pub farmer_id: String,
	pub commodity: String,
	pub target_price: f64,
	#[serde(rename = "alert_type")]
	pub direction: AlertDirection,
	pub status: AlertStatus,
	pub created_at: DateTime<Utc>,
	pub triggered_at: Option<DateTime<Utc>>,
}

/// Request to create a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateListingRequest {
	pub farmer_id: String,
	pub crop_name: String,
	pub quantity: f64,
	/// Defaults to "kg" when omitted
	pub unit: Option<String>,
	pub price_per_unit: f64,
	pub description: Option<String>,
}

/// Request to post a buyer requirement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequirementRequest {
	pub requirement: String,
	pub buyer_id: Option<String>,
	pub contact_name: Option<String>,
	pub contact_phone: Option<String>,
	pub contact_email: Option<String>,
}

/// Request to submit a proposal against a requirement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitProposalRequest {
	pub farmer_id: String,
	pub requirement_id: String,
	pub quantity: f64,
	pub price_per_unit: f64,
	/// Defaults to "kg" when omitted
	pub unit: Option<String>,
}

/// Request to register a price alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAlertRequest {
	/// Absent farmer_id means an anonymous identifier is synthesized
	pub farmer_id: Option<String>,
	pub commodity: String,
	pub target_price: f64,
	#[serde(rename = "alert_type")]
	pub direction: AlertDirection,
}

/// A single price observation from the price feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceObservation {
	pub commodity: String,
	pub price: f64,
}

/// Result of checking whether a farmer already proposed on a requirement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalCheck {
	pub has_proposed: bool,
	pub proposal_id: Option<String>,
	pub status: Option<ProposalStatus>,
}

/// Proposal joined with its requirement text, for farmer-facing display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalView {
	#[serde(flatten)]
	pub proposal: Proposal,
	/// Text of the requirement the proposal was submitted against
	pub requirement: String,
}

/// Response from accepting a proposal: both updated records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptProposalResponse {
	pub requirement: Requirement,
	pub proposal: Proposal,
}

/// An alert that fired during a price evaluation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggeredAlert {
	pub id: String,
	pub farmer_id: String,
	pub commodity: String,
	pub current_price: f64,
	pub target_price: f64,
	#[serde(rename = "alert_type")]
	pub direction: AlertDirection,
}

/// List envelope carrying a count alongside the items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
	pub count: usize,
	pub items: Vec<T>,
}

impl<T> From<Vec<T>> for ListResponse<T> {
	fn from(items: Vec<T>) -> Self {
		Self {
			count: items.len(),
			items,
		}
	}
}

/// Acknowledgement body for operations with no record payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
	pub message: String,
}
