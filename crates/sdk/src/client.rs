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

use std::time::Duration;

use reqwest::{Client as ReqwestClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::types::{
	AcceptProposalResponse, Ack, CreateAlertRequest, CreateListingRequest,
	CreateRequirementRequest, ListResponse, Listing, PriceAlert, PriceObservation, Proposal,
	ProposalCheck, ProposalView, Requirement, SubmitProposalRequest, TriggeredAlert,
};

/// Error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("Network error: {0}")]
	Network(String),
	#[error("Serialization error: {0}")]
	Serialization(String),
	#[error("Validation error: {0}")]
	Validation(String),
	#[error("Not found: {0}")]
	NotFound(String),
	#[error("Conflict: {0}")]
	Conflict(String),
	#[error("Server error: {0}")]
	Server(String),
}

/// Client for interacting with the marketplace gateway
///
/// This is an async client interface using reqwest for HTTP communication.
/// The three failure kinds the gateway distinguishes (validation, not-found,
/// conflict) are decoded from HTTP status codes into typed errors so callers
/// can render appropriate messaging without string matching.
pub struct Client {
	base_url: String,
	client: ReqwestClient,
}

impl Client {
	/// Create a new client with the given base URL
	pub fn new(base_url: impl Into<String>) -> Self {
		Self::with_config(base_url, Duration::from_secs(30))
	}

	/// Create a new client with custom request timeout
	pub fn with_config(base_url: impl Into<String>, timeout: Duration) -> Self {
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.build()
			.expect("Failed to create HTTP client");

		Self {
			base_url: base_url.into(),
			client,
		}
	}

	/// Post a farmer listing
	pub async fn create_listing(
		&self,
		request: CreateListingRequest,
	) -> Result<Listing, ClientError> {
		let url = format!("{}/api/v1/marketplace/listings", self.base_url);
		let response = self
			.client
			.post(&url)
			.json(&request)
			.send()
			.await
			.map_err(network_error)?;
		decode(response).await
	}

	/// Fetch all listings, newest first
	pub async fn list_listings(&self) -> Result<ListResponse<Listing>, ClientError> {
		let url = format!("{}/api/v1/marketplace/listings", self.base_url);
		let response = self.client.get(&url).send().await.map_err(network_error)?;
		decode(response).await
	}

	/// Post a buyer requirement
	pub async fn create_requirement(
		&self,
		request: CreateRequirementRequest,
	) -> Result<Requirement, ClientError> {
		let url = format!("{}/api/v1/marketplace/requirements", self.base_url);
		let response = self
			.client
			.post(&url)
			.json(&request)
			.send()
			.await
			.map_err(network_error)?;
		decode(response).await
	}

	/// Fetch all requirements, newest first
	pub async fn list_requirements(&self) -> Result<ListResponse<Requirement>, ClientError> {
		let url = format!("{}/api/v1/marketplace/requirements", self.base_url);
		let response = self.client.get(&url).send().await.map_err(network_error)?;
		decode(response).await
	}

	/// Submit a proposal against an open requirement
	pub async fn submit_proposal(
		&self,
		request: SubmitProposalRequest,
	) -> Result<Proposal, ClientError> {
		let url = format!("{}/api/v1/marketplace/proposals", self.base_url);
		let response = self
			.client
			.post(&url)
			.json(&request)
			.send()
			.await
			.map_err(network_error)?;
		decode(response).await
	}

	/// Fetch all proposals submitted against a requirement
	pub async fn proposals_for_requirement(
		&self,
		requirement_id: &str,
	) -> Result<Vec<Proposal>, ClientError> {
		let url = format!(
			"{}/api/v1/marketplace/requirements/{}/proposals",
			self.base_url, requirement_id
		);
		let response = self.client.get(&url).send().await.map_err(network_error)?;
		decode(response).await
	}

	/// Fetch a farmer's proposals joined with requirement text
	pub async fn proposals_for_farmer(
		&self,
		farmer_id: &str,
	) -> Result<Vec<ProposalView>, ClientError> {
		let url = format!(
			"{}/api/v1/marketplace/farmers/{}/proposals",
			self.base_url, farmer_id
		);
		let response = self.client.get(&url).send().await.map_err(network_error)?;
		decode(response).await
	}

	/// Check whether a farmer has already proposed on a requirement
	pub async fn check_proposal(
		&self,
		requirement_id: &str,
		farmer_id: &str,
	) -> Result<ProposalCheck, ClientError> {
		let url = format!(
			"{}/api/v1/marketplace/requirements/{}/proposals/check",
			self.base_url, requirement_id
		);
		let response = self
			.client
			.get(&url)
			.query(&[("farmer_id", farmer_id)])
			.send()
			.await
			.map_err(network_error)?;
		decode(response).await
	}

	/// Accept a proposal, satisfying its requirement
	///
	/// Loses with `ClientError::Conflict` when another proposal already won
	/// the requirement; retrying will observe the same conflict.
	pub async fn accept_proposal(
		&self,
		proposal_id: &str,
	) -> Result<AcceptProposalResponse, ClientError> {
		let url = format!(
			"{}/api/v1/marketplace/proposals/{}/accept",
			self.base_url, proposal_id
		);
		let response = self.client.post(&url).send().await.map_err(network_error)?;
		decode(response).await
	}

	/// Reject a pending proposal
	pub async fn reject_proposal(&self, proposal_id: &str) -> Result<Proposal, ClientError> {
		let url = format!(
			"{}/api/v1/marketplace/proposals/{}/reject",
			self.base_url, proposal_id
		);
		let response = self.client.post(&url).send().await.map_err(network_error)?;
		decode(response).await
	}

	/// Register a price alert
	pub async fn create_alert(
		&self,
		request: CreateAlertRequest,
	) -> Result<PriceAlert, ClientError> {
		let url = format!("{}/api/v1/alerts", self.base_url);
		let response = self
			.client
			.post(&url)
			.json(&request)
			.send()
			.await
			.map_err(network_error)?;
		decode(response).await
	}

	/// Fetch active alerts, newest first
	pub async fn list_active_alerts(&self) -> Result<Vec<PriceAlert>, ClientError> {
		let url = format!("{}/api/v1/alerts", self.base_url);
		let response = self.client.get(&url).send().await.map_err(network_error)?;
		decode(response).await
	}

	/// Cancel an alert
	pub async fn delete_alert(&self, alert_id: &str) -> Result<Ack, ClientError> {
		let url = format!("{}/api/v1/alerts/{}", self.base_url, alert_id);
		let response = self
			.client
			.delete(&url)
			.send()
			.await
			.map_err(network_error)?;
		decode(response).await
	}

	/// Publish a price observation, returning the alerts it triggered
	pub async fn publish_price(
		&self,
		observation: PriceObservation,
	) -> Result<Vec<TriggeredAlert>, ClientError> {
		let url = format!("{}/api/v1/prices", self.base_url);
		let response = self
			.client
			.post(&url)
			.json(&observation)
			.send()
			.await
			.map_err(network_error)?;
		decode(response).await
	}
}

fn network_error(err: reqwest::Error) -> ClientError {
	ClientError::Network(format!("Request failed: {}", err))
}

/// Decode a gateway response, mapping error statuses to typed errors
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
	let status = response.status();
	if status.is_success() {
		return response
			.json()
			.await
			.map_err(|e| ClientError::Serialization(format!("Failed to parse response: {}", e)));
	}

	let message = response
		.text()
		.await
		.ok()
		.and_then(|body| {
			serde_json::from_str::<serde_json::Value>(&body)
				.ok()
				.and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
				.or(Some(body))
		})
		.unwrap_or_else(|| format!("HTTP {}", status));

	Err(match status {
		StatusCode::BAD_REQUEST => ClientError::Validation(message),
		StatusCode::NOT_FOUND => ClientError::NotFound(message),
		StatusCode::CONFLICT => ClientError::Conflict(message),
		_ => ClientError::Server(format!("{}: {}", status, message)),
	})
}
