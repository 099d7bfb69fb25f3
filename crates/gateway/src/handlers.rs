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

use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use thiserror::Error;

use mandi_market::MarketError;
use mandi_sdk::types::{
	AcceptProposalResponse, Ack, CreateAlertRequest, CreateListingRequest,
	CreateRequirementRequest, ListResponse, PriceObservation, SubmitProposalRequest,
};

use crate::server::GatewayState;

/// Error types for gateway operations
///
/// The three market failure kinds map onto distinct HTTP statuses so
/// clients can distinguish "already taken by another farmer" (409) from
/// "not found" (404) and malformed input (400).
#[derive(Debug, Error)]
pub enum GatewayError {
	#[error(transparent)]
	Market(#[from] MarketError),
}

impl actix_web::ResponseError for GatewayError {
	fn error_response(&self) -> HttpResponse {
		let status = match self {
			GatewayError::Market(MarketError::Validation(_)) => {
				actix_web::http::StatusCode::BAD_REQUEST
			}
			GatewayError::Market(MarketError::NotFound(_)) => {
				actix_web::http::StatusCode::NOT_FOUND
			}
			GatewayError::Market(MarketError::Conflict(_)) => {
				actix_web::http::StatusCode::CONFLICT
			}
		};

		HttpResponse::build(status).json(serde_json::json!({
			"error": self.to_string()
		}))
	}
}

/// Health check endpoint
pub async fn health() -> impl Responder {
	HttpResponse::Ok().json(serde_json::json!({
		"status": "ok",
		"service": "mandi-gateway"
	}))
}

/// Post a farmer listing
pub async fn create_listing(
	state: web::Data<GatewayState>,
	request: web::Json<CreateListingRequest>,
) -> Result<HttpResponse, GatewayError> {
	let listing = state.coordinator.create_listing(request.into_inner())?;
	Ok(HttpResponse::Ok().json(listing))
}

/// List all listings, newest first
pub async fn list_listings(state: web::Data<GatewayState>) -> Result<HttpResponse, GatewayError> {
	let listings = state.coordinator.list_listings();
	Ok(HttpResponse::Ok().json(ListResponse::from(listings)))
}

/// Post a buyer requirement
pub async fn create_requirement(
	state: web::Data<GatewayState>,
	request: web::Json<CreateRequirementRequest>,
) -> Result<HttpResponse, GatewayError> {
	let requirement = state.coordinator.create_requirement(request.into_inner())?;
	Ok(HttpResponse::Ok().json(requirement))
}

/// List all requirements, newest first
pub async fn list_requirements(
	state: web::Data<GatewayState>,
) -> Result<HttpResponse, GatewayError> {
	let requirements = state.coordinator.list_requirements();
	Ok(HttpResponse::Ok().json(ListResponse::from(requirements)))
}

/// Submit a proposal against an open requirement
pub async fn submit_proposal(
	state: web::Data<GatewayState>,
	request: web::Json<SubmitProposalRequest>,
) -> Result<HttpResponse, GatewayError> {
	let proposal = state.coordinator.submit_proposal(request.into_inner())?;
	Ok(HttpResponse::Ok().json(proposal))
}

/// List proposals submitted against a requirement
pub async fn proposals_for_requirement(
	state: web::Data<GatewayState>,
	path: web::Path<String>,
) -> Result<HttpResponse, GatewayError> {
	let requirement_id = path.into_inner();
	let proposals = state.coordinator.proposals_for_requirement(&requirement_id);
	Ok(HttpResponse::Ok().json(proposals))
}

/// List a farmer's proposals joined with requirement text
pub async fn proposals_for_farmer(
	state: web::Data<GatewayState>,
	path: web::Path<String>,
) -> Result<HttpResponse, GatewayError> {
	let farmer_id = path.into_inner();
	let views = state.coordinator.proposals_for_farmer(&farmer_id);
	Ok(HttpResponse::Ok().json(views))
}

#[derive(Debug, Deserialize)]
pub struct CheckProposalQuery {
	pub farmer_id: String,
}

/// Check whether a farmer has already proposed on a requirement
pub async fn check_proposal(
	state: web::Data<GatewayState>,
	path: web::Path<String>,
	query: web::Query<CheckProposalQuery>,
) -> Result<HttpResponse, GatewayError> {
	let requirement_id = path.into_inner();
	let check = state
		.coordinator
		.check_proposal(&query.farmer_id, &requirement_id);
	Ok(HttpResponse::Ok().json(check))
}

/// Accept a proposal, satisfying its requirement
pub async fn accept_proposal(
	state: web::Data<GatewayState>,
	path: web::Path<String>,
) -> Result<HttpResponse, GatewayError> {
	let proposal_id = path.into_inner();
	let (requirement, proposal) = state.coordinator.accept_proposal(&proposal_id)?;
	Ok(HttpResponse::Ok().json(AcceptProposalResponse {
		requirement,
		proposal,
	}))
}

/// Reject a pending proposal
pub async fn reject_proposal(
	state: web::Data<GatewayState>,
	path: web::Path<String>,
) -> Result<HttpResponse, GatewayError> {
	let proposal_id = path.into_inner();
	let proposal = state.coordinator.reject_proposal(&proposal_id)?;
	Ok(HttpResponse::Ok().json(proposal))
}

/// Register a price alert
pub async fn create_alert(
	state: web::Data<GatewayState>,
	request: web::Json<CreateAlertRequest>,
) -> Result<HttpResponse, GatewayError> {
	let alert = state.evaluator.create_alert(request.into_inner())?;
	Ok(HttpResponse::Ok().json(alert))
}

/// List active alerts, newest first
pub async fn list_active_alerts(
	state: web::Data<GatewayState>,
) -> Result<HttpResponse, GatewayError> {
	let alerts = state.evaluator.list_active_alerts();
	Ok(HttpResponse::Ok().json(alerts))
}

/// Cancel an alert
pub async fn delete_alert(
	state: web::Data<GatewayState>,
	path: web::Path<String>,
) -> Result<HttpResponse, GatewayError> {
	let alert_id = path.into_inner();
	state.evaluator.delete_alert(&alert_id)?;
	Ok(HttpResponse::Ok().json(Ack {
		message: "Alert deleted successfully".to_string(),
	}))
}

/// Ingest a price observation from the price feed
///
/// Invoked once per observation; the evaluator never polls. Returns the
/// alerts this observation triggered. Never fails for alerts it finds -
/// absence from the triggered list means "not yet met".
pub async fn publish_price(
	state: web::Data<GatewayState>,
	observation: web::Json<PriceObservation>,
) -> Result<HttpResponse, GatewayError> {
	let observation = observation.into_inner();
	let triggered = state
		.evaluator
		.evaluate(&observation.commodity, observation.price);
	Ok(HttpResponse::Ok().json(triggered))
}
