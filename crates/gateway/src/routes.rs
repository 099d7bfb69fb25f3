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

use actix_web::web;

use crate::handlers;

/// Configure API routes for the gateway
///
/// This function sets up all HTTP routes for the gateway service:
/// - `/api/v1/marketplace` - Listings, requirements and proposals
/// - `/api/v1/alerts` - Price alert management
/// - `/api/v1/prices` - Price feed ingestion
/// - `/health` - Health check endpoint
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
	cfg.service(
		web::scope("/api/v1")
			.service(
				web::scope("/marketplace")
					.route("/listings", web::post().to(handlers::create_listing))
					.route("/listings", web::get().to(handlers::list_listings))
					.route(
						"/requirements",
						web::post().to(handlers::create_requirement),
					)
					.route("/requirements", web::get().to(handlers::list_requirements))
					.route("/proposals", web::post().to(handlers::submit_proposal))
					.route(
						"/requirements/{requirement_id}/proposals",
						web::get().to(handlers::proposals_for_requirement),
					)
					.route(
						"/requirements/{requirement_id}/proposals/check",
						web::get().to(handlers::check_proposal),
					)
					.route(
						"/farmers/{farmer_id}/proposals",
						web::get().to(handlers::proposals_for_farmer),
					)
					.route(
						"/proposals/{proposal_id}/accept",
						web::post().to(handlers::accept_proposal),
					)
					.route(
						"/proposals/{proposal_id}/reject",
						web::post().to(handlers::reject_proposal),
					),
			)
			.route("/alerts", web::post().to(handlers::create_alert))
			.route("/alerts", web::get().to(handlers::list_active_alerts))
			.route("/alerts/{alert_id}", web::delete().to(handlers::delete_alert))
			.route("/prices", web::post().to(handlers::publish_price)),
	)
	.route("/health", web::get().to(handlers::health));
}
