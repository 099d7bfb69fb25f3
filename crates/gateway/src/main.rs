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

//! Marketplace Gateway Service
//!
//! This service exposes the marketplace negotiation and price-alert core
//! over HTTP: buyers post requirements, farmers submit competing proposals
//! and register price alerts, and the price feed publishes observations.
//!
//! The gateway embeds the market core in-process: a single store handle is
//! constructed at startup and shared by the matching coordinator and the
//! alert evaluator. Account handling, authentication and the adjacent
//! portal features (translation, weather, classifiers) are external
//! collaborators and are not part of this service.

mod config;
mod handlers;
mod logging;
mod routes;
mod server;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::GatewayRuntimeConfig;
use crate::logging::init_logging;
use crate::server::GatewayServer;

#[actix_rt::main]
async fn main() -> Result<()> {
	// Initialize logging first
	init_logging()?;

	let config = GatewayRuntimeConfig::from_env().context("Failed to load configuration")?;

	info!(target: "server", "Starting Mandi Gateway on {}", config.bind_addr);

	let server = GatewayServer::new();
	info!(target: "server", "Gateway server initialized");

	server
		.serve(&config)
		.await
		.context("Failed to start gateway server")?;

	Ok(())
}
