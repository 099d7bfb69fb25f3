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

use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result};
use tracing::info;

use mandi_market::{AlertEvaluator, MatchingCoordinator, MemoryStore, Store};

use crate::config::GatewayRuntimeConfig;
use crate::routes::configure_routes;

/// Shared gateway state handed to every worker
///
/// The store handle is constructed once at startup and passed by reference
/// to the coordinator and the evaluator; both components share the same
/// backing collections.
#[derive(Clone)]
pub struct GatewayState {
	pub coordinator: Arc<MatchingCoordinator>,
	pub evaluator: Arc<AlertEvaluator>,
}

impl GatewayState {
	pub fn new() -> Self {
		let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
		Self {
			coordinator: Arc::new(MatchingCoordinator::new(store.clone())),
			evaluator: Arc::new(AlertEvaluator::new(store)),
		}
	}
}

impl Default for GatewayState {
	fn default() -> Self {
		Self::new()
	}
}

/// Gateway HTTP server
pub struct GatewayServer {
	state: GatewayState,
}

impl GatewayServer {
	/// Create a new gateway server with a fresh store
	pub fn new() -> Self {
		Self {
			state: GatewayState::new(),
		}
	}

	/// Start the HTTP server and serve until shutdown
	pub async fn serve(&self, config: &GatewayRuntimeConfig) -> Result<()> {
		let state = self.state.clone();
		let max_body_bytes = config.max_body_bytes;

		info!(target: "server", "Workers: {}", config.workers);
		info!(target: "server", "Max body bytes: {}", max_body_bytes);

		HttpServer::new(move || {
			App::new()
				.app_data(web::Data::new(state.clone()))
				.app_data(web::JsonConfig::default().limit(max_body_bytes))
				.configure(configure_routes)
		})
		.workers(config.workers)
		.bind(config.bind_addr)
		.with_context(|| format!("Failed to bind {}", config.bind_addr))?
		.run()
		.await
		.context("HTTP server error")?;

		Ok(())
	}
}

impl Default for GatewayServer {
	fn default() -> Self {
		Self::new()
	}
}
