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
	AlertDirection, AlertStatus, CreateAlertRequest, PriceAlert, TriggeredAlert,
};

/// Price-alert evaluator
///
/// The evaluator owns the alert lifecycle and is purely reactive: it never
/// polls, the price feed invokes `evaluate` once per observation. The
/// exactly-once trigger guarantee rests on a per-alert compare-and-set
/// keyed on the Active status; of any number of concurrent evaluations (or
/// a racing deletion), exactly one transition out of Active commits.
pub struct AlertEvaluator {
	store: Arc<dyn Store>,
}

impl AlertEvaluator {
	pub fn new(store: Arc<dyn Store>) -> Self {
		Self { store }
	}

	/// Register an alert, created Active
	///
	/// A missing farmer_id gets an anonymous timestamp-derived identifier.
	pub fn create_alert(&self, request: CreateAlertRequest) -> Result<PriceAlert, MarketError> {
		if request.commodity.trim().is_empty() {
			return Err(MarketError::Validation(
				"Commodity must not be empty".to_string(),
			));
		}
		if request.target_price <= 0.0 {
			return Err(MarketError::Validation(
				"Target price must be positive".to_string(),
			));
		}

		let farmer_id = request
			.farmer_id
			.filter(|id| !id.trim().is_empty())
			.unwrap_or_else(|| format!("F{}", Utc::now().format("%Y%m%d%H%M%S")));

		let alert = PriceAlert {
			id: Uuid::new_v4().to_string(),
			farmer_id,
			commodity: request.commodity,
			target_price: request.target_price,
			direction: request.direction,
			status: AlertStatus::Active,
			created_at: Utc::now(),
			triggered_at: None,
		};
		self.store.put_alert(alert.clone());

		info!(
			target: "alerts",
			"Alert {} created for farmer {} on {}",
			alert.id, alert.farmer_id, alert.commodity
		);
		Ok(alert)
	}

	/// Cancel an alert
	///
	/// Deletion is a cancellation request, not a state assertion: cancelling
	/// an alert that already Triggered (or was already Deleted) is a no-op
	/// success. Only an unknown id is an error.
	pub fn delete_alert(&self, alert_id: &str) -> Result<(), MarketError> {
		let alert = self
			.store
			.get_alert(alert_id)
			.ok_or_else(|| MarketError::NotFound(format!("Alert {} does not exist", alert_id)))?;
		if alert.status != AlertStatus::Active {
			return Ok(());
		}

		match self.store.cas_alert(alert_id, AlertStatus::Active, &|a| {
			a.status = AlertStatus::Deleted;
		}) {
			Ok(_) => {
				info!(target: "alerts", "Alert {} deleted", alert_id);
				Ok(())
			}
			// A concurrent evaluation triggered the alert first; both are
			// valid terminal states and the cancellation simply lost.
			Err(StoreError::VersionConflict) => Ok(()),
			Err(StoreError::NotFound) => Err(MarketError::NotFound(format!(
				"Alert {} does not exist",
				alert_id
			))),
		}
	}

	/// All Active alerts, newest first
	pub fn list_active_alerts(&self) -> Vec<PriceAlert> {
		self.store.active_alerts()
	}

	/// Evaluate one price observation against all active alerts for a commodity
	///
	/// Every Active alert whose threshold predicate holds transitions
	/// `Active -> Triggered` with `triggered_at` set to the evaluation time
	/// and is included in the returned sequence. Alerts whose predicate does
	/// not hold are left untouched; a previously Triggered or Deleted alert
	/// is never re-selected. Safe to call concurrently and repeatedly with
	/// the same or later observations: a losing concurrent evaluator simply
	/// omits the alert from its result.
	pub fn evaluate(&self, commodity: &str, current_price: f64) -> Vec<TriggeredAlert> {
		let mut triggered = Vec::new();

		for alert in self.store.active_alerts_for_commodity(commodity) {
			if !threshold_met(alert.direction, alert.target_price, current_price) {
				continue;
			}

			let now = Utc::now();
			match self.store.cas_alert(&alert.id, AlertStatus::Active, &|a| {
				a.status = AlertStatus::Triggered;
				a.triggered_at = Some(now);
			}) {
				Ok(fired) => {
					info!(
						target: "alerts",
						"Alert triggered for farmer {} - {} price {:?} target {}, current {}",
						fired.farmer_id, fired.commodity, fired.direction,
						fired.target_price, current_price
					);
					triggered.push(TriggeredAlert {
						id: fired.id,
						farmer_id: fired.farmer_id,
						commodity: fired.commodity,
						current_price,
						target_price: fired.target_price,
						direction: fired.direction,
					});
				}
				// Lost the race to a concurrent evaluation or deletion
				Err(_) => {}
			}
		}

		triggered
	}
}

/// Inclusive threshold predicate
///
/// `Below` fires when the price is at or under the target, `Above` when at
/// or over it. The boundary is deliberately inclusive on both directions.
fn threshold_met(direction: AlertDirection, target_price: f64, current_price: f64) -> bool {
	match direction {
		AlertDirection::Below => current_price <= target_price,
		AlertDirection::Above => current_price >= target_price,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::store::MemoryStore;

	fn evaluator() -> AlertEvaluator {
		AlertEvaluator::new(Arc::new(MemoryStore::new()))
	}

	fn alert_request(commodity: &str, target_price: f64, direction: AlertDirection) -> CreateAlertRequest {
		CreateAlertRequest {
			farmer_id: Some("farmer_1".to_string()),
			commodity: commodity.to_string(),
			target_price,
			direction,
		}
	}

	#[test]
	fn test_threshold_is_boundary_inclusive() {
		assert!(threshold_met(AlertDirection::Below, 100.0, 100.0));
		assert!(threshold_met(AlertDirection::Below, 100.0, 99.5));
		assert!(!threshold_met(AlertDirection::Below, 100.0, 101.0));

		assert!(threshold_met(AlertDirection::Above, 100.0, 100.0));
		assert!(threshold_met(AlertDirection::Above, 100.0, 101.0));
		assert!(!threshold_met(AlertDirection::Above, 100.0, 99.0));
	}

	#[test]
	fn test_create_alert_synthesizes_anonymous_farmer_id() {
		let evaluator = evaluator();
		let alert = evaluator
			.create_alert(CreateAlertRequest {
				farmer_id: None,
				commodity: "Tomato".to_string(),
				target_price: 50.0,
				direction: AlertDirection::Below,
			})
			.unwrap();

		assert!(alert.farmer_id.starts_with('F'));
		assert_eq!(alert.farmer_id.len(), 15);
		assert_eq!(alert.status, AlertStatus::Active);
	}

	#[test]
	fn test_create_alert_validates_input() {
		let evaluator = evaluator();
		assert!(matches!(
			evaluator.create_alert(alert_request("", 50.0, AlertDirection::Below)),
			Err(MarketError::Validation(_))
		));
		assert!(matches!(
			evaluator.create_alert(alert_request("Tomato", 0.0, AlertDirection::Above)),
			Err(MarketError::Validation(_))
		));
	}

	#[test]
	fn test_evaluate_triggers_once() {
		let evaluator = evaluator();
		let alert = evaluator
			.create_alert(alert_request("Tomato", 50.0, AlertDirection::Below))
			.unwrap();

		let first = evaluator.evaluate("Tomato", 45.0);
		assert_eq!(first.len(), 1);
		assert_eq!(first[0].id, alert.id);
		assert_eq!(first[0].current_price, 45.0);

		// A repeated qualifying observation finds nothing left to trigger
		let second = evaluator.evaluate("Tomato", 45.0);
		assert!(second.is_empty());
		assert!(evaluator.list_active_alerts().is_empty());
	}

	#[test]
	fn test_evaluate_ignores_other_commodities_and_unmet_thresholds() {
		let evaluator = evaluator();
		evaluator
			.create_alert(alert_request("Tomato", 100.0, AlertDirection::Below))
			.unwrap();
		evaluator
			.create_alert(alert_request("Onion", 10.0, AlertDirection::Below))
			.unwrap();

		assert!(evaluator.evaluate("Tomato", 101.0).is_empty());
		assert!(evaluator.evaluate("Onion", 11.0).is_empty());
		assert_eq!(evaluator.evaluate("Tomato", 100.0).len(), 1);
	}

	#[test]
	fn test_deleted_alert_is_never_evaluated() {
		let evaluator = evaluator();
		let alert = evaluator
			.create_alert(alert_request("Tomato", 50.0, AlertDirection::Below))
			.unwrap();

		evaluator.delete_alert(&alert.id).unwrap();
		assert!(evaluator.evaluate("Tomato", 10.0).is_empty());

		// Still Deleted, not Triggered, and delete stays idempotent
		evaluator.delete_alert(&alert.id).unwrap();
		assert!(evaluator.list_active_alerts().is_empty());
	}

	#[test]
	fn test_delete_after_trigger_is_noop_success() {
		let evaluator = evaluator();
		let alert = evaluator
			.create_alert(alert_request("Tomato", 50.0, AlertDirection::Below))
			.unwrap();

		assert_eq!(evaluator.evaluate("Tomato", 45.0).len(), 1);
		// Cancellation of a fired alert is accepted and changes nothing
		evaluator.delete_alert(&alert.id).unwrap();

		assert!(matches!(
			evaluator.delete_alert("missing"),
			Err(MarketError::NotFound(_))
		));
	}

	#[test]
	fn test_triggered_at_is_set_on_transition() {
		let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
		let evaluator = AlertEvaluator::new(store.clone());
		let alert = evaluator
			.create_alert(alert_request("Wheat", 30.0, AlertDirection::Above))
			.unwrap();
		assert!(alert.triggered_at.is_none());

		evaluator.evaluate("Wheat", 31.0);

		let fired = store.get_alert(&alert.id).unwrap();
		assert_eq!(fired.status, AlertStatus::Triggered);
		assert!(fired.triggered_at.is_some());
	}
}
