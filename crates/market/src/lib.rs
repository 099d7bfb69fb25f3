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

//! Mandi Market Core
//!
//! This crate provides the negotiation and price-alert core of the
//! marketplace: buyers post requirements, farmers submit competing
//! proposals, and exactly one proposal per requirement may ever be
//! accepted; separately, farmers register price alerts that fire exactly
//! once when a price observation crosses their threshold.
//!
//! Architecture:
//! - `Store`: keyed record storage with per-record compare-and-set
//! - `MatchingCoordinator`: requirement/proposal lifecycle and exclusivity
//! - `AlertEvaluator`: alert lifecycle, reactive evaluation per observation
//!
//! The core performs no I/O and no internal retries: a `Conflict` is a
//! terminal business outcome (another caller won the race), not a
//! transient error.

pub mod alerts;
pub mod coordinator;
pub mod error;
pub mod store;

pub use alerts::AlertEvaluator;
pub use coordinator::MatchingCoordinator;
pub use error::MarketError;
pub use store::{MemoryStore, Store, StoreError};
