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

use thiserror::Error;

/// Error types for marketplace operations
///
/// All failures are reported synchronously to the caller. The three kinds
/// are distinguishable so callers can render appropriate messaging:
/// - `Validation`: malformed input (non-positive quantity/price, empty text)
/// - `NotFound`: the referenced requirement/proposal/alert does not exist
/// - `Conflict`: an invariant-violating transition (requirement already
///   satisfied, proposal already terminal, lost a concurrent race)
#[derive(Debug, Error)]
pub enum MarketError {
	#[error("Validation error: {0}")]
	Validation(String),
	#[error("Not found: {0}")]
	NotFound(String),
	#[error("Conflict: {0}")]
	Conflict(String),
}
