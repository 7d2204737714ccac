// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Kitchen side of the pho restaurant: recipes, contract calls, claim-error
//! translation, the per-account session cache and the [`ContractAdapter`]
//! that drives cook/claim transactions through a wallet and a ledger client.

pub mod adapter;
pub mod call;
pub mod errors;
pub mod recipe;
pub mod session;
pub mod state;

pub use adapter::{ActionOutcome, ContractAdapter, SkipReason};
pub use errors::{explain_claim_failure, ActionError};
pub use recipe::{parse_record, Ingredient, Recipe, PERFECT_RECIPE};
pub use session::{SessionCache, SessionIds, SessionKey, SessionSlot};
pub use state::{ContractState, TxPhase};
