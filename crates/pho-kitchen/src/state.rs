// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Read-mostly projection of the adapter: lifecycle, ids, fetched record.

use pho_ledger_client::{Address, Digest, ObjectId};

use crate::errors::ActionError;
use crate::recipe::Recipe;

/// Where the current (or last) action is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxPhase {
    /// Nothing running.
    #[default]
    Idle,
    /// Waiting on the signer/broadcast.
    Submitting,
    /// Broadcast accepted; waiting for effects.
    Confirming,
    /// Effects observed.
    Confirmed,
    /// Signer, broadcast or execution failed; see `last_error`.
    Failed,
}

/// Snapshot published to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractState {
    /// Lifecycle of the latest action.
    pub phase: TxPhase,
    /// Digest of the latest broadcast transaction.
    pub digest: Option<Digest>,
    /// Single user-visible error, cleared when the next action starts.
    pub last_error: Option<ActionError>,
    /// Account this state belongs to.
    pub account: Option<Address>,
    /// Current recipe record id.
    pub record_id: Option<ObjectId>,
    /// Reward token id, once earned.
    pub reward_id: Option<ObjectId>,
    /// Parsed record, when fetched and well formed.
    pub record: Option<Recipe>,
    /// The record object was found on the ledger (even if unparsable).
    pub object_exists: bool,
    /// A record fetch is running.
    pub fetching: bool,
    /// Last record fetch failure.
    pub fetch_error: Option<String>,
}

impl ContractState {
    /// An action is in flight.
    pub const fn is_busy(&self) -> bool {
        matches!(self.phase, TxPhase::Submitting | TxPhase::Confirming)
    }

    /// The latest transaction was observed on the ledger.
    pub fn is_confirmed(&self) -> bool {
        self.phase == TxPhase::Confirmed && self.digest.is_some()
    }

    /// Object exists and parsed.
    pub const fn has_valid_data(&self) -> bool {
        self.object_exists && self.record.is_some()
    }

    /// Error to show: the action error wins over a fetch error.
    pub fn error_message(&self) -> Option<String> {
        self.last_error
            .as_ref()
            .map(ToString::to_string)
            .or_else(|| self.fetch_error.clone())
    }
}
