// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transaction/state adapter between user actions and the wallet + ledger.
//!
//! Lifecycle per action:
//! `Idle → Submitting → Confirming → Confirmed`, with any signer/broadcast or
//! execution failure landing in `Failed` (error set). A confirmation-wait
//! failure is soft: the phase falls back to `Idle` and no error is set.
//! At most one action (cook, claim or clear) runs at a time per adapter;
//! overlapping calls are rejected with [`ActionOutcome::Busy`].

use std::time::Duration;

use pho_app_core::config::ConfigStore;
use pho_ledger_client::{
    Address, ExecutionStatus, LedgerClient, MoveCall, ObjectId, PackageId, Wallet,
};
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use crate::call::{claim_call, cook_call};
use crate::errors::{explain_claim_failure, ActionError};
use crate::recipe::{parse_record, Recipe};
use crate::session::{SessionCache, SessionSlot};
use crate::state::{ContractState, TxPhase};

/// Why an action did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Wallet has no active account.
    NoAccount,
    /// No package id configured for the network.
    NoPackage,
    /// Claim without a known record.
    NoRecord,
}

/// How an action settled. The same information is mirrored into
/// [`ContractState`]; this is for callers that want to branch on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Precondition missing; state untouched.
    Skipped(SkipReason),
    /// Another action is in flight; state untouched.
    Busy,
    /// Transaction confirmed and created this object.
    Created(ObjectId),
    /// Transaction confirmed without creating anything.
    NothingCreated,
    /// Broadcast, but effects could not be observed.
    Unconfirmed,
    /// Local session forgotten.
    Cleared,
    /// Rejected or aborted; also stored as the last error.
    Failed(ActionError),
}

#[derive(Debug, Clone, Copy)]
enum ActionKind {
    Cook,
    Claim,
}

impl ActionKind {
    fn rejected(self, raw: String) -> ActionError {
        match self {
            Self::Cook => ActionError::Wallet(raw),
            Self::Claim => explain_claim_failure(&raw),
        }
    }

    fn aborted(self, raw: &str) -> ActionError {
        match self {
            Self::Cook => ActionError::Aborted(raw.to_owned()),
            Self::Claim => explain_claim_failure(raw),
        }
    }
}

/// Mediates cook/claim actions and exposes a [`ContractState`] projection.
pub struct ContractAdapter<L, W, S> {
    ledger: L,
    wallet: W,
    cache: SessionCache<S>,
    package: Option<PackageId>,
    account: Option<Address>,
    state: watch::Sender<ContractState>,
    in_flight: Mutex<()>,
}

impl<L, W, S> ContractAdapter<L, W, S>
where
    L: LedgerClient,
    W: Wallet,
    S: ConfigStore,
{
    /// Bind to the wallet's active account and restore its cached ids.
    pub fn new(ledger: L, wallet: W, cache: SessionCache<S>, package: Option<PackageId>) -> Self {
        let account = wallet.active_account();
        let ids = account
            .as_ref()
            .map(|a| cache.load(a))
            .unwrap_or_default();
        if ids.record.is_some() {
            info!(record = ?ids.record, reward = ?ids.reward, "restored session");
        }
        let initial = ContractState {
            account: account.clone(),
            record_id: ids.record,
            reward_id: ids.reward,
            ..ContractState::default()
        };
        let (state, _) = watch::channel(initial);
        Self {
            ledger,
            wallet,
            cache,
            package,
            account,
            state,
            in_flight: Mutex::new(()),
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> ContractState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<ContractState> {
        self.state.subscribe()
    }

    /// Submit eight quantities; on success the created object becomes the
    /// current record and is cached for the account.
    pub async fn submit_recipe(&self, recipe: Recipe) -> ActionOutcome {
        let Some(account) = self.account.clone() else {
            return ActionOutcome::Skipped(SkipReason::NoAccount);
        };
        let Some(package) = self.package.clone() else {
            return ActionOutcome::Skipped(SkipReason::NoPackage);
        };
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("cook ignored: another action is in flight");
            return ActionOutcome::Busy;
        };

        info!(recipe = %recipe.describe(), "cooking");
        let record = match self
            .execute(&cook_call(&package, &recipe), ActionKind::Cook)
            .await
        {
            Ok(id) => id,
            Err(outcome) => return outcome,
        };

        self.cache.remember(SessionSlot::Record, &account, &record);
        self.state
            .send_modify(|s| s.record_id = Some(record.clone()));
        self.refresh_record().await;
        self.state.send_modify(|s| s.phase = TxPhase::Confirmed);
        info!(%record, "recipe record created");
        ActionOutcome::Created(record)
    }

    /// Ask the contract to check the current record and mint a reward.
    pub async fn claim_reward(&self) -> ActionOutcome {
        let Some(record) = self.state.borrow().record_id.clone() else {
            return ActionOutcome::Skipped(SkipReason::NoRecord);
        };
        let Some(package) = self.package.clone() else {
            return ActionOutcome::Skipped(SkipReason::NoPackage);
        };
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("claim ignored: another action is in flight");
            return ActionOutcome::Busy;
        };

        info!(%record, "claiming reward");
        let reward = match self
            .execute(&claim_call(&package, &record), ActionKind::Claim)
            .await
        {
            Ok(id) => id,
            Err(outcome) => return outcome,
        };

        if let Some(account) = &self.account {
            self.cache.remember(SessionSlot::Reward, account, &reward);
        }
        self.state.send_modify(|s| {
            s.reward_id = Some(reward.clone());
            s.phase = TxPhase::Confirmed;
        });
        info!(%reward, "reward created");
        ActionOutcome::Created(reward)
    }

    /// Forget the record, reward and last error locally. The ledger is untouched.
    /// Rejected with `Busy` while a cook or claim is in flight.
    pub fn clear_session(&self) -> ActionOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("clear ignored: another action is in flight");
            return ActionOutcome::Busy;
        };
        self.state.send_modify(|s| {
            s.record_id = None;
            s.reward_id = None;
            s.record = None;
            s.object_exists = false;
            s.last_error = None;
            s.fetch_error = None;
        });
        if let Some(account) = &self.account {
            self.cache.forget(account);
        }
        info!("session cleared");
        ActionOutcome::Cleared
    }

    /// Re-read the current record from the ledger. Returns the parsed record,
    /// `None` when no id is known, the object is gone, or it does not parse.
    pub async fn refresh_record(&self) -> Option<Recipe> {
        let id = self.state.borrow().record_id.clone()?;
        self.state.send_modify(|s| s.fetching = true);
        let fetched = self.ledger.get_object(&id).await;

        let mut parsed = None;
        self.state.send_modify(|s| {
            s.fetching = false;
            // A clear or a newer record may have landed while we were fetching.
            if s.record_id.as_ref() != Some(&id) {
                return;
            }
            match &fetched {
                Ok(Some(data)) => {
                    parsed = parse_record(data);
                    s.record = parsed;
                    s.object_exists = true;
                    s.fetch_error = None;
                }
                Ok(None) => {
                    s.record = None;
                    s.object_exists = false;
                    s.fetch_error = None;
                }
                Err(err) => {
                    s.fetch_error = Some(err.to_string());
                }
            }
        });
        if let Err(err) = &fetched {
            warn!(%id, %err, "record fetch failed");
        }
        parsed
    }

    /// Keep refreshing the record every `interval`. Never returns; drop or
    /// select against it to stop.
    pub async fn poll_record(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            self.refresh_record().await;
        }
    }

    /// Sign, broadcast, confirm. `Ok` carries the first created object; `Err`
    /// is a terminal outcome whose state changes were already published.
    async fn execute(&self, call: &MoveCall, kind: ActionKind) -> Result<ObjectId, ActionOutcome> {
        self.state.send_modify(|s| {
            s.phase = TxPhase::Submitting;
            s.digest = None;
            s.last_error = None;
        });

        let digest = match self.wallet.sign_and_execute(call).await {
            Ok(digest) => digest,
            Err(err) => {
                warn!(call = %call.target(), %err, "transaction rejected");
                return Err(self.fail(kind.rejected(err.to_string())));
            }
        };
        self.state.send_modify(|s| {
            s.phase = TxPhase::Confirming;
            s.digest = Some(digest.clone());
        });

        let effects = match self.ledger.wait_for_transaction(&digest).await {
            Ok(effects) => effects,
            Err(err) => {
                warn!(%digest, %err, "error waiting for transaction");
                self.state.send_modify(|s| s.phase = TxPhase::Idle);
                return Err(ActionOutcome::Unconfirmed);
            }
        };

        if let ExecutionStatus::Failure { error } = &effects.status {
            warn!(%digest, %error, "transaction aborted");
            return Err(self.fail(kind.aborted(error)));
        }

        if let Some(id) = effects.first_created() {
            return Ok(id.clone());
        }
        warn!(%digest, "no object created by transaction");
        self.state.send_modify(|s| s.phase = TxPhase::Confirmed);
        Err(ActionOutcome::NothingCreated)
    }

    fn fail(&self, err: ActionError) -> ActionOutcome {
        self.state.send_modify(|s| {
            s.phase = TxPhase::Failed;
            s.last_error = Some(err.clone());
        });
        ActionOutcome::Failed(err)
    }
}
