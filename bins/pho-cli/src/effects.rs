// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Effect runner for FormEffect -> adapter calls; includes a simple fake for tests.

use std::future::Future;

use pho_app_core::config::ConfigStore;
use pho_kitchen::{ActionOutcome, ContractAdapter, Recipe};
use pho_ledger_client::{LedgerClient, Wallet};

use crate::form::FormEffect;

/// The actions the form can trigger.
pub trait Kitchen: Sync {
    fn cook(&self, recipe: Recipe) -> impl Future<Output = ActionOutcome> + Send;
    fn claim(&self) -> impl Future<Output = ActionOutcome> + Send;
    fn clear(&self) -> ActionOutcome;
}

impl<L, W, S> Kitchen for ContractAdapter<L, W, S>
where
    L: LedgerClient,
    W: Wallet,
    S: ConfigStore,
{
    fn cook(&self, recipe: Recipe) -> impl Future<Output = ActionOutcome> + Send {
        self.submit_recipe(recipe)
    }

    fn claim(&self) -> impl Future<Output = ActionOutcome> + Send {
        self.claim_reward()
    }

    fn clear(&self) -> ActionOutcome {
        self.clear_session()
    }
}

/// Run effects in order, reporting how each one settled.
pub async fn run_effects<K: Kitchen>(kitchen: &K, effects: Vec<FormEffect>) -> Vec<ActionOutcome> {
    let mut outcomes = Vec::new();
    for eff in effects {
        match eff {
            FormEffect::Cook(recipe) => outcomes.push(kitchen.cook(recipe).await),
            FormEffect::Claim => outcomes.push(kitchen.claim().await),
            FormEffect::ClearSession => outcomes.push(kitchen.clear()),
        }
    }
    outcomes
}
