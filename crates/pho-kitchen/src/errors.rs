// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! User-facing action errors and translation of contract aborts.

use thiserror::Error;

use crate::recipe::PERFECT_RECIPE;

/// Marker the node includes in every Move abort.
const MOVE_ABORT: &str = "MoveAbort";
/// Abort constant raised when the record is not the perfect recipe.
const NOT_PERFECT_ABORT: &str = "EPerfectPho";

/// The single "last error" an action can leave behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Claim aborted because the record does not match the reference recipe.
    #[error(
        "Recipe is not perfect! Your pho doesn't match the authentic Northern Pho recipe. \
         The perfect recipe is: {}",
        PERFECT_RECIPE.describe()
    )]
    RecipeNotPerfect,
    /// Claim aborted for a reason the client does not recognise.
    #[error("Transaction failed! Your ingredients don't match the perfect pho recipe.")]
    IngredientsMismatch,
    /// Signer or broadcast rejection, native message.
    #[error("{0}")]
    Wallet(String),
    /// A cook transaction executed but aborted.
    #[error("transaction aborted: {0}")]
    Aborted(String),
}

/// Rewrite a failed claim into something the user can act on.
pub fn explain_claim_failure(raw: &str) -> ActionError {
    if raw.contains(MOVE_ABORT) && raw.contains(NOT_PERFECT_ABORT) {
        ActionError::RecipeNotPerfect
    } else if raw.contains(MOVE_ABORT) {
        ActionError::IngredientsMismatch
    } else {
        ActionError::Wallet(raw.to_owned())
    }
}
