// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Contract entry points consumed by the client.

use pho_ledger_client::{CallArg, MoveCall, ObjectId, PackageId};

use crate::recipe::Recipe;

/// Module holding both entry points.
pub const CONTRACT_MODULE: &str = "pho";
/// Mints a recipe record from eight `u16` quantities.
pub const COOK_FUNCTION: &str = "cook_pho";
/// Mints a flag if the referenced record matches the perfect recipe.
pub const CLAIM_FUNCTION: &str = "get_perfect_pho_flag";

/// `pho::cook_pho(broth_quality, …, cinnamon)`.
pub fn cook_call(package: &PackageId, recipe: &Recipe) -> MoveCall {
    MoveCall {
        package: package.clone(),
        module: CONTRACT_MODULE.to_owned(),
        function: COOK_FUNCTION.to_owned(),
        arguments: recipe.to_array().into_iter().map(CallArg::U16).collect(),
    }
}

/// `pho::get_perfect_pho_flag(&record)`.
pub fn claim_call(package: &PackageId, record: &ObjectId) -> MoveCall {
    MoveCall {
        package: package.clone(),
        module: CONTRACT_MODULE.to_owned(),
        function: CLAIM_FUNCTION.to_owned(),
        arguments: vec![CallArg::Object(record.clone())],
    }
}
