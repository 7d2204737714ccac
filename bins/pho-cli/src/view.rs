// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Plain-text rendering of the adapter state and action outcomes.

use std::fmt::Write as _;

use pho_kitchen::{ActionOutcome, ContractState, Ingredient, SkipReason, TxPhase};

use crate::form::FormState;

pub fn render(state: &ContractState) -> String {
    let mut out = String::new();

    match &state.account {
        Some(account) => push_line(&mut out, format_args!("Account:     {account}")),
        None => out.push_str("Account:     (no wallet account)\n"),
    }

    match &state.reward_id {
        Some(reward) => push_line(&mut out, format_args!("Flag:        earned ({reward})")),
        None => out.push_str("Flag:        not earned yet\n"),
    }

    match &state.record_id {
        None => out.push_str("Pho:         none cooked yet\n"),
        Some(id) => {
            push_line(&mut out, format_args!("Pho:         {id}"));
            render_record(&mut out, state);
        }
    }

    if state.phase != TxPhase::Idle || state.digest.is_some() {
        push_line(&mut out, format_args!("Transaction: {}", phase_label(state.phase)));
        if let Some(digest) = &state.digest {
            let confirmed = if state.is_confirmed() { "yes" } else { "no" };
            push_line(&mut out, format_args!("  digest:    {digest}"));
            push_line(&mut out, format_args!("  confirmed: {confirmed}"));
        }
    }

    if let Some(err) = state.error_message() {
        push_line(&mut out, format_args!("Error:       {err}"));
    }
    out
}

fn render_record(out: &mut String, state: &ContractState) {
    if state.fetching {
        out.push_str("  (loading…)\n");
        return;
    }
    let Some(recipe) = state.record else {
        if state.object_exists {
            out.push_str("  (record data unavailable)\n");
        } else if state.fetch_error.is_none() {
            out.push_str("  (not found on ledger)\n");
        }
        return;
    };
    for ingredient in Ingredient::ALL {
        push_line(
            out,
            format_args!("  {:<17} {}", ingredient.label(), recipe.get(ingredient)),
        );
    }
    if recipe.is_perfect() {
        out.push_str("  This is the authentic recipe. Claim your flag!\n");
    }
}

const fn phase_label(phase: TxPhase) -> &'static str {
    match phase {
        TxPhase::Idle => "idle",
        TxPhase::Submitting => "waiting for wallet…",
        TxPhase::Confirming => "confirming…",
        TxPhase::Confirmed => "confirmed",
        TxPhase::Failed => "failed",
    }
}

/// One-line summary of how an action settled, if there is anything to say
/// beyond what [`render`] shows.
pub fn outcome_line(outcome: &ActionOutcome) -> Option<String> {
    let line = match outcome {
        ActionOutcome::Skipped(SkipReason::NoAccount) => {
            "No wallet account: pass --account or select an active address in the iota CLI."
                .to_owned()
        }
        ActionOutcome::Skipped(SkipReason::NoPackage) => {
            "The contract is not deployed on this network: pass --package-id.".to_owned()
        }
        ActionOutcome::Skipped(SkipReason::NoRecord) => {
            "No pho on record yet: cook one first.".to_owned()
        }
        ActionOutcome::Busy => "Another transaction is still in flight.".to_owned(),
        ActionOutcome::Created(id) => format!("Created {id}"),
        ActionOutcome::NothingCreated => "Confirmed, but nothing was created.".to_owned(),
        ActionOutcome::Cleared => "Session cleared.".to_owned(),
        ActionOutcome::Unconfirmed => {
            "Submitted; confirmation was not observed. Run `status` to check again.".to_owned()
        }
        ActionOutcome::Failed(_) => return None,
    };
    Some(line)
}

pub fn render_form_errors(form: &FormState) -> String {
    let mut out = String::from("Invalid recipe:\n");
    for (ingredient, message) in form.invalid_fields() {
        push_line(&mut out, format_args!("  {}: {message}", ingredient.label()));
    }
    out
}

fn push_line(out: &mut String, args: std::fmt::Arguments<'_>) {
    let _ = out.write_fmt(args);
    out.push('\n');
}
