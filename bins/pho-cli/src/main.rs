// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pho restaurant CLI
//!
//! Cook a recipe on the ledger, claim the perfect-pho flag and inspect the
//! per-account session.

// The CLI is expected to print to stdout/stderr.
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod effects;
mod form;
mod view;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use pho_app_core::config::{ConfigService, ConfigStore, MemoryConfigStore};
use pho_app_core::network::{Network, NetworkConfig};
use pho_config_fs::FsConfigStore;
use pho_kitchen::{ActionOutcome, ContractAdapter, Ingredient, SessionCache};
use pho_ledger_client::wallet::DEFAULT_GAS_BUDGET;
use pho_ledger_client::{Address, CliWallet, PackageId, RpcClient, RpcConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::effects::run_effects;
use crate::form::{reduce, FormEvent, FormState};

#[derive(Parser, Debug)]
#[command(author, version, about = "Cook pho, earn the flag")]
struct Args {
    /// Network to use (devnet, testnet, mainnet); defaults to the saved one
    #[arg(long, global = true, env = "PHO_NETWORK")]
    network: Option<Network>,
    /// Fullnode JSON-RPC URL override
    #[arg(long, global = true, env = "PHO_RPC_URL")]
    rpc_url: Option<String>,
    /// Contract package id override
    #[arg(long, global = true, env = "PHO_PACKAGE_ID")]
    package_id: Option<String>,
    /// Account to act as; defaults to the wallet's active address
    #[arg(long, global = true, env = "PHO_ACCOUNT")]
    account: Option<String>,
    /// Wallet program used to sign and broadcast
    #[arg(long, global = true, env = "PHO_WALLET", default_value = "iota")]
    wallet: PathBuf,
    /// Gas budget passed to the wallet for every transaction
    #[arg(long, global = true, env = "PHO_GAS_BUDGET", default_value_t = DEFAULT_GAS_BUDGET)]
    gas_budget: u64,
    /// Keep config and session in memory only (nothing read or written on disk)
    #[arg(long, global = true)]
    ephemeral: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a recipe; unspecified quantities keep the form defaults
    Cook {
        /// Up to eight quantities in order: broth, noodle, beef, basil,
        /// cilantro, mint, star_anise, cinnamon
        #[arg(num_args = 0..=8)]
        values: Vec<String>,
        #[command(flatten)]
        named: Quantities,
    },
    /// Ask the contract for the flag using the current pho
    Claim,
    /// Show the session and the current pho as stored on the ledger
    Status {
        /// Keep refreshing until interrupted
        #[arg(long)]
        follow: bool,
        /// Refresh interval for --follow, in milliseconds
        #[arg(long, default_value_t = 2_000)]
        interval_ms: u64,
    },
    /// Forget the local record/flag ids for the account (the ledger is untouched)
    Clear,
}

/// Per-ingredient overrides for `cook`; applied after the positional values.
#[derive(ClapArgs, Debug)]
struct Quantities {
    /// Broth quality
    #[arg(long = "broth-quality", visible_alias = "broth", alias = "broth_quality", value_name = "N")]
    broth_quality: Option<String>,
    /// Noodle thickness
    #[arg(long = "noodle-thickness", visible_alias = "noodle", alias = "noodle_thickness", value_name = "N")]
    noodle_thickness: Option<String>,
    /// Beef brisket
    #[arg(long = "beef-brisket", visible_alias = "beef", alias = "beef_brisket", value_name = "N")]
    beef_brisket: Option<String>,
    /// Basil
    #[arg(long, value_name = "N")]
    basil: Option<String>,
    /// Cilantro
    #[arg(long, value_name = "N")]
    cilantro: Option<String>,
    /// Mint
    #[arg(long, value_name = "N")]
    mint: Option<String>,
    /// Star anise
    #[arg(long = "star-anise", alias = "star_anise", value_name = "N")]
    star_anise: Option<String>,
    /// Cinnamon
    #[arg(long, value_name = "N")]
    cinnamon: Option<String>,
}

impl Quantities {
    fn into_fields(self) -> impl Iterator<Item = (Ingredient, String)> {
        [
            (Ingredient::BrothQuality, self.broth_quality),
            (Ingredient::NoodleThickness, self.noodle_thickness),
            (Ingredient::BeefBrisket, self.beef_brisket),
            (Ingredient::Basil, self.basil),
            (Ingredient::Cilantro, self.cilantro),
            (Ingredient::Mint, self.mint),
            (Ingredient::StarAnise, self.star_anise),
            (Ingredient::Cinnamon, self.cinnamon),
        ]
        .into_iter()
        .filter_map(|(ingredient, text)| text.map(|t| (ingredient, t)))
    }
}

/// Form events for a `cook` invocation: positional values first, then named
/// overrides.
fn cook_fields(values: Vec<String>, named: Quantities) -> Vec<FormEvent> {
    Ingredient::ALL
        .into_iter()
        .zip(values)
        .chain(named.into_fields())
        .map(|(ingredient, text)| FormEvent::FieldChanged(ingredient, text))
        .collect()
}

/// Saved network settings; unreadable settings are reported and the built-in
/// defaults used for this run without touching what is stored.
fn load_network<S: ConfigStore>(config: &ConfigService<S>) -> NetworkConfig {
    match NetworkConfig::load_or_init(config) {
        Ok(cfg) => cfg,
        Err(err) => {
            warn!(%err, "network config unreadable; using built-in defaults");
            NetworkConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    if args.ephemeral {
        run(args, Arc::new(MemoryConfigStore::new())).await
    } else {
        let store = FsConfigStore::new().context("open config directory")?;
        info!(dir = %store.base().display(), "using config store");
        run(args, Arc::new(store)).await
    }
}

async fn run<S: ConfigStore>(args: Args, store: Arc<S>) -> Result<()> {
    let config = load_network(&ConfigService::new(Arc::clone(&store)));
    let network = args.network.unwrap_or(config.active);
    let rpc_url = args
        .rpc_url
        .clone()
        .unwrap_or_else(|| config.entry(network).rpc_url.clone());
    let package = match args.package_id.as_deref().or_else(|| config.package_id(network)) {
        Some(raw) => Some(PackageId::parse(raw).with_context(|| format!("package id `{raw}`"))?),
        None => None,
    };
    info!(%network, %rpc_url, package = ?package, "network selected");

    let mut rpc = RpcConfig::new(rpc_url);
    rpc.poll_interval = Duration::from_millis(config.confirm.poll_interval_ms);
    rpc.confirm_timeout = config.confirm.timeout_ms.map(Duration::from_millis);
    let ledger = RpcClient::new(rpc).context("build rpc client")?;

    let wallet = match args.account.as_deref() {
        Some(raw) => {
            let account = Address::parse(raw).with_context(|| format!("account `{raw}`"))?;
            CliWallet::new(&args.wallet, Some(account))
        }
        None => match CliWallet::connect(&args.wallet).await {
            Ok(wallet) => wallet,
            Err(err) => {
                warn!(%err, "no active wallet account");
                CliWallet::new(&args.wallet, None)
            }
        },
    }
    .with_gas_budget(args.gas_budget);

    let adapter = ContractAdapter::new(ledger, wallet, SessionCache::new(store), package);
    let mut form = FormState::default();
    form = reduce(&form, FormEvent::BusyChanged(adapter.state().is_busy())).0;

    let event = match args.cmd {
        Command::Cook { values, named } => {
            for field in cook_fields(values, named) {
                form = reduce(&form, field).0;
            }
            FormEvent::Submit
        }
        Command::Claim => FormEvent::Claim,
        Command::Clear => FormEvent::Clear,
        Command::Status {
            follow,
            interval_ms,
        } => {
            adapter.refresh_record().await;
            print!("{}", view::render(&adapter.state()));
            if follow {
                follow_record(&adapter, Duration::from_millis(interval_ms.max(1))).await?;
            }
            return Ok(());
        }
    };

    let (form, effects) = reduce(&form, event);
    if !form.is_valid() {
        bail!("{}", view::render_form_errors(&form).trim_end());
    }
    let outcomes = run_effects(&adapter, effects).await;
    for outcome in &outcomes {
        if let Some(line) = view::outcome_line(outcome) {
            println!("{line}");
        }
    }
    print!("{}", view::render(&adapter.state()));

    if outcomes
        .iter()
        .any(|o| matches!(o, ActionOutcome::Failed(_)))
    {
        bail!("transaction failed");
    }
    Ok(())
}

async fn follow_record<L, W, S>(
    adapter: &ContractAdapter<L, W, S>,
    interval: Duration,
) -> Result<()>
where
    L: pho_ledger_client::LedgerClient,
    W: pho_ledger_client::Wallet,
    S: ConfigStore,
{
    let mut rx = adapter.subscribe();
    let mut shown = adapter.state();
    let printer = async {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if !state.fetching && state != shown {
                print!("\n{}", view::render(&state));
                shown = state;
            }
        }
    };
    tokio::select! {
        () = adapter.poll_record(interval) => {}
        () = printer => {}
        res = tokio::signal::ctrl_c() => res.context("listen for ctrl-c")?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::form::FormEffect;
    use pho_app_core::network::NETWORK_CONFIG_KEY;
    use pho_kitchen::Recipe;

    fn cook_form(argv: &[&str]) -> FormState {
        let args = Args::try_parse_from(argv).unwrap();
        let Command::Cook { values, named } = args.cmd else {
            unreachable!("not a cook command");
        };
        cook_fields(values, named)
            .into_iter()
            .fold(FormState::default(), |form, event| reduce(&form, event).0)
    }

    #[test]
    fn named_quantities_override_positional_values() {
        let form = cook_form(&["pho", "cook", "11", "3", "1", "--beef", "70", "--star-anise", "4"]);
        assert_eq!(form.inputs[Ingredient::BrothQuality.index()], "11");
        assert_eq!(form.inputs[Ingredient::NoodleThickness.index()], "3");
        assert_eq!(form.inputs[Ingredient::BeefBrisket.index()], "70");
        assert_eq!(form.inputs[Ingredient::StarAnise.index()], "4");
        assert_eq!(form.inputs[Ingredient::Basil.index()], "30");
    }

    #[test]
    fn field_names_are_accepted_as_flags() {
        let form = cook_form(&[
            "pho",
            "cook",
            "--broth_quality=1",
            "--noodle-thickness=2",
            "--beef-brisket=3",
            "--basil=4",
            "--cilantro=5",
            "--mint=6",
            "--star_anise=7",
            "--cinnamon=8",
        ]);
        let (_, effects) = reduce(&form, FormEvent::Submit);
        assert_eq!(
            effects,
            vec![FormEffect::Cook(Recipe::from_array([1, 2, 3, 4, 5, 6, 7, 8]))]
        );
    }

    #[test]
    fn unknown_ingredient_flag_is_rejected() {
        assert!(Args::try_parse_from(["pho", "cook", "--salt", "3"]).is_err());
    }

    #[test]
    fn gas_budget_defaults_and_overrides() {
        let args = Args::try_parse_from(["pho", "claim"]).unwrap();
        assert_eq!(args.gas_budget, DEFAULT_GAS_BUDGET);
        let args = Args::try_parse_from(["pho", "claim", "--gas-budget", "42"]).unwrap();
        assert_eq!(args.gas_budget, 42);
    }

    #[test]
    fn unreadable_network_config_falls_back_without_overwriting() {
        let store = MemoryConfigStore::new();
        store.save_raw(NETWORK_CONFIG_KEY, b"not json").unwrap();
        let svc = ConfigService::new(store);
        assert_eq!(load_network(&svc), NetworkConfig::default());
        assert_eq!(svc.store().load_raw(NETWORK_CONFIG_KEY).unwrap(), b"not json");
    }
}
