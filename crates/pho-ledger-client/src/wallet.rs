// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Wallet port (active account + sign-and-broadcast) and an adapter over the
//! `iota` command-line wallet.

use std::future::Future;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::types::{Address, Digest, MoveCall};

/// Failures signing or broadcasting a transaction.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The signer or the node refused the transaction; text is passed through verbatim.
    #[error("{0}")]
    Rejected(String),
    /// The wallet program could not be started.
    #[error("failed to run wallet `{program}`: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The wallet ran but its output could not be understood.
    #[error("unexpected wallet output: {0}")]
    Output(String),
}

/// Signer + broadcaster for contract calls.
pub trait Wallet: Send + Sync {
    /// Currently selected account, if any.
    fn active_account(&self) -> Option<Address>;

    /// Sign `call` with the active account, broadcast it and report the digest.
    fn sign_and_execute(
        &self,
        call: &MoveCall,
    ) -> impl Future<Output = Result<Digest, WalletError>> + Send;
}

/// Default gas budget for CLI calls, in NANOS.
pub const DEFAULT_GAS_BUDGET: u64 = 10_000_000;

/// Wallet backed by the local `iota` CLI keystore.
#[derive(Debug, Clone)]
pub struct CliWallet {
    program: PathBuf,
    account: Option<Address>,
    gas_budget: u64,
}

impl CliWallet {
    /// Use `program` with an explicitly chosen account (or none).
    pub fn new(program: impl Into<PathBuf>, account: Option<Address>) -> Self {
        Self {
            program: program.into(),
            account,
            gas_budget: DEFAULT_GAS_BUDGET,
        }
    }

    /// Ask the CLI for its active address. A missing or unparsable answer
    /// leaves the wallet without an account.
    pub async fn connect(program: impl Into<PathBuf>) -> Result<Self, WalletError> {
        let mut wallet = Self::new(program, None);
        let out = wallet.run(&["client", "active-address"]).await?;
        wallet.account = Address::parse(out.trim()).ok();
        info!(account = ?wallet.account, "wallet connected");
        Ok(wallet)
    }

    /// Override the gas budget passed to `iota client call`.
    pub const fn with_gas_budget(mut self, gas_budget: u64) -> Self {
        self.gas_budget = gas_budget;
        self
    }

    /// Command-line arguments for executing `call`.
    pub fn call_args(&self, call: &MoveCall) -> Vec<String> {
        let mut args = vec![
            "client".to_owned(),
            "call".to_owned(),
            "--package".to_owned(),
            call.package.to_string(),
            "--module".to_owned(),
            call.module.clone(),
            "--function".to_owned(),
            call.function.clone(),
        ];
        if !call.arguments.is_empty() {
            args.push("--args".to_owned());
            args.extend(call.arguments.iter().map(ToString::to_string));
        }
        args.push("--gas-budget".to_owned());
        args.push(self.gas_budget.to_string());
        args.push("--json".to_owned());
        args
    }

    async fn run(&self, args: &[&str]) -> Result<String, WalletError> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|source| WalletError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_owned();
            return Err(WalletError::Rejected(if stderr.is_empty() {
                stdout
            } else {
                stderr
            }));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Wallet for CliWallet {
    fn active_account(&self) -> Option<Address> {
        self.account.clone()
    }

    async fn sign_and_execute(&self, call: &MoveCall) -> Result<Digest, WalletError> {
        debug!(call_target = %call.target(), "executing call through iota cli");
        let args = self.call_args(call);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let stdout = self.run(&args).await?;
        parse_call_output(&stdout)
    }
}

/// Read the transaction digest from `iota client call --json` output. Any
/// banner lines ahead of the JSON document are skipped.
pub fn parse_call_output(stdout: &str) -> Result<Digest, WalletError> {
    let start = stdout
        .find('{')
        .ok_or_else(|| WalletError::Output("no JSON document in wallet output".into()))?;
    let doc: Value = serde_json::from_str(&stdout[start..])
        .map_err(|e| WalletError::Output(format!("invalid JSON: {e}")))?;
    let digest = doc
        .get("digest")
        .and_then(Value::as_str)
        .ok_or_else(|| WalletError::Output("wallet output has no digest".into()))?;
    Digest::parse(digest).map_err(|e| WalletError::Output(e.to_string()))
}
