// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Pho restaurant developer tasks.
//!
//! This crate exists to provide a single, discoverable entrypoint for repo automation via
//! `cargo xtask …` (see `.cargo/config.toml`).
//!
//! Invariants:
//! - This is *not* production runtime code; it may invoke external tools (`iota`).
//! - Nothing here talks to the ledger: publishing stays a manual step.

// xtask is a CLI; printing is its job.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use pho_app_core::config::ConfigService;
use pho_app_core::network::{Network, NetworkConfig, NETWORK_CONFIG_KEY};
use pho_config_fs::FsConfigStore;
use time::format_description;
use time::OffsetDateTime;

const DEFAULT_CONTRACT_DIR: &str = "contract/pho_restaurant";
const DEFAULT_CONTRACT_SOURCE: &str = "contract/pho_restaurant/sources/pho_restaurant.move";
const NOT_DEPLOYED: &str = "Not deployed yet - run cargo xtask build-contract, then iota client publish";

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Pho restaurant developer tasks (cargo xtask …)",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the Move contract with `iota move build`.
    BuildContract(BuildContractArgs),
    /// Write a Markdown prompt describing the current contract and deployment.
    GenPrompt(GenPromptArgs),
}

#[derive(Args)]
struct BuildContractArgs {
    /// Move package directory.
    #[arg(long, default_value = DEFAULT_CONTRACT_DIR)]
    path: PathBuf,
}

#[derive(Args)]
struct GenPromptArgs {
    /// Move source embedded in the prompt (empty when missing).
    #[arg(long, default_value = DEFAULT_CONTRACT_SOURCE)]
    contract: PathBuf,

    /// Directory the prompt file is written to (created if needed).
    #[arg(long, default_value = "prompts")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::BuildContract(args) => run_build_contract(&args.path),
        Commands::GenPrompt(args) => run_gen_prompt(&args),
    }
}

fn run_build_contract(path: &Path) -> Result<()> {
    if !path.is_dir() {
        bail!("contract directory not found: {}", path.display());
    }
    println!("Contract path: {}", path.display());
    println!("Building Move contract...\n");

    let status = Command::new("iota")
        .args(["move", "build"])
        .current_dir(path)
        .status()
        .context("failed to spawn `iota` (is the IOTA CLI installed?)")?;

    if !status.success() {
        bail!("contract build failed (exit status: {status})");
    }

    println!("\nBuild successful!\n");
    println!("Next steps:");
    println!("1. Run: iota client publish (in {})", path.display());
    println!("2. Copy the Package ID");
    println!("3. Save it in the network config, or pass --package-id / PHO_PACKAGE_ID to pho");
    Ok(())
}

fn run_gen_prompt(args: &GenPromptArgs) -> Result<()> {
    let contract = match fs::read_to_string(&args.contract) {
        Ok(source) => source,
        Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
        Err(err) => {
            return Err(err).with_context(|| format!("read {}", args.contract.display()));
        }
    };
    let package_id = devnet_package_id()?;
    let prompt = render_prompt(package_id.as_deref(), &contract);
    let file = write_prompt(&args.out_dir, OffsetDateTime::now_utc(), &prompt)?;

    println!("Prompt generated: {}\n", file.display());
    println!("{prompt}");
    Ok(())
}

/// Devnet package id from the saved network config, or the built-in default.
fn devnet_package_id() -> Result<Option<String>> {
    let store = FsConfigStore::new().context("locate config directory")?;
    let config = ConfigService::new(store)
        .load::<NetworkConfig>(NETWORK_CONFIG_KEY)
        .context("read saved network config")?
        .unwrap_or_default();
    Ok(config.package_id(Network::Devnet).map(str::to_owned))
}

fn render_prompt(package_id: Option<&str>, contract: &str) -> String {
    let package_id = package_id.unwrap_or(NOT_DEPLOYED);
    format!(
        "# Pho Restaurant dApp - Contract Customization

## Current Contract Configuration

**Network**: Devnet
**Package ID**: `{package_id}`
**Module**: pho_restaurant::pho

## Current Move Contract

```move
{contract}
```

## Request

[Add your customization request here]

---

Please update the contract to:
1. Modify structs as needed
2. Update function signatures
3. Maintain all safety checks
4. Keep proper error handling
"
    )
}

/// `YYYY-MM-DDTHH-MM-SS` in UTC, safe for file names.
fn prompt_timestamp(now: OffsetDateTime) -> Result<String> {
    let fmt = format_description::parse("[year]-[month]-[day]T[hour]-[minute]-[second]")
        .context("timestamp format")?;
    now.to_offset(time::UtcOffset::UTC)
        .format(&fmt)
        .context("format timestamp")
}

fn write_prompt(out_dir: &Path, now: OffsetDateTime, prompt: &str) -> Result<PathBuf> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;
    let file = out_dir.join(format!("prompt_{}.md", prompt_timestamp(now)?));
    fs::write(&file, prompt).with_context(|| format!("write {}", file.display()))?;
    Ok(file)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_filename_safe_utc() {
        let t = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(prompt_timestamp(t).unwrap(), "2023-11-14T22-13-20");
    }

    #[test]
    fn prompt_embeds_package_and_source() {
        let text = render_prompt(Some("0x35ee"), "module pho_restaurant::pho {}");
        assert!(text.contains("**Package ID**: `0x35ee`"));
        assert!(text.contains("```move\nmodule pho_restaurant::pho {}\n```"));
    }

    #[test]
    fn missing_package_says_not_deployed() {
        let text = render_prompt(None, "");
        assert!(text.contains("Not deployed yet"));
    }

    #[test]
    fn prompt_file_lands_in_created_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("prompts");
        let t = OffsetDateTime::from_unix_timestamp(0).unwrap();
        let file = write_prompt(&out, t, "hello").unwrap();
        assert_eq!(file, out.join("prompt_1970-01-01T00-00-00.md"));
        assert_eq!(fs::read_to_string(file).unwrap(), "hello");
    }

    #[test]
    fn build_requires_existing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let err = run_build_contract(&tmp.path().join("missing")).unwrap_err();
        assert!(err.to_string().contains("contract directory not found"));
    }
}
