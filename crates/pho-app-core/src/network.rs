// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Network selection and per-network endpoints/package ids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigService, ConfigStore};

/// Config key the network settings are stored under.
pub const NETWORK_CONFIG_KEY: &str = "network";

/// Ledger network the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Development network.
    #[default]
    Devnet,
    /// Public test network.
    Testnet,
    /// Main network.
    Mainnet,
}

impl Network {
    /// Lower-case network name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
            Self::Mainnet => "mainnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            "mainnet" => Ok(Self::Mainnet),
            other => Err(ConfigError::Other(format!("unknown network `{other}`"))),
        }
    }
}

/// Endpoint and deployed package for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEntry {
    /// Fullnode JSON-RPC URL.
    pub rpc_url: String,
    /// Deployed contract package id; empty when not deployed.
    #[serde(default)]
    pub package_id: String,
}

impl NetworkEntry {
    fn new(rpc_url: &str, package_id: &str) -> Self {
        Self {
            rpc_url: rpc_url.to_owned(),
            package_id: package_id.to_owned(),
        }
    }
}

/// How long and how often to poll for transaction effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmPolicy {
    /// Delay between confirmation polls.
    pub poll_interval_ms: u64,
    /// Give up after this long; `None` waits indefinitely.
    pub timeout_ms: Option<u64>,
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            timeout_ms: Some(60_000),
        }
    }
}

/// Saved network settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network used when none is given on the command line.
    pub active: Network,
    /// Devnet settings.
    pub devnet: NetworkEntry,
    /// Testnet settings.
    pub testnet: NetworkEntry,
    /// Mainnet settings.
    pub mainnet: NetworkEntry,
    /// Transaction confirmation polling.
    #[serde(default)]
    pub confirm: ConfirmPolicy,
}

/// Package published on devnet.
pub const DEVNET_PACKAGE_ID: &str =
    "0x35ee0c4bbc6fb4cc98768b37ad7d9a3d73641705ab608fdf3f3ed543a0a5e5de";
/// Package published on testnet.
pub const TESTNET_PACKAGE_ID: &str =
    "0xc596d7fef5628ec88f2cd176b3f49f0a7045cae581134f9a5f261d0885cd597c";
/// Not deployed on mainnet yet.
pub const MAINNET_PACKAGE_ID: &str = "";

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            active: Network::Devnet,
            devnet: NetworkEntry::new("https://api.devnet.iota.cafe", DEVNET_PACKAGE_ID),
            testnet: NetworkEntry::new("https://api.testnet.iota.cafe", TESTNET_PACKAGE_ID),
            mainnet: NetworkEntry::new("https://api.mainnet.iota.cafe", MAINNET_PACKAGE_ID),
            confirm: ConfirmPolicy::default(),
        }
    }
}

impl NetworkConfig {
    /// Settings for `network`.
    pub const fn entry(&self, network: Network) -> &NetworkEntry {
        match network {
            Network::Devnet => &self.devnet,
            Network::Testnet => &self.testnet,
            Network::Mainnet => &self.mainnet,
        }
    }

    /// Mutable settings for `network`.
    pub fn entry_mut(&mut self, network: Network) -> &mut NetworkEntry {
        match network {
            Network::Devnet => &mut self.devnet,
            Network::Testnet => &mut self.testnet,
            Network::Mainnet => &mut self.mainnet,
        }
    }

    /// Deployed package id for `network`, or `None` when unresolved.
    pub fn package_id(&self, network: Network) -> Option<&str> {
        let id = self.entry(network).package_id.trim();
        (!id.is_empty()).then_some(id)
    }

    /// Load saved settings. When nothing was stored yet the defaults are
    /// persisted and returned; unreadable settings are an error and are left
    /// in place.
    pub fn load_or_init<S: ConfigStore>(config: &ConfigService<S>) -> Result<Self, ConfigError> {
        if let Some(cfg) = config.load::<Self>(NETWORK_CONFIG_KEY)? {
            return Ok(cfg);
        }
        let cfg = Self::default();
        config.save(NETWORK_CONFIG_KEY, &cfg)?;
        Ok(cfg)
    }
}
