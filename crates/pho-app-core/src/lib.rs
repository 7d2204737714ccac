// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for the pho restaurant client (config store,
//! network configuration). Keeps the adapter and CLI layers framework-agnostic.

pub mod config;
pub mod network;
