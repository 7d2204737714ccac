// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON-RPC 2.0 over HTTP against an IOTA fullnode.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::types::{Digest, ObjectData, ObjectId, TransactionEffects};
use crate::LedgerClient;

/// Errors talking to the fullnode.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Transport failure (connect, TLS, body read).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success HTTP status.
    #[error("fullnode returned HTTP status {0}")]
    Status(u16),
    /// JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Node-provided message.
        message: String,
    },
    /// Response did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
    /// Client settings are unusable.
    #[error("invalid rpc configuration: {0}")]
    Config(String),
    /// Transaction effects were not available in time.
    #[error("transaction not confirmed after {0:?}")]
    Timeout(Duration),
}

/// Connection settings for [`RpcClient`].
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Fullnode JSON-RPC URL.
    pub url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Delay between `wait_for_transaction` polls.
    pub poll_interval: Duration,
    /// Overall confirmation deadline; `None` waits indefinitely.
    pub confirm_timeout: Option<Duration>,
}

impl RpcConfig {
    /// Defaults for `url`: 10s requests, 500ms polling, 60s confirmation deadline.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            request_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(500),
            confirm_timeout: Some(Duration::from_secs(60)),
        }
    }
}

/// Fullnode client.
#[derive(Debug)]
pub struct RpcClient {
    cfg: RpcConfig,
    client: reqwest::Client,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    #[serde(default)]
    message: String,
}

impl RpcClient {
    /// Build a client; fails on an empty URL or if the HTTP stack cannot be
    /// initialised.
    pub fn new(cfg: RpcConfig) -> Result<Self, RpcError> {
        if cfg.url.trim().is_empty() {
            return Err(RpcError::Config("rpc url is empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()?;
        Ok(Self {
            cfg,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Issue one JSON-RPC call and return its `result`.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "rpc call");
        let resp = self
            .client
            .post(&self.cfg.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RpcError::Status(status.as_u16()));
        }
        let envelope: RpcEnvelope = resp.json().await?;
        unwrap_envelope(envelope)
    }

    async fn try_get_effects(&self, digest: &Digest) -> Result<TransactionEffects, RpcError> {
        let result = self
            .call(
                "iota_getTransactionBlock",
                json!([digest.as_str(), { "showEffects": true }]),
            )
            .await?;
        parse_transaction_block(result)
    }

    async fn poll_effects(&self, digest: &Digest) -> TransactionEffects {
        loop {
            match self.try_get_effects(digest).await {
                Ok(effects) => return effects,
                Err(err) => {
                    debug!(%digest, %err, "effects not available yet");
                    tokio::time::sleep(self.cfg.poll_interval).await;
                }
            }
        }
    }
}

impl LedgerClient for RpcClient {
    async fn wait_for_transaction(&self, digest: &Digest) -> Result<TransactionEffects, RpcError> {
        match self.cfg.confirm_timeout {
            Some(limit) => tokio::time::timeout(limit, self.poll_effects(digest))
                .await
                .map_err(|_| RpcError::Timeout(limit)),
            None => Ok(self.poll_effects(digest).await),
        }
    }

    async fn get_object(&self, id: &ObjectId) -> Result<Option<ObjectData>, RpcError> {
        let result = self
            .call(
                "iota_getObject",
                json!([id.as_str(), { "showContent": true, "showOwner": true, "showType": true }]),
            )
            .await?;
        parse_object_response(result)
    }
}

fn unwrap_envelope(envelope: RpcEnvelope) -> Result<Value, RpcError> {
    if let Some(err) = envelope.error {
        return Err(RpcError::Rpc {
            code: err.code,
            message: err.message,
        });
    }
    envelope
        .result
        .ok_or_else(|| RpcError::Decode("response has neither result nor error".into()))
}

/// Pull `effects` out of a `getTransactionBlock` result.
pub fn parse_transaction_block(result: Value) -> Result<TransactionEffects, RpcError> {
    let effects = result
        .get("effects")
        .cloned()
        .ok_or_else(|| RpcError::Decode("transaction block has no effects".into()))?;
    serde_json::from_value(effects).map_err(|e| RpcError::Decode(e.to_string()))
}

/// Interpret a `getObject` result. Missing and deleted objects map to `Ok(None)`.
pub fn parse_object_response(result: Value) -> Result<Option<ObjectData>, RpcError> {
    if let Some(data) = result.get("data").filter(|d| !d.is_null()) {
        let data = serde_json::from_value(data.clone()).map_err(|e| RpcError::Decode(e.to_string()))?;
        return Ok(Some(data));
    }
    match result.get("error") {
        Some(err) => {
            let code = err.get("code").and_then(Value::as_str).unwrap_or_default();
            match code {
                "notExists" | "deleted" => Ok(None),
                other => Err(RpcError::Decode(format!("object error `{other}`"))),
            }
        }
        None => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_url_is_a_config_error() {
        assert!(matches!(
            RpcClient::new(RpcConfig::new("  ")),
            Err(RpcError::Config(_))
        ));
        assert!(RpcClient::new(RpcConfig::new("http://127.0.0.1:9000")).is_ok());
    }

    #[test]
    fn envelope_prefers_error() {
        let env: RpcEnvelope = serde_json::from_str(
            r#"{ "jsonrpc": "2.0", "id": 1, "error": { "code": -32602, "message": "bad digest" } }"#,
        )
        .unwrap();
        assert!(matches!(
            unwrap_envelope(env),
            Err(RpcError::Rpc { code: -32602, ref message }) if message == "bad digest"
        ));
    }

    #[test]
    fn transaction_block_yields_created_objects() {
        let result = json!({
            "digest": "9xYz",
            "effects": {
                "status": { "status": "success" },
                "created": [
                    { "owner": { "AddressOwner": "0x1" },
                      "reference": { "objectId": "0xabc", "version": 3, "digest": "d1" } }
                ]
            }
        });
        let fx = parse_transaction_block(result).unwrap();
        assert_eq!(fx.first_created().unwrap(), &ObjectId::parse("0xabc").unwrap());
    }

    #[test]
    fn transaction_block_without_effects_is_decode_error() {
        let err = parse_transaction_block(json!({ "digest": "9xYz" })).unwrap_err();
        assert!(matches!(err, RpcError::Decode(_)));
    }

    #[test]
    fn object_response_shapes() {
        let found = parse_object_response(json!({
            "data": {
                "objectId": "0xabc",
                "version": "12",
                "digest": "d",
                "type": "0x2::pho::PhoBox",
                "content": { "dataType": "moveObject", "fields": {} }
            }
        }))
        .unwrap()
        .unwrap();
        assert_eq!(found.version, 12);
        assert_eq!(found.type_name.as_deref(), Some("0x2::pho::PhoBox"));

        let missing =
            parse_object_response(json!({ "error": { "code": "notExists", "object_id": "0xabc" } }))
                .unwrap();
        assert!(missing.is_none());

        let weird = parse_object_response(json!({ "error": { "code": "displayError" } }));
        assert!(weird.is_err());
    }
}
