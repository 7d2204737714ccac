// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ledger identifiers, transaction effects and object payloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Hex digits in a full-width ledger address or object id.
pub const ID_HEX_LEN: usize = 64;

/// Rejected identifier text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// Nothing after trimming (and an optional `0x`).
    #[error("empty identifier")]
    Empty,
    /// Contains a non-hex character.
    #[error("identifier `{0}` is not hex")]
    NotHex(String),
    /// Longer than 32 bytes.
    #[error("identifier `{0}` is longer than 64 hex digits")]
    TooLong(String),
    /// Digest text is empty or not base58.
    #[error("malformed transaction digest `{0}`")]
    Digest(String),
}

/// Normalize `0x`-hex text to lower-case, left-padded to [`ID_HEX_LEN`] digits.
fn normalize_hex(raw: &str) -> Result<String, IdError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(IdError::Empty);
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(IdError::NotHex(raw.to_owned()));
    }
    if digits.len() > ID_HEX_LEN {
        return Err(IdError::TooLong(raw.to_owned()));
    }
    Ok(format!(
        "0x{:0>width$}",
        digits.to_ascii_lowercase(),
        width = ID_HEX_LEN
    ))
}

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse and normalize `0x`-prefixed hex.
            pub fn parse(raw: &str) -> Result<Self, IdError> {
                normalize_hex(raw).map(Self)
            }

            /// Normalized `0x`-prefixed text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

hex_id!(
    /// Account address.
    Address
);
hex_id!(
    /// On-ledger object identifier.
    ObjectId
);
hex_id!(
    /// Published contract package.
    PackageId
);

/// Transaction digest (base58 text, opaque to the client).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

impl Digest {
    /// Accept any non-empty base58 text.
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let raw = raw.trim();
        if raw.is_empty() || !raw.chars().all(|c| BASE58_ALPHABET.contains(c)) {
            return Err(IdError::Digest(raw.to_owned()));
        }
        Ok(Self(raw.to_owned()))
    }

    /// Digest text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Digest {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Digest> for String {
    fn from(value: Digest) -> Self {
        value.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Argument to a contract entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    /// Pure `u16` value.
    U16(u16),
    /// Reference to an owned object.
    Object(ObjectId),
}

impl fmt::Display for CallArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U16(v) => write!(f, "{v}"),
            Self::Object(id) => write!(f, "{id}"),
        }
    }
}

/// A single entry-point call: `<package>::<module>::<function>(arguments…)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCall {
    /// Package the module is published in.
    pub package: PackageId,
    /// Module name.
    pub module: String,
    /// Entry function name.
    pub function: String,
    /// Ordered arguments.
    pub arguments: Vec<CallArg>,
}

impl MoveCall {
    /// Fully qualified call target.
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

/// Reference to a specific object version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    /// Object id.
    pub object_id: ObjectId,
    /// Version the reference points at.
    #[serde(deserialize_with = "lenient_u64")]
    pub version: u64,
    /// Object digest.
    pub digest: String,
}

/// Object created by a transaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedObject {
    /// Owner as reported by the node (shape varies by owner kind).
    #[serde(default)]
    pub owner: Value,
    /// Reference to the created version.
    pub reference: ObjectRef,
}

/// Execution outcome reported in transaction effects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Executed successfully.
    Success,
    /// Executed and aborted; `error` is the node's text (e.g. `MoveAbort(…)`).
    Failure {
        /// Failure description.
        #[serde(default)]
        error: String,
    },
}

/// Effects of a confirmed transaction (only the parts the client reads).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionEffects {
    /// Execution outcome.
    pub status: ExecutionStatus,
    /// Newly created objects, in node order.
    #[serde(default)]
    pub created: Vec<CreatedObject>,
}

impl TransactionEffects {
    /// Id of the first newly created object, if any.
    pub fn first_created(&self) -> Option<&ObjectId> {
        self.created.first().map(|c| &c.reference.object_id)
    }
}

/// Current state of an object as returned by the node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    /// Object id.
    pub object_id: ObjectId,
    /// Current version.
    #[serde(deserialize_with = "lenient_u64")]
    pub version: u64,
    /// Object digest.
    pub digest: String,
    /// Move type, when requested.
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    /// Owner, when requested.
    #[serde(default)]
    pub owner: Option<Value>,
    /// Parsed content, when requested. Shape is contract-specific.
    #[serde(default)]
    pub content: Option<Value>,
}

/// The node reports sequence numbers both as JSON numbers and as strings.
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrText {
        Num(u64),
        Text(String),
    }

    match NumOrText::deserialize(deserializer)? {
        NumOrText::Num(n) => Ok(n),
        NumOrText::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ids_normalize_case_and_width() {
        let a = Address::parse("0xABC").unwrap();
        let b = Address::parse(&format!("0x{:0>64}", "abc")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 2 + ID_HEX_LEN);
        assert!(a.as_str().ends_with("abc"));
    }

    #[test]
    fn ids_reject_garbage() {
        assert_eq!(Address::parse("0x"), Err(IdError::Empty));
        assert!(matches!(ObjectId::parse("0xzz"), Err(IdError::NotHex(_))));
        assert!(matches!(
            PackageId::parse(&format!("0x{}", "1".repeat(65))),
            Err(IdError::TooLong(_))
        ));
        assert!(Digest::parse("0OIl").is_err());
        assert!(Digest::parse("").is_err());
    }

    #[test]
    fn call_target_joins_parts() {
        let call = MoveCall {
            package: PackageId::parse("0x2").unwrap(),
            module: "pho".into(),
            function: "cook_pho".into(),
            arguments: vec![CallArg::U16(10)],
        };
        assert!(call.target().ends_with("0002::pho::cook_pho"));
    }

    #[test]
    fn effects_parse_failure_and_created() {
        let json = r#"{
            "messageVersion": "v1",
            "status": { "status": "failure", "error": "MoveAbort(_, 1)" },
            "created": [
                { "owner": { "AddressOwner": "0x1" },
                  "reference": { "objectId": "0xfeed", "version": 7, "digest": "abc" } },
                { "owner": "Immutable",
                  "reference": { "objectId": "0xbeef", "version": "8", "digest": "def" } }
            ]
        }"#;
        let fx: TransactionEffects = serde_json::from_str(json).unwrap();
        assert!(matches!(fx.status, ExecutionStatus::Failure { ref error } if error.contains("MoveAbort")));
        assert_eq!(fx.first_created(), Some(&ObjectId::parse("0xfeed").unwrap()));
        assert_eq!(fx.created[1].reference.version, 8);
    }
}
