//! JSON-over-UDP codec shared by every role.
//!
//! Every reply on the wire has shape `{"status": "SUCCESS"|"FAILURE", ...}`.
//! [`Reply<T>`] models that as an internally-tagged enum rather than an
//! untyped JSON bag: a `SUCCESS` reply's extra fields are `T`'s own fields,
//! merged into the same object as the `status` tag; a `FAILURE` reply
//! carries a flat `error` string.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// A generic wire reply: either a typed success payload or a flat error string.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum Reply<T> {
    #[serde(rename = "SUCCESS")]
    Success(T),
    #[serde(rename = "FAILURE")]
    Failure { error: String },
}

impl<T> Reply<T> {
    #[must_use]
    pub fn ok(body: T) -> Self {
        Reply::Success(body)
    }

    #[must_use]
    pub fn err(error: impl Into<String>) -> Self {
        Reply::Failure {
            error: error.into(),
        }
    }

    /// Collapses the wire reply into a plain `Result`.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Reply::Success(body) => Ok(body),
            Reply::Failure { error } => Err(error),
        }
    }
}

/// A bare acknowledgement with no payload fields: `{"status": "SUCCESS"}`.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Ack {}

/// Encodes any serializable value to its JSON wire bytes.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn encode<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(value)
}

/// Decodes wire bytes into a typed request or reply.
///
/// # Errors
/// Returns an error if the bytes are not valid UTF-8 JSON or do not match
/// the target schema.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<T> {
    serde_json::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize as _;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    struct Payload {
        n: usize,
    }

    #[test]
    fn success_reply_flattens_payload_fields() {
        let reply = Reply::ok(Payload { n: 3 });
        let bytes = encode(&reply).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "SUCCESS");
        assert_eq!(json["n"], 3);
    }

    #[test]
    fn failure_reply_round_trips() {
        let reply: Reply<Payload> = Reply::err("no such dss");
        let bytes = encode(&reply).unwrap();
        let decoded: Reply<Payload> = decode(&bytes).unwrap();
        assert_eq!(decoded.into_result().unwrap_err(), "no such dss");
    }

    #[test]
    fn bare_ack_serializes_without_extra_fields() {
        let reply = Reply::ok(Ack {});
        let bytes = encode(&reply).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, serde_json::json!({"status": "SUCCESS"}));
    }
}
