//! JSON-RPC response envelope.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured error record carried by a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// Server-side error identifier.
    pub id: i64,
    /// Human-readable description.
    pub message: String,
    /// Optional additional detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(data) => write!(f, "error {}: {} ({data})", self.id, self.message),
            None => write!(f, "error {}: {}", self.id, self.message),
        }
    }
}

/// The decoded response envelope.
///
/// Exactly one of `result` and `error` is present on a well-formed
/// response; `result` is kept as opaque JSON for the caller to
/// re-decode against its own expectations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Protocol version tag.
    pub jsonrpc: String,
    /// Echo of the request correlation id.
    pub id: u64,
    /// Opaque result payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error record, mutually exclusive with `result`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    /// Split the envelope into its success or error arm.
    ///
    /// A response carrying neither arm yields `Ok(Value::Null)`.
    pub fn into_result(self) -> Result<Value, RpcError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}
