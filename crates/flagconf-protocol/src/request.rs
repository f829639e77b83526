//! Request envelope.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Request envelope written to a configuration source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfRequest {
    /// Protocol version of the sender.
    pub protocol_version: i32,
    /// Operation name (see [`crate::ops::names`]).
    pub op: String,
    /// Caller-chosen request ID for correlation.
    pub request_id: String,
    /// Operation-specific payload.
    pub payload: serde_json::Value,
}

impl ConfRequest {
    /// Build a request for `op` with a typed payload.
    pub fn new<P: Serialize>(
        op: &str,
        request_id: impl Into<String>,
        payload: &P,
    ) -> Result<Self, ProtocolError> {
        Ok(Self {
            protocol_version: crate::PROTOCOL_VERSION,
            op: op.to_string(),
            request_id: request_id.into(),
            payload: serde_json::to_value(payload)?,
        })
    }

    /// Encode as a single JSON line (without the trailing newline).
    pub fn to_line(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
