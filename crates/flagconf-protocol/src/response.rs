//! Response envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ConfError, ProtocolError};

/// Response envelope read back from a configuration source.
///
/// Sources written in shell or other small languages rarely track request
/// IDs, so `protocol_version` and `request_id` are optional on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfResponse {
    /// Protocol version of the source, when it reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<i32>,
    /// Request ID echoed from the request, when the source echoes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Success payload (present when ok=true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Error details (present when ok=false).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ConfError>,
}

impl ConfResponse {
    /// Decode one response line.
    pub fn from_line(line: &str) -> Result<Self, ProtocolError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(ProtocolError::EmptyResponse);
        }
        Ok(serde_json::from_str(trimmed)?)
    }

    /// Check the response against the request it answers and extract the
    /// typed payload.
    ///
    /// A missing payload on success decodes as an empty object, so payload
    /// types whose fields all have defaults still succeed.
    pub fn into_payload<T: DeserializeOwned>(self, request_id: &str) -> Result<T, ProtocolError> {
        if let Some(got) = &self.request_id {
            if got != request_id {
                return Err(ProtocolError::RequestIdMismatch {
                    expected: request_id.to_string(),
                    got: got.clone(),
                });
            }
        }

        if !self.ok {
            return Err(ProtocolError::Remote(self.error.unwrap_or_else(|| {
                ConfError::internal("source reported failure without an error")
            })));
        }

        let payload = self
            .payload
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
        Ok(serde_json::from_value(payload)?)
    }
}
