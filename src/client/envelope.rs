//! Response envelope decoding
//!
//! Every endpoint answers `{ success, message, ...payload }`. A successful
//! envelope yields the payload with `success`/`message` stripped; a failed
//! one yields the backend message verbatim.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{PortalError, PortalResult};

/// Message used when a failed envelope carries no text
const FALLBACK_FAILURE_MESSAGE: &str = "Request failed";

/// Decoded envelope before payload typing
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub success: bool,
    pub message: Option<String>,
    pub payload: serde_json::Map<String, Value>,
}

impl Envelope {
    /// Parse a raw response body into an envelope
    pub fn parse(body: &str) -> PortalResult<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| PortalError::Transport(format!("Malformed response body: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> PortalResult<Self> {
        let Value::Object(mut map) = value else {
            return Err(PortalError::Transport(
                "Malformed response body: expected a JSON object".to_string(),
            ));
        };

        let success = match map.remove("success") {
            Some(Value::Bool(b)) => b,
            _ => {
                return Err(PortalError::Transport(
                    "Malformed response body: missing success flag".to_string(),
                ))
            }
        };

        let message = match map.remove("message") {
            Some(Value::String(s)) => Some(s),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };

        Ok(Self {
            success,
            message,
            payload: map,
        })
    }

    /// Failure message, as shown to the user
    pub fn failure_message(&self) -> String {
        self.message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| FALLBACK_FAILURE_MESSAGE.to_string())
    }

    /// Turn the envelope into its typed payload, or a UserFacingError
    pub fn into_payload<T: DeserializeOwned>(self) -> PortalResult<Reply<T>> {
        if !self.success {
            return Err(PortalError::UserFacing(self.failure_message()));
        }
        let data = serde_json::from_value(Value::Object(self.payload))
            .map_err(|e| PortalError::Transport(format!("Unexpected payload shape: {e}")))?;
        Ok(Reply {
            message: self.message,
            data,
        })
    }
}

/// Successful call: payload plus the backend's message, if any
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub message: Option<String>,
    pub data: T,
}

impl<T> Reply<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        Reply {
            message: self.message,
            data: f(self.data),
        }
    }

    /// Backend message, or `fallback` when it sent none
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Decode a raw body straight into a typed payload
pub fn decode<T: DeserializeOwned>(body: &str) -> PortalResult<Reply<T>> {
    Envelope::parse(body)?.into_payload()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentsPayload, NoPayload};

    #[test]
    fn success_strips_envelope_fields() {
        let reply: Reply<AppointmentsPayload> = decode(
            r#"{"success":true,"message":"ok","appointments":[{"_id":"a1"},{"_id":"a2"}]}"#,
        )
        .unwrap();
        assert_eq!(reply.message.as_deref(), Some("ok"));
        assert_eq!(reply.data.appointments.len(), 2);
    }

    #[test]
    fn failure_surfaces_backend_message() {
        let err = decode::<NoPayload>(r#"{"success":false,"message":"Appointment already cancelled"}"#)
            .unwrap_err();
        assert_eq!(
            err,
            PortalError::UserFacing("Appointment already cancelled".to_string())
        );
    }

    #[test]
    fn failure_without_message_uses_fallback() {
        let err = decode::<NoPayload>(r#"{"success":false}"#).unwrap_err();
        assert_eq!(err, PortalError::UserFacing("Request failed".to_string()));
    }

    #[test]
    fn non_json_is_transport_error() {
        let err = decode::<NoPayload>("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, PortalError::Transport(_)));
    }

    #[test]
    fn missing_success_flag_is_transport_error() {
        let err = decode::<NoPayload>(r#"{"message":"hi"}"#).unwrap_err();
        assert!(matches!(err, PortalError::Transport(_)));

        let err = decode::<NoPayload>(r#"[1,2,3]"#).unwrap_err();
        assert!(matches!(err, PortalError::Transport(_)));
    }

    #[test]
    fn wrong_payload_shape_is_transport_error() {
        let err =
            decode::<AppointmentsPayload>(r#"{"success":true,"appointments":"nope"}"#).unwrap_err();
        assert!(matches!(err, PortalError::Transport(_)));
    }
}
