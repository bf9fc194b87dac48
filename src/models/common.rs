//! Common types shared across OTRS webservice payloads.
//!
//! OTRS generic interface responses are relayed to callers largely
//! untouched, so responses stay as JSON objects. This module holds the
//! operation catalogue, the `Error` envelope OTRS embeds in 2xx bodies,
//! and helpers for turning typed request structs into payloads.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::OtrsError;

/// A JSON object as sent to and received from OTRS.
pub type JsonObject = serde_json::Map<String, Value>;

/// A named remote procedure, invoked via `POST {base_url}/{operation}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Authenticate and obtain a `SessionID`.
    SessionCreate,
    /// Create a ticket with an initial article.
    TicketCreate,
    /// Fetch one ticket.
    TicketGet,
    /// Search tickets; returns a `TicketID` array.
    TicketSearch,
    /// Change ticket attributes.
    TicketUpdate,
    /// Fetch the history lines of a ticket.
    TicketHistoryGet,
    /// Fetch one configuration item.
    ConfigItemGet,
    /// Search configuration items.
    ConfigItemSearch,
    /// Create a customer user.
    CustomerUserAdd,
}

impl Operation {
    /// Every operation the adapter knows about.
    pub const ALL: [Operation; 9] = [
        Operation::SessionCreate,
        Operation::TicketCreate,
        Operation::TicketGet,
        Operation::TicketSearch,
        Operation::TicketUpdate,
        Operation::TicketHistoryGet,
        Operation::ConfigItemGet,
        Operation::ConfigItemSearch,
        Operation::CustomerUserAdd,
    ];

    /// The path segment (and OTRS operation name).
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::SessionCreate => "SessionCreate",
            Operation::TicketCreate => "TicketCreate",
            Operation::TicketGet => "TicketGet",
            Operation::TicketSearch => "TicketSearch",
            Operation::TicketUpdate => "TicketUpdate",
            Operation::TicketHistoryGet => "TicketHistoryGet",
            Operation::ConfigItemGet => "ConfigItemGet",
            Operation::ConfigItemSearch => "ConfigItemSearch",
            Operation::CustomerUserAdd => "CustomerUserAdd",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `Error` object OTRS places in a 2xx body when an operation fails.
///
/// ```json
/// { "Error": { "ErrorCode": "TicketCreate.InvalidParameter",
///              "ErrorMessage": "TicketCreate: Ticket->Priority is invalid!" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtrsFault {
    /// `ErrorCode`, if present.
    pub code: Option<String>,
    /// `ErrorMessage`, if present.
    pub message: Option<String>,
}

impl OtrsFault {
    /// Extracts the fault from a response, if it carries an `Error` field.
    ///
    /// A bare string `Error` value is treated as the message.
    pub fn from_response(response: &JsonObject) -> Option<Self> {
        match response.get("Error")? {
            Value::Null => None,
            Value::Object(err) => Some(Self {
                code: err.get("ErrorCode").and_then(scalar_to_string),
                message: err.get("ErrorMessage").and_then(scalar_to_string),
            }),
            other => Some(Self {
                code: None,
                message: scalar_to_string(other).or_else(|| Some(other.to_string())),
            }),
        }
    }

    /// Code and message joined, for display and text inspection.
    pub fn text(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (Some(code), None) => code.clone(),
            (None, Some(message)) => message.clone(),
            (None, None) => "unknown error".to_string(),
        }
    }

    /// Returns true if the fault text names `field`.
    ///
    /// Matching ignores case, spaces and underscores, so `CustomerUser`
    /// matches "customer user" and "Customer_User".
    pub fn mentions(&self, field: &str) -> bool {
        let needle = normalize(field);
        !needle.is_empty() && normalize(&self.text()).contains(&needle)
    }

    /// Converts the fault into an error.
    pub fn into_error(self) -> OtrsError {
        OtrsError::remote_application(
            self.code.unwrap_or_else(|| "unknown".to_string()),
            self.message.unwrap_or_default(),
        )
    }
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Renders a string or number as an owned string.
///
/// OTRS returns ids as strings or numbers depending on the backend.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Serializes a typed request into a payload object.
///
/// # Errors
///
/// Returns `OtrsError::Serialization` if serialization fails, or
/// `OtrsError::Validation` if the value is not a JSON object.
pub fn into_payload<T: Serialize>(request: &T) -> Result<JsonObject, OtrsError> {
    match serde_json::to_value(request)? {
        Value::Object(map) => Ok(map),
        other => Err(OtrsError::validation(format!(
            "request payload must be a JSON object, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::TicketHistoryGet.to_string(), "TicketHistoryGet");
        assert_eq!(Operation::ALL.len(), 9);
        assert!(Operation::ALL.contains(&Operation::CustomerUserAdd));
    }

    #[test]
    fn test_fault_absent() {
        let response = object(json!({"TicketID": "12"}));
        assert!(OtrsFault::from_response(&response).is_none());
        let response = object(json!({"Error": null}));
        assert!(OtrsFault::from_response(&response).is_none());
    }

    #[test]
    fn test_fault_object() {
        let response = object(json!({
            "Error": {
                "ErrorCode": "TicketCreate.InvalidParameter",
                "ErrorMessage": "TicketCreate: Ticket->Priority is invalid!"
            }
        }));
        let fault = OtrsFault::from_response(&response).unwrap();
        assert_eq!(fault.code.as_deref(), Some("TicketCreate.InvalidParameter"));
        assert!(fault.mentions("Priority"));
        assert!(!fault.mentions("Queue"));
    }

    #[test]
    fn test_fault_mentions_ignores_spacing() {
        let response = object(json!({"Error": "No such Customer User: bob"}));
        let fault = OtrsFault::from_response(&response).unwrap();
        assert!(fault.mentions("CustomerUser"));
        assert_eq!(fault.text(), "No such Customer User: bob");
    }

    #[test]
    fn test_fault_into_error() {
        let fault = OtrsFault {
            code: Some("SessionCreate.AuthFail".to_string()),
            message: Some("Authorization failing!".to_string()),
        };
        let err = fault.into_error();
        assert!(matches!(err, OtrsError::RemoteApplication { .. }));
    }

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&json!(42)).as_deref(), Some("42"));
        assert_eq!(scalar_to_string(&json!("42")).as_deref(), Some("42"));
        assert!(scalar_to_string(&json!(["42"])).is_none());
    }

    #[test]
    fn test_into_payload_rejects_non_object() {
        assert!(into_payload(&vec![1, 2]).is_err());
        let payload = into_payload(&json!({"Limit": 5})).unwrap();
        assert_eq!(payload.get("Limit"), Some(&json!(5)));
    }
}
