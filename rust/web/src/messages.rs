//! Wire protocol for the duplex client channel.
//!
//! Inbound messages are runtime-validated against the tagged shapes the
//! clients send (`MOVE` with a `val` action discriminator, bare
//! `CONTINUE`); outbound messages are `STATE` / `EVENT` / `ERROR`
//! envelopes. Everything is JSON text frames.

use serde::{Deserialize, Serialize};

use felt_engine::betting::{Action, ActionKind};
use felt_engine::state::{EventMessage, PublicState};

/// Machine-readable error codes surfaced in `ERROR` payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingTableId,
    TableNotFound,
    InvalidTableMode,
    InvalidSingleSessionId,
    InvalidPlayerId,
    SeatNotJoined,
    TableNotStarted,
    TableEnded,
    HandNotOver,
    HandContinueNotReady,
    NotYourTurn,
    InvalidAction,
    InvalidJson,
    ValidationError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorMessage {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        code: ErrorCode,
        message: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details: Some(details),
        }
    }
}

/// Server-to-client envelope: the `type` discriminator selects the
/// payload variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    #[serde(rename = "STATE")]
    State(Box<PublicState>),
    #[serde(rename = "EVENT")]
    Event(EventMessage),
    #[serde(rename = "ERROR")]
    Error(ErrorMessage),
}

impl ServerMessage {
    pub fn state(state: PublicState) -> Self {
        ServerMessage::State(Box::new(state))
    }

    pub fn event(event: EventMessage) -> Self {
        ServerMessage::Event(event)
    }

    pub fn error(error: ErrorMessage) -> Self {
        ServerMessage::Error(error)
    }
}

/// A validated inbound client message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    Move(Action),
    Continue,
}

/// Parses raw socket text into JSON. The transport layer maps the error
/// to `INVALID_JSON`.
pub fn parse_json_payload(raw: &str) -> Result<serde_json::Value, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|err| err.to_string())?;
    if !value.is_object() {
        return Err("message must be a JSON object".to_string());
    }
    Ok(value)
}

/// The `type` discriminator, trimmed and upper-cased so clients may send
/// any casing.
pub fn message_type(payload: &serde_json::Value) -> String {
    payload
        .get("type")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .trim()
        .to_ascii_uppercase()
}

/// Validates a `MOVE` payload into an [`Action`]. `val` names the
/// action (`deal` is a legacy alias for `call`); `amount` is required
/// for raises and forbidden otherwise. Violations collect into the
/// details of a `VALIDATION_ERROR`.
pub fn parse_move(payload: &serde_json::Value) -> Result<Action, Vec<String>> {
    let mut details = Vec::new();

    if message_type(payload) != "MOVE" {
        details.push("type: must be MOVE for client actions".to_string());
    }

    let kind = match payload.get("val").and_then(|v| v.as_str()) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "check" => Some(ActionKind::Check),
            "call" | "deal" => Some(ActionKind::Call),
            "fold" => Some(ActionKind::Fold),
            "raise" => Some(ActionKind::Raise),
            other => {
                details.push(format!("val: `{other}` is not a valid action"));
                None
            }
        },
        None => {
            details.push("val: field required".to_string());
            None
        }
    };

    let amount = match payload.get("amount") {
        None | Some(serde_json::Value::Null) => None,
        Some(value) => match value.as_u64() {
            Some(amount) if amount >= 1 => Some(amount.min(u32::MAX as u64) as u32),
            _ => {
                details.push("amount: must be an integer >= 1".to_string());
                None
            }
        },
    };

    if let Some(kind) = kind {
        if kind == ActionKind::Raise && amount.is_none() {
            details.push("amount: amount is required for raise".to_string());
        }
        if kind != ActionKind::Raise && amount.is_some() {
            details.push("amount: amount is only valid for raise".to_string());
        }
    }

    match kind {
        Some(kind) if details.is_empty() => Ok(Action { kind, amount }),
        _ => Err(details),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn move_messages_parse_into_actions() {
        let action = parse_move(&json!({"type": "MOVE", "val": "check"})).unwrap();
        assert_eq!(action, Action::check());

        let action = parse_move(&json!({"type": "MOVE", "val": "raise", "amount": 40})).unwrap();
        assert_eq!(action, Action::raise_to(40));
    }

    #[test]
    fn deal_is_a_call_alias() {
        let action = parse_move(&json!({"type": "MOVE", "val": "deal"})).unwrap();
        assert_eq!(action, Action::call());
    }

    #[test]
    fn raise_requires_an_amount() {
        let err = parse_move(&json!({"type": "MOVE", "val": "raise"})).unwrap_err();
        assert!(err.iter().any(|d| d.contains("required for raise")));
    }

    #[test]
    fn amount_is_rejected_outside_raises() {
        let err = parse_move(&json!({"type": "MOVE", "val": "call", "amount": 10})).unwrap_err();
        assert!(err.iter().any(|d| d.contains("only valid for raise")));
    }

    #[test]
    fn zero_and_negative_amounts_are_rejected() {
        assert!(parse_move(&json!({"type": "MOVE", "val": "raise", "amount": 0})).is_err());
        assert!(parse_move(&json!({"type": "MOVE", "val": "raise", "amount": -5})).is_err());
    }

    #[test]
    fn unknown_actions_and_types_are_rejected() {
        assert!(parse_move(&json!({"type": "MOVE", "val": "jam"})).is_err());
        assert!(parse_move(&json!({"type": "NOPE", "val": "call"})).is_err());
        assert!(parse_move(&json!({"type": "MOVE"})).is_err());
    }

    #[test]
    fn message_type_is_case_insensitive() {
        assert_eq!(message_type(&json!({"type": " continue "})), "CONTINUE");
        assert_eq!(message_type(&json!({})), "");
    }

    #[test]
    fn invalid_json_is_reported() {
        assert!(parse_json_payload("{not json").is_err());
        assert!(parse_json_payload("[1, 2]").is_err());
        assert!(parse_json_payload("{\"type\": \"CONTINUE\"}").is_ok());
    }

    #[test]
    fn server_messages_carry_the_type_tag() {
        let error = ServerMessage::error(ErrorMessage::new(ErrorCode::NotYourTurn, "wait"));
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value["type"], "ERROR");
        assert_eq!(value["payload"]["code"], "NOT_YOUR_TURN");
        assert_eq!(value["payload"]["message"], "wait");
        assert!(value["payload"].get("details").is_none());
    }

    #[test]
    fn error_codes_serialize_screaming_snake() {
        let value = serde_json::to_value(ErrorCode::InvalidSingleSessionId).unwrap();
        assert_eq!(value, "INVALID_SINGLE_SESSION_ID");
        let value = serde_json::to_value(ErrorCode::HandContinueNotReady).unwrap();
        assert_eq!(value, "HAND_CONTINUE_NOT_READY");
    }
}
