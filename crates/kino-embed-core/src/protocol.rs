//! Cross-document message protocol
//!
//! Inbound (frame → host): `{"event": string, "detail": any}`, delivered either
//! as a JSON string or as a plain object.
//!
//! Outbound (host → frame): `{"method": string, "optParams": any}`, always
//! serialized to JSON.

use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved event announcing the player can receive commands
pub const READY_EVENT: &str = "ready";
/// Playback position update
pub const TIME_UPDATE_EVENT: &str = "cplVideoTimeUpdate";
/// Ad playback position update
pub const AD_PROGRESS_EVENT: &str = "cplAdProgress";
/// Host notification emitted once the player is ready
pub const LOAD_EVENT: &str = "load";

/// Message data as delivered by the browser
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// String data, expected to hold JSON
    Text(String),
    /// Structured-clone data converted to JSON
    Object(Value),
}

impl From<&str> for RawPayload {
    fn from(text: &str) -> Self {
        RawPayload::Text(text.to_string())
    }
}

impl From<String> for RawPayload {
    fn from(text: String) -> Self {
        RawPayload::Text(text)
    }
}

impl From<Value> for RawPayload {
    fn from(value: Value) -> Self {
        RawPayload::Object(value)
    }
}

/// Whether a payload could carry a protocol message
pub fn is_structured_payload(raw: &RawPayload) -> bool {
    match raw {
        RawPayload::Text(text) => text.trim_start().starts_with('{'),
        RawPayload::Object(value) => value.is_object(),
    }
}

/// Parse a structured payload into a JSON object
pub fn parse_payload(raw: &RawPayload) -> Option<Map<String, Value>> {
    let value = match raw {
        RawPayload::Text(text) => serde_json::from_str(text).ok()?,
        RawPayload::Object(value) => value.clone(),
    };
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// A decoded inbound message
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InboundMessage {
    pub event: String,
    #[serde(default)]
    pub detail: Value,
}

/// What an inbound message means to the bridge
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    /// Readiness signal with a usable detail
    Ready,
    /// `ready` without detail; carries no signal
    EmptyReady,
    /// Player position in seconds
    TimeUpdate(f64),
    /// Ad position in seconds
    AdProgress(f64),
    /// Anything else, forwarded untouched
    Other,
}

impl InboundMessage {
    /// Decode a raw payload, dropping anything that is not a protocol message
    pub fn decode(raw: &RawPayload) -> Option<Self> {
        if !is_structured_payload(raw) {
            return None;
        }
        let map = parse_payload(raw)?;
        serde_json::from_value(Value::Object(map)).ok()
    }

    pub fn classify(&self) -> EventKind {
        match self.event.as_str() {
            READY_EVENT if is_truthy(&self.detail) => EventKind::Ready,
            READY_EVENT => EventKind::EmptyReady,
            TIME_UPDATE_EVENT => EventKind::TimeUpdate(number_field(&self.detail, "currentTime")),
            AD_PROGRESS_EVENT => EventKind::AdProgress(number_field(&self.detail, "position")),
            _ => EventKind::Other,
        }
    }
}

fn number_field(detail: &Value, key: &str) -> f64 {
    detail.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// JavaScript truthiness of a JSON value
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// An outbound command as posted to the frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub method: String,
    pub opt_params: Value,
}

impl OutboundMessage {
    pub fn new(method: impl Into<String>, opt_params: impl Into<Value>) -> Self {
        Self {
            method: method.into(),
            opt_params: opt_params.into(),
        }
    }

    /// Serialize for `postMessage`
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Player commands exposed by the control surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Mute,
    Unmute,
    SeekTo(f64),
    HandleViewport(bool),
}

impl Command {
    /// Method name understood by the player
    pub fn method(&self) -> &'static str {
        match self {
            Command::Play => "play",
            Command::Pause => "pause",
            Command::Mute => "mute",
            Command::Unmute => "unmute",
            Command::SeekTo(_) => "seekTo",
            Command::HandleViewport(_) => "handleViewport",
        }
    }

    pub fn params(&self) -> Value {
        match self {
            Command::Play | Command::Pause | Command::Mute | Command::Unmute => {
                Value::String(String::new())
            }
            Command::SeekTo(seconds) => Value::from(*seconds),
            Command::HandleViewport(in_viewport) => Value::Bool(*in_viewport),
        }
    }
}

impl From<Command> for OutboundMessage {
    fn from(command: Command) -> Self {
        OutboundMessage::new(command.method(), command.params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_payload_detection() {
        assert!(is_structured_payload(&r#"{"event":"x"}"#.into()));
        assert!(is_structured_payload(&"  {}".into()));
        assert!(!is_structured_payload(&"ready".into()));
        assert!(!is_structured_payload(&"[1,2]".into()));
        assert!(is_structured_payload(&json!({"event": "x"}).into()));
        assert!(!is_structured_payload(&json!([1, 2]).into()));
        assert!(!is_structured_payload(&json!("text").into()));
    }

    #[test]
    fn test_decode_json_string() {
        let msg = InboundMessage::decode(&r#"{"event":"play","detail":{"a":1}}"#.into()).unwrap();
        assert_eq!(msg.event, "play");
        assert_eq!(msg.detail, json!({"a": 1}));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(InboundMessage::decode(&"{not json".into()).is_none());
        assert!(InboundMessage::decode(&json!({"detail": 1}).into()).is_none());
        assert!(InboundMessage::decode(&json!({"event": 3}).into()).is_none());
        assert!(InboundMessage::decode(&json!(null).into()).is_none());
    }

    #[test]
    fn test_missing_detail_is_null() {
        let msg = InboundMessage::decode(&json!({"event": "ended"}).into()).unwrap();
        assert_eq!(msg.detail, Value::Null);
        assert_eq!(msg.classify(), EventKind::Other);
    }

    #[test]
    fn test_classify_ready() {
        let ready = |detail: Value| InboundMessage { event: "ready".into(), detail }.classify();
        assert_eq!(ready(json!({"version": 2})), EventKind::Ready);
        assert_eq!(ready(json!(true)), EventKind::Ready);
        assert_eq!(ready(json!({})), EventKind::Ready);
        assert_eq!(ready(Value::Null), EventKind::EmptyReady);
        assert_eq!(ready(json!("")), EventKind::EmptyReady);
        assert_eq!(ready(json!(0)), EventKind::EmptyReady);
    }

    #[test]
    fn test_classify_positions() {
        let time = InboundMessage {
            event: TIME_UPDATE_EVENT.into(),
            detail: json!({"currentTime": 12.5}),
        };
        assert_eq!(time.classify(), EventKind::TimeUpdate(12.5));

        let ad = InboundMessage {
            event: AD_PROGRESS_EVENT.into(),
            detail: json!({"position": "soon"}),
        };
        assert_eq!(ad.classify(), EventKind::AdProgress(0.0));
    }

    #[test]
    fn test_outbound_wire_format() {
        let msg: OutboundMessage = Command::SeekTo(30.0).into();
        assert_eq!(msg.to_json().unwrap(), r#"{"method":"seekTo","optParams":30.0}"#);

        let msg: OutboundMessage = Command::Play.into();
        assert_eq!(msg.to_json().unwrap(), r#"{"method":"play","optParams":""}"#);

        let msg: OutboundMessage = Command::HandleViewport(false).into();
        assert_eq!(msg.to_json().unwrap(), r#"{"method":"handleViewport","optParams":false}"#);
    }
}
