//! Envelope inspection.
//!
//! Classification peeks at the discriminator fields of an already-parsed
//! JSON tree and names the message variant it holds. It never decodes the
//! payload; the codec does that afterwards, committing to exactly the
//! variant returned here.
//!
//! A field counts as present when its key exists with a non-null value.

use crate::command::CommandType;
use crate::error::InvalidMessage;
use serde_json::{Map, Value};
use std::fmt;

/// What an envelope turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Server-to-device command.
    Command(CommandType),
    /// Device telemetry.
    Report,
    /// Device event notification.
    Event,
    /// Device reply to a command.
    Response(CommandType),
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Command(c) => write!(f, "{c} command"),
            MessageKind::Report => f.write_str("report"),
            MessageKind::Event => f.write_str("event"),
            MessageKind::Response(c) => write!(f, "{c} response"),
        }
    }
}

/// What a device-originated envelope turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientKind {
    Report,
    Event,
    Response(CommandType),
}

impl From<ClientKind> for MessageKind {
    fn from(kind: ClientKind) -> Self {
        match kind {
            ClientKind::Report => MessageKind::Report,
            ClientKind::Event => MessageKind::Event,
            ClientKind::Response(c) => MessageKind::Response(c),
        }
    }
}

/// Classify a server envelope by its top-level `command`.
pub fn inspect_server(envelope: &Value) -> Result<CommandType, InvalidMessage> {
    let envelope = as_object(envelope)?;
    command_type(field(envelope, "command"), "command")
}

/// Classify a client envelope.
///
/// `device` is required. The markers are checked in priority order:
/// `report`, then `events`, then `request` (whose nested `command` names
/// the response variant).
///
/// A marker whose value is `null` counts as absent, so
/// `{"device":"X","report":null,"events":[]}` is an event. This is stricter
/// than a bare key-presence check and matches how the compact profile
/// never writes null-valued keys.
pub fn inspect_client(envelope: &Value) -> Result<ClientKind, InvalidMessage> {
    let envelope = as_object(envelope)?;
    if field(envelope, "device").is_none() {
        return Err(InvalidMessage::MissingField("device"));
    }
    if field(envelope, "report").is_some() {
        return Ok(ClientKind::Report);
    }
    if field(envelope, "events").is_some() {
        return Ok(ClientKind::Event);
    }
    match field(envelope, "request") {
        Some(request) => {
            let nested = request.get("command").filter(|v| !v.is_null());
            command_type(nested, "request.command").map(ClientKind::Response)
        }
        None => Err(InvalidMessage::NoClientMarker),
    }
}

/// Classify an envelope of either direction.
///
/// A top-level `command` makes it a server message, and an unrecognized
/// value there is an error rather than a reason to try the client shape.
pub fn classify(envelope: &Value) -> Result<MessageKind, InvalidMessage> {
    let object = as_object(envelope)?;
    let kind = if field(object, "command").is_some() {
        inspect_server(envelope).map(MessageKind::Command)
    } else {
        inspect_client(envelope).map(MessageKind::from)
    };
    tracing::trace!(?kind, "classified envelope");
    kind
}

fn as_object(envelope: &Value) -> Result<&Map<String, Value>, InvalidMessage> {
    envelope.as_object().ok_or(InvalidMessage::NotAnObject)
}

fn field<'a>(envelope: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    envelope.get(name).filter(|v| !v.is_null())
}

fn command_type(value: Option<&Value>, key: &'static str) -> Result<CommandType, InvalidMessage> {
    let value = value.ok_or(InvalidMessage::MissingField(key))?;
    let name = value.as_str().ok_or(InvalidMessage::NotAString(key))?;
    name.parse()
        .map_err(|_| InvalidMessage::UnknownCommand(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_command() {
        let kind = inspect_server(&json!({"command": "Reboot"})).unwrap();
        assert_eq!(kind, CommandType::Reboot);
    }

    #[test]
    fn server_unknown_command() {
        let err = inspect_server(&json!({"command": "NotARealCommand", "txnid": "1"})).unwrap_err();
        assert_eq!(err, InvalidMessage::UnknownCommand("NotARealCommand".into()));
    }

    #[test]
    fn server_missing_command() {
        assert_eq!(
            inspect_server(&json!({"txnid": "1"})).unwrap_err(),
            InvalidMessage::MissingField("command")
        );
        assert_eq!(
            inspect_server(&json!({"command": null})).unwrap_err(),
            InvalidMessage::MissingField("command")
        );
    }

    #[test]
    fn server_command_not_a_string() {
        assert_eq!(
            inspect_server(&json!({"command": 3})).unwrap_err(),
            InvalidMessage::NotAString("command")
        );
    }

    #[test]
    fn not_an_object() {
        assert_eq!(inspect_server(&json!(["Reboot"])).unwrap_err(), InvalidMessage::NotAnObject);
        assert_eq!(inspect_client(&json!("X")).unwrap_err(), InvalidMessage::NotAnObject);
        assert_eq!(classify(&json!(null)).unwrap_err(), InvalidMessage::NotAnObject);
    }

    #[test]
    fn client_markers() {
        assert_eq!(
            inspect_client(&json!({"device": "X", "report": {}})).unwrap(),
            ClientKind::Report
        );
        assert_eq!(
            inspect_client(&json!({"device": "X", "events": []})).unwrap(),
            ClientKind::Event
        );
        assert_eq!(
            inspect_client(&json!({"device": "X", "request": {"command": "Reboot"}})).unwrap(),
            ClientKind::Response(CommandType::Reboot)
        );
    }

    #[test]
    fn report_wins_over_other_markers() {
        let envelope = json!({
            "device": "X",
            "request": {"command": "Reboot"},
            "events": ["Boot"],
            "report": {"temp": 21}
        });
        assert_eq!(inspect_client(&envelope).unwrap(), ClientKind::Report);
    }

    #[test]
    fn events_win_over_request() {
        let envelope = json!({"device": "X", "request": {"command": "Reboot"}, "events": []});
        assert_eq!(inspect_client(&envelope).unwrap(), ClientKind::Event);
    }

    #[test]
    fn null_marker_falls_through() {
        let envelope = json!({"device": "X", "report": null, "events": ["Boot"]});
        assert_eq!(inspect_client(&envelope).unwrap(), ClientKind::Event);

        let envelope = json!({"device": "X", "report": null, "events": null, "request": {"command": "Leave"}});
        assert_eq!(
            inspect_client(&envelope).unwrap(),
            ClientKind::Response(CommandType::Leave)
        );
        assert_eq!(
            inspect_client(&json!({"device": null, "report": {}})).unwrap_err(),
            InvalidMessage::MissingField("device")
        );
    }

    #[test]
    fn client_without_marker() {
        assert_eq!(
            inspect_client(&json!({"device": "X"})).unwrap_err(),
            InvalidMessage::NoClientMarker
        );
        assert_eq!(
            inspect_client(&json!({"device": "X", "report": null})).unwrap_err(),
            InvalidMessage::NoClientMarker
        );
    }

    #[test]
    fn client_without_device() {
        assert_eq!(
            inspect_client(&json!({"report": {}})).unwrap_err(),
            InvalidMessage::MissingField("device")
        );
    }

    #[test]
    fn request_without_nested_command() {
        assert_eq!(
            inspect_client(&json!({"device": "X", "request": {}})).unwrap_err(),
            InvalidMessage::MissingField("request.command")
        );
        assert_eq!(
            inspect_client(&json!({"device": "X", "request": "Reboot"})).unwrap_err(),
            InvalidMessage::MissingField("request.command")
        );
        assert_eq!(
            inspect_client(&json!({"device": "X", "request": {"command": false}})).unwrap_err(),
            InvalidMessage::NotAString("request.command")
        );
    }

    #[test]
    fn request_with_unknown_command() {
        assert_eq!(
            inspect_client(&json!({"device": "X", "request": {"command": "Explode"}})).unwrap_err(),
            InvalidMessage::UnknownCommand("Explode".into())
        );
    }

    #[test]
    fn classify_prefers_command() {
        assert_eq!(
            classify(&json!({"command": "Leave", "device": "X", "report": {}})).unwrap(),
            MessageKind::Command(CommandType::Leave)
        );
        assert_eq!(
            classify(&json!({"command": "Nope", "device": "X", "report": {}})).unwrap_err(),
            InvalidMessage::UnknownCommand("Nope".into())
        );
        assert_eq!(
            classify(&json!({"device": "X", "events": []})).unwrap(),
            MessageKind::Event
        );
    }

    #[test]
    fn kind_display() {
        assert_eq!(MessageKind::Command(CommandType::Reboot).to_string(), "Reboot command");
        assert_eq!(
            MessageKind::Response(CommandType::GetDeviceInfo).to_string(),
            "GetDeviceInfo response"
        );
    }
}
