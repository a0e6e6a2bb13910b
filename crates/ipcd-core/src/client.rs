//! Device-to-server messages: reports, events, and command responses.

use crate::command::{Command, CommandType};
use crate::device::{Device, Status};
use crate::envelope::MessageKind;
use crate::server::{
    DownloadCommand, FactoryResetCommand, GetDeviceInfoCommand, GetEventConfigurationCommand,
    GetParameterInfoCommand, GetParameterValuesCommand, GetReportConfigurationCommand,
    LeaveCommand, RebootCommand, SetDeviceInfoCommand, SetEventConfigurationCommand,
    SetParameterValuesCommand, SetReportConfigurationCommand, ValueChangeThreshold,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A message sent by a device.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClientMessage {
    /// Periodic telemetry.
    Report(ReportAction),
    /// Asynchronous event notification.
    Event(EventAction),
    /// Reply to an earlier command.
    Response(ResponseMessage),
}

impl ClientMessage {
    /// The device that sent the message.
    pub fn device(&self) -> &Device {
        match self {
            ClientMessage::Report(r) => &r.device,
            ClientMessage::Event(e) => &e.device,
            ClientMessage::Response(r) => r.device(),
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            ClientMessage::Report(_) => MessageKind::Report,
            ClientMessage::Event(_) => MessageKind::Event,
            ClientMessage::Response(r) => MessageKind::Response(r.command_type()),
        }
    }
}

impl From<ReportAction> for ClientMessage {
    fn from(report: ReportAction) -> Self {
        ClientMessage::Report(report)
    }
}

impl From<EventAction> for ClientMessage {
    fn from(event: EventAction) -> Self {
        ClientMessage::Event(event)
    }
}

impl From<ResponseMessage> for ClientMessage {
    fn from(response: ResponseMessage) -> Self {
        ClientMessage::Response(response)
    }
}

impl<C: Command> From<Response<C>> for ClientMessage
where
    ResponseMessage: From<Response<C>>,
{
    fn from(response: Response<C>) -> Self {
        ClientMessage::Response(response.into())
    }
}

/// Telemetry pushed by the device, keyed by parameter name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportAction {
    pub device: Device,
    pub report: BTreeMap<String, serde_json::Value>,
    #[serde(default, with = "crate::date::option")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ReportAction {
    pub const FIELDS: &'static [&'static str] = &["device", "report", "timestamp"];
}

/// Events raised by the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAction {
    pub device: Device,
    pub events: Vec<String>,
    #[serde(default)]
    pub value_changes: Vec<ValueChange>,
    #[serde(default, with = "crate::date::option")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl EventAction {
    pub const FIELDS: &'static [&'static str] = &["device", "events", "valueChanges", "timestamp"];
}

/// A parameter change that crossed a configured threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChange {
    pub parameter: String,
    #[serde(default)]
    pub value: serde_json::Value,
    pub threshold_rule: Option<String>,
    /// Null when the rule has no threshold.
    #[serde(default)]
    pub threshold_value: serde_json::Value,
}

/// A device's reply to command `C`.
///
/// `request` echoes the command being answered; on the wire it carries the
/// nested `command` discriminator ahead of the command's own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Response<C: Command> {
    pub device: Device,
    #[serde(with = "request")]
    pub request: C,
    pub status: Option<Status>,
    pub response: Option<C::Reply>,
    #[serde(default, with = "crate::date::option")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl<C: Command> Response<C> {
    pub const FIELDS: &'static [&'static str] =
        &["device", "request", "status", "response", "timestamp"];

    /// A response echoing `request`, with no reply payload or timestamp.
    pub fn new(device: Device, request: C, status: Status) -> Self {
        Self {
            device,
            request,
            status: Some(status),
            response: None,
            timestamp: None,
        }
    }

    /// Attach the reply payload.
    pub fn with_reply(mut self, reply: C::Reply) -> Self {
        self.response = Some(reply);
        self
    }

    /// Stamp the response with the time the device produced it.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

mod request {
    use crate::command::Command;
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::{Map, Value};

    pub fn serialize<C: Command, S: Serializer>(command: &C, serializer: S) -> Result<S::Ok, S::Error> {
        let Value::Object(fields) = serde_json::to_value(command).map_err(S::Error::custom)? else {
            return Err(S::Error::custom("command payload must serialize as an object"));
        };
        let mut framed = Map::with_capacity(fields.len() + 1);
        framed.insert("command".into(), Value::String(C::TYPE.as_str().into()));
        framed.extend(fields);
        framed.serialize(serializer)
    }

    pub fn deserialize<'de, C: Command, D: Deserializer<'de>>(deserializer: D) -> Result<C, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match value.get("command").and_then(Value::as_str) {
            Some(name) if name == C::TYPE.as_str() => {}
            other => {
                return Err(D::Error::custom(format!(
                    "expected request.command {}, found {:?}",
                    C::TYPE,
                    other
                )));
            }
        }
        C::deserialize(value).map_err(D::Error::custom)
    }
}

/// Reply payload of commands that return nothing beyond a status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoReply {}

/// Reply to `GetDeviceInfo`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub fwver: String,
    pub connection: String,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub commands: Vec<String>,
    /// Seconds since boot.
    pub uptime: Option<u64>,
}

/// Reply to `GetEventConfiguration`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventConfiguration {
    #[serde(default)]
    pub supported_events: Vec<String>,
    #[serde(default)]
    pub enabled_events: Vec<String>,
    #[serde(default)]
    pub supported_value_changes: Vec<String>,
    #[serde(default)]
    pub enabled_value_changes: BTreeMap<String, ValueChangeThreshold>,
}

/// Reply to `GetParameterInfo`, keyed by parameter name.
pub type ParameterInfoMap = BTreeMap<String, ParameterInfo>;

/// Reply to `GetParameterValues`, keyed by parameter name.
pub type ParameterValues = BTreeMap<String, serde_json::Value>;

/// Description of one device parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    #[serde(rename = "type")]
    pub kind: String,
    /// Access mode: `r`, `w` or `rw`.
    pub attrib: String,
    pub unit: Option<String>,
    pub floor: Option<f64>,
    pub ceiling: Option<f64>,
    pub description: Option<String>,
    #[serde(default)]
    pub enumvalues: Vec<String>,
}

/// Reply to `GetReportConfiguration`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportConfiguration {
    pub interval: u32,
    #[serde(default)]
    pub parameters: Vec<String>,
}

pub type DownloadResponse = Response<DownloadCommand>;
pub type FactoryResetResponse = Response<FactoryResetCommand>;
pub type LeaveResponse = Response<LeaveCommand>;
pub type RebootResponse = Response<RebootCommand>;
pub type GetDeviceInfoResponse = Response<GetDeviceInfoCommand>;
pub type SetDeviceInfoResponse = Response<SetDeviceInfoCommand>;
pub type GetEventConfigurationResponse = Response<GetEventConfigurationCommand>;
pub type GetParameterInfoResponse = Response<GetParameterInfoCommand>;
pub type GetParameterValuesResponse = Response<GetParameterValuesCommand>;
pub type GetReportConfigurationResponse = Response<GetReportConfigurationCommand>;
pub type SetEventConfigurationResponse = Response<SetEventConfigurationCommand>;
pub type SetParameterValuesResponse = Response<SetParameterValuesCommand>;
pub type SetReportConfigurationResponse = Response<SetReportConfigurationCommand>;

/// A response to any command, one variant per [`CommandType`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseMessage {
    Download(DownloadResponse),
    FactoryReset(FactoryResetResponse),
    Leave(LeaveResponse),
    Reboot(RebootResponse),
    GetDeviceInfo(GetDeviceInfoResponse),
    SetDeviceInfo(SetDeviceInfoResponse),
    GetEventConfiguration(GetEventConfigurationResponse),
    GetParameterInfo(GetParameterInfoResponse),
    GetParameterValues(GetParameterValuesResponse),
    GetReportConfiguration(GetReportConfigurationResponse),
    SetEventConfiguration(SetEventConfigurationResponse),
    SetParameterValues(SetParameterValuesResponse),
    SetReportConfiguration(SetReportConfigurationResponse),
}

macro_rules! each_response {
    ($msg:expr, $r:ident => $body:expr) => {
        match $msg {
            ResponseMessage::Download($r) => $body,
            ResponseMessage::FactoryReset($r) => $body,
            ResponseMessage::Leave($r) => $body,
            ResponseMessage::Reboot($r) => $body,
            ResponseMessage::GetDeviceInfo($r) => $body,
            ResponseMessage::SetDeviceInfo($r) => $body,
            ResponseMessage::GetEventConfiguration($r) => $body,
            ResponseMessage::GetParameterInfo($r) => $body,
            ResponseMessage::GetParameterValues($r) => $body,
            ResponseMessage::GetReportConfiguration($r) => $body,
            ResponseMessage::SetEventConfiguration($r) => $body,
            ResponseMessage::SetParameterValues($r) => $body,
            ResponseMessage::SetReportConfiguration($r) => $body,
        }
    };
}

impl ResponseMessage {
    pub fn command_type(&self) -> CommandType {
        fn of<C: Command>(_: &Response<C>) -> CommandType {
            C::TYPE
        }
        each_response!(self, r => of(r))
    }

    pub fn device(&self) -> &Device {
        each_response!(self, r => &r.device)
    }

    pub fn status(&self) -> Option<&Status> {
        each_response!(self, r => r.status.as_ref())
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        each_response!(self, r => r.timestamp)
    }
}

macro_rules! response_from {
    ($($variant:ident => $command:ty),* $(,)?) => {
        $(
            impl From<Response<$command>> for ResponseMessage {
                fn from(response: Response<$command>) -> Self {
                    ResponseMessage::$variant(response)
                }
            }
        )*
    };
}

response_from!(
    Download => DownloadCommand,
    FactoryReset => FactoryResetCommand,
    Leave => LeaveCommand,
    Reboot => RebootCommand,
    GetDeviceInfo => GetDeviceInfoCommand,
    SetDeviceInfo => SetDeviceInfoCommand,
    GetEventConfiguration => GetEventConfigurationCommand,
    GetParameterInfo => GetParameterInfoCommand,
    GetParameterValues => GetParameterValuesCommand,
    GetReportConfiguration => GetReportConfigurationCommand,
    SetEventConfiguration => SetEventConfigurationCommand,
    SetParameterValues => SetParameterValuesCommand,
    SetReportConfiguration => SetReportConfigurationCommand,
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plug() -> Device {
        Device::new("Acme", "Plug", "A1", "1.0")
    }

    #[test]
    fn request_carries_command_first() {
        let response = RebootResponse::new(
            plug(),
            RebootCommand {
                txnid: Some("9".into()),
            },
            Status::success(),
        );
        let json = serde_json::to_string(&response).unwrap();
        assert!(
            json.contains(r#""request":{"command":"Reboot","txnid":"9"}"#),
            "{json}"
        );
    }

    #[test]
    fn request_command_must_match_payload() {
        let err = serde_json::from_value::<RebootResponse>(json!({
            "device": "A1",
            "request": {"command": "Leave"}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("expected request.command Reboot"), "{err}");
    }

    #[test]
    fn reply_payload_is_typed() {
        let response: GetReportConfigurationResponse = serde_json::from_value(json!({
            "device": {"vendor": "Acme", "model": "Plug", "sn": "A1", "ipcdver": "1.0"},
            "request": {"command": "GetReportConfiguration", "txnid": "2"},
            "status": {"result": "success", "messages": []},
            "response": {"interval": 60, "parameters": ["temp", "rssi"]}
        }))
        .unwrap();
        assert_eq!(
            response.response,
            Some(ReportConfiguration {
                interval: 60,
                parameters: vec!["temp".into(), "rssi".into()],
            })
        );
        assert!(response.status.unwrap().is_success());
    }

    #[test]
    fn response_message_accessors() {
        let at = crate::date::from_wire(1_000).unwrap();
        let msg = ResponseMessage::from(
            LeaveResponse::new(plug(), LeaveCommand::default(), Status::fail("busy")).at(at),
        );
        assert_eq!(msg.command_type(), CommandType::Leave);
        assert_eq!(msg.device(), &plug());
        assert_eq!(msg.status().unwrap().messages, vec!["busy".to_string()]);
        assert_eq!(msg.timestamp(), Some(at));
    }

    #[test]
    fn client_message_kind() {
        let report = ClientMessage::from(ReportAction {
            device: plug(),
            report: ParameterValues::new(),
            timestamp: None,
        });
        assert_eq!(report.kind(), MessageKind::Report);

        let response = ClientMessage::from(GetDeviceInfoResponse::new(
            plug(),
            GetDeviceInfoCommand::default(),
            Status::success(),
        ));
        assert_eq!(response.kind(), MessageKind::Response(CommandType::GetDeviceInfo));
        assert_eq!(response.device().sn, "A1");
    }

    #[test]
    fn value_change_defaults() {
        let change: ValueChange = serde_json::from_value(json!({"parameter": "temp"})).unwrap();
        assert_eq!(change.value, serde_json::Value::Null);
        assert_eq!(change.threshold_rule, None);
        assert_eq!(change.threshold_value, serde_json::Value::Null);
    }

    #[test]
    fn no_reply_is_empty_object() {
        assert_eq!(serde_json::to_string(&NoReply {}).unwrap(), "{}");
    }
}
