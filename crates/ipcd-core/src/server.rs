//! Server-to-device commands.

use crate::client::{
    DeviceInfo, EventConfiguration, NoReply, ParameterInfoMap, ParameterValues,
    ReportConfiguration,
};
use crate::command::{Command, CommandType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A command issued to a device.
///
/// Serializes with `command` first, followed by the payload's fields.
/// Decoding goes through [`crate::Codec`], which classifies the envelope
/// before committing to a variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command")]
pub enum ServerMessage {
    Download(DownloadCommand),
    FactoryReset(FactoryResetCommand),
    Leave(LeaveCommand),
    Reboot(RebootCommand),
    GetDeviceInfo(GetDeviceInfoCommand),
    SetDeviceInfo(SetDeviceInfoCommand),
    GetEventConfiguration(GetEventConfigurationCommand),
    GetParameterInfo(GetParameterInfoCommand),
    GetParameterValues(GetParameterValuesCommand),
    GetReportConfiguration(GetReportConfigurationCommand),
    SetEventConfiguration(SetEventConfigurationCommand),
    SetParameterValues(SetParameterValuesCommand),
    SetReportConfiguration(SetReportConfigurationCommand),
}

impl ServerMessage {
    pub fn command_type(&self) -> CommandType {
        match self {
            ServerMessage::Download(_) => CommandType::Download,
            ServerMessage::FactoryReset(_) => CommandType::FactoryReset,
            ServerMessage::Leave(_) => CommandType::Leave,
            ServerMessage::Reboot(_) => CommandType::Reboot,
            ServerMessage::GetDeviceInfo(_) => CommandType::GetDeviceInfo,
            ServerMessage::SetDeviceInfo(_) => CommandType::SetDeviceInfo,
            ServerMessage::GetEventConfiguration(_) => CommandType::GetEventConfiguration,
            ServerMessage::GetParameterInfo(_) => CommandType::GetParameterInfo,
            ServerMessage::GetParameterValues(_) => CommandType::GetParameterValues,
            ServerMessage::GetReportConfiguration(_) => CommandType::GetReportConfiguration,
            ServerMessage::SetEventConfiguration(_) => CommandType::SetEventConfiguration,
            ServerMessage::SetParameterValues(_) => CommandType::SetParameterValues,
            ServerMessage::SetReportConfiguration(_) => CommandType::SetReportConfiguration,
        }
    }

    /// Transaction id, if the server assigned one.
    pub fn txnid(&self) -> Option<&str> {
        let txnid = match self {
            ServerMessage::Download(c) => &c.txnid,
            ServerMessage::FactoryReset(c) => &c.txnid,
            ServerMessage::Leave(c) => &c.txnid,
            ServerMessage::Reboot(c) => &c.txnid,
            ServerMessage::GetDeviceInfo(c) => &c.txnid,
            ServerMessage::SetDeviceInfo(c) => &c.txnid,
            ServerMessage::GetEventConfiguration(c) => &c.txnid,
            ServerMessage::GetParameterInfo(c) => &c.txnid,
            ServerMessage::GetParameterValues(c) => &c.txnid,
            ServerMessage::GetReportConfiguration(c) => &c.txnid,
            ServerMessage::SetEventConfiguration(c) => &c.txnid,
            ServerMessage::SetParameterValues(c) => &c.txnid,
            ServerMessage::SetReportConfiguration(c) => &c.txnid,
        };
        txnid.as_deref()
    }
}

/// Download and install firmware from `url`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadCommand {
    pub txnid: Option<String>,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactoryResetCommand {
    pub txnid: Option<String>,
}

/// Forget the server and stop connecting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaveCommand {
    pub txnid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RebootCommand {
    pub txnid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetDeviceInfoCommand {
    pub txnid: Option<String>,
}

/// Overwrite device-level settings such as connection URL or name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetDeviceInfoCommand {
    pub txnid: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetEventConfigurationCommand {
    pub txnid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetParameterInfoCommand {
    pub txnid: Option<String>,
}

/// Read parameters. An empty list asks for all of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetParameterValuesCommand {
    pub txnid: Option<String>,
    #[serde(default)]
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetReportConfigurationCommand {
    pub txnid: Option<String>,
}

/// Choose which events and value changes the device should push.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEventConfigurationCommand {
    pub txnid: Option<String>,
    #[serde(default)]
    pub enabled_events: Vec<String>,
    #[serde(default)]
    pub enabled_value_changes: BTreeMap<String, ValueChangeThreshold>,
}

/// When a parameter change is worth an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChangeThreshold {
    pub on_change: Option<bool>,
    pub on_change_by: Option<f64>,
    /// Fire when the parameter takes this value. Null means unset.
    #[serde(default)]
    pub on_equals: serde_json::Value,
    pub on_less_than: Option<f64>,
    pub on_greater_than: Option<f64>,
}

/// Write parameters. A null value clears the parameter, which only
/// survives the explicit-null encoding profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetParameterValuesCommand {
    pub txnid: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
}

/// Report `parameters` every `interval` seconds. Zero disables reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetReportConfigurationCommand {
    pub txnid: Option<String>,
    pub interval: Option<u32>,
    #[serde(default)]
    pub parameters: Vec<String>,
}

macro_rules! command {
    ($payload:ident => $variant:ident, reply: $reply:ty, fields: [$($field:literal),*]) => {
        impl Command for $payload {
            const TYPE: CommandType = CommandType::$variant;
            const FIELDS: &'static [&'static str] = &["command", $($field),*];
            type Reply = $reply;
        }

        impl From<$payload> for ServerMessage {
            fn from(command: $payload) -> Self {
                ServerMessage::$variant(command)
            }
        }
    };
}

command!(DownloadCommand => Download, reply: NoReply,
    fields: ["txnid", "url", "username", "password"]);
command!(FactoryResetCommand => FactoryReset, reply: NoReply, fields: ["txnid"]);
command!(LeaveCommand => Leave, reply: NoReply, fields: ["txnid"]);
command!(RebootCommand => Reboot, reply: NoReply, fields: ["txnid"]);
command!(GetDeviceInfoCommand => GetDeviceInfo, reply: DeviceInfo, fields: ["txnid"]);
command!(SetDeviceInfoCommand => SetDeviceInfo, reply: NoReply, fields: ["txnid", "values"]);
command!(GetEventConfigurationCommand => GetEventConfiguration, reply: EventConfiguration,
    fields: ["txnid"]);
command!(GetParameterInfoCommand => GetParameterInfo, reply: ParameterInfoMap,
    fields: ["txnid"]);
command!(GetParameterValuesCommand => GetParameterValues, reply: ParameterValues,
    fields: ["txnid", "parameters"]);
command!(GetReportConfigurationCommand => GetReportConfiguration, reply: ReportConfiguration,
    fields: ["txnid"]);
command!(SetEventConfigurationCommand => SetEventConfiguration, reply: NoReply,
    fields: ["txnid", "enabledEvents", "enabledValueChanges"]);
command!(SetParameterValuesCommand => SetParameterValues, reply: NoReply,
    fields: ["txnid", "values"]);
command!(SetReportConfigurationCommand => SetReportConfiguration, reply: NoReply,
    fields: ["txnid", "interval", "parameters"]);
