//! Per-command decoders and field orders.
//!
//! The registry is built once and never mutated. Each [`CommandType`] maps
//! to the decoders for its command and response shapes and to the field
//! orders both are written in. Construction goes through an exhaustive
//! match, so a catalog entry without a payload type does not compile.

use crate::client::{EventAction, ReportAction, Response, ResponseMessage};
use crate::command::{Command, CommandType};
use crate::envelope::MessageKind;
use crate::order::{FieldOrder, Profile};
use crate::server::{
    DownloadCommand, FactoryResetCommand, GetDeviceInfoCommand, GetEventConfigurationCommand,
    GetParameterInfoCommand, GetParameterValuesCommand, GetReportConfigurationCommand,
    LeaveCommand, RebootCommand, ServerMessage, SetDeviceInfoCommand,
    SetEventConfigurationCommand, SetParameterValuesCommand, SetReportConfigurationCommand,
};
use serde_json::Value;

type DecodeCommand = fn(Value) -> Result<ServerMessage, serde_json::Error>;
type DecodeResponse = fn(Value) -> Result<ResponseMessage, serde_json::Error>;

/// Everything the codec knows about one command.
#[derive(Debug, Clone, Copy)]
pub struct CommandEntry {
    pub command: CommandType,
    /// Order of the command envelope, also used for a response's nested `request`.
    pub command_order: FieldOrder,
    /// Order of the response envelope.
    pub response_order: FieldOrder,
    decode_command: DecodeCommand,
    decode_response: DecodeResponse,
}

impl CommandEntry {
    fn of<C: Command>() -> Self
    where
        ResponseMessage: From<Response<C>>,
    {
        Self {
            command: C::TYPE,
            command_order: FieldOrder::new(C::FIELDS),
            response_order: FieldOrder::new(Response::<C>::FIELDS),
            decode_command: decode_command::<C>,
            decode_response: decode_response::<C>,
        }
    }

    fn for_command(command: CommandType) -> Self {
        match command {
            CommandType::Download => Self::of::<DownloadCommand>(),
            CommandType::FactoryReset => Self::of::<FactoryResetCommand>(),
            CommandType::Leave => Self::of::<LeaveCommand>(),
            CommandType::Reboot => Self::of::<RebootCommand>(),
            CommandType::GetDeviceInfo => Self::of::<GetDeviceInfoCommand>(),
            CommandType::SetDeviceInfo => Self::of::<SetDeviceInfoCommand>(),
            CommandType::GetEventConfiguration => Self::of::<GetEventConfigurationCommand>(),
            CommandType::GetParameterInfo => Self::of::<GetParameterInfoCommand>(),
            CommandType::GetParameterValues => Self::of::<GetParameterValuesCommand>(),
            CommandType::GetReportConfiguration => Self::of::<GetReportConfigurationCommand>(),
            CommandType::SetEventConfiguration => Self::of::<SetEventConfigurationCommand>(),
            CommandType::SetParameterValues => Self::of::<SetParameterValuesCommand>(),
            CommandType::SetReportConfiguration => Self::of::<SetReportConfigurationCommand>(),
        }
    }

    /// Decode a command envelope already classified as this command.
    pub fn decode_command(&self, envelope: Value) -> Result<ServerMessage, serde_json::Error> {
        (self.decode_command)(envelope)
    }

    /// Decode a response envelope whose `request.command` names this command.
    pub fn decode_response(&self, envelope: Value) -> Result<ResponseMessage, serde_json::Error> {
        (self.decode_response)(envelope)
    }
}

fn decode_command<C: Command>(envelope: Value) -> Result<ServerMessage, serde_json::Error> {
    serde_json::from_value::<C>(envelope).map(Into::into)
}

fn decode_response<C: Command>(envelope: Value) -> Result<ResponseMessage, serde_json::Error>
where
    ResponseMessage: From<Response<C>>,
{
    serde_json::from_value::<Response<C>>(envelope).map(Into::into)
}

/// Immutable lookup from message kind to decoder and field order.
#[derive(Debug, Clone)]
pub struct Registry {
    commands: [CommandEntry; CommandType::COUNT],
    report_order: FieldOrder,
    event_order: FieldOrder,
}

impl Registry {
    /// Build the registry for the whole command catalog.
    pub fn new() -> Self {
        Self {
            commands: CommandType::ALL.map(CommandEntry::for_command),
            report_order: FieldOrder::new(ReportAction::FIELDS),
            event_order: FieldOrder::new(EventAction::FIELDS),
        }
    }

    /// The entry for `command`. Every catalog member has one.
    pub fn entry(&self, command: CommandType) -> &CommandEntry {
        &self.commands[command.index()]
    }

    /// All entries, in catalog order.
    pub fn entries(&self) -> impl Iterator<Item = &CommandEntry> {
        self.commands.iter()
    }

    /// The order `kind` is written in.
    pub fn field_order(&self, kind: MessageKind) -> FieldOrder {
        match kind {
            MessageKind::Command(c) => self.entry(c).command_order,
            MessageKind::Response(c) => self.entry(c).response_order,
            MessageKind::Report => self.report_order,
            MessageKind::Event => self.event_order,
        }
    }

    /// Rewrite `value` in the canonical order of `kind` under `profile`.
    ///
    /// A response's nested `request` is arranged in the order of the
    /// command it echoes.
    pub fn arrange(&self, kind: MessageKind, value: Value, profile: Profile) -> Value {
        let mut value = self.field_order(kind).arrange(value, profile);
        if let MessageKind::Response(command) = kind {
            if let Some(request) = value.get_mut("request") {
                let nested = request.take();
                *request = self.entry(command).command_order.arrange(nested, profile);
            }
        }
        value
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entries_follow_catalog() {
        let registry = Registry::new();
        for command in CommandType::ALL {
            assert_eq!(registry.entry(command).command, command);
        }
        assert_eq!(registry.entries().count(), CommandType::COUNT);
    }

    #[test]
    fn every_command_order_starts_with_command() {
        let registry = Registry::new();
        for entry in registry.entries() {
            assert_eq!(entry.command_order.fields()[0], "command", "{:?}", entry.command);
            assert_eq!(entry.response_order.fields()[0], "device", "{:?}", entry.command);
        }
    }

    #[test]
    fn field_order_by_kind() {
        let registry = Registry::new();
        assert_eq!(
            registry.field_order(MessageKind::Command(CommandType::SetReportConfiguration)).fields(),
            &["command", "txnid", "interval", "parameters"]
        );
        assert_eq!(
            registry.field_order(MessageKind::Event).fields(),
            &["device", "events", "valueChanges", "timestamp"]
        );
        assert_eq!(
            registry.field_order(MessageKind::Report).fields(),
            &["device", "report", "timestamp"]
        );
    }

    #[test]
    fn nested_request_is_rearranged() {
        let registry = Registry::new();
        let kind = MessageKind::Response(CommandType::Download);
        let scrambled = json!({
            "timestamp": 1,
            "request": {"url": "http://fw/x.bin", "txnid": null, "command": "Download"},
            "device": "X",
        });

        let compact = registry.arrange(kind, scrambled.clone(), Profile::Compact);
        let request: Vec<&String> = compact["request"].as_object().unwrap().keys().collect();
        assert_eq!(request, ["command", "url"]);

        let explicit = registry.arrange(kind, scrambled, Profile::ExplicitNull);
        let request: Vec<&String> = explicit["request"].as_object().unwrap().keys().collect();
        assert_eq!(request, DownloadCommand::FIELDS);
        let outer: Vec<&String> = explicit.as_object().unwrap().keys().collect();
        assert_eq!(outer, ["device", "request", "status", "response", "timestamp"]);
    }

    #[test]
    fn non_response_kinds_leave_request_alone() {
        let registry = Registry::new();
        let value = registry.arrange(
            MessageKind::Report,
            json!({"report": {"b": 1, "a": 2}, "device": "X"}),
            Profile::Compact,
        );
        let report: Vec<&String> = value["report"].as_object().unwrap().keys().collect();
        assert_eq!(report, ["b", "a"]);
    }

    #[test]
    fn decoders_are_keyed_by_command() {
        let registry = Registry::new();
        let msg = registry
            .entry(CommandType::GetParameterValues)
            .decode_command(json!({"command": "GetParameterValues", "parameters": ["temp"]}))
            .unwrap();
        assert_eq!(
            msg,
            ServerMessage::GetParameterValues(GetParameterValuesCommand {
                txnid: None,
                parameters: vec!["temp".into()],
            })
        );

        let response = registry
            .entry(CommandType::Leave)
            .decode_response(json!({"device": "X", "request": {"command": "Leave"}}))
            .unwrap();
        assert_eq!(response.command_type(), CommandType::Leave);
    }
}
