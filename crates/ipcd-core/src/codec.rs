//! The public codec.

use crate::client::{ClientMessage, EventAction, ReportAction, Response, ResponseMessage};
use crate::command::Command;
use crate::envelope::{self, ClientKind, MessageKind};
use crate::error::CodecError;
use crate::order::Profile;
use crate::registry::Registry;
use crate::server::ServerMessage;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::io;
use std::sync::LazyLock;

static SHARED: LazyLock<Codec> = LazyLock::new(Codec::new);

/// A message the codec can write in canonical field order.
pub trait WireMessage: Serialize {
    fn kind(&self) -> MessageKind;
}

impl WireMessage for ServerMessage {
    fn kind(&self) -> MessageKind {
        MessageKind::Command(self.command_type())
    }
}

impl WireMessage for ClientMessage {
    fn kind(&self) -> MessageKind {
        ClientMessage::kind(self)
    }
}

impl WireMessage for ResponseMessage {
    fn kind(&self) -> MessageKind {
        MessageKind::Response(self.command_type())
    }
}

impl<C: Command> WireMessage for Response<C> {
    fn kind(&self) -> MessageKind {
        MessageKind::Response(C::TYPE)
    }
}

impl WireMessage for ReportAction {
    fn kind(&self) -> MessageKind {
        MessageKind::Report
    }
}

impl WireMessage for EventAction {
    fn kind(&self) -> MessageKind {
        MessageKind::Event
    }
}

/// Translates between JSON text and typed protocol messages.
///
/// Holds only the immutable [`Registry`], so one instance can serve any
/// number of threads. [`Codec::shared`] returns a process-wide instance.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    registry: Registry,
}

impl Codec {
    /// A codec with its own registry. Prefer [`Codec::shared`].
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    /// The process-wide codec, built on first use.
    pub fn shared() -> &'static Codec {
        &SHARED
    }

    /// Decoders and field orders this codec dispatches through.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Decode a value whose shape the caller already knows.
    pub fn decode<T: DeserializeOwned>(&self, json: &str) -> Result<T, CodecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// [`Codec::decode`] over a byte stream.
    pub fn decode_reader<T: DeserializeOwned, R: io::Read>(
        &self,
        reader: R,
    ) -> Result<T, CodecError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Decode a command sent to a device.
    pub fn decode_server_message(&self, json: &str) -> Result<ServerMessage, CodecError> {
        self.server_message_from_value(serde_json::from_str(json)?)
    }

    /// [`Codec::decode_server_message`] over a byte stream.
    pub fn decode_server_message_reader<R: io::Read>(
        &self,
        reader: R,
    ) -> Result<ServerMessage, CodecError> {
        self.server_message_from_value(serde_json::from_reader(reader)?)
    }

    /// Classify and decode an already parsed command envelope.
    pub fn server_message_from_value(&self, envelope: Value) -> Result<ServerMessage, CodecError> {
        let command = envelope::inspect_server(&envelope)?;
        tracing::debug!(%command, "decoding server message");
        Ok(self.registry.entry(command).decode_command(envelope)?)
    }

    /// Decode a report, event or response sent by a device.
    pub fn decode_client_message(&self, json: &str) -> Result<ClientMessage, CodecError> {
        self.client_message_from_value(serde_json::from_str(json)?)
    }

    /// [`Codec::decode_client_message`] over a byte stream.
    pub fn decode_client_message_reader<R: io::Read>(
        &self,
        reader: R,
    ) -> Result<ClientMessage, CodecError> {
        self.client_message_from_value(serde_json::from_reader(reader)?)
    }

    /// Classify and decode an already parsed device envelope.
    pub fn client_message_from_value(&self, envelope: Value) -> Result<ClientMessage, CodecError> {
        let kind = envelope::inspect_client(&envelope)?;
        tracing::debug!(?kind, "decoding client message");
        let message = match kind {
            ClientKind::Report => ClientMessage::Report(serde_json::from_value(envelope)?),
            ClientKind::Event => ClientMessage::Event(serde_json::from_value(envelope)?),
            ClientKind::Response(command) => {
                ClientMessage::Response(self.registry.entry(command).decode_response(envelope)?)
            }
        };
        Ok(message)
    }

    /// Name the message variant held by `json` without decoding it.
    pub fn classify(&self, json: &str) -> Result<MessageKind, CodecError> {
        let envelope: Value = serde_json::from_str(json)?;
        Ok(envelope::classify(&envelope)?)
    }

    /// Encode with null fields omitted.
    pub fn encode<M: WireMessage>(&self, message: &M) -> Result<String, CodecError> {
        self.encode_with(message, Profile::Compact)
    }

    /// Encode with every declared field present, absent values as null.
    pub fn encode_with_explicit_nulls<M: WireMessage>(
        &self,
        message: &M,
    ) -> Result<String, CodecError> {
        self.encode_with(message, Profile::ExplicitNull)
    }

    /// Encode under an explicit [`Profile`].
    pub fn encode_with<M: WireMessage>(
        &self,
        message: &M,
        profile: Profile,
    ) -> Result<String, CodecError> {
        Ok(serde_json::to_string(&self.to_value(message, profile)?)?)
    }

    /// The canonical JSON tree `message` is written as.
    pub fn to_value<M: WireMessage>(
        &self,
        message: &M,
        profile: Profile,
    ) -> Result<Value, CodecError> {
        let kind = message.kind();
        tracing::trace!(%kind, ?profile, "encoding message");
        let value = serde_json::to_value(message)?;
        Ok(self.registry.arrange(kind, value, profile))
    }
}
