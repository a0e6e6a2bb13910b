//! The command catalog.
//!
//! Every server-to-device command, and every device response to one, is
//! keyed by a [`CommandType`]. The set is closed: adding an identifier means
//! adding a variant here, a payload in [`crate::server`], and an arm in every
//! exhaustive match that dispatches on it.

use crate::ServerMessage;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier carried in the `command` field of a command envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandType {
    Download,
    FactoryReset,
    Leave,
    Reboot,
    GetDeviceInfo,
    SetDeviceInfo,
    GetEventConfiguration,
    GetParameterInfo,
    GetParameterValues,
    GetReportConfiguration,
    SetEventConfiguration,
    SetParameterValues,
    SetReportConfiguration,
}

impl CommandType {
    /// Number of identifiers in the catalog.
    pub const COUNT: usize = 13;

    /// Every identifier, in declaration order.
    pub const ALL: [CommandType; Self::COUNT] = [
        CommandType::Download,
        CommandType::FactoryReset,
        CommandType::Leave,
        CommandType::Reboot,
        CommandType::GetDeviceInfo,
        CommandType::SetDeviceInfo,
        CommandType::GetEventConfiguration,
        CommandType::GetParameterInfo,
        CommandType::GetParameterValues,
        CommandType::GetReportConfiguration,
        CommandType::SetEventConfiguration,
        CommandType::SetParameterValues,
        CommandType::SetReportConfiguration,
    ];

    /// The wire name, as it appears in the `command` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Download => "Download",
            CommandType::FactoryReset => "FactoryReset",
            CommandType::Leave => "Leave",
            CommandType::Reboot => "Reboot",
            CommandType::GetDeviceInfo => "GetDeviceInfo",
            CommandType::SetDeviceInfo => "SetDeviceInfo",
            CommandType::GetEventConfiguration => "GetEventConfiguration",
            CommandType::GetParameterInfo => "GetParameterInfo",
            CommandType::GetParameterValues => "GetParameterValues",
            CommandType::GetReportConfiguration => "GetReportConfiguration",
            CommandType::SetEventConfiguration => "SetEventConfiguration",
            CommandType::SetParameterValues => "SetParameterValues",
            CommandType::SetReportConfiguration => "SetReportConfiguration",
        }
    }

    /// Position in [`CommandType::ALL`].
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandType {
    type Err = UnknownCommandType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandType::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCommandType(s.to_string()))
    }
}

/// A `command` value outside the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command type: {0}")]
pub struct UnknownCommandType(pub String);

/// A command payload: the parameters of one [`CommandType`].
///
/// Payloads do not carry their own `command` field; the identifier is
/// [`Command::TYPE`] and is written by whoever frames the payload
/// ([`ServerMessage`] or the `request` of a response).
pub trait Command:
    fmt::Debug + Clone + PartialEq + Serialize + DeserializeOwned + Into<ServerMessage>
{
    /// The identifier this payload answers to.
    const TYPE: CommandType;

    /// Canonical wire order of the framed command, `command` first.
    const FIELDS: &'static [&'static str];

    /// Payload the device returns in the `response` field.
    type Reply: fmt::Debug + Clone + PartialEq + Serialize + DeserializeOwned;
}
