//! Wire codec for the IPCD device-management protocol.
//!
//! Servers send commands to constrained devices; devices send back
//! responses, reports and events. Everything travels as JSON objects.
//! This crate classifies raw envelopes, decodes them into typed messages,
//! and writes messages back out with a fixed per-variant field order that
//! devices without a real JSON parser can rely on.
//!
//! ```
//! use ipcd_core::{Codec, ServerMessage, RebootCommand};
//!
//! let codec = Codec::shared();
//! let msg = codec.decode_server_message(r#"{"txnid":"1","command":"Reboot"}"#)?;
//! assert_eq!(msg, ServerMessage::Reboot(RebootCommand { txnid: Some("1".into()) }));
//! assert_eq!(codec.encode(&msg)?, r#"{"command":"Reboot","txnid":"1"}"#);
//! # Ok::<(), ipcd_core::CodecError>(())
//! ```

mod client;
mod codec;
mod command;
pub mod date;
mod device;
pub mod envelope;
mod error;
mod order;
mod registry;
mod server;

pub use client::{
    ClientMessage, DeviceInfo, DownloadResponse, EventAction, EventConfiguration,
    FactoryResetResponse, GetDeviceInfoResponse, GetEventConfigurationResponse,
    GetParameterInfoResponse, GetParameterValuesResponse, GetReportConfigurationResponse,
    LeaveResponse, NoReply, ParameterInfo, ParameterInfoMap, ParameterValues, RebootResponse,
    ReportAction, ReportConfiguration, Response, ResponseMessage, SetDeviceInfoResponse,
    SetEventConfigurationResponse, SetParameterValuesResponse, SetReportConfigurationResponse,
    ValueChange,
};
pub use codec::{Codec, WireMessage};
pub use command::{Command, CommandType, UnknownCommandType};
pub use device::{Device, Status, StatusResult};
pub use envelope::{ClientKind, MessageKind};
pub use error::{CodecError, InvalidMessage};
pub use order::{FieldOrder, Profile};
pub use registry::{CommandEntry, Registry};
pub use server::{
    DownloadCommand, FactoryResetCommand, GetDeviceInfoCommand, GetEventConfigurationCommand,
    GetParameterInfoCommand, GetParameterValuesCommand, GetReportConfigurationCommand,
    LeaveCommand, RebootCommand, ServerMessage, SetDeviceInfoCommand,
    SetEventConfigurationCommand, SetParameterValuesCommand, SetReportConfigurationCommand,
    ValueChangeThreshold,
};
