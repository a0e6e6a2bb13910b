//! Device identity and command status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity block every device-originated message carries in `device`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "DeviceRepr")]
pub struct Device {
    pub vendor: String,
    pub model: String,
    /// Serial number.
    pub sn: String,
    /// Protocol version the device speaks.
    pub ipcdver: String,
}

impl Device {
    /// A fully identified device.
    pub fn new(
        vendor: impl Into<String>,
        model: impl Into<String>,
        sn: impl Into<String>,
        ipcdver: impl Into<String>,
    ) -> Self {
        Self {
            vendor: vendor.into(),
            model: model.into(),
            sn: sn.into(),
            ipcdver: ipcdver.into(),
        }
    }

    /// A device known only by serial number.
    pub fn serial(sn: impl Into<String>) -> Self {
        Self {
            sn: sn.into(),
            ..Self::default()
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.vendor, self.model, self.sn)
    }
}

// Minimal firmware may send a bare serial string instead of the full block.
#[derive(Deserialize)]
#[serde(untagged)]
enum DeviceRepr {
    Serial(String),
    Full {
        #[serde(default)]
        vendor: String,
        #[serde(default)]
        model: String,
        #[serde(default)]
        sn: String,
        #[serde(default)]
        ipcdver: String,
    },
}

impl From<DeviceRepr> for Device {
    fn from(repr: DeviceRepr) -> Self {
        match repr {
            DeviceRepr::Serial(sn) => Device::serial(sn),
            DeviceRepr::Full {
                vendor,
                model,
                sn,
                ipcdver,
            } => Device {
                vendor,
                model,
                sn,
                ipcdver,
            },
        }
    }
}

/// Outcome of a command, reported in a response's `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub result: StatusResult,
    #[serde(default)]
    pub messages: Vec<String>,
}

impl Status {
    /// A successful status with no messages.
    pub fn success() -> Self {
        Self {
            result: StatusResult::Success,
            messages: Vec::new(),
        }
    }

    /// A failed status carrying one human-readable message.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            result: StatusResult::Fail,
            messages: vec![message.into()],
        }
    }

    /// Whether the device reported `success`.
    pub fn is_success(&self) -> bool {
        self.result == StatusResult::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusResult {
    Success,
    Fail,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_device_block() {
        let d: Device = serde_json::from_str(
            r#"{"vendor":"Acme","model":"Plug","sn":"123","ipcdver":"1.0"}"#,
        )
        .unwrap();
        assert_eq!(d, Device::new("Acme", "Plug", "123", "1.0"));
        assert_eq!(d.to_string(), "Acme-Plug-123");
    }

    #[test]
    fn bare_serial() {
        let d: Device = serde_json::from_str(r#""X""#).unwrap();
        assert_eq!(d, Device::serial("X"));
    }

    #[test]
    fn always_serializes_full_block() {
        let json = serde_json::to_string(&Device::serial("X")).unwrap();
        assert_eq!(json, r#"{"vendor":"","model":"","sn":"X","ipcdver":""}"#);
    }

    #[test]
    fn rejects_numbers() {
        assert!(serde_json::from_str::<Device>("42").is_err());
    }

    #[test]
    fn status_messages_default_empty() {
        let s: Status = serde_json::from_str(r#"{"result":"fail"}"#).unwrap();
        assert_eq!(s.result, StatusResult::Fail);
        assert!(s.messages.is_empty());
        assert!(!s.is_success());
    }
}
