//! Optional TOML configuration for the CLI.
//!
//! ```toml
//! profile = "explicit-null"
//! log = "ipcd=debug,ipcd_core=trace"
//! ```

use clap::ValueEnum;
use ipcd_core::Profile;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Encoding profile used when `--profile` is not given.
    pub profile: ProfileName,
    /// Tracing filter directive.
    pub log: Option<String>,
}

impl Config {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileName {
    #[default]
    Compact,
    ExplicitNull,
}

impl From<ProfileName> for Profile {
    fn from(name: ProfileName) -> Self {
        match name {
            ProfileName::Compact => Profile::Compact,
            ProfileName::ExplicitNull => Profile::ExplicitNull,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_default() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.profile, ProfileName::Compact);
        assert_eq!(config.log, None);
    }

    #[test]
    fn parse_full() {
        let config = Config::parse("profile = \"explicit-null\"\nlog = \"ipcd=debug\"\n").unwrap();
        assert_eq!(Profile::from(config.profile), Profile::ExplicitNull);
        assert_eq!(config.log.as_deref(), Some("ipcd=debug"));
    }

    #[test]
    fn reject_unknown_keys() {
        assert!(Config::parse("colour = true").is_err());
    }

    #[test]
    fn reject_unknown_profile() {
        assert!(Config::parse("profile = \"pretty\"").is_err());
    }

    #[test]
    fn missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/ipcd.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn no_path_is_default() {
        assert_eq!(Config::load(None).unwrap().profile, ProfileName::Compact);
    }
}
