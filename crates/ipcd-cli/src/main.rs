//! `ipcd`: inspect IPCD protocol messages from the command line.
//!
//! Reads one JSON envelope from a file or stdin:
//!   ipcd classify msg.json
//!   ipcd decode --from client < response.json
//!   ipcd canonicalize --from server --profile explicit-null cmd.json

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use config::{Config, ProfileName};
use ipcd_core::{Codec, Profile};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ipcd", version, about = "Inspect and canonicalize IPCD protocol messages")]
struct Cli {
    /// TOML config file.
    #[arg(long, env = "IPCD_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print which message variant an envelope holds.
    Classify {
        /// Input file; stdin when omitted.
        input: Option<PathBuf>,
    },
    /// Decode an envelope and print the typed message.
    Decode {
        #[arg(long, value_enum)]
        from: Direction,
        input: Option<PathBuf>,
    },
    /// Decode an envelope and write it back in canonical field order.
    Canonicalize {
        #[arg(long, value_enum)]
        from: Direction,
        /// Overrides the profile from the config file.
        #[arg(long, value_enum)]
        profile: Option<ProfileName>,
        input: Option<PathBuf>,
    },
}

/// Which side sent the message.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Direction {
    Server,
    Client,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let directive = config.log.as_deref().unwrap_or("ipcd=info");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let codec = Codec::shared();
    match cli.command {
        Cmd::Classify { input } => {
            let json = read_input(input.as_deref())?;
            println!("{}", codec.classify(&json)?);
        }
        Cmd::Decode { from, input } => {
            let json = read_input(input.as_deref())?;
            match from {
                Direction::Server => println!("{:#?}", codec.decode_server_message(&json)?),
                Direction::Client => println!("{:#?}", codec.decode_client_message(&json)?),
            }
        }
        Cmd::Canonicalize {
            from,
            profile,
            input,
        } => {
            let json = read_input(input.as_deref())?;
            let profile = Profile::from(profile.unwrap_or(config.profile));
            tracing::debug!(?from, ?profile, "canonicalizing");
            let out = match from {
                Direction::Server => {
                    codec.encode_with(&codec.decode_server_message(&json)?, profile)?
                }
                Direction::Client => {
                    codec.encode_with(&codec.decode_client_message(&json)?, profile)?
                }
            };
            println!("{out}");
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut json = String::new();
            std::io::stdin()
                .read_to_string(&mut json)
                .context("failed to read stdin")?;
            Ok(json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_canonicalize() {
        let cli = Cli::try_parse_from([
            "ipcd",
            "canonicalize",
            "--from",
            "server",
            "--profile",
            "explicit-null",
            "cmd.json",
        ])
        .unwrap();
        let Cmd::Canonicalize {
            from,
            profile,
            input,
        } = cli.command
        else {
            panic!("expected canonicalize");
        };
        assert!(matches!(from, Direction::Server));
        assert_eq!(profile, Some(ProfileName::ExplicitNull));
        assert_eq!(input, Some(PathBuf::from("cmd.json")));
    }

    #[test]
    fn decode_requires_direction() {
        assert!(Cli::try_parse_from(["ipcd", "decode", "x.json"]).is_err());
    }
}
