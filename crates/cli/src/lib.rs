use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "wastex")]
#[command(about = "WasteX - an industrial waste trading platform")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the platform with the given configuration
    Start {
        /// Deployment mode (monolith or a specific engine)
        #[arg(short, long, value_enum, default_value = "monolith")]
        mode: DeploymentMode,

        /// Path to the configuration file
        #[arg(short, long, default_value = "wastex.yaml")]
        config: PathBuf,

        /// Override the HTTP port
        #[arg(long)]
        http: Option<u16>,
    },

    /// Validate configuration without starting the platform
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "wastex.yaml")]
        config: PathBuf,
    },

    /// Initialize a new configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "wastex.yaml")]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeploymentMode {
    /// Run all engines in one process (monolith)
    Monolith,

    /// Matching engine - listing/request scoring
    Matching,

    /// Negotiation channel - bilateral messaging
    Negotiation,

    /// Contract lifecycle - dual-signed contracts against the ledger
    Contracts,

    /// Escrow payments - custody, release, auto-release sweep
    Escrow,
}

impl DeploymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentMode::Monolith => "monolith",
            DeploymentMode::Matching => "matching",
            DeploymentMode::Negotiation => "negotiation",
            DeploymentMode::Contracts => "contracts",
            DeploymentMode::Escrow => "escrow",
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_defaults() {
        let cli = Cli::try_parse_from(["wastex", "start"]).unwrap();
        match cli.command {
            Commands::Start { mode, config, http } => {
                assert_eq!(mode, DeploymentMode::Monolith);
                assert_eq!(config, PathBuf::from("wastex.yaml"));
                assert!(http.is_none());
            }
            _ => panic!("expected start command"),
        }
    }

    #[test]
    fn test_parse_mode_and_port() {
        let cli =
            Cli::try_parse_from(["wastex", "start", "--mode", "escrow", "--http", "9000"]).unwrap();
        match cli.command {
            Commands::Start { mode, http, .. } => {
                assert_eq!(mode, DeploymentMode::Escrow);
                assert_eq!(http, Some(9000));
            }
            _ => panic!("expected start command"),
        }
    }

    #[test]
    fn test_mode_as_str() {
        assert_eq!(DeploymentMode::Monolith.as_str(), "monolith");
        assert_eq!(DeploymentMode::Contracts.as_str(), "contracts");
    }
}
