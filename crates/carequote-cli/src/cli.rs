//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Carequote - annual health-insurance premium estimates
#[derive(Parser, Debug)]
#[command(name = "carequote")]
#[command(
    version,
    about = "Predict annual health-insurance premiums from applicant records",
    after_help = "\
Examples:
  carequote predict --input applicant.json       One record from a file
  echo '{...}' | carequote predict --input -     One record from stdin
  carequote batch --input applicants.json        A JSON array of records
  carequote options                              Allowed categorical values"
)]
pub struct Cli {
    /// Path to carequote.toml (default: CAREQUOTE_CONFIG, then ./carequote.toml)
    #[arg(long, global = true, env = "CAREQUOTE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Predict the premium for one applicant record (JSON object)
    Predict {
        /// Input file, or `-` for stdin
        #[arg(long, short = 'i', default_value = "-")]
        input: PathBuf,

        /// Print `{"premium": n}` instead of the formatted amount
        #[arg(long)]
        json: bool,
    },

    /// Predict premiums for a JSON array of applicant records
    Batch {
        /// Input file, or `-` for stdin
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Print one JSON object per record
        #[arg(long)]
        json: bool,
    },

    /// Print the allowed values for every categorical attribute
    Options,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_predict_defaults_to_stdin() {
        let cli = Cli::try_parse_from(["carequote", "predict"]).unwrap();
        match cli.command {
            Commands::Predict { input, json } => {
                assert_eq!(input, PathBuf::from("-"));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_batch_requires_input() {
        assert!(Cli::try_parse_from(["carequote", "batch"]).is_err());
        let cli =
            Cli::try_parse_from(["carequote", "batch", "--input", "a.json", "--config", "c.toml"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    }
}
