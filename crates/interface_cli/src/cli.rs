//! Command line arguments for `nhis-export`

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{export_snapshot, read_snapshot, verify_file};
use crate::config::AppConfig;
use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "nhis-export")]
#[command(about = "Export claim batches as NHIA XML and verify exported files")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Write nhis-batch-<number>.xml for a batch snapshot
    Export {
        /// JSON snapshot of the batch and its claims
        path: PathBuf,

        /// Directory the XML is written to, overriding the configuration
        #[arg(long, env = "NHIS_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,
    },
    /// Parse an exported file back and print its summary
    Verify {
        path: PathBuf,
    },
}

impl Command {
    /// Runs the command and returns the line to print
    pub async fn run(&self, config: &AppConfig) -> Result<String, CliError> {
        match self {
            Command::Export { path, output_dir } => {
                let mut config = config.clone();
                if let Some(dir) = output_dir {
                    config.output_dir = dir.clone();
                }
                if config.facility_code.is_empty() {
                    tracing::warn!("NHIS_FACILITY_CODE is not set; the export will carry an empty facility code");
                }
                let snapshot = read_snapshot(path)?;
                let written = export_snapshot(&config, snapshot).await?;
                Ok(written.display().to_string())
            }
            Command::Verify { path } => {
                let parsed = verify_file(path)?;
                Ok(format!(
                    "{} ({}): {} claims, total {:.2}",
                    parsed.details.batch_number,
                    parsed.details.submission_period.format("%Y-%m"),
                    parsed.claims.len(),
                    parsed.details.total_amount
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_export_with_output_dir() {
        let cli = Cli::try_parse_from(["nhis-export", "export", "batch.json", "--output-dir", "out"]).unwrap();
        assert_eq!(
            cli.cmd,
            Command::Export {
                path: PathBuf::from("batch.json"),
                output_dir: Some(PathBuf::from("out")),
            }
        );
    }

    #[test]
    fn test_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["nhis-export", "import", "batch.json"]).is_err());
        assert!(Cli::try_parse_from(["nhis-export", "verify"]).is_err());
    }
}
