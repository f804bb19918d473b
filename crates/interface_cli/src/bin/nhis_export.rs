//! NHIA batch export tool
//!
//! # Usage
//!
//! ```bash
//! # Write nhis-batch-<number>.xml for a batch snapshot
//! nhis-export export batch.json
//!
//! # Parse an exported file back and print its summary
//! nhis-export verify nhis-batch-BATCH-202406-0001.xml
//! ```
//!
//! # Environment Variables
//!
//! * `NHIS_FACILITY_CODE` - Facility code written into every export
//! * `NHIS_FACILITY_NAME` - Facility name
//! * `NHIS_OUTPUT_DIR` - Directory export files go to (default: .)
//! * `NHIS_LOG_LEVEL` - trace, debug, info, warn, error (default: info)
//! * `NHIS_LOG_FORMAT` - pretty or json (default: pretty)

use anyhow::Context;
use clap::Parser;

use interface_cli::{init_tracing, AppConfig, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load().context("loading configuration")?;
    init_tracing(&config.log_level, config.log_format);

    let output = cli.cmd.run(&config).await.context("running nhis-export")?;
    println!("{}", output);

    Ok(())
}
