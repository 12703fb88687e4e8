//! Command implementations for the trip-record ETL CLI.
//!
//! Each command lives in its own module; `shared` holds logging setup and
//! summary reporting used by all of them.

pub mod run;
pub mod shared;
pub mod status;

use crate::cli::args::{Args, Commands};
use crate::error::Result;

/// Dispatch to the appropriate subcommand handler
pub async fn run(args: Args) -> Result<()> {
    match args.get_command() {
        Commands::Run(run_args) => run::run_etl(run_args).await,
        Commands::Status(status_args) => status::run_status(status_args).await,
    }
}
