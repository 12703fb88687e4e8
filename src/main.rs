use clap::Parser;
use std::process;
use tripdata_etl::cli::{args::Args, commands};

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(commands::run(args));

    match result {
        Ok(()) => {
            // Per-period failures are reported in the run summary; the
            // process itself succeeded.
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Trip-record ETL - NYC TLC Yellow Taxi Ingestion");
    println!("===============================================");
    println!();
    println!("Ingest monthly NYC TLC yellow taxi trip-record extracts, clean them,");
    println!("and write a Parquet dataset partitioned by year and month.");
    println!();
    println!("USAGE:");
    println!("    tripdata-etl <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    run         Run the ETL pipeline for one or more monthly periods");
    println!("    status      Report cached extracts and committed partitions");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Process one month:");
    println!("    tripdata-etl run --year 2024 --month 5");
    println!();
    println!("    # Process a range of months into a custom output directory:");
    println!("    tripdata-etl run --year 2024 --month-range 1-6 --output /data/yellow_tripdata");
    println!();
    println!("    # Process a whole year:");
    println!("    tripdata-etl run --year 2024 --all-months");
    println!();
    println!("    # Show what is cached and committed:");
    println!("    tripdata-etl status");
    println!();
    println!("For detailed help on any command, use:");
    println!("    tripdata-etl <COMMAND> --help");
}
