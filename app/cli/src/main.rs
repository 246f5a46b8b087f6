//! FILENAME: app/cli/src/main.rs
// PURPOSE: Command-line entry point.

use clap::Parser;
use report_lib::{logging, run, Cli};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("[LOG_ERROR] {}", e);
    }

    match run(&cli) {
        Ok(sheets) => {
            log::info!(
                target: "CLI",
                "Successfully created report {} ({} sheets)",
                cli.output.display(),
                sheets.len()
            );
        }
        Err(e) => {
            log::error!(target: "CLI", "Error generating report: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
