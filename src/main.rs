use batchname::cli::{Cli, run_cli};
use batchname::config::AppConfig;
use batchname::output::OutputFormatter;
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            OutputFormatter::error(&format!("Error loading configuration: {}", e));
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run_cli(cli.command, &config) {
        OutputFormatter::error(&format!("Error: {}", e));
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
