use std::process::ExitCode;

use clap::Parser;
use stx3_driver::{CancelToken, SerialLifecycle};
use stx3_tool::{execute, Cli, Failure, Outcome, ToolError};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\nCancelling...");
        handler_token.cancel();
    }) {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
    }

    match run(&cli, cancel) {
        Ok(outcome) => {
            report(&cli, &outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            if cli.json {
                print_json(&Failure::new(&e));
            } else {
                eprintln!("error: {}", e);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli, cancel: CancelToken) -> Result<Outcome, ToolError> {
    let config = cli.driver_config()?;
    let deadline = cli.deadline(cancel);
    let mut lifecycle = SerialLifecycle::open(&config)?;
    execute(&mut lifecycle, &cli.command, &deadline)
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn report(cli: &Cli, outcome: &Outcome) {
    if cli.json {
        print_json(outcome);
    } else {
        println!("{}", outcome);
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("error: failed to encode JSON: {}", e),
    }
}
