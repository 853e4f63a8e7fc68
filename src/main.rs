use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use api_smoke_tester::{runner, utils::Config};

#[derive(Parser)]
#[command(name = "api-smoke-tester")]
#[command(version)]
#[command(
    about = "Smoke-test the blood disease classification API",
    long_about = "Runs the health, prediction, metrics, chatbot and live-updates checks \
                  against http://localhost:5000 in a fixed order and prints a summary."
)]
struct Cli {
    /// Also write results.json and junit.xml into this directory
    #[arg(long, value_name = "DIR")]
    report: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = ctrlc::set_handler(|| {
        runner::console::interrupted();
        std::process::exit(130);
    }) {
        log::warn!("Could not install interrupt handler: {}", e);
    }

    match runner::run_all_tests(Config::default(), cli.report.as_deref()).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            runner::console::suite_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
