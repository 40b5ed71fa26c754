use clap::Parser;
use cardboard::cli::commands::Cli;
use cardboard::cli::handlers;

/// Environment variable holding the log filter, e.g. `CARDBOARD_LOG=debug`
const LOG_ENV: &str = "CARDBOARD_LOG";

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
