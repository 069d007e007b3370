use clap::Parser;
use taskgraph::cli::commands::Cli;
use taskgraph::cli::handlers;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TASKGRAPH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if std::env::var("DEBUG").is_ok() {
            "taskgraph=debug,info"
        } else {
            "warn"
        })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
