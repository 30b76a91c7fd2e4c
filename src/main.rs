use std::sync::Arc;

use booktracker::config::{Cli, config_schema, load_config};
use booktracker::startup;
use booktracker::utils::logger::init_logging;
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.schema {
        match config_schema() {
            Ok(schema) => println!("{}", schema),
            Err(e) => {
                eprintln!("Failed to render config schema: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {}", cli.config.display(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = startup::run(Arc::new(config)).await {
        tracing::error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}
