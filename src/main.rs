//
//  bbs-seed
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use console::style;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bbs_seed::api::BitbucketClient;
use bbs_seed::cli::Cli;
use bbs_seed::config::{ConfigError, SeedConfig};
use bbs_seed::exit_codes;
use bbs_seed::seed::Seeder;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    // Parse CLI arguments
    let cli = Cli::parse_normalized();

    // Execute the run
    let result = run(cli).await;

    // Handle result and exit
    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("{} {e:#}", style("Error:").for_stderr().red().bold());
            let code = if e.downcast_ref::<ConfigError>().is_some() {
                exit_codes::USAGE
            } else {
                exit_codes::ERROR
            };
            std::process::exit(code);
        }
    }
}

/// Initialize logging based on environment
fn init_logging() {
    let filter = EnvFilter::try_from_env("BBS_SEED_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries the transcript
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = SeedConfig::from_cli(&cli)?;
    let client = BitbucketClient::from_config(&config)?;

    let mut stdout = std::io::stdout().lock();
    Seeder::new(&config, client).run(&mut stdout).await?;
    Ok(())
}
