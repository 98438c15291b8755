//
//  bbs-seed
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server Seeding Library
//!
//! Populates a Bitbucket Server/Data Center instance with test data: a health
//! check against `/status`, followed by a configurable number of projects, each
//! holding a configurable number of repositories.
//!
//! ## Module Structure
//!
//! - [`cli`]: Command-line interface definitions using clap
//! - [`config`]: Immutable run configuration built once at startup
//! - [`auth`]: Basic authentication credentials
//! - [`api`]: HTTP client and request bodies for the Server REST API
//! - [`seed`]: The orchestrator that drives the health check and creation loops
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bbs_seed::api::BitbucketClient;
//! use bbs_seed::config::SeedConfig;
//! use bbs_seed::seed::Seeder;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = SeedConfig::from_env(2, 3)?;
//! let client = BitbucketClient::from_config(&config)?;
//!
//! let report = Seeder::new(&config, client)
//!     .run(&mut std::io::stdout())
//!     .await?;
//! println!("{} projects, {} repos", report.projects_created, report.repos_created);
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions.
///
/// Contains the root [`Cli`] parser plus normalisation of Go-style
/// single-dash long flags.
pub mod cli;

/// Run configuration.
///
/// Validates the required credentials and base URL and bundles them with the
/// project/repository counts into an immutable [`config::SeedConfig`].
pub mod config;

/// Authentication credentials applied to every outbound request.
pub mod auth;

/// API client for Bitbucket Server/Data Center.
///
/// Provides the three request builders (health check, create project,
/// create repository) plus shared error and naming helpers.
pub mod api;

/// Seeding orchestrator.
pub mod seed;

/// Re-export of the main CLI struct for convenient access.
pub use cli::Cli;

/// Re-export of the configuration struct.
pub use config::SeedConfig;

/// Application name constant.
///
/// # Value
///
/// `"bbs-seed"`
pub const APP_NAME: &str = "bbs-seed";

/// Application version constant.
///
/// Derived from Cargo.toml at compile time using `CARGO_PKG_VERSION`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// Standardized exit codes following Unix conventions, allowing scripts
/// to programmatically detect why a seeding run stopped.
pub mod exit_codes {
    /// Successful execution.
    ///
    /// Every requested project and repository was created.
    pub const SUCCESS: i32 = 0;

    /// General error.
    ///
    /// A transport failure or an unexpected status code stopped the run.
    /// Entities created before the failure are left in place.
    pub const ERROR: i32 = 1;

    /// Invalid usage or configuration.
    ///
    /// A required credential or URL was missing, or the arguments could not
    /// be parsed. No request was sent.
    pub const USAGE: i32 = 2;
}
