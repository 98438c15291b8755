//
//  bbs-seed
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Builds the immutable [`SeedConfig`] used for the whole run. The three
//! required values come from the environment (or their matching flags):
//!
//! | Variable | Flag | Purpose |
//! |----------|------|---------|
//! | `BBS_API_USER` | `--api-user` | Basic auth username |
//! | `BBS_API_PASS` | `--api-pass` | Basic auth password |
//! | `BBS_API_URL` | `--api-url` | Server base URL, without a trailing slash |
//!
//! A missing or empty value is reported as [`ConfigError::Missing`] before any
//! request is made.
//!
//! ## Usage
//!
//! ```rust
//! use bbs_seed::config::{ConfigError, SeedConfig};
//!
//! let config = SeedConfig::from_lookup(
//!     |name| match name {
//!         "BBS_API_USER" => Some("admin".to_string()),
//!         "BBS_API_PASS" => Some("admin".to_string()),
//!         "BBS_API_URL" => Some("http://localhost:7990".to_string()),
//!         _ => None,
//!     },
//!     2,
//!     5,
//! )?;
//! assert_eq!(config.base_url, "http://localhost:7990");
//! # Ok::<(), ConfigError>(())
//! ```

use thiserror::Error;
use tracing::debug;

use crate::auth::AuthCredential;
use crate::cli::Cli;

/// Environment variable holding the Basic auth username.
pub const USER_VAR: &str = "BBS_API_USER";

/// Environment variable holding the Basic auth password.
pub const PASS_VAR: &str = "BBS_API_PASS";

/// Environment variable holding the server base URL.
pub const URL_VAR: &str = "BBS_API_URL";

/// Errors raised while assembling the run configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value was unset or empty.
    ///
    /// # Parameters
    ///
    /// - `0` - Name of the environment variable that must be provided
    #[error("${0} must be set")]
    Missing(&'static str),
}

/// Immutable configuration for a seeding run.
///
/// Constructed once at startup and borrowed by the orchestrator for the
/// lifetime of the process.
///
/// # Fields
///
/// * `credential` - Basic auth credentials sent with every request
/// * `base_url` - Server base URL; paths are appended verbatim
/// * `projects_count` - Number of projects to create (≤ 0 creates none)
/// * `repos_count` - Number of repositories per project (≤ 0 creates none)
/// * `concurrency` - Maximum number of projects seeded at the same time
#[derive(Debug, Clone)]
pub struct SeedConfig {
    /// Credentials applied to every request.
    pub credential: AuthCredential,

    /// Base URL of the target server.
    /// No trailing-slash normalisation is performed.
    pub base_url: String,

    /// Number of projects to create.
    pub projects_count: i64,

    /// Number of repositories to create in each project.
    pub repos_count: i64,

    /// Upper bound on concurrently seeded projects. `1` means strictly sequential.
    pub concurrency: usize,
}

impl SeedConfig {
    /// Builds a configuration by resolving each required variable through `lookup`.
    ///
    /// Variables are checked in the order user, password, URL, and the first
    /// one that is missing or empty is reported.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the first absent variable.
    pub fn from_lookup<F>(
        lookup: F,
        projects_count: i64,
        repos_count: i64,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user = require(USER_VAR, lookup(USER_VAR))?;
        let password = require(PASS_VAR, lookup(PASS_VAR))?;
        let base_url = require(URL_VAR, lookup(URL_VAR))?;

        Ok(Self {
            credential: AuthCredential::basic(user, password),
            base_url,
            projects_count,
            repos_count,
            concurrency: 1,
        })
    }

    /// Builds a configuration from the process environment.
    pub fn from_env(projects_count: i64, repos_count: i64) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok(), projects_count, repos_count)
    }

    /// Builds a configuration from parsed command-line options.
    ///
    /// Clap has already folded the environment into the credential flags, so
    /// this only validates presence and copies the counts.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let credentials = &cli.credentials;
        let config = Self::from_lookup(
            |name| match name {
                USER_VAR => credentials.api_user.clone(),
                PASS_VAR => credentials.api_pass.clone(),
                URL_VAR => credentials.api_url.clone(),
                _ => None,
            },
            cli.projects_count,
            cli.repos_count,
        )?
        .with_concurrency(usize::from(cli.concurrency));

        debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Sets the concurrency bound. Values below 1 are raised to 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Number of project iterations the run will perform.
    pub fn project_iterations(&self) -> u64 {
        u64::try_from(self.projects_count).unwrap_or(0)
    }

    /// Number of repository iterations performed inside each project.
    pub fn repo_iterations(&self) -> u64 {
        u64::try_from(self.repos_count).unwrap_or(0)
    }
}

fn require(name: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}
