//
//  bbs-seed
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI argument definitions using clap derive macros

use std::ffi::OsString;

use clap::{Args, Parser};

/// Long flag names that may also be written with a single leading dash.
const LONG_FLAGS: &[&str] = &[
    "projects-count",
    "repos-count",
    "concurrency",
    "api-user",
    "api-pass",
    "api-url",
];

/// Seed a Bitbucket Server instance with test projects and repositories
#[derive(Parser, Debug)]
#[command(
    name = "bbs-seed",
    version,
    about = "Seed a Bitbucket Server instance with test projects and repositories",
    long_about = "bbs-seed checks that a Bitbucket Server/Data Center instance is healthy,\n\
                  then creates PROJECTS-COUNT projects with REPOS-COUNT repositories each.\n\n\
                  Credentials and the server URL are read from BBS_API_USER, BBS_API_PASS\n\
                  and BBS_API_URL.",
    after_help = "Projects are keyed Project-project<N> and repositories named Repo-repo<N>."
)]
pub struct Cli {
    /// Number of projects to create
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub projects_count: i64,

    /// Number of repos to create in each project
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub repos_count: i64,

    /// Maximum number of projects seeded at the same time
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,

    #[command(flatten)]
    pub credentials: CredentialOptions,
}

/// Server location and credentials
#[derive(Args, Debug, Clone, Default)]
pub struct CredentialOptions {
    /// Basic auth username
    #[arg(long, env = "BBS_API_USER")]
    pub api_user: Option<String>,

    /// Basic auth password
    #[arg(long, env = "BBS_API_PASS", hide_env_values = true)]
    pub api_pass: Option<String>,

    /// Base URL of the server, without a trailing slash
    #[arg(long, env = "BBS_API_URL")]
    pub api_url: Option<String>,
}

impl Cli {
    /// Parses the process arguments, accepting Go-style `-flag` spellings.
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }
}

/// Rewrites single-dash long flags (`-repos-count=3`) to their double-dash form.
///
/// Only names in the known flag list are rewritten, so negative numbers and
/// short flags pass through unchanged.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(|arg| {
            let arg: OsString = arg.into();
            let rewritten = arg.to_str().and_then(|s| {
                let rest = s.strip_prefix('-').filter(|r| !r.starts_with('-'))?;
                let name = rest.split_once('=').map_or(rest, |(name, _)| name);
                LONG_FLAGS
                    .contains(&name)
                    .then(|| OsString::from(format!("-{s}")))
            });
            rewritten.unwrap_or(arg)
        })
        .collect()
}
