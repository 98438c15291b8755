//
//  bbs-seed
//  seed/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Seeding Orchestrator
//!
//! Drives a run through its phases:
//!
//! ```text
//! HealthCheck ──200──▶ ProjectLoop ──201──▶ RepoLoop ──▶ Done
//!      │                    │   ▲              │
//!      └────────────────────┴───┼──────────────┴──▶ Failed
//!                               └── next project
//! ```
//!
//! Every accepted response is written to the transcript as its body followed
//! by its status code. The first transport error or unexpected status ends the
//! run; projects and repositories created before that point are left in place.
//!
//! With a concurrency above one, up to that many projects are seeded at the
//! same time. Repositories of a project are still created after the project
//! itself and in index order. Entries reach the transcript as soon as they are
//! recorded. After the first failure no new request is started, but requests
//! already in flight complete and are recorded before the error is returned.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reqwest::StatusCode;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::api::server::{project_name, repo_name, Project, Repository};
use crate::api::{ApiError, ApiResponse, BitbucketClient};
use crate::config::SeedConfig;

/// The step of a run a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// `GET /status`, expects 200.
    HealthCheck,
    /// Project creation, expects 201.
    ProjectCreation,
    /// Repository creation, expects 201.
    RepoCreation,
}

impl Phase {
    /// The status code a request in this phase must return.
    pub fn expected_status(self) -> StatusCode {
        match self {
            Self::HealthCheck => StatusCode::OK,
            Self::ProjectCreation | Self::RepoCreation => StatusCode::CREATED,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::HealthCheck => "Health check",
            Self::ProjectCreation => "Project creation",
            Self::RepoCreation => "Repo creation",
        })
    }
}

/// Errors that stop a seeding run.
#[derive(Error, Debug)]
pub enum SeedError {
    /// A request failed or returned an unexpected status.
    #[error("{phase} failed")]
    Request {
        /// Phase the failing request belonged to.
        phase: Phase,
        /// The underlying API error.
        #[source]
        source: ApiError,
    },

    /// The transcript could not be written.
    #[error("Failed to write transcript")]
    Output(#[from] io::Error),

    /// A concurrent seeding task did not complete.
    #[error("Seeding task did not complete")]
    Task(#[from] JoinError),
}

impl SeedError {
    /// Phase of the failing request, if the run stopped on a request.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Request { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Status code the server answered with, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Request { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// Totals of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Number of projects created.
    pub projects_created: u64,
    /// Number of repositories created across all projects.
    pub repos_created: u64,
}

/// Runs the health check and creation loops against one server.
pub struct Seeder<'a> {
    config: &'a SeedConfig,
    client: BitbucketClient,
}

impl<'a> Seeder<'a> {
    /// Creates a seeder for `config` that sends requests through `client`.
    pub fn new(config: &'a SeedConfig, client: BitbucketClient) -> Self {
        Self { config, client }
    }

    /// Performs the full run, writing the transcript to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Request`] for the first request that fails or
    /// answers with an unexpected status. Nothing after it is attempted.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<SeedReport, SeedError> {
        let health = send(Phase::HealthCheck, self.client.health_check()).await?;
        record(out, Phase::HealthCheck, &health)?;

        writeln!(
            out,
            "Adding {} projects and {} repos to each project",
            self.config.projects_count, self.config.repos_count
        )?;

        let report = if self.config.concurrency <= 1 {
            self.seed_sequential(out).await?
        } else {
            self.seed_concurrent(out).await?
        };

        info!(
            projects = report.projects_created,
            repos = report.repos_created,
            "Seeding complete"
        );
        Ok(report)
    }

    async fn seed_sequential<W: Write>(&self, out: &mut W) -> Result<SeedReport, SeedError> {
        let repos = self.config.repo_iterations();
        let never = AtomicBool::new(false);
        let mut report = SeedReport::default();

        for index in 0..self.config.project_iterations() {
            if let Some(created) = seed_project(&self.client, index, repos, &never, out).await? {
                report.repos_created += created;
                report.projects_created += 1;
            }
        }

        Ok(report)
    }

    async fn seed_concurrent<W: Write>(&self, out: &mut W) -> Result<SeedReport, SeedError> {
        let total = self.config.project_iterations();
        let repos = self.config.repo_iterations();
        let limit = self.config.concurrency;
        debug!(total, limit, "Seeding projects concurrently");

        let stop = Arc::new(AtomicBool::new(false));
        let (sender, mut entries) = mpsc::unbounded_channel();
        let mut tasks = JoinSet::new();
        let mut next = 0;
        let mut report = SeedReport::default();
        let mut failure: Option<SeedError> = None;

        loop {
            while failure.is_none() && next < total && tasks.len() < limit {
                let client = self.client.clone();
                let stop = Arc::clone(&stop);
                let mut transcript = TranscriptSender(sender.clone());
                let index = next;
                tasks.spawn(async move {
                    seed_project(&client, index, repos, &stop, &mut transcript).await
                });
                next += 1;
            }

            tokio::select! {
                Some(entry) = entries.recv() => out.write_all(&entry)?,
                joined = tasks.join_next() => {
                    let Some(joined) = joined else {
                        break;
                    };

                    // a finished task has already queued all of its entries
                    while let Ok(entry) = entries.try_recv() {
                        out.write_all(&entry)?;
                    }

                    match joined.map_err(SeedError::from).and_then(|result| result) {
                        Ok(Some(created)) => {
                            report.projects_created += 1;
                            report.repos_created += created;
                        }
                        Ok(None) => {}
                        Err(e) if failure.is_none() => {
                            warn!(in_flight = tasks.len(), "Stopping remaining projects");
                            stop.store(true, Ordering::SeqCst);
                            failure = Some(e);
                        }
                        Err(e) => debug!(error = %e, "Additional failure after stop"),
                    }
                }
            }
        }

        while let Ok(entry) = entries.try_recv() {
            out.write_all(&entry)?;
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }
}

/// Forwards transcript entries from a seeding task to the writer loop.
struct TranscriptSender(mpsc::UnboundedSender<Vec<u8>>);

impl Write for TranscriptSender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .send(buf.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "transcript closed"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Creates project `index` and its `repos` repositories, in order.
///
/// `stop` is checked before every request. Returns `None` if the project was
/// never created, otherwise the number of repositories created.
async fn seed_project<W: Write>(
    client: &BitbucketClient,
    index: u64,
    repos: u64,
    stop: &AtomicBool,
    out: &mut W,
) -> Result<Option<u64>, SeedError> {
    if stop.load(Ordering::SeqCst) {
        return Ok(None);
    }

    let project = project_name(index);
    let created = send(Phase::ProjectCreation, client.create_project(&project)).await?;
    record(out, Phase::ProjectCreation, &created)?;

    match serde_json::from_str::<Project>(&created.body) {
        Ok(p) => debug!(id = p.id, key = %p.key, "Created project"),
        Err(_) => debug!(%project, "Created project"),
    }

    for repo_index in 0..repos {
        if stop.load(Ordering::SeqCst) {
            return Ok(Some(repo_index));
        }

        let repo = repo_name(repo_index);
        let created = send(Phase::RepoCreation, client.create_repository(&project, &repo)).await?;
        record(out, Phase::RepoCreation, &created)?;

        if let Ok(r) = serde_json::from_str::<Repository>(&created.body) {
            debug!(id = r.id, slug = %r.slug, state = ?r.state, "Created repository");
        }
    }

    Ok(Some(repos))
}

/// Awaits a request and checks it against the phase's expected status.
async fn send<F>(phase: Phase, request: F) -> Result<ApiResponse, SeedError>
where
    F: std::future::Future<Output = Result<reqwest::Response, ApiError>>,
{
    let checked = match request.await {
        Ok(response) => ApiResponse::expect(response, phase.expected_status()).await,
        Err(e) => Err(e),
    };
    checked.map_err(|source| SeedError::Request { phase, source })
}

/// Writes one transcript entry in a single write.
fn record<W: Write>(out: &mut W, phase: Phase, response: &ApiResponse) -> io::Result<()> {
    let entry = format!(
        "{phase} response:\n{}\nStatus code: {}\n",
        response.body,
        response.status.as_u16()
    );
    out.write_all(entry.as_bytes())
}
