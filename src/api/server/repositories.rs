//
//  bbs-seed
//  api/server/repositories.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/DC Repository API
//!
//! Request body, path and naming rules for seeded repositories.
//!
//! ## API Endpoints
//!
//! ```text
//! POST /rest/api/latest/projects/{projectKey}/repos
//! ```
//!
//! ## Example
//!
//! ```rust
//! use bbs_seed::api::server::repositories::{repos_path, CreateRepositoryRequest};
//!
//! assert_eq!(
//!     repos_path("project1"),
//!     "/rest/api/latest/projects/Project-project1/repos"
//! );
//!
//! let request = CreateRepositoryRequest::for_repository("repo0");
//! assert_eq!(request.name, "Repo-repo0");
//! ```

use serde::{Deserialize, Serialize};

use super::projects::{project_key, PROJECTS_PATH};

/// Source control type for every seeded repository.
pub const SCM_GIT: &str = "git";

/// Name of the repository at position `index` within a project.
pub fn repo_name(index: u64) -> String {
    format!("repo{index}")
}

/// Server-side name for a seeded repository name.
pub fn repository_name(name: &str) -> String {
    format!("Repo-{name}")
}

/// Path of the repository collection inside the seeded project `project`.
pub fn repos_path(project: &str) -> String {
    format!("{PROJECTS_PATH}/{}/repos", project_key(project))
}

/// Request body for creating a new repository.
///
/// Serializes to `{"name":"Repo-<name>","scmId":"git","forkable":true}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepositoryRequest {
    /// Name for the new repository. The slug is derived from it by the server.
    pub name: String,

    /// Source control management type. Always "git".
    pub scm_id: String,

    /// Whether the repository can be forked.
    pub forkable: bool,
}

impl CreateRepositoryRequest {
    /// Builds the request for the seeded repository called `name`.
    pub fn for_repository(name: &str) -> Self {
        Self {
            name: repository_name(name),
            scm_id: SCM_GIT.to_string(),
            forkable: true,
        }
    }
}

/// The fields of a created repository the seeder logs.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    /// Unique numeric identifier.
    pub id: u64,

    /// URL-safe identifier derived from the name.
    pub slug: String,

    /// Repository name, e.g. `Repo-repo0`.
    pub name: String,

    /// Repository state such as "AVAILABLE" or "INITIALISING".
    #[serde(default)]
    pub state: Option<String>,
}
