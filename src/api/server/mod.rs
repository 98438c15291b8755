//
//  bbs-seed
//  api/server/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/Data Center REST API
//!
//! Request bodies, paths and naming for the resources the seeder creates.
//!
//! - [`projects`] - Project creation
//! - [`repositories`] - Repository creation inside a project
//!
//! Paths target `/rest/api/latest`, which the server resolves to its newest
//! API version.

pub mod projects;
pub mod repositories;

/// Path of the server status endpoint used for the health check.
pub const STATUS_PATH: &str = "/status";

pub use projects::{project_key, project_name, CreateProjectRequest, Project, PROJECTS_PATH};
pub use repositories::{
    repo_name, repos_path, repository_name, CreateRepositoryRequest, Repository,
};
