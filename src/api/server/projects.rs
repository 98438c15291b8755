//
//  bbs-seed
//  api/server/projects.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/DC Project API
//!
//! Request body and naming rules for seeded projects.
//!
//! ## API Endpoints
//!
//! ```text
//! POST /rest/api/latest/projects
//! ```
//!
//! ## Naming
//!
//! The i-th seeded project is named `project{i}` and is created on the server
//! under the key `Project-project{i}`. [`project_key`] is the only place the
//! `Project-` prefix is applied; the repository path reuses it.

use serde::{Deserialize, Serialize};

/// Path of the project collection.
pub const PROJECTS_PATH: &str = "/rest/api/latest/projects";

/// Name of the project at position `index` in a seeding run.
pub fn project_name(index: u64) -> String {
    format!("project{index}")
}

/// Server-side key for a seeded project name.
///
/// # Example
///
/// ```rust
/// use bbs_seed::api::server::projects::project_key;
///
/// assert_eq!(project_key("project0"), "Project-project0");
/// ```
pub fn project_key(name: &str) -> String {
    format!("Project-{name}")
}

/// Request body for creating a new project.
///
/// Serializes to `{"key":"Project-<name>","links":""}`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateProjectRequest {
    /// Unique key for the new project.
    pub key: String,

    /// Sent as an empty string.
    pub links: String,
}

impl CreateProjectRequest {
    /// Builds the request for the seeded project called `name`.
    pub fn for_project(name: &str) -> Self {
        Self {
            key: project_key(name),
            links: String::new(),
        }
    }
}

/// The fields of a created project the seeder logs.
///
/// Unknown fields in the server response are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    /// Unique numeric identifier assigned by Bitbucket Server.
    pub id: u64,

    /// Project key, e.g. `Project-project0`.
    pub key: String,

    /// Display name, when the server reports one.
    #[serde(default)]
    pub name: Option<String>,
}
