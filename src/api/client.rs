//
//  bbs-seed
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Client Wrapper for Bitbucket Server
//!
//! Builds and sends the three requests a seeding run needs. Every request
//! carries the same headers:
//!
//! - `Authorization: Basic <base64(user:password)>`
//! - `Content-Type: application/json`
//! - `User-Agent: bbs-seed/<version>`
//!
//! The client does not retry and sets no timeout, so a stalled server stalls
//! the caller.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response};
use serde::Serialize;
use tracing::debug;

use super::common::ApiError;
use super::server::{
    repos_path, CreateProjectRequest, CreateRepositoryRequest, PROJECTS_PATH, STATUS_PATH,
};
use crate::auth::AuthCredential;
use crate::config::SeedConfig;

/// The HTTP client for a single Bitbucket Server instance.
///
/// One instance (and therefore one connection pool) is shared by every
/// request of a run.
///
/// # Example
///
/// ```rust,no_run
/// use bbs_seed::api::BitbucketClient;
/// use bbs_seed::auth::AuthCredential;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = BitbucketClient::new("http://localhost:7990", AuthCredential::basic("u", "p"))?;
/// let response = client.create_project("project0").await?;
/// println!("{}", response.status());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BitbucketClient {
    /// The underlying HTTP client
    http: Client,
    /// Base URL every path is appended to
    base_url: String,
    /// Credentials applied to every request
    auth: AuthCredential,
}

impl BitbucketClient {
    /// Creates a client for the server at `base_url`.
    ///
    /// The URL is not validated here; an unusable URL is reported as
    /// [`ApiError::Network`] when the first request is sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client could not be created.
    pub fn new(base_url: impl Into<String>, auth: AuthCredential) -> Result<Self, ApiError> {
        Ok(Self {
            http: Client::builder()
                .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
                .build()?,
            base_url: base_url.into(),
            auth,
        })
    }

    /// Creates a client from the run configuration.
    pub fn from_config(config: &SeedConfig) -> Result<Self, ApiError> {
        Self::new(config.base_url.clone(), config.credential.clone())
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `path` onto the base URL by plain concatenation.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends `GET {base}/status`.
    ///
    /// # Returns
    ///
    /// The raw response, whatever its status.
    pub async fn health_check(&self) -> Result<Response, ApiError> {
        self.send::<()>(Method::GET, STATUS_PATH, None).await
    }

    /// Sends `POST {base}/rest/api/latest/projects` for the project called `name`.
    ///
    /// The body is `{"key":"Project-<name>","links":""}`.
    pub async fn create_project(&self, name: &str) -> Result<Response, ApiError> {
        let body = CreateProjectRequest::for_project(name);
        self.send(Method::POST, PROJECTS_PATH, Some(&body)).await
    }

    /// Sends `POST {base}/rest/api/latest/projects/Project-<project>/repos`.
    ///
    /// The body is `{"name":"Repo-<name>","scmId":"git","forkable":true}`.
    pub async fn create_repository(&self, project: &str, name: &str) -> Result<Response, ApiError> {
        let body = CreateRepositoryRequest::for_repository(name);
        self.send(Method::POST, &repos_path(project), Some(&body)).await
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let url = self.url(path);
        debug!(%method, %url, "Sending request");

        let mut request = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json");
        request = self.auth.apply_to_request(request);

        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await?;
        debug!(status = %response.status(), %url, "Received response");

        Ok(response)
    }
}
