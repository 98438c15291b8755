//
//  bbs-seed
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! HTTP access to a Bitbucket Server/Data Center instance.
//!
//! ## Architecture
//!
//! - [`client`]: HTTP client with Basic authentication and the three seeding requests
//! - [`server`]: Request bodies, paths and naming rules
//! - [`common`]: Shared error and response types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bbs_seed::api::{ApiResponse, BitbucketClient};
//! use bbs_seed::auth::AuthCredential;
//! use reqwest::StatusCode;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = BitbucketClient::new(
//!     "http://bitbucket.local:7990",
//!     AuthCredential::basic("admin", "admin"),
//! )?;
//!
//! let response = client.health_check().await?;
//! let status = ApiResponse::expect(response, StatusCode::OK).await?;
//! println!("{}", status.body);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Transport failures are returned as [`ApiError::Network`]. The client never
//! interprets status codes; [`ApiResponse::expect`] turns a mismatch into
//! [`ApiError::UnexpectedStatus`].

pub mod client;

pub mod server;

pub mod common;

pub use client::BitbucketClient;

pub use common::{ApiError, ApiResponse};
