//
//  bbs-seed
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types
//!
//! Error handling and the response record shared by every request the
//! seeder sends.
//!
//! # Example
//!
//! ```rust
//! use bbs_seed::api::common::ApiError;
//! use reqwest::StatusCode;
//!
//! let err = ApiError::UnexpectedStatus {
//!     expected: StatusCode::CREATED,
//!     actual: StatusCode::CONFLICT,
//! };
//! assert_eq!(err.status(), Some(StatusCode::CONFLICT));
//! ```

use reqwest::{Response, StatusCode};
use thiserror::Error;

/// Error type for all Bitbucket Server API operations.
///
/// # Variants
///
/// | Variant | Description |
/// |---------|-------------|
/// | `Network` | Connection, DNS, TLS or malformed-URL failure |
/// | `UnexpectedStatus` | The server answered with a status other than the expected one |
/// | `BodyRead` | The body of a successful response could not be read |
/// | `Serialize` | The request body could not be encoded |
///
/// # Notes
///
/// - The `Network` variant automatically converts from `reqwest::Error`
/// - A non-2xx status is never reported as `Network`; the caller decides
///   which status it expects
#[derive(Error, Debug)]
pub enum ApiError {
    /// A network-level error occurred during the request.
    ///
    /// Request construction failures (such as an unparsable base URL) surface
    /// here too, since reqwest reports them when the request is sent.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server returned a status code other than the expected one.
    ///
    /// The response body is not read in this case.
    #[error("unexpected status {actual} (expected {expected})")]
    UnexpectedStatus {
        /// Status the caller required.
        expected: StatusCode,
        /// Status the server returned.
        actual: StatusCode,
    },

    /// Reading the body of an accepted response failed.
    #[error("Failed to read response body: {0}")]
    BodyRead(#[source] reqwest::Error),

    /// The request body could not be serialized to JSON.
    #[error("Failed to encode request body: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ApiError {
    /// Returns the status code the server answered with, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::UnexpectedStatus { actual, .. } => Some(*actual),
            Self::Network(e) | Self::BodyRead(e) => e.status(),
            Self::Serialize(_) => None,
        }
    }
}

/// Status code and body of an accepted response.
///
/// Read once, printed, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// The HTTP status code.
    pub status: StatusCode,

    /// The full response body as text.
    pub body: String,
}

impl ApiResponse {
    /// Checks `response` against `expected` and drains its body.
    ///
    /// # Errors
    ///
    /// - [`ApiError::UnexpectedStatus`] if the status differs; the body is left unread
    /// - [`ApiError::BodyRead`] if the body cannot be read
    pub async fn expect(response: Response, expected: StatusCode) -> Result<Self, ApiError> {
        let status = response.status();
        if status != expected {
            return Err(ApiError::UnexpectedStatus {
                expected,
                actual: status,
            });
        }

        let body = response.text().await.map_err(ApiError::BodyRead)?;
        Ok(Self { status, body })
    }
}
