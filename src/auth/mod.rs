//
//  bbs-seed
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! Bitbucket Server accepts HTTP Basic authentication on its REST API. The
//! seeder authenticates every request with the same username/password pair,
//! so this module only needs a single credential type.
//!
//! ## Example
//!
//! ```rust
//! use bbs_seed::auth::AuthCredential;
//!
//! let credential = AuthCredential::basic("admin", "secret");
//! assert_eq!(credential.header_value(), "Basic YWRtaW46c2VjcmV0");
//! ```

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use reqwest::RequestBuilder;

/// Basic HTTP authentication credentials.
///
/// The password is never printed by the `Debug` implementation so the
/// credential can be logged safely alongside the rest of the configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthCredential {
    /// The username for authentication.
    pub username: String,
    /// The password for authentication.
    pub password: String,
}

impl AuthCredential {
    /// Creates a Basic credential from a username and password.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Applies the credential to an HTTP request.
    ///
    /// # Parameters
    ///
    /// - `request`: The [`RequestBuilder`] to add the `Authorization` header to.
    ///
    /// # Returns
    ///
    /// Returns the modified [`RequestBuilder`] with Basic authentication applied.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use bbs_seed::auth::AuthCredential;
    /// use reqwest::Client;
    ///
    /// async fn fetch_status(credential: &AuthCredential) {
    ///     let client = Client::new();
    ///     let request = client.get("https://bitbucket.example.com/status");
    ///     let response = credential.apply_to_request(request).send().await;
    /// }
    /// ```
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, self.header_value())
    }

    /// Renders the `Authorization` header value, `Basic base64(user:password)`.
    pub fn header_value(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

impl fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCredential")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}
