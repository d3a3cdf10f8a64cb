//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all lognode-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use std::time::Duration;

/// HTTP test client with token-based authentication
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    /// Token sent in the Authorization header, if any
    token: Option<String>,
}

impl TestClient {
    /// Creates a new unauthenticated client
    ///
    /// Use this for testing authentication gating.
    /// For most tests, use `authenticated_admin()` instead.
    pub fn new(base_url: String) -> Self {
        Self::with_token(base_url, None)
    }

    /// Creates a client presenting the admin token on every request
    pub fn authenticated_admin(base_url: String) -> Self {
        Self::with_token(base_url, Some(ADMIN_TOKEN.to_string()))
    }

    /// Creates a client presenting a valid token without admin access
    pub fn authenticated_query(base_url: String) -> Self {
        Self::with_token(base_url, Some(QUERY_TOKEN.to_string()))
    }

    /// Creates a client presenting an arbitrary token
    pub fn with_token(base_url: String, token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            token,
        }
    }

    async fn get(&self, path: &str) -> Response {
        let mut request = self.client.get(format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            request = request.header("Authorization", token);
        }
        request.send().await.expect("Request failed")
    }

    /// GET /
    pub async fn home(&self) -> Response {
        self.get("/").await
    }

    /// GET /system/jobs
    pub async fn get_system_jobs(&self) -> Response {
        self.get("/system/jobs").await
    }

    /// GET /system/fields
    pub async fn get_system_fields(&self) -> Response {
        self.get("/system/fields").await
    }
}
