//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (tokens, field names, timeouts), update only
//! this file.

// ============================================================================
// Test Access Tokens
// ============================================================================

/// Token with access to the /system endpoints
pub const ADMIN_TOKEN: &str = "e2e-admin-token";

/// Token accepted as authenticated but without admin access
pub const QUERY_TOKEN: &str = "e2e-query-token";

// ============================================================================
// Test Field Catalog
// ============================================================================

/// Field names installed into the catalog by `TestServer::spawn()`,
/// already in sorted order.
pub const TEST_FIELDS: &[&str] = &["facility", "level", "message", "source", "timestamp"];

// ============================================================================
// Timeouts
// ============================================================================

/// Timeout for individual HTTP requests
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// How long to wait for the server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Poll interval while waiting for server readiness
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;
