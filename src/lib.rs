//! Greeter: a small web application around two pieces of logic
//!
//! - Session merge: ordered string sessions with last-write-wins `with`,
//!   carried in an HMAC-signed cookie.
//! - JSON adapter: documents built from native mappings or parsed text, with
//!   depth-first `find_path` and strict typed extraction.
//!
//! The HTTP surface (axum) and an explicit test harness sit on top.

pub mod config;
pub mod core;
pub mod error;
pub mod testing;
pub mod types;

// =============================================================================
// DEFAULTS
// =============================================================================

/// Listen address
pub const DEFAULT_ADDR: &str = "127.0.0.1:9000";

/// Name of the session cookie
pub const DEFAULT_SESSION_COOKIE: &str = "GREETER_SESSION";

/// Development signing secret. Override it outside of tests.
pub const DEFAULT_SECRET: &str = "changeme-greeter-development-secret";

/// Value served by GET /key
pub const DEFAULT_KEY: &str = "secret";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
