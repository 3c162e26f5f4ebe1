//! # grantsmith-test
//!
//! Testing utilities for grantsmith.
//!
//! - [`ScriptedBackend`]: answers queries from a script keyed by SQL prefix
//!   and records every statement it is sent
//! - [`fixtures::MockDatabaseBackend`]: mockall mock for strict expectations
//! - rstest fixtures for common server generations and secrets
//!
//! ```
//! use grantsmith_test::ScriptedBackend;
//!
//! let backend = ScriptedBackend::new()
//! 	.with_version("8.0.36")
//! 	.with_grants("'app'@'%'", &["GRANT USAGE ON *.* TO `app`@`%`"]);
//! assert!(backend.executed().is_empty());
//! ```

pub mod fixtures;
pub mod scripted;

pub use fixtures::{
	MockDatabaseBackend, app_secrets, mariadb, mock_backend, mysql56, mysql57, mysql80,
};
pub use scripted::{RecordedQuery, ScriptedBackend};
