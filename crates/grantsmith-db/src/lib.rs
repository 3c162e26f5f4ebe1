//! # grantsmith-db
//!
//! The connection collaborator used by the reconciliation engine.
//!
//! - [`DatabaseBackend`]: async trait for running SQL with bound parameters
//! - [`DatabaseConnection`]: cheap-to-clone handle exposing
//!   `execute_statement`, `query_rows` and `query_scalar`
//! - [`dialect::MySqlBackend`]: sqlx implementation, including connection
//!   retry until the configured timeout elapses
//!
//! Rows keep their column order, so statements such as `SHOW GRANTS`, whose
//! column name depends on the account, can be read positionally.

pub mod backend;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod types;

pub use backend::DatabaseBackend;
pub use connection::DatabaseConnection;
pub use error::{DatabaseError, Result};
pub use types::{QueryResult, QueryValue, Row};
