//! Backend abstraction

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{QueryResult, QueryValue, Row};

/// A database that can run SQL text with positional parameters.
///
/// Statements without parameters are sent as plain text; account management
/// statements (`GRANT`, `SHOW GRANTS`, ...) are not all preparable.
#[async_trait]
pub trait DatabaseBackend: Send + Sync {
	async fn execute(&self, sql: &str, params: Vec<QueryValue>) -> Result<QueryResult>;

	async fn fetch_one(&self, sql: &str, params: Vec<QueryValue>) -> Result<Row>;

	async fn fetch_all(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>>;

	async fn fetch_optional(&self, sql: &str, params: Vec<QueryValue>) -> Result<Option<Row>>;
}
