//! Database connection handle

use std::sync::Arc;

use grantsmith_conf::{Credentials, ProviderSettings};

use crate::{
	backend::DatabaseBackend,
	dialect::MySqlBackend,
	error::Result,
	types::{QueryValue, Row},
};

/// Database connection wrapper
#[derive(Clone)]
pub struct DatabaseConnection {
	backend: Arc<dyn DatabaseBackend>,
}

impl DatabaseConnection {
	pub fn new(backend: Arc<dyn DatabaseBackend>) -> Self {
		Self { backend }
	}

	/// Connect to the server described by `settings`, retrying until the
	/// configured timeout elapses.
	pub async fn connect_mysql(
		settings: &ProviderSettings,
		credentials: &Credentials,
	) -> Result<Self> {
		let backend = MySqlBackend::connect(settings, credentials).await?;
		Ok(Self {
			backend: Arc::new(backend),
		})
	}

	pub fn backend(&self) -> Arc<dyn DatabaseBackend> {
		self.backend.clone()
	}

	/// Run a statement that returns no rows; yields the affected row count.
	pub async fn execute_statement(&self, sql: &str) -> Result<u64> {
		let result = self.backend.execute(sql, Vec::new()).await?;
		Ok(result.rows_affected)
	}

	/// Run a query and collect every row.
	pub async fn query_rows(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>> {
		self.backend.fetch_all(sql, params).await
	}

	/// First column of the first row, or `None` when the query yields no rows.
	pub async fn query_scalar(&self, sql: &str, params: Vec<QueryValue>) -> Result<Option<QueryValue>> {
		let row = self.backend.fetch_optional(sql, params).await?;
		Ok(row.and_then(|r| r.first().cloned()))
	}
}

impl std::fmt::Debug for DatabaseConnection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DatabaseConnection").finish_non_exhaustive()
	}
}
