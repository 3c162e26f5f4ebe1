use grantsmith_db::{DatabaseBackend as BackendTrait, QueryResult, QueryValue, Result, Row};
use mockall::mock;
use rstest::*;

// ============================================================================
// mockall-based Database Backend Mock
// ============================================================================

mock! {
	/// Mock implementation of the `DatabaseBackend` trait using mockall
	///
	/// Use it where the exact statements and their order matter:
	///
	/// ```rust
	/// use grantsmith_test::MockDatabaseBackend;
	/// use grantsmith_db::{DatabaseBackend, QueryResult};
	///
	/// #[tokio::main]
	/// async fn main() {
	/// 	let mut mock = MockDatabaseBackend::new();
	/// 	mock.expect_execute()
	/// 		.withf(|sql, params| sql.starts_with("DROP USER") && params.is_empty())
	/// 		.times(1)
	/// 		.returning(|_, _| Ok(QueryResult { rows_affected: 0 }));
	///
	/// 	let result = mock.execute("DROP USER 'app'@'%'", Vec::new()).await;
	/// 	assert!(result.is_ok());
	/// }
	/// ```
	pub DatabaseBackend {}

	#[async_trait::async_trait]
	impl BackendTrait for DatabaseBackend {
		async fn execute(&self, sql: &str, params: Vec<QueryValue>) -> Result<QueryResult>;
		async fn fetch_one(&self, sql: &str, params: Vec<QueryValue>) -> Result<Row>;
		async fn fetch_all(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>>;
		async fn fetch_optional(&self, sql: &str, params: Vec<QueryValue>) -> Result<Option<Row>>;
	}
}

// ============================================================================
// rstest Fixtures
// ============================================================================

/// Mock backend answering the version query with `8.0.36`
///
/// Further expectations are added by the test.
#[fixture]
pub fn mock_backend() -> MockDatabaseBackend {
	let mut mock = MockDatabaseBackend::new();
	mock.expect_fetch_optional()
		.withf(|sql, _| sql == "SELECT @@GLOBAL.version")
		.returning(|_, _| Ok(Some(Row::from_pairs([("@@GLOBAL.version", "8.0.36")]))));
	mock
}

#[cfg(test)]
mod tests {
	use super::*;
	use grantsmith_db::{DatabaseConnection, DatabaseError};
	use std::sync::Arc;

	#[rstest]
	#[tokio::test]
	async fn test_mock_backend_answers_version(mock_backend: MockDatabaseBackend) {
		let conn = DatabaseConnection::new(Arc::new(mock_backend));
		let value = conn
			.query_scalar("SELECT @@GLOBAL.version", Vec::new())
			.await
			.unwrap();
		assert_eq!(value, Some(QueryValue::String("8.0.36".to_string())));
	}

	#[rstest]
	#[tokio::test]
	async fn test_mock_execute_with_verification(mut mock_backend: MockDatabaseBackend) {
		mock_backend
			.expect_execute()
			.withf(|sql, _| sql == "DROP USER 'old'@'localhost'")
			.times(1)
			.returning(|_, _| {
				Err(DatabaseError::Server {
					code: Some("1396".to_string()),
					message: "Operation DROP USER failed".to_string(),
				})
			});

		let conn = DatabaseConnection::new(Arc::new(mock_backend));
		let err = conn
			.execute_statement("DROP USER 'old'@'localhost'")
			.await
			.unwrap_err();
		assert!(err.to_string().contains("1396"));
	}
}
