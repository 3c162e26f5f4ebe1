//! `DatabaseConnection` operations over a mocked backend.

use std::sync::Arc;

use grantsmith_db::{DatabaseConnection, DatabaseError, QueryResult, QueryValue, Row};
use grantsmith_test::{MockDatabaseBackend, mock_backend};
use mockall::Sequence;
use rstest::*;

#[rstest]
#[tokio::test]
async fn test_query_scalar_reads_first_column(mock_backend: MockDatabaseBackend) {
	let conn = DatabaseConnection::new(Arc::new(mock_backend));

	let value = conn
		.query_scalar("SELECT @@GLOBAL.version", Vec::new())
		.await
		.unwrap();
	assert_eq!(value, Some(QueryValue::String("8.0.36".to_string())));
}

#[tokio::test]
async fn test_query_scalar_no_rows() {
	let mut backend = MockDatabaseBackend::new();
	backend
		.expect_fetch_optional()
		.withf(|sql, params| {
			sql.starts_with("SELECT User FROM mysql.user") && *params == [QueryValue::from("nobody")]
		})
		.times(1)
		.returning(|_, _| Ok(None));
	let conn = DatabaseConnection::new(Arc::new(backend));

	let value = conn
		.query_scalar("SELECT User FROM mysql.user WHERE User = ?", vec!["nobody".into()])
		.await
		.unwrap();
	assert_eq!(value, None);
}

#[tokio::test]
async fn test_query_rows_passes_parameters() {
	let mut backend = MockDatabaseBackend::new();
	backend
		.expect_fetch_all()
		.withf(|sql, params| {
			sql == "SELECT COUNT(1) FROM mysql.user WHERE User = ? AND Host = ?"
				&& *params == [QueryValue::from("app"), QueryValue::from("%")]
		})
		.times(1)
		.returning(|_, _| Ok(vec![Row::from_pairs([("COUNT(1)", 1_i64)])]));
	let conn = DatabaseConnection::new(Arc::new(backend));

	let rows = conn
		.query_rows(
			"SELECT COUNT(1) FROM mysql.user WHERE User = ? AND Host = ?",
			vec!["app".into(), "%".into()],
		)
		.await
		.unwrap();
	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0].get_index::<i64>(0).unwrap(), 1);
}

#[tokio::test]
async fn test_execute_statements_in_order() {
	let mut backend = MockDatabaseBackend::new();
	let mut seq = Sequence::new();
	backend
		.expect_execute()
		.withf(|sql, params| sql.starts_with("GRANT SELECT") && params.is_empty())
		.times(1)
		.in_sequence(&mut seq)
		.returning(|_, _| Ok(QueryResult { rows_affected: 0 }));
	backend
		.expect_execute()
		.withf(|sql, _| sql.starts_with("REVOKE DELETE"))
		.times(1)
		.in_sequence(&mut seq)
		.returning(|_, _| Ok(QueryResult { rows_affected: 0 }));
	let conn = DatabaseConnection::new(Arc::new(backend));

	conn.execute_statement("GRANT SELECT ON `shop`.* TO 'app'@'%'")
		.await
		.unwrap();
	conn.execute_statement("REVOKE DELETE ON `shop`.* FROM 'app'@'%'")
		.await
		.unwrap();
}

#[tokio::test]
async fn test_execute_statement_surfaces_server_error() {
	let mut backend = MockDatabaseBackend::new();
	backend
		.expect_execute()
		.withf(|sql, _| sql == "CREATE USER 'a'@'b'")
		.times(1)
		.returning(|_, _| {
			Err(DatabaseError::Server {
				code: Some("1396".to_string()),
				message: "Operation CREATE USER failed".to_string(),
			})
		});
	let conn = DatabaseConnection::new(Arc::new(backend));

	let err = conn
		.execute_statement("CREATE USER 'a'@'b'")
		.await
		.unwrap_err();
	assert!(matches!(err, DatabaseError::Server { ref message, .. } if message.contains("CREATE USER")));
	assert_eq!(err.server_code(), Some("1396"));
	assert!(!err.is_connectivity());
}
