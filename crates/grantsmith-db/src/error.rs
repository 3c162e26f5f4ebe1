//! Database error types

use sqlx::mysql::MySqlDatabaseError;

/// Server error number for `SHOW GRANTS` on a principal with no grants
pub const NONEXISTING_GRANT: &str = "1141";

/// Errors raised by the connection layer
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
	/// The server could not be reached, or the pool gave up
	#[error("Connection error: {0}")]
	ConnectionError(String),

	/// The server rejected a statement
	#[error("Server error{}: {message}", code_suffix(.code))]
	Server {
		code: Option<String>,
		message: String,
	},

	#[error("Query error: {0}")]
	QueryError(String),

	#[error("Query returned no rows")]
	NoRows,

	#[error("Column not found: {0}")]
	ColumnNotFound(String),

	#[error("Type error: {0}")]
	TypeError(String),
}

impl DatabaseError {
	/// Whether the failure happened before the server could answer
	pub fn is_connectivity(&self) -> bool {
		matches!(self, Self::ConnectionError(_))
	}

	/// The server error number, when the server answered with one
	pub fn server_code(&self) -> Option<&str> {
		match self {
			Self::Server { code, .. } => code.as_deref(),
			_ => None,
		}
	}

	/// Whether the server reported that the principal holds no grants
	pub fn is_missing_grant(&self) -> bool {
		self.server_code() == Some(NONEXISTING_GRANT)
	}
}

impl From<sqlx::Error> for DatabaseError {
	fn from(err: sqlx::Error) -> Self {
		match err {
			// MySQL reports its error number; other drivers fall back to SQLSTATE.
			sqlx::Error::Database(db_err) => Self::Server {
				code: match db_err.try_downcast_ref::<MySqlDatabaseError>() {
					Some(mysql) => Some(mysql.number().to_string()),
					None => db_err.code().map(|c| c.into_owned()),
				},
				message: db_err.message().to_string(),
			},
			sqlx::Error::RowNotFound => Self::NoRows,
			sqlx::Error::ColumnNotFound(name) => Self::ColumnNotFound(name),
			sqlx::Error::Io(_)
			| sqlx::Error::Tls(_)
			| sqlx::Error::Protocol(_)
			| sqlx::Error::PoolTimedOut
			| sqlx::Error::PoolClosed
			| sqlx::Error::WorkerCrashed
			| sqlx::Error::Configuration(_) => Self::ConnectionError(err.to_string()),
			other => Self::QueryError(other.to_string()),
		}
	}
}

fn code_suffix(code: &Option<String>) -> String {
	code.as_deref().map(|c| format!(" {}", c)).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn test_server_error_display_with_code() {
		let err = DatabaseError::Server {
			code: Some("42000".to_string()),
			message: "You have an error in your SQL syntax".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"Server error 42000: You have an error in your SQL syntax"
		);
	}

	#[test]
	fn test_server_error_display_without_code() {
		let err = DatabaseError::Server {
			code: None,
			message: "denied".to_string(),
		};
		assert_eq!(err.to_string(), "Server error: denied");
	}

	#[test]
	fn test_sqlx_pool_timeout_is_connectivity() {
		let err = DatabaseError::from(sqlx::Error::PoolTimedOut);
		assert!(err.is_connectivity());
	}

	#[rstest]
	#[case(Some("1141"), true)]
	#[case(Some("1044"), false)]
	#[case(None, false)]
	fn test_missing_grant_is_recognized_by_number(#[case] code: Option<&str>, #[case] missing: bool) {
		let err = DatabaseError::Server {
			code: code.map(str::to_string),
			message: "There is no such grant defined for user 'app' on host '%'".to_string(),
		};
		assert_eq!(err.is_missing_grant(), missing);
		assert!(!DatabaseError::ConnectionError("refused".to_string()).is_missing_grant());
	}

	#[test]
	fn test_sqlx_row_not_found() {
		let err = DatabaseError::from(sqlx::Error::RowNotFound);
		assert!(matches!(err, DatabaseError::NoRows));
		assert!(!err.is_connectivity());
	}
}
