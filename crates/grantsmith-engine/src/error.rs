//! Reconciliation error types

use grantsmith_conf::SecretError;
use grantsmith_db::DatabaseError;
use grantsmith_dcl::DclError;

/// Errors surfaced by reconciliation operations
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
	/// The server could not be reached or could not answer a read
	#[error("Connectivity error: {0}")]
	Connectivity(#[from] DatabaseError),

	/// Server output did not match the expected grammar
	#[error("Parse error: {message} (input: {raw:?})")]
	Parse { message: String, raw: String },

	#[error("{feature} requires server version {minimum_version} or later")]
	UnsupportedFeature {
		feature: String,
		minimum_version: String,
	},

	#[error("Malformed identifier {id:?}: expected {expected}")]
	MalformedIdentifier { id: String, expected: String },

	/// A mutation was rejected; carries the redacted statement text
	#[error("Error running SQL ({statement}): {message}")]
	StatementExecution { statement: String, message: String },

	#[error("Invalid configuration: {0}")]
	InvalidConfiguration(String),

	#[error("Secret error: {0}")]
	Secret(#[from] SecretError),

	#[error("Not found: {0}")]
	NotFound(String),
}

impl ReconcileError {
	pub(crate) fn parse(message: impl Into<String>, raw: impl Into<String>) -> Self {
		Self::Parse {
			message: message.into(),
			raw: raw.into(),
		}
	}

	pub(crate) fn invalid(message: impl Into<String>) -> Self {
		Self::InvalidConfiguration(message.into())
	}
}

impl From<DclError> for ReconcileError {
	fn from(err: DclError) -> Self {
		match err {
			DclError::UnsupportedFeature {
				feature,
				minimum_version,
			} => Self::UnsupportedFeature {
				feature,
				minimum_version,
			},
			other => Self::InvalidConfiguration(other.to_string()),
		}
	}
}

pub type Result<T> = std::result::Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_unsupported_feature_keeps_minimum_version() {
		let err: ReconcileError = DclError::UnsupportedFeature {
			feature: "roles".to_string(),
			minimum_version: "8.0.1".to_string(),
		}
		.into();
		assert_eq!(
			err.to_string(),
			"roles requires server version 8.0.1 or later"
		);
	}

	#[test]
	fn test_empty_grant_set_becomes_invalid_configuration() {
		let err: ReconcileError = DclError::EmptyGrantSet("GRANT").into();
		assert!(matches!(err, ReconcileError::InvalidConfiguration(_)));
	}

	#[test]
	fn test_database_error_is_connectivity() {
		let err: ReconcileError = DatabaseError::ConnectionError("refused".to_string()).into();
		assert!(matches!(err, ReconcileError::Connectivity(_)));
	}
}
