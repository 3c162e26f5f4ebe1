//! Error types for statement rendering

/// Errors raised while rendering a mutation
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DclError {
	/// The server does not support the requested feature
	#[error("{feature} requires server version {minimum_version} or later")]
	UnsupportedFeature {
		feature: String,
		minimum_version: String,
	},

	/// A GRANT or REVOKE with nothing to grant or revoke
	#[error("{0} requires at least one privilege or role")]
	EmptyGrantSet(&'static str),

	/// An account or role name that cannot be embedded in a statement
	#[error("Invalid principal: {0}")]
	InvalidPrincipal(String),
}

pub type Result<T> = std::result::Result<T, DclError>;
