//! Rendered statements and the builders that produce them

pub mod grant;
pub mod revoke;
pub mod user;

use std::fmt;

pub use grant::GrantStatement;
pub use revoke::{RevokeGrantOptionStatement, RevokeStatement, RevokeTarget};
pub use user::{AlterUserPasswordStatement, AlterUserTlsStatement, CreateUserStatement, DropUserStatement};

const REDACTED_LITERAL: &str = "'****'";

/// SQL text ready for execution
///
/// Statements that embed a secret carry a redacted rendering as well;
/// `Display` and `Debug` only ever show the redacted form.
#[derive(Clone, PartialEq, Eq)]
pub struct Statement {
	sql: String,
	redacted: Option<String>,
}

impl Statement {
	pub fn new(sql: impl Into<String>) -> Self {
		Self {
			sql: sql.into(),
			redacted: None,
		}
	}

	/// A statement whose text contains a secret
	pub fn with_secret(sql: impl Into<String>, redacted: impl Into<String>) -> Self {
		Self {
			sql: sql.into(),
			redacted: Some(redacted.into()),
		}
	}

	/// The exact text to send to the server
	pub fn sql(&self) -> &str {
		&self.sql
	}

	/// The text safe to log or report
	pub fn redacted(&self) -> &str {
		self.redacted.as_deref().unwrap_or(&self.sql)
	}

	pub fn contains_secret(&self) -> bool {
		self.redacted.is_some()
	}
}

impl fmt::Display for Statement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.redacted())
	}
}

impl fmt::Debug for Statement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Statement").field(&self.redacted()).finish()
	}
}

/// Render `value` as a single-quoted string literal.
///
/// ```
/// use grantsmith_dcl::escape_string_literal;
///
/// assert_eq!(escape_string_literal("it's"), "'it''s'");
/// assert_eq!(escape_string_literal(r"a\b"), r"'a\\b'");
/// ```
pub fn escape_string_literal(value: &str) -> String {
	let mut out = String::with_capacity(value.len() + 2);
	out.push('\'');
	for c in value.chars() {
		match c {
			'\'' => out.push_str("''"),
			'\\' => out.push_str("\\\\"),
			other => out.push(other),
		}
	}
	out.push('\'');
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_plain_statement_redacted_is_sql() {
		let stmt = Statement::new("DROP USER 'a'@'%'");
		assert_eq!(stmt.redacted(), stmt.sql());
		assert!(!stmt.contains_secret());
	}

	#[test]
	fn test_secret_statement_display_is_redacted() {
		let stmt = Statement::with_secret(
			"ALTER USER 'a'@'%' IDENTIFIED BY 'hunter2'",
			"ALTER USER 'a'@'%' IDENTIFIED BY '****'",
		);
		assert!(!stmt.to_string().contains("hunter2"));
		assert!(!format!("{:?}", stmt).contains("hunter2"));
		assert!(stmt.sql().contains("hunter2"));
	}

	#[test]
	fn test_escape_plain_literal() {
		assert_eq!(escape_string_literal("s3cret!"), "'s3cret!'");
	}
}
