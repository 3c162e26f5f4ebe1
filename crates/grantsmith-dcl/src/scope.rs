//! Privilege scopes and identifier quoting

use std::fmt::{self, Display, Formatter};

pub const WILDCARD: &str = "*";

/// Quote an identifier with backticks, doubling embedded backticks.
///
/// The wildcard `*` is returned unquoted.
///
/// ```
/// use grantsmith_dcl::quote_identifier;
///
/// assert_eq!(quote_identifier("orders"), "`orders`");
/// assert_eq!(quote_identifier("a`b"), "`a``b`");
/// assert_eq!(quote_identifier("*"), "*");
/// ```
pub fn quote_identifier(identifier: &str) -> String {
	if identifier == WILDCARD {
		return WILDCARD.to_string();
	}
	format!("`{}`", identifier.replace('`', "``"))
}

/// Inverse of [`quote_identifier`]; unquoted input is returned unchanged.
pub fn unquote_identifier(identifier: &str) -> String {
	match identifier
		.strip_prefix('`')
		.and_then(|rest| rest.strip_suffix('`'))
	{
		Some(inner) => inner.replace("``", "`"),
		None => identifier.to_string(),
	}
}

/// The object a privilege applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
	/// `database.table`, either part may be `*`
	Table { database: String, table: String },
	/// A stored procedure, rendered `PROCEDURE <name>` as given
	Procedure(String),
	/// A stored function, rendered `FUNCTION <name>` as given
	Function(String),
}

impl Scope {
	/// A table scope; an empty table name means every table.
	pub fn table(database: impl Into<String>, table: impl Into<String>) -> Self {
		let table = table.into();
		Self::Table {
			database: database.into(),
			table: if table.is_empty() {
				WILDCARD.to_string()
			} else {
				table
			},
		}
	}

	/// `*.*`
	pub fn global() -> Self {
		Self::table(WILDCARD, WILDCARD)
	}

	pub fn procedure(name: impl Into<String>) -> Self {
		Self::Procedure(name.into())
	}

	pub fn is_routine(&self) -> bool {
		matches!(self, Self::Procedure(_) | Self::Function(_))
	}

	/// The database part, or the routine name for routine scopes
	pub fn database(&self) -> &str {
		match self {
			Self::Table { database, .. } => database,
			Self::Procedure(name) | Self::Function(name) => name,
		}
	}

	/// The table part; routines have none
	pub fn table_name(&self) -> Option<&str> {
		match self {
			Self::Table { table, .. } => Some(table),
			_ => None,
		}
	}
}

impl Display for Scope {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Table { database, table } => write!(
				f,
				"{}.{}",
				quote_identifier(database),
				quote_identifier(table)
			),
			Self::Procedure(name) => write!(f, "PROCEDURE {}", name),
			Self::Function(name) => write!(f, "FUNCTION {}", name),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("db", "`db`")]
	#[case("a`b", "`a``b`")]
	#[case("``", "``````")]
	#[case("*", "*")]
	#[case("my db", "`my db`")]
	fn test_quote_identifier(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(quote_identifier(input), expected);
	}

	#[rstest]
	#[case("`db`", "db")]
	#[case("`a``b`", "a`b")]
	#[case("*", "*")]
	#[case("plain", "plain")]
	#[case("`", "`")]
	fn test_unquote_identifier(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(unquote_identifier(input), expected);
	}

	#[rstest]
	#[case(Scope::table("shop", "orders"), "`shop`.`orders`")]
	#[case(Scope::table("shop", ""), "`shop`.*")]
	#[case(Scope::table("shop", "*"), "`shop`.*")]
	#[case(Scope::global(), "*.*")]
	#[case(Scope::procedure("shop.refund"), "PROCEDURE shop.refund")]
	#[case(Scope::Function("shop.total".to_string()), "FUNCTION shop.total")]
	fn test_scope_display(#[case] scope: Scope, #[case] expected: &str) {
		assert_eq!(scope.to_string(), expected);
	}

	#[test]
	fn test_scope_accessors() {
		let scope = Scope::table("shop", "");
		assert_eq!(scope.database(), "shop");
		assert_eq!(scope.table_name(), Some("*"));
		assert!(!scope.is_routine());

		let routine = Scope::procedure("shop.refund");
		assert_eq!(routine.database(), "shop.refund");
		assert_eq!(routine.table_name(), None);
		assert!(routine.is_routine());
	}

	mod properties {
		use super::super::*;
		use proptest::prelude::*;

		proptest! {
			#[test]
			fn quote_then_unquote_restores_identifier(name in "[a-zA-Z0-9_`$ ]{1,24}") {
				prop_assume!(name != WILDCARD);
				prop_assert_eq!(unquote_identifier(&quote_identifier(&name)), name);
			}
		}
	}
}
