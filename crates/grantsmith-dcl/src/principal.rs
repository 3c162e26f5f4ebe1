//! Grant subjects: accounts and roles

use std::fmt::{self, Display, Formatter};

use crate::error::{DclError, Result};

/// A `'user'@'host'` account
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Account {
	name: String,
	host: String,
}

impl Account {
	pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			host: host.into(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn host(&self) -> &str {
		&self.host
	}

	/// Reject names that cannot be embedded between single quotes.
	pub fn validate(&self) -> Result<()> {
		check_quotable("user", &self.name)?;
		check_quotable("host", &self.host)
	}
}

impl Display for Account {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "'{}'@'{}'", self.name, self.host)
	}
}

/// The subject of a grant
///
/// Names are single-quoted without escaping, so names containing `'` or `\`
/// are rejected by [`Principal::validate`] instead of being rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
	User(Account),
	Role(String),
}

impl Principal {
	pub fn user(name: impl Into<String>, host: impl Into<String>) -> Self {
		Self::User(Account::new(name, host))
	}

	pub fn role(name: impl Into<String>) -> Self {
		Self::Role(name.into())
	}

	pub fn is_role(&self) -> bool {
		matches!(self, Self::Role(_))
	}

	pub fn account(&self) -> Option<&Account> {
		match self {
			Self::User(account) => Some(account),
			Self::Role(_) => None,
		}
	}

	pub fn validate(&self) -> Result<()> {
		match self {
			Self::User(account) => account.validate(),
			Self::Role(name) => check_quotable("role", name),
		}
	}
}

impl Display for Principal {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::User(account) => account.fmt(f),
			Self::Role(name) => write!(f, "'{}'", name),
		}
	}
}

impl From<Account> for Principal {
	fn from(account: Account) -> Self {
		Self::User(account)
	}
}

fn check_quotable(what: &str, value: &str) -> Result<()> {
	if value.is_empty() {
		return Err(DclError::InvalidPrincipal(format!("{} name is empty", what)));
	}
	if value.contains(['\'', '\\']) {
		return Err(DclError::InvalidPrincipal(format!(
			"{} name {:?} contains a quote or backslash",
			what, value
		)));
	}
	Ok(())
}
