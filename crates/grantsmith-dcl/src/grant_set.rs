//! Grant sets and TLS requirements

use indexmap::IndexSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// What a grant confers: privileges, or membership in roles
///
/// Entries are unique and keep the order they were supplied in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantSet {
	Privileges(IndexSet<String>),
	Roles(IndexSet<String>),
}

impl GrantSet {
	pub fn privileges<I, S>(privileges: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::Privileges(privileges.into_iter().map(Into::into).collect())
	}

	pub fn roles<I, S>(roles: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::Roles(roles.into_iter().map(Into::into).collect())
	}

	pub fn is_roles(&self) -> bool {
		matches!(self, Self::Roles(_))
	}

	pub fn is_empty(&self) -> bool {
		self.items().is_empty()
	}

	pub fn items(&self) -> &IndexSet<String> {
		match self {
			Self::Privileges(items) | Self::Roles(items) => items,
		}
	}

	/// Render the list as it appears after `GRANT`/`REVOKE`.
	///
	/// Roles are single-quoted; privileges are emitted verbatim.
	pub fn render_list(&self) -> String {
		match self {
			Self::Privileges(items) => join(items.iter().map(String::as_str)),
			Self::Roles(items) => join(items.iter().map(|r| format!("'{}'", r))),
		}
	}
}

pub(crate) fn join<I, S>(items: I) -> String
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut out = String::new();
	for (i, item) in items.into_iter().enumerate() {
		if i > 0 {
			out.push_str(", ");
		}
		out.push_str(item.as_ref());
	}
	out
}

/// TLS requirement attached to an account
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TlsRequirement {
	#[default]
	None,
	Ssl,
	X509,
	/// Cipher, issuer or subject requirements, rendered verbatim
	Custom(String),
}

impl FromStr for TlsRequirement {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();
		Ok(match trimmed.to_ascii_uppercase().as_str() {
			"" | "NONE" => Self::None,
			"SSL" => Self::Ssl,
			"X509" => Self::X509,
			_ => Self::Custom(trimmed.to_string()),
		})
	}
}

impl Display for TlsRequirement {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::None => f.write_str("NONE"),
			Self::Ssl => f.write_str("SSL"),
			Self::X509 => f.write_str("X509"),
			Self::Custom(raw) => f.write_str(raw),
		}
	}
}
