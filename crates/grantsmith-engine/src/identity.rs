//! Resource identifiers
//!
//! Identifiers are `@`-separated and must have exactly the expected number
//! of fields; grant identifiers carry a `:`-separated quoted database.

use grantsmith_dcl::{Principal, Scope, quote_identifier};

use crate::error::{ReconcileError, Result};

/// `SECRET@USERNAME_KEY@PASSWORD_KEY@HOST`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId {
	pub secret_name: String,
	pub username_key: String,
	pub password_key: String,
	pub host: String,
}

impl UserId {
	pub fn parse(id: &str) -> Result<Self> {
		let [secret_name, username_key, password_key, host] =
			split_exact::<4>(id, "SECRET_NAME@USERNAME_KEY@PASSWORD_KEY@HOST")?;
		Ok(Self {
			secret_name,
			username_key,
			password_key,
			host,
		})
	}
}

impl std::fmt::Display for UserId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{}@{}@{}@{}",
			self.secret_name, self.username_key, self.password_key, self.host
		)
	}
}

/// `SECRET@USERNAME_KEY@HOST`, the identifier accepted by grant import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantImportId {
	pub secret_name: String,
	pub username_key: String,
	pub host: String,
}

impl GrantImportId {
	pub fn parse(id: &str) -> Result<Self> {
		let [secret_name, username_key, host] =
			split_exact::<3>(id, "SECRET_NAME@USERNAME_KEY@HOST")?;
		Ok(Self {
			secret_name,
			username_key,
			host,
		})
	}

	/// Identifier of one grant restored by import
	pub fn restored_grant_id(&self, scope: &Scope) -> String {
		format!(
			"{}@{}@{}:{}",
			self.secret_name,
			self.username_key,
			self.host,
			quote_identifier(scope.database())
		)
	}
}

/// Identifier of a grant created for `principal` on `scope`:
/// `user@host:` `` `db` `` for accounts, `role:` `` `db` `` for roles.
pub fn grant_id(principal: &Principal, scope: &Scope) -> String {
	let database = quote_identifier(scope.database());
	match principal {
		Principal::User(account) => format!("{}@{}:{}", account.name(), account.host(), database),
		Principal::Role(role) => format!("{}:{}", role, database),
	}
}

/// Identifier of a generated password: `user@host`
pub fn user_password_id(user: &str, host: &str) -> String {
	format!("{}@{}", user, host)
}

fn split_exact<const N: usize>(id: &str, expected: &str) -> Result<[String; N]> {
	let malformed = || ReconcileError::MalformedIdentifier {
		id: id.to_string(),
		expected: expected.to_string(),
	};
	let parts: Vec<String> = id.split('@').map(str::to_string).collect();
	if parts.iter().any(String::is_empty) {
		return Err(malformed());
	}
	parts.try_into().map_err(|_| malformed())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn test_user_id_round_trip() {
		let id = UserId::parse("prod/app@username@password@%").unwrap();
		assert_eq!(id.secret_name, "prod/app");
		assert_eq!(id.host, "%");
		assert_eq!(id.to_string(), "prod/app@username@password@%");
	}

	#[rstest]
	#[case("a@b@c")]
	#[case("a@b@c@d@e")]
	#[case("a@@c@d")]
	#[case("")]
	fn test_user_id_rejects_wrong_shape(#[case] id: &str) {
		assert!(matches!(
			UserId::parse(id),
			Err(ReconcileError::MalformedIdentifier { .. })
		));
	}

	#[rstest]
	#[case("secret@user")]
	#[case("secret@user@host@extra")]
	fn test_grant_import_id_requires_three_fields(#[case] id: &str) {
		let err = GrantImportId::parse(id).unwrap_err();
		assert!(
			matches!(err, ReconcileError::MalformedIdentifier { ref expected, .. } if expected == "SECRET_NAME@USERNAME_KEY@HOST")
		);
	}

	#[test]
	fn test_restored_grant_id() {
		let id = GrantImportId::parse("prod/app@username@localhost").unwrap();
		assert_eq!(
			id.restored_grant_id(&Scope::table("shop", "*")),
			"prod/app@username@localhost:`shop`"
		);
		assert_eq!(
			id.restored_grant_id(&Scope::global()),
			"prod/app@username@localhost:*"
		);
	}

	#[test]
	fn test_grant_id_for_user_and_role() {
		assert_eq!(
			grant_id(&Principal::user("app", "%"), &Scope::table("shop", "orders")),
			"app@%:`shop`"
		);
		assert_eq!(
			grant_id(&Principal::role("reader"), &Scope::table("shop", "*")),
			"reader:`shop`"
		);
	}

	#[test]
	fn test_user_password_id() {
		assert_eq!(user_password_id("jdoe", "localhost"), "jdoe@localhost");
	}
}
