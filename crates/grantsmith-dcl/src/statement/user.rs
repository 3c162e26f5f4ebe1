//! Account statements: CREATE USER, ALTER USER, SET PASSWORD, DROP USER

use super::{REDACTED_LITERAL, Statement, escape_string_literal};
use crate::capabilities::{Capabilities, USER_TLS_MINIMUM_VERSION};
use crate::error::{DclError, Result};
use crate::grant_set::TlsRequirement;
use crate::principal::Account;

/// CREATE USER statement builder
#[derive(Debug, Clone)]
pub struct CreateUserStatement {
	account: Account,
	password: String,
	tls: TlsRequirement,
}

impl CreateUserStatement {
	pub fn new(account: Account, password: impl Into<String>) -> Self {
		Self {
			account,
			password: password.into(),
			tls: TlsRequirement::None,
		}
	}

	pub fn require(mut self, tls: TlsRequirement) -> Self {
		self.tls = tls;
		self
	}

	/// Build the statement. `REQUIRE` is only emitted on servers that
	/// accept it on account statements.
	pub fn build(&self, caps: &Capabilities) -> Statement {
		let render = |password: &str| {
			let mut sql = format!("CREATE USER {} IDENTIFIED BY {}", self.account, password);
			if caps.supports_user_tls_require {
				sql.push_str(" REQUIRE ");
				sql.push_str(&self.tls.to_string());
			}
			sql
		};
		Statement::with_secret(
			render(&escape_string_literal(&self.password)),
			render(REDACTED_LITERAL),
		)
	}
}

/// Password change, in whichever form the server accepts
#[derive(Debug, Clone)]
pub struct AlterUserPasswordStatement {
	account: Account,
	password: String,
}

impl AlterUserPasswordStatement {
	pub fn new(account: Account, password: impl Into<String>) -> Self {
		Self {
			account,
			password: password.into(),
		}
	}

	pub fn build(&self, caps: &Capabilities) -> Statement {
		let render = |literal: &str| {
			if caps.supports_alter_user_syntax {
				format!("ALTER USER {} IDENTIFIED BY {}", self.account, literal)
			} else if caps.requires_legacy_password_function {
				format!("SET PASSWORD FOR {} = PASSWORD({})", self.account, literal)
			} else {
				format!("SET PASSWORD FOR {} = {}", self.account, literal)
			}
		};
		Statement::with_secret(
			render(&escape_string_literal(&self.password)),
			render(REDACTED_LITERAL),
		)
	}
}

/// `ALTER USER ... REQUIRE ...`
#[derive(Debug, Clone)]
pub struct AlterUserTlsStatement {
	account: Account,
	tls: TlsRequirement,
}

impl AlterUserTlsStatement {
	pub fn new(account: Account, tls: TlsRequirement) -> Self {
		Self { account, tls }
	}

	pub fn build(&self, caps: &Capabilities) -> Result<Statement> {
		if !caps.supports_user_tls_require {
			return Err(DclError::UnsupportedFeature {
				feature: "TLS requirement on accounts".to_string(),
				minimum_version: USER_TLS_MINIMUM_VERSION.to_string(),
			});
		}
		Ok(Statement::new(format!(
			"ALTER USER {} REQUIRE {}",
			self.account, self.tls
		)))
	}
}

/// DROP USER statement builder
#[derive(Debug, Clone)]
pub struct DropUserStatement {
	account: Account,
}

impl DropUserStatement {
	pub fn new(account: Account) -> Self {
		Self { account }
	}

	pub fn build(&self) -> Statement {
		Statement::new(format!("DROP USER {}", self.account))
	}
}
