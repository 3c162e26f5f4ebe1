//! User resource

use grantsmith_conf::SecretProvider;
use grantsmith_dcl::{Account, Mutation, TlsRequirement};
use secrecy::ExposeSecret;
use tracing::{info, warn};

use super::{DEFAULT_HOST, resolve_username};
use crate::error::{ReconcileError, Result};
use crate::identity::UserId;
use crate::session::Session;

/// Looks up accounts by name, on any host
pub const USER_LOOKUP_QUERY: &str = "SELECT User FROM mysql.user WHERE User = ?";
/// Counts accounts with an exact name and host
pub const USER_COUNT_QUERY: &str = "SELECT COUNT(1) FROM mysql.user WHERE User = ? AND Host = ?";

/// Desired state of an account whose name and password live in a secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSpec {
	pub secret_name: String,
	pub username_key: String,
	pub password_key: String,
	pub host: String,
	pub tls_option: TlsRequirement,
}

impl UserSpec {
	pub fn new(
		secret_name: impl Into<String>,
		username_key: impl Into<String>,
		password_key: impl Into<String>,
	) -> Self {
		Self {
			secret_name: secret_name.into(),
			username_key: username_key.into(),
			password_key: password_key.into(),
			host: DEFAULT_HOST.to_string(),
			tls_option: TlsRequirement::None,
		}
	}

	pub fn host(mut self, host: impl Into<String>) -> Self {
		self.host = host.into();
		self
	}

	pub fn require(mut self, tls: TlsRequirement) -> Self {
		self.tls_option = tls;
		self
	}

	pub fn id(&self) -> UserId {
		UserId {
			secret_name: self.secret_name.clone(),
			username_key: self.username_key.clone(),
			password_key: self.password_key.clone(),
			host: self.host.clone(),
		}
	}
}

pub struct UserReconciler<'a> {
	session: &'a Session,
	secrets: &'a dyn SecretProvider,
}

impl<'a> UserReconciler<'a> {
	pub fn new(session: &'a Session, secrets: &'a dyn SecretProvider) -> Self {
		Self { session, secrets }
	}

	async fn account(&self, spec: &UserSpec) -> Result<Account> {
		let username = resolve_username(self.secrets, &spec.secret_name, &spec.username_key).await?;
		Ok(Account::new(username, spec.host.clone()))
	}

	/// Create the account; returns its identifier.
	pub async fn create(&self, spec: &UserSpec) -> Result<String> {
		let account = self.account(spec).await?;
		let password = self
			.secrets
			.get_value(&spec.secret_name, &spec.password_key)
			.await?;

		self.session
			.apply(&Mutation::CreateUser {
				account: account.clone(),
				password: password.expose_secret().to_string(),
				tls: spec.tls_option.clone(),
			})
			.await?;
		let id = spec.id().to_string();
		info!(%account, %id, "user created");
		Ok(id)
	}

	/// The account name when an account by that name exists on any host.
	pub async fn read(&self, spec: &UserSpec) -> Result<Option<String>> {
		let username = resolve_username(self.secrets, &spec.secret_name, &spec.username_key).await?;
		let rows = self
			.session
			.connection()
			.query_rows(USER_LOOKUP_QUERY, vec![username.clone().into()])
			.await?;
		Ok((!rows.is_empty()).then_some(username))
	}

	/// Apply the changes between `old` and `new`.
	///
	/// A changed password key re-reads the password and sets it. A changed
	/// TLS requirement is applied where the server supports one and skipped
	/// with a warning elsewhere.
	pub async fn update(&self, old: &UserSpec, new: &UserSpec) -> Result<()> {
		let account = self.account(new).await?;

		if old.password_key != new.password_key {
			let password = self
				.secrets
				.get_value(&new.secret_name, &new.password_key)
				.await?;
			self.session
				.apply(&Mutation::AlterUserPassword {
					account: account.clone(),
					password: password.expose_secret().to_string(),
				})
				.await?;
			info!(%account, "password changed");
		}

		if old.tls_option != new.tls_option {
			if self.session.capabilities().supports_user_tls_require {
				self.session
					.apply(&Mutation::AlterUserTls {
						account: account.clone(),
						tls: new.tls_option.clone(),
					})
					.await?;
				info!(%account, tls = %new.tls_option, "TLS requirement changed");
			} else {
				warn!(
					%account,
					version = %self.session.capabilities().version,
					"server cannot set TLS requirements on accounts, skipping"
				);
			}
		}
		Ok(())
	}

	pub async fn delete(&self, spec: &UserSpec) -> Result<()> {
		let account = self.account(spec).await?;
		self.session
			.apply(&Mutation::DropUser {
				account: account.clone(),
			})
			.await?;
		info!(%account, "user dropped");
		Ok(())
	}

	/// Recover a spec from `SECRET_NAME@USERNAME_KEY@PASSWORD_KEY@HOST`.
	///
	/// Both secret members must resolve and the account must exist.
	pub async fn import(&self, id: &str) -> Result<UserSpec> {
		let id = UserId::parse(id)?;
		let username = resolve_username(self.secrets, &id.secret_name, &id.username_key).await?;
		self.secrets
			.get_value(&id.secret_name, &id.password_key)
			.await?;

		let count = self
			.session
			.connection()
			.query_scalar(
				USER_COUNT_QUERY,
				vec![username.clone().into(), id.host.clone().into()],
			)
			.await?;
		let count = match count {
			Some(value) => {
				i64::try_from(value).map_err(|e| ReconcileError::parse(e.to_string(), USER_COUNT_QUERY))?
			}
			None => 0,
		};
		if count == 0 {
			return Err(ReconcileError::NotFound(format!(
				"user '{}'@'{}'",
				username, id.host
			)));
		}

		Ok(UserSpec {
			secret_name: id.secret_name,
			username_key: id.username_key,
			password_key: id.password_key,
			host: id.host,
			tls_option: TlsRequirement::None,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_spec_defaults_and_id() {
		let spec = UserSpec::new("prod/app", "username", "password");
		assert_eq!(spec.host, "localhost");
		assert_eq!(spec.tls_option, TlsRequirement::None);
		assert_eq!(spec.id().to_string(), "prod/app@username@password@localhost");
	}

	#[test]
	fn test_spec_builder() {
		let spec = UserSpec::new("s", "u", "p")
			.host("%")
			.require(TlsRequirement::X509);
		assert_eq!(spec.id().host, "%");
		assert_eq!(spec.tls_option, TlsRequirement::X509);
	}
}
