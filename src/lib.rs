//! # Grantsmith
//!
//! Reconcile MySQL users, roles and privilege grants against a declared
//! desired state.
//!
//! Grantsmith reads what a server currently grants with `SHOW GRANTS FOR`,
//! computes the difference to what was declared, and issues the `GRANT`,
//! `REVOKE`, `CREATE USER` and `ALTER USER` statements the server's dialect
//! accepts. Version differences (roles, `REQUIRE` placement, legacy password
//! hashing) are resolved once per session.
//!
//! ## Feature Flags
//!
//! - `engine` (default) - the reconciliation engine and the sqlx connection backend
//! - `aws-secrets` - AWS Secrets Manager as a secret provider
//! - `test` - scripted and mocked backends with rstest fixtures
//! - `full` - all of the above
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "engine")]
//! # async fn example() -> grantsmith::engine::Result<()> {
//! use grantsmith::prelude::*;
//! use grantsmith::conf::secrets::providers::EnvSecretProvider;
//!
//! let settings = ProviderSettings::from_toml_str(
//! 	r#"
//! endpoint = "db.internal:3306"
//!
//! [secret]
//! secret_name = "prod/mysql-admin"
//! region = "eu-west-1"
//! username_key = "username"
//! password_key = "password"
//! "#,
//! )
//! .map_err(|e| ReconcileError::InvalidConfiguration(e.to_string()))?;
//! let secrets = EnvSecretProvider::new("GRANTSMITH_SECRET_");
//!
//! let session = grantsmith::open_session(&settings, &secrets).await?;
//! let spec = GrantSpec::for_user("prod/app", "username", "shop", GrantSet::privileges(["SELECT"]));
//! GrantReconciler::new(&session, &secrets).reconcile(&spec).await?;
//! # Ok(())
//! # }
//! ```

pub use grantsmith_conf as conf;
#[cfg(feature = "engine")]
pub use grantsmith_db as db;
pub use grantsmith_dcl as dcl;
#[cfg(feature = "engine")]
pub use grantsmith_engine as engine;
#[cfg(feature = "test")]
pub use grantsmith_test as test;

pub use grantsmith_conf::{ProviderSettings, SecretProvider};
pub use grantsmith_dcl::{Capabilities, GrantSet, Mutation, Principal, Scope, TlsRequirement};

#[cfg(feature = "engine")]
pub use grantsmith_engine::{
	GrantReconciler, GrantSpec, ReconcileError, Session, UserPasswordSpec, UserReconciler,
	UserSpec, set_user_password,
};

/// Connect with the administrative credentials named in `settings` and
/// resolve the server's capabilities.
///
/// The connection backend retries until `connect_retry_timeout_sec`
/// elapses; the capability query is issued once.
#[cfg(feature = "engine")]
pub async fn open_session(
	settings: &ProviderSettings,
	secrets: &dyn SecretProvider,
) -> grantsmith_engine::Result<Session> {
	use std::sync::Arc;

	settings
		.validate()
		.map_err(|e| ReconcileError::InvalidConfiguration(e.to_string()))?;
	let credentials = grantsmith_conf::resolve_credentials(secrets, &settings.secret).await?;
	let backend = grantsmith_db::dialect::MySqlBackend::connect(settings, &credentials).await?;
	Session::begin(grantsmith_db::DatabaseConnection::new(Arc::new(backend))).await
}

pub mod prelude {
	pub use crate::{
		Capabilities, GrantSet, Mutation, Principal, ProviderSettings, Scope, SecretProvider,
		TlsRequirement,
	};

	#[cfg(feature = "engine")]
	pub use crate::{
		GrantReconciler, GrantSpec, ReconcileError, Session, UserPasswordSpec, UserReconciler,
		UserSpec, set_user_password,
	};
}
