//! Managed resources
//!
//! Each resource pairs a declarative spec with create, read, update,
//! delete and import operations run through a [`Session`](crate::Session).

pub mod grant;
pub mod user;
pub mod user_password;

pub use grant::{
	GrantReconciler, GrantSpec, GrantState, GrantStatus, ImportedGrant, ObservedGrant,
	ReconcileOutcome,
};
pub use user::{UserReconciler, UserSpec};
pub use user_password::{
	EncryptedSecret, PasswordGenerator, PasswordPolicy, RandomPasswordGenerator, SecretEncryptor,
	UserPasswordSpec, UserPasswordState, set_user_password,
};

use grantsmith_conf::SecretProvider;
use secrecy::ExposeSecret;

use crate::error::Result;

/// Host used when a spec does not name one
pub const DEFAULT_HOST: &str = "localhost";

/// Resolve an account name stored in the secret store.
pub(crate) async fn resolve_username(
	secrets: &dyn SecretProvider,
	secret_name: &str,
	username_key: &str,
) -> Result<String> {
	let value = secrets.get_value(secret_name, username_key).await?;
	Ok(value.expose_secret().to_string())
}
