//! Secret resolution
//!
//! A secret is a named JSON object whose members are string values, e.g.
//! `{"username": "admin", "password": "..."}`. Callers ask for one member
//! with [`SecretProvider::get_value`].

pub mod providers;

use crate::settings::SecretSettings;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;

/// Error type for secret resolution
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
	#[error("Secret not found: {0}")]
	NotFound(String),

	#[error("Key '{key}' not found in secret '{secret}'")]
	KeyNotFound { key: String, secret: String },

	#[error("Secret '{secret}' is not a JSON object of strings: {message}")]
	Malformed { secret: String, message: String },

	#[error("Provider error: {0}")]
	Provider(String),
}

pub type SecretResult<T> = Result<T, SecretError>;

/// Source of secret payloads
#[async_trait]
pub trait SecretProvider: Send + Sync {
	/// Fetch the raw payload of a secret.
	async fn get_secret(&self, secret_name: &str) -> SecretResult<SecretString>;

	/// Fetch one member of a secret's JSON payload.
	async fn get_value(&self, secret_name: &str, key: &str) -> SecretResult<SecretString> {
		let payload = self.get_secret(secret_name).await?;
		let mut values = parse_secret_map(secret_name, payload.expose_secret())?;
		values
			.remove(key)
			.map(SecretString::from)
			.ok_or_else(|| SecretError::KeyNotFound {
				key: key.to_string(),
				secret: secret_name.to_string(),
			})
	}

	/// Provider name, for logs
	fn name(&self) -> &str;
}

/// Parse a secret payload into its string members.
pub fn parse_secret_map(secret_name: &str, payload: &str) -> SecretResult<HashMap<String, String>> {
	serde_json::from_str(payload).map_err(|e| SecretError::Malformed {
		secret: secret_name.to_string(),
		message: e.to_string(),
	})
}

/// Administrative login resolved from the secret store
pub struct Credentials {
	pub username: String,
	pub password: SecretString,
}

impl std::fmt::Debug for Credentials {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Credentials")
			.field("username", &self.username)
			.field("password", &"[REDACTED]")
			.finish()
	}
}

/// Resolve the administrative credentials named by the settings.
pub async fn resolve_credentials(
	provider: &dyn SecretProvider,
	settings: &SecretSettings,
) -> SecretResult<Credentials> {
	tracing::debug!(
		provider = provider.name(),
		secret = %settings.secret_name,
		"resolving administrative credentials"
	);
	let username = provider
		.get_value(&settings.secret_name, &settings.username_key)
		.await?;
	let password = provider
		.get_value(&settings.secret_name, &settings.password_key)
		.await?;
	Ok(Credentials {
		username: username.expose_secret().to_string(),
		password,
	})
}
