//! Environment variable secret provider

use crate::secrets::{SecretError, SecretProvider, SecretResult};
use async_trait::async_trait;
use secrecy::SecretString;
use std::env;

/// Environment variable secret provider
///
/// The payload of a secret lives in one environment variable whose name is
/// the prefix followed by the secret name, upper-cased, with every
/// character outside `[A-Z0-9]` replaced by `_`. With the default prefix,
/// the secret `prod/mysql-admin` is read from
/// `GRANTSMITH_SECRET_PROD_MYSQL_ADMIN`.
pub struct EnvSecretProvider {
	prefix: String,
}

impl EnvSecretProvider {
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}

	pub fn env_var_name(&self, secret_name: &str) -> String {
		let suffix: String = secret_name
			.chars()
			.map(|c| {
				if c.is_ascii_alphanumeric() {
					c.to_ascii_uppercase()
				} else {
					'_'
				}
			})
			.collect();
		format!("{}{}", self.prefix, suffix)
	}
}

impl Default for EnvSecretProvider {
	fn default() -> Self {
		Self::new("GRANTSMITH_SECRET_")
	}
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
	async fn get_secret(&self, secret_name: &str) -> SecretResult<SecretString> {
		let env_var = self.env_var_name(secret_name);
		env::var(&env_var)
			.map(SecretString::from)
			.map_err(|_| SecretError::NotFound(format!("Environment variable: {}", env_var)))
	}

	fn name(&self) -> &str {
		"env"
	}
}
