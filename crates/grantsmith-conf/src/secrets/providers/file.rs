//! JSON file secret provider
//!
//! Each secret is a file named `<secret_name>.json` under a base directory.
//! Secret names containing `/` map to subdirectories.

use crate::secrets::{SecretError, SecretProvider, SecretResult};
use async_trait::async_trait;
use secrecy::SecretString;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

pub struct JsonFileSecretProvider {
	base_dir: PathBuf,
}

impl JsonFileSecretProvider {
	pub fn new(base_dir: impl Into<PathBuf>) -> Self {
		Self {
			base_dir: base_dir.into(),
		}
	}

	fn secret_path(&self, secret_name: &str) -> SecretResult<PathBuf> {
		let relative = Path::new(secret_name);
		if relative
			.components()
			.any(|c| !matches!(c, Component::Normal(_)))
		{
			return Err(SecretError::Provider(format!(
				"invalid secret name '{}'",
				secret_name
			)));
		}
		Ok(self.base_dir.join(format!("{}.json", secret_name)))
	}
}

#[async_trait]
impl SecretProvider for JsonFileSecretProvider {
	async fn get_secret(&self, secret_name: &str) -> SecretResult<SecretString> {
		let path = self.secret_path(secret_name)?;
		match tokio::fs::read_to_string(&path).await {
			Ok(payload) => Ok(SecretString::from(payload)),
			Err(e) if e.kind() == ErrorKind::NotFound => {
				Err(SecretError::NotFound(path.display().to_string()))
			}
			Err(e) => Err(SecretError::Provider(format!(
				"failed to read {}: {}",
				path.display(),
				e
			))),
		}
	}

	fn name(&self) -> &str {
		"file"
	}
}
