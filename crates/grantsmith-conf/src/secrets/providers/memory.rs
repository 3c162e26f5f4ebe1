//! In-memory secret provider for testing and embedding

use crate::secrets::{SecretError, SecretProvider, SecretResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use secrecy::SecretString;
use std::collections::HashMap;

/// In-memory secret provider
pub struct MemorySecretProvider {
	secrets: RwLock<HashMap<String, String>>,
}

impl MemorySecretProvider {
	/// Create an empty provider
	pub fn new() -> Self {
		Self {
			secrets: RwLock::new(HashMap::new()),
		}
	}

	/// Store a raw payload under `secret_name`
	pub fn insert(&self, secret_name: impl Into<String>, payload: impl Into<String>) {
		self.secrets.write().insert(secret_name.into(), payload.into());
	}

	/// Store a JSON object built from key/value pairs
	pub fn insert_values<'a, I>(&self, secret_name: impl Into<String>, values: I)
	where
		I: IntoIterator<Item = (&'a str, &'a str)>,
	{
		let map: serde_json::Map<String, serde_json::Value> = values
			.into_iter()
			.map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
			.collect();
		self.insert(secret_name, serde_json::Value::Object(map).to_string());
	}

	pub fn remove(&self, secret_name: &str) {
		self.secrets.write().remove(secret_name);
	}
}

impl Default for MemorySecretProvider {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl SecretProvider for MemorySecretProvider {
	async fn get_secret(&self, secret_name: &str) -> SecretResult<SecretString> {
		self.secrets
			.read()
			.get(secret_name)
			.cloned()
			.map(SecretString::from)
			.ok_or_else(|| SecretError::NotFound(secret_name.to_string()))
	}

	fn name(&self) -> &str {
		"memory"
	}
}
