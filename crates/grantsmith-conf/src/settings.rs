//! Provider settings
//!
//! Settings are read from a TOML document. A handful of fields fall back to
//! well-known environment variables when the document leaves them unset:
//!
//! | Field            | Variable            |
//! |------------------|---------------------|
//! | `endpoint`       | `MYSQL_ENDPOINT`    |
//! | `tls`            | `MYSQL_TLS_CONFIG`  |
//! | `secret.region`  | `AWS_DEFAULT_REGION`|

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const ENDPOINT_ENV: &str = "MYSQL_ENDPOINT";
pub const TLS_CONFIG_ENV: &str = "MYSQL_TLS_CONFIG";
pub const REGION_ENV: &str = "AWS_DEFAULT_REGION";

const DEFAULT_CONNECT_RETRY_TIMEOUT_SEC: u64 = 300;

/// Error type for settings loading and validation
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("Invalid value for '{field}': {value}")]
	InvalidValue { field: &'static str, value: String },

	#[error("Validation error: {0}")]
	Validation(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// TLS mode used when talking to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TlsMode {
	/// Plain connection
	#[default]
	#[serde(rename = "false")]
	Disabled,
	/// TLS with certificate and host verification
	#[serde(rename = "true")]
	Verified,
	/// TLS without certificate verification
	#[serde(rename = "skip-verify")]
	SkipVerify,
}

impl FromStr for TlsMode {
	type Err = SettingsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"true" => Ok(Self::Verified),
			"false" => Ok(Self::Disabled),
			"skip-verify" => Ok(Self::SkipVerify),
			other => Err(SettingsError::InvalidValue {
				field: "tls",
				value: other.to_string(),
			}),
		}
	}
}

impl fmt::Display for TlsMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Self::Disabled => "false",
			Self::Verified => "true",
			Self::SkipVerify => "skip-verify",
		};
		f.write_str(s)
	}
}

/// Client authentication plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthenticationPlugin {
	#[default]
	Native,
	Cleartext,
}

impl FromStr for AuthenticationPlugin {
	type Err = SettingsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"native" => Ok(Self::Native),
			"cleartext" => Ok(Self::Cleartext),
			_ => Err(SettingsError::InvalidValue {
				field: "authentication_plugin",
				value: s.to_string(),
			}),
		}
	}
}

/// Location of the administrative credentials in the secret store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretSettings {
	pub secret_name: String,
	pub region: String,
	pub username_key: String,
	pub password_key: String,
}

/// Settings for one managed server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
	/// `host:port`, or an absolute unix socket path
	pub endpoint: String,
	pub tls: TlsMode,
	pub max_conn_lifetime_sec: Option<u64>,
	pub max_open_conns: Option<u32>,
	pub authentication_plugin: AuthenticationPlugin,
	pub connect_retry_timeout_sec: u64,
	pub secret: SecretSettings,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
	endpoint: Option<String>,
	tls: Option<String>,
	max_conn_lifetime_sec: Option<u64>,
	max_open_conns: Option<u32>,
	authentication_plugin: Option<String>,
	connect_retry_timeout_sec: Option<u64>,
	#[serde(alias = "aws_secret")]
	secret: RawSecretSettings,
}

#[derive(Debug, Deserialize)]
struct RawSecretSettings {
	#[serde(default)]
	secret_name: String,
	region: Option<String>,
	#[serde(default)]
	username_key: String,
	#[serde(default)]
	password_key: String,
}

impl ProviderSettings {
	/// Load settings from a TOML document, using the process environment for
	/// unset fields.
	pub fn from_toml_str(source: &str) -> SettingsResult<Self> {
		Self::from_toml_str_with_env(source, |name| std::env::var(name).ok())
	}

	/// Load settings from a TOML document with an explicit environment lookup.
	pub fn from_toml_str_with_env<F>(source: &str, lookup: F) -> SettingsResult<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let raw: RawSettings = toml::from_str(source)?;

		let endpoint = raw
			.endpoint
			.or_else(|| lookup(ENDPOINT_ENV))
			.unwrap_or_default();
		let tls = match raw.tls.or_else(|| lookup(TLS_CONFIG_ENV)) {
			Some(value) => value.parse()?,
			None => TlsMode::default(),
		};
		let authentication_plugin = match raw.authentication_plugin {
			Some(value) => value.parse()?,
			None => AuthenticationPlugin::default(),
		};
		let region = raw
			.secret
			.region
			.or_else(|| lookup(REGION_ENV))
			.unwrap_or_default();

		let settings = Self {
			endpoint,
			tls,
			max_conn_lifetime_sec: raw.max_conn_lifetime_sec,
			max_open_conns: raw.max_open_conns,
			authentication_plugin,
			connect_retry_timeout_sec: raw
				.connect_retry_timeout_sec
				.unwrap_or(DEFAULT_CONNECT_RETRY_TIMEOUT_SEC),
			secret: SecretSettings {
				secret_name: raw.secret.secret_name,
				region,
				username_key: raw.secret.username_key,
				password_key: raw.secret.password_key,
			},
		};
		settings.validate()?;
		Ok(settings)
	}

	/// Load settings from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> SettingsResult<Self> {
		let source = std::fs::read_to_string(path)?;
		Self::from_toml_str(&source)
	}

	/// Check required fields.
	pub fn validate(&self) -> SettingsResult<()> {
		if self.endpoint.trim().is_empty() {
			return Err(SettingsError::Validation(
				"endpoint must not be empty".to_string(),
			));
		}
		let secret = &self.secret;
		for (field, value) in [
			("secret.secret_name", &secret.secret_name),
			("secret.region", &secret.region),
			("secret.username_key", &secret.username_key),
			("secret.password_key", &secret.password_key),
		] {
			if value.trim().is_empty() {
				return Err(SettingsError::Validation(format!(
					"{} must not be empty",
					field
				)));
			}
		}
		Ok(())
	}

	/// Whether the endpoint names a unix socket
	pub fn is_socket(&self) -> bool {
		self.endpoint.starts_with('/')
	}

	pub fn max_conn_lifetime(&self) -> Option<Duration> {
		self.max_conn_lifetime_sec.map(Duration::from_secs)
	}

	pub fn connect_retry_timeout(&self) -> Duration {
		Duration::from_secs(self.connect_retry_timeout_sec)
	}
}
