//! # grantsmith-conf
//!
//! Provider settings and secret resolution.
//!
//! [`ProviderSettings`] describes how to reach the server (endpoint, TLS mode,
//! pool limits, authentication plugin) and where the administrative
//! credentials live. Credentials and managed user passwords are resolved
//! through a [`SecretProvider`], whose payloads are JSON objects of string
//! values.
//!
//! ## Example
//!
//! ```
//! use grantsmith_conf::ProviderSettings;
//!
//! let settings = ProviderSettings::from_toml_str_with_env(
//! 	r#"
//! endpoint = "db.internal:3306"
//!
//! [secret]
//! secret_name = "prod/mysql-admin"
//! region = "eu-west-1"
//! username_key = "username"
//! password_key = "password"
//! "#,
//! 	|_| None,
//! )
//! .unwrap();
//!
//! assert_eq!(settings.endpoint, "db.internal:3306");
//! assert_eq!(settings.connect_retry_timeout_sec, 300);
//! ```

pub mod secrets;
pub mod settings;

pub use secrets::{
	Credentials, SecretError, SecretProvider, SecretResult, parse_secret_map, resolve_credentials,
};
pub use settings::{
	AuthenticationPlugin, ProviderSettings, SecretSettings, SettingsError, SettingsResult, TlsMode,
};
