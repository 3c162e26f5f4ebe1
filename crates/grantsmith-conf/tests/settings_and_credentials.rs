//! Loading settings from disk and resolving the credentials they name.

use grantsmith_conf::secrets::providers::{JsonFileSecretProvider, MemorySecretProvider};
use grantsmith_conf::{ProviderSettings, SecretError, TlsMode, resolve_credentials};
use rstest::*;
use secrecy::ExposeSecret;

const SETTINGS: &str = r#"
endpoint = "mysql.internal:3306"
tls = "true"
authentication_plugin = "cleartext"
connect_retry_timeout_sec = 30

[secret]
secret_name = "prod/admin"
region = "us-east-1"
username_key = "username"
password_key = "password"
"#;

#[fixture]
fn settings() -> ProviderSettings {
	ProviderSettings::from_toml_str_with_env(SETTINGS, |_| None).unwrap()
}

#[rstest]
fn test_settings_from_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("grantsmith.toml");
	std::fs::write(&path, SETTINGS).unwrap();

	let loaded = ProviderSettings::from_file(&path).unwrap();
	assert_eq!(loaded.tls, TlsMode::Verified);
	assert_eq!(loaded.connect_retry_timeout_sec, 30);
}

#[rstest]
#[tokio::test]
async fn test_resolve_credentials_from_memory(settings: ProviderSettings) {
	let provider = MemorySecretProvider::new();
	provider.insert_values(
		"prod/admin",
		[("username", "root"), ("password", "correct horse")],
	);

	let credentials = resolve_credentials(&provider, &settings.secret)
		.await
		.unwrap();
	assert_eq!(credentials.username, "root");
	assert_eq!(credentials.password.expose_secret(), "correct horse");
}

#[rstest]
#[tokio::test]
async fn test_resolve_credentials_from_file(settings: ProviderSettings) {
	let dir = tempfile::tempdir().unwrap();
	std::fs::create_dir_all(dir.path().join("prod")).unwrap();
	std::fs::write(
		dir.path().join("prod/admin.json"),
		r#"{"username":"ops","password":"pw"}"#,
	)
	.unwrap();

	let provider = JsonFileSecretProvider::new(dir.path());
	let credentials = resolve_credentials(&provider, &settings.secret)
		.await
		.unwrap();
	assert_eq!(credentials.username, "ops");
}

#[rstest]
#[tokio::test]
async fn test_resolve_credentials_missing_password_key(settings: ProviderSettings) {
	let provider = MemorySecretProvider::new();
	provider.insert_values("prod/admin", [("username", "root")]);

	let err = resolve_credentials(&provider, &settings.secret)
		.await
		.unwrap_err();
	assert!(matches!(err, SecretError::KeyNotFound { ref key, .. } if key == "password"));
}
