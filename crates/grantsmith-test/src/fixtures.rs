//! rstest fixtures

pub mod mock;

pub use mock::{MockDatabaseBackend, mock_backend};

use grantsmith_conf::secrets::providers::MemorySecretProvider;
use grantsmith_dcl::Capabilities;
use rstest::*;
use semver::Version;

/// A server without `ALTER USER` and without roles
#[fixture]
pub fn mysql56() -> Capabilities {
	Capabilities::derive(Version::new(5, 6, 51), false)
}

#[fixture]
pub fn mysql57() -> Capabilities {
	Capabilities::derive(Version::new(5, 7, 44), false)
}

#[fixture]
pub fn mysql80() -> Capabilities {
	Capabilities::derive(Version::new(8, 0, 36), false)
}

#[fixture]
pub fn mariadb() -> Capabilities {
	Capabilities::derive(Version::new(10, 6, 16), true)
}

/// Secret `prod/app` holding `username = app` and `password = s3cr3t'pw`
#[fixture]
pub fn app_secrets() -> MemorySecretProvider {
	let secrets = MemorySecretProvider::new();
	secrets.insert_values(
		"prod/app",
		[
			("username", "app"),
			("password", "s3cr3t'pw"),
			("rotated", "n3w-s3cr3t"),
		],
	);
	secrets
}
