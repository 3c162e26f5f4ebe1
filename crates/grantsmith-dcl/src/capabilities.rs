//! Server capability flags
//!
//! Derived once per session from the server version and dialect, then passed
//! explicitly to every renderer.

use semver::Version;
use std::fmt;

/// Role support begins strictly after this version.
pub const ROLES_AFTER: Version = Version::new(8, 0, 0);
/// `ALTER USER ... IDENTIFIED BY` is available from this version.
pub const ALTER_USER_FROM: Version = Version::new(5, 7, 6);
/// Servers older than this still need the `PASSWORD()` function.
pub const MODERN_HASHING_FROM: Version = Version::new(8, 0, 0);
/// `REQUIRE` on `CREATE USER`/`ALTER USER` begins strictly after this version.
pub const USER_TLS_REQUIRE_AFTER: Version = Version::new(5, 7, 0);

/// Minimum version reported to callers when roles are missing
pub const ROLES_MINIMUM_VERSION: &str = "8.0.1";
/// Minimum version reported to callers when user TLS requirements are missing
pub const USER_TLS_MINIMUM_VERSION: &str = "5.7.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
	pub version: Version,
	pub supports_roles: bool,
	pub supports_alter_user_syntax: bool,
	pub requires_legacy_password_function: bool,
	pub is_fork_variant: bool,
	pub supports_user_tls_require: bool,
}

impl Capabilities {
	/// Derive the flag set for a server.
	///
	/// A server reporting exactly 8.0.0 does not support roles.
	pub fn derive(version: Version, is_fork_variant: bool) -> Self {
		Self {
			supports_roles: version > ROLES_AFTER,
			supports_alter_user_syntax: version >= ALTER_USER_FROM,
			requires_legacy_password_function: is_fork_variant || version < MODERN_HASHING_FROM,
			supports_user_tls_require: version > USER_TLS_REQUIRE_AFTER,
			is_fork_variant,
			version,
		}
	}
}

impl fmt::Display for Capabilities {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}{} (roles={}, alter_user={}, legacy_password={}, user_tls={})",
			self.version,
			if self.is_fork_variant { " fork" } else { "" },
			self.supports_roles,
			self.supports_alter_user_syntax,
			self.requires_legacy_password_function,
			self.supports_user_tls_require
		)
	}
}
