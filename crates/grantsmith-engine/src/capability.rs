//! Server capability resolution

use grantsmith_db::{DatabaseConnection, DatabaseError};
use grantsmith_dcl::Capabilities;
use semver::Version;
use tracing::debug;

use crate::error::{ReconcileError, Result};
use crate::grammar;

/// Query answering the server's version banner
pub const VERSION_QUERY: &str = "SELECT @@GLOBAL.version";

/// Query the server version once and derive the capability flags from it.
pub async fn resolve_capabilities(conn: &DatabaseConnection) -> Result<Capabilities> {
	let value = conn
		.query_scalar(VERSION_QUERY, Vec::new())
		.await?
		.ok_or(ReconcileError::Connectivity(DatabaseError::NoRows))?;
	let raw = String::try_from(value).map_err(|e| ReconcileError::parse(e.to_string(), ""))?;

	let (version, is_fork_variant) = parse_server_version(&raw)?;
	let caps = Capabilities::derive(version, is_fork_variant);
	debug!(banner = %raw, %caps, "resolved server capabilities");
	Ok(caps)
}

/// Split a version banner into a semantic version and a fork flag.
///
/// Suffixes such as `-log` or `-MariaDB-1:10.6.16+maria~ubu2004` are
/// ignored for the version; a banner mentioning MariaDB marks the fork.
pub fn parse_server_version(raw: &str) -> Result<(Version, bool)> {
	let (major, minor, patch) = grammar::match_version(raw)
		.ok_or_else(|| ReconcileError::parse("unrecognized server version", raw))?;
	let is_fork_variant = raw.to_ascii_lowercase().contains("mariadb");
	Ok((Version::new(major, minor, patch), is_fork_variant))
}
