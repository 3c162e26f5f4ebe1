//! Patterns for server output
//!
//! Grant listings are matched line by line. A privilege line is
//! `GRANT <privileges> ON [PROCEDURE|FUNCTION|TABLE] <db>.<object> TO ...`.
//! Role memberships (`GRANT 'r'@'%' TO ...`) and proxy grants have their
//! own productions so they are never mistaken for privilege lines.

use regex::Regex;
use std::sync::OnceLock;

struct Patterns {
	privilege_line: Regex,
	role_line: Regex,
	proxy_line: Regex,
	grant_option: Regex,
	server_version: Regex,
}

impl Patterns {
	fn new() -> Self {
		Self {
			privilege_line: Regex::new(
				r"(?i)^GRANT\s+(?P<privileges>.+?)\s+ON\s+(?:(?P<kind>PROCEDURE|FUNCTION|TABLE)\s+)?(?P<database>`(?:[^`]|``)+`|\*|[^\s.`]+)\.(?P<object>`(?:[^`]|``)+`|\*|[^\s`]+)\s+TO\s+",
			)
			.unwrap(),
			role_line: Regex::new(
				r"(?i)^GRANT\s+(?P<roles>(?:[`'][^`']*[`'](?:@[`'][^`']*[`'])?)(?:\s*,\s*[`'][^`']*[`'](?:@[`'][^`']*[`'])?)*)\s+TO\s+",
			)
			.unwrap(),
			proxy_line: Regex::new(r"(?i)^GRANT\s+PROXY\s+ON\s+(?P<target>\S+)\s+TO\s+").unwrap(),
			grant_option: Regex::new(r"(?i)\bGRANT OPTION\b").unwrap(),
			server_version: Regex::new(r"^\s*(\d+)(?:\.(\d+))?(?:\.(\d+))?").unwrap(),
		}
	}
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
	PATTERNS.get_or_init(Patterns::new)
}

/// Pieces of a privilege line, still quoted as the server printed them
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PrivilegeLine<'a> {
	pub privileges: &'a str,
	pub kind: Option<&'a str>,
	pub database: &'a str,
	pub object: &'a str,
}

pub(crate) fn match_privilege_line(line: &str) -> Option<PrivilegeLine<'_>> {
	let caps = patterns().privilege_line.captures(line)?;
	Some(PrivilegeLine {
		privileges: caps.name("privileges")?.as_str(),
		kind: caps.name("kind").map(|m| m.as_str()),
		database: caps.name("database")?.as_str(),
		object: caps.name("object")?.as_str(),
	})
}

/// Role list of a membership line, e.g. `` `reader`@`%`,`writer`@`%` ``
pub(crate) fn match_role_line(line: &str) -> Option<&str> {
	let caps = patterns().role_line.captures(line)?;
	caps.name("roles").map(|m| m.as_str())
}

pub(crate) fn match_proxy_line(line: &str) -> Option<&str> {
	let caps = patterns().proxy_line.captures(line)?;
	caps.name("target").map(|m| m.as_str())
}

pub(crate) fn has_grant_option(line: &str) -> bool {
	patterns().grant_option.is_match(line)
}

/// Leading `major[.minor[.patch]]` of a version string; missing parts are zero
pub(crate) fn match_version(raw: &str) -> Option<(u64, u64, u64)> {
	let caps = patterns().server_version.captures(raw)?;
	let part = |i: usize| -> Option<u64> {
		match caps.get(i) {
			Some(m) => m.as_str().parse().ok(),
			None => Some(0),
		}
	};
	Some((part(1)?, part(2)?, part(3)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn test_privilege_line_with_quoted_scope() {
		let line = match_privilege_line("GRANT SELECT, INSERT ON `shop`.`orders` TO `app`@`%`").unwrap();
		assert_eq!(line.privileges, "SELECT, INSERT");
		assert_eq!(line.kind, None);
		assert_eq!(line.database, "`shop`");
		assert_eq!(line.object, "`orders`");
	}

	#[test]
	fn test_privilege_line_global() {
		let line = match_privilege_line("GRANT USAGE ON *.* TO 'app'@'localhost'").unwrap();
		assert_eq!(line.privileges, "USAGE");
		assert_eq!(line.database, "*");
		assert_eq!(line.object, "*");
	}

	#[test]
	fn test_privilege_line_procedure() {
		let line =
			match_privilege_line("GRANT EXECUTE ON PROCEDURE `shop`.`refund` TO 'app'@'%'").unwrap();
		assert_eq!(line.kind, Some("PROCEDURE"));
		assert_eq!(line.database, "`shop`");
		assert_eq!(line.object, "`refund`");
	}

	#[test]
	fn test_privilege_line_with_dotted_backticked_database() {
		let line = match_privilege_line("GRANT ALL PRIVILEGES ON `my.db`.* TO `app`@`10.0.0.1`").unwrap();
		assert_eq!(line.privileges, "ALL PRIVILEGES");
		assert_eq!(line.database, "`my.db`");
		assert_eq!(line.object, "*");
	}

	#[rstest]
	#[case("GRANT SELECT TO 'app'@'%'")]
	#[case("REVOKE SELECT ON *.* FROM 'app'@'%'")]
	#[case("GRANT SELECT ON shop TO 'app'@'%'")]
	#[case("")]
	fn test_privilege_line_rejects(#[case] line: &str) {
		assert!(match_privilege_line(line).is_none());
	}

	#[test]
	fn test_role_line() {
		assert_eq!(
			match_role_line("GRANT `reader`@`%`,`writer`@`%` TO `app`@`%`"),
			Some("`reader`@`%`,`writer`@`%`")
		);
		assert!(match_role_line("GRANT SELECT TO 'app'@'%'").is_none());
	}

	#[test]
	fn test_proxy_line() {
		assert_eq!(
			match_proxy_line("GRANT PROXY ON ''@'' TO 'root'@'localhost' WITH GRANT OPTION"),
			Some("''@''")
		);
	}

	#[rstest]
	#[case("GRANT SELECT ON *.* TO 'a'@'%' WITH GRANT OPTION", true)]
	#[case("GRANT SELECT ON *.* TO 'a'@'%'", false)]
	#[case("GRANT SELECT ON `grant options`.* TO 'a'@'%'", false)]
	fn test_grant_option_detection(#[case] line: &str, #[case] expected: bool) {
		assert_eq!(has_grant_option(line), expected);
	}

	#[rstest]
	#[case("8.0.36", Some((8, 0, 36)))]
	#[case("5.7.44-log", Some((5, 7, 44)))]
	#[case("10.6.16-MariaDB-1:10.6.16+maria~ubu2004", Some((10, 6, 16)))]
	#[case("8.0", Some((8, 0, 0)))]
	#[case("8", Some((8, 0, 0)))]
	#[case("banana", None)]
	fn test_version_match(#[case] raw: &str, #[case] expected: Option<(u64, u64, u64)>) {
		assert_eq!(match_version(raw), expected);
	}
}
