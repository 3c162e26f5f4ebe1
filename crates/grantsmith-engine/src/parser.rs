//! Grant listing parser
//!
//! Turns the text of `SHOW GRANTS FOR <principal>` into structured records.
//! Every line must match one of the known productions; anything else is a
//! parse error rather than a silently dropped grant.

use grantsmith_db::{DatabaseConnection, Row};
use grantsmith_dcl::{Principal, Scope, unquote_identifier};
use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::error::{ReconcileError, Result};
use crate::grammar;

/// Privileges held on one scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantRecord {
	pub scope: Scope,
	pub privileges: IndexSet<String>,
	/// Whether any line for the principal carries `WITH GRANT OPTION`
	pub has_grant_option: bool,
}

/// One parsed line of a grant listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantLine {
	Privileges(GrantRecord),
	/// Role memberships, by role name
	Roles(Vec<String>),
	/// A proxy grant; the proxied account as printed
	Proxy(String),
}

/// Parse a single line of `SHOW GRANTS` output.
pub fn parse_grant_line(line: &str) -> Result<GrantLine> {
	let line = line.trim();

	if let Some(target) = grammar::match_proxy_line(line) {
		return Ok(GrantLine::Proxy(target.to_string()));
	}

	if let Some(parts) = grammar::match_privilege_line(line) {
		let database = unquote_identifier(parts.database);
		let object = unquote_identifier(parts.object);
		let scope = match parts.kind.map(str::to_ascii_uppercase).as_deref() {
			Some("PROCEDURE") => Scope::procedure(format!("{}.{}", database, object)),
			Some("FUNCTION") => Scope::Function(format!("{}.{}", database, object)),
			_ => Scope::table(database, object),
		};
		let privileges = split_privileges(parts.privileges);
		if privileges.is_empty() {
			return Err(ReconcileError::parse("grant line lists no privileges", line));
		}
		return Ok(GrantLine::Privileges(GrantRecord {
			scope,
			privileges,
			has_grant_option: grammar::has_grant_option(line),
		}));
	}

	if let Some(roles) = grammar::match_role_line(line) {
		return Ok(GrantLine::Roles(
			roles
				.split(',')
				.filter_map(|item| role_name(item.trim()))
				.collect(),
		));
	}

	Err(ReconcileError::parse("unrecognized grant line", line))
}

/// Everything a principal holds, merged per scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantListing {
	/// One record per distinct scope, in the order scopes first appeared
	pub records: Vec<GrantRecord>,
	pub roles: IndexSet<String>,
	pub proxies: Vec<String>,
}

impl GrantListing {
	/// Parse and merge a sequence of listing lines.
	///
	/// Records sharing a scope are merged into one; the grant-option flag is
	/// principal-wide, so it is set on every record when any line has it.
	pub fn from_lines<I, S>(lines: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut listing = Self::default();
		let mut any_grant_option = false;

		for line in lines {
			let line = line.as_ref();
			if line.trim().is_empty() {
				continue;
			}
			match parse_grant_line(line)? {
				GrantLine::Privileges(record) => {
					any_grant_option |= record.has_grant_option;
					match listing.records.iter_mut().find(|r| r.scope == record.scope) {
						Some(existing) => existing.privileges.extend(record.privileges),
						None => listing.records.push(record),
					}
				}
				GrantLine::Roles(roles) => listing.roles.extend(roles),
				GrantLine::Proxy(target) => listing.proxies.push(target),
			}
		}

		for record in &mut listing.records {
			record.has_grant_option = any_grant_option;
		}
		Ok(listing)
	}

	pub fn record_for(&self, scope: &Scope) -> Option<&GrantRecord> {
		self.records.iter().find(|r| &r.scope == scope)
	}

	pub fn has_grant_option(&self) -> bool {
		self.records.iter().any(|r| r.has_grant_option)
	}
}

/// Parse newline-separated listing text.
pub fn parse_grant_text(text: &str) -> Result<GrantListing> {
	GrantListing::from_lines(text.lines())
}

/// Read and parse the grants currently held by `principal`.
///
/// The listing is read from the first column of each row, whatever the
/// server names it.
pub async fn fetch_grants(conn: &DatabaseConnection, principal: &Principal) -> Result<GrantListing> {
	let sql = format!("SHOW GRANTS FOR {}", principal);
	debug!(%principal, "reading grants");
	let rows = conn.query_rows(&sql, Vec::new()).await?;

	let lines = rows
		.iter()
		.map(first_column)
		.collect::<Result<Vec<String>>>()?;
	for line in &lines {
		trace!(%line, "grant line");
	}
	GrantListing::from_lines(&lines)
}

fn first_column(row: &Row) -> Result<String> {
	row.get_index::<String>(0)
		.map_err(|e| ReconcileError::parse(e.to_string(), format!("{:?}", row.columns().collect::<Vec<_>>())))
}

/// Split a privilege list on commas outside parentheses, so column
/// privileges such as `SELECT (id, name)` stay whole.
fn split_privileges(list: &str) -> IndexSet<String> {
	let mut out = IndexSet::new();
	let mut depth = 0usize;
	let mut current = String::new();
	for ch in list.chars() {
		match ch {
			'(' => {
				depth += 1;
				current.push(ch);
			}
			')' => {
				depth = depth.saturating_sub(1);
				current.push(ch);
			}
			',' if depth == 0 => {
				push_trimmed(&mut out, &current);
				current.clear();
			}
			_ => current.push(ch),
		}
	}
	push_trimmed(&mut out, &current);
	out
}

fn push_trimmed(out: &mut IndexSet<String>, item: &str) {
	let item = item.trim();
	if !item.is_empty() {
		out.insert(item.to_string());
	}
}

/// `` `reader`@`%` `` or `'reader'` to `reader`
fn role_name(item: &str) -> Option<String> {
	let name = item.split('@').next()?.trim();
	let name = name.trim_matches(|c| c == '`' || c == '\'');
	(!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn privileges(items: &[&str]) -> IndexSet<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn test_parse_table_grant() {
		let line = parse_grant_line("GRANT SELECT, INSERT ON `shop`.`orders` TO `app`@`%`").unwrap();
		assert_eq!(
			line,
			GrantLine::Privileges(GrantRecord {
				scope: Scope::table("shop", "orders"),
				privileges: privileges(&["SELECT", "INSERT"]),
				has_grant_option: false,
			})
		);
	}

	#[test]
	fn test_parse_procedure_grant() {
		let line =
			parse_grant_line("GRANT EXECUTE, ALTER ROUTINE ON PROCEDURE `shop`.`refund` TO 'app'@'%'")
				.unwrap();
		let GrantLine::Privileges(record) = line else {
			panic!("expected privilege line");
		};
		assert_eq!(record.scope, Scope::procedure("shop.refund"));
		assert_eq!(record.privileges, privileges(&["EXECUTE", "ALTER ROUTINE"]));
	}

	#[test]
	fn test_parse_column_privileges_stay_whole() {
		let line =
			parse_grant_line("GRANT SELECT (`id`, `name`), UPDATE (`name`) ON `shop`.`users` TO 'app'@'%'")
				.unwrap();
		let GrantLine::Privileges(record) = line else {
			panic!("expected privilege line");
		};
		assert_eq!(
			record.privileges,
			privileges(&["SELECT (`id`, `name`)", "UPDATE (`name`)"])
		);
	}

	#[test]
	fn test_parse_role_membership() {
		let line = parse_grant_line("GRANT `reader`@`%`,`writer`@`%` TO `app`@`%`").unwrap();
		assert_eq!(
			line,
			GrantLine::Roles(vec!["reader".to_string(), "writer".to_string()])
		);
	}

	#[test]
	fn test_parse_proxy_line_with_dotted_host() {
		let line = parse_grant_line("GRANT PROXY ON 'x'@'10.0.0.1' TO 'root'@'localhost'").unwrap();
		assert_eq!(line, GrantLine::Proxy("'x'@'10.0.0.1'".to_string()));
	}

	#[rstest]
	#[case("GRANT SELECT TO 'app'@'%'")]
	#[case("GRANT SELECT ON shop TO 'app'@'%'")]
	#[case("something else entirely")]
	fn test_malformed_lines_are_errors(#[case] line: &str) {
		assert!(matches!(
			parse_grant_line(line),
			Err(ReconcileError::Parse { .. })
		));
	}

	#[test]
	fn test_listing_merges_same_scope_and_spreads_grant_option() {
		let listing = parse_grant_text(
			"GRANT USAGE ON *.* TO 'app'@'%'\n\
			 GRANT SELECT ON `shop`.* TO 'app'@'%'\n\
			 GRANT INSERT ON `shop`.* TO 'app'@'%' WITH GRANT OPTION\n",
		)
		.unwrap();

		assert_eq!(listing.records.len(), 2);
		let shop = listing.record_for(&Scope::table("shop", "*")).unwrap();
		assert_eq!(shop.privileges, privileges(&["SELECT", "INSERT"]));
		assert!(listing.records.iter().all(|r| r.has_grant_option));
		assert!(listing.has_grant_option());
	}

	#[test]
	fn test_listing_rejects_any_bad_line() {
		let err = parse_grant_text("GRANT USAGE ON *.* TO 'a'@'%'\nGRANT nonsense\n").unwrap_err();
		assert!(matches!(err, ReconcileError::Parse { ref raw, .. } if raw == "GRANT nonsense"));
	}

	#[test]
	fn test_empty_listing() {
		let listing = parse_grant_text("").unwrap();
		assert!(listing.records.is_empty());
		assert!(!listing.has_grant_option());
	}
}
