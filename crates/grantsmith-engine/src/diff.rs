//! Privilege set difference

use indexmap::IndexSet;

/// Privileges to add and remove to move observed state to desired state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivilegeDiff {
	/// In desired order and spelling
	pub to_grant: IndexSet<String>,
	/// In observed order and spelling
	pub to_revoke: IndexSet<String>,
}

impl PrivilegeDiff {
	pub fn is_empty(&self) -> bool {
		self.to_grant.is_empty() && self.to_revoke.is_empty()
	}
}

/// Canonical spelling used for comparison.
///
/// Case and inner whitespace are normalized, and the `ALL` shorthand
/// compares equal to the `ALL PRIVILEGES` the server prints.
pub fn canonical_privilege(privilege: &str) -> String {
	let collapsed = privilege
		.split_whitespace()
		.collect::<Vec<_>>()
		.join(" ")
		.to_ascii_uppercase();
	if collapsed == "ALL" {
		"ALL PRIVILEGES".to_string()
	} else {
		collapsed
	}
}

/// Compute what to grant and what to revoke.
///
/// ```
/// use grantsmith_engine::diff_privileges;
///
/// let diff = diff_privileges(["SELECT", "INSERT"], ["select", "DELETE"]);
/// assert_eq!(diff.to_grant.iter().collect::<Vec<_>>(), ["INSERT"]);
/// assert_eq!(diff.to_revoke.iter().collect::<Vec<_>>(), ["DELETE"]);
/// ```
pub fn diff_privileges<D, O, S, T>(desired: D, observed: O) -> PrivilegeDiff
where
	D: IntoIterator<Item = S>,
	O: IntoIterator<Item = T>,
	S: AsRef<str>,
	T: AsRef<str>,
{
	let desired: Vec<(String, String)> = desired
		.into_iter()
		.map(|p| (canonical_privilege(p.as_ref()), p.as_ref().trim().to_string()))
		.collect();
	let observed: Vec<(String, String)> = observed
		.into_iter()
		.map(|p| (canonical_privilege(p.as_ref()), p.as_ref().trim().to_string()))
		.collect();

	let desired_keys: IndexSet<&str> = desired.iter().map(|(k, _)| k.as_str()).collect();
	let observed_keys: IndexSet<&str> = observed.iter().map(|(k, _)| k.as_str()).collect();

	let mut diff = PrivilegeDiff::default();
	let mut seen: IndexSet<&str> = IndexSet::new();
	for (key, spelling) in &desired {
		if !observed_keys.contains(key.as_str()) && seen.insert(key.as_str()) {
			diff.to_grant.insert(spelling.clone());
		}
	}
	seen.clear();
	for (key, spelling) in &observed {
		if !desired_keys.contains(key.as_str()) && seen.insert(key.as_str()) {
			diff.to_revoke.insert(spelling.clone());
		}
	}
	diff
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;

	fn set(items: &[&str]) -> IndexSet<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn test_identical_sets_produce_no_changes() {
		let diff = diff_privileges(["SELECT", "INSERT"], ["INSERT", "SELECT"]);
		assert!(diff.is_empty());
	}

	#[test]
	fn test_adds_and_removes() {
		let diff = diff_privileges(["SELECT", "UPDATE"], ["SELECT", "DELETE", "INSERT"]);
		assert_eq!(diff.to_grant, set(&["UPDATE"]));
		assert_eq!(diff.to_revoke, set(&["DELETE", "INSERT"]));
	}

	#[rstest]
	#[case("ALL", "ALL PRIVILEGES")]
	#[case("all", "ALL PRIVILEGES")]
	#[case("create   temporary\ttables", "CREATE TEMPORARY TABLES")]
	#[case(" Select ", "SELECT")]
	fn test_canonical_privilege(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(canonical_privilege(input), expected);
	}

	#[test]
	fn test_all_matches_all_privileges() {
		let diff = diff_privileges(["ALL"], ["ALL PRIVILEGES"]);
		assert!(diff.is_empty());
	}

	#[test]
	fn test_duplicate_spellings_collapse() {
		let diff = diff_privileges(["select", "SELECT"], Vec::<String>::new());
		assert_eq!(diff.to_grant, set(&["select"]));
	}

	fn privilege_set() -> impl Strategy<Value = Vec<String>> {
		prop::collection::vec(
			prop::sample::select(vec![
				"SELECT", "INSERT", "UPDATE", "DELETE", "CREATE", "DROP", "INDEX", "ALTER",
				"EXECUTE", "TRIGGER", "EVENT", "REFERENCES",
			]),
			0..8,
		)
		.prop_map(|v| v.into_iter().map(String::from).collect())
	}

	proptest! {
		#[test]
		fn prop_diff_against_self_is_empty(privileges in privilege_set()) {
			prop_assert!(diff_privileges(&privileges, &privileges).is_empty());
		}

		#[test]
		fn prop_grant_and_revoke_are_disjoint(desired in privilege_set(), observed in privilege_set()) {
			let diff = diff_privileges(&desired, &observed);
			prop_assert!(diff.to_grant.iter().all(|p| !diff.to_revoke.contains(p)));
		}

		#[test]
		fn prop_applying_diff_reaches_desired(desired in privilege_set(), observed in privilege_set()) {
			let diff = diff_privileges(&desired, &observed);
			let mut result: IndexSet<String> = observed.iter().cloned().collect();
			result.retain(|p| !diff.to_revoke.contains(p));
			result.extend(diff.to_grant.iter().cloned());

			let want: IndexSet<String> = desired.iter().cloned().collect();
			prop_assert_eq!(result.len(), want.len());
			prop_assert!(want.iter().all(|p| result.contains(p)));
		}
	}
}
