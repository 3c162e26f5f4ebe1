//! GRANT statement builder

use super::Statement;
use crate::capabilities::{Capabilities, ROLES_MINIMUM_VERSION};
use crate::error::{DclError, Result};
use crate::grant_set::{GrantSet, TlsRequirement};
use crate::principal::Principal;
use crate::scope::Scope;

/// GRANT statement builder
///
/// ```
/// use grantsmith_dcl::statement::GrantStatement;
/// use grantsmith_dcl::{Capabilities, GrantSet, Principal, Scope};
/// use semver::Version;
///
/// let caps = Capabilities::derive(Version::new(8, 0, 36), false);
/// let stmt = GrantStatement::new(
/// 	Principal::user("app", "%"),
/// 	GrantSet::roles(["reader"]),
/// )
/// .build(&caps)
/// .unwrap();
/// assert_eq!(stmt.sql(), "GRANT 'reader' TO 'app'@'%'");
/// ```
#[derive(Debug, Clone)]
pub struct GrantStatement {
	principal: Principal,
	grant_set: GrantSet,
	scope: Scope,
	tls: TlsRequirement,
	grant_option: bool,
}

impl GrantStatement {
	pub fn new(principal: Principal, grant_set: GrantSet) -> Self {
		Self {
			principal,
			grant_set,
			scope: Scope::global(),
			tls: TlsRequirement::None,
			grant_option: false,
		}
	}

	/// Scope for privilege grants; ignored for role grants
	pub fn on(mut self, scope: Scope) -> Self {
		self.scope = scope;
		self
	}

	pub fn require(mut self, tls: TlsRequirement) -> Self {
		self.tls = tls;
		self
	}

	pub fn with_grant_option(mut self, grant_option: bool) -> Self {
		self.grant_option = grant_option;
		self
	}

	pub fn build(&self, caps: &Capabilities) -> Result<Statement> {
		self.principal.validate()?;
		require_roles(self.principal.is_role() || self.grant_set.is_roles(), caps)?;
		if self.grant_set.is_empty() {
			return Err(DclError::EmptyGrantSet("GRANT"));
		}

		let mut sql = format!("GRANT {}", self.grant_set.render_list());
		if !self.grant_set.is_roles() {
			sql.push_str(" ON ");
			sql.push_str(&self.scope.to_string());
		}
		sql.push_str(" TO ");
		sql.push_str(&self.principal.to_string());

		if !caps.supports_roles {
			sql.push_str(" REQUIRE ");
			sql.push_str(&self.tls.to_string());
		}
		if !caps.supports_roles && !self.principal.is_role() && self.grant_option {
			sql.push_str(" WITH GRANT OPTION");
		}
		Ok(Statement::new(sql))
	}
}

/// Fail when roles are involved but the server has none.
pub(crate) fn require_roles(uses_roles: bool, caps: &Capabilities) -> Result<()> {
	if uses_roles && !caps.supports_roles {
		return Err(DclError::UnsupportedFeature {
			feature: "roles".to_string(),
			minimum_version: ROLES_MINIMUM_VERSION.to_string(),
		});
	}
	Ok(())
}
