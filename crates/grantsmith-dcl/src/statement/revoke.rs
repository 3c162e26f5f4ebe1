//! REVOKE statement builders

use indexmap::IndexSet;

use super::Statement;
use crate::capabilities::Capabilities;
use crate::error::{DclError, Result};
use crate::grant_set::{GrantSet, join};
use crate::principal::Principal;
use crate::scope::Scope;

use super::grant::require_roles;

/// What a full revoke removes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevokeTarget {
	/// `ALL ON <scope>`
	All(Scope),
	/// Role memberships
	Roles(IndexSet<String>),
	/// Named privileges on a table scope
	Privileges {
		privileges: IndexSet<String>,
		scope: Scope,
	},
	/// `EXECUTE ON PROCEDURE <name>`
	ProcedureExecute(String),
}

impl RevokeTarget {
	/// Pick the revoke used when a managed grant is deleted.
	///
	/// Named roles win, then named privileges on a table scope, then
	/// `EXECUTE` for a procedure; otherwise everything on the scope.
	pub fn for_deletion(grant_set: Option<&GrantSet>, scope: &Scope) -> Self {
		match grant_set {
			Some(GrantSet::Roles(roles)) if !roles.is_empty() => Self::Roles(roles.clone()),
			Some(GrantSet::Privileges(privileges))
				if !privileges.is_empty() && !scope.is_routine() =>
			{
				Self::Privileges {
					privileges: privileges.clone(),
					scope: scope.clone(),
				}
			}
			_ => match scope {
				Scope::Procedure(name) => Self::ProcedureExecute(name.clone()),
				_ => Self::All(scope.clone()),
			},
		}
	}

	fn render(&self) -> Result<String> {
		Ok(match self {
			Self::All(scope) => format!("ALL ON {}", scope),
			Self::Roles(roles) => {
				if roles.is_empty() {
					return Err(DclError::EmptyGrantSet("REVOKE"));
				}
				join(roles.iter().map(|r| format!("'{}'", r)))
			}
			Self::Privileges { privileges, scope } => {
				if privileges.is_empty() {
					return Err(DclError::EmptyGrantSet("REVOKE"));
				}
				format!("{} ON {}", join(privileges), scope)
			}
			Self::ProcedureExecute(name) => format!("EXECUTE ON PROCEDURE {}", name),
		})
	}
}

/// `REVOKE <target> FROM <principal>`
#[derive(Debug, Clone)]
pub struct RevokeStatement {
	principal: Principal,
	target: RevokeTarget,
}

impl RevokeStatement {
	pub fn new(principal: Principal, target: RevokeTarget) -> Self {
		Self { principal, target }
	}

	/// Revoke exactly `privileges` on `scope`
	pub fn privileges<I, S>(principal: Principal, privileges: I, scope: Scope) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::new(
			principal,
			RevokeTarget::Privileges {
				privileges: privileges.into_iter().map(Into::into).collect(),
				scope,
			},
		)
	}

	pub fn build(&self, caps: &Capabilities) -> Result<Statement> {
		self.principal.validate()?;
		let revoking_roles = matches!(self.target, RevokeTarget::Roles(_));
		require_roles(self.principal.is_role() || revoking_roles, caps)?;
		Ok(Statement::new(format!(
			"REVOKE {} FROM {}",
			self.target.render()?,
			self.principal
		)))
	}
}

/// `REVOKE GRANT OPTION ON <scope> FROM <principal>`
#[derive(Debug, Clone)]
pub struct RevokeGrantOptionStatement {
	principal: Principal,
	scope: Scope,
}

impl RevokeGrantOptionStatement {
	pub fn new(principal: Principal, scope: Scope) -> Self {
		Self { principal, scope }
	}

	pub fn build(&self, caps: &Capabilities) -> Result<Statement> {
		self.principal.validate()?;
		require_roles(self.principal.is_role(), caps)?;
		Ok(Statement::new(format!(
			"REVOKE GRANT OPTION ON {} FROM {}",
			self.scope, self.principal
		)))
	}
}
