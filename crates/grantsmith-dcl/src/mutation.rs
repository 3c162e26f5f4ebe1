//! Abstract mutations and their dialect-correct rendering

use indexmap::IndexSet;

use crate::capabilities::Capabilities;
use crate::error::Result;
use crate::grant_set::{GrantSet, TlsRequirement};
use crate::principal::{Account, Principal};
use crate::scope::Scope;
use crate::statement::{
	AlterUserPasswordStatement, AlterUserTlsStatement, CreateUserStatement, DropUserStatement,
	GrantStatement, RevokeGrantOptionStatement, RevokeStatement, RevokeTarget, Statement,
};

/// One change to the server's access control state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
	CreateUser {
		account: Account,
		password: String,
		tls: TlsRequirement,
	},
	AlterUserPassword {
		account: Account,
		password: String,
	},
	AlterUserTls {
		account: Account,
		tls: TlsRequirement,
	},
	/// Grant privileges on a scope, or role memberships
	GrantPrivileges {
		principal: Principal,
		scope: Scope,
		grant_set: GrantSet,
		tls: TlsRequirement,
		grant_option: bool,
	},
	RevokePrivileges {
		principal: Principal,
		scope: Scope,
		privileges: IndexSet<String>,
	},
	RevokeGrantOption {
		principal: Principal,
		scope: Scope,
	},
	/// The revoke issued when a managed grant is removed
	RevokeAll {
		principal: Principal,
		target: RevokeTarget,
	},
	DropUser {
		account: Account,
	},
}

impl Mutation {
	/// Render the statements that perform this mutation, in execution order.
	///
	/// Most mutations render to one statement. A grant with a TLS
	/// requirement on a server with role support renders a second
	/// `ALTER USER ... REQUIRE` statement, because such servers reject
	/// `REQUIRE` on `GRANT`.
	pub fn build_statements(&self, caps: &Capabilities) -> Result<Vec<Statement>> {
		match self {
			Self::CreateUser {
				account,
				password,
				tls,
			} => {
				account.validate()?;
				Ok(vec![
					CreateUserStatement::new(account.clone(), password.as_str())
						.require(tls.clone())
						.build(caps),
				])
			}
			Self::AlterUserPassword { account, password } => {
				account.validate()?;
				Ok(vec![
					AlterUserPasswordStatement::new(account.clone(), password.as_str()).build(caps),
				])
			}
			Self::AlterUserTls { account, tls } => {
				account.validate()?;
				Ok(vec![
					AlterUserTlsStatement::new(account.clone(), tls.clone()).build(caps)?,
				])
			}
			Self::GrantPrivileges {
				principal,
				scope,
				grant_set,
				tls,
				grant_option,
			} => {
				let grant = GrantStatement::new(principal.clone(), grant_set.clone())
					.on(scope.clone())
					.require(tls.clone())
					.with_grant_option(*grant_option)
					.build(caps)?;
				let mut statements = vec![grant];
				if caps.supports_roles
					&& *tls != TlsRequirement::None
					&& let Some(account) = principal.account()
				{
					statements.push(AlterUserTlsStatement::new(account.clone(), tls.clone()).build(caps)?);
				}
				Ok(statements)
			}
			Self::RevokePrivileges {
				principal,
				scope,
				privileges,
			} => Ok(vec![
				RevokeStatement::privileges(principal.clone(), privileges.iter().cloned(), scope.clone())
					.build(caps)?,
			]),
			Self::RevokeGrantOption { principal, scope } => Ok(vec![
				RevokeGrantOptionStatement::new(principal.clone(), scope.clone()).build(caps)?,
			]),
			Self::RevokeAll { principal, target } => Ok(vec![
				RevokeStatement::new(principal.clone(), target.clone()).build(caps)?,
			]),
			Self::DropUser { account } => {
				account.validate()?;
				Ok(vec![DropUserStatement::new(account.clone()).build()])
			}
		}
	}

	/// Short name for logs
	pub fn kind(&self) -> &'static str {
		match self {
			Self::CreateUser { .. } => "create_user",
			Self::AlterUserPassword { .. } => "alter_user_password",
			Self::AlterUserTls { .. } => "alter_user_tls",
			Self::GrantPrivileges { .. } => "grant_privileges",
			Self::RevokePrivileges { .. } => "revoke_privileges",
			Self::RevokeGrantOption { .. } => "revoke_grant_option",
			Self::RevokeAll { .. } => "revoke_all",
			Self::DropUser { .. } => "drop_user",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::DclError;
	use semver::Version;

	fn mysql57() -> Capabilities {
		Capabilities::derive(Version::new(5, 7, 44), false)
	}

	fn mysql8() -> Capabilities {
		Capabilities::derive(Version::new(8, 0, 36), false)
	}

	fn grant(tls: TlsRequirement, principal: Principal) -> Mutation {
		Mutation::GrantPrivileges {
			principal,
			scope: Scope::table("shop", "*"),
			grant_set: GrantSet::privileges(["SELECT"]),
			tls,
			grant_option: true,
		}
	}

	#[test]
	fn test_grant_with_tls_on_legacy_server_is_one_statement() {
		let statements = grant(TlsRequirement::Ssl, Principal::user("app", "%"))
			.build_statements(&mysql57())
			.unwrap();
		assert_eq!(statements.len(), 1);
		assert_eq!(
			statements[0].sql(),
			"GRANT SELECT ON `shop`.* TO 'app'@'%' REQUIRE SSL WITH GRANT OPTION"
		);
	}

	#[test]
	fn test_grant_with_tls_on_role_server_routes_to_alter_user() {
		let statements = grant(TlsRequirement::Ssl, Principal::user("app", "%"))
			.build_statements(&mysql8())
			.unwrap();
		let sql: Vec<&str> = statements.iter().map(Statement::sql).collect();
		assert_eq!(
			sql,
			vec![
				"GRANT SELECT ON `shop`.* TO 'app'@'%'",
				"ALTER USER 'app'@'%' REQUIRE SSL",
			]
		);
	}

	#[test]
	fn test_grant_without_tls_on_role_server_is_one_statement() {
		let statements = grant(TlsRequirement::None, Principal::user("app", "%"))
			.build_statements(&mysql8())
			.unwrap();
		assert_eq!(statements.len(), 1);
	}

	#[test]
	fn test_grant_to_role_never_alters_user() {
		let statements = grant(TlsRequirement::X509, Principal::role("reader"))
			.build_statements(&mysql8())
			.unwrap();
		let sql: Vec<&str> = statements.iter().map(Statement::sql).collect();
		assert_eq!(sql, vec!["GRANT SELECT ON `shop`.* TO 'reader'"]);
	}

	#[test]
	fn test_grant_to_role_on_legacy_server_fails_before_rendering() {
		let err = grant(TlsRequirement::None, Principal::role("reader"))
			.build_statements(&mysql57())
			.unwrap_err();
		assert!(matches!(err, DclError::UnsupportedFeature { ref minimum_version, .. } if minimum_version == "8.0.1"));
	}

	#[test]
	fn test_revoke_privileges_mutation() {
		let mutation = Mutation::RevokePrivileges {
			principal: Principal::user("app", "%"),
			scope: Scope::table("shop", "orders"),
			privileges: ["DELETE".to_string()].into_iter().collect(),
		};
		let statements = mutation.build_statements(&mysql8()).unwrap();
		assert_eq!(
			statements[0].sql(),
			"REVOKE DELETE ON `shop`.`orders` FROM 'app'@'%'"
		);
		assert_eq!(mutation.kind(), "revoke_privileges");
	}

	#[test]
	fn test_create_user_rejects_quoted_name() {
		let mutation = Mutation::CreateUser {
			account: Account::new("a'b", "%"),
			password: "pw".to_string(),
			tls: TlsRequirement::None,
		};
		assert!(matches!(
			mutation.build_statements(&mysql8()),
			Err(DclError::InvalidPrincipal(_))
		));
	}

	#[test]
	fn test_drop_user_mutation() {
		let statements = Mutation::DropUser {
			account: Account::new("old", "localhost"),
		}
		.build_statements(&mysql57())
		.unwrap();
		assert_eq!(statements[0].sql(), "DROP USER 'old'@'localhost'");
	}
}
