//! Reconciliation session

use grantsmith_db::DatabaseConnection;
use grantsmith_dcl::{Capabilities, Mutation, Statement};
use tracing::{debug, info, warn};

use crate::capability::resolve_capabilities;
use crate::error::{ReconcileError, Result};

/// A connection paired with the capabilities resolved for it
///
/// Capabilities are resolved once when the session begins and reused by
/// every operation run through it.
#[derive(Debug, Clone)]
pub struct Session {
	conn: DatabaseConnection,
	caps: Capabilities,
}

impl Session {
	pub async fn begin(conn: DatabaseConnection) -> Result<Self> {
		let caps = resolve_capabilities(&conn).await?;
		info!(%caps, "reconciliation session started");
		Ok(Self { conn, caps })
	}

	/// Session for an already known server
	pub fn with_capabilities(conn: DatabaseConnection, caps: Capabilities) -> Self {
		Self { conn, caps }
	}

	pub fn capabilities(&self) -> &Capabilities {
		&self.caps
	}

	pub fn connection(&self) -> &DatabaseConnection {
		&self.conn
	}

	/// Render `mutation` and execute its statements in order.
	///
	/// Rendering happens before anything is sent, so an unsupported feature
	/// never leaves a half-applied mutation. Execution stops at the first
	/// failing statement.
	pub async fn apply(&self, mutation: &Mutation) -> Result<Vec<Statement>> {
		let statements = mutation.build_statements(&self.caps)?;
		debug!(kind = mutation.kind(), count = statements.len(), "applying mutation");
		for statement in &statements {
			self.execute(statement).await?;
		}
		Ok(statements)
	}

	pub async fn execute(&self, statement: &Statement) -> Result<u64> {
		debug!(sql = %statement, "executing statement");
		self.conn
			.execute_statement(statement.sql())
			.await
			.map_err(|e| {
				warn!(sql = %statement, error = %e, "statement failed");
				ReconcileError::StatementExecution {
					statement: statement.redacted().to_string(),
					message: e.to_string(),
				}
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use grantsmith_dcl::{Account, TlsRequirement};
	use grantsmith_test::ScriptedBackend;
	use semver::Version;
	use std::sync::Arc;

	#[tokio::test]
	async fn test_begin_resolves_capabilities_once() {
		let backend = Arc::new(ScriptedBackend::new().with_version("8.0.36"));
		let session = Session::begin(DatabaseConnection::new(backend.clone()))
			.await
			.unwrap();

		assert!(session.capabilities().supports_roles);
		assert_eq!(backend.queries().len(), 1);
	}

	#[tokio::test]
	async fn test_failed_statement_reports_redacted_sql() {
		let backend = Arc::new(ScriptedBackend::new().fail_on("CREATE USER", "1396", "Operation CREATE USER failed"));
		let session = Session::with_capabilities(
			DatabaseConnection::new(backend.clone()),
			Capabilities::derive(Version::new(8, 0, 36), false),
		);

		let err = session
			.apply(&Mutation::CreateUser {
				account: Account::new("app", "%"),
				password: "hunter2".to_string(),
				tls: TlsRequirement::None,
			})
			.await
			.unwrap_err();

		let ReconcileError::StatementExecution { statement, message } = err else {
			panic!("expected statement error");
		};
		assert!(!statement.contains("hunter2"));
		assert!(statement.starts_with("CREATE USER 'app'@'%'"));
		assert!(message.contains("1396"));
	}

	#[tokio::test]
	async fn test_unsupported_mutation_sends_nothing() {
		let backend = Arc::new(ScriptedBackend::new());
		let session = Session::with_capabilities(
			DatabaseConnection::new(backend.clone()),
			Capabilities::derive(Version::new(5, 6, 51), false),
		);

		let err = session
			.apply(&Mutation::AlterUserTls {
				account: Account::new("app", "%"),
				tls: TlsRequirement::Ssl,
			})
			.await
			.unwrap_err();

		assert!(matches!(err, ReconcileError::UnsupportedFeature { .. }));
		assert!(backend.executed().is_empty());
	}
}
