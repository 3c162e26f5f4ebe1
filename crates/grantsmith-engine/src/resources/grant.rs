//! Grant resource
//!
//! A grant confers privileges on one scope, or role memberships, to a user
//! or a role. Users are named indirectly: the account name is read from a
//! secret at operation time.

use grantsmith_conf::SecretProvider;
use grantsmith_dcl::capabilities::ROLES_MINIMUM_VERSION;
use grantsmith_dcl::scope::WILDCARD;
use grantsmith_dcl::{GrantSet, Mutation, Principal, RevokeTarget, Scope, TlsRequirement};
use indexmap::IndexSet;
use tracing::{debug, info, warn};

use super::{DEFAULT_HOST, resolve_username};
use crate::diff::{PrivilegeDiff, canonical_privilege, diff_privileges};
use crate::error::{ReconcileError, Result};
use crate::identity::{GrantImportId, grant_id};
use crate::parser::fetch_grants;
use crate::session::Session;

/// Desired state of one grant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantSpec {
	pub secret_name: Option<String>,
	pub username_key: Option<String>,
	pub host: String,
	pub role: Option<String>,
	/// Database name, or `db.routine` when `procedure` is set
	pub database: String,
	pub table: String,
	pub grant_set: GrantSet,
	pub grant_option: bool,
	pub procedure: bool,
	pub tls_option: TlsRequirement,
}

impl GrantSpec {
	/// Grant to the account whose name is stored under `username_key` in
	/// `secret_name`.
	pub fn for_user(
		secret_name: impl Into<String>,
		username_key: impl Into<String>,
		database: impl Into<String>,
		grant_set: GrantSet,
	) -> Self {
		Self {
			secret_name: Some(secret_name.into()),
			username_key: Some(username_key.into()),
			host: DEFAULT_HOST.to_string(),
			role: None,
			database: database.into(),
			table: WILDCARD.to_string(),
			grant_set,
			grant_option: false,
			procedure: false,
			tls_option: TlsRequirement::None,
		}
	}

	pub fn for_role(role: impl Into<String>, database: impl Into<String>, grant_set: GrantSet) -> Self {
		Self {
			secret_name: None,
			username_key: None,
			host: DEFAULT_HOST.to_string(),
			role: Some(role.into()),
			database: database.into(),
			table: WILDCARD.to_string(),
			grant_set,
			grant_option: false,
			procedure: false,
			tls_option: TlsRequirement::None,
		}
	}

	pub fn host(mut self, host: impl Into<String>) -> Self {
		self.host = host.into();
		self
	}

	pub fn table(mut self, table: impl Into<String>) -> Self {
		self.table = table.into();
		self
	}

	/// Treat `database` as a `db.procedure` name
	pub fn on_procedure(mut self) -> Self {
		self.procedure = true;
		self
	}

	pub fn with_grant_option(mut self, grant_option: bool) -> Self {
		self.grant_option = grant_option;
		self
	}

	pub fn require(mut self, tls: TlsRequirement) -> Self {
		self.tls_option = tls;
		self
	}

	pub fn scope(&self) -> Scope {
		if self.procedure {
			Scope::procedure(self.database.clone())
		} else {
			Scope::table(self.database.clone(), self.table.clone())
		}
	}

	/// Check the spec's shape without touching the server.
	pub fn validate(&self) -> Result<()> {
		let names_user = self.secret_name.is_some() || self.username_key.is_some();
		match (names_user, self.role.is_some()) {
			(true, true) => {
				return Err(ReconcileError::invalid(
					"a grant names either a user or a role, not both",
				));
			}
			(false, false) => {
				return Err(ReconcileError::invalid("a grant must name a user or a role"));
			}
			_ => {}
		}
		if names_user && (self.secret_name.is_none() || self.username_key.is_none()) {
			return Err(ReconcileError::invalid(
				"secret_name and username_key must be set together",
			));
		}
		if self.database.is_empty() {
			return Err(ReconcileError::invalid("database must not be empty"));
		}
		if self.grant_set.is_empty() {
			return Err(ReconcileError::invalid("privileges or roles must not be empty"));
		}
		if self.procedure && self.grant_set.is_roles() {
			return Err(ReconcileError::invalid("procedure grants take privileges, not roles"));
		}
		Ok(())
	}
}

/// Lifecycle of a managed grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantState {
	Absent,
	Granting,
	Granted,
	Diffing,
	Revoking,
}

/// What the server reports for a grant's principal and scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedGrant {
	/// Whether the listing has a record for the grant's scope
	pub scope_found: bool,
	pub privileges: IndexSet<String>,
	/// Role memberships of the principal
	pub roles: IndexSet<String>,
	pub grant_option: bool,
}

/// Result of a create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantStatus {
	pub id: String,
	pub observed: ObservedGrant,
}

/// One grant recovered by import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedGrant {
	pub id: String,
	pub spec: GrantSpec,
}

/// What a reconcile pass did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
	pub id: String,
	pub transitions: Vec<GrantState>,
	pub granted: IndexSet<String>,
	pub revoked: IndexSet<String>,
}

impl ReconcileOutcome {
	pub fn changed(&self) -> bool {
		!self.granted.is_empty() || !self.revoked.is_empty()
	}
}

/// Runs grant operations within a session
pub struct GrantReconciler<'a> {
	session: &'a Session,
	secrets: &'a dyn SecretProvider,
}

impl<'a> GrantReconciler<'a> {
	pub fn new(session: &'a Session, secrets: &'a dyn SecretProvider) -> Self {
		Self { session, secrets }
	}

	/// Resolve the principal a spec names, reading the account name from
	/// the secret store for user grants.
	pub async fn resolve_principal(&self, spec: &GrantSpec) -> Result<Principal> {
		spec.validate()?;
		if let Some(role) = &spec.role {
			if !self.session.capabilities().supports_roles {
				return Err(ReconcileError::UnsupportedFeature {
					feature: "roles".to_string(),
					minimum_version: ROLES_MINIMUM_VERSION.to_string(),
				});
			}
			return Ok(Principal::role(role.clone()));
		}
		match (&spec.secret_name, &spec.username_key) {
			(Some(secret_name), Some(username_key)) => {
				let username = resolve_username(self.secrets, secret_name, username_key).await?;
				Ok(Principal::user(username, spec.host.clone()))
			}
			_ => Err(ReconcileError::invalid("a grant must name a user or a role")),
		}
	}

	/// Issue the grant, then read it back.
	pub async fn create(&self, spec: &GrantSpec) -> Result<GrantStatus> {
		let principal = self.resolve_principal(spec).await?;
		let scope = spec.scope();

		self.session
			.apply(&grant_mutation(spec, &principal, &scope))
			.await?;
		let id = grant_id(&principal, &scope);
		info!(%id, "grant created");

		let observed = self.observe(&principal, &scope).await?;
		Ok(GrantStatus { id, observed })
	}

	/// Observed state of the grant, or `None` when the principal's grants
	/// can no longer be listed.
	///
	/// Parse failures are returned as errors.
	pub async fn read(&self, spec: &GrantSpec) -> Result<Option<ObservedGrant>> {
		let principal = self.resolve_principal(spec).await?;
		match self.observe(&principal, &spec.scope()).await {
			Ok(observed) => Ok(Some(observed)),
			Err(ReconcileError::Connectivity(err)) => {
				warn!(%principal, error = %err, "grants not readable, treating grant as removed");
				Ok(None)
			}
			Err(err) => Err(err),
		}
	}

	/// Move the scope's privileges to the desired set.
	///
	/// Only privilege grants are diffed; role grants are left alone.
	/// Read failures abort before anything is changed.
	pub async fn update(&self, spec: &GrantSpec) -> Result<PrivilegeDiff> {
		let principal = self.resolve_principal(spec).await?;
		let GrantSet::Privileges(desired) = &spec.grant_set else {
			debug!(%principal, "role grants are not diffed");
			return Ok(PrivilegeDiff::default());
		};
		let scope = spec.scope();

		let observed = self.observe(&principal, &scope).await?;
		let diff = revocable(&scope, diff_privileges(desired, &observed.privileges));
		self.apply_diff(spec, &principal, &scope, &diff).await?;
		Ok(diff)
	}

	/// Remove the grant.
	///
	/// User privilege grants on table scopes first lose the grant option.
	pub async fn delete(&self, spec: &GrantSpec) -> Result<()> {
		let principal = self.resolve_principal(spec).await?;
		let scope = spec.scope();

		if !principal.is_role() && !spec.grant_set.is_roles() && !spec.procedure {
			self.session
				.apply(&Mutation::RevokeGrantOption {
					principal: principal.clone(),
					scope: scope.clone(),
				})
				.await?;
		}
		self.session
			.apply(&Mutation::RevokeAll {
				principal: principal.clone(),
				target: RevokeTarget::for_deletion(Some(&spec.grant_set), &scope),
			})
			.await?;
		info!(%principal, %scope, "grant removed");
		Ok(())
	}

	/// Recover one grant per scope the account holds privileges on.
	///
	/// `id` is `SECRET_NAME@USERNAME_KEY@HOST`. Restored grants carry no
	/// TLS requirement. Function scopes have no spec form and are skipped.
	pub async fn import(&self, id: &str) -> Result<Vec<ImportedGrant>> {
		let import_id = GrantImportId::parse(id)?;
		let username =
			resolve_username(self.secrets, &import_id.secret_name, &import_id.username_key).await?;
		let principal = Principal::user(username, import_id.host.clone());
		let listing = fetch_grants(self.session.connection(), &principal).await?;

		let mut imported = Vec::with_capacity(listing.records.len());
		for record in &listing.records {
			let (database, table, procedure) = match &record.scope {
				Scope::Table { database, table } => (database.clone(), table.clone(), false),
				Scope::Procedure(name) => (name.clone(), WILDCARD.to_string(), true),
				Scope::Function(name) => {
					warn!(function = %name, "function grants cannot be imported, skipping");
					continue;
				}
			};
			imported.push(ImportedGrant {
				id: import_id.restored_grant_id(&record.scope),
				spec: GrantSpec {
					secret_name: Some(import_id.secret_name.clone()),
					username_key: Some(import_id.username_key.clone()),
					host: import_id.host.clone(),
					role: None,
					database,
					table,
					grant_set: GrantSet::Privileges(record.privileges.clone()),
					grant_option: record.has_grant_option,
					procedure,
					tls_option: TlsRequirement::None,
				},
			});
		}
		info!(%principal, count = imported.len(), "grants imported");
		Ok(imported)
	}

	/// Bring one grant to its desired state, creating it when absent.
	pub async fn reconcile(&self, spec: &GrantSpec) -> Result<ReconcileOutcome> {
		let principal = self.resolve_principal(spec).await?;
		let scope = spec.scope();
		let mut outcome = ReconcileOutcome {
			id: grant_id(&principal, &scope),
			transitions: Vec::new(),
			granted: IndexSet::new(),
			revoked: IndexSet::new(),
		};

		let observed = match self.observe(&principal, &scope).await {
			Ok(observed) => Some(observed),
			Err(ReconcileError::Connectivity(err)) if err.is_missing_grant() => {
				debug!(%principal, error = %err, "principal holds no grants");
				None
			}
			Err(err) => return Err(err),
		};
		let present = match (&observed, &spec.grant_set) {
			(Some(observed), GrantSet::Privileges(_)) => observed.scope_found,
			(Some(observed), GrantSet::Roles(roles)) => roles.iter().all(|r| observed.roles.contains(r)),
			(None, _) => false,
		};

		if !present {
			outcome.transitions.extend([GrantState::Absent, GrantState::Granting]);
			self.session
				.apply(&grant_mutation(spec, &principal, &scope))
				.await?;
			outcome.transitions.push(GrantState::Granted);
			outcome.granted = spec.grant_set.items().clone();
			info!(id = %outcome.id, "grant created");
			return Ok(outcome);
		}

		outcome.transitions.push(GrantState::Granted);
		let (GrantSet::Privileges(desired), Some(observed)) = (&spec.grant_set, observed) else {
			return Ok(outcome);
		};

		outcome.transitions.push(GrantState::Diffing);
		let diff = revocable(&scope, diff_privileges(desired, &observed.privileges));
		if diff.is_empty() {
			outcome.transitions.push(GrantState::Granted);
			return Ok(outcome);
		}
		if !diff.to_grant.is_empty() {
			outcome.transitions.push(GrantState::Granting);
		}
		if !diff.to_revoke.is_empty() {
			outcome.transitions.push(GrantState::Revoking);
		}
		self.apply_diff(spec, &principal, &scope, &diff).await?;
		outcome.transitions.push(GrantState::Granted);
		outcome.granted = diff.to_grant;
		outcome.revoked = diff.to_revoke;
		Ok(outcome)
	}

	async fn observe(&self, principal: &Principal, scope: &Scope) -> Result<ObservedGrant> {
		let listing = fetch_grants(self.session.connection(), principal).await?;
		let record = listing.record_for(scope);
		Ok(ObservedGrant {
			scope_found: record.is_some(),
			privileges: record.map(|r| r.privileges.clone()).unwrap_or_default(),
			roles: listing.roles.clone(),
			grant_option: listing.has_grant_option(),
		})
	}

	async fn apply_diff(
		&self,
		spec: &GrantSpec,
		principal: &Principal,
		scope: &Scope,
		diff: &PrivilegeDiff,
	) -> Result<()> {
		if !diff.to_grant.is_empty() {
			// Servers without roles put REQUIRE on every GRANT; repeat the declared one.
			let tls = if self.session.capabilities().supports_roles {
				TlsRequirement::None
			} else {
				spec.tls_option.clone()
			};
			self.session
				.apply(&Mutation::GrantPrivileges {
					principal: principal.clone(),
					scope: scope.clone(),
					grant_set: GrantSet::Privileges(diff.to_grant.clone()),
					tls,
					grant_option: false,
				})
				.await?;
		}
		if !diff.to_revoke.is_empty() {
			let mutation = match scope {
				Scope::Procedure(name) => Mutation::RevokeAll {
					principal: principal.clone(),
					target: RevokeTarget::ProcedureExecute(name.clone()),
				},
				_ => Mutation::RevokePrivileges {
					principal: principal.clone(),
					scope: scope.clone(),
					privileges: diff.to_revoke.clone(),
				},
			};
			self.session.apply(&mutation).await?;
		}
		debug!(
			%principal,
			granted = diff.to_grant.len(),
			revoked = diff.to_revoke.len(),
			"privileges updated"
		);
		Ok(())
	}
}

/// Procedures only ever lose `EXECUTE`; other routine privileges stay.
fn revocable(scope: &Scope, mut diff: PrivilegeDiff) -> PrivilegeDiff {
	if let Scope::Procedure(name) = scope {
		let (execute, kept): (IndexSet<String>, IndexSet<String>) = diff
			.to_revoke
			.into_iter()
			.partition(|p| canonical_privilege(p) == "EXECUTE");
		if !kept.is_empty() {
			warn!(
				procedure = %name,
				privileges = ?kept,
				"only EXECUTE is revoked on procedures, leaving the rest"
			);
		}
		diff.to_revoke = execute;
	}
	diff
}

fn grant_mutation(spec: &GrantSpec, principal: &Principal, scope: &Scope) -> Mutation {
	Mutation::GrantPrivileges {
		principal: principal.clone(),
		scope: scope.clone(),
		grant_set: spec.grant_set.clone(),
		tls: spec.tls_option.clone(),
		grant_option: spec.grant_option,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn test_user_spec_defaults() {
		let spec = GrantSpec::for_user("prod/app", "username", "shop", GrantSet::privileges(["SELECT"]));
		assert_eq!(spec.host, "localhost");
		assert_eq!(spec.scope(), Scope::table("shop", "*"));
		assert!(spec.validate().is_ok());
	}

	#[test]
	fn test_procedure_scope() {
		let spec = GrantSpec::for_user("s", "u", "shop.refund", GrantSet::privileges(["EXECUTE"]))
			.on_procedure();
		assert_eq!(spec.scope(), Scope::procedure("shop.refund"));
	}

	fn with_role(mut spec: GrantSpec) -> GrantSpec {
		spec.role = Some("reader".to_string());
		spec
	}

	fn without_user(mut spec: GrantSpec) -> GrantSpec {
		spec.secret_name = None;
		spec.username_key = None;
		spec
	}

	fn missing_key(mut spec: GrantSpec) -> GrantSpec {
		spec.username_key = None;
		spec
	}

	#[rstest]
	#[case::both_user_and_role(with_role(GrantSpec::for_user("s", "u", "shop", GrantSet::privileges(["SELECT"]))))]
	#[case::neither(without_user(GrantSpec::for_user("s", "u", "shop", GrantSet::privileges(["SELECT"]))))]
	#[case::half_named_user(missing_key(GrantSpec::for_user("s", "u", "shop", GrantSet::privileges(["SELECT"]))))]
	#[case::empty_privileges(GrantSpec::for_user("s", "u", "shop", GrantSet::privileges(Vec::<String>::new())))]
	#[case::empty_database(GrantSpec::for_role("reader", "", GrantSet::privileges(["SELECT"])))]
	#[case::procedure_roles(GrantSpec::for_user("s", "u", "shop.refund", GrantSet::roles(["reader"])).on_procedure())]
	fn test_invalid_specs(#[case] spec: GrantSpec) {
		assert!(matches!(
			spec.validate(),
			Err(ReconcileError::InvalidConfiguration(_))
		));
	}

	#[test]
	fn test_outcome_changed() {
		let mut outcome = ReconcileOutcome {
			id: "app@%:`shop`".to_string(),
			transitions: vec![GrantState::Granted],
			granted: IndexSet::new(),
			revoked: IndexSet::new(),
		};
		assert!(!outcome.changed());
		outcome.revoked.insert("DELETE".to_string());
		assert!(outcome.changed());
	}
}
