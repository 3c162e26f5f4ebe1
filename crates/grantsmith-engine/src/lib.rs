//! # grantsmith-engine
//!
//! Converges MySQL accounts and privileges to a declared state.
//!
//! A [`Session`] resolves the server's [`Capabilities`](grantsmith_dcl::Capabilities)
//! once, then every operation reads the current grants with
//! `SHOW GRANTS FOR`, computes a [`PrivilegeDiff`], and applies dialect-correct
//! mutations rendered by `grantsmith-dcl`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use grantsmith_conf::secrets::providers::MemorySecretProvider;
//! use grantsmith_db::DatabaseConnection;
//! use grantsmith_dcl::GrantSet;
//! use grantsmith_engine::{GrantReconciler, GrantSpec, Session};
//!
//! # async fn example(conn: DatabaseConnection) -> grantsmith_engine::Result<()> {
//! let secrets = MemorySecretProvider::new();
//! secrets.insert_values("prod/app", [("username", "app")]);
//!
//! let session = Session::begin(conn).await?;
//! let spec = GrantSpec::for_user("prod/app", "username", "shop", GrantSet::privileges(["SELECT"]))
//! 	.host("%");
//! let outcome = GrantReconciler::new(&session, &secrets).reconcile(&spec).await?;
//! println!("{} changed: {}", outcome.id, outcome.changed());
//! # Ok(())
//! # }
//! ```

pub mod capability;
pub mod diff;
pub mod error;
mod grammar;
pub mod identity;
pub mod parser;
pub mod resources;
pub mod session;

pub use capability::{VERSION_QUERY, parse_server_version, resolve_capabilities};
pub use diff::{PrivilegeDiff, canonical_privilege, diff_privileges};
pub use error::{ReconcileError, Result};
pub use identity::{GrantImportId, UserId, grant_id, user_password_id};
pub use parser::{GrantLine, GrantListing, GrantRecord, fetch_grants, parse_grant_line, parse_grant_text};
pub use resources::{
	EncryptedSecret, GrantReconciler, GrantSpec, GrantState, GrantStatus, ImportedGrant,
	ObservedGrant, PasswordGenerator, PasswordPolicy, RandomPasswordGenerator, ReconcileOutcome,
	SecretEncryptor, UserPasswordSpec, UserPasswordState, UserReconciler, UserSpec,
	set_user_password,
};
pub use session::Session;
