//! # grantsmith-dcl
//!
//! Rendering of MySQL account and privilege statements.
//!
//! Every mutation the reconciler performs is expressed as a [`Mutation`] and
//! rendered against a [`Capabilities`] set, because the accepted syntax
//! differs between server versions and between MySQL and its forks:
//!
//! | Concern | Rule |
//! |---------|------|
//! | Password change | `ALTER USER ... IDENTIFIED BY` from 5.7.6, `SET PASSWORD` before |
//! | `PASSWORD()` wrapper | forks, and servers older than 8.0.0 |
//! | `REQUIRE` on `GRANT` | only on servers without role support |
//! | `REQUIRE` on users | servers newer than 5.7.0 |
//! | `WITH GRANT OPTION` | only on servers without role support, never for roles |
//!
//! ## Example
//!
//! ```
//! use grantsmith_dcl::{Capabilities, GrantSet, Mutation, Principal, Scope, TlsRequirement};
//! use semver::Version;
//!
//! let caps = Capabilities::derive(Version::new(5, 7, 30), false);
//! let statements = Mutation::GrantPrivileges {
//! 	principal: Principal::user("app", "%"),
//! 	scope: Scope::table("shop", "orders"),
//! 	grant_set: GrantSet::privileges(["SELECT", "INSERT"]),
//! 	tls: TlsRequirement::None,
//! 	grant_option: false,
//! }
//! .build_statements(&caps)
//! .unwrap();
//!
//! assert_eq!(
//! 	statements[0].sql(),
//! 	"GRANT SELECT, INSERT ON `shop`.`orders` TO 'app'@'%' REQUIRE NONE"
//! );
//! ```

pub mod capabilities;
pub mod error;
pub mod grant_set;
pub mod mutation;
pub mod principal;
pub mod scope;
pub mod statement;

pub use capabilities::Capabilities;
pub use error::{DclError, Result};
pub use grant_set::{GrantSet, TlsRequirement};
pub use mutation::Mutation;
pub use principal::{Account, Principal};
pub use scope::{Scope, quote_identifier, unquote_identifier};
pub use statement::{RevokeTarget, Statement, escape_string_literal};
