//! Scripted database backend

use async_trait::async_trait;
use grantsmith_db::{DatabaseBackend, DatabaseError, QueryResult, QueryValue, Result, Row};
use parking_lot::Mutex;

/// A query seen by [`ScriptedBackend`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
	pub sql: String,
	pub params: Vec<QueryValue>,
}

#[derive(Debug, Clone)]
enum Reply {
	Rows(Vec<Row>),
	Fail { code: String, message: String },
}

/// Backend answering from a script
///
/// Replies are keyed by SQL prefix; the longest matching prefix wins.
/// Unscripted queries return no rows and unscripted statements succeed.
/// Statements sent through `execute` and queries sent through the fetch
/// methods are recorded separately.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
	replies: Mutex<Vec<(String, Reply)>>,
	executed: Mutex<Vec<String>>,
	queries: Mutex<Vec<RecordedQuery>>,
}

impl ScriptedBackend {
	pub fn new() -> Self {
		Self::default()
	}

	/// Answer the version query with `banner`
	pub fn with_version(self, banner: &str) -> Self {
		self.with_rows(
			"SELECT @@GLOBAL.version",
			vec![Row::from_pairs([("@@GLOBAL.version", banner)])],
		)
	}

	pub fn with_rows(self, prefix: &str, rows: Vec<Row>) -> Self {
		self.set_rows(prefix, rows);
		self
	}

	/// Answer `SHOW GRANTS FOR <principal>` with one row per line
	pub fn with_grants(self, principal: &str, lines: &[&str]) -> Self {
		self.set_grants(principal, lines);
		self
	}

	/// Answer queries starting with `prefix` with a single value
	pub fn with_scalar(self, prefix: &str, value: impl Into<QueryValue>) -> Self {
		self.set_rows(prefix, vec![Row::from_pairs([("value", value.into())])]);
		self
	}

	/// Fail anything starting with `prefix` with a server error
	pub fn fail_on(self, prefix: &str, code: &str, message: &str) -> Self {
		self.set_reply(
			prefix,
			Reply::Fail {
				code: code.to_string(),
				message: message.to_string(),
			},
		);
		self
	}

	pub fn set_rows(&self, prefix: &str, rows: Vec<Row>) {
		self.set_reply(prefix, Reply::Rows(rows));
	}

	pub fn set_grants(&self, principal: &str, lines: &[&str]) {
		let column = format!("Grants for {}", principal.replace('\'', ""));
		let rows = lines
			.iter()
			.map(|line| Row::from_pairs([(column.as_str(), *line)]))
			.collect();
		self.set_rows(&format!("SHOW GRANTS FOR {}", principal), rows);
	}

	/// Statements sent through `execute`, in order
	pub fn executed(&self) -> Vec<String> {
		self.executed.lock().clone()
	}

	/// SQL of every fetch, in order
	pub fn queries(&self) -> Vec<String> {
		self.queries.lock().iter().map(|q| q.sql.clone()).collect()
	}

	pub fn recorded_queries(&self) -> Vec<RecordedQuery> {
		self.queries.lock().clone()
	}

	fn set_reply(&self, prefix: &str, reply: Reply) {
		let mut replies = self.replies.lock();
		match replies.iter_mut().find(|(p, _)| p == prefix) {
			Some((_, existing)) => *existing = reply,
			None => replies.push((prefix.to_string(), reply)),
		}
	}

	fn reply(&self, sql: &str) -> Option<Reply> {
		self.replies
			.lock()
			.iter()
			.filter(|(prefix, _)| sql.starts_with(prefix.as_str()))
			.max_by_key(|(prefix, _)| prefix.len())
			.map(|(_, reply)| reply.clone())
	}

	fn rows_for(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>> {
		self.queries.lock().push(RecordedQuery {
			sql: sql.to_string(),
			params,
		});
		match self.reply(sql) {
			Some(Reply::Rows(rows)) => Ok(rows),
			Some(Reply::Fail { code, message }) => Err(DatabaseError::Server {
				code: Some(code),
				message,
			}),
			None => Ok(Vec::new()),
		}
	}
}

#[async_trait]
impl DatabaseBackend for ScriptedBackend {
	async fn execute(&self, sql: &str, _params: Vec<QueryValue>) -> Result<QueryResult> {
		self.executed.lock().push(sql.to_string());
		match self.reply(sql) {
			Some(Reply::Fail { code, message }) => Err(DatabaseError::Server {
				code: Some(code),
				message,
			}),
			_ => Ok(QueryResult { rows_affected: 0 }),
		}
	}

	async fn fetch_one(&self, sql: &str, params: Vec<QueryValue>) -> Result<Row> {
		self.rows_for(sql, params)?
			.into_iter()
			.next()
			.ok_or(DatabaseError::NoRows)
	}

	async fn fetch_all(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>> {
		self.rows_for(sql, params)
	}

	async fn fetch_optional(&self, sql: &str, params: Vec<QueryValue>) -> Result<Option<Row>> {
		Ok(self.rows_for(sql, params)?.into_iter().next())
	}
}
