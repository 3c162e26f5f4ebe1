//! MySQL dialect implementation

use async_trait::async_trait;
use grantsmith_conf::{AuthenticationPlugin, Credentials, ProviderSettings, TlsMode};
use secrecy::ExposeSecret;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlRow, MySqlSslMode};
use sqlx::{Column, MySqlPool, Row as SqlxRow, ValueRef};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{
	backend::DatabaseBackend,
	error::{DatabaseError, Result},
	types::{QueryResult, QueryValue, Row},
};

const DEFAULT_PORT: u16 = 3306;
const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(500);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);

/// MySQL database backend
pub struct MySqlBackend {
	pool: Arc<MySqlPool>,
}

impl MySqlBackend {
	pub fn new(pool: MySqlPool) -> Self {
		Self {
			pool: Arc::new(pool),
		}
	}

	pub fn pool(&self) -> &MySqlPool {
		&self.pool
	}

	/// Open a pool against the configured endpoint.
	///
	/// A freshly provisioned server often refuses connections for a while,
	/// so failed attempts are retried with a growing delay until
	/// `connect_retry_timeout_sec` has elapsed. The last error is returned.
	pub async fn connect(settings: &ProviderSettings, credentials: &Credentials) -> Result<Self> {
		let options = connect_options(settings, credentials)?;
		let mut pool_options = MySqlPoolOptions::new();
		if let Some(max) = settings.max_open_conns {
			pool_options = pool_options.max_connections(max);
		}
		if let Some(lifetime) = settings.max_conn_lifetime() {
			pool_options = pool_options.max_lifetime(lifetime);
		}

		let deadline = Instant::now() + settings.connect_retry_timeout();
		let mut delay = INITIAL_RETRY_DELAY;
		let mut attempt: u32 = 0;
		loop {
			attempt += 1;
			match pool_options.clone().connect_with(options.clone()).await {
				Ok(pool) => {
					tracing::debug!(endpoint = %settings.endpoint, attempt, "connected");
					return Ok(Self::new(pool));
				}
				Err(e) => {
					let err = DatabaseError::from(e);
					if Instant::now() + delay >= deadline {
						return Err(DatabaseError::ConnectionError(format!(
							"could not connect to {} after {} attempts: {}",
							settings.endpoint, attempt, err
						)));
					}
					tracing::warn!(
						endpoint = %settings.endpoint,
						attempt,
						error = %err,
						"connection attempt failed, retrying"
					);
					tokio::time::sleep(delay).await;
					delay = (delay * 2).min(MAX_RETRY_DELAY);
				}
			}
		}
	}

	fn bind_value<'q>(
		query: sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments>,
		value: &'q QueryValue,
	) -> sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments> {
		match value {
			QueryValue::Null => query.bind(None::<i32>),
			QueryValue::Bool(b) => query.bind(b),
			QueryValue::Int(i) => query.bind(i),
			QueryValue::Float(f) => query.bind(f),
			QueryValue::String(s) => query.bind(s),
			QueryValue::Bytes(b) => query.bind(b),
		}
	}

	fn convert_row(mysql_row: MySqlRow) -> Result<Row> {
		let mut row = Row::new();
		for column in mysql_row.columns() {
			let index = column.ordinal();
			let column_name = column.name().to_string();
			let is_null = mysql_row
				.try_get_raw(index)
				.map(|raw| raw.is_null())
				.unwrap_or(false);
			if is_null {
				row.insert(column_name, QueryValue::Null);
			} else if let Ok(value) = mysql_row.try_get::<i64, _>(index) {
				row.insert(column_name, QueryValue::Int(value));
			} else if let Ok(value) = mysql_row.try_get::<u64, _>(index) {
				row.insert(column_name, QueryValue::Int(value as i64));
			} else if let Ok(value) = mysql_row.try_get::<String, _>(index) {
				row.insert(column_name, QueryValue::String(value));
			} else if let Ok(value) = mysql_row.try_get::<Vec<u8>, _>(index) {
				// Some server versions report account names and grant text with a
				// binary collation; recover the string when it is valid UTF-8.
				match String::from_utf8(value) {
					Ok(s) => row.insert(column_name, QueryValue::String(s)),
					Err(e) => row.insert(column_name, QueryValue::Bytes(e.into_bytes())),
				};
			} else if let Ok(value) = mysql_row.try_get::<f64, _>(index) {
				row.insert(column_name, QueryValue::Float(value));
			} else {
				return Err(DatabaseError::TypeError(format!(
					"unsupported type for column '{}'",
					column.name()
				)));
			}
		}
		Ok(row)
	}
}

#[async_trait]
impl DatabaseBackend for MySqlBackend {
	async fn execute(&self, sql: &str, params: Vec<QueryValue>) -> Result<QueryResult> {
		let result = if params.is_empty() {
			sqlx::raw_sql(sql).execute(self.pool.as_ref()).await?
		} else {
			let mut query = sqlx::query(sql);
			for param in &params {
				query = Self::bind_value(query, param);
			}
			query.execute(self.pool.as_ref()).await?
		};
		Ok(QueryResult {
			rows_affected: result.rows_affected(),
		})
	}

	async fn fetch_one(&self, sql: &str, params: Vec<QueryValue>) -> Result<Row> {
		self.fetch_optional(sql, params)
			.await?
			.ok_or(DatabaseError::NoRows)
	}

	async fn fetch_all(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>> {
		let mysql_rows = if params.is_empty() {
			sqlx::raw_sql(sql).fetch_all(self.pool.as_ref()).await?
		} else {
			let mut query = sqlx::query(sql);
			for param in &params {
				query = Self::bind_value(query, param);
			}
			query.fetch_all(self.pool.as_ref()).await?
		};
		mysql_rows.into_iter().map(Self::convert_row).collect()
	}

	async fn fetch_optional(&self, sql: &str, params: Vec<QueryValue>) -> Result<Option<Row>> {
		let mysql_row = if params.is_empty() {
			sqlx::raw_sql(sql)
				.fetch_all(self.pool.as_ref())
				.await?
				.into_iter()
				.next()
		} else {
			let mut query = sqlx::query(sql);
			for param in &params {
				query = Self::bind_value(query, param);
			}
			query.fetch_optional(self.pool.as_ref()).await?
		};
		mysql_row.map(Self::convert_row).transpose()
	}
}

/// Build sqlx connect options from provider settings.
pub fn connect_options(
	settings: &ProviderSettings,
	credentials: &Credentials,
) -> Result<MySqlConnectOptions> {
	let mut options = MySqlConnectOptions::new()
		.username(&credentials.username)
		.password(credentials.password.expose_secret());

	if settings.is_socket() {
		options = options.socket(&settings.endpoint);
	} else {
		let (host, port) = split_endpoint(&settings.endpoint)?;
		options = options.host(host).port(port);
	}

	options = options.ssl_mode(match settings.tls {
		TlsMode::Disabled => MySqlSslMode::Disabled,
		TlsMode::Verified => MySqlSslMode::VerifyIdentity,
		TlsMode::SkipVerify => MySqlSslMode::Required,
	});

	if settings.authentication_plugin == AuthenticationPlugin::Cleartext {
		options = options.enable_cleartext_plugin(true);
	}

	Ok(options)
}

/// Split `host[:port]`, accepting bracketed IPv6 literals.
pub fn split_endpoint(endpoint: &str) -> Result<(&str, u16)> {
	let invalid = || DatabaseError::ConnectionError(format!("invalid endpoint '{}'", endpoint));

	let (host, port) = if let Some(rest) = endpoint.strip_prefix('[') {
		let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
		match tail.strip_prefix(':') {
			Some(port) => (host, Some(port)),
			None if tail.is_empty() => (host, None),
			None => return Err(invalid()),
		}
	} else {
		match endpoint.rsplit_once(':') {
			Some((host, port)) => (host, Some(port)),
			None => (endpoint, None),
		}
	};

	if host.is_empty() {
		return Err(invalid());
	}
	let port = match port {
		Some(p) => p.parse().map_err(|_| invalid())?,
		None => DEFAULT_PORT,
	};
	Ok((host, port))
}
