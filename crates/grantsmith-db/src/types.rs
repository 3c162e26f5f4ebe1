//! Common type definitions for the connection layer

use crate::error::DatabaseError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Query value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryValue {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	String(String),
	Bytes(Vec<u8>),
}

impl QueryValue {
	pub fn is_null(&self) -> bool {
		matches!(self, QueryValue::Null)
	}
}

impl From<&str> for QueryValue {
	fn from(s: &str) -> Self {
		QueryValue::String(s.to_string())
	}
}

impl From<String> for QueryValue {
	fn from(s: String) -> Self {
		QueryValue::String(s)
	}
}

impl From<i64> for QueryValue {
	fn from(i: i64) -> Self {
		QueryValue::Int(i)
	}
}

impl From<i32> for QueryValue {
	fn from(i: i32) -> Self {
		QueryValue::Int(i as i64)
	}
}

impl From<f64> for QueryValue {
	fn from(f: f64) -> Self {
		QueryValue::Float(f)
	}
}

impl From<bool> for QueryValue {
	fn from(b: bool) -> Self {
		QueryValue::Bool(b)
	}
}

/// Query result
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
	pub rows_affected: u64,
}

/// Row from query result, in column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
	pub(crate) data: IndexMap<String, QueryValue>,
}

impl Row {
	pub fn new() -> Self {
		Self {
			data: IndexMap::new(),
		}
	}

	pub fn insert(&mut self, key: String, value: QueryValue) {
		self.data.insert(key, value);
	}

	/// Build a row from `(column, value)` pairs
	pub fn from_pairs<K, V, I>(pairs: I) -> Self
	where
		K: Into<String>,
		V: Into<QueryValue>,
		I: IntoIterator<Item = (K, V)>,
	{
		Self {
			data: pairs
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}

	pub fn get<T: TryFrom<QueryValue>>(&self, key: &str) -> std::result::Result<T, DatabaseError>
	where
		DatabaseError: From<<T as TryFrom<QueryValue>>::Error>,
	{
		self.data
			.get(key)
			.cloned()
			.ok_or_else(|| DatabaseError::ColumnNotFound(key.to_string()))
			.and_then(|v| v.try_into().map_err(Into::into))
	}

	/// Value at column position `index`
	pub fn get_index<T: TryFrom<QueryValue>>(
		&self,
		index: usize,
	) -> std::result::Result<T, DatabaseError>
	where
		DatabaseError: From<<T as TryFrom<QueryValue>>::Error>,
	{
		self.data
			.get_index(index)
			.map(|(_, v)| v.clone())
			.ok_or_else(|| DatabaseError::ColumnNotFound(format!("#{}", index)))
			.and_then(|v| v.try_into().map_err(Into::into))
	}

	pub fn first(&self) -> Option<&QueryValue> {
		self.data.first().map(|(_, v)| v)
	}

	pub fn columns(&self) -> impl Iterator<Item = &str> {
		self.data.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}
}

// Type conversions for QueryValue
impl TryFrom<QueryValue> for i64 {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::Int(i) => Ok(i),
			QueryValue::Bool(b) => Ok(b as i64),
			QueryValue::String(ref s) => s.trim().parse().map_err(|_| {
				DatabaseError::TypeError(format!("Cannot convert {:?} to i64", value))
			}),
			_ => Err(DatabaseError::TypeError(format!(
				"Cannot convert {:?} to i64",
				value
			))),
		}
	}
}

impl TryFrom<QueryValue> for String {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::String(s) => Ok(s),
			QueryValue::Bytes(b) => String::from_utf8(b)
				.map_err(|e| DatabaseError::TypeError(format!("Cannot convert bytes to String: {}", e))),
			_ => Err(DatabaseError::TypeError(format!(
				"Cannot convert {:?} to String",
				value
			))),
		}
	}
}

impl TryFrom<QueryValue> for bool {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::Bool(b) => Ok(b),
			QueryValue::Int(i) => Ok(i != 0),
			_ => Err(DatabaseError::TypeError(format!(
				"Cannot convert {:?} to bool",
				value
			))),
		}
	}
}

impl TryFrom<QueryValue> for Option<String> {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::Null => Ok(None),
			other => String::try_from(other).map(Some),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn test_row_preserves_column_order() {
		let row = Row::from_pairs([
			("Grants for app@%", QueryValue::from("GRANT USAGE ON *.* TO `app`@`%`")),
			("extra", QueryValue::Int(1)),
		]);

		let columns: Vec<&str> = row.columns().collect();
		assert_eq!(columns, vec!["Grants for app@%", "extra"]);
		assert_eq!(
			row.get_index::<String>(0).unwrap(),
			"GRANT USAGE ON *.* TO `app`@`%`"
		);
	}

	#[test]
	fn test_row_get_missing_column() {
		let row = Row::new();
		let err = row.get::<String>("USER").unwrap_err();
		assert!(matches!(err, DatabaseError::ColumnNotFound(_)));
		assert!(row.get_index::<String>(0).is_err());
	}

	#[rstest]
	#[case(QueryValue::Int(3), 3)]
	#[case(QueryValue::String(" 42 ".to_string()), 42)]
	#[case(QueryValue::Bool(true), 1)]
	fn test_i64_conversion(#[case] value: QueryValue, #[case] expected: i64) {
		assert_eq!(i64::try_from(value).unwrap(), expected);
	}

	#[test]
	fn test_string_from_utf8_bytes() {
		let value = QueryValue::Bytes(b"8.0.36".to_vec());
		assert_eq!(String::try_from(value).unwrap(), "8.0.36");
	}

	#[test]
	fn test_optional_string_from_null() {
		let value: Option<String> = QueryValue::Null.try_into().unwrap();
		assert_eq!(value, None);
	}
}
