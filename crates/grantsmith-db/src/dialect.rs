//! Server dialects

pub mod mysql;

pub use mysql::MySqlBackend;
