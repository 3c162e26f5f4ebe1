//! Secret provider implementations

pub mod aws;
pub mod env;
pub mod file;
pub mod memory;

pub use aws::AwsSecretsProvider;
pub use env::EnvSecretProvider;
pub use file::JsonFileSecretProvider;
pub use memory::MemorySecretProvider;
