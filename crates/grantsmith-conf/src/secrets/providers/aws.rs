//! AWS Secrets Manager provider
//!
//! Reads the `AWSCURRENT` stage of a secret. Requires the `aws-secrets`
//! feature; without it every call fails with [`SecretError::Provider`].

use crate::secrets::{SecretError, SecretProvider, SecretResult};
use async_trait::async_trait;
use secrecy::SecretString;

#[cfg(feature = "aws-secrets")]
use aws_config::BehaviorVersion;
#[cfg(feature = "aws-secrets")]
use aws_sdk_secretsmanager::Client;

#[cfg(feature = "aws-secrets")]
const VERSION_STAGE: &str = "AWSCURRENT";

/// AWS Secrets Manager provider
///
/// ```no_run
/// use grantsmith_conf::secrets::providers::AwsSecretsProvider;
/// use grantsmith_conf::SecretProvider;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = AwsSecretsProvider::new("eu-west-1").await?;
/// let password = provider.get_value("prod/mysql-admin", "password").await?;
/// # Ok(())
/// # }
/// ```
pub struct AwsSecretsProvider {
	#[cfg(feature = "aws-secrets")]
	client: Client,
	region: String,
}

impl AwsSecretsProvider {
	/// Create a provider for `region` using the default credential chain
	#[cfg(feature = "aws-secrets")]
	pub async fn new(region: impl Into<String>) -> SecretResult<Self> {
		let region = region.into();
		let config = aws_config::defaults(BehaviorVersion::latest())
			.region(aws_config::Region::new(region.clone()))
			.load()
			.await;
		Ok(Self {
			client: Client::new(&config),
			region,
		})
	}

	#[cfg(not(feature = "aws-secrets"))]
	pub async fn new(_region: impl Into<String>) -> SecretResult<Self> {
		Err(SecretError::Provider(
			"AWS Secrets Manager support not enabled. Enable the 'aws-secrets' feature."
				.to_string(),
		))
	}

	/// Create a provider with a custom endpoint (LocalStack)
	#[cfg(feature = "aws-secrets")]
	pub async fn with_endpoint(
		endpoint_url: impl Into<String>,
		region: impl Into<String>,
	) -> SecretResult<Self> {
		let region = region.into();
		let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
		let client = Client::from_conf(
			aws_sdk_secretsmanager::config::Builder::from(&config)
				.endpoint_url(endpoint_url)
				.region(aws_config::Region::new(region.clone()))
				.build(),
		);
		Ok(Self { client, region })
	}

	pub fn region(&self) -> &str {
		&self.region
	}
}

#[async_trait]
impl SecretProvider for AwsSecretsProvider {
	#[cfg(feature = "aws-secrets")]
	async fn get_secret(&self, secret_name: &str) -> SecretResult<SecretString> {
		let result = self
			.client
			.get_secret_value()
			.secret_id(secret_name)
			.version_stage(VERSION_STAGE)
			.send()
			.await;

		match result {
			Ok(output) => match output.secret_string() {
				Some(payload) => Ok(SecretString::from(payload.to_string())),
				None => Err(SecretError::NotFound(format!(
					"Secret '{}' has no string value",
					secret_name
				))),
			},
			Err(err) => {
				let not_found = err
					.as_service_error()
					.is_some_and(|e| e.is_resource_not_found_exception());
				if not_found {
					Err(SecretError::NotFound(format!(
						"Secret '{}' not found in AWS Secrets Manager",
						secret_name
					)))
				} else {
					Err(SecretError::Provider(format!(
						"AWS Secrets Manager error: {}",
						err
					)))
				}
			}
		}
	}

	#[cfg(not(feature = "aws-secrets"))]
	async fn get_secret(&self, _secret_name: &str) -> SecretResult<SecretString> {
		Err(SecretError::Provider(
			"AWS Secrets Manager support not enabled".to_string(),
		))
	}

	fn name(&self) -> &str {
		"aws"
	}
}

#[cfg(all(test, not(feature = "aws-secrets")))]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_new_without_feature_fails() {
		let result = AwsSecretsProvider::new("us-east-1").await;
		assert!(matches!(result, Err(SecretError::Provider(_))));
	}
}
