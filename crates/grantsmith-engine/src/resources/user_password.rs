//! Generated user passwords
//!
//! A password is generated under a [`PasswordPolicy`], encrypted for the
//! caller by a [`SecretEncryptor`], and only then set on the account. The
//! plaintext is never returned. Reading the password back is impossible,
//! and forgetting it has no effect on the server.

use grantsmith_dcl::{Account, Mutation};
use rand::Rng;
use rand::seq::SliceRandom;
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use super::DEFAULT_HOST;
use crate::error::{ReconcileError, Result};
use crate::identity::user_password_id;
use crate::session::Session;

/// Shortest password a policy may ask for
pub const MIN_PASSWORD_LENGTH: usize = 32;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"~!@#$%^&*()_+`-={}|[]\\:\"<>?,./";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
	pub length: usize,
	pub num_digits: usize,
	pub num_symbols: usize,
	/// Whether a character may appear more than once
	pub allow_repeat: bool,
}

impl Default for PasswordPolicy {
	fn default() -> Self {
		Self {
			length: 64,
			num_digits: 5,
			num_symbols: 5,
			allow_repeat: true,
		}
	}
}

impl PasswordPolicy {
	pub fn validate(&self) -> Result<()> {
		if self.length < MIN_PASSWORD_LENGTH {
			return Err(ReconcileError::invalid(format!(
				"password length must be at least {}",
				MIN_PASSWORD_LENGTH
			)));
		}
		if self.num_digits + self.num_symbols > self.length {
			return Err(ReconcileError::invalid(
				"digits and symbols exceed the password length",
			));
		}
		if !self.allow_repeat
			&& (self.letters() > LETTERS.len()
				|| self.num_digits > DIGITS.len()
				|| self.num_symbols > SYMBOLS.len())
		{
			return Err(ReconcileError::invalid(
				"policy asks for more unique characters than are available",
			));
		}
		Ok(())
	}

	fn letters(&self) -> usize {
		self.length.saturating_sub(self.num_digits + self.num_symbols)
	}
}

/// Source of new passwords
pub trait PasswordGenerator: Send + Sync {
	fn generate(&self, policy: &PasswordPolicy) -> Result<SecretString>;
}

/// Generates passwords from the thread-local random number generator
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPasswordGenerator;

impl PasswordGenerator for RandomPasswordGenerator {
	fn generate(&self, policy: &PasswordPolicy) -> Result<SecretString> {
		policy.validate()?;
		let mut rng = rand::thread_rng();
		let mut chars: Vec<u8> = Vec::with_capacity(policy.length);

		for (alphabet, count) in [
			(LETTERS, policy.letters()),
			(DIGITS, policy.num_digits),
			(SYMBOLS, policy.num_symbols),
		] {
			if policy.allow_repeat {
				chars.extend((0..count).map(|_| alphabet[rng.gen_range(0..alphabet.len())]));
			} else {
				chars.extend(alphabet.choose_multiple(&mut rng, count).copied());
			}
		}
		chars.shuffle(&mut rng);

		let password: String = chars.into_iter().map(char::from).collect();
		Ok(SecretString::from(password))
	}
}

/// A password encrypted for its recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedSecret {
	pub key_fingerprint: String,
	pub encrypted_password: String,
}

/// Encrypts a generated password for whoever will use it
pub trait SecretEncryptor: Send + Sync {
	fn encrypt(&self, plaintext: &SecretString) -> Result<EncryptedSecret>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPasswordSpec {
	pub user: String,
	pub host: String,
	pub policy: PasswordPolicy,
}

impl UserPasswordSpec {
	pub fn new(user: impl Into<String>) -> Self {
		Self {
			user: user.into(),
			host: DEFAULT_HOST.to_string(),
			policy: PasswordPolicy::default(),
		}
	}

	pub fn host(mut self, host: impl Into<String>) -> Self {
		self.host = host.into();
		self
	}

	pub fn policy(mut self, policy: PasswordPolicy) -> Self {
		self.policy = policy;
		self
	}
}

/// What is recorded after a password is set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPasswordState {
	pub id: String,
	pub key_fingerprint: String,
	pub encrypted_password: String,
}

/// Generate a password, encrypt it, and set it on the account.
///
/// Generation and encryption happen before any statement is sent.
pub async fn set_user_password(
	session: &Session,
	spec: &UserPasswordSpec,
	generator: &dyn PasswordGenerator,
	encryptor: &dyn SecretEncryptor,
) -> Result<UserPasswordState> {
	let password = generator.generate(&spec.policy)?;
	let encrypted = encryptor.encrypt(&password)?;
	let account = Account::new(spec.user.clone(), spec.host.clone());

	session
		.apply(&Mutation::AlterUserPassword {
			account: account.clone(),
			password: password.expose_secret().to_string(),
		})
		.await?;
	info!(%account, fingerprint = %encrypted.key_fingerprint, "generated password set");

	Ok(UserPasswordState {
		id: user_password_id(&spec.user, &spec.host),
		key_fingerprint: encrypted.key_fingerprint,
		encrypted_password: encrypted.encrypted_password,
	})
}
