//! Module for obtaining the credential the hosting platform requires

pub mod oauth;

/// A credential that can be attached to requests against the hosting platform
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
	/// Bearer token
	pub access_token: String,
}

impl Credential {
	/// Create a new instance of [`Credential`]
	pub fn new<T: Into<String>>(access_token: T) -> Self {
		return Self {
			access_token: access_token.into(),
		};
	}
}

/// Provides a valid credential, bootstrapping or refreshing it when required
///
/// How the credential is obtained (cached file, refresh, interactive code exchange) is up to the implementation.
pub trait AuthorizationProvider {
	/// Get a currently valid credential
	fn credential(&mut self) -> Result<Credential, crate::Error>;
}

/// A [`AuthorizationProvider`] that always returns the same pre-obtained token
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
	/// Create a new instance of [`StaticToken`]
	pub fn new<T: Into<String>>(token: T) -> Self {
		return Self(token.into());
	}
}

impl AuthorizationProvider for StaticToken {
	fn credential(&mut self) -> Result<Credential, crate::Error> {
		if self.0.trim().is_empty() {
			return Err(crate::Error::authorization("The static access token is empty"));
		}

		return Ok(Credential::new(self.0.trim()));
	}
}

/// Asks the operator for the authorization code after they visited the authorization URL
pub trait CodePrompt {
	/// Show `auth_url` to the operator and return the code they entered
	fn prompt_code(&mut self, auth_url: &str) -> Result<String, crate::Error>;
}
