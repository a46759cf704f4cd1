//! Module for the installed-application OAuth flow with a cached, refreshable token

use std::{
	fs::File,
	io::{
		BufReader,
		BufWriter,
	},
	path::{
		Path,
		PathBuf,
	},
};

use chrono::Utc;
use reqwest::blocking::Client;
use serde::{
	Deserialize,
	Serialize,
};
use url::Url;

use super::{
	AuthorizationProvider,
	CodePrompt,
	Credential,
};
use crate::error::IOErrorToError;

/// Scopes required to upload and to edit existing videos
pub const DEFAULT_SCOPES: &[&str] = &[
	"https://www.googleapis.com/auth/youtube.upload",
	"https://www.googleapis.com/auth/youtube",
];

/// Redirect target for the out-of-band flow, where the provider shows the code to copy instead of redirecting
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Seconds before the actual expiry at which a token is already considered expired
const EXPIRY_MARGIN: i64 = 60;

fn default_auth_uri() -> String {
	return "https://accounts.google.com/o/oauth2/auth".to_owned();
}

fn default_token_uri() -> String {
	return "https://oauth2.googleapis.com/token".to_owned();
}

/// The client registration as downloaded from the provider console
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientSecret {
	pub client_id:     String,
	pub client_secret: String,
	#[serde(default = "default_auth_uri")]
	pub auth_uri:      String,
	#[serde(default = "default_token_uri")]
	pub token_uri:     String,
	#[serde(default)]
	pub redirect_uris: Vec<String>,
}

/// Layout of the client secrets file, the registration is nested under the application type
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
	installed: Option<ClientSecret>,
	web:       Option<ClientSecret>,
}

impl ClientSecret {
	/// Parse a client secrets JSON document
	pub fn from_json(input: &str) -> Result<Self, crate::Error> {
		let file: ClientSecretsFile = serde_json::from_str(input)?;

		return file
			.installed
			.or(file.web)
			.ok_or_else(|| return crate::Error::authorization("Client secrets contain neither \"installed\" nor \"web\""));
	}

	/// Read and parse the client secrets file at `path`
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, crate::Error> {
		let path = path.as_ref();

		if !path.is_file() {
			return Err(crate::Error::not_a_file("Client secrets file does not exist", path));
		}

		return Self::from_json(&std::fs::read_to_string(path).attach_path_err(path)?);
	}

	/// Get the redirect uri to use for the code flow
	#[must_use]
	pub fn redirect_uri(&self) -> &str {
		return self
			.redirect_uris
			.first()
			.map_or(OOB_REDIRECT_URI, |v| return v.as_str());
	}
}

/// The token as cached on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
	pub access_token:  String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<String>,
	/// Unix timestamp in seconds, [None] if the provider did not say
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_at:    Option<i64>,
}

impl StoredToken {
	/// Get whether the token can still be used at `now` (unix seconds)
	#[must_use]
	pub fn is_valid_at(&self, now: i64) -> bool {
		return self.expires_at.is_none_or(|v| return v - EXPIRY_MARGIN > now);
	}
}

/// Response of the token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
	access_token:  String,
	#[serde(default)]
	expires_in:    Option<i64>,
	#[serde(default)]
	refresh_token: Option<String>,
}

/// [`AuthorizationProvider`] for the installed-application flow
///
/// Order of attempts: cached token, refresh of the cached token, interactive code exchange.
/// Every newly obtained token is written to `token_path`.
pub struct OAuthProvider {
	secret:     ClientSecret,
	token_path: PathBuf,
	client:     Client,
	prompt:     Box<dyn CodePrompt>,
	scopes:     Vec<String>,
	/// The current token, loaded lazily from `token_path`
	token:      Option<StoredToken>,
}

impl OAuthProvider {
	/// Create a new instance of [`OAuthProvider`] with [`DEFAULT_SCOPES`]
	pub fn new<P: AsRef<Path>>(secret: ClientSecret, token_path: P, client: Client, prompt: Box<dyn CodePrompt>) -> Self {
		return Self {
			secret,
			token_path: token_path.as_ref().to_owned(),
			client,
			prompt,
			scopes: DEFAULT_SCOPES.iter().map(|v| return (*v).to_owned()).collect(),
			token: None,
		};
	}

	/// Get the URL the operator has to visit to grant access
	pub fn authorization_url(&self) -> Result<String, crate::Error> {
		let scope = self.scopes.join(" ");

		let url = Url::parse_with_params(
			&self.secret.auth_uri,
			&[
				("client_id", self.secret.client_id.as_str()),
				("redirect_uri", self.secret.redirect_uri()),
				("response_type", "code"),
				("scope", scope.as_str()),
				("access_type", "offline"),
				("prompt", "consent"),
			],
		)?;

		return Ok(url.to_string());
	}

	/// Run the interactive code exchange regardless of any cached token, and cache the result
	pub fn bootstrap(&mut self) -> Result<Credential, crate::Error> {
		let token = self.exchange_interactive()?;

		return self.store(token);
	}

	/// Read the cached token, a unreadable cache is treated like a missing one
	fn load_cached(&self) -> Option<StoredToken> {
		if !self.token_path.is_file() {
			return None;
		}

		let res = File::open(&self.token_path)
			.attach_path_err(&self.token_path)
			.and_then(|file| return Ok(serde_json::from_reader::<_, StoredToken>(BufReader::new(file))?));

		return match res {
			Ok(v) => Some(v),
			Err(err) => {
				warn!("Ignoring unreadable token cache: {}", err);
				None
			},
		};
	}

	/// Write `token` to the cache file and make it the current token
	fn store(&mut self, token: StoredToken) -> Result<Credential, crate::Error> {
		if let Some(parent) = self.token_path.parent() {
			std::fs::create_dir_all(parent).attach_path_err(parent)?;
		}

		let writer = BufWriter::new(File::create(&self.token_path).attach_path_err(&self.token_path)?);
		serde_json::to_writer_pretty(writer, &token)?;
		debug!("Cached token in \"{}\"", self.token_path.display());

		let credential = Credential::new(&token.access_token);
		self.token = Some(token);

		return Ok(credential);
	}

	/// POST `params` to the token endpoint
	fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse, crate::Error> {
		let response = self.client.post(&self.secret.token_uri).form(params).send()?;
		let status = response.status();

		if !status.is_success() {
			let body = response.text().unwrap_or_default();
			return Err(crate::Error::authorization(format!(
				"Token endpoint returned {}: {}",
				status.as_u16(),
				body.trim()
			)));
		}

		return Ok(response.json()?);
	}

	/// Get a new access token for `refresh_token`, the refresh token itself is kept if the provider does not rotate it
	fn refresh(&self, refresh_token: &str) -> Result<StoredToken, crate::Error> {
		debug!("Refreshing access token");

		let response = self.request_token(&[
			("grant_type", "refresh_token"),
			("refresh_token", refresh_token),
			("client_id", self.secret.client_id.as_str()),
			("client_secret", self.secret.client_secret.as_str()),
		])?;

		return Ok(into_stored(response, Some(refresh_token)));
	}

	/// Ask the operator for a code and exchange it for a token
	fn exchange_interactive(&mut self) -> Result<StoredToken, crate::Error> {
		let auth_url = self.authorization_url()?;
		let code = self.prompt.prompt_code(&auth_url)?;
		let code = code.trim();

		if code.is_empty() {
			return Err(crate::Error::authorization("No authorization code was entered"));
		}

		let response = self.request_token(&[
			("grant_type", "authorization_code"),
			("code", code),
			("client_id", self.secret.client_id.as_str()),
			("client_secret", self.secret.client_secret.as_str()),
			("redirect_uri", self.secret.redirect_uri()),
		])?;

		info!("Authorization completed");

		return Ok(into_stored(response, None));
	}
}

impl AuthorizationProvider for OAuthProvider {
	fn credential(&mut self) -> Result<Credential, crate::Error> {
		if self.token.is_none() {
			self.token = self.load_cached();
		}

		let refresh_token = match &self.token {
			Some(token) if token.is_valid_at(Utc::now().timestamp()) => {
				return Ok(Credential::new(&token.access_token));
			},
			Some(token) => token.refresh_token.clone(),
			None => None,
		};

		let refreshed = refresh_token.and_then(|refresh_token| {
			return match self.refresh(&refresh_token) {
				Ok(v) => Some(v),
				Err(err) => {
					warn!("Refreshing the token failed, falling back to a new authorization: {}", err);
					None
				},
			};
		});

		let token = match refreshed {
			Some(v) => v,
			None => self.exchange_interactive()?,
		};

		return self.store(token);
	}
}

/// Convert a token endpoint response to a [`StoredToken`]
fn into_stored(response: TokenResponse, previous_refresh: Option<&str>) -> StoredToken {
	return StoredToken {
		access_token:  response.access_token,
		refresh_token: response
			.refresh_token
			.or_else(|| return previous_refresh.map(|v| return v.to_owned())),
		expires_at:    response.expires_in.map(|v| return Utc::now().timestamp() + v),
	};
}

#[cfg(test)]
mod test {
	use super::*;
	use tempfile::Builder as TempBuilder;
	use wiremock::{
		Mock,
		MockServer,
		ResponseTemplate,
		matchers::{
			body_string_contains,
			method,
			path,
		},
	};

	/// Test prompt always answering with the same code
	struct FixedCode(&'static str);

	impl CodePrompt for FixedCode {
		fn prompt_code(&mut self, auth_url: &str) -> Result<String, crate::Error> {
			assert!(auth_url.contains("client_id=client-1"));
			return Ok(self.0.to_owned());
		}
	}

	/// Test prompt that fails the test when asked
	struct NoPrompt;

	impl CodePrompt for NoPrompt {
		fn prompt_code(&mut self, _auth_url: &str) -> Result<String, crate::Error> {
			panic!("The interactive flow should not have been used");
		}
	}

	fn secret(token_uri: String) -> ClientSecret {
		return ClientSecret {
			client_id: "client-1".to_owned(),
			client_secret: "secret-1".to_owned(),
			auth_uri: default_auth_uri(),
			token_uri,
			redirect_uris: Vec::new(),
		};
	}

	mod client_secret {
		use super::*;

		#[test]
		fn test_installed() {
			let secret = ClientSecret::from_json(
				r#"{"installed":{"client_id":"id","client_secret":"s","redirect_uris":["http://localhost"]}}"#,
			)
			.expect("Expected secrets to parse");

			assert_eq!("id", secret.client_id);
			assert_eq!(default_token_uri(), secret.token_uri);
			assert_eq!("http://localhost", secret.redirect_uri());
		}

		#[test]
		fn test_web_and_oob_default() {
			let secret = ClientSecret::from_json(r#"{"web":{"client_id":"id","client_secret":"s"}}"#)
				.expect("Expected secrets to parse");

			assert_eq!(OOB_REDIRECT_URI, secret.redirect_uri());
		}

		#[test]
		fn test_neither() {
			assert!(ClientSecret::from_json(r#"{"other":{}}"#).is_err());
		}
	}

	mod stored_token {
		use super::*;

		#[test]
		fn test_validity() {
			let token = StoredToken {
				access_token:  "a".to_owned(),
				refresh_token: None,
				expires_at:    Some(1000),
			};

			assert!(token.is_valid_at(900));
			assert!(!token.is_valid_at(950));
			assert!(
				StoredToken {
					expires_at: None,
					..token
				}
				.is_valid_at(i64::MAX)
			);
		}
	}

	mod provider {
		use super::*;

		#[test]
		fn test_authorization_url() {
			let provider = OAuthProvider::new(
				secret("http://localhost/token".to_owned()),
				"/nonexistent/token.json",
				Client::new(),
				Box::new(NoPrompt),
			);

			let url = Url::parse(&provider.authorization_url().expect("Expected url to build")).expect("Expected valid url");
			let pairs: Vec<(String, String)> = url.query_pairs().map(|(k, v)| return (k.into_owned(), v.into_owned())).collect();

			assert!(pairs.contains(&("redirect_uri".to_owned(), OOB_REDIRECT_URI.to_owned())));
			assert!(pairs.contains(&("access_type".to_owned(), "offline".to_owned())));
			assert!(pairs.contains(&("scope".to_owned(), DEFAULT_SCOPES.join(" "))));
		}

		#[tokio::test]
		async fn test_code_exchange_and_cache() {
			let server = MockServer::start().await;
			Mock::given(method("POST"))
				.and(path("/token"))
				.and(body_string_contains("grant_type=authorization_code"))
				.and(body_string_contains("code=the-code"))
				.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
					"access_token": "access-1",
					"refresh_token": "refresh-1",
					"expires_in": 3600,
					"token_type": "Bearer"
				})))
				.expect(1)
				.mount(&server)
				.await;

			let testdir = TempBuilder::new()
				.prefix("vidsheet-test-oauth-")
				.tempdir()
				.expect("Expected a temp dir to be created");
			let token_path = testdir.path().join("config/token.json");
			let token_uri = format!("{}/token", server.uri());

			let moved_path = token_path.clone();
			let (first, second) = tokio::task::spawn_blocking(move || {
				let mut provider = OAuthProvider::new(secret(token_uri), &moved_path, Client::new(), Box::new(FixedCode("the-code")));

				// the second call has to use the in-memory token, the mock only allows one request
				return (provider.credential(), provider.credential());
			})
			.await
			.expect("Expected the blocking task to finish");

			assert_eq!(Ok(Credential::new("access-1")), first);
			assert_eq!(Ok(Credential::new("access-1")), second);

			let cached: StoredToken =
				serde_json::from_str(&std::fs::read_to_string(&token_path).expect("Expected token cache to exist")).unwrap();
			assert_eq!(Some("refresh-1".to_owned()), cached.refresh_token);
		}

		#[tokio::test]
		async fn test_refresh_expired_cache() {
			let server = MockServer::start().await;
			Mock::given(method("POST"))
				.and(path("/token"))
				.and(body_string_contains("grant_type=refresh_token"))
				.and(body_string_contains("refresh_token=refresh-old"))
				.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
					"access_token": "access-new",
					"expires_in": 3600
				})))
				.expect(1)
				.mount(&server)
				.await;

			let testdir = TempBuilder::new()
				.prefix("vidsheet-test-oauth-")
				.tempdir()
				.expect("Expected a temp dir to be created");
			let token_path = testdir.path().join("token.json");
			std::fs::write(
				&token_path,
				r#"{"access_token":"access-old","refresh_token":"refresh-old","expires_at":0}"#,
			)
			.expect("Expected write to work");
			let token_uri = format!("{}/token", server.uri());

			let moved_path = token_path.clone();
			let res = tokio::task::spawn_blocking(move || {
				let mut provider = OAuthProvider::new(secret(token_uri), &moved_path, Client::new(), Box::new(NoPrompt));
				return provider.credential();
			})
			.await
			.expect("Expected the blocking task to finish");

			assert_eq!(Ok(Credential::new("access-new")), res);

			let cached: StoredToken = serde_json::from_str(&std::fs::read_to_string(&token_path).unwrap()).unwrap();
			// the refresh token is not rotated by the response, so the old one has to be kept
			assert_eq!(Some("refresh-old".to_owned()), cached.refresh_token);
		}

		#[test]
		fn test_valid_cache_without_requests() {
			let testdir = TempBuilder::new()
				.prefix("vidsheet-test-oauth-")
				.tempdir()
				.expect("Expected a temp dir to be created");
			let token_path = testdir.path().join("token.json");
			std::fs::write(&token_path, r#"{"access_token":"cached"}"#).expect("Expected write to work");

			// a unreachable token endpoint, any request would fail
			let mut provider = OAuthProvider::new(
				secret("http://127.0.0.1:9/token".to_owned()),
				&token_path,
				Client::new(),
				Box::new(NoPrompt),
			);

			assert_eq!(Ok(Credential::new("cached")), provider.credential());
		}
	}
}
