//! Client configuration: gateway environment, client credentials, and token cache settings.

// std
use std::{env, path::PathBuf};
// crates.io
use oauth2::{ClientId, ClientSecret};
// self
use crate::{_prelude::*, error::ConfigError, store::FileStore};

/// Scope requested for every client-credentials exchange.
pub const DEFAULT_SCOPE: &str = "convenio-api/.default";
/// Transport timeout applied to every request.
pub const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Environment variable selecting the gateway; `"1"` (the default) means staging.
pub const ENV_DEBUG: &str = "DEBUG";
/// Environment variable holding the client id.
pub const ENV_CLIENT_ID: &str = "TRADE_MASTER_CLIENT_ID";
/// Environment variable holding the client secret.
pub const ENV_CLIENT_SECRET: &str = "TRADE_MASTER_CLIENT_SECRET";
/// Environment variable overriding the credential cache location.
pub const ENV_TOKEN_CACHE: &str = "TRADE_MASTER_TOKEN_CACHE";

/// Gateway the client talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Environment {
	/// Live gateway.
	Production,
	/// Homologation gateway.
	#[default]
	Staging,
}
impl Environment {
	/// Base URL of the agreement API for this environment.
	pub const fn base_url(self) -> &'static str {
		match self {
			Environment::Production => "https://apigateway.trademaster.com.br/v2/agreement/",
			Environment::Staging => "https://apigateway.hml.trademaster.com.br/v2/agreement/",
		}
	}

	/// Interprets the `DEBUG` flag: `"1"` selects staging, anything else production.
	pub fn from_debug_flag(flag: &str) -> Self {
		if flag == "1" { Environment::Staging } else { Environment::Production }
	}
}

/// Immutable settings shared by the token issuer, token manager, and dispatcher.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	environment: Environment,
	base_url: Url,
	client_id: ClientId,
	client_secret: ClientSecret,
	scope: String,
	token_cache_path: PathBuf,
	request_timeout: StdDuration,
	refresh_margin: Duration,
}
impl ClientConfig {
	/// Starts a builder for the provided client credentials.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> ClientConfigBuilder {
		ClientConfigBuilder::new(client_id, client_secret)
	}

	/// Loads settings from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Loads settings through `lookup`, which resolves environment variable names.
	///
	/// Missing credentials resolve to empty strings and are rejected by validation.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let debug = lookup(ENV_DEBUG).unwrap_or_else(|| "1".into());
		let mut builder = Self::builder(
			lookup(ENV_CLIENT_ID).unwrap_or_default(),
			lookup(ENV_CLIENT_SECRET).unwrap_or_default(),
		)
		.environment(Environment::from_debug_flag(&debug));

		if let Some(path) = lookup(ENV_TOKEN_CACHE).filter(|path| !path.is_empty()) {
			builder = builder.token_cache_path(path);
		}

		builder.build()
	}

	/// Selected gateway.
	pub fn environment(&self) -> Environment {
		self.environment
	}

	/// Base URL every resource path is joined onto. Always ends with `/`.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Client identifier.
	pub fn client_id(&self) -> &ClientId {
		&self.client_id
	}

	/// Client secret.
	pub fn client_secret(&self) -> &ClientSecret {
		&self.client_secret
	}

	/// Scope requested when issuing tokens.
	pub fn scope(&self) -> &str {
		&self.scope
	}

	/// Location of the credential cache file.
	pub fn token_cache_path(&self) -> &PathBuf {
		&self.token_cache_path
	}

	/// Transport timeout.
	pub fn request_timeout(&self) -> StdDuration {
		self.request_timeout
	}

	/// Safety margin subtracted from a cached credential's lifetime.
	pub fn refresh_margin(&self) -> Duration {
		self.refresh_margin
	}
}

/// Builder for [`ClientConfig`].
#[derive(Clone, Debug)]
pub struct ClientConfigBuilder {
	environment: Environment,
	base_url: Option<String>,
	client_id: String,
	client_secret: String,
	scope: String,
	token_cache_path: Option<PathBuf>,
	request_timeout: StdDuration,
	refresh_margin: Duration,
}
impl ClientConfigBuilder {
	fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			environment: Environment::default(),
			base_url: None,
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			scope: DEFAULT_SCOPE.into(),
			token_cache_path: None,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			refresh_margin: Duration::ZERO,
		}
	}

	/// Selects the gateway environment.
	pub fn environment(mut self, environment: Environment) -> Self {
		self.environment = environment;

		self
	}

	/// Overrides the environment's base URL, e.g. to point at a local mock.
	pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = Some(base_url.into());

		self
	}

	/// Overrides the requested scope.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// Overrides the credential cache location.
	pub fn token_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.token_cache_path = Some(path.into());

		self
	}

	/// Overrides the transport timeout.
	pub fn request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Treats cached credentials as expired `margin` before their expiry.
	pub fn refresh_margin(mut self, margin: Duration) -> Self {
		self.refresh_margin = margin;

		self
	}

	/// Validates the settings and produces a [`ClientConfig`].
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::MissingCredential { name: "client_id" });
		}
		if self.client_secret.trim().is_empty() {
			return Err(ConfigError::MissingCredential { name: "client_secret" });
		}

		let mut raw_base = self.base_url.unwrap_or_else(|| self.environment.base_url().into());

		if !raw_base.ends_with('/') {
			raw_base.push('/');
		}

		let base_url =
			Url::parse(&raw_base).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		Ok(ClientConfig {
			environment: self.environment,
			base_url,
			client_id: ClientId::new(self.client_id),
			client_secret: ClientSecret::new(self.client_secret),
			scope: self.scope,
			token_cache_path: self.token_cache_path.unwrap_or_else(FileStore::default_path),
			request_timeout: self.request_timeout,
			refresh_margin: if self.refresh_margin.is_negative() {
				Duration::ZERO
			} else {
				self.refresh_margin
			},
		})
	}
}
