//! Top-level client wiring configuration, credential cache, issuer, and dispatcher together.

// self
use crate::{
	_prelude::*,
	auth::{ClientCredentialsIssuer, TokenManager},
	config::ClientConfig,
	dispatch::Dispatcher,
	http::{ApiHttpClient, TransportErrorMapper},
	resources::{AuthorizationApi, CreditLimitApi, OperationApi},
	store::CredentialStore,
};
#[cfg(feature = "reqwest")]
use crate::{
	http::{ReqwestHttpClient, ReqwestTransportErrorMapper},
	store::FileStore,
};

/// Client specialized for the crate's default reqwest transport stack.
#[cfg(feature = "reqwest")]
pub type ReqwestTradeMaster = TradeMaster<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Entry point to the Trade Master agreement API.
///
/// One instance owns one token manager, so every resource call made through it shares the
/// same cached credential and the same in-process refresh guard.
pub struct TradeMaster<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	config: ClientConfig,
	dispatcher: Dispatcher<C, M>,
}
impl<C, M> TradeMaster<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds a client that issues tokens through `http_client` and caches them in `store`.
	pub fn with_http_client(
		config: ClientConfig,
		store: Arc<dyn CredentialStore>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		let http_client = http_client.into();
		let mapper = mapper.into();
		let issuer = ClientCredentialsIssuer::new(&config, http_client.clone(), mapper.clone());
		let tokens = TokenManager::new(store, Arc::new(issuer))
			.with_refresh_margin(config.refresh_margin());

		Self::from_parts(config, Arc::new(tokens), http_client, mapper)
	}

	/// Builds a client around an existing token manager, e.g. one with a custom issuer.
	pub fn from_parts(
		config: ClientConfig,
		tokens: Arc<TokenManager>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		let dispatcher = Dispatcher::new(&config, tokens, http_client.into(), mapper.into());

		Self { config, dispatcher }
	}

	/// Authorization endpoints.
	pub fn authorization(&self) -> AuthorizationApi<'_, C, M> {
		AuthorizationApi::new(&self.dispatcher)
	}

	/// Credit limit endpoints.
	pub fn credit_limit(&self) -> CreditLimitApi<'_, C, M> {
		CreditLimitApi::new(&self.dispatcher)
	}

	/// Operation endpoints.
	pub fn operation(&self) -> OperationApi<'_, C, M> {
		OperationApi::new(&self.dispatcher)
	}

	/// Dispatcher for endpoints without a typed wrapper.
	pub fn dispatcher(&self) -> &Dispatcher<C, M> {
		&self.dispatcher
	}

	/// Shared token manager.
	pub fn tokens(&self) -> &Arc<TokenManager> {
		self.dispatcher.tokens()
	}

	/// Active configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}
}
#[cfg(feature = "reqwest")]
impl TradeMaster<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a reqwest-backed client caching tokens at the configured path.
	pub fn new(config: ClientConfig) -> Result<Self> {
		let store = FileStore::open(config.token_cache_path().clone())?;
		let http_client = ReqwestHttpClient::build()?;

		Ok(Self::with_http_client(config, Arc::new(store), http_client, ReqwestTransportErrorMapper))
	}

	/// Creates a reqwest-backed client from the process environment.
	pub fn from_env() -> Result<Self> {
		Self::new(ClientConfig::from_env()?)
	}
}
impl<C, M> Debug for TradeMaster<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TradeMaster")
			.field("environment", &self.config.environment())
			.field("base_url", &self.config.base_url().as_str())
			.finish_non_exhaustive()
	}
}
