//! Token issuance through the gateway's client-credentials endpoint.

// crates.io
use oauth2::{ClientId, ClientSecret};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::ClientConfig,
	dispatch::ApiRequest,
	error::IssuerError,
	http::{ApiHttpClient, TransportErrorMapper},
	obs::{self, CallKind, CallOutcome, CallSpan},
};
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestHttpClient, ReqwestTransportErrorMapper};

/// Token endpoint, resolved against the host root of the base URL.
pub const TOKEN_ENDPOINT: &str = "/auth/realms/api-management/protocol/openid-connect/token/";

/// Boxed future returned by [`TokenIssuer::issue`].
pub type IssuerFuture<'a> = Pin<Box<dyn Future<Output = Result<IssuedToken>> + 'a + Send>>;

/// Source of fresh bearer tokens.
pub trait TokenIssuer
where
	Self: Send + Sync,
{
	/// Requests a new token. Failures must not have side effects on any cache.
	fn issue(&self) -> IssuerFuture<'_>;
}

/// Token handed out by a [`TokenIssuer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedToken {
	/// Bearer token.
	pub access_token: TokenSecret,
	/// Lifetime reported by the issuer; always positive.
	pub expires_in: Duration,
}

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	expires_in: i64,
}

/// Posts the client-credentials grant to [`TOKEN_ENDPOINT`].
pub struct ClientCredentialsIssuer<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	base_url: Url,
	client_id: ClientId,
	client_secret: ClientSecret,
	scope: String,
	timeout: StdDuration,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
}
impl<C, M> ClientCredentialsIssuer<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an issuer for `config` using the provided transport.
	pub fn new(config: &ClientConfig, http_client: Arc<C>, transport_mapper: Arc<M>) -> Self {
		Self {
			base_url: config.base_url().clone(),
			client_id: config.client_id().clone(),
			client_secret: config.client_secret().clone(),
			scope: config.scope().to_owned(),
			timeout: config.request_timeout(),
			http_client,
			transport_mapper,
		}
	}

	fn token_request(&self) -> ApiRequest {
		ApiRequest::post(TOKEN_ENDPOINT)
			.form([
				("client_id", self.client_id.as_str()),
				("client_secret", self.client_secret.secret().as_str()),
				("scope", self.scope.as_str()),
				("grant_type", "client_credentials"),
			])
			.without_auth()
	}

	async fn issue_now(&self) -> Result<IssuedToken> {
		let (_, request) = self.token_request().prepare(&self.base_url, None)?;
		let response =
			self.http_client.execute(request, self.timeout).await.map_err(|e| {
				IssuerError::from(self.transport_mapper.map_transport_error(CallKind::TokenIssue, e))
			})?;
		let status = response.status();

		if !status.is_success() {
			return Err(IssuerError::Rejected {
				status: status.as_u16(),
				body: String::from_utf8_lossy(response.body()).into_owned(),
			}
			.into());
		}

		let mut deserializer = serde_json::Deserializer::from_slice(response.body());
		let parsed: TokenResponse = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| IssuerError::ResponseParse { source, status: status.as_u16() })?;

		if parsed.expires_in <= 0 {
			return Err(IssuerError::NonPositiveExpiresIn.into());
		}

		Ok(IssuedToken {
			access_token: parsed.access_token.into(),
			expires_in: Duration::seconds(parsed.expires_in),
		})
	}
}
impl<C, M> TokenIssuer for ClientCredentialsIssuer<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn issue(&self) -> IssuerFuture<'_> {
		Box::pin(async move {
			const KIND: CallKind = CallKind::TokenIssue;

			let span = CallSpan::new(KIND, "client_credentials");

			obs::record_call_outcome(KIND, CallOutcome::Attempt);

			let result = span.instrument(self.issue_now()).await;

			if let Err(Error::Issuer(IssuerError::Rejected { status, .. })) = &result {
				span.record_status(*status);
			}

			obs::record_result(KIND, &result);

			result
		})
	}
}
impl<C, M> Debug for ClientCredentialsIssuer<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentialsIssuer")
			.field("base_url", &self.base_url.as_str())
			.field("client_id", &self.client_id)
			.field("scope", &self.scope)
			.finish_non_exhaustive()
	}
}
#[cfg(feature = "reqwest")]
impl ClientCredentialsIssuer<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a reqwest-backed issuer.
	pub fn with_reqwest(config: &ClientConfig, http_client: ReqwestHttpClient) -> Self {
		Self::new(config, Arc::new(http_client), Arc::new(ReqwestTransportErrorMapper))
	}
}
