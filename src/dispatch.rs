//! Request assembly and dispatch against the Trade Master gateway.
//!
//! [`ApiRequest`] describes a call relative to the configured base URL. The [`Dispatcher`]
//! resolves the URL, applies the default JSON headers, attaches a bearer token from the
//! [`TokenManager`], and turns non-success statuses into [`ApiError`] values.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{TokenManager, TokenSecret},
	config::ClientConfig,
	error::{ApiError, ConfigError},
	http::{
		ApiHttpClient, HeaderMap, HeaderName, HeaderValue, HttpRequest, HttpResponse, Method,
		StatusCode, TransportErrorMapper, header,
	},
	mapper::{self, MapError, Record},
	obs::{self, CallKind, CallOutcome, CallSpan},
};
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestHttpClient, ReqwestTransportErrorMapper};

/// `Content-Type` sent unless the request overrides it.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";
/// `Accept` sent unless the request overrides it.
pub const DEFAULT_ACCEPT: &str = "application/json; charset=utf-8";
/// `Content-Type` used for form-encoded bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body attached to an [`ApiRequest`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RequestBody {
	/// No body.
	#[default]
	Empty,
	/// Serialized JSON document.
	Json(Vec<u8>),
	/// `application/x-www-form-urlencoded` payload.
	Form(String),
}
impl RequestBody {
	fn to_bytes(&self) -> Vec<u8> {
		match self {
			RequestBody::Empty => Vec::new(),
			RequestBody::Json(bytes) => bytes.clone(),
			RequestBody::Form(encoded) => encoded.as_bytes().to_vec(),
		}
	}
}

/// Description of one call relative to the client's base URL.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	method: Method,
	resource: String,
	extra_path: String,
	headers: Vec<(String, String)>,
	query: Vec<(String, String)>,
	body: RequestBody,
	authenticate: bool,
}
impl ApiRequest {
	/// Creates an authenticated request for `resource`.
	pub fn new(method: Method, resource: impl Into<String>) -> Self {
		Self {
			method,
			resource: resource.into(),
			extra_path: String::new(),
			headers: Vec::new(),
			query: Vec::new(),
			body: RequestBody::Empty,
			authenticate: true,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(resource: impl Into<String>) -> Self {
		Self::new(Method::GET, resource)
	}

	/// Shorthand for a `POST` request.
	pub fn post(resource: impl Into<String>) -> Self {
		Self::new(Method::POST, resource)
	}

	/// Appends a path resolved against the resource URL.
	pub fn extra_path(mut self, extra_path: impl Into<String>) -> Self {
		self.extra_path = extra_path.into();

		self
	}

	/// Adds a header; later values replace earlier ones and the defaults.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Adds a single query pair.
	pub fn query_pair(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((name.into(), value.into()));

		self
	}

	/// Adds every field of `params` as a query pair.
	///
	/// `params` must serialize to an object (or `null`, which adds nothing). `null` fields are
	/// skipped; non-string scalars use their JSON spelling.
	pub fn query<T>(mut self, params: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		let value = serde_json::to_value(params)
			.map_err(|source| ConfigError::InvalidPayload { source })?;

		match value {
			Value::Null => {},
			Value::Object(fields) =>
				for (name, value) in fields {
					let rendered = match value {
						Value::Null => continue,
						Value::String(s) => s,
						other => other.to_string(),
					};

					self.query.push((name, rendered));
				},
			other =>
				return Err(ConfigError::InvalidQuery { found: mapper::json_kind(&other) }.into()),
		}

		Ok(self)
	}

	/// Sets a JSON body.
	pub fn json<T>(mut self, body: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		let bytes =
			serde_json::to_vec(body).map_err(|source| ConfigError::InvalidPayload { source })?;

		self.body = RequestBody::Json(bytes);

		Ok(self)
	}

	/// Sets a form-encoded body and the matching `Content-Type` header.
	pub fn form<I, K, V>(mut self, pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let encoded = url::form_urlencoded::Serializer::new(String::new())
			.extend_pairs(pairs)
			.finish();

		self.body = RequestBody::Form(encoded);

		self.header(header::CONTENT_TYPE.as_str(), FORM_CONTENT_TYPE)
	}

	/// Skips the bearer token.
	pub fn without_auth(mut self) -> Self {
		self.authenticate = false;

		self
	}

	/// HTTP method.
	pub fn method(&self) -> &Method {
		&self.method
	}

	/// Whether a bearer token will be attached.
	pub fn authenticates(&self) -> bool {
		self.authenticate
	}

	/// Request body.
	pub fn body(&self) -> &RequestBody {
		&self.body
	}

	/// Resolves the request URL against `base`, without the query string.
	///
	/// The resource path and then the extra path are resolved as relative references, and the
	/// result is trimmed of leading and trailing `/`.
	pub fn mount_url(&self, base: &Url) -> Result<Url> {
		let mut url = join(base, &self.resource)?;

		if !self.extra_path.is_empty() {
			url = join(&url, &self.extra_path)?;
		}

		let trimmed = url.as_str().trim_matches('/');

		Url::parse(trimmed).map_err(|source| {
			ConfigError::InvalidEndpoint { endpoint: trimmed.to_owned(), source }.into()
		})
	}

	/// Builds the transport request. Returns the mounted URL (with query) alongside it.
	pub fn prepare(&self, base: &Url, bearer: Option<&TokenSecret>) -> Result<(Url, HttpRequest)> {
		let mut url = self.mount_url(base)?;

		if !self.query.is_empty() {
			url.query_pairs_mut().extend_pairs(&self.query);
		}

		let mut headers = HeaderMap::new();

		headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
		headers.insert(header::ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));

		for (name, value) in &self.headers {
			let invalid = || ConfigError::InvalidHeader { name: name.clone() };
			let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
			let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;

			headers.insert(header_name, header_value);
		}

		if let Some(token) = bearer {
			let mut value = HeaderValue::from_str(&token.bearer()).map_err(|_| {
				ConfigError::InvalidHeader { name: header::AUTHORIZATION.as_str().into() }
			})?;

			value.set_sensitive(true);
			headers.insert(header::AUTHORIZATION, value);
		}

		let mut request = oauth2::http::Request::builder()
			.method(self.method.clone())
			.uri(url.as_str())
			.body(self.body.to_bytes())
			.map_err(ConfigError::from)?;

		*request.headers_mut() = headers;

		Ok((url, request))
	}
}

fn join(base: &Url, reference: &str) -> Result<Url> {
	base.join(reference).map_err(|source| {
		ConfigError::InvalidEndpoint { endpoint: reference.to_owned(), source }.into()
	})
}

/// Successful response returned by the gateway.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	url: Url,
	status: StatusCode,
	headers: HeaderMap,
	body: Vec<u8>,
}
impl ApiResponse {
	/// Wraps a transport response for the request sent to `url`.
	pub fn new(url: Url, response: HttpResponse) -> Self {
		let (parts, body) = response.into_parts();

		Self { url, status: parts.status, headers: parts.headers, body }
	}

	/// URL the request was sent to.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// HTTP status.
	pub fn status(&self) -> StatusCode {
		self.status
	}

	/// Canonical reason phrase, empty for non-standard codes.
	pub fn reason(&self) -> &'static str {
		self.status.canonical_reason().unwrap_or_default()
	}

	/// Response headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Raw body bytes.
	pub fn body(&self) -> &[u8] {
		&self.body
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Fails with [`ApiError`] unless the status is 2xx.
	pub fn error_for_status(self) -> Result<Self, ApiError> {
		if self.status.is_success() {
			return Ok(self);
		}

		Err(ApiError {
			url: self.url.to_string(),
			status: self.status.as_u16(),
			reason: self.reason().to_owned(),
			body: self.text(),
		})
	}

	/// Decodes the body directly into `T`, bypassing any schema.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| MapError::Payload { source }.into())
	}

	/// Decodes the body as untyped JSON; an empty body yields `null`.
	pub fn value(&self) -> Result<Value> {
		if self.body.iter().all(u8::is_ascii_whitespace) {
			return Ok(Value::Null);
		}

		self.json()
	}

	/// Runs the body through `T`'s schema.
	pub fn map<T>(&self) -> Result<T>
	where
		T: Record,
	{
		mapper::map(&self.value()?)
	}
}

/// Sends [`ApiRequest`]s with the shared token manager and transport.
pub struct Dispatcher<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	base_url: Url,
	timeout: StdDuration,
	tokens: Arc<TokenManager>,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
}
impl<C, M> Dispatcher<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a dispatcher for `config` backed by the provided collaborators.
	pub fn new(
		config: &ClientConfig,
		tokens: Arc<TokenManager>,
		http_client: Arc<C>,
		transport_mapper: Arc<M>,
	) -> Self {
		Self {
			base_url: config.base_url().clone(),
			timeout: config.request_timeout(),
			tokens,
			http_client,
			transport_mapper,
		}
	}

	/// Base URL requests are resolved against.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Token manager supplying bearer tokens.
	pub fn tokens(&self) -> &Arc<TokenManager> {
		&self.tokens
	}

	/// Sends `request`, returning the response only when its status is 2xx.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Dispatch;

		let span = CallSpan::new(KIND, "send");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result: Result<ApiResponse> = span
			.instrument(async move {
				let bearer = if request.authenticates() {
					Some(self.tokens.valid_token().await?)
				} else {
					None
				};
				let (url, http_request) = request.prepare(&self.base_url, bearer.as_ref())?;
				let response = self
					.http_client
					.execute(http_request, self.timeout)
					.await
					.map_err(|e| self.transport_mapper.map_transport_error(KIND, e))?;

				Ok(ApiResponse::new(url, response).error_for_status()?)
			})
			.await;

		span.record_outcome_status(&result, |response| response.status().as_u16());
		obs::record_result(KIND, &result);

		result
	}

	/// Sends `request` and maps the response body through `T`'s schema.
	pub async fn send_mapped<T>(&self, request: ApiRequest) -> Result<T>
	where
		T: Record,
	{
		self.send(request).await?.map()
	}
}
impl<C, M> Debug for Dispatcher<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Dispatcher")
			.field("base_url", &self.base_url.as_str())
			.field("timeout", &self.timeout)
			.finish_non_exhaustive()
	}
}
#[cfg(feature = "reqwest")]
impl Dispatcher<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a reqwest-backed dispatcher.
	pub fn with_reqwest(
		config: &ClientConfig,
		tokens: Arc<TokenManager>,
		http_client: ReqwestHttpClient,
	) -> Self {
		Self::new(config, tokens, Arc::new(http_client), Arc::new(ReqwestTransportErrorMapper))
	}
}
