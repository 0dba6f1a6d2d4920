//! Transport primitives for Trade Master requests.
//!
//! The module exposes [`ApiHttpClient`], the crate's only dependency on an HTTP stack, and
//! [`TransportErrorMapper`], which classifies transport failures into [`TransportError`].
//! Requests and responses use the `http` types re-exported by `oauth2`, so custom transports
//! never need to depend on reqwest.

pub use oauth2::{
	self, HttpClientError, HttpRequest, HttpResponse,
	http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header},
};

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError, obs::CallKind};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Boxed future returned by [`ApiHttpClient::execute`].
pub type HttpFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, HttpClientError<E>>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing Trade Master requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can back the token issuer
/// and the request dispatcher at the same time. The returned future must own whatever state it
/// needs so callers can box and move it across executors.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends `request`, giving up after `timeout`.
	///
	/// Non-success HTTP statuses are not transport failures; implementations must return them
	/// as regular responses so the caller can classify them.
	fn execute(
		&self,
		request: HttpRequest,
		timeout: StdDuration,
	) -> HttpFuture<'_, Self::TransportError>;
}

/// Maps HTTP transport failures into [`TransportError`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport during `call`.
	fn map_transport_error(&self, call: CallKind, error: HttpClientError<E>) -> TransportError;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that never follows redirects; the gateway answers directly.
	pub fn build() -> Result<Self, ConfigError> {
		let client =
			ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest, timeout: StdDuration) -> HttpFuture<'_, ReqwestError> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut request: reqwest::Request = request.try_into().map_err(Box::new)?;

			*request.timeout_mut() = Some(timeout);

			let response = client.execute(request).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		call: CallKind,
		err: HttpClientError<ReqwestError>,
	) -> TransportError {
		match err {
			HttpClientError::Reqwest(inner) => TransportError::from(*inner),
			HttpClientError::Http(inner) => TransportError::network(inner),
			HttpClientError::Io(inner) => TransportError::Io(inner),
			HttpClientError::Other(message) => TransportError::Other { message },
			_ => TransportError::Other { message: format!("unclassified {call} failure") },
		}
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;

	#[test]
	fn reqwest_mapper_keeps_io_and_other_failures() {
		let mapper = ReqwestTransportErrorMapper;
		let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
		let mapped = mapper.map_transport_error(CallKind::Dispatch, HttpClientError::Io(io));

		assert!(matches!(mapped, TransportError::Io(_)));

		let mapped = mapper
			.map_transport_error(CallKind::TokenIssue, HttpClientError::Other("closed".into()));

		assert!(matches!(mapped, TransportError::Other { message } if message == "closed"));
	}

	#[test]
	fn build_produces_a_client() {
		assert!(ReqwestHttpClient::build().is_ok());
	}
}
