//! Client-level error types shared across the token manager, dispatcher, stores, and mapper.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential store failure, including a corrupt cache file.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration or request-construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token issuance failed; nothing was cached.
	#[error(transparent)]
	Issuer(#[from] IssuerError),
	/// Transport failure (DNS, TCP, TLS, timeout) on a dispatched request.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response payload could not be mapped into the requested record.
	#[error(transparent)]
	Mapping(#[from] crate::mapper::MapError),
	/// The API answered with a non-success status.
	#[error(transparent)]
	Api(#[from] ApiError),
}

/// Non-success response returned by the Trade Master API.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{url} {status} - {reason} - {body}")]
pub struct ApiError {
	/// Fully mounted request URL.
	pub url: String,
	/// HTTP status code.
	pub status: u16,
	/// Canonical reason phrase for the status code (empty when unknown).
	pub reason: String,
	/// Raw response body, lossily decoded as UTF-8.
	pub body: String,
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Resource path could not be resolved against the base URL.
	#[error("Endpoint `{endpoint}` cannot be resolved against the base URL.")]
	InvalidEndpoint {
		/// Resource or extra path that failed to resolve.
		endpoint: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A required client credential is empty.
	#[error("Client credential `{name}` must not be empty.")]
	MissingCredential {
		/// Credential label (`client_id` or `client_secret`).
		name: &'static str,
	},
	/// Header name or value is not valid HTTP.
	#[error("Header `{name}` is not a valid HTTP header.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
	/// Request body or query could not be serialized.
	#[error("Request payload could not be serialized.")]
	InvalidPayload {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// Query parameters did not serialize to a JSON object.
	#[error("Query parameters must serialize to an object, found {found}.")]
	InvalidQuery {
		/// JSON kind produced by the query value.
		found: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Token issuance failures. None of them leave a credential behind.
#[derive(Debug, ThisError)]
pub enum IssuerError {
	/// Token endpoint answered with a non-success status.
	#[error("Token endpoint rejected the client credentials with HTTP {status}: {body}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// Token endpoint responded with JSON that does not match the token response shape.
	#[error("Token endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// Token endpoint could not be reached.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Transport-level failures (network, timeout, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the Trade Master API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded the configured timeout.
	#[error("Request to the Trade Master API timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the Trade Master API.")]
	Io(#[from] std::io::Error),
	/// Transport failure without a structured source.
	#[error("HTTP client error occurred while calling the Trade Master API: {message}.")]
	Other {
		/// Transport-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}
