// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::Arc,
	time::Duration as StdDuration,
};
// crates.io
use parking_lot::Mutex;
use time::{Duration, OffsetDateTime};
// self
use trade_master_api::{
	auth::{Credential, TOKEN_ENDPOINT},
	client::TradeMaster,
	config::ClientConfig,
	error::{Error, IssuerError, TransportError},
	http::{
		ApiHttpClient, HeaderName, HttpClientError, HttpFuture, HttpRequest, HttpResponse, StatusCode,
		TransportErrorMapper, header,
	},
	obs::CallKind,
	resources::operation::PostOperationProcessRequest,
	store::{CredentialStore, MemoryStore},
};

#[derive(Clone, Debug)]
enum FakeTransportError {
	Refused,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Refused => write!(f, "connection refused"),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Debug)]
struct Recorded {
	uri: String,
	authorization: Option<String>,
	content_type: Option<String>,
	body: String,
	timeout: StdDuration,
}

#[derive(Default)]
struct FakeHttpClient {
	refuse: bool,
	recorded: Mutex<Vec<Recorded>>,
}
impl FakeHttpClient {
	fn refusing() -> Self {
		Self { refuse: true, ..Default::default() }
	}

	fn recorded(&self) -> Vec<Recorded> {
		self.recorded.lock().clone()
	}
}
impl ApiHttpClient for FakeHttpClient {
	type TransportError = FakeTransportError;

	fn execute(
		&self,
		request: HttpRequest,
		timeout: StdDuration,
	) -> HttpFuture<'_, FakeTransportError> {
		Box::pin(async move {
			if self.refuse {
				// oauth2 names the variant after reqwest, but it carries any transport error.
				return Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Refused)));
			}

			let header_text = |name: HeaderName| {
				request.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_owned)
			};
			let recorded = Recorded {
				uri: request.uri().to_string(),
				authorization: header_text(header::AUTHORIZATION),
				content_type: header_text(header::CONTENT_TYPE),
				body: String::from_utf8_lossy(request.body()).into_owned(),
				timeout,
			};
			let is_token = recorded.uri.contains("/openid-connect/token");

			self.recorded.lock().push(recorded);

			let mut response = if is_token {
				HttpResponse::new(br#"{"access_token":"fake","expires_in":60}"#.to_vec())
			} else {
				HttpResponse::new(br#"{"operationCode":"OP-7","tickets":[]}"#.to_vec())
			};

			*response.status_mut() = StatusCode::OK;

			Ok(response)
		})
	}
}

#[derive(Default)]
struct FakeTransportErrorMapper;
impl TransportErrorMapper<FakeTransportError> for FakeTransportErrorMapper {
	fn map_transport_error(
		&self,
		call: CallKind,
		error: HttpClientError<FakeTransportError>,
	) -> TransportError {
		match error {
			HttpClientError::Reqwest(inner) => TransportError::network(*inner),
			other => TransportError::Other { message: format!("{call}: {other}") },
		}
	}
}

fn config() -> ClientConfig {
	ClientConfig::builder("fake-id", "fake-secret")
		.base_url("https://gateway.test/v2/agreement")
		.request_timeout(StdDuration::from_secs(3))
		.build()
		.expect("Fake configuration should build.")
}

#[tokio::test]
async fn custom_transport_issues_and_dispatches() {
	let http_client = Arc::new(FakeHttpClient::default());
	let store = Arc::new(MemoryStore::default());
	let client: TradeMaster<FakeHttpClient, FakeTransportErrorMapper> = TradeMaster::with_http_client(
		config(),
		store.clone(),
		Arc::clone(&http_client),
		FakeTransportErrorMapper,
	);
	let response = client
		.operation()
		.process(&PostOperationProcessRequest {
			authorization_code: "A".into(),
			buyer_document: "B".into(),
			seller_document: "S".into(),
			invoices: Vec::new(),
			tickets: Vec::new(),
		})
		.await
		.expect("Processing through the fake transport should succeed.");

	assert_eq!(response.operation_code, "OP-7");
	assert!(response.tickets.is_empty());

	let recorded = http_client.recorded();

	assert_eq!(recorded.len(), 2);
	assert_eq!(
		recorded[0].uri,
		format!("https://gateway.test{}", TOKEN_ENDPOINT.trim_end_matches('/'))
	);
	assert_eq!(recorded[0].authorization, None);
	assert_eq!(recorded[0].content_type.as_deref(), Some("application/x-www-form-urlencoded"));
	assert!(recorded[0].body.contains("grant_type=client_credentials"));
	assert!(recorded[0].body.contains("client_id=fake-id"));
	assert_eq!(recorded[1].uri, "https://gateway.test/v2/agreement/operation");
	assert_eq!(recorded[1].authorization.as_deref(), Some("Bearer fake"));
	assert_eq!(recorded[1].content_type.as_deref(), Some("application/json"));
	assert!(recorded.iter().all(|r| r.timeout == StdDuration::from_secs(3)));
	assert_eq!(
		store.snapshot().map(|c| c.access_token.expose().to_owned()),
		Some("fake".to_owned())
	);
}

#[tokio::test]
async fn transport_failures_are_mapped_per_call_site() {
	let client: TradeMaster<FakeHttpClient, FakeTransportErrorMapper> = TradeMaster::with_http_client(
		config(),
		Arc::new(MemoryStore::default()),
		FakeHttpClient::refusing(),
		FakeTransportErrorMapper,
	);
	let err = client.tokens().valid_token().await.expect_err("Refused issuance must fail.");

	assert!(matches!(err, Error::Issuer(IssuerError::Transport(TransportError::Network { .. }))));

	let seeded: Arc<dyn CredentialStore> = Arc::new(MemoryStore::with_credential(Credential::new(
		"seeded",
		OffsetDateTime::now_utc() + Duration::hours(1),
	)));
	let client: TradeMaster<FakeHttpClient, FakeTransportErrorMapper> = TradeMaster::with_http_client(
		config(),
		seeded,
		FakeHttpClient::refusing(),
		FakeTransportErrorMapper,
	);
	let err = client.operation().consult(None).await.expect_err("Refused dispatch must fail.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
	assert_eq!(err.to_string(), "Network error occurred while calling the Trade Master API.");
}
