mod common;

// crates.io
use httpmock::prelude::*;
use time::OffsetDateTime;
// self
use common::*;
use trade_master_api::{
	error::{Error, IssuerError},
	store::StoreError,
};

async fn mock_token_endpoint<'a>(server: &'a MockServer, token: &str) -> httpmock::Mock<'a> {
	let body = format!(r#"{{"access_token":"{token}","expires_in":3600,"token_type":"Bearer"}}"#);

	server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}

#[tokio::test]
async fn missing_cache_issues_once_and_persists_expiry() {
	let server = MockServer::start_async().await;
	let mock = mock_token_endpoint(&server, "xyz").await;
	let path = temp_cache_path("missing");
	let client = file_client(&server, &path);
	let issued_at = epoch_seconds(OffsetDateTime::now_utc());
	let token = client.tokens().valid_token().await.expect("First lookup should issue a token.");

	assert_eq!(token.expose(), "xyz");
	mock.assert_calls_async(1).await;

	let cache = read_cache(&path);
	let expires_at = cache["expires_at"].as_f64().expect("Expiry should be a number.");

	assert_eq!(cache["access_token"], "xyz");
	assert!((expires_at - (issued_at + 3600.)).abs() < 5., "unexpected expiry {expires_at}");

	let again = client.tokens().valid_token().await.expect("Second lookup should hit the cache.");

	assert_eq!(again.expose(), "xyz");
	mock.assert_calls_async(1).await;
	remove_cache(&path);
}

#[tokio::test]
async fn future_cache_is_used_without_network() {
	let server = MockServer::start_async().await;
	let mock = mock_token_endpoint(&server, "fresh").await;
	let path = temp_cache_path("future");

	write_cache(&path, "abc", epoch_seconds(OffsetDateTime::now_utc()) + 10.);

	let client = file_client(&server, &path);
	let token = client.tokens().valid_token().await.expect("Cached token should be returned.");

	assert_eq!(token.expose(), "abc");
	mock.assert_calls_async(0).await;
	remove_cache(&path);
}

#[tokio::test]
async fn expired_cache_is_reissued_and_overwritten() {
	let server = MockServer::start_async().await;
	let mock = mock_token_endpoint(&server, "renewed").await;
	let path = temp_cache_path("expired");

	write_cache(&path, "stale", epoch_seconds(OffsetDateTime::now_utc()) - 10.);

	let client = file_client(&server, &path);
	let token = client.tokens().valid_token().await.expect("Expired cache should be replaced.");

	assert_eq!(token.expose(), "renewed");
	mock.assert_calls_async(1).await;
	assert_eq!(read_cache(&path)["access_token"], "renewed");
	remove_cache(&path);
}

#[tokio::test]
async fn token_written_by_another_process_is_picked_up() {
	let server = MockServer::start_async().await;
	let mock = mock_token_endpoint(&server, "ours").await;
	let path = temp_cache_path("shared");
	let client = file_client(&server, &path);

	write_cache(&path, "theirs", epoch_seconds(OffsetDateTime::now_utc()) + 600.);

	let token = client.tokens().valid_token().await.expect("Shared cache should be read.");

	assert_eq!(token.expose(), "theirs");
	mock.assert_calls_async(0).await;
	remove_cache(&path);
}

#[tokio::test]
async fn rejected_issuance_is_not_cached_and_retried() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(401).body("invalid_client");
		})
		.await;
	let path = temp_cache_path("rejected");
	let client = file_client(&server, &path);

	for _ in 0..2 {
		let err = client.tokens().valid_token().await.expect_err("Rejection must surface.");

		assert!(
			matches!(err, Error::Issuer(IssuerError::Rejected { status: 401, ref body }) if body == "invalid_client"),
			"unexpected error {err:?}"
		);
	}

	mock.assert_calls_async(2).await;
	assert!(!path.exists());
}

#[tokio::test]
async fn malformed_token_response_is_a_parse_error() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(r#"{"token":"x"}"#);
		})
		.await;
	let path = temp_cache_path("malformed");
	let client = file_client(&server, &path);
	let err = client.tokens().valid_token().await.expect_err("Malformed JSON must fail.");

	assert!(matches!(err, Error::Issuer(IssuerError::ResponseParse { status: 200, .. })));
	assert!(!path.exists());
}

#[tokio::test]
async fn non_positive_lifetime_is_rejected() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).body(r#"{"access_token":"x","expires_in":0}"#);
		})
		.await;
	let path = temp_cache_path("zero");
	let client = file_client(&server, &path);
	let err = client.tokens().valid_token().await.expect_err("Zero lifetime must fail.");

	assert!(matches!(err, Error::Issuer(IssuerError::NonPositiveExpiresIn)));
	assert!(!path.exists());
}

#[tokio::test]
async fn corrupt_cache_surfaces_until_cleared() {
	let server = MockServer::start_async().await;
	let mock = mock_token_endpoint(&server, "recovered").await;
	let path = temp_cache_path("corrupt");
	let client = file_client(&server, &path);

	std::fs::write(&path, "{").expect("Corrupt fixture should be writable.");

	let err = client.tokens().valid_token().await.expect_err("Corrupt cache must fail.");

	assert!(matches!(err, Error::Storage(StoreError::Corrupted { .. })));
	mock.assert_calls_async(0).await;

	client.tokens().clear().await.expect("Clearing the cache should succeed.");

	let token = client.tokens().valid_token().await.expect("Lookup after clear should issue.");

	assert_eq!(token.expose(), "recovered");
	mock.assert_calls_async(1).await;
	remove_cache(&path);
}

#[tokio::test]
async fn clients_sharing_a_cache_refresh_concurrently_without_corruption() {
	let server = MockServer::start_async().await;
	let mock = mock_token_endpoint(&server, "shared").await;
	let path = temp_cache_path("shared");
	let clients = (0..4).map(|_| file_client(&server, &path)).collect::<Vec<_>>();

	for _ in 0..10 {
		let refreshes = clients
			.iter()
			.map(|client| {
				let tokens = client.tokens().clone();

				tokio::spawn(async move { tokens.refresh().await })
			})
			.collect::<Vec<_>>();

		for refresh in refreshes {
			let credential = refresh
				.await
				.expect("Refresh task should not panic.")
				.expect("Concurrent refresh should persist.");

			assert_eq!(credential.access_token.expose(), "shared");
		}

		for client in &clients {
			let token =
				client.tokens().valid_token().await.expect("Shared cache should stay readable.");

			assert_eq!(token.expose(), "shared");
		}
	}

	mock.assert_calls_async(40).await;
	assert_eq!(read_cache(&path)["access_token"], "shared");
	remove_cache(&path);
}
