//! Fixtures shared by the integration tests.

#![allow(dead_code)]

// std
use std::{
	env, fs,
	path::{Path, PathBuf},
	process,
	sync::Arc,
};
// crates.io
use httpmock::prelude::*;
use serde_json::Value;
use time::{Duration, OffsetDateTime};
// self
use trade_master_api::{
	auth::Credential,
	client::ReqwestTradeMaster,
	config::ClientConfig,
	http::{ReqwestHttpClient, ReqwestTransportErrorMapper},
	store::{CredentialStore, FileStore, MemoryStore},
};

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";
pub const TOKEN_PATH: &str = "/auth/realms/api-management/protocol/openid-connect/token";

pub fn temp_cache_path(tag: &str) -> PathBuf {
	let unique = format!(
		"trade_master_it_{tag}_{}_{}.json",
		process::id(),
		OffsetDateTime::now_utc().unix_timestamp_nanos(),
	);

	env::temp_dir().join("trade-master-api-tests").join(unique)
}

pub fn config_for(server: &MockServer, cache_path: &Path) -> ClientConfig {
	ClientConfig::builder(CLIENT_ID, CLIENT_SECRET)
		.base_url(format!("{}/v2/agreement/", server.base_url()))
		.token_cache_path(cache_path)
		.build()
		.expect("Test configuration should build.")
}

pub fn client_with_store(config: ClientConfig, store: Arc<dyn CredentialStore>) -> ReqwestTradeMaster {
	ReqwestTradeMaster::with_http_client(
		config,
		store,
		ReqwestHttpClient::default(),
		ReqwestTransportErrorMapper,
	)
}

pub fn file_client(server: &MockServer, cache_path: &Path) -> ReqwestTradeMaster {
	let store = FileStore::open(cache_path).expect("Test cache should open.");

	client_with_store(config_for(server, cache_path), Arc::new(store))
}

pub fn seeded_store(token: &str) -> Arc<dyn CredentialStore> {
	let credential = Credential::new(token, OffsetDateTime::now_utc() + Duration::hours(1));

	Arc::new(MemoryStore::with_credential(credential))
}

pub fn epoch_seconds(instant: OffsetDateTime) -> f64 {
	instant.unix_timestamp_nanos() as f64 / 1_000_000_000.
}

pub fn write_cache(path: &Path, token: &str, expires_at: f64) {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).expect("Cache directory should be creatable.");
	}

	fs::write(path, format!(r#"{{"access_token":"{token}","expires_at":{expires_at}}}"#))
		.expect("Cache fixture should be writable.");
}

pub fn read_cache(path: &Path) -> Value {
	serde_json::from_slice(&fs::read(path).expect("Cache file should exist."))
		.expect("Cache file should hold JSON.")
}

pub fn remove_cache(path: &Path) {
	let _ = fs::remove_file(path);
}
