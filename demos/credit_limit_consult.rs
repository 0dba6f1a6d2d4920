//! Consults credit limit requests against a mocked gateway with the default reqwest transport
//! and the file-backed token cache.

// std
use std::env;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use trade_master_api::{
	client::ReqwestTradeMaster,
	config::ClientConfig,
	resources::{PageQuery, credit_limit::{ConsultCreditLimit, CreditLimitStatus}},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/realms/api-management/protocol/openid-connect/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-access\",\"expires_in\":900}");
		})
		.await;
	let consult_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v2/agreement/creditLimitRequest")
				.header("authorization", "Bearer demo-access")
				.query_param("status", "completed");
			then.status(200).header("content-type", "application/json").body(
				"{\"totalCount\":1,\"pageNumber\":1,\"pageSize\":10,\"data\":[{\
				\"id\":\"CL-1\",\"buyerDocument\":\"12345678000199\",\"status\":\"completed\",\
				\"approvedLimit\":25000.0,\"createdAt\":\"2024-03-01T12:30:00.000Z\"}]}",
			);
		})
		.await;
	let cache_path = env::temp_dir().join("trade-master-api-demo").join("access_token.json");
	let config = ClientConfig::builder("demo-client", "demo-secret")
		.base_url(server.url("/v2/agreement/"))
		.token_cache_path(&cache_path)
		.build()?;
	let client = ReqwestTradeMaster::new(config)?;

	client.tokens().clear().await?;

	let filters = ConsultCreditLimit {
		page: PageQuery::new(10, 1),
		status: Some(CreditLimitStatus::Completed),
		..Default::default()
	};

	// The second consult reuses the cached token.
	for _ in 0..2 {
		let page = client.credit_limit().consult(Some(&filters)).await?;

		println!("{} credit limit request(s) on page {}:", page.total_count, page.page_number);

		for entry in page.data.unwrap_or_default() {
			println!(
				"  {} {:?} approved={:?} created_at={:?}",
				entry.id.unwrap_or_default(),
				entry.status,
				entry.approved_limit,
				entry.created_at
			);
		}
	}

	token_mock.assert_calls_async(1).await;
	consult_mock.assert_calls_async(2).await;

	println!("Token cached at {}.", cache_path.display());

	Ok(())
}
