//! Credit reservations against a buyer's available limit.

// self
use crate::{
	_prelude::*,
	dispatch::{ApiRequest, Dispatcher},
	http::{ApiHttpClient, TransportErrorMapper},
	resources::PageQuery,
};

/// Resource path, relative to the agreement base URL.
pub const RESOURCE: &str = "authorization/";

/// Lifecycle state of an authorization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationStatus {
	/// Released without being captured.
	Cancelled,
	/// Limit reserved.
	Authorized,
	/// Reservation consumed by an operation.
	Captured,
	/// Status not known to this client.
	#[serde(other)]
	Unknown,
}

/// One seller's share of a reservation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
	/// Seller document number.
	pub seller_document: String,
	/// Amount to reserve.
	pub amount: f64,
	/// Whether the amount is split between sellers.
	pub is_split: bool,
}

/// Body of a reservation request.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestAuthorization {
	/// Buyer document number.
	pub buyer_document: String,
	/// Per-seller reservations.
	pub authorizations: Vec<Authorization>,
}

/// Filters for [`AuthorizationApi::consult`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultAuthorization {
	/// Page selection.
	#[serde(flatten)]
	pub page: PageQuery,
	/// Restrict to one authorization.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub authorization_code: Option<String>,
	/// Restrict to one seller.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub seller_document: Option<String>,
}

/// Reservation as reported by the consult endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedAuthorization {
	/// Reserved amount.
	pub amount: f64,
	/// Creation timestamp, as sent by the gateway.
	pub created_at: String,
	/// Authorization identifier.
	pub authorization_code: String,
	/// Whether the reservation was confirmed.
	pub is_confirmed: bool,
	/// Whether the amount is split between sellers.
	pub is_split: bool,
	/// Current status.
	pub status: AuthorizationStatus,
}
crate::impl_record!(DetailedAuthorization {
	"amount" => required scalar,
	"createdAt" => required scalar,
	"authorizationCode" => required scalar,
	"isConfirmed" => required scalar,
	"isSplit" => required scalar,
	"status" => required scalar,
});

/// Reservations grouped by buyer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedConsultAuthorization {
	/// Buyer document number.
	pub buyer_document: String,
	/// Reservations held by the buyer.
	pub authorizations: Vec<DetailedAuthorization>,
}
crate::impl_record!(DetailedConsultAuthorization {
	"buyerDocument" => required scalar,
	"authorizations" => required list<DetailedAuthorization>,
});

/// Page of reservations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultAuthorizationResponse {
	/// Total entries across all pages.
	pub total_count: i64,
	/// Index of this page.
	pub page_number: i64,
	/// Size of this page.
	pub page_size: i64,
	/// Entries on this page.
	pub data: Vec<DetailedConsultAuthorization>,
}
crate::impl_record!(ConsultAuthorizationResponse {
	"totalCount" => required scalar,
	"pageNumber" => required scalar,
	"pageSize" => required scalar,
	"data" => required list<DetailedConsultAuthorization>,
});

/// Result of extending an authorization's validity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationExtensionResponse {
	/// Authorization identifier.
	pub authorization_code: String,
	/// Expiry after the extension.
	#[serde(with = "time::serde::rfc3339")]
	pub new_expire_date: OffsetDateTime,
	/// Expiry before the extension.
	#[serde(with = "time::serde::rfc3339")]
	pub old_expire_date: OffsetDateTime,
	/// When the extension was recorded.
	#[serde(with = "time::serde::rfc3339")]
	pub date_created: OffsetDateTime,
}
crate::impl_record!(AuthorizationExtensionResponse {
	"authorizationCode" => required scalar,
	"newExpireDate" => required instant,
	"oldExpireDate" => required instant,
	"dateCreated" => required instant,
});

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizationCode<'a> {
	authorization_code: &'a str,
}

/// Authorization endpoints.
pub struct AuthorizationApi<'a, C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	dispatcher: &'a Dispatcher<C, M>,
}
impl<'a, C, M> AuthorizationApi<'a, C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Binds the API to `dispatcher`.
	pub fn new(dispatcher: &'a Dispatcher<C, M>) -> Self {
		Self { dispatcher }
	}

	/// Reserves part of the buyer's available limit. Returns the gateway's JSON untouched.
	pub async fn request(&self, request: &RequestAuthorization) -> Result<Value> {
		self.dispatcher.send(ApiRequest::post(RESOURCE).json(request)?).await?.value()
	}

	/// Lists reservations, optionally filtered.
	pub async fn consult(
		&self,
		params: Option<&ConsultAuthorization>,
	) -> Result<ConsultAuthorizationResponse> {
		let mut request = ApiRequest::get(RESOURCE);

		if let Some(params) = params {
			request = request.query(params)?;
		}

		self.dispatcher.send_mapped(request).await
	}

	/// Reverses a reservation after the order was cancelled or increased.
	pub async fn reverse(&self, authorization_code: &str) -> Result<()> {
		let body = [AuthorizationCode { authorization_code }];

		self.dispatcher
			.send(ApiRequest::post(RESOURCE).extra_path("reverse").json(&body)?)
			.await?;

		Ok(())
	}

	/// Extends the validity of a reservation.
	pub async fn extend(&self, authorization_code: &str) -> Result<AuthorizationExtensionResponse> {
		let body = AuthorizationCode { authorization_code };

		self.dispatcher
			.send_mapped(ApiRequest::post(RESOURCE).extra_path("extension").json(&body)?)
			.await
	}
}
