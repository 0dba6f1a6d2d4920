//! Credit limit requests and their review status.

// self
use crate::{
	_prelude::*,
	dispatch::{ApiRequest, Dispatcher},
	http::{ApiHttpClient, TransportErrorMapper},
	resources::{BusinessModel, DocumentType, PageQuery},
};

/// Resource path, relative to the agreement base URL.
pub const RESOURCE: &str = "creditLimitRequest";

/// Review state of a credit limit request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CreditLimitStatus {
	/// Received, not yet analyzed.
	New,
	/// Analysis finished.
	Completed,
	/// Waiting on the external credit bureau.
	NeurotechPending,
	/// Withdrawn.
	Canceled,
	/// Blocked by the analyst.
	Blocked,
	/// Status not known to this client.
	#[serde(other)]
	Unknown,
}

/// Whether the request grants a new limit or reviews an existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CreditLimitType {
	/// First grant.
	Concession,
	/// Review of an existing limit.
	Review,
	/// Type not known to this client.
	#[serde(other)]
	Unknown,
}

/// Head office of an economic group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Centralizer {
	/// Document of the centralizing company.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub document: Option<String>,
}

/// Sales representative responsible for the buyer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SalesPerson {
	/// Representative name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Representative e-mail.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
}

/// Buyer address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
	/// Street name.
	pub street: String,
	/// Street number.
	pub number: String,
	/// Neighborhood.
	pub neighborhood: String,
	/// City.
	pub city: String,
	/// State abbreviation.
	pub state: String,
	/// Postal code.
	pub postal_code: String,
	/// Address complement.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub complement: Option<String>,
	/// Country code.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub country: Option<String>,
}
impl Address {
	/// Builds a Brazilian address without complement.
	pub fn new(
		street: impl Into<String>,
		number: impl Into<String>,
		neighborhood: impl Into<String>,
		city: impl Into<String>,
		state: impl Into<String>,
		postal_code: impl Into<String>,
	) -> Self {
		Self {
			street: street.into(),
			number: number.into(),
			neighborhood: neighborhood.into(),
			city: city.into(),
			state: state.into(),
			postal_code: postal_code.into(),
			complement: None,
			country: Some("BR".into()),
		}
	}
}

/// Past receivable used as evidence for the credit analysis.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialHistoryItem {
	/// Transaction identifier.
	pub transaction_number: String,
	/// Installment identifier.
	pub installment_number: String,
	/// Ticket identifier.
	pub ticket_number: String,
	/// Billing date.
	pub billing_date: String,
	/// Due date.
	pub due_date: String,
	/// Billed amount.
	pub amount: f64,
	/// Amount paid so far.
	pub paid_amount: f64,
	/// Whether the receivable is settled.
	pub settled: bool,
	/// Settlement date.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub payment_date: Option<String>,
}

/// Body of a credit limit request.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCreditLimit {
	/// Buyer document number.
	pub buyer_document: String,
	/// Buyer legal name.
	pub buyer_name: String,
	/// Buyer address.
	pub address: Address,
	/// Billing contact name.
	pub billing_contact: String,
	/// Billing e-mail.
	pub billing_email: String,
	/// Business phone.
	pub business_phone: String,
	/// Business e-mail.
	pub business_email: String,
	/// Kind of buyer document.
	pub buyer_document_type: DocumentType,
	/// Birth date, for individual buyers.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub birth_date: Option<String>,
	/// State registration.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub state_registration: Option<String>,
	/// City registration.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub city_registration: Option<String>,
	/// Limit suggested by the seller.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub suggested_credit_limit: Option<f64>,
	/// Buyer code in the seller's systems.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub external_customer_code: Option<String>,
	/// Seller branch.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub branch: Option<String>,
	/// Buyer profile.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub profile: Option<String>,
	/// Economic group code.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub group_code: Option<String>,
	/// Salesman code.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sales_man: Option<String>,
	/// Sales region.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub regional: Option<String>,
	/// Billing phone.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub billing_phone: Option<String>,
	/// Commercial arrangement.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub business_model: Option<BusinessModel>,
	/// Head office of the buyer's group.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub centralizer: Option<Centralizer>,
	/// Responsible sales representative.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sales_person: Option<SalesPerson>,
	/// Receivables history.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub financial_history: Option<Vec<FinancialHistoryItem>>,
}
impl RequestCreditLimit {
	/// Builds a request for a company buyer with every optional field unset.
	pub fn new(
		buyer_document: impl Into<String>,
		buyer_name: impl Into<String>,
		address: Address,
		billing_contact: impl Into<String>,
		billing_email: impl Into<String>,
		business_phone: impl Into<String>,
		business_email: impl Into<String>,
	) -> Self {
		Self {
			buyer_document: buyer_document.into(),
			buyer_name: buyer_name.into(),
			address,
			billing_contact: billing_contact.into(),
			billing_email: billing_email.into(),
			business_phone: business_phone.into(),
			business_email: business_email.into(),
			buyer_document_type: DocumentType::default(),
			birth_date: None,
			state_registration: None,
			city_registration: None,
			suggested_credit_limit: None,
			external_customer_code: None,
			branch: None,
			profile: None,
			group_code: None,
			sales_man: None,
			regional: None,
			billing_phone: None,
			business_model: None,
			centralizer: None,
			sales_person: None,
			financial_history: None,
		}
	}
}

/// Acknowledgement of a credit limit request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCreditLimitResponse {
	/// Request identifier.
	pub id: Option<String>,
	/// Buyer document number.
	pub buyer_document: Option<String>,
	/// Review state.
	pub status: Option<CreditLimitStatus>,
	/// Concession or review.
	pub r#type: Option<CreditLimitType>,
	/// Buyer code in the seller's systems.
	pub external_customer_code: Option<String>,
	/// Buyer legal name.
	pub buyer_name: Option<String>,
}
crate::impl_record!(RequestCreditLimitResponse {
	"id" => optional scalar,
	"buyerDocument" => optional scalar,
	"status" => optional scalar,
	"type" => optional scalar,
	"externalCustomerCode" => optional scalar,
	"buyerName" => optional scalar,
});

/// Filters for [`CreditLimitApi::consult`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultCreditLimit {
	/// Page selection.
	#[serde(flatten)]
	pub page: PageQuery,
	/// Restrict to one request.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Restrict to one buyer.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub buyer_document: Option<String>,
	/// Restrict to one review state.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<CreditLimitStatus>,
	/// Restrict to one buyer code.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub external_customer_code: Option<String>,
	/// Restrict to one creation date.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub created_at: Option<String>,
}

/// Credit limit request as reported by the consult endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedCreditLimit {
	/// Request identifier.
	pub id: Option<String>,
	/// Buyer document number.
	pub buyer_document: Option<String>,
	/// Review state.
	pub status: Option<CreditLimitStatus>,
	/// Concession or review.
	pub r#type: Option<CreditLimitType>,
	/// Buyer code in the seller's systems.
	pub external_customer_code: Option<String>,
	/// Buyer legal name.
	pub buyer_name: Option<String>,
	/// Analysis verdict.
	pub result: Option<String>,
	/// Verdict justification.
	pub reason: Option<String>,
	/// Limit suggested by the seller.
	pub suggested_credit_limit: Option<f64>,
	/// Limit granted.
	pub approved_limit: Option<f64>,
	/// When the limit was granted.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub credit_limit_approved_at: Option<OffsetDateTime>,
	/// Whether the buyer belongs to an economic group.
	pub has_economic_group: Option<bool>,
	/// Creation instant.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
	/// Last update instant.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub updated_at: Option<OffsetDateTime>,
}
crate::impl_record!(DetailedCreditLimit {
	"id" => optional scalar,
	"buyerDocument" => optional scalar,
	"status" => optional scalar,
	"type" => optional scalar,
	"externalCustomerCode" => optional scalar,
	"buyerName" => optional scalar,
	"result" => optional scalar,
	"reason" => optional scalar,
	"suggestedCreditLimit" => optional scalar,
	"approvedLimit" => optional scalar,
	"creditLimitApprovedAt" => optional instant,
	"hasEconomicGroup" => optional scalar,
	"createdAt" => optional instant,
	"updatedAt" => optional instant,
});

/// Page of credit limit requests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultCreditLimitResponse {
	/// Total entries across all pages.
	pub total_count: i64,
	/// Index of this page.
	pub page_number: i64,
	/// Size of this page.
	pub page_size: i64,
	/// Entries on this page.
	#[serde(default)]
	pub data: Option<Vec<DetailedCreditLimit>>,
}
crate::impl_record!(ConsultCreditLimitResponse {
	"totalCount" => required scalar,
	"pageNumber" => required scalar,
	"pageSize" => required scalar,
	"data" => optional list<DetailedCreditLimit>,
});

/// Credit limit endpoints.
pub struct CreditLimitApi<'a, C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	dispatcher: &'a Dispatcher<C, M>,
}
impl<'a, C, M> CreditLimitApi<'a, C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Binds the API to `dispatcher`.
	pub fn new(dispatcher: &'a Dispatcher<C, M>) -> Self {
		Self { dispatcher }
	}

	/// Submits a credit limit request for analysis.
	pub async fn request(&self, request: &RequestCreditLimit) -> Result<RequestCreditLimitResponse> {
		self.dispatcher.send_mapped(ApiRequest::post(RESOURCE).json(request)?).await
	}

	/// Lists credit limit requests, optionally filtered.
	pub async fn consult(
		&self,
		params: Option<&ConsultCreditLimit>,
	) -> Result<ConsultCreditLimitResponse> {
		let mut request = ApiRequest::get(RESOURCE);

		if let Some(params) = params {
			request = request.query(params)?;
		}

		self.dispatcher.send_mapped(request).await
	}
}
