//! Operations: invoices and tickets settled against an authorization.

// self
use crate::{
	_prelude::*,
	dispatch::{ApiRequest, Dispatcher},
	http::{ApiHttpClient, TransportErrorMapper},
	resources::PageQuery,
};

/// Resource path, relative to the agreement base URL.
pub const RESOURCE: &str = "operation";

/// Fiscal document kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceType {
	/// Goods invoice.
	#[serde(rename = "produto")]
	Product,
	/// Services invoice.
	#[serde(rename = "servico")]
	Service,
	/// Kind not known to this client.
	#[serde(other)]
	Unknown,
}

/// Encoding of an attached invoice document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
	/// Electronic invoice XML.
	Xml,
	/// Rendered PDF.
	Pdf,
}

/// Invoice document attached to an operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InvoiceContent {
	/// Document encoding.
	pub r#type: ContentType,
	/// Document payload.
	pub value: String,
}

/// Invoice submitted with an operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
	/// Fiscal document kind.
	pub r#type: InvoiceType,
	/// Issue date.
	pub invoice_date: String,
	/// Invoice amount.
	pub amount: f64,
	/// Discount granted.
	pub discount: f64,
	/// Attached documents.
	pub content: Vec<InvoiceContent>,
	/// Fiscal validation key.
	pub validation_key: String,
	/// Extra days granted on top of the agreement term.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub extended_days: Option<i64>,
}

/// Ticket submitted with an operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRequest {
	/// Ticket amount.
	pub amount: f64,
	/// Due date.
	pub due_date: String,
	/// Installment index.
	pub installment_number: i64,
	/// Discount granted.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub discount: Option<f64>,
	/// Ticket identifier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ticket_number: Option<String>,
	/// Identifier in the seller's systems.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub operational_external_number: Option<String>,
}

/// Body of an operation submission.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostOperationProcessRequest {
	/// Authorization the operation consumes.
	pub authorization_code: String,
	/// Buyer document number.
	pub buyer_document: String,
	/// Seller document number.
	pub seller_document: String,
	/// Invoices backing the operation.
	pub invoices: Vec<InvoiceRequest>,
	/// Tickets to issue.
	pub tickets: Vec<TicketRequest>,
}

/// Ticket issued for a processed operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedTicket {
	/// Installment index.
	pub installment_number: i64,
	/// Due date, as sent by the gateway.
	pub due_date: String,
	/// Ticket identifier.
	pub ticket_number: String,
	/// Ticket amount.
	pub amount: f64,
	/// Discount granted.
	pub discount: f64,
}
crate::impl_record!(ProcessedTicket {
	"installmentNumber" => required scalar,
	"dueDate" => required scalar,
	"ticketNumber" => required scalar,
	"amount" => required scalar,
	"discount" => required scalar,
});

/// Result of an operation submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostOperationProcessResponse {
	/// Operation identifier.
	pub operation_code: String,
	/// Issued tickets.
	pub tickets: Vec<ProcessedTicket>,
}
crate::impl_record!(PostOperationProcessResponse {
	"operationCode" => required scalar,
	"tickets" => required list<ProcessedTicket>,
});

/// Filters for [`OperationApi::consult`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetOperationProcessRequest {
	/// Page selection.
	#[serde(flatten)]
	pub page: PageQuery,
	/// Restrict to one operation.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub operation_code: Option<String>,
	/// Restrict to one authorization.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub authorization_code: Option<String>,
	/// Restrict to one seller.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub seller_document: Option<String>,
	/// Restrict to one creation date.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub created_at: Option<String>,
}

/// Invoice attached to a consulted operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationInvoice {
	/// Fiscal document kind.
	pub r#type: Option<InvoiceType>,
	/// Invoice number.
	pub number: Option<String>,
	/// Invoice series.
	pub series: Option<String>,
	/// Fiscal validation code.
	pub validation_code: Option<String>,
}
crate::impl_record!(OperationInvoice {
	"type" => optional scalar,
	"number" => optional scalar,
	"series" => optional scalar,
	"validationCode" => optional scalar,
});

/// Ticket attached to a consulted operation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationTicket {
	/// Installment index.
	pub installment_number: Option<i64>,
	/// Due date.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub due_date: Option<OffsetDateTime>,
	/// Ticket identifier.
	pub ticket_number: Option<String>,
	/// Ticket amount.
	pub amount: Option<f64>,
	/// Discount granted.
	pub discount: Option<f64>,
}
crate::impl_record!(OperationTicket {
	"installmentNumber" => optional scalar,
	"dueDate" => optional instant,
	"ticketNumber" => optional scalar,
	"amount" => optional scalar,
	"discount" => optional scalar,
});

/// Operation as reported by the consult endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
	/// Operation identifier.
	pub operation_code: Option<String>,
	/// Buyer document number.
	pub buyer_document: Option<String>,
	/// Seller document number.
	pub seller_document: Option<String>,
	/// Invoices backing the operation.
	#[serde(default)]
	pub invoices: Option<Vec<OperationInvoice>>,
	/// Authorization the operation consumed.
	pub authorization_code: Option<String>,
	/// Creation instant.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
	/// Issued tickets.
	#[serde(default)]
	pub tickets: Option<Vec<OperationTicket>>,
}
crate::impl_record!(Operation {
	"operationCode" => optional scalar,
	"buyerDocument" => optional scalar,
	"sellerDocument" => optional scalar,
	"invoices" => optional list<OperationInvoice>,
	"authorizationCode" => optional scalar,
	"createdAt" => optional instant,
	"tickets" => optional list<OperationTicket>,
});

/// Page of operations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetOperationProcessResponse {
	/// Total entries across all pages.
	pub total_count: i64,
	/// Index of this page.
	pub page_number: i64,
	/// Size of this page.
	pub page_size: i64,
	/// Entries on this page.
	#[serde(default)]
	pub data: Option<Vec<Operation>>,
}
crate::impl_record!(GetOperationProcessResponse {
	"totalCount" => required scalar,
	"pageNumber" => required scalar,
	"pageSize" => required scalar,
	"data" => optional list<Operation>,
});

/// Operation endpoints.
pub struct OperationApi<'a, C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	dispatcher: &'a Dispatcher<C, M>,
}
impl<'a, C, M> OperationApi<'a, C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Binds the API to `dispatcher`.
	pub fn new(dispatcher: &'a Dispatcher<C, M>) -> Self {
		Self { dispatcher }
	}

	/// Submits an operation against an authorization.
	pub async fn process(
		&self,
		request: &PostOperationProcessRequest,
	) -> Result<PostOperationProcessResponse> {
		self.dispatcher.send_mapped(ApiRequest::post(RESOURCE).json(request)?).await
	}

	/// Lists operations, optionally filtered.
	pub async fn consult(
		&self,
		params: Option<&GetOperationProcessRequest>,
	) -> Result<GetOperationProcessResponse> {
		let mut request = ApiRequest::get(RESOURCE);

		if let Some(params) = params {
			request = request.query(params)?;
		}

		self.dispatcher.send_mapped(request).await
	}
}
