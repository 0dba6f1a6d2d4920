//! Pagination and enumerations shared by several resources.

// self
use crate::_prelude::*;

/// Page selection accepted by every consult endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
	/// Maximum number of entries per page.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page_size: Option<u32>,
	/// One-based page index.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page_number: Option<u32>,
}
impl PageQuery {
	/// Selects page `number` with `size` entries.
	pub fn new(size: u32, number: u32) -> Self {
		Self { page_size: Some(size), page_number: Some(number) }
	}
}

/// Kind of buyer document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
	/// Individual taxpayer registry.
	Cpf,
	/// Company registry.
	#[default]
	Cnpj,
}

/// Commercial arrangement of a credit request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BusinessModel {
	/// White-label sale.
	WhiteFlag,
	/// Business-to-business sale.
	B2b,
}
