//! Typed wrappers for the Trade Master agreement resources.
//!
//! Each API borrows a [`Dispatcher`](crate::dispatch::Dispatcher) and maps responses through
//! the schemas declared next to the record types.

pub mod authorization;
pub mod common;
pub mod credit_limit;
pub mod operation;

pub use authorization::AuthorizationApi;
pub use common::*;
pub use credit_limit::CreditLimitApi;
pub use operation::OperationApi;
