//! Bearer credential model, token issuance, and the cached token lifecycle.

pub mod credential;
pub mod issuer;
pub mod manager;
pub mod secret;

pub use credential::*;
pub use issuer::*;
pub use manager::*;
pub use secret::*;
