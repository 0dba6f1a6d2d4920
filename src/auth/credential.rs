//! The single cached bearer credential and its validity predicate.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Bearer token plus the absolute instant after which it must not be used.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Absolute expiry instant.
	pub expires_at: OffsetDateTime,
}
impl Credential {
	/// Creates a credential that expires at an absolute instant.
	pub fn new(access_token: impl Into<TokenSecret>, expires_at: OffsetDateTime) -> Self {
		Self { access_token: access_token.into(), expires_at }
	}

	/// Creates a credential issued at `issued_at` that lives for `lifetime`.
	///
	/// Returns `None` when the expiry cannot be represented.
	pub fn issued(
		access_token: impl Into<TokenSecret>,
		issued_at: OffsetDateTime,
		lifetime: Duration,
	) -> Option<Self> {
		let expires_at = issued_at.checked_add(lifetime)?;

		Some(Self::new(access_token, expires_at))
	}

	/// Returns `true` while `instant` is strictly before the expiry.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		instant < self.expires_at
	}

	/// Convenience helper that checks validity against the current UTC instant.
	pub fn is_valid(&self) -> bool {
		self.is_valid_at(OffsetDateTime::now_utc())
	}

	/// Time left before expiry at `instant`, clamped to zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_token", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
