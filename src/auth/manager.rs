//! Cached token lifecycle: reuse while valid, reissue and persist otherwise.

// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenIssuer, TokenSecret},
	error::IssuerError,
	obs::{self, CallKind, CallOutcome, CallSpan},
	store::CredentialStore,
};

/// Hands out valid bearer tokens backed by a [`CredentialStore`] and a [`TokenIssuer`].
///
/// Each lookup reloads the store, so a token refreshed by another process sharing the same
/// cache is reused. Lookups on one manager are serialized by an async mutex; concurrent
/// callers wait for an in-flight issuance instead of starting their own.
pub struct TokenManager {
	store: Arc<dyn CredentialStore>,
	issuer: Arc<dyn TokenIssuer>,
	refresh_margin: Duration,
	singleflight: AsyncMutex<()>,
}
impl TokenManager {
	/// Creates a manager with no refresh margin.
	pub fn new(store: Arc<dyn CredentialStore>, issuer: Arc<dyn TokenIssuer>) -> Self {
		Self { store, issuer, refresh_margin: Duration::ZERO, singleflight: AsyncMutex::new(()) }
	}

	/// Treats credentials as expired `margin` early. Negative margins clamp to zero.
	pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
		self.refresh_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Configured refresh margin.
	pub fn refresh_margin(&self) -> Duration {
		self.refresh_margin
	}

	/// Backing credential store.
	pub fn store(&self) -> &Arc<dyn CredentialStore> {
		&self.store
	}

	/// Returns `true` when `credential` may still be used at `now`.
	pub fn is_usable(&self, credential: &Credential, now: OffsetDateTime) -> bool {
		now.checked_add(self.refresh_margin).is_some_and(|at| credential.is_valid_at(at))
	}

	/// Returns a usable bearer token, issuing a new one when the cache is empty or stale.
	pub async fn valid_token(&self) -> Result<TokenSecret> {
		Ok(self.valid_credential().await?.access_token)
	}

	/// Same as [`valid_token`](Self::valid_token) but returns the full credential.
	pub async fn valid_credential(&self) -> Result<Credential> {
		const KIND: CallKind = CallKind::TokenLookup;

		let span = CallSpan::new(KIND, "valid_credential");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _singleflight = self.singleflight.lock().await;

				if let Some(current) = self.store.load().await? {
					if self.is_usable(&current, OffsetDateTime::now_utc()) {
						obs::record_call_outcome(KIND, CallOutcome::CacheHit);

						return Ok(current);
					}
				}

				self.issue_locked().await
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	/// Issues and persists a new credential regardless of the cached one.
	pub async fn refresh(&self) -> Result<Credential> {
		let span = CallSpan::new(CallKind::TokenLookup, "refresh");

		span.instrument(async move {
			let _singleflight = self.singleflight.lock().await;

			self.issue_locked().await
		})
		.await
	}

	/// Drops the cached credential, e.g. after the store reported corruption.
	pub async fn clear(&self) -> Result<()> {
		let _singleflight = self.singleflight.lock().await;

		Ok(self.store.clear().await?)
	}

	async fn issue_locked(&self) -> Result<Credential> {
		let issued = self.issuer.issue().await?;
		let now = OffsetDateTime::now_utc();
		let credential = Credential::issued(issued.access_token, now, issued.expires_in)
			.ok_or(IssuerError::ExpiresInOutOfRange)?;

		self.store.save(credential.clone()).await?;

		Ok(credential)
	}
}
impl Debug for TokenManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("refresh_margin", &self.refresh_margin)
			.finish_non_exhaustive()
	}
}
