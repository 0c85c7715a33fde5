//! Externally supplied user tokens.

// self
use crate::{_prelude::*, auth::Token};

/// Boxed future returned by [`AlternativeTokenSource::fetch_token`].
pub type AlternativeTokenFuture<'a> = Pin<Box<dyn Future<Output = Result<Token>> + 'a + Send>>;

/// Source of user tokens that replaces the password/provisioning bootstrap.
///
/// When a session has one configured, re-authentication asks it for a token and stores the
/// result as the user token; stored user credentials and the client token are never consulted.
/// Any error it returns surfaces to the caller as [`Error::Unauthorized`] unless fatal.
pub trait AlternativeTokenSource
where
	Self: Send + Sync,
{
	/// Fetches a fresh user token.
	fn fetch_token(&self) -> AlternativeTokenFuture<'_>;
}
