//! Request execution with single-shot re-authentication.
//!
//! Every call follows the same pipeline: check cancellation, resolve the declared credential,
//! send, classify. A 401 (or a credential that cannot be resolved locally) on a bearer
//! requirement runs one recovery for that tier and retries the whole call once; a second auth
//! failure ends the call as [`Error::Unauthorized`].

// crates.io
use futures::future::{Abortable, Aborted};
// self
use crate::{
	_prelude::*,
	auth::AuthRequirement,
	authority::{Resolution, UnavailableReason},
	cancel::{self, CancellationToken},
	http::{HttpRequest, HttpResponse, Transfer},
	obs,
	request::RequestDescriptor,
	session::{AuthGuards, Session},
};

type RecoverFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + 'a + Send>>;

/// What made an attempt fail authentication.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FailureCause {
	/// No usable token was stored, so nothing was sent.
	Unresolved(UnavailableReason),
	/// The server answered 401 to an attached credential.
	Rejected,
}

/// Authentication failure plus the token generation the attempt observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AuthFailure {
	pub(crate) cause: FailureCause,
	pub(crate) generation: u64,
}
impl AuthFailure {
	pub(crate) fn unresolved_user(generation: u64) -> Self {
		Self { cause: FailureCause::Unresolved(UnavailableReason::MissingUserToken), generation }
	}

	pub(crate) fn rejected(generation: u64) -> Self {
		Self { cause: FailureCause::Rejected, generation }
	}

	pub(crate) fn was_rejected(&self) -> bool {
		self.cause == FailureCause::Rejected
	}
}

enum Attempt<T> {
	Done(T),
	AuthFailed(AuthFailure),
}

impl Session {
	/// Executes a data request.
	///
	/// Cancelling `cancel` at any point before the call returns yields
	/// [`Error::RequestCancelled`], whatever else happened.
	pub async fn execute<T>(
		&self,
		descriptor: &RequestDescriptor<T>,
		cancel: Option<&CancellationToken>,
	) -> Result<T> {
		self.dispatch(descriptor, None, Transfer::Data, cancel).await
	}

	/// Executes a binary upload; `data` replaces the descriptor body and is resent on retry.
	pub async fn upload<T>(
		&self,
		descriptor: &RequestDescriptor<T>,
		data: &[u8],
		cancel: Option<&CancellationToken>,
	) -> Result<T> {
		self.dispatch(descriptor, Some(data), Transfer::Upload, cancel).await
	}

	/// Executes a binary download.
	pub async fn download<T>(
		&self,
		descriptor: &RequestDescriptor<T>,
		cancel: Option<&CancellationToken>,
	) -> Result<T> {
		self.dispatch(descriptor, None, Transfer::Download, cancel).await
	}

	async fn dispatch<T>(
		&self,
		descriptor: &RequestDescriptor<T>,
		payload: Option<&[u8]>,
		transfer: Transfer,
		cancel: Option<&CancellationToken>,
	) -> Result<T> {
		let result = self.run(descriptor, payload, transfer, cancel).await;
		let result = if cancel::is_cancelled(cancel) { Err(Error::RequestCancelled) } else { result };

		obs::record_request_outcome(match &result {
			Ok(_) => "success",
			Err(e) => e.label(),
		});

		result
	}

	async fn run<T>(
		&self,
		descriptor: &RequestDescriptor<T>,
		payload: Option<&[u8]>,
		transfer: Transfer,
		cancel: Option<&CancellationToken>,
	) -> Result<T> {
		let requirement = descriptor.auth();
		let mut recovered = false;

		loop {
			let failure = match self.attempt(descriptor, payload, transfer, cancel).await? {
				Attempt::Done(value) => return Ok(value),
				Attempt::AuthFailed(failure) => failure,
			};

			if recovered || !requirement.is_recoverable() {
				return Err(Error::Unauthorized);
			}

			recovered = true;

			if let Err(e) = self.recover(requirement, failure).await {
				obs::log_recovery_failure(requirement, &e);

				return Err(if e.is_fatal() { e } else { Error::Unauthorized });
			}
		}
	}

	async fn attempt<T>(
		&self,
		descriptor: &RequestDescriptor<T>,
		payload: Option<&[u8]>,
		transfer: Transfer,
		cancel: Option<&CancellationToken>,
	) -> Result<Attempt<T>> {
		if cancel::is_cancelled(cancel) {
			return Err(Error::RequestCancelled);
		}

		let requirement = descriptor.auth();
		let generation = self.guards.generation_of(requirement);
		let credential = match self.authority.resolve(requirement)? {
			Resolution::NotRequired => None,
			Resolution::Resolved(credential) => Some(credential),
			Resolution::Unavailable(reason) => {
				obs::log_unresolved_credential(requirement, reason);

				return Ok(Attempt::AuthFailed(AuthFailure {
					cause: FailureCause::Unresolved(reason),
					generation,
				}));
			},
		};
		let request = descriptor.to_http_request(credential.as_ref(), payload, transfer)?;
		let (method, url) = (request.method, request.url.clone());
		let response = match self.send(request, cancel).await {
			Ok(response) => response,
			Err(e) => {
				obs::log_request_failure(method, &url, None, &[], e.label());

				return Err(e);
			},
		};

		match response.status {
			200..=399 => match descriptor.decode(&response.body) {
				Ok(value) => {
					obs::log_request_success(method, &url, response.status);

					Ok(Attempt::Done(value))
				},
				Err(e) => {
					let e = Error::from(e);

					obs::log_request_failure(
						method,
						&url,
						Some(response.status),
						descriptor.loggable_body(&response.body),
						e.label(),
					);

					Err(e)
				},
			},
			401 => {
				obs::log_request_failure(
					method,
					&url,
					Some(401),
					descriptor.loggable_body(&response.body),
					"unauthorized",
				);

				Ok(Attempt::AuthFailed(AuthFailure::rejected(generation)))
			},
			status => {
				let e = classify(&response);

				obs::log_request_failure(
					method,
					&url,
					Some(status),
					descriptor.loggable_body(&response.body),
					e.label(),
				);

				Err(e)
			},
		}
	}

	async fn send(&self, request: HttpRequest, cancel: Option<&CancellationToken>) -> Result<HttpResponse> {
		let Some(token) = cancel else {
			return Ok(self.transport.send(request).await?);
		};
		let Some(registration) = token.attach() else {
			return Err(Error::RequestCancelled);
		};
		let outcome = Abortable::new(self.transport.send(request), registration).await;

		token.detach();

		match outcome {
			Ok(response) => Ok(response?),
			Err(Aborted) => Err(Error::RequestCancelled),
		}
	}

	// Boxed to break the execute -> recover -> execute cycle of the token-endpoint calls.
	fn recover(&self, requirement: AuthRequirement, failure: AuthFailure) -> RecoverFuture<'_> {
		Box::pin(async move {
			match requirement {
				AuthRequirement::UserBearer => self.recover_user(failure).await,
				AuthRequirement::ClientBearer => self.recover_client(failure).await,
				AuthRequirement::None | AuthRequirement::ClientBasic => Err(Error::Unauthorized),
			}
		})
	}
}

impl AuthGuards {
	fn generation_of(&self, requirement: AuthRequirement) -> u64 {
		match requirement {
			AuthRequirement::UserBearer => self.user_generation(),
			AuthRequirement::ClientBearer => self.client_generation(),
			AuthRequirement::None | AuthRequirement::ClientBasic => 0,
		}
	}
}

fn classify(response: &HttpResponse) -> Error {
	match response.status {
		400 => Error::BadRequest,
		404 => Error::NotFound,
		406 => Error::NotAcceptable,
		429 => Error::TooManyRequests { retry_after: response.retry_after },
		status => Error::Unknown { status: Some(status) },
	}
}
