//! Token acquisition flows and the re-authentication protocol.
//!
//! Each flow is an `impl` block on [`Session`](crate::session::Session) and issues its
//! token-endpoint and provisioning calls through the same executor as API requests, so those
//! calls share classification, logging, and cancellation handling.

mod client_credentials;
mod password;
mod provision;
mod reauth;

pub use reauth::ReauthStep;
