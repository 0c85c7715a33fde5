//! Auth-domain models: client/user credentials, issued tokens, and per-request requirements.

pub mod credentials;
pub mod requirement;
pub mod token;

pub use credentials::*;
pub use requirement::*;
pub use token::{secret::*, *};
