//! Remote Session Gateway adapters.
//!
//! [`HttpSessionGateway`] implements the
//! [`SessionGateway`](polychat_application::SessionGateway) port against the
//! chat backend's REST API. [`SessionExpiry`] is the out-of-band signal an
//! expired session raises for the outer shell.

mod envelope;
mod expiry;
mod http;

pub use expiry::SessionExpiry;
pub use http::HttpSessionGateway;
