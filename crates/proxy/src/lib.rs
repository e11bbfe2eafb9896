//! Edge proxy for drydock.
//!
//! A long-running HTTP listener that maps the subdomain of each inbound
//! request to a project's published artifact tree and streams the
//! matching object back. Stateless across requests: no cache, no project
//! registry. The object store's own 404 is the only existence check.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
