//! HTTP API layer for shoutly.
//!
//! This crate provides the REST surface of the marketplace:
//!
//! - **Endpoints**: public catalog and auth, user, creator, and admin APIs
//! - **Extractors**: role-scoped authentication and client metadata
//! - **Middleware**: bearer-token decoding into a request principal
//!
//! Built on Axum 0.8 with a Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
