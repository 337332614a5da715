//! REST API layer: router, error mapping, auth middleware, and the
//! server lifecycle.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;
