//! API module
//!
//! HTTP surface for the core: route handlers parse a request DTO, call the
//! ledger or accrual service, and map errors to status codes. No business
//! logic lives here.

pub mod middleware;
pub mod routes;

pub use routes::create_router;
