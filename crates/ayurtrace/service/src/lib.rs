//! AyurTrace REST boundary.
//!
//! Serves the traceability API over one shared [`LedgerStore`]. The
//! store is constructed at startup and injected through router state;
//! handlers translate between HTTP and the ledger's domain operations
//! and own no business logic of their own.

#![deny(unsafe_code)]

pub mod error;
pub mod handlers;
pub mod router;

pub use error::{ApiError, ApiResult};
pub use router::{create_router, AppState};
