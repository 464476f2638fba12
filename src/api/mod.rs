//! HTTP API module for the RTI engine.
//!
//! This module provides the REST endpoints for recording filings and
//! driving their submissions through validation, the gateway and
//! reporting.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{PeriodAdjustmentRequest, PeriodicPaymentRequest};
pub use response::{ApiError, ApiErrorResponse, FilingCreated};
pub use state::AppState;
