//! PAYE Real Time Information filing engine
//!
//! This crate turns finalised payroll runs into statutory RTI filings,
//! validates them against the tax authority's field formats, submits them
//! through a gateway and tracks each submission until it is confirmed.

#![warn(missing_docs)]

pub mod api;
pub mod compliance;
pub mod config;
pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod models;
pub mod report;
pub mod store;
