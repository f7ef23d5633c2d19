//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors
//! - [`run_id::RunId`]: identifier correlating the trail entries of one run

pub mod error;
pub mod run_id;
