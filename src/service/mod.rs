//! Service Layer
//!
//! Contains the application service that orchestrates filter construction
//! and queries, coordinating with the embedding node via ports.

pub mod filter_service;

pub use filter_service::FilterService;
