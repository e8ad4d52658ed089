//! Ports Layer
//!
//! Defines the trait seams between the filter engine and its
//! collaborators:
//! - Driven Ports (outbound) - where block data comes from
//!
//! The engine is a library, so its inbound surface is the service type
//! itself rather than a separate trait.

pub mod outbound;

pub use outbound::BlockElementProvider;
