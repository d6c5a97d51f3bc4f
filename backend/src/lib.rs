//! Group directory administration backend.
//!
//! The domain layer owns the hierarchical membership filter and the bulk
//! membership mutation processor. Inbound adapters expose them over HTTP;
//! outbound adapters implement the storage-facing ports.

pub mod domain;
pub mod inbound;
pub mod outbound;
