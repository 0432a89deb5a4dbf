//! Low-level building blocks for a single IRC server connection.
//!
//! This module covers the transport (TCP/TLS, sync and tokio-based), and
//! outbound rate limiting. The higher-level per-user session state machine
//! that uses these pieces lives in [`crate::bridge`].

pub mod conn;
pub mod queue;
#[cfg(feature = "tls")]
pub mod tls;
