//! In-tree client for the ZKTeco commodity protocol.
//!
//! Implements only what the adapter contract needs: connect/auth, option
//! reads, buffered table reads for the user roster and the attendance log,
//! and clean session teardown.

pub mod codec;
mod transport;

mod client;
pub use client::ZkClient;
