//! Blockchain identifiers for x402 payment processing.
//!
//! - [`ChainId`] - A CAIP-2 compliant chain identifier (e.g., `eip155:84532` for Base Sepolia)
//!
//! V1 messages name networks by their human-readable name (`"base-sepolia"`);
//! [`ChainId::from_network_name`] maps such a name onto its CAIP-2 identifier.

mod chain_id;

pub use chain_id::*;
