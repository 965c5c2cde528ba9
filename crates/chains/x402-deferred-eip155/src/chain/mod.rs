//! EVM chain support for x402 deferred payments via EIP-155.
//!
//! # Key Types
//!
//! - [`Eip155ChainReference`] - A numeric chain ID for EVM networks (e.g., `84532` for Base Sepolia)
//! - [`ChecksummedAddress`] - An address that always renders in EIP-55 form
//! - [`DeferredSignerConfig`](config::DeferredSignerConfig) - Buyer key configuration
//!
//! # Submodules
//!
//! - [`types`] - Wire format types and the address/amount validators
//! - [`config`] - Signer configuration

pub mod config;
pub mod types;

pub use types::*;
