//! EIP-155 (EVM) support for the x402 "deferred" payment scheme.
//!
//! A buyer pays a seller across many requests with a single EIP-712 signed
//! voucher whose value grows with every request, instead of one on-chain
//! transfer per request. The voucher is settled later through an escrow
//! contract.
//!
//! # Architecture
//!
//! - [`chain`] - EVM address and amount types, chain references, signer configuration
//! - [`v1_eip155_deferred`] - The scheme: vouchers, typed data, signing, aggregation,
//!   verification and the payment header codec
//!
//! # Feature Flags
//!
//! - `telemetry` - `tracing` spans and events for voucher creation, aggregation and rejection
//!
//! # Usage
//!
//! ```ignore
//! use x402_deferred_eip155::V1Eip155DeferredClient;
//! use alloy_signer_local::PrivateKeySigner;
//!
//! let signer = PrivateKeySigner::random();
//! let client = V1Eip155DeferredClient::new(signer);
//!
//! // First request: `extra.type == "new"`; later ones: `extra.type == "aggregation"`.
//! let header_value = client.pay(&payment_requirements)?;
//! ```

pub mod chain;
pub mod v1_eip155_deferred;

pub use v1_eip155_deferred::V1Eip155Deferred;
pub use v1_eip155_deferred::client::V1Eip155DeferredClient;
