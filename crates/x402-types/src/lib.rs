#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the x402 payment protocol.
//!
//! This crate provides the chain-agnostic building blocks that payment schemes
//! share: how a network is identified, how time is expressed on the wire, the
//! V1 envelope a payment travels in, and how that envelope is packed into an
//! HTTP header value. Chain-specific schemes (for example the EVM `deferred`
//! scheme) live in separate crates and plug their payloads into these envelopes.
//!
//! # Modules
//!
//! - [`chain`] - CAIP-2 chain identifiers
//! - [`config`] - Environment variable resolution for configuration values
//! - [`networks`] - Registry of well-known blockchain networks
//! - [`proto`] - Wire format types for protocol messages (V1)
//! - [`timestamp`] - Unix timestamp utilities for voucher validity windows
//! - [`util`] - Helper types (base64, string literals)
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod chain;
pub mod config;
pub mod networks;
pub mod proto;
pub mod timestamp;
pub mod util;
