//! Protocol types for x402 payment messages.
//!
//! This module defines the wire format envelopes exchanged between buyers and
//! sellers. Schemes plug their own payload and `extra` types into the generic
//! envelopes of [`v1`].
//!
//! # Wire Format
//!
//! All types serialize to JSON using camelCase field names. The protocol version
//! is indicated by the `x402Version` field in payment payloads.

pub mod v1;
