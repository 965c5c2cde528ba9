//! Buyer signer configuration.
//!
//! The buyer's key is the only piece of configuration the deferred scheme
//! needs. It can be given literally or as an environment reference:
//!
//! ```json
//! {
//!   "private_key": "$BUYER_PRIVATE_KEY"
//! }
//! ```

use alloy_primitives::B256;
use alloy_signer_local::PrivateKeySigner;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use x402_types::config::LiteralOrEnv;

use crate::v1_eip155_deferred::DeferredError;

/// Configuration of the key that signs vouchers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeferredSignerConfig {
    /// Private key (hex format) or env var reference.
    pub private_key: LiteralOrEnv<EvmPrivateKey>,
}

impl DeferredSignerConfig {
    /// Builds the local signer for the configured key.
    ///
    /// A 32-byte value that is not a valid secp256k1 scalar (zero, or not below
    /// the curve order) is rejected with [`DeferredError::SigningFailure`].
    pub fn signer(&self) -> Result<PrivateKeySigner, DeferredError> {
        self.private_key.signer()
    }
}

// ============================================================================
// EVM Private Key
// ============================================================================

/// A validated EVM private key (32 bytes).
///
/// This type represents a raw private key that has been validated as a proper
/// 32-byte hex value. It can be converted to a `PrivateKeySigner` when needed.
#[derive(Clone, Copy, Serialize, Deserialize)]
pub struct EvmPrivateKey(B256);

impl EvmPrivateKey {
    /// Get the raw 32 bytes of the private key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_ref()
    }

    /// Builds a local signer from this key.
    pub fn signer(&self) -> Result<PrivateKeySigner, DeferredError> {
        PrivateKeySigner::from_bytes(&self.0).map_err(|e| DeferredError::SigningFailure {
            context: "private key".to_string(),
            source: Box::new(e),
        })
    }
}

impl std::fmt::Debug for EvmPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EvmPrivateKey(..)")
    }
}

impl PartialEq for EvmPrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl FromStr for EvmPrivateKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        B256::from_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid evm private key: {}", e))
    }
}
