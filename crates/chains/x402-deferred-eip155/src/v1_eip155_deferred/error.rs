//! Error taxonomy of the deferred scheme.
//!
//! Every operation of the scheme fails with a [`DeferredError`]. Aggregation
//! checks run in a fixed order and the first failing check is the one reported,
//! so the same bad input always produces the same error.

/// Errors raised while building, validating, signing or transporting vouchers.
#[derive(Debug, thiserror::Error)]
pub enum DeferredError {
    /// `extra` is missing, has no `type`, has an unknown `type`, or its
    /// aggregation payload does not decode.
    #[error("Malformed payment requirements: {0}")]
    MalformedRequirements(String),
    /// A `type: "new"` seed lacks a usable `id` or `escrow`.
    #[error("Invalid extra data for new voucher: {0}")]
    InvalidVoucherSeed(String),
    /// The requirements' `payTo` does not match the prior voucher's seller.
    #[error("Invalid voucher seller")]
    InvalidSeller,
    /// The requirements' `asset` does not match the prior voucher's asset.
    #[error("Invalid voucher asset")]
    InvalidAsset,
    /// The requirements' network does not resolve to the prior voucher's chain id.
    #[error("Invalid voucher chainId")]
    InvalidChainId,
    /// The prior voucher's expiry is in the past.
    #[error("Voucher expired")]
    VoucherExpired,
    /// The prior voucher's timestamp is ahead of the local clock.
    #[error("Voucher timestamp is in the future")]
    VoucherTimestampInFuture,
    /// The prior voucher's signature does not recover to the buyer.
    #[error("Invalid voucher signature")]
    InvalidVoucherSignature,
    /// A signature is not a 65-byte `(r, s, v)` ECDSA signature.
    #[error("Invalid signature format: {0}")]
    InvalidSignatureFormat(String),
    /// An amount is not a non-negative decimal integer within 256 bits.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    /// An address is not a 20-byte hex string.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    /// The network name does not resolve to an EIP-155 chain id.
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
    /// The signing backend failed.
    #[error("Failed to sign {context}: {source}")]
    SigningFailure {
        /// What was being signed.
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A payment header string is not valid base64 or not a valid header.
    #[error("Failed to decode payment: {0}")]
    DecodeFailure(String),
    /// A payment header could not be rendered as JSON.
    #[error("Failed to encode payment: {0}")]
    EncodeFailure(#[from] serde_json::Error),
}
