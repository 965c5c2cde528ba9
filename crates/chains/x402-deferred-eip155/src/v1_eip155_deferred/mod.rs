//! V1 EIP-155 "deferred" payment scheme implementation.
//!
//! Instead of settling every request on-chain, the buyer signs an EIP-712
//! voucher that accumulates what it owes a seller. Each paid request extends
//! the last signed voucher with the new charge and a bumped nonce; the seller
//! eventually redeems the latest voucher against the `DeferredPaymentEscrow`
//! contract.
//!
//! # Flow
//!
//! 1. The seller answers with payment requirements whose `extra` is either a
//!    new voucher seed (`type: "new"`) or the last signed voucher
//!    (`type: "aggregation"`).
//! 2. The buyer builds the next voucher ([`create_new_voucher`] or
//!    [`aggregate_voucher`]), signs its typed data ([`sign_voucher`]) and sends
//!    the encoded header ([`encode_payment`]).
//! 3. The seller decodes the header ([`decode_payment`]) and checks it with
//!    [`verify_payment_header`].
//!
//! # Usage
//!
//! ```ignore
//! use x402_deferred_eip155::V1Eip155DeferredClient;
//! use alloy_signer_local::PrivateKeySigner;
//!
//! let client = V1Eip155DeferredClient::new(PrivateKeySigner::random());
//! let header_value = client.pay(&requirements)?;
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod signer;
pub mod typed_data;
pub mod types;
pub mod voucher;

pub use client::*;
pub use codec::*;
pub use error::*;
pub use signer::*;
pub use typed_data::VoucherTypedData;
pub use types::*;
pub use voucher::*;

use crate::chain::EIP155_NAMESPACE;
use x402_types::proto::v1::X402Version1;

/// Identifier of the V1 EIP-155 deferred scheme.
pub struct V1Eip155Deferred;

impl V1Eip155Deferred {
    pub fn x402_version(&self) -> u8 {
        X402Version1::VALUE
    }

    pub fn namespace(&self) -> &str {
        EIP155_NAMESPACE
    }

    pub fn scheme(&self) -> &str {
        DeferredScheme::VALUE
    }
}
