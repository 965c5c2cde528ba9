//! Type definitions for the V1 EIP-155 "deferred" payment scheme.
//!
//! This module defines the wire format of vouchers, of the payment header that
//! carries them, and of the scheme-specific `extra` field of payment requirements.

use alloy_primitives::{B256, Bytes, U256};
use serde::{Deserialize, Serialize};
use x402_types::lit_str;
use x402_types::proto::v1;
use x402_types::timestamp::UnixTimestamp;

use crate::chain::{ChecksummedAddress, Eip155ChainReference, decimal_u256};
use crate::chain::{normalize_address, parse_decimal_u256};
use crate::v1_eip155_deferred::DeferredError;

lit_str!(DeferredScheme, "deferred");

/// Payment requirements as received from the seller, before scheme decoding.
pub type PaymentRequirements = v1::PaymentRequirements;

/// The payment header envelope: `x402Version`, `scheme`, `network` and the voucher payload.
///
/// The version is whatever integer the buyer states; the voucher format does
/// not depend on it.
pub type PaymentHeader = v1::PaymentPayload<DeferredScheme, DeferredEvmPayload, u32>;

/// Payload of a deferred payment header: the latest voucher and, once signed, its signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeferredEvmPayload {
    /// `0x`-prefixed 65-byte ECDSA signature over the voucher's typed data,
    /// `null` until the buyer signs.
    pub signature: Option<Bytes>,
    pub voucher: Voucher,
}

/// A deferred payment obligation from `buyer` to `seller`.
///
/// `id`, `seller`, `asset`, `escrow` and `chain_id` never change across a
/// lineage. Each aggregation produces a new voucher with `nonce + 1`, a larger
/// (or equal) `value_aggregate`, a fresh `timestamp` and `expiry = timestamp + 30 days`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub id: B256,
    pub buyer: ChecksummedAddress,
    pub seller: ChecksummedAddress,
    /// Total value owed across the lineage, in the asset's smallest unit.
    #[serde(with = "decimal_u256")]
    pub value_aggregate: U256,
    pub asset: ChecksummedAddress,
    pub timestamp: UnixTimestamp,
    pub nonce: u64,
    /// Escrow contract that settles the voucher; also the EIP-712 verifying contract.
    pub escrow: ChecksummedAddress,
    pub chain_id: u64,
    pub expiry: UnixTimestamp,
}

/// Seed for the first voucher of a lineage, chosen by the seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVoucherSeed {
    pub id: B256,
    pub escrow: ChecksummedAddress,
}

/// The `extra` field of deferred payment requirements.
///
/// ```json
/// { "type": "new", "voucher": { "id": "0x…", "escrow": "0x…" } }
/// { "type": "aggregation", "signature": "0x…", "voucher": { …prior voucher… } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DeferredRequirementsExtra {
    /// Start a new lineage.
    New { voucher: NewVoucherSeed },
    /// Extend the lineage of a previously signed voucher.
    Aggregation { signature: Bytes, voucher: Voucher },
}

impl DeferredRequirementsExtra {
    pub const TYPE_NEW: &'static str = "new";
    pub const TYPE_AGGREGATION: &'static str = "aggregation";

    /// Decodes the raw `extra` JSON of payment requirements.
    ///
    /// Unlike plain deserialization, this tells a missing or unknown `type`
    /// ([`DeferredError::MalformedRequirements`]) apart from an incomplete new
    /// voucher seed ([`DeferredError::InvalidVoucherSeed`]).
    pub fn from_extra(extra: Option<&serde_json::Value>) -> Result<Self, DeferredError> {
        let extra = extra.and_then(|extra| extra.as_object()).ok_or_else(|| {
            DeferredError::MalformedRequirements("extra must be an object".to_string())
        })?;
        let extra_type = extra
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| {
                DeferredError::MalformedRequirements(
                    "extra must contain 'type' field".to_string(),
                )
            })?;
        match extra_type {
            Self::TYPE_NEW => {
                let seed = extra.get("voucher").and_then(|v| v.as_object()).ok_or_else(|| {
                    DeferredError::InvalidVoucherSeed("missing voucher".to_string())
                })?;
                let id = seed
                    .get("id")
                    .and_then(|id| id.as_str())
                    .ok_or_else(|| DeferredError::InvalidVoucherSeed("missing id".to_string()))?;
                let escrow = seed.get("escrow").and_then(|e| e.as_str()).ok_or_else(|| {
                    DeferredError::InvalidVoucherSeed("missing escrow".to_string())
                })?;
                let id = id
                    .parse::<B256>()
                    .map_err(|e| DeferredError::InvalidVoucherSeed(format!("id: {e}")))?;
                let escrow = normalize_address(escrow)
                    .map_err(|e| DeferredError::InvalidVoucherSeed(format!("escrow: {e}")))?;
                Ok(DeferredRequirementsExtra::New {
                    voucher: NewVoucherSeed { id, escrow },
                })
            }
            Self::TYPE_AGGREGATION => {
                let extra = serde_json::Value::Object(extra.clone());
                serde_json::from_value(extra).map_err(|e| {
                    DeferredError::MalformedRequirements(format!(
                        "Invalid extra data for voucher aggregation: {e}"
                    ))
                })
            }
            other => Err(DeferredError::MalformedRequirements(format!(
                "Unknown voucher type: {other}"
            ))),
        }
    }
}

/// Payment requirements with the deferred `extra` decoded.
///
/// Only the scheme and `extra` are checked up front. `payTo`, `asset`, the
/// network and the amount stay as received and are resolved on use, so the
/// voucher checks report the first mismatch in their own order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredRequirements {
    pub network: String,
    /// Charge for this access, in the asset's smallest unit, as a decimal string.
    pub max_amount_required: String,
    pub pay_to: String,
    pub asset: String,
    pub extra: DeferredRequirementsExtra,
}

impl DeferredRequirements {
    /// The charge as an integer. Fails with [`DeferredError::InvalidAmount`].
    pub fn amount(&self) -> Result<U256, DeferredError> {
        parse_decimal_u256(&self.max_amount_required)
            .map_err(|e| DeferredError::InvalidAmount(e.to_string()))
    }

    /// The seller address. Fails with [`DeferredError::InvalidAddress`].
    pub fn pay_to_address(&self) -> Result<ChecksummedAddress, DeferredError> {
        normalize_address(&self.pay_to)
            .map_err(|e| DeferredError::InvalidAddress(format!("payTo: {e}")))
    }

    /// The token address. Fails with [`DeferredError::InvalidAddress`].
    pub fn asset_address(&self) -> Result<ChecksummedAddress, DeferredError> {
        normalize_address(&self.asset)
            .map_err(|e| DeferredError::InvalidAddress(format!("asset: {e}")))
    }

    /// The chain the network name maps to. Fails with [`DeferredError::UnknownNetwork`].
    pub fn chain_reference(&self) -> Result<Eip155ChainReference, DeferredError> {
        Eip155ChainReference::from_network_name(&self.network)
            .map_err(|e| DeferredError::UnknownNetwork(e.to_string()))
    }
}

impl TryFrom<&PaymentRequirements> for DeferredRequirements {
    type Error = DeferredError;

    fn try_from(requirements: &PaymentRequirements) -> Result<Self, Self::Error> {
        if requirements.scheme != DeferredScheme::VALUE {
            return Err(DeferredError::MalformedRequirements(format!(
                "expected scheme '{}', got '{}'",
                DeferredScheme::VALUE,
                requirements.scheme
            )));
        }
        let extra = DeferredRequirementsExtra::from_extra(requirements.extra.as_ref())?;
        Ok(DeferredRequirements {
            network: requirements.network.clone(),
            max_amount_required: requirements.max_amount_required.clone(),
            pay_to: requirements.pay_to.clone(),
            asset: requirements.asset.clone(),
            extra,
        })
    }
}
