//! Voucher lifecycle: creation, validation and aggregation.
//!
//! A lineage starts with [`create_new_voucher`] when the seller hands out a
//! `type: "new"` seed, and grows by one voucher per paid request through
//! [`aggregate_voucher`] when the seller echoes back the last signed voucher.
//! The receiving side runs the same checks through [`verify_payment_header`].
//!
//! All functions are pure apart from reading the clock; each has an `_at`
//! variant taking the current time explicitly.

use alloy_primitives::Address;
use x402_types::timestamp::UnixTimestamp;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::chain::{ChecksummedAddress, addresses_equal};
use crate::v1_eip155_deferred::{
    DeferredError, DeferredEvmPayload, DeferredRequirements, DeferredRequirementsExtra,
    DeferredScheme, NewVoucherSeed, PaymentHeader, PaymentRequirements, SignerRecovery, Voucher,
    verify_voucher,
};

/// Lifetime of a voucher from its latest timestamp: 30 days, in seconds.
pub const EXPIRY_TIME: u64 = 30 * 24 * 60 * 60;

/// Creates the first voucher of a lineage.
///
/// `requirements.extra` must carry a `type: "new"` seed.
pub fn create_new_voucher(
    buyer: Address,
    requirements: &PaymentRequirements,
) -> Result<Voucher, DeferredError> {
    create_new_voucher_at(buyer, requirements, UnixTimestamp::now())
}

/// [`create_new_voucher`] with an explicit current time.
#[cfg_attr(feature = "telemetry", instrument(skip_all, err))]
pub fn create_new_voucher_at(
    buyer: Address,
    requirements: &PaymentRequirements,
    now: UnixTimestamp,
) -> Result<Voucher, DeferredError> {
    let requirements = DeferredRequirements::try_from(requirements)?;
    match &requirements.extra {
        DeferredRequirementsExtra::New { voucher: seed } => {
            new_voucher(buyer, &requirements, seed, now)
        }
        DeferredRequirementsExtra::Aggregation { .. } => {
            Err(DeferredError::MalformedRequirements(format!(
                "expected extra type '{}'",
                DeferredRequirementsExtra::TYPE_NEW
            )))
        }
    }
}

/// The amount is taken by integer value, so `"007"` yields a voucher worth 7
/// that renders as `"7"` on the wire.
fn new_voucher(
    buyer: Address,
    requirements: &DeferredRequirements,
    seed: &NewVoucherSeed,
    now: UnixTimestamp,
) -> Result<Voucher, DeferredError> {
    let voucher = Voucher {
        id: seed.id,
        buyer: ChecksummedAddress(buyer),
        seller: requirements.pay_to_address()?,
        value_aggregate: requirements.amount()?,
        asset: requirements.asset_address()?,
        timestamp: now,
        nonce: 0,
        escrow: seed.escrow,
        chain_id: requirements.chain_reference()?.inner(),
        expiry: now + EXPIRY_TIME,
    };
    #[cfg(feature = "telemetry")]
    tracing::debug!(
        id = %voucher.id,
        buyer = %voucher.buyer,
        seller = %voucher.seller,
        value = %voucher.value_aggregate,
        "created new voucher"
    );
    Ok(voucher)
}

/// Checks a signed voucher against payment requirements.
///
/// Checks run in this order and the first failure is returned:
///
/// 1. `payTo` matches the voucher's seller ([`DeferredError::InvalidSeller`],
///    also when `payTo` is not an address)
/// 2. `asset` matches the voucher's asset ([`DeferredError::InvalidAsset`],
///    also when `asset` is not an address)
/// 3. the network is known ([`DeferredError::UnknownNetwork`]) and its chain id
///    matches the voucher's ([`DeferredError::InvalidChainId`])
/// 4. `now` is not past the expiry ([`DeferredError::VoucherExpired`])
/// 5. `now` is not before the timestamp ([`DeferredError::VoucherTimestampInFuture`])
/// 6. the signature recovers to `signer` ([`DeferredError::InvalidVoucherSignature`])
pub fn validate_voucher<R: SignerRecovery + ?Sized>(
    requirements: &DeferredRequirements,
    voucher: &Voucher,
    signature: &[u8],
    signer: Address,
    recovery: &R,
    now: UnixTimestamp,
) -> Result<(), DeferredError> {
    if !addresses_equal(&requirements.pay_to, &voucher.seller.to_string()) {
        return Err(rejected(DeferredError::InvalidSeller));
    }
    if !addresses_equal(&requirements.asset, &voucher.asset.to_string()) {
        return Err(rejected(DeferredError::InvalidAsset));
    }
    if requirements.chain_reference().map_err(rejected)?.inner() != voucher.chain_id {
        return Err(rejected(DeferredError::InvalidChainId));
    }
    if now > voucher.expiry {
        return Err(rejected(DeferredError::VoucherExpired));
    }
    if now < voucher.timestamp {
        return Err(rejected(DeferredError::VoucherTimestampInFuture));
    }
    match verify_voucher(recovery, voucher, signature, signer) {
        Ok(true) => Ok(()),
        Ok(false) | Err(_) => Err(rejected(DeferredError::InvalidVoucherSignature)),
    }
}

fn rejected(error: DeferredError) -> DeferredError {
    #[cfg(feature = "telemetry")]
    tracing::warn!(%error, "voucher rejected");
    error
}

/// Extends a signed voucher with the charge of the current requirements.
///
/// `requirements.extra` must carry a `type: "aggregation"` payload with the
/// prior voucher and its signature, which must have been made by `buyer`.
pub fn aggregate_voucher<R: SignerRecovery + ?Sized>(
    buyer: Address,
    requirements: &PaymentRequirements,
    recovery: &R,
) -> Result<Voucher, DeferredError> {
    aggregate_voucher_at(buyer, requirements, recovery, UnixTimestamp::now())
}

/// [`aggregate_voucher`] with an explicit current time.
#[cfg_attr(feature = "telemetry", instrument(skip_all, err))]
pub fn aggregate_voucher_at<R: SignerRecovery + ?Sized>(
    buyer: Address,
    requirements: &PaymentRequirements,
    recovery: &R,
    now: UnixTimestamp,
) -> Result<Voucher, DeferredError> {
    let requirements = DeferredRequirements::try_from(requirements)?;
    match &requirements.extra {
        DeferredRequirementsExtra::Aggregation { signature, voucher } => {
            merge_voucher(buyer, &requirements, voucher, signature, recovery, now)
        }
        DeferredRequirementsExtra::New { .. } => {
            Err(DeferredError::MalformedRequirements(format!(
                "expected extra type '{}'",
                DeferredRequirementsExtra::TYPE_AGGREGATION
            )))
        }
    }
}

fn merge_voucher<R: SignerRecovery + ?Sized>(
    buyer: Address,
    requirements: &DeferredRequirements,
    prior: &Voucher,
    signature: &[u8],
    recovery: &R,
    now: UnixTimestamp,
) -> Result<Voucher, DeferredError> {
    validate_voucher(requirements, prior, signature, buyer, recovery, now)?;
    let value_aggregate = prior
        .value_aggregate
        .checked_add(requirements.amount()?)
        .ok_or_else(|| {
            DeferredError::InvalidAmount("aggregated value exceeds uint256".to_string())
        })?;
    let nonce = prior.nonce.checked_add(1).ok_or_else(|| {
        DeferredError::MalformedRequirements("voucher nonce is exhausted".to_string())
    })?;
    let voucher = Voucher {
        id: prior.id,
        buyer: ChecksummedAddress(buyer),
        seller: prior.seller,
        value_aggregate,
        asset: prior.asset,
        timestamp: now,
        nonce,
        escrow: prior.escrow,
        chain_id: prior.chain_id,
        expiry: now + EXPIRY_TIME,
    };
    #[cfg(feature = "telemetry")]
    tracing::debug!(
        id = %voucher.id,
        nonce = voucher.nonce,
        value = %voucher.value_aggregate,
        "aggregated voucher"
    );
    Ok(voucher)
}

/// Builds the unsigned payment header for requirements, creating or
/// aggregating a voucher depending on `extra.type`.
///
/// `x402_version` is stamped on the header as given.
pub fn prepare_payment_header<R: SignerRecovery + ?Sized>(
    buyer: Address,
    x402_version: u32,
    requirements: &PaymentRequirements,
    recovery: &R,
) -> Result<PaymentHeader, DeferredError> {
    prepare_payment_header_at(
        buyer,
        x402_version,
        requirements,
        recovery,
        UnixTimestamp::now(),
    )
}

/// [`prepare_payment_header`] with an explicit current time.
#[cfg_attr(feature = "telemetry", instrument(skip_all, err))]
pub fn prepare_payment_header_at<R: SignerRecovery + ?Sized>(
    buyer: Address,
    x402_version: u32,
    requirements: &PaymentRequirements,
    recovery: &R,
    now: UnixTimestamp,
) -> Result<PaymentHeader, DeferredError> {
    let decoded = DeferredRequirements::try_from(requirements)?;
    let voucher = match &decoded.extra {
        DeferredRequirementsExtra::New { voucher: seed } => {
            new_voucher(buyer, &decoded, seed, now)?
        }
        DeferredRequirementsExtra::Aggregation { signature, voucher } => {
            merge_voucher(buyer, &decoded, voucher, signature, recovery, now)?
        }
    };
    Ok(PaymentHeader {
        x402_version,
        scheme: DeferredScheme,
        network: decoded.network,
        payload: DeferredEvmPayload {
            signature: None,
            voucher,
        },
    })
}

/// Verifies a received payment header against the requirements it pays for.
///
/// Returns the buyer whose signature backs the voucher.
pub fn verify_payment_header<R: SignerRecovery + ?Sized>(
    header: &PaymentHeader,
    requirements: &PaymentRequirements,
    recovery: &R,
) -> Result<Address, DeferredError> {
    verify_payment_header_at(header, requirements, recovery, UnixTimestamp::now())
}

/// [`verify_payment_header`] with an explicit current time.
#[cfg_attr(feature = "telemetry", instrument(skip_all, err))]
pub fn verify_payment_header_at<R: SignerRecovery + ?Sized>(
    header: &PaymentHeader,
    requirements: &PaymentRequirements,
    recovery: &R,
    now: UnixTimestamp,
) -> Result<Address, DeferredError> {
    if header.network != requirements.network {
        return Err(DeferredError::MalformedRequirements(format!(
            "header network '{}' does not match requirements network '{}'",
            header.network, requirements.network
        )));
    }
    let decoded = DeferredRequirements::try_from(requirements)?;
    let signature = header
        .payload
        .signature
        .as_ref()
        .ok_or_else(|| rejected(DeferredError::InvalidVoucherSignature))?;
    let voucher = &header.payload.voucher;
    let buyer = voucher.buyer.inner();
    validate_voucher(&decoded, voucher, signature, buyer, recovery, now)?;
    #[cfg(feature = "telemetry")]
    tracing::debug!(id = %voucher.id, nonce = voucher.nonce, buyer = %voucher.buyer, "verified voucher");
    Ok(buyer)
}
