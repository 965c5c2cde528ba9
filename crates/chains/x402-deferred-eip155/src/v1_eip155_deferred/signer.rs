//! Signing and signer recovery for voucher typed data.
//!
//! Two capabilities sit behind traits so the voucher logic does not care which
//! cryptographic backend is underneath:
//!
//! - [`SignerLike`] signs a 32-byte EIP-712 digest (a local key, a wallet, an HSM…)
//! - [`SignerRecovery`] recovers the signing address from a digest and a signature
//!   ([`Ecrecover`] is the secp256k1 implementation)
//!
//! Signatures travel as `0x`-prefixed hex of the 65-byte `(r, s, v)` encoding.

use alloy_primitives::{Address, B256, Bytes, Signature, SignatureError};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use std::sync::Arc;

use crate::v1_eip155_deferred::{DeferredError, Voucher, VoucherTypedData};

/// A trait that abstracts signing operations, allowing both owned signers and Arc-wrapped signers.
///
/// Signing is synchronous: voucher signing sits on the request path and local
/// keys never need to wait on I/O.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use alloy_signer_local::PrivateKeySigner;
///
/// let signer: PrivateKeySigner = ...;
/// let signer = Arc::new(signer);
/// // Now you can use `signer` anywhere `SignerLike` is expected
/// ```
pub trait SignerLike {
    /// Returns the address of the signer.
    fn address(&self) -> Address;

    /// Signs the given hash.
    fn sign_hash(&self, hash: &B256) -> Result<Signature, alloy_signer::Error>;
}

impl SignerLike for PrivateKeySigner {
    fn address(&self) -> Address {
        PrivateKeySigner::address(self)
    }

    fn sign_hash(&self, hash: &B256) -> Result<Signature, alloy_signer::Error> {
        SignerSync::sign_hash_sync(self, hash)
    }
}

impl<T: SignerLike + ?Sized> SignerLike for Arc<T> {
    fn address(&self) -> Address {
        (**self).address()
    }

    fn sign_hash(&self, hash: &B256) -> Result<Signature, alloy_signer::Error> {
        (**self).sign_hash(hash)
    }
}

impl<T: SignerLike + ?Sized> SignerLike for &T {
    fn address(&self) -> Address {
        (**self).address()
    }

    fn sign_hash(&self, hash: &B256) -> Result<Signature, alloy_signer::Error> {
        (**self).sign_hash(hash)
    }
}

/// Recovers the address that produced a signature over a digest.
pub trait SignerRecovery {
    fn recover_address(&self, hash: &B256, signature: &Signature)
    -> Result<Address, SignatureError>;
}

/// secp256k1 public key recovery, as done by `ecrecover` on-chain.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ecrecover;

impl SignerRecovery for Ecrecover {
    fn recover_address(
        &self,
        hash: &B256,
        signature: &Signature,
    ) -> Result<Address, SignatureError> {
        signature.recover_address_from_prehash(hash)
    }
}

impl<T: SignerRecovery + ?Sized> SignerRecovery for Arc<T> {
    fn recover_address(
        &self,
        hash: &B256,
        signature: &Signature,
    ) -> Result<Address, SignatureError> {
        (**self).recover_address(hash, signature)
    }
}

impl<T: SignerRecovery + ?Sized> SignerRecovery for &T {
    fn recover_address(
        &self,
        hash: &B256,
        signature: &Signature,
    ) -> Result<Address, SignatureError> {
        (**self).recover_address(hash, signature)
    }
}

/// Signs typed data, returning the 65-byte signature.
///
/// `context` names what is being signed and ends up in
/// [`DeferredError::SigningFailure`] if the backend fails.
pub fn sign_typed_data<S: SignerLike + ?Sized>(
    signer: &S,
    typed_data: &VoucherTypedData,
    context: impl FnOnce() -> String,
) -> Result<Bytes, DeferredError> {
    let signature = signer
        .sign_hash(&typed_data.signing_hash())
        .map_err(|e| DeferredError::SigningFailure {
            context: context(),
            source: Box::new(e),
        })?;
    Ok(Bytes::from(signature.as_bytes()))
}

/// Signs a voucher's typed data.
pub fn sign_voucher<S: SignerLike + ?Sized>(
    signer: &S,
    voucher: &Voucher,
) -> Result<Bytes, DeferredError> {
    let typed_data = VoucherTypedData::new(voucher);
    sign_typed_data(signer, &typed_data, || format!("voucher {}", voucher.id))
}

/// Recovers the signer of typed data.
///
/// Fails with [`DeferredError::InvalidSignatureFormat`] if `signature` is not a
/// 65-byte ECDSA signature or does not admit a public key.
pub fn recover_signer<R: SignerRecovery + ?Sized>(
    recovery: &R,
    typed_data: &VoucherTypedData,
    signature: &[u8],
) -> Result<Address, DeferredError> {
    let signature = Signature::try_from(signature)
        .map_err(|e| DeferredError::InvalidSignatureFormat(e.to_string()))?;
    recovery
        .recover_address(&typed_data.signing_hash(), &signature)
        .map_err(|e| DeferredError::InvalidSignatureFormat(e.to_string()))
}

/// Checks that `signature` over `voucher` was produced by `signer`.
///
/// A well-formed signature by anyone else yields `Ok(false)`; only a malformed
/// signature is an error.
pub fn verify_voucher<R: SignerRecovery + ?Sized>(
    recovery: &R,
    voucher: &Voucher,
    signature: &[u8],
    signer: Address,
) -> Result<bool, DeferredError> {
    let typed_data = VoucherTypedData::new(voucher);
    let recovered = recover_signer(recovery, &typed_data, signature)?;
    Ok(recovered == signer)
}
