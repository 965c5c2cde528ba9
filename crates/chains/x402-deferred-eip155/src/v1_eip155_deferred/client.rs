//! Buyer-side payment signing for the V1 EIP-155 "deferred" scheme.
//!
//! # Usage
//!
//! ```ignore
//! use x402_deferred_eip155::v1_eip155_deferred::V1Eip155DeferredClient;
//! use alloy_signer_local::PrivateKeySigner;
//!
//! let signer = PrivateKeySigner::random();
//! let client = V1Eip155DeferredClient::new(signer);
//! let header_value = client.pay(&requirements)?;
//! ```

use x402_types::proto::v1::X402Version1;
use x402_types::timestamp::UnixTimestamp;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::v1_eip155_deferred::{
    DeferredError, Ecrecover, PaymentHeader, PaymentRequirements, SignerLike, SignerRecovery,
    VoucherTypedData, encode_payment, prepare_payment_header_at, sign_typed_data,
};

/// Signs the voucher of `header`, stores the signature and encodes the header
/// for transport.
///
/// Any failure is reported as [`DeferredError::SigningFailure`] naming the
/// voucher and network being signed.
#[cfg_attr(feature = "telemetry", instrument(skip_all, err))]
pub fn sign_payment_header<S: SignerLike + ?Sized>(
    signer: &S,
    header: &mut PaymentHeader,
) -> Result<String, DeferredError> {
    let typed_data = VoucherTypedData::new(&header.payload.voucher);
    let signature = sign_typed_data(signer, &typed_data, || signing_context(header))?;
    header.payload.signature = Some(signature);
    encode_payment(header).map_err(|e| DeferredError::SigningFailure {
        context: signing_context(header),
        source: Box::new(e),
    })
}

fn signing_context(header: &PaymentHeader) -> String {
    format!(
        "payment header for voucher {} on {}",
        header.payload.voucher.id, header.network
    )
}

/// Client for paying with deferred vouchers.
///
/// The buyer is the signer's own address. `R` recovers prior voucher signers
/// during aggregation and defaults to secp256k1 [`Ecrecover`].
///
/// # Type Parameters
///
/// - `S`: The signer type, which must implement [`SignerLike`]
/// - `R`: The signature recovery backend, which must implement [`SignerRecovery`]
#[derive(Debug)]
pub struct V1Eip155DeferredClient<S, R = Ecrecover> {
    signer: S,
    recovery: R,
}

impl<S> V1Eip155DeferredClient<S> {
    /// Creates a client recovering signatures with [`Ecrecover`].
    pub fn new(signer: S) -> Self {
        Self {
            signer,
            recovery: Ecrecover,
        }
    }
}

impl<S, R> V1Eip155DeferredClient<S, R> {
    /// Creates a client with a custom recovery backend.
    pub fn with_recovery(signer: S, recovery: R) -> Self {
        Self { signer, recovery }
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }
}

impl<S, R> V1Eip155DeferredClient<S, R>
where
    S: SignerLike,
    R: SignerRecovery,
{
    /// Builds the unsigned header paying for `requirements`, stamped with
    /// protocol version 1.
    pub fn prepare(
        &self,
        requirements: &PaymentRequirements,
    ) -> Result<PaymentHeader, DeferredError> {
        self.prepare_at(requirements, UnixTimestamp::now())
    }

    /// [`Self::prepare`] with an explicit current time.
    pub fn prepare_at(
        &self,
        requirements: &PaymentRequirements,
        now: UnixTimestamp,
    ) -> Result<PaymentHeader, DeferredError> {
        prepare_payment_header_at(
            self.signer.address(),
            X402Version1::VALUE.into(),
            requirements,
            &self.recovery,
            now,
        )
    }

    /// Builds, signs and encodes the header paying for `requirements`.
    pub fn pay(&self, requirements: &PaymentRequirements) -> Result<String, DeferredError> {
        self.pay_at(requirements, UnixTimestamp::now())
    }

    /// [`Self::pay`] with an explicit current time.
    pub fn pay_at(
        &self,
        requirements: &PaymentRequirements,
        now: UnixTimestamp,
    ) -> Result<String, DeferredError> {
        let mut header = self.prepare_at(requirements, now)?;
        sign_payment_header(&self.signer, &mut header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::v1_eip155_deferred::{decode_payment, verify_payment_header_at};
    use alloy_primitives::{Address, B256, Signature};
    use alloy_signer_local::PrivateKeySigner;
    use serde_json::json;
    use std::str::FromStr;
    use std::sync::Arc;

    const KEY_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const T0: u64 = 1_700_000_000;

    fn requirements(extra: serde_json::Value, amount: &str) -> PaymentRequirements {
        PaymentRequirements {
            scheme: "deferred".to_string(),
            network: "base-sepolia".to_string(),
            max_amount_required: amount.to_string(),
            resource: "https://api.example.com/premium".to_string(),
            description: "Premium API".to_string(),
            mime_type: "application/json".to_string(),
            output_schema: None,
            pay_to: "0xA1c7BF3d421E8a54D39fBbe13f9f826e5B2C8E3D".to_string(),
            max_timeout_seconds: 60,
            asset: "0x081827b8C3Aa05287b5aA2bC3051fbE638F33152".to_string(),
            extra: Some(extra),
        }
    }

    fn new_extra() -> serde_json::Value {
        json!({
            "type": "new",
            "voucher": {
                "id": format!("0x{}", "cd".repeat(32)),
                "escrow": "0x7Cb1a5A2a2c9E91B76914c0A7b7FB3aeFF3BCA27",
            }
        })
    }

    struct FailingSigner;

    impl SignerLike for FailingSigner {
        fn address(&self) -> Address {
            Address::repeat_byte(0x01)
        }

        fn sign_hash(&self, _hash: &B256) -> Result<Signature, alloy_signer::Error> {
            Err(alloy_signer::Error::other("key locked"))
        }
    }

    #[test]
    fn test_pay_then_aggregate() {
        let client = V1Eip155DeferredClient::new(PrivateKeySigner::from_str(KEY_A).unwrap());
        let first_reqs = requirements(new_extra(), "1000000000000000000");
        let first = client
            .pay_at(&first_reqs, UnixTimestamp::from_secs(T0))
            .unwrap();

        let first = decode_payment(&first).unwrap();
        let buyer = verify_payment_header_at(
            &first,
            &first_reqs,
            &Ecrecover,
            UnixTimestamp::from_secs(T0 + 1),
        )
        .unwrap();
        assert_eq!(buyer, client.signer().address());

        let signature = first.payload.signature.clone().unwrap();
        let second_reqs = requirements(
            json!({
                "type": "aggregation",
                "signature": signature,
                "voucher": first.payload.voucher,
            }),
            "500000000000000000",
        );
        let second = client
            .pay_at(&second_reqs, UnixTimestamp::from_secs(T0 + 60))
            .unwrap();
        let second = decode_payment(&second).unwrap();
        assert_eq!(second.payload.voucher.nonce, 1);
        assert_eq!(
            second.payload.voucher.value_aggregate.to_string(),
            "1500000000000000000"
        );
        assert!(
            verify_payment_header_at(
                &second,
                &second_reqs,
                &Ecrecover,
                UnixTimestamp::from_secs(T0 + 61)
            )
            .is_ok()
        );
    }

    #[test]
    fn test_prepare_is_unsigned() {
        let client = V1Eip155DeferredClient::new(Arc::new(PrivateKeySigner::from_str(KEY_A).unwrap()));
        let header = client
            .prepare_at(&requirements(new_extra(), "1"), UnixTimestamp::from_secs(T0))
            .unwrap();
        assert!(header.payload.signature.is_none());
        assert_eq!(header.x402_version, 1);
        assert_eq!(header.payload.voucher.buyer, client.signer().address());
    }

    #[test]
    fn test_signing_failure_names_voucher_and_network() {
        let client = V1Eip155DeferredClient::new(FailingSigner);
        let err = client
            .pay_at(&requirements(new_extra(), "1"), UnixTimestamp::from_secs(T0))
            .unwrap_err();
        match err {
            DeferredError::SigningFailure { context, source } => {
                assert!(context.contains("base-sepolia"));
                assert!(context.contains(&"cd".repeat(32)));
                assert!(source.to_string().contains("key locked"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_requirement_errors_pass_through() {
        let client = V1Eip155DeferredClient::new(PrivateKeySigner::from_str(KEY_A).unwrap());
        let result = client.pay_at(
            &requirements(json!({ "type": "bogus" }), "1"),
            UnixTimestamp::from_secs(T0),
        );
        assert!(matches!(
            result,
            Err(DeferredError::MalformedRequirements(_))
        ));
    }
}
