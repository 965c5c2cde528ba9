//! Transport encoding of payment headers.
//!
//! A header travels as its JSON rendering, base64-encoded with the URL-safe
//! alphabet and no padding. `decode_payment(&encode_payment(h)?)? == h` holds
//! for every header, signed or not.

use x402_types::util::Base64Bytes;

use crate::v1_eip155_deferred::{DeferredError, PaymentHeader};

/// Encodes a payment header into the opaque string placed in the payment request header.
pub fn encode_payment(header: &PaymentHeader) -> Result<String, DeferredError> {
    let json = serde_json::to_vec(header)?;
    let b64 = Base64Bytes::encode(&json);
    Ok(b64.to_string())
}

/// Decodes a string produced by [`encode_payment`].
pub fn decode_payment(encoded: &str) -> Result<PaymentHeader, DeferredError> {
    let json = Base64Bytes::from(encoded.trim())
        .decode()
        .map_err(|e| DeferredError::DecodeFailure(format!("invalid base64: {e}")))?;
    serde_json::from_slice(&json)
        .map_err(|e| DeferredError::DecodeFailure(format!("invalid payment header: {e}")))
}
