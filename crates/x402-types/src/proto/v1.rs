//! Protocol version 1 (V1) types for x402.
//!
//! V1 names networks by their human-readable name (e.g., "base-sepolia") rather
//! than a CAIP-2 chain ID.
//!
//! # Key Types
//!
//! - [`X402Version1`] - Version marker that serializes as `1`
//! - [`PaymentPayload`] - Payment authorization from the buyer (the payment header)
//! - [`PaymentRequirements`] - Payment terms set by the seller

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::Display;

/// Version marker for x402 protocol version 1.
///
/// This type serializes as the integer `1` and is used to identify V1 protocol
/// messages in the wire format.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct X402Version1;

impl X402Version1 {
    pub const VALUE: u8 = 1;
}

impl Serialize for X402Version1 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(Self::VALUE)
    }
}

impl<'de> Deserialize<'de> for X402Version1 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let num = u8::deserialize(deserializer)?;
        if num == Self::VALUE {
            Ok(X402Version1)
        } else {
            Err(serde::de::Error::custom(format!(
                "expected version {}, got {}",
                Self::VALUE,
                num
            )))
        }
    }
}

impl Display for X402Version1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::VALUE)
    }
}

/// A payment authorization from the buyer, as carried in the payment header.
///
/// # Type Parameters
///
/// - `TScheme` - The scheme identifier type (default: `String`)
/// - `TPayload` - The scheme-specific payload type (default: raw JSON)
/// - `TVersion` - The `x402Version` type (default: [`X402Version1`], which only
///   accepts `1`; use an integer to carry whatever version the caller states)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload<
    TScheme = String,
    TPayload = serde_json::Value,
    TVersion = X402Version1,
> {
    /// Protocol version.
    pub x402_version: TVersion,
    /// The payment scheme (e.g., "deferred").
    pub scheme: TScheme,
    /// The network name (e.g., "base-sepolia").
    pub network: String,
    /// The scheme-specific payload.
    pub payload: TPayload,
}

/// Payment requirements set by the seller.
///
/// Defines the terms under which a payment will be accepted, including
/// the amount, recipient, asset, and scheme-specific extra data.
///
/// # Type Parameters
///
/// - `TScheme` - The scheme identifier type (default: `String`)
/// - `TAmount` - The amount type (default: `String`)
/// - `TAddress` - The address type (default: `String`)
/// - `TExtra` - Scheme-specific extra data type (default: `serde_json::Value`)
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements<
    TScheme = String,
    TAmount = String,
    TAddress = String,
    TExtra = serde_json::Value,
> {
    /// The payment scheme (e.g., "deferred").
    pub scheme: TScheme,
    /// The network name (e.g., "base-sepolia").
    pub network: String,
    /// The amount charged for this access.
    pub max_amount_required: TAmount,
    /// The resource URL being paid for.
    pub resource: String,
    /// Human-readable description of the resource.
    #[serde(default)]
    pub description: String,
    /// MIME type of the resource.
    #[serde(default)]
    pub mime_type: String,
    /// Optional JSON schema for the resource output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<serde_json::Value>,
    /// The recipient address for payment.
    pub pay_to: TAddress,
    /// Maximum time in seconds for payment validity.
    pub max_timeout_seconds: u64,
    /// The token asset address.
    pub asset: TAddress,
    /// Scheme-specific extra data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<TExtra>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_version_marker() {
        assert_eq!(serde_json::to_string(&X402Version1).unwrap(), "1");
        assert!(serde_json::from_str::<X402Version1>("1").is_ok());
        assert!(serde_json::from_str::<X402Version1>("2").is_err());
    }

    #[test]
    fn test_payload_version_type() {
        let raw = json!({
            "x402Version": 2,
            "scheme": "deferred",
            "network": "base-sepolia",
            "payload": {}
        });
        assert!(serde_json::from_value::<PaymentPayload>(raw.clone()).is_err());
        let payload: PaymentPayload<String, serde_json::Value, u32> =
            serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(payload.x402_version, 2);
        assert_eq!(serde_json::to_value(&payload).unwrap(), raw);
    }

    #[test]
    fn test_requirements_camel_case() {
        let requirements: PaymentRequirements = serde_json::from_value(json!({
            "scheme": "deferred",
            "network": "base-sepolia",
            "maxAmountRequired": "1000",
            "resource": "/api/test",
            "payTo": "0xA1c7BF3d421E8a54D39fBbe13f9f826e5B2C8E3D",
            "maxTimeoutSeconds": 300,
            "asset": "0x081827b8c3aa05287b5aa2bc3051fbe638f33152"
        }))
        .unwrap();
        assert_eq!(requirements.max_amount_required, "1000");
        assert_eq!(requirements.description, "");
        assert!(requirements.extra.is_none());

        let value = serde_json::to_value(&requirements).unwrap();
        assert!(value.get("extra").is_none());
        assert_eq!(value["payTo"], "0xA1c7BF3d421E8a54D39fBbe13f9f826e5B2C8E3D");
    }
}
