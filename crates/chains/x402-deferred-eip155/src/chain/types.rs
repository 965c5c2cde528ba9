//! Wire format types for EVM chain interactions.
//!
//! This module provides types that handle serialization and deserialization
//! of EVM-specific values in the x402 protocol wire format, and the two
//! validators every scheme operation leans on: address normalization and
//! decimal amount parsing.

use alloy_primitives::{Address, U256, hex};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use x402_types::chain::ChainId;

/// An Ethereum address that serializes with EIP-55 checksum encoding.
///
/// Parsing accepts any letter case, so `0xabc…`, `0xABC…` and the checksummed
/// form all produce the same value. Equality is equality of the underlying 20
/// bytes, which makes every comparison between two `ChecksummedAddress`es
/// case-insensitive by construction.
///
/// # Example
///
/// ```
/// use x402_deferred_eip155::chain::ChecksummedAddress;
///
/// let addr: ChecksummedAddress = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045".parse().unwrap();
/// assert_eq!(addr.to_string(), "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ChecksummedAddress(pub Address);

impl FromStr for ChecksummedAddress {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let address = Address::from_str(s.trim())?;
        Ok(Self(address))
    }
}

impl Display for ChecksummedAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_checksum(None))
    }
}

impl Serialize for ChecksummedAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_checksum(None))
    }
}

impl<'de> Deserialize<'de> for ChecksummedAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl From<ChecksummedAddress> for Address {
    fn from(value: ChecksummedAddress) -> Self {
        value.0
    }
}

impl From<Address> for ChecksummedAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl PartialEq<ChecksummedAddress> for Address {
    fn eq(&self, other: &ChecksummedAddress) -> bool {
        self.eq(&other.0)
    }
}

impl PartialEq<Address> for ChecksummedAddress {
    fn eq(&self, other: &Address) -> bool {
        self.0.eq(other)
    }
}

impl ChecksummedAddress {
    /// Returns the inner address.
    pub fn inner(&self) -> Address {
        self.0
    }
}

/// Normalizes any case variant of an address string into its checksummed form.
///
/// ```
/// use x402_deferred_eip155::chain::normalize_address;
///
/// let lower = normalize_address("0x081827b8c3aa05287b5aa2bc3051fbe638f33152").unwrap();
/// let upper = normalize_address("0x081827B8C3AA05287B5AA2BC3051FBE638F33152").unwrap();
/// assert_eq!(lower, upper);
/// assert_eq!(lower.to_string(), upper.to_string());
/// ```
pub fn normalize_address(address: &str) -> Result<ChecksummedAddress, hex::FromHexError> {
    address.parse()
}

/// Compares two address strings under normalization.
///
/// Returns `false` if either side is not a valid address.
pub fn addresses_equal(a: &str, b: &str) -> bool {
    match (normalize_address(a), normalize_address(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Error returned when a decimal amount string is not a non-negative integer
/// that fits in 256 bits.
#[derive(Debug, thiserror::Error)]
#[error("Invalid decimal amount '{0}'")]
pub struct DecimalAmountError(pub String);

/// Parses a decimal-string integer into a [`U256`].
///
/// Only ASCII digits are accepted: no sign, no `0x` prefix, no separators.
/// Leading zeros are accepted and dropped, so the decimal form of the result
/// is canonical (`"007"` parses to 7 and renders as `"7"`).
///
/// ```
/// use alloy_primitives::U256;
/// use x402_deferred_eip155::chain::parse_decimal_u256;
///
/// assert_eq!(parse_decimal_u256("1500").unwrap(), U256::from(1500u64));
/// assert_eq!(parse_decimal_u256("007").unwrap().to_string(), "7");
/// assert!(parse_decimal_u256("-1").is_err());
/// assert!(parse_decimal_u256("1.5").is_err());
/// ```
pub fn parse_decimal_u256(s: &str) -> Result<U256, DecimalAmountError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecimalAmountError(s.to_string()));
    }
    U256::from_str_radix(s, 10).map_err(|_| DecimalAmountError(s.to_string()))
}

pub mod decimal_u256 {
    use alloy_primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a U256 as a decimal string.
    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    /// Deserialize a decimal string into a U256.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_decimal_u256(&s).map_err(serde::de::Error::custom)
    }
}

/// The CAIP-2 namespace for EVM-compatible chains.
pub const EIP155_NAMESPACE: &str = "eip155";

/// A numeric chain ID for EVM-compatible networks.
///
/// This type wraps the numeric chain ID used by EVM networks (e.g., `84532` for Base Sepolia).
/// It can be converted to/from a [`ChainId`] for use with the x402 protocol.
///
/// # Example
///
/// ```
/// use x402_deferred_eip155::chain::Eip155ChainReference;
/// use x402_types::chain::ChainId;
///
/// let base = Eip155ChainReference::new(8453);
/// let chain_id: ChainId = base.into();
/// assert_eq!(chain_id.to_string(), "eip155:8453");
///
/// let sepolia = Eip155ChainReference::from_network_name("base-sepolia").unwrap();
/// assert_eq!(sepolia.inner(), 84532);
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Eip155ChainReference(u64);

impl Eip155ChainReference {
    /// Creates a new chain reference from a numeric chain ID.
    pub fn new(chain_id: u64) -> Self {
        Self(chain_id)
    }

    /// Returns the numeric chain ID.
    pub fn inner(&self) -> u64 {
        self.0
    }

    /// Converts this chain reference to a CAIP-2 [`ChainId`].
    pub fn as_chain_id(&self) -> ChainId {
        ChainId::new(EIP155_NAMESPACE, self.0.to_string())
    }

    /// Resolves a V1 network name (e.g. `"base-sepolia"`) to its numeric chain id.
    ///
    /// Fails for names outside the well-known registry and for networks that
    /// are not in the `eip155` namespace.
    pub fn from_network_name(network: &str) -> Result<Self, Eip155ChainReferenceFormatError> {
        let chain_id = ChainId::from_network_name(network)
            .ok_or_else(|| Eip155ChainReferenceFormatError::UnknownNetwork(network.to_string()))?;
        Self::try_from(chain_id)
    }
}

impl From<Eip155ChainReference> for ChainId {
    fn from(value: Eip155ChainReference) -> Self {
        value.as_chain_id()
    }
}

impl From<&Eip155ChainReference> for ChainId {
    fn from(value: &Eip155ChainReference) -> Self {
        value.as_chain_id()
    }
}

impl TryFrom<ChainId> for Eip155ChainReference {
    type Error = Eip155ChainReferenceFormatError;

    fn try_from(value: ChainId) -> Result<Self, Self::Error> {
        Self::try_from(&value)
    }
}

impl TryFrom<&ChainId> for Eip155ChainReference {
    type Error = Eip155ChainReferenceFormatError;

    fn try_from(value: &ChainId) -> Result<Self, Self::Error> {
        if value.namespace != EIP155_NAMESPACE {
            return Err(Eip155ChainReferenceFormatError::InvalidNamespace(
                value.namespace.clone(),
            ));
        }
        let chain_id: u64 = value.reference.parse().map_err(|_| {
            Eip155ChainReferenceFormatError::InvalidReference(value.reference.clone())
        })?;
        Ok(Eip155ChainReference(chain_id))
    }
}

/// Error returned when resolving an [`Eip155ChainReference`].
#[derive(Debug, thiserror::Error)]
pub enum Eip155ChainReferenceFormatError {
    /// The network name is not in the well-known registry.
    #[error("Unknown network {0}")]
    UnknownNetwork(String),
    /// The chain ID namespace is not `eip155`.
    #[error("Invalid namespace {0}, expected eip155")]
    InvalidNamespace(String),
    /// The chain reference is not a valid numeric value.
    #[error("Invalid eip155 chain reference {0}")]
    InvalidReference(String),
}

impl Display for Eip155ChainReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const CHECKSUMMED: &str = "0xA1c7BF3d421E8a54D39fBbe13f9f826e5B2C8E3D";

    #[test]
    fn test_normalize_any_case() {
        let mixed = normalize_address(CHECKSUMMED).unwrap();
        let lower = normalize_address(&CHECKSUMMED.to_lowercase()).unwrap();
        let upper = normalize_address(&format!("0x{}", &CHECKSUMMED[2..].to_uppercase())).unwrap();
        assert_eq!(mixed, lower);
        assert_eq!(mixed, upper);
        assert_eq!(lower.to_string(), mixed.to_string());
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_address("0x1234").is_err());
        assert!(normalize_address("not an address").is_err());
        assert!(normalize_address("").is_err());
    }

    #[test]
    fn test_addresses_equal() {
        assert!(addresses_equal(CHECKSUMMED, &CHECKSUMMED.to_lowercase()));
        assert!(!addresses_equal(
            CHECKSUMMED,
            "0x0000000000000000000000000000000000000001"
        ));
        assert!(!addresses_equal(CHECKSUMMED, "0xnope"));
    }

    #[test]
    fn test_checksummed_serde() {
        let addr = ChecksummedAddress(address!("0xd8da6bf26964af9d7eed9e03e53415d37aa96045"));
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045\"");
        let back: ChecksummedAddress =
            serde_json::from_str("\"0xD8DA6BF26964AF9D7EED9E03E53415D37AA96045\"").unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_parse_decimal_u256() {
        assert_eq!(parse_decimal_u256("0").unwrap(), U256::ZERO);
        assert_eq!(
            parse_decimal_u256("1000000000000000000").unwrap(),
            U256::from(1_000_000_000_000_000_000u64)
        );
        assert_eq!(parse_decimal_u256(&U256::MAX.to_string()).unwrap(), U256::MAX);
        assert!(parse_decimal_u256("").is_err());
        assert!(parse_decimal_u256("-5").is_err());
        assert!(parse_decimal_u256("+5").is_err());
        assert!(parse_decimal_u256("0x10").is_err());
        assert!(parse_decimal_u256("12abc").is_err());
        // 2^256
        assert!(
            parse_decimal_u256(
                "115792089237316195423570985008687907853269984665640564039457584007913129639936"
            )
            .is_err()
        );
    }

    #[test]
    fn test_chain_reference_from_network_name() {
        assert_eq!(
            Eip155ChainReference::from_network_name("base-sepolia").unwrap(),
            Eip155ChainReference::new(84532)
        );
        assert!(matches!(
            Eip155ChainReference::from_network_name("nowhere"),
            Err(Eip155ChainReferenceFormatError::UnknownNetwork(_))
        ));
        assert!(matches!(
            Eip155ChainReference::from_network_name("solana"),
            Err(Eip155ChainReferenceFormatError::InvalidNamespace(_))
        ));
    }
}
