//! EIP-712 typed data for vouchers.
//!
//! The domain, the `Voucher` struct definition, its field order and its field
//! widths are a protocol contract with the escrow contract: any change produces
//! a different signing hash and invalidates every existing signature.

use alloy_primitives::{B256, U256};
use alloy_sol_types::{Eip712Domain, SolStruct, eip712_domain};
use serde_json::json;

use crate::chain::ChecksummedAddress;
use crate::v1_eip155_deferred::Voucher;

/// EIP-712 domain name of the deferred payment escrow contract.
pub const DOMAIN_NAME: &str = "DeferredPaymentEscrow";
/// EIP-712 domain version of the deferred payment escrow contract.
pub const DOMAIN_VERSION: &str = "1";

pub mod eip712 {
    use alloy_sol_types::sol;

    sol!(
        /// Solidity-compatible struct definition of a deferred payment voucher.
        ///
        /// This is the `Voucher` type the escrow contract hashes when it checks
        /// a buyer's signature.
        #[derive(Debug, PartialEq, Eq)]
        struct Voucher {
            bytes32 id;
            address buyer;
            address seller;
            uint256 valueAggregate;
            address asset;
            uint64 timestamp;
            uint256 nonce;
            address escrow;
            uint256 chainId;
            uint64 expiry;
        }
    );
}

/// The exact structured message a buyer signs and a verifier reconstructs.
#[derive(Debug, Clone)]
pub struct VoucherTypedData {
    pub domain: Eip712Domain,
    pub message: eip712::Voucher,
}

impl VoucherTypedData {
    /// Builds the typed data for a voucher.
    ///
    /// Address fields go through the raw 20-byte value, so the letter case a
    /// voucher arrived with can never change the hash.
    pub fn new(voucher: &Voucher) -> Self {
        let domain = eip712_domain! {
            name: DOMAIN_NAME,
            version: DOMAIN_VERSION,
            chain_id: voucher.chain_id,
            verifying_contract: voucher.escrow.inner(),
        };
        let message = eip712::Voucher {
            id: voucher.id,
            buyer: voucher.buyer.inner(),
            seller: voucher.seller.inner(),
            valueAggregate: voucher.value_aggregate,
            asset: voucher.asset.inner(),
            timestamp: voucher.timestamp.as_secs(),
            nonce: U256::from(voucher.nonce),
            escrow: voucher.escrow.inner(),
            chainId: U256::from(voucher.chain_id),
            expiry: voucher.expiry.as_secs(),
        };
        Self { domain, message }
    }

    /// The EIP-712 digest: `keccak256("\x19\x01" ‖ domainSeparator ‖ hashStruct(message))`.
    pub fn signing_hash(&self) -> B256 {
        self.message.eip712_signing_hash(&self.domain)
    }

    /// Renders the typed data in the `eth_signTypedData_v4` JSON shape.
    ///
    /// Integers wider than 53 bits (`valueAggregate`, `nonce`, `chainId`) are
    /// rendered as decimal strings so JSON consumers do not lose precision.
    pub fn to_json(&self) -> serde_json::Value {
        let message = &self.message;
        let verifying_contract = self
            .domain
            .verifying_contract
            .map(|address| ChecksummedAddress(address).to_string());
        json!({
            "types": {
                "EIP712Domain": [
                    {"name": "name", "type": "string"},
                    {"name": "version", "type": "string"},
                    {"name": "chainId", "type": "uint256"},
                    {"name": "verifyingContract", "type": "address"},
                ],
                "Voucher": [
                    {"name": "id", "type": "bytes32"},
                    {"name": "buyer", "type": "address"},
                    {"name": "seller", "type": "address"},
                    {"name": "valueAggregate", "type": "uint256"},
                    {"name": "asset", "type": "address"},
                    {"name": "timestamp", "type": "uint64"},
                    {"name": "nonce", "type": "uint256"},
                    {"name": "escrow", "type": "address"},
                    {"name": "chainId", "type": "uint256"},
                    {"name": "expiry", "type": "uint64"},
                ],
            },
            "primaryType": "Voucher",
            "domain": {
                "name": DOMAIN_NAME,
                "version": DOMAIN_VERSION,
                "chainId": self.domain.chain_id.map(|id| id.to_string()),
                "verifyingContract": verifying_contract,
            },
            "message": {
                "id": message.id,
                "buyer": ChecksummedAddress(message.buyer).to_string(),
                "seller": ChecksummedAddress(message.seller).to_string(),
                "valueAggregate": message.valueAggregate.to_string(),
                "asset": ChecksummedAddress(message.asset).to_string(),
                "timestamp": message.timestamp,
                "nonce": message.nonce.to_string(),
                "escrow": ChecksummedAddress(message.escrow).to_string(),
                "chainId": message.chainId.to_string(),
                "expiry": message.expiry,
            },
        })
    }
}

impl From<&Voucher> for VoucherTypedData {
    fn from(voucher: &Voucher) -> Self {
        Self::new(voucher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, keccak256};
    use x402_types::timestamp::UnixTimestamp;

    fn voucher() -> Voucher {
        Voucher {
            id: B256::repeat_byte(0x11),
            buyer: address!("0x8fd379246834eac74b8419ffda202cf8051f7a03").into(),
            seller: address!("0xA1c7BF3d421E8a54D39fBbe13f9f826e5B2C8E3D").into(),
            value_aggregate: U256::from(1_000_000_000_000_000_000u64),
            asset: address!("0x081827b8c3aa05287b5aa2bc3051fbe638f33152").into(),
            timestamp: UnixTimestamp::from_secs(1_700_000_000),
            nonce: 1,
            escrow: address!("0x7Cb1a5A2a2c9E91B76914c0A7b7FB3aeFF3BCA27").into(),
            chain_id: 84532,
            expiry: UnixTimestamp::from_secs(1_700_000_000 + 30 * 24 * 60 * 60),
        }
    }

    #[test]
    fn test_voucher_type_string() {
        let encode_type = eip712::Voucher::eip712_encode_type();
        assert_eq!(
            encode_type,
            "Voucher(bytes32 id,address buyer,address seller,uint256 valueAggregate,address asset,uint64 timestamp,uint256 nonce,address escrow,uint256 chainId,uint64 expiry)"
        );
        let typed = VoucherTypedData::new(&voucher());
        assert_eq!(
            typed.message.eip712_type_hash(),
            keccak256(encode_type.as_bytes())
        );
    }

    #[test]
    fn test_domain() {
        let typed = VoucherTypedData::new(&voucher());
        assert_eq!(typed.domain.name.as_deref(), Some(DOMAIN_NAME));
        assert_eq!(typed.domain.version.as_deref(), Some(DOMAIN_VERSION));
        assert_eq!(typed.domain.chain_id, Some(U256::from(84532u64)));
        assert_eq!(
            typed.domain.verifying_contract,
            Some(address!("0x7Cb1a5A2a2c9E91B76914c0A7b7FB3aeFF3BCA27"))
        );
        assert!(typed.domain.salt.is_none());
    }

    #[test]
    fn test_signing_hash_is_deterministic() {
        let a = VoucherTypedData::new(&voucher()).signing_hash();
        let b = VoucherTypedData::new(&voucher()).signing_hash();
        assert_eq!(a, b);
    }

    #[test]
    fn test_signing_hash_covers_every_field() {
        let base = VoucherTypedData::new(&voucher()).signing_hash();
        let other: ChecksummedAddress =
            address!("0x0000000000000000000000000000000000000001").into();
        let mutations: Vec<Box<dyn Fn(&mut Voucher)>> = vec![
            Box::new(|v: &mut Voucher| v.id = B256::repeat_byte(0x22)),
            Box::new(move |v: &mut Voucher| v.buyer = other),
            Box::new(move |v: &mut Voucher| v.seller = other),
            Box::new(|v: &mut Voucher| v.value_aggregate += U256::from(1u64)),
            Box::new(move |v: &mut Voucher| v.asset = other),
            Box::new(|v: &mut Voucher| v.timestamp = v.timestamp + 1),
            Box::new(|v: &mut Voucher| v.nonce += 1),
            Box::new(move |v: &mut Voucher| v.escrow = other),
            Box::new(|v: &mut Voucher| v.chain_id = 8453),
            Box::new(|v: &mut Voucher| v.expiry = v.expiry + 1),
        ];
        for mutate in mutations {
            let mut changed = voucher();
            mutate(&mut changed);
            assert_ne!(VoucherTypedData::new(&changed).signing_hash(), base);
        }
    }

    #[test]
    fn test_json_rendering() {
        let json = VoucherTypedData::new(&voucher()).to_json();
        assert_eq!(json["primaryType"], "Voucher");
        assert_eq!(json["domain"]["name"], "DeferredPaymentEscrow");
        assert_eq!(json["domain"]["chainId"], "84532");
        assert_eq!(
            json["domain"]["verifyingContract"],
            "0x7Cb1a5A2a2c9E91B76914c0A7b7FB3aeFF3BCA27"
        );
        let fields: Vec<&str> = json["types"]["Voucher"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            fields,
            [
                "id",
                "buyer",
                "seller",
                "valueAggregate",
                "asset",
                "timestamp",
                "nonce",
                "escrow",
                "chainId",
                "expiry"
            ]
        );
        assert_eq!(json["message"]["valueAggregate"], "1000000000000000000");
        assert_eq!(json["message"]["id"], format!("0x{}", "11".repeat(32)));
    }
}
