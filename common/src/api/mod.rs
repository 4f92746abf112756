mod contract;
mod records;

use primitive_types::U256;
use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::{Address, Hash};

pub use contract::*;
pub use records::*;

// Raw bytes carried as a 0x-prefixed hex string on the wire
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HexBytes(pub Vec<u8>);

impl HexBytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for HexBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(&self.0)))
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        let value = value.strip_prefix("0x").unwrap_or(&value);
        hex::decode(value).map(HexBytes).map_err(Error::custom)
    }
}

// Block selector for read calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    #[default]
    Latest,
    Pending,
}

// Params of eth_call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    pub data: HexBytes,
}

// Params of eth_sendTransaction, signed by the account holder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: HexBytes,
    // Value transfer attached to the call, in base units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
}

// Result of eth_getTransactionReceipt once the transaction is mined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: Hash,
    #[serde(default)]
    pub block_number: Option<U256>,
    #[serde(default)]
    pub from: Option<Address>,
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(default)]
    pub gas_used: Option<U256>,
    // 1 for success, 0 when the execution reverted
    #[serde(default)]
    pub status: Option<U256>,
}

impl TransactionReceipt {
    // Pre-byzantium receipts have no status, consider them successful
    pub fn is_success(&self) -> bool {
        self.status.map(|status| !status.is_zero()).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_call_request_wire_format() {
        let to = Address::from_str("0x00000000000000000000000000000000000000aa").unwrap();
        let request = CallRequest {
            from: None,
            to,
            data: HexBytes(vec![0xde, 0xad]),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "to": to.to_hex(), "data": "0xdead" })
        );
    }

    #[test]
    fn test_transaction_request_value_is_quantity() {
        let from = Address::from_str("0x00000000000000000000000000000000000000bb").unwrap();
        let request = TransactionRequest {
            from,
            to: Address::zero(),
            data: HexBytes::default(),
            value: Some(U256::from(255u64)),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["value"], json!("0xff"));
        assert_eq!(value["data"], json!("0x"));
    }

    #[test]
    fn test_receipt_status() {
        let receipt: TransactionReceipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "11".repeat(32)),
            "blockNumber": "0x10",
            "status": "0x0",
            "gasUsed": "0x5208"
        }))
        .unwrap();
        assert!(!receipt.is_success());
        assert_eq!(receipt.block_number, Some(U256::from(16u64)));

        let receipt: TransactionReceipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "22".repeat(32)),
            "status": "0x1"
        }))
        .unwrap();
        assert!(receipt.is_success());
    }
}
