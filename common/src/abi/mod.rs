//! Contract ABI codec.
//!
//! Only the subset the marketplace contract uses is supported:
//! `uint256`, `address`, `bool`, `string`, `bytes`, dynamic arrays and tuples.
//! Values are laid out in 32-byte words with the usual head/tail scheme:
//! static values are written inline, dynamic values are referenced by an
//! offset in the head and appended to the tail.

mod reader;
mod writer;

use primitive_types::U256;

use crate::crypto::{keccak256, Address};

pub use reader::*;
pub use writer::*;

pub const WORD_SIZE: usize = 32;
pub const SELECTOR_SIZE: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Uint,
    Address,
    Bool,
    String,
    Bytes,
    Array(Box<ParamType>),
    Tuple(Vec<ParamType>),
}

impl ParamType {
    // Dynamic types are encoded in the tail and referenced by an offset
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::String | Self::Bytes | Self::Array(_) => true,
            Self::Tuple(types) => types.iter().any(ParamType::is_dynamic),
            Self::Uint | Self::Address | Self::Bool => false,
        }
    }

    // Bytes used in the head
    pub fn head_size(&self) -> usize {
        match self {
            Self::Tuple(types) if !self.is_dynamic() => {
                types.iter().map(ParamType::head_size).sum()
            }
            _ => WORD_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Uint(U256),
    Address(Address),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Token>),
    Tuple(Vec<Token>),
}

impl Token {
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::String(_) | Self::Bytes(_) | Self::Array(_) => true,
            Self::Tuple(tokens) => tokens.iter().any(Token::is_dynamic),
            Self::Uint(_) | Self::Address(_) | Self::Bool(_) => false,
        }
    }

    pub fn into_uint(self) -> Option<U256> {
        match self {
            Self::Uint(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_address(self) -> Option<Address> {
        match self {
            Self::Address(address) => Some(address),
            _ => None,
        }
    }

    pub fn into_bool(self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_array(self) -> Option<Vec<Token>> {
        match self {
            Self::Array(tokens) => Some(tokens),
            _ => None,
        }
    }

    pub fn into_tuple(self) -> Option<Vec<Token>> {
        match self {
            Self::Tuple(tokens) => Some(tokens),
            _ => None,
        }
    }
}

impl From<u64> for Token {
    fn from(value: u64) -> Self {
        Token::Uint(U256::from(value))
    }
}

impl From<U256> for Token {
    fn from(value: U256) -> Self {
        Token::Uint(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::String(value.to_owned())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Token::String(value)
    }
}

impl From<Address> for Token {
    fn from(value: Address) -> Self {
        Token::Address(value)
    }
}

impl From<bool> for Token {
    fn from(value: bool) -> Self {
        Token::Bool(value)
    }
}

// First 4 bytes of the keccak256 of the canonical signature,
// for example "getApartment(uint256)"
pub fn selector(signature: &str) -> [u8; SELECTOR_SIZE] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; SELECTOR_SIZE];
    selector.copy_from_slice(&hash.as_bytes()[..SELECTOR_SIZE]);
    selector
}

// Calldata for a function call: selector followed by the encoded arguments
pub fn encode_function_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut data = selector(signature).to_vec();
    data.extend(encode(tokens));
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector() {
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn test_dynamic_types() {
        assert!(!ParamType::Uint.is_dynamic());
        assert!(ParamType::String.is_dynamic());
        assert!(ParamType::Array(Box::new(ParamType::Uint)).is_dynamic());
        assert!(!ParamType::Tuple(vec![ParamType::Uint, ParamType::Bool]).is_dynamic());
        assert!(ParamType::Tuple(vec![ParamType::Uint, ParamType::String]).is_dynamic());
        assert_eq!(
            ParamType::Tuple(vec![ParamType::Uint, ParamType::Bool]).head_size(),
            64
        );
    }

    #[test]
    fn test_encode_function_call() {
        let data = encode_function_call("getApartment(uint256)", &[Token::from(7u64)]);
        assert_eq!(data.len(), SELECTOR_SIZE + WORD_SIZE);
        assert_eq!(&data[..4], &selector("getApartment(uint256)"));
        assert_eq!(data[35], 7);
    }
}
