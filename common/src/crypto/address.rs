use serde::de::Error as SerdeError;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};
use thiserror::Error;

pub const ADDRESS_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Address must start with 0x")]
    MissingPrefix,
    #[error("Invalid address length: expected {} hex chars, got {}", ADDRESS_SIZE * 2, _0)]
    InvalidLength(usize),
    #[error("Invalid hex in address")]
    InvalidHex,
}

// Account or contract address on the network
#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Hash, Default)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }

    pub const fn zero() -> Self {
        Address([0; ADDRESS_SIZE])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; ADDRESS_SIZE]
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(AddressError::MissingPrefix)?;

        if hex.len() != ADDRESS_SIZE * 2 {
            return Err(AddressError::InvalidLength(hex.len()));
        }

        let mut bytes = [0u8; ADDRESS_SIZE];
        hex::decode_to_slice(hex, &mut bytes).map_err(|_| AddressError::InvalidHex)?;
        Ok(Address(bytes))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'a> Deserialize<'a> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        let hex = String::deserialize(deserializer)?;
        Address::from_str(&hex).map_err(SerdeError::custom)
    }
}
