//! Throwaway secp256k1 key used by the read-only fallback signer.
//!
//! The key never holds funds: it only gives read calls a plausible `from`
//! address when no wallet is connected.

use k256::{ecdsa::SigningKey, elliptic_curve::sec1::ToEncodedPoint};
use rand::rngs::OsRng;
use std::fmt;

use super::{keccak256, Address, ADDRESS_SIZE};

pub struct KeyPair {
    signing_key: SigningKey,
    address: Address,
}

impl KeyPair {
    /// Generate a fresh random keypair from the OS CSPRNG.
    pub fn new() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = address_of(&signing_key);
        Self {
            signing_key,
            address,
        }
    }

    /// Address derived from the public key (last 20 bytes of its keccak256).
    pub fn get_address(&self) -> Address {
        self.address
    }

    /// Uncompressed SEC1 public key (65 bytes, 0x04 prefix).
    pub fn get_public_key(&self) -> Vec<u8> {
        self.signing_key
            .verifying_key()
            .as_affine()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }
}

impl Default for KeyPair {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

fn address_of(signing_key: &SigningKey) -> Address {
    let point = signing_key.verifying_key().as_affine().to_encoded_point(false);
    // Skip the 0x04 SEC1 tag
    let digest = keccak256(&point.as_bytes()[1..]);

    let mut bytes = [0u8; ADDRESS_SIZE];
    bytes.copy_from_slice(&digest.as_bytes()[32 - ADDRESS_SIZE..]);
    Address::new(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_known_key_address() {
        // Secret key 1: well-known address of the generator point
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let signing_key = SigningKey::from_bytes(&secret.into()).unwrap();
        let keypair = KeyPair::from_signing_key(signing_key);
        assert_eq!(
            keypair.get_address(),
            Address::from_str("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf").unwrap()
        );
    }

    #[test]
    fn test_random_keypairs_differ() {
        let first = KeyPair::new();
        let second = KeyPair::new();
        assert_ne!(first.get_address(), second.get_address());
        assert_eq!(first.get_public_key().len(), 65);
    }

    #[test]
    fn test_debug_hides_secret() {
        let keypair = KeyPair::new();
        let debug = format!("{:?}", keypair);
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains(&keypair.get_address().to_hex()));
    }
}
