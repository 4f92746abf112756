use primitive_types::U256;
use thiserror::Error;

use super::{ParamType, Token, WORD_SIZE};
use crate::crypto::{Address, ADDRESS_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReaderError {
    #[error("Out of bounds read: need {} bytes at offset {}, have {}", needed, offset, available)]
    OutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("Offset or length does not fit in memory")]
    InvalidSize,
    #[error("Invalid boolean value")]
    InvalidBool,
    #[error("Invalid address padding")]
    InvalidAddress,
    #[error("String is not valid UTF-8")]
    InvalidString,
    #[error("Unexpected token: expected {}", _0)]
    UnexpectedToken(&'static str),
}

// Decode a list of values encoded as a tuple
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, ReaderError> {
    Reader::new(data).read_tokens(types)
}

pub struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    fn slice(&self, offset: usize, needed: usize) -> Result<&'a [u8], ReaderError> {
        offset
            .checked_add(needed)
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or(ReaderError::OutOfBounds {
                offset,
                needed,
                available: self.bytes.len(),
            })
    }

    // Reader starting at the given offset of this one
    fn at(&self, offset: usize) -> Result<Reader<'a>, ReaderError> {
        let bytes = self
            .bytes
            .get(offset..)
            .ok_or(ReaderError::OutOfBounds {
                offset,
                needed: 0,
                available: self.bytes.len(),
            })?;
        Ok(Reader::new(bytes))
    }

    pub fn read_word(&self, offset: usize) -> Result<U256, ReaderError> {
        Ok(U256::from_big_endian(self.slice(offset, WORD_SIZE)?))
    }

    pub fn read_usize(&self, offset: usize) -> Result<usize, ReaderError> {
        let value = self.read_word(offset)?;
        if value > U256::from(usize::MAX) {
            return Err(ReaderError::InvalidSize);
        }
        Ok(value.low_u64() as usize)
    }

    pub fn read_tokens(&self, types: &[ParamType]) -> Result<Vec<Token>, ReaderError> {
        let mut tokens = Vec::with_capacity(types.len());
        let mut offset = 0;
        for param in types {
            let token = if param.is_dynamic() {
                let tail_offset = self.read_usize(offset)?;
                self.at(tail_offset)?.read_token(param)?
            } else {
                self.at(offset)?.read_token(param)?
            };
            tokens.push(token);
            offset += param.head_size();
        }
        Ok(tokens)
    }

    pub fn read_token(&self, param: &ParamType) -> Result<Token, ReaderError> {
        Ok(match param {
            ParamType::Uint => Token::Uint(self.read_word(0)?),
            ParamType::Address => {
                let word = self.slice(0, WORD_SIZE)?;
                if word[..WORD_SIZE - ADDRESS_SIZE].iter().any(|b| *b != 0) {
                    return Err(ReaderError::InvalidAddress);
                }
                let mut bytes = [0u8; ADDRESS_SIZE];
                bytes.copy_from_slice(&word[WORD_SIZE - ADDRESS_SIZE..]);
                Token::Address(Address::new(bytes))
            }
            ParamType::Bool => {
                let value = self.read_word(0)?;
                if value > U256::one() {
                    return Err(ReaderError::InvalidBool);
                }
                Token::Bool(!value.is_zero())
            }
            ParamType::String => {
                let bytes = self.read_length_prefixed()?;
                let value =
                    String::from_utf8(bytes.to_vec()).map_err(|_| ReaderError::InvalidString)?;
                Token::String(value)
            }
            ParamType::Bytes => Token::Bytes(self.read_length_prefixed()?.to_vec()),
            ParamType::Array(inner) => {
                let len = self.read_usize(0)?;
                // Every element takes at least one word, refuse absurd lengths early
                let remaining = self.bytes.len().saturating_sub(WORD_SIZE);
                if len > remaining / WORD_SIZE {
                    return Err(ReaderError::OutOfBounds {
                        offset: WORD_SIZE,
                        needed: len.saturating_mul(WORD_SIZE),
                        available: remaining,
                    });
                }
                let types = vec![inner.as_ref().clone(); len];
                Token::Array(self.at(WORD_SIZE)?.read_tokens(&types)?)
            }
            ParamType::Tuple(types) => Token::Tuple(self.read_tokens(types)?),
        })
    }

    fn read_length_prefixed(&self) -> Result<&'a [u8], ReaderError> {
        let len = self.read_usize(0)?;
        self.slice(WORD_SIZE, len)
    }
}
