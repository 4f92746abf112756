use primitive_types::U256;

use super::{Token, WORD_SIZE};

// Encode a list of tokens as a tuple (function arguments or return values)
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let mut writer = Writer::new();
    writer.write_tokens(tokens);
    writer.into_bytes()
}

pub struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn write_word(&mut self, value: U256) {
        self.bytes.extend_from_slice(&value.to_big_endian());
    }

    pub fn write_usize(&mut self, value: usize) {
        self.write_word(U256::from(value));
    }

    // Length-prefixed bytes, right padded to a whole number of words
    pub fn write_padded_bytes(&mut self, bytes: &[u8]) {
        self.write_usize(bytes.len());
        self.bytes.extend_from_slice(bytes);
        let remainder = bytes.len() % WORD_SIZE;
        if remainder != 0 {
            self.bytes
                .extend(std::iter::repeat(0u8).take(WORD_SIZE - remainder));
        }
    }

    pub fn write_tokens(&mut self, tokens: &[Token]) {
        let head_size: usize = tokens.iter().map(token_head_size).sum();

        let mut tail = Writer::new();
        for token in tokens {
            if token.is_dynamic() {
                self.write_usize(head_size + tail.bytes.len());
                tail.write_token(token);
            } else {
                self.write_token(token);
            }
        }

        self.bytes.extend(tail.bytes);
    }

    pub fn write_token(&mut self, token: &Token) {
        match token {
            Token::Uint(value) => self.write_word(*value),
            Token::Address(address) => {
                let mut word = [0u8; WORD_SIZE];
                word[WORD_SIZE - 20..].copy_from_slice(address.as_bytes());
                self.bytes.extend_from_slice(&word);
            }
            Token::Bool(value) => self.write_usize(*value as usize),
            Token::String(value) => self.write_padded_bytes(value.as_bytes()),
            Token::Bytes(value) => self.write_padded_bytes(value),
            Token::Array(tokens) => {
                self.write_usize(tokens.len());
                self.write_tokens(tokens);
            }
            Token::Tuple(tokens) => self.write_tokens(tokens),
        }
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

fn token_head_size(token: &Token) -> usize {
    match token {
        Token::Tuple(tokens) if !token.is_dynamic() => tokens.iter().map(token_head_size).sum(),
        _ => WORD_SIZE,
    }
}
