// Raw records as returned by the marketplace contract.
// Field order follows the contract structs and must not change.

use primitive_types::U256;

use crate::{
    abi::{ParamType, ReaderError, Token},
    crypto::Address,
};

// Pull typed fields out of a decoded tuple, in declaration order
struct Fields {
    tokens: std::vec::IntoIter<Token>,
}

impl Fields {
    fn new(token: Token) -> Result<Self, ReaderError> {
        let tokens = token
            .into_tuple()
            .ok_or(ReaderError::UnexpectedToken("tuple"))?;
        Ok(Self {
            tokens: tokens.into_iter(),
        })
    }

    fn next(&mut self) -> Result<Token, ReaderError> {
        self.tokens
            .next()
            .ok_or(ReaderError::UnexpectedToken("more tuple fields"))
    }

    fn uint(&mut self) -> Result<U256, ReaderError> {
        self.next()?
            .into_uint()
            .ok_or(ReaderError::UnexpectedToken("uint256"))
    }

    fn string(&mut self) -> Result<String, ReaderError> {
        self.next()?
            .into_string()
            .ok_or(ReaderError::UnexpectedToken("string"))
    }

    fn address(&mut self) -> Result<Address, ReaderError> {
        self.next()?
            .into_address()
            .ok_or(ReaderError::UnexpectedToken("address"))
    }

    fn bool(&mut self) -> Result<bool, ReaderError> {
        self.next()?
            .into_bool()
            .ok_or(ReaderError::UnexpectedToken("bool"))
    }
}

// Decode an array token into records
pub fn records_from_token<T, F>(token: Token, decode: F) -> Result<Vec<T>, ReaderError>
where
    F: Fn(Token) -> Result<T, ReaderError>,
{
    token
        .into_array()
        .ok_or(ReaderError::UnexpectedToken("array"))?
        .into_iter()
        .map(decode)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawApartment {
    pub id: U256,
    pub name: String,
    pub description: String,
    pub location: String,
    pub email: String,
    // Delimited list of image URIs
    pub images: String,
    pub rooms: U256,
    // Nightly price in base units
    pub price: U256,
    pub owner: Address,
    pub booked: bool,
    pub deleted: bool,
    pub timestamp: U256,
}

impl RawApartment {
    pub fn param_type() -> ParamType {
        ParamType::Tuple(vec![
            ParamType::Uint,
            ParamType::String,
            ParamType::String,
            ParamType::String,
            ParamType::String,
            ParamType::String,
            ParamType::Uint,
            ParamType::Uint,
            ParamType::Address,
            ParamType::Bool,
            ParamType::Bool,
            ParamType::Uint,
        ])
    }

    pub fn from_token(token: Token) -> Result<Self, ReaderError> {
        let mut fields = Fields::new(token)?;
        Ok(Self {
            id: fields.uint()?,
            name: fields.string()?,
            description: fields.string()?,
            location: fields.string()?,
            email: fields.string()?,
            images: fields.string()?,
            rooms: fields.uint()?,
            price: fields.uint()?,
            owner: fields.address()?,
            booked: fields.bool()?,
            deleted: fields.bool()?,
            timestamp: fields.uint()?,
        })
    }

    pub fn into_token(self) -> Token {
        Token::Tuple(vec![
            Token::Uint(self.id),
            Token::String(self.name),
            Token::String(self.description),
            Token::String(self.location),
            Token::String(self.email),
            Token::String(self.images),
            Token::Uint(self.rooms),
            Token::Uint(self.price),
            Token::Address(self.owner),
            Token::Bool(self.booked),
            Token::Bool(self.deleted),
            Token::Uint(self.timestamp),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBooking {
    pub id: U256,
    pub aid: U256,
    pub tenant: Address,
    // Booked night, milliseconds
    pub date: U256,
    pub price: U256,
    pub checked: bool,
    pub cancelled: bool,
    pub abandoned: bool,
}

impl RawBooking {
    pub fn param_type() -> ParamType {
        ParamType::Tuple(vec![
            ParamType::Uint,
            ParamType::Uint,
            ParamType::Address,
            ParamType::Uint,
            ParamType::Uint,
            ParamType::Bool,
            ParamType::Bool,
            ParamType::Bool,
        ])
    }

    pub fn from_token(token: Token) -> Result<Self, ReaderError> {
        let mut fields = Fields::new(token)?;
        Ok(Self {
            id: fields.uint()?,
            aid: fields.uint()?,
            tenant: fields.address()?,
            date: fields.uint()?,
            price: fields.uint()?,
            checked: fields.bool()?,
            cancelled: fields.bool()?,
            abandoned: fields.bool()?,
        })
    }

    pub fn into_token(self) -> Token {
        Token::Tuple(vec![
            Token::Uint(self.id),
            Token::Uint(self.aid),
            Token::Address(self.tenant),
            Token::Uint(self.date),
            Token::Uint(self.price),
            Token::Bool(self.checked),
            Token::Bool(self.cancelled),
            Token::Bool(self.abandoned),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReview {
    pub id: U256,
    pub aid: U256,
    pub review_text: String,
    pub timestamp: U256,
    pub owner: Address,
}

impl RawReview {
    pub fn param_type() -> ParamType {
        ParamType::Tuple(vec![
            ParamType::Uint,
            ParamType::Uint,
            ParamType::String,
            ParamType::Uint,
            ParamType::Address,
        ])
    }

    pub fn from_token(token: Token) -> Result<Self, ReaderError> {
        let mut fields = Fields::new(token)?;
        Ok(Self {
            id: fields.uint()?,
            aid: fields.uint()?,
            review_text: fields.string()?,
            timestamp: fields.uint()?,
            owner: fields.address()?,
        })
    }

    pub fn into_token(self) -> Token {
        Token::Tuple(vec![
            Token::Uint(self.id),
            Token::Uint(self.aid),
            Token::String(self.review_text),
            Token::Uint(self.timestamp),
            Token::Address(self.owner),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{decode, encode};

    #[test]
    fn test_apartment_list_through_codec() {
        let apartment = RawApartment {
            id: U256::from(3u64),
            name: "Loft".into(),
            description: "Top floor".into(),
            location: "Lisbon".into(),
            email: "host@example.org".into(),
            images: "a.png,b.png".into(),
            rooms: U256::from(2u64),
            price: U256::exp10(18),
            owner: Address::new([7u8; 20]),
            booked: false,
            deleted: false,
            timestamp: U256::from(1_700_000_000u64),
        };

        let encoded = encode(&[Token::Array(vec![apartment.clone().into_token()])]);
        let mut tokens =
            decode(&[ParamType::Array(Box::new(RawApartment::param_type()))], &encoded).unwrap();
        let records = records_from_token(tokens.remove(0), RawApartment::from_token).unwrap();
        assert_eq!(records, vec![apartment]);
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        let token = Token::Tuple(vec![Token::from(1u64)]);
        assert!(RawReview::from_token(token).is_err());
        assert_eq!(
            RawBooking::from_token(Token::from(1u64)),
            Err(ReaderError::UnexpectedToken("tuple"))
        );
    }
}
