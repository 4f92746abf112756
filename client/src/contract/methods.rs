use banx_common::{
    abi::{ParamType, Token, SELECTOR_SIZE},
    api::{RawApartment, RawBooking, RawReview},
    config::IMAGES_SEPARATOR,
    utils::{to_base_units, AmountError},
    U256,
};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

// Every method of the marketplace contract this client uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum ContractMethod {
    GetApartments,
    GetApartment,
    GetBookings,
    GetUnavailableDates,
    GetQualifiedReviewers,
    GetReviews,
    SecurityFee,
    CreateApartment,
    UpdateApartment,
    DeleteApartment,
    BookApartment,
    CheckInApartment,
    RefundBooking,
    ClaimFunds,
    AddReview,
}

lazy_static! {
    static ref SELECTORS: HashMap<ContractMethod, [u8; SELECTOR_SIZE]> = ContractMethod::iter()
        .map(|method| (method, banx_common::abi::selector(method.signature())))
        .collect();
}

impl ContractMethod {
    pub fn signature(&self) -> &'static str {
        match self {
            Self::GetApartments => "getApartments()",
            Self::GetApartment => "getApartment(uint256)",
            Self::GetBookings => "getBookings(uint256)",
            Self::GetUnavailableDates => "getUnavailableDates(uint256)",
            Self::GetQualifiedReviewers => "getQualifiedReviewers(uint256)",
            Self::GetReviews => "getReviews(uint256)",
            Self::SecurityFee => "securityFee()",
            Self::CreateApartment => {
                "createApartment(string,string,string,string,string,uint256,uint256)"
            }
            Self::UpdateApartment => {
                "updateApartment(uint256,string,string,string,string,string,uint256,uint256)"
            }
            Self::DeleteApartment => "deleteApartment(uint256)",
            Self::BookApartment => "bookApartment(uint256,uint256[])",
            Self::CheckInApartment => "checkInApartment(uint256,uint256)",
            Self::RefundBooking => "refundBooking(uint256,uint256)",
            Self::ClaimFunds => "claimFunds(uint256,uint256)",
            Self::AddReview => "addReview(uint256,string)",
        }
    }

    pub fn selector(&self) -> [u8; SELECTOR_SIZE] {
        SELECTORS
            .get(self)
            .copied()
            .unwrap_or_else(|| banx_common::abi::selector(self.signature()))
    }

    // Return schema, empty for state-changing methods
    pub fn outputs(&self) -> Vec<ParamType> {
        match self {
            Self::GetApartments => vec![ParamType::Array(Box::new(RawApartment::param_type()))],
            Self::GetApartment => vec![RawApartment::param_type()],
            Self::GetBookings => vec![ParamType::Array(Box::new(RawBooking::param_type()))],
            Self::GetUnavailableDates => vec![ParamType::Array(Box::new(ParamType::Uint))],
            Self::GetQualifiedReviewers => vec![ParamType::Array(Box::new(ParamType::Address))],
            Self::GetReviews => vec![ParamType::Array(Box::new(RawReview::param_type()))],
            Self::SecurityFee => vec![ParamType::Uint],
            _ => Vec::new(),
        }
    }

    pub fn is_write(&self) -> bool {
        self.outputs().is_empty()
    }

    // Calldata: selector followed by the encoded arguments
    pub fn encode_call(&self, args: &[Token]) -> Vec<u8> {
        let mut data = self.selector().to_vec();
        data.extend(banx_common::abi::encode(args));
        data
    }
}

// Apartment fields as the user enters them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentParams {
    pub name: String,
    pub description: String,
    pub location: String,
    pub email: String,
    pub images: Vec<String>,
    pub rooms: u64,
    // Decimal nightly price, "0.25"
    pub price: String,
}

impl ApartmentParams {
    // Contract representation: joined images, price in base units
    pub fn to_call(&self) -> Result<ApartmentCall, AmountError> {
        Ok(ApartmentCall {
            name: self.name.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            email: self.email.clone(),
            images: self.images.join(IMAGES_SEPARATOR),
            rooms: self.rooms,
            price: to_base_units(&self.price)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApartmentCall {
    pub name: String,
    pub description: String,
    pub location: String,
    pub email: String,
    pub images: String,
    pub rooms: u64,
    pub price: U256,
}

impl ApartmentCall {
    pub fn to_tokens(&self) -> Vec<Token> {
        vec![
            Token::from(self.name.as_str()),
            Token::from(self.description.as_str()),
            Token::from(self.location.as_str()),
            Token::from(self.email.as_str()),
            Token::from(self.images.as_str()),
            Token::from(self.rooms),
            Token::Uint(self.price),
        ]
    }
}

// Nights to book and the payment computed by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub aid: u64,
    // One millisecond instant per night
    pub timestamps: Vec<u64>,
    // Decimal amount attached to the transaction
    pub amount: String,
}
