// Application-level records produced by the normalization layer

use serde::{Deserialize, Serialize};

use crate::{
    crypto::Address,
    time::{TimestampMillis, TimestampSeconds},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Apartment {
    pub id: u64,
    pub name: String,
    pub owner: Address,
    pub description: String,
    pub location: String,
    pub email: String,
    // Nightly price as a decimal string, "1.5"
    pub price: String,
    pub images: Vec<String>,
    pub rooms: u64,
    // Logical delete, the record stays on-chain
    pub deleted: bool,
    pub timestamp: TimestampSeconds,
    pub booked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: u64,
    pub aid: u64,
    pub tenant: Address,
    // One booking per night
    pub date: TimestampMillis,
    pub price: String,
    pub checked: bool,
    pub cancelled: bool,
    pub abandoned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: u64,
    pub aid: u64,
    pub text: String,
    pub owner: Address,
    pub timestamp: TimestampSeconds,
}
