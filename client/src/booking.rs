//! Booking helpers: nights between two days and the payment they require.

use banx_common::{config::SECURITY_FEE_PERCENT, time::day_to_millis, U256};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingError {
    #[error("Check-out day {check_out} is before check-in day {check_in}")]
    CheckOutBeforeCheckIn {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
    #[error("Booking amount overflows")]
    AmountOverflow,
}

// Where the security fee percentage comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "percent")]
pub enum FeePolicy {
    // Fixed percentage known by the client
    Fixed(u64),
    // Percentage read from the contract securityFee()
    Contract,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self::Fixed(SECURITY_FEE_PERCENT)
    }
}

// One UTC-midnight instant (ms) per day, both ends included
pub fn booking_timestamps(
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<Vec<u64>, BookingError> {
    if check_out < check_in {
        return Err(BookingError::CheckOutBeforeCheckIn {
            check_in,
            check_out,
        });
    }

    Ok(check_in
        .iter_days()
        .take_while(|day| *day <= check_out)
        .map(day_to_millis)
        .collect())
}

// price * nights plus the security fee on top, in base units
pub fn booking_amount(price: U256, nights: u64, fee_percent: u64) -> Result<U256, BookingError> {
    let subtotal = price
        .checked_mul(U256::from(nights))
        .ok_or(BookingError::AmountOverflow)?;
    let fee = subtotal
        .checked_mul(U256::from(fee_percent))
        .ok_or(BookingError::AmountOverflow)?
        / U256::from(100u64);

    subtotal
        .checked_add(fee)
        .ok_or(BookingError::AmountOverflow)
}
