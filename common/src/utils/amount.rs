use primitive_types::U256;
use thiserror::Error;

use crate::config::{coin_value, COIN_DECIMALS};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,
    #[error("Invalid character '{}' in amount", _0)]
    InvalidCharacter(char),
    #[error("Too many decimals: got {}, maximum is {}", _0, COIN_DECIMALS)]
    TooManyDecimals(usize),
    #[error("Amount overflow")]
    Overflow,
}

// Convert a base-unit integer into its human decimal representation.
// The output always contains a fractional part: 10^18 => "1.0", 0 => "0.0"
pub fn from_base_units(value: U256) -> String {
    let (whole, fraction) = value.div_mod(coin_value());

    let fraction = format!(
        "{:0>width$}",
        fraction.to_string(),
        width = COIN_DECIMALS as usize
    );
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, fraction)
    }
}

// Parse a human decimal amount into base units without any rounding
pub fn to_base_units(value: &str) -> Result<U256, AmountError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (value, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(AmountError::Empty);
    }

    if let Some(c) = whole.chars().chain(fraction.chars()).find(|c| !c.is_ascii_digit()) {
        return Err(AmountError::InvalidCharacter(c));
    }

    if fraction.len() > COIN_DECIMALS as usize {
        return Err(AmountError::TooManyDecimals(fraction.len()));
    }

    let fraction_scale = U256::exp10(COIN_DECIMALS as usize - fraction.len());
    let whole = parse_digits(whole)?;
    let fraction = parse_digits(fraction)?;

    whole
        .checked_mul(coin_value())
        .and_then(|base| {
            fraction
                .checked_mul(fraction_scale)
                .and_then(|fraction| base.checked_add(fraction))
        })
        .ok_or(AmountError::Overflow)
}

fn parse_digits(digits: &str) -> Result<U256, AmountError> {
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_dec_str(digits).map_err(|_| AmountError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_base_units() {
        assert_eq!(from_base_units(U256::zero()), "0.0");
        assert_eq!(from_base_units(coin_value()), "1.0");
        assert_eq!(from_base_units(U256::from(315u64) * U256::exp10(16)), "3.15");
        assert_eq!(from_base_units(U256::one()), "0.000000000000000001");
        assert_eq!(
            from_base_units(U256::from(1_500_000u64) * coin_value()),
            "1500000.0"
        );
    }

    #[test]
    fn test_to_base_units() {
        assert_eq!(to_base_units("1"), Ok(coin_value()));
        assert_eq!(to_base_units("1.0"), Ok(coin_value()));
        assert_eq!(to_base_units("0.5"), Ok(U256::exp10(17) * 5));
        assert_eq!(to_base_units(".5"), Ok(U256::exp10(17) * 5));
        assert_eq!(to_base_units("3.15"), Ok(U256::from(315u64) * U256::exp10(16)));
        assert_eq!(to_base_units("0.000000000000000001"), Ok(U256::one()));
    }

    #[test]
    fn test_to_base_units_rejects_invalid_input() {
        assert_eq!(to_base_units(""), Err(AmountError::Empty));
        assert_eq!(to_base_units("."), Err(AmountError::Empty));
        assert_eq!(to_base_units("-1"), Err(AmountError::InvalidCharacter('-')));
        assert_eq!(to_base_units("1.2.3"), Err(AmountError::InvalidCharacter('.')));
        assert_eq!(to_base_units("1e5"), Err(AmountError::InvalidCharacter('e')));
        assert_eq!(
            to_base_units("0.0000000000000000001"),
            Err(AmountError::TooManyDecimals(19))
        );
        let too_big = format!("{}0", U256::MAX);
        assert_eq!(to_base_units(&too_big), Err(AmountError::Overflow));
    }

    proptest! {
        #[test]
        fn prop_base_units_round_trip(words in proptest::array::uniform4(any::<u64>())) {
            let value = U256(words);
            prop_assert_eq!(to_base_units(&from_base_units(value)), Ok(value));
        }
    }
}
