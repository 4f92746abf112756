//! Normalization layer.
//!
//! Turns raw contract records into stable application records:
//! wide integers are narrowed to `u64`, base-unit amounts become decimal
//! strings and collections are sorted. Every function here is pure and total.

use primitive_types::U256;

use crate::{
    api::{Apartment, Booking, RawApartment, RawBooking, RawReview, Review},
    config::IMAGES_SEPARATOR,
    utils::from_base_units,
};

// Narrow a contract integer, saturating instead of failing
pub fn narrow(value: U256) -> u64 {
    if value.bits() > 64 {
        u64::MAX
    } else {
        value.low_u64()
    }
}

// Split the on-chain delimited image list.
// An empty string gives a single empty entry, like the contract data has it.
pub fn split_images(images: &str) -> Vec<String> {
    images.split(IMAGES_SEPARATOR).map(str::to_owned).collect()
}

pub fn normalize_apartment(apartment: RawApartment) -> Apartment {
    Apartment {
        id: narrow(apartment.id),
        name: apartment.name,
        owner: apartment.owner,
        description: apartment.description,
        location: apartment.location,
        email: apartment.email,
        price: from_base_units(apartment.price),
        images: split_images(&apartment.images),
        rooms: narrow(apartment.rooms),
        deleted: apartment.deleted,
        timestamp: narrow(apartment.timestamp),
        booked: apartment.booked,
    }
}

// Newest first, ties keep their input order
pub fn normalize_apartments(apartments: Vec<RawApartment>) -> Vec<Apartment> {
    let mut apartments: Vec<Apartment> =
        apartments.into_iter().map(normalize_apartment).collect();
    apartments.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    apartments
}

pub fn normalize_booking(booking: RawBooking) -> Booking {
    Booking {
        id: narrow(booking.id),
        aid: narrow(booking.aid),
        tenant: booking.tenant,
        date: narrow(booking.date),
        price: from_base_units(booking.price),
        checked: booking.checked,
        cancelled: booking.cancelled,
        abandoned: booking.abandoned,
    }
}

// Oldest night first, ties keep their input order
pub fn normalize_bookings(bookings: Vec<RawBooking>) -> Vec<Booking> {
    let mut bookings: Vec<Booking> = bookings.into_iter().map(normalize_booking).collect();
    bookings.sort_by(|a, b| a.date.cmp(&b.date));
    bookings
}

pub fn normalize_review(review: RawReview) -> Review {
    Review {
        id: narrow(review.id),
        aid: narrow(review.aid),
        text: review.review_text,
        owner: review.owner,
        timestamp: narrow(review.timestamp),
    }
}

// Newest first, ties keep their input order
pub fn normalize_reviews(reviews: Vec<RawReview>) -> Vec<Review> {
    let mut reviews: Vec<Review> = reviews.into_iter().map(normalize_review).collect();
    reviews.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    reviews
}

// Unavailable nights, kept in contract order
pub fn normalize_dates(dates: Vec<U256>) -> Vec<u64> {
    dates.into_iter().map(narrow).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::coin_value, crypto::Address};
    use proptest::prelude::*;

    fn raw_apartment(id: u64, timestamp: u64, images: &str) -> RawApartment {
        RawApartment {
            id: U256::from(id),
            name: format!("apartment {}", id),
            description: String::new(),
            location: "Porto".into(),
            email: "owner@example.org".into(),
            images: images.into(),
            rooms: U256::from(1u64),
            price: coin_value(),
            owner: Address::new([1u8; 20]),
            booked: false,
            deleted: false,
            timestamp: U256::from(timestamp),
        }
    }

    fn raw_booking(id: u64, date: u64) -> RawBooking {
        RawBooking {
            id: U256::from(id),
            aid: U256::from(1u64),
            tenant: Address::new([2u8; 20]),
            date: U256::from(date),
            price: coin_value() / 2,
            checked: false,
            cancelled: false,
            abandoned: false,
        }
    }

    #[test]
    fn test_split_images() {
        assert_eq!(split_images("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_images("x.png"), vec!["x.png"]);
        assert_eq!(split_images(""), vec![""]);
    }

    #[test]
    fn test_normalize_apartment_fields() {
        let apartment = normalize_apartment(raw_apartment(7, 100, "x.png,y.png"));
        assert_eq!(apartment.id, 7);
        assert_eq!(apartment.images, vec!["x.png", "y.png"]);
        assert_eq!(apartment.price, "1.0");
        assert_eq!(apartment.rooms, 1);
        assert_eq!(apartment.timestamp, 100);
    }

    #[test]
    fn test_normalize_booking_price() {
        let booking = normalize_booking(raw_booking(1, 5));
        assert_eq!(booking.price, "0.5");
        assert_eq!(booking.aid, 1);
    }

    #[test]
    fn test_narrow_saturates() {
        assert_eq!(narrow(U256::from(42u64)), 42);
        assert_eq!(narrow(U256::from(u64::MAX)), u64::MAX);
        assert_eq!(narrow(U256::MAX), u64::MAX);
    }

    #[test]
    fn test_apartment_ties_keep_input_order() {
        let apartments = normalize_apartments(vec![
            raw_apartment(1, 10, ""),
            raw_apartment(2, 20, ""),
            raw_apartment(3, 10, ""),
        ]);
        let ids: Vec<u64> = apartments.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_reviews_newest_first() {
        let review = |id: u64, timestamp: u64| RawReview {
            id: U256::from(id),
            aid: U256::one(),
            review_text: format!("review {}", id),
            timestamp: U256::from(timestamp),
            owner: Address::zero(),
        };
        let reviews = normalize_reviews(vec![review(1, 5), review(2, 9), review(3, 1)]);
        let ids: Vec<u64> = reviews.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(reviews[0].text, "review 2");
    }

    proptest! {
        #[test]
        fn prop_apartments_sorted_descending(timestamps in proptest::collection::vec(0u64..50, 0..40)) {
            let raw = timestamps
                .iter()
                .enumerate()
                .map(|(i, t)| raw_apartment(i as u64, *t, ""))
                .collect();
            let apartments = normalize_apartments(raw);
            prop_assert_eq!(apartments.len(), timestamps.len());
            for pair in apartments.windows(2) {
                prop_assert!(pair[0].timestamp >= pair[1].timestamp);
                // stable: equal timestamps keep ascending input index (= id)
                if pair[0].timestamp == pair[1].timestamp {
                    prop_assert!(pair[0].id < pair[1].id);
                }
            }
        }

        #[test]
        fn prop_bookings_sorted_ascending(dates in proptest::collection::vec(any::<u64>(), 0..40)) {
            let raw = dates
                .iter()
                .enumerate()
                .map(|(i, d)| raw_booking(i as u64, *d))
                .collect();
            let bookings = normalize_bookings(raw);
            for pair in bookings.windows(2) {
                prop_assert!(pair[0].date <= pair[1].date);
            }
        }

        #[test]
        fn prop_normalization_is_deterministic(timestamps in proptest::collection::vec(any::<u64>(), 0..20)) {
            let raw: Vec<RawApartment> = timestamps
                .iter()
                .enumerate()
                .map(|(i, t)| raw_apartment(i as u64, *t, "a,b"))
                .collect();
            prop_assert_eq!(normalize_apartments(raw.clone()), normalize_apartments(raw));
        }
    }
}
