//! Booking records and random booking data.
//!
//! Field names match the wire format of the booking API (`firstname`,
//! `totalprice`, `bookingdates`, ...), so a [`BookingData`] serializes
//! straight into a create/update request body.

use chrono::{Days, Local, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lowest generated total price
pub const MIN_TOTAL_PRICE: u32 = 50;

/// Highest generated total price
pub const MAX_TOTAL_PRICE: u32 = 500;

/// Days from today to the generated check-in date
pub const CHECKIN_OFFSET_DAYS: u64 = 1;

/// Days from today to the generated check-out date
pub const CHECKOUT_OFFSET_DAYS: u64 = 10;

const FIRST_NAMES: &[&str] = &[
    "Amelia", "Bruno", "Carmen", "Dmitri", "Elena", "Farah", "Gustavo", "Hana", "Isaac", "Jasmin",
    "Kofi", "Lena", "Mateo", "Nadia", "Oscar", "Priya", "Quentin", "Rosa", "Sven", "Tariq",
    "Ursula", "Viktor", "Wen", "Yusuf", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Brennan", "Castillo", "Dubois", "Eriksen", "Fischer", "Gallagher", "Haddad",
    "Ivanova", "Jensen", "Kowalski", "Lindqvist", "Moreau", "Nakamura", "Okafor", "Petrov",
    "Quinn", "Romano", "Schmidt", "Takahashi", "Umarov", "Vasquez", "Whitfield", "Yilmaz",
    "Zimmerman",
];

/// Extra need attached to a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdditionalNeeds {
    /// Breakfast included
    Breakfast,
    /// Lunch included
    Lunch,
    /// Dinner included
    Dinner,
    /// Nothing extra
    None,
}

impl AdditionalNeeds {
    /// Every variant, in declaration order
    pub const ALL: [Self; 4] = [Self::Breakfast, Self::Lunch, Self::Dinner, Self::None];

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
            Self::None => "None",
        }
    }
}

impl std::fmt::Display for AdditionalNeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stay dates, serialized as ISO 8601 calendar dates without a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDates {
    /// Check-in date
    pub checkin: NaiveDate,
    /// Check-out date
    pub checkout: NaiveDate,
}

/// Booking payload as accepted and echoed by the booking API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingData {
    /// Guest first name
    pub firstname: String,
    /// Guest last name
    pub lastname: String,
    /// Total price
    pub totalprice: u32,
    /// Whether a deposit was paid
    pub depositpaid: bool,
    /// Stay dates
    pub bookingdates: BookingDates,
    /// Extra need
    pub additionalneeds: AdditionalNeeds,
}

impl BookingData {
    /// Random booking anchored on today's local date
    #[must_use]
    pub fn random() -> Self {
        generate_booking_data(&mut rand::thread_rng(), Local::now().date_naive())
    }

    /// Serialize to a JSON request body
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "firstname": self.firstname,
            "lastname": self.lastname,
            "totalprice": self.totalprice,
            "depositpaid": self.depositpaid,
            "bookingdates": {
                "checkin": self.bookingdates.checkin.to_string(),
                "checkout": self.bookingdates.checkout.to_string(),
            },
            "additionalneeds": self.additionalneeds.as_str(),
        })
    }
}

/// Generate a booking with randomized but constrained fields.
///
/// Price is uniform in `[50, 500]`, check-in is `today + 1`, check-out is
/// `today + 10`, the extra need and deposit flag are uniform. Only `rng`
/// is consumed, so a seeded generator gives a reproducible record.
pub fn generate_booking_data<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> BookingData {
    let firstname = FIRST_NAMES.choose(rng).copied().unwrap_or("Jim");
    let lastname = LAST_NAMES.choose(rng).copied().unwrap_or("Brown");
    let additionalneeds = AdditionalNeeds::ALL
        .choose(rng)
        .copied()
        .unwrap_or(AdditionalNeeds::None);

    BookingData {
        firstname: firstname.to_string(),
        lastname: lastname.to_string(),
        totalprice: rng.gen_range(MIN_TOTAL_PRICE..=MAX_TOTAL_PRICE),
        depositpaid: rng.gen_bool(0.5),
        bookingdates: BookingDates {
            checkin: offset(today, CHECKIN_OFFSET_DAYS),
            checkout: offset(today, CHECKOUT_OFFSET_DAYS),
        },
        additionalneeds,
    }
}

fn offset(today: NaiveDate, days: u64) -> NaiveDate {
    today.checked_add_days(Days::new(days)).unwrap_or(today)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod generator_tests {
        use super::*;

        #[test]
        fn test_dates_are_offset_from_today() {
            let mut rng = StdRng::seed_from_u64(7);
            let data = generate_booking_data(&mut rng, day(2026, 10, 19));
            assert_eq!(data.bookingdates.checkin, day(2026, 10, 20));
            assert_eq!(data.bookingdates.checkout, day(2026, 10, 29));
        }

        #[test]
        fn test_dates_roll_over_month_end() {
            let mut rng = StdRng::seed_from_u64(7);
            let data = generate_booking_data(&mut rng, day(2026, 12, 28));
            assert_eq!(data.bookingdates.checkin, day(2026, 12, 29));
            assert_eq!(data.bookingdates.checkout, day(2027, 1, 7));
        }

        #[test]
        fn test_same_seed_same_record() {
            let today = day(2026, 1, 1);
            let a = generate_booking_data(&mut StdRng::seed_from_u64(42), today);
            let b = generate_booking_data(&mut StdRng::seed_from_u64(42), today);
            assert_eq!(a, b);
        }

        #[test]
        fn test_random_is_reinvocable() {
            let records: Vec<BookingData> = (0..20).map(|_| BookingData::random()).collect();
            assert!(records
                .iter()
                .all(|r| r.bookingdates.checkin < r.bookingdates.checkout));
        }
    }

    mod wire_format_tests {
        use super::*;

        #[test]
        fn test_serializes_with_api_field_names() {
            let data = BookingData {
                firstname: "Jim".to_string(),
                lastname: "Brown".to_string(),
                totalprice: 111,
                depositpaid: true,
                bookingdates: BookingDates {
                    checkin: day(2018, 1, 1),
                    checkout: day(2019, 1, 1),
                },
                additionalneeds: AdditionalNeeds::Breakfast,
            };
            let json = serde_json::to_value(&data).unwrap();
            assert_eq!(json, data.to_value());
            assert_eq!(json["bookingdates"]["checkin"], "2018-01-01");
            assert_eq!(json["additionalneeds"], "Breakfast");
        }

        #[test]
        fn test_unknown_extra_need_rejected() {
            let raw = r#"{"firstname":"a","lastname":"b","totalprice":1,"depositpaid":false,
                "bookingdates":{"checkin":"2020-01-01","checkout":"2020-01-02"},
                "additionalneeds":"Brunch"}"#;
            assert!(serde_json::from_str::<BookingData>(raw).is_err());
        }
    }

    proptest! {
        #[test]
        fn prop_generated_booking_in_bounds(seed in any::<u64>(), offset_days in 0u64..20_000) {
            let today = day(1990, 1, 1).checked_add_days(Days::new(offset_days)).unwrap();
            let data = generate_booking_data(&mut StdRng::seed_from_u64(seed), today);
            prop_assert!(data.bookingdates.checkin < data.bookingdates.checkout);
            prop_assert!((MIN_TOTAL_PRICE..=MAX_TOTAL_PRICE).contains(&data.totalprice));
            prop_assert!(AdditionalNeeds::ALL.contains(&data.additionalneeds));
        }
    }
}
