//! Shared fixtures for unit tests.

use chrono::{NaiveDate, TimeZone, Utc};

use crate::inventory::SeatOccupancy;
use crate::layout::{ClassBand, Deck, DeckTemplate, Gap, LayoutTemplate, ShipType};
use crate::types::{ClassCounts, Passenger, PassengerType, TicketClass, Voyage, VoyageId};

/// Two small decks, declared upper first.
///
/// ```text
/// Main   1: E . E    Upper  1: B . B
///        2: E . E           2: E . E
///        3: P . P
/// ```
pub(crate) fn two_deck_template() -> LayoutTemplate {
    LayoutTemplate {
        ship_type: ShipType::new("test_ship"),
        decks: vec![
            DeckTemplate {
                deck: Deck::Upper,
                rows: 2,
                columns: 3,
                bands: vec![
                    ClassBand::new(TicketClass::Business, 1, 1),
                    ClassBand::new(TicketClass::Economy, 2, 2),
                ],
                gaps: vec![Gap::Column { column: 2 }],
            },
            DeckTemplate {
                deck: Deck::Main,
                rows: 3,
                columns: 3,
                bands: vec![
                    ClassBand::new(TicketClass::Economy, 1, 2),
                    ClassBand::new(TicketClass::Promo, 3, 3),
                ],
                gaps: vec![Gap::Column { column: 2 }],
            },
        ],
    }
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A voyage of `two_deck_template` departing on the given date.
pub(crate) fn voyage_on(day: NaiveDate, occupancy: SeatOccupancy) -> Voyage {
    let departure = Utc.from_utc_datetime(&day.and_hms_opt(9, 30, 0).unwrap());
    Voyage {
        id: VoyageId::new(format!("V-{day}")),
        departure_time: departure,
        arrival_time: departure + chrono::Duration::minutes(95),
        ship_type: ShipType::new("test_ship"),
        remaining: ClassCounts {
            promo: 2,
            economy: 8,
            business: 2,
        },
        occupancy,
    }
}

pub(crate) fn passenger(name: &str, passenger_type: PassengerType) -> Passenger {
    let child = passenger_type == PassengerType::Child;
    Passenger {
        name: name.to_string(),
        surname: "Yilmaz".to_string(),
        birth_date: if child { date(2019, 5, 20) } else { date(1988, 2, 3) },
        email: (!child).then(|| format!("{}@example.com", name.to_lowercase())),
        phone_no: (!child).then(|| "+90 532 000 0000".to_string()),
        passenger_type,
    }
}
