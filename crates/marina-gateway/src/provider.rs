//! # External Collaborators
//!
//! The three services a booking talks to, as traits, plus the wire shapes
//! of the voyage listing.
//!
//! ```text
//! ┌──────────────┐   voyages(query)          ┌──────────────────────────┐
//! │ VoyageSource │ ────────────────────────► │ VoyageListing            │
//! └──────────────┘                           │  voyages[]               │
//!                                            │  seatInformation[]       │
//!                                            │   (keyed by voyageId)    │
//!                                            └────────────┬─────────────┘
//!                                                         │ into_voyages()
//!                                                         ▼
//!                                                  marina_core::Voyage
//!
//! ┌──────────────┐   convert(1, TRY, USD) → 0.029
//! │ RateSource   │
//! └──────────────┘
//!
//! ┌──────────────┐   create_ticket(pending)  → TicketReceipt
//! │ TicketApi    │   report_sold_seats(voyage, seats)
//! └──────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use marina_core::inventory::SoldBitmap;
use marina_core::{
    ClassCounts, Currency, Deck, PendingTicket, SeatId, SeatOccupancy, ShipType, TicketClass,
    TicketReceipt, Voyage, VoyageId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::error::{GatewayError, GatewayResult};

// =============================================================================
// Traits
// =============================================================================

/// Lists voyages with their seat availability.
#[async_trait]
pub trait VoyageSource: Send + Sync {
    async fn voyages(&self, query: &VoyageQuery) -> GatewayResult<VoyageListing>;
}

/// Converts amounts between currencies.
///
/// `amount` and the result are in major units. Asking for `1.0` yields the
/// rate itself.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn convert(&self, amount: f64, from: Currency, to: Currency) -> GatewayResult<f64>;
}

/// Creates tickets and records sold seats.
#[async_trait]
pub trait TicketApi: Send + Sync {
    async fn create_ticket(&self, ticket: &PendingTicket) -> GatewayResult<TicketReceipt>;

    async fn report_sold_seats(&self, voyage_id: &VoyageId, seats: &[SeatId]) -> GatewayResult<()>;
}

// =============================================================================
// Voyage Query
// =============================================================================

/// Route and date to list voyages for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoyageQuery {
    pub departure_port: String,
    pub arrival_port: String,
    pub date: NaiveDate,
}

impl VoyageQuery {
    pub fn new(departure_port: impl Into<String>, arrival_port: impl Into<String>, date: NaiveDate) -> Self {
        VoyageQuery {
            departure_port: departure_port.into(),
            arrival_port: arrival_port.into(),
            date,
        }
    }
}

// =============================================================================
// Voyage Listing (wire format)
// =============================================================================

/// One voyage as listed by the booking API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoyageRecord {
    pub id: VoyageId,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub ship_type: ShipType,
}

/// Sold flags for one deck and class, `'1'` sold and `'0'` free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatBitmapRecord {
    pub deck: Deck,
    pub class: TicketClass,
    pub sold: String,
}

impl SeatBitmapRecord {
    pub fn parse(&self) -> GatewayResult<SoldBitmap> {
        let sold = self
            .sold
            .chars()
            .map(|c| match c {
                '1' => Ok(true),
                '0' => Ok(false),
                other => Err(GatewayError::MalformedResponse(format!(
                    "seat bitmap for {} {} contains {:?}",
                    self.deck, self.class, other
                ))),
            })
            .collect::<GatewayResult<Vec<bool>>>()?;
        Ok(SoldBitmap {
            deck: self.deck,
            class: self.class,
            sold,
        })
    }
}

/// Remaining counts and sold bitmaps for one voyage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatInformation {
    pub voyage_id: VoyageId,
    pub promo_available: u32,
    pub economy_available: u32,
    pub business_available: u32,
    #[serde(default)]
    pub seats: Vec<SeatBitmapRecord>,
}

impl SeatInformation {
    fn remaining(&self) -> ClassCounts {
        ClassCounts {
            promo: self.promo_available,
            economy: self.economy_available,
            business: self.business_available,
        }
    }

    fn occupancy(&self) -> GatewayResult<SeatOccupancy> {
        if self.seats.is_empty() {
            return Ok(SeatOccupancy::Unreported);
        }
        let bitmaps = self
            .seats
            .iter()
            .map(SeatBitmapRecord::parse)
            .collect::<GatewayResult<Vec<_>>>()?;
        Ok(SeatOccupancy::Bitmaps(bitmaps))
    }
}

/// Voyage query response: voyages plus a parallel seat-information list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoyageListing {
    #[serde(default)]
    pub voyages: Vec<VoyageRecord>,
    #[serde(default)]
    pub seat_information: Vec<SeatInformation>,
}

impl VoyageListing {
    /// Joins voyages with their seat information.
    ///
    /// A voyage without seat information is kept with zero remaining seats;
    /// availability is never invented.
    pub fn into_voyages(self) -> GatewayResult<Vec<Voyage>> {
        let mut info: HashMap<VoyageId, SeatInformation> = self
            .seat_information
            .into_iter()
            .map(|i| (i.voyage_id.clone(), i))
            .collect();

        self.voyages
            .into_iter()
            .map(|record| {
                let (remaining, occupancy) = match info.remove(&record.id) {
                    Some(i) => (i.remaining(), i.occupancy()?),
                    None => {
                        warn!(voyage_id = %record.id, "No seat information for voyage");
                        (ClassCounts::default(), SeatOccupancy::Unreported)
                    }
                };
                let voyage = Voyage {
                    id: record.id,
                    departure_time: record.departure_time,
                    arrival_time: record.arrival_time,
                    ship_type: record.ship_type,
                    remaining,
                    occupancy,
                };
                voyage
                    .check()
                    .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
                Ok(voyage)
            })
            .collect()
    }
}

// =============================================================================
// Seat-Sold Notification (wire format)
// =============================================================================

/// Body of the seat-sold notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoldSeatsReport {
    pub voyage_id: VoyageId,
    pub seats: Vec<SeatId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "voyages": [
            {
                "id": "V-100",
                "departureTime": "2026-06-20T09:30:00Z",
                "arrivalTime": "2026-06-20T11:05:00Z",
                "shipType": "catamaran"
            },
            {
                "id": "V-200",
                "departureTime": "2026-06-20T15:00:00Z",
                "arrivalTime": "2026-06-20T16:35:00Z",
                "shipType": "sea_bus"
            }
        ],
        "seatInformation": [
            {
                "voyageId": "V-100",
                "promoAvailable": 18,
                "economyAvailable": 34,
                "businessAvailable": 17,
                "seats": [
                    { "deck": "main", "class": "economy", "sold": "0101" },
                    { "deck": "upper", "class": "business", "sold": "1" }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_listing_joins_seat_information() {
        let listing: VoyageListing = serde_json::from_str(LISTING).unwrap();
        let voyages = listing.into_voyages().unwrap();
        assert_eq!(voyages.len(), 2);

        let first = &voyages[0];
        assert_eq!(first.id, VoyageId::new("V-100"));
        assert_eq!(first.remaining.economy, 34);
        match &first.occupancy {
            SeatOccupancy::Bitmaps(maps) => {
                assert_eq!(maps[0].sold, vec![false, true, false, true]);
                assert_eq!(maps[1].deck, Deck::Upper);
            }
            other => panic!("expected bitmaps, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_seat_information_means_no_availability() {
        let listing: VoyageListing = serde_json::from_str(LISTING).unwrap();
        let voyages = listing.into_voyages().unwrap();

        let second = &voyages[1];
        assert_eq!(second.remaining, ClassCounts::default());
        assert_eq!(second.occupancy, SeatOccupancy::Unreported);
    }

    #[test]
    fn test_bad_bitmap_is_malformed() {
        let record = SeatBitmapRecord {
            deck: Deck::Main,
            class: TicketClass::Promo,
            sold: "01x".to_string(),
        };
        assert!(matches!(record.parse(), Err(GatewayError::MalformedResponse(_))));
    }

    #[test]
    fn test_voyage_arriving_before_departure_is_rejected() {
        let listing = VoyageListing {
            voyages: vec![VoyageRecord {
                id: VoyageId::new("V-9"),
                departure_time: "2026-06-20T12:00:00Z".parse().unwrap(),
                arrival_time: "2026-06-20T11:00:00Z".parse().unwrap(),
                ship_type: ShipType::new("catamaran"),
            }],
            seat_information: vec![],
        };
        assert!(matches!(
            listing.into_voyages(),
            Err(GatewayError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_query_wire_format() {
        let query = VoyageQuery::new(
            "Eminonu",
            "Kadikoy",
            NaiveDate::from_ymd_opt(2026, 6, 20).unwrap(),
        );
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["departurePort"], "Eminonu");
        assert_eq!(json["date"], "2026-06-20");
    }
}
