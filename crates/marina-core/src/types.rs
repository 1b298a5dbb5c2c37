//! # Domain Types
//!
//! Core domain types shared by the seat and fare engines.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Voyage      │   │   TicketClass   │   │  PassengerType  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  Promo          │   │  Adult          │       │
//! │  │  departure/arr. │   │  Economy        │   │  Student        │       │
//! │  │  ship_type      │   │  Business       │   │  Senior         │       │
//! │  │  remaining      │   └─────────────────┘   │  Child          │       │
//! │  │  occupancy      │                          └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Percentage    │   │   ClassCounts   │   │ PassengerType-  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │ Counts          │       │
//! │  │  bps (u32)      │   │  per class      │   │  per type       │       │
//! │  │  1500 = 15%     │   │  seat counts    │   │  head counts    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `Voyage` is immutable once fetched. A re-fetch replaces it wholesale.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::inventory::SeatOccupancy;
use crate::layout::ShipType;

// =============================================================================
// Percentage
// =============================================================================

/// A rate in basis points (1 bps = 0.01%).
///
/// Used for passenger-type discounts and the early-booking discount.
/// 1500 bps = 15% (student), 10000 bps = 100% (child).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percentage(u32);

impl Percentage {
    /// 100%.
    pub const FULL: Percentage = Percentage(10_000);

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    /// Creates a rate from a percentage (for convenience in config files).
    pub fn from_percent(pct: f64) -> Self {
        Percentage((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a fraction of one (for display only).
    #[inline]
    pub fn fraction(&self) -> f64 {
        self.0 as f64 / 10_000.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Percentage(0)
    }

    /// Checks if rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Percentage::zero()
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{:.2}%", self.percent())
        }
    }
}

// =============================================================================
// Leg
// =============================================================================

/// One direction of travel within a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Leg {
    Departure,
    Return,
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Departure => write!(f, "departure"),
            Leg::Return => write!(f, "return"),
        }
    }
}

// =============================================================================
// Ticket Class
// =============================================================================

/// Ticket class; also the class band a seat belongs to.
///
/// Determines the base price and which seats a ticket may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TicketClass {
    Promo,
    Economy,
    Business,
}

impl TicketClass {
    /// All classes in display order.
    pub const ALL: [TicketClass; 3] = [TicketClass::Promo, TicketClass::Economy, TicketClass::Business];

    /// Wire name used by the booking API.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketClass::Promo => "promo",
            TicketClass::Economy => "economy",
            TicketClass::Business => "business",
        }
    }

    #[inline]
    pub fn is_business(&self) -> bool {
        matches!(self, TicketClass::Business)
    }
}

impl fmt::Display for TicketClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "promo" => Ok(TicketClass::Promo),
            "economy" => Ok(TicketClass::Economy),
            "business" => Ok(TicketClass::Business),
            _ => Err(ValidationError::NotAllowed {
                field: "ticket_class".to_string(),
                allowed: TicketClass::ALL.iter().map(|c| c.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Passenger Type
// =============================================================================

/// Passenger type; determines the discount applied to the class base price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PassengerType {
    Adult,
    Student,
    Senior,
    Child,
}

impl PassengerType {
    /// All types in breakdown order.
    pub const ALL: [PassengerType; 4] = [
        PassengerType::Adult,
        PassengerType::Student,
        PassengerType::Senior,
        PassengerType::Child,
    ];

    /// Children may travel without their own email and phone number.
    #[inline]
    pub fn requires_contact(&self) -> bool {
        !matches!(self, PassengerType::Child)
    }
}

impl fmt::Display for PassengerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassengerType::Adult => write!(f, "adult"),
            PassengerType::Student => write!(f, "student"),
            PassengerType::Senior => write!(f, "senior"),
            PassengerType::Child => write!(f, "child"),
        }
    }
}

impl FromStr for PassengerType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "adult" => Ok(PassengerType::Adult),
            "student" => Ok(PassengerType::Student),
            "senior" => Ok(PassengerType::Senior),
            "child" => Ok(PassengerType::Child),
            _ => Err(ValidationError::NotAllowed {
                field: "passenger_type".to_string(),
                allowed: PassengerType::ALL.iter().map(|t| t.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Passenger Type Counts
// =============================================================================

/// Head counts per passenger type for one leg.
///
/// ## Invariant
/// `total()` equals the leg's passenger count. The booking session checks
/// this against the passenger list before a ticket request is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PassengerTypeCounts {
    pub adult: u32,
    pub student: u32,
    pub senior: u32,
    pub child: u32,
}

impl PassengerTypeCounts {
    /// Convenience constructor for `n` adults.
    pub const fn adults(n: u32) -> Self {
        PassengerTypeCounts {
            adult: n,
            student: 0,
            senior: 0,
            child: 0,
        }
    }

    /// Total passengers on the leg, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.adult
            .saturating_add(self.student)
            .saturating_add(self.senior)
            .saturating_add(self.child)
    }

    /// Count for a single passenger type.
    pub fn get(&self, passenger_type: PassengerType) -> u32 {
        match passenger_type {
            PassengerType::Adult => self.adult,
            PassengerType::Student => self.student,
            PassengerType::Senior => self.senior,
            PassengerType::Child => self.child,
        }
    }

    /// Mutable count for a single passenger type.
    pub fn get_mut(&mut self, passenger_type: PassengerType) -> &mut u32 {
        match passenger_type {
            PassengerType::Adult => &mut self.adult,
            PassengerType::Student => &mut self.student,
            PassengerType::Senior => &mut self.senior,
            PassengerType::Child => &mut self.child,
        }
    }

    /// Types with a non-zero count, in breakdown order.
    pub fn present(&self) -> impl Iterator<Item = (PassengerType, u32)> + '_ {
        PassengerType::ALL
            .into_iter()
            .map(|t| (t, self.get(t)))
            .filter(|(_, count)| *count > 0)
    }

    /// Tallies the types of an explicit passenger list.
    pub fn tally<'a>(types: impl IntoIterator<Item = &'a PassengerType>) -> Self {
        let mut counts = PassengerTypeCounts::default();
        for t in types {
            *counts.get_mut(*t) += 1;
        }
        counts
    }
}

// =============================================================================
// Class Counts
// =============================================================================

/// A count per ticket class (remaining seats, sold seats, capacity).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClassCounts {
    pub promo: u32,
    pub economy: u32,
    pub business: u32,
}

impl ClassCounts {
    pub fn get(&self, class: TicketClass) -> u32 {
        match class {
            TicketClass::Promo => self.promo,
            TicketClass::Economy => self.economy,
            TicketClass::Business => self.business,
        }
    }

    pub fn get_mut(&mut self, class: TicketClass) -> &mut u32 {
        match class {
            TicketClass::Promo => &mut self.promo,
            TicketClass::Economy => &mut self.economy,
            TicketClass::Business => &mut self.business,
        }
    }
}

// =============================================================================
// Voyage
// =============================================================================

/// Voyage identifier as issued by the booking API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoyageId(pub String);

impl VoyageId {
    pub fn new(id: impl Into<String>) -> Self {
        VoyageId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoyageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A scheduled crossing as reported by the voyage provider.
///
/// Owned by the booking session for its lifetime; replaced wholesale on
/// re-fetch, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voyage {
    pub id: VoyageId,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    /// Selects the deck/class layout template.
    pub ship_type: ShipType,
    /// Remaining seats per class according to the provider.
    pub remaining: ClassCounts,
    /// Sold seats, as bitmaps or plain counts.
    pub occupancy: SeatOccupancy,
}

impl Voyage {
    /// Calendar date of departure; drives early-booking eligibility.
    pub fn voyage_date(&self) -> NaiveDate {
        self.departure_time.date_naive()
    }

    /// Rejects records whose arrival precedes departure.
    pub fn check(&self) -> Result<(), CoreError> {
        if self.arrival_time < self.departure_time {
            return Err(ValidationError::InvalidFormat {
                field: "arrival_time".to_string(),
                reason: format!("voyage {} arrives before it departs", self.id),
            }
            .into());
        }
        Ok(())
    }
}

// =============================================================================
// Passenger
// =============================================================================

/// Passenger details submitted with a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub name: String,
    pub surname: String,
    pub birth_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_no: Option<String>,
    pub passenger_type: PassengerType,
}

// =============================================================================
// Unit Tests
// =============================================================================
