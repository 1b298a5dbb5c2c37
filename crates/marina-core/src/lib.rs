//! # marina-core: Pure Seat & Fare Logic for Marina
//!
//! This crate is the **heart** of Marina. It decides which seats a booking
//! may take and what the booking costs, as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Marina Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Booking UI                                   │   │
//! │  │   Voyage list ──► Seat map ──► Passengers ──► Checkout          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ marina-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  layout   │  │ assignment │  │   fare    │  │ currency  │  │   │
//! │  │   │ inventory │  │  seating   │  │   money   │  │   rates   │  │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └───────────┘  │   │
//! │  │                        booking (session)                        │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                marina-gateway (External Collaborators)          │   │
//! │  │     voyage feed, rate source, ticket creation, config           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Voyage, TicketClass, PassengerType, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`layout`] - Ship layout templates per ship type
//! - [`inventory`] - Seat grids materialized per voyage
//! - [`assignment`] - Class restriction, auto assignment, FIFO toggling
//! - [`seating`] - Per-leg selection state machine
//! - [`fare`] - Itemized fare calculation
//! - [`currency`] - Exchange-rate arithmetic for display
//! - [`booking`] - Booking session and ticket requests
//! - [`error`] - Domain error types
//! - [`validation`] - Passenger detail validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output; grids and fares are
//!    recomputed, never patched
//! 2. **No I/O**: network, file system and clock access are FORBIDDEN here
//! 3. **Integer Money**: all amounts are minor units (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use marina_core::fare::{calculate_leg, ClassPricing, FarePolicy};
//! use marina_core::money::Money;
//! use marina_core::types::PassengerTypeCounts;
//!
//! let counts = PassengerTypeCounts { adult: 1, student: 1, senior: 0, child: 1 };
//! let pricing = ClassPricing::standard(Money::from_major_minor(200, 0));
//! let booked = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
//! let sails = NaiveDate::from_ymd_opt(2026, 6, 20).unwrap();
//!
//! let fare = calculate_leg(&counts, &pricing, sails, booked, &FarePolicy::default());
//! assert_eq!(fare.total, Money::from_major_minor(400, 0));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod assignment;
pub mod booking;
pub mod currency;
pub mod error;
pub mod fare;
pub mod inventory;
pub mod layout;
pub mod money;
pub mod seating;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use marina_core::Money` instead of
// `use marina_core::money::Money`

pub use booking::{BookingSession, PendingTicket, SelectedSeats, TicketReceipt, TicketRequest};
pub use currency::{Currency, DisplayAmount, ExchangeRateTable};
pub use error::{CoreError, CoreResult, ValidationError};
pub use fare::{FareBreakdown, FarePolicy, LegFare, PricingCatalog};
pub use inventory::{SeatId, SeatOccupancy, VoyageLayout};
pub use layout::{Deck, LayoutCatalog, LayoutTemplate, ShipType};
pub use money::Money;
pub use seating::{LegSeating, SeatMapView};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency every fare is computed and submitted in.
pub const BASE_CURRENCY: Currency = Currency::Try;

/// Days between booking and voyage beyond which the early-booking
/// discount applies.
pub const EARLY_BOOKING_DAYS: i64 = 30;

/// Maximum passengers on a single leg.
///
/// ## Business Reason
/// Larger parties are group bookings, handled by the operator directly.
pub const MAX_PASSENGERS_PER_LEG: u32 = 10;
