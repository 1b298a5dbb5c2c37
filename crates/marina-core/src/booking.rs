//! # Booking Session
//!
//! One customer's booking in progress: a departure leg and an optional
//! return leg, each with its own voyage, seats, passengers and fare.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BookingSession { id, booking_date }                                    │
//! │                                                                         │
//! │  ┌───────────────────────────────┐   ┌───────────────────────────────┐ │
//! │  │ LegBooking (departure)        │   │ LegBooking (return, optional) │ │
//! │  │  voyage      ─► VoyageLayout  │   │  voyage      ─► VoyageLayout  │ │
//! │  │  ticket_class, counts         │   │  ticket_class, counts         │ │
//! │  │  passengers                   │   │  passengers                   │ │
//! │  │  LegSeating (own selection)   │   │  LegSeating (own selection)   │ │
//! │  │  receipt once issued          │   │  receipt once issued          │ │
//! │  └───────────────────────────────┘   └───────────────────────────────┘ │
//! │                                                                         │
//! │  Legs never share a selection: each is a distinct voyage.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is persisted here. Dropping the session abandons the booking
//! without side effects; only ticket creation (in the gateway) makes
//! anything durable.
//!
//! ## Submission Flow
//! ```text
//! ticket_requests()  ──►  one PendingTicket per leg not yet issued
//!        │                 (validated: voyage, seats, passengers)
//!        ▼
//! gateway creates tickets ──► mark_issued(leg, receipt)
//!        │
//!        └── rejection: nothing here changes, the customer retries
//! ```

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::fare::{calculate_leg, FareBreakdown, FarePolicy, LegFare, LegQuote, PricingCatalog};
use crate::inventory::{InventorySummary, SeatId, VoyageLayout};
use crate::layout::LayoutCatalog;
use crate::money::Money;
use crate::seating::{ClickOutcome, LegSeating, SeatMapView, SeatingContext};
use crate::types::{Leg, Passenger, PassengerTypeCounts, TicketClass, Voyage, VoyageId};
use crate::validation::{validate_passenger, validate_passenger_count};

// =============================================================================
// Wire Payloads
// =============================================================================

/// Seats submitted with a ticket.
///
/// Serialized as a list of seat codes, or the string `"auto"` for ships
/// without a seat map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedSeats {
    Seats(Vec<SeatId>),
    Auto,
}

impl Serialize for SelectedSeats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SelectedSeats::Seats(seats) => seats.serialize(serializer),
            SelectedSeats::Auto => serializer.serialize_str("auto"),
        }
    }
}

impl<'de> Deserialize<'de> for SelectedSeats {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            List(Vec<SeatId>),
            Word(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::List(seats) => Ok(SelectedSeats::Seats(seats)),
            Repr::Word(word) if word.eq_ignore_ascii_case("auto") => Ok(SelectedSeats::Auto),
            Repr::Word(word) => Err(de::Error::invalid_value(
                de::Unexpected::Str(&word),
                &"a list of seat codes or \"auto\"",
            )),
        }
    }
}

/// Ticket creation payload for one leg.
///
/// `total_price` is in base-currency minor units (kuruş).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRequest {
    pub voyage_id: VoyageId,
    pub passenger_count: u32,
    pub total_price: Money,
    pub ticket_class: TicketClass,
    pub selected_seats: SelectedSeats,
    pub passengers: Vec<Passenger>,
}

/// A ticket request ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTicket {
    pub leg: Leg,
    /// Stable per leg, so a retried submission cannot issue twice.
    pub idempotency_key: Uuid,
    pub request: TicketRequest,
}

/// Ticket creation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketReceipt {
    #[serde(alias = "id")]
    pub ticket_id: String,
}

// =============================================================================
// Leg Booking
// =============================================================================

/// Everything chosen for one leg.
#[derive(Debug, Clone)]
pub struct LegBooking {
    leg: Leg,
    voyage: Option<Voyage>,
    /// `None` until a voyage is set, and for open-seating ships.
    layout: Option<VoyageLayout>,
    ticket_class: TicketClass,
    counts: PassengerTypeCounts,
    passengers: Vec<Passenger>,
    seating: LegSeating,
    idempotency_key: Uuid,
    receipt: Option<TicketReceipt>,
}

impl LegBooking {
    pub fn new(leg: Leg) -> Self {
        LegBooking {
            leg,
            voyage: None,
            layout: None,
            ticket_class: TicketClass::Economy,
            counts: PassengerTypeCounts::adults(1),
            passengers: Vec::new(),
            seating: LegSeating::new(),
            idempotency_key: Uuid::new_v4(),
            receipt: None,
        }
    }

    pub fn leg(&self) -> Leg {
        self.leg
    }

    pub fn voyage(&self) -> Option<&Voyage> {
        self.voyage.as_ref()
    }

    pub fn layout(&self) -> Option<&VoyageLayout> {
        self.layout.as_ref()
    }

    pub fn ticket_class(&self) -> TicketClass {
        self.ticket_class
    }

    pub fn counts(&self) -> &PassengerTypeCounts {
        &self.counts
    }

    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    pub fn seating(&self) -> &LegSeating {
        &self.seating
    }

    pub fn receipt(&self) -> Option<&TicketReceipt> {
        self.receipt.as_ref()
    }

    pub fn is_issued(&self) -> bool {
        self.receipt.is_some()
    }

    /// Replaces the voyage and rebuilds its seat grid.
    ///
    /// A different voyage starts seat selection over. A re-fetch of the same
    /// voyage keeps the selection and re-checks it against the new grid.
    pub fn set_voyage(&mut self, voyage: Voyage, catalog: &LayoutCatalog) -> CoreResult<()> {
        self.ensure_not_issued("change voyage")?;
        voyage.check()?;

        let template = catalog.get(&voyage.ship_type)?;
        let layout = template
            .has_seat_map()
            .then(|| VoyageLayout::for_voyage(template, &voyage));

        let same_voyage = self.voyage.as_ref().is_some_and(|v| v.id == voyage.id);
        self.voyage = Some(voyage);
        self.layout = layout;

        if same_voyage {
            self.refresh_seating();
        } else {
            self.seating.reset();
        }
        Ok(())
    }

    pub fn set_ticket_class(&mut self, ticket_class: TicketClass) -> CoreResult<()> {
        self.ensure_not_issued("change ticket class")?;
        self.ticket_class = ticket_class;
        self.refresh_seating();
        Ok(())
    }

    pub fn set_passenger_counts(&mut self, counts: PassengerTypeCounts) -> CoreResult<()> {
        self.ensure_not_issued("change passengers")?;
        validate_passenger_count(counts.total())?;
        self.counts = counts;
        self.refresh_seating();
        Ok(())
    }

    /// Stores passenger details; they are validated when the ticket request is built.
    pub fn set_passengers(&mut self, passengers: Vec<Passenger>) -> CoreResult<()> {
        self.ensure_not_issued("change passengers")?;
        self.passengers = passengers;
        Ok(())
    }

    /// Seat counts with the provider's remaining counts applied.
    pub fn inventory(&self) -> Option<InventorySummary> {
        let layout = self.layout.as_ref()?;
        let voyage = self.voyage.as_ref()?;
        Some(layout.inventory().reconcile(&voyage.remaining))
    }

    // -------------------------------------------------------------------------
    // Seating
    // -------------------------------------------------------------------------

    pub fn select_auto_seats(&mut self) -> CoreResult<usize> {
        self.ensure_not_issued("change seats")?;
        let (ctx, seating) = self.seating_parts("select seats")?;
        seating.select_auto(&ctx)
    }

    pub fn select_manual_seats(&mut self) -> CoreResult<()> {
        self.ensure_not_issued("change seats")?;
        self.seating_context("select seats")?;
        self.seating.select_manual()
    }

    pub fn click_seat(&mut self, seat: SeatId) -> CoreResult<ClickOutcome> {
        self.ensure_not_issued("change seats")?;
        let (ctx, seating) = self.seating_parts("select seats")?;
        seating.click(seat, &ctx)
    }

    pub fn confirm_seats(&mut self) -> CoreResult<()> {
        let (ctx, seating) = self.seating_parts("confirm seats")?;
        seating.confirm(&ctx)
    }

    pub fn reopen_seats(&mut self) -> CoreResult<()> {
        self.ensure_not_issued("change seats")?;
        self.seating.reopen()
    }

    pub fn seat_map(&self) -> CoreResult<SeatMapView> {
        let ctx = self.seating_context("show seat map")?;
        Ok(self.seating.seat_map_view(&ctx))
    }

    /// Seats are settled: confirmed, or not applicable on an open-seating ship.
    pub fn seats_ready(&self) -> bool {
        self.voyage.is_some() && (self.layout.is_none() || self.seating.is_confirmed())
    }

    // -------------------------------------------------------------------------
    // Fare & Submission
    // -------------------------------------------------------------------------

    pub fn quote(&self) -> CoreResult<LegQuote> {
        let voyage = self.voyage.as_ref().ok_or(CoreError::VoyageMissing(self.leg))?;
        Ok(LegQuote {
            counts: self.counts,
            ticket_class: self.ticket_class,
            voyage_date: voyage.voyage_date(),
        })
    }

    pub fn fare(
        &self,
        catalog: &PricingCatalog,
        policy: &FarePolicy,
        booking_date: NaiveDate,
    ) -> CoreResult<LegFare> {
        let quote = self.quote()?;
        Ok(calculate_leg(
            &quote.counts,
            catalog.get(quote.ticket_class),
            quote.voyage_date,
            booking_date,
            policy,
        ))
    }

    /// Builds the validated ticket request for this leg.
    pub fn ticket_request(
        &self,
        catalog: &PricingCatalog,
        policy: &FarePolicy,
        booking_date: NaiveDate,
    ) -> CoreResult<PendingTicket> {
        let voyage = self.voyage.as_ref().ok_or(CoreError::VoyageMissing(self.leg))?;
        if !self.seats_ready() {
            return Err(CoreError::SeatingNotConfirmed(self.leg));
        }

        let expected = self.counts.total();
        validate_passenger_count(expected)?;
        let actual = self.passengers.len() as u32;
        if actual != expected {
            return Err(CoreError::PassengerCountMismatch {
                leg: self.leg,
                expected,
                actual,
            });
        }
        let tallied = PassengerTypeCounts::tally(self.passengers.iter().map(|p| &p.passenger_type));
        if tallied != self.counts {
            return Err(ValidationError::InvalidFormat {
                field: "passengers".to_string(),
                reason: format!("passenger types do not match the {} leg's fare", self.leg),
            }
            .into());
        }
        for passenger in &self.passengers {
            validate_passenger(passenger, voyage.voyage_date())?;
        }

        let fare = self.fare(catalog, policy, booking_date)?;
        let selected_seats = match &self.layout {
            Some(_) => SelectedSeats::Seats(self.seating.selection().seats().to_vec()),
            None => SelectedSeats::Auto,
        };

        Ok(PendingTicket {
            leg: self.leg,
            idempotency_key: self.idempotency_key,
            request: TicketRequest {
                voyage_id: voyage.id.clone(),
                passenger_count: expected,
                total_price: fare.total,
                ticket_class: self.ticket_class,
                selected_seats,
                passengers: self.passengers.clone(),
            },
        })
    }

    fn mark_issued(&mut self, receipt: TicketReceipt) {
        self.receipt = Some(receipt);
    }

    fn seating_context(&self, action: &'static str) -> CoreResult<SeatingContext<'_>> {
        if self.voyage.is_none() {
            return Err(CoreError::VoyageMissing(self.leg));
        }
        let layout = self.layout.as_ref().ok_or(CoreError::InvalidTransition {
            state: "open seating",
            action,
        })?;
        Ok(SeatingContext {
            layout,
            ticket_class: self.ticket_class,
            passenger_count: self.counts.total() as usize,
        })
    }

    /// The context plus the seating it applies to, borrowed side by side.
    fn seating_parts(
        &mut self,
        action: &'static str,
    ) -> CoreResult<(SeatingContext<'_>, &mut LegSeating)> {
        if self.voyage.is_none() {
            return Err(CoreError::VoyageMissing(self.leg));
        }
        let layout = self.layout.as_ref().ok_or(CoreError::InvalidTransition {
            state: "open seating",
            action,
        })?;
        let ctx = SeatingContext {
            layout,
            ticket_class: self.ticket_class,
            passenger_count: self.counts.total() as usize,
        };
        Ok((ctx, &mut self.seating))
    }

    fn refresh_seating(&mut self) {
        if let Some(layout) = &self.layout {
            let ctx = SeatingContext {
                layout,
                ticket_class: self.ticket_class,
                passenger_count: self.counts.total() as usize,
            };
            self.seating.refresh(&ctx);
        } else {
            self.seating.reset();
        }
    }

    fn ensure_not_issued(&self, action: &'static str) -> CoreResult<()> {
        if self.is_issued() {
            return Err(CoreError::InvalidTransition {
                state: "issued",
                action,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Booking Session
// =============================================================================

/// A booking in progress.
#[derive(Debug, Clone)]
pub struct BookingSession {
    id: Uuid,
    booking_date: NaiveDate,
    departure: LegBooking,
    return_leg: Option<LegBooking>,
}

impl BookingSession {
    /// One-way booking made on `booking_date`.
    pub fn new(booking_date: NaiveDate) -> Self {
        BookingSession {
            id: Uuid::new_v4(),
            booking_date,
            departure: LegBooking::new(Leg::Departure),
            return_leg: None,
        }
    }

    pub fn round_trip(booking_date: NaiveDate) -> Self {
        let mut session = BookingSession::new(booking_date);
        session.return_leg = Some(LegBooking::new(Leg::Return));
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn booking_date(&self) -> NaiveDate {
        self.booking_date
    }

    pub fn has_return(&self) -> bool {
        self.return_leg.is_some()
    }

    pub fn add_return_leg(&mut self) {
        if self.return_leg.is_none() {
            self.return_leg = Some(LegBooking::new(Leg::Return));
        }
    }

    pub fn remove_return_leg(&mut self) -> CoreResult<()> {
        if let Some(leg) = &self.return_leg {
            leg.ensure_not_issued("remove the return leg")?;
        }
        self.return_leg = None;
        Ok(())
    }

    pub fn leg(&self, leg: Leg) -> CoreResult<&LegBooking> {
        match leg {
            Leg::Departure => Ok(&self.departure),
            Leg::Return => self.return_leg.as_ref().ok_or(CoreError::NoReturnLeg),
        }
    }

    pub fn leg_mut(&mut self, leg: Leg) -> CoreResult<&mut LegBooking> {
        match leg {
            Leg::Departure => Ok(&mut self.departure),
            Leg::Return => self.return_leg.as_mut().ok_or(CoreError::NoReturnLeg),
        }
    }

    pub fn legs(&self) -> impl Iterator<Item = &LegBooking> {
        std::iter::once(&self.departure).chain(self.return_leg.as_ref())
    }

    /// Full fare breakdown for display.
    pub fn fare(&self, catalog: &PricingCatalog, policy: &FarePolicy) -> CoreResult<FareBreakdown> {
        let departure = self.departure.fare(catalog, policy, self.booking_date)?;
        let return_leg = self
            .return_leg
            .as_ref()
            .map(|leg| leg.fare(catalog, policy, self.booking_date))
            .transpose()?;
        Ok(FareBreakdown::new(departure, return_leg))
    }

    /// Ticket requests for every leg not yet issued.
    ///
    /// All legs are validated before any request is returned, so a bad
    /// return leg cannot leave the departure half-submitted.
    pub fn ticket_requests(
        &self,
        catalog: &PricingCatalog,
        policy: &FarePolicy,
    ) -> CoreResult<Vec<PendingTicket>> {
        if let (Some(ret), Some(out)) = (self.return_voyage(), self.departure.voyage()) {
            if ret.departure_time < out.arrival_time {
                return Err(ValidationError::InvalidFormat {
                    field: "return voyage".to_string(),
                    reason: "departs before the outbound voyage arrives".to_string(),
                }
                .into());
            }
        }

        self.legs()
            .filter(|leg| !leg.is_issued())
            .map(|leg| leg.ticket_request(catalog, policy, self.booking_date))
            .collect()
    }

    /// Records a created ticket; the leg is frozen from then on.
    pub fn mark_issued(&mut self, leg: Leg, receipt: TicketReceipt) -> CoreResult<()> {
        self.leg_mut(leg)?.mark_issued(receipt);
        Ok(())
    }

    pub fn pending_legs(&self) -> Vec<Leg> {
        self.legs()
            .filter(|leg| !leg.is_issued())
            .map(LegBooking::leg)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.legs().all(LegBooking::is_issued)
    }

    fn return_voyage(&self) -> Option<&Voyage> {
        self.return_leg.as_ref().and_then(LegBooking::voyage)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
