//! # Seat Assignment Engine
//!
//! Turns a passenger count and a ticket class into concrete seats, either
//! automatically or by manual toggling.
//!
//! ## Class Restriction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  ticket class ──► eligible seat bands                   │
//! │                                                                         │
//! │   business ticket   ──►  business seats only                           │
//! │   economy ticket    ──►  economy, promo  (never business)              │
//! │   promo ticket      ──►  economy, promo  (never business)              │
//! │                                                                         │
//! │   auto_assign draws from the ticket's own band only;                   │
//! │   manual picks may use any eligible band.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Manual Toggling (FIFO)
//! ```text
//! passengers = 2
//!
//! toggle M1A   [M1A]
//! toggle M1C   [M1A, M1C]
//! toggle M2A   [M1C, M2A]      ◄── M1A (oldest) evicted
//! toggle M1C   [M2A]           ◄── already selected: removed
//! ```
//!
//! The passenger index of a seat is its position in the selection.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::inventory::{Seat, SeatId, VoyageLayout};
use crate::layout::Deck;
use crate::types::TicketClass;

// =============================================================================
// Restriction
// =============================================================================

/// Whether a seat can take a passenger of the current booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SeatAvailability {
    Available,
    /// Sold, or held by a different passenger on this leg.
    Occupied,
    /// The seat's band does not match the ticket class.
    Restricted,
}

/// Business tickets sit in business; everyone else stays out of it.
#[inline]
pub fn class_allows(ticket_class: TicketClass, seat_class: TicketClass) -> bool {
    ticket_class.is_business() == seat_class.is_business()
}

/// Classifies a seat for one passenger of the leg.
///
/// With `passenger: Some(i)`, a seat already held by another passenger in
/// `selection` is `Occupied`. With `None`, the selection is not consulted,
/// which is the view a click handler needs.
pub fn restriction_of(
    seat: &Seat,
    ticket_class: TicketClass,
    selection: &SeatSelection,
    passenger: Option<usize>,
) -> SeatAvailability {
    if !class_allows(ticket_class, seat.class) {
        return SeatAvailability::Restricted;
    }
    if seat.occupied {
        return SeatAvailability::Occupied;
    }
    match (passenger, selection.position(&seat.id)) {
        (Some(me), Some(holder)) if me != holder => SeatAvailability::Occupied,
        _ => SeatAvailability::Available,
    }
}

// =============================================================================
// Selection
// =============================================================================

/// Ordered, duplicate-free seats chosen for one leg.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatSelection {
    seats: Vec<SeatId>,
}

impl SeatSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a selection, keeping the first occurrence of repeated seats.
    pub fn from_seats(seats: impl IntoIterator<Item = SeatId>) -> Self {
        let mut selection = SeatSelection::new();
        for seat in seats {
            if !selection.contains(&seat) {
                selection.seats.push(seat);
            }
        }
        selection
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn contains(&self, seat: &SeatId) -> bool {
        self.seats.contains(seat)
    }

    /// Passenger index holding the seat.
    pub fn position(&self, seat: &SeatId) -> Option<usize> {
        self.seats.iter().position(|s| s == seat)
    }

    pub fn seats(&self) -> &[SeatId] {
        &self.seats
    }

    pub fn seat_for(&self, passenger: usize) -> Option<SeatId> {
        self.seats.get(passenger).copied()
    }

    /// `(passenger_index, seat)` pairs in passenger order.
    pub fn assignments(&self) -> impl Iterator<Item = (usize, SeatId)> + '_ {
        self.seats.iter().copied().enumerate()
    }

    /// Drops seats failing `keep`, preserving order.
    pub fn retain(&mut self, keep: impl FnMut(&SeatId) -> bool) {
        self.seats.retain(keep);
    }

    /// Keeps the `max` most recent picks.
    pub fn keep_newest(&mut self, max: usize) {
        let excess = self.seats.len().saturating_sub(max);
        self.seats.drain(..excess);
    }
}

// =============================================================================
// Automatic Assignment
// =============================================================================

/// Result of [`auto_assign`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoAssignment {
    pub seats: SeatSelection,
    /// Passengers left without a seat.
    pub shortfall: usize,
}

impl AutoAssignment {
    pub fn is_complete(&self) -> bool {
        self.shortfall == 0
    }
}

/// Picks seats for `passenger_count` passengers of `ticket_class`.
///
/// ## Algorithm
/// ```text
/// 1. Collect available seats of exactly `ticket_class`, per deck,
///    in row-then-column order.
/// 2. Ask for ceil(n/2) from the main deck, the rest from upper.
///    (n = 1 ⇒ the single passenger prefers the main deck.)
/// 3. If one side under-supplies, top up from the other's surplus,
///    main first.
/// 4. Return main picks then upper picks; shortfall = n - picked.
/// ```
pub fn auto_assign(
    passenger_count: usize,
    ticket_class: TicketClass,
    layout: &VoyageLayout,
) -> AutoAssignment {
    let candidates = |deck: Deck| -> Vec<SeatId> {
        layout
            .deck(deck)
            .map(|grid| {
                grid.seats()
                    .filter(|s| s.class == ticket_class && !s.occupied)
                    .map(|s| s.id)
                    .collect()
            })
            .unwrap_or_default()
    };
    let main = candidates(Deck::Main);
    let upper = candidates(Deck::Upper);

    let want_main = passenger_count.div_ceil(2);
    let want_upper = passenger_count - want_main;

    let mut take_main = want_main.min(main.len());
    let mut take_upper = want_upper.min(upper.len());

    let mut deficit = passenger_count - take_main - take_upper;
    let extra_main = deficit.min(main.len() - take_main);
    take_main += extra_main;
    deficit -= extra_main;
    let extra_upper = deficit.min(upper.len() - take_upper);
    take_upper += extra_upper;
    deficit -= extra_upper;

    let seats = SeatSelection::from_seats(
        main[..take_main]
            .iter()
            .chain(&upper[..take_upper])
            .copied(),
    );

    AutoAssignment {
        seats,
        shortfall: deficit,
    }
}

// =============================================================================
// Manual Toggling
// =============================================================================

/// Toggles `seat` in a manual selection capped at `passenger_count`.
///
/// ## Rules
/// - Already selected: removed.
/// - Selection full: the oldest pick is evicted, then `seat` is appended.
/// - Otherwise: appended.
///
/// Eligibility is the caller's concern; see [`restriction_of`].
pub fn toggle_manual(
    seat: SeatId,
    selection: &SeatSelection,
    passenger_count: usize,
) -> SeatSelection {
    let mut next = selection.clone();

    if let Some(index) = next.position(&seat) {
        next.seats.remove(index);
        return next;
    }
    if passenger_count == 0 {
        return next;
    }

    next.keep_newest(passenger_count - 1);
    next.seats.push(seat);
    next
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{materialize, SeatOccupancy};
    use crate::layout::{ClassBand, DeckTemplate, LayoutCatalog, LayoutTemplate, ShipType};
    use crate::testing::two_deck_template;
    use crate::types::ClassCounts;
    use proptest::prelude::*;

    fn id(code: &str) -> SeatId {
        code.parse().unwrap()
    }

    fn codes(selection: &SeatSelection) -> Vec<String> {
        selection.seats().iter().map(|s| s.to_string()).collect()
    }

    /// Economy on both decks: 6 seats main, 4 seats upper.
    fn economy_ship() -> VoyageLayout {
        let deck = |deck, rows| DeckTemplate {
            deck,
            rows,
            columns: 2,
            bands: vec![ClassBand::new(TicketClass::Economy, 1, rows)],
            gaps: vec![],
        };
        let template = LayoutTemplate {
            ship_type: ShipType::new("economy_ship"),
            decks: vec![deck(Deck::Main, 3), deck(Deck::Upper, 2)],
        };
        materialize(&template, &SeatOccupancy::Unreported)
    }

    #[test]
    fn test_restriction_policy() {
        let layout = materialize(&two_deck_template(), &SeatOccupancy::Unreported);
        let business = *layout.seat(&id("U1A")).unwrap();
        let economy = *layout.seat(&id("M1A")).unwrap();
        let promo = *layout.seat(&id("M3A")).unwrap();
        let empty = SeatSelection::new();

        use SeatAvailability::*;
        assert_eq!(restriction_of(&business, TicketClass::Business, &empty, None), Available);
        assert_eq!(restriction_of(&economy, TicketClass::Business, &empty, None), Restricted);
        assert_eq!(restriction_of(&business, TicketClass::Economy, &empty, None), Restricted);
        assert_eq!(restriction_of(&promo, TicketClass::Economy, &empty, None), Available);
        assert_eq!(restriction_of(&economy, TicketClass::Promo, &empty, None), Available);
    }

    #[test]
    fn test_restriction_occupied() {
        let sold = ClassCounts {
            promo: 0,
            economy: 1,
            business: 0,
        };
        let layout = materialize(&two_deck_template(), &SeatOccupancy::Counts(sold));
        let sold_seat = *layout.seat(&id("M1A")).unwrap();
        let free_seat = *layout.seat(&id("M1C")).unwrap();
        let selection = SeatSelection::from_seats([id("M1C")]);

        use SeatAvailability::*;
        assert_eq!(restriction_of(&sold_seat, TicketClass::Economy, &selection, None), Occupied);
        // held by passenger 0
        assert_eq!(restriction_of(&free_seat, TicketClass::Economy, &selection, Some(1)), Occupied);
        assert_eq!(restriction_of(&free_seat, TicketClass::Economy, &selection, Some(0)), Available);
        assert_eq!(restriction_of(&free_seat, TicketClass::Economy, &selection, None), Available);
    }

    #[test]
    fn test_auto_assign_single_prefers_main() {
        let result = auto_assign(1, TicketClass::Economy, &economy_ship());
        assert_eq!(codes(&result.seats), vec!["M1A"]);
        assert!(result.is_complete());
    }

    #[test]
    fn test_auto_assign_single_falls_back_to_upper() {
        // business only exists on the upper deck
        let layout = materialize(&two_deck_template(), &SeatOccupancy::Unreported);
        let result = auto_assign(1, TicketClass::Business, &layout);
        assert_eq!(codes(&result.seats), vec!["U1A"]);
    }

    #[test]
    fn test_auto_assign_splits_decks() {
        let result = auto_assign(5, TicketClass::Economy, &economy_ship());
        assert_eq!(codes(&result.seats), vec!["M1A", "M1B", "M2A", "U1A", "U1B"]);
    }

    #[test]
    fn test_auto_assign_tops_up_from_surplus() {
        // 9 passengers: 5 from main, 4 from upper
        let result = auto_assign(9, TicketClass::Economy, &economy_ship());
        assert_eq!(result.seats.len(), 9);
        assert_eq!(result.seats.seats().iter().filter(|s| s.deck == Deck::Main).count(), 5);

        // 6 passengers: 3 + 3 wanted, upper has only 2, main covers the rest
        let layout = materialize(&two_deck_template(), &SeatOccupancy::Unreported);
        let result = auto_assign(6, TicketClass::Economy, &layout);
        assert_eq!(codes(&result.seats), vec!["M1A", "M1C", "M2A", "M2C", "U2A", "U2C"]);
        assert!(result.is_complete());
    }

    #[test]
    fn test_auto_assign_shortfall() {
        let layout = materialize(&two_deck_template(), &SeatOccupancy::Unreported);
        let result = auto_assign(4, TicketClass::Promo, &layout);
        assert_eq!(codes(&result.seats), vec!["M3A", "M3C"]);
        assert_eq!(result.shortfall, 2);
        assert!(!result.is_complete());
    }

    #[test]
    fn test_auto_assign_skips_sold_seats() {
        let sold = ClassCounts {
            promo: 0,
            economy: 2,
            business: 0,
        };
        let layout = materialize(&two_deck_template(), &SeatOccupancy::Counts(sold));
        let result = auto_assign(1, TicketClass::Economy, &layout);
        assert_eq!(codes(&result.seats), vec!["M2A"]);
    }

    #[test]
    fn test_auto_assign_zero_passengers() {
        let result = auto_assign(0, TicketClass::Economy, &economy_ship());
        assert!(result.seats.is_empty());
        assert!(result.is_complete());
    }

    #[test]
    fn test_toggle_fifo() {
        let s = SeatSelection::new();
        let s = toggle_manual(id("M1A"), &s, 2);
        let s = toggle_manual(id("M1C"), &s, 2);
        assert_eq!(codes(&s), vec!["M1A", "M1C"]);

        let s = toggle_manual(id("M2A"), &s, 2);
        assert_eq!(codes(&s), vec!["M1C", "M2A"]);

        let s = toggle_manual(id("M1C"), &s, 2);
        assert_eq!(codes(&s), vec!["M2A"]);
    }

    #[test]
    fn test_toggle_with_zero_passengers_is_noop() {
        let s = toggle_manual(id("M1A"), &SeatSelection::new(), 0);
        assert!(s.is_empty());
    }

    #[test]
    fn test_assignments_follow_order() {
        let s = SeatSelection::from_seats([id("M2A"), id("M1A"), id("M2A")]);
        let pairs: Vec<_> = s.assignments().collect();
        assert_eq!(pairs, vec![(0, id("M2A")), (1, id("M1A"))]);
        assert_eq!(s.seat_for(1), Some(id("M1A")));
    }

    fn catamaran() -> VoyageLayout {
        let catalog = LayoutCatalog::builtin();
        let template = catalog.get(&ShipType::new("catamaran")).unwrap();
        materialize(template, &SeatOccupancy::Unreported)
    }

    fn ticket_class() -> impl Strategy<Value = TicketClass> {
        prop_oneof![
            Just(TicketClass::Promo),
            Just(TicketClass::Economy),
            Just(TicketClass::Business),
        ]
    }

    proptest! {
        #[test]
        fn prop_auto_assign_respects_class_and_count(
            count in 0usize..40,
            class in ticket_class(),
        ) {
            let layout = catamaran();
            let result = auto_assign(count, class, &layout);

            prop_assert!(result.seats.len() <= count);
            prop_assert_eq!(result.seats.len() + result.shortfall, count);

            let mut seen = std::collections::HashSet::new();
            for seat_id in result.seats.seats() {
                prop_assert!(seen.insert(*seat_id), "duplicate {}", seat_id);
                let seat = layout.seat(seat_id).unwrap();
                prop_assert!(!seat.occupied);
                prop_assert!(class_allows(class, seat.class));
                prop_assert_eq!(seat.class, class);
            }
        }

        #[test]
        fn prop_toggle_never_exceeds_cap_and_evicts_oldest(
            count in 1usize..5,
            picks in proptest::collection::vec((1u16..=12, 1u8..=5), 1..30),
        ) {
            let mut selection = SeatSelection::new();
            for (row, column) in picks {
                let seat = SeatId::new(Deck::Main, row, column);
                let before = selection.clone();
                selection = toggle_manual(seat, &selection, count);

                prop_assert!(selection.len() <= count);
                if !before.contains(&seat) && before.len() == count {
                    // exactly the earliest-added seat is gone
                    prop_assert!(!selection.contains(&before.seats()[0]));
                    prop_assert_eq!(&selection.seats()[..count - 1], &before.seats()[1..]);
                    prop_assert_eq!(selection.seats()[count - 1], seat);
                }
            }
        }
    }
}
