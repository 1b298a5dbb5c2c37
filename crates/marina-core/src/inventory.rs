//! # Seat Inventory Model
//!
//! Materializes a ship's layout template into a concrete seat grid for one
//! voyage and marks which seats are already sold.
//!
//! ## Flow
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │  LayoutTemplate  │     │  SeatOccupancy   │
//! │  (ship type)     │     │  (from Voyage)   │
//! └────────┬─────────┘     └────────┬─────────┘
//!          │                        │
//!          └──────────┬─────────────┘
//!                     ▼
//!          ┌─────────────────────┐
//!          │  materialize()      │  deterministic:
//!          │                     │  same inputs ⇒ identical grid
//!          └──────────┬──────────┘
//!                     ▼
//!          ┌─────────────────────┐        ┌─────────────────────┐
//!          │  VoyageLayout       │───────►│  InventorySummary   │
//!          │  decks × rows × cols│        │  capacity/occupied/ │
//!          │  Option<Seat> cells │        │  available per class│
//!          └─────────────────────┘        └─────────────────────┘
//! ```
//!
//! The grid is cheap to rebuild and is recomputed whenever the voyage
//! changes. Nothing here is cached between voyages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::layout::{Deck, LayoutTemplate, ShipType, MAX_COLUMNS};
use crate::types::{ClassCounts, TicketClass, Voyage};

// =============================================================================
// Seat Identifier
// =============================================================================

/// Structured seat identifier.
///
/// Compared structurally; the compact code (`M3C`) and the human label
/// (`Main deck, row 3, seat C`) are derived for display and the wire.
///
/// Ordering is layout order: deck, then row, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeatId {
    pub deck: Deck,
    /// 1-based row.
    pub row: u16,
    /// 1-based column; column 1 is seat A.
    pub column: u8,
}

impl SeatId {
    pub const fn new(deck: Deck, row: u16, column: u8) -> Self {
        SeatId { deck, row, column }
    }

    pub fn column_letter(&self) -> char {
        (b'A' + self.column.saturating_sub(1)) as char
    }

    /// Human-readable label, e.g. `Upper deck, row 1, seat A`.
    pub fn label(&self) -> String {
        format!("{}, row {}, seat {}", self.deck, self.row, self.column_letter())
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.deck.code(), self.row, self.column_letter())
    }
}

impl FromStr for SeatId {
    type Err = ValidationError;

    /// Parses a compact code such as `M3C` or `u12a`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "seat".to_string(),
            reason: format!("'{s}' is not a seat code like M3C"),
        };

        let s = s.trim();
        let mut chars = s.chars();
        let deck = chars.next().and_then(Deck::from_code).ok_or_else(invalid)?;
        let letter = chars.next_back().ok_or_else(invalid)?.to_ascii_uppercase();
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let row: u16 = digits.parse().map_err(|_| invalid())?;

        if row == 0 || !letter.is_ascii_uppercase() {
            return Err(invalid());
        }
        let column = (letter as u8 - b'A') + 1;
        if column > MAX_COLUMNS {
            return Err(invalid());
        }

        Ok(SeatId { deck, row, column })
    }
}

impl TryFrom<String> for SeatId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeatId> for String {
    fn from(id: SeatId) -> Self {
        id.to_string()
    }
}

// =============================================================================
// Seat
// =============================================================================

/// Display status of a seat for the current booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    Available,
    Occupied,
    /// Ineligible for this booking's ticket class.
    Restricted,
    /// Chosen by a passenger on this leg.
    Selected,
}

/// A physical seat on a materialized voyage layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: SeatId,
    pub class: TicketClass,
    /// Sold to another booking.
    pub occupied: bool,
}

// =============================================================================
// Occupancy Input
// =============================================================================

/// Sold flags for the seats of one class on one deck, in layout order.
///
/// Entry `i` belongs to the `i`-th seat of that class on that deck.
/// Missing entries count as unsold; surplus entries are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoldBitmap {
    pub deck: Deck,
    pub class: TicketClass,
    pub sold: Vec<bool>,
}

/// What the voyage provider told us about sold seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum SeatOccupancy {
    /// Per-seat sold flags per deck and class.
    Bitmaps(Vec<SoldBitmap>),
    /// Sold counts per class; the first N seats of the class in layout
    /// order (main deck, then upper) are marked sold.
    Counts(ClassCounts),
    /// Nothing per seat; only the voyage's remaining counts apply.
    Unreported,
}

impl Default for SeatOccupancy {
    fn default() -> Self {
        SeatOccupancy::Unreported
    }
}

// =============================================================================
// Voyage Layout
// =============================================================================

/// One deck of a materialized layout. `None` cells are gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckGrid {
    pub deck: Deck,
    pub cells: Vec<Vec<Option<Seat>>>,
}

impl DeckGrid {
    /// Seats in row-then-column order.
    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.cells.iter().flatten().flatten()
    }
}

/// A seat grid for one voyage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoyageLayout {
    pub ship_type: ShipType,
    /// Main deck first.
    pub decks: Vec<DeckGrid>,
}

impl VoyageLayout {
    /// Seats in layout order across all decks.
    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.decks.iter().flat_map(DeckGrid::seats)
    }

    pub fn deck(&self, deck: Deck) -> Option<&DeckGrid> {
        self.decks.iter().find(|d| d.deck == deck)
    }

    pub fn seat(&self, id: &SeatId) -> Option<&Seat> {
        let grid = self.deck(id.deck)?;
        let row = grid.cells.get(usize::from(id.row).checked_sub(1)?)?;
        row.get(usize::from(id.column).checked_sub(1)?)?.as_ref()
    }

    /// Capacity and occupancy per class as seen on the grid.
    pub fn inventory(&self) -> InventorySummary {
        let mut capacity = ClassCounts::default();
        let mut occupied = ClassCounts::default();
        for seat in self.seats() {
            *capacity.get_mut(seat.class) += 1;
            if seat.occupied {
                *occupied.get_mut(seat.class) += 1;
            }
        }
        InventorySummary::new(capacity, occupied)
    }

    /// Materializes the voyage's own layout.
    ///
    /// The provider's remaining counts cap each class: when they report
    /// fewer free seats than the occupancy input leaves, further seats of
    /// that class are marked sold in layout order. The grid then agrees
    /// with [`InventorySummary::reconcile`].
    pub fn for_voyage(template: &LayoutTemplate, voyage: &Voyage) -> VoyageLayout {
        let mut layout = materialize(template, &voyage.occupancy);
        layout.cap_available(&voyage.remaining);
        layout
    }

    fn cap_available(&mut self, remaining: &ClassCounts) {
        let inventory = self.inventory();
        let mut excess = ClassCounts::default();
        for class in TicketClass::ALL {
            *excess.get_mut(class) = inventory.get(class).available.saturating_sub(remaining.get(class));
        }

        let seats = self.decks.iter_mut().flat_map(|d| d.cells.iter_mut().flatten().flatten());
        for seat in seats.filter(|s| !s.occupied) {
            let left = excess.get_mut(seat.class);
            if *left > 0 {
                seat.occupied = true;
                *left -= 1;
            }
        }
    }
}

/// Builds the seat grid for a template and occupancy input.
///
/// ## Determinism
/// Seat order, classes and sold flags depend only on the arguments.
/// Sold counts larger than a class's capacity mark every seat of that
/// class sold and nothing more.
pub fn materialize(template: &LayoutTemplate, occupancy: &SeatOccupancy) -> VoyageLayout {
    // Running per-class ordinal across decks, for count-based occupancy.
    let mut class_ordinal = ClassCounts::default();

    let decks = template
        .decks_in_order()
        .map(|deck_template| {
            let mut deck_ordinal = ClassCounts::default();
            let cells: Vec<Vec<Option<Seat>>> = (1..=deck_template.rows)
                .map(|row| {
                    (1..=deck_template.columns)
                        .map(|column| {
                            let class = deck_template.class_at(row, column)?;
                            let on_deck = deck_ordinal.get(class);
                            let overall = class_ordinal.get(class);
                            *deck_ordinal.get_mut(class) += 1;
                            *class_ordinal.get_mut(class) += 1;

                            let occupied = match occupancy {
                                SeatOccupancy::Bitmaps(bitmaps) => bitmaps
                                    .iter()
                                    .find(|b| b.deck == deck_template.deck && b.class == class)
                                    .and_then(|b| b.sold.get(on_deck as usize).copied())
                                    .unwrap_or(false),
                                SeatOccupancy::Counts(sold) => overall < sold.get(class),
                                SeatOccupancy::Unreported => false,
                            };

                            Some(Seat {
                                id: SeatId::new(deck_template.deck, row, column),
                                class,
                                occupied,
                            })
                        })
                        .collect::<Vec<_>>()
                })
                .collect();
            DeckGrid {
                deck: deck_template.deck,
                cells,
            }
        })
        .collect();

    VoyageLayout {
        ship_type: template.ship_type.clone(),
        decks,
    }
}

// =============================================================================
// Inventory Summary
// =============================================================================

/// Seat counts for one class.
///
/// ## Invariant
/// `available == capacity.saturating_sub(occupied)`; never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClassInventory {
    pub capacity: u32,
    pub occupied: u32,
    pub available: u32,
}

impl ClassInventory {
    pub fn new(capacity: u32, occupied: u32) -> Self {
        ClassInventory {
            capacity,
            occupied,
            available: capacity.saturating_sub(occupied),
        }
    }
}

/// Seat counts for all classes of a voyage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventorySummary {
    pub promo: ClassInventory,
    pub economy: ClassInventory,
    pub business: ClassInventory,
}

impl InventorySummary {
    pub fn new(capacity: ClassCounts, occupied: ClassCounts) -> Self {
        InventorySummary {
            promo: ClassInventory::new(capacity.promo, occupied.promo),
            economy: ClassInventory::new(capacity.economy, occupied.economy),
            business: ClassInventory::new(capacity.business, occupied.business),
        }
    }

    pub fn get(&self, class: TicketClass) -> ClassInventory {
        match class {
            TicketClass::Promo => self.promo,
            TicketClass::Economy => self.economy,
            TicketClass::Business => self.business,
        }
    }

    /// Applies the provider's remaining counts: a class never shows more
    /// available seats than either source reports.
    pub fn reconcile(&self, remaining: &ClassCounts) -> InventorySummary {
        let adjust = |inv: ClassInventory, remaining: u32| {
            let available = inv.available.min(remaining);
            ClassInventory::new(inv.capacity, inv.capacity - available)
        };
        InventorySummary {
            promo: adjust(self.promo, remaining.promo),
            economy: adjust(self.economy, remaining.economy),
            business: adjust(self.business, remaining.business),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
