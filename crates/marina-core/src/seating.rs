//! # Per-Leg Seating State Machine
//!
//! Owns one leg's seat selection and the mode it was made in.
//!
//! ## States
//! ```text
//!  ┌────────────┐  select_auto   ┌──────────────┐
//!  │ Unselected │ ─────────────► │ AutoSelected │ ◄──┐
//!  └─────┬──────┘                └──────┬───────┘    │ select_auto
//!        │ select_manual / click        │ select_manual / click
//!        │                              ▼            │
//!        │                     ┌─────────────────┐   │
//!        └───────────────────► │ ManualSelecting │ ──┘
//!                              └────────┬────────┘
//!                    confirm (auto or manual)
//!                                       ▼
//!                            ┌────────────────────┐
//!                            │ Confirmed { mode } │ ── reopen ──► mode last used
//!                            └────────────────────┘
//! ```
//!
//! - `auto → manual` seeds the manual working set with the auto picks.
//! - `manual → auto` discards manual picks and re-runs auto assignment.
//! - Clicking an occupied or restricted seat is a no-op (`Ignored`).
//! - Confirming short of the passenger count is rejected.
//!
//! Every operation takes a [`SeatingContext`]: the current layout, ticket
//! class and passenger count. Nothing is cached between calls, so a changed
//! input only needs a [`LegSeating::refresh`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::assignment::{auto_assign, restriction_of, toggle_manual, SeatAvailability, SeatSelection};
use crate::error::{CoreError, CoreResult};
use crate::inventory::{Seat, SeatId, SeatStatus, VoyageLayout};
use crate::layout::Deck;
use crate::types::TicketClass;

// =============================================================================
// States
// =============================================================================

/// How the current selection was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Auto,
    Manual,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SeatingState {
    #[default]
    Unselected,
    AutoSelected,
    ManualSelecting,
    Confirmed { mode: SelectionMode },
}

impl SeatingState {
    pub fn name(&self) -> &'static str {
        match self {
            SeatingState::Unselected => "unselected",
            SeatingState::AutoSelected => "auto-selected",
            SeatingState::ManualSelecting => "manual-selecting",
            SeatingState::Confirmed { .. } => "confirmed",
        }
    }
}

/// Inputs every seating operation is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct SeatingContext<'a> {
    pub layout: &'a VoyageLayout,
    pub ticket_class: TicketClass,
    pub passenger_count: usize,
}

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Selected { seat: SeatId, passenger: usize },
    Deselected { seat: SeatId },
    /// The selection was full; the oldest pick made room.
    Replaced { seat: SeatId, evicted: SeatId },
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Occupied,
    Restricted,
    /// A gap or a position outside the grid.
    NotASeat,
    NoPassengers,
}

// =============================================================================
// Leg Seating
// =============================================================================

/// Seat selection for one leg.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegSeating {
    state: SeatingState,
    selection: SeatSelection,
}

impl LegSeating {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SeatingState {
        self.state
    }

    pub fn selection(&self) -> &SeatSelection {
        &self.selection
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self.state, SeatingState::Confirmed { .. })
    }

    /// Mode of the current or last selection.
    pub fn mode(&self) -> Option<SelectionMode> {
        match self.state {
            SeatingState::Unselected => None,
            SeatingState::AutoSelected => Some(SelectionMode::Auto),
            SeatingState::ManualSelecting => Some(SelectionMode::Manual),
            SeatingState::Confirmed { mode } => Some(mode),
        }
    }

    /// Passengers still without a seat.
    pub fn missing(&self, ctx: &SeatingContext<'_>) -> usize {
        ctx.passenger_count.saturating_sub(self.selection.len())
    }

    /// Back to `Unselected`, dropping every pick.
    pub fn reset(&mut self) {
        *self = LegSeating::default();
    }

    /// Runs automatic assignment, discarding any manual picks.
    ///
    /// Returns the shortfall (0 when every passenger got a seat).
    pub fn select_auto(&mut self, ctx: &SeatingContext<'_>) -> CoreResult<usize> {
        self.ensure_open("select seats automatically")?;
        let assignment = auto_assign(ctx.passenger_count, ctx.ticket_class, ctx.layout);
        self.selection = assignment.seats;
        self.state = SeatingState::AutoSelected;
        Ok(assignment.shortfall)
    }

    /// Enters manual mode, seeded with whatever is currently selected.
    pub fn select_manual(&mut self) -> CoreResult<()> {
        self.ensure_open("select seats manually")?;
        self.state = SeatingState::ManualSelecting;
        Ok(())
    }

    /// Toggles a seat. Outside manual mode the click enters it first.
    ///
    /// ## Flow
    /// ```text
    /// click(M3C)
    ///    │
    ///    ├── confirmed?                  → Err(InvalidTransition)
    ///    ├── gap / off-grid?             → Ignored(NotASeat)
    ///    ├── already selected?           → Deselected
    ///    ├── restricted / occupied?      → Ignored(..)
    ///    ├── no passengers?              → Ignored(NoPassengers)
    ///    └── toggle_manual (FIFO)        → Selected | Replaced
    /// ```
    pub fn click(&mut self, seat_id: SeatId, ctx: &SeatingContext<'_>) -> CoreResult<ClickOutcome> {
        self.ensure_open("change seats")?;

        let Some(seat) = ctx.layout.seat(&seat_id) else {
            return Ok(ClickOutcome::Ignored(IgnoreReason::NotASeat));
        };

        let already = self.selection.contains(&seat_id);
        if !already {
            match restriction_of(seat, ctx.ticket_class, &self.selection, None) {
                SeatAvailability::Restricted => {
                    return Ok(ClickOutcome::Ignored(IgnoreReason::Restricted))
                }
                SeatAvailability::Occupied => {
                    return Ok(ClickOutcome::Ignored(IgnoreReason::Occupied))
                }
                SeatAvailability::Available => {}
            }
            if ctx.passenger_count == 0 {
                return Ok(ClickOutcome::Ignored(IgnoreReason::NoPassengers));
            }
        }

        self.state = SeatingState::ManualSelecting;

        let before = std::mem::take(&mut self.selection);
        self.selection = toggle_manual(seat_id, &before, ctx.passenger_count);

        let outcome = if already {
            ClickOutcome::Deselected { seat: seat_id }
        } else if before.len() >= ctx.passenger_count {
            ClickOutcome::Replaced {
                seat: seat_id,
                evicted: before.seats()[0],
            }
        } else {
            ClickOutcome::Selected {
                seat: seat_id,
                passenger: self.selection.len() - 1,
            }
        };
        Ok(outcome)
    }

    /// Locks the selection.
    ///
    /// Rejected unless every passenger has exactly one seat. A short auto
    /// selection reports `SeatShortfall`, a short manual one
    /// `SelectionIncomplete`; a surplus reports `TooManySeats`.
    pub fn confirm(&mut self, ctx: &SeatingContext<'_>) -> CoreResult<()> {
        let selected = self.selection.len();
        let required = ctx.passenger_count;

        let mode = match self.state {
            SeatingState::AutoSelected => SelectionMode::Auto,
            SeatingState::ManualSelecting => SelectionMode::Manual,
            other => {
                return Err(CoreError::InvalidTransition {
                    state: other.name(),
                    action: "confirm seats",
                })
            }
        };

        if selected > required {
            return Err(CoreError::TooManySeats { selected, required });
        }
        if selected < required {
            return Err(match mode {
                SelectionMode::Auto => CoreError::SeatShortfall {
                    requested: required,
                    assigned: selected,
                },
                SelectionMode::Manual => CoreError::SelectionIncomplete { selected, required },
            });
        }

        self.state = SeatingState::Confirmed { mode };
        Ok(())
    }

    /// Unlocks a confirmed selection, returning to the mode last used.
    pub fn reopen(&mut self) -> CoreResult<()> {
        match self.state {
            SeatingState::Confirmed { mode } => {
                self.state = working_state(mode);
                Ok(())
            }
            other => Err(CoreError::InvalidTransition {
                state: other.name(),
                action: "reopen seats",
            }),
        }
    }

    /// Re-derives the selection after the layout, class or count changed.
    ///
    /// - Auto: re-runs auto assignment.
    /// - Manual: drops picks that are no longer free or eligible, then keeps
    ///   the newest `passenger_count`.
    /// - Confirmed: stays confirmed while every pick still fits and the count
    ///   matches; otherwise reopens and re-derives as above.
    pub fn refresh(&mut self, ctx: &SeatingContext<'_>) {
        match self.state {
            SeatingState::Unselected => {}
            SeatingState::AutoSelected => {
                self.selection = auto_assign(ctx.passenger_count, ctx.ticket_class, ctx.layout).seats;
            }
            SeatingState::ManualSelecting => self.prune(ctx),
            SeatingState::Confirmed { mode } => {
                let still_valid = self.selection.len() == ctx.passenger_count
                    && self.selection.seats().iter().all(|id| {
                        ctx.layout
                            .seat(id)
                            .is_some_and(|seat| seat_fits(mode, seat, ctx.ticket_class))
                    });
                if !still_valid {
                    self.state = working_state(mode);
                    self.refresh(ctx);
                }
            }
        }
    }

    /// Status of every cell for display.
    pub fn seat_map_view(&self, ctx: &SeatingContext<'_>) -> SeatMapView {
        let decks = ctx
            .layout
            .decks
            .iter()
            .map(|grid| DeckView {
                deck: grid.deck,
                rows: grid
                    .cells
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|cell| cell.as_ref().map(|seat| self.cell_view(seat, ctx)))
                            .collect()
                    })
                    .collect(),
            })
            .collect();

        SeatMapView {
            ship_type: ctx.layout.ship_type.to_string(),
            ticket_class: ctx.ticket_class,
            state: self.state,
            decks,
            selected: self.selection.seats().iter().map(|s| s.to_string()).collect(),
            required: ctx.passenger_count,
            missing: self.missing(ctx),
        }
    }

    fn cell_view(&self, seat: &Seat, ctx: &SeatingContext<'_>) -> SeatCell {
        let passenger = self.selection.position(&seat.id);
        let status = match passenger {
            Some(_) => SeatStatus::Selected,
            None => match restriction_of(seat, ctx.ticket_class, &self.selection, None) {
                SeatAvailability::Available => SeatStatus::Available,
                SeatAvailability::Occupied => SeatStatus::Occupied,
                SeatAvailability::Restricted => SeatStatus::Restricted,
            },
        };
        SeatCell {
            code: seat.id.to_string(),
            label: seat.id.label(),
            class: seat.class,
            status,
            passenger,
        }
    }

    fn prune(&mut self, ctx: &SeatingContext<'_>) {
        self.selection.retain(|id| {
            ctx.layout
                .seat(id)
                .is_some_and(|seat| seat_fits(SelectionMode::Manual, seat, ctx.ticket_class))
        });
        self.selection.keep_newest(ctx.passenger_count);
    }

    fn ensure_open(&self, action: &'static str) -> CoreResult<()> {
        if self.is_confirmed() {
            return Err(CoreError::InvalidTransition {
                state: self.state.name(),
                action,
            });
        }
        Ok(())
    }
}

fn working_state(mode: SelectionMode) -> SeatingState {
    match mode {
        SelectionMode::Auto => SeatingState::AutoSelected,
        SelectionMode::Manual => SeatingState::ManualSelecting,
    }
}

/// Auto picks must sit in the ticket's own band; manual picks in any eligible one.
fn seat_fits(mode: SelectionMode, seat: &Seat, ticket_class: TicketClass) -> bool {
    let band_ok = match mode {
        SelectionMode::Auto => seat.class == ticket_class,
        SelectionMode::Manual => crate::assignment::class_allows(ticket_class, seat.class),
    };
    band_ok && !seat.occupied
}

// =============================================================================
// View Types
// =============================================================================

/// Seat map as the booking UI renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SeatMapView {
    pub ship_type: String,
    pub ticket_class: TicketClass,
    pub state: SeatingState,
    pub decks: Vec<DeckView>,
    /// Seat codes in passenger order.
    pub selected: Vec<String>,
    pub required: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeckView {
    pub deck: Deck,
    /// `None` marks a gap.
    pub rows: Vec<Vec<Option<SeatCell>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SeatCell {
    pub code: String,
    pub label: String,
    pub class: TicketClass,
    pub status: SeatStatus,
    /// Passenger index when selected.
    pub passenger: Option<usize>,
}

// =============================================================================
// Unit Tests
// =============================================================================
