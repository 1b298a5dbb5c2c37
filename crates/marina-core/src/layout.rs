//! # Ship Layout Templates
//!
//! The *shape* of a ship's seating: decks, rows, columns, class bands and
//! gaps. Templates are keyed by ship type and never carry occupancy.
//!
//! ## Template Anatomy
//! ```text
//! DeckTemplate { deck: Main, rows: 6, columns: 5 }
//!
//!          A   B   C   D   E
//!        ┌───┬───┬───┬───┬───┐
//!   1    │ B │ B │   │ B │ B │   ◄── ClassBand business 1..=2
//!   2    │ B │ B │   │ B │ B │
//!   3    │ E │ E │   │ E │ E │   ◄── ClassBand economy 3..=4
//!   4    │ ░ │ ░ │   │ E │ E │   ◄── Gap::Cell (café counter)
//!   5    │   │   │   │   │   │   ◄── Gap::Row (stairwell)
//!   6    │ P │ P │   │ P │ P │   ◄── ClassBand promo 6..=6
//!        └───┴───┴───┴───┴───┘
//!                  ▲
//!                  └── Gap::Column (aisle)
//! ```
//!
//! Rows outside every class band hold no seats. A template with no decks
//! describes open seating: the ship sells tickets without a seat map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{ClassCounts, TicketClass};

/// Column letters run A..=Z.
pub const MAX_COLUMNS: u8 = 26;

// =============================================================================
// Deck
// =============================================================================

/// A passenger deck.
///
/// Ordering is layout order: the main deck comes before the upper deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Deck {
    Main,
    Upper,
}

impl Deck {
    /// One-letter prefix used in seat codes.
    pub fn code(&self) -> char {
        match self {
            Deck::Main => 'M',
            Deck::Upper => 'U',
        }
    }

    pub fn from_code(code: char) -> Option<Deck> {
        match code.to_ascii_uppercase() {
            'M' => Some(Deck::Main),
            'U' => Some(Deck::Upper),
            _ => None,
        }
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deck::Main => write!(f, "Main deck"),
            Deck::Upper => write!(f, "Upper deck"),
        }
    }
}

// =============================================================================
// Ship Type
// =============================================================================

/// Ship-type tag reported with every voyage (e.g. `catamaran`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct ShipType(String);

impl ShipType {
    /// Tags are case-insensitive; they are stored lowercased and trimmed.
    pub fn new(tag: impl AsRef<str>) -> Self {
        ShipType(tag.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShipType {
    fn from(tag: &str) -> Self {
        ShipType::new(tag)
    }
}

// =============================================================================
// Deck Template
// =============================================================================

/// Rows `first_row..=last_row` (1-based) carry seats of `class`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassBand {
    pub class: TicketClass,
    pub first_row: u16,
    pub last_row: u16,
}

impl ClassBand {
    pub const fn new(class: TicketClass, first_row: u16, last_row: u16) -> Self {
        ClassBand {
            class,
            first_row,
            last_row,
        }
    }

    fn contains(&self, row: u16) -> bool {
        (self.first_row..=self.last_row).contains(&row)
    }
}

/// A non-seat position inside a deck grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Gap {
    /// An aisle running the whole deck.
    Column { column: u8 },
    /// A cross passage, stairwell or door row.
    Row { row: u16 },
    /// A single amenity cell (café, life-jacket locker).
    Cell { row: u16, column: u8 },
}

impl Gap {
    fn covers(&self, row: u16, column: u8) -> bool {
        match *self {
            Gap::Column { column: c } => c == column,
            Gap::Row { row: r } => r == row,
            Gap::Cell { row: r, column: c } => r == row && c == column,
        }
    }
}

/// Seating shape of one deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckTemplate {
    pub deck: Deck,
    pub rows: u16,
    pub columns: u8,
    pub bands: Vec<ClassBand>,
    #[serde(default)]
    pub gaps: Vec<Gap>,
}

impl DeckTemplate {
    /// Class of the seat at a position, or `None` for a gap.
    pub fn class_at(&self, row: u16, column: u8) -> Option<TicketClass> {
        if row == 0 || row > self.rows || column == 0 || column > self.columns {
            return None;
        }
        if self.gaps.iter().any(|g| g.covers(row, column)) {
            return None;
        }
        self.bands.iter().find(|b| b.contains(row)).map(|b| b.class)
    }

    /// Seat positions in row-then-column order.
    pub fn seat_positions(&self) -> impl Iterator<Item = (u16, u8, TicketClass)> + '_ {
        (1..=self.rows).flat_map(move |row| {
            (1..=self.columns).filter_map(move |column| {
                self.class_at(row, column).map(|class| (row, column, class))
            })
        })
    }

    /// Seats per class on this deck.
    pub fn capacity(&self) -> ClassCounts {
        let mut counts = ClassCounts::default();
        for (_, _, class) in self.seat_positions() {
            *counts.get_mut(class) += 1;
        }
        counts
    }

    fn check(&self) -> CoreResult<()> {
        let field = format!("layout.{}", self.deck.code());

        if self.rows == 0 || self.columns == 0 || self.columns > MAX_COLUMNS {
            return Err(ValidationError::OutOfRange {
                field: format!("{field}.columns"),
                min: 1,
                max: MAX_COLUMNS as i64,
            }
            .into());
        }

        for (i, band) in self.bands.iter().enumerate() {
            if band.first_row == 0 || band.first_row > band.last_row || band.last_row > self.rows {
                return Err(ValidationError::InvalidFormat {
                    field: format!("{field}.bands"),
                    reason: format!(
                        "{} band rows {}..={} do not fit {} rows",
                        band.class, band.first_row, band.last_row, self.rows
                    ),
                }
                .into());
            }
            let overlaps = self.bands[..i]
                .iter()
                .any(|o| band.first_row <= o.last_row && o.first_row <= band.last_row);
            if overlaps {
                return Err(ValidationError::InvalidFormat {
                    field: format!("{field}.bands"),
                    reason: format!("{} band overlaps another band", band.class),
                }
                .into());
            }
        }

        Ok(())
    }
}

// =============================================================================
// Layout Template
// =============================================================================

/// Full seating shape of a ship type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutTemplate {
    pub ship_type: ShipType,
    #[serde(default)]
    pub decks: Vec<DeckTemplate>,
}

impl LayoutTemplate {
    /// `false` for open-seating ships.
    pub fn has_seat_map(&self) -> bool {
        self.decks.iter().any(|d| d.seat_positions().next().is_some())
    }

    pub fn deck(&self, deck: Deck) -> Option<&DeckTemplate> {
        self.decks.iter().find(|d| d.deck == deck)
    }

    /// Decks in layout order (main before upper), whatever order they were declared in.
    pub fn decks_in_order(&self) -> impl Iterator<Item = &DeckTemplate> {
        [Deck::Main, Deck::Upper]
            .into_iter()
            .filter_map(move |d| self.deck(d))
    }

    /// Seats per class across all decks.
    pub fn capacity(&self) -> ClassCounts {
        let mut total = ClassCounts::default();
        for deck in &self.decks {
            let c = deck.capacity();
            for class in TicketClass::ALL {
                *total.get_mut(class) += c.get(class);
            }
        }
        total
    }

    /// Rejects malformed templates (bad bands, duplicate decks, too many columns).
    pub fn check(&self) -> CoreResult<()> {
        if self.ship_type.as_str().is_empty() {
            return Err(ValidationError::Required {
                field: "layout.ship_type".to_string(),
            }
            .into());
        }
        for (i, deck) in self.decks.iter().enumerate() {
            if self.decks[..i].iter().any(|d| d.deck == deck.deck) {
                return Err(ValidationError::InvalidFormat {
                    field: "layout.decks".to_string(),
                    reason: format!("{} declared twice for {}", deck.deck, self.ship_type),
                }
                .into());
            }
            deck.check()?;
        }
        Ok(())
    }
}

// =============================================================================
// Layout Catalog
// =============================================================================

/// Layout templates keyed by ship type.
///
/// ## Sources
/// ```text
/// LayoutCatalog::builtin()      catamaran, sea_bus, car_ferry
///        │
///        ▼
/// merge([[layouts]] from config) configured templates replace built-ins
///        │
///        ▼
/// get(&voyage.ship_type)         UnknownShipType if absent
/// ```
#[derive(Debug, Clone, Default)]
pub struct LayoutCatalog {
    templates: BTreeMap<ShipType, LayoutTemplate>,
}

impl LayoutCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The three ship types the fleet operates.
    pub fn builtin() -> Self {
        let mut templates = BTreeMap::new();
        for template in [catamaran(), sea_bus(), car_ferry()] {
            templates.insert(template.ship_type.clone(), template);
        }
        LayoutCatalog { templates }
    }

    /// Adds or replaces a template after checking it.
    pub fn insert(&mut self, template: LayoutTemplate) -> CoreResult<()> {
        template.check()?;
        self.templates.insert(template.ship_type.clone(), template);
        Ok(())
    }

    /// Inserts every template; stops at the first malformed one.
    pub fn merge(&mut self, templates: impl IntoIterator<Item = LayoutTemplate>) -> CoreResult<()> {
        for template in templates {
            self.insert(template)?;
        }
        Ok(())
    }

    pub fn get(&self, ship_type: &ShipType) -> CoreResult<&LayoutTemplate> {
        self.templates
            .get(ship_type)
            .ok_or_else(|| CoreError::UnknownShipType(ship_type.to_string()))
    }

    pub fn contains(&self, ship_type: &ShipType) -> bool {
        self.templates.contains_key(ship_type)
    }

    pub fn ship_types(&self) -> impl Iterator<Item = &ShipType> {
        self.templates.keys()
    }
}

// =============================================================================
// Built-in Templates
// =============================================================================

fn catamaran() -> LayoutTemplate {
    use TicketClass::*;
    LayoutTemplate {
        ship_type: ShipType::new("catamaran"),
        decks: vec![
            DeckTemplate {
                deck: Deck::Main,
                rows: 12,
                columns: 5,
                bands: vec![
                    ClassBand::new(Business, 1, 2),
                    ClassBand::new(Economy, 3, 9),
                    ClassBand::new(Promo, 10, 12),
                ],
                gaps: vec![Gap::Column { column: 3 }, Gap::Row { row: 7 }],
            },
            DeckTemplate {
                deck: Deck::Upper,
                rows: 8,
                columns: 5,
                bands: vec![
                    ClassBand::new(Business, 1, 3),
                    ClassBand::new(Economy, 4, 6),
                    ClassBand::new(Promo, 7, 8),
                ],
                gaps: vec![
                    Gap::Column { column: 3 },
                    Gap::Cell { row: 1, column: 1 },
                    Gap::Cell { row: 1, column: 2 },
                ],
            },
        ],
    }
}

fn sea_bus() -> LayoutTemplate {
    use TicketClass::*;
    LayoutTemplate {
        ship_type: ShipType::new("sea_bus"),
        decks: vec![
            DeckTemplate {
                deck: Deck::Main,
                rows: 10,
                columns: 7,
                bands: vec![ClassBand::new(Economy, 1, 6), ClassBand::new(Promo, 7, 10)],
                gaps: vec![Gap::Column { column: 4 }, Gap::Row { row: 5 }],
            },
            DeckTemplate {
                deck: Deck::Upper,
                rows: 4,
                columns: 5,
                bands: vec![ClassBand::new(Business, 1, 2), ClassBand::new(Economy, 3, 4)],
                gaps: vec![Gap::Column { column: 3 }],
            },
        ],
    }
}

fn car_ferry() -> LayoutTemplate {
    use TicketClass::*;
    LayoutTemplate {
        ship_type: ShipType::new("car_ferry"),
        decks: vec![
            DeckTemplate {
                deck: Deck::Main,
                rows: 6,
                columns: 9,
                bands: vec![ClassBand::new(Economy, 1, 4), ClassBand::new(Promo, 5, 6)],
                gaps: vec![
                    Gap::Column { column: 3 },
                    Gap::Column { column: 7 },
                    Gap::Cell { row: 6, column: 5 },
                ],
            },
            DeckTemplate {
                deck: Deck::Upper,
                rows: 6,
                columns: 9,
                bands: vec![ClassBand::new(Business, 1, 2), ClassBand::new(Economy, 3, 6)],
                gaps: vec![Gap::Column { column: 3 }, Gap::Column { column: 7 }],
            },
        ],
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn small_deck() -> DeckTemplate {
        DeckTemplate {
            deck: Deck::Main,
            rows: 6,
            columns: 5,
            bands: vec![
                ClassBand::new(TicketClass::Business, 1, 2),
                ClassBand::new(TicketClass::Economy, 3, 4),
                ClassBand::new(TicketClass::Promo, 6, 6),
            ],
            gaps: vec![
                Gap::Column { column: 3 },
                Gap::Row { row: 5 },
                Gap::Cell { row: 4, column: 1 },
                Gap::Cell { row: 4, column: 2 },
            ],
        }
    }

    #[test]
    fn test_class_at_respects_gaps_and_bands() {
        let deck = small_deck();
        assert_eq!(deck.class_at(1, 1), Some(TicketClass::Business));
        assert_eq!(deck.class_at(1, 3), None); // aisle
        assert_eq!(deck.class_at(4, 1), None); // café
        assert_eq!(deck.class_at(4, 4), Some(TicketClass::Economy));
        assert_eq!(deck.class_at(5, 2), None); // stairwell
        assert_eq!(deck.class_at(6, 5), Some(TicketClass::Promo));
        assert_eq!(deck.class_at(7, 1), None); // out of range
    }

    #[test]
    fn test_deck_capacity() {
        let capacity = small_deck().capacity();
        assert_eq!(capacity.business, 8);
        assert_eq!(capacity.economy, 6);
        assert_eq!(capacity.promo, 4);
    }

    #[test]
    fn test_seat_positions_row_then_column() {
        let deck = small_deck();
        let first: Vec<_> = deck.seat_positions().take(5).map(|(r, c, _)| (r, c)).collect();
        assert_eq!(first, vec![(1, 1), (1, 2), (1, 4), (1, 5), (2, 1)]);
    }

    #[test]
    fn test_builtin_templates_are_valid() {
        let catalog = LayoutCatalog::builtin();
        assert_eq!(catalog.ship_types().count(), 3);
        for ship_type in catalog.ship_types() {
            let template = catalog.get(ship_type).unwrap();
            template.check().unwrap();
            assert!(template.has_seat_map());
            let capacity = template.capacity();
            for class in TicketClass::ALL {
                assert!(capacity.get(class) > 0, "{ship_type} has no {class} seats");
            }
        }
    }

    #[test]
    fn test_catamaran_capacity() {
        let catalog = LayoutCatalog::builtin();
        let capacity = catalog.get(&ShipType::new("Catamaran")).unwrap().capacity();
        assert_eq!(capacity.business, 18);
        assert_eq!(capacity.economy, 36);
        assert_eq!(capacity.promo, 20);
    }

    #[test]
    fn test_unknown_ship_type() {
        let catalog = LayoutCatalog::builtin();
        assert_eq!(
            catalog.get(&ShipType::new("hovercraft")).unwrap_err(),
            CoreError::UnknownShipType("hovercraft".to_string())
        );
    }

    #[test]
    fn test_insert_rejects_overlapping_bands() {
        let mut deck = small_deck();
        deck.bands.push(ClassBand::new(TicketClass::Promo, 2, 3));
        let template = LayoutTemplate {
            ship_type: ShipType::new("broken"),
            decks: vec![deck],
        };
        let mut catalog = LayoutCatalog::new();
        assert!(catalog.insert(template).is_err());
        assert!(!catalog.contains(&ShipType::new("broken")));
    }

    #[test]
    fn test_merge_replaces_builtin() {
        let mut catalog = LayoutCatalog::builtin();
        let open = LayoutTemplate {
            ship_type: ShipType::new("car_ferry"),
            decks: vec![],
        };
        catalog.merge([open]).unwrap();
        assert!(!catalog.get(&ShipType::new("car_ferry")).unwrap().has_seat_map());
    }

    #[test]
    fn test_template_from_toml_shape() {
        let json = r#"{
            "ship_type": "water_taxi",
            "decks": [{
                "deck": "main", "rows": 2, "columns": 2,
                "bands": [{"class": "economy", "first_row": 1, "last_row": 2}],
                "gaps": [{"kind": "cell", "row": 1, "column": 1}]
            }]
        }"#;
        let template: LayoutTemplate = serde_json::from_str(json).unwrap();
        template.check().unwrap();
        assert_eq!(template.capacity().economy, 3);
    }
}
