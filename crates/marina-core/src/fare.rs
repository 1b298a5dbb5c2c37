//! # Fare Calculator
//!
//! Itemized, reproducible fares in the base currency.
//!
//! ## Algorithm (fixed order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For one leg                                                            │
//! │                                                                         │
//! │  1. Per passenger type with count > 0:                                 │
//! │       unit      = base_price × (1 − discount[type])                    │
//! │       discount  = adult 0 │ student ⟨cfg⟩ │ senior ⟨cfg⟩ │ child 100%  │
//! │  2. passenger_subtotal = Σ unit × count                                │
//! │  3. voyage date > booking date + 30 days?                              │
//! │       passenger_subtotal −= 10%        (service fee never discounted)  │
//! │  4. leg total = passenger_subtotal + service_fee × passengers          │
//! │                                                                         │
//! │  grand total = departure total + return total (if any)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Worked Example
//! ```text
//! 1 adult + 1 student + 1 child, base ₺200, fee ₺10, not early:
//!   200 + 170 + 0 = 370;  370 + 3 × 10 = ₺400
//! Same, voyage 45 days out:
//!   370 − 37 = 333;       333 + 30     = ₺363
//! ```
//!
//! Conversion to a display currency happens afterwards and never feeds
//! back into these figures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PassengerType, PassengerTypeCounts, Percentage, TicketClass};
use crate::EARLY_BOOKING_DAYS;

// =============================================================================
// Pricing Inputs
// =============================================================================

/// Base price and per-type discounts for one ticket class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClassPricing {
    pub base_price: Money,
    pub student_discount: Percentage,
    pub senior_discount: Percentage,
}

impl ClassPricing {
    /// Standard discounts: student 15%, senior 20%.
    pub const fn standard(base_price: Money) -> Self {
        ClassPricing {
            base_price,
            student_discount: Percentage::from_bps(1500),
            senior_discount: Percentage::from_bps(2000),
        }
    }

    /// Discount applied to the base price for a passenger type.
    pub fn discount_for(&self, passenger_type: PassengerType) -> Percentage {
        match passenger_type {
            PassengerType::Adult => Percentage::zero(),
            PassengerType::Student => self.student_discount,
            PassengerType::Senior => self.senior_discount,
            PassengerType::Child => Percentage::FULL,
        }
    }
}

/// Pricing per ticket class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingCatalog {
    pub promo: ClassPricing,
    pub economy: ClassPricing,
    pub business: ClassPricing,
}

impl PricingCatalog {
    pub fn get(&self, class: TicketClass) -> &ClassPricing {
        match class {
            TicketClass::Promo => &self.promo,
            TicketClass::Economy => &self.economy,
            TicketClass::Business => &self.business,
        }
    }

    pub fn get_mut(&mut self, class: TicketClass) -> &mut ClassPricing {
        match class {
            TicketClass::Promo => &mut self.promo,
            TicketClass::Economy => &mut self.economy,
            TicketClass::Business => &mut self.business,
        }
    }
}

impl Default for PricingCatalog {
    /// ₺150 promo, ₺200 economy, ₺350 business.
    fn default() -> Self {
        PricingCatalog {
            promo: ClassPricing::standard(Money::from_major_minor(150, 0)),
            economy: ClassPricing::standard(Money::from_major_minor(200, 0)),
            business: ClassPricing::standard(Money::from_major_minor(350, 0)),
        }
    }
}

/// Booking-wide fee and early-booking rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FarePolicy {
    /// Charged per passenger per leg, never discounted.
    pub service_fee: Money,
    /// Voyages more than this many days after booking count as early.
    pub early_booking_days: i64,
    pub early_booking_discount: Percentage,
}

impl Default for FarePolicy {
    fn default() -> Self {
        FarePolicy {
            service_fee: Money::from_major_minor(10, 0),
            early_booking_days: EARLY_BOOKING_DAYS,
            early_booking_discount: Percentage::from_bps(1000),
        }
    }
}

impl FarePolicy {
    /// Strictly more than `early_booking_days` between booking and voyage.
    pub fn is_early(&self, voyage_date: NaiveDate, booking_date: NaiveDate) -> bool {
        (voyage_date - booking_date).num_days() > self.early_booking_days
    }
}

// =============================================================================
// Breakdown Types
// =============================================================================

/// One passenger type's share of a leg fare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FareLine {
    pub passenger_type: PassengerType,
    pub count: u32,
    /// Class base price before the type discount.
    pub unit_price: Money,
    pub discount: Percentage,
    pub discounted_unit_price: Money,
    pub total: Money,
}

/// Itemized fare of one leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LegFare {
    /// Types with a zero count are omitted.
    pub lines: Vec<FareLine>,
    pub passenger_count: u32,
    /// Sum of line totals after the early-booking discount.
    pub passenger_subtotal: Money,
    pub early_booking: bool,
    /// Amount taken off the passenger subtotal (zero when not early).
    pub early_booking_discount: Money,
    pub service_fee_total: Money,
    pub total: Money,
}

impl LegFare {
    /// Sum of line totals before the early-booking discount.
    pub fn gross_subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.total).sum()
    }
}

/// Fare of a whole booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FareBreakdown {
    pub departure: LegFare,
    #[serde(rename = "return")]
    pub return_leg: Option<LegFare>,
    pub grand_total: Money,
}

impl FareBreakdown {
    pub fn new(departure: LegFare, return_leg: Option<LegFare>) -> Self {
        let grand_total = departure.total + return_leg.as_ref().map_or(Money::zero(), |l| l.total);
        FareBreakdown {
            departure,
            return_leg,
            grand_total,
        }
    }
}

/// What one leg needs priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegQuote {
    pub counts: PassengerTypeCounts,
    pub ticket_class: TicketClass,
    pub voyage_date: NaiveDate,
}

// =============================================================================
// Calculation
// =============================================================================

/// Prices one leg.
///
/// Early-booking eligibility is decided by this leg's own voyage date.
pub fn calculate_leg(
    counts: &PassengerTypeCounts,
    pricing: &ClassPricing,
    voyage_date: NaiveDate,
    booking_date: NaiveDate,
    policy: &FarePolicy,
) -> LegFare {
    let lines: Vec<FareLine> = counts
        .present()
        .map(|(passenger_type, count)| {
            let discount = pricing.discount_for(passenger_type);
            let discounted_unit_price = pricing.base_price.apply_percentage_discount(discount);
            FareLine {
                passenger_type,
                count,
                unit_price: pricing.base_price,
                discount,
                discounted_unit_price,
                total: discounted_unit_price * count,
            }
        })
        .collect();

    let gross: Money = lines.iter().map(|l| l.total).sum();
    let early_booking = policy.is_early(voyage_date, booking_date);
    let early_booking_discount = if early_booking {
        gross.percentage_of(policy.early_booking_discount)
    } else {
        Money::zero()
    };
    let passenger_subtotal = gross - early_booking_discount;

    let passenger_count = counts.total();
    let service_fee_total = policy.service_fee * passenger_count;

    LegFare {
        lines,
        passenger_count,
        passenger_subtotal,
        early_booking,
        early_booking_discount,
        service_fee_total,
        total: passenger_subtotal + service_fee_total,
    }
}

/// Prices a one-way or return booking.
pub fn calculate_booking(
    departure: &LegQuote,
    return_leg: Option<&LegQuote>,
    catalog: &PricingCatalog,
    booking_date: NaiveDate,
    policy: &FarePolicy,
) -> FareBreakdown {
    let price = |quote: &LegQuote| {
        calculate_leg(
            &quote.counts,
            catalog.get(quote.ticket_class),
            quote.voyage_date,
            booking_date,
            policy,
        )
    };
    FareBreakdown::new(price(departure), return_leg.map(price))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::date;
    use proptest::prelude::*;

    fn family() -> PassengerTypeCounts {
        PassengerTypeCounts {
            adult: 1,
            student: 1,
            senior: 0,
            child: 1,
        }
    }

    fn economy() -> ClassPricing {
        ClassPricing::standard(Money::from_major_minor(200, 0))
    }

    #[test]
    fn test_mixed_party_not_early() {
        let booked = date(2026, 6, 1);
        let fare = calculate_leg(&family(), &economy(), date(2026, 6, 20), booked, &FarePolicy::default());

        assert_eq!(fare.lines.len(), 3);
        assert_eq!(fare.lines[1].passenger_type, PassengerType::Student);
        assert_eq!(fare.lines[1].discounted_unit_price, Money::from_minor(17000));
        assert_eq!(fare.lines[2].discounted_unit_price, Money::zero());
        assert_eq!(fare.passenger_subtotal, Money::from_minor(37000));
        assert!(!fare.early_booking);
        assert_eq!(fare.service_fee_total, Money::from_minor(3000));
        assert_eq!(fare.total, Money::from_major_minor(400, 0));
    }

    #[test]
    fn test_mixed_party_early() {
        let booked = date(2026, 6, 1);
        let fare = calculate_leg(&family(), &economy(), date(2026, 7, 16), booked, &FarePolicy::default());

        assert!(fare.early_booking);
        assert_eq!(fare.early_booking_discount, Money::from_minor(3700));
        assert_eq!(fare.passenger_subtotal, Money::from_minor(33300));
        assert_eq!(fare.gross_subtotal(), Money::from_minor(37000));
        assert_eq!(fare.total, Money::from_major_minor(363, 0));
    }

    #[test]
    fn test_early_boundary_is_strict() {
        let policy = FarePolicy::default();
        let booked = date(2026, 1, 1);
        assert!(!policy.is_early(date(2026, 1, 31), booked)); // exactly 30 days
        assert!(policy.is_early(date(2026, 2, 1), booked));
        assert!(!policy.is_early(date(2025, 12, 1), booked));
    }

    #[test]
    fn test_zero_count_types_omitted() {
        let fare = calculate_leg(
            &PassengerTypeCounts::adults(2),
            &economy(),
            date(2026, 6, 2),
            date(2026, 6, 1),
            &FarePolicy::default(),
        );
        assert_eq!(fare.lines.len(), 1);
        assert_eq!(fare.lines[0].count, 2);
        assert_eq!(fare.total, Money::from_major_minor(420, 0));
    }

    #[test]
    fn test_child_always_free_but_pays_fee() {
        let counts = PassengerTypeCounts {
            child: 2,
            ..Default::default()
        };
        let business = ClassPricing::standard(Money::from_major_minor(999, 99));
        let fare = calculate_leg(&counts, &business, date(2026, 6, 2), date(2026, 6, 1), &FarePolicy::default());
        assert_eq!(fare.passenger_subtotal, Money::zero());
        assert_eq!(fare.total, Money::from_major_minor(20, 0));
    }

    #[test]
    fn test_booking_legs_priced_independently() {
        let booked = date(2026, 6, 1);
        let departure = LegQuote {
            counts: family(),
            ticket_class: TicketClass::Economy,
            voyage_date: date(2026, 6, 20),
        };
        // the return is far enough out to be early; the departure is not
        let return_leg = LegQuote {
            counts: PassengerTypeCounts::adults(1),
            ticket_class: TicketClass::Business,
            voyage_date: date(2026, 8, 1),
        };

        let breakdown = calculate_booking(
            &departure,
            Some(&return_leg),
            &PricingCatalog::default(),
            booked,
            &FarePolicy::default(),
        );

        assert_eq!(breakdown.departure.total, Money::from_major_minor(400, 0));
        let ret = breakdown.return_leg.as_ref().unwrap();
        assert!(ret.early_booking);
        // 350 − 35 + 10
        assert_eq!(ret.total, Money::from_major_minor(325, 0));
        assert_eq!(breakdown.grand_total, Money::from_major_minor(725, 0));
    }

    #[test]
    fn test_breakdown_serializes_camel_case() {
        let breakdown = FareBreakdown::new(
            calculate_leg(
                &PassengerTypeCounts::adults(1),
                &economy(),
                date(2026, 6, 2),
                date(2026, 6, 1),
                &FarePolicy::default(),
            ),
            None,
        );
        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json["grandTotal"], 21000);
        assert_eq!(json["departure"]["serviceFeeTotal"], 1000);
        assert!(json["return"].is_null());
    }

    proptest! {
        #[test]
        fn prop_leg_total_is_consistent(
            adult in 0u32..5,
            student in 0u32..5,
            senior in 0u32..5,
            child in 0u32..5,
            base in 0i64..100_000,
            days_out in 0i64..90,
        ) {
            let counts = PassengerTypeCounts { adult, student, senior, child };
            let pricing = ClassPricing::standard(Money::from_minor(base));
            let booked = date(2026, 1, 1);
            let voyage = booked + chrono::Duration::days(days_out);
            let policy = FarePolicy::default();
            let fare = calculate_leg(&counts, &pricing, voyage, booked, &policy);

            prop_assert_eq!(fare.passenger_count, counts.total());
            prop_assert_eq!(fare.service_fee_total, policy.service_fee * counts.total());
            prop_assert_eq!(fare.total, fare.passenger_subtotal + fare.service_fee_total);
            prop_assert_eq!(fare.passenger_subtotal, fare.gross_subtotal() - fare.early_booking_discount);
            prop_assert_eq!(fare.early_booking, days_out > 30);
            prop_assert!(fare.lines.iter().all(|l| l.count > 0));
            for line in &fare.lines {
                if line.passenger_type == PassengerType::Child {
                    prop_assert_eq!(line.total, Money::zero());
                }
            }
        }
    }
}
