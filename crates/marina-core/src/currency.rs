//! # Currency Arithmetic
//!
//! Pure conversion between the base currency (TRY) and display currencies
//! using known rates. Fetching rates is the gateway's job.
//!
//! ## Rate Convention
//! ```text
//! rate[c] = units of c per 1 TRY
//!
//!   TRY → c :  amount × rate[c]
//!   c → TRY :  amount ÷ rate[c]
//!   a → b   :  (amount ÷ rate[a]) × rate[b]
//!
//! results are rounded half away from zero to whole minor units
//! ```
//!
//! Converted amounts are for display only. Ticket requests always carry
//! base-currency figures.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Currency
// =============================================================================

/// Currencies the checkout can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Base currency: every fare is computed in lira.
    Try,
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Try, Currency::Usd, Currency::Eur, Currency::Gbp];

    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Try => "TRY",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Try => "₺",
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
        }
    }

    #[inline]
    pub fn is_base(&self) -> bool {
        *self == crate::BASE_CURRENCY
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| CoreError::UnsupportedCurrency(s.trim().to_string()))
    }
}

// =============================================================================
// Exchange Rate Table
// =============================================================================

/// Multipliers against the base currency.
///
/// Starts from a built-in fallback so conversion always has a rate; fetched
/// rates overwrite entries with `set_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateTable {
    rates: BTreeMap<Currency, f64>,
}

impl ExchangeRateTable {
    /// Hard-coded fallback used until a live rate arrives.
    pub fn builtin() -> Self {
        let rates = BTreeMap::from([
            (Currency::Try, 1.0),
            (Currency::Usd, 0.029),
            (Currency::Eur, 0.027),
            (Currency::Gbp, 0.023),
        ]);
        ExchangeRateTable { rates }
    }

    /// Rate for a currency; the base is always 1.
    pub fn rate(&self, currency: Currency) -> Option<f64> {
        if currency.is_base() {
            return Some(1.0);
        }
        self.rates.get(&currency).copied()
    }

    /// Stores a rate. Non-finite or non-positive rates are rejected and the
    /// table is left unchanged.
    pub fn set_rate(&mut self, currency: Currency, rate: f64) -> bool {
        if currency.is_base() || !rate.is_finite() || rate <= 0.0 {
            return false;
        }
        self.rates.insert(currency, rate);
        true
    }

    /// Converts between any two currencies in the table.
    ///
    /// ```rust
    /// use marina_core::currency::{Currency, ExchangeRateTable};
    /// use marina_core::money::Money;
    ///
    /// let table = ExchangeRateTable::builtin();
    /// let usd = table.convert(Money::from_minor(40000), Currency::Try, Currency::Usd).unwrap();
    /// assert_eq!(usd.minor(), 1160);
    /// ```
    pub fn convert(&self, amount: Money, from: Currency, to: Currency) -> CoreResult<Money> {
        if from == to {
            return Ok(amount);
        }
        let from_rate = self
            .rate(from)
            .ok_or_else(|| CoreError::UnsupportedCurrency(from.to_string()))?;
        let to_rate = self
            .rate(to)
            .ok_or_else(|| CoreError::UnsupportedCurrency(to.to_string()))?;
        Ok(scale(amount, to_rate / from_rate))
    }

    /// Base-currency amount in `to`.
    pub fn from_base(&self, amount: Money, to: Currency) -> CoreResult<Money> {
        self.convert(amount, crate::BASE_CURRENCY, to)
    }
}

impl Default for ExchangeRateTable {
    fn default() -> Self {
        ExchangeRateTable::builtin()
    }
}

/// Multiplies minor units by a factor, rounding half away from zero.
pub fn scale(amount: Money, factor: f64) -> Money {
    Money::from_minor((amount.minor() as f64 * factor).round() as i64)
}

// =============================================================================
// Display Amount
// =============================================================================

/// An amount tagged with its currency, for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DisplayAmount {
    pub amount: Money,
    pub currency: Currency,
}

impl DisplayAmount {
    pub fn new(amount: Money, currency: Currency) -> Self {
        DisplayAmount { amount, currency }
    }

    pub fn base(amount: Money) -> Self {
        DisplayAmount::new(amount, crate::BASE_CURRENCY)
    }
}

impl fmt::Display for DisplayAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.amount.is_negative() {
            write!(
                f,
                "-{}{}",
                self.currency.symbol(),
                Money::from_minor(-self.amount.minor())
            )
        } else {
            write!(f, "{}{}", self.currency.symbol(), self.amount)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_currency_parsing() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!(" EUR ".parse::<Currency>().unwrap(), Currency::Eur);
        assert_eq!(
            "JPY".parse::<Currency>().unwrap_err(),
            CoreError::UnsupportedCurrency("JPY".to_string())
        );
    }

    #[test]
    fn test_base_converts_to_itself() {
        let table = ExchangeRateTable::builtin();
        let amount = Money::from_minor(40000);
        assert_eq!(table.convert(amount, Currency::Try, Currency::Try).unwrap(), amount);
        assert_eq!(table.rate(Currency::Try), Some(1.0));
    }

    #[test]
    fn test_set_rate_rejects_nonsense() {
        let mut table = ExchangeRateTable::builtin();
        assert!(!table.set_rate(Currency::Usd, 0.0));
        assert!(!table.set_rate(Currency::Usd, f64::NAN));
        assert!(!table.set_rate(Currency::Try, 2.0));
        assert_eq!(table.rate(Currency::Usd), Some(0.029));

        assert!(table.set_rate(Currency::Usd, 0.03));
        assert_eq!(
            table.from_base(Money::from_minor(40000), Currency::Usd).unwrap(),
            Money::from_minor(1200)
        );
    }

    #[test]
    fn test_cross_conversion() {
        let table = ExchangeRateTable::builtin();
        // 11.60 USD → 400 TRY → 10.80 EUR
        let eur = table
            .convert(Money::from_minor(1160), Currency::Usd, Currency::Eur)
            .unwrap();
        assert_eq!(eur, Money::from_minor(1080));
    }

    #[test]
    fn test_display_amount() {
        assert_eq!(DisplayAmount::base(Money::from_minor(40000)).to_string(), "₺400.00");
        assert_eq!(
            DisplayAmount::new(Money::from_minor(1160), Currency::Usd).to_string(),
            "$11.60"
        );
        assert_eq!(
            DisplayAmount::new(Money::from_minor(-505), Currency::Gbp).to_string(),
            "-£5.05"
        );
    }

    proptest! {
        #[test]
        fn prop_round_trip_within_rounding(minor in 0i64..10_000_000, pick in 1usize..4) {
            let table = ExchangeRateTable::builtin();
            let currency = Currency::ALL[pick];
            let rate = table.rate(currency).unwrap();
            let x = Money::from_minor(minor);

            let there = table.convert(x, Currency::Try, currency).unwrap();
            let back = table.convert(there, currency, Currency::Try).unwrap();

            // half a display minor unit, expressed in base minor units, plus one for rounding back
            let tolerance = (0.5 / rate).ceil() as i64 + 1;
            prop_assert!((back.minor() - x.minor()).abs() <= tolerance);
        }
    }
}
