//! # Currency Conversion Adapter
//!
//! Turns base-currency fares into display amounts using live rates, without
//! ever blocking or failing the booking.
//!
//! ## Rate Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  rate_for(c)                                                            │
//! │                                                                         │
//! │  c == TRY ───────────────────────────────────────────► 1.0 (no call)    │
//! │  fetched this session ───────────────────────────────► cached rate      │
//! │  source answers within timeout ──────► cache + return                   │
//! │  source fails / times out / nonsense ► last-known-good or fallback      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `DisplayedPrice` sits on top: every `show` call takes a generation number
//! and only the newest call may replace the displayed amount, so a slow USD
//! answer cannot overwrite a later EUR selection.

use marina_core::currency::scale;
use marina_core::{Currency, DisplayAmount, ExchangeRateTable, Money};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::provider::RateSource;

// =============================================================================
// Currency Converter
// =============================================================================

/// Rate lookups with caching and fallbacks.
pub struct CurrencyConverter<S> {
    source: S,
    timeout: Duration,
    /// Starts as the fallback table; fetched rates overwrite entries.
    table: RwLock<ExchangeRateTable>,
    fetched: RwLock<HashSet<Currency>>,
}

impl<S: RateSource> CurrencyConverter<S> {
    pub fn new(source: S, fallback: ExchangeRateTable, timeout: Duration) -> Self {
        CurrencyConverter {
            source,
            timeout,
            table: RwLock::new(fallback),
            fetched: RwLock::new(HashSet::new()),
        }
    }

    /// Rate for `currency`, fetching it once per session.
    pub async fn rate_for(&self, currency: Currency) -> f64 {
        if currency.is_base() {
            return 1.0;
        }
        if self.fetched.read().await.contains(&currency) {
            if let Some(rate) = self.table.read().await.rate(currency) {
                return rate;
            }
        }
        self.refresh_rate(currency).await
    }

    /// Fetches `currency` again, keeping the last known rate on failure.
    pub async fn refresh_rate(&self, currency: Currency) -> f64 {
        if currency.is_base() {
            return 1.0;
        }

        match self.fetch(currency).await {
            Ok(rate) => {
                let stored = self.table.write().await.set_rate(currency, rate);
                if stored {
                    self.fetched.write().await.insert(currency);
                    debug!(currency = %currency, rate, "Rate cached");
                    return rate;
                }
                warn!(currency = %currency, rate, "Rate source returned an unusable rate");
            }
            Err(e) => {
                warn!(?e, currency = %currency, "Rate fetch failed, using last known rate");
            }
        }

        self.known_rate(currency).await
    }

    /// Converts a base-currency amount for display. Never fails.
    pub async fn convert(&self, amount: Money, currency: Currency) -> DisplayAmount {
        if currency.is_base() {
            return DisplayAmount::base(amount);
        }
        let rate = self.rate_for(currency).await;
        DisplayAmount::new(scale(amount, rate), currency)
    }

    /// Snapshot of the rates in use.
    pub async fn table(&self) -> ExchangeRateTable {
        self.table.read().await.clone()
    }

    async fn fetch(&self, currency: Currency) -> Result<f64, GatewayError> {
        let request = self.source.convert(1.0, marina_core::BASE_CURRENCY, currency);
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(self.timeout.as_millis() as u64)),
        }
    }

    async fn known_rate(&self, currency: Currency) -> f64 {
        match self.table.read().await.rate(currency) {
            Some(rate) => rate,
            // The built-in table covers every currency; this only happens
            // with a hand-built empty table.
            None => {
                warn!(currency = %currency, "No rate known, showing base amount");
                1.0
            }
        }
    }
}

// =============================================================================
// Displayed Price
// =============================================================================

/// The checkout total as currently shown, newest selection wins.
pub struct DisplayedPrice<S> {
    converter: Arc<CurrencyConverter<S>>,
    generation: AtomicU64,
    shown: watch::Sender<DisplayAmount>,
}

impl<S: RateSource> DisplayedPrice<S> {
    pub fn new(converter: Arc<CurrencyConverter<S>>, initial: Money) -> Self {
        let (shown, _) = watch::channel(DisplayAmount::base(initial));
        DisplayedPrice {
            converter,
            generation: AtomicU64::new(0),
            shown,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplayAmount> {
        self.shown.subscribe()
    }

    pub fn current(&self) -> DisplayAmount {
        *self.shown.borrow()
    }

    /// Shows `amount` in `currency`.
    ///
    /// Returns `false` if a newer `show` call was made while this one
    /// waited for its rate; the result is then dropped.
    pub async fn show(&self, amount: Money, currency: Currency) -> bool {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let display = self.converter.convert(amount, currency).await;

        let published = self.shown.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *current = display;
            true
        });
        if !published {
            debug!(currency = %currency, generation, "Discarding stale conversion");
        }
        published
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayResult;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Per-currency delay and rate, with a call counter.
    #[derive(Default)]
    struct ScriptedRates {
        calls: AtomicUsize,
        failing: Mutex<HashSet<Currency>>,
    }

    impl ScriptedRates {
        fn fail(&self, currency: Currency) {
            self.failing.lock().unwrap().insert(currency);
        }

        fn recover(&self, currency: Currency) {
            self.failing.lock().unwrap().remove(&currency);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateSource for ScriptedRates {
        async fn convert(&self, amount: f64, _from: Currency, to: Currency) -> GatewayResult<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (delay_ms, rate) = match to {
                Currency::Usd => (300, 0.030),
                Currency::Eur => (50, 0.025),
                Currency::Gbp => (5_000, 0.021),
                Currency::Try => (0, 1.0),
            };
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            if self.failing.lock().unwrap().contains(&to) {
                return Err(GatewayError::RequestFailed("connection refused".into()));
            }
            Ok(amount * rate)
        }
    }

    fn converter() -> Arc<CurrencyConverter<ScriptedRates>> {
        Arc::new(CurrencyConverter::new(
            ScriptedRates::default(),
            ExchangeRateTable::builtin(),
            Duration::from_millis(1_000),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_base_currency_skips_the_source() {
        let converter = converter();
        let shown = converter.convert(Money::from_minor(40000), Currency::Try).await;
        assert_eq!(shown, DisplayAmount::base(Money::from_minor(40000)));
        assert_eq!(converter.source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_is_cached_for_the_session() {
        let converter = converter();
        let first = converter.convert(Money::from_minor(40000), Currency::Usd).await;
        let second = converter.convert(Money::from_minor(40000), Currency::Usd).await;

        assert_eq!(first.amount, Money::from_minor(1200));
        assert_eq!(first, second);
        assert_eq!(converter.source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_falls_back_to_builtin_rate() {
        let converter = converter();
        converter.source.fail(Currency::Eur);

        let shown = converter.convert(Money::from_minor(40000), Currency::Eur).await;
        assert_eq!(shown.amount, Money::from_minor(1080));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back_to_builtin_rate() {
        let converter = converter();
        // GBP answers after 5s, past the 1s timeout
        let shown = converter.convert(Money::from_minor(40000), Currency::Gbp).await;
        assert_eq!(shown.amount, Money::from_minor(920));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_failure_keeps_last_known_good() {
        let converter = converter();
        assert_eq!(converter.rate_for(Currency::Usd).await, 0.030);

        converter.source.fail(Currency::Usd);
        assert_eq!(converter.refresh_rate(Currency::Usd).await, 0.030);

        converter.source.recover(Currency::Usd);
        assert_eq!(converter.refresh_rate(Currency::Usd).await, 0.030);
        assert_eq!(converter.source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_usd_does_not_overwrite_eur() {
        let display = DisplayedPrice::new(converter(), Money::from_minor(40000));
        let mut updates = display.subscribe();

        // USD is selected first but its rate arrives after EUR's
        let (usd, eur) = tokio::join!(
            display.show(Money::from_minor(40000), Currency::Usd),
            display.show(Money::from_minor(40000), Currency::Eur),
        );

        assert!(!usd);
        assert!(eur);
        assert_eq!(
            display.current(),
            DisplayAmount::new(Money::from_minor(1000), Currency::Eur)
        );
        assert_eq!(updates.borrow_and_update().currency, Currency::Eur);
    }
}
