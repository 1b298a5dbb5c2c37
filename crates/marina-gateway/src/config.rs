//! # Gateway Configuration
//!
//! Where the booking API lives, how long to wait for it, what a fare costs
//! and which extra ship layouts exist.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MARINA_API_URL=https://booking.example.com/api                     │
//! │     MARINA_RATES_TIMEOUT_MS=1500                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/marina/marina.toml (Linux)                               │
//! │     ~/Library/Application Support/com.marina.marina/marina.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     localhost API, built-in rates, ₺10 service fee                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # marina.toml
//! [api]
//! base_url = "https://booking.example.com/api"
//! timeout_secs = 10
//!
//! [rates]
//! base_url = "https://rates.example.com"
//! timeout_ms = 2000
//!
//! [rates.fallback]
//! USD = 0.029
//! EUR = 0.027
//!
//! [pricing]
//! service_fee_minor = 1000
//! early_booking_days = 30
//! early_booking_discount_bps = 1000
//!
//! [pricing.business]
//! base_price_minor = 35000
//! student_discount_bps = 1500
//! senior_discount_bps = 2000
//!
//! [retry]
//! initial_backoff_ms = 500
//! max_backoff_secs = 30
//! max_retries = 5
//! ```

use marina_core::fare::ClassPricing;
use marina_core::{
    Currency, ExchangeRateTable, FarePolicy, LayoutCatalog, LayoutTemplate, Money, Percentage,
    PricingCatalog, TicketClass,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{GatewayError, GatewayResult};

// =============================================================================
// Booking API Settings
// =============================================================================

/// The backend serving voyages, tickets and seat-sold notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_api_timeout() -> u64 {
    10
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_api_url(),
            timeout_secs: default_api_timeout(),
        }
    }
}

// =============================================================================
// Rate Settings
// =============================================================================

/// The currency rate service and the table used when it is unreachable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSettings {
    #[serde(default = "default_rates_url")]
    pub base_url: String,

    /// A rate request slower than this falls back (milliseconds).
    #[serde(default = "default_rates_timeout")]
    pub timeout_ms: u64,

    /// Currency code → units per 1 TRY. Entries override the built-in table.
    #[serde(default)]
    pub fallback: BTreeMap<String, f64>,
}

fn default_rates_url() -> String {
    "http://localhost:8080/api/currency".to_string()
}

fn default_rates_timeout() -> u64 {
    2000
}

impl Default for RateSettings {
    fn default() -> Self {
        RateSettings {
            base_url: default_rates_url(),
            timeout_ms: default_rates_timeout(),
            fallback: BTreeMap::new(),
        }
    }
}

// =============================================================================
// Pricing Settings
// =============================================================================

/// One class's catalog entry, in minor units and basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassPriceSettings {
    pub base_price_minor: i64,

    #[serde(default = "default_student_discount")]
    pub student_discount_bps: u32,

    #[serde(default = "default_senior_discount")]
    pub senior_discount_bps: u32,
}

fn default_student_discount() -> u32 {
    1500
}

fn default_senior_discount() -> u32 {
    2000
}

impl ClassPriceSettings {
    fn with_base(base_price_minor: i64) -> Self {
        ClassPriceSettings {
            base_price_minor,
            student_discount_bps: default_student_discount(),
            senior_discount_bps: default_senior_discount(),
        }
    }

    pub fn to_pricing(&self) -> ClassPricing {
        ClassPricing {
            base_price: Money::from_minor(self.base_price_minor),
            student_discount: Percentage::from_bps(self.student_discount_bps),
            senior_discount: Percentage::from_bps(self.senior_discount_bps),
        }
    }
}

/// Fare catalog and booking-wide fare rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Per passenger per leg (minor units).
    #[serde(default = "default_service_fee")]
    pub service_fee_minor: i64,

    #[serde(default = "default_early_days")]
    pub early_booking_days: i64,

    #[serde(default = "default_early_discount")]
    pub early_booking_discount_bps: u32,

    #[serde(default = "default_promo")]
    pub promo: ClassPriceSettings,

    #[serde(default = "default_economy")]
    pub economy: ClassPriceSettings,

    #[serde(default = "default_business")]
    pub business: ClassPriceSettings,
}

fn default_service_fee() -> i64 {
    1000
}
fn default_early_days() -> i64 {
    marina_core::EARLY_BOOKING_DAYS
}
fn default_early_discount() -> u32 {
    1000
}
fn default_promo() -> ClassPriceSettings {
    ClassPriceSettings::with_base(15_000)
}
fn default_economy() -> ClassPriceSettings {
    ClassPriceSettings::with_base(20_000)
}
fn default_business() -> ClassPriceSettings {
    ClassPriceSettings::with_base(35_000)
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            service_fee_minor: default_service_fee(),
            early_booking_days: default_early_days(),
            early_booking_discount_bps: default_early_discount(),
            promo: default_promo(),
            economy: default_economy(),
            business: default_business(),
        }
    }
}

impl PricingSettings {
    pub fn class(&self, class: TicketClass) -> &ClassPriceSettings {
        match class {
            TicketClass::Promo => &self.promo,
            TicketClass::Economy => &self.economy,
            TicketClass::Business => &self.business,
        }
    }

    pub fn catalog(&self) -> PricingCatalog {
        PricingCatalog {
            promo: self.promo.to_pricing(),
            economy: self.economy.to_pricing(),
            business: self.business.to_pricing(),
        }
    }

    pub fn policy(&self) -> FarePolicy {
        FarePolicy {
            service_fee: Money::from_minor(self.service_fee_minor),
            early_booking_days: self.early_booking_days,
            early_booking_discount: Percentage::from_bps(self.early_booking_discount_bps),
        }
    }
}

// =============================================================================
// Retry Settings
// =============================================================================

/// Backoff for the seat-sold notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,

    /// Retries after the first attempt. 0 sends once.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_initial_backoff() -> u64 {
    500
}
fn default_max_backoff() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    5
}

impl Default for RetrySettings {
    fn default() -> Self {
        RetrySettings {
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_secs: default_max_backoff(),
            max_retries: default_max_retries(),
        }
    }
}

impl RetrySettings {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }
}

// =============================================================================
// Main Gateway Configuration
// =============================================================================

/// Complete gateway configuration.
///
/// Extra `[[layouts]]` entries are merged over the built-in ship layouts;
/// an entry with a built-in ship type replaces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub rates: RateSettings,

    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layouts: Vec<LayoutTemplate>,
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (marina.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> GatewayResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading gateway config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load gateway config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> GatewayResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| GatewayError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Gateway config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> GatewayResult<()> {
        parse_http_url("api.base_url", &self.api.base_url)?;
        parse_http_url("rates.base_url", &self.rates.base_url)?;

        if self.api.timeout_secs == 0 {
            return Err(GatewayError::InvalidConfig(
                "api.timeout_secs must be greater than 0".into(),
            ));
        }
        if self.rates.timeout_ms == 0 {
            return Err(GatewayError::InvalidConfig(
                "rates.timeout_ms must be greater than 0".into(),
            ));
        }

        for (code, rate) in &self.rates.fallback {
            let currency: Currency = code
                .parse()
                .map_err(|_| GatewayError::InvalidConfig(format!("Unknown currency in rates.fallback: {}", code)))?;
            if !currency.is_base() && (!rate.is_finite() || *rate <= 0.0) {
                return Err(GatewayError::InvalidConfig(format!(
                    "rates.fallback.{} must be a positive number, got {}",
                    code, rate
                )));
            }
        }

        let pricing = &self.pricing;
        if pricing.service_fee_minor < 0 {
            return Err(GatewayError::InvalidConfig(
                "pricing.service_fee_minor must not be negative".into(),
            ));
        }
        if pricing.early_booking_days < 0 {
            return Err(GatewayError::InvalidConfig(
                "pricing.early_booking_days must not be negative".into(),
            ));
        }
        check_bps("pricing.early_booking_discount_bps", pricing.early_booking_discount_bps)?;
        for class in TicketClass::ALL {
            let entry = pricing.class(class);
            if entry.base_price_minor <= 0 {
                return Err(GatewayError::InvalidConfig(format!(
                    "pricing.{}.base_price_minor must be greater than 0",
                    class
                )));
            }
            check_bps(&format!("pricing.{}.student_discount_bps", class), entry.student_discount_bps)?;
            check_bps(&format!("pricing.{}.senior_discount_bps", class), entry.senior_discount_bps)?;
        }

        self.layout_catalog()?;

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("MARINA_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(secs) = lookup("MARINA_API_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.api.timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring invalid MARINA_API_TIMEOUT_SECS"),
            }
        }

        if let Some(url) = lookup("MARINA_RATES_URL") {
            debug!(url = %url, "Overriding rates URL from environment");
            self.rates.base_url = url;
        }

        if let Some(ms) = lookup("MARINA_RATES_TIMEOUT_MS") {
            match ms.parse::<u64>() {
                Ok(m) => self.rates.timeout_ms = m,
                Err(_) => warn!(value = %ms, "Ignoring invalid MARINA_RATES_TIMEOUT_MS"),
            }
        }

        if let Some(fee) = lookup("MARINA_SERVICE_FEE_MINOR") {
            match fee.parse::<i64>() {
                Ok(f) => {
                    debug!(fee = f, "Overriding service fee from environment");
                    self.pricing.service_fee_minor = f;
                }
                Err(_) => warn!(value = %fee, "Ignoring invalid MARINA_SERVICE_FEE_MINOR"),
            }
        }

        if let Some(retries) = lookup("MARINA_MAX_RETRIES") {
            if let Ok(r) = retries.parse::<u32>() {
                self.retry.max_retries = r;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "marina", "marina")
            .map(|dirs| dirs.config_dir().join("marina.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn api_url(&self) -> GatewayResult<Url> {
        parse_http_url("api.base_url", &self.api.base_url)
    }

    pub fn rates_url(&self) -> GatewayResult<Url> {
        parse_http_url("rates.base_url", &self.rates.base_url)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn rates_timeout(&self) -> Duration {
        Duration::from_millis(self.rates.timeout_ms)
    }

    /// Built-in rates with configured entries applied on top.
    pub fn fallback_rates(&self) -> ExchangeRateTable {
        let mut table = ExchangeRateTable::builtin();
        for (code, rate) in &self.rates.fallback {
            match code.parse::<Currency>() {
                Ok(currency) if currency.is_base() => {}
                Ok(currency) => {
                    if !table.set_rate(currency, *rate) {
                        warn!(currency = %currency, rate, "Ignoring unusable fallback rate");
                    }
                }
                Err(_) => warn!(code = %code, "Ignoring fallback rate for unknown currency"),
            }
        }
        table
    }

    /// Built-in ship layouts merged with the configured ones.
    pub fn layout_catalog(&self) -> GatewayResult<LayoutCatalog> {
        let mut catalog = LayoutCatalog::builtin();
        catalog.merge(self.layouts.iter().cloned())?;
        Ok(catalog)
    }
}

fn parse_http_url(field: &str, raw: &str) -> GatewayResult<Url> {
    let url = Url::parse(raw).map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", field, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(GatewayError::InvalidUrl(format!(
            "{} must use http:// or https://, got {}://",
            field, other
        ))),
    }
}

fn check_bps(field: &str, bps: u32) -> GatewayResult<()> {
    if bps > Percentage::FULL.bps() {
        return Err(GatewayError::InvalidConfig(format!(
            "{} must be at most 10000 (100%), got {}",
            field, bps
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use marina_core::layout::{ClassBand, Deck, DeckTemplate};
    use marina_core::ShipType;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pricing.policy(), FarePolicy::default());
        assert_eq!(config.pricing.catalog(), PricingCatalog::default());
        assert_eq!(config.rates_timeout(), Duration::from_millis(2000));
    }

    #[test]
    fn test_config_validation() {
        let mut config = GatewayConfig::default();

        config.api.base_url = "ws://localhost:8080".to_string();
        assert!(matches!(config.validate(), Err(GatewayError::InvalidUrl(_))));
        config.api.base_url = "https://booking.example.com/api".to_string();
        assert!(config.validate().is_ok());

        config.rates.timeout_ms = 0;
        assert!(config.validate().unwrap_err().is_config_error());
        config.rates.timeout_ms = 500;

        config.pricing.business.student_discount_bps = 12_000;
        assert!(config.validate().is_err());
        config.pricing.business.student_discount_bps = 1500;

        config.rates.fallback.insert("XYZ".to_string(), 1.0);
        assert!(config.validate().is_err());
        config.rates.fallback.clear();
        config.rates.fallback.insert("USD".to_string(), -1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://booking.example.com/api"

            [pricing]
            service_fee_minor = 1500

            [pricing.economy]
            base_price_minor = 25000

            [rates.fallback]
            USD = 0.031
            "#,
        )
        .unwrap();

        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.pricing.service_fee_minor, 1500);
        assert_eq!(config.pricing.economy.student_discount_bps, 1500);
        assert_eq!(
            config.pricing.catalog().economy.base_price,
            Money::from_major_minor(250, 0)
        );
        assert_eq!(config.fallback_rates().rate(Currency::Usd), Some(0.031));
        assert_eq!(config.fallback_rates().rate(Currency::Eur), Some(0.027));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("MARINA_API_URL", "https://staging.example.com/api"),
            ("MARINA_RATES_TIMEOUT_MS", "750"),
            ("MARINA_SERVICE_FEE_MINOR", "not-a-number"),
            ("MARINA_MAX_RETRIES", "2"),
        ]);

        let mut config = GatewayConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "https://staging.example.com/api");
        assert_eq!(config.rates.timeout_ms, 750);
        assert_eq!(config.pricing.service_fee_minor, 1000);
        assert_eq!(config.retry.max_retries, 2);
    }

    #[test]
    fn test_configured_layouts_merge_over_builtin() {
        let mut config = GatewayConfig::default();
        config.layouts.push(LayoutTemplate {
            ship_type: ShipType::new("water_taxi"),
            decks: vec![DeckTemplate {
                deck: Deck::Main,
                rows: 2,
                columns: 4,
                bands: vec![ClassBand::new(TicketClass::Economy, 1, 2)],
                gaps: vec![],
            }],
        });

        let catalog = config.layout_catalog().unwrap();
        assert!(catalog.contains(&ShipType::new("water_taxi")));
        assert!(catalog.contains(&ShipType::new("catamaran")));
    }

    #[test]
    fn test_toml_serialization() {
        let config = GatewayConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[pricing.business]"));

        let back: GatewayConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("marina-{}.toml", uuid::Uuid::new_v4()));
        let mut config = GatewayConfig::default();
        config.retry.max_retries = 3;
        config.save(Some(path.clone())).unwrap();

        let loaded = GatewayConfig::load(Some(path.clone())).unwrap();
        assert_eq!(loaded.retry.max_retries, 3);
        std::fs::remove_file(path).unwrap();
    }
}
