//! # marina-gateway: External Collaborators for Marina
//!
//! Everything in a booking that waits on the network: voyage listings,
//! currency rates, ticket creation and the seat-sold notification. The
//! seat and fare rules themselves live in `marina-core`.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Gateway Architecture                             │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────────┐  ┌──────────────────────┐  │
//! │  │  VoyageFeed    │  │ CurrencyConverter  │  │  TicketSubmitter     │  │
//! │  │                │  │  + DisplayedPrice  │  │                      │  │
//! │  │ newest query   │  │ cache, fallback,   │  │ per-leg creation,    │  │
//! │  │ wins           │  │ newest currency    │  │ seat-sold report     │  │
//! │  │                │  │ wins               │  │ with backoff         │  │
//! │  └───────┬────────┘  └─────────┬──────────┘  └──────────┬───────────┘  │
//! │          │ VoyageSource        │ RateSource             │ TicketApi    │
//! │          └─────────────────────┼────────────────────────┘              │
//! │                                ▼                                        │
//! │                     ┌─────────────────────┐                            │
//! │                     │ ApiClient (reqwest) │                            │
//! │                     └─────────────────────┘                            │
//! │                                                                         │
//! │  GatewayConfig: marina.toml + MARINA_* environment                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - TOML/env configuration: endpoints, pricing, retry, layouts
//! - [`error`] - Gateway error types
//! - [`provider`] - Collaborator traits and voyage listing wire format
//! - [`http`] - reqwest implementation of the collaborator traits
//! - [`voyages`] - Voyage feed with stale-response suppression
//! - [`currency`] - Rate caching, fallbacks and the displayed price
//! - [`checkout`] - Ticket submission and seat-sold reporting
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marina_gateway::{ApiClient, GatewayConfig, TicketSubmitter};
//!
//! let config = GatewayConfig::load_or_default(None);
//! let client = ApiClient::new(&config)?;
//! let submitter = TicketSubmitter::new(
//!     client,
//!     config.pricing.catalog(),
//!     config.pricing.policy(),
//!     config.retry,
//! );
//! let issued = submitter.submit(&mut session).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod config;
pub mod currency;
pub mod error;
pub mod http;
pub mod provider;
pub mod voyages;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{IssuedTicket, TicketSubmitter};
pub use config::{GatewayConfig, RetrySettings};
pub use currency::{CurrencyConverter, DisplayedPrice};
pub use error::{GatewayError, GatewayResult};
pub use http::ApiClient;
pub use provider::{RateSource, TicketApi, VoyageListing, VoyageQuery, VoyageSource};
pub use voyages::{FeedState, VoyageFeed};
