//! # HTTP Client
//!
//! One reqwest client implementing every collaborator trait against the
//! booking backend and the rate service.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET  {api}/voyages?departurePort&arrivalPort&date  → VoyageListing     │
//! │  POST {api}/tickets            (Idempotency-Key)    → TicketReceipt     │
//! │  POST {api}/voyages/{id}/sold-seats                 → 2xx               │
//! │  GET  {rates}/convert?amount&from&to                → number | object   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rate responses come in several shapes depending on the provider: a bare
//! number, or an object carrying `result`, `rate` or `amount`. Numeric
//! strings are accepted too.

use async_trait::async_trait;
use marina_core::{Currency, PendingTicket, SeatId, TicketReceipt, VoyageId};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::provider::{RateSource, SoldSeatsReport, TicketApi, VoyageListing, VoyageQuery, VoyageSource};

/// Header carrying the per-leg idempotency key on ticket creation.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

// =============================================================================
// API Client
// =============================================================================

/// reqwest-backed client for the booking API and the rate service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    api_base: Url,
    rates_base: Url,
    api_timeout: Duration,
    rates_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("marina-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::InvalidConfig(e.to_string()))?;

        Ok(ApiClient {
            http,
            api_base: config.api_url()?,
            rates_base: config.rates_url()?,
            api_timeout: config.api_timeout(),
            rates_timeout: config.rates_timeout(),
        })
    }

    fn api_url(&self, segments: &[&str]) -> GatewayResult<Url> {
        join_segments(&self.api_base, segments)
    }

    async fn send(&self, request: RequestBuilder, timeout: Duration) -> GatewayResult<Response> {
        request.timeout(timeout).send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout(timeout.as_millis() as u64)
            } else {
                e.into()
            }
        })
    }
}

/// Appends path segments, percent-encoding each one.
fn join_segments(base: &Url, segments: &[&str]) -> GatewayResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| GatewayError::InvalidUrl(format!("{} cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Turns a non-success response into an error carrying its body.
async fn error_body(response: Response) -> (u16, String) {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        body
    };
    (status, message)
}

async fn expect_success(response: Response) -> GatewayResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let (status, message) = error_body(response).await;
    Err(GatewayError::from_status(status, message))
}

// =============================================================================
// Rate Parsing
// =============================================================================

/// Reads a converted amount from any of the accepted response shapes.
pub fn parse_rate_body(body: &str) -> GatewayResult<f64> {
    let value: Value = serde_json::from_str(body.trim())?;
    let number = match &value {
        Value::Object(map) => ["result", "rate", "amount"]
            .iter()
            .find_map(|key| map.get(*key).and_then(as_number)),
        other => as_number(other),
    };

    match number {
        Some(n) if n.is_finite() && n > 0.0 => Ok(n),
        Some(n) => Err(GatewayError::MalformedResponse(format!(
            "rate must be a positive number, got {}",
            n
        ))),
        None => Err(GatewayError::MalformedResponse(format!(
            "no rate in response: {}",
            body.trim()
        ))),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

#[async_trait]
impl VoyageSource for ApiClient {
    #[instrument(skip(self), fields(date = %query.date))]
    async fn voyages(&self, query: &VoyageQuery) -> GatewayResult<VoyageListing> {
        let url = self.api_url(&["voyages"])?;
        let response = self
            .send(self.http.get(url).query(query), self.api_timeout)
            .await?;
        let listing = expect_success(response).await?.json::<VoyageListing>().await?;
        debug!(count = listing.voyages.len(), "Voyages received");
        Ok(listing)
    }
}

#[async_trait]
impl RateSource for ApiClient {
    async fn convert(&self, amount: f64, from: Currency, to: Currency) -> GatewayResult<f64> {
        let url = join_segments(&self.rates_base, &["convert"])?;
        let amount = amount.to_string();
        let request = self.http.get(url).query(&[
            ("amount", amount.as_str()),
            ("from", from.code()),
            ("to", to.code()),
        ]);
        let response = expect_success(self.send(request, self.rates_timeout).await?).await?;
        let body = response.text().await?;
        parse_rate_body(&body)
    }
}

#[async_trait]
impl TicketApi for ApiClient {
    #[instrument(skip(self, ticket), fields(leg = %ticket.leg, voyage_id = %ticket.request.voyage_id))]
    async fn create_ticket(&self, ticket: &PendingTicket) -> GatewayResult<TicketReceipt> {
        let url = self.api_url(&["tickets"])?;
        let request = self
            .http
            .post(url)
            .header(IDEMPOTENCY_HEADER, ticket.idempotency_key.to_string())
            .json(&ticket.request);
        let response = self.send(request, self.api_timeout).await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<TicketReceipt>().await?);
        }
        let (status, message) = error_body(response).await;
        if status >= 500 {
            Err(GatewayError::ServerError { status, message })
        } else {
            Err(GatewayError::TicketRejected {
                leg: ticket.leg,
                status,
                message,
            })
        }
    }

    async fn report_sold_seats(&self, voyage_id: &VoyageId, seats: &[SeatId]) -> GatewayResult<()> {
        let url = self.api_url(&["voyages", voyage_id.as_str(), "sold-seats"])?;
        let report = SoldSeatsReport {
            voyage_id: voyage_id.clone(),
            seats: seats.to_vec(),
        };
        let response = self.send(self.http.post(url).json(&report), self.api_timeout).await?;
        expect_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rate_shapes() {
        assert_eq!(parse_rate_body("0.029").unwrap(), 0.029);
        assert_eq!(parse_rate_body(r#"{"result": 11.6}"#).unwrap(), 11.6);
        assert_eq!(parse_rate_body(r#"{"success": true, "rate": "0.027"}"#).unwrap(), 0.027);
        assert_eq!(parse_rate_body(r#" {"amount": 0.023} "#).unwrap(), 0.023);
    }

    #[test]
    fn test_parse_rate_rejects_garbage() {
        assert!(matches!(
            parse_rate_body(r#"{"error": "quota exceeded"}"#),
            Err(GatewayError::MalformedResponse(_))
        ));
        assert!(parse_rate_body("-1").is_err());
        assert!(parse_rate_body("0").is_err());
        assert!(parse_rate_body("<html>").is_err());
    }

    #[test]
    fn test_join_segments_encodes_and_keeps_prefix() {
        let base = Url::parse("https://booking.example.com/api/").unwrap();
        let url = join_segments(&base, &["voyages", "V 1/2", "sold-seats"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://booking.example.com/api/voyages/V%201%2F2/sold-seats"
        );

        let bare = Url::parse("https://booking.example.com/api").unwrap();
        let url = join_segments(&bare, &["tickets"]).unwrap();
        assert_eq!(url.as_str(), "https://booking.example.com/api/tickets");
    }

    #[test]
    fn test_client_from_default_config() {
        let client = ApiClient::new(&GatewayConfig::default()).unwrap();
        assert_eq!(client.api_timeout, Duration::from_secs(10));
        assert_eq!(client.api_url(&["tickets"]).unwrap().path(), "/api/tickets");
    }
}
