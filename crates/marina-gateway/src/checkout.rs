//! # Ticket Submission
//!
//! Sends a booking's legs to the ticket-creation API and reports the seats
//! they consumed.
//!
//! ## Submission Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  session.ticket_requests()  ── all legs validated before any request    │
//! │            │                                                            │
//! │            ▼                                                            │
//! │  for each pending leg:                                                  │
//! │     create_ticket ──► rejected ──► Err, session untouched (retry later) │
//! │            │                                                            │
//! │            ▼ ok                                                         │
//! │     session.mark_issued(leg)      (skipped on the next attempt)         │
//! │            │                                                            │
//! │            ▼                                                            │
//! │     report_sold_seats with exponential backoff                          │
//! │        failure is logged, never surfaced: the ticket exists             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use marina_core::{
    BookingSession, FarePolicy, Leg, PendingTicket, PricingCatalog, SelectedSeats, TicketReceipt,
};
use tracing::{debug, error, info, warn};

use crate::config::RetrySettings;
use crate::error::GatewayResult;
use crate::provider::TicketApi;

// =============================================================================
// Issued Ticket
// =============================================================================

/// Outcome of one leg's submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTicket {
    pub leg: Leg,
    pub receipt: TicketReceipt,
    /// False when the seat-sold notification gave up.
    pub seats_reported: bool,
}

// =============================================================================
// Ticket Submitter
// =============================================================================

/// Submits bookings against a ticket API.
pub struct TicketSubmitter<T> {
    api: T,
    catalog: PricingCatalog,
    policy: FarePolicy,
    retry: RetrySettings,
}

impl<T: TicketApi> TicketSubmitter<T> {
    pub fn new(api: T, catalog: PricingCatalog, policy: FarePolicy, retry: RetrySettings) -> Self {
        TicketSubmitter {
            api,
            catalog,
            policy,
            retry,
        }
    }

    /// Creates tickets for every leg not yet issued.
    ///
    /// On rejection the session keeps its selections and any leg issued
    /// before the failure stays issued, so calling again only resends
    /// what is missing.
    pub async fn submit(&self, session: &mut BookingSession) -> GatewayResult<Vec<IssuedTicket>> {
        let pending = session.ticket_requests(&self.catalog, &self.policy)?;
        let mut issued = Vec::with_capacity(pending.len());

        for ticket in pending {
            let receipt = match self.api.create_ticket(&ticket).await {
                Ok(receipt) => receipt,
                Err(e) => {
                    error!(
                        ?e,
                        session_id = %session.id(),
                        leg = %ticket.leg,
                        voyage_id = %ticket.request.voyage_id,
                        "Ticket creation failed"
                    );
                    return Err(e);
                }
            };

            info!(
                session_id = %session.id(),
                leg = %ticket.leg,
                ticket_id = %receipt.ticket_id,
                total = %ticket.request.total_price,
                "Ticket issued"
            );
            session.mark_issued(ticket.leg, receipt.clone())?;

            let seats_reported = self.report_sold_seats(&ticket).await;
            issued.push(IssuedTicket {
                leg: ticket.leg,
                receipt,
                seats_reported,
            });
        }

        Ok(issued)
    }

    /// Reports the ticket's seats, retrying transient failures.
    async fn report_sold_seats(&self, ticket: &PendingTicket) -> bool {
        let seats = match &ticket.request.selected_seats {
            SelectedSeats::Seats(seats) if !seats.is_empty() => seats,
            _ => {
                debug!(leg = %ticket.leg, "No seat map, nothing to report");
                return true;
            }
        };
        let voyage_id = &ticket.request.voyage_id;

        let mut backoff = self.create_backoff();
        let mut attempt = 0u32;
        loop {
            match self.api.report_sold_seats(voyage_id, seats).await {
                Ok(()) => {
                    debug!(voyage_id = %voyage_id, count = seats.len(), "Sold seats reported");
                    return true;
                }
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let Some(delay) = backoff.next_backoff() else {
                        warn!(?e, voyage_id = %voyage_id, "Backoff exhausted");
                        return false;
                    };
                    warn!(?e, voyage_id = %voyage_id, attempt, ?delay, "Seat-sold report failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!(?e, voyage_id = %voyage_id, attempt, "Giving up on seat-sold report");
                    return false;
                }
            }
        }
    }

    /// Creates the exponential backoff configuration.
    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.retry.initial_backoff(),
            max_interval: self.retry.max_backoff(),
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}
