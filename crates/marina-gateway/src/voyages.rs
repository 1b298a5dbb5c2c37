//! # Voyage Feed
//!
//! Fetches voyage listings and publishes the newest one.
//!
//! ## Stale-Response Suppression
//! ```text
//!   refresh(A) ── gen 1 ──────────────────────────────► response A (dropped)
//!   refresh(B) ──────── gen 2 ───────► response B  ──► Loaded(B)
//!
//!   only the request holding the current generation may publish
//! ```
//!
//! A failed fetch publishes `Failed` with the reason. It never fabricates
//! voyages and never falls back to an older listing for a different query.

use marina_core::{Voyage, VoyageId};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::provider::{VoyageQuery, VoyageSource};

// =============================================================================
// Feed State
// =============================================================================

/// What the voyage list currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FeedState {
    #[default]
    Idle,
    Loading {
        query: VoyageQuery,
    },
    Loaded {
        query: VoyageQuery,
        voyages: Vec<Voyage>,
    },
    Failed {
        query: VoyageQuery,
        reason: String,
    },
}

impl FeedState {
    pub fn voyages(&self) -> &[Voyage] {
        match self {
            FeedState::Loaded { voyages, .. } => voyages,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FeedState::Loading { .. })
    }
}

// =============================================================================
// Voyage Feed
// =============================================================================

/// Voyage list with newest-request-wins publication.
pub struct VoyageFeed<S> {
    source: S,
    generation: AtomicU64,
    state: watch::Sender<FeedState>,
}

impl<S: VoyageSource> VoyageFeed<S> {
    pub fn new(source: S) -> Self {
        let (state, _) = watch::channel(FeedState::Idle);
        VoyageFeed {
            source,
            generation: AtomicU64::new(0),
            state,
        }
    }

    /// Receiver for UI updates.
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }

    /// Looks a voyage up in the published listing.
    pub fn find(&self, id: &VoyageId) -> Option<Voyage> {
        self.state.borrow().voyages().iter().find(|v| &v.id == id).cloned()
    }

    /// Fetches voyages for `query`.
    ///
    /// Returns `false` when a newer refresh started before this one resolved;
    /// its result is then discarded.
    pub async fn refresh(&self, query: VoyageQuery) -> bool {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish(generation, FeedState::Loading { query: query.clone() });

        let next = match self.source.voyages(&query).await {
            Ok(listing) => match listing.into_voyages() {
                Ok(voyages) => FeedState::Loaded { query, voyages },
                Err(e) => {
                    warn!(?e, "Voyage listing unusable");
                    FeedState::Failed {
                        query,
                        reason: e.to_string(),
                    }
                }
            },
            Err(e) => {
                warn!(?e, date = %query.date, "Voyage fetch failed");
                FeedState::Failed {
                    query,
                    reason: e.to_string(),
                }
            }
        };

        let published = self.publish(generation, next);
        if published {
            info!(generation, count = self.state.borrow().voyages().len(), "Voyage list updated");
        } else {
            debug!(generation, "Discarding stale voyage response");
        }
        published
    }

    /// Replaces the state if `generation` is still the newest request.
    fn publish(&self, generation: u64, next: FeedState) -> bool {
        self.state.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *current = next;
            true
        })
    }
}
