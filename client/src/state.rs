//! Application state.
//!
//! The facade publishes refreshed collections here after a confirmed write.
//! `AppState` keeps the latest collection per apartment and forwards every
//! update to subscribers.

use async_trait::async_trait;
use banx_common::api::{Booking, Review};
use log::{debug, trace};
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};

// Default capacity of the update channel
pub const DEFAULT_UPDATE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateUpdate {
    Bookings { aid: u64, bookings: Vec<Booking> },
    // Unavailable dates, in milliseconds
    Timestamps { aid: u64, dates: Vec<u64> },
    Reviews { aid: u64, reviews: Vec<Review> },
}

impl StateUpdate {
    pub fn aid(&self) -> u64 {
        match self {
            Self::Bookings { aid, .. } | Self::Timestamps { aid, .. } | Self::Reviews { aid, .. } => {
                *aid
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bookings { .. } => "bookings",
            Self::Timestamps { .. } => "timestamps",
            Self::Reviews { .. } => "reviews",
        }
    }
}

// Process-wide container receiving refreshed collections
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn publish(&self, update: StateUpdate);
}

#[derive(Default)]
struct Collections {
    bookings: HashMap<u64, Vec<Booking>>,
    timestamps: HashMap<u64, Vec<u64>>,
    reviews: HashMap<u64, Vec<Review>>,
}

pub struct AppState {
    collections: RwLock<Collections>,
    sender: broadcast::Sender<StateUpdate>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_UPDATE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            collections: RwLock::new(Collections::default()),
            sender,
        }
    }

    // Receive every update published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<StateUpdate> {
        trace!("subscribe to state updates");
        self.sender.subscribe()
    }

    pub async fn get_bookings(&self, aid: u64) -> Option<Vec<Booking>> {
        self.collections.read().await.bookings.get(&aid).cloned()
    }

    pub async fn get_timestamps(&self, aid: u64) -> Option<Vec<u64>> {
        self.collections.read().await.timestamps.get(&aid).cloned()
    }

    pub async fn get_reviews(&self, aid: u64) -> Option<Vec<Review>> {
        self.collections.read().await.reviews.get(&aid).cloned()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for AppState {
    async fn publish(&self, update: StateUpdate) {
        if log::log_enabled!(log::Level::Debug) {
            debug!("publish {} for apartment {}", update.kind(), update.aid());
        }

        {
            let mut collections = self.collections.write().await;
            match &update {
                StateUpdate::Bookings { aid, bookings } => {
                    collections.bookings.insert(*aid, bookings.clone());
                }
                StateUpdate::Timestamps { aid, dates } => {
                    collections.timestamps.insert(*aid, dates.clone());
                }
                StateUpdate::Reviews { aid, reviews } => {
                    collections.reviews.insert(*aid, reviews.clone());
                }
            }
        }

        // No subscriber is not an error
        if self.sender.send(update).is_err() {
            trace!("no state subscriber");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banx_common::crypto::Address;

    fn review(id: u64, timestamp: u64) -> Review {
        Review {
            id,
            aid: 1,
            text: "Lovely".into(),
            owner: Address::zero(),
            timestamp,
        }
    }

    #[tokio::test]
    async fn test_publish_replaces_collection() {
        let state = AppState::new();
        assert!(state.get_timestamps(1).await.is_none());

        state
            .publish(StateUpdate::Timestamps {
                aid: 1,
                dates: vec![1],
            })
            .await;
        state
            .publish(StateUpdate::Timestamps {
                aid: 1,
                dates: vec![1, 2],
            })
            .await;

        assert_eq!(state.get_timestamps(1).await, Some(vec![1, 2]));
        assert!(state.get_timestamps(2).await.is_none());
    }

    #[tokio::test]
    async fn test_subscribers_receive_updates() {
        let state = AppState::new();
        let mut receiver = state.subscribe();

        let update = StateUpdate::Reviews {
            aid: 3,
            reviews: vec![review(1, 10)],
        };
        state.publish(update.clone()).await;

        assert_eq!(receiver.recv().await.unwrap(), update);
        assert_eq!(state.get_reviews(3).await.unwrap().len(), 1);
        assert!(state.get_bookings(3).await.is_none());
    }

    #[tokio::test]
    async fn test_publish_without_subscriber() {
        let state = AppState::with_capacity(1);
        state
            .publish(StateUpdate::Bookings {
                aid: 1,
                bookings: Vec::new(),
            })
            .await;
        assert_eq!(state.get_bookings(1).await, Some(Vec::new()));
    }
}
