//! Mock feed fetcher for testing without network access.
//!
//! Serves fixed payloads from memory or from a directory holding
//! `station_information.json` and `station_status.json`. Payloads can be
//! swapped, failed or delayed at runtime to exercise the pipeline.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use super::error::FetchError;
use super::fetcher::FeedFetcher;
use super::types::FeedKind;

#[derive(Debug)]
struct MockSide {
    /// `Err` holds the message for a simulated outage.
    payload: Result<String, String>,
    /// Delays applied to successive calls, front first.
    delays: VecDeque<Duration>,
    calls: usize,
}

impl MockSide {
    fn new(payload: String) -> Self {
        Self {
            payload: Ok(payload),
            delays: VecDeque::new(),
            calls: 0,
        }
    }
}

#[derive(Debug)]
struct MockState {
    information: MockSide,
    status: MockSide,
}

impl MockState {
    fn side(&mut self, feed: FeedKind) -> &mut MockSide {
        match feed {
            FeedKind::Information => &mut self.information,
            FeedKind::Status => &mut self.status,
        }
    }
}

/// Mock fetcher that serves in-memory payloads.
#[derive(Debug, Clone)]
pub struct MockFeedFetcher {
    state: Arc<RwLock<MockState>>,
}

impl MockFeedFetcher {
    /// Create a mock serving the given documents.
    pub fn new(information: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState {
                information: MockSide::new(information.into()),
                status: MockSide::new(status.into()),
            })),
        }
    }

    /// Load `station_information.json` and `station_status.json` from a
    /// directory.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, FetchError> {
        let data_dir = data_dir.as_ref();
        let read = |feed: FeedKind| {
            let path = data_dir.join(format!("{}.json", feed.as_str()));
            std::fs::read_to_string(&path).map_err(|source| FetchError::Io { path, source })
        };

        Ok(Self::new(
            read(FeedKind::Information)?,
            read(FeedKind::Status)?,
        ))
    }

    /// Replace the document served for `feed`, clearing any outage.
    pub async fn set_payload(&self, feed: FeedKind, payload: impl Into<String>) {
        let mut state = self.state.write().await;
        state.side(feed).payload = Ok(payload.into());
    }

    /// Make every subsequent fetch of `feed` fail until a payload is set.
    pub async fn fail(&self, feed: FeedKind, message: impl Into<String>) {
        let mut state = self.state.write().await;
        state.side(feed).payload = Err(message.into());
    }

    /// Delay the next fetch of `feed` by `delay`. Queued delays apply to
    /// successive calls in order.
    pub async fn delay_next(&self, feed: FeedKind, delay: Duration) {
        let mut state = self.state.write().await;
        state.side(feed).delays.push_back(delay);
    }

    /// Number of fetches made for `feed` so far.
    pub async fn calls(&self, feed: FeedKind) -> usize {
        let state = self.state.read().await;
        match feed {
            FeedKind::Information => state.information.calls,
            FeedKind::Status => state.status.calls,
        }
    }

    async fn fetch(&self, feed: FeedKind) -> Result<String, FetchError> {
        // Take what this call needs, then release the lock before sleeping.
        let (payload, delay) = {
            let mut state = self.state.write().await;
            let side = state.side(feed);
            side.calls += 1;
            (side.payload.clone(), side.delays.pop_front())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        payload.map_err(|message| FetchError::Unavailable { feed, message })
    }
}

impl FeedFetcher for MockFeedFetcher {
    async fn fetch_information(&self) -> Result<String, FetchError> {
        self.fetch(FeedKind::Information).await
    }

    async fn fetch_status(&self) -> Result<String, FetchError> {
        self.fetch(FeedKind::Status).await
    }
}
