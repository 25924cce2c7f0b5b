//! The reconciliation pipeline.
//!
//! A `StationFeed` runs reconciliation cycles against a fetcher and
//! publishes immutable snapshots:
//! - A cycle fetches both feeds concurrently and only reconciles once both
//!   have arrived. Either fetch failing, or either document being
//!   malformed, leaves the last published snapshot in place.
//! - Each cycle takes a token when it starts. A cycle that finishes after a
//!   later one was requested is discarded, so a slow early fetch can't
//!   overwrite a fast later one.
//! - Distance and favorites are read when the cycle reconciles, not when it
//!   starts fetching.
//! - Changing the reference location or the favorites rebuilds the
//!   snapshot from the last good feeds without refetching.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::try_join;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::{GeoPoint, StationId};
use crate::favorites::{FavoriteIds, FavoriteSetManager, PersistError};
use crate::feed::{FeedFetcher, FetchError};
use crate::reconcile::{ParsedFeeds, ReconcileConfig, ReconcileError, ReconciliationResult};

/// Default interval between refresh cycles.
const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Errors that end a cycle without publishing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("reconciliation failed: {0}")]
    Reconcile(#[from] ReconcileError),
}

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub reconcile: ReconcileConfig,

    /// How often a driver should call `refresh`.
    pub refresh_interval: Duration,
}

impl PipelineConfig {
    /// Set the refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set the reconciler configuration.
    pub fn with_reconcile(mut self, reconcile: ReconcileConfig) -> Self {
        self.reconcile = reconcile;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reconcile: ReconcileConfig::default(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

/// An immutable, fully computed station list.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Token of the fetch cycle whose feeds this was built from.
    pub cycle: u64,
    /// Location distances were measured from.
    pub reference: GeoPoint,
    /// Favorites set the partition was made with.
    pub favorites: FavoriteIds,
    /// When the snapshot was assembled.
    pub assembled_at: DateTime<Utc>,
    pub stations: ReconciliationResult,
}

impl Snapshot {
    fn assemble(
        cycle: u64,
        feeds: &ParsedFeeds,
        reference: GeoPoint,
        favorites: FavoriteIds,
    ) -> Self {
        let stations = feeds.assemble(reference, &favorites);
        Self {
            cycle,
            reference,
            favorites,
            assembled_at: Utc::now(),
            stations,
        }
    }
}

/// How a refresh cycle ended, when it didn't fail.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// The cycle's result is now the published snapshot.
    Published(Arc<Snapshot>),
    /// A later cycle was requested while this one was in flight; its result
    /// was discarded.
    Superseded { cycle: u64, latest: u64 },
}

struct FeedState {
    reference: GeoPoint,
    /// Feeds from the last published cycle.
    feeds: Option<Arc<ParsedFeeds>>,
    published: Option<Arc<Snapshot>>,
}

/// Fetches, reconciles and publishes station snapshots.
pub struct StationFeed<F> {
    fetcher: F,
    favorites: Arc<FavoriteSetManager>,
    config: PipelineConfig,
    requested: AtomicU64,
    state: RwLock<FeedState>,
}

impl<F: FeedFetcher> StationFeed<F> {
    /// Create a pipeline. Nothing is published until the first successful
    /// `refresh`.
    pub fn new(
        fetcher: F,
        favorites: Arc<FavoriteSetManager>,
        reference: GeoPoint,
        config: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            favorites,
            config,
            requested: AtomicU64::new(0),
            state: RwLock::new(FeedState {
                reference,
                feeds: None,
                published: None,
            }),
        }
    }

    /// The favorites manager this pipeline partitions with.
    pub fn favorites(&self) -> &Arc<FavoriteSetManager> {
        &self.favorites
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The current published snapshot, if any cycle has succeeded.
    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.state.read().await.published.clone()
    }

    /// The reference location the next assembly will use.
    pub async fn reference_location(&self) -> GeoPoint {
        self.state.read().await.reference
    }

    /// Run one reconciliation cycle.
    pub async fn refresh(&self) -> Result<CycleOutcome, PipelineError> {
        let cycle = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(cycle, "starting reconciliation cycle");

        let (information, status) = try_join(
            self.fetcher.fetch_information(),
            self.fetcher.fetch_status(),
        )
        .await
        .inspect_err(|e| warn!(cycle, error = %e, "feed fetch failed"))?;

        let feeds = ParsedFeeds::parse(&information, &status, &self.config.reconcile)
            .inspect_err(|e| warn!(cycle, error = %e, "feed rejected"))?;

        let mut state = self.state.write().await;

        let latest = self.requested.load(Ordering::SeqCst);
        if cycle < latest {
            debug!(cycle, latest, "discarding superseded cycle");
            return Ok(CycleOutcome::Superseded { cycle, latest });
        }

        let snapshot = Arc::new(Snapshot::assemble(
            cycle,
            &feeds,
            state.reference,
            self.favorites.snapshot(),
        ));
        state.feeds = Some(Arc::new(feeds));
        state.published = Some(Arc::clone(&snapshot));

        info!(
            cycle,
            stations = snapshot.stations.len(),
            favorites = snapshot.stations.favorites.len(),
            skipped_info = snapshot.stations.skipped_info_entries,
            skipped_status = snapshot.stations.skipped_status_entries,
            unmatched_status = snapshot.stations.unmatched_status_entries,
            "published station snapshot"
        );

        Ok(CycleOutcome::Published(snapshot))
    }

    /// Move the reference location and rebuild the published snapshot.
    ///
    /// Returns the new snapshot, or `None` if nothing has been published
    /// yet (the location is still used by the first cycle).
    pub async fn set_reference_location(&self, reference: GeoPoint) -> Option<Arc<Snapshot>> {
        let mut state = self.state.write().await;
        state.reference = reference;
        Self::republish(&mut state, self.favorites.snapshot())
    }

    /// Add a favorite and rebuild the published snapshot.
    ///
    /// The snapshot is rebuilt even when persisting fails, since the
    /// in-memory set changed regardless.
    pub async fn add_favorite(
        &self,
        id: StationId,
    ) -> Result<Option<Arc<Snapshot>>, PersistError> {
        let persisted = self.favorites.add(id);
        let snapshot = self.sync_favorites().await;
        persisted.map(|_| snapshot)
    }

    /// Remove a favorite and rebuild the published snapshot.
    pub async fn remove_favorite(
        &self,
        id: StationId,
    ) -> Result<Option<Arc<Snapshot>>, PersistError> {
        let persisted = self.favorites.remove(id);
        let snapshot = self.sync_favorites().await;
        persisted.map(|_| snapshot)
    }

    /// Rebuild the published snapshot if the favorites set has changed
    /// since it was assembled.
    ///
    /// Call this when the manager's watch channel fires for changes made
    /// outside this pipeline.
    pub async fn sync_favorites(&self) -> Option<Arc<Snapshot>> {
        let mut state = self.state.write().await;
        let favorites = self.favorites.snapshot();

        if let Some(published) = &state.published
            && *published.favorites == *favorites
        {
            return Some(Arc::clone(published));
        }
        Self::republish(&mut state, favorites)
    }

    fn republish(state: &mut FeedState, favorites: FavoriteIds) -> Option<Arc<Snapshot>> {
        let feeds = state.feeds.as_ref()?;
        let cycle = state.published.as_ref()?.cycle;

        let snapshot = Arc::new(Snapshot::assemble(cycle, feeds, state.reference, favorites));
        debug!(
            cycle,
            reference = %snapshot.reference,
            favorites = snapshot.stations.favorites.len(),
            "republished station snapshot"
        );

        state.published = Some(Arc::clone(&snapshot));
        Some(snapshot)
    }
}
