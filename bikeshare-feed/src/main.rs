use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bikeshare_feed::domain::GeoPoint;
use bikeshare_feed::favorites::{FavoriteSetManager, JsonFileStore};
use bikeshare_feed::feed::{FeedClient, FeedConfig};
use bikeshare_feed::pipeline::{CycleOutcome, PipelineConfig, StationFeed};

/// Default reference location: University of Toronto, St. George campus.
const DEFAULT_LAT: f64 = 43.6628917;
const DEFAULT_LON: f64 = -79.3956564;

/// Read an environment variable, falling back to `default` when unset or
/// unparseable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "ignoring unparseable environment variable");
            default
        }),
        Err(_) => default,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Feed client
    let defaults = FeedConfig::default();
    let feed_config = FeedConfig::new(
        env_or("BIKESHARE_INFO_URL", defaults.information_url),
        env_or("BIKESHARE_STATUS_URL", defaults.status_url),
    );
    let client = FeedClient::new(feed_config).expect("Failed to create feed client");

    // Favorites, written through to disk
    let store = JsonFileStore::new(env_or(
        "BIKESHARE_FAVORITES_PATH",
        String::from("favorites.json"),
    ));
    let favorites_path = store.path().display().to_string();
    let favorites = FavoriteSetManager::load(Arc::new(store.clone())).unwrap_or_else(|e| {
        warn!(error = %e, path = %favorites_path, "could not load favorites; starting empty");
        FavoriteSetManager::new(Arc::new(store), Default::default())
    });
    info!(count = favorites.snapshot().len(), "favorites loaded");

    let reference = GeoPoint::new(
        env_or("BIKESHARE_LAT", DEFAULT_LAT),
        env_or("BIKESHARE_LON", DEFAULT_LON),
    )
    .expect("BIKESHARE_LAT/BIKESHARE_LON must be a valid coordinate");

    let config = PipelineConfig::default().with_refresh_interval(Duration::from_secs(env_or(
        "BIKESHARE_REFRESH_SECS",
        30,
    )));
    let refresh_interval = config.refresh_interval;

    let feed = StationFeed::new(client, Arc::new(favorites), reference, config);
    let mut favorite_changes = feed.favorites().subscribe();

    info!(%reference, ?refresh_interval, "watching station feeds");

    let mut interval = tokio::time::interval(refresh_interval);
    loop {
        tokio::select! {
            _ = interval.tick() => match feed.refresh().await {
                Ok(CycleOutcome::Published(snapshot)) => {
                    if let Some(nearest) = snapshot.stations.nearest() {
                        info!(
                            station = %nearest.name,
                            distance_m = nearest.distance_meters.round(),
                            bikes = nearest.status.bikes_available,
                            docks = nearest.status.docks_available,
                            "nearest station"
                        );
                    }
                }
                Ok(CycleOutcome::Superseded { cycle, latest }) => {
                    info!(cycle, latest, "cycle superseded");
                }
                // Already logged; the previous snapshot stays published.
                Err(_) => {}
            },
            Ok(()) = favorite_changes.changed() => {
                feed.sync_favorites().await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }
}
