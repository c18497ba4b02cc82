//! Periodic refresh of sensor data.
//!
//! A [`Coordinator`] owns a background task that calls an update function
//! on a fixed interval (and on demand), and publishes the outcome as a
//! [`SensorState`]. A failed update marks the sensor unavailable but keeps
//! the last good data; the next tick retries.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::viaggiatreno::FetchError;

/// Station boards refresh every 5 minutes.
pub const STATION_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// The globally tracked train refreshes every 30 seconds.
pub const GLOBAL_TRAIN_INTERVAL: Duration = Duration::from_secs(30);

/// Statically configured trains refresh every minute.
pub const STATIC_TRAIN_INTERVAL: Duration = Duration::from_secs(60);

/// What observers see of a coordinator.
pub struct SensorState<T> {
    /// Last successful result; survives failed refreshes.
    pub data: Option<Arc<T>>,

    /// False when the most recent refresh failed.
    pub available: bool,

    /// When `data` was last replaced.
    pub last_updated: Option<DateTime<Utc>>,

    /// Error from the most recent refresh, if it failed.
    pub last_error: Option<String>,

    /// Completed refresh attempts, successful or not.
    pub refresh_count: u64,
}

impl<T> Default for SensorState<T> {
    fn default() -> Self {
        Self {
            data: None,
            available: false,
            last_updated: None,
            last_error: None,
            refresh_count: 0,
        }
    }
}

impl<T> Clone for SensorState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            available: self.available,
            last_updated: self.last_updated,
            last_error: self.last_error.clone(),
            refresh_count: self.refresh_count,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SensorState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorState")
            .field("data", &self.data)
            .field("available", &self.available)
            .field("last_updated", &self.last_updated)
            .field("last_error", &self.last_error)
            .field("refresh_count", &self.refresh_count)
            .finish()
    }
}

impl<T> SensorState<T> {
    fn record(&mut self, result: Result<T, FetchError>) {
        self.refresh_count += 1;
        match result {
            Ok(data) => {
                self.data = Some(Arc::new(data));
                self.available = true;
                self.last_updated = Some(Utc::now());
                self.last_error = None;
            }
            Err(e) => {
                self.available = false;
                self.last_error = Some(e.to_string());
            }
        }
    }
}

/// Handle for asking a coordinator to refresh now.
#[derive(Debug, Clone, Default)]
pub struct Refresher(Arc<Notify>);

impl Refresher {
    /// Request one refresh as soon as possible.
    ///
    /// Requests made while a refresh is running queue one more refresh;
    /// repeated requests do not pile up.
    pub fn request_refresh(&self) {
        self.0.notify_one();
    }
}

/// Periodic updater for one sensor.
///
/// Dropping the coordinator aborts its task, cancelling any in-flight
/// requests.
pub struct Coordinator<T> {
    name: String,
    state: watch::Receiver<SensorState<T>>,
    refresher: Refresher,
    task: JoinHandle<()>,
}

impl<T: Send + Sync + 'static> Coordinator<T> {
    /// Start refreshing with `update` every `interval`.
    ///
    /// The first refresh runs immediately.
    pub fn spawn<F, Fut>(name: impl Into<String>, interval: Duration, update: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let name = name.into();
        let (tx, rx) = watch::channel(SensorState::default());
        let refresher = Refresher::default();

        let task = tokio::spawn(run(
            name.clone(),
            interval,
            update,
            tx,
            refresher.clone(),
        ));

        Self {
            name,
            state: rx,
            refresher,
            task,
        }
    }
}

impl<T> Coordinator<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SensorState<T> {
        self.state.borrow().clone()
    }

    /// Receiver notified after every refresh.
    pub fn subscribe(&self) -> watch::Receiver<SensorState<T>> {
        self.state.clone()
    }

    pub fn refresher(&self) -> Refresher {
        self.refresher.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop refreshing and wait for the task to wind down.
    pub async fn shutdown(&mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;
        debug!(coordinator = %self.name, "Coordinator stopped");
    }
}

impl<T> Drop for Coordinator<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<T, F, Fut>(
    name: String,
    interval: Duration,
    update: F,
    tx: watch::Sender<SensorState<T>>,
    refresher: Refresher,
) where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = refresher.0.notified() => {
                debug!(coordinator = %name, "Immediate refresh requested");
                ticker.reset();
            }
        }

        let result = update().await;
        match &result {
            Ok(_) => debug!(coordinator = %name, "Refresh succeeded"),
            Err(e) => warn!(coordinator = %name, error = %e, "Refresh failed"),
        }
        tx.send_modify(|state| state.record(result));
    }
}
