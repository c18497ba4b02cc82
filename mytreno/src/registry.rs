//! Process-wide registry of sensor scopes.
//!
//! A scope is one addressable sensor: a station board, the global tracked
//! train, or a statically configured train. Train scopes own a
//! [`TrackedTrain`] cell that `set_train` writes and the scope's refresh
//! reads.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::coordinator::{
    Coordinator, GLOBAL_TRAIN_INTERVAL, STATIC_TRAIN_INTERVAL, STATION_INTERVAL,
};
use crate::domain::{StationBoard, TrainStatus};
use crate::viaggiatreno::{BoardStatusPolicy, Transport, fetch_station_board, fetch_train_status};

/// Scope id of the global tracked train.
pub const GLOBAL_SCOPE: &str = "global";

/// Scope id for a station board.
pub fn station_scope_id(station_id: &str) -> String {
    format!("station_{station_id}")
}

/// Scope id for a statically configured train.
pub fn train_scope_id(train_number: &str) -> String {
    format!("train_{train_number}")
}

/// Errors from registry commands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("invalid train number: '{0}' (expected digits)")]
    InvalidTrainNumber(String),
}

/// Check a train number: non-empty ASCII digits once trimmed.
pub fn validate_train_number(train_number: &str) -> Result<String, CommandError> {
    let trimmed = train_number.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CommandError::InvalidTrainNumber(train_number.to_string()));
    }
    Ok(trimmed.to_string())
}

/// The currently selected train of a scope.
///
/// Starts idle (`None`) unless seeded; once a train is set there is no way
/// back to idle short of a restart.
#[derive(Debug, Clone, Default)]
pub struct TrackedTrain {
    inner: Arc<RwLock<Option<String>>>,
}

impl TrackedTrain {
    pub fn new(initial: Option<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Snapshot of the selected train number.
    pub async fn get(&self) -> Option<String> {
        self.inner.read().await.clone()
    }

    pub async fn set(&self, train_number: String) {
        *self.inner.write().await = Some(train_number);
    }
}

/// A station board scope.
pub struct StationScope {
    pub station_id: String,
    pub station_name: String,
    pub coordinator: Coordinator<StationBoard>,
}

/// A train tracking scope.
pub struct TrainScope {
    pub tracked: TrackedTrain,
    /// Absent when nothing refreshes this scope (tests, or setup in progress).
    pub coordinator: Option<Coordinator<Option<TrainStatus>>>,
}

/// One registered scope.
pub enum Scope {
    Station(StationScope),
    Train(TrainScope),
}

/// All scopes of the running process, keyed by scope id.
#[derive(Default)]
pub struct Registry {
    scopes: BTreeMap<String, Scope>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scope. Returns false (and keeps the existing one) if the
    /// id is taken.
    pub fn insert(&mut self, scope_id: impl Into<String>, scope: Scope) -> bool {
        let scope_id = scope_id.into();
        if self.scopes.contains_key(&scope_id) {
            warn!(scope = %scope_id, "Duplicate scope ignored");
            return false;
        }
        self.scopes.insert(scope_id, scope);
        true
    }

    pub fn get(&self, scope_id: &str) -> Option<&Scope> {
        self.scopes.get(scope_id)
    }

    /// Scopes in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scope)> {
        self.scopes.iter().map(|(id, scope)| (id.as_str(), scope))
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Start refreshing a station board.
    pub fn start_station<T>(
        &mut self,
        transport: T,
        station_id: &str,
        station_name: &str,
        policy: BoardStatusPolicy,
    ) -> bool
    where
        T: Transport + Clone + 'static,
    {
        let scope_id = station_scope_id(station_id);
        if self.scopes.contains_key(&scope_id) {
            warn!(scope = %scope_id, "Station already registered");
            return false;
        }

        let id = station_id.to_string();
        let coordinator = Coordinator::spawn(scope_id.clone(), STATION_INTERVAL, move || {
            let transport = transport.clone();
            let id = id.clone();
            async move { fetch_station_board(&transport, &id, policy).await }
        });

        info!(scope = %scope_id, station_name, "Station board registered");
        self.insert(
            scope_id,
            Scope::Station(StationScope {
                station_id: station_id.to_string(),
                station_name: station_name.to_string(),
                coordinator,
            }),
        )
    }

    /// Start the global tracked train, initially idle.
    pub fn start_global_train<T>(&mut self, transport: T) -> bool
    where
        T: Transport + Clone + 'static,
    {
        self.start_train(transport, GLOBAL_SCOPE, None, GLOBAL_TRAIN_INTERVAL)
    }

    /// Start tracking a statically configured train.
    pub fn start_static_train<T>(&mut self, transport: T, train_number: &str) -> bool
    where
        T: Transport + Clone + 'static,
    {
        self.start_train(
            transport,
            &train_scope_id(train_number),
            Some(train_number.to_string()),
            STATIC_TRAIN_INTERVAL,
        )
    }

    fn start_train<T>(
        &mut self,
        transport: T,
        scope_id: &str,
        initial: Option<String>,
        interval: Duration,
    ) -> bool
    where
        T: Transport + Clone + 'static,
    {
        if self.scopes.contains_key(scope_id) {
            warn!(scope = %scope_id, "Train scope already registered");
            return false;
        }

        let tracked = TrackedTrain::new(initial);
        let cell = tracked.clone();
        let coordinator = Coordinator::spawn(scope_id, interval, move || {
            let transport = transport.clone();
            let cell = cell.clone();
            async move {
                // one read per refresh, so the whole cycle sees one train
                let train_number = cell.get().await;
                fetch_train_status(&transport, train_number.as_deref()).await
            }
        });

        info!(scope = %scope_id, "Train scope registered");
        self.insert(
            scope_id,
            Scope::Train(TrainScope {
                tracked,
                coordinator: Some(coordinator),
            }),
        )
    }

    /// Change the train tracked by a scope.
    ///
    /// `scope = None` addresses the global scope. Unknown scopes and scopes
    /// that do not track trains are ignored. When the scope has a running
    /// coordinator, one immediate refresh is requested.
    pub async fn set_train(
        &self,
        train_number: &str,
        scope: Option<&str>,
    ) -> Result<(), CommandError> {
        let train_number = validate_train_number(train_number)?;
        let scope_id = scope.unwrap_or(GLOBAL_SCOPE);

        let Some(Scope::Train(train)) = self.scopes.get(scope_id) else {
            debug!(scope = %scope_id, "set_train: no train scope with this id");
            return Ok(());
        };

        train.tracked.set(train_number.clone()).await;
        if let Some(coordinator) = &train.coordinator {
            coordinator.refresher().request_refresh();
        }

        info!(scope = %scope_id, %train_number, "Tracked train changed");
        Ok(())
    }

    /// Stop every coordinator and wait for their tasks to finish.
    ///
    /// Dropping the registry also aborts the tasks, but without waiting.
    pub async fn shutdown(&mut self) {
        for scope in self.scopes.values_mut() {
            match scope {
                Scope::Station(station) => station.coordinator.shutdown().await,
                Scope::Train(train) => {
                    if let Some(coordinator) = train.coordinator.as_mut() {
                        coordinator.shutdown().await;
                    }
                }
            }
        }
    }
}
