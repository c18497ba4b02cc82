//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::warn;

use crate::registry::CommandError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/sensors", get(list_sensors))
        .route("/api/sensors/:scope", get(get_sensor))
        .route("/api/services/set_train", post(set_train))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Every sensor, in scope id order.
async fn list_sensors(State(state): State<AppState>) -> Json<SensorListResponse> {
    let sensors = state
        .registry
        .iter()
        .map(|(id, scope)| SensorResult::from_scope(id, scope))
        .collect();

    Json(SensorListResponse { sensors })
}

/// One sensor by scope id.
async fn get_sensor(
    State(state): State<AppState>,
    Path(scope_id): Path<String>,
) -> Result<Json<SensorResult>, AppError> {
    let scope = state
        .registry
        .get(&scope_id)
        .ok_or_else(|| AppError::NotFound {
            message: format!("Unknown sensor: {scope_id}"),
        })?;

    Ok(Json(SensorResult::from_scope(&scope_id, scope)))
}

/// Change the tracked train.
///
/// Unknown scopes are accepted and ignored.
async fn set_train(
    State(state): State<AppState>,
    Json(req): Json<SetTrainRequest>,
) -> Result<StatusCode, AppError> {
    let train_number = req.train_number.ok_or_else(|| AppError::BadRequest {
        message: "train_number is required".to_string(),
    })?;

    state
        .registry
        .set_train(&train_number, req.scope.as_deref())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl From<CommandError> for AppError {
    fn from(e: CommandError) -> Self {
        match e {
            CommandError::InvalidTrainNumber(_) => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message.clone()),
        };

        warn!(%status, %message, "Request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::registry::{GLOBAL_SCOPE, Registry, Scope, TrackedTrain, TrainScope};

    fn app_with_global() -> (AppState, TrackedTrain) {
        let tracked = TrackedTrain::default();
        let mut registry = Registry::new();
        registry.insert(
            GLOBAL_SCOPE,
            Scope::Train(TrainScope {
                tracked: tracked.clone(),
                coordinator: None,
            }),
        );
        (AppState::new(Arc::new(registry)), tracked)
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn lists_sensors() {
        let (state, _) = app_with_global();
        let Json(list) = list_sensors(State(state)).await;
        assert_eq!(list.sensors.len(), 1);
        assert_eq!(list.sensors[0].scope, "global");
    }

    #[tokio::test]
    async fn unknown_sensor_is_not_found() {
        let (state, _) = app_with_global();
        let err = get_sensor(State(state), Path("station_S0".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn set_train_updates_global() {
        let (state, tracked) = app_with_global();
        let req = SetTrainRequest {
            train_number: Some("9650".into()),
            scope: None,
        };

        let status = set_train(State(state), Json(req)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(tracked.get().await.as_deref(), Some("9650"));
    }

    #[tokio::test]
    async fn set_train_requires_number() {
        let (state, _) = app_with_global();
        let req = SetTrainRequest {
            train_number: None,
            scope: None,
        };
        let err = set_train(State(state.clone()), Json(req)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));

        let req = SetTrainRequest {
            train_number: Some("FR9650".into()),
            scope: None,
        };
        let err = set_train(State(state), Json(req)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn set_train_unknown_scope_accepted() {
        let (state, tracked) = app_with_global();
        let req = SetTrainRequest {
            train_number: Some("9650".into()),
            scope: Some("unknown_scope".into()),
        };

        let status = set_train(State(state), Json(req)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(tracked.get().await, None);
    }
}
