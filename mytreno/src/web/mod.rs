//! Web layer: sensor state and the `set_train` command over HTTP.

mod dto;
mod routes;
mod state;

pub use dto::{ErrorResponse, SensorListResponse, SensorResult, SetTrainRequest};
pub use routes::{AppError, create_router};
pub use state::AppState;
