//! User directory endpoints.

use axum::{extract::State, routing::get, Extension, Json, Router};
use std::sync::Arc;

use super::error::ApiError;
use super::routes::AppState;
use super::types::EmployeeEntry;
use crate::account::Actor;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_employees))
}

/// Employees that tasks can be assigned to. Managers only.
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<EmployeeEntry>>, ApiError> {
    let employees = state.tasks.list_employees(&actor).await?;
    Ok(Json(employees.into_iter().map(EmployeeEntry::from).collect()))
}
