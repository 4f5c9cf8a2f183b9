//! HTTP API for taskdesk.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `POST /api/auth/register` - Create an account and receive a token
//! - `POST /api/auth/login` - Exchange credentials for a token
//! - `GET /api/auth/me` - Current account and its capabilities
//! - `GET /api/users` - List employees (managers only)
//! - `GET /api/tasks` - List visible tasks (`search`, `status`, `sort` query params)
//! - `POST /api/tasks` - Create a task (managers only)
//! - `PUT /api/tasks/{id}` - Update a task
//! - `DELETE /api/tasks/{id}` - Delete a task (managers only)
//!
//! Everything except health, register and login requires
//! `Authorization: Bearer <jwt>`.

mod auth;
mod error;
mod extract;
mod routes;
mod tasks;
pub mod types;
mod users;

pub use error::{ApiError, ErrorBody};
pub use extract::{ApiJson, ApiQuery};
pub use routes::{router, serve, AppState};
pub use types::*;
