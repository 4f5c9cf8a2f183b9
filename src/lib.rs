//! # taskdesk
//!
//! Role-based task tracker: managers create, assign, edit and delete tasks;
//! employees see the tasks assigned to them and mark them complete.
//!
//! ## Architecture
//!
//! ```text
//!   HTTP (axum) ──► api::auth::require_auth ──► Actor
//!                                                 │
//!                                                 ▼
//!                                  ┌──────────────────────────┐
//!                                  │       TaskService        │
//!                                  │ policy → lifecycle → store│
//!                                  └────────────┬─────────────┘
//!                                               ▼
//!                                 memory │ file (JSON) │ sqlite
//! ```
//!
//! ## Modules
//! - `task`: task model, authorization policy, lifecycle validation, query/sort
//! - `account`: registration, login and password hashing
//! - `store`: pluggable persistence backends
//! - `api`: HTTP routes, JWT auth and error mapping

pub mod account;
pub mod api;
pub mod config;
pub mod store;
pub mod task;
pub mod util;

pub use account::{Actor, Role};
pub use config::Config;
pub use task::{Task, TaskError, TaskService};
