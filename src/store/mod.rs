//! Account and task storage with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `file`: JSON snapshot on disk
//! - `sqlite`: SQLite database
//!
//! Stores only persist what they are given. Authorization and validation
//! happen before a store is called.

mod file;
mod memory;
mod sqlite;

pub use file::FileStore;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::account::{normalize_email, Account, Role};
use crate::task::Task;

/// Restriction applied when listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Only tasks assigned to this (normalized) email
    pub assigned_to: Option<String>,
}

impl TaskFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn assigned_to(email: &str) -> Self {
        Self {
            assigned_to: Some(normalize_email(email)),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match &self.assigned_to {
            Some(email) => task.assigned_to.is(email),
            None => true,
        }
    }
}

/// Account persistence.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Whether this store persists across restarts.
    fn is_persistent(&self) -> bool;

    /// Insert a new account. Returns `false` if the email is already taken.
    async fn insert_account(&self, account: &Account) -> Result<bool, String>;

    /// Look up an account by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, String>;

    async fn get_account(&self, id: Uuid) -> Result<Option<Account>, String>;

    async fn list_by_role(&self, role: Role) -> Result<Vec<Account>, String>;
}

/// Task persistence.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether this store persists across restarts.
    fn is_persistent(&self) -> bool;

    async fn create_task(&self, task: &Task) -> Result<(), String>;

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, String>;

    /// Tasks matching `filter`, most recently created first.
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, String>;

    /// Replace a stored task wholesale. Returns `false` if it no longer exists.
    async fn replace_task(&self, task: &Task) -> Result<bool, String>;

    /// Delete a task, returning how many records were removed (0 or 1).
    async fn delete_task(&self, id: Uuid) -> Result<usize, String>;
}

/// Store backend type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreType {
    Memory,
    File,
    #[default]
    Sqlite,
}

impl StoreType {
    /// Parse from environment variable value.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "file" | "json" => Some(Self::File),
            "sqlite" | "db" => Some(Self::Sqlite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Both stores, usually backed by the same object.
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub tasks: Arc<dyn TaskStore>,
}

/// Create the stores for the given backend.
pub async fn create_stores(store_type: StoreType, base_dir: PathBuf) -> Result<Stores, String> {
    match store_type {
        StoreType::Memory => {
            let store = Arc::new(InMemoryStore::new());
            Ok(Stores {
                accounts: store.clone(),
                tasks: store,
            })
        }
        StoreType::File => {
            let store = Arc::new(FileStore::new(base_dir).await?);
            Ok(Stores {
                accounts: store.clone(),
                tasks: store,
            })
        }
        StoreType::Sqlite => {
            let store = Arc::new(SqliteStore::new(base_dir).await?);
            Ok(Stores {
                accounts: store.clone(),
                tasks: store,
            })
        }
    }
}

/// Newest first; id breaks ties so the order is total.
pub(crate) fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}
