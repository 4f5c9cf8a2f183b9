//! SQLite-based store.

use super::{AccountStore, TaskFilter, TaskStore};
use crate::account::{Account, Role};
use crate::task::{Assignee, Priority, Task};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

const DB_FILE: &str = "taskdesk.db";

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_accounts_role ON accounts(role);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY NOT NULL,
    created_by TEXT NOT NULL,
    assigned_to TEXT NOT NULL DEFAULT 'Unassigned',
    title TEXT NOT NULL,
    description TEXT,
    due_date TEXT,
    priority TEXT NOT NULL DEFAULT 'Medium',
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_tasks_assigned_to ON tasks(assigned_to, created_at);
"#;

const TASK_COLUMNS: &str = "id, created_by, assigned_to, title, description, due_date, priority,
                            completed, created_at, updated_at";

const ACCOUNT_COLUMNS: &str = "id, name, email, role, password_hash, created_at";

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub async fn new(base_dir: PathBuf) -> Result<Self, String> {
        tokio::fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| format!("Failed to create store dir: {}", e))?;
        let db_path = base_dir.join(DB_FILE);

        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)
                .map_err(|e| format!("Failed to open SQLite database: {}", e))?;
            conn.execute_batch(SCHEMA)
                .map_err(|e| format!("Failed to run schema: {}", e))?;
            Ok::<_, String>(conn)
        })
        .await
        .map_err(|e| format!("Task join error: {}", e))??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, String> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn)
        })
        .await
        .map_err(|e| format!("Task join error: {}", e))?
    }
}

fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("Invalid timestamp {:?}: {}", s, e))
}

fn parse_uuid(s: &str) -> Result<Uuid, String> {
    Uuid::parse_str(s).map_err(|e| format!("Invalid id {:?}: {}", s, e))
}

/// Raw `tasks` row before conversion into a [`Task`].
struct TaskRow {
    id: String,
    created_by: String,
    assigned_to: String,
    title: String,
    description: Option<String>,
    due_date: Option<String>,
    priority: String,
    completed: bool,
    created_at: String,
    updated_at: String,
}

impl TaskRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            created_by: row.get(1)?,
            assigned_to: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            due_date: row.get(5)?,
            priority: row.get(6)?,
            completed: row.get::<_, i64>(7)? != 0,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn into_task(self) -> Result<Task, String> {
        let due_date = self
            .due_date
            .map(|d| {
                NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                    .map_err(|e| format!("Invalid due date {:?}: {}", d, e))
            })
            .transpose()?;
        let priority = Priority::parse(&self.priority)
            .ok_or_else(|| format!("Invalid priority {:?}", self.priority))?;
        Ok(Task {
            id: parse_uuid(&self.id)?,
            created_by: parse_uuid(&self.created_by)?,
            assigned_to: Assignee::from(self.assigned_to),
            title: self.title,
            description: self.description,
            due_date,
            priority,
            completed: self.completed,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

struct AccountRow {
    id: String,
    name: String,
    email: String,
    role: String,
    password_hash: String,
    created_at: String,
}

impl AccountRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            role: row.get(3)?,
            password_hash: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_account(self) -> Result<Account, String> {
        Ok(Account {
            id: parse_uuid(&self.id)?,
            name: self.name,
            email: self.email,
            role: Role::parse(&self.role).unwrap_or(Role::Unknown),
            password_hash: self.password_hash,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

fn query_accounts(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Account>, String> {
    let mut stmt = conn.prepare(sql).map_err(|e| e.to_string())?;
    let rows = stmt
        .query_map(params, AccountRow::from_row)
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    rows.into_iter().map(AccountRow::into_account).collect()
}

#[async_trait]
impl AccountStore for SqliteStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn insert_account(&self, account: &Account) -> Result<bool, String> {
        let account = account.clone();
        self.with_conn(move |conn| {
            let inserted = conn
                .execute(
                    "INSERT OR IGNORE INTO accounts (id, name, email, role, password_hash, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        account.id.to_string(),
                        account.name,
                        account.email,
                        account.role.as_str(),
                        account.password_hash,
                        timestamp(&account.created_at),
                    ],
                )
                .map_err(|e| e.to_string())?;
            Ok(inserted > 0)
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, String> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            let sql = format!("SELECT {} FROM accounts WHERE email = ?1", ACCOUNT_COLUMNS);
            Ok(query_accounts(conn, &sql, params![email])?.into_iter().next())
        })
        .await
    }

    async fn get_account(&self, id: Uuid) -> Result<Option<Account>, String> {
        self.with_conn(move |conn| {
            let sql = format!("SELECT {} FROM accounts WHERE id = ?1", ACCOUNT_COLUMNS);
            Ok(query_accounts(conn, &sql, params![id.to_string()])?
                .into_iter()
                .next())
        })
        .await
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<Account>, String> {
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {} FROM accounts WHERE role = ?1 ORDER BY email ASC",
                ACCOUNT_COLUMNS
            );
            query_accounts(conn, &sql, params![role.as_str()])
        })
        .await
    }
}

#[async_trait]
impl TaskStore for SqliteStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn create_task(&self, task: &Task) -> Result<(), String> {
        let task = task.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO tasks (id, created_by, assigned_to, title, description, due_date,
                                    priority, completed, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    task.id.to_string(),
                    task.created_by.to_string(),
                    task.assigned_to.as_str(),
                    task.title,
                    task.description,
                    task.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
                    task.priority.as_str(),
                    task.completed as i64,
                    timestamp(&task.created_at),
                    timestamp(&task.updated_at),
                ],
            )
            .map_err(|e| e.to_string())?;
            Ok(())
        })
        .await
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, String> {
        self.with_conn(move |conn| {
            let sql = format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS);
            let row = conn
                .query_row(&sql, params![id.to_string()], TaskRow::from_row)
                .optional()
                .map_err(|e| e.to_string())?;
            row.map(TaskRow::into_task).transpose()
        })
        .await
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, String> {
        let assigned_to = filter.assigned_to.clone();
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {} FROM tasks
                 WHERE (?1 IS NULL OR assigned_to = ?1)
                 ORDER BY created_at DESC, id ASC",
                TASK_COLUMNS
            );
            let mut stmt = conn.prepare(&sql).map_err(|e| e.to_string())?;
            let rows = stmt
                .query_map(params![assigned_to], TaskRow::from_row)
                .map_err(|e| e.to_string())?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.to_string())?;
            rows.into_iter().map(TaskRow::into_task).collect()
        })
        .await
    }

    async fn replace_task(&self, task: &Task) -> Result<bool, String> {
        let task = task.clone();
        self.with_conn(move |conn| {
            let updated = conn
                .execute(
                    "UPDATE tasks SET created_by = ?2, assigned_to = ?3, title = ?4,
                            description = ?5, due_date = ?6, priority = ?7, completed = ?8,
                            created_at = ?9, updated_at = ?10
                     WHERE id = ?1",
                    params![
                        task.id.to_string(),
                        task.created_by.to_string(),
                        task.assigned_to.as_str(),
                        task.title,
                        task.description,
                        task.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
                        task.priority.as_str(),
                        task.completed as i64,
                        timestamp(&task.created_at),
                        timestamp(&task.updated_at),
                    ],
                )
                .map_err(|e| e.to_string())?;
            Ok(updated > 0)
        })
        .await
    }

    async fn delete_task(&self, id: Uuid) -> Result<usize, String> {
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])
                .map_err(|e| e.to_string())
        })
        .await
    }
}
