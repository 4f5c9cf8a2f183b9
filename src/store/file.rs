//! JSON file-based store.
//!
//! The whole data set lives in memory and is rewritten to
//! `taskdesk.json` after every mutation (write to a temp file, then rename).
//! A mutation whose write fails is undone in memory before the error is
//! returned.

use super::{sort_newest_first, AccountStore, TaskFilter, TaskStore};
use crate::account::{Account, Role};
use crate::task::Task;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

const FILE_NAME: &str = "taskdesk.json";

#[derive(Debug, Serialize, Deserialize, Default)]
struct StoreSnapshot {
    #[serde(default)]
    accounts: HashMap<Uuid, Account>,
    #[serde(default)]
    tasks: HashMap<Uuid, Task>,
}

#[derive(Clone)]
pub struct FileStore {
    path: PathBuf,
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
    persist_lock: Arc<Mutex<()>>,
}

impl FileStore {
    pub async fn new(base_dir: PathBuf) -> Result<Self, String> {
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| format!("Failed to create store dir: {}", e))?;
        let path = base_dir.join(FILE_NAME);
        let snapshot = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<StoreSnapshot>(&bytes)
                .map_err(|e| format!("Failed to parse store {}: {}", path.display(), e))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreSnapshot::default(),
            Err(err) => {
                return Err(format!("Failed to read store {}: {}", path.display(), err));
            }
        };
        tracing::debug!(
            path = %path.display(),
            accounts = snapshot.accounts.len(),
            tasks = snapshot.tasks.len(),
            "Loaded file store"
        );

        Ok(Self {
            path,
            accounts: Arc::new(RwLock::new(snapshot.accounts)),
            tasks: Arc::new(RwLock::new(snapshot.tasks)),
            persist_lock: Arc::new(Mutex::new(())),
        })
    }

    async fn persist(&self) -> Result<(), String> {
        let _guard = self.persist_lock.lock().await;
        let snapshot = StoreSnapshot {
            accounts: self.accounts.read().await.clone(),
            tasks: self.tasks.read().await.clone(),
        };
        let data = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| format!("Failed to serialize store: {}", e))?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, data)
            .await
            .map_err(|e| format!("Failed to write store: {}", e))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| format!("Failed to finalize store: {}", e))?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for FileStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn insert_account(&self, account: &Account) -> Result<bool, String> {
        {
            let mut accounts = self.accounts.write().await;
            if accounts.values().any(|a| a.email == account.email) {
                return Ok(false);
            }
            accounts.insert(account.id, account.clone());
        }
        if let Err(err) = self.persist().await {
            self.accounts.write().await.remove(&account.id);
            return Err(err);
        }
        Ok(true)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, String> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn get_account(&self, id: Uuid) -> Result<Option<Account>, String> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<Account>, String> {
        let mut accounts: Vec<Account> = self
            .accounts
            .read()
            .await
            .values()
            .filter(|a| a.role == role)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(accounts)
    }
}

#[async_trait]
impl TaskStore for FileStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn create_task(&self, task: &Task) -> Result<(), String> {
        let previous = self.tasks.write().await.insert(task.id, task.clone());
        if let Err(err) = self.persist().await {
            let mut tasks = self.tasks.write().await;
            match previous {
                Some(previous) => tasks.insert(task.id, previous),
                None => tasks.remove(&task.id),
            };
            return Err(err);
        }
        Ok(())
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, String> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, String> {
        let mut tasks: Vec<Task> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        sort_newest_first(&mut tasks);
        Ok(tasks)
    }

    async fn replace_task(&self, task: &Task) -> Result<bool, String> {
        let previous = {
            let mut tasks = self.tasks.write().await;
            match tasks.get_mut(&task.id) {
                Some(existing) => std::mem::replace(existing, task.clone()),
                None => return Ok(false),
            }
        };
        if let Err(err) = self.persist().await {
            self.tasks.write().await.insert(previous.id, previous);
            return Err(err);
        }
        Ok(true)
    }

    async fn delete_task(&self, id: Uuid) -> Result<usize, String> {
        let Some(removed) = self.tasks.write().await.remove(&id) else {
            return Ok(0);
        };
        if let Err(err) = self.persist().await {
            self.tasks.write().await.insert(id, removed);
            return Err(err);
        }
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing;
    use super::*;
    use crate::task::Assignee;

    #[tokio::test]
    async fn test_account_contract() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).await.unwrap();
        testing::exercise_accounts(&store).await;
    }

    #[tokio::test]
    async fn test_task_contract() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).await.unwrap();
        testing::exercise_tasks(&store).await;
    }

    #[tokio::test]
    async fn test_reload_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let account = testing::account("alice@x.com", Role::Employee);
        let task = testing::task("persisted", 0, Some("alice@x.com"));
        {
            let store = FileStore::new(dir.path().to_path_buf()).await.unwrap();
            store.insert_account(&account).await.unwrap();
            store.create_task(&task).await.unwrap();
        }

        let reopened = FileStore::new(dir.path().to_path_buf()).await.unwrap();
        assert_eq!(
            reopened.find_by_email("alice@x.com").await.unwrap(),
            Some(account)
        );
        let loaded = reopened.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(loaded, task);
        assert_eq!(
            loaded.assigned_to,
            Assignee::Employee("alice@x.com".to_string())
        );
        assert!(!dir.path().join("taskdesk.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_state_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let store = FileStore::new(data_dir.clone()).await.unwrap();
        let kept = testing::task("kept", 0, None);
        store.create_task(&kept).await.unwrap();

        std::fs::remove_dir_all(&data_dir).unwrap();

        let account = testing::account("alice@x.com", Role::Employee);
        assert!(store.insert_account(&account).await.is_err());
        assert_eq!(store.find_by_email("alice@x.com").await.unwrap(), None);

        let fresh = testing::task("fresh", 1, None);
        assert!(store.create_task(&fresh).await.is_err());
        assert_eq!(store.get_task(fresh.id).await.unwrap(), None);

        let mut renamed = kept.clone();
        renamed.title = "renamed".to_string();
        assert!(store.replace_task(&renamed).await.is_err());
        assert_eq!(store.get_task(kept.id).await.unwrap(), Some(kept.clone()));

        assert!(store.delete_task(kept.id).await.is_err());
        assert_eq!(store.get_task(kept.id).await.unwrap(), Some(kept));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(FILE_NAME), b"{not json").unwrap();
        assert!(FileStore::new(dir.path().to_path_buf()).await.is_err());
    }
}
