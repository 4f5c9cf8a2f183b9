//! In-memory store (non-persistent).

use super::{sort_newest_first, AccountStore, TaskFilter, TaskStore};
use crate::account::{Account, Role};
use crate::task::Task;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone)]
pub struct InMemoryStore {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            tasks: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn insert_account(&self, account: &Account) -> Result<bool, String> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == account.email) {
            return Ok(false);
        }
        accounts.insert(account.id, account.clone());
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
impl TaskStore for InMemoryStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn create_task(&self, task: &Task) -> Result<(), String> {
        self.tasks.write().await.insert(task.id, task.clone());
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
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&task.id) {
            Some(existing) => {
                *existing = task.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_task(&self, id: Uuid) -> Result<usize, String> {
        Ok(usize::from(self.tasks.write().await.remove(&id).is_some()))
    }
}
