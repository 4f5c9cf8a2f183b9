//! Accounts, roles and the authenticated actor.
//!
//! Accounts are created at registration and never updated afterwards; the
//! role chosen at registration is fixed for the life of the account.
//!
//! Every core operation receives an explicit [`Actor`] built from a verified
//! token. Nothing in the crate reads ambient session state.

mod password;

pub use password::{hash_password, verify_password, DEFAULT_ITERATIONS};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use uuid::Uuid;

use crate::store::AccountStore;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Employee,
    /// A role this server does not recognise. Denied every operation.
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Parse a role name. Only `manager` and `employee` are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "manager" => Some(Self::Manager),
            "employee" => Some(Self::Employee),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Employee => "employee",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    /// Trimmed and lowercased; unique across accounts.
    pub email: String,
    pub role: Role,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of an account (never carries the password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role,
        }
    }
}

/// The authenticated entity performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, email: &str, role: Role) -> Self {
        Self {
            id,
            email: normalize_email(email),
            role,
        }
    }

    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }
}

impl From<&Account> for Actor {
    fn from(account: &Account) -> Self {
        Self::new(account.id, &account.email, account.role)
    }
}

/// Registration request as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Email, password, and role are required")]
    MissingField,

    #[error("Role must be manager or employee")]
    InvalidRole,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password must be at least {} characters", MIN_PASSWORD_LENGTH)]
    WeakPassword,

    #[error("User with this email already exists")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Account store error: {0}")]
    Store(String),
}

/// Trim and lowercase an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Loose syntactic check: something@something.something, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

/// Registration and login over an [`AccountStore`].
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    hash_iterations: u32,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>, hash_iterations: u32) -> Self {
        Self {
            store,
            hash_iterations,
        }
    }

    /// Register a new account.
    ///
    /// The name defaults to the local part of the email when not supplied.
    pub async fn register(&self, registration: Registration) -> Result<Account, AccountError> {
        let email = registration
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty());
        let password = registration.password.filter(|p| !p.is_empty());
        let role = registration.role.filter(|r| !r.trim().is_empty());

        let (Some(email), Some(password), Some(role)) = (email, password, role) else {
            return Err(AccountError::MissingField);
        };
        let role = Role::parse(&role).ok_or(AccountError::InvalidRole)?;
        if !is_valid_email(&email) {
            return Err(AccountError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AccountError::WeakPassword);
        }

        if self
            .store
            .find_by_email(&email)
            .await
            .map_err(AccountError::Store)?
            .is_some()
        {
            return Err(AccountError::EmailTaken);
        }

        let iterations = self.hash_iterations;
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password(&password, iterations))
                .await
                .map_err(|e| AccountError::Hash(e.to_string()))??;

        let name = registration
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        let account = Account {
            id: Uuid::new_v4(),
            name,
            email,
            role,
            password_hash,
            created_at: Utc::now(),
        };

        // The store enforces uniqueness atomically; the lookup above only
        // gives the common case a cheap early exit.
        if !self
            .store
            .insert_account(&account)
            .await
            .map_err(AccountError::Store)?
        {
            return Err(AccountError::EmailTaken);
        }
        Ok(account)
    }

    /// Verify credentials and return the matching account.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AccountError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AccountError::MissingField);
        }

        let account = self
            .store
            .find_by_email(&email)
            .await
            .map_err(AccountError::Store)?
            .ok_or(AccountError::InvalidCredentials)?;

        let stored = account.password_hash.clone();
        let password = password.to_string();
        let ok = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|e| AccountError::Hash(e.to_string()))?;

        if ok {
            Ok(account)
        } else {
            Err(AccountError::InvalidCredentials)
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Account>, AccountError> {
        self.store.get_account(id).await.map_err(AccountError::Store)
    }
}
