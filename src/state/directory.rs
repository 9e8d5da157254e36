//! User directory.
//!
//! The router only needs two read operations, expressed by the
//! [`UserDirectory`] trait. [`InMemoryDirectory`] is the implementation the
//! daemon runs with: seeded from the config file and extended by
//! registrations at run time.

use super::Language;
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;

/// Longest accepted username.
pub const MAX_USERNAME_LEN: usize = 32;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub username: String,
    pub language: Language,
}

impl User {
    pub fn new(username: impl Into<String>, language: Language) -> Self {
        Self {
            username: username.into(),
            language,
        }
    }
}

/// Directory write errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("username already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid username: {0:?}")]
    InvalidUsername(String),
}

impl DirectoryError {
    /// Static error code for metrics labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyExists(_) => "already_exists",
            Self::InvalidUsername(_) => "invalid_username",
        }
    }
}

/// Read access to known users.
pub trait UserDirectory: Send + Sync {
    fn find_by_username(&self, username: &str) -> Option<User>;

    /// All known users, in registration order.
    fn list_all(&self) -> Vec<User>;
}

/// Returns `true` if `username` may be registered.
///
/// Usernames double as room keys, so they must be non-empty, bounded and
/// free of whitespace and control characters.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= MAX_USERNAME_LEN
        && !username
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
}

/// Directory held in memory behind a read-mostly lock.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: RwLock<Vec<User>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from a seed list, rejecting invalid or duplicate names.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Result<Self, DirectoryError> {
        let directory = Self::new();
        for user in users {
            directory.register(user.username, user.language)?;
        }
        Ok(directory)
    }

    /// Register a new user.
    pub fn register(&self, username: impl Into<String>, language: Language) -> Result<User, DirectoryError> {
        let username = username.into();
        if !is_valid_username(&username) {
            return Err(DirectoryError::InvalidUsername(username));
        }

        let mut users = self.users.write();
        if users.iter().any(|u| u.username == username) {
            return Err(DirectoryError::AlreadyExists(username));
        }

        let user = User::new(username, language);
        users.push(user.clone());
        Ok(user)
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

impl UserDirectory for InMemoryDirectory {
    fn find_by_username(&self, username: &str) -> Option<User> {
        self.users
            .read()
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    fn list_all(&self) -> Vec<User> {
        self.users.read().clone()
    }
}
