// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User directory.
//!
//! The relational datastore that owns user accounts is an external
//! collaborator. The authentication core only reads from it through the
//! [`UserDirectory`] trait; [`InMemoryUserDirectory`] backs development
//! deployments and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::Role;

/// Directory lookup failures.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("user directory unavailable: {0}")]
    Unavailable(String),

    #[error("{field} '{value}' is already taken")]
    Conflict { field: &'static str, value: String },
}

/// A stored account.
///
/// `password_hash` never leaves the server: it is not serialized and the
/// `Debug` output redacts it.
#[derive(Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("roles", &self.roles)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Read access to user accounts.
///
/// Lookups are synchronous and expected to be fast; timeouts and retries are
/// the implementation's concern.
pub trait UserDirectory: Send + Sync {
    /// Find a user by username, falling back to email.
    fn find_by_username_or_email(&self, login: &str) -> Result<Option<UserRecord>, DirectoryError>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DirectoryError>;

    fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, DirectoryError>;

    fn username_exists(&self, username: &str) -> Result<bool, DirectoryError> {
        Ok(self.find_by_username(username)?.is_some())
    }

    fn email_exists(&self, email: &str) -> Result<bool, DirectoryError>;

    fn list(&self) -> Result<Vec<UserRecord>, DirectoryError>;

    /// Cheap reachability check for readiness probes.
    fn ping(&self) -> Result<(), DirectoryError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<Uuid, UserRecord>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account. Usernames and emails are unique.
    pub fn insert(&self, user: UserRecord) -> Result<UserRecord, DirectoryError> {
        let mut users = self
            .users
            .write()
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        if users.values().any(|u| u.username == user.username) {
            return Err(DirectoryError::Conflict {
                field: "username",
                value: user.username,
            });
        }
        if users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(DirectoryError::Conflict {
                field: "email",
                value: user.email,
            });
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    fn find(&self, pred: impl Fn(&UserRecord) -> bool) -> Result<Option<UserRecord>, DirectoryError> {
        let users = self
            .users
            .read()
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;
        Ok(users.values().find(|u| pred(*u)).cloned())
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_by_username_or_email(&self, login: &str) -> Result<Option<UserRecord>, DirectoryError> {
        match self.find_by_username(login)? {
            Some(user) => Ok(Some(user)),
            None => self.find(|u| u.email.eq_ignore_ascii_case(login)),
        }
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DirectoryError> {
        self.find(|u| u.id == id)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, DirectoryError> {
        self.find(|u| u.username == username)
    }

    fn email_exists(&self, email: &str) -> Result<bool, DirectoryError> {
        Ok(self.find(|u| u.email.eq_ignore_ascii_case(email))?.is_some())
    }

    fn list(&self) -> Result<Vec<UserRecord>, DirectoryError> {
        let users = self
            .users
            .read()
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;
        let mut all: Vec<UserRecord> = users.values().cloned().collect();
        all.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(all)
    }

    fn ping(&self) -> Result<(), DirectoryError> {
        self.users
            .read()
            .map(|_| ())
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(username: &str, email: &str) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            name: username.to_uppercase(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            roles: vec![Role::User],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn lookup_by_username_or_email() {
        let dir = InMemoryUserDirectory::new();
        let alice = dir.insert(record("alice", "alice@example.com")).unwrap();

        let by_name = dir.find_by_username_or_email("alice").unwrap().unwrap();
        assert_eq!(by_name.id, alice.id);

        let by_email = dir
            .find_by_username_or_email("ALICE@example.com")
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, alice.id);

        assert!(dir.find_by_username_or_email("bob").unwrap().is_none());
        assert_eq!(dir.find_by_id(alice.id).unwrap().unwrap().username, "alice");
    }

    #[test]
    fn insert_rejects_duplicates() {
        let dir = InMemoryUserDirectory::new();
        dir.insert(record("alice", "alice@example.com")).unwrap();

        let err = dir.insert(record("alice", "other@example.com")).unwrap_err();
        assert!(matches!(err, DirectoryError::Conflict { field: "username", .. }));

        let err = dir.insert(record("alice2", "Alice@Example.com")).unwrap_err();
        assert!(matches!(err, DirectoryError::Conflict { field: "email", .. }));
    }

    #[test]
    fn availability_checks() {
        let dir = InMemoryUserDirectory::new();
        dir.insert(record("alice", "alice@example.com")).unwrap();

        assert!(dir.username_exists("alice").unwrap());
        assert!(!dir.username_exists("bob").unwrap());
        assert!(dir.email_exists("alice@example.com").unwrap());
        assert!(!dir.email_exists("bob@example.com").unwrap());
    }

    #[test]
    fn debug_redacts_password_hash() {
        let rendered = format!("{:?}", record("alice", "alice@example.com"));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("$argon2id$stub"));
    }

    #[test]
    fn list_is_sorted_by_username() {
        let dir = InMemoryUserDirectory::new();
        dir.insert(record("carol", "carol@example.com")).unwrap();
        dir.insert(record("alice", "alice@example.com")).unwrap();

        let names: Vec<String> = dir.list().unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["alice", "carol"]);
    }
}
