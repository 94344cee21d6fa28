//! Session Store - one per role
//!
//! Holds the role's opaque credential token. The in-memory copy is loaded
//! once from durable storage when the store is opened and mirrored back on
//! every change. Token validity is enforced only by the backend.

mod storage;

pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};

use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::role::Role;

/// Token attached to a request on behalf of a role
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub role: Role,
    pub token: String,
}

impl Credential {
    pub fn new(role: Role, token: impl Into<String>) -> Self {
        Self {
            role,
            token: token.into(),
        }
    }
}

// Tokens never reach logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("role", &self.role)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Role-scoped session
pub struct SessionStore {
    role: Role,
    token: RwLock<String>,
    storage: Arc<dyn TokenStorage>,
}

impl SessionStore {
    /// Open the session for `role`, reading its token from durable storage
    pub fn open(role: Role, storage: Arc<dyn TokenStorage>) -> Self {
        let token = storage.load(role.storage_key()).unwrap_or_default();
        Self {
            role,
            token: RwLock::new(token),
            storage,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Current token, `None` when unauthenticated
    pub fn token(&self) -> Option<String> {
        let token = self.token.read().unwrap_or_else(|e| e.into_inner());
        if token.is_empty() {
            None
        } else {
            Some(token.clone())
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn credential(&self) -> Option<Credential> {
        self.token().map(|token| Credential::new(self.role, token))
    }

    /// Replace the token and write it through to durable storage.
    ///
    /// An empty token is equivalent to [`SessionStore::clear_token`].
    pub fn set_token(&self, token: &str) {
        let token = token.trim();
        if token.is_empty() {
            self.clear_token();
            return;
        }
        {
            let mut current = self.token.write().unwrap_or_else(|e| e.into_inner());
            *current = token.to_string();
        }
        if let Err(e) = self.storage.store(self.role.storage_key(), token) {
            warn!(role = %self.role, "Failed to persist session token: {}", e);
        }
        info!(role = %self.role, "Session token set");
    }

    /// Drop the token from memory and from durable storage
    pub fn clear_token(&self) {
        {
            let mut current = self.token.write().unwrap_or_else(|e| e.into_inner());
            current.clear();
        }
        if let Err(e) = self.storage.remove(self.role.storage_key()) {
            warn!(role = %self.role, "Failed to remove persisted session token: {}", e);
        }
        info!(role = %self.role, "Session token cleared");
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("role", &self.role)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

/// One session per role over a shared storage
#[derive(Clone)]
pub struct Sessions {
    pub admin: Arc<SessionStore>,
    pub doctor: Arc<SessionStore>,
}

impl Sessions {
    pub fn open(storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            admin: Arc::new(SessionStore::open(Role::Admin, storage.clone())),
            doctor: Arc::new(SessionStore::open(Role::Doctor, storage)),
        }
    }

    pub fn get(&self, role: Role) -> &Arc<SessionStore> {
        match role {
            Role::Admin => &self.admin,
            Role::Doctor => &self.doctor,
        }
    }

    /// Clear every role that currently holds a token; returns the roles cleared
    pub fn logout_all(&self) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| {
                let session = self.get(*role);
                let had_token = session.is_authenticated();
                if had_token {
                    session.clear_token();
                }
                had_token
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_with_persisted_token() {
        let storage = Arc::new(MemoryTokenStorage::with_entry("dToken", "doc-1"));
        let session = SessionStore::open(Role::Doctor, storage);
        assert_eq!(session.token().as_deref(), Some("doc-1"));

        let admin = SessionStore::open(Role::Admin, Arc::new(MemoryTokenStorage::new()));
        assert!(!admin.is_authenticated());
    }

    #[test]
    fn set_and_clear_write_through() {
        let storage = Arc::new(MemoryTokenStorage::new());
        let session = SessionStore::open(Role::Admin, storage.clone());

        session.set_token("admin-9");
        assert_eq!(storage.load("aToken").as_deref(), Some("admin-9"));

        session.clear_token();
        assert_eq!(session.token(), None);
        assert_eq!(storage.load("aToken"), None);
    }

    #[test]
    fn blank_token_clears_session() {
        let storage = Arc::new(MemoryTokenStorage::with_entry("dToken", "doc-1"));
        let session = SessionStore::open(Role::Doctor, storage.clone());
        session.set_token("   ");
        assert!(!session.is_authenticated());
        assert_eq!(storage.load("dToken"), None);
    }

    #[test]
    fn survives_reopen_from_file_storage() {
        let dir = tempfile::tempdir().expect("create temp dir");
        {
            let storage: Arc<dyn TokenStorage> = Arc::new(FileTokenStorage::new(dir.path()));
            SessionStore::open(Role::Doctor, storage).set_token("persisted");
        }
        let storage: Arc<dyn TokenStorage> = Arc::new(FileTokenStorage::new(dir.path()));
        let reopened = SessionStore::open(Role::Doctor, storage);
        assert_eq!(reopened.token().as_deref(), Some("persisted"));
    }

    #[test]
    fn roles_are_independent() {
        let sessions = Sessions::open(Arc::new(MemoryTokenStorage::new()));
        sessions.admin.set_token("a");
        assert!(!sessions.doctor.is_authenticated());

        sessions.doctor.set_token("d");
        sessions.admin.clear_token();
        assert!(sessions.doctor.is_authenticated());
    }

    #[test]
    fn logout_all_clears_only_active_roles() {
        let sessions = Sessions::open(Arc::new(MemoryTokenStorage::new()));
        sessions.doctor.set_token("d");
        assert_eq!(sessions.logout_all(), vec![Role::Doctor]);
        assert!(!sessions.doctor.is_authenticated());
        assert!(sessions.logout_all().is_empty());
    }

    #[test]
    fn credential_debug_redacts_token() {
        let credential = Credential::new(Role::Admin, "secret-token");
        let printed = format!("{:?}", credential);
        assert!(!printed.contains("secret-token"));
    }
}
