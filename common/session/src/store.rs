use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use common_auth::Role;
use tracing::{debug, warn};

use crate::error::{SessionError, SessionResult};

/// Named persisted credential. Key names are shared with already-deployed
/// clients and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialSlot {
    Role(Role),
    Legacy,
}

pub const ALL_SLOTS: &[CredentialSlot] = &[
    CredentialSlot::Role(Role::Seller),
    CredentialSlot::Role(Role::Admin),
    CredentialSlot::Role(Role::Delivery),
    CredentialSlot::Role(Role::Customer),
    CredentialSlot::Legacy,
];

impl CredentialSlot {
    pub fn key(&self) -> &'static str {
        match self {
            CredentialSlot::Role(Role::Seller) => "auth_seller",
            CredentialSlot::Role(Role::Admin) => "auth_admin",
            CredentialSlot::Role(Role::Delivery) => "auth_delivery",
            CredentialSlot::Role(Role::Customer) => "auth_customer",
            CredentialSlot::Legacy => "token",
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            CredentialSlot::Role(role) => Some(*role),
            CredentialSlot::Legacy => None,
        }
    }
}

impl fmt::Display for CredentialSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Key-value service holding one token per slot.
///
/// Implementations use interior mutability so a single store can be shared
/// between the request path and the navigation guards.
pub trait CredentialStore: Send + Sync {
    fn get(&self, slot: CredentialSlot) -> Option<String>;

    fn set(&self, slot: CredentialSlot, token: &str) -> SessionResult<()>;

    fn delete(&self, slot: CredentialSlot) -> SessionResult<()>;

    /// Token for `slot` when it is present and non-empty.
    fn present(&self, slot: CredentialSlot) -> Option<String> {
        self.get(slot).filter(|token| !token.is_empty())
    }

    fn snapshot(&self) -> Vec<(CredentialSlot, String)> {
        ALL_SLOTS
            .iter()
            .filter_map(|slot| self.present(*slot).map(|token| (*slot, token)))
            .collect()
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    inner: Arc<RwLock<HashMap<CredentialSlot, String>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (CredentialSlot, String)>,
    {
        let store = Self::new();
        {
            let mut guard = store.inner.write().expect("rwlock poisoned");
            guard.extend(entries);
        }
        store
    }

}

impl CredentialStore for InMemoryCredentialStore {
    fn get(&self, slot: CredentialSlot) -> Option<String> {
        let guard = self.inner.read().expect("rwlock poisoned");
        guard.get(&slot).cloned()
    }

    fn set(&self, slot: CredentialSlot, token: &str) -> SessionResult<()> {
        let mut guard = self.inner.write().expect("rwlock poisoned");
        guard.insert(slot, token.to_string());
        Ok(())
    }

    fn delete(&self, slot: CredentialSlot) -> SessionResult<()> {
        let mut guard = self.inner.write().expect("rwlock poisoned");
        guard.remove(&slot);
        Ok(())
    }
}

/// Credentials persisted as a flat JSON object keyed by slot name.
///
/// The file is re-read on every lookup so that another process sharing it
/// (a second CLI invocation, say) is observed without restarting. Keys this
/// crate does not know about are preserved on write.
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> SessionResult<BTreeMap<String, String>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(SessionError::StoreRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&bytes).map_err(|err| SessionError::StoreFormat {
            path: self.path.clone(),
            message: err.to_string(),
        })
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> SessionResult<()> {
        let write_err = |source| SessionError::StoreWrite {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let body = serde_json::to_vec_pretty(entries).map_err(|err| SessionError::StoreFormat {
            path: self.path.clone(),
            message: err.to_string(),
        })?;
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, body).map_err(write_err)?;
        fs::rename(&staging, &self.path).map_err(write_err)?;
        Ok(())
    }

    fn update<F>(&self, mutate: F) -> SessionResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.write_lock.lock().expect("mutex poisoned");
        let mut entries = self.load()?;
        mutate(&mut entries);
        self.persist(&entries)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, slot: CredentialSlot) -> Option<String> {
        match self.load() {
            Ok(mut entries) => entries.remove(slot.key()),
            Err(err) => {
                warn!(
                    error = %err,
                    slot = slot.key(),
                    "credential store unreadable; treating slot as empty"
                );
                None
            }
        }
    }

    fn set(&self, slot: CredentialSlot, token: &str) -> SessionResult<()> {
        self.update(|entries| {
            entries.insert(slot.key().to_string(), token.to_string());
        })?;
        debug!(slot = slot.key(), path = %self.path.display(), "stored credential");
        Ok(())
    }

    fn delete(&self, slot: CredentialSlot) -> SessionResult<()> {
        self.update(|entries| {
            entries.remove(slot.key());
        })?;
        debug!(slot = slot.key(), path = %self.path.display(), "removed credential");
        Ok(())
    }
}
