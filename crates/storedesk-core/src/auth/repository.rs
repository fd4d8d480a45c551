//! Credential storage for session facts.
//!
//! Entries are plain strings keyed by [`CredentialKey`]. Each entry carries
//! the instant it expires; an expired entry reads as absent but is not swept.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Persisted credential entries. The serialized names match the cookie names
/// the console frontend reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CredentialKey {
    #[serde(rename = "token")]
    Token,
    #[serde(rename = "token_expiry")]
    TokenExpiry,
    #[serde(rename = "userRole")]
    UserRole,
    #[serde(rename = "userData")]
    UserData,
    #[serde(rename = "storeId")]
    StoreId,
    #[serde(rename = "storeData")]
    StoreData,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 6] = [
        CredentialKey::Token,
        CredentialKey::TokenExpiry,
        CredentialKey::UserRole,
        CredentialKey::UserData,
        CredentialKey::StoreId,
        CredentialKey::StoreData,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CredentialKey::Token => "token",
            CredentialKey::TokenExpiry => "token_expiry",
            CredentialKey::UserRole => "userRole",
            CredentialKey::UserData => "userData",
            CredentialKey::StoreId => "storeId",
            CredentialKey::StoreData => "storeData",
        }
    }
}

/// One change in a batch passed to [`SessionRepository::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum EntryWrite {
    Set {
        key: CredentialKey,
        value: String,
        expires_at: DateTime<Utc>,
    },
    Remove(CredentialKey),
}

impl EntryWrite {
    pub fn set(key: CredentialKey, value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        EntryWrite::Set {
            key,
            value: value.into(),
            expires_at,
        }
    }
}

/// Storage for session and store-context entries.
///
/// A batch passed to `apply` is visible to readers either entirely or not at
/// all.
pub trait SessionRepository: Send + Sync {
    /// Read a live entry. Entries past their expiry are absent.
    fn get(&self, key: CredentialKey) -> Option<String>;

    /// Apply a batch of writes atomically.
    fn apply(&self, writes: Vec<EntryWrite>) -> Result<()>;

    fn set(&self, key: CredentialKey, value: String, expires_at: DateTime<Utc>) -> Result<()> {
        self.apply(vec![EntryWrite::Set {
            key,
            value,
            expires_at,
        }])
    }

    fn remove(&self, key: CredentialKey) -> Result<()> {
        self.apply(vec![EntryWrite::Remove(key)])
    }

    /// Delete every credential entry
    fn clear(&self) -> Result<()> {
        self.apply(CredentialKey::ALL.iter().copied().map(EntryWrite::Remove).collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EntryMap(BTreeMap<CredentialKey, StoredEntry>);

impl EntryMap {
    fn live(&self, key: CredentialKey, now: DateTime<Utc>) -> Option<String> {
        self.0
            .get(&key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone())
    }

    fn apply(&mut self, writes: Vec<EntryWrite>) {
        for write in writes {
            match write {
                EntryWrite::Set {
                    key,
                    value,
                    expires_at,
                } => {
                    self.0.insert(key, StoredEntry { value, expires_at });
                }
                EntryWrite::Remove(key) => {
                    self.0.remove(&key);
                }
            }
        }
    }
}

/// In-process repository, used by tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemorySessionRepository {
    entries: RwLock<EntryMap>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionRepository for MemorySessionRepository {
    fn get(&self, key: CredentialKey) -> Option<String> {
        self.entries.read().live(key, Utc::now())
    }

    fn apply(&self, writes: Vec<EntryWrite>) -> Result<()> {
        self.entries.write().apply(writes);
        Ok(())
    }
}

/// Repository persisted as JSON in the cache directory.
pub struct FileSessionRepository {
    path: PathBuf,
    entries: RwLock<EntryMap>,
}

impl FileSessionRepository {
    /// Open the session file in `cache_dir`, loading existing entries.
    pub fn open(cache_dir: &Path) -> Result<Self> {
        let path = cache_dir.join(SESSION_FILE);
        let entries = if path.exists() {
            let contents =
                std::fs::read_to_string(&path).context("Failed to read session file")?;
            serde_json::from_str(&contents).context("Failed to parse session file")?
        } else {
            EntryMap::default()
        };
        debug!(path = %path.display(), entries = entries.0.len(), "Session file opened");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, entries: &EntryMap) -> Result<()> {
        if entries.0.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("Failed to remove session file")?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents).context("Failed to write session file")?;
        Ok(())
    }
}

impl SessionRepository for FileSessionRepository {
    fn get(&self, key: CredentialKey) -> Option<String> {
        self.entries.read().live(key, Utc::now())
    }

    fn apply(&self, writes: Vec<EntryWrite>) -> Result<()> {
        let mut entries = self.entries.write();
        let mut updated = entries.clone();
        updated.apply(writes);
        // Disk first so memory never runs ahead of what a restart would see
        self.save(&updated)?;
        *entries = updated;
        Ok(())
    }
}

/// Repository over the cookies of a single HTTP request.
///
/// Reads come from the request's `Cookie` header; writes accumulate as
/// `Set-Cookie` deltas on the jar returned by [`into_jar`](Self::into_jar).
/// Browsers enforce cookie expiry, so every cookie present is treated as live.
pub struct CookieSessionRepository {
    jar: Mutex<CookieJar>,
}

impl CookieSessionRepository {
    pub fn new(jar: CookieJar) -> Self {
        Self {
            jar: Mutex::new(jar),
        }
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar.into_inner()
    }
}

impl SessionRepository for CookieSessionRepository {
    fn get(&self, key: CredentialKey) -> Option<String> {
        let jar = self.jar.lock();
        let cookie = jar.get(key.name())?;
        match urlencoding::decode(cookie.value()) {
            Ok(value) => Some(value.into_owned()),
            Err(_) => Some(cookie.value().to_string()),
        }
    }

    fn apply(&self, writes: Vec<EntryWrite>) -> Result<()> {
        let mut jar = self.jar.lock();
        for write in writes {
            let current = std::mem::take(&mut *jar);
            *jar = match write {
                EntryWrite::Set {
                    key,
                    value,
                    expires_at,
                } => {
                    let expires = time::OffsetDateTime::from_unix_timestamp(expires_at.timestamp())
                        .context("Cookie expiry out of range")?;
                    let cookie = Cookie::build((key.name(), urlencoding::encode(&value).into_owned()))
                        .path("/")
                        .secure(true)
                        .same_site(SameSite::Strict)
                        .expires(expires);
                    current.add(cookie)
                }
                EntryWrite::Remove(key) => current.remove(Cookie::build(key.name()).path("/")),
            };
        }
        Ok(())
    }
}
