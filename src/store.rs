//!
//! casevault credential store
//! --------------------------
//! Durable key-value persistence for principals under a single root folder.
//! Two documents exist, one file per key:
//! `session.current` holds the remembered session principal (JSON, no
//! secret) and `registered.principals` holds the ordered collection of
//! self-registered records `{id, email, name, credential_secret, role}`.
//! All writes are synchronous whole-document replacements; there are no
//! partial updates and no transactions, which is acceptable for the
//! single-user, single-tab scope this store serves.
//!
//! The store makes no authentication decisions. It answers lookups and
//! appends records; policy lives in the session manager.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::identity::{CredentialRecord, Principal, Role};

/// Secret shared by every bootstrap principal. Plaintext and well known,
/// kept for parity with the original product. Do not ship this.
pub const BOOTSTRAP_SECRET: &str = "password";

const CURRENT_SESSION_KEY: &str = "session.current";
const REGISTERED_KEY: &str = "registered.principals";

/// Principals pre-seeded into the store rather than created via
/// registration. These never appear in the registered collection on disk.
pub fn bootstrap_principals() -> Vec<CredentialRecord> {
    let seed = |id: &str, email: &str, name: &str, role: Role| CredentialRecord {
        id: id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        credential_secret: BOOTSTRAP_SECRET.to_string(),
        role,
    };
    vec![
        seed("1", "manager@example.com", "Admin Manager", Role::Manager),
        seed("2", "staff@example.com", "Staff Member", Role::Staff),
        seed("3", "user@example.com", "Regular User", Role::User),
    ]
}

/// Durable credential store rooted at a filesystem directory.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    root: PathBuf,
}

impl CredentialStore {
    /// Create a store rooted at the given path. The directory is created if
    /// it does not already exist.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .with_context(|| format!("creating store root {}", root.display()))?;
        Ok(Self { root })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Read the registered collection. An absent document reads as empty;
    /// an unparseable one is logged and also reads as empty.
    pub fn registered(&self) -> Vec<CredentialRecord> {
        let path = self.key_path(REGISTERED_KEY);
        if !path.exists() {
            return Vec::new();
        }
        match fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|raw| serde_json::from_str::<Vec<CredentialRecord>>(&raw).map_err(Into::into))
        {
            Ok(records) => records,
            Err(e) => {
                warn!("unreadable registered collection at {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    fn write_registered(&self, records: &[CredentialRecord]) -> Result<()> {
        let path = self.key_path(REGISTERED_KEY);
        let raw = serde_json::to_string_pretty(records)?;
        fs::write(&path, raw)
            .with_context(|| format!("writing registered collection {}", path.display()))?;
        Ok(())
    }

    /// Look up a principal record by exact (case-sensitive) email.
    /// Bootstrap principals are consulted first, then the registered
    /// collection. Uniqueness of emails guarantees at most one match.
    pub fn find_by_email(&self, email: &str) -> Option<CredentialRecord> {
        if let Some(found) = bootstrap_principals().into_iter().find(|r| r.email == email) {
            return Some(found);
        }
        self.registered().into_iter().find(|r| r.email == email)
    }

    /// Register a new principal. Fails with a conflict when the email
    /// collides with any bootstrap or registered record. On success the
    /// record is appended with a freshly minted id and a forced `manager`
    /// role, and the whole collection is rewritten.
    pub fn register(&self, name: &str, email: &str, secret: &str) -> AppResult<CredentialRecord> {
        if self.find_by_email(email).is_some() {
            return Err(AppError::conflict(
                "email_taken",
                "a principal with this email already exists",
            ));
        }
        let record = CredentialRecord {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: name.to_string(),
            credential_secret: secret.to_string(),
            // Every self-registered principal becomes a manager, matching
            // the original product. See Role docs.
            role: Role::Manager,
        };
        let mut records = self.registered();
        records.push(record.clone());
        self.write_registered(&records)
            .map_err(|e| AppError::Io { code: "storage_error".into(), message: e.to_string() })?;
        debug!("store.register email={} id={}", record.email, record.id);
        Ok(record)
    }

    /// Write or clear the remembered-session document. The principal is
    /// stored without any secret.
    pub fn persist_current_principal(&self, principal: Option<&Principal>) -> Result<()> {
        let path = self.key_path(CURRENT_SESSION_KEY);
        match principal {
            Some(p) => {
                let raw = serde_json::to_string_pretty(p)?;
                fs::write(&path, raw)
                    .with_context(|| format!("writing session document {}", path.display()))?;
                debug!("store.persist_session email={}", p.email);
            }
            None => {
                if path.exists() {
                    fs::remove_file(&path)
                        .with_context(|| format!("clearing session document {}", path.display()))?;
                }
                debug!("store.persist_session cleared");
            }
        }
        Ok(())
    }

    /// Read the remembered-session document. Absent or unparseable data
    /// yields `None`; a corrupt document is removed so the next restore is
    /// clean.
    pub fn restore_current_principal(&self) -> Option<Principal> {
        let path = self.key_path(CURRENT_SESSION_KEY);
        if !path.exists() {
            return None;
        }
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("unreadable session document at {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str::<Principal>(&raw) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!("corrupt session document at {}: {}", path.display(), e);
                let _ = fs::remove_file(&path);
                None
            }
        }
    }
}
