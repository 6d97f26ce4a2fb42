//! Security gate collaborator.
//!
//! The pipeline itself never calls this module: it sits OUTSIDE the core
//! data path. A surrounding application may gate pipeline invocation
//! behind [`SecurityGate::validate_access`] / RBAC and record decisions
//! through [`SecurityGate::audit_log`].
//!
//! # Encryption Fail-Open Policy
//!
//! `encrypt_data` / `decrypt_data` delegate to a pluggable
//! [`EncryptionBackend`]. When no backend is configured, data passes
//! through UNMODIFIED. This is deliberate and loud, not hidden: every
//! pass-through call emits a WARN diagnostic, and callers that must fail
//! closed check [`LocalSecurityGate::encryption_enabled`] before handing
//! data over. Do not ship a production deployment with the pass-through
//! behavior.

use async_trait::async_trait;
use rand::RngCore;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::Hasher;
use std::sync::RwLock;
use tracing::{info, warn};

// ============================================================================
// Traits
// ============================================================================

/// Opaque string-to-string encryption transform.
pub trait EncryptionBackend: Send + Sync {
    /// Backend name for diagnostics.
    fn name(&self) -> &str;

    /// Encrypt a payload.
    fn encrypt(&self, data: &str) -> String;

    /// Decrypt a payload.
    fn decrypt(&self, data: &str) -> String;
}

/// Access-control, auditing, and key-management collaborator.
#[async_trait]
pub trait SecurityGate: Send + Sync {
    /// Rotate the in-memory key material.
    async fn rotate_keys(&self);

    /// Whether `user` may touch `resource` at all.
    async fn validate_access(&self, user: &str, resource: &str) -> bool;

    /// Whether `user` may touch `resource` in the capacity of `role`.
    async fn role_based_access_control(&self, user: &str, resource: &str, role: &str) -> bool;

    /// Record a security-relevant event.
    fn audit_log(&self, message: &str);

    /// Encrypt a payload (see the module-level fail-open policy).
    fn encrypt_data(&self, data: &str) -> String;

    /// Decrypt a payload (see the module-level fail-open policy).
    fn decrypt_data(&self, data: &str) -> String;
}

// ============================================================================
// Local Implementation
// ============================================================================

/// In-process security gate with an in-memory key and role table.
pub struct LocalSecurityGate {
    key: RwLock<[u8; 32]>,
    roles: RwLock<HashMap<String, HashSet<String>>>,
    backend: Option<Box<dyn EncryptionBackend>>,
    permissive: bool,
}

impl LocalSecurityGate {
    /// A gate that allows every access check (still audited). Useful for
    /// development and demos; pair with a real role table in production.
    pub fn permissive() -> Self {
        Self {
            key: RwLock::new(fresh_key()),
            roles: RwLock::new(HashMap::new()),
            backend: None,
            permissive: true,
        }
    }

    /// A gate that only allows users present in the role table.
    pub fn with_roles(roles: HashMap<String, HashSet<String>>) -> Self {
        Self {
            key: RwLock::new(fresh_key()),
            roles: RwLock::new(roles),
            backend: None,
            permissive: false,
        }
    }

    /// Install an encryption backend, disabling the pass-through.
    pub fn with_backend(mut self, backend: Box<dyn EncryptionBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Grant `role` to `user`.
    pub fn grant_role(&self, user: impl Into<String>, role: impl Into<String>) {
        let mut roles = self.roles.write().expect("role table lock poisoned");
        roles.entry(user.into()).or_default().insert(role.into());
    }

    /// Whether a real encryption backend is configured. Callers that must
    /// fail closed check this before handing data to `encrypt_data`.
    pub fn encryption_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Stable fingerprint of the current key material, for audit trails.
    pub fn key_fingerprint(&self) -> u64 {
        let key = self.key.read().expect("key lock poisoned");
        let mut hasher = DefaultHasher::new();
        hasher.write(&*key);
        hasher.finish()
    }
}

#[async_trait]
impl SecurityGate for LocalSecurityGate {
    async fn rotate_keys(&self) {
        {
            let mut key = self.key.write().expect("key lock poisoned");
            *key = fresh_key();
        }
        self.audit_log("keys rotated");
        info!(fingerprint = self.key_fingerprint(), "security keys rotated");
    }

    async fn validate_access(&self, user: &str, resource: &str) -> bool {
        let allowed = self.permissive || {
            let roles = self.roles.read().expect("role table lock poisoned");
            roles.contains_key(user)
        };
        self.audit_log(&format!(
            "access {} for {user} on {resource}",
            if allowed { "granted" } else { "denied" }
        ));
        allowed
    }

    async fn role_based_access_control(&self, user: &str, resource: &str, role: &str) -> bool {
        let allowed = self.permissive || {
            let roles = self.roles.read().expect("role table lock poisoned");
            roles
                .get(user)
                .map(|granted| granted.contains(role))
                .unwrap_or(false)
        };
        self.audit_log(&format!(
            "role '{role}' {} for {user} on {resource}",
            if allowed { "granted" } else { "denied" }
        ));
        allowed
    }

    fn audit_log(&self, message: &str) {
        info!(target: "vecflow::audit", "{message}");
    }

    fn encrypt_data(&self, data: &str) -> String {
        match &self.backend {
            Some(backend) => backend.encrypt(data),
            None => {
                warn!("no encryption backend configured; data passes through UNMODIFIED");
                data.to_string()
            }
        }
    }

    fn decrypt_data(&self, data: &str) -> String {
        match &self.backend {
            Some(backend) => backend.decrypt(data),
            None => {
                warn!("no encryption backend configured; data passes through UNMODIFIED");
                data.to_string()
            }
        }
    }
}

fn fresh_key() -> [u8; 32] {
    let mut key = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut key);
    key
}
