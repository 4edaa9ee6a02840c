//! Sources of provisioning secrets.
//!
//! Cluster provisioning leaves each lab's admin password and kubeconfig in
//! a secret store. Values are handed out as [`Zeroizing`] strings so they
//! are wiped once the caller is done with them.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;
use zeroize::{Zeroize, Zeroizing};

/// Secret lookup errors
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret {namespace}/{name} has no key {key:?}")]
    NotFound {
        namespace: String,
        name: String,
        key: String,
    },

    #[error("invalid secret path component {0:?}")]
    InvalidName(String),

    #[error("secret {namespace}/{name} key {key:?} is not valid UTF-8")]
    InvalidEncoding {
        namespace: String,
        name: String,
        key: String,
    },

    #[error("cannot read secret file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for secret lookups
pub type SecretResult<T> = Result<T, SecretError>;

/// A store of named secrets, each holding string values under keys.
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Read the value stored under `key` in secret `namespace/name`.
    async fn read(&self, namespace: &str, name: &str, key: &str) -> SecretResult<Zeroizing<String>>;
}

fn not_found(namespace: &str, name: &str, key: &str) -> SecretError {
    SecretError::NotFound {
        namespace: namespace.to_string(),
        name: name.to_string(),
        key: key.to_string(),
    }
}

/// Secrets mounted as files, `<root>/<namespace>/<name>/<key>`.
///
/// This is the layout Kubernetes uses when a secret is projected into a
/// volume.
#[derive(Debug, Clone)]
pub struct MountedSecrets {
    root: PathBuf,
}

impl MountedSecrets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, namespace: &str, name: &str, key: &str) -> SecretResult<PathBuf> {
        let mut path = self.root.clone();
        for component in [namespace, name, key] {
            if component.is_empty()
                || component == "."
                || component == ".."
                || component.contains(|c| matches!(c, '/' | '\\' | '\0'))
            {
                return Err(SecretError::InvalidName(component.to_string()));
            }
            path.push(component);
        }
        Ok(path)
    }
}

#[async_trait]
impl SecretSource for MountedSecrets {
    async fn read(&self, namespace: &str, name: &str, key: &str) -> SecretResult<Zeroizing<String>> {
        let path = self.path(namespace, name, key)?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(not_found(namespace, name, key));
            }
            Err(source) => return Err(SecretError::Io { path, source }),
        };

        String::from_utf8(bytes).map(Zeroizing::new).map_err(|e| {
            e.into_bytes().zeroize();
            SecretError::InvalidEncoding {
                namespace: namespace.to_string(),
                name: name.to_string(),
                key: key.to_string(),
            }
        })
    }
}

type SecretKey = (String, String, String);

/// In-memory secrets, for local runs and tests.
#[derive(Default)]
pub struct StaticSecrets {
    values: RwLock<HashMap<SecretKey, Zeroizing<String>>>,
}

impl StaticSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any previous one.
    pub async fn insert(&self, namespace: &str, name: &str, key: &str, value: impl Into<String>) {
        self.values.write().await.insert(
            (namespace.to_string(), name.to_string(), key.to_string()),
            Zeroizing::new(value.into()),
        );
    }
}

impl std::fmt::Debug for StaticSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSecrets").finish_non_exhaustive()
    }
}

#[async_trait]
impl SecretSource for StaticSecrets {
    async fn read(&self, namespace: &str, name: &str, key: &str) -> SecretResult<Zeroizing<String>> {
        self.values
            .read()
            .await
            .get(&(namespace.to_string(), name.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| not_found(namespace, name, key))
    }
}
