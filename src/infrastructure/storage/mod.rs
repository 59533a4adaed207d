//! Multi-file session storage
//!
//! One directory per session: `creds.json` holds the credential object and
//! every other `*.json` file is an opaque key blob named by its file stem.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::application::errors::StorageError;
use crate::domain::entities::SessionCredentials;
use crate::domain::traits::SessionStore;

const CREDS_FILE: &str = "creds.json";

/// Directory-backed session store
pub struct FileSessionStore {
    base_path: PathBuf,
}

impl FileSessionStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Map a key name to a file name that is safe on every platform.
    /// The mapping is reversed by [`FileSessionStore::key_name`].
    pub fn file_name(key: &str) -> String {
        let escaped = key.replace('%', "%25").replace('/', "%2F").replace(':', "%3A");
        format!("{}.json", escaped)
    }

    /// Recover the key name from a file stem written by [`FileSessionStore::file_name`]
    pub fn key_name(stem: &str) -> String {
        stem.replace("%2F", "/").replace("%3A", ":").replace("%25", "%")
    }

    async fn read_json(path: &Path) -> Result<Value, StorageError> {
        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&content)
            .map_err(|e| StorageError::Serialization(format!("{}: {}", path.display(), e)))
    }

    /// Write through a temp file so a crash never leaves a torn file
    async fn write_json(&self, file_name: &str, value: &Value) -> Result<(), StorageError> {
        let content = serde_json::to_vec_pretty(value)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let target = self.base_path.join(file_name);
        let tmp = self.base_path.join(format!("{}.tmp", file_name));
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &target).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<SessionCredentials, StorageError> {
        let mut session = SessionCredentials::default();

        let mut entries = match tokio::fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(session),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };

            let value = Self::read_json(&path).await?;
            if path.file_name().and_then(|n| n.to_str()) == Some(CREDS_FILE) {
                match value {
                    Value::Object(creds) => session.creds = creds,
                    _ => {
                        return Err(StorageError::Serialization(format!(
                            "{} is not a JSON object",
                            path.display()
                        )))
                    }
                }
            } else {
                session.keys.insert(Self::key_name(&stem), value);
            }
        }

        tracing::debug!(
            "Loaded session from {} ({} key files)",
            self.base_path.display(),
            session.keys.len()
        );
        Ok(session)
    }

    async fn save(&self, session: &SessionCredentials) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.base_path).await?;

        self.write_json(CREDS_FILE, &Value::Object(session.creds.clone())).await?;
        for (key, value) in &session.keys {
            self.write_json(&Self::file_name(key), value).await?;
        }
        Ok(())
    }
}
