// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Destination for highlighted document copies.
///
/// The pipeline hands over bytes and gets back a locator the caller can
/// put in front of users; which storage backend sits behind it is the
/// caller's choice.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Store the highlighted copy of one document and return its locator
    async fn store(&self, document_id: &str, bytes: &[u8]) -> Result<String>;
}

/// Sink writing highlighted copies into a directory, one file per
/// document id
pub struct DirectorySink {
    root: PathBuf,
    extension: String,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }
}

#[async_trait]
impl OutputSink for DirectorySink {
    async fn store(&self, document_id: &str, bytes: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| anyhow!("failed to create output directory: {}", e))?;

        let path = self
            .root
            .join(format!("{}.{}", document_id, self.extension));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| anyhow!("failed to write {}: {}", path.display(), e))?;

        Ok(path.display().to_string())
    }
}

/// In-memory sink for tests and embedding callers
#[derive(Default)]
pub struct MemorySink {
    stored: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored for a document id, if any
    pub fn get(&self, document_id: &str) -> Option<Vec<u8>> {
        self.stored.lock().unwrap().get(document_id).cloned()
    }
}

#[async_trait]
impl OutputSink for MemorySink {
    async fn store(&self, document_id: &str, bytes: &[u8]) -> Result<String> {
        self.stored
            .lock()
            .unwrap()
            .insert(document_id.to_string(), bytes.to_vec());
        Ok(format!("mem://{}", document_id))
    }
}
