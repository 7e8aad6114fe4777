// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::document::DocumentRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error kinds scoped to a single document's processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessErrorKind {
    /// Failed to fetch the document (network error, non-2xx status, bad locator)
    Fetch,
    /// The fetched bytes are not a well-formed document
    Extraction,
    /// Failed to re-serialize or store the highlighted copy
    Highlight,
}

impl std::fmt::Display for ProcessErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessErrorKind::Fetch => write!(f, "fetch_error"),
            ProcessErrorKind::Extraction => write!(f, "extraction_error"),
            ProcessErrorKind::Highlight => write!(f, "highlight_error"),
        }
    }
}

/// A failure captured into one document's result.
/// Never raised to the batch caller; one document failing does not abort
/// or cancel the rest of the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessError {
    pub kind: ProcessErrorKind,
    pub message: String,
}

impl ProcessError {
    pub fn new(kind: ProcessErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ProcessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Occurrence count for one keyword in one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

/// Outcome of processing one document: the only value that survives past
/// the per-document pipeline into ranking and presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    pub document_id: String,
    /// Original locator as supplied by the caller
    pub locator: String,
    /// Per-keyword occurrence counts, in keyword order
    pub per_keyword_counts: Vec<KeywordCount>,
    pub total_occurrences: usize,
    /// Locator of the highlighted copy; set iff at least one keyword
    /// matched and highlighting succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlighted_output: Option<String>,
    /// md5 of the fetched bytes (absent when the fetch failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    pub processed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ProcessError>,
}

impl DocumentResult {
    /// Result for a document whose processing failed at some stage
    pub fn failed(
        document: &DocumentRef,
        kind: ProcessErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document.id.clone(),
            locator: document.locator.clone(),
            per_keyword_counts: Vec::new(),
            total_occurrences: 0,
            highlighted_output: None,
            content_hash: None,
            processed_at: Utc::now(),
            error: Some(ProcessError::new(kind, message)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
