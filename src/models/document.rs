// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};

/// How a document locator must be handled before fetching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocatorKind {
    /// The locator can be fetched as-is
    Direct,
    /// The locator is a provider share link and must be rewritten to a
    /// direct-download URL before fetching
    ShareLink,
}

/// A remote document identified by a display name and a retrieval locator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Display name, also used to address the highlighted output
    pub id: String,
    /// URL (or provider share link) the document is fetched from
    pub locator: String,
    /// How the locator is resolved before fetching
    pub locator_kind: LocatorKind,
}

impl DocumentRef {
    /// Reference a document behind a directly fetchable locator
    pub fn direct(id: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            locator: locator.into(),
            locator_kind: LocatorKind::Direct,
        }
    }

    /// Reference a document behind a provider share link
    pub fn share_link(id: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            locator: locator.into(),
            locator_kind: LocatorKind::ShareLink,
        }
    }
}

/// Raw bytes fetched for one document.
/// Lives only inside a single processor run; nothing is cached across runs.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    /// md5 of the fetched bytes, surfaced in the result for observability
    pub content_hash: String,
}

impl RawDocument {
    pub fn new(bytes: Vec<u8>) -> Self {
        let content_hash = format!("{:x}", md5::compute(&bytes));
        Self {
            bytes,
            content_hash,
        }
    }
}

/// Plain text of one physical page, 0-based, in physical page order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub index: u32,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_document_hashes_content() {
        let doc = RawDocument::new(b"hello".to_vec());
        assert_eq!(doc.content_hash, "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn test_identical_bytes_hash_identically() {
        let a = RawDocument::new(b"same content".to_vec());
        let b = RawDocument::new(b"same content".to_vec());
        assert_eq!(a.content_hash, b.content_hash);
    }

    #[test]
    fn test_document_ref_constructors() {
        let direct = DocumentRef::direct("NWL90", "https://example.com/n90.pdf");
        assert_eq!(direct.locator_kind, LocatorKind::Direct);

        let shared = DocumentRef::share_link("NWL89", "https://drive.example.com/d/abc/view");
        assert_eq!(shared.locator_kind, LocatorKind::ShareLink);
        assert_eq!(shared.id, "NWL89");
    }
}
