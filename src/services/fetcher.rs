// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::document::{DocumentRef, LocatorKind, RawDocument};
use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// Byte-retrieval capability for document locators.
/// Network failure stays scoped to the one document being fetched.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the raw bytes behind an already-resolved locator
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>>;
}

/// HTTP fetcher with GET semantics: redirects are followed, a non-2xx
/// status is an error
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        url::Url::parse(locator).map_err(|e| anyhow!("invalid locator {}: {}", locator, e))?;

        let response = self.client.get(locator).send().await?;
        let response = response.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Resolve a document's locator to a directly fetchable URL.
/// Share links go through the pure rewrite below; direct locators pass
/// through untouched.
pub fn resolve_locator(document: &DocumentRef) -> Result<String> {
    match document.locator_kind {
        LocatorKind::Direct => Ok(document.locator.clone()),
        LocatorKind::ShareLink => direct_download_url(&document.locator),
    }
}

/// Rewrite a drive share link into the direct-download endpoint.
///
/// A share link ends with an action segment ("view?usp=sharing"), preceded
/// by the file id: `https://drive.google.com/file/d/<id>/view?usp=sharing`
/// becomes `https://drive.google.com/uc?export=download&id=<id>`.
pub fn direct_download_url(share_link: &str) -> Result<String> {
    let without_action = share_link
        .rsplit_once('/')
        .map(|(head, _)| head)
        .ok_or_else(|| anyhow!("share link has no path segments: {}", share_link))?;
    let id = without_action
        .rsplit_once('/')
        .map(|(_, tail)| tail)
        .ok_or_else(|| anyhow!("share link has no file id: {}", share_link))?;
    if id.is_empty() {
        return Err(anyhow!("share link has an empty file id: {}", share_link));
    }
    Ok(format!(
        "https://drive.google.com/uc?export=download&id={}",
        id
    ))
}

/// Fetch one document: resolve the locator, download, hash the bytes
pub async fn fetch_document(fetcher: &dyn Fetcher, document: &DocumentRef) -> Result<RawDocument> {
    let url = resolve_locator(document)?;
    let bytes = fetcher.fetch(&url).await?;
    Ok(RawDocument::new(bytes))
}
