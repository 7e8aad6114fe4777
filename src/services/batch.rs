// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Batch fan-out/fan-in over a bounded worker pool.
//!
//! Each document runs through one `DocumentProcessor` to completion; the
//! pool caps how many run at once so a large batch cannot exhaust outbound
//! connections. The run joins every task before returning, and a failing
//! document never cancels its siblings. Dropping the returned future
//! cancels whatever is still in flight.

use crate::models::document::DocumentRef;
use crate::models::keyword::KeywordSpec;
use crate::models::result::DocumentResult;
use crate::services::engine::DocumentEngine;
use crate::services::fetcher::Fetcher;
use crate::services::processor::DocumentProcessor;
use crate::services::sink::OutputSink;
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Default number of documents processed at once
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Worker-pool settings for a batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Upper bound on concurrently processed documents
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Owns the capability handles and fans document batches out over the pool
pub struct BatchOrchestrator {
    fetcher: Arc<dyn Fetcher>,
    engine: Arc<dyn DocumentEngine>,
    sink: Arc<dyn OutputSink>,
    config: BatchConfig,
}

impl BatchOrchestrator {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        engine: Arc<dyn DocumentEngine>,
        sink: Arc<dyn OutputSink>,
        config: BatchConfig,
    ) -> Self {
        Self {
            fetcher,
            engine,
            sink,
            config,
        }
    }

    /// Process every document and return exactly one result per input, in
    /// input order. Keywords and tolerance are shared read-only across
    /// workers; tasks complete in any order and are re-ordered afterwards.
    pub async fn run_batch(
        &self,
        documents: &[DocumentRef],
        keywords: Vec<KeywordSpec>,
        max_distance: usize,
    ) -> Vec<DocumentResult> {
        let processor = Arc::new(DocumentProcessor::new(
            self.fetcher.clone(),
            self.engine.clone(),
            self.sink.clone(),
            keywords,
            max_distance,
        ));
        let concurrency = self.config.concurrency.max(1);

        println!(
            "running batch of {} document(s), concurrency {}",
            documents.len(),
            concurrency
        );

        let mut indexed: Vec<(usize, DocumentResult)> =
            stream::iter(documents.iter().cloned().enumerate())
                .map(|(index, document)| {
                    let processor = processor.clone();
                    async move { (index, processor.process(&document).await) }
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;

        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, result)| result).collect()
    }
}
