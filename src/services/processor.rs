// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Per-document pipeline: fetch, extract, match, highlight, store.
//!
//! One processor run is the unit of concurrency in a batch. It owns no
//! shared mutable state, and every failure is captured into the returned
//! `DocumentResult` instead of being propagated, so a bad document never
//! takes down its siblings.

use crate::models::document::{DocumentRef, PageText, RawDocument};
use crate::models::keyword::KeywordSpec;
use crate::models::matches::{MatchSpan, PageMatches, PageRegion};
use crate::models::result::{DocumentResult, KeywordCount, ProcessErrorKind};
use crate::services::engine::DocumentEngine;
use crate::services::fetcher::{fetch_document, Fetcher};
use crate::services::matcher::find_approx;
use crate::services::normalize::normalize;
use crate::services::sink::OutputSink;
use chrono::Utc;
use std::sync::Arc;

pub struct DocumentProcessor {
    fetcher: Arc<dyn Fetcher>,
    engine: Arc<dyn DocumentEngine>,
    sink: Arc<dyn OutputSink>,
    keywords: Arc<[KeywordSpec]>,
    max_distance: usize,
}

impl DocumentProcessor {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        engine: Arc<dyn DocumentEngine>,
        sink: Arc<dyn OutputSink>,
        keywords: Vec<KeywordSpec>,
        max_distance: usize,
    ) -> Self {
        Self {
            fetcher,
            engine,
            sink,
            keywords: keywords.into(),
            max_distance,
        }
    }

    /// Run the full pipeline for one document.
    /// Always returns a result; failures are carried inside it.
    pub async fn process(&self, document: &DocumentRef) -> DocumentResult {
        match self.try_process(document).await {
            Ok(result) => {
                println!(
                    "processed document {}: {} occurrence(s)",
                    document.id, result.total_occurrences
                );
                result
            }
            Err((kind, message)) => {
                eprintln!("failed to process document {}: {}", document.id, message);
                DocumentResult::failed(document, kind, message)
            }
        }
    }

    async fn try_process(
        &self,
        document: &DocumentRef,
    ) -> Result<DocumentResult, (ProcessErrorKind, String)> {
        // Stage 1: fetch
        let raw = fetch_document(self.fetcher.as_ref(), document)
            .await
            .map_err(|e| {
                (
                    ProcessErrorKind::Fetch,
                    format!("failed to fetch {}: {}", document.locator, e),
                )
            })?;

        // Stage 2: extract per-page text
        let pages = self.engine.extract_pages(&raw.bytes).map_err(|e| {
            (
                ProcessErrorKind::Extraction,
                format!("failed to extract text from {}: {}", document.id, e),
            )
        })?;

        // Stage 3: the single matching pass, per page, in normalized
        // coordinates
        let matches = self.match_pages(&pages);

        // Stage 4/5: highlight and store only when something matched;
        // zero matches is success, not an error
        let highlighted_output = if matches.is_empty() {
            None
        } else {
            let locator = self
                .highlight_and_store(document, &raw, &pages, &matches)
                .await
                .map_err(|e| {
                    (
                        ProcessErrorKind::Highlight,
                        format!("failed to highlight {}: {}", document.id, e),
                    )
                })?;
            Some(locator)
        };

        Ok(self.build_result(document, &raw, &matches, highlighted_output))
    }

    /// Page by page, keyword by keyword; page text is normalized once and
    /// every keyword runs against it
    fn match_pages(&self, pages: &[PageText]) -> PageMatches {
        let mut matches = PageMatches::default();
        for page in pages {
            let normalized = normalize(&page.text);
            for keyword in self.keywords.iter() {
                for span in find_approx(&keyword.normalized, &normalized, self.max_distance) {
                    matches.push(page.index, &keyword.original, span);
                }
            }
        }
        matches
    }

    /// Recover a literal excerpt for every span, locate its visual regions
    /// through the engine's page search, annotate, and hand the copy to
    /// the sink. A span with no visual match is logged and skipped.
    async fn highlight_and_store(
        &self,
        document: &DocumentRef,
        raw: &RawDocument,
        pages: &[PageText],
        matches: &PageMatches,
    ) -> anyhow::Result<String> {
        let mut regions: Vec<PageRegion> = Vec::new();
        for (page_index, page_matches) in matches.pages() {
            let Some(page) = pages.iter().find(|p| p.index == page_index) else {
                continue;
            };
            for page_match in page_matches {
                self.collect_regions(document, raw, page, page_match.span, &mut regions);
            }
        }

        let annotated = self.engine.apply_highlights(&raw.bytes, &regions)?;
        self.sink.store(&document.id, &annotated).await
    }

    /// Visual regions for one span, via case-insensitive literal search of
    /// the recovered excerpt on its page
    fn collect_regions(
        &self,
        document: &DocumentRef,
        raw: &RawDocument,
        page: &PageText,
        span: MatchSpan,
        regions: &mut Vec<PageRegion>,
    ) {
        let excerpt = excerpt_at(&page.text, span);
        if excerpt.is_empty() {
            return;
        }
        match self.engine.search_page(&raw.bytes, page.index, &excerpt) {
            Ok(found) if found.is_empty() => {
                eprintln!(
                    "no visual match for '{}' on page {} of {}",
                    excerpt, page.index, document.id
                );
            }
            Ok(found) => regions.extend(found),
            Err(e) => {
                eprintln!(
                    "page search failed for '{}' on page {} of {}: {}",
                    excerpt, page.index, document.id, e
                );
            }
        }
    }

    fn build_result(
        &self,
        document: &DocumentRef,
        raw: &RawDocument,
        matches: &PageMatches,
        highlighted_output: Option<String>,
    ) -> DocumentResult {
        let per_keyword_counts: Vec<KeywordCount> = self
            .keywords
            .iter()
            .map(|keyword| KeywordCount {
                keyword: keyword.original.clone(),
                count: matches.count_for(&keyword.original),
            })
            .collect();

        DocumentResult {
            document_id: document.id.clone(),
            locator: document.locator.clone(),
            per_keyword_counts,
            total_occurrences: matches.total(),
            highlighted_output,
            content_hash: Some(raw.content_hash.clone()),
            processed_at: Utc::now(),
            error: None,
        }
    }
}

/// Slice a page's raw text at normalized span bounds, character-based and
/// clamped. Span offsets live in normalized coordinates; the raw text can
/// drift by the characters normalization removed, so the slice is a
/// best-effort excerpt, refined by the engine's own literal search.
fn excerpt_at(raw_page_text: &str, span: MatchSpan) -> String {
    raw_page_text
        .chars()
        .skip(span.start)
        .take(span.len())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::engine::PlainTextEngine;
    use crate::services::normalize::parse_keywords;
    use crate::services::sink::MemorySink;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Fetcher serving canned bytes per locator
    struct StaticFetcher {
        documents: HashMap<String, Vec<u8>>,
    }

    impl StaticFetcher {
        fn serving(locator: &str, bytes: &[u8]) -> Self {
            let mut documents = HashMap::new();
            documents.insert(locator.to_string(), bytes.to_vec());
            Self { documents }
        }
    }

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, locator: &str) -> anyhow::Result<Vec<u8>> {
            self.documents
                .get(locator)
                .cloned()
                .ok_or_else(|| anyhow!("connection refused for {}", locator))
        }
    }

    fn processor(
        fetcher: StaticFetcher,
        sink: Arc<MemorySink>,
        keywords: &[&str],
        max_distance: usize,
    ) -> DocumentProcessor {
        DocumentProcessor::new(
            Arc::new(fetcher),
            Arc::new(PlainTextEngine),
            sink,
            parse_keywords(keywords.iter().copied()),
            max_distance,
        )
    }

    #[tokio::test]
    async fn test_matching_document_is_highlighted_and_stored() {
        let bytes = "le Café ouvre\u{000C}rien ici".as_bytes().to_vec();
        let sink = Arc::new(MemorySink::new());
        let processor = processor(
            StaticFetcher::serving("https://example.com/a.txt", &bytes),
            sink.clone(),
            &["cafe"],
            0,
        );

        let document = DocumentRef::direct("doc-a", "https://example.com/a.txt");
        let result = processor.process(&document).await;

        assert!(result.is_success());
        assert_eq!(result.total_occurrences, 1);
        assert_eq!(result.per_keyword_counts[0].keyword, "cafe");
        assert_eq!(result.per_keyword_counts[0].count, 1);
        assert_eq!(result.highlighted_output.as_deref(), Some("mem://doc-a"));

        let stored = String::from_utf8(sink.get("doc-a").unwrap()).unwrap();
        assert!(stored.contains(">>Café<<"));
    }

    #[tokio::test]
    async fn test_zero_matches_is_success_without_output() {
        let bytes = b"nothing relevant here".to_vec();
        let sink = Arc::new(MemorySink::new());
        let processor = processor(
            StaticFetcher::serving("https://example.com/b.txt", &bytes),
            sink.clone(),
            &["absent"],
            1,
        );

        let document = DocumentRef::direct("doc-b", "https://example.com/b.txt");
        let result = processor.process(&document).await;

        assert!(result.is_success());
        assert_eq!(result.total_occurrences, 0);
        assert!(result.highlighted_output.is_none());
        assert!(sink.get("doc-b").is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_captured_in_result() {
        let sink = Arc::new(MemorySink::new());
        let processor = processor(
            StaticFetcher {
                documents: HashMap::new(),
            },
            sink,
            &["cafe"],
            0,
        );

        let document = DocumentRef::direct("doc-c", "https://example.com/missing.txt");
        let result = processor.process(&document).await;

        let error = result.error.expect("fetch failure should be captured");
        assert_eq!(error.kind, ProcessErrorKind::Fetch);
        assert!(error.message.contains("missing.txt"));
    }

    #[tokio::test]
    async fn test_malformed_document_yields_extraction_error() {
        let sink = Arc::new(MemorySink::new());
        let processor = processor(
            StaticFetcher::serving("https://example.com/d.bin", &[0xff, 0xfe, 0x01]),
            sink,
            &["cafe"],
            0,
        );

        let document = DocumentRef::direct("doc-d", "https://example.com/d.bin");
        let result = processor.process(&document).await;

        let error = result.error.expect("extraction failure should be captured");
        assert_eq!(error.kind, ProcessErrorKind::Extraction);
    }

    #[tokio::test]
    async fn test_accented_page_text_matches_plain_keyword() {
        let bytes = "réunion des bénévoles\u{000C}la RÉUNION annuelle"
            .as_bytes()
            .to_vec();
        let sink = Arc::new(MemorySink::new());
        let processor = processor(
            StaticFetcher::serving("https://example.com/e.txt", &bytes),
            sink,
            &["reunion"],
            0,
        );

        let document = DocumentRef::direct("doc-e", "https://example.com/e.txt");
        let result = processor.process(&document).await;

        assert_eq!(result.total_occurrences, 2);
        assert_eq!(result.per_keyword_counts[0].count, 2);
        assert!(result.content_hash.is_some());
    }

    #[tokio::test]
    async fn test_approximate_match_counts_misspelling() {
        let bytes = b"the benevoles met, the banevoles left".to_vec();
        let sink = Arc::new(MemorySink::new());
        let processor = processor(
            StaticFetcher::serving("https://example.com/f.txt", &bytes),
            sink,
            &["benevoles"],
            1,
        );

        let document = DocumentRef::direct("doc-f", "https://example.com/f.txt");
        let result = processor.process(&document).await;

        assert_eq!(result.total_occurrences, 2);
    }

    #[test]
    fn test_excerpt_is_clamped_to_page_length() {
        let span = MatchSpan { start: 3, end: 50 };
        assert_eq!(excerpt_at("abcdef", span), "def");

        let span = MatchSpan {
            start: 10,
            end: 12,
        };
        assert_eq!(excerpt_at("abc", span), "");
    }
}
