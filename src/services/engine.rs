// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Document format capability.
//!
//! The pipeline never parses document bytes itself. Per-page text
//! extraction, literal page search, and highlight annotation all go
//! through `DocumentEngine`, so any format backend (PDF, office formats)
//! can be plugged in behind the same trait. The bundled `PlainTextEngine`
//! handles form-feed paginated UTF-8 text, the page-break convention text
//! extractors emit, and doubles as the test backend.

use crate::models::document::PageText;
use crate::models::matches::PageRegion;
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;

/// Capability surface over the underlying document format
pub trait DocumentEngine: Send + Sync {
    /// Plain text per physical page, in page order.
    /// Fails when the bytes are not a well-formed document.
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<PageText>>;

    /// Case-insensitive literal search on one page, returning the visual
    /// region of every occurrence
    fn search_page(&self, bytes: &[u8], page: u32, literal: &str) -> Result<Vec<PageRegion>>;

    /// Apply highlight annotations for the given regions and re-serialize
    /// the document
    fn apply_highlights(&self, bytes: &[u8], regions: &[PageRegion]) -> Result<Vec<u8>>;
}

/// Backend for form-feed paginated UTF-8 text documents.
///
/// A visual region is a line/column rectangle; a highlight wraps the
/// region's text in `>>`/`<<` markers when the document is re-serialized.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextEngine;

impl DocumentEngine for PlainTextEngine {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<PageText>> {
        let pages = page_texts(bytes)?;
        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(index, text)| PageText {
                index: index as u32,
                text,
            })
            .collect())
    }

    fn search_page(&self, bytes: &[u8], page: u32, literal: &str) -> Result<Vec<PageRegion>> {
        let pages = page_texts(bytes)?;
        let page_text = pages
            .get(page as usize)
            .ok_or_else(|| anyhow!("page {} out of range ({} pages)", page, pages.len()))?;
        Ok(search_text(page_text, page, literal))
    }

    fn apply_highlights(&self, bytes: &[u8], regions: &[PageRegion]) -> Result<Vec<u8>> {
        let mut pages = page_texts(bytes)?;

        let mut by_page: BTreeMap<u32, Vec<&PageRegion>> = BTreeMap::new();
        for region in regions {
            by_page.entry(region.page).or_default().push(region);
        }

        for (page, page_regions) in by_page {
            let Some(text) = pages.get_mut(page as usize) else {
                eprintln!("skipping highlight on missing page {}", page);
                continue;
            };
            *text = mark_regions(text, &page_regions);
        }

        Ok(pages.join("\u{000C}").into_bytes())
    }
}

/// Split a text document into per-page strings on form feeds
fn page_texts(bytes: &[u8]) -> Result<Vec<String>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| anyhow!("document bytes are not valid UTF-8 text"))?;
    Ok(text.split('\u{000C}').map(str::to_string).collect())
}

/// Lowercase a single character without changing the character count
fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// All case-insensitive occurrences of `literal` on one page, as
/// line/column regions
fn search_text(page_text: &str, page: u32, literal: &str) -> Vec<PageRegion> {
    let needle: Vec<char> = literal.chars().map(fold_char).collect();
    if needle.is_empty() {
        return Vec::new();
    }
    let chars: Vec<char> = page_text.chars().collect();
    if needle.len() > chars.len() {
        return Vec::new();
    }

    let folded: Vec<char> = chars.iter().map(|&c| fold_char(c)).collect();
    let mut regions = Vec::new();
    for start in 0..=chars.len() - needle.len() {
        if folded[start..start + needle.len()] == needle[..] {
            let end = start + needle.len();
            let (y0, x0) = offset_to_line_col(&chars, start);
            let (last_line, last_col) = offset_to_line_col(&chars, end - 1);
            regions.push(PageRegion {
                page,
                x0: x0 as f32,
                y0: y0 as f32,
                x1: (last_col + 1) as f32,
                y1: last_line as f32,
            });
        }
    }
    regions
}

/// Wrap every region of one page in highlight markers.
/// A region that no longer resolves is skipped, never fatal.
fn mark_regions(page_text: &str, regions: &[&PageRegion]) -> String {
    let mut chars: Vec<char> = page_text.chars().collect();

    let mut resolved: Vec<(usize, usize)> = regions
        .iter()
        .filter_map(|region| {
            let start = line_col_to_offset(&chars, region.y0 as usize, region.x0 as usize)?;
            let end = line_col_to_offset(&chars, region.y1 as usize, region.x1 as usize)?;
            (start < end).then_some((start, end))
        })
        .collect();
    if resolved.len() < regions.len() {
        eprintln!(
            "skipped {} unresolved highlight region(s)",
            regions.len() - resolved.len()
        );
    }

    // Two spans can resolve to the same occurrence (the literal search
    // reports every occurrence of an excerpt); mark each region once
    resolved.sort_by(|a, b| b.cmp(a));
    resolved.dedup();

    // Insert markers back-to-front so no insertion shifts a pending offset
    let mut inserts: Vec<(usize, [char; 2])> = resolved
        .iter()
        .flat_map(|&(start, end)| [(end, ['<', '<']), (start, ['>', '>'])])
        .collect();
    inserts.sort_by(|a, b| b.0.cmp(&a.0));
    for (offset, marker) in inserts {
        chars.splice(offset..offset, marker);
    }
    chars.into_iter().collect()
}

/// (line, column) of a character offset; columns count characters, the
/// newline itself sits at column = line length
fn offset_to_line_col(chars: &[char], offset: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    for &c in &chars[..offset] {
        if c == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Character offset of a (line, column) position, if it exists
fn line_col_to_offset(chars: &[char], line: usize, col: usize) -> Option<usize> {
    let mut cur_line = 0;
    let mut cur_col = 0;
    for (offset, &c) in chars.iter().enumerate() {
        if cur_line == line && cur_col == col {
            return Some(offset);
        }
        if c == '\n' {
            cur_line += 1;
            cur_col = 0;
        } else {
            cur_col += 1;
        }
    }
    (cur_line == line && cur_col == col).then_some(chars.len())
}
