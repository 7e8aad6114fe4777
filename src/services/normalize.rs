// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::keyword::KeywordSpec;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize text for matching: canonical decomposition, drop combining
/// marks, lowercase.
///
/// - "Café" → "cafe"
/// - "AGIRabcd" → "agirabcd"
/// - "Noël à Paris" → "noel a paris"
///
/// Keywords and page text go through the same function, so match offsets
/// always refer to the same normalized coordinate space. Whitespace is left
/// untouched; offsets must stay usable as an index back into the raw page
/// text.
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Build keyword specs from raw input, discarding blank entries.
/// An all-blank input yields an empty list, which downstream treats as
/// "no matches anywhere", not as an error.
pub fn parse_keywords<I, S>(raw: I) -> Vec<KeywordSpec>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|entry| {
            let original = entry.as_ref().trim();
            if original.is_empty() {
                return None;
            }
            Some(KeywordSpec {
                original: original.to_string(),
                normalized: normalize(original),
            })
        })
        .collect()
}
