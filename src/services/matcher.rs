// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Approximate keyword matching over normalized page text.
//!
//! Matching works in character space (not bytes) with a bounded edit
//! distance: up to `max_distance` single-character insertions, deletions,
//! or substitutions between the keyword and a text segment. Distance 0 is
//! a literal scan, and distance ≥ 1 runs a semi-global edit-distance pass
//! where the keyword may start and end anywhere in the text.

use crate::models::matches::MatchSpan;

/// Find approximate occurrences of `keyword` in `text`.
///
/// Both inputs must already be normalized (see `services::normalize`);
/// the returned spans are character offsets into `text`, ordered by start
/// ascending. Distinct overlapping occurrences are all reported; a single
/// occurrence is reported once.
///
/// Keywords of `2 * max_distance` characters or fewer are matched exactly
/// regardless of the requested tolerance. Without that guard a one- or
/// two-character keyword under tolerance 1 matches nearly every position.
pub fn find_approx(keyword: &str, text: &str, max_distance: usize) -> Vec<MatchSpan> {
    let pattern: Vec<char> = keyword.chars().collect();
    debug_assert!(
        !pattern.is_empty(),
        "blank keywords are filtered out at parse time"
    );
    if pattern.is_empty() {
        return Vec::new();
    }
    let haystack: Vec<char> = text.chars().collect();
    if haystack.is_empty() {
        return Vec::new();
    }

    let distance = effective_distance(pattern.len(), max_distance);
    if distance == 0 {
        find_exact(&pattern, &haystack)
    } else {
        find_bounded(&pattern, &haystack, distance)
    }
}

/// Tolerance actually applied for a keyword of the given length
fn effective_distance(keyword_len: usize, max_distance: usize) -> usize {
    if keyword_len <= 2 * max_distance {
        0
    } else {
        max_distance
    }
}

/// Literal character-window scan reporting every occurrence, overlapping
/// ones included
fn find_exact(pattern: &[char], haystack: &[char]) -> Vec<MatchSpan> {
    if pattern.len() > haystack.len() {
        return Vec::new();
    }
    haystack
        .windows(pattern.len())
        .enumerate()
        .filter(|(_, window)| *window == pattern)
        .map(|(start, _)| MatchSpan {
            start,
            end: start + pattern.len(),
        })
        .collect()
}

/// Cost and alignment start for one cell of the distance table.
/// Equal costs keep the later start so reported spans stay tight.
fn better(current: (usize, usize), candidate: (usize, usize)) -> (usize, usize) {
    if candidate.0 < current.0 || (candidate.0 == current.0 && candidate.1 > current.1) {
        candidate
    } else {
        current
    }
}

/// Semi-global edit distance (Sellers): the text prefix before a match and
/// the suffix after it are free. Returns, for every end position `j` in
/// the haystack, the cheapest alignment of the whole pattern against a
/// segment ending at `j`, as `(cost, start)`.
fn end_profile(pattern: &[char], haystack: &[char]) -> Vec<(usize, usize)> {
    let m = pattern.len();
    let mut profile = Vec::with_capacity(haystack.len() + 1);

    // column j = 0: the pattern must be fully deleted
    let mut prev: Vec<(usize, usize)> = (0..=m).map(|i| (i, 0)).collect();
    profile.push(prev[m]);
    let mut cur = vec![(0usize, 0usize); m + 1];

    for (j, &text_char) in haystack.iter().enumerate() {
        cur[0] = (0, j + 1);
        for i in 1..=m {
            let substitution = usize::from(pattern[i - 1] != text_char);
            let mut cell = (prev[i - 1].0 + substitution, prev[i - 1].1);
            cell = better(cell, (cur[i - 1].0 + 1, cur[i - 1].1));
            cell = better(cell, (prev[i].0 + 1, prev[i].1));
            cur[i] = cell;
        }
        profile.push(cur[m]);
        std::mem::swap(&mut prev, &mut cur);
    }
    profile
}

/// One valley of the end-position distance profile: the cheapest run of
/// adjacent end positions, extended to the last position of an equal-cost
/// plateau
#[derive(Clone, Copy)]
struct Valley {
    cost: usize,
    start: usize,
    end: usize,
}

/// Approximate scan: walk the end-position profile and emit one span per
/// distance valley. Adjacent shoulders of an already-emitted occurrence
/// (same alignment start, no better cost) are suppressed; valleys with a
/// different start survive, so genuinely overlapping occurrences are all
/// reported.
fn find_bounded(pattern: &[char], haystack: &[char], max_distance: usize) -> Vec<MatchSpan> {
    let profile = end_profile(pattern, haystack);
    let mut spans: Vec<MatchSpan> = Vec::new();
    let mut valley: Option<Valley> = None;
    let mut last_emitted: Option<(usize, usize)> = None;

    for (end, &(cost, start)) in profile.iter().enumerate().skip(1) {
        match valley {
            Some(open) if cost > open.cost => {
                emit(open, &mut spans, &mut last_emitted);
                valley = (cost <= max_distance).then_some(Valley { cost, start, end });
            }
            Some(open) if cost < open.cost => valley = Some(Valley { cost, start, end }),
            Some(open) => valley = Some(Valley { start, end, ..open }),
            None if cost <= max_distance => valley = Some(Valley { cost, start, end }),
            None => {}
        }
    }
    if let Some(open) = valley {
        emit(open, &mut spans, &mut last_emitted);
    }

    spans.sort_by_key(|span| (span.start, span.end));
    spans
}

fn emit(valley: Valley, spans: &mut Vec<MatchSpan>, last_emitted: &mut Option<(usize, usize)>) {
    if let Some((start, cost)) = *last_emitted {
        if valley.start == start && valley.cost >= cost {
            return;
        }
    }
    spans.push(MatchSpan {
        start: valley.start,
        end: valley.end,
    });
    *last_emitted = Some((valley.start, valley.cost));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::normalize::normalize;

    fn spans(keyword: &str, text: &str, max_distance: usize) -> Vec<(usize, usize)> {
        find_approx(keyword, text, max_distance)
            .into_iter()
            .map(|s| (s.start, s.end))
            .collect()
    }

    /// Naive baseline: every window equal to the pattern
    fn literal_scan(keyword: &str, text: &str) -> Vec<(usize, usize)> {
        let pattern: Vec<char> = keyword.chars().collect();
        let haystack: Vec<char> = text.chars().collect();
        let mut found = Vec::new();
        for start in 0..haystack.len().saturating_sub(pattern.len() - 1) {
            if haystack[start..start + pattern.len()] == pattern[..] {
                found.push((start, start + pattern.len()));
            }
        }
        found
    }

    #[test]
    fn test_exact_finds_all_occurrences() {
        assert_eq!(spans("cafe", "a cafe, the cafe", 0), vec![(2, 6), (12, 16)]);
    }

    #[test]
    fn test_exact_reports_overlapping_occurrences() {
        assert_eq!(spans("aa", "aaa", 0), vec![(0, 2), (1, 3)]);
        assert_eq!(spans("aba", "ababa", 0), vec![(0, 3), (2, 5)]);
    }

    #[test]
    fn test_zero_distance_equals_literal_scan() {
        let text = normalize("Le café du coin sert un bon café. cafecafe.");
        for keyword in ["cafe", "un", "e c"] {
            assert_eq!(
                spans(keyword, &text, 0),
                literal_scan(keyword, &text),
                "mismatch for {:?}",
                keyword
            );
        }
    }

    #[test]
    fn test_one_substitution_matches() {
        assert_eq!(spans("cafe", "the cofe shop", 1), vec![(4, 8)]);
    }

    #[test]
    fn test_one_insertion_matches() {
        // "caffe" is "cafe" plus one inserted character
        assert_eq!(spans("cafe", "the caffe was", 1), vec![(4, 9)]);
    }

    #[test]
    fn test_one_deletion_matches() {
        assert_eq!(spans("cafe", "a cae here", 1), vec![(2, 5)]);
    }

    #[test]
    fn test_unrelated_text_does_not_match() {
        assert!(spans("cafe", "xyzw", 1).is_empty());
        assert!(spans("cafe", "the xyzw was", 1).is_empty());
    }

    #[test]
    fn test_two_edits_exceed_tolerance_one() {
        // "vayagaur" is two substitutions away from "voyageur"
        assert!(spans("voyageur", "le vayagaur part", 1).is_empty());
        assert_eq!(spans("voyageur", "le vayagaur part", 2), vec![(3, 11)]);
    }

    #[test]
    fn test_adjacent_occurrences_reported_separately() {
        assert_eq!(spans("cafe", "cafecafe", 1), vec![(0, 4), (4, 8)]);
    }

    #[test]
    fn test_overlapping_near_matches_both_reported() {
        assert_eq!(spans("aba", "ababa", 1), vec![(0, 3), (2, 5)]);
    }

    #[test]
    fn test_single_occurrence_reported_once() {
        assert_eq!(spans("cafe", "the caffe was", 1).len(), 1);
        assert_eq!(spans("cafe", "xcafex", 1).len(), 1);
    }

    #[test]
    fn test_empty_text_returns_no_matches() {
        assert!(spans("cafe", "", 0).is_empty());
        assert!(spans("cafe", "", 1).is_empty());
    }

    #[test]
    fn test_spans_ordered_by_start() {
        let found = spans("cafe", "cafe then coffe then cafee", 1);
        let starts: Vec<usize> = found.iter().map(|(start, _)| *start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
    }

    #[test]
    fn test_short_keyword_guard_forces_exact_match() {
        // "un" is at the 2 * max_distance boundary, so tolerance 1 degrades
        // to an exact scan instead of matching nearly everything
        assert_eq!(spans("un", "un but not um", 1), vec![(0, 2)]);
        assert_eq!(effective_distance(2, 1), 0);
        assert_eq!(effective_distance(3, 1), 1);
        assert_eq!(effective_distance(4, 2), 0);
    }

    #[test]
    fn test_normalized_keyword_against_normalized_text() {
        let text = normalize("Rendez-vous au CAFÉ demain");
        let keyword = normalize("café");
        assert_eq!(spans(&keyword, &text, 0), vec![(15, 19)]);
    }
}
