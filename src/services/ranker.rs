// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::result::DocumentResult;

/// Order results for presentation: drop zero-match and failed documents,
/// sort the rest by total occurrences descending.
///
/// The sort is stable, so documents with equal counts keep their arrival
/// order and repeated runs over identical input produce identical output.
pub fn rank(results: Vec<DocumentResult>) -> Vec<DocumentResult> {
    let mut ranked: Vec<DocumentResult> = results
        .into_iter()
        .filter(|result| result.is_success() && result.total_occurrences > 0)
        .collect();
    ranked.sort_by(|a, b| b.total_occurrences.cmp(&a.total_occurrences));
    ranked
}
