// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};

/// A search keyword in original and normalized form.
///
/// Built through `services::normalize::parse_keywords`, which discards
/// blank entries and normalizes the rest. Both forms are read-only for the
/// duration of a batch run, so they can be shared across workers freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSpec {
    /// The keyword as the caller supplied it, used for reporting
    pub original: String,
    /// Diacritic-stripped, case-folded form, used for matching
    pub normalized: String,
}
