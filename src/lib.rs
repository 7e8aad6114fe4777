// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Batch keyword search over remote documents.
//!
//! Given a list of document locators and a list of keywords, the pipeline
//! fetches every document concurrently, extracts per-page text, runs
//! accent- and case-insensitive approximate keyword matching, writes a
//! highlighted copy of every matching document through a caller-supplied
//! sink, and ranks the documents by total match count.

pub mod models;
pub mod services;
