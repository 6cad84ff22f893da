// Copyright 2025 HyperZoekt Project
// Derived from sourcegraph/zoekt (https://github.com/sourcegraph/zoekt)
// Copyright 2016 Google Inc. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Probabilistic, compact full-text index over records identified by
//! fixed-width primary keys.
//!
//! Callers hand in a map from primary key to a bag of words (or a getter
//! that resolves one); the index shards the input, encodes overlapping
//! n-gram filters per shard, and answers "which primary keys contain this
//! term?" for whole words and subwords alike, tolerating a tunable rate of
//! false positives in exchange for a small memory footprint. Tokens are
//! opaque bytes: no casefolding, no normalization, no tokenization.

pub mod error;
pub mod index;
mod io;
pub mod options;
pub mod search;
pub mod types;

// Re-export the working surface for callers that prefer a flat import.
pub use crate::error::IndexError;
pub use crate::index::Index;
pub use crate::options::IndexOptions;
pub use crate::search::Lookup;
pub use crate::types::{BagOfWords, Getter, RecordValue};

use std::collections::HashMap;

/// Convenience one-shot build with default options over self-contained
/// records (no external getter).
pub fn build_index(data: HashMap<String, RecordValue>) -> Result<Index, IndexError> {
    Index::new(None, data, None)
}
