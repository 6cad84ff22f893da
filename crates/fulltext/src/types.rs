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

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Set of unique word tokens associated with one record.
pub type BagOfWords = HashSet<String>;

/// Caller-supplied word source: given a primary key, return its bag.
/// Wrapped in `Arc` so build workers can share it.
pub type Getter = Arc<dyn Fn(&str) -> BagOfWords + Send + Sync>;

/// Highest shard format version this build understands.
pub(crate) const FORMAT_VERSION: u8 = 2;

/// Per-record input value. The original API accepted several dynamic
/// shapes; this sum type makes them explicit: `Empty` defers entirely to
/// an external [`Getter`], the other variants carry their words inline
/// (an ordered list is treated as a bag).
#[derive(Debug, Clone)]
pub enum RecordValue {
    Empty,
    Bag(BagOfWords),
    Words(Vec<String>),
}

impl From<BagOfWords> for RecordValue {
    fn from(bag: BagOfWords) -> Self {
        RecordValue::Bag(bag)
    }
}

impl From<Vec<String>> for RecordValue {
    fn from(words: Vec<String>) -> Self {
        RecordValue::Words(words)
    }
}

impl From<Vec<&str>> for RecordValue {
    fn from(words: Vec<&str>) -> Self {
        RecordValue::Words(words.into_iter().map(str::to_string).collect())
    }
}

/// One persisted partition of the index. Field names are the stable wire
/// names; `counts` and `minword` only exist in version-2 records, so they
/// deserialize from older blobs via defaults and are omitted again when
/// empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Shard {
    pub version: u8,
    pub pk: Vec<u8>,
    pub buckets: Vec<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub counts: Vec<Vec<u8>>,
    pub pkbits: u64,
    pub rows: u64,
    pub logrows: u8,
    pub maxword: usize,
    #[serde(default, skip_serializing_if = "minword_absent")]
    pub minword: u8,
}

fn minword_absent(v: &u8) -> bool {
    *v == 0
}

impl Shard {
    /// n-gram width this shard was built with: per-shard `minword` for
    /// version-2 records, the fixed trigram width for version 1.
    pub fn ngram_width(&self) -> usize {
        if self.version >= 2 && self.minword > 0 {
            self.minword as usize
        } else {
            3
        }
    }
}
