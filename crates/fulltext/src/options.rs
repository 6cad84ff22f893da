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

/// Build-time tuning knobs. `Index::new` accepts `None` for the defaults.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Accuracy of the counts filters. Higher values spend more memory on
    /// longer fingerprints and produce fewer false positives; `0` disables
    /// approximation entirely (exact mode).
    pub false_positive_functions: u8,
    /// Shard-size exponent: each shard holds up to `2^bucketing_exponent`
    /// records.
    pub bucketing_exponent: u8,
    /// Minimum shard count; the exponent is lowered for small inputs until
    /// this many shards come out (useful for search parallelism).
    pub min_shards: u8,
    /// n-gram width and shortest queryable word.
    pub min_word_length: u8,
    /// Serialize external getter calls across expansion workers. Leave on
    /// unless the getter is known to be thread-safe.
    pub sync: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        IndexOptions {
            false_positive_functions: 3,
            bucketing_exponent: 13,
            min_shards: 3,
            min_word_length: 3,
            sync: true,
        }
    }
}

impl IndexOptions {
    pub(crate) fn normalized(mut self) -> Self {
        if self.min_word_length == 0 {
            self.min_word_length = 1;
        }
        self
    }

    /// Effective shard exponent for `rows` records: reduced from the
    /// configured exponent while the input would spread over fewer than
    /// `min_shards` shards.
    pub(crate) fn shard_exponent(&self, rows: u64) -> u32 {
        let mut exp = self.bucketing_exponent as u32;
        while exp > 0 && (rows >> exp) < self.min_shards as u64 {
            exp -= 1;
        }
        exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = IndexOptions::default();
        assert_eq!(opts.false_positive_functions, 3);
        assert_eq!(opts.bucketing_exponent, 13);
        assert_eq!(opts.min_shards, 3);
        assert_eq!(opts.min_word_length, 3);
        assert!(opts.sync);
    }

    #[test]
    fn exponent_reduced_for_small_inputs() {
        let opts = IndexOptions::default();
        assert_eq!(opts.shard_exponent(1 << 20), 13);
        assert_eq!(opts.shard_exponent(120), 5);
        assert_eq!(opts.shard_exponent(10), 1);
        assert_eq!(opts.shard_exponent(3), 0);
        assert_eq!(opts.shard_exponent(0), 0);
    }

    #[test]
    fn zero_min_word_is_normalized() {
        let opts = IndexOptions {
            min_word_length: 0,
            ..Default::default()
        }
        .normalized();
        assert_eq!(opts.min_word_length, 1);
    }
}
