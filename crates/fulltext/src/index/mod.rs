pub(crate) mod builder;
pub(crate) mod shard;

use std::collections::HashMap;

use crate::error::IndexError;
use crate::options::IndexOptions;
use crate::types::{Getter, RecordValue, Shard};

/// Probabilistic full-text index over records identified by fixed-width
/// primary keys. Built once, queried concurrently, never mutated in place
/// (only whole-shard [`Index::append`], which is not safe to run while
/// lookups are in flight).
#[derive(Debug, Default)]
pub struct Index {
    pub(crate) shards: Vec<Shard>,
}

impl Index {
    /// Build a new index. `data` maps every primary key to its words;
    /// records carrying [`RecordValue::Empty`] are resolved through
    /// `getter` instead, which is then mandatory. All primary keys must
    /// share one byte length. `opts == None` selects the defaults.
    pub fn new(
        opts: Option<IndexOptions>,
        data: HashMap<String, RecordValue>,
        getter: Option<Getter>,
    ) -> Result<Index, IndexError> {
        builder::build(opts, data, getter)
    }

    /// Concatenate another index's shards onto this one. O(1) per shard.
    pub fn append(&mut self, other: Index) -> &mut Index {
        self.shards.extend(other.shards);
        self
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Total records across all shards.
    pub fn row_count(&self) -> u64 {
        self.shards.iter().map(|s| s.rows).sum()
    }
}
