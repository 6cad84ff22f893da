use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;

use crate::index::shard::ordinal_key;
use crate::index::Index;
use crate::types::Shard;

impl Index {
    /// Probe the index for `word` (at least the n-gram width in bytes).
    /// `exact` restricts the bucket walk to whole-word matches (faster);
    /// `dedup` yields each primary key at most once per shard (slower, but
    /// worth it when the consumer hits a slow backing store per key).
    /// Nothing runs until the returned [`Lookup`] is driven; rare false
    /// positives are possible, false negatives are not.
    pub fn lookup(&self, word: &str, exact: bool, dedup: bool) -> Lookup<'_> {
        Lookup {
            index: self,
            word: word.as_bytes().to_vec(),
            exact,
            dedup,
        }
    }
}

/// A pending lookup: a lazy sequence of primary keys driven by a visitor.
#[must_use = "a lookup does nothing until visited"]
pub struct Lookup<'a> {
    index: &'a Index,
    word: Vec<u8>,
    exact: bool,
    dedup: bool,
}

impl Lookup<'_> {
    /// Drive the lookup, calling `visit` for every matching primary key.
    /// Returning `false` stops the whole lookup; in-flight shard workers
    /// observe the stop before their next yield. Shards are probed in
    /// parallel, so ordering between shards is unspecified.
    pub fn visit<F>(self, visit: F)
    where
        F: FnMut(&str) -> bool + Send,
    {
        let stopped = RwLock::new(false);
        let sink = Mutex::new(visit);
        self.index.shards.par_iter().for_each(|shard| {
            if *stopped.read() {
                return;
            }
            probe_shard(shard, &self.word, self.exact, self.dedup, &|pk: &str| {
                let mut f = sink.lock();
                if *stopped.read() {
                    return false;
                }
                if (*f)(pk) {
                    true
                } else {
                    *stopped.write() = true;
                    false
                }
            });
        });
    }

    /// Convenience: drive the lookup to completion and collect every
    /// yielded key (duplicates included unless `dedup` was set).
    pub fn collect_vec(self) -> Vec<String> {
        let mut out = Vec::new();
        self.visit(|pk| {
            out.push(pk.to_string());
            true
        });
        out
    }
}

/// Probe one shard. `yield_pk` returns `false` to abort the walk.
fn probe_shard(
    shard: &Shard,
    word: &[u8],
    exact: bool,
    dedup: bool,
    yield_pk: &dyn Fn(&str) -> bool,
) {
    let m = shard.ngram_width();
    if word.len() < m || shard.rows == 0 {
        return;
    }
    let mut uniq: HashMap<u64, usize> = HashMap::new();

    for t in (0..=word.len() - m).rev() {
        let term = &word[t..t + m];
        let start = if exact {
            word.len() - m
        } else {
            match shard.maxword.checked_sub(m) {
                Some(b) => b,
                None => continue,
            }
        };
        for bucket in (0..=start).rev() {
            if bucket >= shard.buckets.len() {
                continue;
            }
            if shard.buckets[bucket].len() < 2 {
                continue;
            }
            let count = bucket_count(shard, bucket, term);
            if count == 0 || count > shard.rows {
                // filter backend false positive; skip silently
                continue;
            }
            for c in 1..=count {
                let pos = kvfilter::get_num(&shard.buckets[bucket], &ordinal_key(term, c));
                if pos == 0 || pos > shard.rows {
                    continue;
                }
                if dedup {
                    *uniq.entry(pos).or_insert(0) += 1;
                } else if let Some(pk) = kvfilter::get_bytes(&shard.pk, pos) {
                    if !yield_pk(&String::from_utf8_lossy(pk)) {
                        return;
                    }
                }
            }
            if exact {
                break;
            }
        }
    }

    if dedup {
        // commit: a key survives when enough distinct probes landed on it
        for (pos, hits) in uniq {
            if hits + m >= word.len() {
                if let Some(pk) = kvfilter::get_bytes(&shard.pk, pos) {
                    if !yield_pk(&String::from_utf8_lossy(pk)) {
                        return;
                    }
                }
            }
        }
    }
}

/// Occurrence count for `term` in `bucket`: version 2 keeps it in a
/// dedicated counts filter, version 1 under the reserved ordinal-0 key of
/// the positions filter.
fn bucket_count(shard: &Shard, bucket: usize, term: &[u8]) -> u64 {
    if shard.version >= 2 {
        match shard.counts.get(bucket) {
            Some(blob) if blob.len() >= 2 => kvfilter::get_num(blob, term),
            _ => 0,
        }
    } else {
        kvfilter::get_num(&shard.buckets[bucket], &ordinal_key(term, 0))
    }
}
