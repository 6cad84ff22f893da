use std::collections::{HashMap, HashSet};
use std::thread;

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::error::IndexError;
use crate::index::shard::{build_shard, expand_offset};
use crate::index::Index;
use crate::options::IndexOptions;
use crate::types::{Getter, RecordValue, Shard};

/// Word source for the build, dispatching per record: `Bag` and `Words`
/// values answer from their own inline words, `Empty` values fall back to
/// the external getter, which is optionally funneled through a mutex so
/// parallel workers never call it concurrently.
pub(crate) struct WordSource {
    records: HashMap<String, RecordValue>,
    getter: Option<Getter>,
    lock: Option<Mutex<()>>,
}

impl WordSource {
    pub(crate) fn for_each_word(&self, pk: &str, f: &mut dyn FnMut(&[u8])) {
        match self.records.get(pk) {
            Some(RecordValue::Bag(bag)) => {
                for word in bag {
                    f(word.as_bytes());
                }
            }
            Some(RecordValue::Words(list)) => {
                // ordered lists are bags; drop duplicates on the fly
                let mut seen: HashSet<&str> = HashSet::with_capacity(list.len());
                for word in list {
                    if seen.insert(word.as_str()) {
                        f(word.as_bytes());
                    }
                }
            }
            Some(RecordValue::Empty) | None => {
                let Some(getter) = &self.getter else {
                    return;
                };
                let bag = match &self.lock {
                    Some(mutex) => {
                        let _guard = mutex.lock();
                        getter(pk)
                    }
                    None => getter(pk),
                };
                for word in &bag {
                    f(word.as_bytes());
                }
            }
        }
    }
}

pub(crate) fn build(
    opts: Option<IndexOptions>,
    data: HashMap<String, RecordValue>,
    getter: Option<Getter>,
) -> Result<Index, IndexError> {
    let opts = opts.unwrap_or_default().normalized();

    let mut key_len: Option<usize> = None;
    for pk in data.keys() {
        match key_len {
            None => key_len = Some(pk.len()),
            Some(len) if len != pk.len() => return Err(IndexError::NonuniformKeySize),
            Some(_) => {}
        }
    }

    let pks: Vec<String> = data.keys().cloned().collect();
    if getter.is_none() && data.values().any(|v| matches!(v, RecordValue::Empty)) {
        return Err(IndexError::NilGetter);
    }
    let source = WordSource {
        lock: (getter.is_some() && opts.sync).then(|| Mutex::new(())),
        getter,
        records: data,
    };

    let capacity = 1usize << opts.shard_exponent(pks.len() as u64);
    log::debug!(
        "indexing {} records into shards of up to {} rows",
        pks.len(),
        capacity
    );

    // Filled shards build on background threads while this thread keeps
    // partitioning; the trailing partial shard builds here. One join.
    let mut shards: Vec<Shard> = Vec::new();
    thread::scope(|scope| {
        let source = &source;
        let opts = &opts;
        let mut handles = Vec::new();
        let mut current: Vec<String> = Vec::new();
        for pk in pks {
            current.push(pk);
            if current.len() == capacity {
                let chunk = std::mem::take(&mut current);
                handles.push(scope.spawn(move || build_shard(chunk, source, opts)));
            }
        }
        let tail = (!current.is_empty()).then(|| build_shard(current, source, opts));
        for handle in handles {
            shards.push(handle.join().expect("shard builder thread panicked"));
        }
        shards.extend(tail);
    });

    // One worker per (shard, offset) pair; shards with no bucket at all
    // (no word ever reached the n-gram width) are skipped outright.
    let tasks: Vec<(usize, usize)> = shards
        .iter()
        .enumerate()
        .filter(|(_, shard)| !shard.buckets.is_empty())
        .flat_map(|(i, shard)| {
            let width = shard.minword as usize;
            let top = shard.maxword.saturating_sub(width + 1);
            (1..=top).map(move |q| (i, q))
        })
        .collect();
    if !tasks.is_empty() {
        log::debug!("expanding {} (shard, offset) filter pairs", tasks.len());
        let built: Vec<(usize, usize, Vec<u8>, Vec<u8>)> = tasks
            .into_par_iter()
            .map(|(i, q)| {
                let (positions, counts) = expand_offset(&shards[i], q, &source, &opts);
                (i, q, positions, counts)
            })
            .collect();
        for (i, q, positions, counts) in built {
            shards[i].buckets[q] = positions;
            shards[i].counts[q] = counts;
        }
    }

    Ok(Index { shards })
}
