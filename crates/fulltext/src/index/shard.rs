use std::collections::HashMap;

use crate::index::builder::WordSource;
use crate::options::IndexOptions;
use crate::types::{Shard, FORMAT_VERSION};

/// Wire key for one n-gram occurrence: the n-gram bytes followed by the
/// ordinal rendered in unpadded decimal. Builder and searcher must agree
/// on this rendering; ordinal `0` is reserved for cardinality in
/// version-1 records.
pub(crate) fn ordinal_key(ngram: &[u8], ordinal: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(ngram.len() + 20);
    key.extend_from_slice(ngram);
    key.extend_from_slice(ordinal.to_string().as_bytes());
    key
}

/// Bits needed to represent `rows` (one shift per halving).
pub(crate) fn bit_width(rows: u64) -> u8 {
    let mut width = 0;
    let mut j = rows;
    while j > 0 {
        width += 1;
        j >>= 1;
    }
    width
}

/// Build one shard over `pks` (which become ordinals 1..=n in order).
/// Populates the primary-key table and the offset-0 filters; offsets >= 1
/// are filled in later by [`expand_offset`].
pub(crate) fn build_shard(pks: Vec<String>, source: &WordSource, opts: &IndexOptions) -> Shard {
    let minword = opts.min_word_length as usize;
    let mut shard = Shard {
        version: FORMAT_VERSION,
        minword: opts.min_word_length,
        ..Default::default()
    };

    let mut ordinals: HashMap<u64, Vec<u8>> = HashMap::with_capacity(pks.len());
    let mut count_so_far: HashMap<Vec<u8>, u64> = HashMap::new();
    let mut positions: HashMap<Vec<u8>, u64> = HashMap::new();
    let mut counts: HashMap<Vec<u8>, u64> = HashMap::new();

    for (i, pk) in pks.iter().enumerate() {
        let ordinal = i as u64 + 1;
        ordinals.insert(ordinal, pk.clone().into_bytes());
        source.for_each_word(pk, &mut |word| {
            if word.len() > shard.maxword {
                shard.maxword = word.len();
            }
            if word.len() < minword {
                return;
            }
            while word.len() - minword >= shard.buckets.len() {
                shard.buckets.push(Vec::new());
                shard.counts.push(Vec::new());
            }
            let ngram = &word[..minword];
            let entry = count_so_far.entry(ngram.to_vec()).or_insert(0);
            *entry += 1;
            let cnt = *entry;
            positions.insert(ordinal_key(ngram, cnt), ordinal);
            counts.insert(ngram.to_vec(), cnt);
        });
    }

    shard.rows = pks.len() as u64;
    shard.logrows = bit_width(shard.rows);
    let key_len = pks.first().map(|pk| pk.len()).unwrap_or(0);
    shard.pkbits = if key_len <= 31 { (key_len * 8) as u64 } else { 0 };
    shard.pk = kvfilter::perfect(&ordinals, shard.pkbits);
    drop(ordinals);

    if !shard.buckets.is_empty() {
        // positions are exact; only the counts filter absorbs approximation
        shard.buckets[0] = kvfilter::approx(&positions, shard.logrows as u64, 0);
        shard.counts[0] = kvfilter::approx(
            &counts,
            shard.logrows as u64,
            opts.false_positive_functions,
        );
    }
    shard
}

/// Build the positions and counts filters for offset `q >= 1` by
/// re-walking the shard's ordinals through its primary-key table. The
/// n-gram for offset `q` starts at byte `1 + q`, one past the offset
/// itself; offset 0 is the prefix filter and is not symmetric with these.
pub(crate) fn expand_offset(
    shard: &Shard,
    q: usize,
    source: &WordSource,
    opts: &IndexOptions,
) -> (Vec<u8>, Vec<u8>) {
    let minword = shard.minword as usize;
    let mut count_so_far: HashMap<Vec<u8>, u64> = HashMap::new();
    let mut positions: HashMap<Vec<u8>, u64> = HashMap::new();
    let mut counts: HashMap<Vec<u8>, u64> = HashMap::new();

    for ordinal in 1..=shard.rows {
        let Some(pk) = kvfilter::get_bytes(&shard.pk, ordinal) else {
            continue;
        };
        let pk = String::from_utf8_lossy(pk).into_owned();
        source.for_each_word(&pk, &mut |word| {
            if word.len() <= minword + q {
                return;
            }
            let ngram = &word[1 + q..1 + q + minword];
            let entry = count_so_far.entry(ngram.to_vec()).or_insert(0);
            *entry += 1;
            let cnt = *entry;
            positions.insert(ordinal_key(ngram, cnt), ordinal);
            counts.insert(ngram.to_vec(), cnt);
        });
    }

    (
        kvfilter::approx(&positions, shard.logrows as u64, 0),
        kvfilter::approx(
            &counts,
            shard.logrows as u64,
            opts.false_positive_functions,
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_width_counts_shifts() {
        assert_eq!(bit_width(0), 0);
        assert_eq!(bit_width(1), 1);
        assert_eq!(bit_width(2), 2);
        assert_eq!(bit_width(3), 2);
        assert_eq!(bit_width(4), 3);
        assert_eq!(bit_width(1 << 13), 14);
    }

    #[test]
    fn ordinal_keys_render_unpadded_decimal() {
        assert_eq!(ordinal_key(b"gol", 1), b"gol1".to_vec());
        assert_eq!(ordinal_key(b"gol", 0), b"gol0".to_vec());
        assert_eq!(ordinal_key(b"gol", 1234), b"gol1234".to_vec());
    }
}
