//! Approximate key -> number filters.
//!
//! Layout (exact, `fp_functions == 0`):
//!   `[mode: u8 = 0][count: u32][vwidth: u8][offsets: (count + 1) * u32]`
//!   `[values: count * vwidth][key heap]`
//! Layout (fingerprint, `fp_functions > 0`):
//!   `[mode: u8 = 1][count: u32][fwidth: u8][vwidth: u8]`
//!   `[entries: count * (fwidth + vwidth)]`, sorted by fingerprint.
//!
//! Exact mode binary-searches full keys. Fingerprint mode keeps the low
//! `fwidth * 8` bits of the key hash; an absent key answers a nonzero
//! value with probability about `count / 2^(fwidth * 8)`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::hash::hash64;

const EXACT: u8 = 0;
const FINGERPRINT: u8 = 1;

/// Build a key -> number filter. `fp_functions == 0` selects exact mode;
/// otherwise each function adds a byte of fingerprint (clamped to 2..=8).
/// `logrows` floors the stored value width so blobs built from sparse
/// drafts of the same structure stay mutually compatible.
pub fn approx(entries: &HashMap<Vec<u8>, u64>, logrows: u64, fp_functions: u8) -> Vec<u8> {
    let max_value = entries.values().copied().max().unwrap_or(0);
    let vwidth = value_width(max_value, logrows);
    if fp_functions == 0 {
        build_exact(entries, vwidth)
    } else {
        build_fingerprint(entries, vwidth, fp_functions)
    }
}

/// Stored number for `key`, or `0` when absent (modulo the fingerprint
/// false-positive rate) or when the blob is malformed.
pub fn get_num(blob: &[u8], key: &[u8]) -> u64 {
    match blob.split_first() {
        Some((&EXACT, rest)) => get_exact(rest, key).unwrap_or(0),
        Some((&FINGERPRINT, rest)) => get_fingerprint(rest, key).unwrap_or(0),
        _ => 0,
    }
}

fn value_width(max_value: u64, logrows: u64) -> usize {
    let data_bits = (64 - max_value.leading_zeros()) as u64;
    let bits = data_bits.max(logrows).max(1) as usize;
    bits.div_ceil(8).min(8)
}

fn build_exact(entries: &HashMap<Vec<u8>, u64>, vwidth: usize) -> Vec<u8> {
    let mut sorted: Vec<(&[u8], u64)> = entries.iter().map(|(k, &v)| (k.as_slice(), v)).collect();
    sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut offsets: Vec<u8> = Vec::with_capacity((sorted.len() + 1) * 4);
    let mut values: Vec<u8> = Vec::with_capacity(sorted.len() * vwidth);
    let mut heap: Vec<u8> = Vec::new();
    offsets.extend_from_slice(&0u32.to_le_bytes());
    for (key, value) in &sorted {
        heap.extend_from_slice(key);
        offsets.extend_from_slice(&(heap.len() as u32).to_le_bytes());
        values.extend_from_slice(&value.to_le_bytes()[..vwidth]);
    }

    let mut blob = Vec::with_capacity(6 + offsets.len() + values.len() + heap.len());
    blob.push(EXACT);
    blob.extend_from_slice(&(sorted.len() as u32).to_le_bytes());
    blob.push(vwidth as u8);
    blob.extend_from_slice(&offsets);
    blob.extend_from_slice(&values);
    blob.extend_from_slice(&heap);
    blob
}

fn build_fingerprint(entries: &HashMap<Vec<u8>, u64>, vwidth: usize, fp_functions: u8) -> Vec<u8> {
    let fwidth = fingerprint_width(fp_functions);
    let mask = fingerprint_mask(fwidth);
    let mut merged: BTreeMap<u64, u64> = BTreeMap::new();
    for (key, &value) in entries {
        // colliding keys keep the larger value so probes never undercount
        let slot = merged.entry(hash64(key) & mask).or_insert(0);
        if value > *slot {
            *slot = value;
        }
    }

    let mut blob = Vec::with_capacity(7 + merged.len() * (fwidth + vwidth));
    blob.push(FINGERPRINT);
    blob.extend_from_slice(&(merged.len() as u32).to_le_bytes());
    blob.push(fwidth as u8);
    blob.push(vwidth as u8);
    for (fp, value) in merged {
        blob.extend_from_slice(&fp.to_le_bytes()[..fwidth]);
        blob.extend_from_slice(&value.to_le_bytes()[..vwidth]);
    }
    blob
}

fn fingerprint_width(fp_functions: u8) -> usize {
    (fp_functions as usize).clamp(2, 8)
}

fn fingerprint_mask(fwidth: usize) -> u64 {
    if fwidth >= 8 {
        u64::MAX
    } else {
        (1u64 << (fwidth * 8)) - 1
    }
}

fn get_exact(rest: &[u8], key: &[u8]) -> Option<u64> {
    let n = u32::from_le_bytes(rest.get(..4)?.try_into().ok()?) as usize;
    let vwidth = *rest.get(4)? as usize;
    if vwidth == 0 || vwidth > 8 {
        return None;
    }
    let offsets = rest.get(5..5 + (n + 1) * 4)?;
    let values = rest.get(5 + (n + 1) * 4..5 + (n + 1) * 4 + n * vwidth)?;
    let heap = rest.get(5 + (n + 1) * 4 + n * vwidth..)?;
    let off = |k: usize| -> Option<usize> {
        Some(u32::from_le_bytes(offsets.get(k * 4..k * 4 + 4)?.try_into().ok()?) as usize)
    };

    let mut lo = 0usize;
    let mut hi = n;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let entry = heap.get(off(mid)?..off(mid + 1)?)?;
        match entry.cmp(key) {
            Ordering::Less => lo = mid + 1,
            Ordering::Greater => hi = mid,
            Ordering::Equal => return Some(read_le(values.get(mid * vwidth..(mid + 1) * vwidth)?)),
        }
    }
    None
}

fn get_fingerprint(rest: &[u8], key: &[u8]) -> Option<u64> {
    let n = u32::from_le_bytes(rest.get(..4)?.try_into().ok()?) as usize;
    let fwidth = *rest.get(4)? as usize;
    let vwidth = *rest.get(5)? as usize;
    if !(2..=8).contains(&fwidth) || vwidth == 0 || vwidth > 8 {
        return None;
    }
    let stride = fwidth + vwidth;
    let entries = rest.get(6..6 + n * stride)?;
    let want = hash64(key) & fingerprint_mask(fwidth);

    let mut lo = 0usize;
    let mut hi = n;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let at = mid * stride;
        match read_le(entries.get(at..at + fwidth)?).cmp(&want) {
            Ordering::Less => lo = mid + 1,
            Ordering::Greater => hi = mid,
            Ordering::Equal => return Some(read_le(entries.get(at + fwidth..at + stride)?)),
        }
    }
    None
}

fn read_le(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&[u8], u64)]) -> HashMap<Vec<u8>, u64> {
        pairs.iter().map(|(k, v)| (k.to_vec(), *v)).collect()
    }

    #[test]
    fn exact_mode_retrieves_and_rejects() {
        let map = entries(&[(b"gol1", 1), (b"gol2", 2), (b"bac1", 3)]);
        let blob = approx(&map, 2, 0);
        assert_eq!(get_num(&blob, b"gol1"), 1);
        assert_eq!(get_num(&blob, b"gol2"), 2);
        assert_eq!(get_num(&blob, b"bac1"), 3);
        assert_eq!(get_num(&blob, b"gol3"), 0);
        assert_eq!(get_num(&blob, b""), 0);
    }

    #[test]
    fn fingerprint_mode_retrieves_members() {
        let map = entries(&[(b"gol", 7), (b"bac", 1), (b"rus", 260)]);
        for fp in [2u8, 3, 8, 10] {
            let blob = approx(&map, 4, fp);
            assert_eq!(get_num(&blob, b"gol"), 7);
            assert_eq!(get_num(&blob, b"bac"), 1);
            assert_eq!(get_num(&blob, b"rus"), 260);
        }
    }

    #[test]
    fn fingerprint_false_positives_stay_bounded() {
        let map = entries(&[(b"gol", 1), (b"bac", 2), (b"rus", 3)]);
        let blob = approx(&map, 2, 3);
        let mut hits = 0usize;
        for i in 0..10_000u32 {
            let probe = format!("absent-{i}");
            if get_num(&blob, probe.as_bytes()) != 0 {
                hits += 1;
            }
        }
        // 24-bit fingerprints over 3 entries: expected hits well below 1
        assert!(hits < 50, "false positive rate too high: {hits}/10000");
    }

    #[test]
    fn wide_values_survive_truncation_rules() {
        let map = entries(&[(b"big", u64::from(u32::MAX) + 17)]);
        let blob = approx(&map, 1, 4);
        assert_eq!(get_num(&blob, b"big"), u64::from(u32::MAX) + 17);
    }

    #[test]
    fn empty_filters_answer_zero() {
        let blob = approx(&HashMap::new(), 0, 0);
        assert_eq!(get_num(&blob, b"any"), 0);
        let blob = approx(&HashMap::new(), 0, 3);
        assert_eq!(get_num(&blob, b"any"), 0);
        assert_eq!(get_num(&[], b"any"), 0);
        assert_eq!(get_num(&[7], b"any"), 0);
    }
}
