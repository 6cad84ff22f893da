use anyhow::Result;
use fulltext::{build_index, Index, IndexError, RecordValue};
use std::collections::{HashMap, HashSet};

fn records(entries: &[(&str, &[&str])]) -> HashMap<String, RecordValue> {
    entries
        .iter()
        .map(|(pk, words)| (pk.to_string(), RecordValue::from(words.to_vec())))
        .collect()
}

fn lookup_set(idx: &Index, word: &str, exact: bool) -> HashSet<String> {
    let mut out = HashSet::new();
    idx.lookup(word, exact, true).visit(|pk| {
        out.insert(pk.to_string());
        true
    });
    out
}

/// Approximate filter built from string-keyed pairs, for handcrafting
/// shard records through the public backend API.
fn filter_of(pairs: &[(&str, u64)], logrows: u64, fp: u8) -> Vec<u8> {
    let map: HashMap<Vec<u8>, u64> = pairs
        .iter()
        .map(|(k, v)| (k.as_bytes().to_vec(), *v))
        .collect();
    kvfilter::approx(&map, logrows, fp)
}

fn pk_table(keys: &[&str]) -> Vec<u8> {
    let rows: HashMap<u64, Vec<u8>> = keys
        .iter()
        .enumerate()
        .map(|(i, k)| (i as u64 + 1, k.as_bytes().to_vec()))
        .collect();
    kvfilter::perfect(&rows, keys.first().map(|k| k.len() * 8).unwrap_or(0) as u64)
}

#[test]
fn roundtrip_preserves_answers() -> Result<()> {
    let idx = build_index(records(&[
        ("user:1", &["golang", "programming", "backend"]),
        ("user:2", &["golang", "web", "frontend"]),
        ("user:3", &["rust", "systems", "backend"]),
    ]))?;
    let bytes = idx.serialize()?;
    assert_ne!(bytes, Index::default().serialize()?);

    let mut restored = Index::default();
    restored.deserialize(&bytes)?;
    assert_eq!(restored.shard_count(), idx.shard_count());
    for (word, exact) in [
        ("golang", true),
        ("backend", true),
        ("nonexistent", true),
        ("lan", false),
    ] {
        assert_eq!(
            lookup_set(&restored, word, exact),
            lookup_set(&idx, word, exact),
            "query {word}"
        );
    }
    Ok(())
}

#[test]
fn version_gate_rejects_unknown_formats() -> Result<()> {
    let mut idx = build_index(records(&[("user:1", &["golang"])]))?;
    for bad_version in [0u8, 3] {
        let blob = serde_json::json!([{
            "version": bad_version,
            "pk": [],
            "buckets": [],
            "pkbits": 0,
            "rows": 0,
            "logrows": 0,
            "maxword": 0,
        }]);
        let err = idx
            .deserialize(blob.to_string().as_bytes())
            .expect_err("unknown version must be rejected");
        assert!(matches!(err, IndexError::FormatVersionMismatch));
    }
    // a rejected blob must not disturb the existing shards
    assert_eq!(lookup_set(&idx, "golang", true), {
        let mut s = HashSet::new();
        s.insert("user:1".to_string());
        s
    });
    Ok(())
}

#[test]
fn garbage_bytes_are_an_error() {
    let mut idx = Index::default();
    assert!(idx.deserialize(b"not json").is_err());
}

#[test]
fn version1_records_answer_version1_keying() -> Result<()> {
    // One record "doc:1" holding the word "hello", laid out the way the
    // first format did it: counts live inside the positions filter under
    // the reserved ordinal-0 suffix, one bucket per n-gram start.
    let blob = serde_json::json!([{
        "version": 1,
        "pk": pk_table(&["doc:1"]),
        "buckets": [
            filter_of(&[("hel1", 1), ("hel0", 1)], 1, 10),
            filter_of(&[("ell1", 1), ("ell0", 1)], 1, 10),
            filter_of(&[("llo1", 1), ("llo0", 1)], 1, 10),
        ],
        "pkbits": 40,
        "rows": 1,
        "logrows": 1,
        "maxword": 5,
    }]);
    let mut idx = Index::default();
    idx.deserialize(blob.to_string().as_bytes())?;

    let one: HashSet<String> = ["doc:1".to_string()].into_iter().collect();
    assert_eq!(lookup_set(&idx, "hello", true), one);
    assert_eq!(lookup_set(&idx, "llo", false), one);
    assert!(lookup_set(&idx, "xyz", false).is_empty());
    Ok(())
}

#[test]
fn oversized_counts_are_treated_as_false_positives() -> Result<()> {
    // Shard 1 claims nine occurrences of "hel" over a single row; the
    // lookup must discard the term instead of probing garbage. Shard 2 is
    // the healthy control.
    let blob = serde_json::json!([
        {
            "version": 2,
            "pk": pk_table(&["doc:1"]),
            "buckets": [filter_of(&[("hel1", 1)], 1, 0)],
            "counts": [filter_of(&[("hel", 9)], 1, 3)],
            "pkbits": 40,
            "rows": 1,
            "logrows": 1,
            "maxword": 3,
            "minword": 3,
        },
        {
            "version": 2,
            "pk": pk_table(&["doc:2"]),
            "buckets": [filter_of(&[("wor1", 1)], 1, 0)],
            "counts": [filter_of(&[("wor", 1)], 1, 3)],
            "pkbits": 40,
            "rows": 1,
            "logrows": 1,
            "maxword": 3,
            "minword": 3,
        },
    ]);
    let mut idx = Index::default();
    idx.deserialize(blob.to_string().as_bytes())?;

    assert!(lookup_set(&idx, "hel", true).is_empty());
    let two: HashSet<String> = ["doc:2".to_string()].into_iter().collect();
    assert_eq!(lookup_set(&idx, "wor", true), two);
    Ok(())
}
