//! Perfect ordinal -> byte-string tables.
//!
//! Layout (fixed width, `keybits > 0`):
//!   `[mode: u8 = 0][rows: u32][width: u16][rows * width bytes]`
//! Layout (variable width, `keybits == 0`):
//!   `[mode: u8 = 1][rows: u32][offsets: (rows + 1) * u32][heap]`

use std::collections::HashMap;

const FIXED: u8 = 0;
const VARIABLE: u8 = 1;

/// Build a perfect lookup table from a dense 1-based ordinal map.
///
/// `keybits > 0` selects the fixed-width layout with `keybits / 8` bytes
/// per row; entries shorter than the width are zero-padded, longer ones
/// truncated. `keybits == 0` selects the variable-width layout.
pub fn perfect(rows: &HashMap<u64, Vec<u8>>, keybits: u64) -> Vec<u8> {
    let n = rows.len() as u32;
    if keybits > 0 {
        let width = (keybits / 8) as usize;
        let mut blob = Vec::with_capacity(7 + n as usize * width);
        blob.push(FIXED);
        blob.extend_from_slice(&n.to_le_bytes());
        blob.extend_from_slice(&(width as u16).to_le_bytes());
        for ordinal in 1..=n as u64 {
            match rows.get(&ordinal) {
                Some(bytes) => {
                    let take = bytes.len().min(width);
                    blob.extend_from_slice(&bytes[..take]);
                    blob.resize(blob.len() + width - take, 0);
                }
                None => blob.resize(blob.len() + width, 0),
            }
        }
        blob
    } else {
        let mut offsets: Vec<u32> = Vec::with_capacity(n as usize + 1);
        let mut heap: Vec<u8> = Vec::new();
        offsets.push(0);
        for ordinal in 1..=n as u64 {
            if let Some(bytes) = rows.get(&ordinal) {
                heap.extend_from_slice(bytes);
            }
            offsets.push(heap.len() as u32);
        }
        let mut blob = Vec::with_capacity(5 + offsets.len() * 4 + heap.len());
        blob.push(VARIABLE);
        blob.extend_from_slice(&n.to_le_bytes());
        for off in offsets {
            blob.extend_from_slice(&off.to_le_bytes());
        }
        blob.extend_from_slice(&heap);
        blob
    }
}

/// Recover the bytes stored for `ordinal` (1-based). `None` outside
/// `1..=rows` or when the blob is malformed.
pub fn get_bytes(blob: &[u8], ordinal: u64) -> Option<&[u8]> {
    let (&mode, rest) = blob.split_first()?;
    let n = u32::from_le_bytes(rest.get(..4)?.try_into().ok()?) as u64;
    if ordinal == 0 || ordinal > n {
        return None;
    }
    let i = (ordinal - 1) as usize;
    match mode {
        FIXED => {
            let width = u16::from_le_bytes(rest.get(4..6)?.try_into().ok()?) as usize;
            let start = 6 + i * width;
            rest.get(start..start + width)
        }
        VARIABLE => {
            let table = rest.get(4..)?;
            let off = |k: usize| -> Option<usize> {
                Some(u32::from_le_bytes(table.get(k * 4..k * 4 + 4)?.try_into().ok()?) as usize)
            };
            let heap = table.get((n as usize + 1) * 4..)?;
            let (start, end) = (off(i)?, off(i + 1)?);
            if start > end {
                return None;
            }
            heap.get(start..end)
        }
        _ => None,
    }
}
