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

//! Compact key-value filter blobs.
//!
//! Two families of structures, both serialized as self-describing byte
//! blobs so they can be embedded in larger persisted records:
//!
//! - a *perfect table* ([`perfect`] / [`get_bytes`]) mapping a dense 1-based
//!   ordinal to a byte string, with exact recovery;
//! - an *approximate filter* ([`approx`] / [`get_num`]) mapping arbitrary
//!   byte keys to numbers. With `fp_functions == 0` the filter keeps full
//!   keys and answers exactly; with `fp_functions > 0` it keeps truncated
//!   fingerprints and trades a bounded false-positive rate for space.
//!
//! Absent keys answer `0`, so callers reserve `0` as the "not present"
//! value. All multi-byte integers are little-endian; the key hash is pinned
//! in [`hash`] because it is part of the blob format.

mod filter;
mod hash;
mod table;

pub use filter::{approx, get_num};
pub use table::{get_bytes, perfect};
