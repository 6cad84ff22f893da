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

use std::error::Error;
use std::fmt::{self, Display};

/// Typed errors returned by index building and (de)serialization.
#[derive(Debug)]
pub enum IndexError {
    /// Records without inline words were supplied and no getter was given.
    NilGetter,
    /// A primary key's length differed from the first observed length.
    NonuniformKeySize,
    /// A serialized shard carried an unknown format version.
    FormatVersionMismatch,
    /// Fallback for other textual errors.
    Other(String),
}

impl Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::NilGetter => write!(f, "nil getter"),
            IndexError::NonuniformKeySize => write!(f, "nonuniform primary key size"),
            IndexError::FormatVersionMismatch => write!(f, "format version mismatch"),
            IndexError::Other(s) => write!(f, "error: {}", s),
        }
    }
}

impl Error for IndexError {}

impl From<serde_json::Error> for IndexError {
    fn from(e: serde_json::Error) -> Self {
        IndexError::Other(e.to_string())
    }
}
