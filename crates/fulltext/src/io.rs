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

use crate::error::IndexError;
use crate::index::Index;
use crate::types::{Shard, FORMAT_VERSION};

impl Index {
    /// Serialize the shard vector to JSON.
    pub fn serialize(&self) -> Result<Vec<u8>, IndexError> {
        Ok(serde_json::to_vec(&self.shards)?)
    }

    /// Replace this index's shards with the ones parsed from `data`.
    /// Rejects the whole blob (leaving `self` untouched) if any shard
    /// carries version 0 or a version newer than this build understands.
    pub fn deserialize(&mut self, data: &[u8]) -> Result<(), IndexError> {
        let shards: Vec<Shard> = serde_json::from_slice(data)?;
        if shards
            .iter()
            .any(|s| s.version == 0 || s.version > FORMAT_VERSION)
        {
            return Err(IndexError::FormatVersionMismatch);
        }
        self.shards = shards;
        Ok(())
    }
}
