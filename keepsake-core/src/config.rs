// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

/// Configuration for Keepsake archives.
///
/// Owned by [`crate::Keepsake`]. Each `deserialize` call hands the depth
/// limits to its `ReadContext`; `serialize` reads `initial_buffer_size`.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum nesting depth of polymorphic records while decoding.
    pub max_dyn_depth: u32,
    /// Maximum nesting depth of object records of any kind while decoding.
    pub max_depth: u32,
    /// Whether bytes left after the root record are an error.
    pub check_trailing: bool,
    /// Capacity reserved for the output buffer of each `serialize` call.
    pub initial_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_dyn_depth: 16,
            max_depth: 256,
            check_trailing: true,
            initial_buffer_size: 64,
        }
    }
}

impl Config {
    /// Creates a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get maximum dynamic depth.
    #[inline(always)]
    pub fn max_dyn_depth(&self) -> u32 {
        self.max_dyn_depth
    }

    /// Get maximum object depth.
    #[inline(always)]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}
