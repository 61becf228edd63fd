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

//! Per-archive tag interning.
//!
//! The first record of a type in an archive carries its tag as text, every
//! later record of the same type carries only the tag's archive-local index:
//!
//! ```text
//! varuint32((byte_len << 1) | 0) utf8-bytes   -- first occurrence
//! varuint32((index << 1) | 1)                 -- later occurrences
//! ```

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::type_resolver::{TypeInfo, TypeResolver};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct TagWriter {
    // keyed by the address of the registered `TypeInfo`, which is unique per tag
    written: HashMap<usize, u32>,
}

impl TagWriter {
    pub fn write(&mut self, writer: &mut Writer, type_info: &Arc<TypeInfo>) {
        let next_index = self.written.len() as u32;
        match self.written.entry(Arc::as_ptr(type_info) as usize) {
            Entry::Occupied(o) => {
                writer.write_varuint32((*o.get() << 1) | 1);
            }
            Entry::Vacant(v) => {
                v.insert(next_index);
                let tag = type_info.get_tag().as_bytes();
                writer.write_varuint32((tag.len() as u32) << 1);
                writer.write_bytes(tag);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }
}

#[derive(Default)]
pub struct TagReader {
    read: Vec<Arc<TypeInfo>>,
}

impl TagReader {
    /// Reads a tag and resolves it, failing closed on tags unknown to `type_resolver`.
    pub fn read(
        &mut self,
        reader: &mut Reader,
        type_resolver: &TypeResolver,
    ) -> Result<Arc<TypeInfo>, Error> {
        let offset = reader.get_cursor();
        let header = reader.read_varuint32()?;
        if header & 1 == 1 {
            let index = (header >> 1) as usize;
            return self.read.get(index).cloned().ok_or_else(|| {
                Error::invalid_data(format!(
                    "tag index {} at offset {} was never defined ({} tags so far)",
                    index,
                    offset,
                    self.read.len()
                ))
            });
        }
        let len = (header >> 1) as usize;
        let bytes = reader.read_bytes(len)?;
        let tag = std::str::from_utf8(bytes).map_err(|e| {
            Error::invalid_data(format!("malformed tag at offset {}: {}", offset, e))
        })?;
        let type_info = type_resolver.resolve(tag)?.clone();
        self.read.push(type_info.clone());
        Ok(type_info)
    }
}
