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

use crate::error::Error;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Leading byte of every record written at a pointer site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(i8)]
pub enum RefFlag {
    // Absent pointer: `None`, or a weak pointer whose target is gone.
    Null = -3,
    // Back-reference; followed by the ordinal of an object already in the archive.
    Ref = -2,
    // Not-null value that never takes part in identity tracking (`Box`, `Option<T>`).
    NotNullValue = -1,
    // First occurrence of a shared object; it takes the next ordinal.
    RefValue = 0,
}

impl RefFlag {
    pub fn from_byte(value: i8, offset: usize) -> Result<RefFlag, Error> {
        RefFlag::try_from(value).map_err(|_| {
            Error::invalid_data(format!(
                "Invalid reference flag {} at offset {}",
                value, offset
            ))
        })
    }
}

/// First bytes of every archive, "KS" read as a little-endian u16.
pub const MAGIC_NUMBER: u16 = 0x534B;

/// Version of the archive envelope (header + record framing), not of user types.
pub const FORMAT_VERSION: u8 = 1;

/// Ordinal of the first object in an archive. Zero is never assigned.
pub const FIRST_ORDINAL: u32 = 1;

pub mod config_flags {
    pub const IS_LITTLE_ENDIAN_FLAG: u8 = 1 << 0;
    /// Every flag bit this version understands; archives setting others are rejected.
    pub const KNOWN_FLAGS: u8 = IS_LITTLE_ENDIAN_FLAG;
}

/// Header bytes: magic number, format version and flags.
pub const SIZE_OF_HEAD: usize = 4;
