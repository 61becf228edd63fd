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

//! Length-prefixed sequences: `len:varuint32 element*`.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::Serializer;

pub fn write_collection_data<'a, T, I>(
    iter: I,
    context: &mut WriteContext,
) -> Result<(), Error>
where
    T: Serializer + 'a,
    I: ExactSizeIterator<Item = &'a T>,
{
    let len = u32::try_from(iter.len()).map_err(|_| {
        Error::not_allowed(format!("collection of {} elements is too long", iter.len()))
    })?;
    context.writer.write_varuint32(len);
    for item in iter {
        item.keepsake_write(context)?;
    }
    Ok(())
}

/// Reads a length prefix, capping the preallocation by the bytes left so a
/// corrupted length cannot trigger a huge allocation.
pub fn read_len(context: &mut ReadContext) -> Result<(usize, usize), Error> {
    let len = context.reader.read_varuint32()? as usize;
    let capacity = len.min(context.reader.remaining());
    Ok((len, capacity))
}

pub fn read_collection_data<C, T>(context: &mut ReadContext) -> Result<C, Error>
where
    T: Serializer,
    C: FromIterator<T>,
{
    let (len, _) = read_len(context)?;
    (0..len).map(|_| T::keepsake_read(context)).collect()
}
