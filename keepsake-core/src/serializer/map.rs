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

//! Maps: `len:varuint32 (key value)*`, in iteration order.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::Serializer;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use super::collection::read_len;

fn write_map_data<'a, K, V, I>(iter: I, context: &mut WriteContext) -> Result<(), Error>
where
    K: Serializer + 'a,
    V: Serializer + 'a,
    I: ExactSizeIterator<Item = (&'a K, &'a V)>,
{
    let len = u32::try_from(iter.len())
        .map_err(|_| Error::not_allowed(format!("map of {} entries is too long", iter.len())))?;
    context.writer.write_varuint32(len);
    for (key, value) in iter {
        key.keepsake_write(context)?;
        value.keepsake_write(context)?;
    }
    Ok(())
}

fn read_map_data<K, V, M>(context: &mut ReadContext) -> Result<M, Error>
where
    K: Serializer,
    V: Serializer,
    M: FromIterator<(K, V)>,
{
    let (len, _) = read_len(context)?;
    (0..len)
        .map(|_| {
            let key = K::keepsake_read(context)?;
            let value = V::keepsake_read(context)?;
            Ok((key, value))
        })
        .collect()
}

impl<K: Serializer + Eq + Hash, V: Serializer> Serializer for HashMap<K, V> {
    fn keepsake_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_map_data(self.iter(), context)
    }

    fn keepsake_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        read_map_data(context)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl<K: Serializer + Ord, V: Serializer> Serializer for BTreeMap<K, V> {
    fn keepsake_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_map_data(self.iter(), context)
    }

    fn keepsake_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        read_map_data(context)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
