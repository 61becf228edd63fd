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
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::rc::write_shared;
use crate::serializer::{Pointee, Serializer};
use crate::types::RefFlag;
use std::sync::Arc;

/// Shared pointers are tracked by the address of their allocation: the first
/// occurrence writes the pointee, later ones a back-reference.
impl<T: ?Sized + Pointee> Serializer for Arc<T> {
    fn keepsake_write(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_shared(&**self, false, context)
    }

    fn keepsake_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        self.keepsake_write(context)
    }

    fn keepsake_read(context: &mut ReadContext) -> Result<Self, Error> {
        let offset = context.reader.get_cursor();
        let ref_flag = RefFlag::from_byte(context.reader.read_i8()?, offset)?;
        match ref_flag {
            RefFlag::Ref => {
                let ordinal = context.reader.read_varuint32()?;
                context.ref_reader.get_arc::<T>(ordinal, offset)
            }
            RefFlag::RefValue => {
                let ordinal = context.ref_reader.reserve();
                T::keepsake_read_arc(context, ordinal)
            }
            RefFlag::Null | RefFlag::NotNullValue => Err(Error::invalid_data(format!(
                "Unexpected reference flag {:?} for `Arc<{}>` at offset {}",
                ref_flag,
                std::any::type_name::<T>(),
                offset
            ))),
        }
    }

    fn keepsake_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        Self::keepsake_read(context)
    }

    fn keepsake_writes_ref_flag() -> bool {
        true
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
