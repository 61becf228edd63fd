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
use crate::serializer::Serializer;
use crate::types::RefFlag;

impl<T: Serializer> Serializer for Option<T> {
    fn keepsake_write(&self, context: &mut WriteContext) -> Result<(), Error> {
        match self {
            None => {
                context.writer.write_i8(RefFlag::Null.into());
                Ok(())
            }
            Some(value) => {
                // pointers start with their own non-null flag
                if !T::keepsake_writes_ref_flag() {
                    context.writer.write_i8(RefFlag::NotNullValue.into());
                }
                value.keepsake_write(context)
            }
        }
    }

    fn keepsake_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        self.keepsake_write(context)
    }

    fn keepsake_read(context: &mut ReadContext) -> Result<Self, Error> {
        let offset = context.reader.get_cursor();
        let ref_flag = RefFlag::from_byte(context.reader.peek_i8()?, offset)?;
        match ref_flag {
            RefFlag::Null => {
                context.reader.skip(1)?;
                Ok(None)
            }
            _ if T::keepsake_writes_ref_flag() => Ok(Some(T::keepsake_read(context)?)),
            RefFlag::NotNullValue => {
                context.reader.skip(1)?;
                Ok(Some(T::keepsake_read(context)?))
            }
            _ => Err(Error::invalid_data(format!(
                "Unexpected reference flag {:?} for `Option<{}>` at offset {}",
                ref_flag,
                std::any::type_name::<T>(),
                offset
            ))),
        }
    }

    fn keepsake_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        Self::keepsake_read(context)
    }

    fn keepsake_is_none(&self) -> bool {
        self.is_none()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
