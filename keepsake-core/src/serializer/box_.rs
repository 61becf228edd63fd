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
use crate::serializer::{Pointee, Serializer};
use crate::types::RefFlag;

/// Boxes own their pointee, so they never alias and take no ordinal.
impl<T: ?Sized + Pointee> Serializer for Box<T> {
    fn keepsake_write(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.writer.write_i8(RefFlag::NotNullValue.into());
        T::keepsake_write_pointee(&**self, context)
    }

    fn keepsake_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        self.keepsake_write(context)
    }

    fn keepsake_read(context: &mut ReadContext) -> Result<Self, Error> {
        let offset = context.reader.get_cursor();
        let ref_flag = RefFlag::from_byte(context.reader.read_i8()?, offset)?;
        if ref_flag != RefFlag::NotNullValue {
            return Err(Error::invalid_data(format!(
                "Unexpected reference flag {:?} for `Box<{}>` at offset {}",
                ref_flag,
                std::any::type_name::<T>(),
                offset
            )));
        }
        T::keepsake_read_box(context)
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
