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

//! `RefCell<T>` is transparent on the wire: it writes whatever `T` writes.
//!
//! This is what makes `Rc<RefCell<T>>` graphs with back-pointers
//! ([`RcWeak`](crate::serializer::weak::RcWeak)) serializable.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::Serializer;
use std::cell::RefCell;

impl<T: Serializer> Serializer for RefCell<T> {
    fn keepsake_write(&self, context: &mut WriteContext) -> Result<(), Error> {
        let value = self.try_borrow().map_err(|_| {
            Error::not_allowed(format!(
                "`RefCell<{}>` is mutably borrowed while being serialized",
                std::any::type_name::<T>()
            ))
        })?;
        value.keepsake_write(context)
    }

    fn keepsake_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        self.keepsake_write(context)
    }

    fn keepsake_read(context: &mut ReadContext) -> Result<Self, Error> {
        Ok(RefCell::new(T::keepsake_read(context)?))
    }

    fn keepsake_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        Self::keepsake_read(context)
    }

    fn keepsake_writes_ref_flag() -> bool {
        T::keepsake_writes_ref_flag()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
