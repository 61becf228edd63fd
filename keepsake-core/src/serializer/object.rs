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

//! Record framing shared by every [`Object`]: `version:varuint32 body`.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::Object;

/// Writes the current version of `T` followed by its body.
#[inline]
pub fn write_object<T: Object>(value: &T, context: &mut WriteContext) -> Result<(), Error> {
    context.writer.write_varuint32(T::VERSION);
    value.keepsake_save(context)
}

/// Reads a recorded version and loads the body with the layout of that version.
///
/// Versions newer than `T::VERSION` fail with [`Error::Version`], records
/// nested deeper than `Config::max_depth` with [`Error::DepthExceed`].
#[inline]
pub fn read_object<T: Object>(context: &mut ReadContext) -> Result<T, Error> {
    let version = read_version::<T>(context)?;
    context.enter_object()?;
    let result = T::keepsake_load(context, version);
    context.leave_object();
    result
}

pub fn read_version<T: Object>(context: &mut ReadContext) -> Result<u32, Error> {
    let version = context.reader.read_varuint32()?;
    if version > T::VERSION {
        return Err(Error::version(
            std::any::type_name::<T>(),
            version,
            T::VERSION,
        ));
    }
    Ok(version)
}

/// Implements [`Serializer`](crate::serializer::Serializer) for a type with a
/// hand-written [`Object`] impl, framing it as a versioned record.
#[macro_export]
macro_rules! object_serializer {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::serializer::Serializer for $ty {
                fn keepsake_write_data(
                    &self,
                    context: &mut $crate::resolver::context::WriteContext,
                ) -> ::std::result::Result<(), $crate::error::Error> {
                    $crate::serializer::object::write_object(self, context)
                }

                fn keepsake_read_data(
                    context: &mut $crate::resolver::context::ReadContext,
                ) -> ::std::result::Result<Self, $crate::error::Error> {
                    $crate::serializer::object::read_object::<Self>(context)
                }

                fn as_any(&self) -> &dyn ::std::any::Any {
                    self
                }
            }
        )+
    };
}
