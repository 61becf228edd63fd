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

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::context::ReadContext;
use crate::resolver::context::WriteContext;
use crate::serializer::Serializer;

macro_rules! impl_num_serializer {
    ($ty:ty, $writer:expr, $reader:expr) => {
        impl Serializer for $ty {
            #[inline(always)]
            fn keepsake_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
                $writer(&mut context.writer, *self);
                Ok(())
            }

            #[inline(always)]
            fn keepsake_read_data(context: &mut ReadContext) -> Result<Self, Error> {
                $reader(&mut context.reader)
            }

            #[inline(always)]
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }
    };
}

impl_num_serializer!(i8, Writer::write_i8, Reader::read_i8);
impl_num_serializer!(i16, Writer::write_i16, Reader::read_i16);
impl_num_serializer!(i32, Writer::write_varint32, Reader::read_varint32);
impl_num_serializer!(i64, Writer::write_varint64, Reader::read_varint64);
impl_num_serializer!(u8, Writer::write_u8, Reader::read_u8);
impl_num_serializer!(u16, Writer::write_u16, Reader::read_u16);
impl_num_serializer!(u32, Writer::write_varuint32, Reader::read_varuint32);
impl_num_serializer!(u64, Writer::write_varuint64, Reader::read_varuint64);
impl_num_serializer!(f32, Writer::write_f32, Reader::read_f32);
impl_num_serializer!(f64, Writer::write_f64, Reader::read_f64);

impl Serializer for usize {
    fn keepsake_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.writer.write_varuint64(*self as u64);
        Ok(())
    }

    fn keepsake_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        let value = context.reader.read_varuint64()?;
        usize::try_from(value).map_err(|_| {
            Error::invalid_data(format!("{} does not fit in usize on this platform", value))
        })
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
