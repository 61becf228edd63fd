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

//! Tuples are written element by element with no framing of their own.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::Serializer;

macro_rules! impl_tuple_serializer {
    ($($name:ident => $index:tt),+) => {
        impl<$($name: Serializer),+> Serializer for ($($name,)+) {
            #[inline(always)]
            fn keepsake_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
                $(self.$index.keepsake_write(context)?;)+
                Ok(())
            }

            #[inline(always)]
            fn keepsake_read_data(context: &mut ReadContext) -> Result<Self, Error> {
                Ok(($($name::keepsake_read(context)?,)+))
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }
    };
}

impl_tuple_serializer!(T0 => 0);
impl_tuple_serializer!(T0 => 0, T1 => 1);
impl_tuple_serializer!(T0 => 0, T1 => 1, T2 => 2);
impl_tuple_serializer!(T0 => 0, T1 => 1, T2 => 2, T3 => 3);
