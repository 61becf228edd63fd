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
use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;

use super::collection::{read_collection_data, write_collection_data};

impl<T: Serializer + Eq + Hash> Serializer for HashSet<T> {
    fn keepsake_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_collection_data(self.iter(), context)
    }

    fn keepsake_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        read_collection_data(context)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl<T: Serializer + Ord> Serializer for BTreeSet<T> {
    fn keepsake_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_collection_data(self.iter(), context)
    }

    fn keepsake_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        read_collection_data(context)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
