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
use crate::config::Config;
use crate::error::Error;
use crate::resolver::ref_resolver::{RefReader, RefWriter};
use crate::resolver::tag_resolver::{TagReader, TagWriter};
use crate::resolver::type_resolver::TypeResolver;
use std::any::Any;

/// Encode-side archive handle, owned by a single `serialize` call.
pub struct WriteContext<'a> {
    pub writer: Writer,
    type_resolver: &'a TypeResolver,
    pub ref_writer: RefWriter,
    tag_writer: TagWriter,
}

impl<'a> WriteContext<'a> {
    pub fn new(type_resolver: &'a TypeResolver, writer: Writer) -> WriteContext<'a> {
        WriteContext {
            writer,
            type_resolver,
            ref_writer: RefWriter::new(),
            tag_writer: TagWriter::default(),
        }
    }

    pub fn get_type_resolver(&self) -> &'a TypeResolver {
        self.type_resolver
    }

    /// Writes a tagged object record for a value reached through a trait object.
    ///
    /// The concrete type of `value` must be registered; `type_name` is only
    /// used to name it in the error.
    pub fn write_polymorphic(&mut self, value: &dyn Any, type_name: &str) -> Result<(), Error> {
        let type_resolver = self.type_resolver;
        let type_info = type_resolver
            .get_type_info(&value.type_id())
            .map_err(|_| Error::unregistered_type(type_name.to_owned()))?;
        self.tag_writer.write(&mut self.writer, type_info);
        self.writer.write_varuint32(type_info.get_version());
        tracing::trace!(
            tag = type_info.get_tag(),
            version = type_info.get_version(),
            "write polymorphic record"
        );
        (type_info.get_harness().get_saver())(value, self)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_bytes()
    }
}

/// Decode-side archive handle, owned by a single `deserialize` call.
pub struct ReadContext<'a, 'bf> {
    pub reader: Reader<'bf>,
    type_resolver: &'a TypeResolver,
    pub ref_reader: RefReader,
    tag_reader: TagReader,
    max_dyn_depth: u32,
    max_depth: u32,
    current_depth: u32,
    object_depth: u32,
}

impl<'a, 'bf> ReadContext<'a, 'bf> {
    pub fn new(
        type_resolver: &'a TypeResolver,
        reader: Reader<'bf>,
        config: &Config,
    ) -> ReadContext<'a, 'bf> {
        ReadContext {
            reader,
            type_resolver,
            ref_reader: RefReader::new(),
            tag_reader: TagReader::default(),
            max_dyn_depth: config.max_dyn_depth(),
            max_depth: config.max_depth(),
            current_depth: 0,
            object_depth: 0,
        }
    }

    pub fn get_type_resolver(&self) -> &'a TypeResolver {
        self.type_resolver
    }

    /// Reads a tagged object record and constructs the concrete object it names.
    pub fn read_polymorphic(&mut self) -> Result<Box<dyn Any>, Error> {
        let type_resolver = self.type_resolver;
        let type_info = self.tag_reader.read(&mut self.reader, type_resolver)?;
        let version = self.reader.read_varuint32()?;
        if version > type_info.get_version() {
            return Err(Error::version(
                type_info.get_type_name(),
                version,
                type_info.get_version(),
            ));
        }
        tracing::trace!(tag = type_info.get_tag(), version, "read polymorphic record");
        self.inc_depth()?;
        self.enter_object()?;
        let result = (type_info.get_harness().get_loader())(self, version);
        self.leave_object();
        self.dec_depth();
        result
    }

    pub fn inc_depth(&mut self) -> Result<(), Error> {
        self.current_depth += 1;
        if self.current_depth > self.max_dyn_depth {
            return Err(Error::depth_exceed(format!(
                "Maximum polymorphic nesting depth ({}) exceeded at offset {}. \
                 Consider increasing max_dyn_depth if this is expected.",
                self.max_dyn_depth,
                self.reader.get_cursor()
            )));
        }
        Ok(())
    }

    pub fn dec_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }

    /// Counts one more open object record, tagged or not.
    ///
    /// Every record nests through a Rust call, so this bounds the decoder's
    /// stack use on input nested through concrete recursive types.
    pub fn enter_object(&mut self) -> Result<(), Error> {
        self.object_depth += 1;
        if self.object_depth > self.max_depth {
            return Err(Error::depth_exceed(format!(
                "Maximum object nesting depth ({}) exceeded at offset {}. \
                 Consider increasing max_depth if this is expected.",
                self.max_depth,
                self.reader.get_cursor()
            )));
        }
        Ok(())
    }

    pub fn leave_object(&mut self) {
        self.object_depth = self.object_depth.saturating_sub(1);
    }
}
