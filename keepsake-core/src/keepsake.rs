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
use crate::ensure;
use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::type_resolver::TypeResolver;
use crate::serializer::{Object, Serializer};
use crate::types::config_flags::{IS_LITTLE_ENDIAN_FLAG, KNOWN_FLAGS};
use crate::types::{FORMAT_VERSION, MAGIC_NUMBER, SIZE_OF_HEAD};

/// The archive engine: a type registry plus the configuration every archive
/// operation runs with.
///
/// Types are registered through `&mut self` before any archive operation;
/// `serialize` and `deserialize` take `&self`, so once set up a `Keepsake` can
/// be shared across threads (`Arc<Keepsake>`) and used concurrently. Every call
/// builds its own archive handle, so identity tables never leak between calls.
///
/// # Examples
///
/// ```rust, ignore
/// use keepsake::{Keepsake, KeepsakeObject};
///
/// #[derive(KeepsakeObject, Debug, PartialEq)]
/// struct Note {
///     text: String,
/// }
///
/// let mut keepsake = Keepsake::default();
/// keepsake.register::<Note>("note").unwrap();
///
/// let note = Note { text: "China, good luck".to_string() };
/// let bytes = keepsake.serialize(&note).unwrap();
/// let loaded: Note = keepsake.deserialize(&bytes).unwrap();
/// assert_eq!(note, loaded);
/// ```
///
/// Custom configuration:
///
/// ```rust
/// use keepsake_core::Keepsake;
///
/// let keepsake = Keepsake::default()
///     .max_dyn_depth(64)
///     .max_depth(1024)
///     .check_trailing(false);
/// assert_eq!(keepsake.get_config().max_dyn_depth(), 64);
/// assert_eq!(keepsake.get_config().max_depth(), 1024);
/// ```
#[derive(Default)]
pub struct Keepsake {
    config: Config,
    type_resolver: TypeResolver,
}

impl Keepsake {
    pub fn new(config: Config) -> Self {
        Keepsake {
            config,
            type_resolver: TypeResolver::default(),
        }
    }

    /// Sets the maximum nesting depth of polymorphic records accepted while
    /// decoding. Deeper input fails with [`Error::DepthExceed`].
    ///
    /// The default value is `16`.
    pub fn max_dyn_depth(mut self, max_dyn_depth: u32) -> Self {
        self.config.max_dyn_depth = max_dyn_depth;
        self
    }

    /// Sets the maximum nesting depth of object records of any kind accepted
    /// while decoding, e.g. the length of an `Option<Box<Node>>` chain. Deeper
    /// input fails with [`Error::DepthExceed`] instead of exhausting the stack.
    ///
    /// The default value is `256`.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Whether bytes left after the root record make `deserialize` fail.
    ///
    /// The default value is `true`.
    pub fn check_trailing(mut self, check_trailing: bool) -> Self {
        self.config.check_trailing = check_trailing;
        self
    }

    pub fn get_config(&self) -> &Config {
        &self.config
    }

    pub fn get_type_resolver(&self) -> &TypeResolver {
        &self.type_resolver
    }

    /// Binds a stable tag to `T`, making it writable through trait objects and
    /// readable from any archive that names the tag.
    ///
    /// Registering the same type under the same tag again is a no-op; reusing
    /// either half of the pair for something else fails with
    /// [`Error::Registration`].
    ///
    /// # Examples
    ///
    /// ```rust, ignore
    /// let mut keepsake = Keepsake::default();
    /// keepsake.register::<Note>("note")?;
    /// ```
    pub fn register<T: Object>(&mut self, tag: &str) -> Result<(), Error> {
        self.type_resolver.register::<T>(tag)
    }

    /// Encodes the graph reachable from `record` into a new archive.
    pub fn serialize<T: Serializer>(&self, record: &T) -> Result<Vec<u8>, Error> {
        let writer = Writer::with_capacity(self.config.initial_buffer_size);
        let mut context = WriteContext::new(&self.type_resolver, writer);
        self.write_head(&mut context.writer);
        record.keepsake_write(&mut context)?;
        tracing::debug!(
            root = std::any::type_name::<T>(),
            bytes = context.writer.len(),
            objects = context.ref_writer.len(),
            "archive written"
        );
        Ok(context.into_bytes())
    }

    /// Decodes an archive written by [`Keepsake::serialize`] for the same `T`.
    ///
    /// All or nothing: any error aborts the whole call and nothing partially
    /// decoded is returned.
    pub fn deserialize<T: Serializer>(&self, bf: &[u8]) -> Result<T, Error> {
        let mut reader = Reader::new(bf);
        self.read_head(&mut reader)?;
        let mut context = ReadContext::new(&self.type_resolver, reader, &self.config);
        let result = T::keepsake_read(&mut context)?;
        context.ref_reader.resolve_callbacks()?;
        if self.config.check_trailing {
            let remaining = context.reader.remaining();
            ensure!(
                remaining == 0,
                Error::invalid_data(format!(
                    "{} trailing bytes after the root record at offset {}",
                    remaining,
                    context.reader.get_cursor()
                ))
            );
        }
        tracing::debug!(
            root = std::any::type_name::<T>(),
            bytes = bf.len(),
            objects = context.ref_reader.len(),
            "archive read"
        );
        Ok(result)
    }

    fn write_head(&self, writer: &mut Writer) {
        writer.reserve(SIZE_OF_HEAD);
        writer.write_u16(MAGIC_NUMBER);
        writer.write_u8(FORMAT_VERSION);
        writer.write_u8(IS_LITTLE_ENDIAN_FLAG);
    }

    fn read_head(&self, reader: &mut Reader) -> Result<(), Error> {
        let magic_number = reader.read_u16()?;
        ensure!(
            magic_number == MAGIC_NUMBER,
            Error::invalid_data(format!(
                "An archive must start with magic number {:#06X}, found {:#06X}. \
                 Please check that the data was written by Keepsake and is not corrupted.",
                MAGIC_NUMBER, magic_number
            ))
        );
        let format_version = reader.read_u8()?;
        ensure!(
            format_version == FORMAT_VERSION,
            Error::invalid_data(format!(
                "Unsupported archive format version {}, expected {}",
                format_version, FORMAT_VERSION
            ))
        );
        let bitmap = reader.read_u8()?;
        ensure!(
            bitmap & !KNOWN_FLAGS == 0,
            Error::invalid_data(format!("Unknown header flags {:#04X}", bitmap))
        );
        ensure!(
            bitmap & IS_LITTLE_ENDIAN_FLAG != 0,
            Error::invalid_data("Big endian archives are not supported")
        );
        Ok(())
    }
}
