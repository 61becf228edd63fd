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

//! Tag registry for polymorphic types.
//!
//! A tag is the wire-stable name of a concrete type. Tags are chosen by the
//! author at registration time and must stay constant across builds, so old
//! archives remain readable; Rust's own `TypeId` is never written.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::Object;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Writes the body (base record and own fields) of a type-erased object.
pub type SaveFn = fn(&dyn Any, &mut WriteContext) -> Result<(), Error>;
/// Constructs an object from a body written under the given version.
pub type LoadFn = fn(&mut ReadContext, u32) -> Result<Box<dyn Any>, Error>;

fn save_any<T: Object>(value: &dyn Any, context: &mut WriteContext) -> Result<(), Error> {
    match value.downcast_ref::<T>() {
        Some(value) => value.keepsake_save(context),
        None => Err(Error::type_mismatch(format!(
            "registered saver for `{}` received another type",
            std::any::type_name::<T>()
        ))),
    }
}

fn load_any<T: Object>(context: &mut ReadContext, version: u32) -> Result<Box<dyn Any>, Error> {
    Ok(Box::new(T::keepsake_load(context, version)?))
}

/// The pair of procedures bound to a registered type.
#[derive(Clone, Copy)]
pub struct Harness {
    saver: SaveFn,
    loader: LoadFn,
}

impl Harness {
    pub fn new(saver: SaveFn, loader: LoadFn) -> Harness {
        Harness { saver, loader }
    }

    pub fn get_saver(&self) -> SaveFn {
        self.saver
    }

    pub fn get_loader(&self) -> LoadFn {
        self.loader
    }
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness").finish_non_exhaustive()
    }
}

/// Everything the registry knows about one concrete type.
#[derive(Clone, Debug)]
pub struct TypeInfo {
    tag: String,
    type_id: std::any::TypeId,
    type_name: &'static str,
    version: u32,
    harness: Harness,
}

impl TypeInfo {
    pub fn new<T: Object>(tag: &str) -> TypeInfo {
        TypeInfo {
            tag: tag.to_owned(),
            type_id: std::any::TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            version: T::VERSION,
            harness: Harness::new(save_any::<T>, load_any::<T>),
        }
    }

    pub fn get_tag(&self) -> &str {
        &self.tag
    }

    pub fn get_type_name(&self) -> &'static str {
        self.type_name
    }

    /// The current schema version, the one every save writes.
    pub fn get_version(&self) -> u32 {
        self.version
    }

    pub fn get_harness(&self) -> &Harness {
        &self.harness
    }
}

/// Maps tags to [`TypeInfo`] and concrete Rust types back to their tag.
///
/// Populated through `&mut self` before any archive operation and only read
/// afterwards, so lookups from concurrent archive calls need no locking.
#[derive(Default, Debug)]
pub struct TypeResolver {
    by_tag: HashMap<String, Arc<TypeInfo>>,
    by_type: HashMap<std::any::TypeId, Arc<TypeInfo>>,
}

impl TypeResolver {
    /// Binds `tag` to `T`.
    ///
    /// Registering the same pair twice is a no-op. Binding the tag to another
    /// type, or the type to another tag, fails with [`Error::Registration`].
    pub fn register<T: Object>(&mut self, tag: &str) -> Result<(), Error> {
        self.register_type_info(TypeInfo::new::<T>(tag))
    }

    pub fn register_type_info(&mut self, type_info: TypeInfo) -> Result<(), Error> {
        if type_info.tag.is_empty() {
            return Err(Error::registration(format!(
                "empty tag for `{}`",
                type_info.type_name
            )));
        }
        if let Some(existing) = self.by_tag.get(&type_info.tag) {
            if existing.type_id == type_info.type_id {
                tracing::trace!(tag = %type_info.tag, "type already registered");
                return Ok(());
            }
            return Err(Error::registration(format!(
                "tag `{}` is already bound to `{}`, cannot bind it to `{}`",
                type_info.tag, existing.type_name, type_info.type_name
            )));
        }
        if let Some(existing) = self.by_type.get(&type_info.type_id) {
            return Err(Error::registration(format!(
                "`{}` is already registered under tag `{}`, cannot register it as `{}`",
                type_info.type_name, existing.tag, type_info.tag
            )));
        }
        tracing::debug!(
            tag = %type_info.tag,
            type_name = type_info.type_name,
            version = type_info.version,
            "registered type"
        );
        let type_info = Arc::new(type_info);
        self.by_type.insert(type_info.type_id, type_info.clone());
        self.by_tag.insert(type_info.tag.clone(), type_info);
        Ok(())
    }

    /// Returns the type bound to `tag`.
    pub fn resolve(&self, tag: &str) -> Result<&Arc<TypeInfo>, Error> {
        self.by_tag
            .get(tag)
            .ok_or_else(|| Error::unknown_tag(tag.to_owned()))
    }

    /// Returns the registration of a concrete Rust type.
    pub fn get_type_info(&self, type_id: &std::any::TypeId) -> Result<&Arc<TypeInfo>, Error> {
        self.by_type
            .get(type_id)
            .ok_or_else(|| Error::unregistered_type(format!("{:?}", type_id)))
    }

    /// Returns the tag of a concrete Rust type.
    pub fn tag_for(&self, type_id: &std::any::TypeId) -> Result<&str, Error> {
        self.get_type_info(type_id).map(|info| info.get_tag())
    }

    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}
