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
use std::any::Any;
use std::rc::Rc;
use std::sync::Arc;

pub trait Serializer: 'static {
    /// Entry point of the serialization at a value site.
    ///
    /// Pointer types (`Rc`, `Arc`, `Box`, `Option`, weak pointers) override this
    /// to write their record flag before the data. For every other type it is
    /// the data alone.
    fn keepsake_write(&self, context: &mut WriteContext) -> Result<(), Error> {
        self.keepsake_write_data(context)
    }

    /// Write the data into the buffer. Need to be implemented.
    fn keepsake_write_data(&self, context: &mut WriteContext) -> Result<(), Error>;

    /// Entry point of deserialization, the counterpart of [`Serializer::keepsake_write`].
    fn keepsake_read(context: &mut ReadContext) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::keepsake_read_data(context)
    }

    fn keepsake_read_data(context: &mut ReadContext) -> Result<Self, Error>
    where
        Self: Sized;

    fn keepsake_is_none(&self) -> bool {
        false
    }

    /// Whether the value always starts with a non-null record flag of its own.
    ///
    /// True for `Rc`, `Arc` and `Box`, letting `Option` reuse their flag byte
    /// instead of adding one.
    fn keepsake_writes_ref_flag() -> bool
    where
        Self: Sized,
    {
        false
    }

    /// Name of the dynamic type, used in error messages.
    fn keepsake_type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn as_any(&self) -> &dyn Any;
}

/// A type with a versioned record layout.
///
/// `keepsake_save` always writes the layout of [`Object::VERSION`];
/// `keepsake_load` must understand every layout the type has ever written,
/// selected by the version recorded in the archive.
///
/// Implemented by `#[derive(KeepsakeObject)]`, or by hand when the layout
/// change is more than added fields:
///
/// ```rust
/// use keepsake_core::error::Error;
/// use keepsake_core::resolver::context::{ReadContext, WriteContext};
/// use keepsake_core::serializer::{Object, Serializer};
///
/// struct Account {
///     owner: String,
/// }
///
/// impl Object for Account {
///     // version 0 also stored a numeric id that is no longer kept
///     const VERSION: u32 = 1;
///
///     fn keepsake_save(&self, context: &mut WriteContext) -> Result<(), Error> {
///         self.owner.keepsake_write(context)
///     }
///
///     fn keepsake_load(context: &mut ReadContext, version: u32) -> Result<Self, Error> {
///         if version == 0 {
///             let _id = u64::keepsake_read(context)?;
///         }
///         Ok(Account {
///             owner: String::keepsake_read(context)?,
///         })
///     }
/// }
///
/// keepsake_core::object_serializer!(Account);
/// ```
pub trait Object: Serializer + Sized {
    /// Current schema version, recorded with every saved instance.
    const VERSION: u32 = 0;

    /// Writes the body: the base record first, if any, then own fields.
    fn keepsake_save(&self, context: &mut WriteContext) -> Result<(), Error>;

    /// Constructs the object from a body written under `version`.
    fn keepsake_load(context: &mut ReadContext, version: u32) -> Result<Self, Error>;
}

/// What a smart pointer can point at: a concrete [`Serializer`], or a trait
/// object made decodable with [`register_trait_type!`](crate::register_trait_type).
///
/// The `read_rc`/`read_arc` methods receive the ordinal reserved for the new
/// object and bind every typed pointer they create to it, so later
/// back-references can be resolved at any of those static types.
pub trait Pointee: 'static {
    fn keepsake_write_pointee(&self, context: &mut WriteContext) -> Result<(), Error>;

    fn keepsake_read_box(context: &mut ReadContext) -> Result<Box<Self>, Error>;

    fn keepsake_read_rc(context: &mut ReadContext, ordinal: u32) -> Result<Rc<Self>, Error>;

    fn keepsake_read_arc(context: &mut ReadContext, ordinal: u32) -> Result<Arc<Self>, Error>;

    fn keepsake_rc_from_views(views: &[Box<dyn Any>]) -> Option<Rc<Self>>;

    fn keepsake_arc_from_views(views: &[Box<dyn Any>]) -> Option<Arc<Self>>;
}

impl<T: Serializer> Pointee for T {
    #[inline(always)]
    fn keepsake_write_pointee(&self, context: &mut WriteContext) -> Result<(), Error> {
        self.keepsake_write_data(context)
    }

    fn keepsake_read_box(context: &mut ReadContext) -> Result<Box<Self>, Error> {
        Ok(Box::new(T::keepsake_read_data(context)?))
    }

    fn keepsake_read_rc(context: &mut ReadContext, ordinal: u32) -> Result<Rc<Self>, Error> {
        let rc = Rc::new(T::keepsake_read_data(context)?);
        context.ref_reader.bind_rc(ordinal, rc.clone());
        Ok(rc)
    }

    fn keepsake_read_arc(context: &mut ReadContext, ordinal: u32) -> Result<Arc<Self>, Error> {
        let arc = Arc::new(T::keepsake_read_data(context)?);
        context.ref_reader.bind_arc(ordinal, arc.clone());
        Ok(arc)
    }

    fn keepsake_rc_from_views(views: &[Box<dyn Any>]) -> Option<Rc<Self>> {
        views
            .iter()
            .find_map(|view| view.downcast_ref::<Rc<T>>().cloned())
    }

    fn keepsake_arc_from_views(views: &[Box<dyn Any>]) -> Option<Arc<Self>> {
        views
            .iter()
            .find_map(|view| view.downcast_ref::<Arc<T>>().cloned())
    }
}
