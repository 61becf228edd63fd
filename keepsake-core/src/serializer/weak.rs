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

//! Weak pointers for cyclic graphs.
//!
//! [`RcWeak`] and [`ArcWeak`] wrap `std::rc::Weak` / `std::sync::Weak` in a
//! shared cell so that every clone observes the same target. That makes it
//! possible to decode a weak pointer to an object still under construction
//! (a child pointing back at its parent): the pointer is created empty and
//! patched once the whole archive has been decoded.
//!
//! On the wire a weak pointer is an ordinary pointer record. A dead weak is
//! written as null. A live one whose target was not written yet writes the
//! target in full; the decoder keeps it alive until `deserialize` returns, so
//! it survives only if some strong pointer in the graph also owns it.
//!
//! # Example
//!
//! ```rust
//! use keepsake_core::serializer::weak::RcWeak;
//! use std::rc::Rc;
//!
//! let parent = Rc::new(String::from("parent"));
//! let weak = RcWeak::from(&parent);
//! let alias = weak.clone();
//! assert!(Rc::ptr_eq(&alias.upgrade().unwrap(), &parent));
//!
//! drop(parent);
//! assert!(weak.upgrade().is_none());
//! ```

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::ref_resolver::RefReader;
use crate::serializer::rc::write_shared;
use crate::serializer::{Pointee, Serializer};
use crate::types::RefFlag;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, PoisonError, RwLock};

pub struct RcWeak<T: ?Sized> {
    // clones share the cell, so patching one patches all
    inner: Rc<RefCell<Option<std::rc::Weak<T>>>>,
}

impl<T: ?Sized> RcWeak<T> {
    /// A weak pointer with no target.
    pub fn new() -> Self {
        RcWeak {
            inner: Rc::new(RefCell::new(None)),
        }
    }

    pub fn from_std(weak: std::rc::Weak<T>) -> Self {
        RcWeak {
            inner: Rc::new(RefCell::new(Some(weak))),
        }
    }

    pub fn upgrade(&self) -> Option<Rc<T>> {
        self.inner.borrow().as_ref().and_then(std::rc::Weak::upgrade)
    }

    pub fn strong_count(&self) -> usize {
        self.inner
            .borrow()
            .as_ref()
            .map_or(0, std::rc::Weak::strong_count)
    }

    /// Retargets this pointer and every clone of it.
    pub fn update(&self, weak: std::rc::Weak<T>) {
        *self.inner.borrow_mut() = Some(weak);
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self.upgrade(), other.upgrade()) {
            (Some(a), Some(b)) => Rc::ptr_eq(&a, &b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: ?Sized> Default for RcWeak<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for RcWeak<T> {
    fn clone(&self) -> Self {
        RcWeak {
            inner: self.inner.clone(),
        }
    }
}

impl<T: ?Sized> From<&Rc<T>> for RcWeak<T> {
    fn from(rc: &Rc<T>) -> Self {
        RcWeak::from_std(Rc::downgrade(rc))
    }
}

impl<T: ?Sized> std::fmt::Debug for RcWeak<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RcWeak")
            .field("strong_count", &self.strong_count())
            .finish()
    }
}

pub struct ArcWeak<T: ?Sized> {
    inner: Arc<RwLock<Option<std::sync::Weak<T>>>>,
}

impl<T: ?Sized> ArcWeak<T> {
    pub fn new() -> Self {
        ArcWeak {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    pub fn from_std(weak: std::sync::Weak<T>) -> Self {
        ArcWeak {
            inner: Arc::new(RwLock::new(Some(weak))),
        }
    }

    pub fn upgrade(&self) -> Option<Arc<T>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(std::sync::Weak::upgrade)
    }

    pub fn strong_count(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, std::sync::Weak::strong_count)
    }

    pub fn update(&self, weak: std::sync::Weak<T>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(weak);
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self.upgrade(), other.upgrade()) {
            (Some(a), Some(b)) => Arc::ptr_eq(&a, &b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: ?Sized> Default for ArcWeak<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for ArcWeak<T> {
    fn clone(&self) -> Self {
        ArcWeak {
            inner: self.inner.clone(),
        }
    }
}

impl<T: ?Sized> From<&Arc<T>> for ArcWeak<T> {
    fn from(arc: &Arc<T>) -> Self {
        ArcWeak::from_std(Arc::downgrade(arc))
    }
}

impl<T: ?Sized> std::fmt::Debug for ArcWeak<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArcWeak")
            .field("strong_count", &self.strong_count())
            .finish()
    }
}

fn unexpected_flag<T: ?Sized>(ref_flag: RefFlag, pointer: &str, offset: usize) -> Error {
    Error::invalid_data(format!(
        "Unexpected reference flag {:?} for `{}<{}>` at offset {}",
        ref_flag,
        pointer,
        std::any::type_name::<T>(),
        offset
    ))
}

impl<T: ?Sized + Pointee> Serializer for RcWeak<T> {
    fn keepsake_write(&self, context: &mut WriteContext) -> Result<(), Error> {
        match self.upgrade() {
            Some(rc) => write_shared(&*rc, true, context),
            None => {
                context.writer.write_i8(RefFlag::Null.into());
                Ok(())
            }
        }
    }

    fn keepsake_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        self.keepsake_write(context)
    }

    fn keepsake_read(context: &mut ReadContext) -> Result<Self, Error> {
        let offset = context.reader.get_cursor();
        let ref_flag = RefFlag::from_byte(context.reader.read_i8()?, offset)?;
        match ref_flag {
            RefFlag::Null => Ok(RcWeak::new()),
            RefFlag::RefValue => {
                let ordinal = context.ref_reader.reserve();
                let rc = T::keepsake_read_rc(context, ordinal)?;
                Ok(RcWeak::from(&rc))
            }
            RefFlag::Ref => {
                let ordinal = context.reader.read_varuint32()?;
                if !context.ref_reader.is_pending(ordinal) {
                    let rc = context.ref_reader.get_rc::<T>(ordinal, offset)?;
                    return Ok(RcWeak::from(&rc));
                }
                tracing::trace!(ordinal, "weak pointer to an object under construction");
                let result_weak = RcWeak::new();
                let callback_weak = result_weak.clone();
                context
                    .ref_reader
                    .add_callback(Box::new(move |ref_reader: &RefReader| {
                        let rc = ref_reader.get_rc::<T>(ordinal, offset)?;
                        callback_weak.update(Rc::downgrade(&rc));
                        Ok(())
                    }));
                Ok(result_weak)
            }
            RefFlag::NotNullValue => Err(unexpected_flag::<T>(ref_flag, "RcWeak", offset)),
        }
    }

    fn keepsake_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        Self::keepsake_read(context)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl<T: ?Sized + Pointee> Serializer for ArcWeak<T> {
    fn keepsake_write(&self, context: &mut WriteContext) -> Result<(), Error> {
        match self.upgrade() {
            Some(arc) => write_shared(&*arc, true, context),
            None => {
                context.writer.write_i8(RefFlag::Null.into());
                Ok(())
            }
        }
    }

    fn keepsake_write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        self.keepsake_write(context)
    }

    fn keepsake_read(context: &mut ReadContext) -> Result<Self, Error> {
        let offset = context.reader.get_cursor();
        let ref_flag = RefFlag::from_byte(context.reader.read_i8()?, offset)?;
        match ref_flag {
            RefFlag::Null => Ok(ArcWeak::new()),
            RefFlag::RefValue => {
                let ordinal = context.ref_reader.reserve();
                let arc = T::keepsake_read_arc(context, ordinal)?;
                Ok(ArcWeak::from(&arc))
            }
            RefFlag::Ref => {
                let ordinal = context.reader.read_varuint32()?;
                if !context.ref_reader.is_pending(ordinal) {
                    let arc = context.ref_reader.get_arc::<T>(ordinal, offset)?;
                    return Ok(ArcWeak::from(&arc));
                }
                tracing::trace!(ordinal, "weak pointer to an object under construction");
                let result_weak = ArcWeak::new();
                let callback_weak = result_weak.clone();
                context
                    .ref_reader
                    .add_callback(Box::new(move |ref_reader: &RefReader| {
                        let arc = ref_reader.get_arc::<T>(ordinal, offset)?;
                        callback_weak.update(Arc::downgrade(&arc));
                        Ok(())
                    }));
                Ok(result_weak)
            }
            RefFlag::NotNullValue => Err(unexpected_flag::<T>(ref_flag, "ArcWeak", offset)),
        }
    }

    fn keepsake_read_data(context: &mut ReadContext) -> Result<Self, Error> {
        Self::keepsake_read(context)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
