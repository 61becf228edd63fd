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

use crate::buffer::Writer;
use crate::error::Error;
use crate::serializer::Pointee;
use crate::types::{RefFlag, FIRST_ORDINAL};
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

/// Outcome of [`RefWriter::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    /// The object was not in the archive yet and now owns this ordinal.
    FirstSeen(u32),
    /// The object was already written under this ordinal.
    AlreadySeen(u32),
}

/// Encode side of the identity table.
///
/// Maps object addresses to archive-local ordinals. Identity is the address of
/// the shared allocation, never value equality: two equal but distinct objects
/// get two ordinals.
///
/// # Examples
///
/// ```rust
/// use keepsake_core::buffer::Writer;
/// use keepsake_core::resolver::ref_resolver::RefWriter;
/// use std::rc::Rc;
///
/// let mut ref_writer = RefWriter::new();
/// let mut writer = Writer::default();
/// let rc = Rc::new(42);
/// let addr = Rc::as_ptr(&rc) as usize;
///
/// // First encounter - the caller must write the object body.
/// assert!(!ref_writer.try_write_ref(&mut writer, addr).unwrap());
/// ref_writer.close(addr);
///
/// // Second encounter - a back-reference was written.
/// assert!(ref_writer.try_write_ref(&mut writer, addr).unwrap());
/// ```
pub struct RefWriter {
    refs: HashMap<usize, u32>,
    // objects whose record has started but not finished
    open: HashSet<usize>,
    next_ordinal: u32,
}

impl Default for RefWriter {
    fn default() -> Self {
        RefWriter {
            refs: HashMap::new(),
            open: HashSet::new(),
            next_ordinal: FIRST_ORDINAL,
        }
    }
}

impl RefWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `addr`, assigning the next ordinal on first sight.
    pub fn observe(&mut self, addr: usize) -> Observed {
        if let Some(&ordinal) = self.refs.get(&addr) {
            return Observed::AlreadySeen(ordinal);
        }
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        self.refs.insert(addr, ordinal);
        Observed::FirstSeen(ordinal)
    }

    /// Returns the ordinal of `addr` without recording it.
    pub fn lookup(&self, addr: usize) -> Option<u32> {
        self.refs.get(&addr).copied()
    }

    /// Writes the record flag for the object at `addr` reached through a
    /// strong pointer.
    ///
    /// Returns `true` if a back-reference was written and nothing else must
    /// follow, `false` if this is the first occurrence and the caller must
    /// write the object record, then [`close`](Self::close) it.
    ///
    /// A strong back-reference to an object whose record is still open could
    /// never be decoded, so it fails with [`Error::InvalidRef`].
    pub fn try_write_ref(&mut self, writer: &mut Writer, addr: usize) -> Result<bool, Error> {
        if self.open.contains(&addr) {
            return Err(Error::invalid_ref(format!(
                "object {} is reached through a strong pointer from inside its own record; \
                 strong reference cycles must go through a weak pointer",
                self.lookup(addr).unwrap_or_default()
            )));
        }
        Ok(self.try_write_weak_ref(writer, addr))
    }

    /// Same as [`try_write_ref`](Self::try_write_ref) for a weak pointer,
    /// which may point back into an open record.
    pub fn try_write_weak_ref(&mut self, writer: &mut Writer, addr: usize) -> bool {
        match self.observe(addr) {
            Observed::AlreadySeen(ordinal) => {
                writer.write_i8(RefFlag::Ref.into());
                writer.write_varuint32(ordinal);
                tracing::trace!(ordinal, "back-reference");
                true
            }
            Observed::FirstSeen(ordinal) => {
                writer.write_i8(RefFlag::RefValue.into());
                self.open.insert(addr);
                tracing::trace!(ordinal, "new object");
                false
            }
        }
    }

    /// Marks the record of the object at `addr` as complete.
    pub fn close(&mut self, addr: usize) {
        self.open.remove(&addr);
    }

    /// Number of distinct objects seen so far.
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn clear(&mut self) {
        self.refs.clear();
        self.open.clear();
        self.next_ordinal = FIRST_ORDINAL;
    }
}

enum Slot {
    /// Ordinal assigned, object body still being decoded.
    Pending,
    /// Every typed pointer created for the object, e.g. `Rc<Circle>` and `Rc<dyn Shape>`.
    Bound(Vec<Box<dyn Any>>),
}

type Callback = Box<dyn FnOnce(&RefReader) -> Result<(), Error>>;

/// Decode side of the identity table.
///
/// An ordinal is reserved when a new object record starts, before its fields
/// are decoded, so ordinals line up with the encode order. The object is bound
/// once it is fully constructed.
///
/// # Examples
///
/// ```rust
/// use keepsake_core::resolver::ref_resolver::RefReader;
/// use std::rc::Rc;
///
/// let mut ref_reader = RefReader::new();
/// let rc = Rc::new(String::from("shared"));
///
/// let ordinal = ref_reader.reserve();
/// ref_reader.bind_rc(ordinal, rc.clone());
///
/// let retrieved = ref_reader.get_rc::<String>(ordinal, 0).unwrap();
/// assert!(Rc::ptr_eq(&rc, &retrieved));
/// ```
#[derive(Default)]
pub struct RefReader {
    slots: Vec<Slot>,
    callbacks: Vec<Callback>,
}

impl RefReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the next ordinal to an object whose body is about to be decoded.
    pub fn reserve(&mut self) -> u32 {
        self.slots.push(Slot::Pending);
        self.slots.len() as u32 - 1 + FIRST_ORDINAL
    }

    fn index(&self, ordinal: u32) -> Option<usize> {
        let index = ordinal.checked_sub(FIRST_ORDINAL)? as usize;
        (index < self.slots.len()).then_some(index)
    }

    /// Binds the constructed object to a reserved ordinal.
    pub fn bind(&mut self, ordinal: u32, views: Vec<Box<dyn Any>>) {
        match self.index(ordinal) {
            Some(index) => self.slots[index] = Slot::Bound(views),
            None => debug_assert!(false, "ordinal {} was never reserved", ordinal),
        }
    }

    pub fn bind_rc<T: ?Sized + 'static>(&mut self, ordinal: u32, rc: Rc<T>) {
        self.bind(ordinal, vec![Box::new(rc)]);
    }

    pub fn bind_arc<T: ?Sized + 'static>(&mut self, ordinal: u32, arc: Arc<T>) {
        self.bind(ordinal, vec![Box::new(arc)]);
    }

    /// Returns true if `ordinal` is reserved but its object is still under construction.
    pub fn is_pending(&self, ordinal: u32) -> bool {
        matches!(
            self.index(ordinal).map(|i| &self.slots[i]),
            Some(Slot::Pending)
        )
    }

    /// Returns the views bound to `ordinal`; `offset` is reported in errors.
    pub fn lookup(&self, ordinal: u32, offset: usize) -> Result<&[Box<dyn Any>], Error> {
        match self.index(ordinal).map(|i| &self.slots[i]) {
            None => Err(Error::dangling_reference(ordinal, offset)),
            Some(Slot::Pending) => Err(Error::invalid_ref(format!(
                "Ordinal {} at offset {} refers to an object whose construction has not completed; \
                 strong reference cycles must go through a weak pointer",
                ordinal, offset
            ))),
            Some(Slot::Bound(views)) => Ok(views),
        }
    }

    /// Resolves a back-reference at an `Rc<T>` site.
    pub fn get_rc<T: ?Sized + Pointee>(&self, ordinal: u32, offset: usize) -> Result<Rc<T>, Error> {
        let views = self.lookup(ordinal, offset)?;
        T::keepsake_rc_from_views(views).ok_or_else(|| {
            Error::type_mismatch(format!(
                "object {} cannot be viewed as `Rc<{}>`",
                ordinal,
                std::any::type_name::<T>()
            ))
        })
    }

    /// Resolves a back-reference at an `Arc<T>` site.
    pub fn get_arc<T: ?Sized + Pointee>(
        &self,
        ordinal: u32,
        offset: usize,
    ) -> Result<Arc<T>, Error> {
        let views = self.lookup(ordinal, offset)?;
        T::keepsake_arc_from_views(views).ok_or_else(|| {
            Error::type_mismatch(format!(
                "object {} cannot be viewed as `Arc<{}>`",
                ordinal,
                std::any::type_name::<T>()
            ))
        })
    }

    /// Defers work until the whole archive is decoded.
    pub fn add_callback(&mut self, callback: Callback) {
        self.callbacks.push(callback);
    }

    /// Runs every deferred callback; the first error aborts the archive.
    pub fn resolve_callbacks(&mut self) -> Result<(), Error> {
        let callbacks = std::mem::take(&mut self.callbacks);
        for callback in callbacks {
            callback(self)?;
        }
        Ok(())
    }

    /// Number of ordinals assigned so far.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
