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

//! Error type shared by every archive operation.
//!
//! Error constructors are called from every bounds check in the codec. They are
//! marked `#[cold]` so the hot paths stay small; keep those attributes when
//! adding a new constructor.

use std::borrow::Cow;

use thiserror::Error;

/// Set `KEEPSAKE_PANIC_ON_ERROR` at compile time to panic where an error is created.
pub const PANIC_ON_ERROR: bool = option_env!("KEEPSAKE_PANIC_ON_ERROR").is_some();

/// Check if `KEEPSAKE_PANIC_ON_ERROR` was set at compile time.
#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

/// Error type for Keepsake archive operations.
///
/// # Always use the constructor functions
///
/// Build errors through [`Error::registration`], [`Error::unknown_tag`],
/// [`Error::dangling_reference`] and friends rather than the enum syntax. The
/// constructors accept anything convertible into `Cow<'static, str>` and honor
/// the `KEEPSAKE_PANIC_ON_ERROR` debugging switch.
///
/// ```rust
/// use keepsake_core::error::Error;
///
/// let err = Error::unknown_tag("shape.circle");
/// assert!(matches!(err, Error::UnknownTag(_)));
///
/// let err = Error::dangling_reference(7, 42);
/// assert_eq!(err.to_string(), "Dangling back-reference to ordinal 7 at offset 42");
/// ```
///
/// ## Debug mode: KEEPSAKE_PANIC_ON_ERROR
///
/// ```bash
/// RUST_BACKTRACE=1 KEEPSAKE_PANIC_ON_ERROR=1 cargo test
/// ```
///
/// With the switch on, every constructor panics with the error message so the
/// backtrace points at the exact place the archive went wrong.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A tag or type was bound twice to different counterparts.
    ///
    /// Do not construct this variant directly; use [`Error::registration`] instead.
    #[error("Registration error: {0}")]
    Registration(Cow<'static, str>),

    /// The stream names a tag that was never registered in this process.
    ///
    /// Do not construct this variant directly; use [`Error::unknown_tag`] instead.
    #[error("Unknown type tag `{0}`")]
    UnknownTag(Cow<'static, str>),

    /// A polymorphic pointer refers to a concrete type without a tag.
    ///
    /// Do not construct this variant directly; use [`Error::unregistered_type`] instead.
    #[error("Type `{0}` is not registered")]
    UnregisteredType(Cow<'static, str>),

    /// A back-reference names an ordinal that has not been assigned yet.
    ///
    /// Do not construct this variant directly; use [`Error::dangling_reference`] instead.
    #[error("Dangling back-reference to ordinal {ordinal} at offset {offset}")]
    DanglingReference { ordinal: u32, offset: usize },

    /// The decoded object cannot be exposed through the static type of its pointer site.
    ///
    /// Do not construct this variant directly; use [`Error::type_mismatch`] instead.
    #[error("Type mismatch: {0}")]
    TypeMismatch(Cow<'static, str>),

    /// The codec ran out of bytes.
    ///
    /// Do not construct this variant directly; use [`Error::buffer_out_of_bound`] instead.
    #[error("Truncated stream: {0} + {1} > {2}")]
    BufferOutOfBound(usize, usize, usize),

    /// The recorded schema version is unknown to the decoding logic of a type.
    ///
    /// Do not construct this variant directly; use [`Error::version`] instead.
    #[error("Unsupported version {recorded} for `{type_name}` (current version is {current})")]
    Version {
        type_name: Cow<'static, str>,
        recorded: u32,
        current: u32,
    },

    /// Invalid or corrupted data encountered.
    ///
    /// Do not construct this variant directly; use [`Error::invalid_data`] instead.
    #[error("{0}")]
    InvalidData(Cow<'static, str>),

    /// A reference that exists but cannot be used at this point of the walk.
    ///
    /// Do not construct this variant directly; use [`Error::invalid_ref`] instead.
    #[error("{0}")]
    InvalidRef(Cow<'static, str>),

    /// Maximum nesting depth exceeded.
    ///
    /// Do not construct this variant directly; use [`Error::depth_exceed`] instead.
    #[error("{0}")]
    DepthExceed(Cow<'static, str>),

    /// Operation not allowed in current context.
    ///
    /// Do not construct this variant directly; use [`Error::not_allowed`] instead.
    #[error("{0}")]
    NotAllowed(Cow<'static, str>),

    /// Generic unknown error.
    ///
    /// Do not construct this variant directly; use [`Error::unknown`] instead.
    #[error("{0}")]
    Unknown(Cow<'static, str>),
}

impl Error {
    /// Creates a new [`Error::Registration`].
    ///
    /// ```
    /// use keepsake_core::error::Error;
    ///
    /// let err = Error::registration("tag `a` is already bound to `B`");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn registration<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Registration(s.into());
        if PANIC_ON_ERROR {
            panic!("KEEPSAKE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::UnknownTag`] naming the offending tag.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown_tag<S: Into<Cow<'static, str>>>(tag: S) -> Self {
        let err = Error::UnknownTag(tag.into());
        if PANIC_ON_ERROR {
            panic!("KEEPSAKE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::UnregisteredType`] naming the Rust type.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unregistered_type<S: Into<Cow<'static, str>>>(type_name: S) -> Self {
        let err = Error::UnregisteredType(type_name.into());
        if PANIC_ON_ERROR {
            panic!("KEEPSAKE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::DanglingReference`] for `ordinal`, read at byte `offset`.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn dangling_reference(ordinal: u32, offset: usize) -> Self {
        let err = Error::DanglingReference { ordinal, offset };
        if PANIC_ON_ERROR {
            panic!("KEEPSAKE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::TypeMismatch`].
    ///
    /// ```
    /// use keepsake_core::error::Error;
    ///
    /// let err = Error::type_mismatch(format!("`{}` does not implement `Shape`", "Label"));
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_mismatch<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::TypeMismatch(s.into());
        if PANIC_ON_ERROR {
            panic!("KEEPSAKE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::BufferOutOfBound`] with the given bounds.
    ///
    /// ```
    /// use keepsake_core::error::Error;
    ///
    /// let err = Error::buffer_out_of_bound(10, 20, 25);
    /// assert!(err.is_truncated());
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn buffer_out_of_bound(offset: usize, length: usize, capacity: usize) -> Self {
        let err = Error::BufferOutOfBound(offset, length, capacity);
        if PANIC_ON_ERROR {
            panic!("KEEPSAKE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::Version`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn version<S: Into<Cow<'static, str>>>(type_name: S, recorded: u32, current: u32) -> Self {
        let err = Error::Version {
            type_name: type_name.into(),
            recorded,
            current,
        };
        if PANIC_ON_ERROR {
            panic!("KEEPSAKE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::InvalidData`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_data<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::InvalidData(s.into());
        if PANIC_ON_ERROR {
            panic!("KEEPSAKE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::InvalidRef`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_ref<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::InvalidRef(s.into());
        if PANIC_ON_ERROR {
            panic!("KEEPSAKE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::DepthExceed`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn depth_exceed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::DepthExceed(s.into());
        if PANIC_ON_ERROR {
            panic!("KEEPSAKE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::NotAllowed`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn not_allowed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::NotAllowed(s.into());
        if PANIC_ON_ERROR {
            panic!("KEEPSAKE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::Unknown`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Unknown(s.into());
        if PANIC_ON_ERROR {
            panic!("KEEPSAKE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Returns true when the codec ran out of bytes.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::BufferOutOfBound(..))
    }
}

/// Ensures a condition is true; otherwise returns an [`enum@Error`].
///
/// # Examples
/// ```
/// use keepsake_core::ensure;
/// use keepsake_core::error::Error;
///
/// fn check_len(n: usize) -> Result<(), Error> {
///     ensure!(n > 0, "length must be positive");
///     ensure!(n < 10, "length {} too large", n);
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::unknown($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)));
        }
    };
}
