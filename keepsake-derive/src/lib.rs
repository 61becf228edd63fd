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

//! # Keepsake Derive Macros
//!
//! This crate provides `#[derive(KeepsakeObject)]`, which implements
//! `keepsake_core::serializer::Object` and `Serializer` for a struct.
//!
//! ## Attributes
//!
//! ```rust,ignore
//! use keepsake::KeepsakeObject;
//!
//! #[derive(KeepsakeObject)]
//! struct Data {
//!     text: String,
//! }
//!
//! #[derive(KeepsakeObject)]
//! #[keepsake(version = 1)]
//! struct NumberedData {
//!     // base fields are written before every other field
//!     #[keepsake(base)]
//!     base: Data,
//!     // absent from version 0 records
//!     #[keepsake(since = 1)]
//!     number: f64,
//!     // never written
//!     #[keepsake(skip)]
//!     cached_len: usize,
//! }
//! ```
//!
//! - `#[keepsake(version = N)]` on the struct sets `Object::VERSION`.
//! - `#[keepsake(base)]` on at most one field marks the base subobject. Its
//!   own record, version included, is written first, so the layout of a
//!   derived type always extends the layout of its base.
//! - `#[keepsake(since = N)]` reads the field only from records of version `N`
//!   or later; older records load it as `Default::default()`.
//! - `#[keepsake(skip)]` excludes the field; it loads as `Default::default()`.
//!
//! Tuple and unit structs are supported. Enums are not: layout changes that
//! go beyond added fields are written as a hand-written `Object` impl.
//!
//! ## Generated Code
//!
//! - `Object` with `keepsake_save` writing the fields in wire order and
//!   `keepsake_load` reading any version up to the current one
//! - `Serializer` framing the struct as a versioned record
//! - `Serializer` bounds on every type parameter
//!
//! The generated impls name `keepsake_core::` paths, so a crate deriving
//! `KeepsakeObject` must depend on `keepsake-core` directly, next to
//! `keepsake` (or `keepsake-derive`).

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod object;

#[proc_macro_derive(KeepsakeObject, attributes(keepsake))]
pub fn proc_macro_derive_keepsake_object(input: proc_macro::TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    object::derive_serializer(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
