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

//! # Keepsake Core
//!
//! The engine behind Keepsake: it turns a graph of objects into a compact
//! binary archive and rebuilds an equivalent graph from it, preserving shared
//! identity, the dynamic type behind trait objects, and the schema version of
//! every record.
//!
//! ## Architecture
//!
//! - **`keepsake`**: the [`Keepsake`] entry point, owning the registry and configuration
//! - **`buffer`**: little-endian `Writer`/`Reader` with varints and bounds-checked reads
//! - **`resolver`**: the type registry, the per-archive identity table and tag interning
//! - **`serializer`**: the `Serializer`/`Object`/`Pointee` traits and their implementations
//! - **`types`**: record flags and header constants
//! - **`error`**: error handling and result types
//!
//! ## Key Concepts
//!
//! ### Identity
//!
//! Objects reached through `Rc`/`Arc` are tracked by address. The first
//! occurrence is written in full and takes the next ordinal; every later
//! occurrence is a back-reference to that ordinal, and decodes to a pointer to
//! the same object.
//!
//! ### Polymorphism
//!
//! A record written at a trait-object site carries the stable tag its
//! concrete type was registered under, so the reader can construct the right
//! type. Traits are made decodable with [`register_trait_type!`].
//!
//! ### Versioning
//!
//! Every object record starts with the version of the layout it was written
//! with. Loaders receive that version and may read any layout the type has
//! ever had.
//!
//! ## Usage
//!
//! This crate is typically used through the higher-level `keepsake` crate,
//! which adds `#[derive(KeepsakeObject)]`.
//!
//! ```rust
//! use keepsake_core::Keepsake;
//! use std::rc::Rc;
//!
//! let keepsake = Keepsake::default();
//! let shared = Rc::new(String::from("shared"));
//! let pair = vec![shared.clone(), shared];
//!
//! let bytes = keepsake.serialize(&pair).unwrap();
//! let loaded: Vec<Rc<String>> = keepsake.deserialize(&bytes).unwrap();
//! assert!(Rc::ptr_eq(&loaded[0], &loaded[1]));
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod keepsake;
pub mod resolver;
pub mod serializer;
pub mod types;
pub mod util;

pub use config::Config;
pub use error::Error;
pub use keepsake::Keepsake;
pub use resolver::context::{ReadContext, WriteContext};
pub use serializer::{ArcWeak, Object, Pointee, RcWeak, Serializer};
