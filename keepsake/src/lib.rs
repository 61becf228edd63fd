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

//! # Keepsake
//!
//! Keepsake writes a graph of Rust objects into a compact binary archive and
//! reads an equivalent graph back. It is built for object models that plain
//! tree serializers cannot express:
//!
//! - **Shared references**: an object reached through several `Rc`/`Arc`
//!   pointers is written once and decoded once; every pointer to it decodes
//!   to the same allocation.
//! - **Trait objects**: `Rc<dyn Trait>`, `Arc<dyn Trait>` and `Box<dyn Trait>`
//!   record the stable tag of their concrete type and decode back to it.
//! - **Base composition**: a struct can embed its "base" as a field whose
//!   record is always written first, so derived layouts extend base layouts.
//! - **Schema versions**: every record carries the version it was written
//!   with; loaders read any older layout.
//! - **Cycles**: back-pointers through [`RcWeak`]/[`ArcWeak`] round-trip.
//!
//! ## Getting Started
//!
//! ```rust
//! use keepsake::{register_trait_type, Error, Keepsake, KeepsakeObject, Serializer};
//! use std::rc::Rc;
//!
//! trait Data: Serializer {
//!     fn text(&self) -> &str;
//! }
//!
//! #[derive(KeepsakeObject, Debug, PartialEq)]
//! struct Plain {
//!     text: String,
//! }
//!
//! #[derive(KeepsakeObject, Debug, PartialEq)]
//! #[keepsake(version = 1)]
//! struct Numbered {
//!     #[keepsake(base)]
//!     base: Plain,
//!     #[keepsake(since = 1)]
//!     number: f64,
//! }
//!
//! impl Data for Plain {
//!     fn text(&self) -> &str {
//!         &self.text
//!     }
//! }
//!
//! impl Data for Numbered {
//!     fn text(&self) -> &str {
//!         &self.base.text
//!     }
//! }
//!
//! register_trait_type!(Data, Plain, Numbered);
//!
//! # fn main() -> Result<(), Error> {
//! let mut keepsake = Keepsake::default();
//! keepsake.register::<Plain>("plain")?;
//! keepsake.register::<Numbered>("numbered")?;
//!
//! let shared: Rc<dyn Data> = Rc::new(Plain { text: "China, good luck".to_string() });
//! let numbered: Rc<dyn Data> = Rc::new(Numbered {
//!     base: Plain { text: "numbered".to_string() },
//!     number: 1.5,
//! });
//! let items = vec![shared.clone(), numbered, shared];
//!
//! let bytes = keepsake.serialize(&items)?;
//! let loaded: Vec<Rc<dyn Data>> = keepsake.deserialize(&bytes)?;
//!
//! assert!(Rc::ptr_eq(&loaded[0], &loaded[2]));
//! assert_eq!(loaded[1].text(), "numbered");
//! # Ok(())
//! # }
//! ```
//!
//! ## Dependencies
//!
//! `#[derive(KeepsakeObject)]` expands to paths under `keepsake_core`, so
//! crates using the derive list both crates:
//!
//! ```toml
//! [dependencies]
//! keepsake = "0.3"
//! keepsake-core = "0.3"
//! ```
//!
//! ## Registration
//!
//! Tags are the wire identity of concrete types and must stay stable across
//! releases. Registration takes `&mut Keepsake`, archive calls take
//! `&Keepsake`, so a configured instance can be wrapped in an `Arc` and used
//! from many threads.
//!
//! ## Hand-written layouts
//!
//! When a field is removed or changes type, implement
//! [`Object`](keepsake_core::serializer::Object) by hand and frame it with
//! [`object_serializer!`]; see the `Object` documentation for an example.

pub use keepsake_core::{
    error::Error, keepsake::Keepsake, object_serializer, register_trait_type, ArcWeak, Config,
    Object, Pointee, RcWeak, ReadContext, Serializer, WriteContext,
};
pub use keepsake_derive::KeepsakeObject;
