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

mod field_meta;
mod read;
mod serializer;
mod write;

pub use serializer::derive_serializer;

use field_meta::{parse_field_meta, FieldMeta};
use proc_macro2::Ident;
use quote::format_ident;
use syn::{Fields, Member, Type};

/// A struct field together with its parsed attributes.
pub(crate) struct ObjectField<'a> {
    pub member: Member,
    pub ty: &'a Type,
    pub meta: FieldMeta,
    /// Local binding used while loading.
    pub local: Ident,
}

/// Collects fields in wire order: the base field first, then the others in
/// declaration order.
pub(crate) fn collect_fields(fields: &Fields, version: u32) -> syn::Result<Vec<ObjectField<'_>>> {
    let mut base = None;
    let mut others = Vec::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let meta = parse_field_meta(field)?;
        if let Some(since) = meta.since {
            if since > version {
                return Err(syn::Error::new_spanned(
                    field,
                    format!(
                        "field is `since = {}` but the struct is only at `version = {}`",
                        since, version
                    ),
                ));
            }
        }
        let (member, local) = match &field.ident {
            Some(ident) => (
                Member::Named(ident.clone()),
                format_ident!("__keepsake_{}", ident),
            ),
            None => (
                Member::Unnamed(index.into()),
                format_ident!("__keepsake_{}", index),
            ),
        };
        let object_field = ObjectField {
            member,
            ty: &field.ty,
            meta,
            local,
        };
        if object_field.meta.base {
            if base.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "at most one field can be marked `#[keepsake(base)]`",
                ));
            }
            base = Some(object_field);
        } else {
            others.push(object_field);
        }
    }
    Ok(base.into_iter().chain(others).collect())
}
