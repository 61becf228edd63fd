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

//! Parsing of `#[keepsake(...)]` attributes.
//!
//! On the struct:
//! - `version = N`: current schema version, written with every instance
//!
//! On a field:
//! - `base`: the base subobject, encoded before every other field
//! - `since = N`: only present in records of version `N` or later; older
//!   records load it as `Default::default()`
//! - `skip`: never encoded, loaded as `Default::default()`

use syn::{Attribute, Field, LitInt};

/// Parsed struct-level attributes.
#[derive(Debug, Clone, Default)]
pub struct ObjectMeta {
    pub version: u32,
}

/// Parsed field-level attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMeta {
    pub base: bool,
    pub since: Option<u32>,
    pub skip: bool,
}

fn parse_u32(nested: &syn::meta::ParseNestedMeta) -> syn::Result<u32> {
    let lit: LitInt = nested.value()?.parse()?;
    lit.base10_parse()
}

pub fn parse_object_meta(attrs: &[Attribute]) -> syn::Result<ObjectMeta> {
    let mut meta = ObjectMeta::default();
    for attr in attrs {
        if !attr.path().is_ident("keepsake") {
            continue;
        }
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("version") {
                meta.version = parse_u32(&nested)?;
                Ok(())
            } else {
                Err(nested.error("unsupported keepsake attribute, expected `version = N`"))
            }
        })?;
    }
    Ok(meta)
}

pub fn parse_field_meta(field: &Field) -> syn::Result<FieldMeta> {
    let mut meta = FieldMeta::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("keepsake") {
            continue;
        }
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("base") {
                meta.base = true;
            } else if nested.path.is_ident("since") {
                meta.since = Some(parse_u32(&nested)?);
            } else if nested.path.is_ident("skip") {
                meta.skip = true;
            } else {
                return Err(nested.error(
                    "unsupported keepsake attribute, expected `base`, `since = N` or `skip`",
                ));
            }
            Ok(())
        })?;
    }
    if meta.base && (meta.skip || meta.since.is_some()) {
        return Err(syn::Error::new_spanned(
            field,
            "a `base` field is part of every version and cannot be `skip` or `since`",
        ));
    }
    if meta.skip && meta.since.is_some() {
        return Err(syn::Error::new_spanned(
            field,
            "`skip` and `since` cannot be combined",
        ));
    }
    Ok(meta)
}
