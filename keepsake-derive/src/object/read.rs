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

use super::ObjectField;
use proc_macro2::TokenStream;
use quote::quote;

/// Body of `Object::keepsake_load`.
///
/// Fields are read in wire order into locals, then the struct is assembled.
/// A `since = N` field is read only from records of version `N` or later.
pub fn gen_load(fields: &[ObjectField]) -> TokenStream {
    let reads = fields.iter().map(|field| {
        let local = &field.local;
        let ty = field.ty;
        if field.meta.skip {
            quote! {
                let #local: #ty = ::std::default::Default::default();
            }
        } else if let Some(since) = field.meta.since {
            quote! {
                let #local: #ty = if version >= #since {
                    <#ty as keepsake_core::serializer::Serializer>::keepsake_read(context)?
                } else {
                    ::std::default::Default::default()
                };
            }
        } else {
            quote! {
                let #local: #ty = <#ty as keepsake_core::serializer::Serializer>::keepsake_read(context)?;
            }
        }
    });
    let assigns = fields.iter().map(|field| {
        let member = &field.member;
        let local = &field.local;
        quote! { #member: #local }
    });
    quote! {
        #(#reads)*
        Ok(Self { #(#assigns),* })
    }
}

/// Whether the loader needs the recorded version at all.
pub fn uses_version(fields: &[ObjectField]) -> bool {
    fields.iter().any(|field| field.meta.since.is_some())
}
