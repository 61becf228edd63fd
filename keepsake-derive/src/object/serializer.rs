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

use crate::object::field_meta::parse_object_meta;
use crate::object::{collect_fields, read, write};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_quote, Data, DeriveInput};

pub fn derive_serializer(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &ast.ident;
    let fields = match &ast.data {
        Data::Struct(s) => &s.fields,
        Data::Enum(e) => {
            return Err(syn::Error::new_spanned(
                e.enum_token,
                "`KeepsakeObject` can only be derived for structs; implement `Object` by hand for enums",
            ))
        }
        Data::Union(u) => {
            return Err(syn::Error::new_spanned(
                u.union_token,
                "`KeepsakeObject` can only be derived for structs",
            ))
        }
    };
    let object_meta = parse_object_meta(&ast.attrs)?;
    let fields = collect_fields(fields, object_meta.version)?;

    let mut generics = ast.generics.clone();
    for param in generics.type_params_mut() {
        param
            .bounds
            .push(parse_quote!(keepsake_core::serializer::Serializer));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let version = object_meta.version;
    let version_ident = if read::uses_version(&fields) {
        format_ident!("version")
    } else {
        format_ident!("_version")
    };
    let save_ts = write::gen_save(&fields);
    let load_ts = read::gen_load(&fields);

    Ok(quote! {
        impl #impl_generics keepsake_core::serializer::Object for #name #ty_generics #where_clause {
            const VERSION: u32 = #version;

            #[allow(unused_variables)]
            fn keepsake_save(
                &self,
                context: &mut keepsake_core::resolver::context::WriteContext,
            ) -> ::std::result::Result<(), keepsake_core::error::Error> {
                #save_ts
            }

            #[allow(unused_variables)]
            fn keepsake_load(
                context: &mut keepsake_core::resolver::context::ReadContext,
                #version_ident: u32,
            ) -> ::std::result::Result<Self, keepsake_core::error::Error> {
                #load_ts
            }
        }

        impl #impl_generics keepsake_core::serializer::Serializer for #name #ty_generics #where_clause {
            #[inline]
            fn keepsake_write_data(
                &self,
                context: &mut keepsake_core::resolver::context::WriteContext,
            ) -> ::std::result::Result<(), keepsake_core::error::Error> {
                keepsake_core::serializer::object::write_object(self, context)
            }

            #[inline]
            fn keepsake_read_data(
                context: &mut keepsake_core::resolver::context::ReadContext,
            ) -> ::std::result::Result<Self, keepsake_core::error::Error> {
                keepsake_core::serializer::object::read_object::<Self>(context)
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    })
}
