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

/// Body of `Object::keepsake_save`: every encoded field in wire order.
pub fn gen_save(fields: &[ObjectField]) -> TokenStream {
    let writes = fields.iter().filter(|field| !field.meta.skip).map(|field| {
        let member = &field.member;
        let ty = field.ty;
        quote! {
            <#ty as keepsake_core::serializer::Serializer>::keepsake_write(&self.#member, context)?;
        }
    });
    quote! {
        #(#writes)*
        Ok(())
    }
}
