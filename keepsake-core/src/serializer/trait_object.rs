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

/// Makes a trait object decodable behind `Rc`, `Arc` and `Box`.
///
/// Encoding a trait object only needs its concrete type to be registered with
/// [`Keepsake::register`](crate::keepsake::Keepsake::register). Decoding also
/// needs to know which concrete types may sit behind the trait, which is what
/// this macro lists. It implements [`Pointee`](crate::serializer::Pointee) for
/// `dyn Trait`, so `Rc<dyn Trait>`, `Arc<dyn Trait>`, `Box<dyn Trait>` and
/// weak pointers to it all become [`Serializer`](crate::serializer::Serializer)s.
///
/// A decoded object whose registered type is not in the list fails with
/// [`Error::TypeMismatch`](crate::error::Error::TypeMismatch).
///
/// **Note**: the trait must extend `Serializer` and must be local to the
/// crate invoking the macro.
///
/// # Example
///
/// ```rust,ignore
/// use keepsake::{register_trait_type, KeepsakeObject, Serializer};
///
/// trait Data: Serializer {
///     fn text(&self) -> &str;
/// }
///
/// #[derive(KeepsakeObject)]
/// struct Plain { text: String }
///
/// #[derive(KeepsakeObject)]
/// struct Numbered { #[keepsake(base)] base: Plain, number: f64 }
///
/// impl Data for Plain {
///     fn text(&self) -> &str { &self.text }
/// }
///
/// impl Data for Numbered {
///     fn text(&self) -> &str { &self.base.text }
/// }
///
/// register_trait_type!(Data, Plain, Numbered);
/// ```
#[macro_export]
macro_rules! register_trait_type {
    (@mismatch $trait_name:ident) => {
        $crate::error::Error::type_mismatch(format!(
            "decoded object is not one of the types listed for `dyn {}`",
            stringify!($trait_name)
        ))
    };

    ($trait_name:ident, $($impl_type:ty),+ $(,)?) => {
        impl $crate::serializer::Pointee for dyn $trait_name {
            fn keepsake_write_pointee(
                &self,
                context: &mut $crate::resolver::context::WriteContext,
            ) -> ::std::result::Result<(), $crate::error::Error> {
                context.write_polymorphic(
                    $crate::serializer::Serializer::as_any(self),
                    $crate::serializer::Serializer::keepsake_type_name(self),
                )
            }

            fn keepsake_read_box(
                context: &mut $crate::resolver::context::ReadContext,
            ) -> ::std::result::Result<::std::boxed::Box<Self>, $crate::error::Error> {
                let object = context.read_polymorphic()?;
                $(
                    let object = match object.downcast::<$impl_type>() {
                        Ok(concrete) => return Ok(concrete as ::std::boxed::Box<dyn $trait_name>),
                        Err(object) => object,
                    };
                )+
                drop(object);
                Err($crate::register_trait_type!(@mismatch $trait_name))
            }

            fn keepsake_read_rc(
                context: &mut $crate::resolver::context::ReadContext,
                ordinal: u32,
            ) -> ::std::result::Result<::std::rc::Rc<Self>, $crate::error::Error> {
                let object = context.read_polymorphic()?;
                $(
                    let object = match object.downcast::<$impl_type>() {
                        Ok(concrete) => {
                            let concrete: ::std::rc::Rc<$impl_type> = ::std::rc::Rc::from(concrete);
                            let view: ::std::rc::Rc<dyn $trait_name> = concrete.clone();
                            context.ref_reader.bind(
                                ordinal,
                                vec![
                                    ::std::boxed::Box::new(concrete) as ::std::boxed::Box<dyn ::std::any::Any>,
                                    ::std::boxed::Box::new(view.clone()),
                                ],
                            );
                            return Ok(view);
                        }
                        Err(object) => object,
                    };
                )+
                drop(object);
                Err($crate::register_trait_type!(@mismatch $trait_name))
            }

            fn keepsake_read_arc(
                context: &mut $crate::resolver::context::ReadContext,
                ordinal: u32,
            ) -> ::std::result::Result<::std::sync::Arc<Self>, $crate::error::Error> {
                let object = context.read_polymorphic()?;
                $(
                    let object = match object.downcast::<$impl_type>() {
                        Ok(concrete) => {
                            let concrete: ::std::sync::Arc<$impl_type> = ::std::sync::Arc::from(concrete);
                            let view: ::std::sync::Arc<dyn $trait_name> = concrete.clone();
                            context.ref_reader.bind(
                                ordinal,
                                vec![
                                    ::std::boxed::Box::new(concrete) as ::std::boxed::Box<dyn ::std::any::Any>,
                                    ::std::boxed::Box::new(view.clone()),
                                ],
                            );
                            return Ok(view);
                        }
                        Err(object) => object,
                    };
                )+
                drop(object);
                Err($crate::register_trait_type!(@mismatch $trait_name))
            }

            fn keepsake_rc_from_views(
                views: &[::std::boxed::Box<dyn ::std::any::Any>],
            ) -> ::std::option::Option<::std::rc::Rc<Self>> {
                views.iter().find_map(|view| {
                    if let Some(rc) = view.downcast_ref::<::std::rc::Rc<dyn $trait_name>>() {
                        return Some(rc.clone());
                    }
                    $(
                        if let Some(rc) = view.downcast_ref::<::std::rc::Rc<$impl_type>>() {
                            return Some(rc.clone() as ::std::rc::Rc<dyn $trait_name>);
                        }
                    )+
                    None
                })
            }

            fn keepsake_arc_from_views(
                views: &[::std::boxed::Box<dyn ::std::any::Any>],
            ) -> ::std::option::Option<::std::sync::Arc<Self>> {
                views.iter().find_map(|view| {
                    if let Some(arc) = view.downcast_ref::<::std::sync::Arc<dyn $trait_name>>() {
                        return Some(arc.clone());
                    }
                    $(
                        if let Some(arc) = view.downcast_ref::<::std::sync::Arc<$impl_type>>() {
                            return Some(arc.clone() as ::std::sync::Arc<dyn $trait_name>);
                        }
                    )+
                    None
                })
            }
        }
    };
}
