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

//! Tests for the identity table and tag interning building blocks

use keepsake::{Error, KeepsakeObject};
use keepsake_core::buffer::{Reader, Writer};
use keepsake_core::resolver::ref_resolver::{Observed, RefReader, RefWriter};
use keepsake_core::resolver::tag_resolver::{TagReader, TagWriter};
use keepsake_core::resolver::type_resolver::TypeResolver;
use std::any::Any;
use std::rc::Rc;
use std::sync::Arc;

#[derive(KeepsakeObject, Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(KeepsakeObject, Debug, PartialEq)]
struct Label {
    text: String,
}

#[test]
fn test_ordinals_follow_first_sight() {
    let mut ref_writer = RefWriter::new();
    assert_eq!(ref_writer.observe(0x100), Observed::FirstSeen(1));
    assert_eq!(ref_writer.observe(0x200), Observed::FirstSeen(2));
    assert_eq!(ref_writer.observe(0x100), Observed::AlreadySeen(1));
    assert_eq!(ref_writer.lookup(0x200), Some(2));
    assert_eq!(ref_writer.lookup(0x300), None);
    assert_eq!(ref_writer.len(), 2);

    ref_writer.clear();
    assert!(ref_writer.is_empty());
    assert_eq!(ref_writer.observe(0x200), Observed::FirstSeen(1));
}

#[test]
fn test_ref_flags_on_the_wire() {
    let mut ref_writer = RefWriter::new();
    let mut writer = Writer::default();

    let rc1 = Rc::new(42i32);
    let rc2 = rc1.clone();
    let addr1 = Rc::as_ptr(&rc1) as usize;
    let addr2 = Rc::as_ptr(&rc2) as usize;

    assert!(!ref_writer.try_write_ref(&mut writer, addr1).unwrap());
    ref_writer.close(addr1);
    assert!(ref_writer.try_write_ref(&mut writer, addr2).unwrap());
    // RefValue, then Ref followed by ordinal 1
    assert_eq!(writer.dump(), vec![0x00, 0xFE, 0x01]);
}

#[test]
fn test_strong_back_reference_into_open_record() {
    let mut ref_writer = RefWriter::new();
    let mut writer = Writer::default();

    assert!(!ref_writer.try_write_ref(&mut writer, 0x100).unwrap());
    // a different object nested inside the open record is fine
    assert!(!ref_writer.try_write_ref(&mut writer, 0x200).unwrap());
    ref_writer.close(0x200);
    assert!(ref_writer.try_write_ref(&mut writer, 0x200).unwrap());

    // pointing back at the enclosing object only works weakly
    assert!(matches!(
        ref_writer.try_write_ref(&mut writer, 0x100),
        Err(Error::InvalidRef(_))
    ));
    assert!(ref_writer.try_write_weak_ref(&mut writer, 0x100));

    ref_writer.close(0x100);
    assert!(ref_writer.try_write_ref(&mut writer, 0x100).unwrap());
}

#[test]
fn test_reserve_then_bind() {
    let mut ref_reader = RefReader::new();
    let first = ref_reader.reserve();
    let second = ref_reader.reserve();
    assert_eq!((first, second), (1, 2));
    assert!(ref_reader.is_pending(first));

    let rc = Rc::new(String::from("test"));
    ref_reader.bind_rc(first, rc.clone());
    assert!(!ref_reader.is_pending(first));

    let retrieved = ref_reader.get_rc::<String>(first, 0).unwrap();
    assert!(Rc::ptr_eq(&rc, &retrieved));

    assert!(matches!(
        ref_reader.get_rc::<String>(second, 9),
        Err(Error::InvalidRef(_))
    ));
    assert!(matches!(
        ref_reader.get_rc::<String>(3, 9),
        Err(Error::DanglingReference {
            ordinal: 3,
            offset: 9
        })
    ));
    assert!(matches!(
        ref_reader.get_rc::<i32>(first, 0),
        Err(Error::TypeMismatch(_))
    ));
}

#[test]
fn test_multiple_views_of_one_object() {
    let mut ref_reader = RefReader::new();
    let ordinal = ref_reader.reserve();
    let concrete = Arc::new(Point { x: 1, y: 2 });
    let erased: Arc<dyn Any + Send + Sync> = concrete.clone();
    ref_reader.bind(
        ordinal,
        vec![
            Box::new(concrete.clone()) as Box<dyn Any>,
            Box::new(erased),
        ],
    );
    let point = ref_reader.get_arc::<Point>(ordinal, 0).unwrap();
    assert!(Arc::ptr_eq(&point, &concrete));
    assert_eq!(ref_reader.lookup(ordinal, 0).unwrap().len(), 2);
    assert!(matches!(
        ref_reader.get_rc::<Point>(ordinal, 0),
        Err(Error::TypeMismatch(_))
    ));
}

#[test]
fn test_callbacks_run_after_binding() {
    let mut ref_reader = RefReader::new();
    let ordinal = ref_reader.reserve();
    let seen = Rc::new(std::cell::Cell::new(0));
    let seen_in_callback = seen.clone();
    ref_reader.add_callback(Box::new(move |ref_reader: &RefReader| {
        let value = ref_reader.get_rc::<i32>(ordinal, 0)?;
        seen_in_callback.set(*value);
        Ok(())
    }));
    ref_reader.bind_rc(ordinal, Rc::new(11i32));
    ref_reader.resolve_callbacks().unwrap();
    assert_eq!(seen.get(), 11);

    let pending = ref_reader.reserve();
    ref_reader.add_callback(Box::new(move |ref_reader: &RefReader| {
        ref_reader.get_rc::<i32>(pending, 0).map(|_| ())
    }));
    assert!(matches!(
        ref_reader.resolve_callbacks(),
        Err(Error::InvalidRef(_))
    ));
}

#[test]
fn test_tag_interning() {
    let mut type_resolver = TypeResolver::default();
    type_resolver.register::<Point>("point").unwrap();
    type_resolver.register::<Label>("label").unwrap();
    let point = type_resolver.resolve("point").unwrap().clone();
    let label = type_resolver.resolve("label").unwrap().clone();

    let mut tag_writer = TagWriter::default();
    let mut writer = Writer::default();
    tag_writer.write(&mut writer, &point);
    tag_writer.write(&mut writer, &label);
    tag_writer.write(&mut writer, &point);
    tag_writer.write(&mut writer, &label);
    assert_eq!(tag_writer.len(), 2);

    let bytes = writer.dump();
    let mut expected = vec![5 << 1];
    expected.extend_from_slice(b"point");
    expected.push(5 << 1);
    expected.extend_from_slice(b"label");
    expected.extend_from_slice(&[1, 3]);
    assert_eq!(bytes, expected);

    let mut tag_reader = TagReader::default();
    let mut reader = Reader::new(&bytes);
    for expected in [&point, &label, &point, &label] {
        let type_info = tag_reader.read(&mut reader, &type_resolver).unwrap();
        assert!(Arc::ptr_eq(&type_info, expected));
    }
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn test_tag_reader_rejects_bad_input() {
    let mut type_resolver = TypeResolver::default();
    type_resolver.register::<Point>("point").unwrap();

    let mut tag_reader = TagReader::default();
    // index 0 before any tag was defined
    let mut reader = Reader::new(&[1]);
    assert!(matches!(
        tag_reader.read(&mut reader, &type_resolver),
        Err(Error::InvalidData(_))
    ));

    let mut bytes = vec![4 << 1];
    bytes.extend_from_slice(b"line");
    let mut reader = Reader::new(&bytes);
    assert!(matches!(
        tag_reader.read(&mut reader, &type_resolver),
        Err(Error::UnknownTag(_))
    ));

    let mut reader = Reader::new(&[2 << 1, 0xC3, 0x28]);
    assert!(matches!(
        tag_reader.read(&mut reader, &type_resolver),
        Err(Error::InvalidData(_))
    ));
}
