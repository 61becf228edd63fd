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

use chrono::{NaiveDate, NaiveDateTime};
use keepsake::{Error, Keepsake, KeepsakeObject, Serializer};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::Debug;
use std::rc::Rc;
use std::sync::Mutex;

fn round_trip<T: Serializer + PartialEq + Debug>(value: T) {
    let keepsake = Keepsake::default();
    let bytes = keepsake.serialize(&value).unwrap();
    let loaded: T = keepsake.deserialize(&bytes).unwrap();
    assert_eq!(loaded, value);
}

/// Archive bytes after the four byte header.
fn body<T: Serializer>(value: &T) -> Vec<u8> {
    Keepsake::default().serialize(value).unwrap()[4..].to_vec()
}

#[derive(KeepsakeObject, Debug, PartialEq)]
struct Inventory {
    names: Vec<String>,
    counts: BTreeMap<String, u32>,
    tags: BTreeSet<i64>,
    note: Option<String>,
}

#[test]
fn test_primitives() {
    round_trip(true);
    round_trip(false);
    round_trip(i8::MIN);
    round_trip(i16::MAX);
    round_trip(i32::MIN);
    round_trip(i64::MAX);
    round_trip(u8::MAX);
    round_trip(u16::MAX);
    round_trip(u32::MAX);
    round_trip(u64::MAX);
    round_trip(usize::MAX);
    round_trip(1.5f32);
    round_trip(-2.25f64);
    round_trip(String::new());
    round_trip("héllo wörld".to_string());
}

#[test]
fn test_primitive_encodings() {
    assert_eq!(body(&300i32), vec![0xD8, 0x04]);
    assert_eq!(body(&-1i32), vec![0x01]);
    assert_eq!(body(&-1i8), vec![0xFF]);
    assert_eq!(body(&0x1234u16), vec![0x34, 0x12]);
    assert_eq!(body(&300u32), vec![0xAC, 0x02]);
    assert_eq!(body(&300usize), vec![0xAC, 0x02]);
    assert_eq!(body(&true), vec![0x01]);
    assert_eq!(body(&1.0f64), 1.0f64.to_le_bytes().to_vec());
    assert_eq!(body(&"hi".to_string()), vec![2, b'h', b'i']);
}

#[test]
fn test_invalid_bool_byte() {
    let keepsake = Keepsake::default();
    let mut bytes = keepsake.serialize(&true).unwrap();
    bytes[4] = 2;
    assert!(matches!(
        keepsake.deserialize::<bool>(&bytes),
        Err(Error::InvalidData(_))
    ));
}

#[test]
fn test_invalid_utf8_string() {
    let keepsake = Keepsake::default();
    let mut bytes = keepsake.serialize(&"ab".to_string()).unwrap();
    bytes[5] = 0xC3;
    bytes[6] = 0x28;
    assert!(matches!(
        keepsake.deserialize::<String>(&bytes),
        Err(Error::InvalidData(_))
    ));
}

#[test]
fn test_sequences() {
    round_trip(Vec::<i32>::new());
    round_trip(vec![1, -2, 3]);
    round_trip(vec![vec!["a".to_string()], vec![]]);
    round_trip(VecDeque::from(vec![1u64, 2, 3]));
    assert_eq!(
        body(&vec!["a".to_string(), "b".to_string()]),
        vec![2, 1, b'a', 1, b'b']
    );
}

#[test]
fn test_sets_and_maps() {
    round_trip(HashSet::from([1, 2, 3]));
    round_trip(BTreeSet::from(["x".to_string(), "y".to_string()]));
    round_trip(HashMap::from([
        ("one".to_string(), 1),
        ("two".to_string(), 2),
    ]));
    round_trip(BTreeMap::from([(1u8, vec![1.0f64]), (2u8, vec![])]));
    assert_eq!(
        body(&BTreeMap::from([(1u8, true), (2u8, false)])),
        vec![2, 1, 1, 2, 0]
    );
}

#[test]
fn test_options() {
    round_trip(Option::<i32>::None);
    round_trip(Some(5i32));
    round_trip(Some(None::<i32>));
    round_trip(Some(Some(String::from("deep"))));
    assert_eq!(body(&None::<i32>), vec![0xFD]);
    assert_eq!(body(&Some(5i32)), vec![0xFF, 0x0A]);
    assert_eq!(body(&Some(None::<i32>)), vec![0xFF, 0xFD]);
}

#[test]
fn test_tuples() {
    round_trip((1i32,));
    round_trip((1i32, "two".to_string()));
    round_trip((1u8, 2u16, 3u32));
    round_trip((1i8, Some(2i16), vec![3i32], 4.0f32));
    assert_eq!(body(&(1u8, 2u8)), vec![1, 2]);
}

#[test]
fn test_boxes() {
    round_trip(Box::new(5i32));
    round_trip(Some(Box::new(String::from("boxed"))));
    round_trip(None::<Box<i32>>);
    assert_eq!(body(&Box::new(5i32)), vec![0xFF, 0x0A]);
    // a boxed value inside an option is not flagged twice
    assert_eq!(body(&Some(Box::new(5i32))), vec![0xFF, 0x0A]);
}

#[test]
fn test_interior_mutability() {
    let keepsake = Keepsake::default();
    let cell = RefCell::new(vec![1, 2, 3]);
    let bytes = keepsake.serialize(&cell).unwrap();
    assert_eq!(bytes, keepsake.serialize(&vec![1, 2, 3]).unwrap());
    let loaded: RefCell<Vec<i32>> = keepsake.deserialize(&bytes).unwrap();
    assert_eq!(loaded.into_inner(), vec![1, 2, 3]);

    let mutex = Mutex::new(String::from("guarded"));
    let bytes = keepsake.serialize(&mutex).unwrap();
    let loaded: Mutex<String> = keepsake.deserialize(&bytes).unwrap();
    assert_eq!(loaded.into_inner().unwrap(), "guarded");
}

#[test]
fn test_borrowed_refcell_cannot_be_written() {
    let keepsake = Keepsake::default();
    let cell = RefCell::new(1i32);
    let _guard = cell.borrow_mut();
    assert!(matches!(
        keepsake.serialize(&cell),
        Err(Error::NotAllowed(_))
    ));
}

#[test]
fn test_dates() {
    round_trip(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    round_trip(NaiveDate::from_ymd_opt(1969, 7, 20).unwrap());
    let timestamp: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 2, 29)
        .unwrap()
        .and_hms_micro_opt(12, 30, 45, 123_456)
        .unwrap();
    round_trip(timestamp);
    let before_epoch = NaiveDate::from_ymd_opt(1900, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 1)
        .unwrap();
    round_trip(before_epoch);
    assert_eq!(body(&NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()), vec![2]);
}

#[test]
fn test_shared_values_inside_collections() {
    let keepsake = Keepsake::default();
    let shared = Rc::new(String::from("shared"));
    let map = HashMap::from([
        (1u8, shared.clone()),
        (2u8, shared.clone()),
        (3u8, Rc::new(String::from("alone"))),
    ]);
    let bytes = keepsake.serialize(&map).unwrap();
    let loaded: HashMap<u8, Rc<String>> = keepsake.deserialize(&bytes).unwrap();
    assert!(Rc::ptr_eq(&loaded[&1], &loaded[&2]));
    assert!(!Rc::ptr_eq(&loaded[&1], &loaded[&3]));
    assert_eq!(*loaded[&3], "alone");
}

#[test]
fn test_struct_with_collections() {
    round_trip(Inventory {
        names: vec!["bolt".to_string(), "nut".to_string()],
        counts: BTreeMap::from([("bolt".to_string(), 12), ("nut".to_string(), 40)]),
        tags: BTreeSet::from([-1, 7]),
        note: None,
    });
    round_trip(Inventory {
        names: vec![],
        counts: BTreeMap::new(),
        tags: BTreeSet::new(),
        note: Some("empty".to_string()),
    });
}
