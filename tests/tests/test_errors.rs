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

use keepsake::{register_trait_type, Error, Keepsake, KeepsakeObject, Serializer};
use std::cell::RefCell;
use std::rc::Rc;

trait Shape: Serializer {
    fn area(&self) -> f64;
}

trait Named: Serializer {
    fn label(&self) -> String;
}

#[derive(KeepsakeObject, Debug, Clone, PartialEq)]
struct Circle {
    radius: f64,
}

#[derive(KeepsakeObject, Debug, Clone, PartialEq)]
struct Square {
    side: f64,
}

#[derive(KeepsakeObject)]
struct Group {
    inner: Option<Box<dyn Shape>>,
}

#[derive(KeepsakeObject)]
struct Node {
    value: i32,
    next: Option<Rc<Node>>,
}

#[derive(KeepsakeObject)]
struct Looped {
    name: String,
    next: Option<Rc<RefCell<Looped>>>,
}

#[derive(KeepsakeObject)]
struct Chain {
    next: Option<Box<Chain>>,
}

fn chain(len: usize) -> Chain {
    let mut chain = Chain { next: None };
    for _ in 1..len {
        chain = Chain {
            next: Some(Box::new(chain)),
        };
    }
    chain
}

fn chain_len(chain: &Chain) -> usize {
    let mut len = 1;
    let mut cursor = chain;
    while let Some(next) = &cursor.next {
        len += 1;
        cursor = next;
    }
    len
}

impl Shape for Circle {
    fn area(&self) -> f64 {
        3.0 * self.radius * self.radius
    }
}

impl Shape for Square {
    fn area(&self) -> f64 {
        self.side * self.side
    }
}

impl Shape for Group {
    fn area(&self) -> f64 {
        self.inner.as_ref().map_or(0.0, |inner| inner.area())
    }
}

impl Named for Circle {
    fn label(&self) -> String {
        format!("circle({})", self.radius)
    }
}

impl Named for Square {
    fn label(&self) -> String {
        format!("square({})", self.side)
    }
}

register_trait_type!(Shape, Circle, Square, Group);
// Square does not implement Named
register_trait_type!(Named, Circle);

fn keepsake() -> Keepsake {
    let mut keepsake = Keepsake::default();
    keepsake.register::<Circle>("circle").unwrap();
    keepsake.register::<Square>("square").unwrap();
    keepsake.register::<Group>("group").unwrap();
    keepsake
}

fn header(keepsake: &Keepsake) -> Vec<u8> {
    let mut bytes = keepsake.serialize(&0u8).unwrap();
    bytes.truncate(4);
    bytes
}

#[test]
fn test_registration_rules() {
    let mut keepsake = Keepsake::default();
    keepsake.register::<Circle>("circle").unwrap();
    // same pair again is a no-op
    keepsake.register::<Circle>("circle").unwrap();
    assert_eq!(keepsake.get_type_resolver().len(), 1);

    assert!(matches!(
        keepsake.register::<Square>("circle"),
        Err(Error::Registration(_))
    ));
    assert!(matches!(
        keepsake.register::<Circle>("round"),
        Err(Error::Registration(_))
    ));
    assert!(matches!(
        keepsake.register::<Square>(""),
        Err(Error::Registration(_))
    ));

    let resolver = keepsake.get_type_resolver();
    assert_eq!(
        resolver.tag_for(&std::any::TypeId::of::<Circle>()).unwrap(),
        "circle"
    );
    assert!(matches!(
        resolver.tag_for(&std::any::TypeId::of::<Square>()),
        Err(Error::UnregisteredType(_))
    ));
    assert!(matches!(resolver.resolve("round"), Err(Error::UnknownTag(_))));
}

#[test]
fn test_unregistered_type_on_write() {
    let keepsake = Keepsake::default();
    let shape: Box<dyn Shape> = Box::new(Circle { radius: 1.0 });
    match keepsake.serialize(&shape) {
        Err(Error::UnregisteredType(name)) => assert!(name.contains("Circle")),
        other => panic!("expected an unregistered type error, got {:?}", other),
    }
}

#[test]
fn test_unknown_tag_on_read() {
    let writer = keepsake();
    let shape: Rc<dyn Shape> = Rc::new(Square { side: 2.0 });
    let bytes = writer.serialize(&shape).unwrap();

    let mut reader = Keepsake::default();
    reader.register::<Circle>("circle").unwrap();
    match reader.deserialize::<Rc<dyn Shape>>(&bytes) {
        Err(Error::UnknownTag(tag)) => assert_eq!(tag, "square"),
        Err(e) => panic!("expected an unknown tag error, got {}", e),
        Ok(_) => panic!("expected an unknown tag error"),
    }
}

#[test]
fn test_dangling_back_reference() {
    let keepsake = keepsake();
    for ordinal in [0u8, 7] {
        let mut bytes = header(&keepsake);
        // one element, a back-reference to an ordinal never assigned
        bytes.extend_from_slice(&[1, 0xFE, ordinal]);
        match keepsake.deserialize::<Vec<Rc<Circle>>>(&bytes) {
            Err(Error::DanglingReference { ordinal: o, offset }) => {
                assert_eq!(o, ordinal as u32);
                assert_eq!(offset, 5);
            }
            Err(e) => panic!("expected a dangling reference error, got {}", e),
            Ok(_) => panic!("expected a dangling reference error"),
        }
    }
}

#[test]
fn test_strong_cycle_is_rejected() {
    let keepsake = keepsake();
    let mut bytes = header(&keepsake);
    // [Rc<Node> #1 { value: 1, next: Some(back-reference to #1) }]
    bytes.extend_from_slice(&[1, 0, 0, 2, 0xFE, 1]);
    assert!(matches!(
        keepsake.deserialize::<Vec<Rc<Node>>>(&bytes),
        Err(Error::InvalidRef(_))
    ));
}

#[test]
fn test_strong_cycle_is_rejected_on_write() {
    let keepsake = keepsake();
    let node = Rc::new(RefCell::new(Looped {
        name: "self".to_string(),
        next: None,
    }));
    node.borrow_mut().next = Some(node.clone());
    assert!(matches!(
        keepsake.serialize(&node),
        Err(Error::InvalidRef(_))
    ));

    let other = Rc::new(RefCell::new(Looped {
        name: "other".to_string(),
        next: Some(node.clone()),
    }));
    node.borrow_mut().next = Some(other.clone());
    assert!(matches!(
        keepsake.serialize(&vec![other.clone(), node.clone()]),
        Err(Error::InvalidRef(_))
    ));

    // once the cycle is broken the same objects are writable again
    node.borrow_mut().next = None;
    let bytes = keepsake.serialize(&vec![other, node]).unwrap();
    let loaded: Vec<Rc<RefCell<Looped>>> = keepsake.deserialize(&bytes).unwrap();
    let next = loaded[0].borrow().next.clone().unwrap();
    assert!(Rc::ptr_eq(&next, &loaded[1]));
    assert_eq!(next.borrow().name, "self");
}

#[test]
fn test_linked_nodes_round_trip() {
    let keepsake = keepsake();
    let tail = Rc::new(Node {
        value: 2,
        next: None,
    });
    let head = Rc::new(Node {
        value: 1,
        next: Some(tail.clone()),
    });
    let bytes = keepsake.serialize(&vec![head, tail]).unwrap();
    let loaded: Vec<Rc<Node>> = keepsake.deserialize(&bytes).unwrap();
    assert_eq!(loaded[0].value, 1);
    assert!(Rc::ptr_eq(loaded[0].next.as_ref().unwrap(), &loaded[1]));
}

#[test]
fn test_truncated_stream() {
    let keepsake = keepsake();
    let shapes: Vec<Rc<dyn Shape>> = vec![
        Rc::new(Circle { radius: 1.5 }),
        Rc::new(Square { side: 2.5 }),
    ];
    let bytes = keepsake.serialize(&shapes).unwrap();
    for len in 0..bytes.len() {
        match keepsake.deserialize::<Vec<Rc<dyn Shape>>>(&bytes[..len]) {
            Err(e) => assert!(e.is_truncated(), "prefix of {} bytes: {}", len, e),
            Ok(_) => panic!("prefix of {} bytes decoded", len),
        }
    }
    assert_eq!(
        keepsake
            .deserialize::<Vec<Rc<dyn Shape>>>(&bytes)
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn test_type_mismatch_at_trait_site() {
    let keepsake = keepsake();
    let shape: Rc<dyn Shape> = Rc::new(Square { side: 1.0 });
    let bytes = keepsake.serialize(&shape).unwrap();
    assert!(matches!(
        keepsake.deserialize::<Rc<dyn Named>>(&bytes),
        Err(Error::TypeMismatch(_))
    ));

    let shape: Rc<dyn Shape> = Rc::new(Circle { radius: 1.0 });
    let bytes = keepsake.serialize(&shape).unwrap();
    let named = keepsake.deserialize::<Rc<dyn Named>>(&bytes).unwrap();
    assert_eq!(named.label(), "circle(1)");
}

#[test]
fn test_type_mismatch_at_back_reference() {
    let keepsake = keepsake();
    let circle = Rc::new(Circle { radius: 1.0 });
    let bytes = keepsake.serialize(&(circle.clone(), circle)).unwrap();
    assert!(matches!(
        keepsake.deserialize::<(Rc<Circle>, Rc<Square>)>(&bytes),
        Err(Error::TypeMismatch(_))
    ));
    let (a, b) = keepsake
        .deserialize::<(Rc<Circle>, Rc<Circle>)>(&bytes)
        .unwrap();
    assert!(Rc::ptr_eq(&a, &b));
}

#[test]
fn test_null_at_non_nullable_site() {
    let keepsake = keepsake();
    let bytes = keepsake.serialize(&Option::<Rc<Circle>>::None).unwrap();
    assert!(matches!(
        keepsake.deserialize::<Rc<Circle>>(&bytes),
        Err(Error::InvalidData(_))
    ));
    assert!(keepsake
        .deserialize::<Option<Rc<Circle>>>(&bytes)
        .unwrap()
        .is_none());
}

#[test]
fn test_invalid_reference_flag() {
    let keepsake = keepsake();
    let mut bytes = header(&keepsake);
    bytes.push(0x7F);
    assert!(matches!(
        keepsake.deserialize::<Rc<Circle>>(&bytes),
        Err(Error::InvalidData(_))
    ));
}

fn nested_groups(depth: usize) -> Box<dyn Shape> {
    let mut shape: Box<dyn Shape> = Box::new(Circle { radius: 1.0 });
    for _ in 0..depth {
        shape = Box::new(Group { inner: Some(shape) });
    }
    shape
}

#[test]
fn test_max_dyn_depth() {
    let shape = nested_groups(5);
    let bytes = keepsake().serialize(&shape).unwrap();

    let loaded: Box<dyn Shape> = keepsake().deserialize(&bytes).unwrap();
    assert_eq!(loaded.area(), 3.0);

    let mut shallow = Keepsake::default().max_dyn_depth(3);
    shallow.register::<Circle>("circle").unwrap();
    shallow.register::<Square>("square").unwrap();
    shallow.register::<Group>("group").unwrap();
    assert!(matches!(
        shallow.deserialize::<Box<dyn Shape>>(&bytes),
        Err(Error::DepthExceed(_))
    ));
}

#[test]
fn test_max_depth_through_concrete_types() {
    let keepsake = keepsake();
    assert_eq!(keepsake.get_config().max_depth(), 256);

    let bytes = keepsake.serialize(&chain(200)).unwrap();
    let loaded: Chain = keepsake.deserialize(&bytes).unwrap();
    assert_eq!(chain_len(&loaded), 200);

    let shallow = Keepsake::default().max_depth(50);
    assert!(matches!(
        shallow.deserialize::<Chain>(&bytes),
        Err(Error::DepthExceed(_))
    ));
}

#[test]
fn test_hostile_nesting_fails_without_exhausting_the_stack() {
    let keepsake = keepsake();
    let mut bytes = header(&keepsake);
    // a million nested `Some(Box<Chain>)` records, then a `None`
    for _ in 0..1_000_000 {
        bytes.extend_from_slice(&[0, 0xFF]);
    }
    bytes.extend_from_slice(&[0, 0xFD]);
    assert!(matches!(
        keepsake.deserialize::<Chain>(&bytes),
        Err(Error::DepthExceed(_))
    ));
}
