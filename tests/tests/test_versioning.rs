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

use keepsake::{
    object_serializer, register_trait_type, Error, Keepsake, KeepsakeObject, Object,
    ReadContext, Serializer, WriteContext,
};

#[derive(KeepsakeObject, Debug, Clone, PartialEq)]
struct ProfileV0 {
    name: String,
}

#[derive(KeepsakeObject, Debug, Clone, PartialEq)]
#[keepsake(version = 1)]
struct Profile {
    name: String,
    #[keepsake(since = 1)]
    score: i64,
}

#[derive(KeepsakeObject, Debug, PartialEq)]
struct AccountV0 {
    #[keepsake(base)]
    profile: ProfileV0,
    balance: u32,
}

#[derive(KeepsakeObject, Debug, PartialEq)]
struct Account {
    #[keepsake(base)]
    profile: Profile,
    balance: u32,
    #[keepsake(skip)]
    cached_label: String,
}

/// Version 0 also stored a serial number, dropped in version 1.
#[derive(KeepsakeObject, Debug, PartialEq)]
struct RegistryV0 {
    serial: i32,
    entries: Vec<String>,
}

#[derive(Debug, PartialEq)]
struct Registry {
    entries: Vec<String>,
}

impl Object for Registry {
    const VERSION: u32 = 1;

    fn keepsake_save(&self, context: &mut WriteContext) -> Result<(), Error> {
        self.entries.keepsake_write(context)
    }

    fn keepsake_load(context: &mut ReadContext, version: u32) -> Result<Self, Error> {
        if version == 0 {
            let _serial = i32::keepsake_read(context)?;
        }
        Ok(Registry {
            entries: Vec::<String>::keepsake_read(context)?,
        })
    }
}

object_serializer!(Registry);

trait Versioned: Serializer {
    fn name(&self) -> &str;
}

impl Versioned for ProfileV0 {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Versioned for Profile {
    fn name(&self) -> &str {
        &self.name
    }
}

register_trait_type!(Versioned, ProfileV0, Profile);

#[test]
fn test_added_field_defaults_for_old_records() {
    let keepsake = Keepsake::default();
    let old = ProfileV0 {
        name: "ann".to_string(),
    };
    let bytes = keepsake.serialize(&old).unwrap();
    let loaded: Profile = keepsake.deserialize(&bytes).unwrap();
    assert_eq!(
        loaded,
        Profile {
            name: "ann".to_string(),
            score: 0
        }
    );
}

#[test]
fn test_current_version_round_trip() {
    let keepsake = Keepsake::default();
    let profile = Profile {
        name: "bob".to_string(),
        score: -17,
    };
    let bytes = keepsake.serialize(&profile).unwrap();
    // header, then the recorded version
    assert_eq!(bytes[4], 1);
    assert_eq!(keepsake.deserialize::<Profile>(&bytes).unwrap(), profile);
}

#[test]
fn test_each_level_records_its_own_version() {
    let keepsake = Keepsake::default();
    let old = AccountV0 {
        profile: ProfileV0 {
            name: "carol".to_string(),
        },
        balance: 300,
    };
    let bytes = keepsake.serialize(&old).unwrap();
    let loaded: Account = keepsake.deserialize(&bytes).unwrap();
    assert_eq!(loaded.profile.name, "carol");
    assert_eq!(loaded.profile.score, 0);
    assert_eq!(loaded.balance, 300);
    assert_eq!(loaded.cached_label, "");
}

#[test]
fn test_skipped_field_is_not_written() {
    let keepsake = Keepsake::default();
    let profile = Profile {
        name: "dan".to_string(),
        score: 5,
    };
    let with_label = Account {
        profile: profile.clone(),
        balance: 1,
        cached_label: "a long cached label".to_string(),
    };
    let without_label = Account {
        profile,
        balance: 1,
        cached_label: String::new(),
    };
    let bytes = keepsake.serialize(&with_label).unwrap();
    assert_eq!(bytes, keepsake.serialize(&without_label).unwrap());
    assert_eq!(keepsake.deserialize::<Account>(&bytes).unwrap(), without_label);
}

#[test]
fn test_removed_field_is_consumed_for_old_records() {
    let keepsake = Keepsake::default();
    let old = RegistryV0 {
        serial: 42,
        entries: vec!["a".to_string(), "b".to_string()],
    };
    let bytes = keepsake.serialize(&old).unwrap();
    let loaded: Registry = keepsake.deserialize(&bytes).unwrap();
    assert_eq!(loaded.entries, old.entries);

    let current = Registry {
        entries: vec!["c".to_string()],
    };
    let bytes = keepsake.serialize(&current).unwrap();
    assert_eq!(keepsake.deserialize::<Registry>(&bytes).unwrap(), current);
}

#[test]
fn test_version_newer_than_reader_is_rejected() {
    let keepsake = Keepsake::default();
    let bytes = keepsake
        .serialize(&Profile {
            name: "eve".to_string(),
            score: 1,
        })
        .unwrap();
    match keepsake.deserialize::<ProfileV0>(&bytes) {
        Err(Error::Version {
            recorded, current, ..
        }) => {
            assert_eq!(recorded, 1);
            assert_eq!(current, 0);
        }
        other => panic!("expected a version error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_polymorphic_record_read_by_older_and_newer_types() {
    let mut writer = Keepsake::default();
    writer.register::<ProfileV0>("profile").unwrap();
    let mut reader = Keepsake::default();
    reader.register::<Profile>("profile").unwrap();

    let old: Box<dyn Versioned> = Box::new(ProfileV0 {
        name: "frank".to_string(),
    });
    let bytes = writer.serialize(&old).unwrap();
    let loaded: Box<dyn Versioned> = reader.deserialize(&bytes).unwrap();
    let profile = (*loaded).as_any().downcast_ref::<Profile>().unwrap();
    assert_eq!(profile.name, "frank");
    assert_eq!(profile.score, 0);

    // and the other way round the recorded version is too new
    let new: Box<dyn Versioned> = Box::new(Profile {
        name: "grace".to_string(),
        score: 3,
    });
    let bytes = reader.serialize(&new).unwrap();
    assert!(matches!(
        writer.deserialize::<Box<dyn Versioned>>(&bytes),
        Err(Error::Version { recorded: 1, current: 0, .. })
    ));
}
