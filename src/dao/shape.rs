//! Field names an entity type declares, read from its derived `Deserialize` impl.
//!
//! A derived struct hands its field list to `deserialize_struct`; the deserializer below
//! captures that list and stops. Types that deserialize any other way (maps, flattened
//! structs, enums) have no known shape and yield `None`.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::de::{DeserializeOwned, Visitor};
use serde::Deserializer;

#[derive(Debug)]
enum Stop {
    Fields(&'static [&'static str]),
    Shapeless,
}

impl Display for Stop {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stop::Fields(fields) => write!(f, "struct with fields {:?}", fields),
            Stop::Shapeless => write!(f, "not a plain struct"),
        }
    }
}

impl std::error::Error for Stop {}

impl serde::de::Error for Stop {
    fn custom<T: Display>(_msg: T) -> Self { Stop::Shapeless }
}

struct FieldNames;

impl<'de> Deserializer<'de> for FieldNames {
    type Error = Stop;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Stop> { Err(Stop::Shapeless) }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Stop> {
        Err(Stop::Fields(fields))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

pub fn declared_fields<U: DeserializeOwned>() -> Option<BTreeSet<String>> {
    match U::deserialize(FieldNames) {
        Err(Stop::Fields(fields)) => Some(fields.iter().map(|f| f.to_string()).collect()),
        _ => None,
    }
}
