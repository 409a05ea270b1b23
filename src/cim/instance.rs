//! In-memory model of a CIM instance.
//!
//! An instance is a bag of named, typed properties partitioned into key
//! (identity) properties and ordinary properties. The engine only ever
//! consumes instances through two operations: identity equality and full
//! equality, both name-indexed (property order never matters).

use serde::Deserialize;
use serde::Serialize;

/// A typed CIM property value.
///
/// Values of different variants never compare equal: a type mismatch is a
/// difference. `Opaque` stands in for CIM types the engine does not model;
/// two `Opaque` values always compare equal, a permissive fallback that can
/// mask real differences for such types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CimValue {
    Boolean(bool),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Sint8(i8),
    Sint16(i16),
    Sint32(i32),
    Sint64(i64),
    Real32(f32),
    Real64(f64),
    Str(String),
    /// CIM datetime in its string form
    DateTime(String),
    /// Reference to another object, compared via canonical path text
    Reference(String),
    /// Embedded instance, compared recursively
    Instance(Box<CimInstance>),
    /// Order-sensitive array; equal length required
    Array(Vec<CimValue>),
    /// Unsupported CIM type
    Opaque,
}

impl PartialEq for CimValue {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        use CimValue::*;
        match (self, other) {
            (Boolean(a), Boolean(b)) => a == b,
            (Uint8(a), Uint8(b)) => a == b,
            (Uint16(a), Uint16(b)) => a == b,
            (Uint32(a), Uint32(b)) => a == b,
            (Uint64(a), Uint64(b)) => a == b,
            (Sint8(a), Sint8(b)) => a == b,
            (Sint16(a), Sint16(b)) => a == b,
            (Sint32(a), Sint32(b)) => a == b,
            (Sint64(a), Sint64(b)) => a == b,
            (Real32(a), Real32(b)) => a == b,
            (Real64(a), Real64(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (DateTime(a), DateTime(b)) => a == b,
            (Reference(a), Reference(b)) => a == b,
            (Instance(a), Instance(b)) => a.full_eq(b),
            (Array(a), Array(b)) => a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y),
            (Opaque, Opaque) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CimProperty {
    pub name: String,
    pub value: CimValue,
    /// Key properties form the instance identity
    pub is_key: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CimInstance {
    pub class_name: String,
    properties: Vec<CimProperty>,
}

impl PartialEq for CimInstance {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.full_eq(other)
    }
}

impl CimInstance {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            properties: Vec::new(),
        }
    }

    /// Builder-style addition of a key property.
    pub fn with_key(
        mut self,
        name: impl Into<String>,
        value: CimValue,
    ) -> Self {
        self.properties.push(CimProperty {
            name: name.into(),
            value,
            is_key: true,
        });
        self
    }

    /// Builder-style addition of an ordinary property.
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        value: CimValue,
    ) -> Self {
        self.properties.push(CimProperty {
            name: name.into(),
            value,
            is_key: false,
        });
        self
    }

    pub fn set_property(
        &mut self,
        name: impl Into<String>,
        value: CimValue,
    ) {
        let name = name.into();
        match self.properties.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.value = value,
            None => self.properties.push(CimProperty {
                name,
                value,
                is_key: false,
            }),
        }
    }

    /// Name-indexed lookup.
    pub fn property(
        &self,
        name: &str,
    ) -> Option<&CimProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn properties(&self) -> impl Iterator<Item = &CimProperty> {
        self.properties.iter()
    }

    pub fn key_properties(&self) -> impl Iterator<Item = &CimProperty> {
        self.properties.iter().filter(|p| p.is_key)
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    pub fn key_count(&self) -> usize {
        self.properties.iter().filter(|p| p.is_key).count()
    }

    /// Full, order-independent equality: same class, same property count,
    /// every property present in `other` by name with an equal value.
    pub fn full_eq(
        &self,
        other: &CimInstance,
    ) -> bool {
        if self.class_name != other.class_name {
            return false;
        }
        if self.property_count() != other.property_count() {
            return false;
        }
        self.properties.iter().all(|p| match other.property(&p.name) {
            Some(q) => p.value == q.value && p.is_key == q.is_key,
            None => false,
        })
    }
}
