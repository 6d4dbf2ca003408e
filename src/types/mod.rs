pub mod rstring;
pub mod hash;

use crate::error::{ShardisError, ShardisResult};
use hash::MapValue;
use rstring::StringValue;

/// The type an operation declares for the key it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Map,
}

/// A write against a typed value.
#[derive(Debug, Clone, Copy)]
pub enum Update<'a> {
    String(&'a [u8]),
    /// Flat `field, value, ...` pairs.
    Map(&'a [Vec<u8>]),
}

/// Result of a typed read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    String(Vec<u8>),
    Fields(Vec<Vec<u8>>),
}

/// The value stored under a key. The variant is fixed by the first write.
#[derive(Debug, Clone)]
pub enum Value {
    String(StringValue),
    Map(MapValue),
}

impl Value {
    /// Build a fresh value from its first write.
    /// Returns the value and the number of new map fields.
    pub fn create(update: Update<'_>) -> (Self, usize) {
        match update {
            Update::String(s) => (Value::String(StringValue::new(s)), 0),
            Update::Map(pairs) => {
                let mut map = MapValue::new();
                let added = map.set(pairs);
                (Value::Map(map), added)
            }
        }
    }

    /// Apply a write, refusing one that declares another type.
    pub fn apply(&mut self, update: Update<'_>) -> ShardisResult<usize> {
        match (self, update) {
            (Value::String(s), Update::String(data)) => {
                s.set(data);
                Ok(0)
            }
            (Value::Map(m), Update::Map(pairs)) => Ok(m.set(pairs)),
            _ => Err(ShardisError::WrongType),
        }
    }

    /// Read the value as `ty`. `fields` only matters for maps.
    pub fn read(&self, ty: ValueType, fields: &[Vec<u8>]) -> ShardisResult<Fetched> {
        match (self, ty) {
            (Value::String(s), ValueType::String) => Ok(Fetched::String(s.get().to_vec())),
            (Value::Map(m), ValueType::Map) => Ok(Fetched::Fields(m.get(fields))),
            _ => Err(ShardisError::WrongType),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_fixed_by_first_write() {
        let (mut value, _) = Value::create(Update::String(b"5"));

        let pairs = vec![b"f".to_vec(), b"v".to_vec()];
        assert!(matches!(
            value.apply(Update::Map(&pairs)),
            Err(ShardisError::WrongType)
        ));
        assert!(matches!(
            value.read(ValueType::Map, &[]),
            Err(ShardisError::WrongType)
        ));
        assert_eq!(
            value.read(ValueType::String, &[]).unwrap(),
            Fetched::String(b"5".to_vec())
        );
    }

    #[test]
    fn test_create_map_counts_fields() {
        let pairs: Vec<Vec<u8>> = ["a", "1", "b", "2"].iter().map(|s| s.as_bytes().to_vec()).collect();
        let (mut value, added) = Value::create(Update::Map(&pairs));
        assert_eq!(added, 2);
        assert_eq!(
            value.read(ValueType::Map, &[b"b".to_vec()]).unwrap(),
            Fetched::Fields(vec![b"2".to_vec()])
        );
        assert!(matches!(
            value.apply(Update::String(b"x")),
            Err(ShardisError::WrongType)
        ));
    }
}
