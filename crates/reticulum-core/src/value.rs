//! Loosely-typed structured values decoded from announce app_data.
//!
//! Peers attach msgpack-encoded app_data to their announces. The shape of that
//! data is entirely under the peer's control, so it is decoded into a tagged
//! [`Value`] tree whose accessors return `Option` instead of panicking on a
//! wrong variant or an out-of-range index.

use crate::error::DecodeError;

/// A decoded structured value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    /// Any msgpack integer, signed or unsigned, without loss.
    Int(i128),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    /// Key/value pairs in wire order.
    Map(Vec<(Value, Value)>),
}

impl Value {
    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i128> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Element `index` of an array value.
    ///
    /// Returns `None` both for non-arrays and for indices past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.as_array().and_then(|items| items.get(index))
    }

    /// Coerce this value to an integer.
    ///
    /// Integers pass through and finite floats truncate toward zero. Booleans,
    /// strings (even numeric-looking ones), and containers do not coerce.
    #[must_use]
    pub fn to_integer(&self) -> Option<i128> {
        match self {
            Value::Int(n) => Some(*n),
            // i128::MAX is about 1.7e38; anything beyond that cannot be held.
            Value::Float(f) if f.is_finite() && f.abs() < 1.0e38 => Some(f.trunc() as i128),
            _ => None,
        }
    }
}

impl From<rmpv::Value> for Value {
    fn from(value: rmpv::Value) -> Self {
        match value {
            rmpv::Value::Nil => Value::Nil,
            rmpv::Value::Boolean(b) => Value::Bool(b),
            rmpv::Value::Integer(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Value::Int(i128::from(i)),
                (None, Some(u)) => Value::Int(i128::from(u)),
                (None, None) => Value::Nil,
            },
            rmpv::Value::F32(f) => Value::Float(f64::from(f)),
            rmpv::Value::F64(f) => Value::Float(f),
            rmpv::Value::String(s) => {
                if s.is_str() {
                    s.into_str().map_or(Value::Nil, Value::Str)
                } else {
                    Value::Bytes(s.into_bytes())
                }
            }
            rmpv::Value::Binary(b) => Value::Bytes(b),
            rmpv::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            rmpv::Value::Map(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (Value::from(k), Value::from(v)))
                    .collect(),
            ),
            rmpv::Value::Ext(_, data) => Value::Bytes(data),
        }
    }
}

/// Decode one msgpack value from the front of `data`.
///
/// Bytes following the first complete value are ignored.
pub fn unpack(data: &[u8]) -> Result<Value, DecodeError> {
    if data.is_empty() {
        return Err(DecodeError::Empty);
    }

    check_bounds(data)?;
    let value = rmpv::decode::read_value(&mut &data[..])
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;
    Ok(Value::from(value))
}

/// Deepest container nesting accepted from a peer.
pub const MAX_DEPTH: usize = 128;

/// Walk the first msgpack value in `data` without building it.
///
/// Every declared string, binary or container length must fit in the bytes
/// that remain, so a few-byte header cannot claim gigabytes of contents.
fn check_bounds(data: &[u8]) -> Result<(), DecodeError> {
    // Items still expected at each open nesting level.
    let mut open: Vec<u64> = vec![1];
    let mut pos = 0usize;

    while let Some(left) = open.last_mut() {
        if *left == 0 {
            open.pop();
            continue;
        }
        *left -= 1;

        let marker = *data.get(pos).ok_or_else(|| malformed("truncated value"))?;
        pos += 1;

        let (skip, children): (u64, u64) = match marker {
            0x00..=0x7f | 0xc0 | 0xc2 | 0xc3 | 0xe0..=0xff => (0, 0),
            0x80..=0x8f => (0, 2 * u64::from(marker & 0x0f)),
            0x90..=0x9f => (0, u64::from(marker & 0x0f)),
            0xa0..=0xbf => (u64::from(marker & 0x1f), 0),
            0xc1 => return Err(malformed("reserved marker 0xc1")),
            0xc4 | 0xd9 => (read_len(data, &mut pos, 1)?, 0),
            0xc5 | 0xda => (read_len(data, &mut pos, 2)?, 0),
            0xc6 | 0xdb => (read_len(data, &mut pos, 4)?, 0),
            // ext: type byte follows the length
            0xc7 => (read_len(data, &mut pos, 1)? + 1, 0),
            0xc8 => (read_len(data, &mut pos, 2)? + 1, 0),
            0xc9 => (read_len(data, &mut pos, 4)? + 1, 0),
            0xcc | 0xd0 => (1, 0),
            0xcd | 0xd1 => (2, 0),
            0xca | 0xce | 0xd2 => (4, 0),
            0xcb | 0xcf | 0xd3 => (8, 0),
            0xd4 => (2, 0),
            0xd5 => (3, 0),
            0xd6 => (5, 0),
            0xd7 => (9, 0),
            0xd8 => (17, 0),
            0xdc => (0, read_len(data, &mut pos, 2)?),
            0xdd => (0, read_len(data, &mut pos, 4)?),
            0xde => (0, 2 * read_len(data, &mut pos, 2)?),
            0xdf => (0, 2 * read_len(data, &mut pos, 4)?),
        };

        if skip > remaining(data, pos) {
            return Err(malformed("declared length exceeds input"));
        }
        // Bounded by data.len() after the check above.
        pos += skip as usize;

        if children > 0 {
            // Every item occupies at least one byte.
            if children > remaining(data, pos) {
                return Err(malformed("container length exceeds input"));
            }
            if open.len() >= MAX_DEPTH {
                return Err(malformed("nesting too deep"));
            }
            open.push(children);
        }
    }
    Ok(())
}

fn remaining(data: &[u8], pos: usize) -> u64 {
    data.len().saturating_sub(pos) as u64
}

/// Read a `width`-byte big-endian length at `pos`.
fn read_len(data: &[u8], pos: &mut usize, width: usize) -> Result<u64, DecodeError> {
    let bytes = data
        .get(*pos..*pos + width)
        .ok_or_else(|| malformed("truncated length"))?;
    *pos += width;
    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

fn malformed(what: &str) -> DecodeError {
    DecodeError::Malformed(what.to_string())
}
