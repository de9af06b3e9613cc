//! The primitive type catalog and per-field index widths.
//!
//! Every buffer in a store holds exactly one [`PrimitiveType`]. The
//! catalog is closed: schemas naming anything else are rejected at
//! compile time with [`ConfigError::UnknownType`].

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// One of the supported element types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    /// Boolean stored as one byte (0 or 1).
    Bool,
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 8-bit integer with clamping write semantics.
    U8Clamped,
    /// Signed 16-bit integer.
    I16,
    /// Unsigned 16-bit integer.
    U16,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 32-bit integer.
    U32,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
}

impl PrimitiveType {
    /// Every catalog entry in declaration order.
    pub const ALL: [PrimitiveType; 10] = [
        Self::Bool,
        Self::I8,
        Self::U8,
        Self::U8Clamped,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::F32,
        Self::F64,
    ];

    /// Number of catalog entries.
    pub const COUNT: usize = Self::ALL.len();

    /// Canonical schema name (`"f32"`, `"ui8c"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::U8 => "ui8",
            Self::U8Clamped => "ui8c",
            Self::I16 => "i16",
            Self::U16 => "ui16",
            Self::I32 => "i32",
            Self::U32 => "ui32",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// Typed-array family name used by serializers when describing
    /// buffers on the wire. `bool` shares `Uint8` with `ui8`.
    pub fn array_name(self) -> &'static str {
        match self {
            Self::Bool | Self::U8 => "Uint8",
            Self::I8 => "Int8",
            Self::U8Clamped => "Uint8Clamped",
            Self::I16 => "Int16",
            Self::U16 => "Uint16",
            Self::I32 => "Int32",
            Self::U32 => "Uint32",
            Self::F32 => "Float32",
            Self::F64 => "Float64",
        }
    }

    /// Size of one element in bytes.
    pub fn bytes(self) -> usize {
        match self {
            Self::Bool | Self::I8 | Self::U8 | Self::U8Clamped => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// Position of this type in [`PrimitiveType::ALL`].
    pub fn ordinal(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PrimitiveType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|ty| ty.name() == s)
            .ok_or_else(|| ConfigError::UnknownType { name: s.to_string() })
    }
}

/// Smallest unsigned width able to index one entity's array slots.
///
/// This is metadata for the serialization layer, which uses it to size
/// per-entity index encodings. The store never encodes anything itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexWidth {
    /// 8-bit indices (`length < 256`).
    U8,
    /// 16-bit indices (`length < 65536`).
    U16,
    /// 32-bit indices.
    U32,
}

impl IndexWidth {
    /// Select the width for an array field of `length` slots.
    pub fn for_length(length: u32) -> Self {
        if length < 1 << 8 {
            Self::U8
        } else if length < 1 << 16 {
            Self::U16
        } else {
            Self::U32
        }
    }

    /// Bytes per encoded index.
    pub fn bytes(self) -> usize {
        self.element_type().bytes()
    }

    /// The unsigned primitive an index is encoded as.
    pub fn element_type(self) -> PrimitiveType {
        match self {
            Self::U8 => PrimitiveType::U8,
            Self::U16 => PrimitiveType::U16,
            Self::U32 => PrimitiveType::U32,
        }
    }
}

/// Convert a value the way a clamped 8-bit buffer stores it.
///
/// Saturates to `0..=255`, rounds halfway cases to even, and maps NaN
/// to zero.
pub fn clamp_u8(value: f64) -> u8 {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= 255.0 {
        255
    } else {
        value.round_ties_even() as u8
    }
}
