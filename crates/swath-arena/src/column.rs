//! Typed contiguous buffers.
//!
//! A [`Column`] is one zero-initialised `Vec<T>` tagged with the
//! [`PrimitiveType`] it was declared as. Scalar buffers, shared array
//! buffers, and all of their shadows are columns.

use std::any::type_name;
use std::ops::Range;

use swath_core::{clamp_u8, PrimitiveType};

use crate::error::StoreError;

/// A contiguous buffer of one primitive type.
///
/// `Bool` and `U8Clamped` are stored as bytes but keep their own variant
/// so the declared type survives resizes and shows up in diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    /// `bool` as 0/1 bytes.
    Bool(Vec<u8>),
    /// `i8`.
    I8(Vec<i8>),
    /// `ui8`.
    U8(Vec<u8>),
    /// `ui8c`.
    U8Clamped(Vec<u8>),
    /// `i16`.
    I16(Vec<i16>),
    /// `ui16`.
    U16(Vec<u16>),
    /// `i32`.
    I32(Vec<i32>),
    /// `ui32`.
    U32(Vec<u32>),
    /// `f32`.
    F32(Vec<f32>),
    /// `f64`.
    F64(Vec<f64>),
}

/// Run `$body` with `$v` bound to the inner `Vec`, whatever its type.
macro_rules! with_vec {
    ($col:expr, $v:ident => $body:expr) => {
        match $col {
            Column::Bool($v) => $body,
            Column::I8($v) => $body,
            Column::U8($v) => $body,
            Column::U8Clamped($v) => $body,
            Column::I16($v) => $body,
            Column::U16($v) => $body,
            Column::I32($v) => $body,
            Column::U32($v) => $body,
            Column::F32($v) => $body,
            Column::F64($v) => $body,
        }
    };
}

/// Like `with_vec!`, but rewraps the result in the same variant.
macro_rules! map_vec {
    ($col:expr, $v:ident => $body:expr) => {
        match $col {
            Column::Bool($v) => Column::Bool($body),
            Column::I8($v) => Column::I8($body),
            Column::U8($v) => Column::U8($body),
            Column::U8Clamped($v) => Column::U8Clamped($body),
            Column::I16($v) => Column::I16($body),
            Column::U16($v) => Column::U16($body),
            Column::I32($v) => Column::I32($body),
            Column::U32($v) => Column::U32($body),
            Column::F32($v) => Column::F32($body),
            Column::F64($v) => Column::F64($body),
        }
    };
}

/// Pair two columns of the same variant, or evaluate `$mismatch`.
macro_rules! zip_vec {
    ($a:expr, $b:expr, $x:ident, $y:ident => $body:expr, else $mismatch:expr) => {
        match ($a, $b) {
            (Column::Bool($x), Column::Bool($y)) => $body,
            (Column::I8($x), Column::I8($y)) => $body,
            (Column::U8($x), Column::U8($y)) => $body,
            (Column::U8Clamped($x), Column::U8Clamped($y)) => $body,
            (Column::I16($x), Column::I16($y)) => $body,
            (Column::U16($x), Column::U16($y)) => $body,
            (Column::I32($x), Column::I32($y)) => $body,
            (Column::U32($x), Column::U32($y)) => $body,
            (Column::F32($x), Column::F32($y)) => $body,
            (Column::F64($x), Column::F64($y)) => $body,
            _ => $mismatch,
        }
    };
}

impl Column {
    /// Allocate `len` zeroed elements of `ty`.
    pub fn zeroed(ty: PrimitiveType, len: usize) -> Self {
        match ty {
            PrimitiveType::Bool => Self::Bool(vec![0; len]),
            PrimitiveType::I8 => Self::I8(vec![0; len]),
            PrimitiveType::U8 => Self::U8(vec![0; len]),
            PrimitiveType::U8Clamped => Self::U8Clamped(vec![0; len]),
            PrimitiveType::I16 => Self::I16(vec![0; len]),
            PrimitiveType::U16 => Self::U16(vec![0; len]),
            PrimitiveType::I32 => Self::I32(vec![0; len]),
            PrimitiveType::U32 => Self::U32(vec![0; len]),
            PrimitiveType::F32 => Self::F32(vec![0.0; len]),
            PrimitiveType::F64 => Self::F64(vec![0.0; len]),
        }
    }

    /// The declared primitive type.
    pub fn ty(&self) -> PrimitiveType {
        match self {
            Self::Bool(_) => PrimitiveType::Bool,
            Self::I8(_) => PrimitiveType::I8,
            Self::U8(_) => PrimitiveType::U8,
            Self::U8Clamped(_) => PrimitiveType::U8Clamped,
            Self::I16(_) => PrimitiveType::I16,
            Self::U16(_) => PrimitiveType::U16,
            Self::I32(_) => PrimitiveType::I32,
            Self::U32(_) => PrimitiveType::U32,
            Self::F32(_) => PrimitiveType::F32,
            Self::F64(_) => PrimitiveType::F64,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        with_vec!(self, v => v.len())
    }

    /// Whether the column holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the backing storage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.len() * self.ty().bytes()
    }

    /// Zero every element in place.
    pub fn fill_zero(&mut self) {
        with_vec!(self, v => v.fill(Default::default()))
    }

    /// Whether every element is zero.
    pub fn is_zeroed(&self) -> bool {
        with_vec!(self, v => v.iter().all(|x| *x == Default::default()))
    }

    /// A new column of `len` elements with this column's contents copied
    /// into the prefix. Elements past the old length are zero.
    pub fn resized(&self, len: usize) -> Self {
        map_vec!(self, v => {
            let mut out = v.clone();
            out.resize(len, Default::default());
            out
        })
    }

    /// Copy `len` elements from `src[src_offset..]` into `self[dst_offset..]`.
    ///
    /// Fails with [`StoreError::OutOfBounds`] if either range falls
    /// outside its column, copying nothing.
    pub fn copy_region_from(
        &mut self,
        src: &Column,
        src_offset: usize,
        dst_offset: usize,
        len: usize,
    ) -> Result<(), StoreError> {
        let expected = self.ty().name();
        let found = src.ty();
        let from = checked_range(src_offset, len, src.len())?;
        let to = checked_range(dst_offset, len, self.len())?;
        zip_vec!(self, src, dst, s => {
            dst[to].copy_from_slice(&s[from]);
            Ok(())
        }, else Err(StoreError::TypeMismatch { expected, found }))
    }

    /// Typed read access.
    pub fn as_slice<T: Element>(&self) -> Result<&[T], StoreError> {
        T::slice(self).ok_or(StoreError::TypeMismatch {
            expected: type_name::<T>(),
            found: self.ty(),
        })
    }

    /// Typed write access.
    pub fn as_mut_slice<T: Element>(&mut self) -> Result<&mut [T], StoreError> {
        let found = self.ty();
        T::slice_mut(self).ok_or(StoreError::TypeMismatch {
            expected: type_name::<T>(),
            found,
        })
    }

    /// Typed read access to a sub-range.
    pub fn range<T: Element>(&self, range: Range<usize>) -> Result<&[T], StoreError> {
        let slice = self.as_slice::<T>()?;
        let len = slice.len();
        slice.get(range.clone()).ok_or(out_of_bounds(range, len))
    }

    /// Typed write access to a sub-range.
    pub fn range_mut<T: Element>(&mut self, range: Range<usize>) -> Result<&mut [T], StoreError> {
        let slice = self.as_mut_slice::<T>()?;
        let len = slice.len();
        slice.get_mut(range.clone()).ok_or(out_of_bounds(range, len))
    }

    /// Store `value` at `index` with clamped 8-bit semantics.
    ///
    /// Only valid on `ui8c` columns.
    pub fn set_clamped(&mut self, index: usize, value: f64) -> Result<(), StoreError> {
        match self {
            Self::U8Clamped(v) => {
                let len = v.len();
                let slot = v
                    .get_mut(index)
                    .ok_or(out_of_bounds(index..index.saturating_add(1), len))?;
                *slot = clamp_u8(value);
                Ok(())
            }
            other => Err(StoreError::TypeMismatch {
                expected: "ui8c",
                found: other.ty(),
            }),
        }
    }
}

/// A Rust element type that can view a [`Column`].
///
/// `u8` views `bool`, `ui8`, and `ui8c` columns alike.
pub trait Element: Copy + Default + PartialEq + std::fmt::Debug + 'static {
    /// Borrow the column's storage, if it holds this type.
    fn slice(column: &Column) -> Option<&[Self]>;
    /// Mutably borrow the column's storage, if it holds this type.
    fn slice_mut(column: &mut Column) -> Option<&mut [Self]>;
}

macro_rules! impl_element {
    ($ty:ty => $($variant:ident)|+) => {
        impl Element for $ty {
            fn slice(column: &Column) -> Option<&[Self]> {
                match column {
                    $(Column::$variant(v))|+ => Some(v.as_slice()),
                    _ => None,
                }
            }

            fn slice_mut(column: &mut Column) -> Option<&mut [Self]> {
                match column {
                    $(Column::$variant(v))|+ => Some(v.as_mut_slice()),
                    _ => None,
                }
            }
        }
    };
}

fn out_of_bounds(range: Range<usize>, len: usize) -> StoreError {
    StoreError::OutOfBounds {
        start: range.start,
        end: range.end,
        len,
    }
}

fn checked_range(start: usize, len: usize, bound: usize) -> Result<Range<usize>, StoreError> {
    match start.checked_add(len) {
        Some(end) if end <= bound => Ok(start..end),
        end => Err(StoreError::OutOfBounds {
            start,
            end: end.unwrap_or(usize::MAX),
            len: bound,
        }),
    }
}

impl_element!(u8 => Bool | U8 | U8Clamped);
impl_element!(i8 => I8);
impl_element!(i16 => I16);
impl_element!(u16 => U16);
impl_element!(i32 => I32);
impl_element!(u32 => U32);
impl_element!(f32 => F32);
impl_element!(f64 => F64);
