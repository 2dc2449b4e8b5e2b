//! Strong index/measurement newtypes so that byte offsets, display columns,
//! row indices, and grapheme-sequence indices can never be silently
//! substituted for one another at a call site.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

macro_rules! index_newtype {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub usize);

        impl $name {
            #[must_use]
            pub const fn new(value: usize) -> Self {
                Self(value)
            }

            #[must_use]
            pub const fn as_usize(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<usize> for $name {
            fn from(value: usize) -> Self {
                Self(value)
            }
        }

        impl Add<usize> for $name {
            type Output = Self;
            fn add(self, rhs: usize) -> Self {
                Self(self.0 + rhs)
            }
        }

        impl AddAssign<usize> for $name {
            fn add_assign(&mut self, rhs: usize) {
                self.0 += rhs;
            }
        }

        impl Sub<usize> for $name {
            type Output = Self;
            fn sub(self, rhs: usize) -> Self {
                Self(self.0 - rhs)
            }
        }

        impl SubAssign<usize> for $name {
            fn sub_assign(&mut self, rhs: usize) {
                self.0 -= rhs;
            }
        }
    };
}

/// Byte offset into a memory-registry buffer.
index_newtype!(ByteIndex);
/// Display-column offset (monospace grid cell), not a byte or char count.
index_newtype!(ColIndex);
/// A width measured in display columns.
index_newtype!(ColWidth);
/// Zero-based logical line (source line, delimited by `\n`).
index_newtype!(RowIndex);
/// Index of a grapheme cluster within a sequence (not a byte offset).
index_newtype!(SegIndex);
/// A global column offset within the whole buffer (row-independent).
index_newtype!(GlobalColOffset);

impl ColWidth {
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// A half-open column range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColRange {
    pub start: ColIndex,
    pub end: ColIndex,
}

impl ColRange {
    #[must_use]
    pub fn new(start: ColIndex, end: ColIndex) -> Self {
        debug_assert!(start.0 <= end.0, "ColRange start must be <= end");
        Self { start, end }
    }

    #[must_use]
    pub fn width(self) -> ColWidth {
        ColWidth(self.end.0.saturating_sub(self.start.0))
    }

    #[must_use]
    pub fn contains(self, col: ColIndex) -> bool {
        col.0 >= self.start.0 && col.0 < self.end.0
    }
}

/// `{row, col}` pair used for offset/coordinate conversion round-trips.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowCol {
    pub row: RowIndex,
    pub col: ColIndex,
}

impl RowCol {
    #[must_use]
    pub fn new(row: impl Into<RowIndex>, col: impl Into<ColIndex>) -> Self {
        Self {
            row: row.into(),
            col: col.into(),
        }
    }
}
