//! Collection sizes as first-class values.
//!
//! Reading a field as a cardinality yields the number of elements in each
//! collection cell without materializing the elements themselves. The two
//! widths mirror the 32- and 64-bit index column encodings.

/// Number of elements in one collection cell, 32-bit width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cardinality32(u32);

impl Cardinality32 {
    pub const fn new(count: u32) -> Self {
        Self(count)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for Cardinality32 {
    fn from(count: u32) -> Self {
        Self(count)
    }
}

impl From<Cardinality32> for u32 {
    fn from(cardinality: Cardinality32) -> Self {
        cardinality.0
    }
}

/// Number of elements in one collection cell, 64-bit width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cardinality64(u64);

impl Cardinality64 {
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for Cardinality64 {
    fn from(count: u64) -> Self {
        Self(count)
    }
}

impl From<Cardinality64> for u64 {
    fn from(cardinality: Cardinality64) -> Self {
        cardinality.0
    }
}
