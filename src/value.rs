//! Numeric value types the counting tables can hold.

use core::cmp::Ordering;
use core::fmt::Debug;
use core::ops::Add;

mod private {
    pub trait Sealed {}

    impl Sealed for i32 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// A value type for the counting and accumulating tables: `i32`, `f32` or
/// `f64`.
///
/// Sealed; the set of implementors is fixed.
pub trait Numeric: Copy + Debug + Default + PartialEq + private::Sealed {
    /// Additive identity, also the "not found" value of object-keyed maps.
    const ZERO: Self;
    /// Step used by `increment`.
    const ONE: Self;

    /// Wider type that sums are accumulated in.
    type Sum: Copy + Debug + Default + PartialEq + Add<Output = Self::Sum>;

    /// Adds `rhs`. Integer addition wraps on overflow.
    fn plus(self, rhs: Self) -> Self;

    /// Subtracts `rhs`. Integer subtraction wraps on overflow.
    fn minus(self, rhs: Self) -> Self;

    /// Widens into the sum type.
    fn widen(self) -> Self::Sum;

    /// Total order used when sorting by value. Floats follow
    /// [`f32::total_cmp`].
    fn order(&self, other: &Self) -> Ordering;
}

impl Numeric for i32 {
    const ZERO: Self = 0;
    const ONE: Self = 1;

    type Sum = i64;

    #[inline(always)]
    fn plus(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }

    #[inline(always)]
    fn minus(self, rhs: Self) -> Self {
        self.wrapping_sub(rhs)
    }

    #[inline(always)]
    fn widen(self) -> i64 {
        self as i64
    }

    #[inline(always)]
    fn order(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl Numeric for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    type Sum = f64;

    #[inline(always)]
    fn plus(self, rhs: Self) -> Self {
        self + rhs
    }

    #[inline(always)]
    fn minus(self, rhs: Self) -> Self {
        self - rhs
    }

    #[inline(always)]
    fn widen(self) -> f64 {
        self as f64
    }

    #[inline(always)]
    fn order(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl Numeric for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    type Sum = f64;

    #[inline(always)]
    fn plus(self, rhs: Self) -> Self {
        self + rhs
    }

    #[inline(always)]
    fn minus(self, rhs: Self) -> Self {
        self - rhs
    }

    #[inline(always)]
    fn widen(self) -> f64 {
        self
    }

    #[inline(always)]
    fn order(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

/// A value type that fits the 32-bit value half of a packed slot.
pub trait PackedValue: Numeric {
    /// Returned by `get` when the key is absent.
    const NO_RESULT: Self;

    /// Raw bits stored in the slot.
    fn to_bits(self) -> u32;

    /// Inverse of [`to_bits`](PackedValue::to_bits).
    fn from_bits(bits: u32) -> Self;
}

impl PackedValue for i32 {
    const NO_RESULT: Self = i32::MIN;

    #[inline(always)]
    fn to_bits(self) -> u32 {
        self as u32
    }

    #[inline(always)]
    fn from_bits(bits: u32) -> Self {
        bits as i32
    }
}

impl PackedValue for f32 {
    const NO_RESULT: Self = i32::MIN as f32;

    #[inline(always)]
    fn to_bits(self) -> u32 {
        f32::to_bits(self)
    }

    #[inline(always)]
    fn from_bits(bits: u32) -> Self {
        f32::from_bits(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_wraps() {
        assert_eq!(i32::MAX.plus(1), i32::MIN);
        assert_eq!(i32::MIN.minus(1), i32::MAX);
        assert_eq!(i32::MAX.widen() + 1, 1i64 << 31);
    }

    #[test]
    fn float_bits_survive_negative_zero_and_nan() {
        assert_eq!(<f32 as PackedValue>::from_bits((-0.0f32).to_bits()).to_bits(), 0x8000_0000);
        assert!(<f32 as PackedValue>::from_bits(f32::NAN.to_bits()).is_nan());
        assert_eq!(<f32 as PackedValue>::NO_RESULT, -2147483648.0);
    }

    #[test]
    fn float_order_is_total() {
        assert_eq!(1.0f32.order(&2.0), Ordering::Less);
        assert_eq!(f64::NAN.order(&f64::INFINITY), Ordering::Greater);
    }
}
