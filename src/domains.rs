//! Defines the coefficient domains of polynomials.
//!
//! The core trait is [Ring], which has two binary operations, addition and multiplication.
//! Each ring has an associated element type, that should not be confused with the ring type itself.
//! For example:
//! - The field of rational numbers [Q](rational::Q) has elements of type [Rational](rational::Rational).
//! - A prime field [FiniteField](finite_field::FiniteField) has elements of type `u64`.
//!
//! The ring elements do not implement operations such as addition or multiplication,
//! but rather the ring itself does. All polynomial structures are generic over the ring type.
//!
//! The [`Field`] trait extends a ring with division and inversion, which Groebner basis
//! computations require.
pub mod finite_field;
pub mod rational;

use std::fmt::{Debug, Display};
use std::hash::Hash;

use rug::Integer as MultiPrecisionInteger;

/// A ring is a set with two binary operations, addition and multiplication.
pub trait Ring: Clone + PartialEq + Eq + Hash + Debug + Display {
    /// The element of a ring. For example, the elements of [Q](rational::Q) are [Rational](rational::Rational).
    type Element: Clone + PartialEq + Eq + Hash + Debug + Display;

    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn add_assign(&self, a: &mut Self::Element, b: &Self::Element);
    fn mul_assign(&self, a: &mut Self::Element, b: &Self::Element);
    fn add_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element);
    fn neg(&self, a: &Self::Element) -> Self::Element;
    fn zero(&self) -> Self::Element;
    fn one(&self) -> Self::Element;
    fn pow(&self, b: &Self::Element, e: u64) -> Self::Element;
    fn is_zero(a: &Self::Element) -> bool;
    fn is_one(&self, a: &Self::Element) -> bool;

    /// Sample a small element, used for generating test data.
    fn sample(&self, rng: &mut impl rand::RngCore, range: (i64, i64)) -> Self::Element;
}

/// A field is a ring that supports division and inversion.
pub trait Field: Ring {
    fn div(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    /// Invert `a`. Panics when `a` is zero.
    fn inv(&self, a: &Self::Element) -> Self::Element;
}

/// Map integer literals into a ring.
pub trait ConvertToRing: Ring {
    fn element_from_integer(&self, number: MultiPrecisionInteger) -> Self::Element;

    fn element_from_i64(&self, number: i64) -> Self::Element {
        self.element_from_integer(MultiPrecisionInteger::from(number))
    }
}
