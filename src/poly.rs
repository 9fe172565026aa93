//! Exact multivariate polynomials and the algorithms that act on them.
//!
//! A [MultivariatePolynomial](polynomial::MultivariatePolynomial) is generic over its coefficient
//! ring, the integer type used for exponents, and the [MonomialOrder] that determines the
//! leading term.

pub mod groebner;
pub mod monomial;
pub mod polynomial;
pub mod reduce;

use std::cmp::Ordering::{self, Equal};
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use smartstring::{LazyCompact, SmartString};

pub const INLINED_EXPONENTS: usize = 6;

pub trait Exponent:
    Hash
    + Debug
    + Display
    + Ord
    + Sub<Output = Self>
    + Add<Output = Self>
    + Sum<Self>
    + AddAssign
    + Clone
    + Copy
    + PartialEq
    + Eq
    + Send
    + Sync
{
    fn zero() -> Self;
    fn one() -> Self;
    /// Convert the exponent to `u32`. This is always possible, as `u32` is the largest supported exponent type.
    fn to_u32(&self) -> u32;
    /// Convert from `u32`, returning `None` if `n` does not fit.
    fn checked_from_u32(n: u32) -> Option<Self>;
    fn is_zero(&self) -> bool;
    fn checked_add(&self, other: &Self) -> Option<Self>;
}

macro_rules! impl_exponent {
    ($($t:ty),*) => {
        $(
            impl Exponent for $t {
                #[inline]
                fn zero() -> Self {
                    0
                }

                #[inline]
                fn one() -> Self {
                    1
                }

                #[inline]
                fn to_u32(&self) -> u32 {
                    *self as u32
                }

                #[inline]
                fn checked_from_u32(n: u32) -> Option<Self> {
                    <$t>::try_from(n).ok()
                }

                #[inline]
                fn is_zero(&self) -> bool {
                    *self == 0
                }

                #[inline]
                fn checked_add(&self, other: &Self) -> Option<Self> {
                    <$t>::checked_add(*self, *other)
                }
            }
        )*
    };
}

impl_exponent!(u8, u16, u32);

/// A polynomial variable. User variables are named; temporary variables
/// are introduced by algorithms and can never clash with a user name.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Variable {
    Symbol(SmartString<LazyCompact>),
    Temporary(usize),
}

impl Variable {
    pub fn new(name: &str) -> Variable {
        Variable::Symbol(name.into())
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variable::Symbol(s) => f.write_str(s),
            Variable::Temporary(t) => write!(f, "_TMP_{}", t),
        }
    }
}

/// A graded well-order of monomials.
pub trait MonomialOrder: Clone + Copy + Debug + Default + PartialEq + Eq + Hash + Send + Sync {
    fn cmp<E: Exponent>(a: &[E], b: &[E]) -> Ordering;
}

/// Graded reverse lexicographic ordering of monomials.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GrevLexOrder {}

impl MonomialOrder for GrevLexOrder {
    #[inline]
    fn cmp<E: Exponent>(a: &[E], b: &[E]) -> Ordering {
        let deg: u64 = a.iter().map(|e| e.to_u32() as u64).sum();
        let deg2: u64 = b.iter().map(|e| e.to_u32() as u64).sum();

        match deg.cmp(&deg2) {
            Equal => {}
            x => {
                return x;
            }
        }

        for (a1, a2) in a.iter().rev().zip(b.iter().rev()) {
            match a1.cmp(a2) {
                Equal => {}
                x => {
                    return x.reverse();
                }
            }
        }

        Equal
    }
}
