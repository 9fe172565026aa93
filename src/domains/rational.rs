use std::fmt::{Display, Formatter};

use rand::Rng as _;
use rug::{ops::Pow, Integer as MultiPrecisionInteger, Rational as ArbitraryPrecisionRational};

use crate::utils;

use super::{ConvertToRing, Field, Ring};

/// The field of rational numbers.
pub const Q: RationalField = RationalField;

/// The field of rational numbers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct RationalField;

impl Display for RationalField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Q")
    }
}

/// A rational number. Small values are stored inline, larger ones use
/// arbitrary precision.
///
/// The representation is always canonical: the denominator is positive, the fraction is
/// reduced, and a value is only stored as `Large` when it does not fit in `Natural`.
/// As a result, structural equality is numeric equality.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Rational {
    Natural(i64, i64),
    Large(ArbitraryPrecisionRational),
}

impl Rational {
    /// Create a new rational `num/den`. Panics if `den` is zero.
    pub fn new(num: i64, den: i64) -> Rational {
        Rational::from_i128(num as i128, den as i128)
    }

    fn from_i128(mut num: i128, mut den: i128) -> Rational {
        if den == 0 {
            panic!("Rational with zero denominator");
        }

        if den < 0 {
            num = -num;
            den = -den;
        }

        let g = utils::gcd_signed_i128(num, den) as i128;
        if g > 1 {
            num /= g;
            den /= g;
        }

        match (i64::try_from(num), i64::try_from(den)) {
            (Ok(n), Ok(d)) if n != i64::MIN => Rational::Natural(n, d),
            _ => Rational::Large(ArbitraryPrecisionRational::from((
                MultiPrecisionInteger::from(num),
                MultiPrecisionInteger::from(den),
            ))),
        }
    }

    /// Downcast an arbitrary precision rational if it fits.
    pub fn from_large(r: ArbitraryPrecisionRational) -> Rational {
        if let (Some(n), Some(d)) = (r.numer().to_i64(), r.denom().to_i64()) {
            if n != i64::MIN {
                return Rational::Natural(n, d);
            }
        }

        Rational::Large(r)
    }

    pub fn to_large(&self) -> ArbitraryPrecisionRational {
        match self {
            Rational::Natural(n, d) => ArbitraryPrecisionRational::from((*n, *d)),
            Rational::Large(r) => r.clone(),
        }
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Rational::new(value, 1)
    }
}

impl From<(i64, i64)> for Rational {
    fn from(value: (i64, i64)) -> Self {
        Rational::new(value.0, value.1)
    }
}

impl From<MultiPrecisionInteger> for Rational {
    fn from(value: MultiPrecisionInteger) -> Self {
        Rational::from_large(ArbitraryPrecisionRational::from(value))
    }
}

impl Display for Rational {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rational::Natural(n, d) => {
                if *d == 1 {
                    write!(f, "{}", n)
                } else {
                    write!(f, "{}/{}", n, d)
                }
            }
            Rational::Large(r) => {
                if *r.denom() == 1 {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
        }
    }
}

impl Ring for RationalField {
    type Element = Rational;

    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        match (a, b) {
            (Rational::Natural(n1, d1), Rational::Natural(n2, d2)) => {
                // products of i64 fit in an i128, and so does their sum
                Rational::from_i128(
                    *n1 as i128 * *d2 as i128 + *n2 as i128 * *d1 as i128,
                    *d1 as i128 * *d2 as i128,
                )
            }
            _ => Rational::from_large(a.to_large() + b.to_large()),
        }
    }

    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        match (a, b) {
            (Rational::Natural(n1, d1), Rational::Natural(n2, d2)) => Rational::from_i128(
                *n1 as i128 * *d2 as i128 - *n2 as i128 * *d1 as i128,
                *d1 as i128 * *d2 as i128,
            ),
            _ => Rational::from_large(a.to_large() - b.to_large()),
        }
    }

    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        match (a, b) {
            (Rational::Natural(n1, d1), Rational::Natural(n2, d2)) => {
                Rational::from_i128(*n1 as i128 * *n2 as i128, *d1 as i128 * *d2 as i128)
            }
            _ => Rational::from_large(a.to_large() * b.to_large()),
        }
    }

    fn add_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = self.add(a, b);
    }

    fn mul_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = self.mul(a, b);
    }

    fn add_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element) {
        *a = self.add(a, &self.mul(b, c));
    }

    fn neg(&self, a: &Self::Element) -> Self::Element {
        match a {
            // the canonical form never stores i64::MIN as numerator
            Rational::Natural(n, d) => Rational::Natural(-n, *d),
            Rational::Large(r) => Rational::from_large(-r.clone()),
        }
    }

    fn zero(&self) -> Self::Element {
        Rational::Natural(0, 1)
    }

    fn one(&self) -> Self::Element {
        Rational::Natural(1, 1)
    }

    fn pow(&self, b: &Self::Element, e: u64) -> Self::Element {
        if e > u32::MAX as u64 {
            panic!("Power of exponentiation is larger than 2^32: {}", e);
        }
        let e = e as u32;

        if let Rational::Natural(n, d) = b {
            if let (Some(pn), Some(pd)) = (n.checked_pow(e), d.checked_pow(e)) {
                return Rational::new(pn, pd);
            }
        }

        Rational::from_large(b.to_large().pow(e))
    }

    fn is_zero(a: &Self::Element) -> bool {
        match a {
            Rational::Natural(n, _) => *n == 0,
            Rational::Large(_) => false,
        }
    }

    fn is_one(&self, a: &Self::Element) -> bool {
        matches!(a, Rational::Natural(1, 1))
    }

    fn sample(&self, rng: &mut impl rand::RngCore, range: (i64, i64)) -> Self::Element {
        let r = rng.gen_range(range.0..range.1);
        Rational::new(r, 1)
    }
}

impl Field for RationalField {
    fn div(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        self.mul(a, &self.inv(b))
    }

    fn inv(&self, a: &Self::Element) -> Self::Element {
        match a {
            Rational::Natural(0, _) => panic!("Division by zero"),
            Rational::Natural(n, d) => Rational::new(*d, *n),
            Rational::Large(r) => Rational::from_large(r.clone().recip()),
        }
    }
}

impl ConvertToRing for RationalField {
    fn element_from_integer(&self, number: MultiPrecisionInteger) -> Self::Element {
        number.into()
    }
}
