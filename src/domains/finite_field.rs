use std::fmt::{Display, Formatter};

use rand::Rng as _;
use rug::{ops::RemRounding, Integer as MultiPrecisionInteger};

use crate::utils;

use super::{ConvertToRing, Field, Ring};

/// A prime field `Z/pZ` with a prime `p < 2^63`. Elements are stored as `u64` in `[0, p)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FiniteField {
    p: u64,
}

impl FiniteField {
    /// Create a new prime field. Returns `None` if `p` is not a prime or too large.
    pub fn new(p: u64) -> Option<FiniteField> {
        if p >= 1 << 63 || !utils::is_prime_u64(p) {
            return None;
        }

        Some(FiniteField { p })
    }
}

impl Display for FiniteField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Z_{}", self.p)
    }
}

impl Ring for FiniteField {
    type Element = u64;

    #[inline]
    fn add(&self, a: &u64, b: &u64) -> u64 {
        // both operands are below 2^63, so the sum cannot overflow
        let r = a + b;
        if r >= self.p {
            r - self.p
        } else {
            r
        }
    }

    #[inline]
    fn sub(&self, a: &u64, b: &u64) -> u64 {
        if a >= b {
            a - b
        } else {
            a + (self.p - b)
        }
    }

    #[inline]
    fn mul(&self, a: &u64, b: &u64) -> u64 {
        ((*a as u128 * *b as u128) % self.p as u128) as u64
    }

    #[inline]
    fn add_assign(&self, a: &mut u64, b: &u64) {
        *a = self.add(a, b);
    }

    #[inline]
    fn mul_assign(&self, a: &mut u64, b: &u64) {
        *a = self.mul(a, b);
    }

    #[inline]
    fn add_mul_assign(&self, a: &mut u64, b: &u64, c: &u64) {
        *a = self.add(a, &self.mul(b, c));
    }

    #[inline]
    fn neg(&self, a: &u64) -> u64 {
        if *a == 0 {
            0
        } else {
            self.p - a
        }
    }

    #[inline]
    fn zero(&self) -> u64 {
        0
    }

    #[inline]
    fn one(&self) -> u64 {
        1
    }

    fn pow(&self, b: &u64, mut e: u64) -> u64 {
        let mut base = *b;
        let mut res = 1;
        while e > 0 {
            if e & 1 == 1 {
                res = self.mul(&res, &base);
            }
            base = self.mul(&base, &base);
            e >>= 1;
        }
        res
    }

    #[inline]
    fn is_zero(a: &u64) -> bool {
        *a == 0
    }

    #[inline]
    fn is_one(&self, a: &u64) -> bool {
        *a == 1
    }

    fn sample(&self, rng: &mut impl rand::RngCore, range: (i64, i64)) -> u64 {
        let r = rng.gen_range(range.0..range.1);
        self.element_from_i64(r)
    }
}

impl Field for FiniteField {
    #[inline]
    fn div(&self, a: &u64, b: &u64) -> u64 {
        self.mul(a, &self.inv(b))
    }

    /// Invert with the extended Euclidean algorithm.
    fn inv(&self, a: &u64) -> u64 {
        if *a == 0 {
            panic!("Division by zero in {}", self);
        }

        let (mut t, mut new_t) = (0i128, 1i128);
        let (mut r, mut new_r) = (self.p as i128, *a as i128);
        while new_r != 0 {
            let q = r / new_r;
            (t, new_t) = (new_t, t - q * new_t);
            (r, new_r) = (new_r, r - q * new_r);
        }

        if t < 0 {
            t += self.p as i128;
        }
        t as u64
    }
}

impl ConvertToRing for FiniteField {
    fn element_from_integer(&self, number: MultiPrecisionInteger) -> u64 {
        number
            .rem_euc(MultiPrecisionInteger::from(self.p))
            .to_u64_wrapping()
    }
}

#[cfg(test)]
mod test {
    use crate::domains::{ConvertToRing, Field, Ring};

    use super::FiniteField;

    #[test]
    fn only_primes() {
        assert!(FiniteField::new(13).is_some());
        assert!(FiniteField::new(15).is_none());
        assert!(FiniteField::new(1).is_none());
        assert!(FiniteField::new(18446744073709551557).is_none());
        assert!(FiniteField::new(9223372036854775783).is_some());
    }

    #[test]
    fn arithmetic() {
        let f = FiniteField::new(13).unwrap();
        assert_eq!(f.add(&7, &9), 3);
        assert_eq!(f.sub(&2, &5), 10);
        assert_eq!(f.neg(&4), 9);
        assert_eq!(f.mul(&f.inv(&5), &5), 1);
        assert_eq!(f.pow(&2, 12), 1);
        assert_eq!(f.element_from_i64(-1), 12);
    }
}
