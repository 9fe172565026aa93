use smallvec::SmallVec;

use crate::domains::Ring;

use super::polynomial::MultivariatePolynomial;
use super::{Exponent, MonomialOrder, INLINED_EXPONENTS};

/// Owned exponent vector of a single monomial.
pub type Exponents<E> = SmallVec<[E; INLINED_EXPONENTS]>;

/// Returns true iff the monomial `a` divides the monomial `b`.
#[inline]
pub fn divides<E: Exponent>(a: &[E], b: &[E]) -> bool {
    a.iter().zip(b).all(|(ea, eb)| ea <= eb)
}

/// Compute `b / a`, if `a` divides `b`.
#[inline]
pub fn quotient<E: Exponent>(a: &[E], b: &[E]) -> Option<Exponents<E>> {
    if !divides(a, b) {
        return None;
    }

    Some(a.iter().zip(b).map(|(ea, eb)| *eb - *ea).collect())
}

#[inline]
pub fn lcm<E: Exponent>(a: &[E], b: &[E]) -> Exponents<E> {
    a.iter().zip(b).map(|(ea, eb)| *ea.max(eb)).collect()
}

/// Returns true iff the monomials share no variable.
#[inline]
pub fn coprime<E: Exponent>(a: &[E], b: &[E]) -> bool {
    a.iter().zip(b).all(|(ea, eb)| ea.is_zero() || eb.is_zero())
}

#[inline]
pub fn total_degree<E: Exponent>(a: &[E]) -> u64 {
    a.iter().map(|e| e.to_u32() as u64).sum()
}

/// View object for a term in a multivariate polynomial.
#[derive(Copy, Clone, Debug)]
pub struct MonomialView<'a, F: 'a + Ring, E: 'a + Exponent> {
    pub coefficient: &'a F::Element,
    pub exponents: &'a [E],
}

/// Iterator over terms in a multivariate polynomial, from the smallest to the leading term.
pub struct MonomialViewIterator<'a, F: Ring, E: Exponent, O: MonomialOrder> {
    poly: &'a MultivariatePolynomial<F, E, O>,
    index: usize,
}

impl<'a, F: Ring, E: Exponent, O: MonomialOrder> Iterator for MonomialViewIterator<'a, F, E, O> {
    type Item = MonomialView<'a, F, E>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.index == self.poly.nterms() {
            None
        } else {
            let view = MonomialView {
                coefficient: &self.poly.coefficients[self.index],
                exponents: self.poly.exponents(self.index),
            };
            self.index += 1;
            Some(view)
        }
    }
}

impl<'a, F: Ring, E: Exponent, O: MonomialOrder> IntoIterator
    for &'a MultivariatePolynomial<F, E, O>
{
    type Item = MonomialView<'a, F, E>;
    type IntoIter = MonomialViewIterator<'a, F, E, O>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter {
            poly: self,
            index: 0,
        }
    }
}
