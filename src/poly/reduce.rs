//! Multivariate division with remainder.

use smallvec::smallvec;

use crate::domains::Field;
use crate::error::ExponentOverflow;

use super::monomial::{self, Exponents};
use super::polynomial::MultivariatePolynomial;
use super::{Exponent, MonomialOrder};

/// The number of reduction steps between two calls of the abort check.
const ABORT_CHECK_INTERVAL: usize = 64;

/// The result of dividing `p` by a list of polynomials `basis`:
/// `p = Σ quotients[i] * basis[i] + remainder`, where no term of `remainder`
/// is divisible by a leading monomial of `basis`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Division<F: Field, E: Exponent, O: MonomialOrder> {
    pub quotients: Vec<MultivariatePolynomial<F, E, O>>,
    pub remainder: MultivariatePolynomial<F, E, O>,
}

impl<F: Field, E: Exponent, O: MonomialOrder> MultivariatePolynomial<F, E, O> {
    /// Completely reduce the polynomial w.r.t the polynomials `basis`,
    /// keeping track of the multiple of every basis element that was subtracted.
    /// For example reducing `f=y^2+x` by `g=[x]` yields the remainder `y^2` and quotient `1`.
    ///
    /// Zero elements of `basis` are ignored and get a zero quotient.
    pub fn reduce(&self, basis: &[Self]) -> Result<Division<F, E, O>, ExponentOverflow> {
        self.reduce_or_abort(basis, || Ok(()))
    }

    /// Like [reduce](Self::reduce), but calls `abort` periodically and stops with
    /// its error when it returns one.
    pub fn reduce_or_abort<A, X>(&self, basis: &[Self], mut abort: A) -> Result<Division<F, E, O>, X>
    where
        A: FnMut() -> Result<(), X>,
        X: From<ExponentOverflow>,
    {
        let nvars = self.nvars();
        let mut quotients = vec![self.zero(); basis.len()];
        let mut r = self.clone();

        // the remainder is collected from the largest term down
        let mut rest_coeff = vec![];
        let mut rest_exponents = vec![];

        let mut monom: Exponents<E> = smallvec![E::zero(); nvars];

        let mut steps = 0;
        while !r.is_zero() {
            if steps % ABORT_CHECK_INTERVAL == 0 {
                abort()?;
            }
            steps += 1;

            // find a divisor that has the least amount of terms
            let divisor = basis
                .iter()
                .enumerate()
                .filter(|(_, g)| !g.is_zero() && monomial::divides(g.max_exp(), r.max_exp()))
                .min_by_key(|(_, g)| g.nterms());

            match divisor {
                Some((i, g)) => {
                    for ((e, e1), e2) in monom.iter_mut().zip(r.max_exp()).zip(g.max_exp()) {
                        *e = *e1 - *e2;
                    }

                    let ratio = r.field.div(r.max_coeff(), g.max_coeff());
                    quotients[i].append_monomial(ratio.clone(), &monom);
                    r = r - g.clone().try_mul_monomial(&ratio, &monom)?;
                }
                None => {
                    // strip leading monomial that is not reducible
                    if let Some(c) = r.coefficients.pop() {
                        let len = r.exponents.len();
                        rest_exponents.extend(r.exponents.drain(len - nvars..));
                        rest_coeff.push(c);
                    }
                }
            }
        }

        // append in sorted order
        let mut remainder = self.zero_with_capacity(rest_coeff.len());
        while let Some(c) = rest_coeff.pop() {
            let l = rest_coeff.len();
            remainder.coefficients.push(c);
            remainder
                .exponents
                .extend_from_slice(&rest_exponents[l * nvars..(l + 1) * nvars]);
        }

        Ok(Division {
            quotients,
            remainder,
        })
    }
}
