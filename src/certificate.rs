//! Nullstellensatz certificates `f^N = Σ g_i * f_i`.

use crate::domains::Field;
use crate::error::{ExponentOverflow, RadicalError};
use crate::poly::groebner::CofactorRecord;
use crate::poly::polynomial::MultivariatePolynomial;
use crate::poly::{Exponent, MonomialOrder};
use crate::radical::GeneratorId;

/// A proof that `f` lies in the radical of `(f_1, ..., f_k)`:
/// `f^n = Σ cofactors[i] * f_i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Certificate<F: Field, E: Exponent, O: MonomialOrder> {
    pub n: u32,
    pub cofactors: Vec<MultivariatePolynomial<F, E, O>>,
}

impl<F: Field, E: Exponent, O: MonomialOrder> Certificate<F, E, O> {
    /// The certificate `0^1 = Σ 0 * f_i`.
    pub fn trivial(f: &MultivariatePolynomial<F, E, O>, ngenerators: usize) -> Self {
        Certificate {
            n: 1,
            cofactors: vec![f.zero(); ngenerators],
        }
    }

    /// Turn a representation `1 = Σ h_i * f_i + h_0 * (1 - y*f)` over the variables
    /// of `f` extended by `y` at index `y`, into a certificate in the variables of `f`.
    ///
    /// Writing `h_i = Σ_j c_ij * y^j`, the substitution `y = 1/f` followed by a
    /// multiplication with `f^N` where `N = max(1, max_i deg_y h_i)` yields
    /// `f^N = Σ_i (Σ_j c_ij * f^(N-j)) * f_i`.
    ///
    /// The result is verified and an error is returned if it is not a valid certificate.
    pub fn extract(
        f: &MultivariatePolynomial<F, E, O>,
        generators: &[MultivariatePolynomial<F, E, O>],
        record: &CofactorRecord<F, E, O>,
        ids: &[GeneratorId],
        y: usize,
    ) -> Result<Self, RadicalError> {
        if record.cofactors.len() != ids.len() {
            return Err(RadicalError::InvariantViolation(format!(
                "record has {} cofactors for {} generators",
                record.cofactors.len(),
                ids.len()
            )));
        }

        let mut split = vec![];
        for (h, id) in record.cofactors.iter().zip(ids) {
            if let GeneratorId::Input(i) = id {
                split.push((*i, h.split_variable(y)));
            }
        }

        let n = split
            .iter()
            .map(|(_, c)| c.len() - 1)
            .max()
            .unwrap_or(0)
            .max(1);

        let mut powers = vec![f.one()];
        for j in 0..n {
            let next = powers[j].try_mul(f)?;
            powers.push(next);
        }

        let mut cofactors = vec![f.zero(); generators.len()];
        for (i, coeffs) in split {
            let mut g = f.zero();
            for (j, c) in coeffs.iter().enumerate() {
                if !c.is_zero() {
                    g = g + c.try_mul(&powers[n - j])?;
                }
            }
            cofactors[i] = g;
        }

        let certificate = Certificate {
            n: n as u32,
            cofactors,
        };

        if !certificate.verify(f, generators)? {
            return Err(RadicalError::InvariantViolation(format!(
                "certificate with N={} does not verify",
                certificate.n
            )));
        }

        Ok(certificate)
    }

    /// Check that `f^n - Σ cofactors[i] * generators[i]` is the zero polynomial.
    pub fn verify(
        &self,
        f: &MultivariatePolynomial<F, E, O>,
        generators: &[MultivariatePolynomial<F, E, O>],
    ) -> Result<bool, ExponentOverflow> {
        if self.n == 0 || self.cofactors.len() != generators.len() {
            return Ok(false);
        }

        let mut residual = f.try_pow(self.n as usize)?;
        for (g, fi) in self.cofactors.iter().zip(generators) {
            residual = residual - g.try_mul(fi)?;
        }

        Ok(residual.is_zero())
    }
}
