//! Seedable generators of test data. Randomness is only used here and never
//! influences a solve.

use std::sync::Arc;

use rand::Rng;

use crate::domains::Ring;
use crate::poly::polynomial::MultivariatePolynomial;
use crate::poly::{Exponent, MonomialOrder, Variable};
use crate::solver::SolveRequest;

/// Generate a request over the variables `x1, ..., x{num_vars}` in which every
/// polynomial is a sum of three terms `c*x_i^p` with `1 <= c <= 5` and `1 <= p <= 3`.
pub fn generate_test_case(rng: &mut impl Rng, num_vars: usize, num_polys: usize) -> SolveRequest {
    let variables: Vec<String> = (1..=num_vars.max(1)).map(|i| format!("x{}", i)).collect();

    let mut random_poly = || {
        (0..3)
            .map(|_| {
                let coeff = rng.gen_range(1..=5);
                let var = &variables[rng.gen_range(0..variables.len())];
                let power = rng.gen_range(1..=3);
                format!("{}*{}^{}", coeff, var, power)
            })
            .collect::<Vec<_>>()
            .join(" + ")
    };

    let f = random_poly();
    let f_list = (0..num_polys).map(|_| random_poly()).collect();

    SolveRequest {
        f,
        f_list,
        variables,
        modulus: None,
    }
}

/// Generate a polynomial with at most `max_terms` terms of total degree at most
/// `max_degree`, with coefficients sampled from `range`.
pub fn random_polynomial<F: Ring, E: Exponent, O: MonomialOrder>(
    field: &F,
    variables: &Arc<Vec<Variable>>,
    rng: &mut impl Rng,
    max_terms: usize,
    max_degree: u32,
    range: (i64, i64),
) -> MultivariatePolynomial<F, E, O> {
    let mut p = MultivariatePolynomial::new(field, Some(max_terms), variables.clone());
    let mut exponents = vec![E::zero(); variables.len()];

    for _ in 0..max_terms {
        let mut budget = rng.gen_range(0..=max_degree);
        for e in &mut exponents {
            let d = rng.gen_range(0..=budget);
            budget -= d;
            *e = E::checked_from_u32(d).unwrap_or(E::zero());
        }

        let coeff = field.sample(rng, range);
        p.append_monomial(coeff, &exponents);
    }

    p
}
