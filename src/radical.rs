//! Radical membership with the Rabinowitsch trick.
//!
//! `f` is in the radical of `I = (f_1, ..., f_k)` iff the ideal
//! `(f_1, ..., f_k, 1 - y*f)` in one extra variable `y` contains `1`.
//! The combination that expresses `1` is turned into a [Certificate].

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::certificate::Certificate;
use crate::config::SolverConfig;
use crate::domains::Field;
use crate::error::RadicalError;
use crate::poly::groebner::{CancellationToken, GroebnerBasis, GroebnerOptions, GroebnerStats};
use crate::poly::polynomial::MultivariatePolynomial;
use crate::poly::{Exponent, MonomialOrder, Variable};

/// The identity of a generator of the extended ideal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeneratorId {
    /// The generator `f_i` of the input.
    Input(usize),
    /// The generator `1 - y*f`.
    Rabinowitsch,
}

#[derive(Clone, Debug)]
pub enum RadicalOutcome<F: Field, E: Exponent, O: MonomialOrder> {
    /// `f` is zero.
    Trivial(Certificate<F, E, O>),
    InRadical {
        certificate: Certificate<F, E, O>,
        stats: GroebnerStats,
    },
    NotInRadical { stats: GroebnerStats },
}

impl<F: Field, E: Exponent, O: MonomialOrder> RadicalOutcome<F, E, O> {
    pub fn is_in_radical(&self) -> bool {
        !matches!(self, RadicalOutcome::NotInRadical { .. })
    }

    pub fn certificate(&self) -> Option<&Certificate<F, E, O>> {
        match self {
            RadicalOutcome::Trivial(c) | RadicalOutcome::InRadical { certificate: c, .. } => {
                Some(c)
            }
            RadicalOutcome::NotInRadical { .. } => None,
        }
    }
}

/// Decide if `f` lies in the radical of the ideal spanned by `generators`, and if so,
/// construct a verified certificate. All polynomials must share the same variables.
///
/// Zero generators do not contribute to the ideal and receive a zero cofactor.
#[instrument(level = "debug", skip_all, fields(generators = generators.len()))]
pub fn radical_membership<F: Field, E: Exponent, O: MonomialOrder>(
    f: &MultivariatePolynomial<F, E, O>,
    generators: &[MultivariatePolynomial<F, E, O>],
    config: &SolverConfig,
    token: &CancellationToken,
) -> Result<RadicalOutcome<F, E, O>, RadicalError> {
    if f.is_zero() {
        return Ok(RadicalOutcome::Trivial(Certificate::trivial(
            f,
            generators.len(),
        )));
    }

    if generators.iter().all(|g| g.is_zero()) {
        debug!("Zero ideal: only zero is in its radical");
        return Ok(RadicalOutcome::NotInRadical {
            stats: GroebnerStats::default(),
        });
    }

    let mut variables = f.variables.as_ref().clone();
    let y = variables.len();
    variables.push(Variable::Temporary(0));
    let variables = Arc::new(variables);

    let f_ext = f.extend_variables(variables.clone());
    let mut extended: Vec<_> = generators
        .iter()
        .map(|g| g.extend_variables(variables.clone()))
        .collect();
    extended.push(&f_ext.one() - &f_ext.try_mul(&f_ext.variable(y))?);

    let mut ids: Vec<_> = (0..generators.len()).map(GeneratorId::Input).collect();
    ids.push(GeneratorId::Rabinowitsch);

    let options = GroebnerOptions {
        coprime_criterion: config.coprime_criterion,
        exempt: vec![generators.len()],
        max_basis_size: config.max_basis_size,
        reduce_basis: false,
    };

    let gb = GroebnerBasis::with_options(&extended, &options, token)?;
    debug!("Extended ideal: {}", gb.stats);

    let one = f_ext.one();
    let Some(record) = gb.express(&one)? else {
        return Ok(RadicalOutcome::NotInRadical { stats: gb.stats });
    };

    if !record.verify(&one, &extended)? {
        return Err(RadicalError::InvariantViolation(
            "the combination of 1 does not reproduce 1".to_owned(),
        ));
    }

    let mut certificate = Certificate::extract(f, generators, &record, &ids, y)?;
    debug!("Back-substitution gives N={}", certificate.n);

    // membership is already proven here; an abandoned search keeps the back-substitution certificate
    if config.minimize_exponent && certificate.n > 1 {
        match minimize_exponent(f, generators, certificate.n, config, token) {
            Ok(Some(c)) => {
                debug!("Smallest exponent is N={}", c.n);
                certificate = c;
            }
            Ok(None) => debug!("N={} is the smallest exponent", certificate.n),
            Err(e @ RadicalError::InvariantViolation(_)) => return Err(e),
            Err(e) => warn!(
                "Exponent search abandoned, keeping N={}: {}",
                certificate.n, e
            ),
        }
    }

    Ok(RadicalOutcome::InRadical {
        certificate,
        stats: gb.stats,
    })
}

/// Find the smallest `n < bound` with `f^n` in the ideal, together with its certificate.
fn minimize_exponent<F: Field, E: Exponent, O: MonomialOrder>(
    f: &MultivariatePolynomial<F, E, O>,
    generators: &[MultivariatePolynomial<F, E, O>],
    bound: u32,
    config: &SolverConfig,
    token: &CancellationToken,
) -> Result<Option<Certificate<F, E, O>>, RadicalError> {
    let options = GroebnerOptions {
        coprime_criterion: config.coprime_criterion,
        exempt: vec![],
        max_basis_size: config.max_basis_size,
        reduce_basis: false,
    };
    let gb = GroebnerBasis::with_options(generators, &options, token)?;

    let mut power = f.clone();
    for n in 1..bound {
        token.check()?;

        if let Some(record) = gb.express(&power)? {
            let certificate = Certificate {
                n,
                cofactors: record.cofactors,
            };

            if !certificate.verify(f, generators)? {
                return Err(RadicalError::InvariantViolation(format!(
                    "certificate with N={} does not verify",
                    n
                )));
            }

            return Ok(Some(certificate));
        }

        power = power.try_mul(f)?;
    }

    Ok(None)
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::config::SolverConfig;
    use crate::domains::rational::{RationalField, Q};
    use crate::error::RadicalError;
    use crate::parser::parse_polynomial;
    use crate::poly::groebner::CancellationToken;
    use crate::poly::polynomial::MultivariatePolynomial;
    use crate::poly::{GrevLexOrder, Variable};

    use super::{radical_membership, RadicalOutcome};

    type Poly = MultivariatePolynomial<RationalField, u32, GrevLexOrder>;

    fn solve(
        f: &str,
        gens: &[&str],
        vars: &[&str],
        minimize: bool,
    ) -> (Result<RadicalOutcome<RationalField, u32, GrevLexOrder>, RadicalError>, Poly, Vec<Poly>) {
        let config = SolverConfig {
            minimize_exponent: minimize,
            ..SolverConfig::default()
        };
        solve_with(f, gens, vars, &config)
    }

    fn solve_with(
        f: &str,
        gens: &[&str],
        vars: &[&str],
        config: &SolverConfig,
    ) -> (Result<RadicalOutcome<RationalField, u32, GrevLexOrder>, RadicalError>, Poly, Vec<Poly>) {
        let vars = Arc::new(vars.iter().map(|v| Variable::new(v)).collect::<Vec<_>>());
        let f: Poly = parse_polynomial(f, &vars, &Q).unwrap();
        let gens: Vec<Poly> = gens
            .iter()
            .map(|g| parse_polynomial(g, &vars, &Q).unwrap())
            .collect();

        let res = radical_membership(&f, &gens, config, &CancellationToken::new());
        (res, f, gens)
    }

    #[test]
    fn nilpotent() {
        for minimize in [false, true] {
            let (res, f, gens) = solve("x", &["x^2"], &["x"], minimize);
            let res = res.unwrap();
            assert!(res.is_in_radical());
            let c = res.certificate().unwrap();
            assert!(c.verify(&f, &gens).unwrap());
            if minimize {
                assert_eq!(c.n, 2);
            }
        }
    }

    #[test]
    fn not_in_radical() {
        let (res, _, _) = solve("x + 1", &["x^2"], &["x"], true);
        assert!(matches!(res.unwrap(), RadicalOutcome::NotInRadical { .. }));

        let (res, _, _) = solve("y", &["x*y - 1"], &["x", "y"], true);
        assert!(!res.unwrap().is_in_radical());
    }

    #[test]
    fn multivariate_certificate() {
        // (x + y)^3 lies in (x^2, y^2)
        let (res, f, gens) = solve("x + y", &["x^2", "y^2", "0"], &["x", "y"], true);
        let res = res.unwrap();
        let c = res.certificate().unwrap();
        assert!(c.verify(&f, &gens).unwrap());
        assert_eq!(c.n, 3);
        assert!(c.cofactors[2].is_zero());
    }

    #[test]
    fn unit_ideal() {
        let (res, f, gens) = solve("x - 5", &["x*y - 1", "y"], &["x", "y"], true);
        let res = res.unwrap();
        let c = res.certificate().unwrap();
        assert_eq!(c.n, 1);
        assert!(c.verify(&f, &gens).unwrap());
    }

    #[test]
    fn trivial_and_zero_ideal() {
        let (res, _, _) = solve("0", &["x"], &["x"], true);
        let res = res.unwrap();
        assert!(matches!(res, RadicalOutcome::Trivial(_)));
        assert_eq!(res.certificate().unwrap().n, 1);

        let (res, _, _) = solve("3", &["0", "0"], &["x"], true);
        assert!(!res.unwrap().is_in_radical());
    }

    #[test]
    fn timeout() {
        let vars = Arc::new(vec![Variable::new("x")]);
        let x: Poly = parse_polynomial("x", &vars, &Q).unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let res = radical_membership(&x, &[x.pow(2)], &SolverConfig::default(), &token);
        assert_eq!(res.err(), Some(RadicalError::Timeout));
    }

    #[test]
    fn minimization_failure_keeps_certificate() {
        // x^2 alone makes x nilpotent; the other generators make the
        // Groebner basis of the original ideal outgrow the limit
        let gens = [
            "x^2",
            "a^7 + b^6 + c^5 - 1",
            "a^5*b^2 + b^3*c^4 + c^2 - 2",
            "a^3*b*c + b^2*c^3 + a*c - 3",
        ];
        let vars = ["x", "a", "b", "c"];

        let limited = SolverConfig {
            max_basis_size: Some(8),
            ..SolverConfig::default()
        };
        let (res, f, gens) = solve_with("x", &gens, &vars, &limited);
        let res = res.unwrap();
        assert!(res.is_in_radical());
        let c = res.certificate().unwrap();
        assert!(c.verify(&f, &gens).unwrap());
        assert_eq!(c.n, 2);
    }

    #[test]
    fn exponent_overflow_is_a_resource_limit() {
        let vars = Arc::new(vec![Variable::new("x")]);
        let f: Poly = parse_polynomial("x^3000000000", &vars, &Q).unwrap();
        let g: Poly = parse_polynomial("x^4000000000", &vars, &Q).unwrap();
        let res = radical_membership(&f, &[g], &SolverConfig::default(), &CancellationToken::new());
        assert!(matches!(res, Err(RadicalError::ResourceLimit(_))));
    }
}
