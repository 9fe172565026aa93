//! Groebner bases with cofactor provenance.
//!
//! Every element of a [GroebnerBasis] carries a [CofactorRecord] that expresses it
//! as a combination of the original generators. This is what makes ideal membership
//! constructive: if `p` reduces to zero, its quotients combined with the records
//! yield `p = Σ c_i * generator_i` explicitly.

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use crate::domains::Field;
use crate::error::{ExponentOverflow, GroebnerError};

use super::monomial::{self, Exponents};
use super::polynomial::MultivariatePolynomial;
use super::{Exponent, MonomialOrder};

/// A cooperative cancellation signal, shared between the caller and a computation.
/// The signal fires either when [cancel](Self::cancel) is called or when the deadline passes.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// A token that only fires on an explicit cancel.
    pub fn new() -> CancellationToken {
        CancellationToken::default()
    }

    pub fn with_timeout(timeout: Duration) -> CancellationToken {
        CancellationToken {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(AtomicOrdering::Relaxed)
            || self.deadline.map_or(false, |d| Instant::now() >= d)
    }

    #[inline]
    pub fn check(&self) -> Result<(), GroebnerError> {
        if self.is_cancelled() {
            Err(GroebnerError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// The multipliers that express a polynomial `p` in terms of a list of generators:
/// `p = Σ cofactors[i] * generators[i]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CofactorRecord<F: Field, E: Exponent, O: MonomialOrder> {
    pub cofactors: Vec<MultivariatePolynomial<F, E, O>>,
}

impl<F: Field, E: Exponent, O: MonomialOrder> CofactorRecord<F, E, O> {
    /// The record of a combination in which every multiplier is zero.
    pub fn zero(template: &MultivariatePolynomial<F, E, O>, ngenerators: usize) -> Self {
        CofactorRecord {
            cofactors: vec![template.zero(); ngenerators],
        }
    }

    /// The record of the generator `index` itself.
    pub fn unit(template: &MultivariatePolynomial<F, E, O>, ngenerators: usize, index: usize) -> Self {
        let mut r = Self::zero(template, ngenerators);
        r.cofactors[index] = template.one();
        r
    }

    /// Expand `Σ cofactors[i] * generators[i]`, or `None` if there are no generators.
    pub fn combination(
        &self,
        generators: &[MultivariatePolynomial<F, E, O>],
    ) -> Result<Option<MultivariatePolynomial<F, E, O>>, ExponentOverflow> {
        let Some(first) = generators.first() else {
            return Ok(None);
        };

        let mut sum = first.zero();
        for (c, g) in self.cofactors.iter().zip(generators) {
            if !c.is_zero() && !g.is_zero() {
                sum = sum + c.try_mul(g)?;
            }
        }
        Ok(Some(sum))
    }

    /// Check that the record reproduces `p` exactly.
    pub fn verify(
        &self,
        p: &MultivariatePolynomial<F, E, O>,
        generators: &[MultivariatePolynomial<F, E, O>],
    ) -> Result<bool, ExponentOverflow> {
        if self.cofactors.len() != generators.len() {
            return Ok(false);
        }

        Ok(match self.combination(generators)? {
            Some(sum) => sum == *p,
            None => p.is_zero(),
        })
    }

    fn try_mul_exp(&self, exponents: &[E]) -> Result<Self, ExponentOverflow> {
        Ok(CofactorRecord {
            cofactors: self
                .cofactors
                .iter()
                .map(|c| c.clone().try_mul_exp(exponents))
                .collect::<Result<_, _>>()?,
        })
    }

    fn mul_coeff(self, coeff: &F::Element) -> Self {
        CofactorRecord {
            cofactors: self
                .cofactors
                .into_iter()
                .map(|c| c.mul_coeff(coeff))
                .collect(),
        }
    }

    fn sub(self, other: Self) -> Self {
        CofactorRecord {
            cofactors: self
                .cofactors
                .into_iter()
                .zip(other.cofactors)
                .map(|(a, b)| a - b)
                .collect(),
        }
    }

    /// Compute `self -= q * other`.
    fn sub_mul_assign(
        &mut self,
        q: &MultivariatePolynomial<F, E, O>,
        other: &Self,
    ) -> Result<(), ExponentOverflow> {
        for (a, c) in self.cofactors.iter_mut().zip(&other.cofactors) {
            if !c.is_zero() {
                *a = &*a - &q.try_mul(c)?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
struct CriticalPair<E: Exponent> {
    first: usize,
    second: usize,
    lcm: Exponents<E>,
    degree: u64,
    seq: usize,
}

/// Settings of the Buchberger algorithm.
#[derive(Clone, Debug)]
pub struct GroebnerOptions {
    /// Skip pairs with coprime leading monomials (Buchberger's first criterion).
    pub coprime_criterion: bool,
    /// Indices of generators whose pairs are never skipped by a criterion.
    pub exempt: Vec<usize>,
    /// Abort with [GroebnerError::ResourceLimit] when the basis grows beyond this size.
    pub max_basis_size: Option<usize>,
    /// Inter-reduce the basis after completion.
    pub reduce_basis: bool,
}

impl Default for GroebnerOptions {
    fn default() -> Self {
        GroebnerOptions {
            coprime_criterion: true,
            exempt: vec![],
            max_basis_size: None,
            reduce_basis: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroebnerStats {
    pub pairs_processed: usize,
    pub pairs_skipped: usize,
    pub zero_reductions: usize,
    pub basis_size: usize,
    /// A constant entered the basis, so the ideal is the whole ring.
    pub unit_ideal: bool,
}

impl Display for GroebnerStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "basis size {}, {} pairs processed, {} skipped, {} reduced to zero",
            self.basis_size, self.pairs_processed, self.pairs_skipped, self.zero_reductions
        )
    }
}

/// The working state of the Buchberger algorithm.
struct Buchberger<F: Field, E: Exponent, O: MonomialOrder> {
    system: Vec<MultivariatePolynomial<F, E, O>>,
    records: Vec<CofactorRecord<F, E, O>>,
    exempt: Vec<bool>,
    pairs: Vec<CriticalPair<E>>,
    seq: usize,
    coprime_criterion: bool,
    stats: GroebnerStats,
}

impl<F: Field, E: Exponent, O: MonomialOrder> Buchberger<F, E, O> {
    /// Add a monic polynomial to the basis and create its critical pairs.
    fn insert(&mut self, poly: MultivariatePolynomial<F, E, O>, record: CofactorRecord<F, E, O>, exempt: bool) {
        let new = self.system.len();
        let lm = poly.max_exp();

        for (i, b) in self.system.iter().enumerate() {
            if self.coprime_criterion
                && !exempt
                && !self.exempt[i]
                && monomial::coprime(b.max_exp(), lm)
            {
                self.stats.pairs_skipped += 1;
                continue;
            }

            let lcm = monomial::lcm(b.max_exp(), lm);
            self.pairs.push(CriticalPair {
                first: i,
                second: new,
                degree: monomial::total_degree(&lcm),
                lcm,
                seq: self.seq,
            });
            self.seq += 1;
        }

        self.system.push(poly);
        self.records.push(record);
        self.exempt.push(exempt);
    }

    /// Select the pair with the lowest lcm degree, the oldest one on ties.
    fn next_pair(&mut self) -> Option<CriticalPair<E>> {
        let (index, _) = self
            .pairs
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| (p.degree, p.seq))?;
        Some(self.pairs.swap_remove(index))
    }

    /// Construct the S-polynomial of a pair of monic basis elements, together with its record.
    fn s_polynomial(
        &self,
        pair: &CriticalPair<E>,
    ) -> Result<(MultivariatePolynomial<F, E, O>, CofactorRecord<F, E, O>), ExponentOverflow> {
        let a = &self.system[pair.first];
        let b = &self.system[pair.second];

        let extra_factor_first: Exponents<E> = pair
            .lcm
            .iter()
            .zip(a.max_exp())
            .map(|(e1, e2)| *e1 - *e2)
            .collect();
        let extra_factor_sec: Exponents<E> = pair
            .lcm
            .iter()
            .zip(b.max_exp())
            .map(|(e1, e2)| *e1 - *e2)
            .collect();

        let s = a.clone().try_mul_exp(&extra_factor_first)?
            - b.clone().try_mul_exp(&extra_factor_sec)?;
        let record = self.records[pair.first]
            .try_mul_exp(&extra_factor_first)?
            .sub(self.records[pair.second].try_mul_exp(&extra_factor_sec)?);
        Ok((s, record))
    }
}

/// A Groebner basis of the ideal spanned by `generators`, where each element
/// of `system` is tracked back to the generators by the record at the same index.
#[derive(Clone, Debug)]
pub struct GroebnerBasis<F: Field, E: Exponent, O: MonomialOrder> {
    pub system: Vec<MultivariatePolynomial<F, E, O>>,
    pub records: Vec<CofactorRecord<F, E, O>>,
    pub generators: Vec<MultivariatePolynomial<F, E, O>>,
    pub stats: GroebnerStats,
}

impl<F: Field, E: Exponent, O: MonomialOrder> GroebnerBasis<F, E, O> {
    /// Construct the reduced Groebner basis for a polynomial ideal.
    pub fn new(ideal: &[MultivariatePolynomial<F, E, O>]) -> Result<Self, GroebnerError> {
        Self::with_options(ideal, &GroebnerOptions::default(), &CancellationToken::new())
    }

    /// Construct a Groebner basis with Buchberger's algorithm, using the normal
    /// selection strategy. The token is checked before every S-polynomial and during reductions.
    ///
    /// The computation stops early as soon as a constant enters the basis.
    #[instrument(level = "debug", skip_all, fields(generators = ideal.len()))]
    pub fn with_options(
        ideal: &[MultivariatePolynomial<F, E, O>],
        options: &GroebnerOptions,
        token: &CancellationToken,
    ) -> Result<Self, GroebnerError> {
        let mut state = Buchberger {
            system: vec![],
            records: vec![],
            exempt: vec![],
            pairs: vec![],
            seq: 0,
            coprime_criterion: options.coprime_criterion,
            stats: GroebnerStats::default(),
        };

        for (i, g) in ideal.iter().enumerate() {
            if g.is_zero() {
                continue;
            }

            let inv = g.field.inv(g.max_coeff());
            let record = CofactorRecord::unit(g, ideal.len(), i).mul_coeff(&inv);
            let poly = g.clone().mul_coeff(&inv);
            let unit = poly.is_constant();
            state.insert(poly, record, options.exempt.contains(&i));

            if unit {
                state.stats.unit_ideal = true;
                state.pairs.clear();
                break;
            }
        }

        let mut iter_count = 0;
        while !state.stats.unit_ideal {
            token.check()?;

            let Some(pair) = state.next_pair() else {
                break;
            };

            iter_count += 1;
            state.stats.pairs_processed += 1;

            let (s, mut record) = state.s_polynomial(&pair)?;
            let division = s.reduce_or_abort(&state.system, || token.check())?;

            if division.remainder.is_zero() {
                state.stats.zero_reductions += 1;
                continue;
            }

            for (q, r) in division.quotients.iter().zip(&state.records) {
                if !q.is_zero() {
                    record.sub_mul_assign(q, r)?;
                }
            }

            let inv = division.remainder.field.inv(division.remainder.max_coeff());
            let poly = division.remainder.mul_coeff(&inv);
            let record = record.mul_coeff(&inv);

            if let Some(limit) = options.max_basis_size {
                if state.system.len() >= limit {
                    debug!("Basis size limit of {} reached", limit);
                    return Err(GroebnerError::ResourceLimit { limit });
                }
            }

            debug!(
                "Iteration {}: degree={}, basis length={}, critical pairs={}, new element with {} terms",
                iter_count,
                pair.degree,
                state.system.len() + 1,
                state.pairs.len(),
                poly.nterms()
            );

            let unit = poly.is_constant();
            state.insert(poly, record, false);

            if unit {
                debug!("Constant in basis: unit ideal");
                state.stats.unit_ideal = true;
            }
        }

        state.stats.basis_size = state.system.len();

        let mut b = GroebnerBasis {
            system: state.system,
            records: state.records,
            generators: ideal.to_vec(),
            stats: state.stats,
        };

        if options.reduce_basis {
            b.reduce_basis(token)?;
        }

        Ok(b)
    }

    /// Reduce `p` by the basis and return the division with the records of the
    /// quotients combined: `p = Σ record.cofactors[i] * generators[i] + remainder`.
    #[allow(clippy::type_complexity)]
    pub fn reduce(
        &self,
        p: &MultivariatePolynomial<F, E, O>,
    ) -> Result<(MultivariatePolynomial<F, E, O>, CofactorRecord<F, E, O>), ExponentOverflow> {
        let division = p.reduce(&self.system)?;
        let mut record = CofactorRecord::zero(p, self.generators.len());
        for (q, r) in division.quotients.iter().zip(&self.records) {
            if !q.is_zero() {
                record.sub_mul_assign(&-q.clone(), r)?;
            }
        }

        Ok((division.remainder, record))
    }

    /// Test ideal membership of `p`. If it is a member, return its combination
    /// in terms of the generators.
    pub fn express(
        &self,
        p: &MultivariatePolynomial<F, E, O>,
    ) -> Result<Option<CofactorRecord<F, E, O>>, ExponentOverflow> {
        let (remainder, record) = self.reduce(p)?;
        Ok(remainder.is_zero().then_some(record))
    }

    pub fn contains(&self, p: &MultivariatePolynomial<F, E, O>) -> Result<bool, ExponentOverflow> {
        Ok(p.reduce(&self.system)?.remainder.is_zero())
    }

    /// Inter-reduce the basis: remove elements whose leading monomial is divisible
    /// by that of another element and reduce the remaining ones. The records are kept valid.
    pub fn reduce_basis(&mut self, token: &CancellationToken) -> Result<(), GroebnerError> {
        // filter lead-reducible polynomials
        let mut res = vec![true; self.system.len()];
        'l1: for (i, p1) in self.system.iter().enumerate() {
            for (j, p2) in self.system.iter().enumerate() {
                if i != j && res[j] && monomial::divides(p2.max_exp(), p1.max_exp()) {
                    res[i] = false;
                    continue 'l1;
                }
            }
        }

        let mut lead_reduced = vec![];
        let mut lead_records = vec![];
        for ((p, r), keep) in self.system.drain(..).zip(self.records.drain(..)).zip(&res) {
            if *keep {
                lead_reduced.push(p);
                lead_records.push(r);
            }
        }

        let mut basis = vec![];
        for i in 0..lead_reduced.len() {
            lead_reduced.swap(0, i);
            lead_records.swap(0, i);

            let division = lead_reduced[0].reduce_or_abort(&lead_reduced[1..], || token.check())?;
            let h = division.remainder;
            if h.is_zero() {
                continue;
            }

            let mut record = lead_records[0].clone();
            for (q, r) in division.quotients.iter().zip(&lead_records[1..]) {
                if !q.is_zero() {
                    record.sub_mul_assign(q, r)?;
                }
            }

            let inv = h.field.inv(h.max_coeff());
            basis.push((h.mul_coeff(&inv), record.mul_coeff(&inv)));
        }

        basis.sort_by(|(p1, _), (p2, _)| O::cmp(p2.max_exp(), p1.max_exp()));

        let (system, records) = basis.into_iter().unzip();
        self.system = system;
        self.records = records;
        self.stats.basis_size = self.system.len();
        Ok(())
    }

    /// Check the Buchberger criterion: every S-polynomial of `system` reduces to zero.
    pub fn is_groebner_basis(
        system: &[MultivariatePolynomial<F, E, O>],
    ) -> Result<bool, ExponentOverflow> {
        let system: Vec<_> = system
            .iter()
            .filter(|p| !p.is_zero())
            .map(|p| p.clone().make_monic())
            .collect();

        for (i, p1) in system.iter().enumerate() {
            for p2 in &system[i + 1..] {
                let lcm = monomial::lcm(p1.max_exp(), p2.max_exp());

                // construct s-polynomial
                let extra_factor_f1: Exponents<E> = lcm
                    .iter()
                    .zip(p1.max_exp())
                    .map(|(e1, e2)| *e1 - *e2)
                    .collect();
                let extra_factor_f2: Exponents<E> = lcm
                    .iter()
                    .zip(p2.max_exp())
                    .map(|(e1, e2)| *e1 - *e2)
                    .collect();

                let s = p1.clone().try_mul_exp(&extra_factor_f1)?
                    - p2.clone().try_mul_exp(&extra_factor_f2)?;
                if !s.reduce(&system)?.remainder.is_zero() {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::domains::finite_field::FiniteField;
    use crate::domains::rational::{Rational, RationalField, Q};
    use crate::domains::Ring;
    use crate::error::GroebnerError;
    use crate::poly::polynomial::MultivariatePolynomial;
    use crate::poly::{GrevLexOrder, Variable};

    use super::{CancellationToken, GroebnerBasis, GroebnerOptions};

    type Poly = MultivariatePolynomial<RationalField, u16, GrevLexOrder>;

    fn xyz() -> (Poly, Poly, Poly) {
        let vars = Arc::new(vec![Variable::new("x"), Variable::new("y"), Variable::new("z")]);
        let zero = Poly::new(&Q, None, vars);
        (zero.variable(0), zero.variable(1), zero.variable(2))
    }

    #[test]
    fn cyclic3() {
        let (x, y, z) = xyz();
        let ideal = vec![
            &(&x + &y) + &z,
            &(&(&x * &y) + &(&y * &z)) + &(&z * &x),
            &(&(&x * &y) * &z) - &x.one(),
        ];

        let gb = GroebnerBasis::new(&ideal).unwrap();
        assert!(GroebnerBasis::is_groebner_basis(&gb.system).unwrap());
        assert!(!GroebnerBasis::is_groebner_basis(&ideal).unwrap());

        for p in &gb.system {
            assert!(p.field.is_one(p.max_coeff()));
        }

        // every generator is in the ideal, z^3 - 1 as well
        for g in &ideal {
            assert!(gb.contains(g).unwrap());
        }
        assert!(gb.contains(&(&z.pow(3) - &z.one())).unwrap());
        assert!(!gb.contains(&z).unwrap());

        // the records are sound
        for (p, r) in gb.system.iter().zip(&gb.records) {
            assert!(r.verify(p, &ideal).unwrap());
        }
    }

    #[test]
    fn express_membership() {
        let (x, y, _) = xyz();
        let ideal = vec![&(&x * &y) - &x.one(), &y.pow(2) - &x, x.zero()];
        let gb = GroebnerBasis::new(&ideal).unwrap();

        let target = &y.pow(3) - &x.one();
        let record = gb.express(&target).unwrap().unwrap();
        assert!(record.verify(&target, &ideal).unwrap());
        assert!(record.cofactors[2].is_zero());
        assert!(gb.express(&x.constant(Rational::from(2))).unwrap().is_none());
    }

    #[test]
    fn unit_ideal_stops_early() {
        let (x, y, _) = xyz();
        let ideal = vec![&(&x * &y) - &x.one(), x.clone()];
        let options = GroebnerOptions {
            reduce_basis: false,
            ..GroebnerOptions::default()
        };
        let gb = GroebnerBasis::with_options(&ideal, &options, &CancellationToken::new()).unwrap();
        assert!(gb.stats.unit_ideal);
        assert!(gb.system.last().unwrap().is_one());

        let record = gb.express(&x.one()).unwrap().unwrap();
        assert!(record.verify(&x.one(), &ideal).unwrap());
    }

    #[test]
    fn finite_field_basis() {
        let field = FiniteField::new(7).unwrap();
        let vars = Arc::new(vec![Variable::new("x"), Variable::new("y")]);
        let zero = MultivariatePolynomial::<_, u16, GrevLexOrder>::new(&field, None, vars);
        let (x, y) = (zero.variable(0), zero.variable(1));

        let ideal = vec![&x.pow(2) - &y, &(&x * &y) - &x.constant(3)];
        let gb = GroebnerBasis::new(&ideal).unwrap();
        assert!(GroebnerBasis::is_groebner_basis(&gb.system).unwrap());
        for g in &ideal {
            assert!(gb.contains(g).unwrap());
        }
    }

    #[test]
    fn cancellation() {
        let (x, y, z) = xyz();
        let ideal = vec![
            &(&x.pow(5) + &y.pow(4)) + &z.pow(3),
            &(&x.pow(3) + &y.pow(2)) + &z.pow(2),
            &(&x.pow(2) + &y.pow(2)) + &z,
        ];

        let token = CancellationToken::new();
        token.cancel();
        let res = GroebnerBasis::with_options(&ideal, &GroebnerOptions::default(), &token);
        assert_eq!(res.err(), Some(GroebnerError::Cancelled));

        let token = CancellationToken::with_timeout(Duration::ZERO);
        assert!(token.is_cancelled());
    }

    #[test]
    fn basis_size_limit() {
        let (x, y, z) = xyz();
        let ideal = vec![
            &(&x + &y) + &z,
            &(&(&x * &y) + &(&y * &z)) + &(&z * &x),
            &(&(&x * &y) * &z) - &x.one(),
        ];
        let options = GroebnerOptions {
            max_basis_size: Some(3),
            ..GroebnerOptions::default()
        };
        let res = GroebnerBasis::with_options(&ideal, &options, &CancellationToken::new());
        assert_eq!(res.err(), Some(GroebnerError::ResourceLimit { limit: 3 }));
    }

    #[test]
    fn exponent_overflow() {
        let vars = Arc::new(vec![Variable::new("x"), Variable::new("y"), Variable::new("z")]);
        let zero = MultivariatePolynomial::<_, u8, GrevLexOrder>::new(&Q, None, vars);
        let (x, y, z) = (zero.variable(0), zero.variable(1), zero.variable(2));

        // the S-polynomial multiplies z^200 by z^100
        let ideal = vec![&(&x.pow(100) * &y.pow(100)) + &z.pow(200), &x * &z.pow(100)];
        let res = GroebnerBasis::with_options(&ideal, &GroebnerOptions::default(), &CancellationToken::new());
        assert!(matches!(res, Err(GroebnerError::ExponentOverflow(_))));
    }
}
