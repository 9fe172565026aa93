use std::cmp::Ordering;
use std::fmt::Display;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::Arc;

use ahash::{HashMap, HashMapExt};
use smallvec::smallvec;

use crate::domains::{Field, Ring};
use crate::error::ExponentOverflow;

use super::monomial::{Exponents, MonomialView};
use super::{Exponent, GrevLexOrder, MonomialOrder, Variable};

/// The largest hash map that is allocated up front for the terms of a product.
const MAX_PREALLOCATED_TERMS: usize = 1 << 16;

/// Multivariate polynomial with a sparse degree and variable dense representation.
pub struct MultivariatePolynomial<F: Ring, E: Exponent = u16, O: MonomialOrder = GrevLexOrder> {
    // Data format: the i-th monomial is stored as coefficients[i] and
    // exponents[i * nvars .. (i + 1) * nvars]. Terms are always expanded and sorted
    // in ascending order by `O`, so that the leading term is the last one.
    pub coefficients: Vec<F::Element>,
    pub exponents: Vec<E>,
    pub field: F,
    pub variables: Arc<Vec<Variable>>,
    pub(crate) _phantom: PhantomData<O>,
}

impl<F: Ring, E: Exponent, O: MonomialOrder> Clone for MultivariatePolynomial<F, E, O> {
    fn clone(&self) -> Self {
        Self {
            coefficients: self.coefficients.clone(),
            exponents: self.exponents.clone(),
            field: self.field.clone(),
            variables: self.variables.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<F: Ring, E: Exponent, O: MonomialOrder> MultivariatePolynomial<F, E, O> {
    /// Constructs a zero polynomial. Instead of using this constructor,
    /// prefer to create new polynomials from existing ones, so that the
    /// variable map and field are inherited.
    #[inline]
    pub fn new(field: &F, cap: Option<usize>, variables: Arc<Vec<Variable>>) -> Self {
        Self {
            coefficients: Vec::with_capacity(cap.unwrap_or(0)),
            exponents: Vec::with_capacity(cap.unwrap_or(0) * variables.len()),
            field: field.clone(),
            variables,
            _phantom: PhantomData,
        }
    }

    /// Constructs a zero polynomial, inheriting the field and variable map from `self`.
    #[inline]
    pub fn zero(&self) -> Self {
        Self {
            coefficients: vec![],
            exponents: vec![],
            field: self.field.clone(),
            variables: self.variables.clone(),
            _phantom: PhantomData,
        }
    }

    /// Constructs a zero polynomial with the given capacity,
    /// inheriting the field and variable map from `self`.
    #[inline]
    pub fn zero_with_capacity(&self, cap: usize) -> Self {
        Self {
            coefficients: Vec::with_capacity(cap),
            exponents: Vec::with_capacity(cap * self.nvars()),
            field: self.field.clone(),
            variables: self.variables.clone(),
            _phantom: PhantomData,
        }
    }

    /// Constructs a constant polynomial,
    /// inheriting the field and variable map from `self`.
    #[inline]
    pub fn constant(&self, coeff: F::Element) -> Self {
        if F::is_zero(&coeff) {
            return self.zero();
        }

        Self {
            coefficients: vec![coeff],
            exponents: vec![E::zero(); self.nvars()],
            field: self.field.clone(),
            variables: self.variables.clone(),
            _phantom: PhantomData,
        }
    }

    /// Constructs a polynomial that is one, inheriting the field and variable map from `self`.
    #[inline]
    pub fn one(&self) -> Self {
        self.constant(self.field.one())
    }

    /// Constructs a polynomial with a single term.
    #[inline]
    pub fn monomial(&self, coeff: F::Element, exponents: &[E]) -> Self {
        debug_assert!(self.nvars() == exponents.len());

        if F::is_zero(&coeff) {
            return self.zero();
        }

        Self {
            coefficients: vec![coeff],
            exponents: exponents.to_vec(),
            field: self.field.clone(),
            variables: self.variables.clone(),
            _phantom: PhantomData,
        }
    }

    /// Constructs the polynomial consisting of the `index`th variable.
    pub fn variable(&self, index: usize) -> Self {
        let mut exp = vec![E::zero(); self.nvars()];
        exp[index] = E::one();
        self.monomial(self.field.one(), &exp)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.nterms() == 0
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.nterms() == 1
            && self.field.is_one(&self.coefficients[0])
            && self.exponents.iter().all(|x| x.is_zero())
    }

    /// Returns the number of terms in the polynomial.
    #[inline]
    pub fn nterms(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns the number of variables in the polynomial.
    #[inline]
    pub fn nvars(&self) -> usize {
        self.variables.len()
    }

    /// Returns true if the polynomial is constant.
    #[inline]
    pub fn is_constant(&self) -> bool {
        match self.nterms() {
            0 => true,
            1 => self.exponents.iter().all(|e| e.is_zero()),
            _ => false,
        }
    }

    /// Returns the slice for the exponents of the specified monomial.
    #[inline]
    pub fn exponents(&self, index: usize) -> &[E] {
        &self.exponents[index * self.nvars()..(index + 1) * self.nvars()]
    }

    #[inline]
    pub fn last_exponents(&self) -> &[E] {
        &self.exponents[(self.nterms() - 1) * self.nvars()..self.nterms() * self.nvars()]
    }

    /// Returns an iterator over the exponents of every monomial.
    #[inline]
    pub fn exponents_iter(&self) -> std::slice::Chunks<E> {
        self.exponents.chunks(self.nvars().max(1))
    }

    /// The term with the largest monomial under `O`, or `None` for the zero polynomial.
    #[inline]
    pub fn leading_term(&self) -> Option<MonomialView<F, E>> {
        if self.is_zero() {
            return None;
        }

        Some(MonomialView {
            coefficient: &self.coefficients[self.nterms() - 1],
            exponents: self.last_exponents(),
        })
    }

    /// Get the leading coefficient. Panics on the zero polynomial.
    #[inline]
    pub fn max_coeff(&self) -> &F::Element {
        match self.coefficients.last() {
            Some(c) => c,
            None => panic!("Cannot get the leading coefficient of the zero polynomial"),
        }
    }

    /// Get the leading monomial. Panics on the zero polynomial.
    #[inline]
    pub fn max_exp(&self) -> &[E] {
        if self.coefficients.is_empty() {
            panic!("Cannot get max exponent of empty polynomial");
        }

        self.last_exponents()
    }

    /// Get the leading coefficient, or zero for the zero polynomial.
    pub fn lcoeff(&self) -> F::Element {
        match self.coefficients.last() {
            Some(c) => c.clone(),
            None => self.field.zero(),
        }
    }

    /// Appends a monomial to the polynomial, merging it with an existing term
    /// with the same exponents.
    pub fn append_monomial(&mut self, coefficient: F::Element, exponents: &[E]) {
        if F::is_zero(&coefficient) {
            return;
        }
        if self.nvars() != exponents.len() {
            panic!(
                "nvars mismatched: got {}, expected {}",
                exponents.len(),
                self.nvars()
            );
        }

        // should we append to the back?
        if self.nterms() == 0 || O::cmp(self.last_exponents(), exponents).is_lt() {
            self.coefficients.push(coefficient);
            self.exponents.extend_from_slice(exponents);
            return;
        }

        // binary search for the insertion point
        let mut l = 0;
        let mut r = self.nterms();
        while l < r {
            let m = (l + r) / 2;
            match O::cmp(self.exponents(m), exponents) {
                Ordering::Less => l = m + 1,
                Ordering::Greater => r = m,
                Ordering::Equal => {
                    self.field
                        .add_assign(&mut self.coefficients[m], &coefficient);
                    if F::is_zero(&self.coefficients[m]) {
                        self.coefficients.remove(m);
                        let i = m * self.nvars();
                        self.exponents.drain(i..i + self.nvars());
                    }
                    return;
                }
            }
        }

        self.coefficients.insert(l, coefficient);
        let i = l * self.nvars();
        self.exponents.splice(i..i, exponents.iter().cloned());
    }

    /// Create a polynomial from terms in arbitrary order. Terms must have distinct exponents.
    fn from_unsorted_terms(&self, terms: Vec<(Exponents<E>, F::Element)>) -> Self {
        let mut terms: Vec<_> = terms.into_iter().filter(|(_, c)| !F::is_zero(c)).collect();
        terms.sort_unstable_by(|(e1, _), (e2, _)| O::cmp(e1, e2));

        let mut res = self.zero_with_capacity(terms.len());
        for (e, c) in terms {
            res.coefficients.push(c);
            res.exponents.extend_from_slice(&e);
        }
        res
    }

    /// Check the internal invariants. Used in tests and debug builds.
    pub fn check_consistency(&self) {
        assert_eq!(self.coefficients.len() * self.nvars(), self.exponents.len());

        for c in &self.coefficients {
            assert!(!F::is_zero(c), "Zero coefficient in polynomial");
        }

        for i in 1..self.nterms() {
            assert_eq!(
                O::cmp(self.exponents(i - 1), self.exponents(i)),
                Ordering::Less,
                "Terms of polynomial are not sorted"
            );
        }
    }

    /// Multiply every coefficient with `other`.
    pub fn mul_coeff(mut self, other: &F::Element) -> Self {
        for c in &mut self.coefficients {
            self.field.mul_assign(c, other);
        }

        for i in (0..self.nterms()).rev() {
            if F::is_zero(&self.coefficients[i]) {
                self.coefficients.remove(i);
                let nvars = self.nvars();
                self.exponents.drain(i * nvars..(i + 1) * nvars);
            }
        }

        self
    }

    /// Add `exponents` to every exponent.
    pub fn try_mul_exp(mut self, exponents: &[E]) -> Result<Self, ExponentOverflow> {
        debug_assert_eq!(self.nvars(), exponents.len());

        if self.nvars() == 0 {
            return Ok(self);
        }

        let nvars = self.nvars();
        for e in self.exponents.chunks_mut(nvars) {
            for (e1, e2) in e.iter_mut().zip(exponents) {
                *e1 = e1.checked_add(e2).ok_or(ExponentOverflow)?;
            }
        }

        Ok(self)
    }

    /// Multiply with the monomial `coefficient * x^exponents`.
    #[inline]
    pub fn try_mul_monomial(
        self,
        coefficient: &F::Element,
        exponents: &[E],
    ) -> Result<Self, ExponentOverflow> {
        self.mul_coeff(coefficient).try_mul_exp(exponents)
    }

    /// Multiply two polynomials, failing when an exponent of the product does not fit in `E`.
    pub fn try_mul(&self, rhs: &Self) -> Result<Self, ExponentOverflow> {
        debug_assert_eq!(self.variables, rhs.variables);

        if self.is_zero() || rhs.is_zero() {
            return Ok(self.zero());
        }

        if self.nterms() == 1 {
            return rhs
                .clone()
                .try_mul_monomial(&self.coefficients[0], &self.exponents);
        }

        if rhs.nterms() == 1 {
            return self
                .clone()
                .try_mul_monomial(&rhs.coefficients[0], &rhs.exponents);
        }

        let mut terms: HashMap<Exponents<E>, F::Element> = HashMap::with_capacity(
            self.nterms()
                .saturating_mul(rhs.nterms())
                .min(MAX_PREALLOCATED_TERMS),
        );
        let mut exp: Exponents<E> = smallvec![E::zero(); self.nvars()];
        for a in self {
            for b in rhs {
                for ((e, ea), eb) in exp.iter_mut().zip(a.exponents).zip(b.exponents) {
                    *e = ea.checked_add(eb).ok_or(ExponentOverflow)?;
                }

                match terms.get_mut(&exp) {
                    Some(c) => self.field.add_mul_assign(c, a.coefficient, b.coefficient),
                    None => {
                        terms.insert(exp.clone(), self.field.mul(a.coefficient, b.coefficient));
                    }
                }
            }
        }

        Ok(self.from_unsorted_terms(terms.into_iter().collect()))
    }

    /// Get the degree of the variable `x`.
    /// This operation is O(n).
    pub fn degree(&self, x: usize) -> E {
        self.exponents_iter()
            .map(|e| e[x])
            .max()
            .unwrap_or(E::zero())
    }

    /// Get the total degree of the polynomial.
    pub fn total_degree(&self) -> u64 {
        self.exponents_iter()
            .map(super::monomial::total_degree)
            .max()
            .unwrap_or(0)
    }

    /// Compute `self^pow`, failing when an exponent of the result does not fit in `E`.
    pub fn try_pow(&self, mut pow: usize) -> Result<Self, ExponentOverflow> {
        if pow == 0 {
            return Ok(self.one());
        }

        if self.is_constant() {
            return Ok(self.constant(self.field.pow(&self.lcoeff(), pow as u64)));
        }

        let mut x = self.clone();
        let mut y = self.one();
        while pow != 1 {
            if pow % 2 == 1 {
                y = y.try_mul(&x)?;
                pow -= 1;
            }

            x = x.try_mul(&x)?;
            pow /= 2;
        }

        x.try_mul(&y)
    }

    /// Compute `self^pow`.
    ///
    /// # Panics
    ///
    /// Panics when an exponent overflows, see [try_pow](Self::try_pow).
    pub fn pow(&self, pow: usize) -> Self {
        match self.try_pow(pow) {
            Ok(p) => p,
            Err(e) => panic!("{}", e),
        }
    }

    /// Embed the polynomial in a larger variable list that starts with the current variables.
    pub fn extend_variables(&self, variables: Arc<Vec<Variable>>) -> Self {
        assert!(
            variables.len() >= self.nvars() && variables[..self.nvars()] == self.variables[..],
            "New variable list must extend the old one"
        );

        let extra = variables.len() - self.nvars();
        let template = Self::new(&self.field, None, variables);

        // the order is preserved for graded orders, but not in general
        let terms = self
            .into_iter()
            .map(|t| {
                let mut e: Exponents<E> = t.exponents.iter().cloned().collect();
                e.extend((0..extra).map(|_| E::zero()));
                (e, t.coefficient.clone())
            })
            .collect();
        template.from_unsorted_terms(terms)
    }

    /// Write the polynomial as `sum_j c_j * x_var^j` and return the `c_j`, which live
    /// in the variable list without `x_var`.
    pub fn split_variable(&self, var: usize) -> Vec<Self> {
        let mut vars = self.variables.as_ref().clone();
        vars.remove(var);
        let template = Self::new(&self.field, None, Arc::new(vars));

        let mut out = vec![template; self.degree(var).to_u32() as usize + 1];
        let mut exp: Exponents<E> = Exponents::new();
        for t in self {
            exp.clear();
            exp.extend(
                t.exponents
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != var)
                    .map(|(_, e)| *e),
            );

            out[t.exponents[var].to_u32() as usize].append_monomial(t.coefficient.clone(), &exp);
        }

        out
    }
}

impl<F: Field, E: Exponent, O: MonomialOrder> MultivariatePolynomial<F, E, O> {
    /// Divide every coefficient by the leading coefficient.
    pub fn make_monic(self) -> Self {
        if self.is_zero() || self.field.is_one(self.max_coeff()) {
            return self;
        }

        let inv = self.field.inv(self.max_coeff());
        self.mul_coeff(&inv)
    }
}

impl<F: Ring, E: Exponent, O: MonomialOrder> std::fmt::Debug for MultivariatePolynomial<F, E, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_zero() {
            return write!(f, "[]");
        }
        let mut first = true;
        write!(f, "[ ")?;
        for monomial in self {
            if first {
                first = false;
            } else {
                write!(f, ", ")?;
            }
            write!(
                f,
                "{{ {:?}, {:?} }}",
                monomial.coefficient, monomial.exponents
            )?;
        }
        write!(f, " ]")
    }
}

impl<F: Ring, E: Exponent, O: MonomialOrder> Display for MultivariatePolynomial<F, E, O> {
    /// Print the polynomial from the leading term down, in a form that can be parsed back.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }

        for (i, t) in self.into_iter().collect::<Vec<_>>().into_iter().rev().enumerate() {
            let c = t.coefficient.to_string();
            let (negative, abs) = match c.strip_prefix('-') {
                Some(abs) => (true, abs),
                None => (false, c.as_str()),
            };

            if negative {
                f.write_str("-")?;
            } else if i > 0 {
                f.write_str("+")?;
            }

            let is_constant = t.exponents.iter().all(|e| e.is_zero());
            let mut first_factor = true;
            if abs != "1" || is_constant {
                f.write_str(abs)?;
                first_factor = false;
            }

            for (v, e) in self.variables.iter().zip(t.exponents) {
                if e.is_zero() {
                    continue;
                }

                if !first_factor {
                    f.write_str("*")?;
                }
                first_factor = false;

                if e.to_u32() == 1 {
                    write!(f, "{}", v)?;
                } else {
                    write!(f, "{}^{}", v, e)?;
                }
            }
        }

        Ok(())
    }
}

impl<F: Ring, E: Exponent, O: MonomialOrder> PartialEq for MultivariatePolynomial<F, E, O> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.variables == other.variables
            && self.nterms() == other.nterms()
            && self.exponents.eq(&other.exponents)
            && self.coefficients.eq(&other.coefficients)
    }
}

impl<F: Ring, E: Exponent, O: MonomialOrder> Eq for MultivariatePolynomial<F, E, O> {}

impl<F: Ring, E: Exponent, O: MonomialOrder> Add for MultivariatePolynomial<F, E, O> {
    type Output = Self;

    fn add(mut self, mut other: Self) -> Self::Output {
        debug_assert_eq!(self.field, other.field);
        debug_assert_eq!(self.variables, other.variables);

        if self.is_zero() {
            return other;
        }
        if other.is_zero() {
            return self;
        }

        // Merge the two polynomials, which are assumed to be already sorted.

        let mut new_coefficients = vec![self.field.zero(); self.nterms() + other.nterms()];
        let mut new_exponents: Vec<E> =
            vec![E::zero(); self.nvars() * (self.nterms() + other.nterms())];
        let mut new_nterms = 0;
        let mut i = 0;
        let mut j = 0;

        macro_rules! insert_monomial {
            ($source:expr, $index:expr) => {
                mem::swap(
                    &mut new_coefficients[new_nterms],
                    &mut $source.coefficients[$index],
                );

                new_exponents[new_nterms * $source.nvars()..(new_nterms + 1) * $source.nvars()]
                    .clone_from_slice($source.exponents($index));
                new_nterms += 1;
            };
        }

        while i < self.nterms() && j < other.nterms() {
            let c = O::cmp(self.exponents(i), other.exponents(j));
            match c {
                Ordering::Less => {
                    insert_monomial!(self, i);
                    i += 1;
                }
                Ordering::Greater => {
                    insert_monomial!(other, j);
                    j += 1;
                }
                Ordering::Equal => {
                    self.field
                        .add_assign(&mut self.coefficients[i], &other.coefficients[j]);
                    if !F::is_zero(&self.coefficients[i]) {
                        insert_monomial!(self, i);
                    }
                    i += 1;
                    j += 1;
                }
            }
        }

        while i < self.nterms() {
            insert_monomial!(self, i);
            i += 1;
        }

        while j < other.nterms() {
            insert_monomial!(other, j);
            j += 1;
        }

        new_coefficients.truncate(new_nterms);
        new_exponents.truncate(self.nvars() * new_nterms);

        Self {
            coefficients: new_coefficients,
            exponents: new_exponents,
            field: self.field,
            variables: self.variables,
            _phantom: PhantomData,
        }
    }
}

impl<'a, 'b, F: Ring, E: Exponent, O: MonomialOrder> Add<&'a MultivariatePolynomial<F, E, O>>
    for &'b MultivariatePolynomial<F, E, O>
{
    type Output = MultivariatePolynomial<F, E, O>;

    fn add(self, other: &'a MultivariatePolynomial<F, E, O>) -> Self::Output {
        self.clone() + other.clone()
    }
}

impl<F: Ring, E: Exponent, O: MonomialOrder> Sub for MultivariatePolynomial<F, E, O> {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        self.add(other.neg())
    }
}

impl<'a, 'b, F: Ring, E: Exponent, O: MonomialOrder> Sub<&'a MultivariatePolynomial<F, E, O>>
    for &'b MultivariatePolynomial<F, E, O>
{
    type Output = MultivariatePolynomial<F, E, O>;

    fn sub(self, other: &'a MultivariatePolynomial<F, E, O>) -> Self::Output {
        self.clone() + other.clone().neg()
    }
}

impl<F: Ring, E: Exponent, O: MonomialOrder> Neg for MultivariatePolynomial<F, E, O> {
    type Output = Self;
    fn neg(mut self) -> Self::Output {
        // Negate coefficients of all terms.
        for c in &mut self.coefficients {
            *c = self.field.neg(c);
        }
        self
    }
}

impl<'a, 'b, F: Ring, E: Exponent, O: MonomialOrder> Mul<&'a MultivariatePolynomial<F, E, O>>
    for &'b MultivariatePolynomial<F, E, O>
{
    type Output = MultivariatePolynomial<F, E, O>;

    /// # Panics
    ///
    /// Panics when an exponent overflows, see [try_mul](MultivariatePolynomial::try_mul).
    fn mul(self, rhs: &'a MultivariatePolynomial<F, E, O>) -> Self::Output {
        match self.try_mul(rhs) {
            Ok(p) => p,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<'a, F: Ring, E: Exponent, O: MonomialOrder> Mul<&'a MultivariatePolynomial<F, E, O>>
    for MultivariatePolynomial<F, E, O>
{
    type Output = MultivariatePolynomial<F, E, O>;

    #[inline]
    fn mul(self, rhs: &'a MultivariatePolynomial<F, E, O>) -> Self::Output {
        (&self) * rhs
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::domains::rational::{Rational, Q};
    use crate::poly::{GrevLexOrder, Variable};

    use super::MultivariatePolynomial;

    type Poly = MultivariatePolynomial<crate::domains::rational::RationalField, u16, GrevLexOrder>;

    fn xy() -> (Poly, Poly) {
        let vars = Arc::new(vec![Variable::new("x"), Variable::new("y")]);
        let zero = Poly::new(&Q, None, vars);
        (zero.variable(0), zero.variable(1))
    }

    #[test]
    fn arithmetic_is_canonical() {
        let (x, y) = xy();
        let p = &(&x + &y) * &(&x - &y);
        let q = &(&x * &x) - &(&y * &y);
        p.check_consistency();
        assert_eq!(p, q);
        assert!((&p - &q).is_zero());
        assert_eq!(p.to_string(), "x^2-y^2");
    }

    #[test]
    fn leading_term_under_grevlex() {
        let (x, y) = xy();
        let p = &(&x.pow(2) * &y) + &(&y.pow(3) + &x.constant(Rational::new(-3, 4)));
        let lt = p.leading_term().unwrap();
        // x^2*y > y^3 in grevlex with x > y
        assert_eq!(lt.exponents, &[2, 1]);
        assert!(p.zero().leading_term().is_none());
        assert_eq!(p.to_string(), "x^2*y+y^3-3/4");
    }

    #[test]
    fn power_and_degree() {
        let (x, y) = xy();
        let p = (&x + &y.constant(Rational::new(1, 1))).pow(3);
        assert_eq!(p.nterms(), 4);
        assert_eq!(p.degree(0), 3);
        assert_eq!(p.degree(1), 0);
        assert_eq!(p.total_degree(), 3);
    }

    #[test]
    fn exponent_overflow_is_reported() {
        let vars = Arc::new(vec![Variable::new("x"), Variable::new("y")]);
        let zero = MultivariatePolynomial::<_, u8, GrevLexOrder>::new(&Q, None, vars);
        let (x, y) = (zero.variable(0), zero.variable(1));

        let p = &x.pow(200) + &y;
        assert!(p.try_mul(&p).is_err());
        assert!(p.try_pow(2).is_err());
        assert!(x.pow(200).try_mul_exp(&[100, 0]).is_err());
        assert_eq!(p.try_mul(&y).unwrap().to_string(), "x^200*y+y^2");
    }

    #[test]
    fn split_and_extend() {
        let (x, y) = xy();
        let vars = Arc::new(vec![Variable::new("x"), Variable::new("y"), Variable::Temporary(0)]);
        let p = (&x * &y + x.clone()).extend_variables(vars);
        let t = p.variable(2);
        let q = &(&p * &t) + &p;
        let parts = q.split_variable(2);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], &x * &y + x.clone());
        assert_eq!(parts[1], parts[0]);
    }
}
