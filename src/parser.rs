//! Parser for polynomial expressions.
//!
//! The accepted grammar is
//! ```text
//! expr   := ['+'|'-'] term (('+'|'-') term)*
//! term   := factor (('*'|'/') factor | factor)*
//! factor := atom ['^' integer]
//! atom   := number | variable | '(' expr ')'
//! ```
//! where two adjacent factors are multiplied, so `3x^2y` equals `3*x^2*y`.
//! Numbers are exact: `0.25` is the rational `1/4`. Division is only allowed by
//! non-zero constants. Whitespace is ignored.
//!
//! Products and powers are expanded while parsing. Expansions that would become too
//! large are rejected with [ParseErrorKind::TooLarge].

use std::fmt::Write;
use std::sync::Arc;

use ahash::HashMap;
use rug::{ops::Pow, Integer as MultiPrecisionInteger};
use smartstring::{LazyCompact, SmartString};

use crate::domains::{ConvertToRing, Field};
use crate::error::{ParseError, ParseErrorKind};
use crate::poly::groebner::CancellationToken;
use crate::poly::polynomial::MultivariatePolynomial;
use crate::poly::{Exponent, MonomialOrder, Variable};

/// Characters that can never be part of a variable name.
pub const OPERATOR_CHARACTERS: &str = "+-*/^(),";

/// The maximal nesting depth of parentheses.
const MAX_DEPTH: usize = 256;

/// The maximal number of term products in a single multiplication.
const MAX_TERM_PRODUCTS: usize = 1_000_000;

/// The maximal exponent of a monomial whose coefficient is not `1` or `-1`.
const MAX_COEFFICIENT_EXPONENT: u32 = 1 << 16;

/// Returns true if `name` can be used as a variable in an expression.
pub fn is_valid_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_identifier_start(c) => chars.all(is_identifier_char),
        _ => false,
    }
}

#[inline]
fn is_identifier_char(c: char) -> bool {
    !c.is_whitespace() && !OPERATOR_CHARACTERS.contains(c)
}

#[inline]
fn is_identifier_start(c: char) -> bool {
    is_identifier_char(c) && !c.is_ascii_digit() && c != '.'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_char(self.as_char())
    }
}

impl Operator {
    #[inline]
    pub fn as_char(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
            Operator::Pow => '^',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Number(SmartString<LazyCompact>),
    ID(SmartString<LazyCompact>),
    Op(Operator),
    OpenParenthesis,
    CloseParenthesis,
    EOF,
}

impl Token {
    /// Returns true if the token can start a factor.
    #[inline]
    fn starts_factor(&self) -> bool {
        matches!(
            self,
            Token::Number(_) | Token::ID(_) | Token::OpenParenthesis
        )
    }
}

#[inline]
fn error<T>(position: usize, reason: ParseErrorKind) -> Result<T, ParseError> {
    Err(ParseError { position, reason })
}

/// Split the input into tokens, each paired with its byte offset.
pub fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let mut tokens = vec![];
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        let token = match c {
            _ if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '+' => Token::Op(Operator::Add),
            '-' => Token::Op(Operator::Sub),
            '*' => Token::Op(Operator::Mul),
            '/' => Token::Op(Operator::Div),
            '^' => Token::Op(Operator::Pow),
            '(' => Token::OpenParenthesis,
            ')' => Token::CloseParenthesis,
            _ if c.is_ascii_digit() => {
                let mut number = SmartString::new();
                let mut seen_dot = false;
                let mut digits_after_dot = 0;
                while let Some(&(p, c)) = chars.peek() {
                    if c.is_ascii_digit() {
                        if seen_dot {
                            digits_after_dot += 1;
                        }
                    } else if c == '.' {
                        if seen_dot {
                            return error(p, ParseErrorKind::MalformedNumber);
                        }
                        seen_dot = true;
                    } else {
                        break;
                    }

                    number.push(c);
                    chars.next();
                }

                if seen_dot && digits_after_dot == 0 {
                    return error(pos, ParseErrorKind::MalformedNumber);
                }

                tokens.push((Token::Number(number), pos));
                continue;
            }
            _ if is_identifier_start(c) => {
                let mut name = SmartString::new();
                while let Some(&(_, c)) = chars.peek() {
                    if !is_identifier_char(c) {
                        break;
                    }
                    name.push(c);
                    chars.next();
                }

                tokens.push((Token::ID(name), pos));
                continue;
            }
            _ => return error(pos, ParseErrorKind::UnexpectedCharacter(c)),
        };

        chars.next();
        tokens.push((token, pos));
    }

    tokens.push((Token::EOF, input.len()));
    Ok(tokens)
}

/// Parse a polynomial expression in the variables `variables` over `field`.
pub fn parse_polynomial<F: Field + ConvertToRing, E: Exponent, O: MonomialOrder>(
    input: &str,
    variables: &Arc<Vec<Variable>>,
    field: &F,
) -> Result<MultivariatePolynomial<F, E, O>, ParseError> {
    parse_polynomial_with_token(input, variables, field, &CancellationToken::new())
}

/// Like [parse_polynomial], but stops with [ParseErrorKind::Cancelled] when `token` fires
/// during the expansion of products and powers.
pub fn parse_polynomial_with_token<F: Field + ConvertToRing, E: Exponent, O: MonomialOrder>(
    input: &str,
    variables: &Arc<Vec<Variable>>,
    field: &F,
    token: &CancellationToken,
) -> Result<MultivariatePolynomial<F, E, O>, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.len() == 1 {
        return error(0, ParseErrorKind::EmptyExpression);
    }

    let names = variables
        .iter()
        .enumerate()
        .filter_map(|(i, v)| match v {
            Variable::Symbol(s) => Some((s.as_str(), i)),
            Variable::Temporary(_) => None,
        })
        .collect();

    let mut parser = Parser {
        tokens,
        index: 0,
        depth: 0,
        names,
        template: MultivariatePolynomial::new(field, None, variables.clone()),
        token,
    };

    let poly = parser.expr()?;

    let (token, pos) = parser.peek();
    match token {
        Token::EOF => Ok(poly),
        Token::CloseParenthesis => error(*pos, ParseErrorKind::UnbalancedParentheses),
        Token::Op(Operator::Pow) => error(*pos, ParseErrorKind::MalformedExponent),
        Token::Op(o) => error(*pos, ParseErrorKind::UnexpectedCharacter(o.as_char())),
        _ => error(*pos, ParseErrorKind::ExpectedTerm),
    }
}

struct Parser<'a, F: Field, E: Exponent, O: MonomialOrder> {
    tokens: Vec<(Token, usize)>,
    index: usize,
    depth: usize,
    names: HashMap<&'a str, usize>,
    template: MultivariatePolynomial<F, E, O>,
    token: &'a CancellationToken,
}

impl<'a, F: Field + ConvertToRing, E: Exponent, O: MonomialOrder> Parser<'a, F, E, O> {
    #[inline]
    fn peek(&self) -> &(Token, usize) {
        // the token list always ends with EOF, which is never consumed
        &self.tokens[self.index]
    }

    #[inline]
    fn next(&mut self) -> (Token, usize) {
        let t = self.tokens[self.index].clone();
        if t.0 != Token::EOF {
            self.index += 1;
        }
        t
    }

    fn expr(&mut self) -> Result<MultivariatePolynomial<F, E, O>, ParseError> {
        let negate = match self.peek().0 {
            Token::Op(Operator::Add) => {
                self.next();
                false
            }
            Token::Op(Operator::Sub) => {
                self.next();
                true
            }
            _ => false,
        };

        let mut acc = self.term()?;
        if negate {
            acc = -acc;
        }

        loop {
            match self.peek().0 {
                Token::Op(Operator::Add) => {
                    self.next();
                    acc = acc + self.term()?;
                }
                Token::Op(Operator::Sub) => {
                    self.next();
                    acc = acc - self.term()?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn term(&mut self) -> Result<MultivariatePolynomial<F, E, O>, ParseError> {
        let mut acc = self.factor()?;

        loop {
            let (token, pos) = self.peek().clone();
            match token {
                Token::Op(Operator::Mul) => {
                    self.next();
                    let f = self.factor()?;
                    acc = self.multiply(acc, f, pos)?;
                }
                Token::Op(Operator::Div) => {
                    self.next();
                    let f = self.factor()?;
                    acc = self.divide(acc, f, pos)?;
                }
                t if t.starts_factor() => {
                    let f = self.factor()?;
                    acc = self.multiply(acc, f, pos)?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn factor(&mut self) -> Result<MultivariatePolynomial<F, E, O>, ParseError> {
        let base = self.atom()?;

        if self.peek().0 != Token::Op(Operator::Pow) {
            return Ok(base);
        }
        self.next();

        let (token, pos) = self.next();
        let Token::Number(n) = token else {
            return error(pos, ParseErrorKind::MalformedExponent);
        };

        if n.contains('.') {
            return error(pos, ParseErrorKind::MalformedExponent);
        }

        let Ok(exp) = n.parse::<u32>() else {
            return error(pos, ParseErrorKind::ExponentOverflow);
        };

        // every exponent of the result must fit
        for v in 0..base.nvars() {
            let fits = base
                .degree(v)
                .to_u32()
                .checked_mul(exp)
                .and_then(E::checked_from_u32)
                .is_some();
            if !fits {
                return error(pos, ParseErrorKind::ExponentOverflow);
            }
        }

        self.power(base, exp, pos)
    }

    /// Compute `base^exp` by repeated squaring, with the limits of [multiply](Self::multiply)
    /// applied to every step.
    fn power(
        &self,
        base: MultivariatePolynomial<F, E, O>,
        exp: u32,
        pos: usize,
    ) -> Result<MultivariatePolynomial<F, E, O>, ParseError> {
        if exp == 0 {
            return Ok(base.one());
        }

        // the coefficient of a monomial grows linearly with the exponent
        if base.nterms() == 1 && exp > MAX_COEFFICIENT_EXPONENT {
            let field = &base.field;
            let c = base.lcoeff();
            if !field.is_one(&c) && !field.is_one(&field.neg(&c)) {
                return error(pos, ParseErrorKind::TooLarge);
            }
        }

        let mut exp = exp;
        let mut acc = base.one();
        let mut square = base;
        loop {
            if exp & 1 == 1 {
                acc = self.multiply(acc, square.clone(), pos)?;
            }

            exp >>= 1;
            if exp == 0 {
                return Ok(acc);
            }
            square = self.multiply(square.clone(), square, pos)?;
        }
    }

    fn atom(&mut self) -> Result<MultivariatePolynomial<F, E, O>, ParseError> {
        let (token, pos) = self.next();
        match token {
            Token::Number(n) => {
                let c = self.number(&n, pos)?;
                Ok(self.template.constant(c))
            }
            Token::ID(name) => match self.names.get(name.as_str()) {
                Some(i) => Ok(self.template.variable(*i)),
                None => error(pos, ParseErrorKind::UnknownVariable(name.to_string())),
            },
            Token::OpenParenthesis => {
                if self.depth == MAX_DEPTH {
                    return error(pos, ParseErrorKind::TooDeep);
                }

                self.depth += 1;
                let e = self.expr()?;
                self.depth -= 1;

                match self.next() {
                    (Token::CloseParenthesis, _) => Ok(e),
                    (Token::EOF, p) => error(p, ParseErrorKind::UnbalancedParentheses),
                    (Token::Op(Operator::Pow), p) => error(p, ParseErrorKind::MalformedExponent),
                    (_, p) => error(p, ParseErrorKind::ExpectedTerm),
                }
            }
            Token::CloseParenthesis => error(pos, ParseErrorKind::UnbalancedParentheses),
            Token::Op(_) | Token::EOF => error(pos, ParseErrorKind::ExpectedTerm),
        }
    }

    /// Convert a decimal literal into the field.
    fn number(&self, n: &str, pos: usize) -> Result<F::Element, ParseError> {
        let field = &self.template.field;
        let (int, frac) = n.split_once('.').unwrap_or((n, ""));

        let mut digits = String::with_capacity(n.len());
        digits.push_str(int);
        digits.push_str(frac);

        let Ok(num) = MultiPrecisionInteger::from_str_radix(&digits, 10) else {
            return error(pos, ParseErrorKind::MalformedNumber);
        };

        let num = field.element_from_integer(num);
        if frac.is_empty() {
            return Ok(num);
        }

        let den = field.element_from_integer(MultiPrecisionInteger::from(10).pow(frac.len() as u32));
        if F::is_zero(&den) {
            return error(pos, ParseErrorKind::DivisionByZero);
        }

        Ok(field.div(&num, &den))
    }

    fn multiply(
        &self,
        a: MultivariatePolynomial<F, E, O>,
        b: MultivariatePolynomial<F, E, O>,
        pos: usize,
    ) -> Result<MultivariatePolynomial<F, E, O>, ParseError> {
        if self.token.is_cancelled() {
            return error(pos, ParseErrorKind::Cancelled);
        }

        if a.nterms().saturating_mul(b.nterms()) > MAX_TERM_PRODUCTS {
            return error(pos, ParseErrorKind::TooLarge);
        }

        match a.try_mul(&b) {
            Ok(p) => Ok(p),
            Err(_) => error(pos, ParseErrorKind::ExponentOverflow),
        }
    }

    fn divide(
        &self,
        a: MultivariatePolynomial<F, E, O>,
        b: MultivariatePolynomial<F, E, O>,
        pos: usize,
    ) -> Result<MultivariatePolynomial<F, E, O>, ParseError> {
        if !b.is_constant() {
            return error(pos, ParseErrorKind::NonConstantDivisor);
        }

        if b.is_zero() {
            return error(pos, ParseErrorKind::DivisionByZero);
        }

        let inv = b.field.inv(&b.lcoeff());
        Ok(a.mul_coeff(&inv))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::domains::finite_field::FiniteField;
    use crate::domains::rational::{Rational, RationalField, Q};
    use crate::error::{ParseError, ParseErrorKind};
    use crate::poly::polynomial::MultivariatePolynomial;
    use crate::poly::{GrevLexOrder, Variable};

    use crate::poly::groebner::CancellationToken;

    use super::{is_valid_variable_name, parse_polynomial, parse_polynomial_with_token};

    type Poly = MultivariatePolynomial<RationalField, u16, GrevLexOrder>;

    fn vars() -> Arc<Vec<Variable>> {
        Arc::new(vec![Variable::new("x"), Variable::new("y"), Variable::new("z_1")])
    }

    fn parse(input: &str) -> Result<Poly, ParseError> {
        parse_polynomial(input, &vars(), &Q)
    }

    fn reason(input: &str) -> (usize, ParseErrorKind) {
        let e = parse(input).unwrap_err();
        (e.position, e.reason)
    }

    #[test]
    fn expressions() {
        let p = parse("3x^2y - 2*x*z_1 + 7").unwrap();
        p.check_consistency();
        assert_eq!(p.to_string(), "3*x^2*y-2*x*z_1+7");

        let q = parse("(x+y)^2 - (x - y)*(x + y)").unwrap();
        assert_eq!(q.to_string(), "2*x*y+2*y^2");

        assert_eq!(parse("-x").unwrap().to_string(), "-x");
        assert_eq!(parse("+ 0.25 x / 3").unwrap().to_string(), "1/12*x");
        assert_eq!(parse("x^0").unwrap().to_string(), "1");
        assert!(parse("x - x").unwrap().is_zero());
        assert_eq!(parse("0").unwrap().to_string(), "0");
        assert_eq!(
            parse("123456789012345678901234567890").unwrap().lcoeff(),
            Rational::from(rug::Integer::from_str_radix("123456789012345678901234567890", 10).unwrap())
        );
    }

    #[test]
    fn display_round_trip() {
        let p = parse("-3/4*x^2*y + y^3 - x + 1").unwrap();
        assert_eq!(parse(&p.to_string()).unwrap(), p);
    }

    #[test]
    fn diagnostics() {
        assert_eq!(reason(""), (0, ParseErrorKind::EmptyExpression));
        assert_eq!(reason("   "), (0, ParseErrorKind::EmptyExpression));
        assert_eq!(reason("x + w"), (4, ParseErrorKind::UnknownVariable("w".into())));
        assert_eq!(reason("x^"), (2, ParseErrorKind::MalformedExponent));
        assert_eq!(reason("x^y"), (2, ParseErrorKind::MalformedExponent));
        assert_eq!(reason("x^1.5"), (2, ParseErrorKind::MalformedExponent));
        assert_eq!(reason("x^-1"), (2, ParseErrorKind::MalformedExponent));
        assert_eq!(reason("(x + y"), (6, ParseErrorKind::UnbalancedParentheses));
        assert_eq!(reason("x + y)"), (5, ParseErrorKind::UnbalancedParentheses));
        assert_eq!(reason("x +"), (3, ParseErrorKind::ExpectedTerm));
        assert_eq!(reason("x * * y"), (4, ParseErrorKind::ExpectedTerm));
        assert_eq!(reason("x / y"), (2, ParseErrorKind::NonConstantDivisor));
        assert_eq!(reason("x / (1 - 1)"), (2, ParseErrorKind::DivisionByZero));
        assert_eq!(reason("x, y"), (1, ParseErrorKind::UnexpectedCharacter(',')));
        assert_eq!(reason("1.2.3"), (3, ParseErrorKind::MalformedNumber));
        assert_eq!(reason("x^70000"), (2, ParseErrorKind::ExponentOverflow));
        assert_eq!(reason("x^2^3"), (3, ParseErrorKind::MalformedExponent));

        let deep = format!("{}x{}", "(".repeat(300), ")".repeat(300));
        assert_eq!(reason(&deep).1, ParseErrorKind::TooDeep);
    }

    #[test]
    fn exponent_overflow_in_product() {
        // fits in u16 separately, but not combined
        assert_eq!(reason("x^40000 * x^40000"), (8, ParseErrorKind::ExponentOverflow));
    }

    #[test]
    fn expansion_limits() {
        assert_eq!(reason("(x + y + z_1)^1000"), (14, ParseErrorKind::TooLarge));
        assert_eq!(reason("7^100000").1, ParseErrorKind::TooLarge);
        assert_eq!(parse("(-1)^4000000001").unwrap().to_string(), "-1");
        assert_eq!(parse("(x + 1)^2").unwrap().to_string(), "x^2+2*x+1");

        let e = parse_polynomial::<_, u32, GrevLexOrder>("(3*x + 7)^2000000", &vars(), &Q).unwrap_err();
        assert_eq!(e.reason, ParseErrorKind::TooLarge);
    }

    #[test]
    fn cancelled_expansion() {
        let token = CancellationToken::new();
        token.cancel();
        let e = parse_polynomial_with_token::<_, u16, GrevLexOrder>("x*y", &vars(), &Q, &token)
            .unwrap_err();
        assert_eq!((e.position, e.reason), (1, ParseErrorKind::Cancelled));

        // nothing to expand
        assert!(parse_polynomial_with_token::<_, u16, GrevLexOrder>("x + y", &vars(), &Q, &token).is_ok());
    }

    #[test]
    fn prime_field_literals() {
        let field = FiniteField::new(7).unwrap();
        let p: MultivariatePolynomial<_, u16, GrevLexOrder> =
            parse_polynomial("1/2 x + 8", &vars(), &field).unwrap();
        assert_eq!(p.to_string(), "4*x+1");

        let e = parse_polynomial::<_, u16, GrevLexOrder>("x/7", &vars(), &field).unwrap_err();
        assert_eq!(e.reason, ParseErrorKind::DivisionByZero);
    }

    #[test]
    fn variable_names() {
        assert!(is_valid_variable_name("x"));
        assert!(is_valid_variable_name("x_1"));
        assert!(is_valid_variable_name("α2"));
        assert!(!is_valid_variable_name(""));
        assert!(!is_valid_variable_name("x 1"));
        assert!(!is_valid_variable_name("1x"));
        assert!(!is_valid_variable_name("a+b"));
    }
}
