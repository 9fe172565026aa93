//! Error types of the crate.
//!
//! User faults ([ParseError], [ValidationError]) are detected before any algebra runs.
//! A negative membership answer is not an error, see [RadicalOutcome](crate::radical::RadicalOutcome).

use thiserror::Error;

/// A malformed polynomial expression. `position` is the byte offset in the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} at position {position}")]
pub struct ParseError {
    pub position: usize,
    pub reason: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("malformed exponent")]
    MalformedExponent,
    #[error("unbalanced parentheses")]
    UnbalancedParentheses,
    #[error("empty expression")]
    EmptyExpression,
    #[error("expected a term")]
    ExpectedTerm,
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("malformed number")]
    MalformedNumber,
    #[error("division by zero")]
    DivisionByZero,
    #[error("division by a non-constant expression")]
    NonConstantDivisor,
    #[error("exponent too large")]
    ExponentOverflow,
    #[error("expression nested too deeply")]
    TooDeep,
    #[error("expression expands to too many terms")]
    TooLarge,
    #[error("parsing was cancelled")]
    Cancelled,
}

/// A structurally invalid request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("the target polynomial f is empty")]
    EmptyTarget,
    #[error("the generator list fList is empty")]
    EmptyGenerators,
    #[error("the variable list is empty")]
    EmptyVariables,
    #[error("variable name at index {0} is empty")]
    EmptyVariableName(usize),
    #[error("invalid variable name '{0}': names cannot contain whitespace or any of +-*/^(), and cannot start with a digit or '.'")]
    InvalidVariableName(String),
    #[error("duplicate variable name '{0}'")]
    DuplicateVariable(String),
    #[error("modulus {0} is not a prime below 2^63")]
    InvalidModulus(u64),
    #[error("cannot parse {field} '{input}': {source}")]
    Parse {
        field: String,
        input: String,
        #[source]
        source: ParseError,
    },
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

/// A product whose exponents do not fit in the exponent type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("exponents exceed the supported range")]
pub struct ExponentOverflow;

/// Abnormal termination of a Groebner basis computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GroebnerError {
    #[error("the computation was cancelled")]
    Cancelled,
    #[error("the basis grew beyond {limit} elements")]
    ResourceLimit { limit: usize },
    #[error(transparent)]
    ExponentOverflow(#[from] ExponentOverflow),
}

/// Failure of the radical membership procedure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RadicalError {
    #[error("the computation timed out")]
    Timeout,
    #[error("resource limit reached: {0}")]
    ResourceLimit(GroebnerError),
    /// A self-check failed. This indicates a bug in the algebra engine.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

impl From<GroebnerError> for RadicalError {
    fn from(e: GroebnerError) -> Self {
        match e {
            GroebnerError::Cancelled => RadicalError::Timeout,
            GroebnerError::ResourceLimit { .. } | GroebnerError::ExponentOverflow(_) => {
                RadicalError::ResourceLimit(e)
            }
        }
    }
}

impl From<ExponentOverflow> for RadicalError {
    fn from(e: ExponentOverflow) -> Self {
        RadicalError::ResourceLimit(e.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("the solver pool is saturated ({capacity} requests in flight)")]
    Saturated { capacity: usize },
    #[error("the worker disconnected before sending a result")]
    Disconnected,
    #[error("cannot start the worker pool: {0}")]
    Startup(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },
}
