//! The request/response facade around the radical membership oracle.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use ahash::HashSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::SolverConfig;
use crate::domains::finite_field::FiniteField;
use crate::domains::rational::Q;
use crate::domains::{ConvertToRing, Field};
use crate::error::{ParseError, ParseErrorKind, RadicalError, ValidationError};
use crate::parser::{is_valid_variable_name, parse_polynomial_with_token};
use crate::poly::groebner::CancellationToken;
use crate::poly::polynomial::MultivariatePolynomial;
use crate::poly::{GrevLexOrder, Variable};
use crate::radical::{radical_membership, RadicalOutcome};

/// The polynomial type used by the solver.
pub type SolverPolynomial<F> = MultivariatePolynomial<F, u32, GrevLexOrder>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    pub f: String,
    pub f_list: Vec<String>,
    pub variables: Vec<String>,
    /// Compute over `Z/pZ` instead of the rationals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modulus: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub f: String,
    pub f_list: Vec<String>,
    pub variables: Vec<String>,
}

impl From<&SolveRequest> for Problem {
    fn from(r: &SolveRequest) -> Self {
        Problem {
            f: r.f.clone(),
            f_list: r.f_list.clone(),
            variables: r.variables.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    TrivialCase,
    GroebnerRabinowitsch,
    ValidationError,
    Timeout,
    InternalError,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub is_in_radical: bool,
    #[serde(rename = "N", default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficients: Option<Vec<String>>,
    pub explanation: String,
    pub method: Method,
}

impl Solution {
    fn failure(method: Method, explanation: String) -> Solution {
        Solution {
            is_in_radical: false,
            n: None,
            coefficients: None,
            explanation,
            method,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveResponse {
    pub success: bool,
    pub problem: Problem,
    pub solution: Solution,
    pub timestamp: DateTime<Utc>,
}

impl SolveResponse {
    fn new(problem: Problem, solution: Solution) -> SolveResponse {
        SolveResponse {
            success: matches!(
                solution.method,
                Method::TrivialCase | Method::GroebnerRabinowitsch
            ),
            problem,
            solution,
            timestamp: Utc::now(),
        }
    }

    /// The response to a request that could not be decoded.
    pub fn malformed(message: &str) -> SolveResponse {
        let e = ValidationError::MalformedRequest(message.to_owned());
        warn!("Rejected request: {}", e);
        SolveResponse::new(
            Problem::default(),
            Solution::failure(Method::ValidationError, e.to_string()),
        )
    }

    /// The response to a request whose result was lost.
    pub fn internal_error(message: &str) -> SolveResponse {
        SolveResponse::new(
            Problem::default(),
            Solution::failure(Method::InternalError, message.to_owned()),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Report that the solver is able to serve requests.
pub fn health() -> HealthStatus {
    HealthStatus {
        status: "healthy".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        timestamp: Utc::now(),
    }
}

/// Check the shape of a request. Returns the prime field to compute in, if one was requested.
pub fn validate(request: &SolveRequest) -> Result<Option<FiniteField>, ValidationError> {
    if request.f.trim().is_empty() {
        return Err(ValidationError::EmptyTarget);
    }

    if request.f_list.is_empty() {
        return Err(ValidationError::EmptyGenerators);
    }

    if request.variables.is_empty() {
        return Err(ValidationError::EmptyVariables);
    }

    let mut seen = HashSet::default();
    for (i, name) in request.variables.iter().enumerate() {
        if name.is_empty() {
            return Err(ValidationError::EmptyVariableName(i));
        }

        if !is_valid_variable_name(name) {
            return Err(ValidationError::InvalidVariableName(name.clone()));
        }

        if !seen.insert(name.as_str()) {
            return Err(ValidationError::DuplicateVariable(name.clone()));
        }
    }

    match request.modulus {
        Some(p) => match FiniteField::new(p) {
            Some(field) => Ok(Some(field)),
            None => Err(ValidationError::InvalidModulus(p)),
        },
        None => Ok(None),
    }
}

fn parse<F: Field + ConvertToRing>(
    name: String,
    input: &str,
    variables: &Arc<Vec<Variable>>,
    field: &F,
    token: &CancellationToken,
) -> Result<SolverPolynomial<F>, ValidationError> {
    parse_polynomial_with_token(input, variables, field, token).map_err(|source| ValidationError::Parse {
        field: name,
        input: input.to_owned(),
        source,
    })
}

/// Solves radical membership requests.
#[derive(Clone, Debug, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Solver {
        Solver { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve a request, abandoning it after the configured timeout.
    pub fn solve(&self, request: &SolveRequest) -> SolveResponse {
        let token = match self.config.timeout {
            Some(t) => CancellationToken::with_timeout(t),
            None => CancellationToken::new(),
        };

        self.solve_with_token(request, &token)
    }

    /// Solve a request, abandoning it when `token` fires.
    pub fn solve_with_token(&self, request: &SolveRequest, token: &CancellationToken) -> SolveResponse {
        let start = Instant::now();
        let problem = Problem::from(request);

        let solution = match validate(request) {
            Ok(None) => self.solve_in(request, &Q, token, start),
            Ok(Some(field)) => self.solve_in(request, &field, token, start),
            Err(e) => Err(e),
        };

        let solution = match solution {
            Ok(s) => s,
            Err(e) => {
                warn!("Rejected request: {}", e);
                Solution::failure(Method::ValidationError, e.to_string())
            }
        };

        SolveResponse::new(problem, solution)
    }

    fn solve_in<F: Field + ConvertToRing>(
        &self,
        request: &SolveRequest,
        field: &F,
        token: &CancellationToken,
        start: Instant,
    ) -> Result<Solution, ValidationError> {
        let variables = Arc::new(
            request
                .variables
                .iter()
                .map(|v| Variable::new(v))
                .collect::<Vec<_>>(),
        );

        let parsed = parse("f".to_owned(), &request.f, &variables, field, token).and_then(|f| {
            let generators = request
                .f_list
                .iter()
                .enumerate()
                .map(|(i, g)| parse(format!("fList[{}]", i), g, &variables, field, token))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((f, generators))
        });

        let outcome = match parsed {
            // a panic in the algebra is a bug and must not take down the caller
            Ok((f, generators)) => catch_unwind(AssertUnwindSafe(|| {
                radical_membership(&f, &generators, &self.config, token)
            }))
            .unwrap_or_else(|panic| {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_owned());
                Err(RadicalError::InvariantViolation(message))
            }),
            Err(ValidationError::Parse {
                source:
                    ParseError {
                        reason: ParseErrorKind::Cancelled,
                        ..
                    },
                ..
            }) => Err(RadicalError::Timeout),
            Err(e) => return Err(e),
        };

        let elapsed = start.elapsed();

        let solution = match outcome {
            Ok(RadicalOutcome::Trivial(certificate)) => {
                info!(elapsed_ms = elapsed.as_millis() as u64, "Trivial case: f = 0");
                Solution {
                    is_in_radical: true,
                    n: Some(certificate.n),
                    coefficients: Some(certificate.cofactors.iter().map(|g| g.to_string()).collect()),
                    explanation: "f is the zero polynomial, so f^1 = 0 is in every ideal".to_owned(),
                    method: Method::TrivialCase,
                }
            }
            Ok(RadicalOutcome::InRadical { certificate, stats }) => {
                info!(
                    n = certificate.n,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "f is in the radical"
                );
                Solution {
                    is_in_radical: true,
                    n: Some(certificate.n),
                    coefficients: Some(certificate.cofactors.iter().map(|g| g.to_string()).collect()),
                    explanation: format!(
                        "1 is in the ideal (f_1, ..., f_k, 1 - y*f) over {}, which gives the verified certificate f^{} = Σ g_i*f_i (Groebner basis: {}; computed in {:.3} s)",
                        field,
                        certificate.n,
                        stats,
                        elapsed.as_secs_f64()
                    ),
                    method: Method::GroebnerRabinowitsch,
                }
            }
            Ok(RadicalOutcome::NotInRadical { stats }) => {
                info!(elapsed_ms = elapsed.as_millis() as u64, "f is not in the radical");
                Solution {
                    is_in_radical: false,
                    n: None,
                    coefficients: None,
                    explanation: format!(
                        "1 is not in the ideal (f_1, ..., f_k, 1 - y*f) over {}, so no power of f lies in (f_1, ..., f_k) (Groebner basis: {}; computed in {:.3} s)",
                        field,
                        stats,
                        elapsed.as_secs_f64()
                    ),
                    method: Method::GroebnerRabinowitsch,
                }
            }
            Err(e @ (RadicalError::Timeout | RadicalError::ResourceLimit(_))) => {
                warn!(elapsed_ms = elapsed.as_millis() as u64, "Solve abandoned: {}", e);
                Solution::failure(
                    Method::Timeout,
                    format!("{} after {:.3} s; no certificate was produced", e, elapsed.as_secs_f64()),
                )
            }
            Err(e @ RadicalError::InvariantViolation(_)) => {
                error!("Solve failed: {}", e);
                Solution::failure(Method::InternalError, e.to_string())
            }
        };

        Ok(solution)
    }
}

#[cfg(test)]
mod test {
    use crate::error::ValidationError;
    use crate::poly::groebner::CancellationToken;

    use super::{validate, Method, SolveRequest, Solver};

    fn request(f: &str, gens: &[&str], vars: &[&str]) -> SolveRequest {
        SolveRequest {
            f: f.into(),
            f_list: gens.iter().map(|s| s.to_string()).collect(),
            variables: vars.iter().map(|s| s.to_string()).collect(),
            modulus: None,
        }
    }

    #[test]
    fn validation() {
        assert_eq!(validate(&request(" ", &["x"], &["x"])), Err(ValidationError::EmptyTarget));
        assert_eq!(validate(&request("x", &[], &["x"])), Err(ValidationError::EmptyGenerators));
        assert_eq!(validate(&request("x", &["x"], &[])), Err(ValidationError::EmptyVariables));
        assert_eq!(
            validate(&request("x", &["x"], &["x 1"])),
            Err(ValidationError::InvalidVariableName("x 1".into()))
        );
        assert_eq!(
            validate(&request("x", &["x"], &["x", ""])),
            Err(ValidationError::EmptyVariableName(1))
        );
        assert_eq!(
            validate(&request("x", &["x"], &["x", "x"])),
            Err(ValidationError::DuplicateVariable("x".into()))
        );

        let mut r = request("x", &["x"], &["x"]);
        r.modulus = Some(91);
        assert_eq!(validate(&r), Err(ValidationError::InvalidModulus(91)));
        r.modulus = Some(101);
        assert!(validate(&r).unwrap().is_some());
    }

    #[test]
    fn response_shape() {
        let solver = Solver::default();
        let res = solver.solve(&request("x", &["x^2"], &["x"]));
        assert!(res.success);
        assert_eq!(res.solution.method, Method::GroebnerRabinowitsch);

        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["problem"]["fList"][0], "x^2");
        assert_eq!(json["solution"]["isInRadical"], true);
        assert_eq!(json["solution"]["N"], 2);
        assert_eq!(json["solution"]["method"], "groebner_rabinowitsch");
        assert!(json["timestamp"].is_string());

        let res = solver.solve(&request("x + 1", &["x^2"], &["x"]));
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["solution"]["isInRadical"], false);
        assert!(json["solution"].get("N").is_none());
        assert!(json["solution"].get("coefficients").is_none());
    }

    #[test]
    fn parse_errors_are_rejected() {
        let res = Solver::default().solve(&request("x", &["x^2", "x + w"], &["x"]));
        assert!(!res.success);
        assert_eq!(res.solution.method, Method::ValidationError);
        assert!(res.solution.explanation.contains("fList[1]"));
        assert!(res.solution.explanation.contains("position 4"));
    }

    #[test]
    fn cancelled_parse_is_a_timeout() {
        let token = CancellationToken::new();
        token.cancel();
        let res = Solver::default().solve_with_token(&request("x", &["(x + y)^3"], &["x", "y"]), &token);
        assert!(!res.success);
        assert_eq!(res.solution.method, Method::Timeout);
    }

    #[test]
    fn request_json() {
        let r: SolveRequest =
            serde_json::from_str(r#"{"f": "x", "fList": ["x^2"], "variables": ["x"], "modulus": 7}"#)
                .unwrap();
        assert_eq!(r.f_list, vec!["x^2".to_string()]);
        assert_eq!(r.modulus, Some(7));
    }
}
