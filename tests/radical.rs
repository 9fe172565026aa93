use std::sync::Arc;
use std::time::{Duration, Instant};

use nullstellensatz::config::SolverConfig;
use nullstellensatz::domains::finite_field::FiniteField;
use nullstellensatz::domains::rational::Q;
use nullstellensatz::domains::{ConvertToRing, Field};
use nullstellensatz::parser::parse_polynomial;
use nullstellensatz::poly::groebner::CancellationToken;
use nullstellensatz::poly::Variable;
use nullstellensatz::solver::{Method, Solution, SolveRequest, Solver, SolverPolynomial};
use nullstellensatz::testing::generate_test_case;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn request(f: &str, gens: &[&str], vars: &[&str]) -> SolveRequest {
    SolveRequest {
        f: f.into(),
        f_list: gens.iter().map(|s| s.to_string()).collect(),
        variables: vars.iter().map(|s| s.to_string()).collect(),
        modulus: None,
    }
}

/// Parse the returned cofactors and check `f^N = Σ g_i * f_i` independently of the solver.
fn check_certificate<F: Field + ConvertToRing>(
    request: &SolveRequest,
    solution: &Solution,
    field: &F,
) -> bool {
    let vars = Arc::new(
        request
            .variables
            .iter()
            .map(|v| Variable::new(v))
            .collect::<Vec<_>>(),
    );
    let parse = |s: &str| -> SolverPolynomial<F> { parse_polynomial(s, &vars, field).unwrap() };

    let (Some(n), Some(coefficients)) = (solution.n, solution.coefficients.as_ref()) else {
        return false;
    };
    if coefficients.len() != request.f_list.len() {
        return false;
    }

    let mut residual = parse(&request.f).pow(n as usize);
    for (g, fi) in coefficients.iter().zip(&request.f_list) {
        residual = residual - parse(g) * &parse(fi);
    }
    residual.is_zero()
}

#[test]
fn zero_target_is_trivial() {
    let r = request("0", &["x", "y^2"], &["x", "y"]);
    let res = Solver::default().solve(&r);

    assert!(res.success);
    assert!(res.solution.is_in_radical);
    assert_eq!(res.solution.method, Method::TrivialCase);
    assert_eq!(res.solution.n, Some(1));
    assert_eq!(res.solution.coefficients, Some(vec!["0".to_string(), "0".to_string()]));
}

#[test]
fn nilpotent_element() {
    let r = request("x", &["x^2"], &["x"]);
    let res = Solver::default().solve(&r);

    assert!(res.success);
    assert!(res.solution.is_in_radical);
    assert_eq!(res.solution.method, Method::GroebnerRabinowitsch);
    assert_eq!(res.solution.n, Some(2));
    assert_eq!(res.solution.coefficients, Some(vec!["1".to_string()]));
}

#[test]
fn not_in_radical() {
    let r = request("x + 1", &["x^2"], &["x"]);
    let res = Solver::default().solve(&r);

    assert!(res.success);
    assert!(!res.solution.is_in_radical);
    assert_eq!(res.solution.method, Method::GroebnerRabinowitsch);
    assert_eq!(res.solution.n, None);
    assert_eq!(res.solution.coefficients, None);
}

#[test]
fn sum_of_nilpotents() {
    let r = request("x + y", &["x^2", "y^2"], &["x", "y"]);
    let res = Solver::default().solve(&r);

    assert!(res.solution.is_in_radical);
    assert_eq!(res.solution.n, Some(3));
    assert!(check_certificate(&r, &res.solution, &Q));
}

#[test]
fn unit_ideal() {
    let r = request("x - 5", &["x*y - 1", "y"], &["x", "y"]);
    let res = Solver::default().solve(&r);

    assert!(res.solution.is_in_radical);
    assert_eq!(res.solution.n, Some(1));
    assert!(check_certificate(&r, &res.solution, &Q));
}

#[test]
fn rational_coefficients() {
    let r = request("x - 1/2", &["(2*x - 1)^3", "y^2 - x"], &["x", "y"]);
    let res = Solver::default().solve(&r);

    assert!(res.solution.is_in_radical);
    assert_eq!(res.solution.n, Some(3));
    assert!(check_certificate(&r, &res.solution, &Q));
}

#[test]
fn without_minimization() {
    let solver = Solver::new(SolverConfig {
        minimize_exponent: false,
        ..SolverConfig::default()
    });

    let r = request("x + y", &["x^2", "y^2"], &["x", "y"]);
    let res = solver.solve(&r);
    assert!(res.solution.is_in_radical);
    assert!(res.solution.n.unwrap() >= 3);
    assert!(check_certificate(&r, &res.solution, &Q));
}

#[test]
fn prime_field() {
    // over Z_2, (x + y)^2 = x^2 + y^2
    let mut r = request("x + y", &["x^2", "y^2"], &["x", "y"]);
    r.modulus = Some(2);
    let res = Solver::default().solve(&r);

    assert!(res.solution.is_in_radical);
    assert_eq!(res.solution.n, Some(2));
    assert!(check_certificate(&r, &res.solution, &FiniteField::new(2).unwrap()));
    assert!(res.solution.explanation.contains("Z_2"));
}

#[test]
fn validation_errors() {
    let solver = Solver::default();

    for r in [
        request("", &["x"], &["x"]),
        request("x", &[], &["x"]),
        request("x", &["x"], &[]),
        request("x", &["x"], &["x", "x"]),
        request("x", &["x"], &["2x"]),
    ] {
        let res = solver.solve(&r);
        assert!(!res.success);
        assert!(!res.solution.is_in_radical);
        assert_eq!(res.solution.method, Method::ValidationError);
    }

    let mut r = request("x", &["x"], &["x"]);
    r.modulus = Some(1);
    assert_eq!(solver.solve(&r).solution.method, Method::ValidationError);
}

#[test]
fn unknown_variable_is_located() {
    let res = Solver::default().solve(&request("x + z", &["x^2"], &["x", "y"]));

    assert_eq!(res.solution.method, Method::ValidationError);
    assert!(res.solution.explanation.contains("unknown variable 'z'"));
    assert!(res.solution.explanation.contains("position 4"));
}

#[test]
fn deterministic() {
    let solver = Solver::default();
    let r = request(
        "x*y + z",
        &["x^2 - y*z", "y^3 - x", "z^2 - x*y^2"],
        &["x", "y", "z"],
    );

    let a = solver.solve(&r).solution;
    let b = solver.solve(&r).solution;
    assert_eq!(a.is_in_radical, b.is_in_radical);
    assert_eq!(a.n, b.n);
    assert_eq!(a.coefficients, b.coefficients);
}

fn hard_request() -> SolveRequest {
    request(
        "x + y + z",
        &[
            "x^7 + y^6 + z^5 - 1",
            "x^5*y^2 + y^3*z^4 + z^2 - 2",
            "x^3*y*z + y^2*z^3 + x*z - 3",
        ],
        &["x", "y", "z"],
    )
}

#[test]
fn cancelled_solve_reports_timeout() {
    let token = CancellationToken::new();
    token.cancel();

    let res = Solver::default().solve_with_token(&hard_request(), &token);
    assert!(!res.success);
    assert!(!res.solution.is_in_radical);
    assert_eq!(res.solution.method, Method::Timeout);
    assert_eq!(res.solution.coefficients, None);
}

#[test]
fn deadline_reports_timeout() {
    let solver = Solver::new(SolverConfig {
        timeout: Some(Duration::from_millis(1)),
        ..SolverConfig::default()
    });

    let start = Instant::now();
    let res = solver.solve(&hard_request());
    assert_eq!(res.solution.method, Method::Timeout);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn expansion_respects_deadline() {
    let timeout = Duration::from_millis(50);
    let solver = Solver::new(SolverConfig {
        timeout: Some(timeout),
        ..SolverConfig::default()
    });

    // every product is below the expansion limit, together they take seconds
    let heavy = vec!["(x + y + z + w)^12 * (x + y + z + w)^12"; 60].join(" + ");
    let start = Instant::now();
    let res = solver.solve(&request("x", &[heavy.as_str()], &["x", "y", "z", "w"]));
    assert_eq!(res.solution.method, Method::Timeout);
    assert!(start.elapsed() < timeout + Duration::from_secs(5));

    for g in ["(x + y + z + w)^80", "(3*x + 7)^2000000"] {
        let start = Instant::now();
        let res = solver.solve(&request("x", &[g], &["x", "y", "z", "w"]));
        assert!(!res.success);
        assert!(!res.solution.is_in_radical);
        assert!(start.elapsed() < timeout + Duration::from_secs(5));
    }
}

#[test]
fn minimization_falls_back_under_basis_limit() {
    let r = request(
        "x",
        &[
            "x^2",
            "a^7 + b^6 + c^5 - 1",
            "a^5*b^2 + b^3*c^4 + c^2 - 2",
            "a^3*b*c + b^2*c^3 + a*c - 3",
        ],
        &["x", "a", "b", "c"],
    );

    for limit in [8, 12] {
        let solver = Solver::new(SolverConfig {
            max_basis_size: Some(limit),
            minimize_exponent: true,
            ..SolverConfig::default()
        });
        let res = solver.solve(&r);

        assert!(res.success);
        assert_eq!(res.solution.method, Method::GroebnerRabinowitsch);
        assert!(res.solution.is_in_radical);
        assert_eq!(res.solution.n, Some(2));
        assert!(check_certificate(&r, &res.solution, &Q));
    }
}

#[test]
fn exponent_overflow_is_a_resource_limit() {
    let res = Solver::default().solve(&request("x^3000000000", &["x^4000000000"], &["x"]));
    assert!(!res.success);
    assert_eq!(res.solution.method, Method::Timeout);
    assert!(res.solution.explanation.contains("exponents exceed"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn certificates_verify(seed in any::<u64>()) {
        let r = generate_test_case(&mut StdRng::seed_from_u64(seed), 2, 2);
        let res = Solver::default().solve(&r);

        if res.solution.method != Method::Timeout {
            prop_assert!(res.success);
        }
        if res.solution.is_in_radical {
            prop_assert!(check_certificate(&r, &res.solution, &Q));
        }
    }

    #[test]
    fn powers_lie_in_the_radical(seed in any::<u64>(), k in 1u32..3) {
        let mut r = generate_test_case(&mut StdRng::seed_from_u64(seed), 2, 0);
        r.f_list = vec![format!("({})^{}", r.f, k)];
        let res = Solver::default().solve(&r);

        prop_assert!(res.solution.is_in_radical);
        prop_assert!(res.solution.n.unwrap() <= k);
        prop_assert!(check_certificate(&r, &res.solution, &Q));
    }
}
