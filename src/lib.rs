//! Decide whether a polynomial `f` lies in the radical of the ideal generated by
//! `f_1, ..., f_k`, and if so produce an exponent `N` and cofactors `g_i` with
//! `f^N = g_1*f_1 + ... + g_k*f_k` that are verified by exact arithmetic.
//!
//! The decision uses the Rabinowitsch trick: `f` is in the radical if and only if
//! `1` is in the ideal `(f_1, ..., f_k, 1 - y*f)`, which is decided with a Groebner
//! basis that records how every element is built from the generators.
//!
//! For example:
//!
//! ```
//! use nullstellensatz::solver::{SolveRequest, Solver};
//!
//! let request = SolveRequest {
//!     f: "x".into(),
//!     f_list: vec!["x^2".into()],
//!     variables: vec!["x".into()],
//!     modulus: None,
//! };
//!
//! let response = Solver::default().solve(&request);
//! assert!(response.solution.is_in_radical);
//! assert_eq!(response.solution.n, Some(2));
//! assert_eq!(response.solution.coefficients, Some(vec!["1".to_string()]));
//! ```

pub mod certificate;
pub mod config;
pub mod domains;
pub mod error;
pub mod parser;
pub mod poly;
pub mod pool;
pub mod radical;
pub mod solver;
pub mod testing;
pub mod utils;
