use std::time::Duration;

use crate::error::ConfigError;

pub const TIMEOUT_VAR: &str = "RADICAL_TIMEOUT_MS";
pub const THREADS_VAR: &str = "RADICAL_THREADS";
pub const QUEUE_VAR: &str = "RADICAL_QUEUE";

/// Settings of the solver and its worker pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    /// The time after which a solve is abandoned. `None` means no limit.
    pub timeout: Option<Duration>,
    /// Apply Buchberger's coprime criterion to pairs that do not involve the
    /// Rabinowitsch generator.
    pub coprime_criterion: bool,
    /// Abandon a solve when the Groebner basis grows beyond this size.
    pub max_basis_size: Option<usize>,
    /// Search for the smallest exponent `N` with `f^N` in the ideal, instead of
    /// using the one that falls out of the back-substitution.
    pub minimize_exponent: bool,
    /// The number of worker threads.
    pub n_cores: usize,
    /// The maximal number of requests in flight before new ones are rejected.
    pub queue_capacity: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let n_cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        SolverConfig {
            timeout: Some(Duration::from_secs(30)),
            coprime_criterion: true,
            max_basis_size: Some(10_000),
            minimize_exponent: true,
            n_cores,
            queue_capacity: 4 * n_cores,
        }
    }
}

impl SolverConfig {
    /// The default configuration, overridden by the environment variables
    /// `RADICAL_TIMEOUT_MS` (0 disables the timeout), `RADICAL_THREADS` and `RADICAL_QUEUE`.
    pub fn from_env() -> Result<SolverConfig, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<SolverConfig, ConfigError> {
        let mut config = SolverConfig::default();

        if let Some(ms) = parse_var(&lookup, TIMEOUT_VAR)? {
            config.timeout = (ms > 0).then(|| Duration::from_millis(ms as u64));
        }

        if let Some(n) = parse_var(&lookup, THREADS_VAR)? {
            if n == 0 {
                return Err(ConfigError::InvalidValue {
                    name: THREADS_VAR,
                    value: n.to_string(),
                });
            }
            config.n_cores = n;
            config.queue_capacity = 4 * n;
        }

        if let Some(n) = parse_var(&lookup, QUEUE_VAR)? {
            if n == 0 {
                return Err(ConfigError::InvalidValue {
                    name: QUEUE_VAR,
                    value: n.to_string(),
                });
            }
            config.queue_capacity = n;
        }

        Ok(config)
    }
}

fn parse_var(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<usize>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(value) => match value.trim().parse() {
            Ok(n) => Ok(Some(n)),
            Err(_) => Err(ConfigError::InvalidValue { name, value }),
        },
    }
}
