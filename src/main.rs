//! Line-oriented driver: reads one JSON request per line from stdin and writes
//! one JSON response per line to stdout, in the order of the requests.
//!
//! A line `{"health": true}` is answered with the health status.
//! Logging goes to stderr and is controlled by `RADICAL_LOG`, e.g. `RADICAL_LOG=debug`.

use std::collections::VecDeque;
use std::io::{self, BufRead, BufWriter, Write};
use std::process::ExitCode;

use nullstellensatz::config::SolverConfig;
use nullstellensatz::error::PoolError;
use nullstellensatz::pool::{PendingSolve, SolverPool};
use nullstellensatz::solver::{health, SolveRequest, SolveResponse};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

enum Output {
    Ready(String),
    Pending(PendingSolve),
}

/// Write the finished responses at the front of the queue. Blocks for at most
/// `wait_for` responses that are still being computed.
fn drain(queue: &mut VecDeque<Output>, out: &mut impl Write, mut wait_for: usize) -> io::Result<()> {
    while let Some(front) = queue.front() {
        let line = match front {
            Output::Ready(s) => s.clone(),
            Output::Pending(p) => {
                let response = if wait_for > 0 {
                    wait_for -= 1;
                    match queue.pop_front() {
                        Some(Output::Pending(p)) => Some(p.wait()),
                        _ => None,
                    }
                } else {
                    match p.try_wait() {
                        Ok(None) => break,
                        r => {
                            queue.pop_front();
                            r.transpose()
                        }
                    }
                };

                let response = match response {
                    Some(Ok(r)) => r,
                    Some(Err(e)) => {
                        error!("Lost a response: {}", e);
                        SolveResponse::internal_error(&e.to_string())
                    }
                    None => continue,
                };

                writeln!(out, "{}", serde_json::to_string(&response)?)?;
                continue;
            }
        };

        queue.pop_front();
        writeln!(out, "{}", line)?;
    }

    out.flush()
}

fn run(pool: &SolverPool, input: impl BufRead, output: impl Write) -> io::Result<()> {
    let mut out = BufWriter::new(output);
    let mut queue = VecDeque::new();

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let request = match serde_json::from_str::<serde_json::Value>(&line) {
            Ok(v) if v.get("health").is_some() => {
                queue.push_back(Output::Ready(serde_json::to_string(&health())?));
                None
            }
            Ok(v) => match serde_json::from_value::<SolveRequest>(v) {
                Ok(r) => Some(r),
                Err(e) => {
                    let response = SolveResponse::malformed(&e.to_string());
                    queue.push_back(Output::Ready(serde_json::to_string(&response)?));
                    None
                }
            },
            Err(e) => {
                let response = SolveResponse::malformed(&e.to_string());
                queue.push_back(Output::Ready(serde_json::to_string(&response)?));
                None
            }
        };

        if let Some(request) = request {
            loop {
                match pool.submit(request.clone()) {
                    Ok(p) => {
                        queue.push_back(Output::Pending(p));
                        break;
                    }
                    Err(PoolError::Saturated { .. }) => {
                        // backpressure: wait for the oldest request to finish
                        if queue.iter().any(|o| matches!(o, Output::Pending(_))) {
                            drain(&mut queue, &mut out, 1)?;
                        } else {
                            std::thread::yield_now();
                        }
                    }
                    Err(e) => {
                        error!("Cannot submit request: {}", e);
                        let response = SolveResponse::internal_error(&e.to_string());
                        queue.push_back(Output::Ready(serde_json::to_string(&response)?));
                        break;
                    }
                }
            }
        }

        drain(&mut queue, &mut out, 0)?;
    }

    drain(&mut queue, &mut out, usize::MAX)
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_env("RADICAL_LOG"))
        .init();

    let config = match SolverConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "Starting radical solver with {} threads, capacity {}, timeout {:?}",
        config.n_cores, config.queue_capacity, config.timeout
    );

    let pool = match SolverPool::new(config) {
        Ok(p) => p,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&pool, io::stdin().lock(), io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("I/O error: {}", e);
            ExitCode::FAILURE
        }
    }
}
