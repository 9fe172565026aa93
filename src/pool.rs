//! A bounded pool of solver workers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam::channel::{self, Receiver, TryRecvError};
use rayon::ThreadPool;
use tracing::debug;

use crate::config::SolverConfig;
use crate::error::PoolError;
use crate::poly::groebner::CancellationToken;
use crate::solver::{SolveRequest, SolveResponse, Solver};

/// Releases an admission slot when the job ends, also when it unwinds.
struct Slot(Arc<AtomicUsize>);

impl Drop for Slot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A solve that was admitted to the pool.
pub struct PendingSolve {
    receiver: Receiver<SolveResponse>,
}

impl PendingSolve {
    /// Block until the response is available.
    pub fn wait(self) -> Result<SolveResponse, PoolError> {
        self.receiver.recv().map_err(|_| PoolError::Disconnected)
    }

    /// Returns the response if it is available.
    pub fn try_wait(&self) -> Result<Option<SolveResponse>, PoolError> {
        match self.receiver.try_recv() {
            Ok(r) => Ok(Some(r)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(PoolError::Disconnected),
        }
    }
}

/// Runs independent solves on a thread pool, admitting at most `queue_capacity`
/// requests at the same time. Requests beyond that are rejected immediately.
pub struct SolverPool {
    thread_pool: Arc<ThreadPool>,
    solver: Arc<Solver>,
    in_flight: Arc<AtomicUsize>,
    capacity: usize,
}

impl SolverPool {
    pub fn new(config: SolverConfig) -> Result<SolverPool, PoolError> {
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.n_cores)
            .thread_name(|i| format!("radical-worker-{}", i))
            .build()
            .map_err(|e| PoolError::Startup(e.to_string()))?;

        debug!(
            "Started solver pool with {} threads and capacity {}",
            config.n_cores, config.queue_capacity
        );

        Ok(SolverPool {
            thread_pool: Arc::new(thread_pool),
            capacity: config.queue_capacity,
            solver: Arc::new(Solver::new(config)),
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of admitted requests that have not finished yet.
    #[inline]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Submit a request that is abandoned after the configured timeout.
    pub fn submit(&self, request: SolveRequest) -> Result<PendingSolve, PoolError> {
        let token = match self.solver.config().timeout {
            Some(t) => CancellationToken::with_timeout(t),
            None => CancellationToken::new(),
        };

        self.submit_with_token(request, token)
    }

    /// Submit a request that is abandoned when `token` fires.
    pub fn submit_with_token(
        &self,
        request: SolveRequest,
        token: CancellationToken,
    ) -> Result<PendingSolve, PoolError> {
        if self
            .in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.capacity).then_some(n + 1)
            })
            .is_err()
        {
            return Err(PoolError::Saturated {
                capacity: self.capacity,
            });
        }

        let slot = Slot(self.in_flight.clone());
        let (sender, receiver) = channel::bounded(1);
        let solver = self.solver.clone();

        self.thread_pool.spawn(move || {
            let response = solver.solve_with_token(&request, &token);
            drop(slot);

            if sender.send(response).is_err() {
                debug!("Response dropped: the receiver is gone");
            }
        });

        Ok(PendingSolve { receiver })
    }
}
