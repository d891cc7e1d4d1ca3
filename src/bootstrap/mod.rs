//! Bootstrap Adapter Module
//!
//! Wraps the parallel-launch runtime that starts the job: every participant
//! has a rank, knows the world size, and can join a global barrier. The
//! container constructors lean on two such barriers to sequence startup:
//! servers bind their handlers, everyone waits, clients attach, everyone
//! waits again, and only then may operations flow.
//!
//! The crate does not talk to any launcher itself. Embedding applications
//! implement [`Bootstrap`] over whatever their runtime provides (an MPI
//! communicator, a job-manager API). [`ProcessGroup`] is the in-process
//! implementation used when all ranks live in one OS process, which is also
//! how the test suite simulates a job.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Barrier;

/// The collective primitives of the surrounding launch runtime.
pub trait Bootstrap: Send + Sync {
    /// This participant's rank in `[0, size)`.
    fn rank(&self) -> usize;

    /// Number of participants in the job.
    fn size(&self) -> usize;

    /// A global barrier across all participants.
    fn barrier(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// In-process group of ranks sharing one cyclic barrier.
pub struct ProcessGroup {
    rank: usize,
    size: usize,
    barrier: Arc<Barrier>,
}

impl ProcessGroup {
    /// Creates one handle per rank, all joined on the same barrier.
    pub fn group(size: usize) -> Vec<Arc<ProcessGroup>> {
        let barrier = Arc::new(Barrier::new(size));
        (0..size)
            .map(|rank| {
                Arc::new(ProcessGroup {
                    rank,
                    size,
                    barrier: barrier.clone(),
                })
            })
            .collect()
    }
}

impl Bootstrap for ProcessGroup {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            self.barrier.wait().await;
        })
    }
}
