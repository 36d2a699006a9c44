//! In-flight fetches.

use crossbeam::channel::{self, Receiver};
use rayon::ThreadPool;

use brine_ir::FileUri;

use crate::backend::{DeferredFetch, FetchError};
use crate::loader::ImportSite;

type FetchResult = Result<String, FetchError>;

/// Content of one file on its way to the parser.
pub(crate) enum Fetch {
    Ready(FetchResult),
    InFlight(Receiver<FetchResult>),
}

impl Fetch {
    /// Start `fetch` on `pool`.
    pub(crate) fn spawn(pool: &ThreadPool, fetch: DeferredFetch) -> Self {
        let (tx, rx) = channel::bounded(1);
        pool.spawn(move || {
            // The receiver is gone only if the loader itself was dropped.
            let _ = tx.send(fetch());
        });
        Fetch::InFlight(rx)
    }

    /// Whether [`Fetch::wait`] would return without blocking.
    pub(crate) fn is_complete(&self) -> bool {
        match self {
            Fetch::Ready(_) => true,
            Fetch::InFlight(rx) => !rx.is_empty(),
        }
    }

    /// Block until the content (or the failure) is available.
    pub(crate) fn wait(self, target: &FileUri) -> FetchResult {
        match self {
            Fetch::Ready(result) => result,
            Fetch::InFlight(rx) => rx
                .recv()
                .unwrap_or_else(|_| Err(FetchError::WorkerLost(target.clone()))),
        }
    }
}

/// Threads serving deferred fetches. Fetches mostly wait on I/O, so the
/// count does not follow the CPU count.
const FETCH_THREADS: usize = 8;

/// Build the pool for one deferred walk; `None` means fetches run inline.
pub(crate) fn fetch_pool() -> Option<ThreadPool> {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(FETCH_THREADS)
        .thread_name(|i| format!("brine-fetch-{i}"))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            tracing::warn!(error = %e, "cannot start fetch threads, reading inline");
            None
        }
    }
}

/// A file whose content was requested but not yet parsed.
///
/// Leaves the pending queue as soon as its fetch resolves, successfully or
/// not.
pub(crate) struct PendingFile {
    pub(crate) target: FileUri,
    pub(crate) directive: Option<ImportSite>,
    pub(crate) fetch: Fetch,
}
