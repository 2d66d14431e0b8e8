use crate::core::ResolverError;
use crate::dns::core::{Interface, QueryType};
use crate::dns::name::Name;
use crate::dns::rdata::RecordData;
use crate::dns::reply::{Accumulation, ReplyAccumulator};
use crate::dns::service::{RawAnswer, ReplyCallback, ResolverService, SessionRequest};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for queries issued by a `QueryEngine`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct QueryConfig {
    /// Maximum amount of time to wait for a query to complete.
    pub timeout: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

type QueryResult = Result<Vec<RecordData>, ResolverError>;

/// Pending completion of a single query. Whichever of the callback, cancellation,
/// or timeout paths takes this out of its slot first decides the result.
struct Completion {
    accumulator: ReplyAccumulator,
    sender: oneshot::Sender<QueryResult>,
}

type Slot = Arc<Mutex<Option<Completion>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<Completion>> {
    // A panic while holding the lock can't leave the Option in a partial state
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Closes the completion slot and then releases the native session, once, when
/// the query finishes or its future is dropped.
struct SessionGuard<S>
where
    S: ResolverService,
{
    service: Arc<S>,
    session: Option<S::Session>,
    slot: Slot,
    request: SessionRequest,
}

impl<S> Drop for SessionGuard<S>
where
    S: ResolverService,
{
    fn drop(&mut self) {
        lock(&self.slot).take();
        if let Some(session) = self.session.take() {
            self.service.release(session);
            tracing::debug!(message = "released DNS service session", query = %self.request);
        }
    }
}

/// Event that woke a query waiting for completion.
enum Wake {
    Done(Result<QueryResult, oneshot::error::RecvError>),
    Cancelled,
    TimedOut,
}

/// Runs single queries against a native service: opens a session, feeds every
/// callback invocation to a `ReplyAccumulator`, and waits for the first of
/// completion, cancellation, or timeout.
pub struct QueryEngine<S>
where
    S: ResolverService,
{
    service: Arc<S>,
    config: QueryConfig,
}

impl<S> QueryEngine<S>
where
    S: ResolverService,
{
    pub fn new(service: S, config: QueryConfig) -> Self {
        Self {
            service: Arc::new(service),
            config,
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Perform a single query and return every decoded record in delivery order.
    ///
    /// The native session is released exactly once before this method returns or
    /// when the returned future is dropped, whichever happens first. Callbacks that
    /// arrive after that point are ignored.
    pub async fn query(
        &self,
        qtype: QueryType,
        name: &str,
        interface: Interface,
        cancel: &CancellationToken,
    ) -> Result<Vec<RecordData>, ResolverError> {
        let name = Name::from_str(name)?;
        let request = SessionRequest { name, qtype, interface };

        if cancel.is_cancelled() {
            return Err(ResolverError::cancelled(format!("query {}", request)));
        }

        let (tx, mut rx) = oneshot::channel();
        let slot: Slot = Arc::new(Mutex::new(Some(Completion {
            accumulator: ReplyAccumulator::new(qtype),
            sender: tx,
        })));

        let session = self
            .service
            .open(&request, Self::callback(slot.clone(), request.clone()))
            .map_err(|code| {
                lock(&slot).take();
                ResolverError::init_error(code, format!("unable to open DNS service session for {}", request))
            })?;

        tracing::debug!(message = "opened DNS service session", query = %request);
        let guard = SessionGuard {
            service: self.service.clone(),
            session: Some(session),
            slot: slot.clone(),
            request,
        };

        let wake = tokio::select! {
            biased;
            res = &mut rx => Wake::Done(res),
            _ = cancel.cancelled() => Wake::Cancelled,
            _ = tokio::time::sleep(self.config.timeout) => Wake::TimedOut,
        };

        let res = match wake {
            Wake::Done(Ok(res)) => res,
            Wake::Done(Err(_)) => Err(ResolverError::destruction(format!(
                "completion for {} dropped without a result",
                guard.request
            ))),
            Wake::Cancelled => Self::claim(&slot, &mut rx, || {
                ResolverError::cancelled(format!("query {}", guard.request))
            }),
            Wake::TimedOut => Self::claim(&slot, &mut rx, || {
                ResolverError::timeout(self.config.timeout, format!("query {}", guard.request))
            }),
        };

        drop(guard);
        if let Err(e) = &res {
            tracing::debug!(message = "DNS query failed", err = %e);
        }

        res
    }

    fn callback(slot: Slot, request: SessionRequest) -> ReplyCallback {
        Arc::new(move |answer: RawAnswer<'_>| {
            let mut completion = lock(&slot);
            let Some(pending) = completion.as_mut() else {
                tracing::trace!(
                    message = "ignoring DNS service callback for finished query",
                    query = %request,
                    status = answer.status
                );
                return;
            };

            let res = match pending.accumulator.accept(&answer) {
                Accumulation::Continue => return,
                Accumulation::Complete(records) => Ok(records),
                Accumulation::Failed(e) => Err(e),
            };

            if let Some(pending) = completion.take() {
                tracing::trace!(message = "DNS query complete", query = %request, ok = res.is_ok());
                // The receiver is only gone if the query future was dropped, nothing to do
                let _ = pending.sender.send(res);
            }
        })
    }

    /// Resolve a race between cancellation or timeout and the callback path. If the
    /// slot was already emptied the callback delivered a result, so use that instead.
    fn claim<F>(slot: &Slot, rx: &mut oneshot::Receiver<QueryResult>, err: F) -> QueryResult
    where
        F: FnOnce() -> ResolverError,
    {
        if lock(slot).take().is_some() {
            return Err(err());
        }

        match rx.try_recv() {
            Ok(res) => res,
            Err(_) => Err(err()),
        }
    }
}

impl<S> fmt::Debug for QueryEngine<S>
where
    S: ResolverService,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryEngine").field("config", &self.config).finish()
    }
}
