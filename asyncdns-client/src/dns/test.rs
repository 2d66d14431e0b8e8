use crate::dns::service::{RawAnswer, ReplyCallback, ResolverService, SessionRequest};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Single callback invocation performed by a `ScriptedService` session.
#[derive(Debug, Clone)]
pub(crate) struct Step {
    status: i32,
    more_coming: bool,
    rdata: Option<Vec<u8>>,
    ttl: Option<u32>,
    delay: Duration,
}

impl Step {
    pub(crate) fn record(rdata: &[u8], ttl: u32, more_coming: bool) -> Self {
        Self {
            status: 0,
            more_coming,
            rdata: Some(rdata.to_vec()),
            ttl: Some(ttl),
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn status(status: i32) -> Self {
        Self {
            status,
            more_coming: false,
            rdata: None,
            ttl: None,
            delay: Duration::ZERO,
        }
    }

    /// Wait before performing this step.
    pub(crate) fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn answer(&self) -> RawAnswer<'_> {
        RawAnswer {
            status: self.status,
            more_coming: self.more_coming,
            rdata: self.rdata.as_deref(),
            ttl: self.ttl,
            interface_index: 0,
        }
    }
}

/// Number of sessions opened and released by a `ScriptedService`.
#[derive(Debug, Clone, Default)]
pub(crate) struct Counters {
    pub(crate) opened: Arc<AtomicU64>,
    pub(crate) released: Arc<AtomicU64>,
}

#[derive(Debug)]
pub(crate) struct ScriptedSession {
    stop: Arc<AtomicBool>,
}

/// Test implementation of `ResolverService` that plays back the same steps for every
/// session from a separate thread, the way a native service invokes callbacks from a
/// thread it owns. Callbacks are kept so that tests can invoke them after a session
/// has been released.
pub(crate) struct ScriptedService {
    steps: Vec<Step>,
    open_status: Option<i32>,
    hang: bool,
    counters: Counters,
    callbacks: Arc<Mutex<Vec<ReplyCallback>>>,
    requests: Arc<Mutex<Vec<SessionRequest>>>,
}

impl ScriptedService {
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            open_status: None,
            hang: false,
            counters: Counters::default(),
            callbacks: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail to open every session with the given status.
    pub(crate) fn fail_open(mut self, status: i32) -> Self {
        self.open_status = Some(status);
        self
    }

    /// Keep sessions alive after the final step instead of ending the delivery thread.
    pub(crate) fn hang_after(mut self) -> Self {
        self.hang = true;
        self
    }

    pub(crate) fn counters(&self) -> Counters {
        self.counters.clone()
    }

    pub(crate) fn callbacks(&self) -> Arc<Mutex<Vec<ReplyCallback>>> {
        self.callbacks.clone()
    }

    pub(crate) fn requests(&self) -> Arc<Mutex<Vec<SessionRequest>>> {
        self.requests.clone()
    }
}

impl ResolverService for ScriptedService {
    type Session = ScriptedSession;

    fn open(&self, request: &SessionRequest, callback: ReplyCallback) -> Result<Self::Session, i32> {
        if let Some(status) = self.open_status {
            return Err(status);
        }

        self.counters.opened.fetch_add(1, Ordering::Release);
        self.requests.lock().unwrap().push(request.clone());
        self.callbacks.lock().unwrap().push(callback.clone());

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let steps = self.steps.clone();
        let hang = self.hang;

        thread::spawn(move || {
            for step in steps.iter() {
                if !step.delay.is_zero() {
                    thread::sleep(step.delay);
                }

                if thread_stop.load(Ordering::Acquire) {
                    return;
                }

                callback(step.answer());
            }

            while hang && !thread_stop.load(Ordering::Acquire) {
                thread::sleep(Duration::from_millis(1));
            }
        });

        Ok(ScriptedSession { stop })
    }

    fn release(&self, session: Self::Session) {
        session.stop.store(true, Ordering::Release);
        self.counters.released.fetch_add(1, Ordering::Release);
    }
}
