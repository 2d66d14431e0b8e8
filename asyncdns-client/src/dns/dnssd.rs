//! Binding to the dns_sd API of the macOS system resolver.

use crate::dns::dnssd_reply::{reply_action, ReplyAction, QUERY_FLAGS};
use crate::dns::service::{RawAnswer, ReplyCallback, ResolverService, SessionRequest};
use crate::dns::status::ServiceStatus;
use crate::dns::CLASS_INET;
use std::ffi::{c_char, c_int, c_void, CString};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

type DNSServiceRef = *mut c_void;
type DNSServiceFlags = u32;
type DNSServiceErrorType = i32;

type DNSServiceQueryRecordReply = extern "C" fn(
    sd_ref: DNSServiceRef,
    flags: DNSServiceFlags,
    interface_index: u32,
    error_code: DNSServiceErrorType,
    fullname: *const c_char,
    rrtype: u16,
    rrclass: u16,
    rdlen: u16,
    rdata: *const c_void,
    ttl: u32,
    context: *mut c_void,
);

/// How often, in milliseconds, the session thread checks if it has been released.
const POLL_INTERVAL_MS: c_int = 100;

extern "C" {
    fn DNSServiceQueryRecord(
        sd_ref: *mut DNSServiceRef,
        flags: DNSServiceFlags,
        interface_index: u32,
        fullname: *const c_char,
        rrtype: u16,
        rrclass: u16,
        callback: DNSServiceQueryRecordReply,
        context: *mut c_void,
    ) -> DNSServiceErrorType;

    fn DNSServiceRefSockFD(sd_ref: DNSServiceRef) -> c_int;

    fn DNSServiceProcessResult(sd_ref: DNSServiceRef) -> DNSServiceErrorType;

    fn DNSServiceRefDeallocate(sd_ref: DNSServiceRef);
}

/// State handed to the native callback via its context pointer.
struct Context {
    callback: ReplyCallback,
    rrtype: u16,
}

/// Native session reference and callback context, owned by the session thread.
struct Handle {
    sd_ref: DNSServiceRef,
    context: *mut Context,
}

// The reference is only ever used from the session thread once it's been created.
unsafe impl Send for Handle {}

impl Drop for Handle {
    fn drop(&mut self) {
        // SAFETY: both pointers were created in `DnssdService::open` and are freed only here,
        // after the last call to DNSServiceProcessResult that could invoke the callback.
        unsafe {
            DNSServiceRefDeallocate(self.sd_ref);
            drop(Box::from_raw(self.context));
        }
    }
}

#[derive(Debug)]
pub struct DnssdSession {
    stop: Arc<AtomicBool>,
}

/// `ResolverService` backed by `DNSServiceQueryRecord`.
///
/// Each session gets a dedicated thread that waits for the session socket to be
/// readable and then processes results, which invokes the callback. Releasing a
/// session signals the thread to stop. It deallocates the native reference on its
/// way out so that release never blocks the caller.
#[derive(Debug, Default)]
pub struct DnssdService;

impl DnssdService {
    pub fn new() -> Self {
        Self
    }
}

impl ResolverService for DnssdService {
    type Session = DnssdSession;

    fn open(&self, request: &SessionRequest, callback: ReplyCallback) -> Result<Self::Session, i32> {
        let fullname = CString::new(request.name.to_string()).map_err(|_| ServiceStatus::BadParam.code())?;
        let rrtype = u16::from(request.qtype);
        let context = Box::into_raw(Box::new(Context { callback, rrtype }));
        let mut sd_ref: DNSServiceRef = ptr::null_mut();

        // SAFETY: fullname outlives the call and context stays valid until the Handle is dropped.
        let status = unsafe {
            DNSServiceQueryRecord(
                &mut sd_ref,
                QUERY_FLAGS,
                request.interface.index(),
                fullname.as_ptr(),
                rrtype,
                CLASS_INET,
                on_reply,
                context.cast(),
            )
        };

        if status != ServiceStatus::NoError.code() {
            // SAFETY: the session wasn't created so nothing else refers to the context.
            unsafe { drop(Box::from_raw(context)) };
            return Err(status);
        }

        let handle = Handle { sd_ref, context };
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();

        thread::Builder::new()
            .name("dnssd-session".to_owned())
            .spawn(move || drive(handle, thread_stop))
            .map_err(|e| {
                tracing::warn!(message = "unable to spawn DNS service session thread", err = %e);
                ServiceStatus::NoMemory.code()
            })?;

        Ok(DnssdSession { stop })
    }

    fn release(&self, session: Self::Session) {
        session.stop.store(true, Ordering::Release);
    }
}

fn drive(handle: Handle, stop: Arc<AtomicBool>) {
    // SAFETY: sd_ref is a valid reference until the handle is dropped.
    let fd = unsafe { DNSServiceRefSockFD(handle.sd_ref) };
    if fd < 0 {
        deliver_status(&handle, ServiceStatus::BadReference.code());
        return;
    }

    while !stop.load(Ordering::Acquire) {
        let mut pfd = libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        };

        // SAFETY: pfd is a single valid pollfd for the duration of the call.
        let ready = unsafe { libc::poll(&mut pfd, 1, POLL_INTERVAL_MS) };
        if ready < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }

            tracing::debug!(message = "polling DNS service socket failed", err = %err);
            deliver_status(&handle, ServiceStatus::Unknown.code());
            return;
        }

        if ready == 0 || stop.load(Ordering::Acquire) {
            continue;
        }

        // SAFETY: sd_ref is valid and only used from this thread.
        let status = unsafe { DNSServiceProcessResult(handle.sd_ref) };
        if status != ServiceStatus::NoError.code() {
            deliver_status(&handle, status);
            return;
        }
    }
}

fn deliver_status(handle: &Handle, status: i32) {
    // SAFETY: context is valid until the handle is dropped.
    let context = unsafe { &*handle.context };
    (context.callback)(RawAnswer::status(status));
}

extern "C" fn on_reply(
    _sd_ref: DNSServiceRef,
    flags: DNSServiceFlags,
    interface_index: u32,
    error_code: DNSServiceErrorType,
    _fullname: *const c_char,
    rrtype: u16,
    _rrclass: u16,
    rdlen: u16,
    rdata: *const c_void,
    ttl: u32,
    context: *mut c_void,
) {
    // Unwinding across the FFI boundary is undefined behavior
    let res = panic::catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: context is the pointer passed to DNSServiceQueryRecord and outlives the session.
        let context = unsafe { &*(context as *const Context) };
        let more_coming = match reply_action(flags, error_code, rrtype, context.rrtype) {
            ReplyAction::Status(status) => {
                (context.callback)(RawAnswer::status(status));
                return;
            }
            ReplyAction::Skip => {
                tracing::trace!(
                    message = "skipping intermediate DNS service result",
                    rrtype = rrtype,
                    flags = flags
                );
                return;
            }
            ReplyAction::Record { more_coming } => more_coming,
        };

        let bytes: &[u8] = if rdata.is_null() || rdlen == 0 {
            &[]
        } else {
            // SAFETY: dns_sd guarantees rdata points to rdlen bytes for the duration of the callback.
            unsafe { std::slice::from_raw_parts(rdata.cast::<u8>(), usize::from(rdlen)) }
        };

        (context.callback)(RawAnswer {
            status: ServiceStatus::NoError.code(),
            more_coming,
            rdata: Some(bytes),
            ttl: Some(ttl),
            interface_index,
        });
    }));

    if res.is_err() {
        tracing::error!(message = "panic in DNS service callback");
    }
}
