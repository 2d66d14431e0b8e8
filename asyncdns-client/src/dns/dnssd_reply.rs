//! Interpretation of the flags and status passed to dns_sd query callbacks.

pub(crate) const FLAG_MORE_COMING: u32 = 0x1;
pub(crate) const FLAG_ADD: u32 = 0x2;
pub(crate) const FLAG_RETURN_INTERMEDIATES: u32 = 0x1000;

/// Flags for every `DNSServiceQueryRecord` call. Without intermediate results dns_sd
/// never reports negative answers such as NXDOMAIN and the query only ends by timing out.
pub(crate) const QUERY_FLAGS: u32 = FLAG_RETURN_INTERMEDIATES;

/// What to forward to the session callback for a single dns_sd callback invocation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum ReplyAction {
    /// Non-success status, ends the query.
    Status(i32),
    /// Record of the queried type.
    Record { more_coming: bool },
    /// Intermediate result (a CNAME followed on the way to the answer) or a removal.
    Skip,
}

pub(crate) fn reply_action(flags: u32, error_code: i32, rrtype: u16, query_rrtype: u16) -> ReplyAction {
    if error_code != 0 {
        return ReplyAction::Status(error_code);
    }

    // Skipped entirely, even without "more coming": a CNAME delivered on its own is
    // followed by the records of the queried type in a later callback.
    if flags & FLAG_ADD == 0 || rrtype != query_rrtype {
        return ReplyAction::Skip;
    }

    ReplyAction::Record {
        more_coming: flags & FLAG_MORE_COMING != 0,
    }
}
