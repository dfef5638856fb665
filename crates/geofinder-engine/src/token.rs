//! Per-channel request bookkeeping: query tokens plus the abort handle of
//! whatever call is currently in flight.

use std::fmt;

use futures::future::{AbortHandle, AbortRegistration};

/// Identifies one issued request on a channel. Larger is newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryToken(u64);

impl fmt::Display for QueryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two independent request channels of a resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Forward searches (typed text to candidates).
    Search,
    /// Reverse lookups (coordinate to address).
    Resolve,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Search => write!(f, "search"),
            Channel::Resolve => write!(f, "resolve"),
        }
    }
}

/// At most one live request per channel.
///
/// Issuing a new request aborts the previous one (cancellation, not
/// queuing). The token check in [`RequestChannel::is_current`] stays the
/// authority: an aborted future may already have finished, and only a
/// current token may apply its result.
#[derive(Debug)]
pub struct RequestChannel {
    channel: Channel,
    latest: u64,
    in_flight: Option<AbortHandle>,
}

impl RequestChannel {
    #[must_use]
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            latest: 0,
            in_flight: None,
        }
    }

    /// Mints the next token and aborts whatever was in flight.
    ///
    /// Wrap the request future in
    /// [`Abortable`](futures::future::Abortable) with the returned
    /// registration.
    pub fn issue(&mut self) -> (QueryToken, AbortRegistration) {
        self.abort_in_flight();
        self.latest += 1;
        let (handle, registration) = AbortHandle::new_pair();
        self.in_flight = Some(handle);
        (QueryToken(self.latest), registration)
    }

    /// Makes every outstanding token stale without issuing a new request.
    pub fn invalidate(&mut self) {
        self.abort_in_flight();
        self.latest += 1;
    }

    #[must_use]
    pub fn is_current(&self, token: QueryToken) -> bool {
        token.0 == self.latest
    }

    /// Marks `token`'s request finished. Returns whether it is still the
    /// current one, i.e. whether its result may be applied.
    pub fn complete(&mut self, token: QueryToken) -> bool {
        let current = self.is_current(token);
        if current {
            self.in_flight = None;
        }
        current
    }

    #[must_use]
    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            tracing::debug!(
                channel = %self.channel,
                superseded = self.latest,
                "aborting in-flight request"
            );
            handle.abort();
        }
    }
}
