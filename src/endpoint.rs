use tracing::trace;

/// Local and remote open/close intent of a session or link.
///
/// `open_requests` and `close_requests` count local transitions that still
/// have to be flushed as frames by the protocol engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointState {
    local_open: bool,
    remote_open: bool,
    open_requests: u32,
    close_requests: u32,
    initialised: bool,
}

impl EndpointState {
    pub fn new() -> Self {
        EndpointState::default()
    }

    /// Resets to the state of a freshly created endpoint.
    pub fn init(&mut self) {
        *self = EndpointState::default();
    }

    /// Returns true when an open frame has to be sent.
    pub fn open(&mut self) -> bool {
        self.initialised = true;
        if self.local_open {
            return false;
        }
        self.local_open = true;
        self.open_requests += 1;
        trace!("endpoint opened locally, {} open requests", self.open_requests);
        true
    }

    /// Returns true when a close frame has to be sent.
    pub fn close(&mut self) -> bool {
        if !self.local_open {
            return false;
        }
        self.local_open = false;
        self.close_requests += 1;
        trace!("endpoint closed locally, {} close requests", self.close_requests);
        true
    }

    /// Forgets everything learned from the peer and re-applies the local
    /// intent, so that it is resent after reconnecting.
    pub fn disconnected(&mut self) {
        let was_initialised = self.initialised;
        let was_open = self.local_open;
        self.init();
        self.initialised = was_initialised;
        trace!("endpoint disconnected, was open: {}", was_open);
        if was_open {
            self.open();
        } else {
            self.close();
        }
    }

    pub fn remote_opened(&mut self) -> bool {
        if self.remote_open {
            return false;
        }
        trace!("endpoint opened by peer");
        self.remote_open = true;
        true
    }

    pub fn remote_closed(&mut self) -> bool {
        if !self.remote_open {
            return false;
        }
        trace!("endpoint closed by peer");
        self.remote_open = false;
        true
    }

    pub fn is_open(&self) -> bool {
        self.local_open && self.remote_open
    }

    pub fn is_closed(&self) -> bool {
        self.initialised && !self.local_open && !self.remote_open
    }

    pub fn is_local_open(&self) -> bool {
        self.local_open
    }

    pub fn is_remote_open(&self) -> bool {
        self.remote_open
    }

    /// True once every local request has been flushed.
    pub fn has_settled(&self) -> bool {
        self.open_requests == 0 && self.close_requests == 0
    }

    /// Consumes one pending open request.
    pub fn need_open(&mut self) -> bool {
        if self.open_requests > 0 {
            self.open_requests -= 1;
            true
        } else {
            false
        }
    }

    /// Consumes one pending close request.
    pub fn need_close(&mut self) -> bool {
        if self.close_requests > 0 {
            self.close_requests -= 1;
            true
        } else {
            false
        }
    }
}
