/// Single-threaded readiness loop: stdin, the signal pipe and timers.
///
/// `wait` blocks in mio until stdin or the signal pipe becomes readable or
/// the earliest timer is due. Timers are then popped one at a time, so a
/// timer cleared by an earlier callback never fires.

use std::io;
use std::os::fd::AsRawFd;
use std::time::{Duration, Instant};

use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};

use crate::signals::SignalRouter;

const STDIN: Token = Token(0);
const SIGNALS: Token = Token(1);

// ── Timers ──

/// Handle to a scheduled timeout. Release it with `Timers::clear_timeout`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TimerId(u64);

#[derive(Default, Debug)]
pub struct Timers {
    next_id: u64,
    /// Kept sorted by (deadline, id).
    pending: Vec<(Instant, TimerId)>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_timeout(&mut self, delay: Duration) -> TimerId {
        self.set_deadline(Instant::now() + delay)
    }

    fn set_deadline(&mut self, deadline: Instant) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let slot = self.pending.partition_point(|&(at, other)| (at, other.0) <= (deadline, id.0));
        self.pending.insert(slot, (deadline, id));
        id
    }

    /// Cancels a timer. Unknown or already fired ids are ignored.
    pub fn clear_timeout(&mut self, id: TimerId) {
        self.pending.retain(|&(_, other)| other != id);
    }

    #[cfg(test)]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|&(_, other)| other == id)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.first().map(|&(at, _)| at)
    }

    /// Removes and returns the earliest timer that is due at `now`.
    pub fn pop_expired(&mut self, now: Instant) -> Option<TimerId> {
        match self.pending.first() {
            Some(&(at, id)) if at <= now => {
                self.pending.remove(0);
                Some(id)
            }
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// ── Event loop ──

/// What woke the loop up.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Wake {
    Input,
    Signal,
}

pub struct EventLoop {
    poll: Poll,
    events: Events,
    pub timers: Timers,
}

impl EventLoop {
    pub fn new() -> io::Result<Self> {
        Ok(EventLoop {
            poll: Poll::new()?,
            events: Events::with_capacity(16),
            timers: Timers::new(),
        })
    }

    /// Watches fd 0 for readability (edge-triggered: drain it fully).
    pub fn watch_stdin(&self) -> io::Result<()> {
        let fd = io::stdin().as_raw_fd();
        self.poll.registry().register(&mut SourceFd(&fd), STDIN, Interest::READABLE)
    }

    pub fn watch_signals<A>(&self, router: &mut SignalRouter<A>) -> io::Result<()> {
        router.register(self.poll.registry(), SIGNALS)
    }

    /// Blocks until input, a signal, or the next timer deadline.
    /// Returns an empty list when only timers are due.
    pub fn wait(&mut self) -> io::Result<Vec<Wake>> {
        let timeout = self
            .timers
            .next_deadline()
            .map(|at| at.saturating_duration_since(Instant::now()));

        if let Err(e) = self.poll.poll(&mut self.events, timeout) {
            if e.kind() == io::ErrorKind::Interrupted {
                return Ok(Vec::new());
            }
            return Err(e);
        }

        let mut wakes = Vec::with_capacity(2);
        for event in self.events.iter() {
            let wake = match event.token() {
                STDIN => Wake::Input,
                SIGNALS => Wake::Signal,
                _ => continue,
            };
            if !wakes.contains(&wake) {
                wakes.push(wake);
            }
        }
        Ok(wakes)
    }
}
