/// Process signal routing.
///
/// Signals are caught by `signal-hook` and surfaced through a pipe that the
/// event loop polls. Each watched signal can be mapped to an action; only
/// one router may exist at a time because signal dispositions are global.

use std::collections::HashMap;
use std::io;
use std::os::raw::c_int;
use std::sync::atomic::{AtomicBool, Ordering};

use mio::{Interest, Registry, Token};
use signal_hook_mio::v1_0::Signals;

use crate::error::SignalError;

static INSTALLED: AtomicBool = AtomicBool::new(false);

pub struct SignalRouter<A> {
    signals: Signals,
    watched: Vec<c_int>,
    actions: HashMap<c_int, A>,
}

impl<A: Clone> SignalRouter<A> {
    /// Installs handlers for `watched`. Fails if another router is alive.
    pub fn new(watched: &[c_int]) -> Result<Self, SignalError> {
        if INSTALLED.swap(true, Ordering::SeqCst) {
            return Err(SignalError::AlreadyInstalled);
        }
        match Signals::new(watched) {
            Ok(signals) => Ok(SignalRouter { signals, watched: watched.to_vec(), actions: HashMap::new() }),
            Err(e) => {
                INSTALLED.store(false, Ordering::SeqCst);
                Err(SignalError::Io(e))
            }
        }
    }

    /// Maps `signum` to `action`, replacing any earlier mapping.
    pub fn on(&mut self, signum: c_int, action: A) -> Result<(), SignalError> {
        if !self.watched.contains(&signum) {
            return Err(SignalError::NotWatched(signum));
        }
        self.actions.insert(signum, action);
        Ok(())
    }

    /// Actions for every signal delivered since the last call.
    /// Signals without a mapping are dropped.
    pub fn drain(&mut self) -> Vec<A> {
        let mut actions = Vec::new();
        for signum in self.signals.pending() {
            match self.actions.get(&signum) {
                Some(action) => {
                    tracing::info!(signum, "signal received");
                    actions.push(action.clone());
                }
                None => tracing::debug!(signum, "unmapped signal ignored"),
            }
        }
        actions
    }
}

impl<A> SignalRouter<A> {
    pub(crate) fn register(&mut self, registry: &Registry, token: Token) -> io::Result<()> {
        registry.register(&mut self.signals, token, Interest::READABLE)
    }
}

// Dropping `signals` unregisters the handlers.
impl<A> Drop for SignalRouter<A> {
    fn drop(&mut self) {
        INSTALLED.store(false, Ordering::SeqCst);
    }
}
