/// Screens and the routing between them.
///
/// A screen is a self-contained piece of UI that owns the keyboard and its
/// timers while active. A parent owns each child screen in a `Slot`:
///
///   switch_to(parent, slot, params, on_result)
///     parent.pause() → child.activate(params); `on_result` is stored
///
///   child.handle(..) returns Some(result)          (switch back)
///     child.deactivate() → stored `on_result` is taken and run once
///     with (parent, result)
///
/// Events enter at the root and are forwarded down through engaged slots,
/// so only the deepest engaged screen handles them. No screen knows about
/// its siblings; results only flow back through the continuation.

pub mod game;
pub mod game_over;
pub mod leader_board;
pub mod menu;
pub mod settings;

use crate::config::GameConfig;
use crate::event_loop::{TimerId, Timers};
use crate::store::Store;
use crate::ui::terminal::Terminal;

// ── Vocabulary ──

/// What a bound key means to the screens.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Toggle,
    Back,
    NameEntered(String),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Event {
    Action(Action),
    Timer(TimerId),
}

/// Everything a screen may touch while handling a call.
pub struct Context<'a> {
    pub term: &'a mut Terminal<Action>,
    pub timers: &'a mut Timers,
    pub store: &'a Store,
    pub config: &'a GameConfig,
}

// ── Lifecycle ──

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Lifecycle {
    /// Never activated.
    #[default]
    Inert,
    Active,
    /// Handed control to a child; will be re-activated.
    Paused,
    Inactive,
    Closed,
}

impl Lifecycle {
    /// Enters `Active`. Returns false (no change) if already active or closed.
    pub fn activate(&mut self) -> bool {
        match self {
            Lifecycle::Active | Lifecycle::Closed => false,
            _ => {
                *self = Lifecycle::Active;
                true
            }
        }
    }

    pub fn pause(&mut self) -> bool {
        if *self != Lifecycle::Active {
            return false;
        }
        *self = Lifecycle::Paused;
        true
    }

    /// Leaves `Active` or `Paused`. Returns false if neither.
    pub fn deactivate(&mut self) -> bool {
        match self {
            Lifecycle::Active | Lifecycle::Paused => {
                *self = Lifecycle::Inactive;
                true
            }
            _ => false,
        }
    }

    pub fn close(&mut self) -> bool {
        if *self == Lifecycle::Closed {
            return false;
        }
        *self = Lifecycle::Closed;
        true
    }

    pub fn can_activate(self) -> bool {
        !matches!(self, Lifecycle::Active | Lifecycle::Closed)
    }

    pub fn is_active(self) -> bool {
        self == Lifecycle::Active
    }

    pub fn is_closed(self) -> bool {
        self == Lifecycle::Closed
    }
}

// ── Screen ──

pub trait Screen {
    type Params;
    type Output;

    fn lifecycle(&self) -> Lifecycle;

    /// Takes the keyboard and draws. Must ignore calls while active or closed.
    fn activate(&mut self, params: Self::Params, cx: &mut Context<'_>);

    /// Releases bindings and timers before a child takes over.
    fn pause(&mut self, cx: &mut Context<'_>);

    /// Releases everything. Idempotent.
    fn deactivate(&mut self, cx: &mut Context<'_>);

    /// Deactivates, then closes owned children. Idempotent.
    fn close(&mut self, cx: &mut Context<'_>);

    /// Handles one event. `Some` switches back to the parent with a result.
    fn handle(&mut self, event: Event, cx: &mut Context<'_>) -> Option<Self::Output>;
}

// ── Slot ──

pub type Continuation<P, O> = Box<dyn FnOnce(&mut P, O, &mut Context<'_>)>;

/// A child screen owned by `P`, plus the continuation waiting for its result.
pub struct Slot<S: Screen, P> {
    screen: S,
    on_result: Option<Continuation<P, S::Output>>,
}

impl<S: Screen, P> Slot<S, P> {
    pub fn new(screen: S) -> Self {
        Slot { screen, on_result: None }
    }

    #[cfg(test)]
    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// True between activation and switch-back.
    pub fn is_engaged(&self) -> bool {
        self.on_result.is_some()
    }

    /// Activates the child. Ignored, keeping any outstanding continuation,
    /// when the child cannot be activated.
    pub fn activate(
        &mut self,
        params: S::Params,
        on_result: impl FnOnce(&mut P, S::Output, &mut Context<'_>) + 'static,
        cx: &mut Context<'_>,
    ) {
        if !self.screen.lifecycle().can_activate() {
            return;
        }
        self.on_result = Some(Box::new(on_result));
        self.screen.activate(params, cx);
    }

    /// Closes the child and forgets its continuation.
    pub fn close(&mut self, cx: &mut Context<'_>) {
        self.on_result = None;
        self.screen.close(cx);
    }
}

/// Pauses `owner` and hands control to the child in `slot`.
pub fn switch_to<P: Screen, S: Screen>(
    owner: &mut P,
    slot: fn(&mut P) -> &mut Slot<S, P>,
    params: S::Params,
    on_result: impl FnOnce(&mut P, S::Output, &mut Context<'_>) + 'static,
    cx: &mut Context<'_>,
) {
    owner.pause(cx);
    slot(owner).activate(params, on_result, cx);
}

/// Passes `event` to the child in `slot`. When the child produces a result,
/// the child is deactivated and the stored continuation runs exactly once.
pub fn forward<P, S: Screen>(
    owner: &mut P,
    slot: fn(&mut P) -> &mut Slot<S, P>,
    event: Event,
    cx: &mut Context<'_>,
) {
    let target = slot(owner);
    if !target.is_engaged() {
        return;
    }
    let Some(result) = target.screen.handle(event, cx) else {
        return;
    };
    target.screen.deactivate(cx);
    if let Some(resume) = target.on_result.take() {
        resume(owner, result, cx);
    }
}
