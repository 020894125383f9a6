/// Application root: owns the terminal, the event loop and the screen tree.
///
/// Each loop iteration:
///   wait → drain input → dispatch actions → fire due timers → flush
/// The loop ends when the main menu switches back (Exit), the terminal
/// closes, or SIGINT/SIGTERM arrives.

use std::error::Error;
use std::time::Instant;

use signal_hook::consts::{SIGINT, SIGTERM};

use crate::config::GameConfig;
use crate::error::TerminalError;
use crate::event_loop::{EventLoop, Wake};
use crate::screen::menu::MenuScreen;
use crate::screen::{forward, Action, Context, Event, Slot};
use crate::signals::SignalRouter;
use crate::store::Store;
use crate::ui::terminal::Terminal;

/// What a caught signal asks the loop to do.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Interrupt {
    Shutdown,
}

// ── Shell ──

/// Top of the screen tree. Holds the main menu and notes when it is done.
struct Shell {
    main: Slot<MenuScreen, Shell>,
    done: bool,
}

impl Shell {
    fn new() -> Self {
        Shell { main: Slot::new(MenuScreen::new()), done: false }
    }

    fn main_slot(&mut self) -> &mut Slot<MenuScreen, Shell> {
        &mut self.main
    }

    fn start(&mut self, cx: &mut Context<'_>) {
        self.main.activate((), |shell: &mut Shell, (), _cx: &mut Context<'_>| {
            tracing::info!("main menu exited");
            shell.done = true;
        }, cx);
    }

    fn dispatch(&mut self, event: Event, cx: &mut Context<'_>) {
        forward(self, Self::main_slot, event, cx);
    }

    fn close(&mut self, cx: &mut Context<'_>) {
        self.main.close(cx);
    }
}

// ── App ──

pub struct App {
    term: Terminal<Action>,
    event_loop: EventLoop,
    signals: SignalRouter<Interrupt>,
    store: Store,
    config: GameConfig,
    shell: Shell,
}

impl App {
    /// Takes over the terminal and installs the signal handlers.
    pub fn new(config: GameConfig) -> Result<Self, Box<dyn Error>> {
        let mut signals = SignalRouter::new(&[SIGINT, SIGTERM])?;
        signals.on(SIGINT, Interrupt::Shutdown)?;
        signals.on(SIGTERM, Interrupt::Shutdown)?;

        let event_loop = EventLoop::new()?;
        event_loop.watch_stdin()?;
        event_loop.watch_signals(&mut signals)?;

        let mut term = Terminal::open()?;
        // Lost input ends the session like Exit. The terminal is already restored here.
        term.set_error_handler(|err| eprintln!("Input closed: {err}"));
        let store = Store::at(config.data_dir.clone());
        Ok(App { term, event_loop, signals, store, config, shell: Shell::new() })
    }

    /// Runs until the menu exits, input ends or a shutdown signal arrives.
    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        self.with_context(|shell, cx| shell.start(cx));
        self.term.flush()?;

        while !self.shell.done && !self.term.is_closed() {
            for wake in self.event_loop.wait()? {
                match wake {
                    Wake::Input => self.on_input()?,
                    Wake::Signal => {
                        if self.signals.drain().contains(&Interrupt::Shutdown) {
                            tracing::info!("shutdown requested by signal");
                            return Ok(());
                        }
                    }
                }
            }

            let now = Instant::now();
            while !self.shell.done {
                let Some(id) = self.event_loop.timers.pop_expired(now) else {
                    break;
                };
                self.with_context(|shell, cx| shell.dispatch(Event::Timer(id), cx));
            }
            self.term.flush()?;
        }
        Ok(())
    }

    fn on_input(&mut self) -> Result<(), TerminalError> {
        self.term.on_readable()?;
        while !self.shell.done {
            let Some(action) = self.term.next_action() else {
                break;
            };
            tracing::trace!(?action, "dispatch");
            self.with_context(|shell, cx| shell.dispatch(Event::Action(action), cx));
        }
        Ok(())
    }

    /// Closes every screen, then restores the terminal. Safe to call twice.
    pub fn shutdown(&mut self) -> Result<(), TerminalError> {
        self.with_context(|shell, cx| shell.close(cx));
        self.term.close()
    }

    fn with_context(&mut self, f: impl FnOnce(&mut Shell, &mut Context<'_>)) {
        let App { term, event_loop, store, config, shell, .. } = self;
        let mut cx = Context { term, timers: &mut event_loop.timers, store, config };
        f(shell, &mut cx);
    }
}
