/// Terminal surface: raw mode, output, key bindings and line entry.
///
/// Output commands are batched with `queue!`-style calls into an in-memory
/// frame and written out once per loop iteration by `flush`.
///
/// Input arrives through `on_readable` (drain the non-blocking fd) and is
/// turned into actions by `next_action`, one decoded key at a time:
///   - Key mode: the key is looked up in the binding table.
///   - Line mode: the key edits the text field; newline hands the text to
///     the pending completion, whose action is returned instead.

use std::collections::HashMap;
use std::io::{self, BufWriter, ErrorKind, Read, Write};
use std::os::fd::AsFd;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{Command, QueueableCommand};
use rustix::fs::{fcntl_getfl, fcntl_setfl, OFlags};
use rustix::termios::{tcgetattr, tcsetattr, LocalModes, OptionalActions, Termios};

use crate::error::TerminalError;
use crate::ui::decoder::{KeyDecoder, LogicalKey};
use crate::ui::line_edit::{LineEdit, LineStep};

const READ_CHUNK: usize = 100;

// ── Raw mode ──

/// Terminal attributes and stdin flags saved before entering raw mode.
struct RawMode {
    termios: Termios,
    flags: OFlags,
}

impl RawMode {
    /// Turns off canonical mode and echo (signals keep working) and makes
    /// stdin non-blocking.
    fn enable() -> io::Result<RawMode> {
        let stdin = io::stdin();
        let fd = stdin.as_fd();

        let termios = tcgetattr(fd)?;
        let mut raw = termios.clone();
        raw.local_modes.remove(LocalModes::ICANON | LocalModes::ECHO);
        tcsetattr(fd, OptionalActions::Now, &raw)?;

        let flags = match fcntl_getfl(fd) {
            Ok(flags) => flags,
            Err(e) => {
                let _ = tcsetattr(fd, OptionalActions::Now, &termios);
                return Err(e.into());
            }
        };
        if let Err(e) = fcntl_setfl(fd, flags | OFlags::NONBLOCK) {
            let _ = tcsetattr(fd, OptionalActions::Now, &termios);
            return Err(e.into());
        }
        Ok(RawMode { termios, flags })
    }

    fn restore(&self) -> io::Result<()> {
        let stdin = io::stdin();
        let fd = stdin.as_fd();
        fcntl_setfl(fd, self.flags)?;
        tcsetattr(fd, OptionalActions::Now, &self.termios)?;
        Ok(())
    }
}

/// Unbuffered reads straight from fd 0, so readiness and data stay in step.
struct StdinReader;

impl Read for StdinReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let stdin = io::stdin();
        Ok(rustix::io::read(stdin.as_fd(), buf)?)
    }
}

// ── Input mode ──

type LineDone<A> = Box<dyn FnOnce(String) -> A>;

enum InputMode<A> {
    Keys,
    Line { edit: LineEdit, on_done: LineDone<A> },
}

// ── Terminal ──

pub struct Terminal<A> {
    input: Box<dyn Read>,
    out: Box<dyn Write>,
    frame: Vec<u8>,
    decoder: KeyDecoder,
    bindings: HashMap<LogicalKey, A>,
    mode: InputMode<A>,
    raw: Option<RawMode>,
    on_error: Option<Box<dyn FnMut(&TerminalError)>>,
    closed: bool,
}

impl<A: Clone> Terminal<A> {
    /// Takes over the controlling terminal: raw mode, hidden cursor, blank screen.
    pub fn open() -> Result<Self, TerminalError> {
        let raw = RawMode::enable().map_err(TerminalError::Setup)?;
        let mut term = Self::with_io(Box::new(StdinReader), Box::new(BufWriter::new(io::stdout())));
        term.raw = Some(raw);
        term.hide_cursor();
        term.clear();
        term.flush()?;
        Ok(term)
    }

    /// A terminal over arbitrary streams. No terminal modes are touched.
    pub fn with_io(input: Box<dyn Read>, out: Box<dyn Write>) -> Self {
        Terminal {
            input,
            out,
            frame: Vec::with_capacity(4096),
            decoder: KeyDecoder::new(),
            bindings: HashMap::new(),
            mode: InputMode::Keys,
            raw: None,
            on_error: None,
            closed: false,
        }
    }

    /// Called with the error when input ends or fails. Without a handler
    /// the error is returned from `on_readable`.
    pub fn set_error_handler(&mut self, handler: impl FnMut(&TerminalError) + 'static) {
        self.on_error = Some(Box::new(handler));
    }

    // ── Bindings ──

    /// Binds `key` to `action`, replacing any previous binding of that key.
    pub fn bind(&mut self, key: LogicalKey, action: A) {
        self.bindings.insert(key, action);
    }

    pub fn unbind(&mut self, key: &LogicalKey) {
        self.bindings.remove(key);
    }

    #[cfg(test)]
    pub fn binding(&self, key: &LogicalKey) -> Option<&A> {
        self.bindings.get(key)
    }

    // ── Output ──

    fn queue(&mut self, command: impl Command) {
        // Writing into a Vec cannot fail.
        let _ = self.frame.queue(command);
    }

    /// Writes `text` at column `x`, row `y` (0-based) in the given colours.
    pub fn put_str(&mut self, x: usize, y: usize, text: &str, fg: Color, bg: Color) {
        self.queue(MoveTo(x as u16, y as u16));
        self.queue(SetForegroundColor(fg));
        self.queue(SetBackgroundColor(bg));
        self.queue(Print(text));
    }

    /// Writes `text` in the terminal's default colours.
    pub fn put(&mut self, x: usize, y: usize, text: &str) {
        self.put_str(x, y, text, Color::Reset, Color::Reset);
    }

    pub fn clear(&mut self) {
        self.queue(ResetColor);
        self.queue(Clear(ClearType::All));
    }

    pub fn hide_cursor(&mut self) {
        self.queue(Hide);
    }

    fn write_frame(&mut self) -> io::Result<()> {
        self.out.write_all(&self.frame)?;
        self.frame.clear();
        self.out.flush()
    }

    /// Sends everything queued since the last flush.
    pub fn flush(&mut self) -> Result<(), TerminalError> {
        if self.closed {
            self.frame.clear();
            return Ok(());
        }
        self.write_frame().map_err(TerminalError::Output)
    }

    // ── Line entry ──

    /// Starts reading a line of at most `max_len` characters at (`x`, `y`).
    /// Key bindings are suspended until the line completes or is cancelled.
    /// `on_done` runs once with the entered text and its action is
    /// delivered through `next_action`.
    pub fn get_string(&mut self, x: usize, y: usize, max_len: usize, on_done: impl FnOnce(String) -> A + 'static) {
        if self.closed {
            return;
        }
        self.mode = InputMode::Line { edit: LineEdit::new(x, y, max_len), on_done: Box::new(on_done) };
        self.queue(MoveTo(x as u16, y as u16));
        self.queue(Show);
    }

    /// Abandons line entry without running its completion.
    pub fn cancel_string(&mut self) {
        if let InputMode::Line { .. } = self.mode {
            self.mode = InputMode::Keys;
            self.queue(Hide);
        }
    }

    #[cfg(test)]
    pub fn is_reading_line(&self) -> bool {
        matches!(self.mode, InputMode::Line { .. })
    }

    // ── Input ──

    /// Reads everything currently available on the input.
    pub fn on_readable(&mut self) -> Result<(), TerminalError> {
        if self.closed {
            return Ok(());
        }
        let mut buf = [0u8; READ_CHUNK];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return self.fail(TerminalError::Eof),
                Ok(n) => self.decoder.push(&buf[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return self.fail(TerminalError::Read(e)),
            }
        }
    }

    fn fail(&mut self, err: TerminalError) -> Result<(), TerminalError> {
        tracing::error!("terminal input failed: {err}");
        if let Err(close_err) = self.close() {
            tracing::warn!("terminal restore failed: {close_err}");
        }
        match self.on_error.as_mut() {
            Some(handler) => {
                handler(&err);
                Ok(())
            }
            None => Err(err),
        }
    }

    /// The next action produced by buffered input, if any.
    pub fn next_action(&mut self) -> Option<A> {
        if self.closed {
            return None;
        }
        while let Some(key) = self.decoder.next_key() {
            if let Some(action) = self.interpret(key) {
                return Some(action);
            }
        }
        None
    }

    fn interpret(&mut self, key: LogicalKey) -> Option<A> {
        let step = match &mut self.mode {
            InputMode::Keys => {
                let action = self.bindings.get(&key).cloned();
                if action.is_none() {
                    tracing::trace!(?key, "unbound key");
                }
                return action;
            }
            InputMode::Line { edit, .. } => edit.accept(&key),
        };

        match step {
            LineStep::Ignored => None,
            LineStep::Echo(c) => {
                self.queue(Print(c));
                None
            }
            LineStep::Erased => {
                if let InputMode::Line { edit, .. } = &self.mode {
                    let (x, y) = edit.origin();
                    let text = edit.text().to_owned();
                    self.queue(MoveTo(x as u16, y as u16));
                    self.queue(Print(format!("{text} ")));
                    self.queue(MoveTo(x as u16, y as u16));
                    self.queue(Print(text));
                }
                None
            }
            LineStep::Done(text) => {
                let InputMode::Line { on_done, .. } = std::mem::replace(&mut self.mode, InputMode::Keys) else {
                    return None;
                };
                self.queue(Hide);
                Some(on_done(text))
            }
        }
    }

    // ── Shutdown ──

    /// Resets colours, clears the screen, shows the cursor and restores
    /// the saved terminal modes. Later calls do nothing.
    pub fn close(&mut self) -> Result<(), TerminalError> {
        if self.closed {
            return Ok(());
        }
        self.mode = InputMode::Keys;
        self.bindings.clear();
        self.clear();
        self.queue(MoveTo(0, 0));
        self.queue(Show);
        let written = self.write_frame().map_err(TerminalError::Output);
        self.closed = true;

        let restored = match self.raw.take() {
            Some(raw) => raw.restore().map_err(TerminalError::Setup),
            None => Ok(()),
        };
        written.and(restored)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<A> Drop for Terminal<A> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let _ = self.frame.queue(ResetColor);
        let _ = self.frame.queue(Show);
        let _ = self.out.write_all(&self.frame);
        let _ = self.out.flush();
        if let Some(raw) = self.raw.take() {
            if let Err(e) = raw.restore() {
                tracing::warn!("terminal restore on drop failed: {e}");
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Capture, Script};
    use super::*;
    use crate::domain::direction::Direction;
    use std::cell::Cell;
    use std::rc::Rc;

    fn term() -> (Terminal<String>, Script, Capture) {
        let script = Script::default();
        let capture = Capture::default();
        let t = Terminal::with_io(Box::new(script.clone()), Box::new(capture.clone()));
        (t, script, capture)
    }

    fn drain(t: &mut Terminal<String>) -> Vec<String> {
        std::iter::from_fn(|| t.next_action()).collect()
    }

    // ── Key mode ──

    #[test]
    fn bound_keys_produce_actions() {
        let (mut t, script, _) = term();
        t.bind(LogicalKey::Arrow(Direction::Up), "up".into());
        t.bind(LogicalKey::SPACE, "space".into());
        script.push(b"\x1b[Ax ");
        t.on_readable().unwrap();
        assert_eq!(drain(&mut t), vec!["up".to_string(), "space".to_string()]);
    }

    #[test]
    fn rebinding_replaces_and_unbind_removes() {
        let (mut t, script, _) = term();
        t.bind(LogicalKey::ESCAPE, "first".into());
        t.bind(LogicalKey::ESCAPE, "second".into());
        script.push(b"\x1b");
        t.on_readable().unwrap();
        assert_eq!(drain(&mut t), vec!["second".to_string()]);

        t.unbind(&LogicalKey::ESCAPE);
        script.push(b"\x1b");
        t.on_readable().unwrap();
        assert!(drain(&mut t).is_empty());
    }

    #[test]
    fn split_arrow_waits_for_final_byte() {
        let (mut t, script, _) = term();
        t.bind(LogicalKey::Arrow(Direction::Left), "left".into());
        script.push(b"\x1b[");
        t.on_readable().unwrap();
        assert!(drain(&mut t).is_empty());
        script.push(b"D");
        t.on_readable().unwrap();
        assert_eq!(drain(&mut t), vec!["left".to_string()]);
    }

    #[test]
    fn interrupted_read_is_retried() {
        let (mut t, script, _) = term();
        t.bind(LogicalKey::Char(b'a'), "a".into());
        script.push_err(ErrorKind::Interrupted);
        script.push(b"a");
        t.on_readable().unwrap();
        assert_eq!(drain(&mut t), vec!["a".to_string()]);
    }

    // ── Line mode ──

    #[test]
    fn line_entry_completes_once_with_text() {
        let (mut t, script, capture) = term();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        t.get_string(10, 5, 3, move |s| {
            counter.set(counter.get() + 1);
            format!("name:{s}")
        });
        script.push(b"ab\x7fcde\n");
        t.on_readable().unwrap();
        assert_eq!(drain(&mut t), vec!["name:acd".to_string()]);
        assert_eq!(calls.get(), 1);
        assert!(!t.is_reading_line());

        t.flush().unwrap();
        assert!(capture.text().contains("a "), "backspace repaint missing");
    }

    #[test]
    fn bindings_are_bypassed_while_reading_a_line() {
        let (mut t, script, _) = term();
        t.bind(LogicalKey::Char(b'q'), "quit".into());
        t.bind(LogicalKey::ESCAPE, "back".into());
        t.get_string(0, 0, 9, |s| format!("name:{s}"));
        script.push(b"\x1bq\x1b[A\n");
        t.on_readable().unwrap();
        assert_eq!(drain(&mut t), vec!["name:q".to_string()]);
    }

    #[test]
    fn keys_after_newline_use_bindings() {
        let (mut t, script, _) = term();
        t.bind(LogicalKey::Char(b'q'), "quit".into());
        t.get_string(0, 0, 9, |s| format!("name:{s}"));
        script.push(b"x\nq");
        t.on_readable().unwrap();
        assert_eq!(drain(&mut t), vec!["name:x".to_string(), "quit".to_string()]);
    }

    #[test]
    fn cancel_drops_completion() {
        let (mut t, script, _) = term();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        t.bind(LogicalKey::ENTER, "enter".into());
        t.get_string(0, 0, 9, move |s| {
            counter.set(counter.get() + 1);
            s
        });
        t.cancel_string();
        script.push(b"\n");
        t.on_readable().unwrap();
        assert_eq!(drain(&mut t), vec!["enter".to_string()]);
        assert_eq!(calls.get(), 0);
    }

    // ── End of input ──

    #[test]
    fn eof_without_handler_is_returned() {
        let (mut t, script, _) = term();
        script.push(b"");
        assert!(matches!(t.on_readable(), Err(TerminalError::Eof)));
        assert!(t.is_closed());
    }

    #[test]
    fn eof_with_handler_calls_it() {
        let (mut t, script, _) = term();
        let seen = Rc::new(Cell::new(0));
        let handler_seen = seen.clone();
        t.set_error_handler(move |err| {
            assert!(matches!(err, TerminalError::Eof));
            handler_seen.set(handler_seen.get() + 1);
        });
        script.push(b"");
        assert!(t.on_readable().is_ok());
        assert_eq!(seen.get(), 1);
        assert!(t.is_closed());
        assert_eq!(t.next_action(), None);
    }

    #[test]
    fn fatal_read_error_closes() {
        let (mut t, script, _) = term();
        script.push_err(ErrorKind::BrokenPipe);
        assert!(matches!(t.on_readable(), Err(TerminalError::Read(_))));
        assert!(t.is_closed());
    }

    #[test]
    fn close_is_idempotent() {
        let (mut t, _, capture) = term();
        t.put(0, 0, "hello");
        t.close().unwrap();
        t.close().unwrap();
        drop(t);
        assert_eq!(capture.text().matches("\x1b[?25h").count(), 1);
        assert!(capture.text().contains("hello"));
    }

    #[test]
    fn put_str_positions_text() {
        let (mut t, _, capture) = term();
        t.put_str(4, 2, "██", Color::White, Color::Reset);
        t.flush().unwrap();
        // crossterm emits 1-based coordinates
        assert!(capture.text().contains("\x1b[3;5H"));
        assert!(capture.text().ends_with("██"));
    }
}
