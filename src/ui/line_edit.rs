/// Single-line text entry state.
///
/// Pure state machine: the terminal feeds it decoded keys and performs
/// the echo / repaint it asks for.

use crate::ui::decoder::{LogicalKey, DEL};

/// What the terminal should do after a key.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LineStep {
    /// Nothing visible changed.
    Ignored,
    /// Print this character at the cursor.
    Echo(char),
    /// Last character removed; redraw the field.
    Erased,
    /// Entry finished with this text.
    Done(String),
}

#[derive(Clone, Debug)]
pub struct LineEdit {
    x: usize,
    y: usize,
    max_len: usize,
    text: String,
}

impl LineEdit {
    pub fn new(x: usize, y: usize, max_len: usize) -> Self {
        LineEdit { x, y, max_len, text: String::with_capacity(max_len) }
    }

    pub fn origin(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn accept(&mut self, key: &LogicalKey) -> LineStep {
        let byte = match key {
            LogicalKey::Char(b) => *b,
            LogicalKey::Arrow(_) | LogicalKey::Sequence(_) => return LineStep::Ignored,
        };
        match byte {
            b'\n' | b'\r' => LineStep::Done(std::mem::take(&mut self.text)),
            DEL => {
                if self.text.pop().is_some() {
                    LineStep::Erased
                } else {
                    LineStep::Ignored
                }
            }
            0x20..=0x7e if self.text.len() < self.max_len => {
                let c = char::from(byte);
                self.text.push(c);
                LineStep::Echo(c)
            }
            // ESC, other control bytes, non-ASCII, or a full field
            _ => LineStep::Ignored,
        }
    }
}
