/// Raw input byte stream → logical keys.
///
/// Bytes are appended as they arrive and decoded strictly in order:
///   - ESC followed by `[` starts a CSI sequence that runs up to and
///     including the first final byte (0x40..=0x7E). An unfinished
///     sequence stays buffered until more bytes arrive.
///   - ESC that is the last buffered byte, or is followed by anything
///     other than `[`, is a key of its own.
///   - Every other byte is a key of its own.
///
/// A lone ESC at the end of a read is emitted right away, so a CSI
/// sequence split between ESC and `[` decodes as ESC, `[`, and the rest.

use std::collections::VecDeque;

use crate::domain::direction::Direction;

pub const ESC: u8 = 0x1b;
pub const DEL: u8 = 0x7f;
const CSI_OPENER: u8 = b'[';

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum LogicalKey {
    /// One byte: a printable character, a control byte or a bare ESC.
    Char(u8),
    /// `ESC [ A` .. `ESC [ D`.
    Arrow(Direction),
    /// Any other complete CSI sequence, bytes included.
    Sequence(Vec<u8>),
}

impl LogicalKey {
    pub const ESCAPE: LogicalKey = LogicalKey::Char(ESC);
    pub const ENTER: LogicalKey = LogicalKey::Char(b'\n');
    pub const SPACE: LogicalKey = LogicalKey::Char(b' ');

    fn from_csi(seq: Vec<u8>) -> LogicalKey {
        match seq.as_slice() {
            [ESC, CSI_OPENER, b'A'] => LogicalKey::Arrow(Direction::Up),
            [ESC, CSI_OPENER, b'B'] => LogicalKey::Arrow(Direction::Down),
            [ESC, CSI_OPENER, b'C'] => LogicalKey::Arrow(Direction::Right),
            [ESC, CSI_OPENER, b'D'] => LogicalKey::Arrow(Direction::Left),
            _ => LogicalKey::Sequence(seq),
        }
    }
}

fn is_csi_final(b: u8) -> bool {
    (0x40..=0x7e).contains(&b)
}

#[derive(Default, Debug)]
pub struct KeyDecoder {
    buffer: VecDeque<u8>,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends freshly read bytes.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Bytes received but not yet decoded.
    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Decodes and consumes the next complete key, if any.
    pub fn next_key(&mut self) -> Option<LogicalKey> {
        let first = *self.buffer.front()?;
        if first != ESC || self.buffer.get(1) != Some(&CSI_OPENER) {
            self.buffer.pop_front();
            return Some(LogicalKey::Char(first));
        }

        let end = self.buffer.iter().skip(2).position(|&b| is_csi_final(b))? + 2;
        let seq: Vec<u8> = self.buffer.drain(..=end).collect();
        Some(LogicalKey::from_csi(seq))
    }
}

impl Iterator for KeyDecoder {
    type Item = LogicalKey;

    fn next(&mut self) -> Option<LogicalKey> {
        self.next_key()
    }
}
