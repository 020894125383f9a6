/// Shared drawing helpers and display geometry.

use crate::ui::terminal::Terminal;

// ── Display geometry ──

pub const DISPLAY_WIDTH: usize = 80;
pub const DISPLAY_HEIGHT: usize = 25;

/// Draws a heavy-line box with corners at (`x0`, `y0`) and (`x1`, `y1`).
pub fn draw_box<A: Clone>(term: &mut Terminal<A>, x0: usize, y0: usize, x1: usize, y1: usize) {
    let inner = x1.saturating_sub(x0 + 1);
    let bar = "━".repeat(inner);
    term.put(x0, y0, &format!("┏{bar}┓"));
    for y in y0 + 1..y1 {
        term.put(x0, y, "┃");
        term.put(x1, y, "┃");
    }
    term.put(x0, y1, &format!("┗{bar}┛"));
}

/// Draws a horizontal rule of `len` columns starting at (`x`, `y`).
pub fn draw_hline<A: Clone>(term: &mut Terminal<A>, x: usize, y: usize, len: usize) {
    term.put(x, y, &"─".repeat(len));
}

/// Pads or truncates `text` to exactly `width` characters.
pub fn fit(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    let used = out.chars().count();
    out.extend(std::iter::repeat(' ').take(width - used));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::terminal::testing::{Capture, Script};

    #[test]
    fn fit_pads_and_truncates() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdefghijkl", 10), "abcdefghij");
        assert_eq!(fit("", 2), "  ");
    }

    #[test]
    fn box_has_all_corners() {
        let capture = Capture::default();
        let mut t: Terminal<()> = Terminal::with_io(Box::new(Script::default()), Box::new(capture.clone()));
        draw_box(&mut t, 0, 0, 4, 2);
        t.flush().unwrap();
        let out = capture.text();
        assert!(out.contains("┏━━━┓"));
        assert!(out.contains("┗━━━┛"));
        assert_eq!(out.matches('┃').count(), 2);
    }
}
