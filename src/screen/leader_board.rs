/// High score table inside a full-screen border. ESC goes back.

use chrono::{DateTime, Local};

use crate::screen::{Action, Context, Event, Lifecycle, Screen};
use crate::store::leaderboard::ScoreEntry;
use crate::ui::decoder::LogicalKey;
use crate::ui::draw::{draw_box, draw_hline, fit, DISPLAY_HEIGHT, DISPLAY_WIDTH};

// ── Columns ──

const SERIAL_X: usize = 10;
const SERIAL_WIDTH: usize = 10;
const NAME_X: usize = SERIAL_X + SERIAL_WIDTH;
const NAME_WIDTH: usize = 10;
const SCORE_X: usize = NAME_X + NAME_WIDTH;
const SCORE_WIDTH: usize = 10;
const TIME_X: usize = SCORE_X + SCORE_WIDTH;
const TIME_WIDTH: usize = 30;
const END_X: usize = TIME_X + TIME_WIDTH;
const TOP_MARGIN: usize = 5;

/// Local time in the classic `ctime` layout, e.g. `Tue Mar  4 09:15:02 2025`.
fn format_time(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(utc) => utc.with_timezone(&Local).format("%a %b %e %H:%M:%S %Y").to_string(),
        None => "-".into(),
    }
}

pub struct LeaderBoardScreen {
    state: Lifecycle,
}

impl LeaderBoardScreen {
    pub fn new() -> Self {
        LeaderBoardScreen { state: Lifecycle::default() }
    }

    fn draw(&self, entries: &[ScoreEntry], cx: &mut Context<'_>) {
        let term = &mut *cx.term;
        term.clear();
        draw_box(term, 0, 0, DISPLAY_WIDTH - 1, DISPLAY_HEIGHT - 1);

        let mut y = TOP_MARGIN;
        term.put(SERIAL_X, y, "#");
        term.put(NAME_X, y, "Name");
        term.put(SCORE_X, y, "Score");
        term.put(TIME_X, y, "Time");
        y += 1;
        draw_hline(term, SERIAL_X, y, END_X - SERIAL_X);
        y += 1;

        for (rank, entry) in entries.iter().enumerate() {
            term.put(SERIAL_X, y, &(rank + 1).to_string());
            term.put(NAME_X, y, &fit(&entry.name, NAME_WIDTH));
            term.put(SCORE_X, y, &entry.score.to_string());
            term.put(TIME_X, y, &format_time(entry.timestamp));
            y += 1;
        }
    }
}

impl Default for LeaderBoardScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for LeaderBoardScreen {
    type Params = ();
    type Output = ();

    fn lifecycle(&self) -> Lifecycle {
        self.state
    }

    fn activate(&mut self, _: (), cx: &mut Context<'_>) {
        if !self.state.activate() {
            return;
        }
        cx.term.bind(LogicalKey::ESCAPE, Action::Back);
        let entries = cx.store.load_scores();
        self.draw(&entries, cx);
    }

    fn pause(&mut self, _cx: &mut Context<'_>) {
        self.state.pause();
    }

    fn deactivate(&mut self, cx: &mut Context<'_>) {
        if self.state.deactivate() {
            cx.term.unbind(&LogicalKey::ESCAPE);
        }
    }

    fn close(&mut self, cx: &mut Context<'_>) {
        if self.state.is_closed() {
            return;
        }
        self.deactivate(cx);
        self.state.close();
    }

    fn handle(&mut self, event: Event, _cx: &mut Context<'_>) -> Option<()> {
        if !self.state.is_active() {
            return None;
        }
        match event {
            Event::Action(Action::Back) => Some(()),
            _ => None,
        }
    }
}
