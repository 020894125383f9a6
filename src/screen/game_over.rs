/// Game-over sequence: blink the crashed head, then ask for a name.
///
/// Animation stages advance every 500 ms:
///   Start → Alert → Snake → Alert → End
/// At End a dialog shows the score and reads the player's name, which is
/// saved to the leaderboard before switching back.

use std::time::Duration;

use crate::event_loop::TimerId;
use crate::screen::{Action, Context, Event, Lifecycle, Screen};

const STAGE_DELAY: Duration = Duration::from_millis(500);
const DIALOG_X: usize = 30;
const DIALOG_Y: usize = 10;
const NAME_MAX_LEN: usize = 9;
const DIALOG: [&str; 5] = [
    "┏━━━━━━━━━━━━━━━━━━┓",
    "┃    GAME  OVER    ┃",
    "┃  Score:          ┃",
    "┃  Name:           ┃",
    "┗━━━━━━━━━━━━━━━━━━┛",
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GameOverParams {
    pub score: u32,
    /// Screen position of the head before the crash.
    pub head_x: usize,
    pub head_y: usize,
    pub head_glyph: &'static str,
    pub simple_graphics: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Stage {
    Start,
    Alert1,
    Snake1,
    Alert2,
    End,
}

impl Stage {
    fn next(self) -> Option<Stage> {
        match self {
            Stage::Start => Some(Stage::Alert1),
            Stage::Alert1 => Some(Stage::Snake1),
            Stage::Snake1 => Some(Stage::Alert2),
            Stage::Alert2 => Some(Stage::End),
            Stage::End => None,
        }
    }
}

pub struct GameOverScreen {
    state: Lifecycle,
    params: Option<GameOverParams>,
    stage: Stage,
    timer: Option<TimerId>,
}

impl GameOverScreen {
    pub fn new() -> Self {
        GameOverScreen { state: Lifecycle::default(), params: None, stage: Stage::Start, timer: None }
    }

    fn play(&mut self, stage: Stage, cx: &mut Context<'_>) {
        let Some(p) = self.params else {
            return;
        };
        self.stage = stage;
        if stage.next().is_some() {
            self.timer = Some(cx.timers.set_timeout(STAGE_DELAY));
        }
        match stage {
            Stage::Alert1 | Stage::Alert2 => {
                let alert = if p.simple_graphics { "▓▓" } else { "⚠️" };
                cx.term.put(p.head_x, p.head_y, alert);
            }
            Stage::Snake1 => cx.term.put(p.head_x, p.head_y, p.head_glyph),
            Stage::End => self.show_dialog(p.score, cx),
            Stage::Start => {}
        }
    }

    fn show_dialog(&self, score: u32, cx: &mut Context<'_>) {
        for (i, line) in DIALOG.iter().enumerate() {
            cx.term.put(DIALOG_X, DIALOG_Y + i, line);
        }
        cx.term.put(DIALOG_X + 10, DIALOG_Y + 2, &score.to_string());
        cx.term.get_string(DIALOG_X + 10, DIALOG_Y + 3, NAME_MAX_LEN, Action::NameEntered);
    }
}

impl Default for GameOverScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for GameOverScreen {
    type Params = GameOverParams;
    type Output = ();

    fn lifecycle(&self) -> Lifecycle {
        self.state
    }

    fn activate(&mut self, params: GameOverParams, cx: &mut Context<'_>) {
        if !self.state.activate() {
            return;
        }
        self.params = Some(params);
        self.play(Stage::Start, cx);
    }

    fn pause(&mut self, _cx: &mut Context<'_>) {
        self.state.pause();
    }

    fn deactivate(&mut self, cx: &mut Context<'_>) {
        if !self.state.deactivate() {
            return;
        }
        cx.term.cancel_string();
        if let Some(id) = self.timer.take() {
            cx.timers.clear_timeout(id);
        }
    }

    fn close(&mut self, cx: &mut Context<'_>) {
        if self.state.is_closed() {
            return;
        }
        self.deactivate(cx);
        self.state.close();
    }

    fn handle(&mut self, event: Event, cx: &mut Context<'_>) -> Option<()> {
        if !self.state.is_active() {
            return None;
        }
        match event {
            Event::Timer(id) if self.timer == Some(id) => {
                self.timer = None;
                if let Some(next) = self.stage.next() {
                    self.play(next, cx);
                }
                None
            }
            Event::Action(Action::NameEntered(name)) => {
                let score = self.params.map_or(0, |p| p.score);
                if let Err(e) = cx.store.save_score(&name, score) {
                    tracing::warn!("could not save score: {e}");
                }
                tracing::info!(%name, score, "score recorded");
                Some(())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::testing::Harness;
    use std::time::Instant;

    const PARAMS: GameOverParams = GameOverParams { score: 42, head_x: 17, head_y: 11, head_glyph: "⏩", simple_graphics: false };

    fn advance(screen: &mut GameOverScreen, h: &mut Harness) {
        let id = h.timers.pop_expired(Instant::now() + Duration::from_secs(1)).unwrap();
        screen.handle(Event::Timer(id), &mut h.cx());
    }

    #[test]
    fn animation_ends_in_name_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = Harness::new(dir.path());
        let mut screen = GameOverScreen::new();
        screen.activate(PARAMS, &mut h.cx());

        advance(&mut screen, &mut h);
        assert_eq!(screen.stage, Stage::Alert1);
        assert!(h.screen_text().contains("⚠️"));
        advance(&mut screen, &mut h);
        advance(&mut screen, &mut h);
        assert!(!h.term.is_reading_line());
        advance(&mut screen, &mut h);

        assert_eq!(screen.stage, Stage::End);
        assert!(h.timers.is_empty());
        assert!(h.term.is_reading_line());
        let text = h.screen_text();
        assert!(text.contains("GAME  OVER"));
        assert!(text.contains("42"));
    }

    #[test]
    fn typed_name_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = Harness::new(dir.path());
        let mut screen = GameOverScreen::new();
        screen.activate(PARAMS, &mut h.cx());
        for _ in 0..4 {
            advance(&mut screen, &mut h);
        }

        h.script.push(b"Grace\n");
        h.term.on_readable().unwrap();
        let action = h.term.next_action().unwrap();
        assert_eq!(action, Action::NameEntered("Grace".into()));

        assert_eq!(screen.handle(Event::Action(action), &mut h.cx()), Some(()));
        let scores = h.store.load_scores();
        assert_eq!(scores.len(), 1);
        assert_eq!((scores[0].name.as_str(), scores[0].score), ("Grace", 42));
    }

    #[test]
    fn deactivate_mid_animation_releases_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = Harness::new(dir.path());
        let mut screen = GameOverScreen::new();
        screen.activate(PARAMS, &mut h.cx());
        assert_eq!(h.timers.len(), 1);
        screen.close(&mut h.cx());
        assert!(h.timers.is_empty());
        assert!(!h.term.is_reading_line());
        screen.close(&mut h.cx());
    }

    #[test]
    fn deactivate_cancels_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = Harness::new(dir.path());
        let mut screen = GameOverScreen::new();
        screen.activate(PARAMS, &mut h.cx());
        for _ in 0..4 {
            advance(&mut screen, &mut h);
        }
        screen.deactivate(&mut h.cx());
        assert!(!h.term.is_reading_line());
    }
}
