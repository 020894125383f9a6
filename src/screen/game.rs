/// The playing field.
///
/// Draws the board inside a border with the score bar below it, steers the
/// snake from the arrow keys and advances the engine on a frame timer.
/// A crash hands over to the game-over screen; ESC leaves the game as it is
/// so the menu can resume it.

use std::time::Duration;

use crate::domain::cell::{CellType, GlyphStyle};
use crate::domain::direction::{Coord, Direction};
use crate::event_loop::TimerId;
use crate::screen::game_over::{GameOverParams, GameOverScreen};
use crate::screen::{forward, switch_to, Action, Context, Event, Lifecycle, Screen, Slot};
use crate::sim::engine::GameEngine;
use crate::sim::event::GameEvent;
use crate::ui::decoder::LogicalKey;
use crate::ui::draw::{draw_box, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::ui::terminal::Terminal;

// ── Board geometry ──

/// Cells are two columns wide; one column of border on each side.
pub const BOARD_WIDTH: usize = (DISPLAY_WIDTH - 2) / 2;
/// Border rows above and below, score bar underneath.
pub const BOARD_HEIGHT: usize = DISPLAY_HEIGHT - 3;
const SCORE_ROW: usize = DISPLAY_HEIGHT - 1;

/// Screen position of a board cell.
pub fn cell_to_screen(at: Coord) -> (usize, usize) {
    (at.x * 2 + 1, at.y + 1)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GameParams {
    pub frame_time: Duration,
    pub simple_graphics: bool,
    /// Start over even if an unfinished game exists.
    pub new_game: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GameResult {
    /// False when the player left before the game ended.
    pub finished: bool,
}

pub struct GameScreen {
    state: Lifecycle,
    engine: GameEngine,
    frame_time: Duration,
    style: GlyphStyle,
    frame_timer: Option<TimerId>,
    outcome: Option<GameResult>,
    game_over: Slot<GameOverScreen, GameScreen>,
}

impl GameScreen {
    pub fn new() -> Self {
        GameScreen {
            state: Lifecycle::default(),
            engine: GameEngine::new(BOARD_WIDTH, BOARD_HEIGHT),
            frame_time: Duration::from_millis(300),
            style: GlyphStyle::Fancy,
            frame_timer: None,
            outcome: None,
            game_over: Slot::new(GameOverScreen::new()),
        }
    }

    #[cfg(test)]
    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    fn game_over_slot(&mut self) -> &mut Slot<GameOverScreen, GameScreen> {
        &mut self.game_over
    }

    fn keys() -> [(LogicalKey, Action); 5] {
        [
            (LogicalKey::Arrow(Direction::Up), Action::Up),
            (LogicalKey::Arrow(Direction::Down), Action::Down),
            (LogicalKey::Arrow(Direction::Left), Action::Left),
            (LogicalKey::Arrow(Direction::Right), Action::Right),
            (LogicalKey::ESCAPE, Action::Back),
        ]
    }

    fn release(&mut self, cx: &mut Context<'_>) {
        if let Some(id) = self.frame_timer.take() {
            cx.timers.clear_timeout(id);
        }
        for (key, _) in Self::keys() {
            cx.term.unbind(&key);
        }
    }

    // ── Drawing ──

    fn draw_cell(&self, at: Coord, cell: CellType, term: &mut Terminal<Action>) {
        let (x, y) = cell_to_screen(at);
        term.put(x, y, cell.glyph(self.style));
    }

    fn draw_score(&self, score: u32, term: &mut Terminal<Action>) {
        term.put(0, SCORE_ROW, &format!("Score: {score:<4}"));
    }

    fn redraw(&self, term: &mut Terminal<Action>) {
        term.clear();
        draw_box(term, 0, 0, DISPLAY_WIDTH - 1, DISPLAY_HEIGHT - 2);
        for at in self.engine.snake() {
            self.draw_cell(at, self.engine.cell(at), term);
        }
        if let Some(food) = self.engine.food() {
            self.draw_cell(food, CellType::Food, term);
        }
        self.draw_score(self.engine.score(), term);
    }

    // ── Frames ──

    fn on_frame(&mut self, cx: &mut Context<'_>) {
        self.frame_timer = Some(cx.timers.set_timeout(self.frame_time));

        for event in self.engine.tick() {
            match event {
                GameEvent::TailVacated { at } => self.draw_cell(at, CellType::Empty, cx.term),
                GameEvent::HeadMoved { at, cell } => self.draw_cell(at, cell, cx.term),
                GameEvent::FoodEaten { score } => self.draw_score(score, cx.term),
                GameEvent::FoodPlaced { at } => self.draw_cell(at, CellType::Food, cx.term),
                GameEvent::Crashed { head, cell, score } | GameEvent::BoardFilled { head, cell, score } => {
                    self.game_over(head, cell, score, cx);
                }
            }
        }
    }

    fn game_over(&mut self, head: Coord, cell: CellType, score: u32, cx: &mut Context<'_>) {
        tracing::info!(score, "game over");
        let (head_x, head_y) = cell_to_screen(head);
        let params = GameOverParams {
            score,
            head_x,
            head_y,
            head_glyph: cell.glyph(self.style),
            simple_graphics: self.style == GlyphStyle::Simple,
        };
        switch_to(self, Self::game_over_slot, params, |game: &mut GameScreen, (), _cx: &mut Context<'_>| {
            game.outcome = Some(GameResult { finished: true });
        }, cx);
    }
}

impl Default for GameScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for GameScreen {
    type Params = GameParams;
    type Output = GameResult;

    fn lifecycle(&self) -> Lifecycle {
        self.state
    }

    fn activate(&mut self, params: GameParams, cx: &mut Context<'_>) {
        if !self.state.activate() {
            return;
        }
        self.frame_time = params.frame_time;
        self.style = GlyphStyle::from_simple_flag(params.simple_graphics);
        self.outcome = None;
        if params.new_game || self.engine.is_over() {
            self.engine.new_game();
        }

        self.redraw(cx.term);
        for (key, action) in Self::keys() {
            cx.term.bind(key, action);
        }
        self.frame_timer = Some(cx.timers.set_timeout(self.frame_time));
    }

    fn pause(&mut self, cx: &mut Context<'_>) {
        if self.state.pause() {
            self.release(cx);
        }
    }

    fn deactivate(&mut self, cx: &mut Context<'_>) {
        if self.state.deactivate() {
            self.release(cx);
        }
    }

    fn close(&mut self, cx: &mut Context<'_>) {
        if self.state.is_closed() {
            return;
        }
        self.deactivate(cx);
        self.state.close();
        self.game_over.close(cx);
    }

    fn handle(&mut self, event: Event, cx: &mut Context<'_>) -> Option<GameResult> {
        if self.game_over.is_engaged() {
            forward(self, Self::game_over_slot, event, cx);
            return self.outcome.take();
        }
        if !self.state.is_active() {
            return None;
        }

        match event {
            Event::Action(Action::Up) => self.engine.steer(Direction::Up),
            Event::Action(Action::Down) => self.engine.steer(Direction::Down),
            Event::Action(Action::Left) => self.engine.steer(Direction::Left),
            Event::Action(Action::Right) => self.engine.steer(Direction::Right),
            Event::Action(Action::Back) => return Some(GameResult { finished: false }),
            Event::Timer(id) if self.frame_timer == Some(id) => self.on_frame(cx),
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::testing::Harness;

    const PARAMS: GameParams = GameParams { frame_time: Duration::from_millis(100), simple_graphics: true, new_game: true };

    fn setup() -> (Harness, tempfile::TempDir, GameScreen) {
        let dir = tempfile::tempdir().unwrap();
        let mut h = Harness::new(dir.path());
        let mut game = GameScreen::new();
        game.activate(PARAMS, &mut h.cx());
        (h, dir, game)
    }

    fn frame(game: &mut GameScreen, h: &mut Harness) -> Option<GameResult> {
        let id = game.frame_timer.unwrap();
        h.timers.clear_timeout(id);
        game.handle(Event::Timer(id), &mut h.cx())
    }

    #[test]
    fn board_fits_the_display() {
        assert_eq!(BOARD_WIDTH, 39);
        assert_eq!(BOARD_HEIGHT, 22);
        let (x, y) = cell_to_screen(Coord::new(BOARD_WIDTH - 1, BOARD_HEIGHT - 1));
        assert_eq!((x + 1, y), (DISPLAY_WIDTH - 2, DISPLAY_HEIGHT - 3));
    }

    #[test]
    fn activation_draws_board_and_arms_timer() {
        let (mut h, _dir, game) = setup();
        let text = h.screen_text();
        assert!(text.contains("Score: 0   "));
        assert!(text.contains("┏"));
        assert_eq!(h.timers.len(), 1);
        assert!(game.frame_timer.is_some());
        assert_eq!(h.term.binding(&LogicalKey::ESCAPE), Some(&Action::Back));
    }

    #[test]
    fn frame_moves_the_snake_and_rearms() {
        let (mut h, _dir, mut game) = setup();
        let head = game.engine().head().unwrap();
        let before = game.frame_timer;
        assert_eq!(frame(&mut game, &mut h), None);
        assert_eq!(game.engine().head(), Some(Coord::new(head.x + 1, head.y)));
        assert_ne!(game.frame_timer, before);
        assert_eq!(h.timers.len(), 1);
    }

    #[test]
    fn stale_timer_is_ignored() {
        let (mut h, _dir, mut game) = setup();
        let head = game.engine().head();
        let stale = h.timers.set_timeout(Duration::ZERO);
        game.handle(Event::Timer(stale), &mut h.cx());
        assert_eq!(game.engine().head(), head);
    }

    #[test]
    fn arrows_steer() {
        let (mut h, _dir, mut game) = setup();
        game.handle(Event::Action(Action::Up), &mut h.cx());
        frame(&mut game, &mut h);
        assert_eq!(game.engine().direction(), Direction::Up);
    }

    #[test]
    fn escape_leaves_unfinished() {
        let (mut h, _dir, mut game) = setup();
        let result = game.handle(Event::Action(Action::Back), &mut h.cx());
        assert_eq!(result, Some(GameResult { finished: false }));
    }

    #[test]
    fn resume_keeps_the_board() {
        let (mut h, _dir, mut game) = setup();
        frame(&mut game, &mut h);
        let head = game.engine().head();
        game.deactivate(&mut h.cx());
        assert!(h.timers.is_empty());
        game.activate(GameParams { new_game: false, ..PARAMS }, &mut h.cx());
        assert_eq!(game.engine().head(), head);
    }

    #[test]
    fn crash_runs_game_over_then_finishes() {
        let (mut h, _dir, mut game) = setup();
        // Turn back onto the body: up, left, down.
        let mut result = None;
        for turn in [Action::Up, Action::Left, Action::Down] {
            game.handle(Event::Action(turn), &mut h.cx());
            result = frame(&mut game, &mut h);
        }
        assert_eq!(result, None);
        assert!(game.engine().is_over());
        assert!(game.game_over.is_engaged());
        assert_eq!(game.state, Lifecycle::Paused);
        assert_eq!(h.term.binding(&LogicalKey::ESCAPE), None);

        // Play the animation through to the name prompt.
        while !h.term.is_reading_line() {
            let now = std::time::Instant::now() + Duration::from_secs(1);
            let id = h.timers.pop_expired(now).unwrap();
            game.handle(Event::Timer(id), &mut h.cx());
        }
        let result = game.handle(Event::Action(Action::NameEntered("Ada".into())), &mut h.cx());
        assert_eq!(result, Some(GameResult { finished: true }));
        assert_eq!(h.store.load_scores()[0].name, "Ada");
    }
}
