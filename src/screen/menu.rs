/// Main menu: banner plus a vertical list of choices.
///
/// Owns every other top-level screen. Settings are reloaded from the store
/// each time the menu comes back, so the next game always uses what was
/// last saved.

use crossterm::style::Color;

use crate::domain::direction::Direction;
use crate::screen::game::{GameParams, GameResult, GameScreen};
use crate::screen::leader_board::LeaderBoardScreen;
use crate::screen::settings::SettingsScreen;
use crate::screen::{forward, switch_to, Action, Context, Event, Lifecycle, Screen, Slot};
use crate::store::settings::Settings;
use crate::ui::decoder::LogicalKey;
use crate::ui::terminal::Terminal;

// ── Layout ──

const BANNER_ROW: usize = 5;
const BANNER: [&str; 6] = [
    "                 _______..__   __.      ___       __  ___  _______ ",
    "                /       ||  \\ |  |     /   \\     |  |/  / |   ____|",
    "               |   (----`|   \\|  |    /  ^  \\    |  '  /  |  |__   ",
    "                \\   \\    |  . `  |   /  /_\\  \\   |    <   |   __|  ",
    "            .----)   |   |  |\\   |  /  _____  \\  |  .  \\  |  |____ ",
    "            |_______/    |__| \\__| /__/     \\__\\ |__|\\__\\ |_______|",
];
const MENU_X: usize = 30;
const MENU_Y: usize = 15;

// ── Menu widget ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Choice {
    Start,
    Resume,
    Settings,
    HighScores,
    Exit,
}

/// Vertical option list with one highlighted entry.
struct Menu {
    x: usize,
    y: usize,
    items: Vec<(&'static str, Choice)>,
    selected: Option<usize>,
}

impl Menu {
    fn new(x: usize, y: usize) -> Self {
        Menu { x, y, items: Vec::new(), selected: None }
    }

    /// Replaces the items, highlights the first and draws them all.
    fn show(&mut self, items: Vec<(&'static str, Choice)>, term: &mut Terminal<Action>) {
        self.items = items;
        self.selected = if self.items.is_empty() { None } else { Some(0) };
        for i in 0..self.items.len() {
            self.draw(i, term);
        }
    }

    fn draw(&self, i: usize, term: &mut Terminal<Action>) {
        let Some(&(text, _)) = self.items.get(i) else {
            return;
        };
        if self.selected == Some(i) {
            term.put_str(self.x, self.y + i, text, Color::Black, Color::White);
        } else {
            term.put(self.x, self.y + i, text);
        }
    }

    fn move_to(&mut self, next: usize, term: &mut Terminal<Action>) {
        let Some(current) = self.selected else {
            return;
        };
        self.selected = Some(next);
        self.draw(current, term);
        self.draw(next, term);
    }

    /// Moves the highlight down. No-op on the last item.
    fn select_next(&mut self, term: &mut Terminal<Action>) {
        if let Some(i) = self.selected {
            if i + 1 < self.items.len() {
                self.move_to(i + 1, term);
            }
        }
    }

    /// Moves the highlight up. No-op on the first item.
    fn select_previous(&mut self, term: &mut Terminal<Action>) {
        if let Some(i) = self.selected {
            if i > 0 {
                self.move_to(i - 1, term);
            }
        }
    }

    fn selected(&self) -> Option<Choice> {
        self.selected.and_then(|i| self.items.get(i)).map(|&(_, choice)| choice)
    }

    fn clear(&mut self) {
        self.items.clear();
        self.selected = None;
    }
}

// ── Screen ──

pub struct MenuScreen {
    state: Lifecycle,
    settings: Settings,
    /// The last game was left early and can be resumed.
    interrupted: bool,
    menu: Menu,
    game: Slot<GameScreen, MenuScreen>,
    settings_screen: Slot<SettingsScreen, MenuScreen>,
    leader_board: Slot<LeaderBoardScreen, MenuScreen>,
}

impl MenuScreen {
    pub fn new() -> Self {
        MenuScreen {
            state: Lifecycle::default(),
            settings: Settings::default(),
            interrupted: false,
            menu: Menu::new(MENU_X, MENU_Y),
            game: Slot::new(GameScreen::new()),
            settings_screen: Slot::new(SettingsScreen::new()),
            leader_board: Slot::new(LeaderBoardScreen::new()),
        }
    }

    fn game_slot(&mut self) -> &mut Slot<GameScreen, MenuScreen> {
        &mut self.game
    }

    fn settings_slot(&mut self) -> &mut Slot<SettingsScreen, MenuScreen> {
        &mut self.settings_screen
    }

    fn leader_board_slot(&mut self) -> &mut Slot<LeaderBoardScreen, MenuScreen> {
        &mut self.leader_board
    }

    fn keys() -> [(LogicalKey, Action); 4] {
        [
            (LogicalKey::Arrow(Direction::Up), Action::Up),
            (LogicalKey::Arrow(Direction::Down), Action::Down),
            (LogicalKey::ENTER, Action::Confirm),
            (LogicalKey::SPACE, Action::Confirm),
        ]
    }

    fn release(&mut self, cx: &mut Context<'_>) {
        for (key, _) in Self::keys() {
            cx.term.unbind(&key);
        }
        self.menu.clear();
    }

    fn start_game(&mut self, new_game: bool, cx: &mut Context<'_>) {
        let params = GameParams {
            frame_time: cx.config.speed.frame_time(self.settings.game_speed),
            simple_graphics: self.settings.use_simple_graphics,
            new_game,
        };
        tracing::info!(new_game, frame_ms = params.frame_time.as_millis() as u64, "starting game");
        switch_to(self, Self::game_slot, params, |menu: &mut MenuScreen, result: GameResult, cx: &mut Context<'_>| {
            tracing::info!(finished = result.finished, "game returned");
            menu.interrupted = !result.finished;
            menu.activate((), cx);
        }, cx);
    }

    /// Runs the highlighted choice. `Some` means exit.
    fn confirm(&mut self, cx: &mut Context<'_>) -> Option<()> {
        match self.menu.selected()? {
            Choice::Start => self.start_game(true, cx),
            Choice::Resume => self.start_game(false, cx),
            Choice::Settings => {
                switch_to(self, Self::settings_slot, (), |menu: &mut MenuScreen, settings: Settings, cx: &mut Context<'_>| {
                    menu.settings = settings;
                    menu.activate((), cx);
                }, cx);
            }
            Choice::HighScores => {
                switch_to(self, Self::leader_board_slot, (), |menu: &mut MenuScreen, (), cx: &mut Context<'_>| {
                    menu.activate((), cx);
                }, cx);
            }
            Choice::Exit => return Some(()),
        }
        None
    }
}

impl Default for MenuScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for MenuScreen {
    type Params = ();
    type Output = ();

    fn lifecycle(&self) -> Lifecycle {
        self.state
    }

    fn activate(&mut self, _: (), cx: &mut Context<'_>) {
        if !self.state.activate() {
            return;
        }
        self.settings = cx.store.load_settings();

        cx.term.clear();
        for (i, line) in BANNER.iter().enumerate() {
            cx.term.put(0, BANNER_ROW + i, line);
        }
        let mut items = vec![("[    Start game    ]", Choice::Start)];
        if self.interrupted {
            items.push(("[   Resume game    ]", Choice::Resume));
        }
        items.push(("[     Settings     ]", Choice::Settings));
        items.push(("[    High scores   ]", Choice::HighScores));
        items.push(("[       Exit       ]", Choice::Exit));
        self.menu.show(items, cx.term);

        for (key, action) in Self::keys() {
            cx.term.bind(key, action);
        }
        tracing::debug!("main menu active");
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
        self.game.close(cx);
        self.settings_screen.close(cx);
        self.leader_board.close(cx);
    }

    fn handle(&mut self, event: Event, cx: &mut Context<'_>) -> Option<()> {
        if self.game.is_engaged() {
            forward(self, Self::game_slot, event, cx);
            return None;
        }
        if self.settings_screen.is_engaged() {
            forward(self, Self::settings_slot, event, cx);
            return None;
        }
        if self.leader_board.is_engaged() {
            forward(self, Self::leader_board_slot, event, cx);
            return None;
        }
        if !self.state.is_active() {
            return None;
        }

        match event {
            Event::Action(Action::Up) => self.menu.select_previous(cx.term),
            Event::Action(Action::Down) => self.menu.select_next(cx.term),
            Event::Action(Action::Confirm) => return self.confirm(cx),
            _ => {}
        }
        None
    }
}
