/// Settings editor.
///
/// A column of options inside a full-screen border. Up/Down walk through
/// every selectable row, including the sub-rows of a choice; Space toggles
/// the highlighted row; ESC returns the edited settings. The settings are
/// written to the store whenever the screen is left.

use crossterm::style::Color;

use crate::domain::direction::Direction;
use crate::screen::{Action, Context, Event, Lifecycle, Screen};
use crate::store::settings::{GameSpeed, Settings};
use crate::ui::decoder::LogicalKey;
use crate::ui::draw::{draw_box, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::ui::terminal::Terminal;

const MENU_X: usize = 10;
const MENU_Y: usize = 2;
const CHOICE_INDENT: usize = 4;

/// Draws `marker` (highlighted when selected) followed by the label.
fn render_row(term: &mut Terminal<Action>, x: usize, y: usize, marker: &str, label: &str, selected: bool) {
    if selected {
        term.put_str(x, y, marker, Color::Black, Color::White);
    } else {
        term.put(x, y, marker);
    }
    term.put(x + marker.chars().count(), y, &format!(" {label}"));
}

// ── Options ──

/// On/off switch shown as `[*]` / `[ ]`.
struct ToggleOption {
    label: &'static str,
    value: bool,
    apply: fn(&mut Settings, bool),
    selected: bool,
    pos: (usize, usize),
}

impl ToggleOption {
    fn render(&self, term: &mut Terminal<Action>) {
        let marker = if self.value { "[*]" } else { "[ ]" };
        render_row(term, self.pos.0, self.pos.1, marker, self.label, self.selected);
    }
}

/// One-of-many choice: a header line, then one `(*)` / `( )` row per value.
struct ChoiceOption {
    label: &'static str,
    choices: Vec<GameSpeed>,
    toggled: usize,
    /// Highlighted sub-row, if this option has the focus.
    selected: Option<usize>,
    apply: fn(&mut Settings, GameSpeed),
    pos: (usize, usize),
}

impl ChoiceOption {
    fn render_choice(&self, i: usize, term: &mut Terminal<Action>) {
        let Some(choice) = self.choices.get(i) else {
            return;
        };
        let marker = if self.toggled == i { "(*)" } else { "( )" };
        let (x, y) = self.pos;
        render_row(term, x + CHOICE_INDENT, y + 1 + i, marker, choice.label(), self.selected == Some(i));
    }

    fn select(&mut self, i: Option<usize>, term: &mut Terminal<Action>) {
        let previous = std::mem::replace(&mut self.selected, i);
        if let Some(p) = previous {
            self.render_choice(p, term);
        }
        if let Some(n) = i {
            self.render_choice(n, term);
        }
    }
}

enum SettingOption {
    Toggle(ToggleOption),
    Choice(ChoiceOption),
}

impl SettingOption {
    fn toggle(label: &'static str, value: bool, apply: fn(&mut Settings, bool)) -> Self {
        SettingOption::Toggle(ToggleOption { label, value, apply, selected: false, pos: (0, 0) })
    }

    fn choice(label: &'static str, choices: Vec<GameSpeed>, value: GameSpeed, apply: fn(&mut Settings, GameSpeed)) -> Self {
        let toggled = choices.iter().position(|&c| c == value).unwrap_or(0);
        SettingOption::Choice(ChoiceOption { label, choices, toggled, selected: None, apply, pos: (0, 0) })
    }

    /// Places and draws the option at (`x`, `y`). Returns the rows used.
    fn layout(&mut self, x: usize, y: usize, term: &mut Terminal<Action>) -> usize {
        match self {
            SettingOption::Toggle(t) => {
                t.pos = (x, y);
                t.render(term);
                1
            }
            SettingOption::Choice(c) => {
                c.pos = (x, y);
                term.put(x, y, &format!("    {}", c.label));
                for i in 0..c.choices.len() {
                    c.render_choice(i, term);
                }
                1 + c.choices.len()
            }
        }
    }

    fn select_first(&mut self, term: &mut Terminal<Action>) {
        match self {
            SettingOption::Toggle(t) => {
                t.selected = true;
                t.render(term);
            }
            SettingOption::Choice(c) if !c.choices.is_empty() => c.select(Some(0), term),
            SettingOption::Choice(_) => {}
        }
    }

    fn select_last(&mut self, term: &mut Terminal<Action>) {
        match self {
            SettingOption::Toggle(_) => self.select_first(term),
            SettingOption::Choice(c) => {
                let last = c.choices.len().checked_sub(1);
                if last.is_some() {
                    c.select(last, term);
                }
            }
        }
    }

    /// Moves the focus down inside the option. True when it should leave.
    fn select_next(&mut self, term: &mut Terminal<Action>) -> bool {
        match self {
            SettingOption::Toggle(_) => true,
            SettingOption::Choice(c) => match c.selected {
                Some(i) if i + 1 < c.choices.len() => {
                    c.select(Some(i + 1), term);
                    false
                }
                _ => true,
            },
        }
    }

    /// Moves the focus up inside the option. True when it should leave.
    fn select_previous(&mut self, term: &mut Terminal<Action>) -> bool {
        match self {
            SettingOption::Toggle(_) => true,
            SettingOption::Choice(c) => match c.selected {
                Some(i) if i > 0 => {
                    c.select(Some(i - 1), term);
                    false
                }
                _ => true,
            },
        }
    }

    fn deselect(&mut self, term: &mut Terminal<Action>) {
        match self {
            SettingOption::Toggle(t) => {
                if t.selected {
                    t.selected = false;
                    t.render(term);
                }
            }
            SettingOption::Choice(c) => c.select(None, term),
        }
    }

    fn toggle_selected(&mut self, settings: &mut Settings, term: &mut Terminal<Action>) {
        match self {
            SettingOption::Toggle(t) => {
                t.value = !t.value;
                t.render(term);
                (t.apply)(settings, t.value);
            }
            SettingOption::Choice(c) => {
                let Some(i) = c.selected else {
                    return;
                };
                let previous = std::mem::replace(&mut c.toggled, i);
                c.render_choice(previous, term);
                c.render_choice(i, term);
                (c.apply)(settings, c.choices[i]);
            }
        }
    }
}

// ── Option list ──

struct OptionList {
    options: Vec<SettingOption>,
    current: Option<usize>,
}

impl OptionList {
    fn new() -> Self {
        OptionList { options: Vec::new(), current: None }
    }

    /// Draws every option from (`x`, `y`) down and focuses the first.
    fn show(&mut self, options: Vec<SettingOption>, x: usize, y: usize, term: &mut Terminal<Action>) {
        self.options = options;
        let mut row = y;
        for option in &mut self.options {
            row += option.layout(x, row, term);
        }
        self.current = None;
        if !self.options.is_empty() {
            self.focus(0, true, term);
        }
    }

    fn focus(&mut self, i: usize, from_top: bool, term: &mut Terminal<Action>) {
        if let Some(old) = self.current.and_then(|c| self.options.get_mut(c)) {
            old.deselect(term);
        }
        self.current = Some(i);
        if let Some(option) = self.options.get_mut(i) {
            if from_top {
                option.select_first(term);
            } else {
                option.select_last(term);
            }
        }
    }

    fn select_next(&mut self, term: &mut Terminal<Action>) {
        let Some(i) = self.current else {
            return;
        };
        let leave = self.options[i].select_next(term);
        if leave && i + 1 < self.options.len() {
            self.focus(i + 1, true, term);
        }
    }

    fn select_previous(&mut self, term: &mut Terminal<Action>) {
        let Some(i) = self.current else {
            return;
        };
        let leave = self.options[i].select_previous(term);
        if leave && i > 0 {
            self.focus(i - 1, false, term);
        }
    }

    fn toggle(&mut self, settings: &mut Settings, term: &mut Terminal<Action>) {
        if let Some(option) = self.current.and_then(|i| self.options.get_mut(i)) {
            option.toggle_selected(settings, term);
        }
    }

    fn clear(&mut self, term: &mut Terminal<Action>) {
        if let Some(option) = self.current.take().and_then(|i| self.options.get_mut(i)) {
            option.deselect(term);
        }
        self.options.clear();
    }
}

// ── Screen ──

pub struct SettingsScreen {
    state: Lifecycle,
    settings: Settings,
    list: OptionList,
}

impl SettingsScreen {
    pub fn new() -> Self {
        SettingsScreen { state: Lifecycle::default(), settings: Settings::default(), list: OptionList::new() }
    }

    fn keys() -> [(LogicalKey, Action); 4] {
        [
            (LogicalKey::Arrow(Direction::Up), Action::Up),
            (LogicalKey::Arrow(Direction::Down), Action::Down),
            (LogicalKey::SPACE, Action::Toggle),
            (LogicalKey::ESCAPE, Action::Back),
        ]
    }

    fn options(settings: &Settings) -> Vec<SettingOption> {
        vec![
            SettingOption::toggle("Use simple graphics", settings.use_simple_graphics, |s, v| {
                s.use_simple_graphics = v;
            }),
            SettingOption::choice("Game speed", GameSpeed::ALL.to_vec(), settings.game_speed, |s, v| {
                s.game_speed = v;
            }),
        ]
    }
}

impl Default for SettingsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for SettingsScreen {
    type Params = ();
    type Output = Settings;

    fn lifecycle(&self) -> Lifecycle {
        self.state
    }

    fn activate(&mut self, _: (), cx: &mut Context<'_>) {
        if !self.state.activate() {
            return;
        }
        cx.term.clear();
        draw_box(cx.term, 0, 0, DISPLAY_WIDTH - 1, DISPLAY_HEIGHT - 1);
        self.settings = cx.store.load_settings();
        self.list.show(Self::options(&self.settings), MENU_X, MENU_Y, cx.term);
        for (key, action) in Self::keys() {
            cx.term.bind(key, action);
        }
    }

    fn pause(&mut self, _cx: &mut Context<'_>) {
        self.state.pause();
    }

    fn deactivate(&mut self, cx: &mut Context<'_>) {
        if !self.state.deactivate() {
            return;
        }
        for (key, _) in Self::keys() {
            cx.term.unbind(&key);
        }
        self.list.clear(cx.term);
        if let Err(e) = cx.store.save_settings(&self.settings) {
            tracing::warn!("could not save settings: {e}");
        }
    }

    fn close(&mut self, cx: &mut Context<'_>) {
        if self.state.is_closed() {
            return;
        }
        self.deactivate(cx);
        self.state.close();
    }

    fn handle(&mut self, event: Event, cx: &mut Context<'_>) -> Option<Settings> {
        if !self.state.is_active() {
            return None;
        }
        match event {
            Event::Action(Action::Up) => self.list.select_previous(cx.term),
            Event::Action(Action::Down) => self.list.select_next(cx.term),
            Event::Action(Action::Toggle) => self.list.toggle(&mut self.settings, cx.term),
            Event::Action(Action::Back) => return Some(self.settings),
            _ => {}
        }
        None
    }
}
