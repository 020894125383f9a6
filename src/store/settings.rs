/// User settings and their JSON form.
///
/// ```json
/// { "useSimpleGraphics": false, "gameSpeed": 1 }
/// ```
/// Each field is read on its own; a missing or mistyped field keeps its default.

use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::store::Store;

const USE_SIMPLE_GRAPHICS: &str = "useSimpleGraphics";
const GAME_SPEED: &str = "gameSpeed";

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum GameSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
    VeryFast,
}

impl GameSpeed {
    pub const ALL: [GameSpeed; 4] = [GameSpeed::Slow, GameSpeed::Normal, GameSpeed::Fast, GameSpeed::VeryFast];

    pub fn from_index(index: i64) -> Option<GameSpeed> {
        usize::try_from(index).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            GameSpeed::Slow => "Slow",
            GameSpeed::Normal => "Normal",
            GameSpeed::Fast => "Fast",
            GameSpeed::VeryFast => "Very fast",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Settings {
    pub use_simple_graphics: bool,
    pub game_speed: GameSpeed,
}

impl Settings {
    fn from_json(value: &Value) -> Settings {
        let mut settings = Settings::default();
        let Some(fields) = value.as_object() else {
            return settings;
        };
        if let Some(simple) = fields.get(USE_SIMPLE_GRAPHICS).and_then(Value::as_bool) {
            settings.use_simple_graphics = simple;
        }
        if let Some(speed) = fields.get(GAME_SPEED).and_then(Value::as_i64).and_then(GameSpeed::from_index) {
            settings.game_speed = speed;
        }
        settings
    }

    fn to_json(self) -> Value {
        let mut fields = Map::new();
        fields.insert(USE_SIMPLE_GRAPHICS.to_owned(), Value::Bool(self.use_simple_graphics));
        fields.insert(GAME_SPEED.to_owned(), Value::from(self.game_speed.index()));
        Value::Object(fields)
    }
}

impl Store {
    pub fn load_settings(&self) -> Settings {
        Self::read_json(&self.settings_path())
            .map(|value| Settings::from_json(&value))
            .unwrap_or_default()
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        self.write_json(&self.settings_path(), &settings.to_json())
    }
}
