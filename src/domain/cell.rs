/// Board cell types and their glyphs.
/// Properties are queried via methods so cell semantics live in one place.

use crate::domain::direction::Direction;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellType {
    #[default]
    Empty,
    SnakeUp,
    SnakeDown,
    SnakeLeft,
    SnakeRight,
    Food,
    // The classic board has no walls; tests place them by hand.
    #[allow(dead_code)]
    Wall,
}

/// Which glyph table to draw with.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GlyphStyle {
    Simple,
    Fancy,
}

impl GlyphStyle {
    pub fn from_simple_flag(simple: bool) -> Self {
        if simple { GlyphStyle::Simple } else { GlyphStyle::Fancy }
    }
}

impl CellType {
    /// The snake segment facing `dir`.
    pub fn snake_facing(dir: Direction) -> CellType {
        match dir {
            Direction::Up => CellType::SnakeUp,
            Direction::Down => CellType::SnakeDown,
            Direction::Left => CellType::SnakeLeft,
            Direction::Right => CellType::SnakeRight,
        }
    }

    pub fn is_empty(self) -> bool {
        matches!(self, CellType::Empty)
    }

    /// Two-column glyph for this cell.
    pub fn glyph(self, style: GlyphStyle) -> &'static str {
        match (self, style) {
            (CellType::Empty, _) => "  ",
            (CellType::Wall, _) => "▓▓",
            (CellType::Food, GlyphStyle::Simple) => "⚫",
            (CellType::Food, GlyphStyle::Fancy) => "🍎",
            (_, GlyphStyle::Simple) => "██",
            (CellType::SnakeUp, GlyphStyle::Fancy) => "⏫",
            (CellType::SnakeDown, GlyphStyle::Fancy) => "⏬",
            (CellType::SnakeLeft, GlyphStyle::Fancy) => "⏪",
            (CellType::SnakeRight, GlyphStyle::Fancy) => "⏩",
        }
    }
}
