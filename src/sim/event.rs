/// Events emitted during a simulation step.
/// The presentation layer consumes these to update the screen.

use crate::domain::cell::CellType;
use crate::domain::direction::Coord;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// The tail left this cell; it is empty again.
    TailVacated { at: Coord },
    /// The head entered this cell.
    HeadMoved { at: Coord, cell: CellType },
    FoodEaten { score: u32 },
    FoodPlaced { at: Coord },
    /// The head ran into something. `head` is the last safe head position.
    Crashed { head: Coord, cell: CellType, score: u32 },
    /// Food was eaten and no empty cell is left for the next one.
    BoardFilled { head: Coord, cell: CellType, score: u32 },
}
