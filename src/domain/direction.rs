/// Movement directions and grid coordinates.

// ── Direction ──

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

// ── Coord ──

/// A cell position on the board. `x` grows right, `y` grows down.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Coord { x, y }
    }

    /// The neighbouring cell in `dir` on a `width` × `height` torus.
    /// Stepping off one edge re-enters from the opposite edge.
    pub fn step(self, dir: Direction, width: usize, height: usize) -> Coord {
        match dir {
            Direction::Up => Coord::new(self.x, (self.y + height - 1) % height),
            Direction::Down => Coord::new(self.x, (self.y + 1) % height),
            Direction::Left => Coord::new((self.x + width - 1) % width, self.y),
            Direction::Right => Coord::new((self.x + 1) % width, self.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_pairs() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Right.opposite().opposite(), Direction::Right);
    }

    #[test]
    fn step_wraps_every_edge() {
        let (w, h) = (4, 3);
        assert_eq!(Coord::new(3, 1).step(Direction::Right, w, h), Coord::new(0, 1));
        assert_eq!(Coord::new(0, 1).step(Direction::Left, w, h), Coord::new(3, 1));
        assert_eq!(Coord::new(2, 0).step(Direction::Up, w, h), Coord::new(2, 2));
        assert_eq!(Coord::new(2, 2).step(Direction::Down, w, h), Coord::new(2, 0));
    }

    #[test]
    fn step_inside_board() {
        assert_eq!(Coord::new(1, 1).step(Direction::Right, 4, 3), Coord::new(2, 1));
        assert_eq!(Coord::new(1, 1).step(Direction::Up, 4, 3), Coord::new(1, 0));
    }
}
