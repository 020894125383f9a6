/// Snake simulation on a toroidal grid.
///
/// One call to `tick` advances the snake by one cell:
///   1. Remember the current head and its facing (reported on game over)
///   2. Commit the pending direction unless it reverses the snake
///   3. Step the head, wrapping at every edge
///   4. Classify the target cell:
///        Empty → move: the tail cell is freed, the head cell is claimed
///        Food  → grow: score +1, a new food is placed afterwards
///        else  → crash
///   5. Write the new head
///   6. After growing, take a random empty cell for food; none left ends the game
///
/// The set of empty cells is mirrored in a `RandomPool`, so placing food
/// never scans the board.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::Rng;

use crate::domain::cell::CellType;
use crate::domain::direction::{Coord, Direction};
use crate::domain::random_pool::RandomPool;
use crate::sim::event::GameEvent;

// ── Key Constants ──

pub const SCORE_UPPER_BOUND: u32 = 99_999;
const START_LENGTH: usize = 4;
const START_COLUMN: usize = 5;

// ── Score ──

/// Score counter that saturates at `SCORE_UPPER_BOUND`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Score(u32);

impl Score {
    pub fn get(self) -> u32 {
        self.0
    }

    pub fn increment(&mut self) {
        if self.0 < SCORE_UPPER_BOUND {
            self.0 += 1;
        }
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

// ── Engine ──

pub struct GameEngine<R = StdRng> {
    width: usize,
    height: usize,
    cells: Vec<CellType>,
    /// Front is the head.
    snake: VecDeque<Coord>,
    food: Option<Coord>,
    direction: Direction,
    pending: Direction,
    empty: RandomPool<Coord, R>,
    score: Score,
    over: bool,
}

impl GameEngine<StdRng> {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_pool(width, height, RandomPool::new())
    }
}

impl<R: Rng> GameEngine<R> {
    #[cfg(test)]
    pub fn with_rng(width: usize, height: usize, rng: R) -> Self {
        Self::with_pool(width, height, RandomPool::with_rng(rng))
    }

    fn with_pool(width: usize, height: usize, empty: RandomPool<Coord, R>) -> Self {
        GameEngine {
            width,
            height,
            cells: vec![CellType::Empty; width * height],
            snake: VecDeque::with_capacity(width * height),
            food: None,
            direction: Direction::Right,
            pending: Direction::Right,
            empty,
            score: Score::default(),
            over: true,
        }
    }

    /// Resets the board: a four-cell snake on the middle row heading right,
    /// head at column 8, and one food cell.
    pub fn new_game(&mut self) {
        let row = self.height / 2;
        let body: Vec<Coord> = (START_COLUMN..START_COLUMN + START_LENGTH)
            .rev()
            .map(|x| Coord::new(x % self.width, row))
            .collect();
        self.lay_out(&body, Direction::Right);
        self.place_food();
    }

    /// Clears the board and places `body` (head first) facing `direction`.
    fn lay_out(&mut self, body: &[Coord], direction: Direction) {
        self.cells.fill(CellType::Empty);
        self.snake.clear();
        self.food = None;
        self.empty.clear();
        self.score.reset();
        self.direction = direction;
        self.pending = direction;
        self.over = false;

        let segment = CellType::snake_facing(direction);
        for &at in body {
            let idx = self.index(at);
            self.cells[idx] = segment;
            self.snake.push_back(at);
        }
        for y in 0..self.height {
            for x in 0..self.width {
                let at = Coord::new(x, y);
                if self.cell(at).is_empty() {
                    self.empty.insert(at);
                }
            }
        }
    }

    /// Moves a random empty cell to food. Returns false if the board is full.
    fn place_food(&mut self) -> bool {
        match self.empty.pop_random() {
            Some(at) => {
                let idx = self.index(at);
                self.cells[idx] = CellType::Food;
                self.food = Some(at);
                true
            }
            None => {
                self.food = None;
                false
            }
        }
    }

    /// Requests a turn for the next tick. A reversal of the current
    /// direction is ignored.
    pub fn steer(&mut self, dir: Direction) {
        if dir == self.direction.opposite() {
            return;
        }
        self.pending = dir;
    }

    /// Advances the game by one frame and reports what changed.
    /// Does nothing once the game is over.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::with_capacity(4);
        if self.over {
            return events;
        }
        let Some(&head) = self.snake.front() else {
            return events;
        };
        let head_cell = CellType::snake_facing(self.direction);

        if self.pending != self.direction.opposite() {
            self.direction = self.pending;
        }
        let next = head.step(self.direction, self.width, self.height);

        let grow = match self.cell(next) {
            CellType::Empty => {
                if let Some(tail) = self.snake.pop_back() {
                    let idx = self.index(tail);
                    self.cells[idx] = CellType::Empty;
                    self.empty.insert(tail);
                    events.push(GameEvent::TailVacated { at: tail });
                }
                self.empty.remove(&next);
                false
            }
            CellType::Food => {
                self.score.increment();
                events.push(GameEvent::FoodEaten { score: self.score.get() });
                true
            }
            _ => {
                self.over = true;
                events.push(GameEvent::Crashed { head, cell: head_cell, score: self.score.get() });
                return events;
            }
        };

        let new_head = CellType::snake_facing(self.direction);
        let idx = self.index(next);
        self.cells[idx] = new_head;
        self.snake.push_front(next);
        events.push(GameEvent::HeadMoved { at: next, cell: new_head });

        if grow {
            if self.place_food() {
                if let Some(at) = self.food {
                    events.push(GameEvent::FoodPlaced { at });
                }
            } else {
                self.over = true;
                events.push(GameEvent::BoardFilled { head, cell: head_cell, score: self.score.get() });
            }
        }
        events
    }

    // ── Queries ──

    fn index(&self, at: Coord) -> usize {
        at.x + at.y * self.width
    }

    pub fn cell(&self, at: Coord) -> CellType {
        self.cells[self.index(at)]
    }

    pub fn snake(&self) -> impl Iterator<Item = Coord> + '_ {
        self.snake.iter().copied()
    }

    #[cfg(test)]
    pub fn head(&self) -> Option<Coord> {
        self.snake.front().copied()
    }

    pub fn food(&self) -> Option<Coord> {
        self.food
    }

    #[cfg(test)]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn score(&self) -> u32 {
        self.score.get()
    }

    /// True before the first `new_game` and after a crash or a full board.
    pub fn is_over(&self) -> bool {
        self.over
    }

    #[cfg(test)]
    pub fn empty_cells(&self) -> usize {
        self.empty.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;

    fn engine(w: usize, h: usize) -> GameEngine<StdRng> {
        GameEngine::with_rng(w, h, StdRng::seed_from_u64(42))
    }

    /// Board with `body` (head first) heading `dir` and food at `food`.
    fn board(w: usize, h: usize, body: &[(usize, usize)], dir: Direction, food: (usize, usize)) -> GameEngine<StdRng> {
        let mut e = engine(w, h);
        let body: Vec<Coord> = body.iter().map(|&(x, y)| Coord::new(x, y)).collect();
        e.lay_out(&body, dir);
        let at = Coord::new(food.0, food.1);
        e.empty.remove(&at);
        let idx = e.index(at);
        e.cells[idx] = CellType::Food;
        e.food = Some(at);
        e
    }

    /// The pool mirrors the empty cells and exactly one food exists while playing.
    fn assert_invariants(e: &GameEngine<StdRng>) {
        let mut empty = 0;
        let mut food = 0;
        for y in 0..e.height {
            for x in 0..e.width {
                let at = Coord::new(x, y);
                match e.cell(at) {
                    CellType::Empty => {
                        empty += 1;
                        assert!(e.empty.contains(&at), "{at:?} empty but not pooled");
                    }
                    CellType::Food => food += 1,
                    _ => assert!(!e.empty.contains(&at), "{at:?} occupied but pooled"),
                }
            }
        }
        assert_eq!(empty, e.empty.len());
        if !e.is_over() {
            assert_eq!(food, 1);
        }
        assert!(food <= 1);
    }

    // ── new_game ──

    #[test]
    fn new_game_layout() {
        let mut e = engine(39, 22);
        e.new_game();
        let body: Vec<Coord> = e.snake().collect();
        assert_eq!(body, vec![Coord::new(8, 11), Coord::new(7, 11), Coord::new(6, 11), Coord::new(5, 11)]);
        assert_eq!(e.direction(), Direction::Right);
        assert_eq!(e.score(), 0);
        assert!(!e.is_over());
        assert_eq!(e.empty_cells(), 39 * 22 - 5);
        assert_invariants(&e);
    }

    #[test]
    fn new_game_resets_previous_state() {
        let mut e = board(10, 3, &[(2, 1), (1, 1)], Direction::Right, (3, 1));
        e.tick();
        assert_eq!(e.score(), 1);
        e.new_game();
        assert_eq!(e.score(), 0);
        assert_eq!(e.snake().count(), 4);
        assert_invariants(&e);
    }

    // ── Movement ──

    #[test]
    fn moving_frees_tail_and_claims_head() {
        let mut e = board(10, 3, &[(3, 1), (2, 1), (1, 1)], Direction::Right, (8, 0));
        let events = e.tick();
        assert_eq!(
            events,
            vec![
                GameEvent::TailVacated { at: Coord::new(1, 1) },
                GameEvent::HeadMoved { at: Coord::new(4, 1), cell: CellType::SnakeRight },
            ]
        );
        assert_eq!(e.cell(Coord::new(1, 1)), CellType::Empty);
        assert_invariants(&e);
    }

    #[test]
    fn head_wraps_at_right_edge() {
        let mut e = board(5, 3, &[(4, 1), (3, 1)], Direction::Right, (2, 0));
        e.tick();
        assert_eq!(e.head(), Some(Coord::new(0, 1)));
        assert_invariants(&e);
    }

    #[test]
    fn head_wraps_at_top_edge() {
        let mut e = board(5, 3, &[(2, 0), (2, 1)], Direction::Up, (0, 0));
        e.tick();
        assert_eq!(e.head(), Some(Coord::new(2, 2)));
        assert_eq!(e.cell(Coord::new(2, 2)), CellType::SnakeUp);
    }

    // ── Steering ──

    #[test]
    fn reversal_is_ignored() {
        let mut e = board(10, 3, &[(3, 1), (2, 1)], Direction::Right, (8, 0));
        e.steer(Direction::Left);
        e.tick();
        assert_eq!(e.direction(), Direction::Right);
        assert_eq!(e.head(), Some(Coord::new(4, 1)));
        assert!(!e.is_over());
    }

    #[test]
    fn turn_applies_on_next_tick() {
        let mut e = board(10, 4, &[(3, 1), (2, 1)], Direction::Right, (8, 0));
        e.steer(Direction::Down);
        assert_eq!(e.direction(), Direction::Right);
        e.tick();
        assert_eq!(e.direction(), Direction::Down);
        assert_eq!(e.head(), Some(Coord::new(3, 2)));
        assert_eq!(e.cell(Coord::new(3, 2)), CellType::SnakeDown);
    }

    #[test]
    fn last_steer_before_tick_wins() {
        let mut e = board(10, 4, &[(3, 1), (2, 1)], Direction::Right, (8, 0));
        e.steer(Direction::Up);
        e.steer(Direction::Down);
        e.tick();
        assert_eq!(e.direction(), Direction::Down);
    }

    // ── Food ──

    #[test]
    fn eating_grows_and_scores() {
        let mut e = board(10, 3, &[(3, 1), (2, 1)], Direction::Right, (4, 1));
        let events = e.tick();
        assert_eq!(e.score(), 1);
        assert_eq!(e.snake().count(), 3);
        assert!(events.contains(&GameEvent::FoodEaten { score: 1 }));
        assert!(events.iter().any(|ev| matches!(ev, GameEvent::FoodPlaced { .. })));
        assert!(!events.iter().any(|ev| matches!(ev, GameEvent::TailVacated { .. })));
        assert_invariants(&e);
    }

    #[test]
    fn last_empty_cell_receives_food() {
        // 5×1 board: snake 2,1,0 → food at 3, cell 4 is the only empty one
        let mut e = board(5, 1, &[(2, 0), (1, 0), (0, 0)], Direction::Right, (3, 0));
        e.tick();
        assert!(!e.is_over());
        assert_eq!(e.food(), Some(Coord::new(4, 0)));
        assert_eq!(e.empty_cells(), 0);
        assert_invariants(&e);
    }

    #[test]
    fn eating_into_full_board_ends_game() {
        let mut e = board(4, 1, &[(2, 0), (1, 0), (0, 0)], Direction::Right, (3, 0));
        let events = e.tick();
        assert!(e.is_over());
        assert_eq!(e.food(), None);
        assert_eq!(
            events.last(),
            Some(&GameEvent::BoardFilled { head: Coord::new(2, 0), cell: CellType::SnakeRight, score: 1 })
        );
        assert_invariants(&e);
    }

    // ── Collisions ──

    #[test]
    fn running_into_body_crashes() {
        // Head at (2,1) heading up into (2,0), which is body.
        let mut e = board(5, 3, &[(2, 1), (3, 1), (3, 0), (2, 0), (1, 0)], Direction::Left, (4, 2));
        e.steer(Direction::Up);
        let events = e.tick();
        assert!(e.is_over());
        assert_eq!(
            events,
            vec![GameEvent::Crashed { head: Coord::new(2, 1), cell: CellType::SnakeLeft, score: 0 }]
        );
        assert_eq!(e.head(), Some(Coord::new(2, 1)));
    }

    #[test]
    fn tail_cell_still_counts_as_body() {
        // Four-cell ring: the head would step onto the tail it is about to vacate.
        let mut e = engine(2, 2);
        let body = [Coord::new(0, 0), Coord::new(0, 1), Coord::new(1, 1), Coord::new(1, 0)];
        e.lay_out(&body, Direction::Up);
        e.steer(Direction::Right);
        let events = e.tick();
        assert!(matches!(events.as_slice(), [GameEvent::Crashed { .. }]));
    }

    #[test]
    fn wall_crashes() {
        let mut e = board(5, 1, &[(1, 0), (0, 0)], Direction::Right, (4, 0));
        let idx = e.index(Coord::new(2, 0));
        e.cells[idx] = CellType::Wall;
        e.empty.remove(&Coord::new(2, 0));
        e.tick();
        assert!(e.is_over());
    }

    #[test]
    fn tick_after_game_over_is_inert() {
        let mut e = board(4, 1, &[(2, 0), (1, 0), (0, 0)], Direction::Right, (3, 0));
        e.tick();
        assert!(e.tick().is_empty());
    }

    // ── Score ──

    #[test]
    fn score_saturates() {
        let mut s = Score(SCORE_UPPER_BOUND - 1);
        s.increment();
        s.increment();
        assert_eq!(s.get(), SCORE_UPPER_BOUND);
    }

    #[test]
    fn long_random_run_keeps_invariants() {
        let mut e = engine(12, 8);
        e.new_game();
        let turns = [Direction::Up, Direction::Left, Direction::Down, Direction::Right];
        for i in 0..400 {
            if i % 7 == 0 {
                e.steer(turns[(i / 7) % 4]);
            }
            e.tick();
            assert_invariants(&e);
            if e.is_over() {
                e.new_game();
            }
        }
    }
}
