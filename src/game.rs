//! Game state: board, active piece, gravity timer, line clears, scoring.

use crate::input::Action;
use crate::piece::{Piece, PieceKind, block_offsets};
use std::time::Instant;

pub const WIDTH: i32 = 10;
pub const HEIGHT: i32 = 22;

/// Spawn anchor for every new piece; pieces may overhang the top edge.
pub const SPAWN_X: i32 = 5;
pub const SPAWN_Y: i32 = 0;

const BOARD_CELLS: usize = (WIDTH * HEIGHT) as usize;

/// Automatic-fall period at difficulty 1; divided by the difficulty level.
const BASE_FALL_PERIOD_US: i64 = 1_000_000;

/// Landed blocks: flat row-major grid, 0 = empty, 1..=7 = piece colour index.
/// Row 0 is the top; y grows downward.
#[derive(Debug, Clone)]
pub struct Board {
    cells: [u8; BOARD_CELLS],
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [0; BOARD_CELLS],
        }
    }

    #[inline]
    fn idx(x: i32, y: i32) -> usize {
        (y * WIDTH + x) as usize
    }

    /// Stored value at (x, y); callers pass in-bounds coordinates.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        self.cells[Self::idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, value: u8) {
        self.cells[Self::idx(x, y)] = value;
    }

    /// Try to apply (dx, dy, dr) to `piece`. All-or-nothing: either every
    /// resulting cell is valid and the piece is updated in place, or the
    /// piece is left completely untouched. Cells above the board (y < 0) are
    /// legal and skip the occupancy check, so pieces can spawn partially
    /// above the visible grid.
    pub fn try_move(&self, piece: &mut Piece, dx: i32, dy: i32, dr: i32) -> bool {
        for (ox, oy) in block_offsets(piece.kind, piece.rotation + dr) {
            let x = piece.x + dx + ox;
            let y = piece.y + dy + oy;
            if x < 0 || x >= WIDTH || y >= HEIGHT {
                return false;
            }
            if y < 0 {
                continue;
            }
            if self.get(x, y) != 0 {
                return false;
            }
        }
        piece.rotation += dr;
        piece.x += dx;
        piece.y += dy;
        true
    }

    /// Write the piece's cells into the grid; cells still above the board
    /// are dropped.
    fn stamp(&mut self, piece: &Piece) {
        let colour = piece.kind.color_index();
        for (x, y) in piece.blocks() {
            if y >= 0 {
                self.set(x, y, colour);
            }
        }
    }

    /// Remove full rows and shift everything above them down. Rows are
    /// scanned bottom to top so each row moves down by exactly the number of
    /// full rows already found below it. Returns the number of rows removed.
    pub fn clear_full_rows(&mut self) -> u32 {
        let mut clears = 0;
        for y in (0..HEIGHT).rev() {
            let mut occupied = 0;
            for x in 0..WIDTH {
                let value = self.get(x, y);
                if value != 0 {
                    occupied += 1;
                }
                self.set(x, y, 0);
                self.set(x, y + clears, value);
            }
            if occupied == WIDTH {
                clears += 1;
            }
        }
        clears as u32
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot input flags, consumed and reset every tick.
#[derive(Debug, Default, Clone, Copy)]
struct Inputs {
    left: bool,
    right: bool,
    down: bool,
    rotate: bool,
    drop: bool,
}

/// Whole game state. One instance lives for the process; `reset` starts a
/// new game in place.
#[derive(Debug)]
pub struct Game {
    pub board: Board,
    pub piece: Piece,
    pub lines_cleared: u32,
    pub score: u32,
    pub game_over: bool,
    inputs: Inputs,
    /// Countdown in µs until the next automatic fall step.
    fall_timer: i64,
    last_update: Instant,
}

impl Game {
    pub fn new(now: Instant) -> Self {
        Self {
            board: Board::new(),
            piece: Piece {
                kind: PieceKind::L,
                rotation: 0,
                x: SPAWN_X,
                y: SPAWN_Y,
            },
            lines_cleared: 0,
            score: 0,
            game_over: false,
            inputs: Inputs::default(),
            fall_timer: BASE_FALL_PERIOD_US,
            last_update: now,
        }
    }

    pub fn reset(&mut self, now: Instant) {
        *self = Self::new(now);
    }

    /// Latch a player action until the next tick consumes it.
    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::MoveLeft => self.inputs.left = true,
            Action::MoveRight => self.inputs.right = true,
            Action::SoftDrop => self.inputs.down = true,
            Action::RotateCw => self.inputs.rotate = true,
            Action::HardDrop => self.inputs.drop = true,
            Action::Quit | Action::None => {}
        }
    }

    /// Level derived from progress: +1 every 10 cleared lines.
    pub fn difficulty(&self) -> u32 {
        1 + self.lines_cleared / 10
    }

    fn try_move(&mut self, dx: i32, dy: i32, dr: i32) -> bool {
        self.board.try_move(&mut self.piece, dx, dy, dr)
    }

    /// Hard-drop landing preview: the active piece advanced straight down
    /// until blocked.
    pub fn shadow_piece(&self) -> Piece {
        let mut shadow = self.piece;
        while self.board.try_move(&mut shadow, 0, 1, 0) {}
        shadow
    }

    /// Advance the game by one frame. Returns true when anything moved,
    /// rotated, dropped or landed this tick; the caller uses it as a redraw
    /// hint, so over-reporting is harmless.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.game_over {
            // Hard drop is the only way out of the terminal state.
            let restart = self.inputs.drop;
            self.inputs = Inputs::default();
            if restart {
                self.reset(now);
            }
            return restart;
        }

        let elapsed = now.saturating_duration_since(self.last_update);
        self.fall_timer -= elapsed.as_micros().min(i64::MAX as u128) as i64;
        self.last_update = now;

        let Inputs {
            left,
            right,
            mut down,
            rotate,
            drop,
        } = self.inputs;
        self.inputs = Inputs::default();

        let difficulty = self.difficulty();
        let fall_period = BASE_FALL_PERIOD_US / i64::from(difficulty);

        if drop {
            self.fall_timer = fall_period;
        } else if down {
            self.fall_timer = fall_period;
            self.score += 1;
        } else if self.fall_timer <= 0 {
            down = true;
            self.fall_timer += fall_period;
            if self.fall_timer < 0 {
                // One fall per tick even after a long stall (e.g. suspended
                // terminal); letting falls queue up would teleport the piece.
                self.fall_timer = fall_period;
            }
        }

        if rotate {
            // Ordered kick candidates, first success wins. The extra -2 kick
            // lets a vertical I piece rotate flat against the right wall.
            let wide_right = self.piece.kind == PieceKind::I && self.piece.x >= 8;
            let kicks: &[(i32, i32)] = if wide_right {
                &[(0, 0), (1, 0), (-1, 0), (-2, 0), (0, 1)]
            } else {
                &[(0, 0), (1, 0), (-1, 0), (0, 1)]
            };
            for &(dx, dy) in kicks {
                if self.try_move(dx, dy, 1) {
                    break;
                }
            }
        }

        if left {
            self.try_move(-1, 0, 0);
        }
        if right {
            self.try_move(1, 0, 0);
        }

        if drop {
            while self.try_move(0, 1, 0) {
                self.score += 1;
            }
            down = true;
        }

        if down && !self.try_move(0, 1, 0) {
            self.land(difficulty);
        }

        down || left || right || rotate || drop
    }

    /// The piece cannot descend any further: commit it, clear rows, score,
    /// and spawn the next piece.
    fn land(&mut self, difficulty: u32) {
        self.board.stamp(&self.piece);

        let clears = self.board.clear_full_rows();
        self.lines_cleared += clears;
        self.score += clears * clears * 100 * difficulty;

        self.piece = Piece {
            kind: self.piece.kind.succ(),
            rotation: 0,
            x: SPAWN_X,
            y: SPAWN_Y,
        };
        if !self.try_move(0, 0, 0) {
            self.game_over = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn game() -> (Game, Instant) {
        let now = Instant::now();
        (Game::new(now), now)
    }

    #[test]
    fn try_move_is_all_or_nothing() {
        let (mut g, _) = game();
        g.piece = Piece {
            kind: PieceKind::L,
            rotation: 0,
            x: 1,
            y: 5,
        };
        let before = g.piece;

        // Into the left wall: rejected, piece untouched.
        assert!(!g.board.try_move(&mut g.piece, -1, 0, 0));
        assert_eq!(g.piece, before);

        // Into an occupied cell: rejected, piece and board untouched.
        g.board.set(0, 7, 3);
        assert!(!g.board.try_move(&mut g.piece, 0, 1, 0));
        assert_eq!(g.piece, before);
        assert_eq!(g.board.get(0, 7), 3);

        // A legal shift commits position.
        assert!(g.board.try_move(&mut g.piece, 1, 0, 0));
        assert_eq!((g.piece.x, g.piece.y, g.piece.rotation), (2, 5, 0));
    }

    #[test]
    fn cells_above_board_are_legal() {
        let (mut g, _) = game();
        g.piece = Piece {
            kind: PieceKind::I,
            rotation: 1,
            x: 4,
            y: 0,
        };
        // Vertical I at y=0 has a block at y=-1; still placeable.
        assert!(g.board.try_move(&mut g.piece, 0, 0, 0));
    }

    #[test]
    fn full_rows_are_removed_and_rows_above_shift() {
        let mut board = Board::new();
        // Rows 5 and 7 full, row 6 partial, a marker up top.
        for x in 0..WIDTH {
            board.set(x, 5, 1);
            board.set(x, 7, 2);
        }
        board.set(0, 6, 3);
        board.set(4, 2, 4);

        assert_eq!(board.clear_full_rows(), 2);

        // The marker above both full rows shifted down by two; the row
        // between them only has one clear below it and shifts by one.
        assert_eq!(board.get(4, 4), 4);
        assert_eq!(board.get(0, 7), 3);
        // The full rows are gone and only the two markers remain.
        let mut occupied = 0;
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                if board.get(x, y) != 0 {
                    occupied += 1;
                }
            }
        }
        assert_eq!(occupied, 2);
    }

    #[test]
    fn double_clear_scores_four_hundred_at_difficulty_one() {
        let (mut g, now) = game();
        // Bottom two rows complete except the two columns the O piece fills.
        for y in [HEIGHT - 2, HEIGHT - 1] {
            for x in 0..WIDTH {
                if x != 8 && x != 9 {
                    g.board.set(x, y, 1);
                }
            }
        }
        g.piece = Piece {
            kind: PieceKind::O,
            rotation: 0,
            x: 8,
            y: HEIGHT - 3,
        };
        g.apply_action(Action::HardDrop);
        assert!(g.tick(now));

        // One drop step, then 2 * 2 * 100 * 1 for the double clear.
        assert_eq!(g.score, 1 + 400);
        assert_eq!(g.lines_cleared, 2);
        // The board is empty again after compaction.
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                assert_eq!(g.board.get(x, y), 0);
            }
        }
    }

    #[test]
    fn hard_drop_lands_and_respawns() {
        let (mut g, now) = game();
        g.apply_action(Action::HardDrop);
        assert!(g.tick(now));

        // L from (5, 0) descends until its lowest block rests on the floor:
        // 20 scored steps, then the next kind spawns fresh.
        assert_eq!(g.score, 20);
        assert_eq!(g.piece.kind, PieceKind::J);
        assert_eq!(
            (g.piece.x, g.piece.y, g.piece.rotation),
            (SPAWN_X, SPAWN_Y, 0)
        );
        assert!(!g.game_over);
        // The L is stamped with its colour index.
        assert_eq!(g.board.get(5, 20), 1);
        assert_eq!(g.board.get(4, 21), 1);
        assert_eq!(g.board.get(4, 20), 1);
        assert_eq!(g.board.get(6, 20), 1);
    }

    #[test]
    fn blocked_spawn_ends_the_game() {
        let (mut g, now) = game();
        // Top two rows packed except the spawn column; the next piece has no
        // room to appear.
        for y in [0, 1] {
            for x in 0..WIDTH {
                if x != SPAWN_X {
                    g.board.set(x, y, 7);
                }
            }
        }
        g.piece = Piece {
            kind: PieceKind::O,
            rotation: 0,
            x: 0,
            y: HEIGHT - 3,
        };
        g.apply_action(Action::HardDrop);
        g.tick(now);
        assert!(g.game_over);
    }

    #[test]
    fn i_piece_kicks_off_the_right_wall() {
        let (mut g, now) = game();
        g.piece = Piece {
            kind: PieceKind::I,
            rotation: 1,
            x: 9,
            y: 5,
        };
        g.apply_action(Action::RotateCw);
        assert!(g.tick(now));

        // Unkicked and ±1 all collide with the wall; the -2 kick lands it.
        assert_eq!((g.piece.x, g.piece.y), (7, 5));
        assert_eq!(g.piece.rotation, 2);
    }

    #[test]
    fn blocked_rotation_is_silently_dropped() {
        let (mut g, now) = game();
        // Box the T in on every kick candidate, including one row down.
        g.piece = Piece {
            kind: PieceKind::T,
            rotation: 0,
            x: 5,
            y: 5,
        };
        for y in 4..=8 {
            for x in 0..WIDTH {
                g.board.set(x, y, 7);
            }
        }
        for (x, y) in g.piece.blocks() {
            g.board.set(x, y, 0);
        }
        let before = g.piece;
        g.apply_action(Action::RotateCw);
        g.tick(now);
        assert_eq!(g.piece, before);
    }

    #[test]
    fn soft_drop_steps_and_scores() {
        let (mut g, now) = game();
        g.apply_action(Action::SoftDrop);
        assert!(g.tick(now));
        assert_eq!(g.piece.y, 1);
        assert_eq!(g.score, 1);
        assert_eq!(g.fall_timer, BASE_FALL_PERIOD_US);
    }

    #[test]
    fn stalled_timer_falls_once_and_clamps() {
        let (mut g, now) = game();
        // 5 s without a tick: a single fall step, not five.
        assert!(g.tick(now + Duration::from_secs(5)));
        assert_eq!(g.piece.y, 1);
        assert_eq!(g.fall_timer, BASE_FALL_PERIOD_US);
    }

    #[test]
    fn idle_tick_reports_no_activity() {
        let (mut g, now) = game();
        assert!(!g.tick(now + Duration::from_millis(10)));
        assert_eq!(g.piece.y, 0);
    }

    #[test]
    fn hard_drop_restarts_after_game_over() {
        let (mut g, now) = game();
        g.game_over = true;
        g.score = 123;
        g.lines_cleared = 14;

        // Other inputs are ignored in the terminal state.
        g.apply_action(Action::MoveLeft);
        assert!(!g.tick(now));
        assert!(g.game_over);

        g.apply_action(Action::HardDrop);
        assert!(g.tick(now));
        assert!(!g.game_over);
        assert_eq!(g.score, 0);
        assert_eq!(g.lines_cleared, 0);
        assert_eq!(g.piece.kind, PieceKind::L);
    }

    #[test]
    fn difficulty_shortens_the_fall_period() {
        let (mut g, now) = game();
        g.lines_cleared = 20;
        assert_eq!(g.difficulty(), 3);
        // The refilled countdown after an expiry holds a third of a second.
        g.tick(now + Duration::from_micros(1_000_001));
        assert_eq!(g.piece.y, 1);
        assert!(g.fall_timer <= BASE_FALL_PERIOD_US / 3);
    }
}
