//! Piece geometry: kinds, base offset table, rotation math.

/// The 7 tetromino kinds. Order matters: new pieces cycle through this
/// sequence, and a kind's position in it is its board colour index minus 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    L,
    J,
    I,
    O,
    T,
    S,
    Z,
}

impl PieceKind {
    pub const ALL: [Self; 7] = [
        Self::L,
        Self::J,
        Self::I,
        Self::O,
        Self::T,
        Self::S,
        Self::Z,
    ];

    fn cycle_pos(self) -> usize {
        match self {
            Self::L => 0,
            Self::J => 1,
            Self::I => 2,
            Self::O => 3,
            Self::T => 4,
            Self::S => 5,
            Self::Z => 6,
        }
    }

    /// Cell value 1..=7 stamped into the board when the piece settles
    /// (0 means empty).
    pub fn color_index(self) -> u8 {
        self.cycle_pos() as u8 + 1
    }

    /// Next kind in the fixed spawn sequence.
    pub fn succ(self) -> Self {
        Self::ALL[(self.cycle_pos() + 1) % 7]
    }

    /// Number of distinct orientations.
    pub fn rotation_count(self) -> i32 {
        match self {
            Self::L | Self::J | Self::T => 4,
            Self::I | Self::S | Self::Z => 2,
            Self::O => 1,
        }
    }

    /// Three offsets completing the 0° shape; the anchor cell (0,0) is
    /// implicit.
    fn base_offsets(self) -> [(i32, i32); 3] {
        match self {
            Self::L => [(-1, 1), (-1, 0), (1, 0)],
            Self::J => [(1, 1), (-1, 0), (1, 0)],
            Self::I => [(-1, 0), (1, 0), (2, 0)],
            Self::O => [(1, 0), (0, 1), (1, 1)],
            Self::T => [(1, 0), (-1, 0), (0, 1)],
            Self::S => [(1, 0), (0, 1), (-1, 1)],
            Self::Z => [(-1, 0), (0, 1), (1, 1)],
        }
    }
}

/// The four cell offsets for `kind` at `rotation`, anchor (0,0) first.
/// Rotation is reduced modulo the kind's orientation count, then applied as
/// that many 90° clockwise turns `(dx, dy) -> (-dy, dx)`. Integer math only.
pub fn block_offsets(kind: PieceKind, rotation: i32) -> [(i32, i32); 4] {
    let mut out = [(0, 0); 4];
    out[1..].copy_from_slice(&kind.base_offsets());
    for _ in 0..rotation.rem_euclid(kind.rotation_count()) {
        for cell in &mut out[1..] {
            *cell = (-cell.1, cell.0);
        }
    }
    out
}

/// Active piece: anchor position plus orientation. Occupied cells are always
/// derived from (kind, rotation), never stored, so they cannot go stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub rotation: i32,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Absolute board cells the piece occupies.
    pub fn blocks(&self) -> [(i32, i32); 4] {
        block_offsets(self.kind, self.rotation).map(|(dx, dy)| (self.x + dx, self.y + dy))
    }
}
