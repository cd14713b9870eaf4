use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two sides. `White` starts at the top and moves toward higher rows,
/// `Blue` starts at the bottom and moves toward row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Blue,
}

impl Color {
    pub const ALL: [Self; 2] = [Self::White, Self::Blue];

    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Blue,
            Self::Blue => Self::White,
        }
    }

    /// Row delta of a man of this color.
    pub const fn forward(self) -> i8 {
        match self {
            Self::White => 1,
            Self::Blue => -1,
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::White => 0,
            Self::Blue => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Blue => "blue",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Man,
    King,
}

/// A board coordinate. Ordering is row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// One diagonal step, or `None` when it leaves a `size`×`size` board.
    pub fn offset(self, dr: i8, dc: i8, size: u8) -> Option<Self> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < size && col < size).then_some(Self { row, col })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A piece together with the cell it occupies.
///
/// Copies handed out by the board are snapshots; the board's grid is the
/// only authoritative location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Piece {
    pub color: Color,
    pub rank: Rank,
    pub row: u8,
    pub col: u8,
}

impl Piece {
    pub const fn man(color: Color, row: u8, col: u8) -> Self {
        Self {
            color,
            rank: Rank::Man,
            row,
            col,
        }
    }

    pub const fn king(color: Color, row: u8, col: u8) -> Self {
        Self {
            color,
            rank: Rank::King,
            row,
            col,
        }
    }

    pub const fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }

    pub fn is_king(&self) -> bool {
        self.rank == Rank::King
    }

    /// Row deltas this piece may travel along: forward first, then
    /// backward for kings.
    pub fn row_directions(self) -> impl Iterator<Item = i8> {
        let forward = self.color.forward();
        let backward = self.is_king().then_some(-forward);
        std::iter::once(forward).chain(backward)
    }
}

/// Opponent pieces removed by one move, in the order they are jumped.
pub type CaptureSet = Vec<Piece>;

/// Destination -> pieces captured on the way there.
pub type MoveMap = BTreeMap<Position, CaptureSet>;

/// Result of one `select` call. Illegal clicks are outcomes, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SelectOutcome {
    /// The selected piece moved; the turn passed to the other side.
    Moved { captured: usize, promoted: bool },
    /// A piece of the side to move is now selected.
    Selected,
    /// The previous selection was dropped and nothing replaced it.
    Deselected,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Phase {
    Idle,
    PieceSelected(Piece),
    GameOver(Color),
}

/// One value per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PerColor<T> {
    pub white: T,
    pub blue: T,
}

impl<T: Copy> PerColor<T> {
    pub fn from_fn(mut f: impl FnMut(Color) -> T) -> Self {
        Self {
            white: f(Color::White),
            blue: f(Color::Blue),
        }
    }

    pub fn get(&self, color: Color) -> T {
        match color {
            Color::White => self.white,
            Color::Blue => self.blue,
        }
    }
}

/// A destination and the squares emptied by reaching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveView {
    pub to: Position,
    pub captures: Vec<Position>,
}

/// Read-only view handed to the presentation layer once per frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub size: u8,
    /// `grid[row][col]`.
    pub grid: Vec<Vec<Option<Piece>>>,
    /// Contract: ordered by destination, row-major; empty when nothing is selected.
    pub valid_moves: Vec<MoveView>,
    pub selected: Option<Position>,
    pub turn: Color,
    pub winner: Option<Color>,
    pub phase: Phase,
    pub counts: PerColor<u8>,
    pub kings: PerColor<u8>,
    /// CRC-32 of the grid contents. Equal fingerprints mean equal boards.
    pub fingerprint: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("cell ({row}, {col}) is off the board")]
    OutOfRange { row: u8, col: u8 },
    #[error("invalid rules config: {0}")]
    InvalidConfig(String),
    #[error("no piece at ({row}, {col})")]
    EmptySquare { row: u8, col: u8 },
    #[error("cell ({row}, {col}) is already occupied")]
    Occupied { row: u8, col: u8 },
    #[error("cell ({row}, {col}) does not hold the piece to remove")]
    PieceMismatch { row: u8, col: u8 },
    #[error("position has no pieces on either side")]
    EmptyPosition,
}
